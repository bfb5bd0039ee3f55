use std::collections::HashSet;
use std::time::Instant;

use crate::component::{Component, ProcessGroup};
use crate::matchers::{evaluate, MatchContext};
use crate::query::SearchQuery;
use crate::results::{Results, ScanStats, SearchResults};
use crate::traits::{DisplayFormat, FlowSource};

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// Traversal parameters passed from the builder to the engine.
pub(crate) struct WalkConfig {
    pub max_depth: Option<usize>,
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions<'a> {
    pub config: WalkConfig,
    pub query:  SearchQuery,
    pub flow:   &'a dyn FlowSource,
    pub format: &'a dyn DisplayFormat,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Walk the tree depth-first from `start` and collect every match.
///
/// Called by `SearchBuilder::run()` once the start group has been resolved.
/// Never fails: groups that disappear mid-walk are skipped.
pub(crate) fn run(start: ProcessGroup, opts: EngineOptions<'_>) -> Results {
    let started = Instant::now();
    tracing::debug!("search started: query={:?}, start={}", opts.query.as_str(), start.id);

    let mut walker = Walker {
        ctx: MatchContext {
            query:  &opts.query,
            flow:   opts.flow,
            format: opts.format,
        },
        max_depth:  opts.config.max_depth,
        visited:    HashSet::new(),
        results:    SearchResults::default(),
        groups:     0,
        components: 0,
    };
    walker.visit(&start, 0);

    let stats = ScanStats::compute(walker.groups, walker.components, started.elapsed());
    tracing::debug!(
        "search finished: groups={}, components={}, matches={}, elapsed={:?}",
        stats.groups,
        stats.components,
        walker.results.len(),
        stats.duration
    );

    Results {
        matches: walker.results,
        stats,
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

struct Walker<'a> {
    ctx:        MatchContext<'a>,
    max_depth:  Option<usize>,
    visited:    HashSet<String>,
    results:    SearchResults,
    groups:     usize,
    components: usize,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, group: &ProcessGroup, depth: usize) {
        // a provider listing a group twice (or in a cycle) must not loop us
        if !self.visited.insert(group.id.clone()) {
            tracing::debug!("group already visited: {}", group.id);
            return;
        }
        self.groups += 1;

        // the group carries its parent id as group id
        if let Some(m) = evaluate(Component::ProcessGroup(group), &self.ctx) {
            self.results.push(m);
        }

        for p in &group.processors {
            self.check(Component::Processor(p), &group.id);
        }
        for c in &group.connections {
            self.check(Component::Connection(c), &group.id);
        }
        for r in &group.remote_process_groups {
            self.check(Component::RemoteProcessGroup(r), &group.id);
        }
        for p in &group.input_ports {
            self.check(Component::InputPort(p), &group.id);
        }
        for p in &group.output_ports {
            self.check(Component::OutputPort(p), &group.id);
        }
        for f in &group.funnels {
            self.check(Component::Funnel(f), &group.id);
        }

        if self.max_depth.is_some_and(|max| depth >= max) {
            return;
        }

        for child_id in &group.child_group_ids {
            match self.ctx.flow.group(child_id) {
                Some(child) => self.visit(&child, depth + 1),
                None => tracing::debug!("skipping vanished group: {} (parent {})", child_id, group.id),
            }
        }
    }

    fn check(&mut self, component: Component<'_>, group_id: &str) {
        self.components += 1;
        if let Some(mut m) = evaluate(component, &self.ctx) {
            m.group_id = Some(group_id.to_string());
            self.results.push(m);
        }
    }
}
