use std::time::Duration;

use serde::Serialize;

use crate::component::ComponentKind;

/// One component that matched, with the reasons it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMatch {
    pub id: String,

    /// Display name. For unnamed connections this is derived from the
    /// relationships or the source.
    pub name: String,

    /// The group the component was found in; for a process group, its
    /// parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Explanations such as `"Name: ExtractText"`, in evaluation order.
    /// Never empty.
    pub matches: Vec<String>,

    #[serde(rename = "type")]
    pub kind: ComponentKind,
}

/// Matches partitioned by component kind, each list in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub processor_results:            Vec<ComponentMatch>,
    pub connection_results:           Vec<ComponentMatch>,
    pub remote_process_group_results: Vec<ComponentMatch>,
    pub input_port_results:           Vec<ComponentMatch>,
    pub output_port_results:          Vec<ComponentMatch>,
    pub funnel_results:               Vec<ComponentMatch>,
    pub process_group_results:        Vec<ComponentMatch>,
}

impl SearchResults {
    /// Append a match to the list for its kind.
    pub fn push(&mut self, m: ComponentMatch) {
        self.list_mut(m.kind).push(m);
    }

    pub fn of_kind(&self, kind: ComponentKind) -> &[ComponentMatch] {
        match kind {
            ComponentKind::Processor          => &self.processor_results,
            ComponentKind::Connection         => &self.connection_results,
            ComponentKind::RemoteProcessGroup => &self.remote_process_group_results,
            ComponentKind::InputPort          => &self.input_port_results,
            ComponentKind::OutputPort         => &self.output_port_results,
            ComponentKind::Funnel             => &self.funnel_results,
            ComponentKind::ProcessGroup       => &self.process_group_results,
        }
    }

    fn list_mut(&mut self, kind: ComponentKind) -> &mut Vec<ComponentMatch> {
        match kind {
            ComponentKind::Processor          => &mut self.processor_results,
            ComponentKind::Connection         => &mut self.connection_results,
            ComponentKind::RemoteProcessGroup => &mut self.remote_process_group_results,
            ComponentKind::InputPort          => &mut self.input_port_results,
            ComponentKind::OutputPort         => &mut self.output_port_results,
            ComponentKind::Funnel             => &mut self.funnel_results,
            ComponentKind::ProcessGroup       => &mut self.process_group_results,
        }
    }

    /// Every match, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentMatch> {
        self.processor_results
            .iter()
            .chain(&self.connection_results)
            .chain(&self.remote_process_group_results)
            .chain(&self.input_port_results)
            .chain(&self.output_port_results)
            .chain(&self.funnel_results)
            .chain(&self.process_group_results)
    }

    /// Total number of matches across all categories.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The output of a completed search.
pub struct Results {
    /// Matched components by category.
    pub matches: SearchResults,

    /// Scan statistics.
    pub stats: ScanStats,
}

/// Statistics for a completed scan.
pub struct ScanStats {
    /// Groups visited, including the start group.
    pub groups: usize,

    /// Components evaluated (matched or not), excluding groups.
    pub components: usize,

    /// Wall-clock time from search start to completion.
    pub duration: Duration,

    /// Convenience field — equals `components / duration.as_secs_f64()`,
    /// clamped to 0 on zero-duration runs.
    pub components_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(groups: usize, components: usize, duration: Duration) -> Self {
        let cps = if duration.as_secs_f64() > 0.0 {
            (components as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            groups,
            components,
            duration,
            components_per_sec: cps,
        }
    }
}
