use crate::engine::{run, EngineOptions, WalkConfig};
use crate::error::SearchError;
use crate::format::StandardFormat;
use crate::query::SearchQuery;
use crate::results::Results;
use crate::traits::{DisplayFormat, FlowSource};

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a component search.
///
/// Created via [`flowseek::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) to execute.
///
/// # Example
///
/// ```rust,ignore
/// let results = flowseek::search()
///     .source(flow)
///     .matching("extract")
///     .root("ingest-group")
///     .max_depth(2)
///     .run()?;
/// ```
pub struct SearchBuilder {
    source:    Option<Box<dyn FlowSource>>,
    query:     SearchQuery,
    root:      Option<String>,
    max_depth: Option<usize>,
    format:    Box<dyn DisplayFormat>,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            source:    None,
            query:     SearchQuery::new(""),
            root:      None,
            max_depth: None,
            format:    Box::new(StandardFormat),
        }
    }
}

impl SearchBuilder {
    // ── Source ────────────────────────────────────────────────────────────

    /// Set the flow to search.
    ///
    /// Any type implementing [`FlowSource`] is accepted. Pass an
    /// `Arc<YourFlow>` to keep using the flow elsewhere.
    pub fn source(mut self, s: impl FlowSource + 'static) -> Self {
        self.source = Some(Box::new(s));
        self
    }

    // ── Query ─────────────────────────────────────────────────────────────

    /// The term to search for. Matching is case-insensitive.
    ///
    /// Without a term the search runs with the empty query, which matches
    /// every component that has a non-empty searchable field.
    pub fn matching(mut self, term: impl Into<String>) -> Self {
        self.query = SearchQuery::new(term);
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Start the walk at this group instead of the root group.
    pub fn root(mut self, group_id: impl Into<String>) -> Self {
        self.root = Some(group_id.into());
        self
    }

    /// Maximum nesting depth. `0` searches the start group only, `1` also
    /// its direct child groups, and so on. Unlimited by default.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    /// Replace the [`StandardFormat`] used for durations and data sizes in
    /// explanations.
    pub fn format(mut self, f: impl DisplayFormat + 'static) -> Self {
        self.format = Box::new(f);
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search and return results.
    ///
    /// Blocks until the whole tree has been walked.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for configuration errors: no source provided, or
    /// a start group the source cannot resolve. Nothing that happens during
    /// the walk itself is an error.
    pub fn run(self) -> Result<Results, SearchError> {
        let source = self.source.ok_or_else(|| {
            SearchError::InvalidSource("no source provided".into())
        })?;

        let root_id = self.root.unwrap_or_else(|| source.root_group_id());
        let start = source
            .group(&root_id)
            .ok_or(SearchError::RootNotFound(root_id))?;

        let opts = EngineOptions {
            config: WalkConfig {
                max_depth: self.max_depth,
            },
            query:  self.query,
            flow:   &*source,
            format: &*self.format,
        };

        Ok(run(start, opts))
    }
}
