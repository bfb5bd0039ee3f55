//! # flowseek
//!
//! Component search for data-flow topologies.
//!
//! flowseek walks a tree of process groups — processors, connections,
//! ports, funnels, remote groups and nested groups — and reports every
//! component that matches a free-text term, sorted into one list per
//! component kind. Each match says why it matched: `"Name: ExtractText"`,
//! `"Run status: Running"`, `"Back pressure count: 500"`.
//!
//! flowseek owns the walk, the per-kind matching rules and the result
//! shape. It does **not** own the flow: the tree comes from a
//! [`FlowSource`] you implement (or the bundled [`MemoryFlow`]).
//!
//! # Quick Start
//!
//! ```rust
//! use flowseek::{MemoryFlow, ProcessGroup, ProcessorNode, ScheduledState};
//!
//! let mut root = ProcessGroup::root("root", "Root");
//! root.processors.push(ProcessorNode {
//!     id:              "p-1".into(),
//!     name:            "ExtractText".into(),
//!     processor_type:  "ExtractText".into(),
//!     scheduled_state: ScheduledState::Running,
//!     valid:           true,
//!     ..ProcessorNode::default()
//! });
//!
//! let results = flowseek::search()
//!     .source(MemoryFlow::new(root))
//!     .matching("running")
//!     .run()
//!     .unwrap();
//!
//! let hit = &results.matches.processor_results[0];
//! assert_eq!(hit.matches, vec!["Run status: Running"]);
//! assert_eq!(hit.group_id.as_deref(), Some("root"));
//! ```
//!
//! # Matching
//!
//! Text fields match when they contain the term, ignoring case. State that
//! is not text (run status, scheduling strategy, thresholds, transmission)
//! matches through fixed phrases: the term `"run"` selects the phrase
//! `"running"`, which then matches only components that are actually
//! running.
//!
//! # Processor Extensions
//!
//! A processor implementation can contribute its own matches by
//! implementing [`Searchable`]:
//!
//! ```rust
//! use flowseek::{SearchContext, SearchError, SearchHit, Searchable};
//!
//! struct Routes(Vec<String>);
//!
//! impl Searchable for Routes {
//!     fn search(&self, context: &SearchContext<'_>) -> Result<Vec<SearchHit>, SearchError> {
//!         let term = context.term.to_lowercase();
//!         Ok(self.0
//!             .iter()
//!             .filter(|r| r.to_lowercase().contains(&term))
//!             .map(|r| SearchHit::new("Route", r.as_str()))
//!             .collect())
//!     }
//! }
//! ```
//!
//! Errors and panics from an extension are logged and otherwise ignored;
//! the rest of the search carries on.

#![forbid(unsafe_code)]

mod builder;
mod component;
mod engine;
mod error;
mod format;
mod matchers;
mod memory;
mod query;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use component::{
    Component, ComponentKind, Connectable, Connection, Funnel, Port, PortAccess, ProcessGroup,
    ProcessorNode, Property, RemoteProcessGroup, ScheduledState, SchedulingStrategy,
};
pub use error::SearchError;
pub use format::{parse_data_size, StandardFormat};
pub use matchers::connection_name;
pub use memory::MemoryFlow;
pub use query::SearchQuery;
pub use results::{ComponentMatch, Results, ScanStats, SearchResults};
pub use traits::{DisplayFormat, FlowSource, SearchContext, SearchHit, Searchable};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust
/// use flowseek::{Funnel, MemoryFlow, ProcessGroup};
///
/// let mut root = ProcessGroup::root("root", "Root");
/// root.funnels.push(Funnel { id: "funnel-1".into(), name: String::new() });
///
/// let results = flowseek::search()
///     .source(MemoryFlow::new(root))
///     .matching("FUNNEL")
///     .run()
///     .unwrap();
///
/// assert_eq!(results.matches.funnel_results.len(), 1);
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
