use std::sync::Arc;
use std::time::Duration;

use crate::component::{ProcessGroup, ProcessorNode};
use crate::error::SearchError;

/// The component tree a search walks.
///
/// Implement this over whatever owns the live flow — a controller, a parsed
/// flow definition, a test fixture. The engine only ever asks for one group
/// at a time and treats the returned snapshot as authoritative for that
/// group's children, so implementations may be mutated concurrently between
/// calls.
///
/// # Thread Safety
///
/// `Send + Sync` are required — a single source may back several searches
/// running on different threads.
///
/// # Example
///
/// ```rust
/// use flowseek::{FlowSource, ProcessGroup};
///
/// struct SingleGroup(ProcessGroup);
///
/// impl FlowSource for SingleGroup {
///     fn root_group_id(&self) -> String {
///         self.0.id.clone()
///     }
///
///     fn group(&self, id: &str) -> Option<ProcessGroup> {
///         (id == self.0.id).then(|| self.0.clone())
///     }
/// }
/// ```
pub trait FlowSource: Send + Sync {
    /// Id of the root group, used when no start group is configured.
    fn root_group_id(&self) -> String;

    /// Snapshot of the group with this id.
    ///
    /// Return `None` if the group does not exist (any more) — the engine
    /// skips it rather than failing the search.
    fn group(&self, id: &str) -> Option<ProcessGroup>;
}

impl<T: FlowSource + ?Sized> FlowSource for Arc<T> {
    fn root_group_id(&self) -> String {
        (**self).root_group_id()
    }

    fn group(&self, id: &str) -> Option<ProcessGroup> {
        (**self).group(id)
    }
}

impl<T: FlowSource + ?Sized> FlowSource for &T {
    fn root_group_id(&self) -> String {
        (**self).root_group_id()
    }

    fn group(&self, id: &str) -> Option<ProcessGroup> {
        (**self).group(id)
    }
}

// ---------------------------------------------------------------------------
// Searchable
// ---------------------------------------------------------------------------

/// One match contributed by a [`Searchable`] processor, reported as
/// `"<label>: <matched>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub label:   String,
    pub matched: String,
}

impl SearchHit {
    pub fn new(label: impl Into<String>, matched: impl Into<String>) -> Self {
        Self {
            label:   label.into(),
            matched: matched.into(),
        }
    }
}

/// What a [`Searchable`] processor gets to look at.
pub struct SearchContext<'a> {
    /// The search term exactly as the caller typed it.
    pub term: &'a str,

    /// The node wrapping the processor being searched.
    pub processor: &'a ProcessorNode,

    /// The whole flow, for extensions that need to look beyond their node.
    pub flow: &'a dyn FlowSource,
}

impl<'a> SearchContext<'a> {
    /// Configured value of the named property, if set.
    pub fn property(&self, name: &str) -> Option<&'a str> {
        self.processor
            .properties
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_deref())
    }

    pub fn annotation_data(&self) -> Option<&'a str> {
        self.processor.annotation_data.as_deref()
    }
}

/// Optional capability of a processor implementation to report its own
/// matches, for state the generic field matchers cannot see.
///
/// Errors and panics raised here are contained: they are logged and the
/// processor simply contributes no extra matches. They never reach the
/// caller of the search.
pub trait Searchable: Send + Sync {
    fn search(&self, context: &SearchContext<'_>) -> Result<Vec<SearchHit>, SearchError>;
}

// ---------------------------------------------------------------------------
// DisplayFormat
// ---------------------------------------------------------------------------

/// Turns numeric thresholds into the text shown in match explanations.
///
/// See [`StandardFormat`](crate::StandardFormat) for the default.
pub trait DisplayFormat: Send + Sync {
    fn format_duration(&self, duration: Duration) -> String;

    fn format_data_size(&self, bytes: f64) -> String;
}
