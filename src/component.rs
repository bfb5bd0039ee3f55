use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::traits::Searchable;

// ---------------------------------------------------------------------------
// State vocabularies
// ---------------------------------------------------------------------------

/// Whether a processor or port is scheduled to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduledState {
    Running,
    #[default]
    Stopped,
    Disabled,
}

/// How a processor is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingStrategy {
    EventDriven,
    #[default]
    TimerDriven,
    PrimaryNodeOnly,
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// A configured processor property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    pub name:        String,
    pub description: String,

    /// `None` when the property is unset.
    pub value: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name:        name.into(),
            description: String::new(),
            value:       Some(value.into()),
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A processor node together with the processor implementation it wraps.
#[derive(Clone, Default)]
pub struct ProcessorNode {
    pub id:       String,
    pub name:     String,
    pub comments: String,

    /// Simple name of the implementation type, e.g. `"ExtractText"`.
    pub processor_type: String,

    pub scheduled_state:     ScheduledState,
    pub scheduling_strategy: SchedulingStrategy,

    /// `false` when the processor's configuration does not validate.
    pub valid: bool,

    pub relationships:   Vec<String>,
    pub properties:      Vec<Property>,
    pub annotation_data: Option<String>,

    /// Search capability contributed by the implementation, if it has one.
    pub searchable: Option<Arc<dyn Searchable>>,
}

impl fmt::Debug for ProcessorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("processor_type", &self.processor_type)
            .field("scheduled_state", &self.scheduled_state)
            .field("scheduling_strategy", &self.scheduling_strategy)
            .field("valid", &self.valid)
            .field("searchable", &self.searchable.is_some())
            .finish_non_exhaustive()
    }
}

/// Identity of one end of a connection, as seen when the connection was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connectable {
    pub id:       String,
    pub name:     String,
    pub comments: String,
}

impl Connectable {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id:       id.into(),
            name:     name.into(),
            comments: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub id:   String,
    pub name: String,

    pub relationships: Vec<String>,

    /// Type names of the queue prioritizers, in priority order.
    pub prioritizers: Vec<String>,

    /// Zero means flowfiles never expire.
    pub flow_file_expiration: Duration,

    /// Data size threshold as configured, e.g. `"1 GB"`. Blank means none.
    pub back_pressure_data_size: String,

    /// Object count threshold. Zero means none.
    pub back_pressure_object_threshold: u64,

    pub source:      Connectable,
    pub destination: Connectable,
}

/// Access lists of a port exposed by the root group for site-to-site transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortAccess {
    pub user_access_control:  Vec<String>,
    pub group_access_control: Vec<String>,
}

/// An input or output port. Direction is given by which list of the owning
/// [`ProcessGroup`] holds it.
#[derive(Debug, Clone, Default)]
pub struct Port {
    pub id:       String,
    pub name:     String,
    pub comments: String,

    pub scheduled_state: ScheduledState,
    pub valid:           bool,

    /// Present only on ports exposed by the root group.
    pub access: Option<PortAccess>,
}

#[derive(Debug, Clone)]
pub struct RemoteProcessGroup {
    pub id:           String,
    pub name:         String,
    pub comments:     String,
    pub target_uri:   Url,
    pub transmitting: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Funnel {
    pub id:   String,
    pub name: String,
}

/// A snapshot of one process group.
///
/// Nested groups are listed by id only and resolved through the
/// [`FlowSource`](crate::traits::FlowSource), so a group never owns its
/// children's snapshots and `parent_id` is a plain back-reference.
#[derive(Debug, Clone, Default)]
pub struct ProcessGroup {
    pub id:       String,
    pub name:     String,
    pub comments: String,

    /// `None` only for the root group.
    pub parent_id: Option<String>,

    pub processors:            Vec<ProcessorNode>,
    pub connections:           Vec<Connection>,
    pub remote_process_groups: Vec<RemoteProcessGroup>,
    pub input_ports:           Vec<Port>,
    pub output_ports:          Vec<Port>,
    pub funnels:               Vec<Funnel>,
    pub child_group_ids:       Vec<String>,
}

impl ProcessGroup {
    /// A root group: no parent.
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// A group nested inside `parent_id`.
    pub fn child_of(parent_id: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: Some(parent_id.into()),
            ..Self::default()
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Component / ComponentKind
// ---------------------------------------------------------------------------

/// The result category a component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Processor,
    Connection,
    RemoteProcessGroup,
    InputPort,
    OutputPort,
    Funnel,
    ProcessGroup,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Processor          => "processor",
            Self::Connection         => "connection",
            Self::RemoteProcessGroup => "remote process group",
            Self::InputPort          => "input port",
            Self::OutputPort         => "output port",
            Self::Funnel             => "funnel",
            Self::ProcessGroup       => "process group",
        };
        f.write_str(s)
    }
}

/// A borrowed view of any node in the tree, tagged with its kind.
///
/// Ports appear twice because direction is not a property of [`Port`]
/// itself but of the list that holds it.
#[derive(Debug, Clone, Copy)]
pub enum Component<'a> {
    Processor(&'a ProcessorNode),
    Connection(&'a Connection),
    RemoteProcessGroup(&'a RemoteProcessGroup),
    InputPort(&'a Port),
    OutputPort(&'a Port),
    Funnel(&'a Funnel),
    ProcessGroup(&'a ProcessGroup),
}

impl<'a> Component<'a> {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Processor(_)          => ComponentKind::Processor,
            Self::Connection(_)         => ComponentKind::Connection,
            Self::RemoteProcessGroup(_) => ComponentKind::RemoteProcessGroup,
            Self::InputPort(_)          => ComponentKind::InputPort,
            Self::OutputPort(_)         => ComponentKind::OutputPort,
            Self::Funnel(_)             => ComponentKind::Funnel,
            Self::ProcessGroup(_)       => ComponentKind::ProcessGroup,
        }
    }

    pub fn id(&self) -> &'a str {
        match *self {
            Self::Processor(p)                       => &p.id,
            Self::Connection(c)                      => &c.id,
            Self::RemoteProcessGroup(r)              => &r.id,
            Self::InputPort(p) | Self::OutputPort(p) => &p.id,
            Self::Funnel(f)                          => &f.id,
            Self::ProcessGroup(g)                    => &g.id,
        }
    }
}
