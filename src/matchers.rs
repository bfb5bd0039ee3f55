use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::component::{
    Component, Connectable, Connection, Funnel, Port, ProcessGroup, ProcessorNode,
    RemoteProcessGroup, ScheduledState, SchedulingStrategy,
};
use crate::format::parse_data_size;
use crate::query::SearchQuery;
use crate::results::ComponentMatch;
use crate::traits::{DisplayFormat, FlowSource, SearchContext, Searchable};

/// Everything a matcher needs besides the component itself.
pub(crate) struct MatchContext<'a> {
    pub query:  &'a SearchQuery,
    pub flow:   &'a dyn FlowSource,
    pub format: &'a dyn DisplayFormat,
}

/// Evaluate one component. Returns `None` when nothing matched.
///
/// The returned match carries no group id except for process groups, which
/// report their parent; the engine tags everything else with the group it
/// found the component in.
pub(crate) fn evaluate(component: Component<'_>, ctx: &MatchContext<'_>) -> Option<ComponentMatch> {
    let kind = component.kind();
    let (name, group_id, matches) = match component {
        Component::ProcessGroup(g) => {
            // the root group is never reported
            if g.is_root() {
                return None;
            }
            (g.name.clone(), g.parent_id.clone(), match_group(g, ctx))
        }
        Component::Processor(p)          => (p.name.clone(), None, match_processor(p, ctx)),
        Component::Connection(c)         => (connection_name(c), None, match_connection(c, ctx)),
        Component::RemoteProcessGroup(r) => (r.name.clone(), None, match_remote_group(r, ctx)),
        Component::InputPort(p)          => (p.name.clone(), None, match_port(p, ctx)),
        Component::OutputPort(p)         => (p.name.clone(), None, match_port(p, ctx)),
        Component::Funnel(f)             => (f.name.clone(), None, match_funnel(f, ctx)),
    };

    if matches.is_empty() {
        return None;
    }

    Some(ComponentMatch {
        id: component.id().to_string(),
        name,
        group_id,
        matches,
        kind,
    })
}

// ---------------------------------------------------------------------------
// Explanation accumulator
// ---------------------------------------------------------------------------

struct Explanations<'q> {
    query: &'q SearchQuery,
    items: Vec<String>,
}

impl<'q> Explanations<'q> {
    fn new(query: &'q SearchQuery) -> Self {
        Self { query, items: Vec::new() }
    }

    /// Record `"<label>: <value>"` if the query is found in a non-empty value.
    fn field(&mut self, label: &str, value: &str) {
        if !value.is_empty() && self.query.found_in(value) {
            self.items.push(format!("{label}: {value}"));
        }
    }

    fn fields<'v>(&mut self, label: &str, values: impl IntoIterator<Item = &'v String>) {
        for value in values {
            self.field(label, value);
        }
    }

    fn push(&mut self, explanation: impl Into<String>) {
        self.items.push(explanation.into());
    }

    fn selects(&self, phrase: &str) -> bool {
        self.query.selects(phrase)
    }

    fn finish(self) -> Vec<String> {
        self.items
    }
}

/// At most one run-status explanation. Disabled shadows everything else,
/// and invalid shadows running/stopped.
fn run_status(out: &mut Explanations<'_>, state: ScheduledState, valid: bool) {
    if state == ScheduledState::Disabled {
        if out.selects("disabled") {
            out.push("Run status: Disabled");
        }
        return;
    }

    if out.selects("invalid") && !valid {
        out.push("Run status: Invalid");
    } else if state == ScheduledState::Running && out.selects("running") {
        out.push("Run status: Running");
    } else if state == ScheduledState::Stopped && out.selects("stopped") {
        out.push("Run status: Stopped");
    }
}

// ---------------------------------------------------------------------------
// Per-type matchers
// ---------------------------------------------------------------------------

fn match_group(group: &ProcessGroup, ctx: &MatchContext<'_>) -> Vec<String> {
    let mut out = Explanations::new(ctx.query);
    out.field("Id", &group.id);
    out.field("Name", &group.name);
    out.field("Comments", &group.comments);
    out.finish()
}

fn match_processor(node: &ProcessorNode, ctx: &MatchContext<'_>) -> Vec<String> {
    let mut out = Explanations::new(ctx.query);
    out.field("Id", &node.id);
    out.field("Name", &node.name);
    out.field("Comments", &node.comments);

    let strategy = match node.scheduling_strategy {
        SchedulingStrategy::EventDriven if out.selects("event")       => Some("Event driven"),
        SchedulingStrategy::TimerDriven if out.selects("timer")       => Some("Timer driven"),
        SchedulingStrategy::PrimaryNodeOnly if out.selects("primary") => Some("On primary node"),
        _ => None,
    };
    if let Some(strategy) = strategy {
        out.push(format!("Scheduling strategy: {strategy}"));
    }

    run_status(&mut out, node.scheduled_state, node.valid);

    out.fields("Relationship", &node.relationships);
    out.field("Type", &node.processor_type);

    for property in &node.properties {
        if let Some(value) = property.value.as_deref() {
            if !value.is_empty() && ctx.query.found_in(value) {
                out.push(format!("Property: {} - {}", property.name, value));
            }
        }
        out.field("Property", &property.name);
        out.field("Property", &property.description);
    }

    if let Some(searchable) = &node.searchable {
        let context = SearchContext {
            term:      ctx.query.as_str(),
            processor: node,
            flow:      ctx.flow,
        };
        for hit in search_extension(searchable.as_ref(), &context) {
            out.push(hit);
        }
    }

    out.finish()
}

/// Run a processor's own search inside its own span, containing any error
/// or panic. The span guard is released on every path out of this function.
fn search_extension(searchable: &dyn Searchable, context: &SearchContext<'_>) -> Vec<String> {
    let span = tracing::debug_span!("extension", processor = %context.processor.id);
    let _entered = span.enter();

    match panic::catch_unwind(AssertUnwindSafe(|| searchable.search(context))) {
        Ok(Ok(hits)) => hits
            .into_iter()
            .map(|hit| format!("{}: {}", hit.label, hit.matched))
            .collect(),
        Ok(Err(e)) => {
            tracing::warn!("processor search failed: processor={}, error={}", context.processor.id, e);
            Vec::new()
        }
        Err(payload) => {
            tracing::warn!(
                "processor search panicked: processor={}, reason={}",
                context.processor.id,
                panic_reason(payload.as_ref())
            );
            Vec::new()
        }
    }
}

/// Text of a panic payload; `panic!` produces a `&str` or a `String`.
fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}

fn match_connection(connection: &Connection, ctx: &MatchContext<'_>) -> Vec<String> {
    let mut out = Explanations::new(ctx.query);
    out.field("Id", &connection.id);
    out.field("Name", &connection.name);
    out.fields("Relationship", &connection.relationships);
    out.fields("Prioritizer", &connection.prioritizers);

    if out.selects("expires") || out.selects("expiration") {
        let expiration = connection.flow_file_expiration;
        if expiration.as_millis() > 0 {
            out.push(format!("FlowFile expiration: {}", ctx.format.format_duration(expiration)));
        }
    }

    if out.selects("back pressure") || out.selects("pressure") {
        let bytes = back_pressure_bytes(connection);
        if bytes > 0.0 {
            out.push(format!("Back pressure data size: {}", ctx.format.format_data_size(bytes)));
        }

        let count = connection.back_pressure_object_threshold;
        if count > 0 {
            out.push(format!("Back pressure count: {count}"));
        }
    }

    endpoint(&mut out, "Source", &connection.source);
    endpoint(&mut out, "Destination", &connection.destination);

    out.finish()
}

fn back_pressure_bytes(connection: &Connection) -> f64 {
    let threshold = connection.back_pressure_data_size.trim();
    if threshold.is_empty() {
        return 0.0;
    }
    match parse_data_size(threshold) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("ignoring back pressure threshold: connection={}, {}", connection.id, e);
            0.0
        }
    }
}

fn endpoint(out: &mut Explanations<'_>, side: &str, end: &Connectable) {
    out.field(&format!("{side} id"), &end.id);
    out.field(&format!("{side} name"), &end.name);
    out.field(&format!("{side} comments"), &end.comments);
}

fn match_port(port: &Port, ctx: &MatchContext<'_>) -> Vec<String> {
    let mut out = Explanations::new(ctx.query);
    out.field("Id", &port.id);
    out.field("Name", &port.name);
    out.field("Comments", &port.comments);

    run_status(&mut out, port.scheduled_state, port.valid);

    if let Some(access) = &port.access {
        out.fields("User access control", &access.user_access_control);
        out.fields("Group access control", &access.group_access_control);
    }

    out.finish()
}

fn match_remote_group(group: &RemoteProcessGroup, ctx: &MatchContext<'_>) -> Vec<String> {
    let mut out = Explanations::new(ctx.query);
    out.field("Id", &group.id);
    out.field("Name", &group.name);
    out.field("Comments", &group.comments);
    out.field("URL", group.target_uri.as_str());

    let on = out.selects("transmitting") || out.selects("transmission enabled");
    let off = out.selects("not transmitting") || out.selects("transmission disabled");
    if on && group.transmitting {
        out.push("Transmission: On");
    } else if off && !group.transmitting {
        out.push("Transmission: Off");
    }

    out.finish()
}

fn match_funnel(funnel: &Funnel, ctx: &MatchContext<'_>) -> Vec<String> {
    let mut out = Explanations::new(ctx.query);
    out.field("Id", &funnel.id);
    out.finish()
}

// ---------------------------------------------------------------------------
// Display names
// ---------------------------------------------------------------------------

/// Connections are usually unnamed, so fall back to their relationships and
/// then to where they come from.
pub fn connection_name(connection: &Connection) -> String {
    if !connection.name.trim().is_empty() {
        return connection.name.clone();
    }

    let relationships: Vec<&str> = connection
        .relationships
        .iter()
        .map(String::as_str)
        .filter(|r| !r.trim().is_empty())
        .collect();
    if !relationships.is_empty() {
        return relationships.join(", ");
    }

    format!("From source {}", connection.source.name)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::component::{PortAccess, Property};
    use crate::error::SearchError;
    use crate::format::StandardFormat;
    use crate::traits::SearchHit;

    struct NoFlow;

    impl FlowSource for NoFlow {
        fn root_group_id(&self) -> String {
            "root".into()
        }

        fn group(&self, _id: &str) -> Option<ProcessGroup> {
            None
        }
    }

    fn run(component: Component<'_>, term: &str) -> Option<ComponentMatch> {
        let query = SearchQuery::new(term);
        let ctx = MatchContext {
            query:  &query,
            flow:   &NoFlow,
            format: &StandardFormat,
        };
        evaluate(component, &ctx)
    }

    fn explanations(component: Component<'_>, term: &str) -> Vec<String> {
        run(component, term).map(|m| m.matches).unwrap_or_default()
    }

    fn processor() -> ProcessorNode {
        ProcessorNode {
            id: "p-1".into(),
            name: "ExtractText".into(),
            comments: "pulls values".into(),
            processor_type: "ExtractText".into(),
            valid: true,
            relationships: vec!["matched".into(), "unmatched".into()],
            ..ProcessorNode::default()
        }
    }

    fn port(state: ScheduledState, valid: bool) -> Port {
        Port {
            id: "port-1".into(),
            name: "ingest".into(),
            scheduled_state: state,
            valid,
            ..Port::default()
        }
    }

    #[test]
    fn processor_name_and_type_match() {
        let p = processor();
        let m = explanations(Component::Processor(&p), "extract");
        assert_eq!(m, vec!["Name: ExtractText", "Type: ExtractText"]);
    }

    #[test]
    fn processor_property_value_uses_property_form() {
        let mut p = processor();
        p.properties = vec![
            Property::new("Regex", "^id=(\\d+)").described("Pattern to apply"),
            Property { name: "Unset".into(), description: "never set".into(), value: None },
        ];

        let m = explanations(Component::Processor(&p), "id=");
        assert_eq!(m, vec!["Property: Regex - ^id=(\\d+)"]);

        let m = explanations(Component::Processor(&p), "pattern");
        assert_eq!(m, vec!["Property: Pattern to apply"]);

        let m = explanations(Component::Processor(&p), "set");
        assert_eq!(m, vec!["Property: Unset", "Property: never set"]);
    }

    #[test]
    fn scheduling_strategy_requires_matching_strategy() {
        let mut p = processor();
        p.scheduling_strategy = SchedulingStrategy::PrimaryNodeOnly;

        assert_eq!(
            explanations(Component::Processor(&p), "primary"),
            vec!["Scheduling strategy: On primary node"]
        );
        assert!(explanations(Component::Processor(&p), "timer").is_empty());
    }

    #[test]
    fn run_status_follows_scheduled_state() {
        let mut p = processor();
        p.scheduled_state = ScheduledState::Running;

        assert_eq!(explanations(Component::Processor(&p), "running"), vec!["Run status: Running"]);
        assert!(explanations(Component::Processor(&p), "stopped").is_empty());
    }

    #[test]
    fn invalid_shadows_stopped() {
        let p = port(ScheduledState::Stopped, false);
        assert_eq!(explanations(Component::InputPort(&p), "invalid"), vec!["Run status: Invalid"]);

        // the empty query selects every phrase, but only one status is reported
        let m = explanations(Component::InputPort(&p), "");
        let statuses: Vec<_> = m.iter().filter(|s| s.starts_with("Run status")).collect();
        assert_eq!(statuses, vec!["Run status: Invalid"]);
    }

    #[test]
    fn disabled_shadows_invalid() {
        let p = port(ScheduledState::Disabled, false);
        assert!(run(Component::OutputPort(&p), "invalid").is_none());
        assert_eq!(explanations(Component::OutputPort(&p), "disabled"), vec!["Run status: Disabled"]);
    }

    #[test]
    fn root_port_access_lists() {
        let mut p = port(ScheduledState::Running, true);
        p.access = Some(PortAccess {
            user_access_control:  vec!["alice".into(), "bob".into()],
            group_access_control: vec!["analysts".into()],
        });

        assert_eq!(
            explanations(Component::InputPort(&p), "al"),
            vec!["User access control: alice", "Group access control: analysts"]
        );
    }

    #[test]
    fn unnamed_connection_takes_relationship_names() {
        let c = Connection {
            id: "c-1".into(),
            relationships: vec!["success".into(), " ".into(), "failure".into()],
            ..Connection::default()
        };
        let m = run(Component::Connection(&c), "fail").unwrap();
        assert_eq!(m.name, "success, failure");
        assert_eq!(m.matches, vec!["Relationship: failure"]);
    }

    #[test]
    fn connection_name_falls_back_to_source() {
        let c = Connection {
            id: "c-2".into(),
            source: Connectable::new("p-1", "ExtractText"),
            ..Connection::default()
        };
        assert_eq!(connection_name(&c), "From source ExtractText");

        let named = Connection { name: "to sink".into(), ..c };
        assert_eq!(connection_name(&named), "to sink");
    }

    #[test]
    fn back_pressure_reports_each_threshold_independently() {
        let c = Connection {
            id: "c-3".into(),
            back_pressure_data_size: "0 MB".into(),
            back_pressure_object_threshold: 500,
            ..Connection::default()
        };
        assert_eq!(explanations(Component::Connection(&c), "pressure"), vec!["Back pressure count: 500"]);

        let c = Connection {
            back_pressure_data_size: "1 GB".into(),
            back_pressure_object_threshold: 0,
            ..c
        };
        assert_eq!(
            explanations(Component::Connection(&c), "back pressure"),
            vec!["Back pressure data size: 1 GB"]
        );
    }

    #[test]
    fn unparseable_threshold_is_ignored() {
        let c = Connection {
            id: "c-4".into(),
            back_pressure_data_size: "a lot".into(),
            ..Connection::default()
        };
        assert!(run(Component::Connection(&c), "pressure").is_none());
    }

    #[test]
    fn expiration_only_when_set() {
        let mut c = Connection { id: "c-5".into(), ..Connection::default() };
        assert!(run(Component::Connection(&c), "expir").is_none());

        c.flow_file_expiration = Duration::from_secs(300);
        assert_eq!(explanations(Component::Connection(&c), "expir"), vec!["FlowFile expiration: 5 mins"]);
    }

    #[test]
    fn connection_endpoints_are_labelled() {
        let c = Connection {
            id: "c-6".into(),
            source: Connectable::new("p-1", "ExtractText"),
            destination: Connectable {
                id: "p-2".into(),
                name: "PutFile".into(),
                comments: "writes extracted text".into(),
            },
            ..Connection::default()
        };
        assert_eq!(
            explanations(Component::Connection(&c), "extract"),
            vec!["Source name: ExtractText", "Destination comments: writes extracted text"]
        );
    }

    #[test]
    fn remote_group_transmission() {
        let mut r = RemoteProcessGroup {
            id: "r-1".into(),
            name: "east".into(),
            comments: String::new(),
            target_uri: "https://east.example.com:8443/nifi".parse().unwrap(),
            transmitting: true,
        };
        assert_eq!(explanations(Component::RemoteProcessGroup(&r), "transmitting"), vec!["Transmission: On"]);
        assert!(run(Component::RemoteProcessGroup(&r), "not transmitting").is_none());

        r.transmitting = false;
        assert_eq!(explanations(Component::RemoteProcessGroup(&r), "not transmitting"), vec!["Transmission: Off"]);
        assert_eq!(
            explanations(Component::RemoteProcessGroup(&r), "example.com"),
            vec!["URL: https://east.example.com:8443/nifi"]
        );
    }

    #[test]
    fn funnel_matches_id_only() {
        let f = Funnel { id: "funnel-9".into(), name: "merge".into() };
        assert!(run(Component::Funnel(&f), "merge").is_none());
        let m = run(Component::Funnel(&f), "funnel").unwrap();
        assert_eq!(m.name, "merge");
        assert_eq!(m.matches, vec!["Id: funnel-9"]);
    }

    #[test]
    fn root_group_is_never_reported() {
        let root = ProcessGroup::root("root", "Everything");
        assert!(run(Component::ProcessGroup(&root), "every").is_none());

        let child = ProcessGroup::child_of("root", "g-1", "Everything else");
        let m = run(Component::ProcessGroup(&child), "every").unwrap();
        assert_eq!(m.group_id.as_deref(), Some("root"));
        assert_eq!(m.matches, vec!["Name: Everything else"]);
    }

    #[test]
    fn empty_values_are_not_reported() {
        let f = Funnel { id: "f-1".into(), name: String::new() };
        let g = ProcessGroup::child_of("root", "g-2", "");
        assert_eq!(explanations(Component::Funnel(&f), ""), vec!["Id: f-1"]);
        assert_eq!(explanations(Component::ProcessGroup(&g), ""), vec!["Id: g-2"]);
    }

    struct Lookup;

    impl Searchable for Lookup {
        fn search(&self, context: &SearchContext<'_>) -> Result<Vec<SearchHit>, SearchError> {
            match context.property("Dictionary") {
                Some(dict) if dict.contains(context.term) => Ok(vec![SearchHit::new("Dictionary entry", dict)]),
                _ => Ok(Vec::new()),
            }
        }
    }

    struct Failing;

    impl Searchable for Failing {
        fn search(&self, _context: &SearchContext<'_>) -> Result<Vec<SearchHit>, SearchError> {
            Err(SearchError::Extension("index unavailable".into()))
        }
    }

    struct Panicking;

    impl Searchable for Panicking {
        fn search(&self, _context: &SearchContext<'_>) -> Result<Vec<SearchHit>, SearchError> {
            panic!("extension bug")
        }
    }

    #[test]
    fn extension_hits_are_appended() {
        let mut p = processor();
        p.properties = vec![Property::new("Dictionary", "colors")];
        p.searchable = Some(Arc::new(Lookup));

        assert_eq!(
            explanations(Component::Processor(&p), "colors"),
            vec!["Property: Dictionary - colors", "Dictionary entry: colors"]
        );
    }

    #[test]
    fn extension_failures_contribute_nothing() {
        let mut p = processor();
        p.searchable = Some(Arc::new(Failing));
        assert_eq!(explanations(Component::Processor(&p), "extract"), vec!["Name: ExtractText", "Type: ExtractText"]);

        p.searchable = Some(Arc::new(Panicking));
        assert_eq!(explanations(Component::Processor(&p), "extract"), vec!["Name: ExtractText", "Type: ExtractText"]);
    }

    #[test]
    fn timer_and_event_strategies_match() {
        let p = processor();
        assert_eq!(
            explanations(Component::Processor(&p), "timer"),
            vec!["Scheduling strategy: Timer driven"]
        );

        let mut p = processor();
        p.scheduling_strategy = SchedulingStrategy::EventDriven;
        assert_eq!(
            explanations(Component::Processor(&p), "Event"),
            vec!["Scheduling strategy: Event driven"]
        );
        assert!(run(Component::Processor(&p), "timer").is_none());
    }

    #[test]
    fn comments_are_labelled() {
        let p = processor();
        assert_eq!(explanations(Component::Processor(&p), "values"), vec!["Comments: pulls values"]);

        let mut g = ProcessGroup::child_of("root", "g-3", "Nightly");
        g.comments = "batch jobs".into();
        assert_eq!(explanations(Component::ProcessGroup(&g), "batch"), vec!["Comments: batch jobs"]);

        let mut input = port(ScheduledState::Running, true);
        input.comments = "from partners".into();
        assert_eq!(explanations(Component::InputPort(&input), "partner"), vec!["Comments: from partners"]);

        let r = RemoteProcessGroup {
            id: "r-2".into(),
            name: "east".into(),
            comments: "coastal datacenter".into(),
            target_uri: "https://east.example.com:8443/nifi".parse().unwrap(),
            transmitting: false,
        };
        assert_eq!(
            explanations(Component::RemoteProcessGroup(&r), "coastal"),
            vec!["Comments: coastal datacenter"]
        );
    }

    #[test]
    fn prioritizers_are_searched_by_type_name() {
        let c = Connection {
            id: "c-7".into(),
            prioritizers: vec![
                "org.apache.nifi.prioritizer.FirstInFirstOutPrioritizer".into(),
                "org.apache.nifi.prioritizer.OldestFlowFileFirstPrioritizer".into(),
            ],
            ..Connection::default()
        };
        assert_eq!(
            explanations(Component::Connection(&c), "oldestflowfile"),
            vec!["Prioritizer: org.apache.nifi.prioritizer.OldestFlowFileFirstPrioritizer"]
        );
        assert_eq!(explanations(Component::Connection(&c), "prioritizer.").len(), 2);
    }

    struct Annotated;

    impl Searchable for Annotated {
        fn search(&self, context: &SearchContext<'_>) -> Result<Vec<SearchHit>, SearchError> {
            Ok(context
                .annotation_data()
                .filter(|a| a.contains(context.term))
                .map(|_| SearchHit::new("Annotation", context.term))
                .into_iter()
                .collect())
        }
    }

    #[test]
    fn extension_sees_annotation_data() {
        let mut p = processor();
        p.searchable = Some(Arc::new(Annotated));
        assert!(run(Component::Processor(&p), "drop-nulls").is_none());

        p.annotation_data = Some("<rules><rule>drop-nulls</rule></rules>".into());
        assert_eq!(explanations(Component::Processor(&p), "drop-nulls"), vec!["Annotation: drop-nulls"]);
    }

    #[test]
    fn panic_reason_reads_message() {
        let payload = panic::catch_unwind(|| panic!("index missing")).unwrap_err();
        assert_eq!(panic_reason(payload.as_ref()), "index missing");

        let payload = panic::catch_unwind(|| panic!("shard {} missing", 7)).unwrap_err();
        assert_eq!(panic_reason(payload.as_ref()), "shard 7 missing");

        let payload = panic::catch_unwind(|| panic::panic_any(42_u8)).unwrap_err();
        assert_eq!(panic_reason(payload.as_ref()), "unknown panic payload");
    }
}
