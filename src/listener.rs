//! Normalization of `Telemetry_Listener` definitions.

use serde_json::json;

use crate::{
    component::{ComponentClass, ListenerComponent, TraceConfig},
    declaration::{CLASS_LISTENER, ListenerDecl, TraceType},
    ident,
    poller::default_actions
};

/// Default port listeners bind.
pub const DEFAULT_PORT: u16 = 6514;
/// Default record cap for the output trace.
const OUTPUT_TRACE_RECORDS: u32 = 10;
/// Default record cap for the input trace.
const INPUT_TRACE_RECORDS: u32 = 9999;

/// Normalizes one listener declaration.
///
/// Listeners carry two trace configurations: one for raw incoming events
/// (`traceInput`) and one for normalized outgoing data (`trace`). Both
/// resolve from the same authored `trace` value, selected by direction.
pub fn normalize_listener(decl: &ListenerDecl, name: &str, namespace: &str) -> ListenerComponent {
    let id = ident::component_id(namespace, None, name);

    let trace = TraceConfig::resolve(
        decl.trace.as_ref(),
        CLASS_LISTENER,
        &id,
        TraceType::Output,
        OUTPUT_TRACE_RECORDS
    );
    let trace_input = TraceConfig::resolve(
        decl.trace.as_ref(),
        CLASS_LISTENER,
        &id,
        TraceType::Input,
        INPUT_TRACE_RECORDS
    );

    ListenerComponent {
        class: ComponentClass::Listener,
        trace_name: id.clone(),
        id,
        name: name.to_owned(),
        namespace: namespace.to_owned(),
        enable: decl.enable.unwrap_or(true),
        trace,
        trace_input,
        port: decl.port.unwrap_or(DEFAULT_PORT),
        match_filter: decl.match_filter.clone().unwrap_or_else(|| json!("")),
        tag: decl.tag.clone().unwrap_or_else(|| json!({})),
        actions: decl.actions.clone().unwrap_or_else(default_actions)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::declaration::{Declaration, Node};

    use super::normalize_listener;

    fn listener(yaml: &str, name: &str) -> super::ListenerComponent {
        let declaration: Declaration =
            serde_yaml::from_str(yaml).expect("declaration should deserialize");
        let Some(Node::Listener(decl)) = declaration.entries.get(name) else {
            panic!("expected listener {name}");
        };
        normalize_listener(decl, name, "f5telemetry_default")
    }

    #[test]
    fn applies_defaults() {
        let component = listener(
            r#"
            My_Listener:
              class: Telemetry_Listener
            "#,
            "My_Listener"
        );

        assert_eq!(component.id, "f5telemetry_default::My_Listener");
        assert_eq!(component.port, 6514);
        assert!(component.enable);
        assert_eq!(component.match_filter, json!(""));
        assert_eq!(component.tag, json!({}));
        assert_eq!(component.actions.len(), 1);
        assert!(component.actions[0].get("setTag").is_some());
    }

    #[test]
    fn dual_trace_paths_and_record_caps() {
        let component = listener(
            r#"
            My_Listener:
              class: Telemetry_Listener
              trace: true
            "#,
            "My_Listener"
        );

        assert!(component.trace.enable);
        assert_eq!(
            component.trace.path,
            "/var/tmp/telemetry/Telemetry_Listener.f5telemetry_default::My_Listener"
        );
        assert_eq!(component.trace.max_records, 10);

        assert!(!component.trace_input.enable);
        assert_eq!(
            component.trace_input.path,
            "/var/tmp/telemetry/INPUT.Telemetry_Listener.f5telemetry_default::My_Listener"
        );
        assert_eq!(component.trace_input.max_records, 9999);
    }

    #[test]
    fn input_trace_enabled_through_typed_object() {
        let component = listener(
            r#"
            My_Listener:
              class: Telemetry_Listener
              trace:
                - type: input
                - type: output
            "#,
            "My_Listener"
        );

        assert!(component.trace.enable);
        assert!(component.trace_input.enable);
    }

    #[test]
    fn custom_actions_replace_default() {
        let component = listener(
            r#"
            My_Listener:
              class: Telemetry_Listener
              match: bigip-hostname
              actions:
                - enable: true
                  excludeData: {}
                  locations:
                    system: true
            "#,
            "My_Listener"
        );

        assert_eq!(component.match_filter, json!("bigip-hostname"));
        assert_eq!(component.actions.len(), 1);
        assert!(component.actions[0].get("excludeData").is_some());
    }
}
