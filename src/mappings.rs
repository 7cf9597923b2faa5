//! Routing table construction.
//!
//! Runs once per namespace after every component in that namespace has been
//! normalized. Edges never cross namespace boundaries, and neither disabled
//! sources nor disabled consumers ever receive one.

use std::collections::BTreeMap;

use tracing::debug;

use crate::component::Component;

/// Adds this namespace's edges to the shared mappings table.
///
/// Every enabled data source (poller, iHealth poller, listener) maps to all
/// enabled push consumers of the namespace in declaration order; each
/// enabled pull consumer group maps 1:1 onto its consumer. A namespace with
/// zero enabled consumers contributes no keys at all.
pub fn build_namespace_mappings(
    namespace: &str,
    components: &[Component],
    mappings: &mut BTreeMap<String, Vec<String>>
) {
    let in_namespace =
        |component: &&Component| component.namespace() == namespace && component.enable();

    let consumer_ids: Vec<String> = components
        .iter()
        .filter(in_namespace)
        .filter_map(|component| match component {
            Component::Consumer(consumer) => Some(consumer.id.clone()),
            _ => None
        })
        .collect();

    if !consumer_ids.is_empty() {
        for source in components
            .iter()
            .filter(in_namespace)
            .filter(|component| component.is_data_source())
        {
            mappings.insert(source.id().to_owned(), consumer_ids.clone());
        }
    }

    for component in components.iter().filter(in_namespace) {
        if let Component::PullConsumerGroup(group) = component {
            mappings.insert(group.id.clone(), vec![group.pull_consumer.clone()]);
        }
    }

    debug!(
        "namespace '{}' mapped {} consumer(s)",
        namespace,
        consumer_ids.len()
    );
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{
        component::Component,
        consumer::{build_poller_group, normalize_consumer, normalize_pull_consumer},
        declaration::{Declaration, Node},
        listener::normalize_listener
    };

    use super::build_namespace_mappings;

    fn fixture_components() -> Vec<Component> {
        let declaration: Declaration = serde_yaml::from_str(
            r#"
            My_Listener:
              class: Telemetry_Listener
            Disabled_Listener:
              class: Telemetry_Listener
              enable: false
            First_Consumer:
              class: Telemetry_Consumer
              type: default
            Second_Consumer:
              class: Telemetry_Consumer
              type: default
            Disabled_Consumer:
              class: Telemetry_Consumer
              enable: false
              type: default
            Other_Listener:
              class: Telemetry_Listener
            "#
        )
        .expect("declaration should deserialize");

        let mut components = Vec::new();
        for (name, node) in declaration.entries.iter() {
            match node {
                Node::Listener(decl) => {
                    let namespace =
                        if name == "Other_Listener" { "Other" } else { "f5telemetry_default" };
                    components
                        .push(Component::Listener(normalize_listener(decl, name, namespace)));
                }
                Node::Consumer(decl) => {
                    components.push(Component::Consumer(normalize_consumer(
                        decl,
                        name,
                        "f5telemetry_default"
                    )));
                }
                _ => {}
            }
        }
        components
    }

    #[test]
    fn maps_enabled_sources_to_consumers_in_declaration_order() {
        let components = fixture_components();
        let mut mappings = BTreeMap::new();
        build_namespace_mappings("f5telemetry_default", &components, &mut mappings);

        let edges = mappings
            .get("f5telemetry_default::My_Listener")
            .expect("listener should be mapped");
        assert_eq!(
            edges,
            &["f5telemetry_default::First_Consumer", "f5telemetry_default::Second_Consumer"]
        );
    }

    #[test]
    fn skips_disabled_sources_and_consumers() {
        let components = fixture_components();
        let mut mappings = BTreeMap::new();
        build_namespace_mappings("f5telemetry_default", &components, &mut mappings);

        assert!(!mappings.contains_key("f5telemetry_default::Disabled_Listener"));
        for edges in mappings.values() {
            assert!(!edges.iter().any(|id| id.contains("Disabled_Consumer")));
        }
    }

    #[test]
    fn never_crosses_namespace_boundaries() {
        let components = fixture_components();
        let mut mappings = BTreeMap::new();
        build_namespace_mappings("Other", &components, &mut mappings);

        // "Other" has a listener but zero consumers, so zero edges.
        assert!(mappings.is_empty());
    }

    #[test]
    fn pull_consumer_groups_map_onto_their_consumer() {
        let declaration: Declaration = serde_yaml::from_str(
            r#"
            My_Pull_Consumer:
              class: Telemetry_Pull_Consumer
              type: default
              systemPoller: Poller_1
            "#
        )
        .expect("declaration should deserialize");
        let Some(Node::PullConsumer(decl)) = declaration.entries.get("My_Pull_Consumer") else {
            panic!("expected pull consumer");
        };

        let consumer = normalize_pull_consumer(
            decl,
            "My_Pull_Consumer",
            "f5telemetry_default",
            vec!["Poller_1".to_owned()]
        );
        let group = build_poller_group(
            &consumer,
            vec!["f5telemetry_default::Poller_1::Poller_1".to_owned()]
        );
        let components =
            vec![Component::PullConsumer(consumer), Component::PullConsumerGroup(group)];

        let mut mappings = BTreeMap::new();
        build_namespace_mappings("f5telemetry_default", &components, &mut mappings);

        let key = "f5telemetry_default::Telemetry_Pull_Consumer_System_Poller_Group_My_Pull_Consumer";
        assert_eq!(
            mappings.get(key),
            Some(&vec!["f5telemetry_default::My_Pull_Consumer".to_owned()])
        );
    }
}
