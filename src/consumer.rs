//! Normalization of `Telemetry_Consumer` and `Telemetry_Pull_Consumer`
//! definitions, including the synthesized poller group that binds a pull
//! consumer to the set of pollers it can fetch from.

use serde_json::{Value, json};

use crate::{
    component::{
        ComponentClass, ConsumerComponent, PullConsumerComponent, PullConsumerGroupComponent,
        Secret, TraceConfig
    },
    declaration::{
        CLASS_CONSUMER, CLASS_PULL_CONSUMER, CLASS_PULL_CONSUMER_GROUP, ConsumerDecl,
        DeclarationMap, Node, PullConsumerDecl, TraceType
    },
    ident
};

/// Default trace record cap for consumers.
const DEFAULT_TRACE_RECORDS: u32 = 10;
/// Consumer type that may require legacy TMStats tables.
const SPLUNK_TYPE: &str = "Splunk";
/// Splunk format that requires legacy TMStats tables.
const SPLUNK_LEGACY_FORMAT: &str = "legacy";

/// Returns `true` when an enabled Splunk legacy-format consumer exists in
/// the namespace, which turns TMStats collection on for every poller there.
pub fn namespace_requires_tmstats(entries: &DeclarationMap) -> bool {
    entries.iter().any(|(_, node)| match node {
        Node::Consumer(consumer) => {
            consumer.enable.unwrap_or(true)
                && consumer.consumer_type == SPLUNK_TYPE
                && consumer
                    .extra
                    .get("format")
                    .and_then(Value::as_str)
                    .is_some_and(|format| format == SPLUNK_LEGACY_FORMAT)
        }
        _ => false
    })
}

/// Normalizes one push consumer declaration.
pub fn normalize_consumer(decl: &ConsumerDecl, name: &str, namespace: &str) -> ConsumerComponent {
    let id = ident::component_id(namespace, None, name);
    let trace = TraceConfig::resolve(
        decl.trace.as_ref(),
        CLASS_CONSUMER,
        &id,
        TraceType::Output,
        DEFAULT_TRACE_RECORDS
    );

    let mut extra = decl.extra.clone();
    if decl.consumer_type == SPLUNK_TYPE
        && extra
            .get("format")
            .and_then(Value::as_str)
            .is_some_and(|format| format == SPLUNK_LEGACY_FORMAT)
    {
        // Legacy Splunk presets; explicit values win.
        extra.entry("port".to_owned()).or_insert_with(|| json!(8088));
        extra.entry("protocol".to_owned()).or_insert_with(|| json!("https"));
        extra
            .entry("compressionType".to_owned())
            .or_insert_with(|| json!("gzip"));
    }

    ConsumerComponent {
        class: ComponentClass::Consumer,
        trace_name: id.clone(),
        id,
        name: name.to_owned(),
        namespace: namespace.to_owned(),
        enable: decl.enable.unwrap_or(true),
        trace,
        consumer_type: decl.consumer_type.clone(),
        allow_self_signed_cert: decl.allow_self_signed_cert.unwrap_or(false),
        passphrase: decl.passphrase.as_ref().map(Secret::protect),
        extra
    }
}

/// Normalizes one pull consumer declaration.
///
/// `poller_names` is the resolved, deduplicated list of poller names the
/// walker gathered from the consumer's `systemPoller` field.
pub fn normalize_pull_consumer(
    decl: &PullConsumerDecl,
    name: &str,
    namespace: &str,
    poller_names: Vec<String>
) -> PullConsumerComponent {
    let id = ident::component_id(namespace, None, name);
    let trace = TraceConfig::resolve(
        decl.trace.as_ref(),
        CLASS_PULL_CONSUMER,
        &id,
        TraceType::Output,
        DEFAULT_TRACE_RECORDS
    );

    PullConsumerComponent {
        class: ComponentClass::PullConsumer,
        trace_name: id.clone(),
        id,
        name: name.to_owned(),
        namespace: namespace.to_owned(),
        enable: decl.enable.unwrap_or(true),
        trace,
        consumer_type: decl.consumer_type.clone(),
        allow_self_signed_cert: decl.allow_self_signed_cert.unwrap_or(false),
        passphrase: decl.passphrase.as_ref().map(Secret::protect),
        system_poller: poller_names,
        extra: decl.extra.clone()
    }
}

/// Synthesizes the poller group component backing a pull consumer.
///
/// The group inherits the consumer's `enable` state and lists the resolved
/// poller component ids, deduplicated and order preserving.
pub fn build_poller_group(
    consumer: &PullConsumerComponent,
    poller_ids: Vec<String>
) -> PullConsumerGroupComponent {
    let name = format!("Telemetry_Pull_Consumer_System_Poller_Group_{}", consumer.name);
    let id = ident::component_id(&consumer.namespace, None, &name);
    let trace = TraceConfig::resolve(
        None,
        CLASS_PULL_CONSUMER_GROUP,
        &id,
        TraceType::Output,
        DEFAULT_TRACE_RECORDS
    );

    PullConsumerGroupComponent {
        class: ComponentClass::PullConsumerGroup,
        trace_name: id.clone(),
        id,
        name,
        namespace: consumer.namespace.clone(),
        enable: consumer.enable,
        trace,
        pull_consumer: consumer.id.clone(),
        system_pollers: poller_ids
    }
}
