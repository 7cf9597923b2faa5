//! Declaration document types describing the user-authored telemetry tree.
//!
//! The types in this module mirror the structure of the JSON/YAML documents
//! accepted by the normalizer. The declaration is assumed to have passed
//! schema validation before it arrives here, so optional values stay
//! flexible and unknown metadata keys (schema version, controls blocks) are
//! ignored rather than rejected.

use std::{collections::BTreeMap, fmt};

use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor}
};
use serde_json::Value;

/// Declaration class string for systems.
pub const CLASS_SYSTEM: &str = "Telemetry_System";
/// Declaration class string for system pollers.
pub const CLASS_SYSTEM_POLLER: &str = "Telemetry_System_Poller";
/// Declaration class string for iHealth pollers.
pub const CLASS_IHEALTH_POLLER: &str = "Telemetry_iHealth_Poller";
/// Declaration class string for event listeners.
pub const CLASS_LISTENER: &str = "Telemetry_Listener";
/// Declaration class string for push consumers.
pub const CLASS_CONSUMER: &str = "Telemetry_Consumer";
/// Declaration class string for pull consumers.
pub const CLASS_PULL_CONSUMER: &str = "Telemetry_Pull_Consumer";
/// Declaration class string for endpoint collections.
pub const CLASS_ENDPOINTS: &str = "Telemetry_Endpoints";
/// Declaration class string for namespace containers.
pub const CLASS_NAMESPACE: &str = "Telemetry_Namespace";
/// Class string of synthesized pull consumer poller groups.
pub const CLASS_PULL_CONSUMER_GROUP: &str = "Telemetry_Pull_Consumer_System_Poller_Group";

const KNOWN_CLASSES: [&str; 8] = [
    CLASS_SYSTEM,
    CLASS_SYSTEM_POLLER,
    CLASS_IHEALTH_POLLER,
    CLASS_LISTENER,
    CLASS_CONSUMER,
    CLASS_PULL_CONSUMER,
    CLASS_ENDPOINTS,
    CLASS_NAMESPACE
];

/// Root declaration document.
///
/// Top-level keys are either `Telemetry_Namespace` containers or components
/// implicitly owned by the default namespace. Metadata keys such as `class`
/// or `schemaVersion` are skipped during deserialization.
///
/// # Examples
///
/// ```
/// use telnorm::Declaration;
///
/// let yaml = r#"
/// class: Telemetry
/// My_Listener:
///   class: Telemetry_Listener
///   port: 6515
/// "#;
/// let declaration: Declaration = serde_yaml::from_str(yaml).expect("valid declaration");
/// assert_eq!(declaration.entries.len(), 1);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Declaration {
    /// Named declaration nodes in authoring order.
    #[serde(flatten)]
    pub entries: DeclarationMap
}

/// Insertion-ordered map of declaration nodes keyed by object name.
///
/// Standard map types would either reorder entries (`BTreeMap`) or iterate
/// nondeterministically (`HashMap`); authoring order drives namespace
/// iteration, anonymous poller numbering, and mapping order, so entries are
/// kept in a vector in the order they were declared.
#[derive(Debug, Clone, Default)]
pub struct DeclarationMap {
    entries: Vec<(String, Node)>
}

impl DeclarationMap {
    /// Looks up a node by its declared name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, node)| node)
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of nodes in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the map holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for DeclarationMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>
    {
        struct DeclarationMapVisitor;

        impl<'de> Visitor<'de> for DeclarationMapVisitor {
            type Value = DeclarationMap;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of named declaration objects")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>
            {
                let mut entries = Vec::new();
                while let Some((name, value)) =
                    access.next_entry::<String, serde_yaml::Value>()?
                {
                    if !is_component_value(&value) {
                        // Metadata such as `class: Telemetry` or controls blocks.
                        continue;
                    }
                    let node: Node =
                        serde_yaml::from_value(value).map_err(de::Error::custom)?;
                    entries.push((name, node));
                }
                Ok(DeclarationMap {
                    entries
                })
            }
        }

        deserializer.deserialize_map(DeclarationMapVisitor)
    }
}

/// Returns `true` when the raw value is a mapping tagged with a class string
/// this normalizer understands.
fn is_component_value(value: &serde_yaml::Value) -> bool {
    value
        .as_mapping()
        .and_then(|mapping| mapping.get("class"))
        .and_then(serde_yaml::Value::as_str)
        .is_some_and(|class| KNOWN_CLASSES.contains(&class))
}

/// A single declaration node, dispatched on its `class` string.
///
/// The enum is closed: adding a declaration class forces every match in the
/// normalizer to handle it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "class")]
pub enum Node {
    /// `Telemetry_System` declaration.
    #[serde(rename = "Telemetry_System")]
    System(SystemDecl),
    /// `Telemetry_System_Poller` declaration.
    #[serde(rename = "Telemetry_System_Poller")]
    SystemPoller(SystemPollerDecl),
    /// `Telemetry_iHealth_Poller` declaration.
    #[serde(rename = "Telemetry_iHealth_Poller")]
    IHealthPoller(IHealthPollerDecl),
    /// `Telemetry_Listener` declaration.
    #[serde(rename = "Telemetry_Listener")]
    Listener(ListenerDecl),
    /// `Telemetry_Consumer` declaration.
    #[serde(rename = "Telemetry_Consumer")]
    Consumer(ConsumerDecl),
    /// `Telemetry_Pull_Consumer` declaration.
    #[serde(rename = "Telemetry_Pull_Consumer")]
    PullConsumer(PullConsumerDecl),
    /// `Telemetry_Endpoints` declaration.
    #[serde(rename = "Telemetry_Endpoints")]
    Endpoints(EndpointsDecl),
    /// `Telemetry_Namespace` container.
    #[serde(rename = "Telemetry_Namespace")]
    Namespace(NamespaceDecl),
}

impl Node {
    /// Declaration class string of the node.
    pub fn class(&self) -> &'static str {
        match self {
            Self::System(_) => CLASS_SYSTEM,
            Self::SystemPoller(_) => CLASS_SYSTEM_POLLER,
            Self::IHealthPoller(_) => CLASS_IHEALTH_POLLER,
            Self::Listener(_) => CLASS_LISTENER,
            Self::Consumer(_) => CLASS_CONSUMER,
            Self::PullConsumer(_) => CLASS_PULL_CONSUMER,
            Self::Endpoints(_) => CLASS_ENDPOINTS,
            Self::Namespace(_) => CLASS_NAMESPACE
        }
    }
}

/// Connection protocol accepted by systems, pollers, and proxies.
#[derive(Debug, Deserialize, serde::Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https
}

/// Trace setting as authored: a switch, a path, a config object, or a list
/// of per-direction config objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TraceSpec {
    /// `trace: true` / `trace: false`.
    Enable(bool),
    /// `trace: /custom/path` enables tracing to the given file.
    Path(String),
    /// Single trace configuration object.
    Config(TraceObjectSpec),
    /// Multiple trace configuration objects selected by `type`.
    Many(Vec<TraceObjectSpec>)
}

/// Trace configuration object as authored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceObjectSpec {
    /// Trace direction this object applies to (`output` or `input`).
    #[serde(default, rename = "type")]
    pub trace_type: Option<TraceType>,
    /// Custom trace file path.
    #[serde(default)]
    pub path: Option<String>,
    /// Maximum number of records kept in the trace file.
    #[serde(default)]
    pub max_records: Option<u32>,
    /// Record encoding.
    #[serde(default)]
    pub encoding: Option<String>
}

/// Direction selector for trace configuration objects.
#[derive(Debug, Deserialize, serde::Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    /// Data leaving the component.
    Output,
    /// Data entering the component.
    Input
}

/// Secret value as authored: plaintext string or a `Secret` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SecretSpec {
    /// Plaintext passphrase awaiting protection.
    Plain(String),
    /// Structured secret, possibly already protected.
    Object(SecretObjectSpec)
}

/// Structured secret object as authored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretObjectSpec {
    /// Protection marker (`SecureVault` or `plainText`).
    #[serde(default)]
    pub protected: Option<String>,
    /// Secret material; protected values carry the `$M$` prefix.
    #[serde(default)]
    pub cipher_text: Option<String>,
    /// Alternative source: read the secret from an environment variable.
    #[serde(default)]
    pub environment_var: Option<String>
}

/// `Telemetry_System` declaration body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDecl {
    /// Whether the system's pollers run at all.
    #[serde(default)]
    pub enable: Option<bool>,
    /// Trace override inherited by referenced pollers.
    #[serde(default)]
    pub trace: Option<TraceSpec>,
    /// Target host.
    #[serde(default)]
    pub host: Option<String>,
    /// Target port.
    #[serde(default)]
    pub port: Option<u16>,
    /// Connection protocol.
    #[serde(default)]
    pub protocol: Option<Protocol>,
    /// Whether self-signed certificates are accepted.
    #[serde(default)]
    pub allow_self_signed_cert: Option<bool>,
    /// Username for authenticated collection.
    #[serde(default)]
    pub username: Option<String>,
    /// Passphrase for authenticated collection.
    #[serde(default)]
    pub passphrase: Option<SecretSpec>,
    /// Pollers owned by this system: references or inline definitions.
    #[serde(default)]
    pub system_poller: Option<PollerRefs>,
    /// iHealth poller owned by this system.
    #[serde(default, rename = "iHealthPoller")]
    pub ihealth_poller: Option<IHealthRef>
}

/// `systemPoller` field of a system: one entry or a list of entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PollerRefs {
    /// Single reference or inline definition.
    One(PollerRef),
    /// Ordered list mixing references and inline definitions.
    Many(Vec<PollerRef>)
}

impl PollerRefs {
    /// Flattens the field into an ordered slice-like iterator.
    pub fn iter(&self) -> impl Iterator<Item = &PollerRef> {
        match self {
            Self::One(reference) => std::slice::from_ref(reference).iter(),
            Self::Many(references) => references.iter()
        }
    }
}

/// A single `systemPoller` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PollerRef {
    /// Reference to a named `Telemetry_System_Poller`.
    Name(String),
    /// Inline anonymous poller definition.
    Inline(SystemPollerDecl)
}

/// `iHealthPoller` field of a system.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IHealthRef {
    /// Reference to a named `Telemetry_iHealth_Poller`.
    Name(String),
    /// Inline anonymous iHealth poller definition.
    Inline(IHealthPollerDecl)
}

/// `Telemetry_System_Poller` declaration body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPollerDecl {
    /// Whether this poller runs.
    #[serde(default)]
    pub enable: Option<bool>,
    /// Trace configuration.
    #[serde(default)]
    pub trace: Option<TraceSpec>,
    /// Collection interval in seconds.
    #[serde(default)]
    pub interval: Option<u64>,
    /// Target host override.
    #[serde(default)]
    pub host: Option<String>,
    /// Target port override.
    #[serde(default)]
    pub port: Option<u16>,
    /// Connection protocol override.
    #[serde(default)]
    pub protocol: Option<Protocol>,
    /// Whether self-signed certificates are accepted.
    #[serde(default)]
    pub allow_self_signed_cert: Option<bool>,
    /// Username for authenticated collection.
    #[serde(default)]
    pub username: Option<String>,
    /// Passphrase for authenticated collection.
    #[serde(default)]
    pub passphrase: Option<SecretSpec>,
    /// Deprecated free-form tags copied into `dataOpts.tags`.
    #[serde(default)]
    pub tag: Option<Value>,
    /// Data actions replacing the default tagging action.
    #[serde(default)]
    pub actions: Option<Vec<Value>>,
    /// Custom endpoints collected instead of the default paths.
    #[serde(default)]
    pub endpoint_list: Option<EndpointListSpec>,
    /// Number of concurrent collection workers.
    #[serde(default)]
    pub workers: Option<u32>,
    /// Number of endpoints polled per worker batch.
    #[serde(default)]
    pub chunk_size: Option<u32>
}

/// `endpointList` field of a poller.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EndpointListSpec {
    /// Reference to a `Telemetry_Endpoints` object or one of its items.
    Reference(String),
    /// Inline endpoints group (`basePath` + `items`).
    Group(EndpointsDecl),
    /// Ordered list mixing references and inline endpoint objects.
    List(Vec<EndpointListItem>)
}

/// A single `endpointList` array entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EndpointListItem {
    /// Reference to a `Telemetry_Endpoints` object or one of its items.
    Reference(String),
    /// Inline endpoint definition.
    Inline(EndpointItemSpec)
}

/// `Telemetry_Endpoints` declaration body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointsDecl {
    /// Group-level switch; a disabled group contributes no endpoints.
    #[serde(default)]
    pub enable: Option<bool>,
    /// Path prefix composed onto every item path.
    #[serde(default)]
    pub base_path: Option<String>,
    /// Endpoint definitions keyed by name.
    pub items: BTreeMap<String, EndpointItemSpec>
}

/// Single endpoint definition as authored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointItemSpec {
    /// Endpoint name; defaults to its map key (or path for inline entries).
    #[serde(default)]
    pub name: Option<String>,
    /// Request path (HTTP) or OID (SNMP); defaults to the item name.
    #[serde(default)]
    pub path: Option<String>,
    /// Collection protocol for this endpoint.
    #[serde(default)]
    pub protocol: Option<EndpointProtocol>,
    /// Whether this endpoint is collected.
    #[serde(default)]
    pub enable: Option<bool>,
    /// SNMP only: resolve enum values to their numeric form.
    #[serde(default)]
    pub numerical_enums: Option<bool>
}

/// Protocol accepted by endpoint definitions.
#[derive(Debug, Deserialize, serde::Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndpointProtocol {
    /// Regular iControl REST path.
    Http,
    /// SNMP object identifier.
    Snmp
}

/// `Telemetry_iHealth_Poller` declaration body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IHealthPollerDecl {
    /// Whether this poller runs.
    #[serde(default)]
    pub enable: Option<bool>,
    /// Trace configuration.
    #[serde(default)]
    pub trace: Option<TraceSpec>,
    /// iHealth service username.
    #[serde(default)]
    pub username: Option<String>,
    /// iHealth service passphrase.
    #[serde(default)]
    pub passphrase: Option<SecretSpec>,
    /// Directory receiving downloaded qkview files.
    #[serde(default)]
    pub download_folder: Option<String>,
    /// Upload schedule.
    #[serde(default)]
    pub interval: Option<IHealthIntervalSpec>,
    /// Proxy used to reach the iHealth service.
    #[serde(default)]
    pub proxy: Option<ProxySpec>
}

/// Upload schedule of an iHealth poller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IHealthIntervalSpec {
    /// Schedule frequency (`daily`, `weekly`, `monthly`).
    #[serde(default)]
    pub frequency: Option<String>,
    /// Day selector for weekly/monthly schedules.
    #[serde(default)]
    pub day: Option<Value>,
    /// Daily execution window.
    #[serde(default)]
    pub time_window: Option<TimeWindowSpec>
}

/// Daily execution window boundaries.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq, Eq)]
pub struct TimeWindowSpec {
    /// Window start, `HH:MM`.
    pub start: String,
    /// Window end, `HH:MM`.
    pub end: String
}

/// Proxy configuration of an iHealth poller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySpec {
    /// Proxy host.
    pub host: String,
    /// Proxy port.
    #[serde(default)]
    pub port: Option<u16>,
    /// Proxy protocol.
    #[serde(default)]
    pub protocol: Option<Protocol>,
    /// Whether self-signed proxy certificates are accepted.
    #[serde(default)]
    pub allow_self_signed_cert: Option<bool>,
    /// Proxy username.
    #[serde(default)]
    pub username: Option<String>,
    /// Proxy passphrase.
    #[serde(default)]
    pub passphrase: Option<SecretSpec>
}

/// `Telemetry_Listener` declaration body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerDecl {
    /// Whether the listener accepts events.
    #[serde(default)]
    pub enable: Option<bool>,
    /// Trace configuration; may configure both directions.
    #[serde(default)]
    pub trace: Option<TraceSpec>,
    /// TCP/UDP port the listener binds.
    #[serde(default)]
    pub port: Option<u16>,
    /// Filter restricting which events are kept.
    #[serde(default, rename = "match")]
    pub match_filter: Option<Value>,
    /// Deprecated free-form tags.
    #[serde(default)]
    pub tag: Option<Value>,
    /// Data actions replacing the default tagging action.
    #[serde(default)]
    pub actions: Option<Vec<Value>>
}

/// `Telemetry_Consumer` declaration body.
///
/// Consumer types carry arbitrary plugin-specific options; everything beyond
/// the common fields is captured verbatim and passed through to the output.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerDecl {
    /// Whether the consumer receives data.
    #[serde(default)]
    pub enable: Option<bool>,
    /// Trace configuration.
    #[serde(default)]
    pub trace: Option<TraceSpec>,
    /// Consumer plugin type (`Splunk`, `Generic_HTTP`, ...).
    #[serde(rename = "type")]
    pub consumer_type: String,
    /// Whether self-signed certificates are accepted.
    #[serde(default)]
    pub allow_self_signed_cert: Option<bool>,
    /// Passphrase protected during normalization.
    #[serde(default)]
    pub passphrase: Option<SecretSpec>,
    /// Plugin-specific options passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>
}

/// `Telemetry_Pull_Consumer` declaration body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullConsumerDecl {
    /// Whether the consumer can fetch data.
    #[serde(default)]
    pub enable: Option<bool>,
    /// Trace configuration.
    #[serde(default)]
    pub trace: Option<TraceSpec>,
    /// Consumer plugin type (`default`, `Prometheus`, ...).
    #[serde(rename = "type")]
    pub consumer_type: String,
    /// Whether self-signed certificates are accepted.
    #[serde(default)]
    pub allow_self_signed_cert: Option<bool>,
    /// Passphrase protected during normalization.
    #[serde(default)]
    pub passphrase: Option<SecretSpec>,
    /// Pollers this consumer fetches from: references or inline definitions.
    pub system_poller: PollerRefs,
    /// Plugin-specific options passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>
}

/// `Telemetry_Namespace` container body.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceDecl {
    /// Components declared inside the namespace, in authoring order.
    #[serde(flatten)]
    pub entries: DeclarationMap
}
