//! Normalized output data model.
//!
//! Everything in this module is Serialize-only: components are produced by
//! the normalizers, appended to the output document in emission order, and
//! never mutated afterwards. The serialized form is plain JSON with no
//! cycles, safe to persist or transmit as-is.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::{
    declaration::{
        EndpointProtocol, Protocol, SecretSpec, TimeWindowSpec, TraceObjectSpec, TraceSpec,
        TraceType
    },
    ident
};

/// Marker prefix carried by already-protected secret material.
pub const SECRET_MARKER: &str = "$M$";

/// Default record encoding for trace files.
const DEFAULT_TRACE_ENCODING: &str = "json";

/// Fully normalized configuration: routing table plus flat component list.
///
/// The components appear in emission order; `mappings` keys are sorted for a
/// byte-stable document, while each edge list preserves consumer declaration
/// order within its namespace.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedConfig {
    /// Edges from data-producing component ids to consumer component ids.
    pub mappings: BTreeMap<String, Vec<String>>,
    /// All normalized components.
    pub components: Vec<Component>
}

/// Output component class tag.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ComponentClass {
    /// `Telemetry_System_Poller`.
    #[serde(rename = "Telemetry_System_Poller")]
    SystemPoller,
    /// `Telemetry_iHealth_Poller`.
    #[serde(rename = "Telemetry_iHealth_Poller")]
    IHealthPoller,
    /// `Telemetry_Listener`.
    #[serde(rename = "Telemetry_Listener")]
    Listener,
    /// `Telemetry_Consumer`.
    #[serde(rename = "Telemetry_Consumer")]
    Consumer,
    /// `Telemetry_Pull_Consumer`.
    #[serde(rename = "Telemetry_Pull_Consumer")]
    PullConsumer,
    /// `Telemetry_Pull_Consumer_System_Poller_Group`.
    #[serde(rename = "Telemetry_Pull_Consumer_System_Poller_Group")]
    PullConsumerGroup
}

impl ComponentClass {
    /// Class string as it appears in the serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemPoller => "Telemetry_System_Poller",
            Self::IHealthPoller => "Telemetry_iHealth_Poller",
            Self::Listener => "Telemetry_Listener",
            Self::Consumer => "Telemetry_Consumer",
            Self::PullConsumer => "Telemetry_Pull_Consumer",
            Self::PullConsumerGroup => "Telemetry_Pull_Consumer_System_Poller_Group"
        }
    }
}

/// One normalized component.
///
/// The enum is closed and serialized untagged; every variant carries its own
/// `class` tag field, so the JSON shape matches the flat component objects
/// consumed downstream.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Component {
    /// Normalized system poller instance bound to one owning system.
    SystemPoller(SystemPollerComponent),
    /// Normalized iHealth poller instance bound to one owning system.
    IHealthPoller(IHealthPollerComponent),
    /// Normalized event listener.
    Listener(ListenerComponent),
    /// Normalized push consumer.
    Consumer(ConsumerComponent),
    /// Normalized pull consumer.
    PullConsumer(PullConsumerComponent),
    /// Synthesized poller group backing a pull consumer.
    PullConsumerGroup(PullConsumerGroupComponent)
}

impl Component {
    /// Globally unique component id.
    pub fn id(&self) -> &str {
        match self {
            Self::SystemPoller(component) => &component.id,
            Self::IHealthPoller(component) => &component.id,
            Self::Listener(component) => &component.id,
            Self::Consumer(component) => &component.id,
            Self::PullConsumer(component) => &component.id,
            Self::PullConsumerGroup(component) => &component.id
        }
    }

    /// Declared (or synthesized) component name.
    pub fn name(&self) -> &str {
        match self {
            Self::SystemPoller(component) => &component.name,
            Self::IHealthPoller(component) => &component.name,
            Self::Listener(component) => &component.name,
            Self::Consumer(component) => &component.name,
            Self::PullConsumer(component) => &component.name,
            Self::PullConsumerGroup(component) => &component.name
        }
    }

    /// Namespace owning the component.
    pub fn namespace(&self) -> &str {
        match self {
            Self::SystemPoller(component) => &component.namespace,
            Self::IHealthPoller(component) => &component.namespace,
            Self::Listener(component) => &component.namespace,
            Self::Consumer(component) => &component.namespace,
            Self::PullConsumer(component) => &component.namespace,
            Self::PullConsumerGroup(component) => &component.namespace
        }
    }

    /// Whether the component is enabled.
    pub fn enable(&self) -> bool {
        match self {
            Self::SystemPoller(component) => component.enable,
            Self::IHealthPoller(component) => component.enable,
            Self::Listener(component) => component.enable,
            Self::Consumer(component) => component.enable,
            Self::PullConsumer(component) => component.enable,
            Self::PullConsumerGroup(component) => component.enable
        }
    }

    /// Output class tag of the component.
    pub fn class(&self) -> ComponentClass {
        match self {
            Self::SystemPoller(component) => component.class,
            Self::IHealthPoller(component) => component.class,
            Self::Listener(component) => component.class,
            Self::Consumer(component) => component.class,
            Self::PullConsumer(component) => component.class,
            Self::PullConsumerGroup(component) => component.class
        }
    }

    /// Whether this component produces data that push consumers can receive.
    pub fn is_data_source(&self) -> bool {
        matches!(self, Self::SystemPoller(_) | Self::IHealthPoller(_) | Self::Listener(_))
    }
}

/// Resolved trace configuration emitted on every component.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TraceConfig {
    /// Whether tracing is active.
    pub enable: bool,
    /// Record encoding.
    pub encoding: String,
    /// Maximum number of records kept in the trace file.
    pub max_records: u32,
    /// Trace file location.
    pub path: String,
    /// Trace direction.
    #[serde(rename = "type")]
    pub trace_type: TraceType
}

impl TraceConfig {
    /// Resolves the authored trace setting into a full configuration.
    ///
    /// Boolean and path forms apply to the `output` direction only; the
    /// `input` direction (listeners) is configured exclusively through
    /// objects carrying `type: input`. Absent or non-matching settings
    /// produce a disabled configuration that still carries the default path,
    /// keeping the output shape stable.
    pub fn resolve(
        spec: Option<&TraceSpec>,
        class: &str,
        id: &str,
        trace_type: TraceType,
        default_max_records: u32
    ) -> Self {
        let default_path = match trace_type {
            TraceType::Output => ident::trace_path(class, id),
            TraceType::Input => ident::input_trace_path(class, id)
        };
        let disabled = Self {
            enable: false,
            encoding: DEFAULT_TRACE_ENCODING.to_owned(),
            max_records: default_max_records,
            path: default_path.clone(),
            trace_type
        };

        let Some(spec) = spec else {
            return disabled;
        };

        match spec {
            TraceSpec::Enable(enable) => match trace_type {
                TraceType::Output => Self {
                    enable: *enable,
                    ..disabled
                },
                TraceType::Input => disabled
            },
            TraceSpec::Path(path) => match trace_type {
                TraceType::Output => Self {
                    enable: true,
                    path: path.clone(),
                    ..disabled
                },
                TraceType::Input => disabled
            },
            TraceSpec::Config(object) => {
                Self::from_object(object, trace_type, disabled)
            }
            TraceSpec::Many(objects) => {
                let matching = objects.iter().find(|object| {
                    object.trace_type.unwrap_or(TraceType::Output) == trace_type
                });
                match matching {
                    Some(object) => Self::from_object(object, trace_type, disabled),
                    None => disabled
                }
            }
        }
    }

    fn from_object(object: &TraceObjectSpec, trace_type: TraceType, disabled: Self) -> Self {
        if object.trace_type.unwrap_or(TraceType::Output) != trace_type {
            return disabled;
        }
        Self {
            enable: true,
            encoding: object
                .encoding
                .clone()
                .unwrap_or_else(|| DEFAULT_TRACE_ENCODING.to_owned()),
            max_records: object.max_records.unwrap_or(disabled.max_records),
            path: object.path.clone().unwrap_or(disabled.path),
            trace_type
        }
    }
}

/// Resolved connection parameters.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Target host.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Connection protocol.
    pub protocol: Protocol,
    /// Whether self-signed certificates are accepted.
    pub allow_self_signed_cert: bool
}

/// Resolved credentials attached to a connection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Username for authenticated collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Protected passphrase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<Secret>
}

impl Credentials {
    /// Builds credentials from optional parts, protecting the passphrase.
    ///
    /// Returns `None` when neither a username nor a passphrase is present so
    /// callers can omit the whole `credentials` object from the output.
    pub fn from_parts(username: Option<&String>, passphrase: Option<&SecretSpec>) -> Option<Self> {
        if username.is_none() && passphrase.is_none() {
            return None;
        }
        Some(Self {
            username: username.cloned(),
            passphrase: passphrase.map(Secret::protect)
        })
    }
}

/// Class tag of protected secrets.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum SecretClassTag {
    /// Constant `Secret` class string.
    #[serde(rename = "Secret")]
    Secret
}

/// Protected secret emitted in place of authored passphrases.
///
/// Already-protected material (marker-prefixed cipher text) passes through
/// untouched; plaintext gains the marker prefix and the `SecureVault`
/// protection tag. Actual encryption is an external collaborator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    /// Constant `Secret` class tag.
    pub class: SecretClassTag,
    /// Protection backend.
    pub protected: String,
    /// Protected secret material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cipher_text: Option<String>,
    /// Environment variable holding the secret at runtime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_var: Option<String>
}

impl Secret {
    /// Normalizes an authored secret into its protected form.
    pub fn protect(spec: &SecretSpec) -> Self {
        match spec {
            SecretSpec::Plain(value) => Self::from_cipher_text(value),
            SecretSpec::Object(object) => {
                if let Some(variable) = object.environment_var.as_ref() {
                    return Self {
                        class: SecretClassTag::Secret,
                        protected: "plainText".to_owned(),
                        cipher_text: None,
                        environment_var: Some(variable.clone())
                    };
                }
                match object.cipher_text.as_ref() {
                    Some(cipher_text) => Self::from_cipher_text(cipher_text),
                    None => Self {
                        class: SecretClassTag::Secret,
                        protected: object
                            .protected
                            .clone()
                            .unwrap_or_else(|| "SecureVault".to_owned()),
                        cipher_text: None,
                        environment_var: None
                    }
                }
            }
        }
    }

    fn from_cipher_text(cipher_text: &str) -> Self {
        let protected_text = if cipher_text.starts_with(SECRET_MARKER) {
            cipher_text.to_owned()
        } else {
            format!("{SECRET_MARKER}{cipher_text}")
        };
        Self {
            class: SecretClassTag::Secret,
            protected: "SecureVault".to_owned(),
            cipher_text: Some(protected_text),
            environment_var: None
        }
    }
}

/// Normalized endpoint entry collected by a system poller.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Whether this endpoint is collected.
    pub enable: bool,
    /// Endpoint name, also its map key.
    pub name: String,
    /// Request path (HTTP) or OID (SNMP).
    pub path: String,
    /// Collection protocol.
    pub protocol: EndpointProtocol,
    /// SNMP only: resolve enum values to their numeric form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerical_enums: Option<bool>
}

/// Data shaping options emitted on system pollers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataOpts {
    /// Free-form tags from the deprecated `tag` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    /// Data actions applied to collected stats.
    pub actions: Vec<Value>,
    /// Whether legacy TMStats tables are skipped during collection.
    #[serde(rename = "noTMStats")]
    pub no_tmstats: bool
}

/// Normalized `Telemetry_System_Poller` component.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemPollerComponent {
    /// Output class tag.
    pub class: ComponentClass,
    /// Globally unique id (`namespace::system::poller`).
    pub id: String,
    /// Poller name (declared or synthesized).
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Owning system name (scope segment of the id).
    pub system_name: String,
    /// Human readable trace identity, equal to the id.
    pub trace_name: String,
    /// Whether this poller runs.
    pub enable: bool,
    /// Resolved trace configuration.
    pub trace: TraceConfig,
    /// Collection interval in seconds; `0` means pull-on-demand only.
    pub interval: u64,
    /// Number of concurrent collection workers.
    pub workers: u32,
    /// Number of endpoints polled per worker batch.
    pub chunk_size: u32,
    /// Resolved connection parameters.
    pub connection: Connection,
    /// Resolved credentials, omitted when unauthenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Data shaping options.
    pub data_opts: DataOpts,
    /// Custom endpoints, present only when an `endpointList` was authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<BTreeMap<String, Endpoint>>
}

/// iHealth service options emitted on iHealth poller components.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IHealthOptions {
    /// Poller name (declared or synthesized).
    pub name: String,
    /// iHealth service credentials.
    pub credentials: Credentials,
    /// Directory receiving downloaded qkview files.
    pub download_folder: String,
    /// Upload schedule.
    pub interval: IHealthInterval,
    /// Proxy configuration, omitted entirely when not authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Proxy>
}

/// Resolved iHealth upload schedule.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IHealthInterval {
    /// Schedule frequency (`daily`, `weekly`, `monthly`).
    pub frequency: String,
    /// Day selector for weekly/monthly schedules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<Value>,
    /// Daily execution window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindowSpec>
}

/// Resolved proxy configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    /// Proxy connection parameters.
    pub connection: Connection,
    /// Proxy credentials, omitted when unauthenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>
}

/// Snapshot of the owning system captured at normalization time.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    /// Owning system name.
    pub name: String,
    /// Connection parameters of the owning system.
    pub connection: Connection,
    /// Credentials of the owning system, omitted when unauthenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>
}

/// Normalized `Telemetry_iHealth_Poller` component.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IHealthPollerComponent {
    /// Output class tag.
    pub class: ComponentClass,
    /// Globally unique id (`namespace::system::poller`).
    pub id: String,
    /// Poller name (declared or synthesized).
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Human readable trace identity, equal to the id.
    pub trace_name: String,
    /// Whether this poller runs.
    pub enable: bool,
    /// Resolved trace configuration.
    pub trace: TraceConfig,
    /// iHealth service options.
    #[serde(rename = "iHealth")]
    pub ihealth: IHealthOptions,
    /// Snapshot of the owning system.
    pub system: SystemSnapshot
}

/// Normalized `Telemetry_Listener` component.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListenerComponent {
    /// Output class tag.
    pub class: ComponentClass,
    /// Globally unique id (`namespace::listener`).
    pub id: String,
    /// Listener name.
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Human readable trace identity, equal to the id.
    pub trace_name: String,
    /// Whether the listener accepts events.
    pub enable: bool,
    /// Output-direction trace configuration.
    pub trace: TraceConfig,
    /// Input-direction trace configuration.
    pub trace_input: TraceConfig,
    /// Port the listener binds.
    pub port: u16,
    /// Filter restricting which events are kept.
    #[serde(rename = "match")]
    pub match_filter: Value,
    /// Free-form tags.
    pub tag: Value,
    /// Data actions applied to received events.
    pub actions: Vec<Value>
}

/// Normalized `Telemetry_Consumer` component.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerComponent {
    /// Output class tag.
    pub class: ComponentClass,
    /// Globally unique id (`namespace::consumer`).
    pub id: String,
    /// Consumer name.
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Human readable trace identity, equal to the id.
    pub trace_name: String,
    /// Whether the consumer receives data.
    pub enable: bool,
    /// Resolved trace configuration.
    pub trace: TraceConfig,
    /// Consumer plugin type.
    #[serde(rename = "type")]
    pub consumer_type: String,
    /// Whether self-signed certificates are accepted.
    pub allow_self_signed_cert: bool,
    /// Protected passphrase, omitted when not authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<Secret>,
    /// Plugin-specific options passed through, plus injected type defaults.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>
}

/// Normalized `Telemetry_Pull_Consumer` component.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PullConsumerComponent {
    /// Output class tag.
    pub class: ComponentClass,
    /// Globally unique id (`namespace::consumer`).
    pub id: String,
    /// Consumer name.
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Human readable trace identity, equal to the id.
    pub trace_name: String,
    /// Whether the consumer can fetch data.
    pub enable: bool,
    /// Resolved trace configuration.
    pub trace: TraceConfig,
    /// Consumer plugin type.
    #[serde(rename = "type")]
    pub consumer_type: String,
    /// Whether self-signed certificates are accepted.
    pub allow_self_signed_cert: bool,
    /// Protected passphrase, omitted when not authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<Secret>,
    /// Names of the pollers this consumer fetches from.
    pub system_poller: Vec<String>,
    /// Plugin-specific options passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>
}

/// Synthesized poller group binding a pull consumer to its pollers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PullConsumerGroupComponent {
    /// Output class tag.
    pub class: ComponentClass,
    /// Globally unique id (`namespace::group`).
    pub id: String,
    /// Group name (`Telemetry_Pull_Consumer_System_Poller_Group_<consumer>`).
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Human readable trace identity, equal to the id.
    pub trace_name: String,
    /// Inherited from the owning pull consumer.
    pub enable: bool,
    /// Trace configuration; groups never trace, kept for shape stability.
    pub trace: TraceConfig,
    /// Id of the owning pull consumer.
    pub pull_consumer: String,
    /// Deduplicated, order-preserving poller component ids.
    pub system_pollers: Vec<String>
}

#[cfg(test)]
mod tests {
    use crate::declaration::{SecretSpec, TraceObjectSpec, TraceSpec, TraceType};

    use super::{Secret, SecretClassTag, TraceConfig};

    #[test]
    fn protect_prefixes_plaintext_with_marker() {
        let secret = Secret::protect(&SecretSpec::Plain("hunter2".to_owned()));
        assert_eq!(secret.class, SecretClassTag::Secret);
        assert_eq!(secret.protected, "SecureVault");
        assert_eq!(secret.cipher_text.as_deref(), Some("$M$hunter2"));
    }

    #[test]
    fn protect_passes_protected_material_untouched() {
        let spec: SecretSpec =
            serde_yaml::from_str("cipherText: $M$already-protected").expect("secret spec");
        let secret = Secret::protect(&spec);
        assert_eq!(secret.cipher_text.as_deref(), Some("$M$already-protected"));
    }

    #[test]
    fn protect_keeps_environment_var_secrets_plain() {
        let spec: SecretSpec =
            serde_yaml::from_str("environmentVar: SECRET_TOKEN").expect("secret spec");
        let secret = Secret::protect(&spec);
        assert_eq!(secret.protected, "plainText");
        assert_eq!(secret.environment_var.as_deref(), Some("SECRET_TOKEN"));
        assert!(secret.cipher_text.is_none());
    }

    #[test]
    fn trace_defaults_to_disabled_with_default_path() {
        let trace =
            TraceConfig::resolve(None, "Telemetry_Listener", "ns::L", TraceType::Output, 10);
        assert!(!trace.enable);
        assert_eq!(trace.path, "/var/tmp/telemetry/Telemetry_Listener.ns::L");
        assert_eq!(trace.max_records, 10);
        assert_eq!(trace.encoding, "json");
    }

    #[test]
    fn trace_bool_enables_output_only() {
        let spec = TraceSpec::Enable(true);
        let output =
            TraceConfig::resolve(Some(&spec), "Telemetry_Listener", "ns::L", TraceType::Output, 10);
        let input =
            TraceConfig::resolve(Some(&spec), "Telemetry_Listener", "ns::L", TraceType::Input, 9999);
        assert!(output.enable);
        assert!(!input.enable);
        assert_eq!(input.path, "/var/tmp/telemetry/INPUT.Telemetry_Listener.ns::L");
    }

    #[test]
    fn trace_path_form_sets_custom_path() {
        let spec = TraceSpec::Path("/custom/file".to_owned());
        let trace =
            TraceConfig::resolve(Some(&spec), "Telemetry_Listener", "ns::L", TraceType::Output, 10);
        assert!(trace.enable);
        assert_eq!(trace.path, "/custom/file");
    }

    #[test]
    fn trace_array_selects_by_direction() {
        let spec = TraceSpec::Many(vec![
            TraceObjectSpec {
                trace_type: Some(TraceType::Input),
                path: Some("/input/file".to_owned()),
                max_records: Some(500),
                encoding: None
            },
            TraceObjectSpec {
                trace_type: Some(TraceType::Output),
                path: None,
                max_records: None,
                encoding: None
            },
        ]);

        let input =
            TraceConfig::resolve(Some(&spec), "Telemetry_Listener", "ns::L", TraceType::Input, 9999);
        assert!(input.enable);
        assert_eq!(input.path, "/input/file");
        assert_eq!(input.max_records, 500);

        let output =
            TraceConfig::resolve(Some(&spec), "Telemetry_Listener", "ns::L", TraceType::Output, 10);
        assert!(output.enable);
        assert_eq!(output.path, "/var/tmp/telemetry/Telemetry_Listener.ns::L");
        assert_eq!(output.max_records, 10);
    }
}
