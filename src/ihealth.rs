//! Normalization of `Telemetry_iHealth_Poller` definitions.
//!
//! An iHealth poller only exists through an owning system: the walker drops
//! unbound declarations entirely, and a named poller referenced by several
//! systems fans out into one component per owner, each carrying a snapshot
//! of its own system's connection.

use crate::{
    component::{
        ComponentClass, Connection, Credentials, IHealthInterval, IHealthOptions,
        IHealthPollerComponent, Proxy, Secret, SystemSnapshot, TraceConfig
    },
    declaration::{
        CLASS_IHEALTH_POLLER, IHealthPollerDecl, ProxySpec, SystemDecl, TraceType
    },
    ident,
    poller::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROTOCOL}
};

/// Default directory receiving downloaded qkview files.
pub const DEFAULT_DOWNLOAD_FOLDER: &str = "/shared/tmp";
/// Default upload frequency.
pub const DEFAULT_FREQUENCY: &str = "daily";
/// Default proxy port.
const DEFAULT_PROXY_PORT: u16 = 80;
/// Default trace record cap.
const DEFAULT_TRACE_RECORDS: u32 = 10;

/// Normalizes one iHealth poller against its owning system.
///
/// `referenced` flips the `enable`/`trace` precedence toward the system,
/// matching the rule applied to referenced system pollers.
pub fn normalize_ihealth_poller(
    decl: &IHealthPollerDecl,
    name: &str,
    namespace: &str,
    system_name: &str,
    system: &SystemDecl,
    referenced: bool
) -> IHealthPollerComponent {
    let id = ident::component_id(namespace, Some(system_name), name);

    let (enable, trace_spec) = if referenced {
        (
            system.enable.or(decl.enable).unwrap_or(true),
            system.trace.as_ref().or(decl.trace.as_ref())
        )
    } else {
        (
            decl.enable.or(system.enable).unwrap_or(true),
            decl.trace.as_ref().or(system.trace.as_ref())
        )
    };

    let trace = TraceConfig::resolve(
        trace_spec,
        CLASS_IHEALTH_POLLER,
        &id,
        TraceType::Output,
        DEFAULT_TRACE_RECORDS
    );

    let interval = decl.interval.clone().unwrap_or_default();

    IHealthPollerComponent {
        class: ComponentClass::IHealthPoller,
        trace_name: id.clone(),
        id,
        name: name.to_owned(),
        namespace: namespace.to_owned(),
        enable,
        trace,
        ihealth: IHealthOptions {
            name: name.to_owned(),
            credentials: Credentials {
                username: decl.username.clone(),
                passphrase: decl.passphrase.as_ref().map(Secret::protect)
            },
            download_folder: decl
                .download_folder
                .clone()
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_FOLDER.to_owned()),
            interval: IHealthInterval {
                frequency: interval
                    .frequency
                    .unwrap_or_else(|| DEFAULT_FREQUENCY.to_owned()),
                day: interval.day,
                time_window: interval.time_window
            },
            proxy: decl.proxy.as_ref().map(normalize_proxy)
        },
        system: snapshot_system(system_name, system)
    }
}

/// Resolves proxy defaults; the proxy block is omitted entirely upstream
/// when not authored.
fn normalize_proxy(proxy: &ProxySpec) -> Proxy {
    Proxy {
        connection: Connection {
            host: proxy.host.clone(),
            port: proxy.port.unwrap_or(DEFAULT_PROXY_PORT),
            protocol: proxy.protocol.unwrap_or(DEFAULT_PROTOCOL),
            allow_self_signed_cert: proxy.allow_self_signed_cert.unwrap_or(false)
        },
        credentials: Credentials::from_parts(proxy.username.as_ref(), proxy.passphrase.as_ref())
    }
}

/// Captures the owning system's connection at normalization time.
fn snapshot_system(system_name: &str, system: &SystemDecl) -> SystemSnapshot {
    SystemSnapshot {
        name: system_name.to_owned(),
        connection: Connection {
            host: system
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: system.port.unwrap_or(DEFAULT_PORT),
            protocol: system.protocol.unwrap_or(DEFAULT_PROTOCOL),
            allow_self_signed_cert: system.allow_self_signed_cert.unwrap_or(false)
        },
        credentials: Credentials::from_parts(system.username.as_ref(), system.passphrase.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use crate::declaration::{Declaration, IHealthPollerDecl, Node, Protocol, SystemDecl};

    use super::normalize_ihealth_poller;

    fn parse(yaml: &str) -> Declaration {
        serde_yaml::from_str(yaml).expect("declaration should deserialize")
    }

    fn nodes<'d>(declaration: &'d Declaration) -> (&'d SystemDecl, &'d IHealthPollerDecl) {
        let Some(Node::System(system)) = declaration.entries.get("My_System") else {
            panic!("expected system");
        };
        let Some(Node::IHealthPoller(poller)) = declaration.entries.get("My_iHealth") else {
            panic!("expected ihealth poller");
        };
        (system, poller)
    }

    #[test]
    fn applies_defaults_and_system_snapshot() {
        let declaration = parse(
            r#"
            My_System:
              class: Telemetry_System
              host: bigip.example.com
              allowSelfSignedCert: true
            My_iHealth:
              class: Telemetry_iHealth_Poller
              username: ihealth-user
              passphrase:
                cipherText: ihealth-pass
            "#
        );
        let (system, poller) = nodes(&declaration);

        let component = normalize_ihealth_poller(
            poller,
            "My_iHealth",
            "f5telemetry_default",
            "My_System",
            system,
            true
        );

        assert_eq!(component.id, "f5telemetry_default::My_System::My_iHealth");
        assert!(component.enable);
        assert_eq!(component.ihealth.download_folder, "/shared/tmp");
        assert_eq!(component.ihealth.interval.frequency, "daily");
        assert!(component.ihealth.proxy.is_none());
        assert_eq!(component.system.name, "My_System");
        assert_eq!(component.system.connection.host, "bigip.example.com");
        assert_eq!(component.system.connection.port, 8100);
        assert!(component.system.connection.allow_self_signed_cert);
        assert_eq!(
            component
                .ihealth
                .credentials
                .passphrase
                .as_ref()
                .and_then(|secret| secret.cipher_text.as_deref()),
            Some("$M$ihealth-pass")
        );
    }

    #[test]
    fn proxy_connection_gains_defaults() {
        let declaration = parse(
            r#"
            My_System:
              class: Telemetry_System
            My_iHealth:
              class: Telemetry_iHealth_Poller
              proxy:
                host: proxy.example.com
                username: proxy-user
            "#
        );
        let (system, poller) = nodes(&declaration);

        let component = normalize_ihealth_poller(
            poller,
            "My_iHealth",
            "f5telemetry_default",
            "My_System",
            system,
            false
        );

        let proxy = component.ihealth.proxy.expect("proxy configured");
        assert_eq!(proxy.connection.host, "proxy.example.com");
        assert_eq!(proxy.connection.port, 80);
        assert_eq!(proxy.connection.protocol, Protocol::Http);
        assert!(!proxy.connection.allow_self_signed_cert);
        let credentials = proxy.credentials.expect("proxy credentials");
        assert_eq!(credentials.username.as_deref(), Some("proxy-user"));
    }

    #[test]
    fn interval_window_and_day_pass_through() {
        let declaration = parse(
            r#"
            My_System:
              class: Telemetry_System
            My_iHealth:
              class: Telemetry_iHealth_Poller
              interval:
                frequency: weekly
                day: sunday
                timeWindow:
                  start: "23:15"
                  end: "02:15"
            "#
        );
        let (system, poller) = nodes(&declaration);

        let component = normalize_ihealth_poller(
            poller,
            "My_iHealth",
            "f5telemetry_default",
            "My_System",
            system,
            false
        );

        assert_eq!(component.ihealth.interval.frequency, "weekly");
        assert_eq!(
            component.ihealth.interval.day,
            Some(serde_json::Value::String("sunday".to_owned()))
        );
        let window = component.ihealth.interval.time_window.expect("window");
        assert_eq!(window.start, "23:15");
        assert_eq!(window.end, "02:15");
    }

    #[test]
    fn system_disable_propagates_to_referenced_poller() {
        let declaration = parse(
            r#"
            My_System:
              class: Telemetry_System
              enable: false
            My_iHealth:
              class: Telemetry_iHealth_Poller
              enable: true
            "#
        );
        let (system, poller) = nodes(&declaration);

        let component = normalize_ihealth_poller(
            poller,
            "My_iHealth",
            "f5telemetry_default",
            "My_System",
            system,
            true
        );
        assert!(!component.enable);
    }
}
