//! Normalization of `Telemetry_System_Poller` definitions.
//!
//! A poller definition reaches this module in one of three states:
//! referenced by name from a system, inline under a system, or standalone at
//! the top of its namespace. The same named poller referenced by N systems
//! produces N distinct components, each merged against its own system's
//! overrides; merging is a pure function over the three precedence layers
//! (explicit poller field, owning system field, global default) and never
//! mutates the declaration.

use serde_json::{Value, json};

use crate::{
    component::{
        ComponentClass, Connection, Credentials, DataOpts, SystemPollerComponent, TraceConfig
    },
    declaration::{
        DeclarationMap, Protocol, SecretSpec, SystemDecl, SystemPollerDecl, TraceSpec, TraceType,
        CLASS_SYSTEM_POLLER
    },
    endpoints,
    error::Error,
    ident
};

/// Default target host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default target port.
pub const DEFAULT_PORT: u16 = 8100;
/// Default connection protocol.
pub const DEFAULT_PROTOCOL: Protocol = Protocol::Http;
/// Default collection interval in seconds.
pub const DEFAULT_INTERVAL: u64 = 300;
/// Default interval for pollers created in a pull consumer context.
pub const DEFAULT_PULL_INTERVAL: u64 = 0;
/// Default number of collection workers.
pub const DEFAULT_WORKERS: u32 = 5;
/// Default number of endpoints per worker batch.
pub const DEFAULT_CHUNK_SIZE: u32 = 30;
/// Default trace record cap for pollers.
const DEFAULT_TRACE_RECORDS: u32 = 10;

/// Default data actions: one `setTag` action injecting context tags.
///
/// User-supplied `actions` replace this wholesale, never append.
pub fn default_actions() -> Vec<Value> {
    vec![json!({
        "enable": true,
        "setTag": {
            "tenant": "`T`",
            "application": "`A`"
        }
    })]
}

/// System-level override fields merged into an owned poller.
///
/// For standalone pollers the overrides are empty and the scope name is the
/// poller's own name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOverrides<'a> {
    /// Owning system's enable switch.
    pub enable: Option<bool>,
    /// Owning system's trace setting.
    pub trace: Option<&'a TraceSpec>,
    /// Owning system's host.
    pub host: Option<&'a str>,
    /// Owning system's port.
    pub port: Option<u16>,
    /// Owning system's protocol.
    pub protocol: Option<Protocol>,
    /// Owning system's certificate policy.
    pub allow_self_signed_cert: Option<bool>,
    /// Owning system's username.
    pub username: Option<&'a str>,
    /// Owning system's passphrase.
    pub passphrase: Option<&'a SecretSpec>
}

impl<'a> SystemOverrides<'a> {
    /// Captures the override fields of an owning system.
    pub fn from_system(system: &'a SystemDecl) -> Self {
        Self {
            enable: system.enable,
            trace: system.trace.as_ref(),
            host: system.host.as_deref(),
            port: system.port,
            protocol: system.protocol,
            allow_self_signed_cert: system.allow_self_signed_cert,
            username: system.username.as_deref(),
            passphrase: system.passphrase.as_ref()
        }
    }

    /// Empty overrides for pollers without an owning system.
    pub fn standalone() -> Self {
        Self::default()
    }
}

/// Context threaded from the walker into poller normalization.
#[derive(Debug, Clone, Copy)]
pub struct PollerContext<'a> {
    /// Namespace owning the poller.
    pub namespace: &'a str,
    /// Declaration scope used to resolve endpoint references.
    pub scope: &'a DeclarationMap,
    /// Name of the owning scope (system name, consumer name, or the
    /// poller's own name when standalone).
    pub scope_name: &'a str,
    /// Override fields of the owning system.
    pub overrides: SystemOverrides<'a>,
    /// Whether the poller was referenced by name from a system; flips the
    /// `enable`/`trace` precedence toward the system.
    pub referenced: bool,
    /// Whether the poller exists to be fetched by a pull consumer.
    pub pull_context: bool,
    /// Whether an enabled Splunk legacy consumer in this namespace requires
    /// TMStats collection.
    pub tmstats_required: bool
}

/// Normalizes one poller definition against its owning context.
///
/// # Errors
///
/// Propagates endpoint reference resolution failures.
pub fn normalize_system_poller(
    decl: &SystemPollerDecl,
    name: &str,
    ctx: &PollerContext<'_>
) -> Result<SystemPollerComponent, Error> {
    let id = ident::component_id(ctx.namespace, Some(ctx.scope_name), name);

    // Referenced-by-name pollers take the system's enable and trace; inline
    // and standalone pollers keep their own explicit values first.
    let (enable, trace_spec) = if ctx.referenced {
        (
            ctx.overrides.enable.or(decl.enable).unwrap_or(true),
            ctx.overrides.trace.or(decl.trace.as_ref())
        )
    } else {
        (
            decl.enable.or(ctx.overrides.enable).unwrap_or(true),
            decl.trace.as_ref().or(ctx.overrides.trace)
        )
    };

    let connection = merge_connection(decl, &ctx.overrides);
    let credentials = merge_credentials(decl, &ctx.overrides);

    let interval = decl.interval.unwrap_or(if ctx.pull_context {
        DEFAULT_PULL_INTERVAL
    } else {
        DEFAULT_INTERVAL
    });

    let endpoints = match decl.endpoint_list.as_ref() {
        Some(spec) => Some(endpoints::normalize_endpoint_list(ctx.scope, name, spec)?),
        None => None
    };

    let trace = TraceConfig::resolve(
        trace_spec,
        CLASS_SYSTEM_POLLER,
        &id,
        TraceType::Output,
        DEFAULT_TRACE_RECORDS
    );

    Ok(SystemPollerComponent {
        class: ComponentClass::SystemPoller,
        trace_name: id.clone(),
        id,
        name: name.to_owned(),
        namespace: ctx.namespace.to_owned(),
        system_name: ctx.scope_name.to_owned(),
        enable,
        trace,
        interval,
        workers: decl.workers.unwrap_or(DEFAULT_WORKERS),
        chunk_size: decl.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
        connection,
        credentials,
        data_opts: DataOpts {
            tags: decl.tag.clone(),
            actions: decl.actions.clone().unwrap_or_else(default_actions),
            no_tmstats: !ctx.tmstats_required
        },
        endpoints
    })
}

/// Pure three-layer merge of connection fields.
fn merge_connection(decl: &SystemPollerDecl, overrides: &SystemOverrides<'_>) -> Connection {
    Connection {
        host: decl
            .host
            .as_deref()
            .or(overrides.host)
            .unwrap_or(DEFAULT_HOST)
            .to_owned(),
        port: decl.port.or(overrides.port).unwrap_or(DEFAULT_PORT),
        protocol: decl.protocol.or(overrides.protocol).unwrap_or(DEFAULT_PROTOCOL),
        allow_self_signed_cert: decl
            .allow_self_signed_cert
            .or(overrides.allow_self_signed_cert)
            .unwrap_or(false)
    }
}

fn merge_credentials(
    decl: &SystemPollerDecl,
    overrides: &SystemOverrides<'_>
) -> Option<Credentials> {
    let username = decl
        .username
        .clone()
        .or_else(|| overrides.username.map(str::to_owned));
    let passphrase = decl.passphrase.as_ref().or(overrides.passphrase);
    Credentials::from_parts(username.as_ref(), passphrase)
}
