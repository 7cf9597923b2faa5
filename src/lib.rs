//! Utilities for normalizing telemetry declarations into runtime components.
//!
//! The library loads declarative telemetry documents describing systems,
//! pollers, event listeners, and consumers, and transforms them into a flat
//! list of normalized components plus a mapping table wiring data sources to
//! their receivers. Normalization is deterministic: identical declarations
//! always produce byte-identical output documents.

mod component;
mod consumer;
mod declaration;
mod endpoints;
mod error;
mod ident;
mod ihealth;
mod listener;
mod mappings;
mod poller;
mod resolver;
mod walker;

pub use component::{
    Component, ComponentClass, Connection, ConsumerComponent, Credentials, DataOpts, Endpoint,
    IHealthOptions, IHealthPollerComponent, ListenerComponent, NormalizedConfig,
    PullConsumerComponent, PullConsumerGroupComponent, Secret, SystemPollerComponent, TraceConfig
};
pub use declaration::{Declaration, Node};
pub use error::{Error, io_error};
pub use ident::{DEFAULT_NAMESPACE, component_id, input_trace_path, trace_path};
pub use walker::{load_declaration, normalize, parse_declaration};
