//! Utilities for deriving stable component identifiers and trace paths.
//!
//! Identifiers produced by this module are the canonical `::`-joined ids
//! that make every normalized component addressable across the whole output
//! document. Identical inputs always produce byte-identical identifiers,
//! which is what makes repeated normalization of the same declaration
//! idempotent.

/// Namespace that owns every top-level component not wrapped in an explicit
/// `Telemetry_Namespace` block.
pub const DEFAULT_NAMESPACE: &str = "f5telemetry_default";

/// Directory receiving trace files when no custom path is configured.
pub const TRACE_DIR: &str = "/var/tmp/telemetry";

/// Separator used between id segments.
const ID_SEPARATOR: &str = "::";

/// Builds the canonical component id from its addressing segments.
///
/// Components owned by a scope (a System Poller owned by a System, for
/// example) use the three-segment form `namespace::scope::name`; components
/// addressed directly within their namespace use `namespace::name`.
///
/// # Examples
///
/// ```
/// use telnorm::component_id;
///
/// let scoped = component_id("f5telemetry_default", Some("My_System"), "My_Poller");
/// assert_eq!(scoped, "f5telemetry_default::My_System::My_Poller");
///
/// let flat = component_id("f5telemetry_default", None, "My_Listener");
/// assert_eq!(flat, "f5telemetry_default::My_Listener");
/// ```
pub fn component_id(namespace: &str, scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(scope) => {
            let mut id = String::with_capacity(
                namespace.len() + scope.len() + name.len() + 2 * ID_SEPARATOR.len()
            );
            id.push_str(namespace);
            id.push_str(ID_SEPARATOR);
            id.push_str(scope);
            id.push_str(ID_SEPARATOR);
            id.push_str(name);
            id
        }
        None => format!("{namespace}{ID_SEPARATOR}{name}")
    }
}

/// Derives the default trace file path for a component.
///
/// The path has the form `/var/tmp/telemetry/<Class>.<id>` where `<class>` is
/// the declaration class string of the component.
pub fn trace_path(class: &str, id: &str) -> String {
    format!("{TRACE_DIR}/{class}.{id}")
}

/// Derives the default input-trace file path for a dual-trace component.
///
/// Only listeners carry an input trace today; the file name gains an
/// `INPUT.` prefix so both traces of one component can coexist in the same
/// directory.
pub fn input_trace_path(class: &str, id: &str) -> String {
    format!("{TRACE_DIR}/INPUT.{class}.{id}")
}
