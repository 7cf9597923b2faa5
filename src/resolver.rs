//! Namespace-local reference resolution.
//!
//! References are plain strings naming another declaration object in the
//! same namespace, optionally suffixed `/item` to pick one entry out of a
//! group. Resolution never crosses namespace boundaries; a dangling name is
//! fatal because every downstream id and mapping would be incoherent.

use std::collections::HashMap;

use crate::{
    declaration::{
        DeclarationMap, EndpointItemSpec, EndpointsDecl, IHealthPollerDecl, Node, SystemDecl,
        SystemPollerDecl
    },
    error::Error
};

/// Parsed reference string: object name plus optional sub-item selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceParts<'a> {
    /// Name of the referenced declaration object.
    pub name: &'a str,
    /// Optional sub-item key (`Group/item` form).
    pub item: Option<&'a str>
}

/// Splits a reference on the first `/` into name and sub-item.
pub fn parse_reference(value: &str) -> ReferenceParts<'_> {
    match value.split_once('/') {
        Some((name, item)) => ReferenceParts {
            name,
            item: Some(item)
        },
        None => ReferenceParts {
            name: value,
            item: None
        }
    }
}

/// Builds the deduplication key for a resolved reference.
///
/// Repeated references to the same object (and sub-item) from the same
/// namespace collapse onto one resolved entry via this key.
pub fn dedup_key(namespace: &str, name: &str, item: Option<&str>) -> String {
    match item {
        Some(item) => format!("{namespace}::{name}::{item}"),
        None => format!("{namespace}::{name}")
    }
}

/// Resolves a `systemPoller` name reference to its declaration.
///
/// # Errors
///
/// Returns [`Error::Reference`] when no object with that name exists in the
/// namespace and [`Error::Conflict`] when the name resolves to a different
/// declaration class.
pub fn resolve_system_poller<'d>(
    scope: &'d DeclarationMap,
    referrer: &str,
    name: &str
) -> Result<&'d SystemPollerDecl, Error> {
    match scope.get(name) {
        Some(Node::SystemPoller(poller)) => Ok(poller),
        Some(other) => Err(Error::conflict(format!(
            "'{name}' referenced from '{referrer}' must be a Telemetry_System_Poller, found {}",
            other.class()
        ))),
        None => Err(Error::reference(referrer, name, "no such object in namespace"))
    }
}

/// Resolves the system half of a `System/poller` sub-item reference.
///
/// # Errors
///
/// Returns [`Error::Reference`] when no object with that name exists in the
/// namespace and [`Error::Conflict`] when the name resolves to a different
/// declaration class.
pub fn resolve_system<'d>(
    scope: &'d DeclarationMap,
    referrer: &str,
    name: &str
) -> Result<&'d SystemDecl, Error> {
    match scope.get(name) {
        Some(Node::System(system)) => Ok(system),
        Some(other) => Err(Error::conflict(format!(
            "'{name}' referenced from '{referrer}' must be a Telemetry_System, found {}",
            other.class()
        ))),
        None => Err(Error::reference(referrer, name, "no such object in namespace"))
    }
}

/// Resolves an `iHealthPoller` name reference to its declaration.
///
/// # Errors
///
/// Returns [`Error::Reference`] when no object with that name exists in the
/// namespace and [`Error::Conflict`] when the name resolves to a different
/// declaration class.
pub fn resolve_ihealth_poller<'d>(
    scope: &'d DeclarationMap,
    referrer: &str,
    name: &str
) -> Result<&'d IHealthPollerDecl, Error> {
    match scope.get(name) {
        Some(Node::IHealthPoller(poller)) => Ok(poller),
        Some(other) => Err(Error::conflict(format!(
            "'{name}' referenced from '{referrer}' must be a Telemetry_iHealth_Poller, found {}",
            other.class()
        ))),
        None => Err(Error::reference(referrer, name, "no such object in namespace"))
    }
}

/// Result of resolving an endpoints reference.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEndpoints<'d> {
    /// Referenced endpoints group.
    pub group: &'d EndpointsDecl,
    /// Selected item when the reference used the `Group/item` form.
    pub item: Option<(&'d str, &'d EndpointItemSpec)>
}

/// Resolves an `endpointList` reference (`"Group"` or `"Group/item"`).
///
/// # Errors
///
/// Returns [`Error::Reference`] when the group or the selected item does not
/// exist and [`Error::Conflict`] when the name resolves to a different
/// declaration class.
pub fn resolve_endpoints<'d>(
    scope: &'d DeclarationMap,
    referrer: &str,
    reference: &str
) -> Result<ResolvedEndpoints<'d>, Error> {
    let parts = parse_reference(reference);
    let group = match scope.get(parts.name) {
        Some(Node::Endpoints(group)) => group,
        Some(other) => {
            return Err(Error::conflict(format!(
                "'{}' referenced from '{referrer}' must be a Telemetry_Endpoints, found {}",
                parts.name,
                other.class()
            )));
        }
        None => {
            return Err(Error::reference(referrer, reference, "no such object in namespace"));
        }
    };

    let item = match parts.item {
        Some(key) => {
            let Some((item_key, item)) = group.items.get_key_value(key) else {
                return Err(Error::reference(
                    referrer,
                    reference,
                    format!("no item '{key}' in endpoints '{}'", parts.name)
                ));
            };
            Some((item_key.as_str(), item))
        }
        None => None
    };

    Ok(ResolvedEndpoints {
        group,
        item
    })
}

/// Per-session counters for synthesized anonymous poller names.
///
/// Counters are keyed by the owning scope id and threaded through the walk,
/// so two concurrent normalization sessions never share numbering state.
#[derive(Debug, Default)]
pub struct AnonymousNames {
    counters: HashMap<String, usize>
}

impl AnonymousNames {
    /// Creates an empty counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next `SystemPoller_<k>` name for the owning scope.
    ///
    /// Numbering starts at 1 per owner and follows declaration order.
    pub fn next_poller_name(&mut self, owner: &str) -> String {
        let counter = self.counters.entry(owner.to_owned()).or_insert(0);
        *counter += 1;
        format!("SystemPoller_{counter}")
    }
}

#[cfg(test)]
mod tests {
    use crate::declaration::Declaration;

    use super::{
        AnonymousNames, dedup_key, parse_reference, resolve_endpoints, resolve_system,
        resolve_system_poller
    };

    fn scope(yaml: &str) -> Declaration {
        serde_yaml::from_str(yaml).expect("declaration should deserialize")
    }

    #[test]
    fn parse_reference_splits_on_first_slash() {
        let plain = parse_reference("My_Endpoints");
        assert_eq!(plain.name, "My_Endpoints");
        assert_eq!(plain.item, None);

        let with_item = parse_reference("My_Endpoints/a/b");
        assert_eq!(with_item.name, "My_Endpoints");
        assert_eq!(with_item.item, Some("a/b"));
    }

    #[test]
    fn dedup_key_includes_optional_item() {
        assert_eq!(dedup_key("ns", "Group", None), "ns::Group");
        assert_eq!(dedup_key("ns", "Group", Some("item")), "ns::Group::item");
    }

    #[test]
    fn resolves_system_poller_by_name() {
        let declaration = scope(
            r#"
            Poller_1:
              class: Telemetry_System_Poller
              interval: 120
            "#
        );

        let poller = resolve_system_poller(&declaration.entries, "My_System", "Poller_1")
            .expect("poller should resolve");
        assert_eq!(poller.interval, Some(120));
    }

    #[test]
    fn missing_reference_is_fatal() {
        let declaration = scope(
            r#"
            Poller_1:
              class: Telemetry_System_Poller
            "#
        );

        let error = resolve_system_poller(&declaration.entries, "My_System", "Poller_2")
            .expect_err("missing reference should fail");
        assert!(error.to_string().contains("Poller_2"));
    }

    #[test]
    fn wrong_class_reference_is_a_conflict() {
        let declaration = scope(
            r#"
            Not_A_Poller:
              class: Telemetry_Listener
            "#
        );

        let error = resolve_system_poller(&declaration.entries, "My_System", "Not_A_Poller")
            .expect_err("class mismatch should fail");
        assert!(error.to_string().contains("must be a Telemetry_System_Poller"));
    }

    #[test]
    fn resolves_system_by_name() {
        let declaration = scope(
            r#"
            My_System:
              class: Telemetry_System
              host: host1
            Not_A_System:
              class: Telemetry_Listener
            "#
        );

        let system = resolve_system(&declaration.entries, "My_Pull_Consumer", "My_System")
            .expect("system should resolve");
        assert_eq!(system.host.as_deref(), Some("host1"));

        let error = resolve_system(&declaration.entries, "My_Pull_Consumer", "Not_A_System")
            .expect_err("class mismatch should fail");
        assert!(error.to_string().contains("must be a Telemetry_System"));
    }

    #[test]
    fn resolves_endpoints_group_and_item() {
        let declaration = scope(
            r#"
            My_Endpoints:
              class: Telemetry_Endpoints
              items:
                status:
                  path: /status
            "#
        );

        let group = resolve_endpoints(&declaration.entries, "Poller", "My_Endpoints")
            .expect("group should resolve");
        assert!(group.item.is_none());

        let item = resolve_endpoints(&declaration.entries, "Poller", "My_Endpoints/status")
            .expect("item should resolve");
        let (key, spec) = item.item.expect("item selected");
        assert_eq!(key, "status");
        assert_eq!(spec.path.as_deref(), Some("/status"));

        let error = resolve_endpoints(&declaration.entries, "Poller", "My_Endpoints/missing")
            .expect_err("missing item should fail");
        assert!(error.to_string().contains("no item 'missing'"));
    }

    #[test]
    fn anonymous_names_increment_per_owner() {
        let mut names = AnonymousNames::new();
        assert_eq!(names.next_poller_name("ns::System_A"), "SystemPoller_1");
        assert_eq!(names.next_poller_name("ns::System_A"), "SystemPoller_2");
        assert_eq!(names.next_poller_name("ns::System_B"), "SystemPoller_1");
    }
}
