//! Expansion of `Telemetry_Endpoints` definitions and inline endpoint lists
//! into the flat endpoint map carried by a system poller.
//!
//! Sources are processed strictly left-to-right; a later definition with the
//! same endpoint name fully overwrites an earlier one. A disabled endpoints
//! group short-circuits all of its items, enabled or not.

use std::collections::BTreeMap;

use crate::{
    component::Endpoint,
    declaration::{
        DeclarationMap, EndpointItemSpec, EndpointListItem, EndpointListSpec, EndpointProtocol,
        EndpointsDecl
    },
    error::Error,
    resolver
};

/// Expands a poller's `endpointList` into its normalized endpoint map.
///
/// # Errors
///
/// Returns [`Error::Reference`] for dangling references and
/// [`Error::Conflict`] for references resolving to the wrong class.
pub fn normalize_endpoint_list(
    scope: &DeclarationMap,
    referrer: &str,
    spec: &EndpointListSpec
) -> Result<BTreeMap<String, Endpoint>, Error> {
    let mut endpoints = BTreeMap::new();
    match spec {
        EndpointListSpec::Reference(reference) => {
            merge_reference(scope, referrer, reference, &mut endpoints)?;
        }
        EndpointListSpec::Group(group) => {
            merge_group(group, &mut endpoints);
        }
        EndpointListSpec::List(items) => {
            for item in items {
                match item {
                    EndpointListItem::Reference(reference) => {
                        merge_reference(scope, referrer, reference, &mut endpoints)?;
                    }
                    EndpointListItem::Inline(inline) => {
                        merge_inline_item(inline, &mut endpoints);
                    }
                }
            }
        }
    }
    Ok(endpoints)
}

/// Resolves one endpoints reference and merges its contribution.
fn merge_reference(
    scope: &DeclarationMap,
    referrer: &str,
    reference: &str,
    endpoints: &mut BTreeMap<String, Endpoint>
) -> Result<(), Error> {
    let resolved = resolver::resolve_endpoints(scope, referrer, reference)?;
    if !resolved.group.enable.unwrap_or(true) {
        // Group disable short-circuits every item.
        return Ok(());
    }

    match resolved.item {
        Some((key, item)) => {
            if let Some(endpoint) =
                normalize_group_item(resolved.group, key, item, PathRule::AbsoluteWins)
            {
                endpoints.insert(endpoint.name.clone(), endpoint);
            }
        }
        None => merge_group(resolved.group, endpoints)
    }
    Ok(())
}

/// Merges every enabled item of a group (whole-group reference or inline
/// group object).
fn merge_group(group: &EndpointsDecl, endpoints: &mut BTreeMap<String, Endpoint>) {
    if !group.enable.unwrap_or(true) {
        return;
    }
    for (key, item) in &group.items {
        if let Some(endpoint) = normalize_group_item(group, key, item, PathRule::AlwaysCompose) {
            endpoints.insert(endpoint.name.clone(), endpoint);
        }
    }
}

/// How basePath applies to an item path.
///
/// Fixtures distinguish the two reference forms: a whole-group reference
/// composes basePath onto every item path, while a direct `Group/item`
/// reference lets an absolute item path win. Replicated as observed, not
/// unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathRule {
    AlwaysCompose,
    AbsoluteWins
}

fn normalize_group_item(
    group: &EndpointsDecl,
    key: &str,
    item: &EndpointItemSpec,
    rule: PathRule
) -> Option<Endpoint> {
    if !item.enable.unwrap_or(true) {
        return None;
    }

    let name = item.name.clone().unwrap_or_else(|| key.to_owned());
    let protocol = item.protocol.unwrap_or(EndpointProtocol::Http);
    let raw_path = item.path.clone().unwrap_or_else(|| key.to_owned());

    let path = match protocol {
        // SNMP paths are OIDs; no slash handling at all.
        EndpointProtocol::Snmp => raw_path,
        EndpointProtocol::Http => match rule {
            PathRule::AlwaysCompose => compose_path(group.base_path.as_deref(), &raw_path),
            PathRule::AbsoluteWins => {
                if raw_path.starts_with('/') {
                    raw_path
                } else {
                    compose_path(group.base_path.as_deref(), &raw_path)
                }
            }
        }
    };

    Some(Endpoint {
        enable: true,
        name,
        path,
        protocol,
        numerical_enums: matches!(protocol, EndpointProtocol::Snmp)
            .then(|| item.numerical_enums.unwrap_or(false))
    })
}

/// Normalizes an inline endpoint object from an `endpointList` array.
fn merge_inline_item(item: &EndpointItemSpec, endpoints: &mut BTreeMap<String, Endpoint>) {
    if !item.enable.unwrap_or(true) {
        return;
    }

    let protocol = item.protocol.unwrap_or(EndpointProtocol::Http);
    let raw_path = item
        .path
        .clone()
        .or_else(|| item.name.clone())
        .unwrap_or_default();
    let name = item
        .name
        .clone()
        .unwrap_or_else(|| raw_path.trim_start_matches('/').to_owned());
    let path = match protocol {
        EndpointProtocol::Snmp => raw_path,
        EndpointProtocol::Http => ensure_leading_slash(&raw_path)
    };

    let endpoint = Endpoint {
        enable: true,
        name: name.clone(),
        path,
        protocol,
        numerical_enums: matches!(protocol, EndpointProtocol::Snmp)
            .then(|| item.numerical_enums.unwrap_or(false))
    };
    endpoints.insert(name, endpoint);
}

/// Joins a basePath prefix with an item path, normalizing slashes.
fn compose_path(base_path: Option<&str>, path: &str) -> String {
    let base = base_path.map(|value| value.trim_matches('/')).filter(|value| !value.is_empty());
    match base {
        Some(base) => format!("/{base}/{}", path.trim_start_matches('/')),
        None => ensure_leading_slash(path)
    }
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use crate::declaration::{Declaration, EndpointProtocol, Node};

    use super::normalize_endpoint_list;

    fn endpoint_map(yaml: &str, poller: &str) -> Vec<(String, String)> {
        let declaration: Declaration =
            serde_yaml::from_str(yaml).expect("declaration should deserialize");
        let Some(Node::SystemPoller(decl)) = declaration.entries.get(poller) else {
            panic!("expected poller {poller}");
        };
        let spec = decl.endpoint_list.as_ref().expect("endpoint list present");
        normalize_endpoint_list(&declaration.entries, poller, spec)
            .expect("endpoint list should normalize")
            .into_iter()
            .map(|(name, endpoint)| (name, endpoint.path))
            .collect()
    }

    #[test]
    fn disabled_group_contributes_nothing() {
        let endpoints = endpoint_map(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList: Disabled_Endpoints
            Disabled_Endpoints:
              class: Telemetry_Endpoints
              enable: false
              items:
                stillEnabled:
                  enable: true
                  path: /stillEnabled
            "#,
            "Poller"
        );
        assert!(endpoints.is_empty());
    }

    #[test]
    fn group_reference_composes_base_path_even_for_absolute_paths() {
        let endpoints = endpoint_map(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList:
                - My_Endpoints
            My_Endpoints:
              class: Telemetry_Endpoints
              basePath: basePath2/
              items:
                enabledEndpoint2:
                  path: /enabledEndpoint2
            "#,
            "Poller"
        );
        assert_eq!(
            endpoints,
            [("enabledEndpoint2".to_owned(), "/basePath2/enabledEndpoint2".to_owned())]
        );
    }

    #[test]
    fn item_reference_lets_absolute_path_win() {
        let endpoints = endpoint_map(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList:
                - My_Endpoints/absoluteItem
                - My_Endpoints/relativeItem
            My_Endpoints:
              class: Telemetry_Endpoints
              basePath: base
              items:
                absoluteItem:
                  path: /absoluteItem
                relativeItem:
                  path: relativeItem
            "#,
            "Poller"
        );
        assert_eq!(
            endpoints,
            [
                ("absoluteItem".to_owned(), "/absoluteItem".to_owned()),
                ("relativeItem".to_owned(), "/base/relativeItem".to_owned())
            ]
        );
    }

    #[test]
    fn later_sources_overwrite_earlier_by_name() {
        let endpoints = endpoint_map(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList:
                - First_Endpoints
                - name: status
                  path: /overridden
            First_Endpoints:
              class: Telemetry_Endpoints
              items:
                status:
                  path: /original
            "#,
            "Poller"
        );
        assert_eq!(endpoints, [("status".to_owned(), "/overridden".to_owned())]);
    }

    #[test]
    fn disabled_items_are_skipped() {
        let endpoints = endpoint_map(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList: My_Endpoints
            My_Endpoints:
              class: Telemetry_Endpoints
              items:
                enabledEndpoint:
                  path: /enabledEndpoint
                disabledEndpoint:
                  enable: false
                  path: /disabledEndpoint
            "#,
            "Poller"
        );
        assert_eq!(endpoints, [("enabledEndpoint".to_owned(), "/enabledEndpoint".to_owned())]);
    }

    #[test]
    fn item_path_defaults_to_its_key() {
        let endpoints = endpoint_map(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList: My_Endpoints
            My_Endpoints:
              class: Telemetry_Endpoints
              items:
                status: {}
            "#,
            "Poller"
        );
        assert_eq!(endpoints, [("status".to_owned(), "/status".to_owned())]);
    }

    #[test]
    fn snmp_items_keep_oid_paths_and_numerical_enums() {
        let declaration: Declaration = serde_yaml::from_str(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList: My_Endpoints
            My_Endpoints:
              class: Telemetry_Endpoints
              basePath: ignored
              items:
                sysStats:
                  protocol: snmp
                  path: 1.3.6.1.4.1.3375
                  numericalEnums: true
            "#
        )
        .expect("declaration should deserialize");

        let Some(Node::SystemPoller(decl)) = declaration.entries.get("Poller") else {
            panic!("expected poller");
        };
        let endpoints = normalize_endpoint_list(
            &declaration.entries,
            "Poller",
            decl.endpoint_list.as_ref().expect("endpoint list")
        )
        .expect("endpoint list should normalize");

        let endpoint = endpoints.get("sysStats").expect("snmp endpoint");
        assert_eq!(endpoint.path, "1.3.6.1.4.1.3375");
        assert_eq!(endpoint.protocol, EndpointProtocol::Snmp);
        assert_eq!(endpoint.numerical_enums, Some(true));
    }

    #[test]
    fn inline_endpoint_without_base_gains_leading_slash() {
        let endpoints = endpoint_map(
            r#"
            Poller:
              class: Telemetry_System_Poller
              endpointList:
                - name: bare
                  path: bare/path
            "#,
            "Poller"
        );
        assert_eq!(endpoints, [("bare".to_owned(), "/bare/path".to_owned())]);
    }
}
