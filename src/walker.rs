//! Declaration walking and normalization session orchestration.
//!
//! The walker visits the default namespace first, then every declared
//! `Telemetry_Namespace` in authoring order. Within a namespace it works in
//! dependency order: systems (emitting their pollers), standalone pollers,
//! listeners, consumers, pull consumers, and finally the namespace's slice
//! of the mapping table. All mutable state lives in the per-invocation
//! session, so concurrent normalization of independent declarations never
//! shares anything.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path
};

use tracing::{debug, info};

use crate::{
    component::{Component, NormalizedConfig},
    consumer,
    declaration::{Declaration, DeclarationMap, IHealthRef, Node, PollerRef},
    error::{self, Error},
    ident::{self, DEFAULT_NAMESPACE},
    ihealth, listener, mappings,
    poller::{self, PollerContext, SystemOverrides},
    resolver::{self, AnonymousNames}
};

/// Loads and normalizes a declaration from the provided file path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, the document cannot be
/// deserialized, or the declaration violates invariants during
/// normalization.
pub fn load_declaration(path: &Path) -> Result<NormalizedConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_declaration(&contents)
}

/// Parses and normalizes a declaration from the provided document string.
///
/// The parser accepts YAML and, since JSON is a YAML subset, raw JSON
/// declarations as well.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the document cannot be
/// decoded and normalization errors otherwise.
pub fn parse_declaration(contents: &str) -> Result<NormalizedConfig, Error> {
    let declaration: Declaration = serde_yaml::from_str(contents)?;
    normalize(&declaration)
}

/// Normalizes a parsed declaration into components and mappings.
///
/// The transformation is pure and synchronous: identical declarations
/// produce byte-identical output documents.
///
/// # Errors
///
/// Returns [`Error::Reference`] for dangling references,
/// [`Error::DuplicateId`] for id collisions, and [`Error::Conflict`] for
/// class-mismatched references.
pub fn normalize(declaration: &Declaration) -> Result<NormalizedConfig, Error> {
    let mut session = Session::default();

    // The default namespace always exists, even when every top-level entry
    // is a namespace container.
    session.walk_namespace(DEFAULT_NAMESPACE, &declaration.entries)?;

    for (name, node) in declaration.entries.iter() {
        if let Node::Namespace(namespace) = node {
            session.walk_namespace(name, &namespace.entries)?;
        }
    }

    info!(
        "normalized {} component(s), {} mapping key(s)",
        session.components.len(),
        session.mappings.len()
    );

    Ok(NormalizedConfig {
        mappings: session.mappings,
        components: session.components
    })
}

/// Per-invocation normalization state.
#[derive(Debug, Default)]
struct Session {
    components: Vec<Component>,
    seen_ids: HashSet<String>,
    mappings: BTreeMap<String, Vec<String>>
}

impl Session {
    /// Appends a component, enforcing global id uniqueness.
    fn push(&mut self, component: Component) -> Result<(), Error> {
        if !self.seen_ids.insert(component.id().to_owned()) {
            return Err(Error::duplicate_id(component.id()));
        }
        self.components.push(component);
        Ok(())
    }

    /// Normalizes every component of one namespace, then its mappings.
    fn walk_namespace(&mut self, namespace: &str, entries: &DeclarationMap) -> Result<(), Error> {
        debug!("walking namespace '{}' ({} entries)", namespace, entries.len());

        let tmstats_required = consumer::namespace_requires_tmstats(entries);
        let mut anonymous = AnonymousNames::new();

        // Named pollers consumed by systems keep no standalone instance
        // (unless a pull consumer also needs one); plain-name pull consumer
        // references always resolve to the standalone instance, while
        // `System/poller` references pick an existing system-bound instance
        // and force nothing.
        let mut system_bound_pollers: HashSet<&str> = HashSet::new();
        let mut pull_bound_pollers: HashSet<&str> = HashSet::new();
        for (_, node) in entries.iter() {
            if let Node::PullConsumer(pull) = node {
                for reference in pull.system_poller.iter() {
                    if let PollerRef::Name(name) = reference {
                        let parts = resolver::parse_reference(name);
                        if parts.item.is_none() {
                            pull_bound_pollers.insert(parts.name);
                        }
                    }
                }
            }
        }

        // Systems first: they own pollers and iHealth pollers.
        for (system_name, node) in entries.iter() {
            let Node::System(system) = node else {
                continue;
            };
            let overrides = SystemOverrides::from_system(system);
            let owner = ident::component_id(namespace, None, system_name);

            if let Some(poller_refs) = system.system_poller.as_ref() {
                for reference in poller_refs.iter() {
                    let (decl, name, referenced) = match reference {
                        PollerRef::Name(name) => {
                            let decl =
                                resolver::resolve_system_poller(entries, system_name, name)?;
                            system_bound_pollers.insert(name.as_str());
                            (decl, name.clone(), true)
                        }
                        PollerRef::Inline(decl) => {
                            (decl, anonymous.next_poller_name(&owner), false)
                        }
                    };
                    let ctx = PollerContext {
                        namespace,
                        scope: entries,
                        scope_name: system_name,
                        overrides,
                        referenced,
                        pull_context: false,
                        tmstats_required
                    };
                    let component = poller::normalize_system_poller(decl, &name, &ctx)?;
                    self.push(Component::SystemPoller(component))?;
                }
            }

            if let Some(ihealth_ref) = system.ihealth_poller.as_ref() {
                let (decl, name, referenced) = match ihealth_ref {
                    IHealthRef::Name(name) => {
                        let decl =
                            resolver::resolve_ihealth_poller(entries, system_name, name)?;
                        (decl, name.clone(), true)
                    }
                    IHealthRef::Inline(decl) => (decl, "iHealthPoller_1".to_owned(), false)
                };
                let component = ihealth::normalize_ihealth_poller(
                    decl,
                    &name,
                    namespace,
                    system_name,
                    system,
                    referenced
                );
                self.push(Component::IHealthPoller(component))?;
            }
        }

        // Standalone pollers: top-level definitions no system consumed,
        // plus the shared instances pull consumers fetch from. Unbound
        // iHealth pollers are declaration noise and emit nothing.
        for (name, node) in entries.iter() {
            let Node::SystemPoller(decl) = node else {
                continue;
            };
            let pull_bound = pull_bound_pollers.contains(name);
            if system_bound_pollers.contains(name) && !pull_bound {
                continue;
            }
            let ctx = PollerContext {
                namespace,
                scope: entries,
                scope_name: name,
                overrides: SystemOverrides::standalone(),
                referenced: false,
                pull_context: pull_bound,
                tmstats_required
            };
            let component = poller::normalize_system_poller(decl, name, &ctx)?;
            self.push(Component::SystemPoller(component))?;
        }

        // Listeners.
        for (name, node) in entries.iter() {
            if let Node::Listener(decl) = node {
                let component = listener::normalize_listener(decl, name, namespace);
                self.push(Component::Listener(component))?;
            }
        }

        // Push consumers.
        for (name, node) in entries.iter() {
            if let Node::Consumer(decl) = node {
                let component = consumer::normalize_consumer(decl, name, namespace);
                self.push(Component::Consumer(component))?;
            }
        }

        // Pull consumers, their inline pollers, and their poller groups.
        for (name, node) in entries.iter() {
            let Node::PullConsumer(decl) = node else {
                continue;
            };
            let owner = ident::component_id(namespace, None, name);
            let mut seen_keys = HashSet::new();
            let mut poller_names = Vec::new();
            let mut poller_ids = Vec::new();

            for reference in decl.system_poller.iter() {
                let (poller_name, poller_id, key) = match reference {
                    PollerRef::Name(reference) => {
                        let parts = resolver::parse_reference(reference);
                        match parts.item {
                            // `System/poller` picks one poller instance
                            // bound to that system; systems were walked
                            // first, so the instance already exists.
                            Some(item) => {
                                resolver::resolve_system(entries, name, parts.name)?;
                                let poller_id =
                                    ident::component_id(namespace, Some(parts.name), item);
                                if !self.seen_ids.contains(&poller_id) {
                                    return Err(Error::reference(
                                        name,
                                        reference.as_str(),
                                        format!(
                                            "no poller '{item}' bound to system '{}'",
                                            parts.name
                                        )
                                    ));
                                }
                                (
                                    item.to_owned(),
                                    poller_id,
                                    resolver::dedup_key(namespace, parts.name, Some(item))
                                )
                            }
                            None => {
                                // Validates existence and class even though
                                // the standalone instance was already
                                // emitted.
                                resolver::resolve_system_poller(entries, name, parts.name)?;
                                (
                                    parts.name.to_owned(),
                                    ident::component_id(namespace, Some(parts.name), parts.name),
                                    resolver::dedup_key(namespace, parts.name, None)
                                )
                            }
                        }
                    }
                    PollerRef::Inline(inline) => {
                        let poller_name = anonymous.next_poller_name(&owner);
                        let ctx = PollerContext {
                            namespace,
                            scope: entries,
                            scope_name: name,
                            overrides: SystemOverrides::standalone(),
                            referenced: false,
                            pull_context: true,
                            tmstats_required
                        };
                        let component =
                            poller::normalize_system_poller(inline, &poller_name, &ctx)?;
                        let poller_id = component.id.clone();
                        self.push(Component::SystemPoller(component))?;
                        let key = resolver::dedup_key(namespace, &poller_name, None);
                        (poller_name, poller_id, key)
                    }
                };

                if seen_keys.insert(key) {
                    poller_names.push(poller_name);
                    poller_ids.push(poller_id);
                }
            }

            let component =
                consumer::normalize_pull_consumer(decl, name, namespace, poller_names);
            let group = consumer::build_poller_group(&component, poller_ids);
            self.push(Component::PullConsumer(component))?;
            self.push(Component::PullConsumerGroup(group))?;
        }

        mappings::build_namespace_mappings(namespace, &self.components, &mut self.mappings);
        Ok(())
    }
}
