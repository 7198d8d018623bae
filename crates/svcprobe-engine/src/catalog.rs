//! Service catalog
//!
//! Assembled once per request from the built-in and custom registries.
//! Built-in aliases are a fixed set injected at construction; a custom alias
//! that collides with one is shadowed by the built-in.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use svcprobe_sdk::{simple_name, Service};
use tracing::debug;

use crate::error::BrowseError;
use crate::links::Links;
use crate::registry::ServiceRegistry;

/// Aliases reserved for the built-in services
pub const DEFAULT_BUILTIN_ALIASES: [&str; 4] = ["user", "page", "time", "config"];

/// The fixed set of built-in aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinAliases(Vec<String>);

impl BuiltinAliases {
    /// Use an explicit alias set
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(aliases.into_iter().map(Into::into).collect())
    }

    /// Check if `alias` is reserved
    pub fn contains(&self, alias: &str) -> bool {
        self.0.iter().any(|a| a == alias)
    }

    /// Iterate the reserved aliases
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for BuiltinAliases {
    fn default() -> Self {
        Self::new(DEFAULT_BUILTIN_ALIASES)
    }
}

/// One alias in the catalog
#[derive(Clone)]
pub struct ServiceRegistration {
    /// Unique alias
    pub alias: String,
    /// Shared instance; its lifetime belongs to the registry owner
    pub instance: Arc<dyn Service>,
    /// Whether the alias is one of the built-in set
    pub built_in: bool,
}

/// Listing row for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Alias used in request paths
    pub alias: String,
    /// Type name without module path
    pub display_name: String,
    /// Whether the alias is built in
    pub built_in: bool,
    /// Link to the service page
    pub link: String,
}

/// Catalog listing with built-in and custom services kept apart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogListing {
    /// Built-in services
    pub builtin: Vec<CatalogEntry>,
    /// Custom services
    pub custom: Vec<CatalogEntry>,
}

impl CatalogListing {
    /// Built-in entries followed by custom entries
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.builtin.iter().chain(self.custom.iter())
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.builtin.len() + self.custom.len()
    }

    /// Check if the listing is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Request-scoped view over the registered services
pub struct ServiceCatalog {
    registrations: Vec<ServiceRegistration>,
    index: FxHashMap<String, usize>,
    links: Links,
}

impl ServiceCatalog {
    /// Merge `builtins` and `custom` into one catalog.
    ///
    /// Every alias in `builtin_aliases` is flagged built in, whichever
    /// registry supplied it. Built-in registrations win alias collisions.
    pub fn assemble(
        builtin_aliases: &BuiltinAliases,
        builtins: &ServiceRegistry,
        custom: &ServiceRegistry,
        links: Links,
    ) -> Self {
        let mut catalog = Self {
            registrations: Vec::with_capacity(builtins.len() + custom.len()),
            index: FxHashMap::default(),
            links,
        };

        for (alias, service) in builtins.iter() {
            catalog.insert(alias, service, builtin_aliases.contains(alias));
        }
        for (alias, service) in custom.iter() {
            if catalog.index.contains_key(alias) {
                debug!(alias, "custom service shadowed by built-in");
                continue;
            }
            catalog.insert(alias, service, builtin_aliases.contains(alias));
        }

        debug!(services = catalog.registrations.len(), "catalog assembled");
        catalog
    }

    fn insert(&mut self, alias: &str, service: &Arc<dyn Service>, built_in: bool) {
        self.index.insert(alias.to_string(), self.registrations.len());
        self.registrations.push(ServiceRegistration {
            alias: alias.to_string(),
            instance: Arc::clone(service),
            built_in,
        });
    }

    /// Resolve an alias to its instance
    pub fn lookup(&self, alias: &str) -> Result<&Arc<dyn Service>, BrowseError> {
        self.registration(alias)
            .map(|r| &r.instance)
            .ok_or_else(|| BrowseError::UnknownService {
                alias: alias.to_string(),
            })
    }

    /// Full registration for an alias
    pub fn registration(&self, alias: &str) -> Option<&ServiceRegistration> {
        self.index.get(alias).map(|&i| &self.registrations[i])
    }

    /// All entries, built-in group first, each group sorted by display name then alias
    pub fn list_all(&self) -> Vec<CatalogEntry> {
        let listing = self.listing();
        listing.builtin.into_iter().chain(listing.custom).collect()
    }

    /// Entries split into built-in and custom groups
    pub fn listing(&self) -> CatalogListing {
        let mut listing = CatalogListing::default();
        for registration in &self.registrations {
            let entry = CatalogEntry {
                alias: registration.alias.clone(),
                display_name: simple_name(registration.instance.type_name()).to_string(),
                built_in: registration.built_in,
                link: self.links.service(&registration.alias),
            };
            if entry.built_in {
                listing.builtin.push(entry);
            } else {
                listing.custom.push(entry);
            }
        }
        let by_name = |a: &CatalogEntry, b: &CatalogEntry| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.alias.cmp(&b.alias))
        };
        listing.builtin.sort_by(by_name);
        listing.custom.sort_by(by_name);
        listing
    }

    /// Links used for entries
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Number of aliases
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::OnceLock;
    use svcprobe_sdk::{ClassBuilder, ClassInfo};

    macro_rules! fixture_service {
        ($ty:ident, $path:expr) => {
            struct $ty;

            impl Service for $ty {
                fn class_info(&self) -> &ClassInfo {
                    static CLASS: OnceLock<ClassInfo> = OnceLock::new();
                    CLASS.get_or_init(|| ClassBuilder::<$ty>::named($path).build())
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        };
    }

    fixture_service!(Clock, "core::services::TimeService");
    fixture_service!(Users, "core::services::UserService");
    fixture_service!(Mailer, "app::Mailer");
    fixture_service!(Archive, "app::Archive");

    fn catalog() -> ServiceCatalog {
        let mut builtins = ServiceRegistry::new();
        builtins.register("time", Arc::new(Clock)).unwrap();
        builtins.register("user", Arc::new(Users)).unwrap();

        let mut custom = ServiceRegistry::new();
        custom.register("mail", Arc::new(Mailer)).unwrap();
        custom.register("time", Arc::new(Mailer)).unwrap();
        custom.register("archive", Arc::new(Archive)).unwrap();

        ServiceCatalog::assemble(&BuiltinAliases::default(), &builtins, &custom, Links::default())
    }

    #[test]
    fn test_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.lookup("mail").unwrap().type_name(), "app::Mailer");
        assert_eq!(
            catalog.lookup("nope").err(),
            Some(BrowseError::UnknownService { alias: "nope".into() })
        );
    }

    #[test]
    fn test_builtin_shadows_custom() {
        let catalog = catalog();
        assert_eq!(
            catalog.lookup("time").unwrap().type_name(),
            "core::services::TimeService"
        );
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_listing_groups_and_sorts() {
        let listing = catalog().listing();
        let builtin: Vec<&str> = listing.builtin.iter().map(|e| e.display_name.as_str()).collect();
        let custom: Vec<&str> = listing.custom.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(builtin, vec!["TimeService", "UserService"]);
        assert_eq!(custom, vec!["Archive", "Mailer"]);
        assert!(listing.builtin.iter().all(|e| e.built_in));
        assert!(listing.custom.iter().all(|e| !e.built_in));
        assert_eq!(listing.custom[1].link, "/browser/mail");
    }

    #[test]
    fn test_list_all_puts_builtins_first() {
        let all = catalog().list_all();
        let aliases: Vec<&str> = all.iter().map(|e| e.alias.as_str()).collect();
        assert_eq!(aliases, vec!["time", "user", "archive", "mail"]);
    }

    #[test]
    fn test_reserved_alias_from_custom_registry_is_builtin() {
        let mut custom = ServiceRegistry::new();
        custom.register("page", Arc::new(Archive)).unwrap();
        let catalog = ServiceCatalog::assemble(
            &BuiltinAliases::default(),
            &ServiceRegistry::new(),
            &custom,
            Links::default(),
        );
        assert!(catalog.registration("page").unwrap().built_in);
    }
}
