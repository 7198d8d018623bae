//! Alias -> service instance registry and type-name factories
//!
//! The registry is owned by whoever hosts the console; the catalog only
//! clones the `Arc`s it needs for one request. Factories let a configuration
//! file name service types instead of instances.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use svcprobe_sdk::{simple_name, Service};

use crate::error::RegistryError;

/// Constructs a fresh service instance
pub type ServiceFactory = Arc<dyn Fn() -> Arc<dyn Service> + Send + Sync>;

/// Insertion-ordered alias -> instance map
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    entries: Vec<(String, Arc<dyn Service>)>,
}

impl ServiceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance under `alias`
    pub fn register(
        &mut self,
        alias: impl Into<String>,
        service: Arc<dyn Service>,
    ) -> Result<(), RegistryError> {
        let alias = alias.into();
        if !is_valid_alias(&alias) {
            return Err(RegistryError::InvalidAlias(alias));
        }
        if self.contains(&alias) {
            return Err(RegistryError::DuplicateAlias(alias));
        }
        self.entries.push((alias, service));
        Ok(())
    }

    /// Build a registry from `alias -> type name` pairs
    pub fn from_aliases(
        aliases: &BTreeMap<String, String>,
        factories: &ServiceFactories,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (alias, type_name) in aliases {
            let service = factories.create(alias, type_name)?;
            registry.register(alias.clone(), service)?;
        }
        Ok(registry)
    }

    /// Get the instance registered under `alias`
    pub fn get(&self, alias: &str) -> Option<&Arc<dyn Service>> {
        self.entries.iter().find(|(a, _)| a == alias).map(|(_, s)| s)
    }

    /// Check if `alias` is registered
    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    /// Iterate in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Service>)> {
        self.entries.iter().map(|(a, s)| (a.as_str(), s))
    }

    /// Number of registered aliases
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(a, s)| (a, s.type_name())))
            .finish()
    }
}

/// Aliases share the path-segment alphabet minus `,` and `%`
pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Service factories indexed by type name.
///
/// Lookups accept the full type path or, when unambiguous, its simple name.
#[derive(Clone, Default)]
pub struct ServiceFactories {
    factories: FxHashMap<String, ServiceFactory>,
    // simple name -> full names sharing it
    simple: FxHashMap<String, Vec<String>>,
}

impl ServiceFactories {
    /// Create an empty factory table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a full type name
    pub fn register(
        &mut self,
        type_name: &str,
        factory: impl Fn() -> Arc<dyn Service> + Send + Sync + 'static,
    ) {
        if self.factories.insert(type_name.to_string(), Arc::new(factory)).is_none() {
            self.simple
                .entry(simple_name(type_name).to_string())
                .or_default()
                .push(type_name.to_string());
        }
    }

    /// Instantiate the type configured for `alias`
    pub fn create(&self, alias: &str, type_name: &str) -> Result<Arc<dyn Service>, RegistryError> {
        if let Some(factory) = self.factories.get(type_name) {
            return Ok(factory());
        }
        match self.simple.get(type_name).map(Vec::as_slice) {
            Some([full]) => match self.factories.get(full) {
                Some(factory) => Ok(factory()),
                None => Err(unknown(alias, type_name)),
            },
            Some([_, _, ..]) => Err(RegistryError::AmbiguousType {
                alias: alias.to_string(),
                type_name: type_name.to_string(),
            }),
            _ => Err(unknown(alias, type_name)),
        }
    }

    /// Check if a type name resolves
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name) || self.simple.contains_key(type_name)
    }

    /// Registered full type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn unknown(alias: &str, type_name: &str) -> RegistryError {
    RegistryError::UnknownType {
        alias: alias.to_string(),
        type_name: type_name.to_string(),
    }
}
