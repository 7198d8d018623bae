//! Svcprobe standard services
//!
//! The four services behind the built-in aliases: `user`, `page`, `time`
//! and `config`.

#![warn(missing_docs)]

use std::sync::Arc;

use svcprobe_engine::{RegistryError, ServiceFactories, ServiceRegistry};
use svcprobe_sdk::Service;

pub mod config;
pub mod page;
pub mod time;
pub mod user;

pub use config::ConfigService;
pub use page::{Page, PageService};
pub use time::TimeService;
pub use user::{User, UserService};

type Constructor = fn() -> Arc<dyn Service>;

/// Built-in alias -> constructor, in registration order
const BUILTIN_SERVICES: [(&str, Constructor); 4] = [
    ("user", || Arc::new(UserService::new())),
    ("page", || Arc::new(PageService::new())),
    ("time", || Arc::new(TimeService::new())),
    ("config", || Arc::new(ConfigService::new())),
];

/// Register a factory for every standard service type.
///
/// Types are registered under their full type path, so configuration may
/// name them either way (`TimeService` or `svcprobe_stdlib::time::TimeService`).
pub fn register_builtins(factories: &mut ServiceFactories) {
    for (_, construct) in BUILTIN_SERVICES {
        let type_name = construct().type_name().to_string();
        factories.register(&type_name, construct);
    }
}

/// Fresh registry holding one instance per built-in alias
pub fn builtin_registry() -> Result<ServiceRegistry, RegistryError> {
    let mut registry = ServiceRegistry::new();
    for (alias, construct) in BUILTIN_SERVICES {
        registry.register(alias, construct())?;
    }
    Ok(registry)
}
