//! Engine error types.

/// Lookup failures while resolving a request. Neither is fatal: the browser
/// turns both into displayable outcomes and keeps rendering the catalogs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrowseError {
    /// Alias not present in the catalog
    #[error("No service registered as '{alias}'")]
    UnknownService {
        /// Requested alias
        alias: String,
    },

    /// Call alias does not name a callable method
    #[error("No service call matching {identifier}")]
    UnknownMethod {
        /// Service type the lookup ran against
        service: String,
        /// Identifier derived from the call alias
        identifier: String,
    },
}

/// Errors while assembling a registry from configured aliases. These are
/// integration-boundary failures and abort the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Alias registered twice
    #[error("Service alias '{0}' is already registered")]
    DuplicateAlias(String),

    /// Alias outside the path-segment alphabet
    #[error("Invalid service alias '{0}': use letters, digits, '_' and '-'")]
    InvalidAlias(String),

    /// No factory for the configured type
    #[error("Service '{alias}' refers to unknown type '{type_name}'")]
    UnknownType {
        /// Configured alias
        alias: String,
        /// Configured type name
        type_name: String,
    },

    /// Simple name matches more than one registered type
    #[error("Service '{alias}' type '{type_name}' is ambiguous; use the full type path")]
    AmbiguousType {
        /// Configured alias
        alias: String,
        /// Configured type name
        type_name: String,
    },
}
