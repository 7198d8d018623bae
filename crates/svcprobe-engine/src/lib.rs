//! Svcprobe engine
//!
//! Resolves a browsing request such as `browser/time/get-current` into a call
//! against a registered service:
//!
//! 1. [`path`] splits the request into a service alias, a call alias and raw arguments
//! 2. [`catalog`] looks the alias up among the built-in and custom services
//! 3. [`introspect`] turns the call alias into a callable method and its parameters
//! 4. [`binder`] decides whether to call now, call with defaults or ask for input
//! 5. [`dispatch`] runs the call inside a failure boundary
//!
//! [`browser::ServiceBrowser`] drives the stages and returns plain data for a
//! renderer. [`naming`] translates between URL tokens and method identifiers.

#![warn(missing_docs)]

pub mod binder;
pub mod browser;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod introspect;
pub mod links;
pub mod naming;
pub mod path;
pub mod registry;

pub use binder::{bind, ArgumentSource, BoundArguments, InvocationPlan};
pub use browser::{
    BrowseOutcome, CallOutcome, CallSignature, InputForm, ResolvedCall, ServiceBrowser,
};
pub use catalog::{
    BuiltinAliases, CatalogEntry, CatalogListing, ServiceCatalog, ServiceRegistration,
    DEFAULT_BUILTIN_ALIASES,
};
pub use config::{BrowserConfig, BrowserSection, ConfigError, CONFIG_FILE_NAME};
pub use dispatch::{Dispatcher, ErrorReport, InvocationResult};
pub use display::{display_arguments, dump};
pub use error::{BrowseError, RegistryError};
pub use introspect::{
    is_callable, list_callable, resolve, InputKind, ListedMethod, MethodHandle, MethodListing,
    MethodSummary, ParameterDescriptor,
};
pub use links::Links;
pub use naming::{to_method_identifier, to_url_token};
pub use path::{parse_request, ParsedRequest, RawArgument};
pub use registry::{ServiceFactories, ServiceFactory, ServiceRegistry};
