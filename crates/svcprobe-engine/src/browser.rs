//! The browser pipeline
//!
//! One [`ServiceBrowser::handle`] call runs a request path through the whole
//! pipeline: path resolution, catalog lookup, introspection, binding and
//! guarded invocation. Every failure mode ends up as data in the returned
//! [`BrowseOutcome`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use svcprobe_sdk::{simple_name, Service};
use tracing::{debug, info};

use crate::binder::{bind, InvocationPlan};
use crate::catalog::{BuiltinAliases, CatalogListing, ServiceCatalog};
use crate::config::BrowserConfig;
use crate::display::display_arguments;
use crate::dispatch::{Dispatcher, InvocationResult};
use crate::error::BrowseError;
use crate::introspect::{resolve, MethodListing, ParameterDescriptor};
use crate::links::Links;
use crate::path::{parse_request, ParsedRequest};
use crate::registry::ServiceRegistry;

/// `Type.identifier(args)` heading for a resolved call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSignature {
    /// Simple type name of the service
    pub type_name: String,
    /// Method identifier
    pub identifier: String,
    /// Supplied arguments as displayed
    pub arguments: String,
}

impl fmt::Display for CallSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.type_name, self.identifier, self.arguments)
    }
}

/// Description of the form that collects missing arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputForm {
    /// Heading for the field set
    pub legend: String,
    /// Link the form submits to
    pub action: String,
    /// One field per parameter, in declaration order
    pub fields: Vec<ParameterDescriptor>,
}

impl InputForm {
    /// Form for `fields`, submitting to `action`
    pub fn new(fields: &[ParameterDescriptor], action: String) -> Self {
        Self {
            legend: format!("{} additional argument(s) required for this method", fields.len()),
            action,
            fields: fields.to_vec(),
        }
    }
}

/// A call that resolved to a method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCall {
    /// Call heading
    pub signature: CallSignature,
    /// Binder decision
    pub plan: InvocationPlan,
    /// Present when input is needed
    pub form: Option<InputForm>,
    /// Present when the method ran
    pub result: Option<InvocationResult>,
}

/// What happened to the call part of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallOutcome {
    /// Alias not in the catalog
    UnknownService {
        /// Requested alias
        alias: String,
    },
    /// Call alias matched no callable method
    UnknownMethod {
        /// Identifier derived from the call alias
        identifier: String,
    },
    /// Method resolved
    Resolved(ResolvedCall),
}

/// Everything a renderer needs for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseOutcome {
    /// The parsed path
    pub request: ParsedRequest,
    /// Catalog, built-in and custom groups
    pub services: CatalogListing,
    /// Methods of the selected service
    pub methods: Option<MethodListing>,
    /// Call outcome, when a service was named
    pub call: Option<CallOutcome>,
}

/// Hosts the pipeline over a built-in and a custom registry
pub struct ServiceBrowser {
    config: BrowserConfig,
    links: Links,
    dispatcher: Dispatcher,
    builtin_aliases: BuiltinAliases,
    builtins: ServiceRegistry,
    custom: ServiceRegistry,
}

impl ServiceBrowser {
    /// Create a browser over a built-in and a custom registry
    pub fn new(config: BrowserConfig, builtins: ServiceRegistry, custom: ServiceRegistry) -> Self {
        let links = config.links();
        let dispatcher = Dispatcher::new(&config.trace_root());
        let builtin_aliases = config.builtin_aliases();
        Self {
            config,
            links,
            dispatcher,
            builtin_aliases,
            builtins,
            custom,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Link builder
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Assemble a catalog over the current registries
    pub fn catalog(&self) -> ServiceCatalog {
        ServiceCatalog::assemble(
            &self.builtin_aliases,
            &self.builtins,
            &self.custom,
            self.links.clone(),
        )
    }

    /// Callable methods of the service under `alias`
    pub fn methods(&self, alias: &str) -> Result<MethodListing, BrowseError> {
        let catalog = self.catalog();
        let service = catalog.lookup(alias)?;
        Ok(MethodListing::new(service.as_ref(), alias, &self.links))
    }

    /// Run one request path through the pipeline.
    pub fn handle(&self, path: &str) -> BrowseOutcome {
        let path = path.strip_prefix('/').unwrap_or(path);
        let request = parse_request(path, self.config.ignore_count());
        debug!(
            service = %request.service_alias,
            call = %request.call_alias,
            arguments = request.raw_arguments.len(),
            "request parsed"
        );

        let catalog = self.catalog();
        let services = catalog.listing();

        if request.service_alias.is_empty() {
            return BrowseOutcome {
                request,
                services,
                methods: None,
                call: None,
            };
        }

        let service = match catalog.lookup(&request.service_alias) {
            Ok(service) => Arc::clone(service),
            Err(err) => {
                info!(alias = %request.service_alias, "{}", err);
                let call = CallOutcome::UnknownService {
                    alias: request.service_alias.clone(),
                };
                return BrowseOutcome {
                    request,
                    services,
                    methods: None,
                    call: Some(call),
                };
            }
        };

        let methods = MethodListing::new(service.as_ref(), &request.service_alias, &self.links);
        let call = if request.call_alias.is_empty() {
            None
        } else {
            Some(self.call(service.as_ref(), &request))
        };

        BrowseOutcome {
            request,
            services,
            methods: Some(methods),
            call,
        }
    }

    fn call(&self, service: &dyn Service, request: &ParsedRequest) -> CallOutcome {
        let handle = match resolve(service, &request.call_alias) {
            Ok(handle) => handle,
            Err(err) => {
                info!(call = %request.call_alias, "{}", err);
                return match err {
                    BrowseError::UnknownMethod { identifier, .. } => {
                        CallOutcome::UnknownMethod { identifier }
                    }
                    BrowseError::UnknownService { alias } => CallOutcome::UnknownService { alias },
                };
            }
        };

        let signature = CallSignature {
            type_name: simple_name(handle.type_name()).to_string(),
            identifier: handle.identifier().to_string(),
            arguments: display_arguments(&request.argument_values()),
        };

        let plan = bind(&request.raw_arguments, handle.parameters());
        let form = plan.missing_parameters().map(|fields| {
            let action = self.links.call(&request.service_alias, &request.call_alias);
            InputForm::new(fields, action)
        });
        let result = plan
            .call_arguments()
            .map(|args| self.dispatcher.invoke(service, &handle, args));

        debug!(%signature, plan = plan.kind(), invoked = result.is_some(), "call handled");
        CallOutcome::Resolved(ResolvedCall {
            signature,
            plan,
            form,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::OnceLock;
    use svcprobe_sdk::{ClassBuilder, ClassInfo, Param, Value};

    struct Greeter;

    impl Service for Greeter {
        fn class_info(&self) -> &ClassInfo {
            static CLASS: OnceLock<ClassInfo> = OnceLock::new();
            CLASS.get_or_init(|| {
                ClassBuilder::<Greeter>::named("demo::Greeter")
                    .method(
                        "sayHello",
                        &[Param::required("name"), Param::optional("punctuation", "!")],
                        |_s, args| {
                            let name = svcprobe_sdk::arg_str(args, 0, "name")?;
                            Ok(Value::from(format!("Hello {name}")))
                        },
                    )
                    .build()
            })
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn browser() -> ServiceBrowser {
        let mut custom = ServiceRegistry::new();
        custom.register("greet", Arc::new(Greeter)).unwrap();
        ServiceBrowser::new(BrowserConfig::default(), ServiceRegistry::new(), custom)
    }

    #[test]
    fn test_landing_page() {
        let outcome = browser().handle("/browser");
        assert!(outcome.call.is_none());
        assert!(outcome.methods.is_none());
        assert_eq!(outcome.services.custom.len(), 1);
    }

    #[test]
    fn test_service_page_lists_methods() {
        let outcome = browser().handle("browser/greet");
        let methods = outcome.methods.unwrap();
        assert_eq!(methods.service_name, "Greeter");
        assert_eq!(methods.entries[0].url_token, "say-hello");
        assert!(outcome.call.is_none());
    }

    #[test]
    fn test_unknown_service() {
        let outcome = browser().handle("browser/nope/x");
        assert_eq!(
            outcome.call,
            Some(CallOutcome::UnknownService { alias: "nope".into() })
        );
        assert_eq!(outcome.services.custom.len(), 1);
    }

    #[test]
    fn test_unknown_method() {
        let outcome = browser().handle("browser/greet/wave-goodbye");
        assert_eq!(
            outcome.call,
            Some(CallOutcome::UnknownMethod {
                identifier: "waveGoodbye".into()
            })
        );
        assert!(outcome.methods.is_some());
    }

    #[test]
    fn test_form_when_required_missing() {
        let outcome = browser().handle("browser/greet/say-hello");
        let Some(CallOutcome::Resolved(call)) = outcome.call else {
            panic!("expected resolved call");
        };
        assert_eq!(call.signature.to_string(), "Greeter.sayHello()");
        let form = call.form.unwrap();
        assert_eq!(form.legend, "2 additional argument(s) required for this method");
        assert_eq!(form.action, "/browser/greet/say-hello");
        assert!(call.result.is_none());
    }

    #[test]
    fn test_call_with_arguments() {
        let outcome = browser().handle("browser/greet/say-hello/Ada");
        let Some(CallOutcome::Resolved(call)) = outcome.call else {
            panic!("expected resolved call");
        };
        assert_eq!(call.signature.to_string(), "Greeter.sayHello('Ada')");
        assert!(call.form.is_none());
        assert_eq!(
            call.result,
            Some(InvocationResult::Success {
                display_value: "Hello Ada".into()
            })
        );
    }
}
