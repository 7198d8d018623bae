//! Method introspection over service descriptor tables
//!
//! Decides which members are callable from outside and turns their declared
//! parameters into [`ParameterDescriptor`]s. Resolution yields a
//! [`MethodHandle`] that carries the handler itself, so the dispatcher never
//! looks a method up by name.

use std::fmt;

use serde::Serialize;
use svcprobe_sdk::{simple_name, DefaultValue, MethodHandler, MethodInfo, ParameterInfo, Service};
use tracing::debug;

use crate::error::BrowseError;
use crate::links::Links;
use crate::naming::{to_method_identifier, to_url_token};

/// Identifier prefix reserved for internal members
pub const RESERVED_PREFIX: &str = "__";

/// Form input hint for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Plain text field
    Text,
    /// Masked field
    Secret,
}

impl InputKind {
    /// `Secret` exactly when the parameter is named `password`
    pub fn for_parameter(name: &str) -> Self {
        if name == "password" {
            InputKind::Secret
        } else {
            InputKind::Text
        }
    }
}

/// Descriptor for one declared parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    /// Declared name
    pub name: String,
    /// 0-based position in the signature
    pub position: usize,
    /// Whether a default is declared
    pub optional: bool,
    /// Declared default
    pub default_value: Option<DefaultValue>,
    /// Default as shown in a form field
    pub default_display: Option<String>,
    /// Input hint
    pub input_kind: InputKind,
    /// Humanised name for a form label
    pub label: String,
    /// Form field id
    pub field_id: String,
}

impl ParameterDescriptor {
    /// Describe a declared parameter
    pub fn from_info(info: &ParameterInfo) -> Self {
        Self {
            name: info.name.clone(),
            position: info.index,
            optional: info.is_optional(),
            default_value: info.default.clone(),
            default_display: info.default.as_ref().map(display_default),
            input_kind: InputKind::for_parameter(&info.name),
            label: humanize(&info.name),
            field_id: format!("serviceInput{}", info.index),
        }
    }

    /// `"optional"` or `"required"`
    pub fn requirement(&self) -> &'static str {
        if self.optional {
            "optional"
        } else {
            "required"
        }
    }
}

/// Text shown for a declared default
pub fn display_default(default: &DefaultValue) -> String {
    match default {
        DefaultValue::Null => "null".to_string(),
        DefaultValue::Bool(b) => b.to_string(),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Str(s) => s.clone(),
    }
}

/// `userName` -> `User name`
pub fn humanize(name: &str) -> String {
    let mut words = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            words.push(' ');
        }
        prev_lower = c.is_ascii_lowercase();
        words.push(if c == '_' { ' ' } else { c.to_ascii_lowercase() });
    }
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// A callable method as shown in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSummary {
    /// Method identifier
    pub name: String,
    /// Hyphen-case call alias
    pub url_token: String,
}

/// Listing row with its link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedMethod {
    /// Method identifier
    pub name: String,
    /// Hyphen-case call alias
    pub url_token: String,
    /// Link to the call page
    pub link: String,
}

/// Methods of the selected service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodListing {
    /// Simple type name of the service
    pub service_name: String,
    /// Callable methods, sorted by name
    pub entries: Vec<ListedMethod>,
}

impl MethodListing {
    /// List `service`'s callable methods, linking each under `alias`
    pub fn new(service: &dyn Service, alias: &str, links: &Links) -> Self {
        let entries = list_callable(service)
            .into_iter()
            .map(|summary| ListedMethod {
                link: links.call(alias, &summary.url_token),
                name: summary.name,
                url_token: summary.url_token,
            })
            .collect();
        Self {
            service_name: simple_name(service.type_name()).to_string(),
            entries,
        }
    }
}

/// Public, instance, non-constructor and not reserved
pub fn is_callable(method: &MethodInfo) -> bool {
    method.is_public()
        && !method.is_static()
        && !method.is_constructor()
        && !method.name.starts_with(RESERVED_PREFIX)
}

/// Callable methods the service's own type declares, sorted by name
pub fn list_callable(service: &dyn Service) -> Vec<MethodSummary> {
    let class = service.class_info();
    let mut summaries: Vec<MethodSummary> = class
        .methods
        .iter()
        .filter(|m| m.declaring_type == class.name && is_callable(m))
        .map(|m| MethodSummary {
            name: m.name.clone(),
            url_token: to_url_token(&m.name),
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

/// A resolved method, ready to be bound and invoked
#[derive(Clone)]
pub struct MethodHandle {
    identifier: String,
    type_name: String,
    declaring_type: String,
    parameters: Vec<ParameterDescriptor>,
    handler: MethodHandler,
}

impl MethodHandle {
    /// Method identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Type name of the service the method was resolved on
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type that declares the method
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// The callable body
    pub fn handler(&self) -> &MethodHandler {
        &self.handler
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("identifier", &self.identifier)
            .field("type_name", &self.type_name)
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Resolve a call alias against `service`.
///
/// Inherited methods resolve even though listings leave them out.
pub fn resolve(service: &dyn Service, url_token: &str) -> Result<MethodHandle, BrowseError> {
    let identifier = to_method_identifier(url_token);
    let class = service.class_info();

    let method = match class.get_method(&identifier) {
        Some(method) if is_callable(method) => method,
        _ => {
            debug!(service = %class.name, %identifier, "no callable method");
            return Err(BrowseError::UnknownMethod {
                service: class.name.clone(),
                identifier,
            });
        }
    };

    let parameters = method
        .parameters
        .iter()
        .map(ParameterDescriptor::from_info)
        .collect();

    debug!(service = %class.name, %identifier, "method resolved");
    Ok(MethodHandle {
        identifier,
        type_name: class.name.clone(),
        declaring_type: method.declaring_type.clone(),
        parameters,
        handler: method.handler().clone(),
    })
}
