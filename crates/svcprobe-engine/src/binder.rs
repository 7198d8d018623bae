//! Argument binding
//!
//! Compares the raw path arguments with a method's parameters and decides
//! how the call proceeds.
//!
//! Binding is permissive: once any raw argument is present the arguments
//! are passed through as given, with no arity or type check. Mismatches
//! surface as invocation failures.

use serde::Serialize;
use svcprobe_sdk::Value;
use tracing::debug;

use crate::introspect::ParameterDescriptor;
use crate::path::RawArgument;

/// Where bound values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentSource {
    /// Method takes no parameters
    Empty,
    /// Raw arguments passed through
    Supplied,
    /// Declared defaults
    Defaults,
}

/// Ordered values for one call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundArguments {
    /// Positional values
    pub values: Vec<Value>,
    /// Origin of the values
    pub source: ArgumentSource,
}

impl BoundArguments {
    /// No arguments
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            source: ArgumentSource::Empty,
        }
    }

    /// Raw arguments as given
    pub fn supplied(raw: &[RawArgument]) -> Self {
        Self {
            values: raw.iter().map(RawArgument::to_value).collect(),
            source: ArgumentSource::Supplied,
        }
    }

    /// Declared defaults, or `None` when a parameter is required
    pub fn defaults(parameters: &[ParameterDescriptor]) -> Option<Self> {
        if !all_optional(parameters) {
            return None;
        }
        let values = parameters
            .iter()
            .map(|p| p.default_value.clone().map(Value::from).unwrap_or_default())
            .collect();
        Some(Self {
            values,
            source: ArgumentSource::Defaults,
        })
    }

    /// Number of bound values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The binder's decision
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum InvocationPlan {
    /// Call now
    Ready(BoundArguments),
    /// Ask for input; `defaults` is set when every parameter has one
    NeedsInput {
        /// Every declared parameter, in order
        missing_parameters: Vec<ParameterDescriptor>,
        /// Call that may run alongside the form
        defaults: Option<BoundArguments>,
    },
}

impl InvocationPlan {
    /// Arguments to invoke with, if any call should happen
    pub fn call_arguments(&self) -> Option<&BoundArguments> {
        match self {
            InvocationPlan::Ready(args) => Some(args),
            InvocationPlan::NeedsInput { defaults, .. } => defaults.as_ref(),
        }
    }

    /// Parameters to ask for
    pub fn missing_parameters(&self) -> Option<&[ParameterDescriptor]> {
        match self {
            InvocationPlan::Ready(_) => None,
            InvocationPlan::NeedsInput {
                missing_parameters, ..
            } => Some(missing_parameters),
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationPlan::Ready(_) => "ready",
            InvocationPlan::NeedsInput { defaults: None, .. } => "needs_input",
            InvocationPlan::NeedsInput { .. } => "needs_input_with_defaults",
        }
    }
}

/// Decide how a call with `raw` arguments proceeds against `parameters`.
pub fn bind(raw: &[RawArgument], parameters: &[ParameterDescriptor]) -> InvocationPlan {
    let plan = if parameters.is_empty() {
        InvocationPlan::Ready(BoundArguments::empty())
    } else if raw.is_empty() && raw.len() != parameters.len() {
        InvocationPlan::NeedsInput {
            missing_parameters: parameters.to_vec(),
            defaults: BoundArguments::defaults(parameters),
        }
    } else {
        InvocationPlan::Ready(BoundArguments::supplied(raw))
    };
    debug!(
        parameters = parameters.len(),
        required = required_count(parameters),
        supplied = raw.len(),
        plan = plan.kind(),
        "arguments bound"
    );
    plan
}

/// Whether every parameter declares a default
pub fn all_optional(parameters: &[ParameterDescriptor]) -> bool {
    parameters.iter().all(|p| p.optional)
}

/// Number of parameters without a default
pub fn required_count(parameters: &[ParameterDescriptor]) -> usize {
    parameters.iter().filter(|p| !p.optional).count()
}
