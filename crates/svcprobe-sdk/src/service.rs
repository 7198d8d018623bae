//! Service trait and method descriptor tables
//!
//! Every browsable service type describes its members once, in a
//! [`ClassInfo`] built with [`ClassBuilder`]. The table records each
//! member's name, visibility, kind, declaring type and ordered parameters,
//! plus a type-erased handler so callers never dispatch by name at call time.
//!
//! ```ignore
//! use once_cell::sync::Lazy;
//! use svcprobe_sdk::{ClassBuilder, ClassInfo, Param, Service, Value};
//!
//! struct Greeter;
//!
//! static CLASS: Lazy<ClassInfo> = Lazy::new(|| {
//!     ClassBuilder::<Greeter>::new()
//!         .method("hello", &[Param::optional("name", "world")], |_svc, args| {
//!             Ok(Value::from(format!("hello {:?}", args.first())))
//!         })
//!         .build()
//! });
//!
//! impl Service for Greeter {
//!     fn class_info(&self) -> &ClassInfo { &CLASS }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};
use crate::value::Value;

/// Name under which constructor descriptors are recorded
pub const CONSTRUCTOR_NAME: &str = "new";

/// A type-erased method body: receiver plus ordered arguments.
pub type MethodHandler = Arc<dyn Fn(&dyn Service, &[Value]) -> ServiceResult + Send + Sync>;

/// A named object whose methods can be browsed and invoked.
pub trait Service: Send + Sync + 'static {
    /// Descriptor table for this service's type
    fn class_info(&self) -> &ClassInfo;

    /// Upcast used by handlers to recover the concrete receiver
    fn as_any(&self) -> &dyn Any;

    /// Fully qualified type name
    fn type_name(&self) -> &str {
        &self.class_info().name
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Callable from outside the type
    #[default]
    Public,
    /// Visible to the type and its descendants
    Protected,
    /// Visible to the type only
    Private,
}

/// Member kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    /// Method taking a receiver
    #[default]
    Instance,
    /// Method without a receiver
    Static,
    /// Constructor
    Constructor,
}

/// Modifier flags for a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Visibility
    pub visibility: Visibility,
    /// Kind
    pub kind: MethodKind,
}

impl Modifiers {
    /// Public instance method
    pub const PUBLIC: Modifiers = Modifiers {
        visibility: Visibility::Public,
        kind: MethodKind::Instance,
    };
    /// Protected instance method
    pub const PROTECTED: Modifiers = Modifiers {
        visibility: Visibility::Protected,
        kind: MethodKind::Instance,
    };
    /// Private instance method
    pub const PRIVATE: Modifiers = Modifiers {
        visibility: Visibility::Private,
        kind: MethodKind::Instance,
    };
    /// Public static method
    pub const STATIC: Modifiers = Modifiers {
        visibility: Visibility::Public,
        kind: MethodKind::Static,
    };
}

// ============================================================================
// Parameters
// ============================================================================

/// Declared default of an optional parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// `null`
    Null,
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),
}

impl From<bool> for DefaultValue {
    fn from(b: bool) -> Self {
        DefaultValue::Bool(b)
    }
}

impl From<i32> for DefaultValue {
    fn from(i: i32) -> Self {
        DefaultValue::Int(i as i64)
    }
}

impl From<i64> for DefaultValue {
    fn from(i: i64) -> Self {
        DefaultValue::Int(i)
    }
}

impl From<f64> for DefaultValue {
    fn from(f: f64) -> Self {
        DefaultValue::Float(f)
    }
}

impl From<&str> for DefaultValue {
    fn from(s: &str) -> Self {
        DefaultValue::Str(s.to_string())
    }
}

impl From<DefaultValue> for Value {
    fn from(d: DefaultValue) -> Self {
        match d {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(i) => Value::Int(i),
            DefaultValue::Float(f) => Value::Float(f),
            DefaultValue::Str(s) => Value::Str(s),
        }
    }
}

/// Parameter declaration handed to [`ClassBuilder`]
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    default: Option<DefaultValue>,
}

impl Param {
    /// Parameter without a default
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// Parameter with a default value
    pub fn optional(name: impl Into<String>, default: impl Into<DefaultValue>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// Parameter information for a declared method
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Position in the signature (0-based)
    pub index: usize,
    /// Declared default, if any
    pub default: Option<DefaultValue>,
}

impl ParameterInfo {
    /// Whether the parameter declares a default value
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

// ============================================================================
// Methods and classes
// ============================================================================

/// Method information for a service type
#[derive(Clone)]
pub struct MethodInfo {
    /// Method identifier
    pub name: String,
    /// Visibility and kind
    pub modifiers: Modifiers,
    /// Type that declares the method
    pub declaring_type: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterInfo>,
    handler: MethodHandler,
}

impl MethodInfo {
    /// Whether the method is publicly visible
    pub fn is_public(&self) -> bool {
        self.modifiers.visibility == Visibility::Public
    }

    /// Whether the method is static
    pub fn is_static(&self) -> bool {
        self.modifiers.kind == MethodKind::Static
    }

    /// Whether the entry describes a constructor
    pub fn is_constructor(&self) -> bool {
        self.modifiers.kind == MethodKind::Constructor
    }

    /// The callable body
    pub fn handler(&self) -> &MethodHandler {
        &self.handler
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("modifiers", &self.modifiers)
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Descriptor table for one service type
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    /// Fully qualified type name
    pub name: String,
    /// Members in declaration order
    pub methods: Vec<MethodInfo>,
    method_indices: FxHashMap<String, usize>,
}

impl ClassInfo {
    /// Look up a member by identifier
    pub fn get_method(&self, name: &str) -> Option<&MethodInfo> {
        self.method_indices.get(name).map(|&i| &self.methods[i])
    }

    /// Type name without its module path
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }
}

/// Strip any module or namespace qualifier from a type name.
pub fn simple_name(type_name: &str) -> &str {
    let after_path = type_name.rsplit("::").next().unwrap_or(type_name);
    after_path.rsplit('\\').next().unwrap_or(after_path)
}

/// Builds the [`ClassInfo`] for service type `S`.
pub struct ClassBuilder<S> {
    name: String,
    methods: Vec<MethodInfo>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: Service> ClassBuilder<S> {
    /// Start a table named after `S`'s Rust type path
    pub fn new() -> Self {
        Self::named(std::any::type_name::<S>())
    }

    /// Start a table with an explicit type name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Record the constructor signature. Constructors are described, never invoked.
    pub fn constructor(mut self, params: &[Param]) -> Self {
        let handler: MethodHandler = Arc::new(|_svc: &dyn Service, _args: &[Value]| {
            Err(ServiceError::new("constructors cannot be invoked"))
        });
        let modifiers = Modifiers {
            visibility: Visibility::Public,
            kind: MethodKind::Constructor,
        };
        let declaring_type = self.name.clone();
        self.push(CONSTRUCTOR_NAME, modifiers, declaring_type, params, handler);
        self
    }

    /// Add a public instance method
    pub fn method<F>(self, name: &str, params: &[Param], f: F) -> Self
    where
        F: Fn(&S, &[Value]) -> ServiceResult + Send + Sync + 'static,
    {
        self.member(name, Modifiers::PUBLIC, params, f)
    }

    /// Add a member with explicit modifiers
    pub fn member<F>(mut self, name: &str, modifiers: Modifiers, params: &[Param], f: F) -> Self
    where
        F: Fn(&S, &[Value]) -> ServiceResult + Send + Sync + 'static,
    {
        let declaring_type = self.name.clone();
        let handler = Self::erase(f);
        self.push(name, modifiers, declaring_type, params, handler);
        self
    }

    /// Add a public method that a parent type declares
    pub fn inherited<F>(mut self, declaring_type: &str, name: &str, params: &[Param], f: F) -> Self
    where
        F: Fn(&S, &[Value]) -> ServiceResult + Send + Sync + 'static,
    {
        let handler = Self::erase(f);
        self.push(name, Modifiers::PUBLIC, declaring_type.to_string(), params, handler);
        self
    }

    /// Finish the table
    pub fn build(self) -> ClassInfo {
        let method_indices = self
            .methods
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        ClassInfo {
            name: self.name,
            methods: self.methods,
            method_indices,
        }
    }

    fn push(
        &mut self,
        name: &str,
        modifiers: Modifiers,
        declaring_type: String,
        params: &[Param],
        handler: MethodHandler,
    ) {
        let parameters = params
            .iter()
            .enumerate()
            .map(|(index, p)| ParameterInfo {
                name: p.name.clone(),
                index,
                default: p.default.clone(),
            })
            .collect();
        let info = MethodInfo {
            name: name.to_string(),
            modifiers,
            declaring_type,
            parameters,
            handler,
        };
        // Redeclaring a name replaces the earlier entry in place
        match self.methods.iter().position(|m| m.name == name) {
            Some(i) => self.methods[i] = info,
            None => self.methods.push(info),
        }
    }

    fn erase<F>(f: F) -> MethodHandler
    where
        F: Fn(&S, &[Value]) -> ServiceResult + Send + Sync + 'static,
    {
        Arc::new(move |svc: &dyn Service, args: &[Value]| {
            match svc.as_any().downcast_ref::<S>() {
                Some(receiver) => f(receiver, args),
                None => Err(ServiceError::new(format!(
                    "receiver is not a {}",
                    std::any::type_name::<S>()
                ))),
            }
        })
    }
}

impl<S: Service> Default for ClassBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture::Counter;

    mod fixture {
        use std::sync::OnceLock;

        use super::super::*;

        pub struct Counter {
            pub start: i64,
        }

        static CLASS: OnceLock<ClassInfo> = OnceLock::new();

        impl Service for Counter {
            fn class_info(&self) -> &ClassInfo {
                CLASS.get_or_init(|| {
                    ClassBuilder::<Counter>::named("demo::counters::Counter")
                        .constructor(&[Param::required("start")])
                        .method("next", &[Param::optional("step", 1)], |c, args| {
                            let step = args.first().and_then(Value::as_int).unwrap_or(1);
                            Ok(Value::Int(c.start + step))
                        })
                        .member("reset", Modifiers::PRIVATE, &[], |_c, _args| Ok(Value::Null))
                        .inherited("demo::Base", "describe", &[], |_c, _args| {
                            Ok(Value::from("counter"))
                        })
                        .build()
                })
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    }

    #[test]
    fn test_table_preserves_declaration_order() {
        let counter = Counter { start: 5 };
        let info = counter.class_info();
        let names: Vec<&str> = info.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["new", "next", "reset", "describe"]);
    }

    #[test]
    fn test_modifiers_recorded() {
        let counter = Counter { start: 0 };
        let info = counter.class_info();
        assert!(info.get_method("new").unwrap().is_constructor());
        assert!(!info.get_method("reset").unwrap().is_public());
        assert_eq!(info.get_method("describe").unwrap().declaring_type, "demo::Base");
        assert_eq!(info.get_method("next").unwrap().declaring_type, "demo::counters::Counter");
    }

    #[test]
    fn test_handler_invokes_receiver() {
        let counter = Counter { start: 5 };
        let method = counter.class_info().get_method("next").unwrap();
        let result = (method.handler())(&counter, &[Value::Int(3)]).unwrap();
        assert_eq!(result, Value::Int(8));
    }

    #[test]
    fn test_constructor_handler_refuses() {
        let counter = Counter { start: 5 };
        let ctor = counter.class_info().get_method(CONSTRUCTOR_NAME).unwrap();
        assert!((ctor.handler())(&counter, &[]).is_err());
    }

    #[test]
    fn test_optional_parameters() {
        let counter = Counter { start: 0 };
        let next = counter.class_info().get_method("next").unwrap();
        assert!(next.parameters[0].is_optional());
        assert_eq!(next.parameters[0].default, Some(DefaultValue::Int(1)));
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("demo::counters::Counter"), "Counter");
        assert_eq!(simple_name("App\\Services\\Mailer"), "Mailer");
        assert_eq!(simple_name("Plain"), "Plain");
    }
}
