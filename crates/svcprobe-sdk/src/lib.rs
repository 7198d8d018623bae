//! Svcprobe SDK - Lightweight SDK for writing browsable services
//!
//! This crate provides the minimal types and traits a service needs to be
//! listed, introspected and invoked by the svcprobe engine without
//! depending on the engine itself.
//!
//! # Example
//!
//! ```ignore
//! use once_cell::sync::Lazy;
//! use svcprobe_sdk::{arg_int, ClassBuilder, ClassInfo, Param, Service, Value};
//!
//! pub struct MathService;
//!
//! static CLASS: Lazy<ClassInfo> = Lazy::new(|| {
//!     ClassBuilder::<MathService>::new()
//!         .method("add", &[Param::required("a"), Param::optional("b", 1)], |_svc, args| {
//!             Ok(Value::Int(arg_int(args, 0, "a")? + arg_int(args, 1, "b")?))
//!         })
//!         .build()
//! });
//!
//! impl Service for MathService {
//!     fn class_info(&self) -> &ClassInfo { &CLASS }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//! }
//! ```

#![warn(missing_docs)]

pub mod convert;
pub mod error;
pub mod service;
pub mod value;

pub use convert::{arg, arg_bool, arg_int, arg_str, opt_arg};
pub use error::{ServiceError, ServiceResult};
pub use service::{
    simple_name, ClassBuilder, ClassInfo, DefaultValue, MethodHandler, MethodInfo, MethodKind,
    Modifiers, Param, ParameterInfo, Service, Visibility, CONSTRUCTOR_NAME,
};
pub use value::Value;
