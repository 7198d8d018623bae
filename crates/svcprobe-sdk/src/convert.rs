//! Helpers for reading positional arguments inside method handlers.
//!
//! Arguments arriving from a request path are strings, while arguments
//! bound from declared defaults are typed. These helpers accept both.

use crate::error::ServiceError;
use crate::value::Value;

/// Get the argument at `index`, failing if it was not supplied
pub fn arg<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a Value, ServiceError> {
    args.get(index)
        .ok_or_else(|| ServiceError::argument(format!("Missing argument {} ({})", index + 1, name)))
}

/// Get an optional argument; `null`, the literal `"null"` and empty strings count as absent
pub fn opt_arg(args: &[Value], index: usize) -> Option<&Value> {
    match args.get(index) {
        None | Some(Value::Null) => None,
        Some(Value::Str(s)) if s.is_empty() || s == "null" => None,
        Some(v) => Some(v),
    }
}

/// Get a scalar argument as text
pub fn arg_str(args: &[Value], index: usize, name: &str) -> Result<String, ServiceError> {
    let value = arg(args, index, name)?;
    value.scalar_text().ok_or_else(|| {
        ServiceError::argument(format!(
            "Argument '{}' must be a scalar, got {}",
            name,
            value.kind()
        ))
    })
}

/// Get an integer argument, parsing strings
pub fn arg_int(args: &[Value], index: usize, name: &str) -> Result<i64, ServiceError> {
    let value = arg(args, index, name)?;
    value.coerce_int().ok_or_else(|| {
        ServiceError::argument(format!("Argument '{}' must be an integer, got {:?}", name, value))
    })
}

/// Get a boolean argument, parsing strings
pub fn arg_bool(args: &[Value], index: usize, name: &str) -> Result<bool, ServiceError> {
    let value = arg(args, index, name)?;
    value.coerce_bool().ok_or_else(|| {
        ServiceError::argument(format!("Argument '{}' must be a boolean, got {:?}", name, value))
    })
}
