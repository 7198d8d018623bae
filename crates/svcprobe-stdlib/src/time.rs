//! `time` service: clock readings and formatting

use std::any::Any;
use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone, Utc};
use once_cell::sync::Lazy;
use svcprobe_sdk::{
    opt_arg, ClassBuilder, ClassInfo, DefaultValue, Modifiers, Param, Service, ServiceError,
    Value,
};

/// Pattern used when none is given
pub const DEFAULT_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

static CLASS: Lazy<ClassInfo> = Lazy::new(|| {
    ClassBuilder::<TimeService>::new()
        .constructor(&[])
        .method("getCurrent", &[], |svc, _args| Ok(Value::from(svc.current())))
        .method("getTimestamp", &[], |_svc, _args| {
            Ok(Value::Int(Utc::now().timestamp()))
        })
        .method(
            "format",
            &[
                Param::optional("pattern", DEFAULT_PATTERN),
                Param::optional("timestamp", DefaultValue::Null),
            ],
            |svc, args| {
                let pattern = opt_arg(args, 0)
                    .and_then(Value::scalar_text)
                    .unwrap_or_else(|| DEFAULT_PATTERN.to_string());
                let timestamp = match opt_arg(args, 1) {
                    Some(v) => Some(v.coerce_int().ok_or_else(|| {
                        ServiceError::argument(format!(
                            "Argument 'timestamp' must be an integer, got {:?}",
                            v
                        ))
                    })?),
                    None => None,
                };
                svc.format(&pattern, timestamp).map(Value::from)
            },
        )
        .method("getZone", &[], |_svc, _args| {
            Ok(Value::from(Local::now().offset().to_string()))
        })
        .member("now", Modifiers::STATIC, &[], |_svc, _args| {
            Ok(Value::Int(Utc::now().timestamp()))
        })
        .build()
});

/// Clock readings in the host's local time zone
#[derive(Debug, Default)]
pub struct TimeService;

impl TimeService {
    /// Create the service
    pub fn new() -> Self {
        Self
    }

    /// Current local time in the default pattern
    pub fn current(&self) -> String {
        Local::now().format(DEFAULT_PATTERN).to_string()
    }

    /// Format a Unix timestamp (or now) with a strftime-style pattern
    pub fn format(&self, pattern: &str, timestamp: Option<i64>) -> Result<String, ServiceError> {
        let moment: DateTime<Local> = match timestamp {
            Some(ts) => Local.timestamp_opt(ts, 0).single().ok_or_else(|| {
                ServiceError::argument(format!("Timestamp {} is out of range", ts)).with_code(400)
            })?,
            None => Local::now(),
        };
        let mut out = String::new();
        write!(out, "{}", moment.format(pattern)).map_err(|_| {
            ServiceError::argument(format!("Invalid format pattern '{}'", pattern)).with_code(400)
        })?;
        Ok(out)
    }
}

impl Service for TimeService {
    fn class_info(&self) -> &ClassInfo {
        &CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_matches_pattern() {
        let current = TimeService::new().current();
        assert_eq!(current.len(), "2024-01-01 00:00:00".len());
        assert_eq!(&current[4..5], "-");
    }

    #[test]
    fn test_format_timestamp() {
        let time = TimeService::new();
        let year = time.format("%Y", Some(86_400 * 365)).unwrap();
        assert!(year == "1970" || year == "1971");
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = TimeService::new().format("%Q", None).unwrap_err();
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn test_format_handler_uses_defaults() {
        let time = TimeService::new();
        let format = time.class_info().get_method("format").unwrap();
        let result =
            (format.handler())(&time, &[Value::from(DEFAULT_PATTERN), Value::Null]).unwrap();
        assert_eq!(result.as_str().unwrap().len(), 19);
    }

    #[test]
    fn test_static_member_is_declared() {
        let time = TimeService::new();
        assert!(time.class_info().get_method("now").unwrap().is_static());
    }
}
