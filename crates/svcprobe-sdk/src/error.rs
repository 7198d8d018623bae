//! Error raised by service methods

use std::backtrace::Backtrace;

use crate::value::Value;

/// Result type for service method calls
pub type ServiceResult = Result<Value, ServiceError>;

/// Error raised from inside a service method.
///
/// Carries a message, an integer code (0 when the raiser supplies none) and
/// the call-stack trace text captured where the error was created.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    message: String,
    code: i64,
    trace: String,
}

impl ServiceError {
    /// Create an error with code 0, capturing the current call stack
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 0,
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Attach an error code
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Replace the captured trace text
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }

    /// Error for an argument that is missing or has the wrong shape
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(message)
    }

    /// Error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error code, 0 if none was given
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Raw trace text, one frame per numbered entry
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

impl From<String> for ServiceError {
    fn from(s: String) -> Self {
        ServiceError::new(s)
    }
}

impl From<&str> for ServiceError {
    fn from(s: &str) -> Self {
        ServiceError::new(s)
    }
}
