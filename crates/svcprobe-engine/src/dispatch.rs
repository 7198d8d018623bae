//! Guarded invocation
//!
//! The dispatcher runs a resolved method inside a failure boundary. An
//! `Err(ServiceError)` return and a panic anywhere inside the service both
//! come back as [`InvocationResult::Failure`]; nothing escapes. A panic's
//! trace is taken where it was raised and is not printed to stderr.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use svcprobe_sdk::{simple_name, Service};
use tracing::{info, warn};

use crate::binder::BoundArguments;
use crate::display::dump;
use crate::introspect::MethodHandle;

/// Start of a stack frame: `#3 ` (script-style traces) or `  3: ` (Rust backtraces)
static FRAME_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:#\d+\s|\d+:\s)").expect("frame pattern is valid"));

static PANIC_HOOK: Once = Once::new();

thread_local! {
    // Set while a handler runs on this thread inside `invoke`
    static IN_BOUNDARY: Cell<bool> = const { Cell::new(false) };
    // Backtrace taken at the panic site, read back by `invoke`
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Install a panic hook that records the panicking thread's backtrace
/// instead of printing it, for panics raised inside a dispatch boundary.
/// Panics anywhere else go to the previously installed hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_BOUNDARY.with(Cell::get) {
                let trace = Backtrace::force_capture().to_string();
                PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

/// Structured description of a failed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Error message
    pub message: String,
    /// Error code, 0 when none was given
    pub code: i64,
    /// One entry per stack frame, deployment root stripped
    pub frames: Vec<String>,
}

/// Outcome of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvocationResult {
    /// The method returned
    Success {
        /// Dump of the returned value
        display_value: String,
    },
    /// The method raised or panicked
    Failure(ErrorReport),
}

impl InvocationResult {
    /// Check if the call returned normally
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success { .. })
    }
}

/// Runs resolved methods inside a failure boundary
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    // Deployment root with a trailing '/', empty when nothing is stripped
    root_prefix: String,
}

impl Dispatcher {
    /// `trace_root` is stripped from every reported frame
    pub fn new(trace_root: &str) -> Self {
        let root = trace_root.trim_end_matches('/');
        let root_prefix = if root.is_empty() {
            String::new()
        } else {
            format!("{root}/")
        };
        Self { root_prefix }
    }

    /// Invoke `method` on `service` with `args`.
    pub fn invoke(
        &self,
        service: &dyn Service,
        method: &MethodHandle,
        args: &BoundArguments,
    ) -> InvocationResult {
        install_panic_hook();
        let handler = method.handler();
        let enclosing = IN_BOUNDARY.with(|flag| flag.replace(true));
        PANIC_TRACE.with(|slot| slot.borrow_mut().take());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(service, &args.values)));
        IN_BOUNDARY.with(|flag| flag.set(enclosing));

        let (message, code, trace) = match outcome {
            Ok(Ok(value)) => {
                info!(
                    service = method.type_name(),
                    method = method.identifier(),
                    arguments = args.len(),
                    "call succeeded"
                );
                return InvocationResult::Success {
                    display_value: dump(&value),
                };
            }
            Ok(Err(err)) => (err.message().to_string(), err.code(), err.trace().to_string()),
            Err(payload) => {
                let trace = PANIC_TRACE
                    .with(|slot| slot.borrow_mut().take())
                    .unwrap_or_else(|| Backtrace::force_capture().to_string());
                (panic_message(payload.as_ref()), 0, trace)
            }
        };

        warn!(
            service = method.type_name(),
            method = method.identifier(),
            code,
            %message,
            "call failed"
        );

        let mut frames = format_trace(&trace, &self.root_prefix);
        if frames.is_empty() {
            frames.push(format!(
                "{}.{}",
                simple_name(method.type_name()),
                method.identifier()
            ));
        }

        InvocationResult::Failure(ErrorReport {
            message,
            code,
            frames,
        })
    }
}

/// Split trace text into frames.
///
/// A line opening with a frame marker starts a new frame and loses the
/// marker; any other line continues the current frame. Frames are trimmed,
/// empty ones dropped, and `root_prefix` removed wherever it appears.
pub fn format_trace(trace: &str, root_prefix: &str) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();
    for line in trace.lines() {
        let line = if root_prefix.is_empty() {
            line.to_string()
        } else {
            line.replace(root_prefix, "")
        };
        match FRAME_START.find(&line) {
            Some(marker) => frames.push(line[marker.end()..].trim().to_string()),
            None => match frames.last_mut() {
                Some(frame) if !line.trim().is_empty() => {
                    frame.push(' ');
                    frame.push_str(line.trim());
                }
                Some(_) => {}
                None => frames.push(line.trim().to_string()),
            },
        }
    }
    frames.retain(|f| !f.is_empty());
    frames
}

/// Message carried by a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::introspect::resolve;
    use crate::path::RawArgument;
    use std::sync::OnceLock;
    use svcprobe_sdk::{arg_int, ClassBuilder, ClassInfo, Param, ServiceError, Value};

    struct Divider;

    #[inline(never)]
    fn split_evenly(total: i64, parts: i64) -> i64 {
        if parts == 0 {
            panic!("cannot split {total} into zero parts");
        }
        total / parts
    }

    impl Service for Divider {
        fn class_info(&self) -> &ClassInfo {
            static CLASS: OnceLock<ClassInfo> = OnceLock::new();
            CLASS.get_or_init(|| {
                ClassBuilder::<Divider>::named("calc::Divider")
                    .method(
                        "divide",
                        &[Param::required("a"), Param::required("b")],
                        |_s, args| {
                            let b = arg_int(args, 1, "b")?;
                            if b == 0 {
                                return Err(ServiceError::new("Division by zero")
                                    .with_code(22)
                                    .with_trace(
                                        "#0 /srv/app/calc/divider.rs(12): divide()\n\
                                         #1 /srv/app/main.rs(40): run()\n\
                                         #2 {main}",
                                    ));
                            }
                            Ok(Value::Int(arg_int(args, 0, "a")? / b))
                        },
                    )
                    .method("explode", &[], |_s, _a| panic!("boom"))
                    .method("average", &[Param::required("total")], |_s, args| {
                        Ok(Value::Int(split_evenly(arg_int(args, 0, "total")?, 0)))
                    })
                    .method("quiet", &[], |_s, _a| {
                        Err(ServiceError::new("silent").with_trace(""))
                    })
                    .build()
            })
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn call(token: &str, raw: &[&str]) -> InvocationResult {
        let raw: Vec<RawArgument> = raw
            .iter()
            .map(|s| RawArgument::Scalar(s.to_string()))
            .collect();
        let handle = resolve(&Divider, token).unwrap();
        let plan = bind(&raw, handle.parameters());
        let args = plan.call_arguments().unwrap().clone();
        Dispatcher::new("/srv/app/").invoke(&Divider, &handle, &args)
    }

    #[test]
    fn test_success_is_dumped() {
        assert_eq!(
            call("divide", &["9", "3"]),
            InvocationResult::Success {
                display_value: "3".into()
            }
        );
    }

    #[test]
    fn test_error_becomes_report() {
        let InvocationResult::Failure(report) = call("divide", &["9", "0"]) else {
            panic!("expected failure");
        };
        assert_eq!(report.message, "Division by zero");
        assert_eq!(report.code, 22);
        assert_eq!(
            report.frames,
            vec![
                "calc/divider.rs(12): divide()",
                "main.rs(40): run()",
                "{main}"
            ]
        );
    }

    #[test]
    fn test_arity_mismatch_fails_at_call_time() {
        let InvocationResult::Failure(report) = call("divide", &["9"]) else {
            panic!("expected failure");
        };
        assert_eq!(report.message, "Missing argument 2 (b)");
        assert_eq!(report.code, 0);
        assert!(!report.frames.is_empty());
    }

    #[test]
    fn test_panic_is_caught() {
        let InvocationResult::Failure(report) = call("explode", &[]) else {
            panic!("expected failure");
        };
        assert_eq!(report.message, "boom");
        assert_eq!(report.code, 0);
        assert!(!report.frames.is_empty());
        assert!(report.frames.iter().all(|f| !f.is_empty() && f.trim() == f));
    }

    #[test]
    fn test_panic_trace_starts_at_the_panic_site() {
        let InvocationResult::Failure(report) = call("average", &["10"]) else {
            panic!("expected failure");
        };
        assert_eq!(report.message, "cannot split 10 into zero parts");
        let helper = report
            .frames
            .iter()
            .position(|f| f.contains("split_evenly"))
            .expect("panicking helper appears in the frames");
        let boundary = report
            .frames
            .iter()
            .position(|f| f.contains("Dispatcher::invoke"));
        assert!(boundary.map_or(true, |b| helper < b));
    }

    #[test]
    fn test_empty_trace_falls_back_to_call_site() {
        let InvocationResult::Failure(report) = call("quiet", &[]) else {
            panic!("expected failure");
        };
        assert_eq!(report.frames, vec!["Divider.quiet"]);
    }

    #[test]
    fn test_format_rust_backtrace() {
        let trace = concat!(
            "   0: app::users::load\n",
            "             at /srv/app/src/users.rs:10:5\n",
            "   1: main\n\n",
        );
        assert_eq!(
            format_trace(trace, "/srv/app/"),
            vec!["app::users::load at src/users.rs:10:5", "main"]
        );
    }

    #[test]
    fn test_format_trace_without_root() {
        assert_eq!(format_trace("#0 a\n#1 b", ""), vec!["a", "b"]);
        assert!(format_trace("  \n\n", "").is_empty());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }
}
