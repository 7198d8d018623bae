//! End-to-end tests for the browsing pipeline

use std::any::Any;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, OnceLock};

use svcprobe_engine::{
    bind, list_callable, parse_request, resolve, ArgumentSource, BrowseOutcome, BrowserConfig,
    CallOutcome, Dispatcher, InvocationPlan, InvocationResult, ResolvedCall, ServiceBrowser,
    ServiceFactories, ServiceRegistry,
};
use svcprobe_sdk::{
    arg_int, opt_arg, ClassBuilder, ClassInfo, Modifiers, Param, Service, ServiceError, Value,
};

struct TimeService;

impl Service for TimeService {
    fn class_info(&self) -> &ClassInfo {
        static CLASS: OnceLock<ClassInfo> = OnceLock::new();
        CLASS.get_or_init(|| {
            ClassBuilder::<TimeService>::named("fixtures::TimeService")
                .constructor(&[])
                .method("getCurrent", &[], |_s, _a| Ok(Value::from("2024-01-01 00:00:00")))
                .method(
                    "addDays",
                    &[Param::required("timestamp"), Param::required("days")],
                    |_s, args| {
                        let timestamp = arg_int(args, 0, "timestamp")?;
                        Ok(Value::Int(timestamp + arg_int(args, 1, "days")? * 86_400))
                    },
                )
                .method(
                    "range",
                    &[Param::optional("from", 1), Param::optional("to", 3)],
                    |_s, args| {
                        let from = opt_arg(args, 0).and_then(Value::coerce_int).unwrap_or(1);
                        let to = opt_arg(args, 1).and_then(Value::coerce_int).unwrap_or(3);
                        Ok(Value::List((from..=to).map(Value::Int).collect()))
                    },
                )
                .method("fail", &[], |_s, _a| {
                    Err(ServiceError::new("clock unavailable").with_code(503))
                })
                .member("sync", Modifiers::PRIVATE, &[], |_s, _a| Ok(Value::Null))
                .member("now", Modifiers::STATIC, &[], |_s, _a| Ok(Value::Int(0)))
                .build()
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn browser() -> ServiceBrowser {
    let mut builtins = ServiceRegistry::new();
    builtins.register("time", Arc::new(TimeService)).unwrap();
    ServiceBrowser::new(BrowserConfig::default(), builtins, ServiceRegistry::new())
}

fn resolved(outcome: BrowseOutcome) -> ResolvedCall {
    match outcome.call {
        Some(CallOutcome::Resolved(call)) => call,
        other => panic!("expected a resolved call, got {other:?}"),
    }
}

#[test]
fn test_zero_argument_call_end_to_end() {
    let request = parse_request("browser/time/get-current", 1);
    let service = TimeService;
    let handle = resolve(&service, &request.call_alias).unwrap();
    let plan = bind(&request.raw_arguments, handle.parameters());

    let InvocationPlan::Ready(args) = &plan else {
        panic!("expected a ready plan");
    };
    assert!(args.is_empty());

    let result = Dispatcher::new("").invoke(&service, &handle, args);
    assert!(result.is_success());
}

#[test]
fn test_zero_argument_call_through_browser() {
    let call = resolved(browser().handle("browser/time/get-current/ignored/args"));
    assert_eq!(call.plan.call_arguments().unwrap().len(), 0);
    assert!(call.form.is_none());
    assert_eq!(
        call.result,
        Some(InvocationResult::Success {
            display_value: "2024-01-01 00:00:00".into()
        })
    );
}

#[test]
fn test_all_optional_shows_form_and_default_result() {
    let call = resolved(browser().handle("browser/time/range"));
    let form = call.form.expect("form");
    assert_eq!(form.fields.len(), 2);
    assert_eq!(form.fields[0].default_display.as_deref(), Some("1"));
    assert_eq!(
        call.plan.call_arguments().map(|a| a.source),
        Some(ArgumentSource::Defaults)
    );
    assert_eq!(
        call.result,
        Some(InvocationResult::Success {
            display_value: "List\n(\n    [0] => 1\n    [1] => 2\n    [2] => 3\n)".into()
        })
    );
}

#[test]
fn test_required_parameters_need_input_only() {
    let call = resolved(browser().handle("browser/time/add-days"));
    assert!(call.form.is_some());
    assert!(call.result.is_none());
    assert_eq!(call.plan.missing_parameters().unwrap()[1].name, "days");
}

#[test]
fn test_supplied_arguments_are_invoked() {
    let call = resolved(browser().handle("browser/time/add-days/100/2"));
    assert_eq!(call.signature.to_string(), "TimeService.addDays(100, 2)");
    assert_eq!(
        call.result,
        Some(InvocationResult::Success {
            display_value: "172900".into()
        })
    );
}

#[test]
fn test_failure_is_reported_not_raised() {
    let call = resolved(browser().handle("browser/time/fail"));
    match call.result {
        Some(InvocationResult::Failure(report)) => {
            assert_eq!(report.message, "clock unavailable");
            assert_eq!(report.code, 503);
            assert!(!report.frames.is_empty());
            assert!(report.frames.iter().all(|f| !f.is_empty() && f.trim() == f));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn test_hidden_members_do_not_resolve() {
    for path in ["browser/time/sync", "browser/time/now", "browser/time/new"] {
        assert!(matches!(
            browser().handle(path).call,
            Some(CallOutcome::UnknownMethod { .. })
        ));
    }
}

#[test]
fn test_listing_excludes_hidden_members() {
    let names: Vec<String> = list_callable(&TimeService).into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["addDays", "fail", "getCurrent", "range"]);
}

#[test]
fn test_outcome_serializes() {
    let outcome = browser().handle("browser/time/get-current");
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["call"]["outcome"], "resolved");
    assert_eq!(json["call"]["result"]["status"], "success");
    assert_eq!(json["services"]["builtin"][0]["alias"], "time");
}

#[test]
fn test_registry_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[browser]
mount = "admin/browser"

[services]
clock = "TimeService"
"#
    )
    .unwrap();

    let config = BrowserConfig::from_file(file.path()).unwrap();
    let mut factories = ServiceFactories::new();
    factories.register("fixtures::TimeService", || Arc::new(TimeService));
    let custom = ServiceRegistry::from_aliases(&config.services, &factories).unwrap();

    let browser = ServiceBrowser::new(config, ServiceRegistry::new(), custom);
    let outcome = browser.handle("admin/browser/clock/get-current");
    assert_eq!(outcome.request.base_path(), "admin/browser");
    assert!(outcome.services.builtin.is_empty());
    assert_eq!(outcome.services.custom[0].link, "/admin/browser/clock");
    assert!(resolved(outcome).result.unwrap().is_success());
}

#[test]
fn test_unknown_type_in_config_aborts() {
    let mut aliases = BTreeMap::new();
    aliases.insert("clock".to_string(), "Sundial".to_string());
    assert!(ServiceRegistry::from_aliases(&aliases, &ServiceFactories::new()).is_err());
}
