//! Terminal rendering of browse outcomes

use svcprobe_engine::{
    BrowseOutcome, CallOutcome, CatalogEntry, CatalogListing, ErrorReport, InputForm,
    InvocationResult, MethodListing, ParameterDescriptor, ResolvedCall,
};
use termcolor::WriteColor;

use crate::output::StyledOutput;

/// Render the most specific part of an outcome: the call when there is one,
/// otherwise the method listing, otherwise the catalog.
pub fn outcome<W: WriteColor>(out: &mut StyledOutput<W>, outcome: &BrowseOutcome) {
    match (&outcome.call, &outcome.methods) {
        (Some(call), _) => call_outcome(out, call),
        (None, Some(methods)) => method_listing(out, methods),
        (None, None) => catalog(out, &outcome.services),
    }
    out.flush();
}

/// Both catalog groups, built-in first
pub fn catalog<W: WriteColor>(out: &mut StyledOutput<W>, listing: &CatalogListing) {
    if listing.is_empty() {
        out.dim("No services registered");
        out.newline();
        return;
    }
    let width = listing
        .entries()
        .map(|e| e.display_name.len())
        .max()
        .unwrap_or(0);

    out.bold("Services");
    out.newline();
    for entry in &listing.builtin {
        catalog_entry(out, entry, width);
    }
    if !listing.builtin.is_empty() && !listing.custom.is_empty() {
        out.newline();
    }
    for entry in &listing.custom {
        catalog_entry(out, entry, width);
    }
}

fn catalog_entry<W: WriteColor>(out: &mut StyledOutput<W>, entry: &CatalogEntry, width: usize) {
    out.plain("  ");
    out.bold(&format!("{:<width$}", entry.display_name));
    out.plain("  ");
    out.info(&format!("{:<10}", entry.alias));
    if entry.built_in {
        out.plain(" ");
        out.builtin_badge();
    }
    out.plain("  ");
    out.dim(&entry.link);
    out.newline();
}

/// Callable methods of one service
pub fn method_listing<W: WriteColor>(out: &mut StyledOutput<W>, listing: &MethodListing) {
    out.bold(&listing.service_name);
    out.newline();
    if listing.entries.is_empty() {
        out.dim("  No callable methods");
        out.newline();
        return;
    }
    let width = listing.entries.iter().map(|m| m.name.len()).max().unwrap_or(0);
    for method in &listing.entries {
        out.plain("  ");
        out.plain(&format!("{:<width$}", method.name));
        out.plain("  ");
        out.info(&method.url_token);
        out.plain("  ");
        out.dim(&method.link);
        out.newline();
    }
}

/// The call part of an outcome
pub fn call_outcome<W: WriteColor>(out: &mut StyledOutput<W>, call: &CallOutcome) {
    match call {
        CallOutcome::UnknownService { alias } => {
            out.warning(&format!("No service registered as '{}'", alias));
            out.newline();
        }
        CallOutcome::UnknownMethod { identifier } => {
            out.warning("No service call matching ");
            out.bold(identifier);
            out.newline();
        }
        CallOutcome::Resolved(call) => resolved_call(out, call),
    }
}

fn resolved_call<W: WriteColor>(out: &mut StyledOutput<W>, call: &ResolvedCall) {
    out.bold(&call.signature.to_string());
    out.newline();
    if let Some(form) = &call.form {
        input_form(out, form);
    }
    if let Some(result) = &call.result {
        invocation_result(out, result);
    }
}

/// Missing-argument form as a field list
pub fn input_form<W: WriteColor>(out: &mut StyledOutput<W>, form: &InputForm) {
    out.input_badge();
    out.plain(" ");
    out.plain(&form.legend);
    out.newline();
    let width = form.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);
    for field in &form.fields {
        out.plain("    ");
        out.plain(&format!("{:<width$}", field.label));
        out.plain("  ");
        out.dim(&field_note(field));
        out.newline();
    }
    out.plain("  ");
    out.dim(&format!("append arguments to {}", form.action));
    out.newline();
}

fn field_note(field: &ParameterDescriptor) -> String {
    let mut note = field.requirement().to_string();
    if let Some(default) = &field.default_display {
        note.push_str(&format!(", default: {}", default));
    }
    if field.input_kind == svcprobe_engine::InputKind::Secret {
        note.push_str(", secret");
    }
    format!("({})", note)
}

/// A call's result or failure report
pub fn invocation_result<W: WriteColor>(out: &mut StyledOutput<W>, result: &InvocationResult) {
    match result {
        InvocationResult::Success { display_value } => {
            out.ok_badge();
            out.newline();
            out.plain(display_value);
            out.newline();
        }
        InvocationResult::Failure(report) => error_report(out, report),
    }
}

fn error_report<W: WriteColor>(out: &mut StyledOutput<W>, report: &ErrorReport) {
    out.fail_badge();
    out.plain(" ");
    out.error(&report.message);
    out.dim(&format!(" (code: {})", report.code));
    out.newline();
    for (i, frame) in report.frames.iter().enumerate() {
        out.dim(&format!("  {:>3}. ", i + 1));
        out.plain(frame);
        out.newline();
    }
}
