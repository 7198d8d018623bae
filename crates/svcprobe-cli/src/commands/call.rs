//! `svcprobe call`: Run one request path through the pipeline.

use svcprobe_engine::ServiceBrowser;
use termcolor::WriteColor;

use super::qualify_path;
use crate::output::StyledOutput;
use crate::render;

pub fn execute<W: WriteColor>(
    browser: &ServiceBrowser,
    path: &str,
    json: bool,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let path = qualify_path(browser.config(), path);
    let outcome = browser.handle(&path);
    if json {
        out.plain(&serde_json::to_string_pretty(&outcome)?);
        out.newline();
        out.flush();
    } else {
        render::outcome(out, &outcome);
    }
    Ok(())
}
