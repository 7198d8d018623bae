//! `svcprobe services`: List the service catalog.

use svcprobe_engine::ServiceBrowser;
use termcolor::WriteColor;

use crate::output::StyledOutput;
use crate::render;

pub fn execute<W: WriteColor>(
    browser: &ServiceBrowser,
    json: bool,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let listing = browser.catalog().listing();
    if json {
        out.plain(&serde_json::to_string_pretty(&listing)?);
        out.newline();
    } else {
        render::catalog(out, &listing);
    }
    out.flush();
    Ok(())
}
