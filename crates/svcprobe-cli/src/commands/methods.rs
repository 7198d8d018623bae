//! `svcprobe methods`: List the callable methods of one service.

use svcprobe_engine::ServiceBrowser;
use termcolor::WriteColor;

use crate::output::StyledOutput;
use crate::render;

pub fn execute<W: WriteColor>(
    browser: &ServiceBrowser,
    alias: &str,
    json: bool,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let listing = browser.methods(alias)?;
    if json {
        out.plain(&serde_json::to_string_pretty(&listing)?);
        out.newline();
    } else {
        render::method_listing(out, &listing);
    }
    out.flush();
    Ok(())
}
