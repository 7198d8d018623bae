//! `svcprobe repl`: Interactive console.
//!
//! Each line is a request path (the mount prefix is optional) and is run
//! through the pipeline immediately. Console commands start with `:` so any
//! service alias stays reachable as a bare path. History persists across
//! sessions.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use svcprobe_engine::ServiceBrowser;
use termcolor::WriteColor;

use super::qualify_path;
use crate::output::StyledOutput;
use crate::render;

const PROMPT: &str = "svcprobe> ";
const COMMAND_PREFIX: char = ':';

pub fn execute<W: WriteColor>(
    browser: &ServiceBrowser,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    // Load history if it exists
    let history_path = dirs::home_dir().map(|h| h.join(".svcprobe").join("history"));
    if let Some(ref path) = history_path {
        let _ = editor.load_history(path);
    }

    out.success(&format!("svcprobe v{} console", env!("CARGO_PKG_VERSION")));
    out.newline();
    out.dim("Enter a path such as time/get-current. Type :help for help, :exit to quit");
    out.newline();
    out.newline();
    out.flush();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);

                if is_command(trimmed) {
                    if handle_command(trimmed, browser, out) {
                        break;
                    }
                    continue;
                }

                let outcome = browser.handle(&qualify_path(browser.config(), trimmed));
                render::outcome(out, &outcome);
            }
            Err(ReadlineError::Interrupted) => {
                println!("(To exit, press Ctrl+D or type :exit)");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                out.error(&format!("{}", e));
                out.newline();
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = editor.save_history(path);
    }

    Ok(())
}

/// Check if input is a console command rather than a path.
fn is_command(input: &str) -> bool {
    input.starts_with(COMMAND_PREFIX)
}

/// Handle console commands. Returns true if the console should exit.
fn handle_command<W: WriteColor>(
    cmd: &str,
    browser: &ServiceBrowser,
    out: &mut StyledOutput<W>,
) -> bool {
    let mut words = cmd.trim_start_matches(COMMAND_PREFIX).split_whitespace();
    match (words.next(), words.next()) {
        (Some("exit" | "quit"), _) => return true,
        (Some("help"), _) => {
            out.plain(HELP);
            out.flush();
        }
        (Some("services"), _) => render::catalog(out, &browser.catalog().listing()),
        (Some("methods"), Some(alias)) => match browser.methods(alias) {
            Ok(listing) => render::method_listing(out, &listing),
            Err(e) => {
                out.warning(&e.to_string());
                out.newline();
            }
        },
        _ => {
            out.error(&format!("Unknown command: {}", cmd));
            out.newline();
            out.plain("Type :help for available commands.\n");
        }
    }
    out.flush();
    false
}

const HELP: &str = "\
Commands:
  <path>            Run a request path, e.g. user/get-user/1
  :services         List all services
  :methods <alias>  List the callable methods of a service
  :help             Show this help
  :exit             Exit the console (also :quit or Ctrl-D)
";
