//! svcprobe console
//!
//! Browse registered services, inspect their callable methods and call them
//! with arguments taken from a request path.

mod commands;
mod output;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "svcprobe")]
#[command(about = "Browse and call registered services", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./svcprobe.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// When to use colors
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one request path, e.g. `user/get-user/1`
    Call {
        /// Request path; the mount prefix is optional
        path: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered services
    Services {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the callable methods of a service
    Methods {
        /// Service alias
        alias: String,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the interactive console
    Repl,
}

fn init_telemetry(cli: &Cli) {
    let filter = EnvFilter::try_from_env("SVCPROBE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);
    debug!(version = env!("CARGO_PKG_VERSION"), "svcprobe starting");

    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));
    let browser = match commands::load_browser(cli.config.as_deref()) {
        Ok(browser) => browser,
        Err(e) => {
            out.stderr_error(&format!("error: {:#}", e));
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Call { path, json } => commands::call::execute(&browser, &path, json, &mut out),
        Commands::Services { json } => commands::services::execute(&browser, json, &mut out),
        Commands::Methods { alias, json } => {
            commands::methods::execute(&browser, &alias, json, &mut out)
        }
        Commands::Repl => commands::repl::execute(&browser, &mut out),
    };

    if let Err(e) = result {
        out.stderr_error(&format!("error: {:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
