//! CLI subcommands and the browser they share

pub mod call;
pub mod methods;
pub mod repl;
pub mod services;

use std::path::Path;

use anyhow::Context;
use svcprobe_engine::{
    BrowserConfig, ServiceBrowser, ServiceFactories, ServiceRegistry, CONFIG_FILE_NAME,
};
use svcprobe_stdlib::{builtin_registry, register_builtins};
use tracing::{debug, info};

/// Load configuration and build a browser over the standard and configured services.
///
/// Without `--config`, `svcprobe.toml` in the working directory is used when present.
pub fn load_browser(config_path: Option<&Path>) -> anyhow::Result<ServiceBrowser> {
    let config = match config_path {
        Some(path) => BrowserConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None if Path::new(CONFIG_FILE_NAME).is_file() => {
            BrowserConfig::from_file(Path::new(CONFIG_FILE_NAME))
                .with_context(|| format!("Failed to load {}", CONFIG_FILE_NAME))?
        }
        None => {
            debug!("no config file, using defaults");
            BrowserConfig::default()
        }
    };

    let mut factories = ServiceFactories::new();
    register_builtins(&mut factories);

    let builtins = builtin_registry()?;
    let custom = ServiceRegistry::from_aliases(&config.services, &factories)?;
    info!(
        builtin = builtins.len(),
        custom = custom.len(),
        mount = %config.browser.mount,
        "browser ready"
    );

    Ok(ServiceBrowser::new(config, builtins, custom))
}

/// Prefix `input` with the mount path unless it already starts with it
pub fn qualify_path(config: &BrowserConfig, input: &str) -> String {
    let trimmed = input.trim().trim_start_matches('/');
    let mount: Vec<&str> = config.mount_segments().collect();
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.len() >= mount.len() && segments[..mount.len()] == mount[..] {
        trimmed.to_string()
    } else if trimmed.is_empty() {
        mount.join("/")
    } else {
        format!("{}/{}", mount.join("/"), trimmed)
    }
}
