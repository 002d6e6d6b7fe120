//! Configuration display command.

use std::path::Path;

use console::style;

use crate::cli::icons::{dim_arrow, warn};
use crate::config::{ApiKey, Settings};
use crate::utils::redact;

/// Print the effective configuration with the API key redacted.
pub fn cmd_config(
    settings: &Settings,
    config_path: Option<&Path>,
    api_key: Option<&str>,
) -> anyhow::Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(Settings::default_path);
    match path {
        Some(path) if path.exists() => {
            println!("{} Config file: {}", dim_arrow(), path.display())
        }
        _ => println!("{} Config file: none (using defaults)", dim_arrow()),
    }

    match ApiKey::resolve(api_key) {
        Ok(key) => println!("{} API key: {}", dim_arrow(), redact(key.expose())),
        Err(e) => println!("{} {}", warn(), e),
    }

    println!("\n{}", style("Effective settings").bold());
    print!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}
