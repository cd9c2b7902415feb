//! Inspect or create the config file.

use std::path::Path;

use eyestream_common::config::{config_file_path, AppConfig};

pub fn show(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    let origin = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("# {}{origin}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
