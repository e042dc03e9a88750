use crate::config::write_default_config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    write_default_config(dir, force).context("Failed to write configuration")
}

pub fn init_config(force: bool) -> Result<()> {
    let path = init_config_in(Path::new("."), force)?;
    println!("Created {} configuration file", path.display());
    Ok(())
}
