// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::Config;
use crate::error::Result;

pub fn run(config: &Config, path: Option<&Path>) -> Result<()> {
    print!("{}", run_impl(config, path)?);
    Ok(())
}

/// Effective configuration as TOML, headed by where it came from.
pub(crate) fn run_impl(config: &Config, path: Option<&Path>) -> Result<String> {
    let source = match path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not found, using defaults)", path.display()),
        None => "(defaults)".to_string(),
    };
    let state_dir = match config.state_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(_) => "(unresolved)".to_string(),
    };

    let mut out = format!("# config: {source}\n# state dir: {state_dir}\n\n");
    out.push_str(&config.to_toml()?);
    Ok(out)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
