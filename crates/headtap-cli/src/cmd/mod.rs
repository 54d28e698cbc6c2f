//! Subcommand implementations

pub mod formulae;
pub mod icons;
pub mod options;
pub mod resolve;
pub mod url;

use anyhow::{Context, Result};
use headtap_core::{Formula, ResourceCatalog};
use std::path::Path;

/// Load a built-in formula by name, or a formula file when one is given.
pub(crate) fn load_formula(name: Option<&str>, file: Option<&Path>) -> Result<Formula> {
    match (file, name) {
        (Some(path), _) => Formula::from_file(path)
            .with_context(|| format!("Failed to load formula from {}", path.display())),
        (None, Some(name)) => {
            Formula::builtin(name).with_context(|| format!("Failed to load formula '{name}'"))
        }
        (None, None) => anyhow::bail!("No formula given"),
    }
}

pub(crate) fn load_catalog() -> Result<ResourceCatalog> {
    ResourceCatalog::builtin().context("Failed to load the icon catalog")
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
