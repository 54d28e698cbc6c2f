//! Icons command

use anyhow::Result;
use comfy_table::{ContentArrangement, Table, presets};
use headtap_core::catalog::{CatalogEntry, IconSet};
use headtap_schema::IconId;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct IconSummary<'a> {
    id: &'a str,
    set: IconSet,
    description: &'a str,
    path: &'a str,
    sha256: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<&'a str>,
}

/// List catalog icons, optionally only those a formula ships
pub fn icons(formula: Option<&str>, json: bool) -> Result<()> {
    let catalog = super::load_catalog()?;
    let formula = formula
        .map(|name| super::load_formula(Some(name), None))
        .transpose()?;

    let entries: Vec<&CatalogEntry> = match &formula {
        Some(f) => f.shipped_icons(&catalog).collect(),
        None => catalog.iter().collect(),
    };

    if json {
        let summaries: Vec<IconSummary<'_>> = entries
            .iter()
            .map(|e| IconSummary {
                id: e.id.as_str(),
                set: e.set,
                description: &e.description,
                path: &e.path,
                sha256: formula
                    .as_ref()
                    .map_or(&e.sha256, |f| f.icon_digest(e))
                    .as_str(),
                aliases: e.aliases.iter().map(IconId::as_str).collect(),
            })
            .collect();
        return super::print_json(&summaries);
    }

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ICON", "SET", "DESCRIPTION"]);
    for entry in &entries {
        table.add_row(vec![
            entry.id.to_string(),
            entry.set.to_string(),
            entry.description.clone(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} icons. Select one with --with <icon>.", entries.len());
    Ok(())
}
