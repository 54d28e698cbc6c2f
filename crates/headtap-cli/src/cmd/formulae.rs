//! Formulae command

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table, presets};
use headtap_core::Formula;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FormulaSummary<'a> {
    name: &'a str,
    version: &'a str,
    revision: u32,
    stable: bool,
    head: bool,
    description: &'a str,
}

impl<'a> From<&'a Formula> for FormulaSummary<'a> {
    fn from(f: &'a Formula) -> Self {
        Self {
            name: f.name(),
            version: f.version(),
            revision: f.formula.revision,
            stable: f.source.archive.is_some(),
            head: f.source.head.is_some(),
            description: &f.formula.description,
        }
    }
}

/// List the formulae shipped with the binary
pub fn formulae(json: bool) -> Result<()> {
    let all = Formula::builtin_all().context("Failed to load built-in formulae")?;
    let summaries: Vec<FormulaSummary<'_>> = all.iter().map(FormulaSummary::from).collect();

    if json {
        return super::print_json(&summaries);
    }

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["NAME", "VERSION", "SOURCES", "DESCRIPTION"]);

    for s in &summaries {
        let sources = match (s.stable, s.head) {
            (true, true) => "stable, head",
            (true, false) => "stable",
            (false, _) => "head",
        };
        table.add_row(vec![
            s.name.to_string(),
            s.version.to_string(),
            sources.to_string(),
            s.description.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}
