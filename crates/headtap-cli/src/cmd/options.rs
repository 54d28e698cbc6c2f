//! Options command

use anyhow::Result;
use comfy_table::{ContentArrangement, Table, presets};
use headtap_schema::OptionName;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct OptionSummary {
    name: OptionName,
    default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    only: Option<&'static str>,
    description: &'static str,
}

/// Show the options a formula offers and how they default
pub fn options(formula: &str, json: bool) -> Result<()> {
    let formula = super::load_formula(Some(formula), None)?;

    let summaries: Vec<OptionSummary> = formula
        .offered_options()
        .into_iter()
        .map(|name| {
            let only = if formula.options.head_only.contains(&name) {
                Some("head")
            } else if formula.options.stable_only.contains(&name) {
                Some("stable")
            } else {
                None
            };
            OptionSummary {
                name,
                default: formula.default_enabled(name),
                only,
                description: name.description(),
            }
        })
        .collect();

    if json {
        return super::print_json(&summaries);
    }

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["OPTION", "DEFAULT", "ONLY", "DESCRIPTION"]);
    for s in &summaries {
        table.add_row(vec![
            format!("--with-{}", s.name),
            if s.default { "on" } else { "off" }.to_string(),
            s.only.unwrap_or("").to_string(),
            s.description.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}
