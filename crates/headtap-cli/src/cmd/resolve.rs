//! Resolve command

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use headtap_core::{EnvironmentContext, PlatformFacts, Resolver, SourceRequest, parse_toggles};
use headtap_schema::{BuildPlan, MacosVersion, ResolvedSource, Toggle};
use std::path::Path;

/// Inputs of `headtap resolve`, borrowed from the parsed command line.
#[derive(Debug)]
pub struct ResolveArgs<'a> {
    pub formula: Option<&'a str>,
    pub formula_file: Option<&'a Path>,
    pub with: &'a [String],
    pub without: &'a [String],
    pub head: bool,
    pub stable: bool,
    pub prefix: &'a Path,
    pub macos: Option<MacosVersion>,
}

impl ResolveArgs<'_> {
    fn toggles(&self) -> Vec<Toggle> {
        self.with
            .iter()
            .map(|n| Toggle::With(n.clone()))
            .chain(self.without.iter().map(|n| Toggle::Without(n.clone())))
            .collect()
    }
}

/// Resolve a formula and print its build plan
pub fn resolve(args: &ResolveArgs<'_>, json: bool) -> Result<()> {
    let formula = super::load_formula(args.formula, args.formula_file)?;
    let catalog = super::load_catalog()?;

    // Read the outside world once, before resolving.
    let env = EnvironmentContext::from_env();
    let platform = args
        .macos
        .map_or_else(PlatformFacts::detect, PlatformFacts::macos);
    tracing::debug!("Platform: {platform:?}, environment: {env:?}");

    let options = parse_toggles(&args.toggles(), &catalog)?;
    let request = SourceRequest {
        head: args.head,
        stable: args.stable,
    };

    let resolver = Resolver::with_prefix(&formula, &catalog, args.prefix);
    let plan = resolver
        .plan(&options, request, &platform, &env)
        .with_context(|| format!("Cannot build {}", formula.name()))?;

    if json {
        return super::print_json(&plan);
    }
    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &BuildPlan) {
    let lw = 12;

    println!();
    println!(
        "  {} {} {}",
        plan.formula.as_str().white().bold(),
        plan.version.as_str().dark_grey(),
        format!("({})", plan.variant).dark_grey()
    );
    println!();

    match &plan.source {
        ResolvedSource::Archive {
            url,
            mirror,
            sha256,
        } => {
            println!("  {:<lw$}{url}", "source");
            if let Some(mirror) = mirror {
                println!("  {:<lw$}{mirror}", "mirror");
            }
            println!("  {:<lw$}{}", "sha256", sha256.as_str().dark_grey());
        }
        ResolvedSource::Vcs { url, branch } => {
            println!("  {:<lw$}{url}", "source");
            if let Some(branch) = branch {
                println!("  {:<lw$}{branch}", "branch");
            }
        }
    }

    print_list("configure", plan.arguments.as_slice());
    print_list("make", &plan.make_flags);
    if !plan.cflags.is_empty() {
        println!("  {:<lw$}{}", "cflags", plan.cflags.join(" "));
    }
    for edit in &plan.path_edits {
        println!("  {:<lw$}{}={}:${}", "env", edit.variable, edit.prepend, edit.variable);
    }

    let patches: Vec<&str> = plan.patches.names();
    print_list("patches", &patches);

    if let Some(icon) = &plan.icon {
        println!("  {:<lw$}{} -> {}", "icon", icon.id, icon.install_path);
        if let Some(car) = &icon.assets_car {
            println!("  {:<lw$}{} (CFBundleIconName={})", "", car.path, car.bundle_icon_name);
        }
    }

    for edit in &plan.header_edits {
        println!("  {:<lw$}{}: {} -> {}", "header", edit.file, edit.find, edit.replace);
    }

    if !plan.steps.is_empty() {
        let steps: Vec<String> = plan.steps.iter().map(ToString::to_string).collect();
        println!("  {:<lw$}{}", "steps", steps.join(", "));
    }

    if !plan.warnings.is_empty() {
        println!();
        for warning in &plan.warnings {
            println!("  {} {warning}", "warning:".yellow().bold());
        }
    }
    println!();
}

fn print_list<S: AsRef<str>>(label: &str, items: &[S]) {
    let lw = 12;
    for (i, item) in items.iter().enumerate() {
        let label = if i == 0 { label } else { "" };
        println!("  {label:<lw$}{}", item.as_ref());
    }
}
