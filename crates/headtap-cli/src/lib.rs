//! headtap - build plans for the emacs-head tap
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
//!
//! Resolves a formula plus `--with-X` / `--without-X` choices into the
//! configure arguments, patches, icon and source a build needs.
//!
//! # Environment
//!
//! ```text
//! EMACS_HEAD_GITHUB_REPOSITORY        CI repository (name or owner/name)
//! EMACS_HEAD_GITHUB_REPOSITORY_OWNER  CI repository owner
//! EMACS_HEAD_GITHUB_REPOSITORY_REF    CI branch ref
//! HOMEBREW_USE_LOCAL_RESOURCES        fetch patches and icons from the cwd
//! HOMEBREW_PREFIX                     brew prefix (default /opt/homebrew)
//! HEADTAP_MACOS_VERSION               override host macOS detection
//! RUST_LOG                            log filter
//! ```

pub mod cmd;

use clap::{Parser, Subcommand};
use headtap_schema::MacosVersion;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "headtap")]
#[command(author, version, about = "headtap - build plans for the emacs-head tap")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a formula into a build plan
    Resolve {
        /// Built-in formula name (e.g. emacs-head@29)
        #[arg(required_unless_present = "formula_file", conflicts_with = "formula_file")]
        formula: Option<String>,
        /// Load the formula from a TOML file instead
        #[arg(long, value_name = "FILE")]
        formula_file: Option<PathBuf>,
        /// Enable options or pick an icon (cocoa,native-comp,modern-icon-pen)
        #[arg(long = "with", value_name = "NAME", value_delimiter = ',')]
        with: Vec<String>,
        /// Disable options
        #[arg(long = "without", value_name = "NAME", value_delimiter = ',')]
        without: Vec<String>,
        /// Build from the version-control checkout
        #[arg(long, alias = "HEAD")]
        head: bool,
        /// Build from the release archive
        #[arg(long)]
        stable: bool,
        /// Homebrew prefix used in path arguments
        #[arg(long, env = "HOMEBREW_PREFIX", default_value = "/opt/homebrew")]
        prefix: PathBuf,
        /// Target macOS version (e.g. 14.5, mojave); detected when absent
        #[arg(long, env = "HEADTAP_MACOS_VERSION")]
        macos: Option<MacosVersion>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// List built-in formulae
    Formulae {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the options a formula offers
    Options {
        /// Formula name
        formula: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog icons
    Icons {
        /// Only icons this formula ships
        formula: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the download URL of a tap resource
    Url {
        /// Path relative to the tap root (e.g. patches/emacs-29/system-appearance.patch)
        path: String,
    },
}
