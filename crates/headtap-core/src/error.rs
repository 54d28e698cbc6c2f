//! Error types for formula loading and build-configuration resolution.

use headtap_schema::{DigestError, OptionName, Variant};
use thiserror::Error;

/// Two or more requested settings that cannot hold together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Both options were enabled but only one may be.
    #[error("--with-{0} and --with-{1} are mutually exclusive")]
    MutuallyExclusive(OptionName, OptionName),

    /// An option was enabled without the option it depends on.
    #[error("--with-{option} requires --with-{requires}")]
    Requires {
        /// The dependent option.
        option: OptionName,
        /// The option that must also be enabled.
        requires: OptionName,
    },

    /// More than one icon was requested.
    #[error("only one icon may be selected, got: {}", .0.join(", "))]
    MultipleIcons(Vec<String>),

    /// Both the release archive and a HEAD checkout were requested.
    #[error("--HEAD and --stable cannot be combined")]
    ArchiveAndHead,
}

/// Errors returned by the resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The request contradicts itself.
    #[error("configuration conflict: {0}")]
    ConfigurationConflict(#[from] Conflict),

    /// A feature or source was requested against a variant that lacks it.
    #[error("{feature} is not supported on the {variant} variant of {formula}")]
    UnsupportedOnVariant {
        /// Formula being resolved.
        formula: String,
        /// The offending flag or source, as the user wrote it.
        feature: String,
        /// Variant the request was made against.
        variant: Variant,
    },

    /// A toggle names neither a known option nor a catalog icon.
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    /// An icon id that the formula does not ship.
    #[error("unknown icon '{icon}' for {formula}")]
    UnknownIcon {
        /// Formula being resolved.
        formula: String,
        /// The requested icon id.
        icon: String,
    },

    /// A known option that this particular formula does not expose.
    #[error("{formula} does not offer --with-{option}")]
    OptionNotOffered {
        /// Formula being resolved.
        formula: String,
        /// The offending option.
        option: OptionName,
    },
}

/// Errors that can occur when loading or validating a formula definition.
#[derive(Error, Debug)]
pub enum FormulaError {
    /// An I/O error occurred while reading a formula file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be deserialized into a formula.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// No embedded formula has this name.
    #[error("Unknown formula: {0}")]
    UnknownFormula(String),

    /// The formula parsed but is internally inconsistent.
    #[error("Invalid formula '{name}': {reason}")]
    Invalid {
        /// Formula name from the `[formula]` table.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors that can occur when loading the icon catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// An I/O error occurred while reading a catalog file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be deserialized into a catalog.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// An entry carries a malformed digest.
    #[error("Icon '{icon}': {source}")]
    Digest {
        /// Offending icon id.
        icon: String,
        /// Underlying validation failure.
        source: DigestError,
    },

    /// An entry id is not a valid icon id.
    #[error("Invalid icon id: {0}")]
    InvalidId(String),

    /// An alias is claimed twice or shadows an icon id.
    #[error("Icon '{icon}': alias '{alias}' is already taken")]
    AliasConflict {
        /// Icon declaring the alias.
        icon: String,
        /// The contested name.
        alias: String,
    },
}
