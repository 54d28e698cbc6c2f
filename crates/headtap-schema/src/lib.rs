//! Shared types for headtap build plans.
//!
//! Everything the resolver produces and everything the external build
//! collaborator consumes lives here, so both sides agree on one wire format.

pub mod hash;
pub mod macos;
pub mod option;
pub mod types;

// Re-exports
pub use hash::*;
pub use macos::MacosVersion;
pub use option::{IconId, OptionName, OptionSet, Toggle};
pub use types::*;

/// Owner of the canonical upstream tap repository.
pub const UPSTREAM_OWNER: &str = "daviderestivo";

/// Name of the canonical upstream tap repository.
pub const UPSTREAM_REPO: &str = "homebrew-emacs-head";

/// Default branch of the upstream tap.
pub const DEFAULT_BRANCH: &str = "master";
