//! Build-configuration resolver for the emacs-head tap.
//!
//! Formulae are declarative TOML documents; the [`resolver::Resolver`]
//! turns one of them plus the user's options, the host platform and the
//! environment into a [`headtap_schema::BuildPlan`].

pub mod catalog;
pub mod condition;
pub mod env;
pub mod error;
pub mod formula;
pub mod options;
pub mod paths;
pub mod platform;
pub mod repo;
pub mod resolver;
pub mod resources;
pub mod rules;

pub use catalog::ResourceCatalog;
pub use env::EnvironmentContext;
pub use error::{CatalogError, Conflict, FormulaError, ResolveError};
pub use formula::Formula;
pub use options::{EffectiveOptions, parse_toggles};
pub use paths::BuildPaths;
pub use platform::PlatformFacts;
pub use resolver::{Resolver, SourceRequest};
pub use resources::resolve_resource_url;
