//! Environment context captured once per invocation.
//!
//! Nothing in the resolver reads the process environment directly. The CLI
//! calls [`EnvironmentContext::from_env`] up front and passes the snapshot
//! down, which keeps resolution pure and lets tests supply any combination
//! of variables.

use std::path::PathBuf;

use crate::repo::TapRepo;

/// CI repository, as `name` or `owner/name`.
pub const REPOSITORY_VAR: &str = "EMACS_HEAD_GITHUB_REPOSITORY";
/// CI repository owner, used when the repository is given without one.
pub const REPOSITORY_OWNER_VAR: &str = "EMACS_HEAD_GITHUB_REPOSITORY_OWNER";
/// CI branch ref, e.g. `refs/heads/feature-x`.
pub const REPOSITORY_REF_VAR: &str = "EMACS_HEAD_GITHUB_REPOSITORY_REF";
/// When set, resources are read from the working directory.
pub const LOCAL_RESOURCES_VAR: &str = "HOMEBREW_USE_LOCAL_RESOURCES";

/// Snapshot of the variables that influence resource URLs.
///
/// Every field is optional; an empty context resolves to the canonical
/// upstream repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentContext {
    /// CI repository (`name` or `owner/name`).
    pub repository: Option<String>,
    /// CI repository owner.
    pub repository_owner: Option<String>,
    /// CI branch ref.
    pub repository_ref: Option<String>,
    /// Local-resource override flag.
    pub use_local_resources: bool,
    /// Directory local resources are resolved against.
    pub working_dir: PathBuf,
}

impl EnvironmentContext {
    /// Read the process environment and current directory.
    pub fn from_env() -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|e| {
            tracing::warn!("Could not determine working directory: {e}");
            PathBuf::from(".")
        });
        Self::from_lookup(|name| std::env::var(name).ok(), working_dir)
    }

    /// Build a context from an arbitrary variable lookup.
    ///
    /// Variables set to an empty string count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, working_dir: PathBuf) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            repository: get(REPOSITORY_VAR),
            repository_owner: get(REPOSITORY_OWNER_VAR),
            repository_ref: get(REPOSITORY_REF_VAR),
            use_local_resources: get(LOCAL_RESOURCES_VAR).is_some(),
            working_dir,
        }
    }

    /// Builder-style CI repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Builder-style CI repository owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.repository_owner = Some(owner.into());
        self
    }

    /// Builder-style CI branch ref.
    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.repository_ref = Some(git_ref.into());
        self
    }

    /// Builder-style local-resource flag.
    pub fn with_local_resources(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.use_local_resources = true;
        self.working_dir = working_dir.into();
        self
    }

    /// The CI repository, if one is configured.
    ///
    /// `owner/name` is taken as is. A bare name is paired with the owner
    /// variable, or with the canonical owner when that is unset too.
    pub fn ci_repository(&self) -> Option<TapRepo> {
        let repository = self.repository.as_deref()?;
        if let Ok(repo) = TapRepo::parse(repository) {
            return Some(repo);
        }
        let owner = self
            .repository_owner
            .as_deref()
            .unwrap_or(headtap_schema::UPSTREAM_OWNER);
        Some(TapRepo::new(owner, repository.trim_matches('/')))
    }

    /// The CI branch with any `refs/heads/` prefix removed.
    pub fn ci_branch(&self) -> Option<&str> {
        self.repository_ref
            .as_deref()
            .map(|r| r.strip_prefix("refs/heads/").unwrap_or(r))
    }
}
