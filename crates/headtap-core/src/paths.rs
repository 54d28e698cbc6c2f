use std::path::{Path, PathBuf};

/// Install locations that appear in configure arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    /// Brew prefix, e.g. `/opt/homebrew`.
    pub prefix: PathBuf,
    /// Versioned keg, e.g. `/opt/homebrew/Cellar/emacs-head@29/29.2`.
    pub keg: PathBuf,
}

impl BuildPaths {
    /// Paths for `formula` at `version` under `prefix`.
    pub fn for_formula(prefix: impl Into<PathBuf>, formula: &str, version: &str) -> Self {
        let prefix = prefix.into();
        let keg = prefix.join("Cellar").join(formula).join(version);
        Self { prefix, keg }
    }

    /// Shared site-lisp directory: `<prefix>/share/emacs/site-lisp`
    pub fn site_lisp(&self) -> PathBuf {
        self.prefix.join("share/emacs/site-lisp")
    }

    /// Info directory inside the keg: `<keg>/share/info/emacs`
    pub fn info_dir(&self) -> PathBuf {
        self.keg.join("share/info/emacs")
    }

    /// Linked prefix of another formula: `<prefix>/opt/<name>`
    pub fn opt(&self, name: &str) -> PathBuf {
        self.prefix.join("opt").join(name)
    }

    /// The keg directory.
    pub fn keg(&self) -> &Path {
        &self.keg
    }
}
