//! GitHub repository references used to build raw resource URLs.

/// Host serving raw repository contents.
pub const RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// A GitHub repository identified by owner and name.
///
/// # Example
///
/// ```
/// use headtap_core::repo::TapRepo;
///
/// let repo = TapRepo::parse("daviderestivo/homebrew-emacs-head").unwrap();
/// assert_eq!(repo.owner, "daviderestivo");
/// assert_eq!(
///     repo.raw_url("master", "icons/macos-legacy/modern-icon-pen.icns"),
///     "https://raw.githubusercontent.com/daviderestivo/homebrew-emacs-head/master/icons/macos-legacy/modern-icon-pen.icns"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TapRepo {
    /// Repository owner (GitHub user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl TapRepo {
    /// Create a `TapRepo` from an owner and repository name.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The canonical upstream tap.
    pub fn upstream() -> Self {
        Self::new(headtap_schema::UPSTREAM_OWNER, headtap_schema::UPSTREAM_REPO)
    }

    /// Parse `owner/name`.
    ///
    /// # Errors
    ///
    /// Returns an error string if `s` is not in `owner/name` format or if
    /// either component is empty.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!(
                "Invalid GitHub repo format: expected 'owner/name', got '{s}'"
            )),
        }
    }

    /// Raw-content URL for `path` on `branch`.
    pub fn raw_url(&self, branch: &str, path: &str) -> String {
        format!("{RAW_BASE_URL}/{}/{}/{branch}/{path}", self.owner, self.name)
    }
}

impl std::fmt::Display for TapRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let repo = TapRepo::parse("octo/homebrew-emacs-head").unwrap();
        assert_eq!(repo, TapRepo::new("octo", "homebrew-emacs-head"));
        assert_eq!(repo.to_string(), "octo/homebrew-emacs-head");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(TapRepo::parse("no-slash").is_err());
        assert!(TapRepo::parse("/name").is_err());
        assert!(TapRepo::parse("owner/").is_err());
        assert!(TapRepo::parse("a/b/c").is_err());
    }

    #[test]
    fn test_upstream() {
        assert_eq!(
            TapRepo::upstream().to_string(),
            "daviderestivo/homebrew-emacs-head"
        );
    }
}
