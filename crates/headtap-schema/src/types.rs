use serde::{Deserialize, Serialize};

use crate::hash::Sha256Digest;
use crate::option::IconId;

/// Source-selection mode of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Fixed-version release archive.
    Stable,
    /// Version-control checkout.
    Head,
}

impl Variant {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Head => "head",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable" | "archive" => Ok(Self::Stable),
            "head" | "vcs" => Ok(Self::Head),
            _ => Err(format!("Unknown variant: {s}")),
        }
    }
}

/// Where the build fetches its sources from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedSource {
    /// Release tarball.
    Archive {
        /// Primary download URL.
        url: String,
        /// Fallback mirror, when the formula declares one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mirror: Option<String>,
        /// Expected digest of the tarball.
        sha256: Sha256Digest,
    },
    /// Git checkout.
    Vcs {
        /// Repository URL.
        url: String,
        /// Branch to check out; the repository default when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
}

impl ResolvedSource {
    /// The variant this source belongs to.
    pub fn variant(&self) -> Variant {
        match self {
            Self::Archive { .. } => Variant::Stable,
            Self::Vcs { .. } => Variant::Head,
        }
    }

    /// The primary URL regardless of variant.
    pub fn url(&self) -> &str {
        match self {
            Self::Archive { url, .. } | Self::Vcs { url, .. } => url,
        }
    }
}

/// A patch to download and apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchRef {
    /// Resource name (e.g. `0005-System-appearance`).
    pub name: String,
    /// Fully resolved download URL.
    pub url: String,
    /// Expected digest of the patch file.
    pub sha256: Sha256Digest,
}

/// Patches in application order.
///
/// Order matters: later patches may assume earlier ones were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchSet(Vec<PatchRef>);

impl PatchSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a patch.
    pub fn push(&mut self, patch: PatchRef) {
        self.0.push(patch);
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no patch applies.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatchRef> {
        self.0.iter()
    }

    /// Patch names in application order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }

    /// True when a patch with this name is included.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p.name == name)
    }
}

impl<'a> IntoIterator for &'a PatchSet {
    type Item = &'a PatchRef;
    type IntoIter = std::slice::Iter<'a, PatchRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<PatchRef> for PatchSet {
    fn from_iter<I: IntoIterator<Item = PatchRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered configure arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentList(Vec<String>);

impl ArgumentList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one token.
    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// True when `arg` appears verbatim.
    pub fn contains(&self, arg: &str) -> bool {
        self.0.iter().any(|a| a == arg)
    }

    /// The tokens as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> Extend<S> for ArgumentList {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl std::fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Compiled `Assets.car` sidecar used for app icons on macOS 26 and newer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsCar {
    /// Path of the `.car` file relative to the tap root.
    pub path: String,
    /// Value for `CFBundleIconName` in the app's `Info.plist`.
    pub bundle_icon_name: String,
}

/// The icon chosen for the application bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSelection {
    /// Catalog id.
    pub id: IconId,
    /// Fully resolved `.icns` download URL.
    pub url: String,
    /// Expected digest of the `.icns` file.
    pub sha256: Sha256Digest,
    /// Destination inside the build tree.
    pub install_path: String,
    /// Present on macOS 26+.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_car: Option<AssetsCar>,
}

/// Prepend a directory to a search-path environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEdit {
    /// Variable name (`PATH`, `PKG_CONFIG_PATH`).
    pub variable: String,
    /// Directory to prepend.
    pub prepend: String,
}

/// A textual replacement in a generated header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEdit {
    /// File relative to the source root.
    pub file: String,
    /// Exact line to look for.
    pub find: String,
    /// Replacement line.
    pub replace: String,
}

/// Extra build actions around configure and install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStep {
    /// Run `./autogen.sh` before configure.
    Autogen,
    /// Run `dsymutil` on the app binary.
    Dsymutil,
    /// Copy `native-lisp` into the app bundle.
    InstallNativeLisp,
    /// Remove the bundled `ctags` binary and man page.
    RemoveCtags,
    /// Register info manuals with `install-info`.
    InstallInfo,
}

impl BuildStep {
    /// Kebab-case name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Autogen => "autogen",
            Self::Dsymutil => "dsymutil",
            Self::InstallNativeLisp => "install-native-lisp",
            Self::RemoveCtags => "remove-ctags",
            Self::InstallInfo => "install-info",
        }
    }
}

impl std::fmt::Display for BuildStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the external build collaborator needs for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Formula name (e.g. `emacs-head@29`).
    pub formula: String,
    /// Formula version.
    pub version: String,
    /// Formula revision.
    pub revision: u32,
    /// Source variant in use.
    pub variant: Variant,
    /// Where to fetch sources.
    pub source: ResolvedSource,
    /// Configure arguments.
    pub arguments: ArgumentList,
    /// Extra `make` arguments.
    #[serde(default)]
    pub make_flags: Vec<String>,
    /// Extra compiler flags.
    #[serde(default)]
    pub cflags: Vec<String>,
    /// Search-path edits.
    #[serde(default)]
    pub path_edits: Vec<PathEdit>,
    /// Patches to apply, in order.
    pub patches: PatchSet,
    /// Every patch the formula declares, fetched even when not applied.
    #[serde(default)]
    pub prefetch: Vec<PatchRef>,
    /// Selected icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconSelection>,
    /// Generated-header fixups.
    #[serde(default)]
    pub header_edits: Vec<HeaderEdit>,
    /// Extra build actions.
    #[serde(default)]
    pub steps: Vec<BuildStep>,
    /// User-facing notices.
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn digest() -> Sha256Digest {
        Sha256Digest::new("1f8423ea7e6e66c9ac6dd8e37b119972daa1264de00172a24a79a710efcb8130")
            .unwrap()
    }

    #[test]
    fn source_is_tagged_by_kind() {
        let src = ResolvedSource::Vcs {
            url: "https://github.com/emacs-mirror/emacs.git".into(),
            branch: Some("emacs-29".into()),
        };
        let json = serde_json::to_value(&src).unwrap();
        assert_eq!(json["kind"], "vcs");
        assert_eq!(json["branch"], "emacs-29");
        assert_eq!(src.variant(), Variant::Head);
    }

    #[test]
    fn archive_without_mirror_omits_field() {
        let src = ResolvedSource::Archive {
            url: "https://ftp.gnu.org/gnu/emacs/emacs-29.2.tar.xz".into(),
            mirror: None,
            sha256: digest(),
        };
        let json = serde_json::to_value(&src).unwrap();
        assert!(json.get("mirror").is_none());
        assert_eq!(src.variant(), Variant::Stable);
    }

    #[test]
    fn patch_set_keeps_declared_order() {
        let set: PatchSet = ["0008-Fix-window-role", "0005-System-appearance"]
            .into_iter()
            .map(|name| PatchRef {
                name: name.into(),
                url: format!("https://example.invalid/{name}.patch"),
                sha256: digest(),
            })
            .collect();
        assert_eq!(
            set.names(),
            vec!["0008-Fix-window-role", "0005-System-appearance"]
        );
        assert!(set.contains("0005-System-appearance"));
    }

    #[test]
    fn argument_list_display_joins_with_spaces() {
        let mut args = ArgumentList::new();
        args.push("--with-ns");
        args.extend(["--disable-ns-self-contained"]);
        assert_eq!(args.to_string(), "--with-ns --disable-ns-self-contained");
    }

    #[test]
    fn build_step_display_matches_serde() {
        for step in [BuildStep::InstallNativeLisp, BuildStep::RemoveCtags] {
            let json = serde_json::to_value(step).unwrap();
            assert_eq!(json, step.to_string());
        }
    }

    #[test]
    fn variant_parses_aliases() {
        assert_eq!("archive".parse::<Variant>().unwrap(), Variant::Stable);
        assert_eq!("HEAD".parse::<Variant>().unwrap(), Variant::Head);
        assert!("nightly".parse::<Variant>().is_err());
    }
}
