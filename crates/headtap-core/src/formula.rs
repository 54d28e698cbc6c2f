//! TOML formula definitions
//!
//! One document per formula. The resolver never branches on a formula's
//! name; everything that differs between `emacs-head@29` and `@31` is data
//! in these files.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use headtap_schema::{IconId, OptionName, Sha256Digest, Variant};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, IconSet, ResourceCatalog};
use crate::condition::Condition;
use crate::error::FormulaError;

/// Formulae shipped with the binary, in display order.
const BUILTIN: &[(&str, &str)] = &[
    ("emacs-head", include_str!("../formulae/emacs-head.toml")),
    ("emacs-head@26", include_str!("../formulae/emacs-head@26.toml")),
    ("emacs-head@27", include_str!("../formulae/emacs-head@27.toml")),
    ("emacs-head@28", include_str!("../formulae/emacs-head@28.toml")),
    ("emacs-head@29", include_str!("../formulae/emacs-head@29.toml")),
    ("emacs-head@31", include_str!("../formulae/emacs-head@31.toml")),
];

/// Identity of a formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormulaInfo {
    /// Formula name, e.g. `emacs-head@29`.
    pub name: String,
    /// Upstream version.
    pub version: String,
    /// Packaging revision.
    #[serde(default)]
    pub revision: u32,
    /// Short human-readable summary.
    #[serde(default)]
    pub description: String,
    /// Project homepage.
    #[serde(default)]
    pub homepage: String,
}

/// Release tarball.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveSource {
    /// Primary download URL.
    pub url: String,
    /// Fallback mirror.
    #[serde(default)]
    pub mirror: Option<String>,
    /// Expected digest of the tarball.
    pub sha256: Sha256Digest,
}

/// Branch chosen when an option is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchOverride {
    /// When the override applies.
    pub when: Condition,
    /// Branch to check out.
    pub branch: String,
}

/// Git checkout used by `--HEAD`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadSource {
    /// Repository URL.
    pub url: String,
    /// Fixed branch.
    #[serde(default)]
    pub branch: Option<String>,
    /// Check out `emacs-<major>`, derived from the formula version.
    #[serde(default)]
    pub track_release: bool,
    /// Option-dependent branches; the first match wins.
    #[serde(default)]
    pub overrides: Vec<BranchOverride>,
}

/// Available sources. At least one must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sources {
    /// Stable release archive.
    #[serde(default)]
    pub archive: Option<ArchiveSource>,
    /// HEAD checkout.
    #[serde(default)]
    pub head: Option<HeadSource>,
}

/// Which options a formula exposes and how they default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsSpec {
    /// Options users may toggle.
    #[serde(default)]
    pub offered: Vec<OptionName>,
    /// Options on by default for this formula only.
    #[serde(default)]
    pub recommended: Vec<OptionName>,
    /// Options that only work with `--HEAD`.
    #[serde(default)]
    pub head_only: Vec<OptionName>,
    /// Options that only work with the release archive.
    #[serde(default)]
    pub stable_only: Vec<OptionName>,
}

/// The imagemagick formula to build against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LibraryChoice {
    /// Same library for both variants.
    Same(String),
    /// Different library per variant.
    PerVariant {
        /// Used for release builds.
        stable: String,
        /// Used for `--HEAD` builds.
        head: String,
    },
}

impl LibraryChoice {
    /// The library for `variant`.
    pub fn for_variant(&self, variant: Variant) -> &str {
        match (self, variant) {
            (Self::Same(lib), _) | (Self::PerVariant { stable: lib, .. }, Variant::Stable) => lib,
            (Self::PerVariant { head, .. }, Variant::Head) => head,
        }
    }
}

/// Formula-level build settings that do not hang off a single option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSpec {
    /// Compiler flags appended to CFLAGS.
    #[serde(default)]
    pub cflags: Vec<String>,
    /// Configure arguments added after the option rules.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Default imagemagick library.
    #[serde(default)]
    pub imagemagick: Option<LibraryChoice>,
    /// When `./autogen.sh` runs before configure.
    #[serde(default)]
    pub autogen: Option<Condition>,
    /// GNU tools whose `libexec/gnubin` is put on `PATH` for autogen.
    #[serde(default)]
    pub gnu_tools: Vec<String>,
    /// When `--with-harfbuzz` is implied without being requested.
    #[serde(default)]
    pub harfbuzz: Option<Condition>,
    /// Where `--with-harfbuzz` goes relative to the cocoa arguments.
    #[serde(default)]
    pub harfbuzz_position: HarfbuzzPosition,
    /// CFLAGS that replace `cflags` when their condition holds.
    #[serde(default)]
    pub cflags_reset: Option<CflagsReset>,
    /// Register info manuals after install.
    #[serde(default)]
    pub install_info: bool,
}

/// Placement of `--with-harfbuzz` in the trailing configure arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarfbuzzPosition {
    /// `--with-harfbuzz --with-ns ...`
    #[default]
    BeforeCocoa,
    /// `--with-ns ... --with-harfbuzz`
    AfterCocoa,
}

/// A conditional replacement of the formula's CFLAGS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CflagsReset {
    /// When the reset applies.
    pub when: Condition,
    /// Flags used instead of `cflags`.
    pub flags: Vec<String>,
}

/// Which catalog icons a formula ships.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IconsSpec {
    /// Catalog set the icons come from.
    #[serde(default)]
    pub set: IconSet,
    /// Icons this formula ships; the whole set when absent.
    #[serde(default)]
    pub only: Option<Vec<IconId>>,
    /// Digests that differ from the catalog for this formula.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub digests: BTreeMap<IconId, Sha256Digest>,
}

/// A conditional source patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchSpec {
    /// Resource name.
    pub name: String,
    /// Path relative to the tap root.
    pub path: String,
    /// Expected digest.
    pub sha256: Sha256Digest,
    /// When the patch is applied.
    #[serde(default)]
    pub when: Condition,
}

/// A warning shown when its condition holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notice {
    /// When the notice is shown.
    pub when: Condition,
    /// Text shown to the user.
    pub message: String,
}

/// Complete formula definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Formula {
    /// Identity and version.
    pub formula: FormulaInfo,
    /// Archive and/or head source.
    pub source: Sources,
    /// Offered options and their defaults.
    #[serde(default)]
    pub options: OptionsSpec,
    /// Formula-level build settings.
    #[serde(default)]
    pub build: BuildSpec,
    /// Icon restrictions.
    #[serde(default)]
    pub icons: IconsSpec,
    /// Patches in application order.
    #[serde(default)]
    pub patches: Vec<PatchSpec>,
    /// Conditional warnings.
    #[serde(default)]
    pub notices: Vec<Notice>,
}

impl Formula {
    /// Parse and validate a formula from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::Io` if the file cannot be read, or any error
    /// [`Formula::parse`] returns.
    pub fn from_file(path: &Path) -> Result<Self, FormulaError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a formula from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::Parse` if the TOML is malformed or does not
    /// match the schema, and `FormulaError::Invalid` if it is internally
    /// inconsistent.
    pub fn parse(content: &str) -> Result<Self, FormulaError> {
        let formula: Self = toml::from_str(content)?;
        formula.validate()?;
        Ok(formula)
    }

    /// Load one of the formulae shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::UnknownFormula` for an unknown name.
    pub fn builtin(name: &str) -> Result<Self, FormulaError> {
        let (_, content) = BUILTIN
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| FormulaError::UnknownFormula(name.to_string()))?;
        Self::parse(content)
    }

    /// Names of the formulae shipped with the binary.
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(name, _)| *name)
    }

    /// Load every formula shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn builtin_all() -> Result<Vec<Self>, FormulaError> {
        BUILTIN.iter().map(|(_, content)| Self::parse(content)).collect()
    }

    /// Serialize this formula to a pretty-printed TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `toml::ser::Error` if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Formula name.
    pub fn name(&self) -> &str {
        &self.formula.name
    }

    /// Upstream version.
    pub fn version(&self) -> &str {
        &self.formula.version
    }

    /// Whether users may toggle `option`.
    ///
    /// The pinned imagemagick spellings come with plain `imagemagick`.
    pub fn offers(&self, option: OptionName) -> bool {
        let offered = |o| self.options.offered.contains(&o);
        match option {
            OptionName::Imagemagick6 | OptionName::Imagemagick7 => {
                offered(option) || offered(OptionName::Imagemagick)
            }
            other => offered(other),
        }
    }

    /// Offered options plus the pinned imagemagick spellings.
    pub fn offered_options(&self) -> Vec<OptionName> {
        OptionName::ALL
            .into_iter()
            .filter(|o| self.offers(*o))
            .collect()
    }

    /// Whether `option` is on when the user does not mention it.
    pub fn default_enabled(&self, option: OptionName) -> bool {
        option.is_standard() || self.options.recommended.contains(&option)
    }

    /// Imagemagick formula to build against when no version is pinned.
    pub fn imagemagick_library(&self, variant: Variant) -> &str {
        self.build
            .imagemagick
            .as_ref()
            .map_or("imagemagick", |lib| lib.for_variant(variant))
    }

    /// `emacs-<major>` for release-tracking head builds.
    pub fn release_branch(&self) -> String {
        let major = self.version().split('.').next().unwrap_or_default();
        format!("emacs-{major}")
    }

    /// Catalog entry for `icon` (an id or alias) if this formula ships it.
    pub fn icon_entry<'a>(
        &self,
        icon: &IconId,
        catalog: &'a ResourceCatalog,
    ) -> Option<&'a CatalogEntry> {
        catalog
            .get(self.icons.set, icon)
            .filter(|entry| self.lists_icon(&entry.id))
    }

    /// Whether this formula ships `icon` from `catalog`.
    pub fn ships_icon(&self, icon: &IconId, catalog: &ResourceCatalog) -> bool {
        self.icon_entry(icon, catalog).is_some()
    }

    /// Icons this formula ships, in id order.
    pub fn shipped_icons<'a>(
        &'a self,
        catalog: &'a ResourceCatalog,
    ) -> impl Iterator<Item = &'a CatalogEntry> {
        catalog
            .iter_set(self.icons.set)
            .filter(|entry| self.lists_icon(&entry.id))
    }

    /// Digest this formula expects for `entry`.
    pub fn icon_digest<'a>(&'a self, entry: &'a CatalogEntry) -> &'a Sha256Digest {
        self.icons.digests.get(&entry.id).unwrap_or(&entry.sha256)
    }

    fn lists_icon(&self, id: &IconId) -> bool {
        self.icons.only.as_ref().is_none_or(|only| only.contains(id))
    }

    fn validate(&self) -> Result<(), FormulaError> {
        let invalid = |reason: String| FormulaError::Invalid {
            name: self.formula.name.clone(),
            reason,
        };

        if self.source.archive.is_none() && self.source.head.is_none() {
            return Err(invalid("declares neither an archive nor a head source".into()));
        }

        for (list, label) in [
            (&self.options.recommended, "recommended"),
            (&self.options.head_only, "head_only"),
            (&self.options.stable_only, "stable_only"),
        ] {
            if let Some(opt) = list.iter().find(|o| !self.offers(**o)) {
                return Err(invalid(format!("{label} option '{opt}' is not offered")));
            }
        }

        if !self.options.head_only.is_empty() && self.source.head.is_none() {
            return Err(invalid("head_only options without a head source".into()));
        }
        if !self.options.stable_only.is_empty() && self.source.archive.is_none() {
            return Err(invalid("stable_only options without an archive source".into()));
        }

        let mut conditions: Vec<&Condition> = Vec::new();
        conditions.extend(self.patches.iter().map(|p| &p.when));
        conditions.extend(self.notices.iter().map(|n| &n.when));
        conditions.extend(self.build.autogen.iter());
        conditions.extend(self.build.harfbuzz.iter());
        conditions.extend(self.build.cflags_reset.iter().map(|r| &r.when));
        if let Some(head) = &self.source.head {
            conditions.extend(head.overrides.iter().map(|o| &o.when));
        }
        for condition in conditions {
            if let Some(opt) = condition.options().into_iter().find(|o| !self.offers(*o)) {
                return Err(invalid(format!("condition refers to unoffered option '{opt}'")));
            }
        }

        if let Some(only) = &self.icons.only
            && let Some(stray) = self.icons.digests.keys().find(|id| !only.contains(id))
        {
            return Err(invalid(format!("digest override for unshipped icon '{stray}'")));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.patches.iter().find(|p| !seen.insert(p.name.as_str())) {
            return Err(invalid(format!("duplicate patch '{}'", dup.name)));
        }

        Ok(())
    }
}

impl std::str::FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[formula]
name = "emacs-test"
version = "30.1"

[source.archive]
url = "https://ftp.gnu.org/gnu/emacs/emacs-30.1.tar.xz"
sha256 = "4d90e6751ad8967822c6e092db07466b9d383ef1653feb2f95c93e7de66d3485"

[options]
offered = ["cocoa", "gnutls", "poll"]

[[patches]]
name = "0011-Poll"
path = "patches/0011-Poll.patch"
sha256 = "052eacac5b7bd86b466f9a3d18bff9357f2b97517f463a09e4c51255bdb14648"
when = { with = "poll" }
"#;

    #[test]
    fn test_parse_formula() {
        let formula = Formula::parse(MINIMAL).unwrap();
        assert_eq!(formula.name(), "emacs-test");
        assert_eq!(formula.formula.revision, 0);
        assert!(formula.offers(OptionName::Poll));
        assert!(!formula.offers(OptionName::Dbus));
        assert_eq!(formula.patches[0].when, Condition::With(OptionName::Poll));
        assert_eq!(formula.release_branch(), "emacs-30");
    }

    #[test]
    fn test_parse_malformed_toml() {
        assert!(matches!(
            Formula::parse("this is not valid toml {{{"),
            Err(FormulaError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_missing_required_fields() {
        let incomplete = r#"
[source.head]
url = "https://github.com/emacs-mirror/emacs.git"
"#;
        assert!(Formula::parse(incomplete).is_err());
    }

    #[test]
    fn test_from_str_trait() {
        use std::str::FromStr;
        let formula = Formula::from_str(MINIMAL);
        assert_eq!(formula.unwrap().name(), "emacs-test");
    }

    #[test]
    fn test_no_source_is_invalid() {
        let src = r#"
[formula]
name = "emacs-empty"
version = "30.1"
"#;
        assert!(matches!(
            Formula::parse(src),
            Err(FormulaError::Parse(_) | FormulaError::Invalid { .. })
        ));
    }

    #[test]
    fn test_condition_on_unoffered_option_is_invalid() {
        let src = MINIMAL.replace(r#"offered = ["cocoa", "gnutls", "poll"]"#, r#"offered = ["cocoa"]"#);
        let err = Formula::parse(&src).unwrap_err();
        assert!(err.to_string().contains("unoffered option 'poll'"), "{err}");
    }

    #[test]
    fn test_head_only_requires_head_source() {
        let src = MINIMAL.replace(
            r#"offered = ["cocoa", "gnutls", "poll"]"#,
            "offered = [\"cocoa\", \"gnutls\", \"poll\"]\nhead_only = [\"poll\"]",
        );
        assert!(matches!(
            Formula::parse(&src),
            Err(FormulaError::Invalid { .. })
        ));
    }

    #[test]
    fn test_duplicate_patch_is_invalid() {
        let patch = MINIMAL.split("[[patches]]").nth(1).unwrap();
        let src = format!("{MINIMAL}\n[[patches]]{patch}");
        let err = Formula::parse(&src).unwrap_err();
        assert!(err.to_string().contains("duplicate patch"), "{err}");
    }

    #[test]
    fn test_bad_digest_fails_load() {
        let src = MINIMAL.replace(
            "052eacac5b7bd86b466f9a3d18bff9357f2b97517f463a09e4c51255bdb14648",
            "052eacac",
        );
        assert!(matches!(Formula::parse(&src), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(matches!(
            Formula::builtin("emacs-head@99"),
            Err(FormulaError::UnknownFormula(_))
        ));
    }

    #[test]
    fn test_library_choice_forms() {
        #[derive(Deserialize)]
        struct Holder {
            lib: LibraryChoice,
        }
        let same: Holder = toml::from_str(r#"lib = "imagemagick""#).unwrap();
        assert_eq!(same.lib.for_variant(Variant::Head), "imagemagick");

        let split: Holder =
            toml::from_str(r#"lib = { stable = "imagemagick@6", head = "imagemagick@7" }"#).unwrap();
        assert_eq!(split.lib.for_variant(Variant::Stable), "imagemagick@6");
        assert_eq!(split.lib.for_variant(Variant::Head), "imagemagick@7");
    }

    #[test]
    fn test_to_toml_round_trip() {
        let formula = Formula::builtin("emacs-head@29").unwrap();
        let text = formula.to_toml().unwrap();
        let again = Formula::parse(&text).unwrap();
        assert_eq!(again.name(), "emacs-head@29");
        assert_eq!(again.patches.len(), formula.patches.len());
    }

    #[test]
    fn test_icon_restriction() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let legacy = Formula::builtin("emacs-head").unwrap();
        let at27 = Formula::builtin("emacs-head@27").unwrap();
        let at28 = Formula::builtin("emacs-head@28").unwrap();
        let modern = Formula::builtin("emacs-head@29").unwrap();
        let doom = IconId::from("modern-icon-doom");

        assert!(!legacy.ships_icon(&doom, &catalog));
        assert!(at28.ships_icon(&doom, &catalog));
        assert!(at28.ships_icon(&IconId::from("emacs-icon-doom"), &catalog));
        assert!(!at28.ships_icon(&IconId::from("modern-icon-dragon"), &catalog));
        assert!(modern.ships_icon(&doom, &catalog));
        assert!(!modern.ships_icon(&IconId::from("emacs-icon-doom"), &catalog));

        assert_eq!(legacy.shipped_icons(&catalog).count(), 11);
        assert_eq!(at27.shipped_icons(&catalog).count(), 12);
        assert_eq!(
            at28.shipped_icons(&catalog).count(),
            catalog.iter_set(IconSet::Flat).count()
        );
        assert_eq!(
            modern.shipped_icons(&catalog).count(),
            catalog.iter_set(IconSet::Shared).count()
        );
    }

    #[test]
    fn test_icon_digest_override() {
        let catalog = ResourceCatalog::builtin().unwrap();
        let papirus = IconId::from("modern-icon-papirus");
        let legacy = Formula::builtin("emacs-head").unwrap();
        let at28 = Formula::builtin("emacs-head@28").unwrap();

        let entry = legacy.icon_entry(&papirus, &catalog).unwrap();
        assert_eq!(entry.set, IconSet::Flat);
        assert_eq!(
            legacy.icon_digest(entry).as_str(),
            "50aef07397ab17073deb107e32a8c7b86a0e9dddf5a0f78c4fcff796099623f8"
        );
        let entry = at28.icon_entry(&papirus, &catalog).unwrap();
        assert_eq!(at28.icon_digest(entry), &entry.sha256);
    }

    #[test]
    fn test_digest_override_for_unshipped_icon_rejected() {
        let text = format!(
            "{MINIMAL}\n[icons]\nonly = [\"retro-icon-sink\"]\n\n[icons.digests]\nmodern-icon-pen = \"{}\"\n",
            "4fda050447a9803d38dd6fd7d35386103735aec239151714e8bf60bf9d357d3b"
        );
        let err = Formula::parse(&text).unwrap_err();
        assert!(err.to_string().contains("modern-icon-pen"), "{err}");
    }
}
