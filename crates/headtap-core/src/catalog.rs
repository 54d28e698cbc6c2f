//! The icon catalog shared by every formula.
//!
//! Loaded once from TOML and never mutated; the resolver receives it by
//! reference. Icons come in two sets: the shared table under
//! `icons/macos-legacy` and the flat `icons/` directory the older formulae
//! still fetch from.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use headtap_schema::{IconId, Sha256Digest};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../catalog/icons.toml");

/// Where `.icns` files of the shared set live, relative to the tap root.
pub const LEGACY_ICON_DIR: &str = "icons/macos-legacy";

/// Where `.icns` files of the flat set live.
pub const FLAT_ICON_DIR: &str = "icons";

/// Where macOS 26+ `Assets.car` files live in the tap.
pub const ASSETS_CAR_DIR: &str = "icons/macos-26+";

/// Which icon table a formula draws from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IconSet {
    /// `icons/macos-legacy`, with `Assets.car` sidecars for macOS 26+.
    #[default]
    Shared,
    /// `icons/`, without sidecars.
    Flat,
}

impl IconSet {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Flat => "flat",
        }
    }

    /// Default directory of the `.icns` files.
    pub fn dir(self) -> &'static str {
        match self {
            Self::Shared => LEGACY_ICON_DIR,
            Self::Flat => FLAT_ICON_DIR,
        }
    }

    /// Whether icons in this set ship an `Assets.car`.
    pub fn has_assets_car(self) -> bool {
        matches!(self, Self::Shared)
    }
}

impl std::fmt::Display for IconSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    icons: BTreeMap<String, RawEntry>,
    #[serde(default)]
    flat: BTreeMap<String, RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    sha256: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
}

/// One icon in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Catalog id.
    pub id: IconId,
    /// Set the icon belongs to.
    pub set: IconSet,
    /// Expected digest of the `.icns` file.
    pub sha256: Sha256Digest,
    /// Human description, shown by `headtap icons`.
    pub description: String,
    /// Path of the `.icns` file relative to the tap root.
    pub path: String,
    /// Other names accepted for this icon.
    pub aliases: Vec<IconId>,
}

impl CatalogEntry {
    /// Path of the matching `Assets.car`, relative to the tap root.
    pub fn assets_car_path(&self) -> String {
        format!("{ASSETS_CAR_DIR}/{}.car", self.id)
    }
}

/// Immutable mapping from icon id to its resource data.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    entries: BTreeMap<(IconSet, IconId), CatalogEntry>,
    aliases: BTreeMap<(IconSet, IconId), IconId>,
}

impl ResourceCatalog {
    /// The catalog embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the embedded TOML is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Load a catalog from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or any error
    /// [`ResourceCatalog::parse`] returns.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a catalog from a TOML string.
    ///
    /// `[icons.<id>]` tables form the shared set and `[flat.<id>]` tables
    /// the flat one.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed TOML,
    /// `CatalogError::InvalidId` for a bad icon id or alias,
    /// `CatalogError::AliasConflict` for an alias that shadows another
    /// name, and `CatalogError::Digest` for a malformed checksum.
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = toml::from_str(content)?;
        let mut catalog = Self::default();
        for (set, table) in [(IconSet::Shared, raw.icons), (IconSet::Flat, raw.flat)] {
            for (name, entry) in table {
                catalog.insert(set, &name, entry)?;
            }
        }
        for ((set, alias), target) in &catalog.aliases {
            if catalog.entries.contains_key(&(*set, alias.clone())) {
                return Err(CatalogError::AliasConflict {
                    icon: target.to_string(),
                    alias: alias.to_string(),
                });
            }
        }
        tracing::debug!(
            "Loaded icon catalog with {} entries and {} aliases",
            catalog.entries.len(),
            catalog.aliases.len()
        );
        Ok(catalog)
    }

    fn insert(&mut self, set: IconSet, name: &str, entry: RawEntry) -> Result<(), CatalogError> {
        let id = IconId::validated(name).map_err(|_| CatalogError::InvalidId(name.to_string()))?;
        let sha256 = Sha256Digest::new(entry.sha256).map_err(|source| CatalogError::Digest {
            icon: name.to_string(),
            source,
        })?;
        let aliases = entry
            .aliases
            .iter()
            .map(|a| IconId::validated(a).map_err(|_| CatalogError::InvalidId(a.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        for alias in &aliases {
            if self.aliases.insert((set, alias.clone()), id.clone()).is_some() {
                return Err(CatalogError::AliasConflict {
                    icon: name.to_string(),
                    alias: alias.to_string(),
                });
            }
        }
        let path = entry
            .path
            .unwrap_or_else(|| format!("{}/{name}.icns", set.dir()));
        self.entries.insert(
            (set, id.clone()),
            CatalogEntry {
                id,
                set,
                sha256,
                description: entry.description,
                path,
                aliases,
            },
        );
        Ok(())
    }

    /// Look up an icon in `set` by id or alias.
    pub fn get(&self, set: IconSet, id: &IconId) -> Option<&CatalogEntry> {
        let key = (set, id.clone());
        self.entries.get(&key).or_else(|| {
            let canonical = self.aliases.get(&key)?;
            self.entries.get(&(set, canonical.clone()))
        })
    }

    /// Whether `set` has an icon called `id`.
    pub fn contains(&self, set: IconSet, id: &IconId) -> bool {
        self.get(set, id).is_some()
    }

    /// Whether any set has an icon called `id`.
    pub fn knows(&self, id: &IconId) -> bool {
        [IconSet::Shared, IconSet::Flat]
            .into_iter()
            .any(|set| self.contains(set, id))
    }

    /// Entries of every set, shared set first, then in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries of one set in id order.
    pub fn iter_set(&self, set: IconSet) -> impl Iterator<Item = &CatalogEntry> {
        self.entries
            .range((set, IconId::new(""))..)
            .take_while(move |((s, _), _)| *s == set)
            .map(|(_, entry)| entry)
    }

    /// Number of icons across all sets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog has no icons.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
