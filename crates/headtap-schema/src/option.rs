//! Build options.
//!
//! Options are a closed set: every toggle a formula can offer is a variant
//! of [`OptionName`], so rule tables can be checked exhaustively. Icons are
//! the exception. They come from a data catalog and are identified by
//! [`IconId`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A recognized build option.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum OptionName {
    /// Append `-g3` to CFLAGS and keep debug symbols.
    CrashDebug,
    /// Build the Cocoa (`NextStep`) application.
    Cocoa,
    /// Keep the bundled `ctags` executable.
    Ctags,
    /// D-Bus support.
    Dbus,
    /// GnuTLS support.
    Gnutls,
    /// ImageMagick support using the formula's default library.
    Imagemagick,
    /// ImageMagick support pinned to ImageMagick 6.
    #[serde(rename = "imagemagick@6")]
    Imagemagick6,
    /// ImageMagick support pinned to ImageMagick 7.
    #[serde(rename = "imagemagick@7")]
    Imagemagick7,
    /// Native JSON support via jansson.
    Jansson,
    /// SVG rendering via librsvg.
    Librsvg,
    /// XML parsing via libxml2.
    Libxml2,
    /// Use mailutils instead of the bundled POP client.
    Mailutils,
    /// Dynamic modules.
    Modules,
    /// Multicolor (emoji) fonts on macOS.
    MulticolorFonts,
    /// Elisp native compilation.
    NativeComp,
    /// Ahead-of-time native compilation of all Elisp.
    NativeFullAot,
    /// Do not refocus another frame when one is closed.
    NoFrameRefocus,
    /// Larger portable dumper.
    Pdumper,
    /// `poll()` instead of `select()`.
    Poll,
    /// Tree-sitter support.
    TreeSitter,
    /// Embedded WebKit widgets.
    Xwidgets,
    /// HarfBuzz text shaping.
    Harfbuzz,
    /// Memory Pool System garbage collector.
    Mps,
}

impl OptionName {
    /// Every option, in display order.
    pub const ALL: [Self; 23] = [
        Self::CrashDebug,
        Self::Cocoa,
        Self::Ctags,
        Self::Dbus,
        Self::Gnutls,
        Self::Imagemagick,
        Self::Imagemagick6,
        Self::Imagemagick7,
        Self::Jansson,
        Self::Librsvg,
        Self::Libxml2,
        Self::Mailutils,
        Self::Modules,
        Self::MulticolorFonts,
        Self::NativeComp,
        Self::NativeFullAot,
        Self::NoFrameRefocus,
        Self::Pdumper,
        Self::Poll,
        Self::TreeSitter,
        Self::Xwidgets,
        Self::Harfbuzz,
        Self::Mps,
    ];

    /// The option's name as written after `--with-` / `--without-`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CrashDebug => "crash-debug",
            Self::Cocoa => "cocoa",
            Self::Ctags => "ctags",
            Self::Dbus => "dbus",
            Self::Gnutls => "gnutls",
            Self::Imagemagick => "imagemagick",
            Self::Imagemagick6 => "imagemagick@6",
            Self::Imagemagick7 => "imagemagick@7",
            Self::Jansson => "jansson",
            Self::Librsvg => "librsvg",
            Self::Libxml2 => "libxml2",
            Self::Mailutils => "mailutils",
            Self::Modules => "modules",
            Self::MulticolorFonts => "multicolor-fonts",
            Self::NativeComp => "native-comp",
            Self::NativeFullAot => "native-full-aot",
            Self::NoFrameRefocus => "no-frame-refocus",
            Self::Pdumper => "pdumper",
            Self::Poll => "poll",
            Self::TreeSitter => "tree-sitter",
            Self::Xwidgets => "xwidgets",
            Self::Harfbuzz => "harfbuzz",
            Self::Mps => "mps",
        }
    }

    /// Standard integrations are enabled unless explicitly disabled.
    ///
    /// Everything else is disabled unless explicitly enabled. The split is
    /// per option and must not be collapsed into a global default.
    pub fn is_standard(self) -> bool {
        matches!(
            self,
            Self::Gnutls | Self::Librsvg | Self::Libxml2 | Self::Modules
        )
    }

    /// One-line help text.
    pub fn description(self) -> &'static str {
        match self {
            Self::CrashDebug => "Append `-g3` to CFLAGS to enable crash debugging",
            Self::Cocoa => "Build a Cocoa version of GNU Emacs",
            Self::Ctags => "Don't remove the ctags executable that GNU Emacs provides",
            Self::Dbus => "Build with dbus support",
            Self::Gnutls => "Build with gnutls support",
            Self::Imagemagick => "Build with imagemagick support",
            Self::Imagemagick6 => "Build with imagemagick support using imagemagick@6",
            Self::Imagemagick7 => "Build with imagemagick support using imagemagick@7",
            Self::Jansson => "Enable jansson support",
            Self::Librsvg => "Build with librsvg support",
            Self::Libxml2 => "Build with libxml2 support",
            Self::Mailutils => "Build with mailutils support",
            Self::Modules => "Build with dynamic modules support",
            Self::MulticolorFonts => "Enable multicolor fonts on macOS",
            Self::NativeComp => "Enable Elisp native compilation support",
            Self::NativeFullAot => "Enable Elisp Ahead-of-Time native compilation support",
            Self::NoFrameRefocus => {
                "Disables frame re-focus (i.e. closing one frame does not refocus another one)"
            }
            Self::Pdumper => "Enable pdumper support",
            Self::Poll => {
                "Experimental: use poll() instead of select() to support > 1024 file descriptors"
            }
            Self::TreeSitter => "Enable Tree-sitter support",
            Self::Xwidgets => "Enable xwidgets support",
            Self::Harfbuzz => "Enable HarfBuzz text shaping",
            Self::Mps => "Build the experimental MPS garbage collector branch",
        }
    }
}

impl std::fmt::Display for OptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OptionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("Unknown option: {s}"))
    }
}

/// Identifier of an icon in the resource catalog (e.g. `modern-icon-pen`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconId(String);

impl IconId {
    /// Create a new `IconId` without validation.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Create a validated `IconId`: non-empty, lowercase ASCII letters,
    /// digits and hyphens.
    ///
    /// # Errors
    ///
    /// Returns an error string describing the first offending character.
    pub fn validated(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("Invalid icon id: empty".to_string());
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(format!("Invalid icon id '{s}': unexpected character '{c}'"));
        }
        Ok(Self(s.to_string()))
    }

    /// Return the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IconId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IconId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A raw `--with-X` / `--without-X` token, before it is classified as an
/// option or an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// `--with-<name>` (or a bare `<name>`).
    With(String),
    /// `--without-<name>`.
    Without(String),
}

impl Toggle {
    /// The name the toggle refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::With(n) | Self::Without(n) => n,
        }
    }

    /// Whether the toggle enables its target.
    pub fn enabled(&self) -> bool {
        matches!(self, Self::With(_))
    }
}

impl std::str::FromStr for Toggle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_start_matches('-');
        let toggle = if let Some(name) = trimmed.strip_prefix("without-") {
            Self::Without(name.to_string())
        } else if let Some(name) = trimmed.strip_prefix("with-") {
            Self::With(name.to_string())
        } else {
            Self::With(trimmed.to_string())
        };
        if toggle.name().is_empty() {
            return Err(format!("Invalid option flag: '{s}'"));
        }
        Ok(toggle)
    }
}

/// The options a user explicitly asked for.
///
/// Only explicit choices are stored. Defaults are applied by the resolver,
/// which knows each formula's recommendations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    #[serde(default)]
    choices: BTreeMap<OptionName, bool>,
    #[serde(default)]
    icons: BTreeSet<IconId>,
}

impl OptionSet {
    /// An empty set: every option at its default, no icon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `--with-<option>`.
    pub fn with(mut self, option: OptionName) -> Self {
        self.set(option, true);
        self
    }

    /// Builder-style `--without-<option>`.
    pub fn without(mut self, option: OptionName) -> Self {
        self.set(option, false);
        self
    }

    /// Builder-style icon request.
    pub fn with_icon(mut self, icon: impl Into<IconId>) -> Self {
        self.add_icon(icon.into());
        self
    }

    /// Record an explicit choice. A later choice for the same option wins.
    pub fn set(&mut self, option: OptionName, enabled: bool) {
        self.choices.insert(option, enabled);
    }

    /// Request an icon.
    pub fn add_icon(&mut self, icon: IconId) {
        self.icons.insert(icon);
    }

    /// The explicit choice for `option`, if any.
    pub fn explicit(&self, option: OptionName) -> Option<bool> {
        self.choices.get(&option).copied()
    }

    /// All explicit choices in option order.
    pub fn choices(&self) -> impl Iterator<Item = (OptionName, bool)> + '_ {
        self.choices.iter().map(|(o, v)| (*o, *v))
    }

    /// Requested icons in name order.
    pub fn icons(&self) -> &BTreeSet<IconId> {
        &self.icons
    }
}
