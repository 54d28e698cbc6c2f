//! Effective option state and request parsing.

use std::collections::BTreeSet;

use headtap_schema::{IconId, OptionName, OptionSet, Toggle};

use crate::catalog::ResourceCatalog;
use crate::error::ResolveError;

/// The on/off state of every option once defaults are applied.
///
/// An option is enabled when it was explicitly enabled, or when it was not
/// mentioned and is either a standard integration or recommended by the
/// formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOptions {
    enabled: BTreeSet<OptionName>,
}

impl EffectiveOptions {
    /// Apply defaults to an explicit request.
    pub fn new(set: &OptionSet, recommended: &[OptionName]) -> Self {
        let enabled = OptionName::ALL
            .into_iter()
            .filter(|opt| {
                set.explicit(*opt)
                    .unwrap_or_else(|| opt.is_standard() || recommended.contains(opt))
            })
            .collect();
        Self { enabled }
    }

    /// Whether `option` is on.
    ///
    /// `imagemagick` also counts as on when one of the pinned library
    /// versions is requested.
    pub fn enabled(&self, option: OptionName) -> bool {
        match option {
            OptionName::Imagemagick => [
                OptionName::Imagemagick,
                OptionName::Imagemagick6,
                OptionName::Imagemagick7,
            ]
            .iter()
            .any(|o| self.enabled.contains(o)),
            other => self.enabled.contains(&other),
        }
    }

    /// The pinned imagemagick version, if one was requested.
    pub fn imagemagick_pin(&self) -> Option<OptionName> {
        [OptionName::Imagemagick6, OptionName::Imagemagick7]
            .into_iter()
            .find(|o| self.enabled.contains(o))
    }

    /// Enabled options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = OptionName> + '_ {
        self.enabled.iter().copied()
    }
}

/// Classify raw toggles into an [`OptionSet`].
///
/// Names that are not options are looked up in the icon catalog. Icons
/// can only be requested, so `--without-<icon>` is ignored.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownOption`] for a name that is neither an
/// option nor a catalog icon.
pub fn parse_toggles<'a>(
    toggles: impl IntoIterator<Item = &'a Toggle>,
    catalog: &ResourceCatalog,
) -> Result<OptionSet, ResolveError> {
    let mut set = OptionSet::new();
    for toggle in toggles {
        let name = toggle.name();
        if let Ok(option) = name.parse::<OptionName>() {
            set.set(option, toggle.enabled());
            continue;
        }
        let icon = IconId::new(name);
        if catalog.knows(&icon) {
            if toggle.enabled() {
                set.add_icon(icon);
            } else {
                tracing::debug!("Ignoring --without-{name}: icons can only be requested");
            }
            continue;
        }
        return Err(ResolveError::UnknownOption(name.to_string()));
    }
    Ok(set)
}
