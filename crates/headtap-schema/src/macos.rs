//! macOS release identification.
//!
//! The resolver only ever compares versions (`<= Mojave`, `>= Tahoe`), so
//! the type is a plain ordered triple with a codename table on the side.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A macOS release version such as `10.14.6` or `26.0`.
///
/// # Example
///
/// ```
/// use headtap_schema::MacosVersion;
///
/// let mojave: MacosVersion = "mojave".parse().unwrap();
/// let host: MacosVersion = "10.14.6".parse().unwrap();
/// assert!(host >= mojave);
/// assert_eq!(host.codename(), Some("mojave"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacosVersion {
    /// Major component (`10`, `11`, ..., `26`).
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

const CODENAMES: &[(&str, u32, u32)] = &[
    ("high-sierra", 10, 13),
    ("mojave", 10, 14),
    ("catalina", 10, 15),
    ("big-sur", 11, 0),
    ("monterey", 12, 0),
    ("ventura", 13, 0),
    ("sonoma", 14, 0),
    ("sequoia", 15, 0),
    ("tahoe", 26, 0),
];

impl MacosVersion {
    /// macOS 10.14. The last release whose SDK breaks `aligned_alloc`.
    pub const MOJAVE: Self = Self::new(10, 14, 0);

    /// macOS 26. First release that requires `Assets.car` app icons.
    pub const TAHOE: Self = Self::new(26, 0, 0);

    /// Create a version from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Marketing name of the release, if known.
    ///
    /// Releases before Big Sur are identified by `major.minor`, later ones
    /// by `major` alone.
    pub fn codename(&self) -> Option<&'static str> {
        CODENAMES
            .iter()
            .find(|(_, major, minor)| {
                *major == self.major && (self.major > 10 || *minor == self.minor)
            })
            .map(|(name, _, _)| *name)
    }

    /// True for releases at or below Mojave.
    pub fn is_mojave_or_older(&self) -> bool {
        // Any 10.14.x counts, so compare without the patch component.
        (self.major, self.minor) <= (Self::MOJAVE.major, Self::MOJAVE.minor)
    }

    /// True for Tahoe and newer.
    pub fn is_tahoe_or_newer(&self) -> bool {
        self.major >= Self::TAHOE.major
    }
}

impl std::fmt::Display for MacosVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

impl std::str::FromStr for MacosVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lowered = s.to_lowercase().replace([' ', '_'], "-");
        if let Some((_, major, minor)) = CODENAMES.iter().find(|(name, _, _)| *name == lowered) {
            return Ok(Self::new(*major, *minor, 0));
        }

        let mut parts = s.split('.');
        let mut next = |required: bool| -> Result<u32, String> {
            match parts.next() {
                Some(p) => p
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid macOS version: '{s}'")),
                None if required => Err(format!("Invalid macOS version: '{s}'")),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(false)?;
        let patch = next(false)?;
        if parts.next().is_some() {
            return Err(format!("Invalid macOS version: '{s}'"));
        }
        Ok(Self::new(major, minor, patch))
    }
}

impl Serialize for MacosVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacosVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_versions() {
        assert_eq!(
            "10.14.6".parse::<MacosVersion>().unwrap(),
            MacosVersion::new(10, 14, 6)
        );
        assert_eq!(
            "15".parse::<MacosVersion>().unwrap(),
            MacosVersion::new(15, 0, 0)
        );
        assert_eq!(
            " 26.1 ".parse::<MacosVersion>().unwrap(),
            MacosVersion::new(26, 1, 0)
        );
    }

    #[test]
    fn parses_codenames() {
        assert_eq!(
            "Big Sur".parse::<MacosVersion>().unwrap(),
            MacosVersion::new(11, 0, 0)
        );
        assert_eq!("tahoe".parse::<MacosVersion>().unwrap(), MacosVersion::TAHOE);
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<MacosVersion>().is_err());
        assert!("14.x".parse::<MacosVersion>().is_err());
        assert!("1.2.3.4".parse::<MacosVersion>().is_err());
    }

    #[test]
    fn mojave_boundary_ignores_patch() {
        assert!(MacosVersion::new(10, 14, 6).is_mojave_or_older());
        assert!(MacosVersion::new(10, 13, 0).is_mojave_or_older());
        assert!(!MacosVersion::new(10, 15, 0).is_mojave_or_older());
        assert!(!MacosVersion::new(11, 0, 0).is_mojave_or_older());
    }

    #[test]
    fn tahoe_boundary() {
        assert!(!MacosVersion::new(15, 6, 0).is_tahoe_or_newer());
        assert!(MacosVersion::new(26, 0, 1).is_tahoe_or_newer());
    }

    #[test]
    fn codename_lookup() {
        assert_eq!(MacosVersion::new(10, 15, 7).codename(), Some("catalina"));
        assert_eq!(MacosVersion::new(14, 5, 0).codename(), Some("sonoma"));
        assert_eq!(MacosVersion::new(9, 0, 0).codename(), None);
    }

    #[test]
    fn display_drops_zero_patch() {
        assert_eq!(MacosVersion::new(14, 5, 0).to_string(), "14.5");
        assert_eq!(MacosVersion::new(10, 14, 6).to_string(), "10.14.6");
    }
}
