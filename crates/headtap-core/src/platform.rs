//! Host platform facts.

use std::process::Command;

use headtap_schema::MacosVersion;

/// Overrides host detection, e.g. `HEADTAP_MACOS_VERSION=mojave`.
pub const MACOS_VERSION_VAR: &str = "HEADTAP_MACOS_VERSION";

/// Immutable snapshot of the host, read once per invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformFacts {
    /// Host macOS version; `None` off macOS or when detection failed.
    pub macos: Option<MacosVersion>,
}

impl PlatformFacts {
    /// Facts for a specific macOS release.
    pub fn macos(version: MacosVersion) -> Self {
        Self {
            macos: Some(version),
        }
    }

    /// Facts for a host whose OS version is unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Detect the host.
    ///
    /// `HEADTAP_MACOS_VERSION` wins when set and valid. Otherwise macOS hosts
    /// ask `sw_vers -productVersion`.
    pub fn detect() -> Self {
        if let Ok(value) = std::env::var(MACOS_VERSION_VAR) {
            match value.parse::<MacosVersion>() {
                Ok(version) => return Self::macos(version),
                Err(e) => tracing::warn!("Ignoring {MACOS_VERSION_VAR}: {e}"),
            }
        }

        if cfg!(target_os = "macos") {
            return sw_vers().map_or_else(Self::unknown, Self::macos);
        }
        Self::unknown()
    }
}

fn sw_vers() -> Option<MacosVersion> {
    let output = Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .inspect_err(|e| tracing::debug!("sw_vers failed: {e}"))
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    text.trim()
        .parse()
        .inspect_err(|e| tracing::debug!("Unrecognized sw_vers output: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(PlatformFacts::unknown().macos, None);
        assert_eq!(
            PlatformFacts::macos(MacosVersion::MOJAVE).macos,
            Some(MacosVersion::MOJAVE)
        );
    }
}
