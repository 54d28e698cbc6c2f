//! Build-configuration resolution.
//!
//! A [`Resolver`] binds one formula to the icon catalog and install paths.
//! Every `resolve_*` operation validates the request first and then maps
//! it deterministically to its output; nothing here touches the process
//! environment or the filesystem.

use headtap_schema::{
    ArgumentList, AssetsCar, BuildPlan, BuildStep, HeaderEdit, IconSelection, OptionName,
    OptionSet, PatchRef, PatchSet, PathEdit, ResolvedSource, Variant,
};

use crate::catalog::ResourceCatalog;
use crate::condition::Condition;
use crate::env::EnvironmentContext;
use crate::error::{Conflict, ResolveError};
use crate::formula::{Formula, HarfbuzzPosition};
use crate::options::EffectiveOptions;
use crate::paths::BuildPaths;
use crate::platform::PlatformFacts;
use crate::resources::resolve_resource_url;
use crate::rules::{
    BYTE_COMPILE_FLAG, CRASH_DEBUG_CFLAG, MUTUALLY_EXCLUSIVE, NATIVE_FULL_AOT_FLAG, OPTION_RULES,
    REQUIRES, TRAILING_RULES,
};

/// Where the selected icon is copied inside the build tree.
pub const ICON_INSTALL_PATH: &str = "nextstep/Emacs.app/Contents/Resources/Emacs.icns";

const CONFIG_HEADER: &str = "src/config.h";

/// `config.h` symbols that break the build on macOS Mojave and older.
const MOJAVE_UNDEFINES: [&str; 4] = [
    "HAVE_ALIGNED_ALLOC",
    "HAVE_DECL_ALIGNED_ALLOC",
    "HAVE_ALLOCA",
    "HAVE_ALLOCA_H",
];

/// Which source the user asked for.
///
/// Neither flag means "the formula's default": the archive when there is
/// one, the head checkout otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceRequest {
    /// `--HEAD`
    pub head: bool,
    /// `--stable`
    pub stable: bool,
}

impl SourceRequest {
    /// Request the head checkout.
    pub fn head() -> Self {
        Self {
            head: true,
            stable: false,
        }
    }

    /// Request the release archive.
    pub fn stable() -> Self {
        Self {
            head: false,
            stable: true,
        }
    }
}

/// Resolves build plans for one formula.
#[derive(Debug)]
pub struct Resolver<'a> {
    formula: &'a Formula,
    catalog: &'a ResourceCatalog,
    paths: BuildPaths,
}

impl<'a> Resolver<'a> {
    /// Bind a formula to a catalog and install paths.
    pub fn new(formula: &'a Formula, catalog: &'a ResourceCatalog, paths: BuildPaths) -> Self {
        Self {
            formula,
            catalog,
            paths,
        }
    }

    /// Bind a formula with its keg under `prefix`.
    pub fn with_prefix(
        formula: &'a Formula,
        catalog: &'a ResourceCatalog,
        prefix: impl Into<std::path::PathBuf>,
    ) -> Self {
        let paths = BuildPaths::for_formula(prefix, formula.name(), formula.version());
        Self::new(formula, catalog, paths)
    }

    /// The bound formula.
    pub fn formula(&self) -> &Formula {
        self.formula
    }

    /// The install paths used in arguments.
    pub fn paths(&self) -> &BuildPaths {
        &self.paths
    }

    /// Pick the source variant for a request.
    ///
    /// # Errors
    ///
    /// `ConfigurationConflict` when both variants are requested and
    /// `UnsupportedOnVariant` when the formula lacks the requested one.
    pub fn variant(&self, request: SourceRequest) -> Result<Variant, ResolveError> {
        let sources = &self.formula.source;
        if request.stable && request.head {
            return Err(Conflict::ArchiveAndHead.into());
        }
        if request.head {
            return match sources.head {
                Some(_) => Ok(Variant::Head),
                None => Err(self.unsupported("--HEAD", Variant::Head)),
            };
        }
        if request.stable {
            return match sources.archive {
                Some(_) => Ok(Variant::Stable),
                None => Err(self.unsupported("--stable", Variant::Stable)),
            };
        }
        Ok(if sources.archive.is_some() {
            Variant::Stable
        } else {
            Variant::Head
        })
    }

    /// Check a request and apply defaults.
    ///
    /// Checks run in a fixed order and the first violation wins:
    /// mutual exclusion, offered options, dependent-option gating, variant
    /// restrictions, icon selection.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(
        &self,
        options: &OptionSet,
        variant: Variant,
    ) -> Result<EffectiveOptions, ResolveError> {
        let state = EffectiveOptions::new(options, &self.formula.options.recommended);

        for &(a, b) in MUTUALLY_EXCLUSIVE {
            if state.enabled(a) && state.enabled(b) {
                return Err(Conflict::MutuallyExclusive(a, b).into());
            }
        }

        if let Some((option, _)) = options.choices().find(|(o, _)| !self.formula.offers(*o)) {
            return Err(ResolveError::OptionNotOffered {
                formula: self.formula.name().to_string(),
                option,
            });
        }

        for &(option, requires) in REQUIRES {
            if state.enabled(option) && !state.enabled(requires) {
                return Err(Conflict::Requires { option, requires }.into());
            }
        }

        let restricted = match variant {
            Variant::Stable => &self.formula.options.head_only,
            Variant::Head => &self.formula.options.stable_only,
        };
        if let Some(option) = restricted.iter().find(|o| state.enabled(**o)) {
            return Err(self.unsupported(&format!("--with-{option}"), variant));
        }

        let icons = options.icons();
        if icons.len() > 1 {
            let names = icons.iter().map(ToString::to_string).collect();
            return Err(Conflict::MultipleIcons(names).into());
        }
        if let Some(icon) = icons.iter().find(|i| !self.formula.ships_icon(i, self.catalog)) {
            return Err(ResolveError::UnknownIcon {
                formula: self.formula.name().to_string(),
                icon: icon.to_string(),
            });
        }

        tracing::debug!(
            "Validated {} request for {}: {:?}",
            variant,
            self.formula.name(),
            state.iter().map(OptionName::as_str).collect::<Vec<_>>()
        );
        Ok(state)
    }

    /// Resolve where the sources come from.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::variant`] or [`Resolver::validate`].
    pub fn resolve_source(
        &self,
        options: &OptionSet,
        request: SourceRequest,
    ) -> Result<ResolvedSource, ResolveError> {
        let variant = self.variant(request)?;
        let state = self.validate(options, variant)?;
        self.source_for(&state, variant)
    }

    /// Resolve the configure arguments.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::validate`].
    pub fn resolve_arguments(
        &self,
        options: &OptionSet,
        variant: Variant,
    ) -> Result<ArgumentList, ResolveError> {
        let state = self.validate(options, variant)?;
        Ok(self.arguments_for(&state, variant))
    }

    /// Resolve the patches to apply, in declared order.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::validate`].
    pub fn resolve_patches(
        &self,
        options: &OptionSet,
        variant: Variant,
        env: &EnvironmentContext,
    ) -> Result<PatchSet, ResolveError> {
        let state = self.validate(options, variant)?;
        Ok(self.patches_for(&state, variant, env))
    }

    /// Resolve the requested icon, if any.
    ///
    /// The selection carries an `Assets.car` sidecar on macOS 26 and newer.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::validate`], notably
    /// `ConfigurationConflict` for more than one icon.
    pub fn resolve_icon_selection(
        &self,
        options: &OptionSet,
        variant: Variant,
        platform: &PlatformFacts,
        env: &EnvironmentContext,
    ) -> Result<Option<IconSelection>, ResolveError> {
        self.validate(options, variant)?;
        Ok(self.icon_for(options, platform, env))
    }

    /// Every patch the formula declares, applied or not.
    pub fn prefetch(&self, env: &EnvironmentContext) -> Vec<PatchRef> {
        self.formula
            .patches
            .iter()
            .map(|p| PatchRef {
                name: p.name.clone(),
                url: resolve_resource_url(&p.path, env),
                sha256: p.sha256.clone(),
            })
            .collect()
    }

    /// Resolve everything the external build needs.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::variant`] or [`Resolver::validate`].
    pub fn plan(
        &self,
        options: &OptionSet,
        request: SourceRequest,
        platform: &PlatformFacts,
        env: &EnvironmentContext,
    ) -> Result<BuildPlan, ResolveError> {
        let variant = self.variant(request)?;
        let state = self.validate(options, variant)?;

        let mut warnings = self.notices_for(&state, variant);
        let icon = match self.icon_for(options, platform, env) {
            Some(selected) if !state.enabled(OptionName::Cocoa) => {
                let msg = format!(
                    "--with-{} has no effect without --with-cocoa; no icon will be installed",
                    selected.id
                );
                tracing::warn!("{msg}");
                warnings.push(msg);
                None
            }
            other => other,
        };

        let plan = BuildPlan {
            formula: self.formula.name().to_string(),
            version: self.formula.version().to_string(),
            revision: self.formula.formula.revision,
            variant,
            source: self.source_for(&state, variant)?,
            arguments: self.arguments_for(&state, variant),
            make_flags: make_flags_for(&state),
            cflags: self.cflags_for(&state, variant),
            path_edits: self.path_edits_for(&state, variant),
            patches: self.patches_for(&state, variant, env),
            prefetch: self.prefetch(env),
            icon,
            header_edits: header_edits_for(platform),
            steps: self.steps_for(&state, variant),
            warnings,
        };
        tracing::info!(
            "Resolved {} ({}): {} arguments, {} patches",
            plan.formula,
            plan.variant,
            plan.arguments.len(),
            plan.patches.len()
        );
        Ok(plan)
    }

    fn unsupported(&self, feature: &str, variant: Variant) -> ResolveError {
        ResolveError::UnsupportedOnVariant {
            formula: self.formula.name().to_string(),
            feature: feature.to_string(),
            variant,
        }
    }

    fn source_for(
        &self,
        state: &EffectiveOptions,
        variant: Variant,
    ) -> Result<ResolvedSource, ResolveError> {
        let sources = &self.formula.source;
        match variant {
            Variant::Stable => {
                let archive = sources
                    .archive
                    .as_ref()
                    .ok_or_else(|| self.unsupported("--stable", variant))?;
                Ok(ResolvedSource::Archive {
                    url: archive.url.clone(),
                    mirror: archive.mirror.clone(),
                    sha256: archive.sha256.clone(),
                })
            }
            Variant::Head => {
                let head = sources
                    .head
                    .as_ref()
                    .ok_or_else(|| self.unsupported("--HEAD", variant))?;
                let branch = head
                    .overrides
                    .iter()
                    .find(|o| o.when.holds(state, variant))
                    .map(|o| o.branch.clone())
                    .or_else(|| head.branch.clone())
                    .or_else(|| head.track_release.then(|| self.formula.release_branch()));
                tracing::debug!("Head source branch: {}", branch.as_deref().unwrap_or("default"));
                Ok(ResolvedSource::Vcs {
                    url: head.url.clone(),
                    branch,
                })
            }
        }
    }

    fn arguments_for(&self, state: &EffectiveOptions, variant: Variant) -> ArgumentList {
        let mut args = ArgumentList::new();
        args.push(format!(
            "--enable-locallisppath={}",
            self.paths.site_lisp().display()
        ));
        args.push(format!("--infodir={}", self.paths.info_dir().display()));
        args.push(format!("--prefix={}", self.paths.keg().display()));
        args.push("--without-x");

        for rule in OPTION_RULES.iter().filter(|r| self.formula.offers(r.option)) {
            args.extend(rule.tokens(state.enabled(rule.option)).iter().copied());
        }

        args.extend(self.formula.build.extra_args.iter().cloned());

        let mut deferred: &[&str] = &[];
        for rule in TRAILING_RULES {
            if rule.option == OptionName::Harfbuzz {
                let enabled = state.enabled(OptionName::Harfbuzz)
                    || holds(self.formula.build.harfbuzz.as_ref(), state, variant);
                if self.formula.build.harfbuzz_position == HarfbuzzPosition::AfterCocoa {
                    deferred = rule.tokens(enabled);
                    continue;
                }
                args.extend(rule.tokens(enabled).iter().copied());
            } else {
                args.extend(rule.tokens(state.enabled(rule.option)).iter().copied());
            }
        }
        args.extend(deferred.iter().copied());
        args
    }

    fn patches_for(
        &self,
        state: &EffectiveOptions,
        variant: Variant,
        env: &EnvironmentContext,
    ) -> PatchSet {
        self.formula
            .patches
            .iter()
            .filter(|p| p.when.holds(state, variant))
            .map(|p| PatchRef {
                name: p.name.clone(),
                url: resolve_resource_url(&p.path, env),
                sha256: p.sha256.clone(),
            })
            .collect()
    }

    fn icon_for(
        &self,
        options: &OptionSet,
        platform: &PlatformFacts,
        env: &EnvironmentContext,
    ) -> Option<IconSelection> {
        let id = options.icons().iter().next()?;
        let entry = self.formula.icon_entry(id, self.catalog)?;
        let tahoe = platform.macos.is_some_and(|v| v.is_tahoe_or_newer());
        let assets_car = (tahoe && entry.set.has_assets_car()).then(|| AssetsCar {
            path: entry.assets_car_path(),
            bundle_icon_name: entry.id.to_string(),
        });
        Some(IconSelection {
            id: entry.id.clone(),
            url: resolve_resource_url(&entry.path, env),
            sha256: self.formula.icon_digest(entry).clone(),
            install_path: ICON_INSTALL_PATH.to_string(),
            assets_car,
        })
    }

    fn cflags_for(&self, state: &EffectiveOptions, variant: Variant) -> Vec<String> {
        let mut cflags = Vec::new();
        if state.enabled(OptionName::CrashDebug) {
            cflags.push(CRASH_DEBUG_CFLAG.to_string());
        }
        let flags = match &self.formula.build.cflags_reset {
            Some(reset) if reset.when.holds(state, variant) => &reset.flags,
            _ => &self.formula.build.cflags,
        };
        cflags.extend(flags.iter().cloned());
        cflags
    }

    fn path_edits_for(&self, state: &EffectiveOptions, variant: Variant) -> Vec<PathEdit> {
        let mut edits = Vec::new();
        if state.enabled(OptionName::Imagemagick) {
            let lib = match state.imagemagick_pin() {
                Some(pin) => pin.as_str(),
                None => self.formula.imagemagick_library(variant),
            };
            edits.push(PathEdit {
                variable: "PKG_CONFIG_PATH".to_string(),
                prepend: self.paths.opt(lib).join("lib/pkgconfig").display().to_string(),
            });
        }
        if holds(self.formula.build.autogen.as_ref(), state, variant) {
            for tool in &self.formula.build.gnu_tools {
                edits.push(PathEdit {
                    variable: "PATH".to_string(),
                    prepend: self.paths.opt(tool).join("libexec/gnubin").display().to_string(),
                });
            }
        }
        edits
    }

    fn steps_for(&self, state: &EffectiveOptions, variant: Variant) -> Vec<BuildStep> {
        let cocoa = state.enabled(OptionName::Cocoa);
        let mut steps = Vec::new();
        if holds(self.formula.build.autogen.as_ref(), state, variant) {
            steps.push(BuildStep::Autogen);
        }
        if cocoa && state.enabled(OptionName::CrashDebug) {
            steps.push(BuildStep::Dsymutil);
        }
        if cocoa && state.enabled(OptionName::NativeComp) {
            steps.push(BuildStep::InstallNativeLisp);
        }
        if !state.enabled(OptionName::Ctags) {
            steps.push(BuildStep::RemoveCtags);
        }
        if self.formula.build.install_info {
            steps.push(BuildStep::InstallInfo);
        }
        steps
    }

    fn notices_for(&self, state: &EffectiveOptions, variant: Variant) -> Vec<String> {
        self.formula
            .notices
            .iter()
            .filter(|n| n.when.holds(state, variant))
            .map(|n| n.message.clone())
            .collect()
    }
}

fn holds(condition: Option<&Condition>, state: &EffectiveOptions, variant: Variant) -> bool {
    condition.is_some_and(|c| c.holds(state, variant))
}

fn make_flags_for(state: &EffectiveOptions) -> Vec<String> {
    let mut flags = Vec::new();
    if state.enabled(OptionName::NativeComp) {
        if state.enabled(OptionName::NativeFullAot) {
            flags.push(NATIVE_FULL_AOT_FLAG.to_string());
        }
        flags.push(BYTE_COMPILE_FLAG.to_string());
    }
    flags
}

fn header_edits_for(platform: &PlatformFacts) -> Vec<HeaderEdit> {
    if !platform.macos.is_some_and(|v| v.is_mojave_or_older()) {
        return Vec::new();
    }
    MOJAVE_UNDEFINES
        .iter()
        .map(|symbol| HeaderEdit {
            file: CONFIG_HEADER.to_string(),
            find: format!("#define {symbol} 1"),
            replace: format!("#undef {symbol}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use headtap_schema::MacosVersion;
    use pretty_assertions::assert_eq;

    fn fixture(name: &str) -> (Formula, ResourceCatalog) {
        (
            Formula::builtin(name).unwrap(),
            ResourceCatalog::builtin().unwrap(),
        )
    }

    #[test]
    fn test_header_edits_only_on_mojave_or_older() {
        let mojave = header_edits_for(&PlatformFacts::macos(MacosVersion::new(10, 14, 6)));
        assert_eq!(mojave.len(), 4);
        assert_eq!(mojave[0].find, "#define HAVE_ALIGNED_ALLOC 1");
        assert_eq!(mojave[0].replace, "#undef HAVE_ALIGNED_ALLOC");
        assert!(mojave.iter().all(|e| e.file == "src/config.h"));

        assert!(header_edits_for(&PlatformFacts::macos(MacosVersion::new(10, 15, 0))).is_empty());
        assert!(header_edits_for(&PlatformFacts::unknown()).is_empty());
    }

    #[test]
    fn test_make_flags() {
        let none = EffectiveOptions::new(&OptionSet::new(), &[]);
        assert!(make_flags_for(&none).is_empty());

        let aot = OptionSet::new()
            .with(OptionName::NativeComp)
            .with(OptionName::NativeFullAot);
        assert_eq!(
            make_flags_for(&EffectiveOptions::new(&aot, &[])),
            vec![NATIVE_FULL_AOT_FLAG.to_string(), BYTE_COMPILE_FLAG.to_string()]
        );
    }

    #[test]
    fn test_variant_selection() {
        let (f29, catalog) = fixture("emacs-head@29");
        let r = Resolver::with_prefix(&f29, &catalog, "/opt/homebrew");
        assert_eq!(r.variant(SourceRequest::default()).unwrap(), Variant::Stable);
        assert_eq!(r.variant(SourceRequest::head()).unwrap(), Variant::Head);
        assert_eq!(
            r.variant(SourceRequest { head: true, stable: true }),
            Err(ResolveError::ConfigurationConflict(Conflict::ArchiveAndHead))
        );

        let (f31, _) = fixture("emacs-head@31");
        let r = Resolver::with_prefix(&f31, &catalog, "/opt/homebrew");
        assert_eq!(r.variant(SourceRequest::default()).unwrap(), Variant::Head);
        assert!(matches!(
            r.variant(SourceRequest::stable()),
            Err(ResolveError::UnsupportedOnVariant { .. })
        ));
    }

    #[test]
    fn test_base_arguments_use_paths() {
        let (formula, catalog) = fixture("emacs-head@29");
        let r = Resolver::with_prefix(&formula, &catalog, "/usr/local");
        let args = r.resolve_arguments(&OptionSet::new(), Variant::Stable).unwrap();
        assert_eq!(
            &args.as_slice()[..4],
            [
                "--enable-locallisppath=/usr/local/share/emacs/site-lisp",
                "--infodir=/usr/local/Cellar/emacs-head@29/29.2/share/info/emacs",
                "--prefix=/usr/local/Cellar/emacs-head@29/29.2",
                "--without-x",
            ]
        );
        assert_eq!(args.as_slice().last().unwrap(), "--without-ns");
    }

    #[test]
    fn test_icon_without_cocoa_is_a_warning() {
        let (formula, catalog) = fixture("emacs-head@29");
        let r = Resolver::with_prefix(&formula, &catalog, "/opt/homebrew");
        let options = OptionSet::new().with_icon("modern-icon-pen");
        let plan = r
            .plan(
                &options,
                SourceRequest::default(),
                &PlatformFacts::unknown(),
                &EnvironmentContext::default(),
            )
            .unwrap();
        assert_eq!(plan.icon, None);
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("modern-icon-pen"));
    }
}
