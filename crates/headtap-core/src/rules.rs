//! Declarative option rules.
//!
//! Constraints between options and the option-to-configure-argument
//! mapping are plain tables evaluated uniformly by the resolver.

use headtap_schema::OptionName::{
    self, Cocoa, CrashDebug, Dbus, Gnutls, Harfbuzz, Imagemagick, Imagemagick6, Imagemagick7,
    Jansson, Librsvg, Libxml2, Mailutils, Modules, NativeComp, NativeFullAot, Poll, TreeSitter,
    Xwidgets,
};

/// Pairs of options that may not both be enabled.
pub const MUTUALLY_EXCLUSIVE: &[(OptionName, OptionName)] = &[(Imagemagick6, Imagemagick7)];

/// `(option, gate)`: enabling `option` requires `gate`.
pub const REQUIRES: &[(OptionName, OptionName)] = &[
    (Xwidgets, Cocoa),
    (Harfbuzz, Cocoa),
    (NativeFullAot, NativeComp),
];

/// Configure tokens emitted for one option.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentRule {
    /// Option the rule reads.
    pub option: OptionName,
    /// Tokens when the option is enabled.
    pub on: &'static [&'static str],
    /// Tokens when the option is disabled.
    pub off: &'static [&'static str],
}

const fn rule(
    option: OptionName,
    on: &'static [&'static str],
    off: &'static [&'static str],
) -> ArgumentRule {
    ArgumentRule { option, on, off }
}

impl ArgumentRule {
    /// Tokens for the given state.
    pub fn tokens(&self, enabled: bool) -> &'static [&'static str] {
        if enabled { self.on } else { self.off }
    }
}

/// Option rules applied right after the base arguments.
pub const OPTION_RULES: &[ArgumentRule] = &[
    rule(Dbus, &["--with-dbus"], &["--without-dbus"]),
    rule(NativeComp, &["--with-native-compilation"], &[]),
    rule(Imagemagick, &["--with-imagemagick"], &["--without-imagemagick"]),
    rule(Jansson, &["--with-json"], &[]),
    rule(Modules, &["--with-modules"], &[]),
    rule(Mailutils, &["--without-pop"], &[]),
    rule(Gnutls, &["--with-gnutls"], &[]),
    rule(Librsvg, &["--with-rsvg"], &[]),
    rule(Libxml2, &["--with-xml2"], &[]),
    rule(Xwidgets, &["--with-xwidgets"], &[]),
    rule(Poll, &["--with-poll"], &[]),
    rule(TreeSitter, &["--with-tree-sitter"], &[]),
];

/// Option rules applied after the formula's extra arguments.
///
/// `harfbuzz` is listed here but may also be implied by the formula, so
/// the resolver evaluates its state itself.
pub const TRAILING_RULES: &[ArgumentRule] = &[
    rule(CrashDebug, &["--disable-silent-rules"], &[]),
    rule(Harfbuzz, &["--with-harfbuzz"], &[]),
    rule(
        Cocoa,
        &["--with-ns", "--disable-ns-self-contained"],
        &["--without-ns"],
    ),
];

/// `make` argument for ahead-of-time native compilation.
pub const NATIVE_FULL_AOT_FLAG: &str = "NATIVE_FULL_AOT=1";

/// `make` argument that pins the native compiler's speed.
pub const BYTE_COMPILE_FLAG: &str = "BYTE_COMPILE_EXTRA_FLAGS=--eval '(setq comp-speed 2)'";

/// CFLAGS added by `crash-debug`.
pub const CRASH_DEBUG_CFLAG: &str = "-g3";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rules_cover_each_option_once() {
        let mut seen = HashSet::new();
        for rule in OPTION_RULES.iter().chain(TRAILING_RULES) {
            assert!(seen.insert(rule.option), "{} listed twice", rule.option);
        }
    }

    #[test]
    fn test_no_token_is_emitted_by_two_rules() {
        let mut seen = HashSet::new();
        for rule in OPTION_RULES.iter().chain(TRAILING_RULES) {
            for token in rule.on.iter().chain(rule.off) {
                assert!(seen.insert(*token), "{token} emitted twice");
            }
        }
    }

    #[test]
    fn test_tokens() {
        let dbus = OPTION_RULES[0];
        assert_eq!(dbus.tokens(true), ["--with-dbus"]);
        assert_eq!(dbus.tokens(false), ["--without-dbus"]);
    }

    #[test]
    fn test_gates_are_not_themselves_gated() {
        for (_, gate) in REQUIRES {
            assert!(REQUIRES.iter().all(|(opt, _)| opt != gate));
        }
    }
}
