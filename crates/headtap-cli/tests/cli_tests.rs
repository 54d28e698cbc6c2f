use pretty_assertions::assert_eq;
use std::process::{Command, Output};
use tempfile::TempDir;

const CI_VARS: &[&str] = &[
    "EMACS_HEAD_GITHUB_REPOSITORY",
    "EMACS_HEAD_GITHUB_REPOSITORY_OWNER",
    "EMACS_HEAD_GITHUB_REPOSITORY_REF",
    "HOMEBREW_USE_LOCAL_RESOURCES",
];

/// Runs the binary in a scratch directory with a clean environment.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        Self { temp_dir }
    }

    fn headtap_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_headtap");
        let mut cmd = Command::new(bin_path);
        cmd.current_dir(self.temp_dir.path());
        for var in CI_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOMEBREW_PREFIX", "/opt/homebrew");
        cmd.env("HEADTAP_MACOS_VERSION", "14.5");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.headtap_cmd()
            .args(args)
            .output()
            .expect("failed to run headtap")
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "headtap failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }
}

fn strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|v| v.as_str().expect("expected a string").to_string())
        .collect()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("resolve"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--version"]);
    assert!(output.status.success());
}

#[test]
fn test_resolve_defaults_json() {
    let ctx = TestContext::new();
    let plan = ctx.run_json(&["resolve", "emacs-head@29", "--json"]);

    assert_eq!(plan["variant"], "stable");
    assert_eq!(plan["source"]["kind"], "archive");
    assert_eq!(
        plan["source"]["sha256"],
        "7d3d2448988720bf4bf57ad77a5a08bf22df26160f90507a841ba986be2670dc"
    );

    let args = strings(&plan["arguments"]);
    assert!(args.contains(&"--with-gnutls".to_string()));
    assert!(args.contains(&"--with-rsvg".to_string()));
    assert!(!args.contains(&"--with-dbus".to_string()));
    assert!(args.contains(&"--without-ns".to_string()));
}

#[test]
fn test_resolve_head_with_options() {
    let ctx = TestContext::new();
    let plan = ctx.run_json(&[
        "resolve",
        "emacs-head@29",
        "--head",
        "--with",
        "cocoa,native-comp",
        "--without",
        "dbus",
        "--json",
    ]);

    assert_eq!(plan["variant"], "head");
    assert_eq!(plan["source"]["kind"], "vcs");
    assert_eq!(plan["source"]["branch"], "emacs-29");

    let args = strings(&plan["arguments"]);
    assert!(args.contains(&"--with-native-compilation".to_string()));
    assert!(args.contains(&"--with-ns".to_string()));
    assert!(args.contains(&"--without-dbus".to_string()));
}

#[test]
fn test_resolve_icon_uses_upstream_url() {
    let ctx = TestContext::new();
    let plan = ctx.run_json(&[
        "resolve",
        "emacs-head@29",
        "--with",
        "cocoa,modern-icon-sjrmanning",
        "--json",
    ]);

    assert_eq!(plan["icon"]["id"], "modern-icon-sjrmanning");
    assert_eq!(
        plan["icon"]["url"],
        "https://raw.githubusercontent.com/daviderestivo/homebrew-emacs-head/master/icons/macos-legacy/modern-icon-sjrmanning.icns"
    );
    assert!(plan["icon"].get("assets_car").is_none());
}

#[test]
fn test_resolve_conflict_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "resolve",
        "emacs-head@29",
        "--with",
        "imagemagick@6,imagemagick@7",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mutually exclusive"), "stderr: {stderr}");
}

#[test]
fn test_resolve_unknown_option_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", "emacs-head@29", "--with", "frobnicate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("frobnicate"), "stderr: {stderr}");
}

#[test]
fn test_resolve_unknown_formula_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", "emacs-head@99"]);
    assert!(!output.status.success());
}

#[test]
fn test_resolve_human_output() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", "emacs-head@29", "--with", "cocoa"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("emacs-head@29"));
    assert!(stdout.contains("--with-ns"));
    assert!(stdout.contains("0005-System-appearance"));
}

#[test]
fn test_resolve_formula_file() {
    let ctx = TestContext::new();
    let path = ctx.temp_dir.path().join("emacs-tiny.toml");
    std::fs::write(
        &path,
        r#"
[formula]
name = "emacs-tiny"
version = "30.1"

[source.head]
url = "https://github.com/emacs-mirror/emacs.git"
branch = "emacs-30"

[options]
offered = ["cocoa", "dbus"]
"#,
    )
    .expect("failed to write formula");

    let plan = ctx.run_json(&[
        "resolve",
        "--formula-file",
        path.to_str().expect("utf-8 path"),
        "--with",
        "dbus",
        "--json",
    ]);
    assert_eq!(plan["formula"], "emacs-tiny");
    assert_eq!(plan["source"]["branch"], "emacs-30");
    assert!(strings(&plan["arguments"]).contains(&"--with-dbus".to_string()));
}

#[test]
fn test_local_resources_point_at_cwd() {
    let ctx = TestContext::new();
    let output = ctx
        .headtap_cmd()
        .env("HOMEBREW_USE_LOCAL_RESOURCES", "1")
        .args(["url", "patches/0011-Poll.patch"])
        .output()
        .expect("failed to run headtap");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().starts_with("file://"));
    assert!(stdout.trim().ends_with("/patches/0011-Poll.patch"));
}

#[test]
fn test_url_prefers_ci_repository() {
    let ctx = TestContext::new();
    let output = ctx
        .headtap_cmd()
        .env("EMACS_HEAD_GITHUB_REPOSITORY", "someone/homebrew-emacs-head")
        .env("EMACS_HEAD_GITHUB_REPOSITORY_REF", "refs/heads/feature-x")
        .env("HOMEBREW_USE_LOCAL_RESOURCES", "1")
        .args(["url", "patches/0011-Poll.patch"])
        .output()
        .expect("failed to run headtap");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "https://raw.githubusercontent.com/someone/homebrew-emacs-head/feature-x/patches/0011-Poll.patch"
    );
}

#[test]
fn test_formulae_lists_builtins() {
    let ctx = TestContext::new();
    let list = ctx.run_json(&["formulae", "--json"]);
    let names: Vec<&str> = list
        .as_array()
        .expect("expected an array")
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "emacs-head",
            "emacs-head@26",
            "emacs-head@27",
            "emacs-head@28",
            "emacs-head@29",
            "emacs-head@31",
        ]
    );
}

#[test]
fn test_options_marks_defaults() {
    let ctx = TestContext::new();
    let options = ctx.run_json(&["options", "emacs-head@29", "--json"]);
    let find = |name: &str| {
        options
            .as_array()
            .expect("expected an array")
            .iter()
            .find(|o| o["name"] == name)
            .cloned()
            .unwrap_or_else(|| panic!("option {name} missing"))
    };
    assert_eq!(find("gnutls")["default"], true);
    assert_eq!(find("dbus")["default"], false);
}

#[test]
fn test_icons_filtered_by_formula() {
    let ctx = TestContext::new();
    let all = ctx.run_json(&["icons", "--json"]);
    let legacy = ctx.run_json(&["icons", "emacs-head", "--json"]);
    let all = all.as_array().expect("expected an array");
    let legacy = legacy.as_array().expect("expected an array");
    assert_eq!(all.len(), 100);
    assert_eq!(legacy.len(), 11);
    assert!(legacy.iter().all(|icon| icon["set"] == "flat"));

    let papirus = legacy
        .iter()
        .find(|icon| icon["id"] == "modern-icon-papirus")
        .expect("papirus listed");
    assert_eq!(papirus["path"], "icons/modern-icon-papirus.icns");
    assert_eq!(
        papirus["sha256"],
        "50aef07397ab17073deb107e32a8c7b86a0e9dddf5a0f78c4fcff796099623f8"
    );
}

#[test]
fn test_icons_list_aliases() {
    let ctx = TestContext::new();
    let icons = ctx.run_json(&["icons", "emacs-head@28", "--json"]);
    let doom = icons
        .as_array()
        .expect("expected an array")
        .iter()
        .find(|icon| icon["id"] == "modern-icon-doom")
        .expect("doom listed");
    assert_eq!(doom["aliases"], serde_json::json!(["emacs-icon-doom"]));
    assert_eq!(doom["path"], "icons/modern-icon-doom.icns");
}
