//! Integration tests for the bundlegen binary

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MANIFEST: &str = "bundle_plugin.py";

/// A plugin tree plus private config and log locations
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Option<Self> {
        let dir = TempDir::new().ok()?;
        fs::create_dir_all(dir.path().join("plugins")).ok()?;
        fs::create_dir_all(dir.path().join("logs")).ok()?;
        Some(Workspace { dir })
    }

    fn base(&self) -> &Path {
        self.dir.path()
    }

    fn root(&self) -> PathBuf {
        self.base().join("plugins")
    }

    fn config_path(&self) -> PathBuf {
        self.base().join("bundlegen.toml")
    }

    fn plugin(&self, name: &str) {
        let dir = self.root().join(name);
        let _ = fs::create_dir_all(&dir);
        let _ = fs::write(dir.join(MANIFEST), "");
    }

    /// Configure `/bin/sh <script> {module}` as the describe command
    fn describe_with(&self, script: &str) {
        let script_path = self.base().join("describe.sh");
        let _ = fs::write(&script_path, format!("{}\n", script));
        let config = format!(
            "interpreter = \"/bin/sh\"\nper-manifest-args = [\"{}\", \"{{module}}\"]\n",
            script_path.display()
        );
        let _ = fs::write(self.config_path(), config);
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("bundlegen");
        cmd.env("BUNDLEGEN_CONFIG", self.config_path())
            .env("BUNDLEGEN_LOG_DIR", self.base().join("logs"))
            .env_remove("BUNDLEGEN_LOG")
            .current_dir(self.base());
        cmd
    }
}

const THREE_PLUGINS: &str = r#"case "$1" in
  plugins.core.bundle_plugin)
    echo '{"name": "core_app", "entry_file": "app.js", "module_path": "core", "stats_file": "core-stats.json", "async_file": "core-async.json", "core": true}' ;;
  plugins.learn.bundle_plugin)
    echo '{"name": "learn_app", "entry_file": "app.js", "module_path": "learn", "stats_file": "learn-stats.json", "async_file": "learn-async.json"}' ;;
  plugins.shared.bundle_plugin)
    echo '{"name": "shared_lib", "entry_file": "index.js", "module_path": "shared", "stats_file": "shared-stats.json", "async_file": "shared-async.json", "external": true}' ;;
esac"#;

#[test]
fn test_version() {
    cargo_bin_cmd!("bundlegen")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bundlegen"));
}

#[test]
fn test_help() {
    cargo_bin_cmd!("bundlegen")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin manifests"));
}

#[test]
fn test_invalid_command() {
    cargo_bin_cmd!("bundlegen").arg("invalid").assert().failure();
}

#[test]
fn test_generate_requires_root() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.cmd().arg("generate").assert().failure();
}

#[cfg(unix)]
#[test]
fn test_generate_prints_bundle_configs() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    for name in ["core", "learn", "shared"] {
        ws.plugin(name);
    }
    ws.describe_with(THREE_PLUGINS);

    let assert = ws
        .cmd()
        .arg("generate")
        .arg("--root")
        .arg(ws.root())
        .arg("--base-dir")
        .arg(ws.base())
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap_or_default();
    let Some(bundles) = parsed.as_array() else {
        panic!("expected a JSON array, got: {}", stdout);
    };
    assert_eq!(bundles.len(), 3);

    let core = &bundles[0];
    assert!(core["entry"]["core_app"]
        .as_str()
        .is_some_and(|entry| entry.ends_with("core/app.js")));
    assert_eq!(core["output"]["library"], "coreGlobal");
    assert_eq!(core["output"]["filename"], "[name]-[chunkhash].js");
    assert_eq!(core["output"]["publicPath"], "/static/core_app/");
    assert_eq!(core["trackerConfig"]["statsFile"], "core-stats.json");
    assert_eq!(core["externals"]["shared_lib"], "shared_lib");
    assert!(core["externals"].get("vue").is_none());

    let learn = &bundles[1];
    assert!(learn["output"].get("library").is_none());
    assert_eq!(learn["externals"]["vue"], "coreGlobal.lib.vue");
    assert_eq!(learn["externals"], bundles[2]["externals"]);
    assert_eq!(bundles[2]["output"]["library"], "shared_lib");
}

#[cfg(unix)]
#[test]
fn test_generate_writes_output_file() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.plugin("core");
    ws.describe_with(THREE_PLUGINS);
    let out = ws.base().join("bundles.json");

    ws.cmd()
        .arg("generate")
        .arg("--root")
        .arg(ws.root())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap_or_default();
    assert!(written.contains("\"core_app\""));
}

#[cfg(unix)]
#[test]
fn test_generate_skips_incomplete_descriptor() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.plugin("partial");
    ws.describe_with(
        r#"echo '{"name": "partial", "entry_file": "app.js", "module_path": "partial", "stats_file": "s.json"}'"#,
    );

    ws.cmd()
        .arg("generate")
        .arg("--root")
        .arg(ws.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("missing required field 'async_file'"));
}

#[cfg(unix)]
#[test]
fn test_generate_fails_when_interpreter_fails() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.plugin("broken");
    ws.describe_with("echo 'ImportError: no module named vue' >&2; exit 1");

    ws.cmd()
        .arg("generate")
        .arg("--root")
        .arg(ws.root())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ImportError"));
}

#[cfg(unix)]
#[test]
fn test_generate_reports_duplicate_entries() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.plugin("one");
    ws.plugin("two");
    ws.describe_with(
        r#"echo '{"name": "same", "entry_file": "app.js", "module_path": "x", "stats_file": "s.json", "async_file": "a.json"}'"#,
    );

    ws.cmd()
        .arg("generate")
        .arg("--root")
        .arg(ws.root())
        .assert()
        .success()
        .stderr(predicate::str::contains("Duplicate bundle entry 'same'"));
}

#[test]
fn test_generate_missing_root_fails() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.cmd()
        .args(["generate", "--root", "does-not-exist"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_generate_rejects_zero_jobs() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.cmd()
        .arg("generate")
        .arg("--root")
        .arg(ws.root())
        .args(["--jobs", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--jobs"));
}

#[test]
fn test_scan_lists_manifests() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.plugin("alpha");
    ws.plugin("beta");

    ws.cmd()
        .arg("scan")
        .arg("--root")
        .arg(ws.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("beta"));
}

#[test]
fn test_scan_with_base_dir_prints_modules() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.plugin("alpha");

    ws.cmd()
        .arg("scan")
        .arg("--root")
        .arg(ws.root())
        .arg("--base-dir")
        .arg(ws.base())
        .assert()
        .success()
        .stdout(predicate::str::contains("plugins.alpha.bundle_plugin"));
}

#[test]
fn test_scan_resolves_parent_components_in_base_dir() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.plugin("alpha");

    ws.cmd()
        .arg("scan")
        .args(["--root", "plugins/../plugins"])
        .args(["--base-dir", "plugins/.."])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tplugins.alpha.bundle_plugin"));
}

#[test]
fn test_config_show() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"));
}

#[test]
fn test_config_set_and_show() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.cmd()
        .args(["config", "set", "core-library", "appGlobal"])
        .assert()
        .success();

    ws.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("appGlobal"));
}

#[test]
fn test_config_set_unknown_key() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.cmd()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_config_path_uses_env_override() {
    let Some(ws) = Workspace::new() else {
        return;
    };
    ws.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bundlegen.toml"));
}
