//! Fixtures for extraction tests. Scripts are run through `/bin/sh` rather
//! than executed directly, so freshly written files are never exec'd.

use crate::extractor::InterpreterExtractor;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MANIFEST: &str = "bundle_plugin.py";

pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Option<Self> {
        let dir = TempDir::new().ok()?;
        fs::create_dir_all(dir.path().join("plugins")).ok()?;
        Some(Fixture { dir })
    }

    /// Base directory of the run
    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    /// Root directory holding the plugins
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("plugins")
    }

    /// Create `plugins/<name>/bundle_plugin.py` and return its path
    pub fn manifest(&self, name: &str) -> PathBuf {
        let dir = self.root().join(name);
        let _ = fs::create_dir_all(&dir);
        let path = dir.join(MANIFEST);
        let _ = fs::write(&path, "");
        path
    }
}

/// Write a shell script into `dir` and return its path
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let _ = fs::write(&path, format!("{}\n", body));
    path
}

/// Extractor running `script` with `/bin/sh`. The script receives the module
/// identifier (per-manifest) or the roots (batch) as arguments.
pub fn sh_extractor(script: &Path, base: &Path) -> InterpreterExtractor {
    let script = script.display().to_string();
    InterpreterExtractor::new("/bin/sh", base)
        .with_per_manifest_args(vec![script.clone(), "{module}".to_string()])
        .with_batch_args(vec![script, "{roots}".to_string()])
}
