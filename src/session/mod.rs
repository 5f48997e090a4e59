//! Session directory layout and persistence.
//!
//! A session directory holds everything that survives between invocations:
//!
//! ```text
//! <session>/
//! ├── config.json     optional launch settings
//! ├── wizard.json     current wizard state
//! └── launches.jsonl  one record per launch attempt
//! ```
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod history;
mod store;

pub use config::{
    default_config, load_config_optional, resolve_webhook_url, validate_config, write_config,
    LaunchConfig, WEBHOOK_URL_ENV,
};
pub use history::{append_launch, load_launches, LaunchOutcome, LaunchRecord};
pub use store::{load_wizard_state, write_wizard_state};

/// Typed paths into a session directory.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    root: PathBuf,
}

impl SessionPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Return the `config.json` path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Return the `wizard.json` path.
    pub fn wizard_path(&self) -> PathBuf {
        self.root.join("wizard.json")
    }

    /// Return the `launches.jsonl` path.
    pub fn launches_path(&self) -> PathBuf {
        self.root.join("launches.jsonl")
    }
}

pub fn ensure_session_root(path: &Path) -> Result<SessionPaths> {
    fs::create_dir_all(path)
        .with_context(|| format!("create session dir {}", path.display()))?;
    let root = path
        .canonicalize()
        .with_context(|| format!("resolve session dir {}", path.display()))?;
    Ok(SessionPaths::new(root))
}

/// Write bytes next to `dest` and rename into place.
fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("session");
    let tmp_path = dest
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".{file_name}.tmp"));
    fs::write(&tmp_path, bytes).with_context(|| format!("write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, dest).with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}
