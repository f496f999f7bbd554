// File: ./src/context.rs
/*! Application context abstraction for filesystem locations.

An `AppContext` answers one question: where does a given [`Directory`] live
on this machine? Two implementations are provided:

- `StandardContext`: resolves through `directories::ProjectDirs`, or under an
  explicit override root (CLI `--root`, sandboxed hosts).
- `TestContext`: a unique temporary root that is removed on drop.

There is no global or lazily-initialised context. Code that touches the
filesystem takes a `&dyn AppContext` (or a `SharedContext`) explicitly.
*/

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use strum::EnumIter;

/// Environment variable that points `Directory::Bundle` at a resource folder.
pub const BUNDLE_DIR_ENV: &str = "HANDYKIT_BUNDLE_DIR";

/// The fixed application directories a [`crate::storage::FileStore`] can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Directory {
    /// Private, persistent application data.
    Library,
    /// User-visible documents owned by the application.
    Documents,
    /// Data that may be discarded by the OS at any time.
    Cache,
    /// Read-only resources shipped alongside the application.
    Bundle,
}

impl Directory {
    fn dir_name(self) -> &'static str {
        match self {
            Directory::Library => "library",
            Directory::Documents => "documents",
            Directory::Cache => "cache",
            Directory::Bundle => "bundle",
        }
    }

    /// Whether the directory is created on demand when first resolved.
    pub fn is_writable(self) -> bool {
        !matches!(self, Directory::Bundle)
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl std::str::FromStr for Directory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "library" => Ok(Directory::Library),
            "documents" => Ok(Directory::Documents),
            "cache" => Ok(Directory::Cache),
            "bundle" => Ok(Directory::Bundle),
            other => Err(anyhow::anyhow!("Unknown directory '{}'", other)),
        }
    }
}

/// Defines the file system context for the application.
///
/// The trait is object-safe so callers can hold `Arc<dyn AppContext>`.
pub trait AppContext: Send + Sync + std::fmt::Debug {
    /// Absolute path of `dir`. Writable directories exist when this returns.
    fn directory_path(&self, dir: Directory) -> Result<PathBuf>;

    fn config_dir(&self) -> Result<PathBuf>;

    fn config_file_path(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    fn log_file_path(&self) -> Result<PathBuf> {
        Ok(self.directory_path(Directory::Cache)?.join("handykit.log"))
    }
}

fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {:?}", path))?;
    }
    Ok(path)
}

// --- Production Implementation ---

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
    bundle_dir: Option<PathBuf>,
    app: (String, String, String),
}

impl StandardContext {
    /// Create a new StandardContext.
    ///
    /// When `override_root` is `Some(path)`, every directory lives under that
    /// root as `library`, `documents`, `cache`, `bundle` and `config`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self {
            override_root,
            bundle_dir: None,
            app: ("com".into(), "handykit".into(), "handykit".into()),
        }
    }

    /// Use a different `ProjectDirs` triple (qualifier, organization, application).
    pub fn with_app(mut self, qualifier: &str, organization: &str, application: &str) -> Self {
        self.app = (
            qualifier.to_string(),
            organization.to_string(),
            application.to_string(),
        );
        self
    }

    /// Pin the bundle directory instead of discovering it.
    pub fn with_bundle_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.bundle_dir = dir;
        self
    }

    fn get_proj_dirs(&self) -> Option<ProjectDirs> {
        let (q, o, a) = &self.app;
        ProjectDirs::from(q, o, a)
    }

    fn resolve_bundle(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.bundle_dir {
            return Ok(dir.clone());
        }
        if let Some(root) = &self.override_root {
            return Ok(root.join(Directory::Bundle.dir_name()));
        }
        if let Ok(dir) = std::env::var(BUNDLE_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        let exe = std::env::current_exe().context("Could not locate the running executable")?;
        exe.parent()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Executable has no parent directory"))
    }
}

impl Default for StandardContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppContext for StandardContext {
    fn directory_path(&self, dir: Directory) -> Result<PathBuf> {
        if dir == Directory::Bundle {
            return self.resolve_bundle();
        }
        if let Some(root) = &self.override_root {
            return ensure_exists(root.join(dir.dir_name()));
        }
        let proj = self
            .get_proj_dirs()
            .ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        let path = match dir {
            Directory::Cache => proj.cache_dir().to_path_buf(),
            Directory::Documents => proj.data_dir().join("Documents"),
            _ => proj.data_dir().to_path_buf(),
        };
        ensure_exists(path)
    }

    fn config_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return ensure_exists(root.join("config"));
        }
        let proj = self
            .get_proj_dirs()
            .ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        ensure_exists(proj.config_dir().to_path_buf())
    }
}

// --- Test Implementation ---

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a new TestContext backed by a unique temporary directory.
    ///
    /// The directory is created immediately and removed when the `TestContext`
    /// is dropped.
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let root = std::env::temp_dir().join(format!("handykit_test_{}", uuid));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn directory_path(&self, dir: Directory) -> Result<PathBuf> {
        let p = self.root.join(dir.dir_name());
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }

    fn config_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("config");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Best-effort cleanup; ignore errors.
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

// Convenience alias for users who want to store the context in an Arc.
pub type SharedContext = std::sync::Arc<dyn AppContext>;
