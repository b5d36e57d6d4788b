//! Workspace discovery and layout.
//!
//! A workspace is a `.countersign/data/` directory holding the durable
//! store. Commands locate it by walking up from the current directory;
//! `countersign init` creates it.

use crate::core::db;
use crate::core::error::CountersignError;
use std::fs;
use std::path::{Path, PathBuf};

pub const WORKSPACE_DIR: &str = ".countersign";
pub const DATA_DIR: &str = "data";

/// Handle to a workspace's data directory. All store state lives under
/// `root`; stores are the only components that mutate it.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    /// Use `root` directly as the data directory (tests, scripted setups).
    pub fn at(root: PathBuf) -> Self {
        Workspace { root }
    }

    /// Walk up from `start_dir` looking for a `.countersign` directory.
    pub fn discover(start_dir: &Path) -> Result<Self, CountersignError> {
        let mut current = PathBuf::from(start_dir);
        loop {
            let candidate = current.join(WORKSPACE_DIR);
            if candidate.exists() {
                return Ok(Workspace {
                    root: candidate.join(DATA_DIR),
                });
            }
            if !current.pop() {
                return Err(CountersignError::NotFound(
                    "'.countersign' directory not found in current or parent directories. Run `countersign init` first.".to_string(),
                ));
            }
        }
    }

    /// Create the workspace under `dir` and initialize the durable store.
    /// Existing data is preserved.
    pub fn initialize(dir: &Path) -> Result<Self, CountersignError> {
        let root = dir.join(WORKSPACE_DIR).join(DATA_DIR);
        fs::create_dir_all(&root).map_err(CountersignError::IoError)?;
        db::initialize_platform_db(&root)?;
        Ok(Workspace { root })
    }
}
