//! Project discovery and structure

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory holding project configuration
pub const MARKER_DIR: &str = ".gear";

/// Directory holding the inventory documents
pub const INVENTORY_DIR: &str = "inventory";

/// Represents a gear project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .gear/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(MARKER_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "found project");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create the project structure at the given path
    ///
    /// Fails if `.gear/` already exists unless `force` is set, in which case
    /// the config file is rewritten. Inventory documents are written by the
    /// caller through a store.
    pub fn init(path: &Path, force: bool) -> Result<Self, ProjectError> {
        std::fs::create_dir_all(path).map_err(|e| ProjectError::IoError(e.to_string()))?;
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let marker = root.join(MARKER_DIR);
        if marker.exists() && !force {
            return Err(ProjectError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&marker).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::create_dir_all(root.join(INVENTORY_DIR))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(marker.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        tracing::info!(root = %root.display(), force, "initialized project");
        Ok(Self { root })
    }

    /// Open a project rooted exactly at `root`
    pub fn at(root: &Path) -> Result<Self, ProjectError> {
        if root.join(MARKER_DIR).is_dir() {
            Ok(Self {
                root: root.to_path_buf(),
            })
        } else {
            Err(ProjectError::NotFound {
                searched_from: root.to_path_buf(),
            })
        }
    }

    fn default_config() -> &'static str {
        r#"# Gear project configuration

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# AI collaborator (tag suggestions, tag visuals, brand lookup, pack analysis)
# ai:
#   enabled: true
#   model: gemini-2.5-flash
#   timeout_secs: 30
#   api_key is normally taken from GEMINI_API_KEY or API_KEY
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .gear configuration directory
    pub fn gear_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// Get the directory holding the inventory documents
    pub fn inventory_dir(&self) -> PathBuf {
        self.root.join(INVENTORY_DIR)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    #[error("not a gear project (searched from {searched_from:?})")]
    #[diagnostic(code(gear::project::not_found), help("run 'gear init' to create one"))]
    NotFound { searched_from: PathBuf },

    #[error("gear project already exists at {0:?}")]
    #[diagnostic(code(gear::project::exists), help("use --force to reinitialize"))]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
