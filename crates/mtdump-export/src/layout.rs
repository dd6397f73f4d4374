//! Output directory lifecycle: backup rotation and per-timeframe
//! subdirectories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use mtdump_types::Timeframe;
use thiserror::Error;

/// Errors that can occur while preparing the output tree.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The previous output tree could not be moved aside.
    #[error("failed to rotate previous output '{}' to '{}': {source}", path.display(), backup.display())]
    Rotate {
        /// The output root that was being rotated.
        path: PathBuf,
        /// The backup destination.
        backup: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The output root is still occupied after backup rotation.
    #[error("output root '{}' already exists; check if it contains files", path.display())]
    RootOccupied {
        /// The occupied path.
        path: PathBuf,
    },

    /// A directory could not be created.
    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

/// The prepared output tree for one run.
#[derive(Debug)]
pub struct OutputLayout {
    root: PathBuf,
    backup: Option<PathBuf>,
}

impl OutputLayout {
    /// Prepares `root` as a fresh, empty output directory.
    ///
    /// An existing tree at `root` is first renamed to a sibling
    /// `<name>_bak_<run start>` directory, so a run never merges with or
    /// silently overwrites a previous run's files. If `root` is occupied
    /// again after rotation (a racing writer, or a rename that did not clear
    /// the name), the whole run must abort before any downloads.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Rotate`] if the backup rename fails,
    /// [`LayoutError::RootOccupied`] if `root` exists after rotation, and
    /// [`LayoutError::CreateDir`] if creation is blocked for any other
    /// reason. All are fatal to the run.
    pub fn prepare(root: &Path, run_started: NaiveDateTime) -> Result<Self, LayoutError> {
        let mut backup = None;

        if root.exists() {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let destination = root.with_file_name(format!(
                "{name}_bak_{}",
                run_started.format("%Y%m%d-%H%M%S")
            ));

            fs::rename(root, &destination).map_err(|e| LayoutError::Rotate {
                path: root.to_path_buf(),
                backup: destination.clone(),
                source: e,
            })?;
            backup = Some(destination);
        }

        match fs::create_dir(root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LayoutError::RootOccupied {
                    path: root.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(LayoutError::CreateDir {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            backup,
        })
    }

    /// Returns the output root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns where the previous tree was moved, if one existed.
    #[must_use]
    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Creates and returns the subdirectory for `timeframe`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::CreateDir`] if the subdirectory cannot be
    /// created. Callers treat this as the signal to stop processing further
    /// timeframes; earlier timeframes' data is already on disk.
    pub fn timeframe_dir(&self, timeframe: Timeframe) -> Result<PathBuf, LayoutError> {
        let dir = self.root.join(timeframe.as_str());
        fs::create_dir(&dir).map_err(|e| LayoutError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;
        Ok(dir)
    }
}
