//! Input directory handling: which files are eligible and in what order.

pub mod probe;

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{ComponentLogger, LibraryError, LogContext};

pub use probe::{AudioInfo, probe_file};

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "ogg"];

/// Case-insensitive match on the file extension.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

pub struct AudioLibrary {
    dir: PathBuf,
    ctx: LogContext,
}

impl AudioLibrary {
    pub fn new(dir: impl Into<PathBuf>, ctx: LogContext) -> Self {
        Self {
            dir: dir.into(),
            ctx,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Startup check; a failure here is fatal for the process.
    pub fn check(&self) -> Result<(), LibraryError> {
        let meta = fs::metadata(&self.dir).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LibraryError::Missing(self.dir.clone())
            } else {
                LibraryError::Unreadable {
                    path: self.dir.clone(),
                    source,
                }
            }
        })?;

        if !meta.is_dir() {
            return Err(LibraryError::NotADirectory(self.dir.clone()));
        }

        fs::read_dir(&self.dir).map_err(|source| LibraryError::Unreadable {
            path: self.dir.clone(),
            source,
        })?;

        Ok(())
    }

    /// Lists eligible files directly inside the directory, sorted by name.
    /// Runs fresh on every call; nothing is cached between cycles.
    pub fn scan(&self) -> Result<Vec<PathBuf>, LibraryError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LibraryError::Missing(self.dir.clone())
            } else {
                LibraryError::Unreadable {
                    path: self.dir.clone(),
                    source,
                }
            }
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.warn(&format!("skipping unreadable entry: {}", e));
                    continue;
                }
            };

            let path = entry.path();
            if path.is_file() && is_supported(&path) {
                files.push(path);
            } else {
                self.debug(&format!("ignoring {}", path.display()));
            }
        }

        files.sort();
        Ok(files)
    }
}

impl ComponentLogger for AudioLibrary {
    fn log_context(&self) -> LogContext {
        self.ctx.clone()
    }
}
