//! All-or-nothing output files.
//!
//! Each output is written to a temporary file in its target directory and
//! renamed into place only once every output has been staged. Staged files
//! that are never committed are removed on drop.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::error::VoltimerError;
use tempfile::NamedTempFile;
use tracing::{info, warn};

#[derive(Default)]
pub struct StagedOutputs {
    staged: Vec<(PathBuf, NamedTempFile)>,
}

fn output_error(path: &Path, source: std::io::Error) -> VoltimerError {
    VoltimerError::Output {
        path: path.display().to_string(),
        source,
    }
}

fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write `bytes` next to `path` without touching `path` itself.
    pub fn stage(&mut self, path: &Path, bytes: &[u8]) -> Result<(), VoltimerError> {
        let mut file =
            NamedTempFile::new_in(target_dir(path)).map_err(|e| output_error(path, e))?;
        file.write_all(bytes).map_err(|e| output_error(path, e))?;
        file.flush().map_err(|e| output_error(path, e))?;
        self.staged.push((path.to_path_buf(), file));
        Ok(())
    }

    /// Rename every staged file into place. If a rename fails, outputs already
    /// moved by this call are removed again.
    pub fn commit(self) -> Result<Vec<PathBuf>, VoltimerError> {
        let mut committed: Vec<PathBuf> = Vec::with_capacity(self.staged.len());
        for (path, file) in self.staged {
            if let Err(e) = file.persist(&path) {
                for done in &committed {
                    if let Err(rm) = fs::remove_file(done) {
                        warn!(path = %done.display(), error = %rm, "could not roll back output");
                    }
                }
                return Err(output_error(&path, e.error));
            }
            info!(path = %path.display(), "output written");
            committed.push(path);
        }
        Ok(committed)
    }
}
