//! Artifact persistence for generated parsers.
//!
//! One file per target under the artifact directory, next to an
//! `__init__.py` marker so the verification suite can import the directory
//! as a package.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::target::Target;

const PACKAGE_MARKER: &str = "__init__.py";

/// Where candidate source goes before the oracle looks at it.
pub trait ArtifactStore {
    /// Persist `source` as the artifact for `target`, replacing any previous
    /// content. Returns the location written.
    fn save(&self, target: &Target, source: &str) -> Result<PathBuf, StorageError>;
}

/// Filesystem-backed store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn artifact_path(&self, target: &Target) -> PathBuf {
        self.dir.join(target.artifact_file_name())
    }

    fn ensure_package_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        // Touch without truncating: a hand-written marker is left alone.
        let marker = self.dir.join(PACKAGE_MARKER);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&marker)
            .map_err(|source| StorageError::Write {
                path: marker.clone(),
                source,
            })?;
        Ok(())
    }
}

impl ArtifactStore for FsArtifactStore {
    #[instrument(skip_all, fields(target = %target))]
    fn save(&self, target: &Target, source: &str) -> Result<PathBuf, StorageError> {
        self.ensure_package_dir()?;

        let path = self.artifact_path(target);
        write_atomic(&path, source)?;
        info!(path = %path.display(), bytes = source.len(), "parser written");
        Ok(path)
    }
}

/// Stage `contents` in a temp file beside `path`, then persist it over the
/// destination so a reader sees either the old artifact or the new one.
/// The staged file is removed on every failure path.
fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    let write_err = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
    debug!(tmp = %staged.path().display(), "staging artifact");
    staged.write_all(contents.as_bytes()).map_err(write_err)?;
    staged.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}
