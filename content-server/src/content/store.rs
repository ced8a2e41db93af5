//! Persistence Layer
//!
//! The content document lives in one JSON file. Every save rewrites it
//! completely: stamp `last_updated`, write `<file>.tmp`, rename over the
//! original. Readers only ever see the old or the new file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use shared::{AppError, ContentDocument, ErrorCode};
use thiserror::Error;

use crate::utils::time::now_timestamp;

/// Default mode of the written document (rw-r--r--)
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Filesystem operations used by the store
///
/// Swappable so tests can fail a write or a rename on purpose.
pub trait DocumentFs: Send + Sync + 'static {
    /// Read a file; `Ok(None)` when it does not exist
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn remove(&self, path: &Path) -> io::Result<()>;
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl DocumentFs for StdFs {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, _path: &Path, _mode: u32) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} does not hold a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("failed to serialize content document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to replace {}: {source}", path.display())]
    Rename { path: PathBuf, source: io::Error },
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = match err {
            StoreError::Corrupt { .. } | StoreError::NotAnObject { .. } => {
                ErrorCode::DocumentCorrupted
            }
            _ => ErrorCode::StorageError,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// JSON file store for the content document
#[derive(Clone)]
pub struct ContentStore {
    path: PathBuf,
    tmp_path: PathBuf,
    timezone: Tz,
    file_mode: u32,
    fs: Arc<dyn DocumentFs>,
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("path", &self.path)
            .field("timezone", &self.timezone)
            .field("file_mode", &format_args!("{:o}", self.file_mode))
            .finish()
    }
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>, timezone: Tz) -> Self {
        let path = path.into();
        Self {
            tmp_path: tmp_path_for(&path),
            path,
            timezone,
            file_mode: DEFAULT_FILE_MODE,
            fs: Arc::new(StdFs),
        }
    }

    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn with_fs(mut self, fs: impl DocumentFs) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Read the document fresh from disk
    ///
    /// A missing or blank file is an empty document.
    pub fn load(&self) -> Result<ContentDocument, StoreError> {
        let bytes = self
            .fs
            .read(&self.path)
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
        let Some(bytes) = bytes else {
            return Ok(ContentDocument::new());
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ContentDocument::new());
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        ContentDocument::try_from(value).map_err(|_| StoreError::NotAnObject {
            path: self.path.clone(),
        })
    }

    /// Stamp `last_updated` and atomically replace the file
    ///
    /// Returns the stamped timestamp. On failure the temp file is removed and
    /// the previous file is left as it was.
    pub fn save(&self, document: &mut ContentDocument) -> Result<String, StoreError> {
        let timestamp = now_timestamp(self.timezone);
        document.set_last_updated(timestamp.clone());

        let bytes = to_pretty_json(document).map_err(StoreError::Serialize)?;

        if let Err(source) = self.fs.write(&self.tmp_path, &bytes) {
            self.discard_tmp();
            return Err(StoreError::Write {
                path: self.tmp_path.clone(),
                source,
            });
        }
        if let Err(source) = self.fs.rename(&self.tmp_path, &self.path) {
            self.discard_tmp();
            return Err(StoreError::Rename {
                path: self.path.clone(),
                source,
            });
        }

        if let Err(e) = self.fs.set_mode(&self.path, self.file_mode) {
            tracing::warn!(
                path = %self.path.display(),
                mode = format_args!("{:o}", self.file_mode),
                error = %e,
                "Failed to set content file permissions"
            );
        }

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Content document written");
        Ok(timestamp)
    }

    fn discard_tmp(&self) {
        if let Err(e) = self.fs.remove(&self.tmp_path)
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.tmp_path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Pretty JSON with 4-space indentation
fn to_pretty_json(document: &ContentDocument) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(4096);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}
