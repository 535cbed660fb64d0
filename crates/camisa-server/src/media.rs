//! Image files on disk under a single media root.
//!
//! Uploads land directly under the root with generated names; the catalog
//! stores only the file name. Reads accept bare names for files at the top
//! level, plus a recursive lookup for the download endpoint. All name-based
//! operations refuse anything that could point outside the root.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

/// Errors raised by media store operations.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The upload is not an acceptable image type.
    #[error("unsupported upload type: {mime}")]
    UnsupportedType {
        /// Content type presented by the client.
        mime: String,
    },

    /// The name contains path separators or traversal components.
    #[error("invalid file name: {name}")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// No file with this name exists.
    #[error("file not found: {name}")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },

    /// Filesystem failure.
    #[error("media io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image storage rooted at one directory.
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open a media store, creating the root directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The media root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a content type is an acceptable image upload.
    ///
    /// Accepts `image/` followed by a subtype that starts with a letter,
    /// which admits compound subtypes such as `image/svg+xml`.
    pub fn accepts(content_type: &str) -> bool {
        content_type
            .strip_prefix("image/")
            .and_then(|subtype| subtype.chars().next())
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    /// Store an upload and return its generated file name.
    ///
    /// The name is a UUID keeping the original extension, so concurrent
    /// uploads of the same file never collide. A rejected content type
    /// writes nothing.
    pub fn save(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        if !Self::accepts(content_type) {
            return Err(MediaError::UnsupportedType {
                mime: content_type.to_owned(),
            });
        }
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let stored = format!("{}{ext}", Uuid::now_v7());
        std::fs::write(self.root.join(&stored), bytes)?;
        debug!(file = %stored, size = bytes.len(), "stored upload");
        Ok(stored)
    }

    /// Delete a stored file by name.
    ///
    /// Returns whether a file was removed; a missing file is a no-op.
    pub fn delete(&self, name: &str) -> Result<bool, MediaError> {
        Self::require_bare(name)?;
        match std::fs::remove_file(self.root.join(name)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve a bare name to a file directly under the root.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, MediaError> {
        Self::require_bare(name)?;
        let path = self.root.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(MediaError::NotFound {
                name: name.to_owned(),
            })
        }
    }

    /// Find a file by exact name anywhere under the root.
    pub fn find(&self, name: &str) -> Result<PathBuf, MediaError> {
        Self::require_bare(name)?;
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            if entry.file_type().is_file() && entry.file_name().to_string_lossy() == name {
                return Ok(entry.path().to_path_buf());
            }
        }
        Err(MediaError::NotFound {
            name: name.to_owned(),
        })
    }

    /// Describe the media root as a JSON tree.
    ///
    /// A directory containing only files becomes a sorted array of names. A
    /// directory with subdirectories becomes an object mapping each
    /// subdirectory to its subtree and each loose file to `null`.
    pub fn tree(&self) -> Result<serde_json::Value, MediaError> {
        Self::tree_at(&self.root)
    }

    fn tree_at(dir: &Path) -> Result<serde_json::Value, MediaError> {
        let mut files: Vec<String> = Vec::new();
        let mut dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                dirs.push((name, entry.path()));
            } else {
                files.push(name);
            }
        }
        files.sort();

        if dirs.is_empty() {
            return Ok(serde_json::Value::from(files));
        }
        let mut map = serde_json::Map::new();
        for (name, path) in dirs {
            let _ = map.insert(name, Self::tree_at(&path)?);
        }
        for name in files {
            let _ = map.insert(name, serde_json::Value::Null);
        }
        Ok(serde_json::Value::Object(map))
    }

    /// Reject names that could escape the root.
    fn require_bare(name: &str) -> Result<(), MediaError> {
        let bare = !name.is_empty() && Path::new(name).file_name().is_some_and(|f| f == name);
        if bare {
            Ok(())
        } else {
            Err(MediaError::InvalidName {
                name: name.to_owned(),
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
