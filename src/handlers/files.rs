//! File-backed routes.
//!
//! # Responsibilities
//! - Resolve `/files/<name>` parameters under the base directory
//! - Read and replace whole files through a [`FileStore`]
//!
//! # Design Decisions
//! - Resolution is lexical first: `..` may never climb above the base directory
//! - Existing targets are canonicalized as well, so symlinks cannot escape either
//! - Every failure is reported as `404 Not Found` by the handlers

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::http::response::{Response, OCTET_STREAM};

/// Why a file operation failed.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("empty file name")]
    EmptyName,

    #[error("file name {0:?} escapes the base directory")]
    Traversal(String),

    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Whole-file read and write access, keyed by the path parameter of a request.
pub trait FileStore: Send + Sync + fmt::Debug {
    fn read(&self, name: &str) -> Result<Vec<u8>, FileError>;

    /// Create the file if needed and replace its contents.
    fn write(&self, name: &str, contents: &[u8]) -> Result<(), FileError>;
}

/// [`FileStore`] rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    base: PathBuf,
}

impl DirectoryStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Lexically resolve `name` under the base directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, FileError> {
        let mut relative = PathBuf::new();

        for segment in name.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if !relative.pop() {
                        return Err(FileError::Traversal(name.to_string()));
                    }
                }
                _ => {
                    let mut components = Path::new(segment).components();
                    match (components.next(), components.next()) {
                        (Some(Component::Normal(part)), None) => relative.push(part),
                        _ => return Err(FileError::Traversal(name.to_string())),
                    }
                }
            }
        }

        if relative.as_os_str().is_empty() {
            return Err(FileError::EmptyName);
        }
        Ok(self.base.join(relative))
    }

    /// Fail if the canonical form of `existing` lies outside the base directory.
    fn ensure_contained(&self, name: &str, existing: &Path) -> Result<(), FileError> {
        let base = self.base.canonicalize()?;
        if existing.canonicalize()?.starts_with(&base) {
            Ok(())
        } else {
            Err(FileError::Traversal(name.to_string()))
        }
    }
}

impl FileStore for DirectoryStore {
    fn read(&self, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(name)?;
        self.ensure_contained(name, &path)?;
        Ok(fs::read(path)?)
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(name)?;
        // `symlink_metadata` sees the link itself, so a dangling link is not mistaken for a new file.
        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_symlink() && !path.exists() => {
                return Err(FileError::Traversal(name.to_string()));
            }
            Ok(_) => self.ensure_contained(name, &path)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    self.ensure_contained(name, parent)?;
                }
            }
            Err(e) => return Err(e.into()),
        }
        fs::write(path, contents)?;
        Ok(())
    }
}

/// `GET /files/<name>`: the file's bytes, uncompressed.
pub fn read_file(store: &dyn FileStore, name: &str) -> Result<Response, FileError> {
    let contents = store.read(name)?;
    Ok(Response::ok().with_body(contents, OCTET_STREAM))
}

/// `POST /files/<name>`: replace the file with the request body.
pub fn write_file(store: &dyn FileStore, name: &str, body: &[u8]) -> Result<Response, FileError> {
    store.write(name, body)?;
    Ok(Response::created())
}
