//! ServedRoot - containment-checked resolution of client supplied paths
//!
//! Every path that arrives over HTTP goes through [`ServedRoot::resolve`]
//! before the file system is touched. Resolution happens twice:
//! - lexically, so `..` can never climb above the root and absolute paths are refused
//! - after canonicalization, so symlinks cannot lead outside the root or into a
//!   reserved subtree

use crate::media::is_reserved;
use crate::{FsError, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Canonical directory that the gallery serves
#[derive(Debug, Clone)]
pub struct ServedRoot {
    root: PathBuf,
}

/// A path proven to live inside the served root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl ResolvedPath {
    /// Canonical absolute path
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Path relative to the served root, after symlink resolution
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn is_file(&self) -> bool {
        self.absolute.is_file()
    }
}

impl ServedRoot {
    /// Canonicalize and validate the served directory
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| match e.kind() {
            ErrorKind::NotFound => FsError::NotFound(root.display().to_string()),
            _ => FsError::Io(e),
        })?;

        if !canonical.is_dir() {
            return Err(FsError::InvalidRoot(canonical.display().to_string()));
        }

        Ok(Self { root: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a client supplied relative path
    ///
    /// Fails with `PathEscape` for anything outside the root or inside a
    /// reserved subtree, and with `NotFound` when nothing exists there.
    pub fn resolve(&self, requested: &str) -> Result<ResolvedPath> {
        let lexical = normalize_relative(requested)?;

        if is_reserved(&lexical) {
            return Err(FsError::PathEscape(requested.to_string()));
        }

        let absolute = self.root.join(&lexical).canonicalize().map_err(|e| match e.kind() {
            ErrorKind::NotFound => FsError::NotFound(requested.to_string()),
            _ => FsError::Io(e),
        })?;

        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| FsError::PathEscape(requested.to_string()))?
            .to_path_buf();

        if is_reserved(&relative) {
            return Err(FsError::PathEscape(requested.to_string()));
        }

        Ok(ResolvedPath { absolute, relative })
    }

    /// Resolve and require a regular file
    pub fn resolve_file(&self, requested: &str) -> Result<ResolvedPath> {
        let resolved = self.resolve(requested)?;
        if !resolved.is_file() {
            return Err(FsError::NotFound(requested.to_string()));
        }
        Ok(resolved)
    }
}

/// Collapse `.` and `..` without touching the file system
fn normalize_relative(requested: &str) -> Result<PathBuf> {
    if requested.contains('\0') {
        return Err(FsError::PathEscape(requested.to_string()));
    }

    let mut normalized = PathBuf::new();

    for component in Path::new(requested).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(FsError::PathEscape(requested.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(FsError::PathEscape(requested.to_string()));
            }
        }
    }

    Ok(normalized)
}
