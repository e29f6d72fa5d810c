//! Media indexer - recursive discovery of servable media below a root

use crate::media::{is_reserved, MediaExtensions, MediaItem, RESERVED_DIRS};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Builds the ordered gallery index for one served root
///
/// Every call to [`MediaIndexer::scan`] walks the file system again; nothing is
/// cached between page loads.
#[derive(Debug, Clone)]
pub struct MediaIndexer {
    root: PathBuf,
    extensions: MediaExtensions,
}

impl MediaIndexer {
    pub fn new<P: Into<PathBuf>>(root: P, extensions: MediaExtensions) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &MediaExtensions {
        &self.extensions
    }

    /// Scan the root and return media sorted by relative path
    ///
    /// A missing root yields an empty index.
    pub fn scan(&self) -> Vec<MediaItem> {
        if !self.root.is_dir() {
            tracing::warn!("Media root is not a directory: {}", self.root.display());
            return Vec::new();
        }

        let canonical_root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_reserved_dir(entry));

        let mut items = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !is_media_file(&entry, &canonical_root) {
                continue;
            }

            let kind = match self.extensions.classify(entry.path()) {
                Some(kind) => kind,
                None => continue,
            };

            match relative_string(entry.path(), &self.root) {
                Some(relative_path) => items.push(MediaItem { relative_path, kind }),
                None => tracing::debug!("Skipping non UTF-8 path: {:?}", entry.path()),
            }
        }

        items.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        tracing::debug!("Indexed {} media files under {}", items.len(), self.root.display());
        items
    }
}

/// Reserved folders only count at the top level of the root
fn is_reserved_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map_or(false, |name| RESERVED_DIRS.contains(&name))
}

/// Regular files, or symlinks to files inside the root but outside reserved folders
fn is_media_file(entry: &DirEntry, canonical_root: &Path) -> bool {
    if entry.file_type().is_file() {
        return true;
    }

    if !entry.path_is_symlink() {
        return false;
    }

    let target = match entry.path().canonicalize() {
        Ok(target) if target.is_file() => target,
        _ => return false,
    };

    match target.strip_prefix(canonical_root) {
        Ok(relative) => !is_reserved(relative),
        Err(_) => false,
    }
}

/// Root-relative path with `/` separators
fn relative_string(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();

    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
