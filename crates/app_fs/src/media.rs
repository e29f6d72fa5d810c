//! Media classification and the reserved subtrees of a served root

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Component, Path};

/// Destination of move-to-trash
pub const DELETED_DIR: &str = "deleted";

/// Destination of copy-to-favorites
pub const FAVORITES_DIR: &str = "favorites";

/// Top-level folders that are never indexed, served, or mutated
pub const RESERVED_DIRS: [&str; 2] = [DELETED_DIR, FAVORITES_DIR];

/// Kind of media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One entry of the ordered gallery index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Path relative to the served root, always `/`-separated
    pub relative_path: String,
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn new(relative_path: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind,
        }
    }

    /// Parent directory of the item ("" for files at the root)
    pub fn parent_dir(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or("")
    }

    /// Final path component
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.relative_path)
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Immutable set of servable extensions, compared case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaExtensions {
    image: BTreeSet<String>,
    video: BTreeSet<String>,
}

impl MediaExtensions {
    /// Build from extension lists; leading dots and case are ignored
    pub fn new<I, V, S>(image: I, video: V) -> Self
    where
        I: IntoIterator<Item = S>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            image: image.into_iter().filter_map(normalize_extension).collect(),
            video: video.into_iter().filter_map(normalize_extension).collect(),
        }
    }

    /// Classify a path by its extension
    pub fn classify<P: AsRef<Path>>(&self, path: P) -> Option<MediaKind> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();

        if self.image.contains(&ext) {
            Some(MediaKind::Image)
        } else if self.video.contains(&ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Check if a path has an allowed media extension
    pub fn is_allowed<P: AsRef<Path>>(&self, path: P) -> bool {
        self.classify(path).is_some()
    }

    pub fn image_extensions(&self) -> impl Iterator<Item = &str> {
        self.image.iter().map(String::as_str)
    }

    pub fn video_extensions(&self) -> impl Iterator<Item = &str> {
        self.video.iter().map(String::as_str)
    }
}

impl Default for MediaExtensions {
    fn default() -> Self {
        Self::new(["jpg", "jpeg", "png", "gif"], ["webm", "mp4"])
    }
}

fn normalize_extension<S: AsRef<str>>(ext: S) -> Option<String> {
    let ext = ext.as_ref().trim().trim_start_matches('.');
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Check if a root-relative path lies inside a reserved subtree
pub fn is_reserved<P: AsRef<Path>>(relative: P) -> bool {
    match relative.as_ref().components().next() {
        Some(Component::Normal(first)) => first
            .to_str()
            .map_or(false, |name| RESERVED_DIRS.contains(&name)),
        _ => false,
    }
}
