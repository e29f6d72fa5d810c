//! Recently served directories

use std::fs;
use std::path::{Path, PathBuf};

/// Plain-text list of served directories, most recent first
///
/// Failures are never fatal: a broken history file must not stop the server.
#[derive(Debug, Clone)]
pub struct RecentDirectories {
    path: PathBuf,
}

impl RecentDirectories {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the list; a missing or unreadable file is an empty list
    pub fn load(&self) -> Vec<PathBuf> {
        match fs::read_to_string(&self.path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(e) => {
                tracing::debug!("No recent directories at {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Move `dir` to the front of the list
    pub fn record(&self, dir: &Path) {
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

        let mut entries = self.load();
        entries.retain(|entry| entry != &dir);
        entries.insert(0, dir);

        if let Err(e) = self.write(&entries) {
            tracing::debug!("Failed to write recent directories: {}", e);
        }
    }

    fn write(&self, entries: &[PathBuf]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut content = String::new();
        for entry in entries {
            content.push_str(&entry.to_string_lossy());
            content.push('\n');
        }
        fs::write(&self.path, content)
    }
}
