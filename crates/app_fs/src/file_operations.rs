//! File operations module
//! Provides the gallery's two mutations: move-to-trash and copy-to-favorites

use crate::media::{MediaExtensions, DELETED_DIR, FAVORITES_DIR};
use crate::{FsError, Result, ServedRoot};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of a successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Destination relative to the served root
    pub destination: PathBuf,
    /// Whether an existing file was replaced
    pub overwritten: bool,
}

/// Gallery file operations trait
pub trait GalleryOperations: Send + Sync {
    /// Move a file to `<root>/deleted/<relative_path>`, numbering on collision
    fn delete(&self, relative_path: &str) -> Result<MutationOutcome>;

    /// Copy a media file to `<root>/favorites/<relative_path>`, replacing any previous copy
    fn favorite(&self, relative_path: &str) -> Result<MutationOutcome>;
}

/// Default implementation working directly on the served root
///
/// Mutations are serialized by one process-wide lock, which makes the
/// check-then-move of collision numbering race free within the server.
pub struct DefaultGalleryOperations {
    root: ServedRoot,
    extensions: MediaExtensions,
    lock: Mutex<()>,
}

impl DefaultGalleryOperations {
    pub fn new(root: ServedRoot, extensions: MediaExtensions) -> Self {
        Self {
            root,
            extensions,
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &ServedRoot {
        &self.root
    }

    fn relative_to_root(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root.path())
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

impl GalleryOperations for DefaultGalleryOperations {
    fn delete(&self, relative_path: &str) -> Result<MutationOutcome> {
        let _guard = self.lock.lock();

        let source = self.root.resolve_file(relative_path)?;
        let preferred = self.root.path().join(DELETED_DIR).join(source.relative());
        let created = ensure_parent(&preferred)?;

        let result = free_destination(&preferred)
            .and_then(|target| move_file(source.absolute(), &target).map(|()| target));

        match result {
            Ok(target) => {
                let destination = self.relative_to_root(&target);
                tracing::info!(
                    "Moved to trash: {} -> {}",
                    source.relative().display(),
                    destination.display()
                );
                Ok(MutationOutcome {
                    destination,
                    overwritten: false,
                })
            }
            Err(e) => {
                rollback_dirs(&created);
                Err(e)
            }
        }
    }

    fn favorite(&self, relative_path: &str) -> Result<MutationOutcome> {
        let _guard = self.lock.lock();

        let source = self.root.resolve_file(relative_path)?;
        if !self.extensions.is_allowed(source.absolute()) {
            return Err(FsError::UnsupportedType(relative_path.to_string()));
        }

        let target = self.root.path().join(FAVORITES_DIR).join(source.relative());
        let created = ensure_parent(&target)?;
        let overwritten = target.exists();

        if let Err(e) = copy_atomically(source.absolute(), &target) {
            rollback_dirs(&created);
            return Err(e);
        }

        let destination = self.relative_to_root(&target);
        tracing::info!(
            "Copied to favorites: {} -> {} (overwritten: {})",
            source.relative().display(),
            destination.display(),
            overwritten
        );

        Ok(MutationOutcome {
            destination,
            overwritten,
        })
    }
}

/// Create missing parent directories, returning the ones created (outermost first)
fn ensure_parent(target: &Path) -> Result<Vec<PathBuf>> {
    let parent = match target.parent() {
        Some(p) => p,
        None => return Ok(Vec::new()),
    };

    let mut missing = Vec::new();
    let mut cursor = Some(parent);
    while let Some(dir) = cursor {
        if dir.exists() {
            break;
        }
        missing.push(dir.to_path_buf());
        cursor = dir.parent();
    }
    missing.reverse();

    if let Err(e) = fs::create_dir_all(parent) {
        rollback_dirs(&missing);
        return Err(e.into());
    }

    Ok(missing)
}

/// Remove directories created for a failed mutation (only if still empty)
fn rollback_dirs(created: &[PathBuf]) {
    for dir in created.iter().rev() {
        if let Err(e) = fs::remove_dir(dir) {
            tracing::debug!("Could not roll back {}: {}", dir.display(), e);
        }
    }
}

/// First of `name.ext`, `name_1.ext`, `name_2.ext`, ... that does not exist
fn free_destination(preferred: &Path) -> Result<PathBuf> {
    if is_free(preferred) {
        return Ok(preferred.to_path_buf());
    }

    let parent = preferred.parent().unwrap_or_else(|| Path::new(""));
    let stem = preferred.file_stem().unwrap_or_default();
    let extension = preferred.extension();

    for n in 1..=u32::MAX {
        let mut name = OsString::from(stem);
        name.push(format!("_{}", n));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }

        let candidate = parent.join(name);
        if is_free(&candidate) {
            return Ok(candidate);
        }
    }

    Err(FsError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("No free name for {}", preferred.display()),
    )))
}

/// Also treats dangling symlinks as taken
fn is_free(path: &Path) -> bool {
    fs::symlink_metadata(path).is_err()
}

/// Rename, falling back to copy + remove across file systems
fn move_file(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) => {
            // Unix: EXDEV = 18, Windows: ERROR_NOT_SAME_DEVICE = 17
            let is_cross_device = match e.raw_os_error() {
                Some(18) => cfg!(unix),
                Some(17) => cfg!(windows),
                _ => false,
            };

            if !is_cross_device {
                return Err(e.into());
            }

            tracing::info!(
                "Cross-filesystem move, using copy+delete: {} -> {}",
                source.display(),
                target.display()
            );
            fs::copy(source, target)?;
            if let Err(e) = fs::remove_file(source) {
                // Keep the tree unchanged: drop the copy again
                let _ = fs::remove_file(target);
                return Err(e.into());
            }
            Ok(())
        }
    }
}

/// Copy through a temporary sibling so a failed copy never leaves a partial file
fn copy_atomically(source: &Path, target: &Path) -> Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::Builder::new()
        .prefix(".gala-")
        .suffix(".partial")
        .tempfile_in(dir)?;

    let mut reader = fs::File::open(source)?;
    io::copy(&mut reader, temp.as_file_mut())?;
    temp.as_file().set_permissions(reader.metadata()?.permissions())?;

    temp.persist(target).map_err(|e| FsError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(files: &[(&str, &[u8])]) -> (tempfile::TempDir, DefaultGalleryOperations) {
        let dir = tempfile::tempdir().unwrap();
        for (name, data) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, data).unwrap();
        }
        let root = ServedRoot::new(dir.path()).unwrap();
        (dir, DefaultGalleryOperations::new(root, MediaExtensions::default()))
    }

    #[test]
    fn test_delete_moves_preserving_structure() {
        let (dir, ops) = setup(&[("trip/day1/a.jpg", b"a")]);

        let outcome = ops.delete("trip/day1/a.jpg").unwrap();

        assert_eq!(outcome.destination, Path::new("deleted/trip/day1/a.jpg"));
        assert!(!dir.path().join("trip/day1/a.jpg").exists());
        assert_eq!(fs::read(dir.path().join("deleted/trip/day1/a.jpg")).unwrap(), b"a");
    }

    #[test]
    fn test_delete_collision_numbering() {
        let (dir, ops) = setup(&[("photo.jpg", b"first"), ("deleted/photo.jpg", b"old")]);

        let outcome = ops.delete("photo.jpg").unwrap();
        assert_eq!(outcome.destination, Path::new("deleted/photo_1.jpg"));

        fs::write(dir.path().join("photo.jpg"), b"second").unwrap();
        let outcome = ops.delete("photo.jpg").unwrap();
        assert_eq!(outcome.destination, Path::new("deleted/photo_2.jpg"));

        assert_eq!(fs::read(dir.path().join("deleted/photo.jpg")).unwrap(), b"old");
        assert_eq!(fs::read(dir.path().join("deleted/photo_1.jpg")).unwrap(), b"first");
        assert_eq!(fs::read(dir.path().join("deleted/photo_2.jpg")).unwrap(), b"second");
    }

    #[test]
    fn test_concurrent_deletes_of_same_file() {
        use std::sync::Arc;

        let (dir, ops) = setup(&[("photo.jpg", b"new"), ("deleted/photo.jpg", b"old")]);
        let ops = Arc::new(ops);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ops = Arc::clone(&ops);
                std::thread::spawn(move || ops.delete("photo.jpg"))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let moved: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].destination, Path::new("deleted/photo_1.jpg"));
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(FsError::NotFound(_)))));

        let mut trashed: Vec<_> = fs::read_dir(dir.path().join("deleted"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        trashed.sort();
        assert_eq!(trashed, vec!["photo.jpg", "photo_1.jpg"]);
        assert_eq!(fs::read(dir.path().join("deleted/photo_1.jpg")).unwrap(), b"new");
        assert!(!dir.path().join("photo.jpg").exists());
    }

    #[test]
    fn test_delete_collision_without_extension() {
        let (dir, ops) = setup(&[("clip", b"x"), ("deleted/clip", b"y")]);
        let outcome = ops.delete("clip").unwrap();
        assert_eq!(outcome.destination, Path::new("deleted/clip_1"));
        assert!(dir.path().join("deleted/clip_1").exists());
    }

    #[test]
    fn test_delete_errors_leave_tree_unchanged() {
        let (dir, ops) = setup(&[("a.jpg", b"a"), ("deleted/b.jpg", b"b")]);

        assert!(matches!(ops.delete("../../etc/passwd"), Err(FsError::PathEscape(_))));
        assert!(matches!(ops.delete("missing.jpg"), Err(FsError::NotFound(_))));
        assert!(matches!(ops.delete("deleted/b.jpg"), Err(FsError::PathEscape(_))));

        assert!(dir.path().join("a.jpg").exists());
        assert!(dir.path().join("deleted/b.jpg").exists());
        assert!(!dir.path().join("deleted/deleted").exists());
    }

    #[test]
    fn test_favorite_copies_and_reports_overwrite() {
        let (dir, ops) = setup(&[("a/b.png", b"pixels")]);

        let first = ops.favorite("a/b.png").unwrap();
        assert!(!first.overwritten);
        assert_eq!(first.destination, Path::new("favorites/a/b.png"));

        let second = ops.favorite("a/b.png").unwrap();
        assert!(second.overwritten);

        assert_eq!(fs::read(dir.path().join("a/b.png")).unwrap(), b"pixels");
        assert_eq!(fs::read(dir.path().join("favorites/a/b.png")).unwrap(), b"pixels");

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("favorites/a"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".gala-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_favorite_rejections() {
        let (dir, ops) = setup(&[("notes.txt", b"n"), ("favorites/x.jpg", b"x")]);

        assert!(matches!(ops.favorite("notes.txt"), Err(FsError::UnsupportedType(_))));
        assert!(matches!(ops.favorite("missing.jpg"), Err(FsError::NotFound(_))));
        assert!(matches!(ops.favorite("favorites/x.jpg"), Err(FsError::PathEscape(_))));
        assert!(matches!(ops.favorite("../outside.jpg"), Err(FsError::PathEscape(_))));

        assert!(!dir.path().join("favorites/notes.txt").exists());
        assert!(!dir.path().join("favorites/favorites").exists());
    }

    #[test]
    fn test_rollback_removes_only_created_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x/y/z.jpg");

        let created = ensure_parent(&target).unwrap();
        assert_eq!(created, vec![dir.path().join("x"), dir.path().join("x/y")]);

        rollback_dirs(&created);
        assert!(!dir.path().join("x").exists());
        assert!(dir.path().exists());
    }
}
