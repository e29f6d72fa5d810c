//! Gala File System Layer
//!
//! Provides the server side of the gallery's file handling:
//! - MediaExtensions / MediaItem: what counts as servable media
//! - MediaIndexer: recursive discovery below the served root
//! - ServedRoot: containment-checked resolution of client supplied paths
//! - Gallery operations: move-to-trash and copy-to-favorites

mod media;
mod indexer;
mod served_root;
mod file_operations;

pub use media::{
    is_reserved, MediaExtensions, MediaItem, MediaKind, DELETED_DIR, FAVORITES_DIR, RESERVED_DIRS,
};
pub use indexer::MediaIndexer;
pub use served_root::{ResolvedPath, ServedRoot};
pub use file_operations::{DefaultGalleryOperations, GalleryOperations, MutationOutcome};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Path escapes served root: {0}")]
    PathEscape(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),

    #[error("Invalid root: {0}")]
    InvalidRoot(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
