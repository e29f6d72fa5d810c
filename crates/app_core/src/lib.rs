//! Gala core domain logic
//!
//! This crate contains:
//! - Configuration
//! - Error types
//! - Navigation engine
//! - Viewport window manager
//! - Commands and key bindings
//! - Viewer session
//! - Recent directories log

pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod mutation;
pub mod navigation;
pub mod session;
pub mod window;

pub use command::{CommandId, KeyBindings, NavCommand};
pub use config::{AppConfig, HistoryConfig, MediaConfig, ServerConfig, ViewerConfig};
pub use error::AppError;
pub use history::RecentDirectories;
pub use mutation::{MutationKind, MutationResult, PendingMutation};
pub use navigation::NavigationState;
pub use session::ViewerSession;
pub use window::{IndexRange, MediaSlots, ViewportWindow, WindowRadii};
