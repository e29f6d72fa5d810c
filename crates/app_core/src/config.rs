//! Application configuration

use app_fs::MediaExtensions;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::command::CommandId;
use crate::window::WindowRadii;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub viewer: ViewerConfig,
    pub media: MediaConfig,
    pub history: HistoryConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            viewer: ViewerConfig::default(),
            media: MediaConfig::default(),
            history: HistoryConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Launch the system browser once the server is listening
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            open_browser: true,
        }
    }
}

/// Viewport windowing and navigation behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Items around the current one whose media is attached
    pub load_radius: usize,
    /// Items around the current one that may keep attached media
    pub keep_radius: usize,
    /// Start with sound enabled for the current video
    pub audio_mode: bool,
    /// Maximum entries in the back history
    pub history_limit: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            load_radius: 2,
            keep_radius: 5,
            audio_mode: false,
            history_limit: 1000,
        }
    }
}

impl ViewerConfig {
    pub fn radii(&self) -> WindowRadii {
        WindowRadii::new(self.load_radius, self.keep_radius)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        let defaults = MediaExtensions::default();
        Self {
            image_extensions: defaults.image_extensions().map(String::from).collect(),
            video_extensions: defaults.video_extensions().map(String::from).collect(),
        }
    }
}

impl MediaConfig {
    pub fn extensions(&self) -> MediaExtensions {
        MediaExtensions::new(&self.image_extensions, &self.video_extensions)
    }
}

/// Recently served directories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// Override for the history file location
    pub file: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

impl HistoryConfig {
    pub fn path(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            ProjectDirs::from("org", "gala", "gala")
                .map(|dirs| dirs.data_dir().join("history.txt"))
                .unwrap_or_else(|| PathBuf::from("./history.txt"))
        })
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults if it is missing
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("org", "gala", "gala")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

/// Default bindings, keyed by command id; keys use browser `KeyboardEvent.key` names
fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // ========================================
    // Navigation (nav.*)
    // ========================================

    kb.insert(CommandId::NAV_NEXT_ITEM.into(), vec!["ArrowDown".into(), "ArrowRight".into(), "j".into()]);
    kb.insert(CommandId::NAV_PREV_ITEM.into(), vec!["ArrowUp".into(), "ArrowLeft".into(), "k".into()]);
    kb.insert(CommandId::NAV_RANDOM.into(), vec!["r".into()]);
    kb.insert(CommandId::NAV_BACK.into(), vec!["Backspace".into(), "b".into()]);

    // Folder groups
    kb.insert(CommandId::NAV_NEXT_GROUP.into(), vec!["PageDown".into(), "n".into()]);
    kb.insert(CommandId::NAV_PREV_GROUP.into(), vec!["PageUp".into(), "p".into()]);
    kb.insert(CommandId::NAV_GROUP_FIRST.into(), vec!["Home".into()]);
    kb.insert(CommandId::NAV_GROUP_LAST.into(), vec!["End".into()]);

    // ========================================
    // View (view.*)
    // ========================================

    kb.insert(CommandId::VIEW_TOGGLE_AUDIO.into(), vec!["m".into()]);

    // ========================================
    // File (file.*)
    // ========================================

    kb.insert(CommandId::FILE_DELETE.into(), vec!["Delete".into(), "d".into()]);
    kb.insert(CommandId::FILE_FAVORITE.into(), vec!["f".into()]);

    kb
}
