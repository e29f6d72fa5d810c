//! Viewer commands and key binding resolution

use std::collections::HashMap;

/// Command identifiers as they appear in the `[keybindings]` config
pub struct CommandId;

impl CommandId {
    // Navigation commands
    pub const NAV_NEXT_ITEM: &'static str = "nav.next_item";
    pub const NAV_PREV_ITEM: &'static str = "nav.prev_item";
    pub const NAV_RANDOM: &'static str = "nav.random";
    pub const NAV_BACK: &'static str = "nav.back";
    pub const NAV_NEXT_GROUP: &'static str = "nav.next_group";
    pub const NAV_PREV_GROUP: &'static str = "nav.prev_group";
    pub const NAV_GROUP_FIRST: &'static str = "nav.group_first";
    pub const NAV_GROUP_LAST: &'static str = "nav.group_last";

    // View commands
    pub const VIEW_TOGGLE_AUDIO: &'static str = "view.toggle_audio";

    // File commands
    pub const FILE_DELETE: &'static str = "file.delete";
    pub const FILE_FAVORITE: &'static str = "file.favorite";
}

/// A viewer action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCommand {
    Next,
    Prev,
    Random,
    Back,
    GroupNext,
    GroupPrev,
    GroupFirst,
    GroupLast,
    ToggleAudio,
    Delete,
    Favorite,
}

impl NavCommand {
    pub const ALL: [NavCommand; 11] = [
        NavCommand::Next,
        NavCommand::Prev,
        NavCommand::Random,
        NavCommand::Back,
        NavCommand::GroupNext,
        NavCommand::GroupPrev,
        NavCommand::GroupFirst,
        NavCommand::GroupLast,
        NavCommand::ToggleAudio,
        NavCommand::Delete,
        NavCommand::Favorite,
    ];

    pub fn id(self) -> &'static str {
        match self {
            NavCommand::Next => CommandId::NAV_NEXT_ITEM,
            NavCommand::Prev => CommandId::NAV_PREV_ITEM,
            NavCommand::Random => CommandId::NAV_RANDOM,
            NavCommand::Back => CommandId::NAV_BACK,
            NavCommand::GroupNext => CommandId::NAV_NEXT_GROUP,
            NavCommand::GroupPrev => CommandId::NAV_PREV_GROUP,
            NavCommand::GroupFirst => CommandId::NAV_GROUP_FIRST,
            NavCommand::GroupLast => CommandId::NAV_GROUP_LAST,
            NavCommand::ToggleAudio => CommandId::VIEW_TOGGLE_AUDIO,
            NavCommand::Delete => CommandId::FILE_DELETE,
            NavCommand::Favorite => CommandId::FILE_FAVORITE,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.id() == id)
    }
}

/// Maps key names to commands
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    /// Key bindings: lowercased key -> command
    bindings: HashMap<String, NavCommand>,
}

impl KeyBindings {
    /// Build from the config map (command id -> keys)
    pub fn new(bindings: &HashMap<String, Vec<String>>) -> Self {
        let mut key_to_command = HashMap::new();

        for (command, keys) in bindings {
            let Some(cmd) = NavCommand::from_id(command) else {
                tracing::warn!("Unknown command in keybindings: {}", command);
                continue;
            };
            for key in keys {
                key_to_command.insert(key.to_lowercase(), cmd);
            }
        }

        Self {
            bindings: key_to_command,
        }
    }

    /// Resolve a key name to a command
    pub fn resolve(&self, key: &str) -> Option<NavCommand> {
        self.bindings.get(&key.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
