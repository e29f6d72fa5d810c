//! Viewer session: navigation, windowing and mutations for one page load

use crate::command::{KeyBindings, NavCommand};
use crate::config::AppConfig;
use crate::mutation::{MutationKind, MutationResult, PendingMutation};
use crate::navigation::NavigationState;
use crate::window::{MediaSlots, ViewportWindow};
use app_fs::MediaItem;

/// One viewer over one ordered index
///
/// Commands are processed one at a time; the window has settled on the new
/// index before `execute` returns.
pub struct ViewerSession<S: MediaSlots> {
    nav: NavigationState,
    window: ViewportWindow,
    slots: S,
    keys: KeyBindings,
}

impl<S: MediaSlots> ViewerSession<S> {
    pub fn new(items: Vec<MediaItem>, config: &AppConfig, slots: S) -> Self {
        let nav = NavigationState::new(items, config.viewer.history_limit);
        Self::build(nav, config, slots)
    }

    pub fn with_seed(items: Vec<MediaItem>, config: &AppConfig, slots: S, seed: u64) -> Self {
        let nav = NavigationState::with_seed(items, config.viewer.history_limit, seed);
        Self::build(nav, config, slots)
    }

    fn build(nav: NavigationState, config: &AppConfig, slots: S) -> Self {
        let window = ViewportWindow::new(nav.len(), config.viewer.radii())
            .with_audio_mode(config.viewer.audio_mode);

        let keys = KeyBindings::new(&config.keybindings);
        if keys.is_empty() {
            tracing::warn!("No key bindings configured");
        } else {
            tracing::debug!("{} keys bound", keys.len());
        }

        let mut session = Self {
            nav,
            window,
            slots,
            keys,
        };
        session.sync_window();
        session
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn window(&self) -> &ViewportWindow {
        &self.window
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut S {
        &mut self.slots
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.nav.current_item()
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: &str) -> Option<PendingMutation> {
        match self.keys.resolve(key) {
            Some(cmd) => self.execute(cmd),
            None => {
                tracing::trace!("Unbound key: {}", key);
                None
            }
        }
    }

    /// Execute a command
    ///
    /// Delete and favorite only produce the request; the caller sends it and
    /// reports back through [`ViewerSession::complete_mutation`].
    pub fn execute(&mut self, cmd: NavCommand) -> Option<PendingMutation> {
        let moved = match cmd {
            NavCommand::Next => self.nav.next(),
            NavCommand::Prev => self.nav.prev(),
            NavCommand::Random => self.nav.random(),
            NavCommand::Back => self.nav.back(),
            NavCommand::GroupNext => self.nav.group_next(),
            NavCommand::GroupPrev => self.nav.group_prev(),
            NavCommand::GroupFirst => self.nav.group_first(),
            NavCommand::GroupLast => self.nav.group_last(),
            NavCommand::ToggleAudio => {
                let audio = self.window.toggle_audio_mode(&mut self.slots);
                tracing::debug!("Audio mode {}", if audio { "on" } else { "off" });
                false
            }
            NavCommand::Delete => return self.request(MutationKind::Delete),
            NavCommand::Favorite => return self.request(MutationKind::Favorite),
        };

        if moved {
            self.sync_window();
        }
        None
    }

    /// A front end reported `index` entering or leaving the viewport
    pub fn on_visibility_change(&mut self, index: usize, is_visible: bool) -> bool {
        if !is_visible || index >= self.nav.len() {
            return false;
        }
        let moved = self.nav.jump_to(index);
        self.window.on_visibility_change(index, true, &mut self.slots);
        moved
    }

    /// Apply the server's answer to a mutation request
    ///
    /// Returns whether the index changed.
    pub fn complete_mutation(&mut self, pending: &PendingMutation, result: &MutationResult) -> bool {
        if !result.ok {
            tracing::warn!(
                "{:?} of {} failed: {}",
                pending.kind,
                pending.relative_path,
                result.error.as_deref().unwrap_or("unknown error")
            );
            return false;
        }

        match pending.kind {
            MutationKind::Favorite => false,
            MutationKind::Delete => {
                let Some(index) = self.nav.index_of(&pending.relative_path) else {
                    return false;
                };
                self.nav.remove(index);
                self.window
                    .remove(index, self.nav.current_index(), &mut self.slots);
                true
            }
        }
    }

    fn request(&self, kind: MutationKind) -> Option<PendingMutation> {
        self.nav.current_item().map(|item| PendingMutation {
            kind,
            relative_path: item.relative_path.clone(),
        })
    }

    fn sync_window(&mut self) {
        if let Some(current) = self.nav.current_index() {
            self.window.on_index_change(current, &mut self.slots);
        }
    }
}
