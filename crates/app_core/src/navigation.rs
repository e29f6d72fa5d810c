//! Navigation state over the ordered gallery index

use app_fs::MediaItem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Navigation state for one page load
///
/// Moves are clamped at both ends of the list; there is no wraparound.
pub struct NavigationState {
    items: Vec<MediaItem>,
    current: usize,

    /// Visited indices, most recent last
    history: VecDeque<usize>,
    history_limit: usize,

    /// Indices `random` has not handed out yet
    shuffle_pool: Vec<usize>,
    rng: StdRng,
}

impl NavigationState {
    pub fn new(items: Vec<MediaItem>, history_limit: usize) -> Self {
        Self::with_rng(items, history_limit, StdRng::from_entropy())
    }

    /// Deterministic random order, for reproducible sessions
    pub fn with_seed(items: Vec<MediaItem>, history_limit: usize, seed: u64) -> Self {
        Self::with_rng(items, history_limit, StdRng::seed_from_u64(seed))
    }

    fn with_rng(items: Vec<MediaItem>, history_limit: usize, rng: StdRng) -> Self {
        let mut state = Self {
            items,
            current: 0,
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            shuffle_pool: Vec::new(),
            rng,
        };
        state.refill_shuffle_pool(0);
        state
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get current index, `None` for an empty gallery
    pub fn current_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    /// Get current item
    pub fn current_item(&self) -> Option<&MediaItem> {
        self.items.get(self.current)
    }

    pub fn index_of(&self, relative_path: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.relative_path == relative_path)
    }

    /// Visit history, oldest first
    pub fn history(&self) -> impl Iterator<Item = usize> + '_ {
        self.history.iter().copied()
    }

    /// Remaining shuffle pool, in no particular order
    pub fn shuffle_pool(&self) -> &[usize] {
        &self.shuffle_pool
    }

    /// Jump to an index, recording the previous one in history
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.visit(index)
    }

    /// Move to next item
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.items.len() {
            self.visit(self.current + 1)
        } else {
            false
        }
    }

    /// Move to previous item
    pub fn prev(&mut self) -> bool {
        if self.current > 0 && !self.items.is_empty() {
            self.visit(self.current - 1)
        } else {
            false
        }
    }

    /// Jump to a random item without repeats until the pool runs dry
    pub fn random(&mut self) -> bool {
        if self.items.len() < 2 {
            return false;
        }

        let picked = loop {
            if self.shuffle_pool.is_empty() {
                self.refill_shuffle_pool(self.current);
            }
            let slot = self.rng.gen_range(0..self.shuffle_pool.len());
            let candidate = self.shuffle_pool.swap_remove(slot);
            // Reached through next/prev: already seen, draw again
            if candidate != self.current {
                break candidate;
            }
        };

        if self.shuffle_pool.is_empty() {
            self.refill_shuffle_pool(picked);
        }

        self.visit(picked)
    }

    /// Go back in history
    pub fn back(&mut self) -> bool {
        while let Some(previous) = self.history.pop_back() {
            if previous < self.items.len() && previous != self.current {
                self.current = previous;
                return true;
            }
        }
        false
    }

    /// First item of a different folder after the current one, else the last item
    pub fn group_next(&mut self) -> bool {
        let parent = match self.current_item() {
            Some(item) => item.parent_dir().to_string(),
            None => return false,
        };

        let target = self.items[self.current + 1..]
            .iter()
            .position(|item| item.parent_dir() != parent)
            .map(|offset| self.current + 1 + offset)
            .unwrap_or(self.items.len() - 1);

        self.visit(target)
    }

    /// Nearest item of a different folder before the current one, else the first item
    pub fn group_prev(&mut self) -> bool {
        let parent = match self.current_item() {
            Some(item) => item.parent_dir().to_string(),
            None => return false,
        };

        let target = self.items[..self.current]
            .iter()
            .rposition(|item| item.parent_dir() != parent)
            .unwrap_or(0);

        self.visit(target)
    }

    /// First item sharing the current item's folder
    pub fn group_first(&mut self) -> bool {
        let parent = match self.current_item() {
            Some(item) => item.parent_dir().to_string(),
            None => return false,
        };

        match self.items.iter().position(|item| item.parent_dir() == parent) {
            Some(target) => self.visit(target),
            None => false,
        }
    }

    /// Last item sharing the current item's folder
    pub fn group_last(&mut self) -> bool {
        let parent = match self.current_item() {
            Some(item) => item.parent_dir().to_string(),
            None => return false,
        };

        match self.items.iter().rposition(|item| item.parent_dir() == parent) {
            Some(target) => self.visit(target),
            None => false,
        }
    }

    /// Remove the current item after it was deleted
    pub fn remove_current(&mut self) -> Option<MediaItem> {
        if self.items.is_empty() {
            return None;
        }
        self.remove(self.current)
    }

    /// Remove an item; history and shuffle pool are re-indexed
    ///
    /// When the current item is removed, the next item becomes current, or the
    /// previous one if it was last.
    pub fn remove(&mut self, index: usize) -> Option<MediaItem> {
        if index >= self.items.len() {
            return None;
        }

        let removed = self.items.remove(index);

        let shift = |i: usize| if i > index { i - 1 } else { i };

        let mut history = VecDeque::with_capacity(self.history.len());
        for i in self.history.drain(..).filter(|&i| i != index).map(shift) {
            if history.back() != Some(&i) {
                history.push_back(i);
            }
        }
        self.history = history;

        self.shuffle_pool.retain(|&i| i != index);
        for i in self.shuffle_pool.iter_mut() {
            *i = shift(*i);
        }

        if self.current > index {
            self.current -= 1;
        } else if self.current == index && self.current >= self.items.len() {
            self.current = self.items.len().saturating_sub(1);
        }

        tracing::debug!(
            "Removed {} from navigation, {} items left",
            removed.relative_path,
            self.items.len()
        );
        Some(removed)
    }

    fn visit(&mut self, target: usize) -> bool {
        if target == self.current {
            return false;
        }

        self.history.push_back(self.current);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        self.current = target;
        true
    }

    fn refill_shuffle_pool(&mut self, exclude: usize) {
        self.shuffle_pool = (0..self.items.len()).filter(|&i| i != exclude).collect();
    }
}
