//! Viewport window - decides which items hold an attached media resource
//!
//! Two radii around the current index define the window:
//! - the loaded range, whose items are attached eagerly
//! - the kept range (never smaller), outside which nothing stays attached
//!
//! Updates are diff based: only indices whose membership changes are touched,
//! so the cost of a move does not grow with the size of the gallery.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Inclusive range of item indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    /// `[center - radius, center + radius]` clamped to `[0, len)`
    ///
    /// Returns `None` for an empty list.
    pub fn around(center: usize, radius: usize, len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }

        let center = center.min(len - 1);
        Some(Self {
            start: center.saturating_sub(radius),
            end: center.saturating_add(radius).min(len - 1),
        })
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn contains_range(&self, other: &IndexRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn iter(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Number of indices covered; never zero
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Load and keep radii; keep is never smaller than load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRadii {
    pub load: usize,
    pub keep: usize,
}

impl WindowRadii {
    pub fn new(load: usize, keep: usize) -> Self {
        Self {
            load,
            keep: keep.max(load),
        }
    }
}

impl Default for WindowRadii {
    fn default() -> Self {
        Self::new(2, 5)
    }
}

/// Front end that owns the actual media elements
///
/// Slots are addressed by their index in the ordered gallery.
pub trait MediaSlots {
    /// Attach the media resource; a fresh attachment starts paused and muted
    fn attach(&mut self, index: usize);

    /// Clear the source, stop playback and free decode buffers
    fn release(&mut self, index: usize);

    fn play(&mut self, index: usize);

    fn pause(&mut self, index: usize);

    fn set_muted(&mut self, index: usize, muted: bool);

    /// The item at `index` left the gallery; higher indices shift down by one
    fn removed(&mut self, _index: usize) {}
}

/// Window manager state
#[derive(Debug, Clone)]
pub struct ViewportWindow {
    radii: WindowRadii,
    len: usize,
    current: Option<usize>,
    loaded: Option<IndexRange>,
    kept: Option<IndexRange>,
    attached: BTreeSet<usize>,
    playing: Option<usize>,
    audio_mode: bool,
}

impl ViewportWindow {
    pub fn new(len: usize, radii: WindowRadii) -> Self {
        Self {
            radii,
            len,
            current: None,
            loaded: None,
            kept: None,
            attached: BTreeSet::new(),
            playing: None,
            audio_mode: false,
        }
    }

    pub fn with_audio_mode(mut self, audio_mode: bool) -> Self {
        self.audio_mode = audio_mode;
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn radii(&self) -> WindowRadii {
        self.radii
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn loaded_range(&self) -> Option<IndexRange> {
        self.loaded
    }

    pub fn kept_range(&self) -> Option<IndexRange> {
        self.kept
    }

    pub fn is_attached(&self, index: usize) -> bool {
        self.attached.contains(&index)
    }

    /// Attached indices in ascending order
    pub fn attached(&self) -> impl Iterator<Item = usize> + '_ {
        self.attached.iter().copied()
    }

    /// Index whose playback was last started
    pub fn playing(&self) -> Option<usize> {
        self.playing
    }

    pub fn audio_mode(&self) -> bool {
        self.audio_mode
    }

    /// Move the window to `new_index` (clamped)
    ///
    /// Returns whether the current index changed.
    pub fn on_index_change<S: MediaSlots + ?Sized>(&mut self, new_index: usize, slots: &mut S) -> bool {
        let (loaded, kept) = match (
            IndexRange::around(new_index, self.radii.load, self.len),
            IndexRange::around(new_index, self.radii.keep, self.len),
        ) {
            (Some(loaded), Some(kept)) => (loaded, kept),
            _ => return false,
        };
        let new_index = new_index.min(self.len - 1);

        let stale: Vec<usize> = self
            .attached
            .range(..kept.start)
            .chain(self.attached.range(kept.end.saturating_add(1)..))
            .copied()
            .collect();
        for index in stale {
            self.attached.remove(&index);
            if self.playing == Some(index) {
                self.playing = None;
            }
            slots.release(index);
        }

        if let Some(previous) = self.playing {
            if previous != new_index {
                slots.pause(previous);
                slots.set_muted(previous, true);
                self.playing = None;
            }
        }

        // Current first, so playback can start as early as possible
        self.attach(new_index, slots);
        for index in loaded.iter() {
            self.attach(index, slots);
        }

        if self.playing != Some(new_index) {
            slots.set_muted(new_index, !self.audio_mode);
            slots.play(new_index);
            self.playing = Some(new_index);
        }

        let changed = self.current != Some(new_index);
        self.current = Some(new_index);
        self.loaded = Some(loaded);
        self.kept = Some(kept);

        if changed {
            tracing::trace!(
                "Window at {} (loaded {}..={}, kept {}..={}, attached {})",
                new_index,
                loaded.start,
                loaded.end,
                kept.start,
                kept.end,
                self.attached.len()
            );
        }
        changed
    }

    /// Visibility event from the front end; a visible item becomes current
    pub fn on_visibility_change<S: MediaSlots + ?Sized>(
        &mut self,
        index: usize,
        is_visible: bool,
        slots: &mut S,
    ) -> bool {
        if !is_visible || index >= self.len {
            return false;
        }
        self.on_index_change(index, slots)
    }

    /// Drop `index` from the gallery and re-center on `new_current`
    pub fn remove<S: MediaSlots + ?Sized>(
        &mut self,
        index: usize,
        new_current: Option<usize>,
        slots: &mut S,
    ) {
        if index >= self.len {
            return;
        }

        if self.attached.remove(&index) {
            slots.release(index);
        }
        slots.removed(index);

        self.attached = self
            .attached
            .iter()
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        self.playing = shift_after_removal(self.playing, index);
        self.current = shift_after_removal(self.current, index);
        self.len -= 1;
        self.loaded = None;
        self.kept = None;

        match new_current {
            Some(current) if self.len > 0 => {
                self.on_index_change(current, slots);
            }
            _ => {
                let leftover: Vec<usize> = self.attached.iter().copied().collect();
                for i in leftover {
                    slots.release(i);
                }
                self.attached.clear();
                self.playing = None;
                self.current = None;
            }
        }
    }

    /// Enable or disable sound for the current item
    pub fn set_audio_mode<S: MediaSlots + ?Sized>(&mut self, audio_mode: bool, slots: &mut S) {
        self.audio_mode = audio_mode;
        if let Some(playing) = self.playing {
            slots.set_muted(playing, !audio_mode);
        }
    }

    pub fn toggle_audio_mode<S: MediaSlots + ?Sized>(&mut self, slots: &mut S) -> bool {
        self.set_audio_mode(!self.audio_mode, slots);
        self.audio_mode
    }

    fn attach<S: MediaSlots + ?Sized>(&mut self, index: usize, slots: &mut S) {
        if self.attached.insert(index) {
            slots.attach(index);
        }
    }
}

fn shift_after_removal(slot: Option<usize>, removed: usize) -> Option<usize> {
    match slot {
        Some(i) if i == removed => None,
        Some(i) if i > removed => Some(i - 1),
        other => other,
    }
}

/// In-memory slots that record what the window asked for
#[cfg(test)]
pub(crate) mod testing {
    use super::MediaSlots;
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SlotEvent {
        Attach(usize),
        Release(usize),
        Play(usize),
        Pause(usize),
        Muted(usize, bool),
    }

    #[derive(Debug, Default)]
    pub struct RecordingSlots {
        pub attached: BTreeSet<usize>,
        pub playing: BTreeSet<usize>,
        pub muted: BTreeMap<usize, bool>,
        pub events: Vec<SlotEvent>,
    }

    impl RecordingSlots {
        pub fn take_events(&mut self) -> Vec<SlotEvent> {
            std::mem::take(&mut self.events)
        }

        pub fn is_muted(&self, index: usize) -> bool {
            self.muted.get(&index).copied().unwrap_or(true)
        }
    }

    impl MediaSlots for RecordingSlots {
        fn attach(&mut self, index: usize) {
            assert!(self.attached.insert(index), "double attach of {}", index);
            self.muted.insert(index, true);
            self.events.push(SlotEvent::Attach(index));
        }

        fn release(&mut self, index: usize) {
            assert!(self.attached.remove(&index), "release of detached {}", index);
            self.playing.remove(&index);
            self.muted.remove(&index);
            self.events.push(SlotEvent::Release(index));
        }

        fn play(&mut self, index: usize) {
            assert!(self.attached.contains(&index), "play before attach of {}", index);
            self.playing.insert(index);
            self.events.push(SlotEvent::Play(index));
        }

        fn pause(&mut self, index: usize) {
            self.playing.remove(&index);
            self.events.push(SlotEvent::Pause(index));
        }

        fn set_muted(&mut self, index: usize, muted: bool) {
            self.muted.insert(index, muted);
            self.events.push(SlotEvent::Muted(index, muted));
        }

        fn removed(&mut self, index: usize) {
            let shift = |i: usize| if i > index { i - 1 } else { i };
            self.attached = self.attached.iter().map(|&i| shift(i)).collect();
            self.playing = self.playing.iter().map(|&i| shift(i)).collect();
            self.muted = self.muted.iter().map(|(&i, &m)| (shift(i), m)).collect();
        }
    }
}
