use strum::{EnumIter, EnumString};

use crate::entry::{EntryId, QueueEntry, dedup_by_id};
use crate::error::{QueueError, Result};
use crate::events::QueueEvent;
use crate::random::{RandomSource, RngSource, fisher_yates};

/// Behaviour at the boundaries of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum RepeatMode {
    #[default]
    #[strum(to_string = "off", serialize = "none", serialize = "no-repeat")]
    Off,
    /// Replay the current entry on every navigation
    #[strum(
        to_string = "one",
        serialize = "single",
        serialize = "repeat-one",
        serialize = "repeat_one"
    )]
    One,
    /// Wrap around at either end
    #[strum(
        to_string = "all",
        serialize = "loop",
        serialize = "repeat-all",
        serialize = "repeat_all"
    )]
    All,
}

impl RepeatMode {
    /// Next mode in the repeat button cycle: off, all, one.
    pub fn cycle(self) -> RepeatMode {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Position of the queue's "current" entry.
///
/// `shuffle_order` is present only while shuffle is on; it is then a
/// permutation of `[0, len)` and `shuffle_order[shuffle_position]` is always
/// `current_index`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackCursor {
    pub current_index: usize,
    pub shuffle_order: Option<Vec<usize>>,
    pub shuffle_position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// The playback queue state.
///
/// Every mutation records the notifications it implies; callers collect
/// them with [`PlaybackQueue::drain_events`]. The managers in
/// [`crate::manager`] do that and hand them to listeners.
pub struct PlaybackQueue {
    entries: Vec<QueueEntry>,
    cursor: PlaybackCursor,
    repeat_mode: RepeatMode,
    /// Wrap at the ends of the shuffle order even when repeat is off
    shuffle_wraps: bool,
    rng: Box<dyn RandomSource>,
    pending: Vec<QueueEvent>,
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaybackQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackQueue")
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("repeat_mode", &self.repeat_mode)
            .field("shuffle_wraps", &self.shuffle_wraps)
            .finish()
    }
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::with_random_source(Box::new(RngSource::from_entropy()))
    }

    pub fn with_random_source(rng: Box<dyn RandomSource>) -> Self {
        Self {
            entries: Vec::new(),
            cursor: PlaybackCursor::default(),
            repeat_mode: RepeatMode::default(),
            shuffle_wraps: false,
            rng,
            pending: Vec::new(),
        }
    }

    /// Make shuffled navigation wrap at the ends of the order regardless of
    /// repeat mode.
    pub fn set_shuffle_wraps(&mut self, wraps: bool) {
        self.shuffle_wraps = wraps;
    }

    // ==============================================
    // Mutations
    // ==============================================

    /// Replace the whole queue. An empty batch is rejected and leaves the
    /// previous queue and cursor untouched.
    pub fn set_queue(&mut self, entries: Vec<QueueEntry>) -> Result<()> {
        if entries.is_empty() {
            log::warn!("Refusing to replace the queue with an empty batch");
            return Err(QueueError::InvalidArgument(
                "cannot replace the queue with an empty batch".to_string(),
            ));
        }

        let offered = entries.len();
        self.entries = dedup_by_id(entries);
        if self.entries.len() != offered {
            log::debug!(
                "Dropped {} duplicate entries from batch",
                offered - self.entries.len()
            );
        }

        self.cursor.current_index = 0;
        self.cursor.shuffle_position = 0;
        if self.shuffle_enabled() {
            self.reshuffle();
        }

        log::info!("Queue replaced with {} entries", self.entries.len());
        self.emit_queue_changed();
        self.emit_playback_changed();
        Ok(())
    }

    /// Insert an entry at `at` (default: the end). Duplicates are allowed.
    pub fn add_entry(&mut self, entry: QueueEntry, at: Option<usize>) -> Result<()> {
        let len = self.entries.len();
        let pos = at.unwrap_or(len);
        if pos > len {
            return Err(QueueError::OutOfRange { index: pos, len });
        }

        let before = self.current_id();
        self.entries.insert(pos, entry);
        if len > 0 && pos <= self.cursor.current_index {
            self.cursor.current_index += 1;
        }

        if let Some(order) = self.cursor.shuffle_order.as_mut() {
            for idx in order.iter_mut() {
                if *idx >= pos {
                    *idx += 1;
                }
            }
            // New entry goes somewhere in the part of the order not yet played
            let tail_start = if order.is_empty() {
                0
            } else {
                self.cursor.shuffle_position + 1
            };
            let slot = tail_start + self.rng.next_below(order.len() - tail_start + 1);
            order.insert(slot, pos);
        }
        self.relocate_shuffle_position();

        log::debug!("Added entry at {} (queue length {})", pos, self.entries.len());
        self.emit_queue_changed();
        if self.current_id() != before {
            self.emit_playback_changed();
        }
        Ok(())
    }

    /// Remove and return the entry at `pos`.
    ///
    /// Removing the current entry leaves the cursor on whatever slid into
    /// its slot, clamped to the new last index.
    pub fn remove_entry(&mut self, pos: usize) -> Result<QueueEntry> {
        let len = self.entries.len();
        if pos >= len {
            return Err(QueueError::OutOfRange { index: pos, len });
        }

        let before = self.current_id();
        let removed = self.entries.remove(pos);

        let current = self.cursor.current_index;
        if pos < current {
            self.cursor.current_index = current - 1;
        } else if pos == current && current >= self.entries.len() {
            self.cursor.current_index = self.entries.len().saturating_sub(1);
        }

        if let Some(order) = self.cursor.shuffle_order.as_mut() {
            order.retain(|&idx| idx != pos);
            for idx in order.iter_mut() {
                if *idx > pos {
                    *idx -= 1;
                }
            }
        }
        self.relocate_shuffle_position();

        log::debug!(
            "Removed entry {} at {}, cursor now {}",
            removed.id(),
            pos,
            self.cursor.current_index
        );
        self.emit_queue_changed();
        if self.current_id() != before {
            self.emit_playback_changed();
        }
        Ok(removed)
    }

    /// Empty the queue. Shuffle and repeat modes are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor.current_index = 0;
        self.cursor.shuffle_position = 0;
        if let Some(order) = self.cursor.shuffle_order.as_mut() {
            order.clear();
        }
        self.emit_queue_changed();
        self.emit_playback_changed();
    }

    /// Advance and return the new current entry.
    pub fn next(&mut self) -> Option<QueueEntry> {
        self.navigate(Direction::Forward)
    }

    /// Step back and return the new current entry.
    pub fn previous(&mut self) -> Option<QueueEntry> {
        self.navigate(Direction::Backward)
    }

    /// Jump to a natural-order index.
    pub fn seek_to_index(&mut self, index: usize) -> Result<()> {
        let len = self.entries.len();
        if index >= len {
            return Err(QueueError::OutOfRange { index, len });
        }
        self.cursor.current_index = index;
        self.relocate_shuffle_position();
        self.emit_playback_changed();
        Ok(())
    }

    /// Turning shuffle on always draws a fresh permutation; turning it off
    /// keeps the current entry and discards the order.
    pub fn set_shuffle_mode(&mut self, enabled: bool) {
        if enabled {
            self.reshuffle();
        } else {
            self.cursor.shuffle_order = None;
            self.cursor.shuffle_position = 0;
        }
        log::debug!("Shuffle {}", if enabled { "on" } else { "off" });
        self.emit_playback_changed();
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
        log::debug!("Repeat mode {}", mode);
        self.emit_playback_changed();
    }

    // ==============================================
    // Reads
    // ==============================================

    pub fn current_entry(&self) -> Option<QueueEntry> {
        self.entries.get(self.cursor.current_index).cloned()
    }

    /// What `next` would return, without moving.
    pub fn peek_next(&self) -> Option<QueueEntry> {
        self.resolve(Direction::Forward)
            .and_then(|(idx, _)| self.entries.get(idx).cloned())
    }

    /// What `previous` would return, without moving.
    pub fn peek_previous(&self) -> Option<QueueEntry> {
        self.resolve(Direction::Backward)
            .and_then(|(idx, _)| self.entries.get(idx).cloned())
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.cursor.current_index
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor.clone()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.cursor.shuffle_order.is_some()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Take the notifications recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.pending)
    }

    // ==============================================
    // Internals
    // ==============================================

    /// Resolve the target of a navigation step as
    /// `(natural index, shuffle position)`, or `None` when there is nowhere
    /// to go.
    fn resolve(&self, direction: Direction) -> Option<(usize, usize)> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let current = self.cursor.current_index;
        let position = self.cursor.shuffle_position;

        if self.repeat_mode == RepeatMode::One {
            return Some((current, position));
        }

        if let Some(order) = &self.cursor.shuffle_order {
            let n = order.len();
            let wrap = self.repeat_mode == RepeatMode::All || self.shuffle_wraps;
            let target = match direction {
                Direction::Forward if position + 1 < n => position + 1,
                Direction::Forward if wrap => 0,
                Direction::Backward if position > 0 => position - 1,
                Direction::Backward if wrap => n.checked_sub(1)?,
                _ => return None,
            };
            return order.get(target).map(|&idx| (idx, target));
        }

        let wrap = self.repeat_mode == RepeatMode::All;
        let target = match direction {
            Direction::Forward if current + 1 < len => current + 1,
            Direction::Forward if wrap => 0,
            Direction::Backward if current > 0 => current - 1,
            Direction::Backward if wrap => len - 1,
            _ => return None,
        };
        Some((target, position))
    }

    fn navigate(&mut self, direction: Direction) -> Option<QueueEntry> {
        let (index, position) = self.resolve(direction)?;
        self.cursor.current_index = index;
        self.cursor.shuffle_position = position;
        log::debug!("Moved {:?} to index {}", direction, index);
        self.emit_playback_changed();
        self.current_entry()
    }

    fn reshuffle(&mut self) {
        let order = fisher_yates(self.entries.len(), self.rng.as_mut());
        self.cursor.shuffle_order = Some(order);
        self.relocate_shuffle_position();
    }

    fn relocate_shuffle_position(&mut self) {
        if let Some(order) = &self.cursor.shuffle_order {
            let current = self.cursor.current_index;
            self.cursor.shuffle_position =
                order.iter().position(|&idx| idx == current).unwrap_or(0);
        }
    }

    fn current_id(&self) -> Option<EntryId> {
        self.entries
            .get(self.cursor.current_index)
            .map(QueueEntry::id)
    }

    fn emit_queue_changed(&mut self) {
        self.pending.push(QueueEvent::QueueChanged {
            entries: self.entries.clone(),
            current_index: self.cursor.current_index,
        });
    }

    fn emit_playback_changed(&mut self) {
        self.pending.push(QueueEvent::PlaybackChanged {
            current: self.current_entry(),
            current_index: self.cursor.current_index,
        });
    }
}
