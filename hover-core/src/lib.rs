//! Playback queue for a floating media player: an ordered list of media
//! entries with next/previous navigation under shuffle and repeat modes,
//! plus the collaborators needed to fill it from the filesystem and to
//! drive it from text commands.

pub mod browser;
pub mod commands;
pub mod entry;
pub mod error;
pub mod events;
pub mod manager;
pub mod queue;
pub mod random;

pub use entry::{EntryId, MediaKind, QueueEntry};
pub use error::QueueError;
pub use events::{ListenerId, QueueEvent};
pub use manager::{QueueManager, SharedQueueManager};
pub use queue::{PlaybackCursor, PlaybackQueue, RepeatMode};
pub use random::{RandomSource, RngSource};
