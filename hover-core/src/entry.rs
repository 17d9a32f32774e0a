use std::collections::HashSet;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use strum::{EnumIter, IntoEnumIterator};

/// Stable identifier of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of media an entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, strum::Display)]
pub enum MediaKind {
    #[strum(serialize = "video")]
    Video,
    #[strum(serialize = "audio")]
    Audio,
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl MediaKind {
    /// File extensions (lowercase, without the dot) of this kind.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => &["mp4", "mkv", "webm", "avi", "mov", "3gp", "flv", "m4v", "ts"],
            MediaKind::Audio => &["mp3", "wav", "flac", "ogg", "m4a", "aac", "opus"],
            MediaKind::Unknown => &[],
        }
    }

    /// Classify a file extension (without the dot), case-insensitively.
    pub fn from_extension(ext: &str) -> MediaKind {
        let ext = ext.to_lowercase();
        MediaKind::iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
            .unwrap_or_default()
    }

    pub fn is_playable(&self) -> bool {
        !matches!(self, MediaKind::Unknown)
    }
}

/// A single playable item in the queue.
///
/// Entries are immutable once built; two entries are equal when their ids
/// are equal, whatever the rest of their fields say.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    id: EntryId,
    name: String,
    duration: Option<Duration>,
    size: u64,
    location: String,
    kind: MediaKind,
}

impl QueueEntry {
    pub fn new(
        id: EntryId,
        name: impl Into<String>,
        location: impl Into<String>,
        kind: MediaKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            duration: None,
            size: 0,
            location: location.into(),
            kind,
        }
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Playback length, `None` when it could not be determined
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// URI or filesystem path of the underlying media
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for QueueEntry {}

impl Hash for QueueEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for QueueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.kind)?;
        match self.duration {
            Some(d) => {
                let secs = d.as_secs();
                write!(f, " {:02}:{:02}", secs / 60, secs % 60)
            }
            None => write!(f, " --:--"),
        }
    }
}

/// Drop entries whose id has already been seen, keeping the first occurrence.
pub fn dedup_by_id(entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id))
        .collect()
}
