use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use lofty::{file::AudioFile, probe::Probe};
use walkdir::{DirEntry, WalkDir};

use crate::entry::{EntryId, MediaKind, QueueEntry};

/// A row of a directory listing
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub kind: MediaKind,
}

/// How `scan` walks the filesystem
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Include dotfiles and dot-directories
    pub include_hidden: bool,
    /// Directory levels below each root to descend, `None` for unlimited
    pub max_depth: Option<usize>,
    /// Read audio durations from the files
    pub probe_durations: bool,
    /// Descend through symlinked directories; loops are detected and skipped
    pub follow_links: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            include_hidden: false,
            max_depth: None,
            probe_durations: true,
            follow_links: true,
        }
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != ".."
}

fn kind_of(path: &Path) -> MediaKind {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(MediaKind::from_extension)
        .unwrap_or_default()
}

/// Id derived from the path, so the same file always gets the same id
/// within a process.
pub fn entry_id_for(path: &Path) -> EntryId {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    EntryId(hasher.finish())
}

/// Build a queue entry for a single media file.
pub fn entry_from_path(path: &Path, probe: bool) -> anyhow::Result<QueueEntry> {
    let meta = fs::metadata(path).with_context(|| format!("Cannot stat {}", path.display()))?;
    anyhow::ensure!(meta.is_file(), "{} is not a file", path.display());

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("???")
        .to_string();
    let kind = kind_of(path);
    let duration = if probe && kind == MediaKind::Audio {
        probe_duration(path)
    } else {
        None
    };

    Ok(
        QueueEntry::new(entry_id_for(path), name, path.to_string_lossy(), kind)
            .with_size(meta.len())
            .with_duration(duration),
    )
}

fn probe_duration(path: &Path) -> Option<Duration> {
    match Probe::open(path).and_then(|p| p.read()) {
        Ok(tagged_file) => {
            let duration = tagged_file.properties().duration();
            (!duration.is_zero()).then_some(duration)
        }
        Err(e) => {
            log::warn!("Failed to probe duration of {}: {}", path.display(), e);
            None
        }
    }
}

/// Collect playable media under `roots` (files or directories), in order.
///
/// Files inside a directory come first, sorted case-insensitively, then its
/// subdirectories in the same order. Unreadable subdirectories and symlink
/// loops are skipped with a warning; an unreadable root is an error.
pub fn scan(roots: &[PathBuf], options: &ScanOptions) -> anyhow::Result<Vec<QueueEntry>> {
    let mut out = Vec::new();
    for root in roots {
        let meta =
            fs::metadata(root).with_context(|| format!("Cannot open {}", root.display()))?;
        if meta.is_dir() {
            walk(root, options, &mut out)?;
        } else if kind_of(root).is_playable() {
            out.push(entry_from_path(root, options.probe_durations)?);
        } else {
            log::debug!("Skipping non-media file {}", root.display());
        }
    }
    log::info!("Scanned {} media files from {} roots", out.len(), roots.len());
    Ok(out)
}

fn sort_key(entry: &DirEntry) -> (bool, String) {
    (
        entry.file_type().is_dir(),
        entry.file_name().to_string_lossy().to_lowercase(),
    )
}

fn walk(root: &Path, options: &ScanOptions, out: &mut Vec<QueueEntry>) -> anyhow::Result<()> {
    // Depth 1 is the root's own files; each allowed level adds one.
    let depth_cap = if options.recursive {
        options.max_depth.map(|max| max.saturating_add(1))
    } else {
        Some(1)
    };

    let mut walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by(|a, b| {
            sort_key(a)
                .cmp(&sort_key(b))
                .then_with(|| a.file_name().cmp(b.file_name()))
        });
    if let Some(depth) = depth_cap {
        walker = walker.max_depth(depth);
    }

    let include_hidden = options.include_hidden;
    let entries = walker.into_iter().filter_entry(move |e| {
        include_hidden || e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy())
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Cannot read directory {}", root.display()));
            }
            Err(e) => {
                log::warn!("Skipping {}", e);
                continue;
            }
        };
        if entry.file_type().is_dir() || !kind_of(entry.path()).is_playable() {
            continue;
        }
        match entry_from_path(entry.path(), options.probe_durations) {
            Ok(queued) => out.push(queued),
            Err(e) => log::warn!("Skipping {}: {:#}", entry.path().display(), e),
        }
    }
    Ok(())
}

/// One directory's browsable content for the `browse` command: a `..`
/// entry when there is a parent, then subdirectories, then media files,
/// each group sorted case-insensitively. Other files are left out.
pub fn list_directory(dir: &Path, include_hidden: bool) -> anyhow::Result<Vec<FileEntry>> {
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let mut listing = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping {}", e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if !include_hidden && is_hidden(&name) {
            continue;
        }
        // Resolve symlinks so a linked folder browses like a folder
        let is_dir = entry.path().is_dir();
        let kind = if is_dir {
            MediaKind::Unknown
        } else {
            kind_of(entry.path())
        };
        if is_dir || kind.is_playable() {
            listing.push(FileEntry {
                name,
                path: entry.into_path(),
                is_dir,
                kind,
            });
        }
    }

    listing.sort_by_cached_key(|e| (!e.is_dir, e.name.to_lowercase()));

    if let Some(parent) = dir.parent() {
        listing.insert(
            0,
            FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
                kind: MediaKind::Unknown,
            },
        );
    }
    Ok(listing)
}
