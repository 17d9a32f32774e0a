use std::fs;
use std::io::Cursor;

use hover_core::{EntryId, MediaKind, QueueEntry, RepeatMode, RngSource};

use super::*;

fn manager_with(names: &[&str]) -> QueueManager {
    let mut manager = QueueManager::with_random_source(Box::new(RngSource::seeded(11)));
    let entries = names
        .iter()
        .enumerate()
        .map(|(i, name)| QueueEntry::new(EntryId(i as u64), *name, format!("/m/{name}"), MediaKind::Video))
        .collect();
    manager.set_queue(entries).unwrap();
    manager
}

fn run(manager: QueueManager, script: &str) -> (String, QueueManager) {
    let mut out = Vec::new();
    let manager = {
        let options = ScanOptions {
            probe_durations: false,
            ..Default::default()
        };
        let mut shell = Shell::new(manager, &mut out, options);
        shell.run(Cursor::new(script)).unwrap();
        shell.into_manager()
    };
    (String::from_utf8(out).unwrap(), manager)
}

#[test]
fn navigation_reports_now_playing() {
    let (out, manager) = run(manager_with(&["a.mp4", "b.mp4"]), "next\nnext\n");
    assert!(out.contains("now playing [1] b.mp4"));
    assert!(out.contains("end of queue"));
    assert_eq!(manager.queue().current_index(), 1);
}

#[test]
fn quit_stops_reading() {
    let (out, manager) = run(manager_with(&["a.mp4", "b.mp4"]), "quit\nnext\n");
    assert!(!out.contains("now playing"));
    assert_eq!(manager.queue().current_index(), 0);
}

#[test]
fn bad_lines_and_rejected_operations_are_reported() {
    let (out, _) = run(manager_with(&["a.mp4"]), "dance\nseek 5\nremove 9\n");
    assert!(out.contains("error: unknown command `dance`"));
    assert!(out.contains("error: index 5 out of range for queue of length 1"));
    assert!(out.contains("error: index 9 out of range"));
}

#[test]
fn modes_and_listing() {
    let (out, manager) = run(
        manager_with(&["a.mp4", "b.mp4", "c.mp4"]),
        "repeat all\nprev\nlist\nshuffle toggle\n",
    );
    assert!(out.contains("repeat all"));
    assert!(out.contains("now playing [2] c.mp4"));
    assert!(out.contains(">   2  c.mp4"));
    assert!(out.contains("shuffle on"));
    assert_eq!(manager.queue().repeat_mode(), RepeatMode::All);
    assert!(manager.queue().shuffle_enabled());
}

#[test]
fn add_reads_the_file_and_remove_drops_it() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("new clip.webm");
    fs::write(&clip, b"xx").unwrap();

    let script = format!("add {} at 0\nlist\nremove 0\nadd {}\n", clip.display(), dir.path().join("gone.mp4").display());
    let (out, manager) = run(manager_with(&["a.mp4"]), &script);
    assert!(out.contains("queue: 2 entries"));
    assert!(out.contains("  0  new clip.webm [video]"));
    assert!(out.contains("removed new clip.webm"));
    assert!(out.contains("error: Cannot stat"));
    assert_eq!(manager.queue().len(), 1);
}

#[test]
fn clear_then_current() {
    let (out, manager) = run(manager_with(&["a.mp4"]), "clear\ncurrent\npeek\n");
    assert!(out.contains("nothing to play"));
    assert!(out.contains("queue is empty"));
    assert!(out.contains("next:     -"));
    assert!(manager.queue().is_empty());
}

#[test]
fn browse_lists_folders_then_media() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("Shows")).unwrap();
    fs::write(dir.path().join("song.flac"), b"x").unwrap();
    fs::write(dir.path().join("readme.txt"), b"x").unwrap();

    let script = format!(
        "browse {}\nbrowse {}\n",
        dir.path().display(),
        dir.path().join("nope").display()
    );
    let (out, manager) = run(manager_with(&["a.mp4"]), &script);
    let listed: Vec<&str> = out
        .lines()
        .filter_map(|line| line.strip_prefix("hover>   ").or(line.strip_prefix("  ")))
        .collect();
    assert_eq!(listed, vec!["../", "Shows/", "song.flac [audio]"]);
    assert!(out.contains("is not a directory"));
    assert_eq!(manager.queue().len(), 1);
}
