use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use crossbeam_channel::Receiver;
use hover_core::{
    QueueEvent, QueueManager,
    browser::{self, ScanOptions},
    commands::{HELP, QueueCommand, RepeatChoice, Toggle},
};

/// Line-oriented front end: one command in, its output and the queue's
/// notifications out.
pub struct Shell<W: Write> {
    manager: QueueManager,
    events: Receiver<QueueEvent>,
    out: W,
    /// Applied to files added or browsed from the prompt
    library: ScanOptions,
}

impl<W: Write> Shell<W> {
    pub fn new(mut manager: QueueManager, out: W, library: ScanOptions) -> Self {
        let (_id, events) = manager.subscribe();
        Self {
            manager,
            events,
            out,
            library,
        }
    }

    #[cfg(test)]
    pub fn into_manager(self) -> QueueManager {
        self.manager
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> anyhow::Result<()> {
        self.prompt()?;
        for line in input.lines() {
            let line = line.context("Failed to read command")?;
            if line.trim().is_empty() {
                self.prompt()?;
                continue;
            }

            let should_quit = match line.parse::<QueueCommand>() {
                Ok(command) => self.execute(command)?,
                Err(e) => {
                    writeln!(self.out, "error: {e}")?;
                    false
                }
            };
            self.report_events()?;
            if should_quit {
                break;
            }
            self.prompt()?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "hover> ")?;
        self.out.flush()
    }

    /// Returns true when the shell should stop.
    fn execute(&mut self, command: QueueCommand) -> anyhow::Result<bool> {
        match command {
            QueueCommand::Next => {
                if self.manager.next().is_none() {
                    writeln!(self.out, "end of queue")?;
                }
            }
            QueueCommand::Previous => {
                if self.manager.previous().is_none() {
                    writeln!(self.out, "start of queue")?;
                }
            }
            QueueCommand::Seek(index) => {
                if let Err(e) = self.manager.seek_to_index(index) {
                    self.report_error(&e)?;
                }
            }
            QueueCommand::Remove(index) => match self.manager.remove_entry(index) {
                Ok(entry) => writeln!(self.out, "removed {entry}")?,
                Err(e) => self.report_error(&e)?,
            },
            QueueCommand::Add { path, at } => {
                match browser::entry_from_path(&path, self.library.probe_durations) {
                    Ok(entry) => {
                        if let Err(e) = self.manager.add_entry(entry, at) {
                            self.report_error(&e)?;
                        }
                    }
                    Err(e) => {
                        log::warn!("Cannot add {}: {:#}", path.display(), e);
                        writeln!(self.out, "error: {e:#}")?;
                    }
                }
            }
            QueueCommand::Browse(dir) => self.print_directory(&dir)?,
            QueueCommand::Shuffle(toggle) => {
                let enabled = match toggle {
                    Toggle::On => true,
                    Toggle::Off => false,
                    Toggle::Flip => !self.manager.queue().shuffle_enabled(),
                };
                self.manager.set_shuffle_mode(enabled);
                writeln!(self.out, "shuffle {}", if enabled { "on" } else { "off" })?;
            }
            QueueCommand::Repeat(choice) => {
                let mode = match choice {
                    RepeatChoice::Set(mode) => mode,
                    RepeatChoice::Cycle => self.manager.queue().repeat_mode().cycle(),
                };
                self.manager.set_repeat_mode(mode);
                writeln!(self.out, "repeat {mode}")?;
            }
            QueueCommand::List => self.print_queue()?,
            QueueCommand::Current => match self.manager.current_entry() {
                Some(entry) => writeln!(
                    self.out,
                    "[{}] {entry}",
                    self.manager.queue().current_index()
                )?,
                None => writeln!(self.out, "queue is empty")?,
            },
            QueueCommand::Peek => {
                let label = |entry: Option<hover_core::QueueEntry>| {
                    entry.map_or_else(|| "-".to_string(), |e| e.to_string())
                };
                let previous = label(self.manager.peek_previous());
                let next = label(self.manager.peek_next());
                writeln!(self.out, "previous: {previous}")?;
                writeln!(self.out, "next:     {next}")?;
            }
            QueueCommand::Clear => self.manager.clear(),
            QueueCommand::Help => writeln!(self.out, "{HELP}")?,
            QueueCommand::Quit => return Ok(true),
        }
        Ok(false)
    }

    fn report_error(&mut self, e: &hover_core::QueueError) -> io::Result<()> {
        log::warn!("Queue operation rejected: {}", e);
        writeln!(self.out, "error: {e}")
    }

    fn print_queue(&mut self) -> io::Result<()> {
        let queue = self.manager.queue();
        if queue.is_empty() {
            return writeln!(self.out, "queue is empty");
        }
        let current = queue.current_index();
        for (i, entry) in queue.entries().iter().enumerate() {
            let marker = if i == current { '>' } else { ' ' };
            writeln!(self.out, "{marker} {i:>3}  {entry}")?;
        }
        writeln!(
            self.out,
            "shuffle {}, repeat {}",
            if queue.shuffle_enabled() { "on" } else { "off" },
            queue.repeat_mode()
        )
    }

    fn print_directory(&mut self, dir: &Path) -> io::Result<()> {
        let listing = match browser::list_directory(dir, self.library.include_hidden) {
            Ok(listing) => listing,
            Err(e) => return writeln!(self.out, "error: {e:#}"),
        };
        for entry in listing {
            if entry.is_dir {
                writeln!(self.out, "  {}/", entry.name)?;
            } else {
                writeln!(self.out, "  {} [{}]", entry.name, entry.kind)?;
            }
        }
        Ok(())
    }

    /// Print notifications produced by the last command
    fn report_events(&mut self) -> io::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            match event {
                QueueEvent::PlaybackChanged {
                    current: Some(entry),
                    current_index,
                } => writeln!(self.out, "now playing [{current_index}] {entry}")?,
                QueueEvent::PlaybackChanged { current: None, .. } => {
                    writeln!(self.out, "nothing to play")?
                }
                QueueEvent::QueueChanged { entries, .. } => {
                    writeln!(self.out, "queue: {} entries", entries.len())?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
