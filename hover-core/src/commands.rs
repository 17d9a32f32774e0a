use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::queue::RepeatMode;

/// Target state for the shuffle switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    Flip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatChoice {
    Set(RepeatMode),
    Cycle,
}

/// Commands a host sends to the queue, one per line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCommand {
    /// Skip to the next entry
    Next,
    /// Go back to the previous entry
    Previous,
    /// Jump to a queue index
    Seek(usize),
    /// Remove the entry at an index
    Remove(usize),
    /// Add a media file, optionally at an index
    Add { path: PathBuf, at: Option<usize> },
    /// List a directory's subfolders and media files
    Browse(PathBuf),
    Shuffle(Toggle),
    Repeat(RepeatChoice),
    /// Print the queue
    List,
    /// Print the current entry
    Current,
    /// Print what previous/next would play
    Peek,
    Clear,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("`{command}` cannot use `{value}`")]
    InvalidArgument { command: &'static str, value: String },
}

pub const HELP: &str = "\
commands:
  next | n                 play the next entry
  prev | p                 play the previous entry
  seek <i>                 jump to entry i
  remove <i>               remove entry i
  add <path> [at <i>]      add a media file (at the end by default)
  browse [dir]             list folders and media in dir (default: .)
  shuffle on|off|toggle    change shuffle
  repeat off|one|all|cycle change repeat mode
  list | ls                show the queue
  current | now            show the current entry
  peek                     show previous and next
  clear                    empty the queue
  help                     show this text
  quit | q                 leave";

fn index_arg(command: &'static str, arg: Option<&str>) -> Result<usize, CommandError> {
    let raw = arg.ok_or(CommandError::MissingArgument {
        command,
        what: "an index",
    })?;
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: raw.to_string(),
    })
}

fn parse_add(rest: &str) -> Result<QueueCommand, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "add",
            what: "a path",
        });
    }
    // Paths may contain spaces, so only a trailing "at <n>" is special
    if let Some((path, idx)) = rest.rsplit_once(" at ") {
        if let Ok(at) = idx.trim().parse::<usize>() {
            return Ok(QueueCommand::Add {
                path: PathBuf::from(path.trim()),
                at: Some(at),
            });
        }
    }
    Ok(QueueCommand::Add {
        path: PathBuf::from(rest),
        at: None,
    })
}

impl FromStr for QueueCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let arg = rest.split_whitespace().next();

        match head.to_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "next" | "n" => Ok(QueueCommand::Next),
            "prev" | "previous" | "p" => Ok(QueueCommand::Previous),
            "seek" => index_arg("seek", arg).map(QueueCommand::Seek),
            "remove" | "rm" => index_arg("remove", arg).map(QueueCommand::Remove),
            "add" => parse_add(rest),
            "browse" | "cd" => Ok(QueueCommand::Browse(PathBuf::from(match rest {
                "" => ".",
                dir => dir,
            }))),
            "shuffle" => match arg.map(str::to_lowercase).as_deref() {
                Some("on") => Ok(QueueCommand::Shuffle(Toggle::On)),
                Some("off") => Ok(QueueCommand::Shuffle(Toggle::Off)),
                Some("toggle") | None => Ok(QueueCommand::Shuffle(Toggle::Flip)),
                Some(other) => Err(CommandError::InvalidArgument {
                    command: "shuffle",
                    value: other.to_string(),
                }),
            },
            "repeat" => match arg {
                None => Ok(QueueCommand::Repeat(RepeatChoice::Cycle)),
                Some(a) if a.eq_ignore_ascii_case("cycle") => {
                    Ok(QueueCommand::Repeat(RepeatChoice::Cycle))
                }
                Some(a) => a
                    .parse::<RepeatMode>()
                    .map(|mode| QueueCommand::Repeat(RepeatChoice::Set(mode)))
                    .map_err(|_| CommandError::InvalidArgument {
                        command: "repeat",
                        value: a.to_string(),
                    }),
            },
            "list" | "ls" => Ok(QueueCommand::List),
            "current" | "now" => Ok(QueueCommand::Current),
            "peek" => Ok(QueueCommand::Peek),
            "clear" => Ok(QueueCommand::Clear),
            "help" | "?" => Ok(QueueCommand::Help),
            "quit" | "q" | "exit" => Ok(QueueCommand::Quit),
            _ => Err(CommandError::Unknown(head.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<QueueCommand, CommandError> {
        line.parse()
    }

    #[test]
    fn parses_navigation_and_modes() {
        assert_eq!(parse("  N "), Ok(QueueCommand::Next));
        assert_eq!(parse("previous"), Ok(QueueCommand::Previous));
        assert_eq!(parse("seek 3"), Ok(QueueCommand::Seek(3)));
        assert_eq!(parse("shuffle"), Ok(QueueCommand::Shuffle(Toggle::Flip)));
        assert_eq!(parse("shuffle OFF"), Ok(QueueCommand::Shuffle(Toggle::Off)));
        assert_eq!(
            parse("repeat all"),
            Ok(QueueCommand::Repeat(RepeatChoice::Set(RepeatMode::All)))
        );
        assert_eq!(parse("repeat"), Ok(QueueCommand::Repeat(RepeatChoice::Cycle)));
    }

    #[test]
    fn add_keeps_spaces_in_paths() {
        assert_eq!(
            parse("add /sdcard/My Movies/clip one.mp4"),
            Ok(QueueCommand::Add {
                path: PathBuf::from("/sdcard/My Movies/clip one.mp4"),
                at: None
            })
        );
        assert_eq!(
            parse("add /tmp/a b.mkv at 2"),
            Ok(QueueCommand::Add {
                path: PathBuf::from("/tmp/a b.mkv"),
                at: Some(2)
            })
        );
    }

    #[test]
    fn browse_defaults_to_the_working_directory() {
        assert_eq!(parse("browse"), Ok(QueueCommand::Browse(PathBuf::from("."))));
        assert_eq!(
            parse("browse /sdcard/My Movies"),
            Ok(QueueCommand::Browse(PathBuf::from("/sdcard/My Movies")))
        );
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(parse("   "), Err(CommandError::Empty));
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".into())));
        assert!(matches!(
            parse("seek"),
            Err(CommandError::MissingArgument { command: "seek", .. })
        ));
        assert!(matches!(
            parse("remove -1"),
            Err(CommandError::InvalidArgument { command: "remove", .. })
        ));
        assert!(matches!(
            parse("repeat twice"),
            Err(CommandError::InvalidArgument { command: "repeat", .. })
        ));
        assert!(matches!(
            parse("add"),
            Err(CommandError::MissingArgument { command: "add", .. })
        ));
    }
}
