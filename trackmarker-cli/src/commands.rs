//! Command parsing for the operator REPL.
//!
//! Argument counts are validated by a pure function before any action is
//! built, so a malformed line never reaches the queue. Display-only
//! commands (`show`, `help`) map to no action at all; the REPL answers
//! them locally from the shared view.

use std::path::PathBuf;

use trackmarker_core::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadTrack(PathBuf),
    Save(Option<PathBuf>),
    LoadMarkers(PathBuf),
    Show(Vec<String>),
    AddChannel(String),
    RemoveChannel(String),
    Record(Option<String>),
    Mark,
    Stop,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand(String),
    WrongArity {
        command: &'static str,
        min: usize,
        max: usize,
        given: usize,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownCommand(name) => {
                write!(f, "unknown command '{}' (try 'help')", name)
            }
            Self::WrongArity { command, min, max, given } => {
                if min == max {
                    write!(f, "{}: expected {} argument(s), got {}", command, min, given)
                } else {
                    write!(
                        f,
                        "{}: expected {} to {} arguments, got {}",
                        command, min, max, given
                    )
                }
            }
        }
    }
}

/// Check the argument count falls in `[min, max]`.
fn check_arity(
    command: &'static str,
    args: &[&str],
    min: usize,
    max: usize,
) -> Result<(), ParseError> {
    if args.len() < min || args.len() > max {
        return Err(ParseError::WrongArity { command, min, max, given: args.len() });
    }
    Ok(())
}

/// Parse one input line. Arguments are whitespace-separated.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err(ParseError::Empty);
    };
    let args: Vec<&str> = words.collect();

    match name {
        "ogg" => {
            check_arity("ogg", &args, 1, 1)?;
            Ok(Command::LoadTrack(PathBuf::from(args[0])))
        }
        "save" => {
            check_arity("save", &args, 0, 1)?;
            Ok(Command::Save(args.first().map(|s| PathBuf::from(*s))))
        }
        "load" => {
            check_arity("load", &args, 1, 1)?;
            Ok(Command::LoadMarkers(PathBuf::from(args[0])))
        }
        "show" => Ok(Command::Show(args.iter().map(|s| s.to_string()).collect())),
        "add" => {
            check_arity("add", &args, 1, 1)?;
            Ok(Command::AddChannel(args[0].to_string()))
        }
        "del" => {
            check_arity("del", &args, 1, 1)?;
            Ok(Command::RemoveChannel(args[0].to_string()))
        }
        "rec" => {
            check_arity("rec", &args, 0, 1)?;
            Ok(Command::Record(args.first().map(|s| s.to_string())))
        }
        "mark" => {
            check_arity("mark", &args, 0, 0)?;
            Ok(Command::Mark)
        }
        "stop" => {
            check_arity("stop", &args, 0, 0)?;
            Ok(Command::Stop)
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => {
            check_arity("quit", &args, 0, 0)?;
            Ok(Command::Quit)
        }
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

/// Map a command to its queued action. Display-only commands return None.
pub fn to_action(command: Command) -> Option<Action> {
    match command {
        Command::LoadTrack(path) => Some(Action::LoadTrack(path)),
        Command::Save(path) => Some(Action::Save(path)),
        Command::LoadMarkers(path) => Some(Action::LoadMarkers(path)),
        Command::AddChannel(name) => Some(Action::AddChannel(name)),
        Command::RemoveChannel(name) => Some(Action::RemoveChannel(name)),
        Command::Record(name) => Some(Action::ToggleRecord(name)),
        Command::Mark => Some(Action::Mark),
        Command::Stop => Some(Action::StopPlayback),
        Command::Quit => Some(Action::Quit),
        Command::Show(_) | Command::Help => None,
    }
}

pub const HELP: &str = "\
ogg <path>     load an audio track
rec [name]     toggle recording on a channel (created if missing)
mark           record a marker at the current position
stop           stop playback, keeping the position
add <name>     create an empty channel
del <name>     remove a channel
show [names]   display track, file and markers
save [path]    write markers to a JSON file
load <path>    replace markers from a JSON file
quit           exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        assert_eq!(
            parse_line("ogg song.ogg"),
            Ok(Command::LoadTrack(PathBuf::from("song.ogg")))
        );
        assert_eq!(parse_line("save"), Ok(Command::Save(None)));
        assert_eq!(
            parse_line("save out.json"),
            Ok(Command::Save(Some(PathBuf::from("out.json"))))
        );
        assert_eq!(
            parse_line("load out.json"),
            Ok(Command::LoadMarkers(PathBuf::from("out.json")))
        );
        assert_eq!(parse_line("show"), Ok(Command::Show(vec![])));
        assert_eq!(
            parse_line("show jump beat"),
            Ok(Command::Show(vec!["jump".into(), "beat".into()]))
        );
        assert_eq!(parse_line("add jump"), Ok(Command::AddChannel("jump".into())));
        assert_eq!(parse_line("del jump"), Ok(Command::RemoveChannel("jump".into())));
        assert_eq!(parse_line("rec"), Ok(Command::Record(None)));
        assert_eq!(parse_line("rec jump"), Ok(Command::Record(Some("jump".into()))));
        assert_eq!(parse_line("mark"), Ok(Command::Mark));
        assert_eq!(parse_line("stop"), Ok(Command::Stop));
        assert_eq!(parse_line("help"), Ok(Command::Help));
        assert_eq!(parse_line("quit"), Ok(Command::Quit));
        assert_eq!(parse_line("exit"), Ok(Command::Quit));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            parse_line("  add   jump  \n"),
            Ok(Command::AddChannel("jump".into()))
        );
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(parse_line(""), Err(ParseError::Empty));
        assert_eq!(parse_line("   \n"), Err(ParseError::Empty));
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert_eq!(
            parse_line("frobnicate now"),
            Err(ParseError::UnknownCommand("frobnicate".into()))
        );
    }

    #[test]
    fn arity_is_checked_before_dispatch() {
        assert_eq!(
            parse_line("ogg"),
            Err(ParseError::WrongArity { command: "ogg", min: 1, max: 1, given: 0 })
        );
        assert_eq!(
            parse_line("add a b"),
            Err(ParseError::WrongArity { command: "add", min: 1, max: 1, given: 2 })
        );
        assert_eq!(
            parse_line("rec a b"),
            Err(ParseError::WrongArity { command: "rec", min: 0, max: 1, given: 2 })
        );
        assert_eq!(
            parse_line("save a b"),
            Err(ParseError::WrongArity { command: "save", min: 0, max: 1, given: 2 })
        );
        assert_eq!(
            parse_line("mark now"),
            Err(ParseError::WrongArity { command: "mark", min: 0, max: 0, given: 1 })
        );
    }

    #[test]
    fn arity_messages_read_well() {
        let exact = ParseError::WrongArity { command: "add", min: 1, max: 1, given: 3 };
        assert_eq!(exact.to_string(), "add: expected 1 argument(s), got 3");
        let range = ParseError::WrongArity { command: "rec", min: 0, max: 1, given: 2 };
        assert_eq!(range.to_string(), "rec: expected 0 to 1 arguments, got 2");
    }

    #[test]
    fn display_commands_map_to_no_action() {
        assert_eq!(to_action(Command::Show(vec![])), None);
        assert_eq!(to_action(Command::Help), None);
        assert_eq!(to_action(Command::Mark), Some(Action::Mark));
        assert_eq!(
            to_action(Command::Record(Some("jump".into()))),
            Some(Action::ToggleRecord(Some("jump".into())))
        );
    }
}
