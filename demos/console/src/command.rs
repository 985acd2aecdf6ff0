//! Console command parsing.

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Ping,
    Stop,
    Forward,
    Backward,
    Left,
    Right,
    Head(HeadMove),
    EnterDriverMode,
    ExitDriverMode,
    View(String),
    Alert(String),
    Killswitch(bool),
    Block(String),
    Unblock(String),
    KillswitchState,
    Snapshot,
    Logs(Option<String>),
    UpTime,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadMove {
    Up,
    Down,
    Left,
    Right,
    Reset,
}

pub const HELP: &str = "\
commands:
  status                      show session state
  ping | stop
  forward | backward | left | right
  head up|down|left|right|reset
  drive                       enter driver mode
  exit                        exit driver mode
  view <path>                 switch view (e.g. /drive, /developer)
  alert <text>                broadcast an alert to all clients
  killswitch on|off           developer: block or allow rover interaction
  block <ip> | unblock <ip>   developer: block or unblock an ip address
  killswitch-state            ask the server for the killswitch state
  snapshot | logs [since] | uptime
  quit";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid argument for {command}: {value}")]
    InvalidArgument { command: &'static str, value: String },
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let required = |command: &'static str| {
            if rest.is_empty() {
                Err(ParseError::MissingArgument(command))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word {
            "" => return Err(ParseError::Empty),
            "help" | "?" => Command::Help,
            "status" => Command::Status,
            "ping" => Command::Ping,
            "stop" => Command::Stop,
            "forward" => Command::Forward,
            "backward" => Command::Backward,
            "left" => Command::Left,
            "right" => Command::Right,
            "head" => Command::Head(match rest {
                "up" => HeadMove::Up,
                "down" => HeadMove::Down,
                "left" => HeadMove::Left,
                "right" => HeadMove::Right,
                "reset" => HeadMove::Reset,
                "" => return Err(ParseError::MissingArgument("head")),
                other => {
                    return Err(ParseError::InvalidArgument {
                        command: "head",
                        value: other.to_string(),
                    });
                }
            }),
            "drive" => Command::EnterDriverMode,
            "exit" => Command::ExitDriverMode,
            "view" => Command::View(required("view")?),
            "alert" => Command::Alert(required("alert")?),
            "killswitch" => Command::Killswitch(match rest {
                "on" => true,
                "off" => false,
                "" => return Err(ParseError::MissingArgument("killswitch")),
                other => {
                    return Err(ParseError::InvalidArgument {
                        command: "killswitch",
                        value: other.to_string(),
                    });
                }
            }),
            "block" => Command::Block(required("block")?),
            "unblock" => Command::Unblock(required("unblock")?),
            "killswitch-state" => Command::KillswitchState,
            "snapshot" => Command::Snapshot,
            "logs" => Command::Logs((!rest.is_empty()).then(|| rest.to_string())),
            "uptime" => Command::UpTime,
            "quit" | "q" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_commands() {
        assert_eq!("forward".parse(), Ok(Command::Forward));
        assert_eq!("  drive ".parse(), Ok(Command::EnterDriverMode));
        assert_eq!("head reset".parse(), Ok(Command::Head(HeadMove::Reset)));
        assert_eq!("logs".parse(), Ok(Command::Logs(None)));
        assert_eq!(
            "logs 2026-10-19 12:00".parse(),
            Ok(Command::Logs(Some("2026-10-19 12:00".into())))
        );
    }

    #[test]
    fn arguments() {
        assert_eq!(
            "alert rover is moving".parse(),
            Ok(Command::Alert("rover is moving".into()))
        );
        assert_eq!("killswitch on".parse(), Ok(Command::Killswitch(true)));
        assert_eq!(
            "block".parse::<Command>(),
            Err(ParseError::MissingArgument("block"))
        );
        assert!(matches!(
            "head sideways".parse::<Command>(),
            Err(ParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn rejects_unknown() {
        assert_eq!("".parse::<Command>(), Err(ParseError::Empty));
        assert_eq!(
            "jump".parse::<Command>(),
            Err(ParseError::Unknown("jump".into()))
        );
    }
}
