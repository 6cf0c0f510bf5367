//! Typed console input. One line is one command.

use chipjack::{Action, HouseEdge};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play(Action),
    /// Operator control: new house edge, read at the next settlement
    Edge(HouseEdge),
    Show,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list of commands")]
    Unknown(String),
    #[error("'{0}' needs a value, e.g. '{0} {1}'")]
    MissingArgument(&'static str, &'static str),
    #[error("'{0}' is not a chip amount")]
    BadAmount(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseCommandError> {
        let mut words = line.split_whitespace();
        let word = words.next().unwrap_or_default().to_ascii_lowercase();

        let command = match word.as_str() {
            "chip" | "c" | "bet" => {
                let amount = words
                    .next()
                    .ok_or(ParseCommandError::MissingArgument("chip", "25"))?;
                Command::Play(Action::PlaceChip(parse_amount(amount)?))
            }
            "clear" => Command::Play(Action::ClearBet),
            "max" => Command::Play(Action::MaxBet),
            "repeat" | "r" => Command::Play(Action::RepeatBet),
            "deal" | "d" => Command::Play(Action::Deal),
            "hit" | "h" => Command::Play(Action::Hit),
            "stand" | "s" => Command::Play(Action::Stand),
            "double" | "dd" => Command::Play(Action::DoubleDown),
            "split" | "p" => Command::Play(Action::Split),
            "edge" => {
                let percent = words
                    .next()
                    .ok_or(ParseCommandError::MissingArgument("edge", "1.5"))?;
                Command::Edge(HouseEdge::parse_percent(percent))
            }
            "show" | "" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            // A bare number places that chip
            other if other.chars().all(|c| c.is_ascii_digit()) => {
                Command::Play(Action::PlaceChip(parse_amount(other)?))
            }
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn parse_amount(word: &str) -> Result<u64, ParseCommandError> {
    word.parse()
        .map_err(|_| ParseCommandError::BadAmount(word.to_string()))
}

/// The command a player types to issue `action`.
pub fn keyword(action: &Action) -> String {
    match action {
        Action::PlaceChip(amount) => format!("chip {amount}"),
        Action::ClearBet => "clear".to_string(),
        Action::MaxBet => "max".to_string(),
        Action::RepeatBet => "repeat".to_string(),
        Action::Deal => "deal".to_string(),
        Action::Hit => "hit".to_string(),
        Action::Stand => "stand".to_string(),
        Action::DoubleDown => "double".to_string(),
        Action::Split => "split".to_string(),
    }
}
