use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game_state::Phase;
use crate::settlement::RoundResult;
use crate::Card;

/// Everything a presentation layer may ask the table to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    PlaceChip(u64),
    ClearBet,
    MaxBet,
    RepeatBet,
    Deal,
    Hit,
    Stand,
    DoubleDown,
    Split,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::PlaceChip(amount) => write!(f, "place a {amount} chip"),
            Action::ClearBet => f.write_str("clear the bet"),
            Action::MaxBet => f.write_str("bet the maximum"),
            Action::RepeatBet => f.write_str("repeat the last bet"),
            Action::Deal => f.write_str("deal"),
            Action::Hit => f.write_str("hit"),
            Action::Stand => f.write_str("stand"),
            Action::DoubleDown => f.write_str("double down"),
            Action::Split => f.write_str("split"),
        }
    }
}

/// Who receives a dealt card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seat {
    Player(usize),
    Dealer,
}

/// One discrete change to the table, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    BetChanged { current_bet: u64 },
    Shuffled,
    BetPlaced { amount: u64 },
    CardDealt { seat: Seat, card: Card },
    HoleCardDealt,
    HoleCardRevealed { card: Card },
    HandSplit { from: usize, into: usize },
    BetDoubled { hand: usize, bet: u64 },
    HandFinished { hand: usize, sum: u8 },
    TurnMoved { hand: usize },
    PhaseChanged { phase: Phase },
    RoundSettled { result: RoundResult },
}
