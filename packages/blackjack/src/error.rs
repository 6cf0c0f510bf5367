use thiserror::Error;

use crate::Action;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors reported at the action boundary. A rejected action leaves the table untouched,
/// except for `DeckExhausted` which aborts the round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid bet of {bet} with bankroll {bankroll}: {reason}")]
    InvalidBet {
        bet: u64,
        bankroll: u64,
        reason: &'static str,
    },
    #[error("Cannot {action} now: {reason}")]
    IllegalAction {
        action: Action,
        reason: &'static str,
    },
    #[error("Deck exhausted mid-round")]
    DeckExhausted,
}

/// Rejected table rule configurations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Payout denominator cannot be zero")]
    ZeroDenominator,
    #[error("Reshuffle threshold {threshold} is below the minimum of {required} cards")]
    ThresholdTooLow { threshold: usize, required: usize },
    #[error("Reshuffle threshold {0} exceeds the 52-card deck")]
    ThresholdTooHigh(usize),
    #[error("At least one player hand must be allowed")]
    NoHands,
    #[error("Chip set must contain at least one non-zero chip")]
    NoChips,
    #[error("Starting bankroll must be positive")]
    EmptyBankroll,
    #[error("Starting bankroll {bankroll} exceeds the maximum of {max}")]
    BankrollTooLarge { bankroll: u64, max: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognised card code '{0}'")]
pub struct ParseCardError(pub String);
