//! Rules engine and round lifecycle for single-player chip blackjack.
//!
//! A [`Table`] owns the bankroll, the deck and the live round. The presentation layer
//! drives it with [`Action`]s, renders [`Snapshot`]s, and pulls the dealer's play one
//! [`Step`] at a time so it can pace the reveal.
mod action;
mod card;
mod deck;
mod error;
mod game_state;
mod hand;
mod rules;
mod settlement;
mod snapshot;

pub use action::{Action, Event, Seat};
pub use card::{Card, Rank, Suit};
pub use deck::Deck;
pub use error::{EngineError, ParseCardError, Result, RulesError};
pub use game_state::{DealerPlay, Phase, Round, Step, Table};
pub use hand::{can_split_cards, card_value, hand_sum, is_blackjack, is_busted, Hand};
pub use rules::{
    HouseEdge, HouseEdgeSource, PayoutRatio, TableRules, DEALER_STANDS_ON, MAX_BANKROLL,
    MIN_RESHUFFLE_THRESHOLD,
};
pub use settlement::{settle_hand, settle_round, HandOutcome, HandResult, RoundResult};
pub use snapshot::{HandView, Snapshot};
