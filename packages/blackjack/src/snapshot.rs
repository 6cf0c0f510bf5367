//! Read-only view of the table handed to the presentation layer.
//!
//! The presentation never mutates engine state; it renders the latest snapshot and
//! issues [`Action`]s. The dealer's hole card is reported only as present or absent.

use serde::{Deserialize, Serialize};

use crate::game_state::Phase;
use crate::hand::Hand;
use crate::settlement::RoundResult;
use crate::{Action, Card};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandView {
    pub cards: Vec<Card>,
    pub bet: u64,
    pub finished: bool,
    pub sum: u8,
}

impl From<&Hand> for HandView {
    fn from(hand: &Hand) -> Self {
        Self {
            cards: hand.cards.clone(),
            bet: hand.bet,
            finished: hand.finished,
            sum: hand.sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub bankroll: u64,
    pub current_bet: u64,
    pub last_bet: u64,
    pub phase: Phase,
    pub dealer_cards: Vec<Card>,
    pub dealer_hole_card: bool,
    /// Total of the face-up dealer cards only.
    pub dealer_sum: u8,
    pub player_hands: Vec<HandView>,
    pub current_hand_index: usize,
    pub cards_remaining: usize,
    pub actions: Vec<Action>,
    pub last_result: Option<RoundResult>,
}

impl Snapshot {
    pub fn current_hand(&self) -> Option<&HandView> {
        if self.phase == Phase::PlayerTurn {
            self.player_hands.get(self.current_hand_index)
        } else {
            None
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}
