//! Per-hand outcome classification and payouts.
//!
//! Stakes leave the bankroll when they are placed, so settlement only ever credits:
//! the stake plus the net win for a winning hand, the stake alone for a push, and
//! nothing for a loss.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hand::{hand_sum, Hand};
use crate::rules::{HouseEdge, PayoutRatio};
use crate::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    /// Natural on the only hand of the round, paid at the blackjack ratio.
    Blackjack,
    Win,
    Push,
    Loss,
    Bust,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub hand_index: usize,
    pub outcome: HandOutcome,
    pub bet: u64,
    /// Net win after the house edge. Zero unless the hand won.
    pub win_amount: u64,
    /// Amount credited back to the bankroll at settlement.
    pub credited: u64,
    pub player_sum: u8,
    pub dealer_sum: u8,
}

impl HandResult {
    /// Profit or loss relative to the stake.
    pub fn net(&self) -> i64 {
        match self.outcome {
            HandOutcome::Blackjack | HandOutcome::Win => {
                i64::try_from(self.win_amount).unwrap_or(i64::MAX)
            }
            HandOutcome::Push => 0,
            HandOutcome::Loss | HandOutcome::Bust => {
                i64::try_from(self.bet).map_or(i64::MIN, |bet| -bet)
            }
        }
    }
}

impl fmt::Display for HandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.hand_index + 1;
        match self.outcome {
            HandOutcome::Blackjack => write!(f, "Hand {n} Blackjack! (+{})", self.win_amount),
            HandOutcome::Win => write!(f, "Hand {n} wins (+{})", self.win_amount),
            HandOutcome::Push => write!(f, "Hand {n} is a push"),
            HandOutcome::Loss => write!(f, "Hand {n} loses (-{})", self.bet),
            HandOutcome::Bust => write!(f, "Hand {n} busts (-{})", self.bet),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub hands: Vec<HandResult>,
    pub dealer_sum: u8,
    pub house_edge: HouseEdge,
}

impl RoundResult {
    pub fn net(&self) -> i64 {
        self.hands
            .iter()
            .fold(0i64, |total, h| total.saturating_add(h.net()))
    }

    pub fn total_credited(&self) -> u64 {
        self.hands
            .iter()
            .fold(0u64, |total, h| total.saturating_add(h.credited))
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hand) in self.hands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{hand}.")?;
        }
        Ok(())
    }
}

/// Classify and pay one hand. `sole_hand` is false once the round has been split,
/// which withholds the blackjack bonus.
pub fn settle_hand(
    hand_index: usize,
    hand: &Hand,
    sole_hand: bool,
    dealer_sum: u8,
    blackjack_payout: PayoutRatio,
    house_edge: HouseEdge,
) -> HandResult {
    let player_sum = hand.sum();
    let mut result = HandResult {
        hand_index,
        outcome: HandOutcome::Loss,
        bet: hand.bet,
        win_amount: 0,
        credited: 0,
        player_sum,
        dealer_sum,
    };

    if player_sum > 21 {
        result.outcome = HandOutcome::Bust;
    } else if dealer_sum > 21 || player_sum > dealer_sum {
        let natural = sole_hand && hand.is_blackjack();
        let payout = if natural {
            blackjack_payout.calculate_payout(hand.bet)
        } else {
            hand.bet as f64
        };
        result.outcome = if natural {
            HandOutcome::Blackjack
        } else {
            HandOutcome::Win
        };
        result.win_amount = house_edge.apply(payout);
        result.credited = hand.bet.saturating_add(result.win_amount);
    } else if player_sum == dealer_sum {
        result.outcome = HandOutcome::Push;
        result.credited = hand.bet;
    }

    result
}

/// Settle every hand of a round against the dealer's final cards.
pub fn settle_round(
    hands: &[Hand],
    dealer_cards: &[Card],
    blackjack_payout: PayoutRatio,
    house_edge: HouseEdge,
) -> RoundResult {
    let dealer_sum = hand_sum(dealer_cards);
    let sole_hand = hands.len() == 1;
    RoundResult {
        hands: hands
            .iter()
            .enumerate()
            .map(|(i, hand)| {
                settle_hand(i, hand, sole_hand, dealer_sum, blackjack_payout, house_edge)
            })
            .collect(),
        dealer_sum,
        house_edge,
    }
}
