use crate::Card;
use serde::{Deserialize, Serialize};

/// Point value of a single card: ace 11, faces 10, numerals their number
pub fn card_value(card: &Card) -> u8 {
    card.value()
}

/// Calculate the value of a blackjack hand
pub fn hand_sum(cards: &[Card]) -> u8 {
    let mut total: u8 = 0;
    let mut aces = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        total = total.saturating_add(card_value(card));
    }

    // Each ace counted as 11 may drop to 1 once
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    total
}

/// Check if a hand is busted
pub fn is_busted(cards: &[Card]) -> bool {
    hand_sum(cards) > 21
}

/// Check if a hand is blackjack (21 with 2 cards)
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_sum(cards) == 21
}

/// Two cards split when their point values match, so any pair of ten-value cards qualifies
pub fn can_split_cards(card1: &Card, card2: &Card) -> bool {
    card_value(card1) == card_value(card2)
}

/// One player hand within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Card>,
    pub bet: u64,
    pub finished: bool,
}

impl Hand {
    pub fn new(bet: u64) -> Self {
        Self {
            cards: Vec::new(),
            bet,
            finished: false,
        }
    }

    pub fn sum(&self) -> u8 {
        hand_sum(&self.cards)
    }

    pub fn is_busted(&self) -> bool {
        is_busted(&self.cards)
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Marks the hand done. Returns false if it already was.
    pub fn finish(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        true
    }

    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && can_split_cards(&self.cards[0], &self.cards[1])
    }
}
