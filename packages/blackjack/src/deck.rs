use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::Card;

/// Draw stack of cards. The top of the deck is the end of the vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 cards in canonical order (suit-major, ace to king).
    pub fn standard() -> Self {
        Self {
            cards: (0..52).filter_map(Card::from_index).collect(),
        }
    }

    /// A fresh, shuffled 52-card deck.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle(rng);
        deck
    }

    /// A full deck whose first draws are `draw_order`, in that order. The remaining
    /// cards follow in canonical order. Duplicates in `draw_order` are dealt once.
    pub fn stacked(draw_order: &[Card]) -> Self {
        let mut top: Vec<Card> = Vec::with_capacity(draw_order.len());
        for card in draw_order {
            if !top.contains(card) {
                top.push(*card);
            }
        }
        let mut cards: Vec<Card> = (0..52)
            .rev()
            .filter_map(Card::from_index)
            .filter(|c| !top.contains(c))
            .collect();
        cards.extend(top.into_iter().rev());
        Self { cards }
    }

    /// Fisher-Yates: each index from the last down swaps with a uniform index in `[0, i]`.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in (1..self.cards.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.cards.swap(i, j);
        }
    }

    pub fn draw(&mut self) -> Result<Card> {
        self.cards.pop().ok_or(EngineError::DeckExhausted)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn assert_full_deck(deck: &Deck) {
        assert_eq!(deck.remaining(), 52);
        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), 52);
        for i in 0..52 {
            assert!(unique.contains(&Card::from_index(i).unwrap()));
        }
    }

    #[test]
    fn test_standard_deck_is_complete() {
        let deck = Deck::standard();
        assert_full_deck(&deck);
        assert_eq!(deck.cards()[0], Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(deck.cards()[51], Card::new(Rank::King, Suit::Clubs));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let deck = Deck::shuffled(&mut rng);
            assert_full_deck(&deck);
        }
    }

    #[test]
    fn test_shuffle_is_deterministic_per_seed() {
        let a = Deck::shuffled(&mut ChaCha8Rng::seed_from_u64(7));
        let b = Deck::shuffled(&mut ChaCha8Rng::seed_from_u64(7));
        let c = Deck::shuffled(&mut ChaCha8Rng::seed_from_u64(8));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Deck::standard());
    }

    #[test]
    fn test_draw_pops_from_top() {
        let mut deck = Deck::standard();
        assert_eq!(deck.draw().unwrap(), Card::new(Rank::King, Suit::Clubs));
        assert_eq!(deck.draw().unwrap(), Card::new(Rank::Queen, Suit::Clubs));
        assert_eq!(deck.remaining(), 50);
    }

    #[test]
    fn test_draw_exhausted() {
        let mut deck = Deck::standard();
        for _ in 0..52 {
            deck.draw().unwrap();
        }
        assert!(deck.is_empty());
        assert_eq!(deck.draw(), Err(EngineError::DeckExhausted));
    }

    #[test]
    fn test_stacked_deck_draw_order() {
        let order = [
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Clubs),
            Card::new(Rank::King, Suit::Spades),
        ];
        let mut deck = Deck::stacked(&order);
        assert_full_deck(&deck);
        for card in order {
            assert_eq!(deck.draw().unwrap(), card);
        }
        // Canonical remainder starts from the ace of spades
        assert_eq!(deck.draw().unwrap(), Card::new(Rank::Ace, Suit::Spades));
    }

    #[test]
    fn test_stacked_deck_ignores_duplicates() {
        let ace = Card::new(Rank::Ace, Suit::Hearts);
        let deck = Deck::stacked(&[ace, ace]);
        assert_full_deck(&deck);
    }
}
