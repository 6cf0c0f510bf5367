use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result, RulesError};
use crate::hand::{hand_sum, Hand};
use crate::rules::DEALER_STANDS_ON;
use crate::settlement::{settle_round, RoundResult};
use crate::snapshot::{HandView, Snapshot};
use crate::{Action, Card, Deck, Event, HouseEdge, HouseEdgeSource, Seat, TableRules};

/// Current phase of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Betting,
    PlayerTurn,
    DealerTurn,
    EndRound,
    GameOver, // Bankroll ran out; terminal
}

/// Cards and stakes of one round. Hands are kept in play order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub player_hands: Vec<Hand>,
    pub current_hand_index: usize,
    pub dealer_cards: Vec<Card>,
    pub dealer_hidden_card: Option<Card>,
}

impl Round {
    pub fn new(bet: u64) -> Self {
        Self {
            player_hands: vec![Hand::new(bet)],
            current_hand_index: 0,
            dealer_cards: Vec::new(),
            dealer_hidden_card: None,
        }
    }

    pub fn current_hand(&self) -> Option<&Hand> {
        self.player_hands.get(self.current_hand_index)
    }

    /// First unfinished hand after `index`, if any.
    pub fn next_unfinished_after(&self, index: usize) -> Option<usize> {
        self.player_hands
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, h)| !h.finished)
            .map(|(i, _)| i)
    }

    pub fn all_hands_busted(&self) -> bool {
        !self.player_hands.is_empty() && self.player_hands.iter().all(|h| h.is_busted())
    }

    /// Total of the dealer's face-up cards.
    pub fn dealer_sum(&self) -> u8 {
        hand_sum(&self.dealer_cards)
    }

    pub fn staked(&self) -> u64 {
        self.player_hands.iter().map(|h| h.bet).sum()
    }
}

/// One step of the dealer sequence and the table as it looks afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub event: Event,
    pub snapshot: Snapshot,
}

/// The session: bankroll, deck and the live round, with the house edge read from `S`
/// whenever a round settles.
pub struct Table<S = HouseEdge> {
    rules: TableRules,
    phase: Phase,
    bankroll: u64,
    current_bet: u64,
    last_bet: u64,
    round: Round,
    deck: Deck,
    rng: ChaCha8Rng,
    house_edge: S,
    last_result: Option<RoundResult>,
}

impl Table {
    pub fn new(rules: TableRules) -> std::result::Result<Self, RulesError> {
        Self::with_rng(rules, ChaCha8Rng::from_entropy())
    }

    /// Reproducible shuffles for a given seed.
    pub fn with_seed(rules: TableRules, seed: u64) -> std::result::Result<Self, RulesError> {
        Self::with_rng(rules, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rules: TableRules, mut rng: ChaCha8Rng) -> std::result::Result<Self, RulesError> {
        rules.validate()?;
        let deck = Deck::shuffled(&mut rng);
        log::info!(
            "Table opened with bankroll {} ({} cards, reshuffle below {})",
            rules.starting_bankroll,
            deck.remaining(),
            rules.reshuffle_threshold
        );
        Ok(Self {
            bankroll: rules.starting_bankroll,
            rules,
            phase: Phase::Betting,
            current_bet: 0,
            last_bet: 0,
            round: Round::default(),
            deck,
            rng,
            house_edge: HouseEdge::ZERO,
            last_result: None,
        })
    }
}

impl<S: HouseEdgeSource> Table<S> {
    /// Replace where the house edge is read from at settlement.
    pub fn with_house_edge<T: HouseEdgeSource>(self, source: T) -> Table<T> {
        Table {
            rules: self.rules,
            phase: self.phase,
            bankroll: self.bankroll,
            current_bet: self.current_bet,
            last_bet: self.last_bet,
            round: self.round,
            deck: self.deck,
            rng: self.rng,
            house_edge: source,
            last_result: self.last_result,
        }
    }

    /// Replace the deck, e.g. with [`Deck::stacked`] for a scripted round.
    pub fn with_deck(mut self, deck: Deck) -> Self {
        self.deck = deck;
        self
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bankroll(&self) -> u64 {
        self.bankroll
    }

    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }

    pub fn last_bet(&self) -> u64 {
        self.last_bet
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn house_edge(&self) -> HouseEdge {
        self.house_edge.house_edge()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Dispatch a typed action to its operation.
    pub fn apply(&mut self, action: Action) -> Result<Vec<Event>> {
        match action {
            Action::PlaceChip(amount) => self.place_bet_chip(amount),
            Action::ClearBet => self.clear_bet(),
            Action::MaxBet => self.set_max_bet(),
            Action::RepeatBet => self.repeat_last_bet(),
            Action::Deal => self.deal(),
            Action::Hit => self.hit(),
            Action::Stand => self.stand(),
            Action::DoubleDown => self.double_down(),
            Action::Split => self.split(),
        }
    }

    // ── Betting ──

    pub fn place_bet_chip(&mut self, amount: u64) -> Result<Vec<Event>> {
        let action = Action::PlaceChip(amount);
        self.require_phase(action, Phase::Betting)?;
        if amount == 0 || !self.rules.chip_values.contains(&amount) {
            return Err(self.invalid_bet(amount, "not a chip on this table"));
        }
        let bet = match self.current_bet.checked_add(amount) {
            Some(bet) if bet <= self.bankroll => bet,
            over => {
                let bet = over.unwrap_or(u64::MAX);
                return Err(self.invalid_bet(bet, "bet would exceed bankroll"));
            }
        };
        self.current_bet = bet;
        Ok(vec![Event::BetChanged { current_bet: bet }])
    }

    pub fn clear_bet(&mut self) -> Result<Vec<Event>> {
        self.require_phase(Action::ClearBet, Phase::Betting)?;
        self.current_bet = 0;
        Ok(vec![Event::BetChanged { current_bet: 0 }])
    }

    pub fn set_max_bet(&mut self) -> Result<Vec<Event>> {
        self.require_phase(Action::MaxBet, Phase::Betting)?;
        self.current_bet = self.bankroll;
        Ok(vec![Event::BetChanged {
            current_bet: self.current_bet,
        }])
    }

    pub fn repeat_last_bet(&mut self) -> Result<Vec<Event>> {
        self.require_phase(Action::RepeatBet, Phase::Betting)?;
        if self.last_bet == 0 {
            return Err(self.invalid_bet(0, "no previous bet to repeat"));
        }
        if self.last_bet > self.bankroll {
            return Err(self.invalid_bet(self.last_bet, "previous bet exceeds bankroll"));
        }
        self.current_bet = self.last_bet;
        Ok(vec![Event::BetChanged {
            current_bet: self.current_bet,
        }])
    }

    // ── Round start ──

    pub fn deal(&mut self) -> Result<Vec<Event>> {
        self.require_phase(Action::Deal, Phase::Betting)?;
        let bet = self.current_bet;
        if bet == 0 {
            return Err(self.invalid_bet(bet, "no bet placed"));
        }
        if bet > self.bankroll {
            return Err(self.invalid_bet(bet, "bet exceeds bankroll"));
        }

        let mut events = Vec::new();
        self.bankroll -= bet;
        self.last_bet = bet;
        events.push(Event::BetPlaced { amount: bet });

        // Only here, before any card of the round is committed
        if self.deck.remaining() < self.rules.reshuffle_threshold {
            log::info!(
                "Shuffling: {} cards left, threshold {}",
                self.deck.remaining(),
                self.rules.reshuffle_threshold
            );
            self.deck = Deck::shuffled(&mut self.rng);
            events.push(Event::Shuffled);
        }

        self.round = Round::new(bet);
        self.last_result = None;
        log::info!("Round started: bet {bet}, bankroll {}", self.bankroll);

        // Player, dealer up, player, dealer hole
        self.deal_to_player(0, &mut events)?;
        let up = self.draw_card()?;
        self.round.dealer_cards.push(up);
        log::debug!("Dealer shows {up}");
        events.push(Event::CardDealt {
            seat: Seat::Dealer,
            card: up,
        });
        self.deal_to_player(0, &mut events)?;
        let hole = self.draw_card()?;
        self.round.dealer_hidden_card = Some(hole);
        events.push(Event::HoleCardDealt);

        self.set_phase(Phase::PlayerTurn, &mut events);

        let opening = &mut self.round.player_hands[0];
        if opening.sum() == 21 {
            log::info!("Natural blackjack");
            opening.finish();
            events.push(Event::HandFinished { hand: 0, sum: 21 });
            self.advance(&mut events);
        }
        Ok(events)
    }

    // ── Player decisions ──

    pub fn hit(&mut self) -> Result<Vec<Event>> {
        let index = self.require_open_hand(Action::Hit)?;
        let mut events = Vec::new();
        self.deal_to_player(index, &mut events)?;
        let hand = &mut self.round.player_hands[index];
        let sum = hand.sum();
        if sum >= 21 {
            hand.finish();
            events.push(Event::HandFinished { hand: index, sum });
            self.advance(&mut events);
        }
        Ok(events)
    }

    pub fn stand(&mut self) -> Result<Vec<Event>> {
        let index = self.require_open_hand(Action::Stand)?;
        let mut events = Vec::new();
        let hand = &mut self.round.player_hands[index];
        hand.finish();
        events.push(Event::HandFinished {
            hand: index,
            sum: hand.sum(),
        });
        self.advance(&mut events);
        Ok(events)
    }

    pub fn double_down(&mut self) -> Result<Vec<Event>> {
        let action = Action::DoubleDown;
        let index = self.require_open_hand(action)?;
        let hand = &self.round.player_hands[index];
        if hand.cards.len() != 2 {
            return Err(self.illegal(action, "can only double on two cards"));
        }
        let stake = hand.bet;
        if self.bankroll < stake {
            return Err(self.illegal(action, "not enough bankroll to double"));
        }

        let mut events = Vec::new();
        self.bankroll -= stake;
        let hand = &mut self.round.player_hands[index];
        hand.bet += stake;
        events.push(Event::BetDoubled {
            hand: index,
            bet: hand.bet,
        });

        self.deal_to_player(index, &mut events)?;
        let hand = &mut self.round.player_hands[index];
        hand.finish();
        events.push(Event::HandFinished {
            hand: index,
            sum: hand.sum(),
        });
        self.advance(&mut events);
        Ok(events)
    }

    pub fn split(&mut self) -> Result<Vec<Event>> {
        let action = Action::Split;
        let index = self.require_open_hand(action)?;
        let hand = &self.round.player_hands[index];
        if !hand.can_split() {
            return Err(self.illegal(action, "split needs two cards of equal value"));
        }
        if self.round.player_hands.len() >= self.rules.max_hands {
            return Err(self.illegal(action, "hand limit reached"));
        }
        let stake = hand.bet;
        if self.bankroll < stake {
            return Err(self.illegal(action, "not enough bankroll to split"));
        }

        let mut events = Vec::new();
        self.bankroll -= stake;
        let mut new_hand = Hand::new(stake);
        if let Some(second) = self.round.player_hands[index].cards.pop() {
            new_hand.add_card(second);
        }
        let new_index = index + 1;
        self.round.player_hands.insert(new_index, new_hand);
        log::debug!("Hand {index} split into {new_index}");
        events.push(Event::HandSplit {
            from: index,
            into: new_index,
        });

        self.deal_to_player(index, &mut events)?;
        self.deal_to_player(new_index, &mut events)?;
        Ok(events)
    }

    // ── Dealer sequence ──

    /// Perform the next discrete dealer or settlement step. Returns `None` when no
    /// dealer sequence is pending.
    pub fn step(&mut self) -> Result<Option<Step>> {
        let event = match self.phase {
            Phase::DealerTurn => self.dealer_step()?,
            Phase::EndRound => self.settle(),
            Phase::Betting | Phase::PlayerTurn | Phase::GameOver => return Ok(None),
        };
        Ok(Some(Step {
            event,
            snapshot: self.snapshot(),
        }))
    }

    /// Steps of the dealer sequence, pulled one at a time. Dropping the iterator early
    /// leaves the sequence pending; the next `step` resumes it.
    pub fn dealer_play(&mut self) -> DealerPlay<'_, S> {
        DealerPlay { table: self }
    }

    /// Run any pending dealer sequence to the end without pausing.
    pub fn finish_round(&mut self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for step in self.dealer_play() {
            events.push(step?.event);
        }
        Ok(events)
    }

    fn dealer_step(&mut self) -> Result<Event> {
        if let Some(card) = self.round.dealer_hidden_card.take() {
            self.round.dealer_cards.push(card);
            log::debug!("Dealer reveals {card}");
            return Ok(Event::HoleCardRevealed { card });
        }

        let sum = self.round.dealer_sum();
        if self.round.all_hands_busted() || sum >= DEALER_STANDS_ON {
            log::debug!("Dealer stops at {sum}");
            self.phase = Phase::EndRound;
            return Ok(Event::PhaseChanged {
                phase: Phase::EndRound,
            });
        }

        let card = self.draw_card()?;
        self.round.dealer_cards.push(card);
        log::debug!("Dealer draws {card}");
        Ok(Event::CardDealt {
            seat: Seat::Dealer,
            card,
        })
    }

    fn settle(&mut self) -> Event {
        let edge = self.house_edge.house_edge();
        let result = settle_round(
            &self.round.player_hands,
            &self.round.dealer_cards,
            self.rules.blackjack_payout,
            edge,
        );
        self.bankroll = self.bankroll.saturating_add(result.total_credited());
        self.current_bet = 0;
        log::info!(
            "Round settled: {result} Net {}, bankroll {}",
            result.net(),
            self.bankroll
        );

        self.phase = if self.bankroll == 0 {
            log::info!("Game over: bankroll exhausted");
            Phase::GameOver
        } else {
            Phase::Betting
        };
        self.last_result = Some(result.clone());
        Event::RoundSettled { result }
    }

    // ── Views ──

    /// Actions that would currently be accepted.
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.phase {
            Phase::Betting => {
                for &chip in &self.rules.chip_values {
                    let fits = self
                        .current_bet
                        .checked_add(chip)
                        .is_some_and(|bet| bet <= self.bankroll);
                    if chip > 0 && fits {
                        actions.push(Action::PlaceChip(chip));
                    }
                }
                if self.current_bet > 0 {
                    actions.push(Action::ClearBet);
                }
                if self.bankroll > 0 {
                    actions.push(Action::MaxBet);
                }
                if self.last_bet > 0 && self.last_bet <= self.bankroll {
                    actions.push(Action::RepeatBet);
                }
                if self.current_bet > 0 && self.current_bet <= self.bankroll {
                    actions.push(Action::Deal);
                }
            }
            Phase::PlayerTurn => {
                actions.push(Action::Hit);
                actions.push(Action::Stand);
                if self.can_double_current_hand() {
                    actions.push(Action::DoubleDown);
                }
                if self.can_split_current_hand() {
                    actions.push(Action::Split);
                }
            }
            Phase::DealerTurn | Phase::EndRound | Phase::GameOver => {}
        }
        actions
    }

    pub fn can_double_current_hand(&self) -> bool {
        if self.phase != Phase::PlayerTurn {
            return false;
        }
        match self.round.current_hand() {
            Some(hand) => !hand.finished && hand.cards.len() == 2 && self.bankroll >= hand.bet,
            None => false,
        }
    }

    pub fn can_split_current_hand(&self) -> bool {
        if self.phase != Phase::PlayerTurn {
            return false;
        }
        match self.round.current_hand() {
            Some(hand) => {
                !hand.finished
                    && hand.can_split()
                    && self.round.player_hands.len() < self.rules.max_hands
                    && self.bankroll >= hand.bet
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bankroll: self.bankroll,
            current_bet: self.current_bet,
            last_bet: self.last_bet,
            phase: self.phase,
            dealer_cards: self.round.dealer_cards.clone(),
            dealer_hole_card: self.round.dealer_hidden_card.is_some(),
            dealer_sum: self.round.dealer_sum(),
            player_hands: self.round.player_hands.iter().map(HandView::from).collect(),
            current_hand_index: self.round.current_hand_index,
            cards_remaining: self.deck.remaining(),
            actions: self.legal_actions(),
            last_result: self.last_result.clone(),
        }
    }

    // ── Internals ──

    fn deal_to_player(&mut self, index: usize, events: &mut Vec<Event>) -> Result<()> {
        let card = self.draw_card()?;
        self.round.player_hands[index].add_card(card);
        log::debug!("Hand {index} receives {card}");
        events.push(Event::CardDealt {
            seat: Seat::Player(index),
            card,
        });
        Ok(())
    }

    /// Move to the next unfinished hand, or hand over to the dealer.
    fn advance(&mut self, events: &mut Vec<Event>) {
        match self
            .round
            .next_unfinished_after(self.round.current_hand_index)
        {
            Some(next) => {
                self.round.current_hand_index = next;
                events.push(Event::TurnMoved { hand: next });
            }
            None => self.set_phase(Phase::DealerTurn, events),
        }
    }

    fn set_phase(&mut self, phase: Phase, events: &mut Vec<Event>) {
        log::debug!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        events.push(Event::PhaseChanged { phase });
    }

    fn draw_card(&mut self) -> Result<Card> {
        match self.deck.draw() {
            Ok(card) => Ok(card),
            Err(err) => {
                self.abort_round();
                Err(err)
            }
        }
    }

    /// Return every stake of the round and go back to betting. Only reachable if the
    /// reshuffle threshold failed to cover a round.
    fn abort_round(&mut self) {
        let refunded = self.round.staked();
        log::error!(
            "Deck exhausted with {} hands in play; refunding {refunded}",
            self.round.player_hands.len()
        );
        self.bankroll += refunded;
        self.round = Round::default();
        self.current_bet = 0;
        self.phase = Phase::Betting;
    }

    fn require_phase(&self, action: Action, phase: Phase) -> Result<()> {
        if self.phase == phase {
            return Ok(());
        }
        let reason = match self.phase {
            Phase::Betting => "no round in progress",
            Phase::PlayerTurn => "a round is in progress",
            Phase::DealerTurn | Phase::EndRound => "the dealer is still playing",
            Phase::GameOver => "the game is over",
        };
        Err(self.illegal(action, reason))
    }

    /// Index of the current hand if it can still take a decision.
    fn require_open_hand(&self, action: Action) -> Result<usize> {
        self.require_phase(action, Phase::PlayerTurn)?;
        let index = self.round.current_hand_index;
        match self.round.current_hand() {
            Some(hand) if !hand.finished => Ok(index),
            _ => Err(self.illegal(action, "current hand is finished")),
        }
    }

    fn illegal(&self, action: Action, reason: &'static str) -> EngineError {
        log::warn!("Rejected {action}: {reason}");
        EngineError::IllegalAction { action, reason }
    }

    fn invalid_bet(&self, bet: u64, reason: &'static str) -> EngineError {
        log::warn!("Rejected bet {bet} (bankroll {}): {reason}", self.bankroll);
        EngineError::InvalidBet {
            bet,
            bankroll: self.bankroll,
            reason,
        }
    }
}

impl<S> fmt::Debug for Table<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("phase", &self.phase)
            .field("bankroll", &self.bankroll)
            .field("current_bet", &self.current_bet)
            .field("last_bet", &self.last_bet)
            .field("round", &self.round)
            .field("cards_remaining", &self.deck.remaining())
            .finish()
    }
}

/// Iterator over the pending dealer sequence; holds the table exclusively.
pub struct DealerPlay<'a, S> {
    table: &'a mut Table<S>,
}

impl<S: HouseEdgeSource> Iterator for DealerPlay<'_, S> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.step().transpose()
    }
}
