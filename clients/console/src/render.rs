//! Plain-text rendering of engine events and snapshots.

use chipjack::{Card, Event, HouseEdge, Phase, Seat, Snapshot};

use crate::command::keyword;

pub const HELP: &str = "\
Betting:  chip <amount> (or just the amount), clear, max, repeat, deal
Playing:  hit, stand, double, split
Table:    edge <percent>, show, help, quit
";

pub fn cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn percent(edge: HouseEdge) -> String {
    format!("{:.2}%", edge.fraction() * 100.0)
}

/// One line of narration, or `None` for events the table view already shows.
pub fn event(event: &Event) -> Option<String> {
    let line = match event {
        Event::BetChanged { current_bet } => format!("Bet: {current_bet}"),
        Event::Shuffled => "Shuffling deck...".to_string(),
        Event::BetPlaced { amount } => format!("Bet {amount} placed"),
        Event::CardDealt {
            seat: Seat::Player(hand),
            card,
        } => format!("Hand {} draws {card}", hand + 1),
        Event::CardDealt {
            seat: Seat::Dealer,
            card,
        } => format!("Dealer draws {card}"),
        Event::HoleCardDealt => "Dealer takes a hole card".to_string(),
        Event::HoleCardRevealed { card } => format!("Dealer reveals {card}"),
        Event::HandSplit { from, into } => {
            format!("Hand {} splits into hands {} and {}", from + 1, from + 1, into + 1)
        }
        Event::BetDoubled { hand, bet } => format!("Hand {} doubles to {bet}", hand + 1),
        Event::HandFinished { hand, sum } if *sum > 21 => {
            format!("Hand {} busts with {sum}", hand + 1)
        }
        Event::HandFinished { hand, sum } if *sum == 21 => format!("Hand {} has 21!", hand + 1),
        Event::HandFinished { hand, sum } => format!("Hand {} stands on {sum}", hand + 1),
        Event::TurnMoved { hand } => format!("Playing hand {}", hand + 1),
        Event::PhaseChanged {
            phase: Phase::DealerTurn,
        } => "Dealer's turn".to_string(),
        Event::PhaseChanged { .. } => return None,
        Event::RoundSettled { result } => {
            let net = result.net();
            if net >= 0 {
                format!("{result} Net +{net}")
            } else {
                format!("{result} Net {net}")
            }
        }
    };
    Some(line)
}

pub fn snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    if !snapshot.dealer_cards.is_empty() {
        let hole = if snapshot.dealer_hole_card { " ??" } else { "" };
        out.push_str(&format!(
            "Dealer: {}{hole}  ({})\n",
            cards(&snapshot.dealer_cards),
            snapshot.dealer_sum
        ));
    }
    for (i, hand) in snapshot.player_hands.iter().enumerate() {
        let marker = if snapshot.phase == Phase::PlayerTurn && i == snapshot.current_hand_index {
            "  <"
        } else {
            ""
        };
        out.push_str(&format!(
            "Hand {}: {}  ({})  bet {}{marker}\n",
            i + 1,
            cards(&hand.cards),
            hand.sum,
            hand.bet
        ));
    }

    if snapshot.phase == Phase::Betting {
        if let Some(result) = &snapshot.last_result {
            out.push_str(&format!("Result: {result}\n"));
        }
    }
    out.push_str(&format!(
        "Bankroll: {}  Bet: {}  Last bet: {}  Cards left: {}\n",
        snapshot.bankroll, snapshot.current_bet, snapshot.last_bet, snapshot.cards_remaining
    ));

    if snapshot.is_game_over() {
        out.push_str("Game over. The bankroll is exhausted.\n");
    } else if !snapshot.actions.is_empty() {
        let actions: Vec<String> = snapshot.actions.iter().map(keyword).collect();
        out.push_str(&format!("Actions: {}\n", actions.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chipjack::{Deck, Table, TableRules};

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    fn dealt_table() -> Table {
        let draws: Vec<Card> = ["10S", "6H", "8C", "9D"].iter().map(|c| card(c)).collect();
        let mut table = Table::with_seed(TableRules::default(), 3)
            .unwrap()
            .with_deck(Deck::stacked(&draws));
        table.place_bet_chip(100).unwrap();
        table.deal().unwrap();
        table
    }

    #[test]
    fn test_fresh_table() {
        let table = Table::with_seed(TableRules::default(), 3).unwrap();
        let text = snapshot(&table.snapshot());
        assert!(text.starts_with("Bankroll: 500  Bet: 0"));
        assert!(text.contains("Actions: chip 1, chip 5, chip 25, chip 100, chip 500, max"));
        assert!(!text.contains("Dealer"));
    }

    #[test]
    fn test_hole_card_hidden() {
        let table = dealt_table();
        let text = snapshot(&table.snapshot());
        assert!(text.contains("Dealer: 6♥ ??  (6)"));
        assert!(text.contains("Hand 1: 10♠ 8♣  (18)  bet 100  <"));
        assert!(!text.contains('♦'));
    }

    #[test]
    fn test_settled_round_shows_result() {
        let mut table = dealt_table();
        table.stand().unwrap();
        let events = table.finish_round().unwrap();
        let lines: Vec<String> = events.iter().filter_map(event).collect();
        assert_eq!(lines[0], "Dealer reveals 9♦");

        let text = snapshot(&table.snapshot());
        assert!(text.contains("Result: Hand 1"));
        assert!(!text.contains("??"));
    }

    #[test]
    fn test_event_lines() {
        assert_eq!(
            event(&Event::HandFinished { hand: 1, sum: 24 }).as_deref(),
            Some("Hand 2 busts with 24")
        );
        assert_eq!(
            event(&Event::HandSplit { from: 0, into: 1 }).as_deref(),
            Some("Hand 1 splits into hands 1 and 2")
        );
        assert_eq!(
            event(&Event::PhaseChanged {
                phase: Phase::EndRound
            }),
            None
        );
        assert_eq!(percent(HouseEdge::new(0.015)), "1.50%");
    }
}
