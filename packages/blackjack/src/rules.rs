use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// Lowest accepted reshuffle threshold, sized for four hands of four cards. A round
/// of small cards can still draw more; one that runs the deck dry is voided.
pub const MIN_RESHUFFLE_THRESHOLD: usize = 16;

/// The dealer draws below this total and stands on it, soft totals included.
pub const DEALER_STANDS_ON: u8 = 17;

/// Largest starting bankroll: every chip amount stays exact in payout arithmetic.
pub const MAX_BANKROLL: u64 = 1 << 53;

/// Blackjack payout multiplier as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u16,
    pub denominator: u16,
}

impl PayoutRatio {
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, RulesError> {
        if denominator == 0 {
            return Err(RulesError::ZeroDenominator);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Exact payout before any house edge; may be fractional for odd bets.
    pub fn calculate_payout(&self, bet: u64) -> f64 {
        bet as f64 * self.numerator as f64 / self.denominator as f64
    }
}

/// Fraction of every win kept by the house, always in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct HouseEdge(f64);

impl From<f64> for HouseEdge {
    fn from(fraction: f64) -> Self {
        Self::new(fraction)
    }
}

impl HouseEdge {
    pub const ZERO: Self = Self(0.0);

    /// Anything that is not a finite fraction in `[0, 1)` counts as no edge.
    pub fn new(fraction: f64) -> Self {
        if fraction.is_finite() && (0.0..1.0).contains(&fraction) {
            Self(fraction)
        } else {
            Self::ZERO
        }
    }

    /// Operator controls express the edge in percent, e.g. `"0.5"` for 0.5%.
    pub fn parse_percent(input: &str) -> Self {
        match input.trim().trim_end_matches('%').trim().parse::<f64>() {
            Ok(percent) => Self::new(percent / 100.0),
            Err(_) => Self::ZERO,
        }
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    /// Net win after the house cut, rounded to the nearest chip (halves away from zero).
    pub fn apply(&self, payout: f64) -> u64 {
        (payout * (1.0 - self.0)).round() as u64
    }
}

/// Where the engine reads the house edge from when a round settles.
pub trait HouseEdgeSource {
    fn house_edge(&self) -> HouseEdge;
}

impl HouseEdgeSource for HouseEdge {
    fn house_edge(&self) -> HouseEdge {
        *self
    }
}

/// Raw operator values; invalid ones are sanitised to zero.
impl<F> HouseEdgeSource for F
where
    F: Fn() -> f64,
{
    fn house_edge(&self) -> HouseEdge {
        HouseEdge::new(self())
    }
}

/// Configurable table rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    /// Chips the session starts with
    pub starting_bankroll: u64,

    /// Rebuild and reshuffle when fewer cards remain at round start
    pub reshuffle_threshold: usize,

    /// Maximum number of player hands per round, splits included
    pub max_hands: usize,

    /// Natural blackjack payout (commonly 3:2)
    pub blackjack_payout: PayoutRatio,

    /// Chip denominations offered for betting
    pub chip_values: Vec<u64>,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            starting_bankroll: 500,
            reshuffle_threshold: 20,
            max_hands: 4,
            blackjack_payout: PayoutRatio::THREE_TO_TWO,
            chip_values: vec![1, 5, 25, 100, 500],
        }
    }
}

impl TableRules {
    /// Deeper bankroll and larger chips, same card rules.
    pub fn high_roller() -> Self {
        Self {
            starting_bankroll: 5_000,
            chip_values: vec![25, 100, 500, 1_000],
            ..Self::default()
        }
    }

    pub fn with_bankroll(mut self, bankroll: u64) -> Self {
        self.starting_bankroll = bankroll;
        self
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.blackjack_payout.denominator == 0 {
            return Err(RulesError::ZeroDenominator);
        }
        if self.reshuffle_threshold < MIN_RESHUFFLE_THRESHOLD {
            return Err(RulesError::ThresholdTooLow {
                threshold: self.reshuffle_threshold,
                required: MIN_RESHUFFLE_THRESHOLD,
            });
        }
        if self.reshuffle_threshold > 52 {
            return Err(RulesError::ThresholdTooHigh(self.reshuffle_threshold));
        }
        if self.max_hands == 0 {
            return Err(RulesError::NoHands);
        }
        if !self.chip_values.iter().any(|&c| c > 0) {
            return Err(RulesError::NoChips);
        }
        if self.starting_bankroll == 0 {
            return Err(RulesError::EmptyBankroll);
        }
        if self.starting_bankroll > MAX_BANKROLL {
            return Err(RulesError::BankrollTooLarge {
                bankroll: self.starting_bankroll,
                max: MAX_BANKROLL,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_ratio_three_to_two() {
        let ratio = PayoutRatio::THREE_TO_TWO;
        assert_eq!(ratio.calculate_payout(100), 150.0);
        assert_eq!(ratio.calculate_payout(10), 15.0);
        assert_eq!(ratio.calculate_payout(25), 37.5);
    }

    #[test]
    fn test_payout_ratio_custom() {
        let ratio = PayoutRatio::new(6, 5).unwrap();
        assert_eq!(ratio.calculate_payout(100), 120.0);
        assert_eq!(ratio.calculate_payout(50), 60.0);
    }

    #[test]
    fn test_payout_ratio_zero_denominator() {
        assert_eq!(PayoutRatio::new(3, 0), Err(RulesError::ZeroDenominator));
        assert_eq!(PayoutRatio::new(2, 1).unwrap().calculate_payout(100), 200.0);
    }

    #[test]
    fn test_house_edge_sanitises_out_of_range() {
        assert_eq!(HouseEdge::new(0.02).fraction(), 0.02);
        assert_eq!(HouseEdge::new(-0.1), HouseEdge::ZERO);
        assert_eq!(HouseEdge::new(1.0), HouseEdge::ZERO);
        assert_eq!(HouseEdge::new(f64::NAN), HouseEdge::ZERO);
        assert_eq!(HouseEdge::new(f64::INFINITY), HouseEdge::ZERO);
    }

    #[test]
    fn test_house_edge_parse_percent() {
        assert_eq!(HouseEdge::parse_percent("0.5").fraction(), 0.005);
        assert_eq!(HouseEdge::parse_percent(" 2 % ").fraction(), 0.02);
        assert_eq!(HouseEdge::parse_percent("abc"), HouseEdge::ZERO);
        assert_eq!(HouseEdge::parse_percent(""), HouseEdge::ZERO);
        assert_eq!(HouseEdge::parse_percent("150"), HouseEdge::ZERO);
    }

    #[test]
    fn test_house_edge_apply_rounds_to_nearest() {
        assert_eq!(HouseEdge::ZERO.apply(150.0), 150);
        assert_eq!(HouseEdge::new(0.05).apply(100.0), 95);
        // 37.5 rounds half away from zero
        assert_eq!(HouseEdge::ZERO.apply(37.5), 38);
        // 150 * 0.995 = 149.25
        assert_eq!(HouseEdge::new(0.005).apply(150.0), 149);
    }

    #[test]
    fn test_house_edge_deserialises_through_sanitiser() {
        let edge: HouseEdge = serde_json::from_str("0.02").unwrap();
        assert_eq!(edge.fraction(), 0.02);
        let edge: HouseEdge = serde_json::from_str("1.5").unwrap();
        assert_eq!(edge, HouseEdge::ZERO);
        let edge: HouseEdge = serde_json::from_str("-0.3").unwrap();
        assert_eq!(edge, HouseEdge::ZERO);
        assert_eq!(serde_json::to_string(&HouseEdge::new(0.25)).unwrap(), "0.25");
    }

    #[test]
    fn test_closure_source_is_sanitised() {
        let source = || -> f64 { 7.0 };
        assert_eq!(source.house_edge(), HouseEdge::ZERO);
        let source = || -> f64 { 0.01 };
        assert_eq!(source.house_edge().fraction(), 0.01);
    }

    #[test]
    fn test_table_rules_default() {
        let rules = TableRules::default();
        assert_eq!(rules.starting_bankroll, 500);
        assert_eq!(rules.reshuffle_threshold, 20);
        assert_eq!(rules.max_hands, 4);
        assert_eq!(rules.blackjack_payout, PayoutRatio::THREE_TO_TWO);
        assert!(rules.validate().is_ok());
        assert!(TableRules::high_roller().validate().is_ok());
    }

    #[test]
    fn test_table_rules_validation() {
        let rules = TableRules {
            reshuffle_threshold: 10,
            ..TableRules::default()
        };
        assert_eq!(
            rules.validate(),
            Err(RulesError::ThresholdTooLow {
                threshold: 10,
                required: MIN_RESHUFFLE_THRESHOLD
            })
        );

        let rules = TableRules {
            max_hands: 0,
            ..TableRules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::NoHands));

        let rules = TableRules {
            chip_values: vec![0],
            ..TableRules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::NoChips));

        assert_eq!(
            TableRules::default().with_bankroll(0).validate(),
            Err(RulesError::EmptyBankroll)
        );
    }

    #[test]
    fn test_table_rules_bankroll_cap() {
        assert!(TableRules::default().with_bankroll(MAX_BANKROLL).validate().is_ok());
        assert_eq!(
            TableRules::default().with_bankroll(u64::MAX).validate(),
            Err(RulesError::BankrollTooLarge {
                bankroll: u64::MAX,
                max: MAX_BANKROLL
            })
        );
    }
}
