//! Resource ledger: the countdown clock and the trust score.
//!
//! Both counters are bounded. The clock only moves down and stops at zero;
//! trust stays within `[0, 100]`. The trust tier is never stored, it is
//! read off the live score.

use serde::{Deserialize, Serialize};

use crate::config::{LedgerConfig, TRUST_MAX, TRUST_MIN};

/// Coarse trust label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    /// Below the low threshold.
    Low,
    /// Between the thresholds (low inclusive).
    Medium,
    /// At or above the high threshold.
    High,
}

impl TrustTier {
    /// Classify a trust score against the two thresholds.
    pub fn from_score(score: i32, low_threshold: i32, high_threshold: i32) -> Self {
        if score < low_threshold {
            TrustTier::Low
        } else if score < high_threshold {
            TrustTier::Medium
        } else {
            TrustTier::High
        }
    }
}

/// Clock and trust counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    clock_minutes: u32,
    trust: i32,
}

impl ResourceLedger {
    /// Create a ledger at its starting values.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            clock_minutes: config.initial_clock_minutes,
            trust: config.initial_trust.clamp(TRUST_MIN, TRUST_MAX),
        }
    }

    /// Minutes left on the clock.
    pub fn clock_minutes(&self) -> u32 {
        self.clock_minutes
    }

    /// Current trust score.
    pub fn trust(&self) -> i32 {
        self.trust
    }

    /// Trust tier for the current score.
    pub fn trust_tier(&self, config: &LedgerConfig) -> TrustTier {
        TrustTier::from_score(self.trust, config.low_threshold, config.high_threshold)
    }

    /// Spend time, stopping at zero.
    ///
    /// Returns the minutes actually deducted.
    pub fn spend_time(&mut self, minutes: u32) -> u32 {
        let spent = minutes.min(self.clock_minutes);
        self.clock_minutes -= spent;
        spent
    }

    /// Apply an interview choice: spend its time, then scale and clamp its
    /// trust delta.
    pub fn apply_choice_effect(&mut self, time_cost: u32, trust_delta: i32, multiplier: i32) {
        self.spend_time(time_cost);
        let adjustment = trust_delta.saturating_mul(multiplier);
        self.trust = self
            .trust
            .saturating_add(adjustment)
            .clamp(TRUST_MIN, TRUST_MAX);
    }
}

/// Format minutes as `H:MM`.
pub fn format_clock(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> (ResourceLedger, LedgerConfig) {
        let config = LedgerConfig::default();
        (ResourceLedger::new(&config), config)
    }

    #[test]
    fn test_starting_values() {
        let (ledger, config) = ledger();
        assert_eq!(ledger.clock_minutes(), 120);
        assert_eq!(ledger.trust(), 50);
        assert_eq!(ledger.trust_tier(&config), TrustTier::Medium);
    }

    #[test]
    fn test_spend_time_floors_at_zero() {
        let (mut ledger, _) = ledger();
        assert_eq!(ledger.spend_time(100), 100);
        assert_eq!(ledger.clock_minutes(), 20);
        assert_eq!(ledger.spend_time(50), 20);
        assert_eq!(ledger.clock_minutes(), 0);
        assert_eq!(ledger.spend_time(u32::MAX), 0);
        assert_eq!(ledger.clock_minutes(), 0);
    }

    #[test]
    fn test_choice_effect_boundary_is_medium() {
        let (mut ledger, config) = ledger();
        ledger.apply_choice_effect(5, -1, config.trust_multiplier);

        assert_eq!(ledger.clock_minutes(), 115);
        assert_eq!(ledger.trust(), 40);
        assert_eq!(ledger.trust_tier(&config), TrustTier::Medium);
    }

    #[test]
    fn test_trust_clamps() {
        let (mut ledger, config) = ledger();
        ledger.apply_choice_effect(0, 20, config.trust_multiplier);
        assert_eq!(ledger.trust(), 100);
        assert_eq!(ledger.trust_tier(&config), TrustTier::High);

        ledger.apply_choice_effect(0, i32::MIN, config.trust_multiplier);
        assert_eq!(ledger.trust(), 0);
        assert_eq!(ledger.trust_tier(&config), TrustTier::Low);
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(TrustTier::from_score(39, 40, 70), TrustTier::Low);
        assert_eq!(TrustTier::from_score(40, 40, 70), TrustTier::Medium);
        assert_eq!(TrustTier::from_score(69, 40, 70), TrustTier::Medium);
        assert_eq!(TrustTier::from_score(70, 40, 70), TrustTier::High);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(120), "2:00");
        assert_eq!(format_clock(95), "1:35");
        assert_eq!(format_clock(0), "0:00");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: the clock never increases and never underflows
            #[test]
            fn prop_clock_non_increasing(spends in proptest::collection::vec(0u32..200, 0..20)) {
                let (mut ledger, _) = ledger();
                let mut previous = ledger.clock_minutes();
                for minutes in spends {
                    ledger.spend_time(minutes);
                    prop_assert!(ledger.clock_minutes() <= previous);
                    previous = ledger.clock_minutes();
                }
            }

            // Property: trust stays within bounds for any sequence of effects
            #[test]
            fn prop_trust_bounded(
                effects in proptest::collection::vec((0u32..30, -20i32..20), 0..20),
                multiplier in 0i32..50,
            ) {
                let (mut ledger, _) = ledger();
                for (time_cost, delta) in effects {
                    ledger.apply_choice_effect(time_cost, delta, multiplier);
                    prop_assert!((TRUST_MIN..=TRUST_MAX).contains(&ledger.trust()));
                }
            }
        }
    }
}
