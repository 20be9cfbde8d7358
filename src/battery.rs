//! Battery resource gate.
//!
//! The gate tracks a bounded depleting capacity and answers capability
//! questions; it never decides when to charge. Callers must check
//! [`Battery::can_perform`] before [`Battery::consume`]: a failed
//! consume is a broken contract, not control flow.

use thiserror::Error;

/// Error type for battery operations.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BatteryError {
    #[error("Insufficient capacity: need {required:.1}, have {available:.1}")]
    InsufficientCapacity { required: f64, available: f64 },
}

/// Depleting, replenishable operational capacity.
#[derive(Debug, Clone)]
pub struct Battery {
    level: f64,
    max: f64,
}

impl Battery {
    /// A battery at full capacity.
    pub fn new(max: f64) -> Self {
        Self { level: max, max }
    }

    /// A battery at a specific level, clamped into `0.0..=max`.
    pub fn with_level(max: f64, level: f64) -> Self {
        Self {
            level: level.clamp(0.0, max),
            max,
        }
    }

    /// True iff a subsequent `consume(cost)` would succeed.
    pub fn can_perform(&self, cost: f64) -> bool {
        self.level >= cost
    }

    /// Deduct a cost. The caller must have checked [`Battery::can_perform`].
    pub fn consume(&mut self, cost: f64) -> Result<(), BatteryError> {
        if self.level < cost {
            return Err(BatteryError::InsufficientCapacity {
                required: cost,
                available: self.level,
            });
        }
        self.level -= cost;
        Ok(())
    }

    /// Restore capacity, clamped to max. Returns the new level.
    pub fn replenish(&mut self, amount: f64) -> f64 {
        self.level = (self.level + amount).min(self.max);
        self.level
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.level >= self.max
    }

    pub fn is_below(&self, threshold: f64) -> bool {
        self.level < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_perform_matches_consume() {
        let mut battery = Battery::with_level(100.0, 5.0);
        assert!(!battery.can_perform(6.0));
        assert_eq!(
            battery.consume(6.0),
            Err(BatteryError::InsufficientCapacity {
                required: 6.0,
                available: 5.0
            })
        );

        assert!(battery.can_perform(5.0));
        battery.consume(5.0).unwrap();
        assert_eq!(battery.level(), 0.0);
    }

    #[test]
    fn equivalence_holds_across_replenish() {
        let mut battery = Battery::with_level(10.0, 0.0);
        for _ in 0..5 {
            battery.replenish(3.0);
            for cost in [0.0, 1.0, 3.0, 9.0, 10.0, 11.0] {
                let predicted = battery.can_perform(cost);
                let actual = battery.clone().consume(cost).is_ok();
                assert_eq!(predicted, actual, "cost {cost} at level {}", battery.level());
            }
        }
    }

    #[test]
    fn replenish_clamps_to_max() {
        let mut battery = Battery::with_level(50.0, 45.0);
        assert_eq!(battery.replenish(20.0), 50.0);
        assert!(battery.is_full());
    }

    #[test]
    fn with_level_clamps_into_range() {
        assert_eq!(Battery::with_level(10.0, 99.0).level(), 10.0);
        assert_eq!(Battery::with_level(10.0, -5.0).level(), 0.0);
    }

    #[test]
    fn threshold_query() {
        let battery = Battery::with_level(100.0, 20.0);
        assert!(battery.is_below(25.0));
        assert!(!battery.is_below(20.0));
    }
}
