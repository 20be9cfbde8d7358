//! Robot and simulation configuration.
//!
//! [`RobotConfig`] carries the recognised options for the core
//! (`max_capacity`, `move_cost`, `retrieve_cost`, `pack_cost`,
//! `charge_rate`, `low_battery_threshold`, warehouse limits and the
//! automation mode). [`SimulationProfile`] tunes the failure rates of
//! the simulated capability providers; tests pin them to 0.0 or 1.0.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration validation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid max_capacity: must be positive, got {0}")]
    NonPositiveCapacity(f64),

    #[error("Initial capacity {initial} exceeds max_capacity {max}")]
    InitialAboveMax { initial: f64, max: f64 },

    #[error("Cost {name} must be non-negative, got {value}")]
    NegativeCost { name: &'static str, value: f64 },

    #[error("Cost {name} {value} exceeds max_capacity {max}; the robot could never afford it")]
    CostAboveCapacity {
        name: &'static str,
        value: f64,
        max: f64,
    },

    #[error("Invalid charge_rate: must be positive, got {0}")]
    NonPositiveChargeRate(f64),

    #[error("Invalid low_battery_threshold: {threshold} must be below max_capacity {max}")]
    ThresholdAboveMax { threshold: f64, max: f64 },

    #[error("Limit {0} must be positive")]
    NonPositiveLimit(&'static str),
}

/// Whether transitions fire immediately or wait for operator confirmation.
///
/// A mode flag consulted at transition guards, not a robot variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationMode {
    /// The robot handles the entire operation without prompting.
    #[default]
    FullAuto,
    /// Guarded transitions require external confirmation before firing.
    SemiAuto,
}

/// Configuration for the robot orchestrator and its warehouse limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Maximum battery capacity.
    pub max_capacity: f64,
    /// Battery level at startup.
    pub initial_capacity: f64,
    /// Battery cost of one navigation leg.
    pub move_cost: f64,
    /// Battery cost of one verify-and-grip round.
    pub retrieve_cost: f64,
    /// Battery cost of one packing pass.
    pub pack_cost: f64,
    /// Capacity restored per charging step.
    pub charge_rate: f64,
    /// Below this level the robot charges before its next step.
    pub low_battery_threshold: f64,
    /// Pause per charging step, in milliseconds. Zero in tests.
    pub charge_tick_ms: u64,
    /// Heaviest item the warehouse accepts.
    pub max_item_weight: f64,
    /// Most units a single order may request.
    pub max_items_per_order: u32,
    /// Ring-buffer capacity of the operation log.
    pub operation_log_capacity: usize,
    /// Full or semi automatic operation.
    pub automation_mode: AutomationMode,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100.0,
            initial_capacity: 100.0,
            move_cost: 15.0,
            retrieve_cost: 10.0,
            pack_cost: 5.0,
            charge_rate: 20.0,
            low_battery_threshold: 25.0,
            charge_tick_ms: 100,
            max_item_weight: 50.0,
            max_items_per_order: 20,
            operation_log_capacity: 100,
            automation_mode: AutomationMode::FullAuto,
        }
    }
}

impl RobotConfig {
    /// Set the automation mode.
    pub fn with_mode(mut self, mode: AutomationMode) -> Self {
        self.automation_mode = mode;
        self
    }

    /// Set the starting battery level.
    pub fn with_initial_capacity(mut self, level: f64) -> Self {
        self.initial_capacity = level;
        self
    }

    /// Remove the charging pause; used by tests and benchmarks.
    pub fn without_charge_pause(mut self) -> Self {
        self.charge_tick_ms = 0;
        self
    }

    /// Pause between charging steps.
    pub fn charge_tick(&self) -> Duration {
        Duration::from_millis(self.charge_tick_ms)
    }

    /// Check the configuration for values the orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_capacity <= 0.0 {
            return Err(ConfigError::NonPositiveCapacity(self.max_capacity));
        }
        if self.initial_capacity > self.max_capacity {
            return Err(ConfigError::InitialAboveMax {
                initial: self.initial_capacity,
                max: self.max_capacity,
            });
        }
        for (name, value) in [
            ("move_cost", self.move_cost),
            ("retrieve_cost", self.retrieve_cost),
            ("pack_cost", self.pack_cost),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeCost { name, value });
            }
            if value > self.max_capacity {
                return Err(ConfigError::CostAboveCapacity {
                    name,
                    value,
                    max: self.max_capacity,
                });
            }
        }
        if self.charge_rate <= 0.0 {
            return Err(ConfigError::NonPositiveChargeRate(self.charge_rate));
        }
        if self.low_battery_threshold >= self.max_capacity {
            return Err(ConfigError::ThresholdAboveMax {
                threshold: self.low_battery_threshold,
                max: self.max_capacity,
            });
        }
        if self.max_item_weight <= 0.0 {
            return Err(ConfigError::NonPositiveLimit("max_item_weight"));
        }
        if self.max_items_per_order == 0 {
            return Err(ConfigError::NonPositiveLimit("max_items_per_order"));
        }
        if self.operation_log_capacity == 0 {
            return Err(ConfigError::NonPositiveLimit("operation_log_capacity"));
        }
        Ok(())
    }
}

/// Failure rates for the simulated capability providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationProfile {
    /// Chance of hitting an obstacle on a navigation leg.
    pub obstacle_chance: f64,
    /// Chance that an automatic reroute around an obstacle fails.
    pub reroute_failure_chance: f64,
    /// Chance that a location scan fails outright.
    pub sensor_failure_rate: f64,
    /// Chance that a pick attempt faults.
    pub grip_failure_rate: f64,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            obstacle_chance: 0.15,
            reroute_failure_chance: 0.30,
            sensor_failure_rate: 0.10,
            grip_failure_rate: 0.05,
        }
    }
}

impl SimulationProfile {
    /// A profile where every capability call succeeds.
    pub fn reliable() -> Self {
        Self {
            obstacle_chance: 0.0,
            reroute_failure_chance: 0.0,
            sensor_failure_rate: 0.0,
            grip_failure_rate: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RobotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.automation_mode, AutomationMode::FullAuto);
        assert_eq!(config.initial_capacity, config.max_capacity);
    }

    #[test]
    fn builders_adjust_fields() {
        let config = RobotConfig::default()
            .with_mode(AutomationMode::SemiAuto)
            .with_initial_capacity(5.0)
            .without_charge_pause();
        assert_eq!(config.automation_mode, AutomationMode::SemiAuto);
        assert_eq!(config.initial_capacity, 5.0);
        assert_eq!(config.charge_tick(), Duration::ZERO);
    }

    #[test]
    fn rejects_cost_above_capacity() {
        let mut config = RobotConfig::default();
        config.move_cost = config.max_capacity + 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CostAboveCapacity { name: "move_cost", .. })
        ));
    }

    #[test]
    fn rejects_initial_above_max() {
        let config = RobotConfig::default().with_initial_capacity(500.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InitialAboveMax { .. })
        ));
    }

    #[test]
    fn rejects_threshold_at_or_above_capacity() {
        let mut config = RobotConfig::default();
        config.low_battery_threshold = config.max_capacity;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdAboveMax { .. })
        ));
    }

    #[test]
    fn reliable_profile_never_fails() {
        let profile = SimulationProfile::reliable();
        assert_eq!(profile.obstacle_chance, 0.0);
        assert_eq!(profile.sensor_failure_rate, 0.0);
        assert_eq!(profile.grip_failure_rate, 0.0);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = RobotConfig::default().with_mode(AutomationMode::SemiAuto);
        let json = serde_json::to_string(&config).unwrap();
        let back: RobotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.automation_mode, AutomationMode::SemiAuto);
        assert_eq!(back.max_capacity, config.max_capacity);
    }
}
