//! Simulated capability providers.
//!
//! Stand-ins for real hardware with configurable unreliability: the
//! navigator rolls an obstacle chance per leg and may fail its
//! automatic reroute, the sensor and gripper roll flat failure rates.
//! Each keeps a bounded history of events that telemetry surfaces can
//! read. A [`crate::config::SimulationProfile`] of zeros makes every
//! provider deterministic for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CapabilityError, CapabilityOutcome, Gripper, Navigator, Sensor};
use crate::config::SimulationProfile;
use crate::inventory::Item;

/// Bounded history length for obstacle events and sensor readings.
const EVENT_HISTORY: usize = 32;

fn push_bounded(history: &mut VecDeque<String>, entry: String) {
    if history.len() == EVENT_HISTORY {
        history.pop_front();
    }
    history.push_back(entry);
}

fn roll(chance: f64) -> bool {
    chance > 0.0 && rand::random::<f64>() < chance
}

struct NavState {
    location: String,
    obstacle_events: VecDeque<String>,
}

/// Navigation simulator with obstacle and reroute modelling.
pub struct SimulatedNavigator {
    move_cost: f64,
    obstacle_chance: f64,
    reroute_failure_chance: f64,
    state: Mutex<NavState>,
}

impl SimulatedNavigator {
    pub fn new(home: impl Into<String>, move_cost: f64, profile: &SimulationProfile) -> Self {
        Self {
            move_cost,
            obstacle_chance: profile.obstacle_chance,
            reroute_failure_chance: profile.reroute_failure_chance,
            state: Mutex::new(NavState {
                location: home.into(),
                obstacle_events: VecDeque::new(),
            }),
        }
    }

    /// Recent obstacle events, oldest first.
    pub fn obstacle_events(&self) -> Vec<String> {
        let state = self.state.lock().expect("navigator lock poisoned");
        state.obstacle_events.iter().cloned().collect()
    }
}

#[async_trait]
impl Navigator for SimulatedNavigator {
    fn location(&self) -> String {
        self.state
            .lock()
            .expect("navigator lock poisoned")
            .location
            .clone()
    }

    async fn travel_to(&self, destination: &str) -> Result<CapabilityOutcome, CapabilityError> {
        let from = self.location();
        tracing::debug!(%from, %destination, "navigating");

        if roll(self.obstacle_chance) {
            {
                let mut state = self.state.lock().expect("navigator lock poisoned");
                push_bounded(
                    &mut state.obstacle_events,
                    format!("obstacle en route to {destination}"),
                );
            }
            tracing::warn!(%destination, "obstacle detected, attempting reroute");

            if roll(self.reroute_failure_chance) {
                let mut state = self.state.lock().expect("navigator lock poisoned");
                push_bounded(
                    &mut state.obstacle_events,
                    format!("reroute failed to {destination}"),
                );
                return Err(CapabilityError::Unreachable(destination.to_string()));
            }
            tracing::info!(%destination, "reroute successful");
        }

        self.state
            .lock()
            .expect("navigator lock poisoned")
            .location = destination.to_string();
        Ok(CapabilityOutcome::new(self.move_cost)
            .with_detail(format!("moved {from} -> {destination}")))
    }
}

/// Sensor simulator verifying item presence at a location.
pub struct SimulatedSensor {
    scan_cost: f64,
    failure_rate: f64,
    readings: Mutex<VecDeque<String>>,
}

impl SimulatedSensor {
    pub fn new(scan_cost: f64, profile: &SimulationProfile) -> Self {
        Self {
            scan_cost,
            failure_rate: profile.sensor_failure_rate,
            readings: Mutex::new(VecDeque::new()),
        }
    }

    /// Recent scan readings, oldest first.
    pub fn readings(&self) -> Vec<String> {
        let readings = self.readings.lock().expect("sensor lock poisoned");
        readings.iter().cloned().collect()
    }

    fn record(&self, entry: String) {
        let mut readings = self.readings.lock().expect("sensor lock poisoned");
        push_bounded(&mut readings, entry);
    }
}

#[async_trait]
impl Sensor for SimulatedSensor {
    async fn verify_item(
        &self,
        location: &str,
        expected_id: &str,
    ) -> Result<CapabilityOutcome, CapabilityError> {
        if roll(self.failure_rate) {
            self.record(format!("scan {location}: FAIL"));
            return Err(CapabilityError::ScanFailed(location.to_string()));
        }
        self.record(format!("scan {location}: OK ({expected_id})"));
        Ok(CapabilityOutcome::new(self.scan_cost)
            .with_detail(format!("verified {expected_id} at {location}")))
    }
}

/// Gripper simulator. Tracks what it believes it is holding.
pub struct SimulatedGripper {
    grip_cost: f64,
    failure_rate: f64,
    holding: Mutex<Option<String>>,
}

impl SimulatedGripper {
    pub fn new(grip_cost: f64, profile: &SimulationProfile) -> Self {
        Self {
            grip_cost,
            failure_rate: profile.grip_failure_rate,
            holding: Mutex::new(None),
        }
    }

    /// Item id currently held, if any.
    pub fn holding(&self) -> Option<String> {
        self.holding.lock().expect("gripper lock poisoned").clone()
    }
}

#[async_trait]
impl Gripper for SimulatedGripper {
    async fn pick(&self, item: &Item) -> Result<CapabilityOutcome, CapabilityError> {
        if roll(self.failure_rate) {
            return Err(CapabilityError::GripFault(format!(
                "failed to grip {}",
                item.id()
            )));
        }
        let mut holding = self.holding.lock().expect("gripper lock poisoned");
        *holding = Some(item.id().to_string());
        Ok(CapabilityOutcome::new(self.grip_cost)
            .with_detail(format!("picked {} ({:.1}kg)", item.id(), item.weight())))
    }

    async fn release(&self) -> Result<CapabilityOutcome, CapabilityError> {
        let mut holding = self.holding.lock().expect("gripper lock poisoned");
        let detail = match holding.take() {
            Some(id) => format!("released {id}"),
            None => "gripper already open".to_string(),
        };
        Ok(CapabilityOutcome::new(0.0).with_detail(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reliable() -> SimulationProfile {
        SimulationProfile::reliable()
    }

    fn doomed() -> SimulationProfile {
        SimulationProfile {
            obstacle_chance: 1.0,
            reroute_failure_chance: 1.0,
            sensor_failure_rate: 1.0,
            grip_failure_rate: 1.0,
        }
    }

    #[tokio::test]
    async fn reliable_navigator_always_arrives() {
        let navigator = SimulatedNavigator::new("DOCK", 15.0, &reliable());
        let outcome = navigator.travel_to("A1").await.unwrap();
        assert_eq!(outcome.cost_consumed, 15.0);
        assert_eq!(navigator.location(), "A1");
        assert!(navigator.obstacle_events().is_empty());
    }

    #[tokio::test]
    async fn doomed_navigator_records_the_obstacle() {
        let navigator = SimulatedNavigator::new("DOCK", 15.0, &doomed());
        let err = navigator.travel_to("A1").await.unwrap_err();
        assert_eq!(err, CapabilityError::Unreachable("A1".into()));
        // Location is unchanged after a failed leg.
        assert_eq!(navigator.location(), "DOCK");
        assert_eq!(navigator.obstacle_events().len(), 2);
    }

    #[tokio::test]
    async fn obstacle_with_successful_reroute_still_arrives() {
        let profile = SimulationProfile {
            obstacle_chance: 1.0,
            reroute_failure_chance: 0.0,
            ..reliable()
        };
        let navigator = SimulatedNavigator::new("DOCK", 15.0, &profile);
        navigator.travel_to("B2").await.unwrap();
        assert_eq!(navigator.location(), "B2");
        assert_eq!(navigator.obstacle_events().len(), 1);
    }

    #[tokio::test]
    async fn sensor_records_readings_both_ways() {
        let ok_sensor = SimulatedSensor::new(1.0, &reliable());
        ok_sensor.verify_item("A1", "SKU001").await.unwrap();
        assert_eq!(ok_sensor.readings(), ["scan A1: OK (SKU001)"]);

        let bad_sensor = SimulatedSensor::new(1.0, &doomed());
        let err = bad_sensor.verify_item("A1", "SKU001").await.unwrap_err();
        assert_eq!(err, CapabilityError::ScanFailed("A1".into()));
        assert_eq!(bad_sensor.readings(), ["scan A1: FAIL"]);
    }

    #[tokio::test]
    async fn gripper_tracks_held_item_and_release_is_idempotent() {
        let gripper = SimulatedGripper::new(2.0, &reliable());
        let item = Item::new("SKU001", "Laptop", 2.5, true, "A1").unwrap();

        gripper.pick(&item).await.unwrap();
        assert_eq!(gripper.holding(), Some("SKU001".to_string()));

        gripper.release().await.unwrap();
        assert_eq!(gripper.holding(), None);
        // Releasing with nothing held must still succeed.
        let outcome = gripper.release().await.unwrap();
        assert_eq!(outcome.detail.as_deref(), Some("gripper already open"));
    }

    #[tokio::test]
    async fn doomed_gripper_faults() {
        let gripper = SimulatedGripper::new(2.0, &doomed());
        let item = Item::new("SKU001", "Laptop", 2.5, true, "A1").unwrap();
        assert!(matches!(
            gripper.pick(&item).await,
            Err(CapabilityError::GripFault(_))
        ));
        assert_eq!(gripper.holding(), None);
    }
}
