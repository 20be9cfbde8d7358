//! Robot operational states and the pure transition function.
//!
//! The state machine is explicit data: [`RobotStatus`] plus
//! [`transition`], a pure `(current, event) -> next` function the
//! orchestrator applies. It can be tested without driving the whole
//! robot, and an illegal transition is a bug surfaced as
//! [`TransitionError`], never silently absorbed.

use serde::Serialize;
use thiserror::Error;

/// Operational state of the single robot instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Idle,
    Navigating,
    Retrieving,
    Packing,
    Charging,
    Error,
}

/// Events that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotEvent {
    /// A task was pulled from the queue.
    TaskDequeued,
    /// The battery cannot cover the next step.
    ChargingNeeded,
    /// Charging finished; resume the interrupted state.
    ChargeComplete { resume: RobotStatus },
    /// Navigation reached the target shelf.
    Arrived,
    /// Verification and grip succeeded, item staged at the station.
    RetrievalComplete,
    /// Staged items handed to the optimizer; the task is done.
    PackingComplete,
    /// An unrecoverable capability failure occurred.
    Fault,
    /// Error cleanup finished (held items released).
    Recovered,
}

/// Error type for illegal state transitions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("No transition from {from:?} on {event:?}")]
pub struct TransitionError {
    pub from: RobotStatus,
    pub event: RobotEvent,
}

/// Apply one event to a state.
///
/// Charging is reachable from any active state and resumes exactly the
/// state it interrupted, so the in-flight task is never lost or
/// re-queued. Error is reachable from any non-idle state.
pub fn transition(from: RobotStatus, event: RobotEvent) -> Result<RobotStatus, TransitionError> {
    use RobotEvent as E;
    use RobotStatus as S;

    let next = match (from, event) {
        (S::Idle, E::TaskDequeued) => S::Navigating,
        (S::Navigating | S::Retrieving | S::Packing, E::ChargingNeeded) => S::Charging,
        (S::Charging, E::ChargeComplete { resume })
            if matches!(resume, S::Navigating | S::Retrieving | S::Packing) =>
        {
            resume
        }
        (S::Navigating, E::Arrived) => S::Retrieving,
        (S::Retrieving, E::RetrievalComplete) => S::Packing,
        (S::Packing, E::PackingComplete) => S::Idle,
        (S::Navigating | S::Retrieving | S::Packing | S::Charging, E::Fault) => S::Error,
        (S::Error, E::Recovered) => S::Idle,
        _ => return Err(TransitionError { from, event }),
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_cycle() {
        let mut status = RobotStatus::Idle;
        for event in [
            RobotEvent::TaskDequeued,
            RobotEvent::Arrived,
            RobotEvent::RetrievalComplete,
            RobotEvent::PackingComplete,
        ] {
            status = transition(status, event).unwrap();
        }
        assert_eq!(status, RobotStatus::Idle);
    }

    #[test]
    fn charging_resumes_the_interrupted_state() {
        for interrupted in [
            RobotStatus::Navigating,
            RobotStatus::Retrieving,
            RobotStatus::Packing,
        ] {
            let charging = transition(interrupted, RobotEvent::ChargingNeeded).unwrap();
            assert_eq!(charging, RobotStatus::Charging);
            let resumed = transition(
                charging,
                RobotEvent::ChargeComplete {
                    resume: interrupted,
                },
            )
            .unwrap();
            assert_eq!(resumed, interrupted);
        }
    }

    #[test]
    fn charge_complete_cannot_resume_idle() {
        let err = transition(
            RobotStatus::Charging,
            RobotEvent::ChargeComplete {
                resume: RobotStatus::Idle,
            },
        )
        .unwrap_err();
        assert_eq!(err.from, RobotStatus::Charging);
    }

    #[test]
    fn fault_reaches_error_then_recovers_to_idle() {
        for from in [
            RobotStatus::Navigating,
            RobotStatus::Retrieving,
            RobotStatus::Packing,
            RobotStatus::Charging,
        ] {
            let status = transition(from, RobotEvent::Fault).unwrap();
            assert_eq!(status, RobotStatus::Error);
        }
        assert_eq!(
            transition(RobotStatus::Error, RobotEvent::Recovered).unwrap(),
            RobotStatus::Idle
        );
    }

    #[test]
    fn illegal_moves_are_rejected() {
        assert!(transition(RobotStatus::Idle, RobotEvent::Arrived).is_err());
        assert!(transition(RobotStatus::Idle, RobotEvent::ChargingNeeded).is_err());
        assert!(transition(RobotStatus::Packing, RobotEvent::TaskDequeued).is_err());
        assert!(transition(RobotStatus::Error, RobotEvent::Fault).is_err());
    }
}
