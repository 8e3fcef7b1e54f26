//! Mutual exclusion between the automatic and manual regimes.
//!
//! Actuator commands from the operator are only meaningful while the device
//! is in manual mode. Every toggle checks this predicate before anything
//! else happens; a toggle that fails it is dropped without contacting the
//! device and without entering the busy span.

use crate::remote::Mode;

/// True when the operator may command the actuators directly.
pub fn actuator_commands_allowed(mode: Mode) -> bool {
    mode == Mode::Manual
}
