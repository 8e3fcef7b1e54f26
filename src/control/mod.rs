//! Control-state synchronization between the operator panel and the device.

mod busy;
mod guard;
mod state;
mod synchronizer;

pub use busy::{BusyGate, BusyPermit};
pub use guard::actuator_commands_allowed;
pub use state::{Actuator, ControlState, Snapshot};
pub use synchronizer::{ControlStateSynchronizer, ModeChange, ToggleOutcome};
