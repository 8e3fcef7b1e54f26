//! Control state owned by the synchronizer and the snapshot handed to the UI.

use crate::remote::Mode;

/// One of the two switchable actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Fan,
    Pump,
}

impl Actuator {
    /// Operator-facing name.
    pub fn label(&self) -> &'static str {
        match self {
            Actuator::Fan => "Exhaust Fan",
            Actuator::Pump => "Water Pump",
        }
    }

    /// What the device's automatic controller bases this actuator on.
    pub fn automatic_basis(&self) -> &'static str {
        match self {
            Actuator::Fan => "conditions",
            Actuator::Pump => "humidity",
        }
    }
}

/// Last values confirmed by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub mode: Mode,
    pub fan_status: bool,
    pub pump_status: bool,
}

impl ControlState {
    pub fn actuator(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Fan => self.fan_status,
            Actuator::Pump => self.pump_status,
        }
    }

    pub(crate) fn set_actuator(&mut self, actuator: Actuator, on: bool) {
        match actuator {
            Actuator::Fan => self.fan_status = on,
            Actuator::Pump => self.pump_status = on,
        }
    }
}

/// Read-only view of the control state for rendering.
///
/// `version` increases by one every time any other field changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub mode: Mode,
    pub fan_status: bool,
    pub pump_status: bool,
    pub busy: bool,
    pub version: u64,
}

impl Snapshot {
    pub(crate) fn new(state: ControlState, busy: bool, version: u64) -> Self {
        Self {
            mode: state.mode,
            fan_status: state.fan_status,
            pump_status: state.pump_status,
            busy,
            version,
        }
    }

    pub fn state(&self) -> ControlState {
        ControlState {
            mode: self.mode,
            fan_status: self.fan_status,
            pump_status: self.pump_status,
        }
    }

    pub fn actuator(&self, actuator: Actuator) -> bool {
        self.state().actuator(actuator)
    }

    /// Whether the fan and pump controls should accept input.
    pub fn actuators_enabled(&self) -> bool {
        super::guard::actuator_commands_allowed(self.mode) && !self.busy
    }

    /// Whether the mode selector should accept input.
    pub fn mode_selectable(&self) -> bool {
        !self.busy
    }

    /// Same values ignoring `version`.
    pub(crate) fn same_values(&self, other: &Snapshot) -> bool {
        self.state() == other.state() && self.busy == other.busy
    }
}
