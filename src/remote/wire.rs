//! JSON payloads exchanged with the device backend.
//!
//! The backend speaks the device firmware's vocabulary: the automatic regime
//! is `"otomatis"` and the manual regime is `"manual"`.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Control regime of the device.
///
/// In `Automatic` the device's own controller drives the actuators and the
/// operator may only observe them; in `Manual` the operator switches them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Mode {
    #[default]
    #[serde(rename = "otomatis")]
    #[strum(serialize = "otomatis")]
    Automatic,
    #[serde(rename = "manual")]
    #[strum(serialize = "manual")]
    Manual,
}

impl Mode {
    /// Parse a mode value as sent by the backend. Unknown values yield `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// Operator-facing name of the regime.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Automatic => "Auto Mode",
            Mode::Manual => "Manual Mode",
        }
    }

    /// Status sentence describing what the regime means for the actuators.
    pub fn description(&self) -> &'static str {
        match self {
            Mode::Automatic => {
                "System is in automatic smart mode. Devices will be intelligently controlled based on real-time sensor data."
            }
            Mode::Manual => {
                "System is in full manual mode. You have complete direct control over all devices."
            }
        }
    }
}

/// Device status as returned by the status read.
///
/// `mode` is `None` when the backend omitted it or sent a value outside the
/// two known regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub mode: Option<Mode>,
    pub fan_status: bool,
    pub pump_status: bool,
}

/// Raw body of `GET status`. The backend also reports sensor readings in
/// the same document; those are ignored here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusPayload {
    #[serde(default)]
    pub mode: Option<String>,
    pub fan_status: bool,
    pub pump_status: bool,
}

impl From<StatusPayload> for DeviceStatus {
    fn from(payload: StatusPayload) -> Self {
        let mode = payload.mode.as_deref().and_then(|value| {
            let mode = Mode::from_wire(value);
            if mode.is_none() {
                log::warn!("[Remote] Unknown mode value from backend: {:?}", value);
            }
            mode
        });

        Self {
            mode,
            fan_status: payload.fan_status,
            pump_status: payload.pump_status,
        }
    }
}

/// Body of `POST mode`.
#[derive(Debug, Serialize)]
pub(crate) struct ModeRequest {
    pub mode: Mode,
}

/// Body of `POST fan` and `POST pump`.
#[derive(Debug, Serialize)]
pub(crate) struct StateRequest {
    pub state: bool,
}
