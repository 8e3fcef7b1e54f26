//! Call boundary to the device backend.

use super::wire::{DeviceStatus, Mode};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The four exchanges the backend supports.
///
/// Each call is a single request/response with no retry or caching. A failure
/// is reported as a transport-class [`ControlError`](crate::error::ControlError)
/// and never touches local state.
#[async_trait]
pub trait RemoteControlClient: Send + Sync {
    /// Read the device's current regime and actuator states.
    async fn read_status(&self) -> Result<DeviceStatus>;

    /// Ask the device to switch regimes.
    async fn set_mode(&self, mode: Mode) -> Result<()>;

    /// Energize (`true`) or de-energize the ventilation fan.
    async fn set_fan(&self, on: bool) -> Result<()>;

    /// Energize (`true`) or de-energize the water pump.
    async fn set_pump(&self, on: bool) -> Result<()>;
}

#[async_trait]
impl<T: RemoteControlClient + ?Sized> RemoteControlClient for Arc<T> {
    async fn read_status(&self) -> Result<DeviceStatus> {
        (**self).read_status().await
    }

    async fn set_mode(&self, mode: Mode) -> Result<()> {
        (**self).set_mode(mode).await
    }

    async fn set_fan(&self, on: bool) -> Result<()> {
        (**self).set_fan(on).await
    }

    async fn set_pump(&self, on: bool) -> Result<()> {
        (**self).set_pump(on).await
    }
}
