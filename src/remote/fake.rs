//! Scripted in-memory client for synchronizer tests.

use super::client::RemoteControlClient;
use super::wire::{DeviceStatus, Mode};
use crate::error::{ControlError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ReadStatus,
    SetMode(Mode),
    SetFan(bool),
    SetPump(bool),
}

/// Replays queued responses in order and records every call.
///
/// A call with nothing queued succeeds (commands) or fails (status reads).
#[derive(Default)]
pub struct ScriptedClient {
    statuses: Mutex<VecDeque<std::result::Result<DeviceStatus, String>>>,
    commands: Mutex<VecDeque<std::result::Result<(), String>>>,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(self, mode: Option<Mode>, fan_status: bool, pump_status: bool) -> Self {
        self.statuses.lock().push_back(Ok(DeviceStatus {
            mode,
            fan_status,
            pump_status,
        }));
        self
    }

    pub fn status_fails(self, reason: &str) -> Self {
        self.statuses.lock().push_back(Err(reason.to_string()));
        self
    }

    pub fn command_ok(self) -> Self {
        self.commands.lock().push_back(Ok(()));
        self
    }

    pub fn command_fails(self, reason: &str) -> Self {
        self.commands.lock().push_back(Err(reason.to_string()));
        self
    }

    /// Make the next command wait until the returned sender fires.
    pub fn hold_next_command(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.lock() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    async fn command(&self, call: Call) -> Result<()> {
        self.calls.lock().push(call);

        let hold = self.hold.lock().take();
        if let Some(hold) = hold {
            let _ = hold.await;
        }

        match self.commands.lock().pop_front() {
            Some(Err(reason)) => Err(ControlError::Transport(reason)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteControlClient for ScriptedClient {
    async fn read_status(&self) -> Result<DeviceStatus> {
        self.calls.lock().push(Call::ReadStatus);
        match self.statuses.lock().pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err(reason)) => Err(ControlError::Transport(reason)),
            None => Err(ControlError::Transport("no scripted status".to_string())),
        }
    }

    async fn set_mode(&self, mode: Mode) -> Result<()> {
        self.command(Call::SetMode(mode)).await
    }

    async fn set_fan(&self, on: bool) -> Result<()> {
        self.command(Call::SetFan(on)).await
    }

    async fn set_pump(&self, on: bool) -> Result<()> {
        self.command(Call::SetPump(on)).await
    }
}
