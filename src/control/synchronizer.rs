//! Control-state synchronizer.
//!
//! Owns the UI's copy of `{mode, fan, pump}` and mediates every read and
//! write against the device. Fields only change after the device confirmed
//! them; there are no optimistic updates. Every operation except a guarded
//! toggle runs inside a single busy span, and at most one span exists at a
//! time.
//!
//! The current [`Snapshot`] is published on a `watch` channel so a UI
//! binding can re-render whenever it changes.

use super::busy::{BusyGate, BusyPermit};
use super::guard::actuator_commands_allowed;
use super::state::{Actuator, ControlState, Snapshot};
use crate::error::{ControlError, Result};
use crate::remote::{Mode, RemoteControlClient};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tokio::sync::watch;

/// Result of a successful [`ControlStateSynchronizer::change_mode`].
#[derive(Debug)]
pub enum ModeChange {
    /// The mode switch was confirmed (and, for automatic mode, the
    /// actuators were refreshed from the device).
    Confirmed,
    /// The device switched to automatic mode but the follow-up status read
    /// failed; the actuators still show their last confirmed values.
    ReadBackFailed(ControlError),
}

/// Result of a successful actuator toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The device confirmed the new state.
    Applied(bool),
    /// The device is in automatic mode; nothing was sent.
    Ignored,
}

struct Shared {
    state: Mutex<ControlState>,
    gate: BusyGate,
    snapshots: watch::Sender<Snapshot>,
}

impl Shared {
    fn update(&self, apply: impl FnOnce(&mut ControlState)) {
        apply(&mut self.state.lock());
        self.publish();
    }

    /// Push the current state to subscribers, bumping the version if
    /// anything changed.
    fn publish(&self) {
        self.snapshots.send_if_modified(|current| {
            let next = Snapshot::new(*self.state.lock(), self.gate.is_busy(), current.version);
            if next.same_values(current) {
                return false;
            }
            *current = Snapshot {
                version: current.version + 1,
                ..next
            };
            true
        });
    }
}

/// Busy span of one operation. Releases the gate and republishes on drop,
/// including when the operation future is cancelled.
struct Pending<'a> {
    shared: &'a Shared,
    permit: Option<BusyPermit<'a>>,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.permit.take();
        self.shared.publish();
    }
}

/// Keeps local control state consistent with the device.
pub struct ControlStateSynchronizer<C> {
    client: C,
    shared: Shared,
}

impl<C: RemoteControlClient> ControlStateSynchronizer<C> {
    /// Create a synchronizer with the bootstrap state (automatic, both
    /// actuators off, idle). Call [`initialize`](Self::initialize) next.
    pub fn new(client: C) -> Self {
        let state = ControlState::default();
        let (snapshots, _) = watch::channel(Snapshot::new(state, false, 0));

        Self {
            client,
            shared: Shared {
                state: Mutex::new(state),
                gate: BusyGate::new(),
                snapshots,
            },
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        *self.shared.snapshots.borrow()
    }

    /// Receive every future snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn begin(&self) -> Result<Pending<'_>> {
        let permit = self.shared.gate.try_enter()?;
        self.shared.publish();
        Ok(Pending {
            shared: &self.shared,
            permit: Some(permit),
        })
    }

    /// Replace the bootstrap state with the device's current status.
    ///
    /// A missing or unknown mode is taken as automatic. On failure the
    /// bootstrap values stay in place and the error is returned for display.
    pub async fn initialize(&self) -> Result<()> {
        let _pending = self.begin()?;

        debug!("[Control] Reading initial device status");
        match self.client.read_status().await {
            Ok(status) => {
                let mode = status.mode.unwrap_or_default();
                self.shared.update(|state| {
                    state.mode = mode;
                    state.fan_status = status.fan_status;
                    state.pump_status = status.pump_status;
                });
                info!(
                    "[Control] Initial status: mode={}, fan={}, pump={}",
                    mode, status.fan_status, status.pump_status
                );
                Ok(())
            }
            Err(e) => {
                error!("[Control] Error fetching initial status: {}", e);
                Err(e)
            }
        }
    }

    /// Switch the device to `target`.
    ///
    /// `mode` only changes once the device acknowledged the switch. Entering
    /// automatic mode re-reads the actuators, since the device's controller
    /// may already have changed them; the mode reported by that read is not
    /// used, the just-confirmed `target` stands.
    pub async fn change_mode(&self, target: Mode) -> Result<ModeChange> {
        let _pending = self.begin()?;

        debug!("[Control] Requesting mode {}", target);
        if let Err(e) = self.client.set_mode(target).await {
            error!("[Control] Error changing mode to {}: {}", target, e);
            return Err(e);
        }

        self.shared.update(|state| state.mode = target);
        info!("[Control] Mode changed to {}", target);

        if target != Mode::Automatic {
            return Ok(ModeChange::Confirmed);
        }

        match self.client.read_status().await {
            Ok(status) => {
                if let Some(reported) = status.mode
                    && reported != target
                {
                    warn!(
                        "[Control] Read-back reported mode {} after switching to {}, keeping {}",
                        reported, target, target
                    );
                }
                self.shared.update(|state| {
                    state.fan_status = status.fan_status;
                    state.pump_status = status.pump_status;
                });
                info!(
                    "[Control] Automatic mode actuators: fan={}, pump={}",
                    status.fan_status, status.pump_status
                );
                Ok(ModeChange::Confirmed)
            }
            Err(e) => {
                warn!(
                    "[Control] Mode is {} but actuator read-back failed: {}",
                    target, e
                );
                Ok(ModeChange::ReadBackFailed(e))
            }
        }
    }

    /// Flip the fan. Ignored unless the device is in manual mode.
    pub async fn toggle_fan(&self) -> Result<ToggleOutcome> {
        self.toggle(Actuator::Fan).await
    }

    /// Flip the pump. Ignored unless the device is in manual mode.
    pub async fn toggle_pump(&self) -> Result<ToggleOutcome> {
        self.toggle(Actuator::Pump).await
    }

    async fn toggle(&self, actuator: Actuator) -> Result<ToggleOutcome> {
        let mode = self.shared.state.lock().mode;
        if !actuator_commands_allowed(mode) {
            debug!(
                "[Control] Ignoring {} toggle while in {}",
                actuator.label(),
                mode
            );
            return Ok(ToggleOutcome::Ignored);
        }

        let _pending = self.begin()?;

        let next = !self.shared.state.lock().actuator(actuator);
        debug!("[Control] Requesting {} {}", actuator.label(), on_off(next));

        let result = match actuator {
            Actuator::Fan => self.client.set_fan(next).await,
            Actuator::Pump => self.client.set_pump(next).await,
        };

        match result {
            Ok(()) => {
                self.shared.update(|state| state.set_actuator(actuator, next));
                info!("[Control] {} turned {}", actuator.label(), on_off(next));
                Ok(ToggleOutcome::Applied(next))
            }
            Err(e) => {
                error!(
                    "[Control] Error changing {} status: {}",
                    actuator.label(),
                    e
                );
                Err(e)
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::{Call, ScriptedClient};
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn state(mode: Mode, fan_status: bool, pump_status: bool) -> ControlState {
        ControlState {
            mode,
            fan_status,
            pump_status,
        }
    }

    /// Synchronizer initialized from the client's first scripted status.
    async fn synced(client: ScriptedClient) -> ControlStateSynchronizer<ScriptedClient> {
        let sync = ControlStateSynchronizer::new(client);
        sync.initialize().await.unwrap();
        sync
    }

    #[tokio::test]
    async fn test_new_uses_bootstrap_state() {
        let sync = ControlStateSynchronizer::new(ScriptedClient::new());
        let snapshot = sync.snapshot();
        assert_eq!(snapshot.state(), ControlState::default());
        assert!(!snapshot.busy);
        assert_eq!(snapshot.version, 0);
    }

    #[tokio::test]
    async fn test_initialize_adopts_device_status() {
        let client = ScriptedClient::new().status(Some(Mode::Manual), true, false);
        let sync = ControlStateSynchronizer::new(client);

        assert_ok!(sync.initialize().await);
        let snapshot = sync.snapshot();
        assert_eq!(snapshot.state(), state(Mode::Manual, true, false));
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn test_initialize_defaults_missing_mode() {
        let client = ScriptedClient::new().status(None, false, true);
        let sync = ControlStateSynchronizer::new(client);

        assert_ok!(sync.initialize().await);
        assert_eq!(sync.snapshot().state(), state(Mode::Automatic, false, true));
    }

    #[tokio::test]
    async fn test_initialize_failure_keeps_bootstrap() {
        let client = ScriptedClient::new().status_fails("unreachable");
        let sync = ControlStateSynchronizer::new(client);

        let err = assert_err!(sync.initialize().await);
        assert!(err.is_transport());
        assert_eq!(sync.snapshot().state(), ControlState::default());
        assert!(!sync.snapshot().busy);
    }

    #[tokio::test]
    async fn test_toggle_fan_in_manual() {
        let sync = synced(ScriptedClient::new().status(Some(Mode::Manual), false, false)).await;

        let outcome = assert_ok!(sync.toggle_fan().await);
        assert_eq!(outcome, ToggleOutcome::Applied(true));
        assert_eq!(sync.snapshot().state(), state(Mode::Manual, true, false));
        assert_eq!(sync.client().calls().last(), Some(&Call::SetFan(true)));
    }

    #[tokio::test]
    async fn test_toggle_failure_keeps_state() {
        let sync = synced(
            ScriptedClient::new()
                .status(Some(Mode::Manual), false, true)
                .command_fails("relay timeout"),
        )
        .await;
        let before = sync.snapshot().state();

        let err = assert_err!(sync.toggle_pump().await);
        assert!(err.is_transport());
        assert_eq!(sync.snapshot().state(), before);
        assert!(!sync.snapshot().busy);

        // Retried by the operator once the device answers again
        let outcome = assert_ok!(sync.toggle_pump().await);
        assert_eq!(outcome, ToggleOutcome::Applied(false));
        assert_eq!(sync.snapshot().state(), state(Mode::Manual, false, false));
    }

    #[tokio::test]
    async fn test_toggle_ignored_in_automatic() {
        let sync = synced(ScriptedClient::new().status(Some(Mode::Automatic), true, false)).await;
        let before = sync.snapshot();
        let rx = sync.subscribe();

        assert_eq!(sync.toggle_fan().await.unwrap(), ToggleOutcome::Ignored);
        assert_eq!(sync.toggle_pump().await.unwrap(), ToggleOutcome::Ignored);

        assert_eq!(sync.snapshot(), before);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(sync.client().calls(), vec![Call::ReadStatus]);
    }

    #[tokio::test]
    async fn test_change_mode_to_manual() {
        let sync = synced(ScriptedClient::new().status(Some(Mode::Automatic), true, true)).await;

        let outcome = assert_ok!(sync.change_mode(Mode::Manual).await);
        assert!(matches!(outcome, ModeChange::Confirmed));
        assert_eq!(sync.snapshot().state(), state(Mode::Manual, true, true));
        assert_eq!(
            sync.client().calls(),
            vec![Call::ReadStatus, Call::SetMode(Mode::Manual)]
        );
    }

    #[tokio::test]
    async fn test_change_mode_failure_keeps_mode() {
        let client = ScriptedClient::new()
            .status(Some(Mode::Automatic), false, true)
            .command_fails("backend down");
        let sync = synced(client).await;
        let before = sync.snapshot().state();

        let err = assert_err!(sync.change_mode(Mode::Manual).await);
        assert!(err.is_transport());
        assert_eq!(sync.snapshot().state(), before);
        assert!(!sync.snapshot().busy);
    }

    #[tokio::test]
    async fn test_change_mode_to_automatic_reads_back_actuators() {
        let client = ScriptedClient::new()
            .status(Some(Mode::Manual), true, true)
            .status(Some(Mode::Automatic), false, true);
        let sync = synced(client).await;

        let outcome = assert_ok!(sync.change_mode(Mode::Automatic).await);
        assert!(matches!(outcome, ModeChange::Confirmed));
        assert_eq!(sync.snapshot().state(), state(Mode::Automatic, false, true));
        assert_eq!(
            sync.client().calls(),
            vec![
                Call::ReadStatus,
                Call::SetMode(Mode::Automatic),
                Call::ReadStatus
            ]
        );
    }

    #[tokio::test]
    async fn test_automatic_read_back_mode_is_not_trusted() {
        let client = ScriptedClient::new()
            .status(Some(Mode::Manual), true, false)
            .status(Some(Mode::Manual), false, false);
        let sync = synced(client).await;

        assert_ok!(sync.change_mode(Mode::Automatic).await);
        assert_eq!(sync.snapshot().state(), state(Mode::Automatic, false, false));
    }

    #[tokio::test]
    async fn test_automatic_read_back_failure_is_partial_success() {
        let client = ScriptedClient::new()
            .status(Some(Mode::Manual), true, false)
            .status_fails("timeout");
        let sync = synced(client).await;

        let outcome = assert_ok!(sync.change_mode(Mode::Automatic).await);
        assert!(matches!(outcome, ModeChange::ReadBackFailed(ref e) if e.is_transport()));
        assert_eq!(sync.snapshot().state(), state(Mode::Automatic, true, false));
        assert!(!sync.snapshot().busy);
    }

    #[tokio::test]
    async fn test_overlapping_operation_is_rejected() {
        let client = Arc::new(ScriptedClient::new().status(Some(Mode::Manual), false, false));
        let sync = Arc::new(ControlStateSynchronizer::new(client.clone()));
        sync.initialize().await.unwrap();

        let release = client.hold_next_command();
        let mut rx = sync.subscribe();

        let pending = tokio::spawn({
            let sync = sync.clone();
            async move { sync.toggle_fan().await }
        });

        rx.wait_for(|snapshot| snapshot.busy).await.unwrap();
        assert!(!sync.snapshot().actuators_enabled());
        assert!(!sync.snapshot().mode_selectable());

        assert!(matches!(
            sync.change_mode(Mode::Automatic).await,
            Err(ControlError::Busy)
        ));
        assert!(matches!(sync.toggle_pump().await, Err(ControlError::Busy)));
        // Not yet confirmed, so still showing the old value
        assert!(!sync.snapshot().fan_status);

        release.send(()).unwrap();
        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome, ToggleOutcome::Applied(true));

        let snapshot = sync.snapshot();
        assert!(snapshot.fan_status);
        assert!(!snapshot.busy);
        assert_eq!(
            client.calls(),
            vec![Call::ReadStatus, Call::SetFan(true)]
        );
    }

    #[tokio::test]
    async fn test_cancelled_operation_releases_busy() {
        let client = Arc::new(ScriptedClient::new().status(Some(Mode::Manual), false, false));
        let sync = ControlStateSynchronizer::new(client.clone());
        sync.initialize().await.unwrap();

        let _release = client.hold_next_command();
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            sync.toggle_pump(),
        )
        .await;

        assert!(result.is_err());
        assert!(!sync.snapshot().busy);
        assert!(!sync.snapshot().pump_status);
    }

    #[tokio::test]
    async fn test_snapshot_versions_track_busy_span() {
        let sync = synced(ScriptedClient::new().status(Some(Mode::Manual), false, false)).await;
        let start = sync.snapshot().version;

        sync.toggle_fan().await.unwrap();

        // busy on, fan on, busy off
        assert_eq!(sync.snapshot().version, start + 3);
    }
}
