//! reqwest-backed client for the device backend's HTTP API.

use super::client::RemoteControlClient;
use super::wire::{DeviceStatus, Mode, ModeRequest, StateRequest, StatusPayload};
use crate::config::RemoteConfig;
use crate::error::{ControlError, Result};
use async_trait::async_trait;
use log::debug;
use serde::Serialize;

/// HTTP client issuing the status read and the three commands.
pub struct HttpControlClient {
    http: reqwest::Client,
    status_url: String,
    mode_url: String,
    fan_url: String,
    pump_url: String,
}

impl HttpControlClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let base = config.base_url.trim();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ControlError::InvalidConfig(format!(
                "API URL must start with http:// or https://, got: {}",
                base
            )));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ControlError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            status_url: endpoint(base, &config.status_path),
            mode_url: endpoint(base, &config.mode_path),
            fan_url: endpoint(base, &config.fan_path),
            pump_url: endpoint(base, &config.pump_path),
        })
    }

    /// URL of the status resource.
    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        debug!("[Remote] POST {}", url);
        self.http
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}

#[async_trait]
impl RemoteControlClient for HttpControlClient {
    async fn read_status(&self) -> Result<DeviceStatus> {
        debug!("[Remote] GET {}", self.status_url);
        let payload: StatusPayload = self
            .http
            .get(&self.status_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(payload.into())
    }

    async fn set_mode(&self, mode: Mode) -> Result<()> {
        self.post(&self.mode_url, &ModeRequest { mode }).await
    }

    async fn set_fan(&self, on: bool) -> Result<()> {
        self.post(&self.fan_url, &StateRequest { state: on }).await
    }

    async fn set_pump(&self, on: bool) -> Result<()> {
        self.post(&self.pump_url, &StateRequest { state: on }).await
    }
}
