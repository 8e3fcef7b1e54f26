//! Remote control boundary to the device backend.
//!
//! This module only transports requests: it holds no state and never retries.

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod http;
mod wire;

pub use client::RemoteControlClient;
pub use http::HttpControlClient;
pub use wire::{DeviceStatus, Mode};
