//! Environmental control panel library.
//!
//! Keeps an operator-facing view of a remote environmental-control device
//! (operating mode, ventilation fan, water pump) consistent with the
//! device's own state across every command.

pub mod config;
pub mod control;
pub mod error;
pub mod panel;
pub mod remote;
