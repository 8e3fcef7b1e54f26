//! Plain-text rendering of a control snapshot for the operator console.

use crate::control::{Actuator, Snapshot};
use crate::remote::Mode;
use std::fmt::Write;

/// Operator action, used to pick the notice shown when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    ChangeMode,
    Toggle(Actuator),
}

impl Operation {
    /// Blocking notice shown to the operator after a failed operation.
    pub fn failure_notice(&self) -> &'static str {
        match self {
            Operation::Initialize => "Failed to load device status. Showing defaults.",
            Operation::ChangeMode => "Failed to change mode. Please try again.",
            Operation::Toggle(Actuator::Fan) => "Failed to update fan status",
            Operation::Toggle(Actuator::Pump) => "Failed to update pump status",
        }
    }
}

/// Render the panel: title, mode selector, both actuators and the system
/// status sentence.
pub fn render(name: &str, snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let _ = write!(out, "{}", name);
    if snapshot.busy {
        out.push_str(" (Updating...)");
    }
    out.push('\n');

    let selector: Vec<String> = [Mode::Automatic, Mode::Manual]
        .iter()
        .map(|mode| {
            if *mode == snapshot.mode {
                format!("[{}]", mode.label())
            } else {
                format!(" {} ", mode.label())
            }
        })
        .collect();
    let _ = writeln!(out, "  Mode: {}", selector.join(" "));

    for actuator in [Actuator::Fan, Actuator::Pump] {
        let state = if snapshot.actuator(actuator) { "ON" } else { "OFF" };
        let _ = write!(out, "  {:<12} {:<3}", actuator.label(), state);
        if snapshot.mode == Mode::Automatic {
            let _ = write!(
                out,
                "  (Controlled automatically based on {})",
                actuator.automatic_basis()
            );
        } else if !snapshot.actuators_enabled() {
            out.push_str("  (locked)");
        }
        out.push('\n');
    }

    let _ = writeln!(out, "  Current System Status: {}", snapshot.mode.description());
    out
}
