// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of VoltGuard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Plain-text output for the terminal.

use std::fmt::Write as _;

use voltguard_core::DashboardState;
use voltguard_core::derived::latest_location;
use voltguard_types::{AvailableCommands, CommandResponse};

/// One line describing the current dashboard state.
pub fn format_summary(state: &DashboardState) -> String {
    let device = state.metrics.device();
    let host = state.metrics.host();
    let online = state
        .camera_status
        .statuses
        .iter()
        .filter(|c| c.is_connected)
        .count();

    let mut line = format!(
        "{} | ignition {} | battery {:.1} V{} | cameras {}/{} online | cpu {:.0}% temp {:.0}C",
        device.device_id_or_default(),
        device.ignition_or_default(),
        device.battery_voltage_or_default(),
        if device.is_battery_low() { " LOW" } else { "" },
        online,
        state.camera_status.statuses.len(),
        host.cpu_usage_or_default(),
        host.temperature_or_default(),
    );

    match latest_location(&state.locations) {
        Some(fix) => {
            let _ = write!(
                line,
                " | gps {:.5},{:.5} {} km/h ({} fixes)",
                fix.latitude,
                fix.longitude,
                fix.speed.floor(),
                state.locations.len()
            );
        }
        None => line.push_str(" | gps no data"),
    }
    line
}

pub fn format_commands(available: &AvailableCommands) -> String {
    let mut out = String::new();
    for (category, commands) in &available.categories {
        let _ = writeln!(out, "{category}");
        for (command, args) in commands {
            if args.is_empty() {
                let _ = writeln!(out, "  {command}");
            } else {
                let _ = writeln!(out, "  {command} [{}]", args.join(" "));
            }
        }
    }
    let security = &available.security_info;
    let _ = writeln!(
        out,
        "{} commands, timeout {}",
        available.total_commands, security.timeout
    );
    out
}

pub fn format_command_result(response: &CommandResponse) -> String {
    let mut out = String::new();
    if !response.command_executed.is_empty() {
        let _ = writeln!(out, "$ {}", response.command_executed);
    }
    if !response.output.is_empty() {
        out.push_str(&response.output);
        if !response.output.ends_with('\n') {
            out.push('\n');
        }
    }
    if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
        let _ = writeln!(out, "error: {error}");
    }
    let _ = write!(
        out,
        "[{} in {:.2}s]",
        if response.success { "ok" } else { "failed" },
        response.execution_time
    );
    out
}
