// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Push Command
//!
//! Sends one payload to one or more devices.

use anyhow::{bail, Context, Result};
use courier_core::{Client, Notification};

use crate::config::CliConfig;
use crate::display;

/// Validates `payload` as JSON and returns its compact encoding.
pub fn compact_payload(payload: &str) -> Result<Vec<u8>> {
    let value: serde_json::Value =
        serde_json::from_str(payload).context("payload is not valid JSON")?;
    Ok(serde_json::to_vec(&value)?)
}

/// Pushes `payload` to every token.
pub fn run(tokens: &[String], payload: &str, expiry: u32, config: &CliConfig) -> Result<()> {
    let payload = compact_payload(payload)?;
    let mut notifications: Vec<Notification> = tokens
        .iter()
        .map(|token| Notification::new(token, payload.clone()).with_expiry(expiry))
        .collect();

    let mut client = Client::new(config.client_config()?);
    let report = client.push(&mut notifications)?;

    let mut failed = 0;
    for notification in &notifications {
        if let Some(status) = notification.error() {
            failed += 1;
            display::warning(&format!("{}: {}", notification.token(), status));
        } else if !notification.is_sent() {
            failed += 1;
            display::warning(&format!("{}: not a valid device token", notification.token()));
        }
    }

    display::info(&format!(
        "{} frame(s) written over {} connection(s)",
        report.written, report.rounds
    ));

    if failed > 0 {
        bail!("{} of {} notification(s) not delivered", failed, notifications.len());
    }
    display::success(&format!("Pushed to {} device(s)", notifications.len()));
    Ok(())
}
