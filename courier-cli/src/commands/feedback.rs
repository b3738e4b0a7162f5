// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Feedback Command
//!
//! Lists devices the feedback service reports as unreachable.

use anyhow::Result;
use courier_core::Client;

use crate::config::CliConfig;
use crate::display;

pub fn run(tokens_only: bool, config: &CliConfig) -> Result<()> {
    let client = Client::new(config.client_config()?);

    if tokens_only {
        for token in client.devices()? {
            println!("{}", token);
        }
        return Ok(());
    }

    let records = client.unregistered_devices()?;
    if records.is_empty() {
        display::info("No unreachable devices reported");
        return Ok(());
    }

    for record in &records {
        println!("{}  {}", record.timestamp(), record.token());
    }
    display::info(&format!("{} device(s) reported", records.len()));
    Ok(())
}
