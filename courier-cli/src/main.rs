// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Courier CLI
//!
//! Command-line interface for pushing notifications through the gateway
//! and reading the feedback service.

mod commands;
mod config;
mod display;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "courier")]
#[command(version, about = "Push notification gateway client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Certificate + private key PEM file
    #[arg(long, global = true, env = "APN_CERTIFICATE")]
    certificate: Option<PathBuf>,

    /// Passphrase for an encrypted private key
    #[arg(long, global = true, env = "APN_CERTIFICATE_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Use the sandbox gateway and feedback service
    #[arg(long, global = true)]
    sandbox: bool,

    /// Gateway URI (e.g. apn://gateway.push.apple.com:2195)
    #[arg(long, global = true, env = "APN_GATEWAY_URI")]
    gateway: Option<String>,

    /// Feedback URI (e.g. apn://feedback.push.apple.com:2196)
    #[arg(long, global = true, env = "APN_FEEDBACK_URI")]
    feedback: Option<String>,

    /// Seconds to wait for a late error frame
    #[arg(long, global = true, env = "APN_TIMEOUT")]
    timeout: Option<String>,

    /// Log connection details
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Push a notification
    Push {
        /// Device token in hex (repeat for several devices)
        #[arg(long = "token", required = true)]
        tokens: Vec<String>,

        /// JSON payload
        #[arg(long)]
        payload: String,

        /// Expiry, seconds since epoch (0 = deliver once or drop)
        #[arg(long, default_value = "0")]
        expiry: u32,
    },

    /// List devices reported by the feedback service
    Feedback {
        /// Print tokens only
        #[arg(long)]
        tokens_only: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "courier_core=debug" } else { "courier_core=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let Some(certificate) = cli.certificate else {
        anyhow::bail!("No certificate given. Use --certificate or set APN_CERTIFICATE.");
    };

    let config = CliConfig {
        certificate,
        passphrase: cli.passphrase,
        sandbox: cli.sandbox,
        gateway: cli.gateway,
        feedback: cli.feedback,
        timeout: cli.timeout,
    };

    match cli.command {
        Commands::Push {
            tokens,
            payload,
            expiry,
        } => commands::push::run(&tokens, &payload, expiry, &config)?,
        Commands::Feedback { tokens_only } => commands::feedback::run(tokens_only, &config)?,
    }

    Ok(())
}
