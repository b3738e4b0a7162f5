// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use courier_core::{parse_timeout, ClientConfig, Credential, Endpoint};

/// Connection settings gathered from flags and environment.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Combined certificate + key PEM file.
    pub certificate: PathBuf,
    /// Passphrase for an encrypted private key.
    pub passphrase: Option<String>,
    /// Use the sandbox gateway and feedback service.
    pub sandbox: bool,
    /// Gateway URI override.
    pub gateway: Option<String>,
    /// Feedback URI override.
    pub feedback: Option<String>,
    /// Push timeout in seconds.
    pub timeout: Option<String>,
}

impl CliConfig {
    /// Builds the client configuration, loading the credential from disk.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let passphrase = self.passphrase.as_deref().filter(|p| !p.is_empty());
        let credential = Credential::from_pem_file(&self.certificate, passphrase)
            .with_context(|| format!("loading certificate {:?}", self.certificate))?;

        let mut config = if self.sandbox {
            ClientConfig::development(credential)
        } else {
            ClientConfig::production(credential)
        };

        if let Some(uri) = &self.gateway {
            config.gateway = Endpoint::parse(uri)?;
        }
        if let Some(uri) = &self.feedback {
            config.feedback = Endpoint::parse(uri)?;
        }
        if let Some(timeout) = &self.timeout {
            config.timeout = parse_timeout(timeout)?;
        }

        Ok(config)
    }
}
