// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Feedback Service
//!
//! Drains the feedback channel, which lists device tokens that stopped
//! accepting notifications. Each record is
//! `timestamp:u32 | token_len:u16 | token:[u8; 32]`, big-endian, and the
//! service closes the connection after the last one.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::network::{
    Credential, Endpoint, GatewayConnection, NetworkError, TransportConfig, TransportFactory,
    TransportResult,
};

/// Width of the token field in a feedback record.
pub const FEEDBACK_TOKEN_SIZE: usize = 32;

/// Total width of a feedback record.
pub const FEEDBACK_RECORD_SIZE: usize = 4 + 2 + FEEDBACK_TOKEN_SIZE;

/// A device that should no longer receive pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    timestamp: u32,
    token: String,
}

impl FeedbackRecord {
    /// Decodes one fixed-size record.
    pub fn decode(bytes: &[u8]) -> Result<Self, NetworkError> {
        if bytes.len() != FEEDBACK_RECORD_SIZE {
            return Err(NetworkError::Protocol(format!(
                "feedback record must be {} bytes, got {}",
                FEEDBACK_RECORD_SIZE,
                bytes.len()
            )));
        }

        let timestamp = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let token_len = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;
        if token_len == 0 || token_len > FEEDBACK_TOKEN_SIZE {
            return Err(NetworkError::Protocol(format!(
                "invalid feedback token length {}",
                token_len
            )));
        }

        Ok(FeedbackRecord {
            timestamp,
            token: hex::encode(&bytes[6..6 + token_len]),
        })
    }

    /// Seconds since epoch at which the device was found unreachable.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Device token, lowercase hex.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn unregistered_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.timestamp))
    }
}

/// Reads the feedback service to completion.
pub struct FeedbackReader<F: TransportFactory> {
    factory: F,
    endpoint: Endpoint,
    credential: Credential,
    transport_config: TransportConfig,
}

impl<F: TransportFactory> FeedbackReader<F> {
    pub fn new(factory: F, endpoint: Endpoint, credential: Credential) -> Self {
        FeedbackReader {
            factory,
            endpoint,
            credential,
            transport_config: TransportConfig::default(),
        }
    }

    /// Sets connection timeouts and the handshake retry budget.
    pub fn with_transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Opens a connection and decodes records until the service closes it.
    ///
    /// A read failure or a truncated record ends the drain with an error;
    /// there is no retry.
    pub fn drain(&self) -> TransportResult<Vec<FeedbackRecord>> {
        let records = GatewayConnection::with_connection(
            self.factory.create(),
            &self.endpoint,
            &self.credential,
            &self.transport_config,
            |conn| {
                let mut records = Vec::new();
                let mut buf = [0u8; FEEDBACK_RECORD_SIZE];
                while conn.read_exact_or_eof(&mut buf)? {
                    records.push(FeedbackRecord::decode(&buf)?);
                }
                Ok(records)
            },
        )?;

        debug!("feedback from {}: {} record(s)", self.endpoint, records.len());
        Ok(records)
    }

    /// Tokens of every unreachable device.
    pub fn devices(&self) -> TransportResult<Vec<String>> {
        Ok(self
            .drain()?
            .into_iter()
            .map(|record| record.token)
            .collect())
    }
}
