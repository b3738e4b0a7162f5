// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Notification
//!
//! A device token plus an already-serialized payload, with the delivery
//! state the push protocol writes back.

use crate::network::NetworkError;

use super::frame::{encode_push_frame, ErrorStatus};

/// One notification owned by the caller.
///
/// The push session assigns the identifier, flips the sent flag and records
/// the gateway's error code; everything else is set by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    token: String,
    payload: Vec<u8>,
    expiry: u32,
    id: Option<u32>,
    sent: bool,
    error_code: Option<u8>,
}

impl Notification {
    /// Creates an unsent notification.
    ///
    /// `token` is the device token in hex; spaces and angle brackets (as
    /// printed by the device SDK) are ignored.
    pub fn new(token: &str, payload: impl Into<Vec<u8>>) -> Self {
        Notification {
            token: token.to_string(),
            payload: payload.into(),
            expiry: 0,
            id: None,
            sent: false,
            error_code: None,
        }
    }

    /// Sets the expiry (seconds since epoch; 0 means deliver once or drop).
    pub fn with_expiry(mut self, expiry: u32) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn expiry(&self) -> u32 {
        self.expiry
    }

    /// Identifier within the batch this notification was last sent in.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Raw status byte from the gateway's error frame, if it rejected this one.
    pub fn error_code(&self) -> Option<u8> {
        self.error_code
    }

    /// Decoded meaning of [`error_code`](Self::error_code).
    pub fn error(&self) -> Option<ErrorStatus> {
        self.error_code.map(ErrorStatus::from_code)
    }

    /// Binary device token.
    pub fn token_bytes(&self) -> Result<Vec<u8>, NetworkError> {
        let cleaned: String = self
            .token
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '<' && *c != '>')
            .collect();
        hex::decode(&cleaned)
            .map_err(|e| NetworkError::Protocol(format!("device token is not hex: {}", e)))
    }

    /// Structural check: a non-empty hex token and a non-empty payload
    /// that fit their length fields.
    pub fn is_valid(&self) -> bool {
        let token_ok = self
            .token_bytes()
            .map(|t| !t.is_empty() && t.len() <= u16::MAX as usize)
            .unwrap_or(false);
        token_ok && !self.payload.is_empty() && self.payload.len() <= u16::MAX as usize
    }

    /// Push frame for this notification. Requires an assigned identifier.
    pub fn message(&self) -> Result<Vec<u8>, NetworkError> {
        let id = self
            .id
            .ok_or_else(|| NetworkError::Protocol("notification has no identifier".into()))?;
        encode_push_frame(id, self.expiry, &self.token_bytes()?, &self.payload)
    }

    pub(crate) fn assign_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    pub(crate) fn mark_sent(&mut self) {
        self.sent = true;
    }

    pub(crate) fn mark_unsent(&mut self) {
        self.sent = false;
    }

    pub(crate) fn set_error_code(&mut self, code: u8) {
        self.error_code = Some(code);
    }
}
