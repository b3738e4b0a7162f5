// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Fixtures for driving push sessions and feedback drains against a
//! scripted gateway.

#![allow(dead_code)]

use courier_core::network::{Credential, MockGateway, MockTransport};
use courier_core::push::Notification;

/// Placeholder credential; mock transports never parse it.
pub fn credential() -> Credential {
    Credential::from_pem(b"cert", b"key", None)
}

/// Factory handing out transports bound to `gateway`.
pub fn factory(gateway: &MockGateway) -> impl Fn() -> MockTransport + Clone {
    let gateway = gateway.clone();
    move || gateway.transport()
}

/// 32-byte device token, hex encoded, filled with `seed`.
pub fn token(seed: u8) -> String {
    hex::encode([seed; 32])
}

/// Valid notification for device `seed`.
pub fn notification(seed: u8) -> Notification {
    Notification::new(&token(seed), format!(r#"{{"aps":{{"alert":"device {}"}}}}"#, seed))
}

pub fn batch(count: u8) -> Vec<Notification> {
    (0..count).map(notification).collect()
}

/// Error frame rejecting `identifier` with `status`.
pub fn error_frame(status: u8, identifier: u32) -> Vec<u8> {
    let mut frame = vec![8, status];
    frame.extend_from_slice(&identifier.to_be_bytes());
    frame
}

/// Identifier field of an encoded push frame.
pub fn frame_identifier(frame: &[u8]) -> u32 {
    u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]])
}

/// One feedback record for `token`.
pub fn feedback_record(timestamp: u32, token: &[u8]) -> Vec<u8> {
    let mut record = timestamp.to_be_bytes().to_vec();
    record.extend_from_slice(&(token.len() as u16).to_be_bytes());
    record.extend_from_slice(token);
    record.resize(38, 0);
    record
}
