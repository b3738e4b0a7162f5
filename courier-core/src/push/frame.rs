// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gateway Wire Frames
//!
//! Fixed-layout encoding of push frames and decoding of the 6-byte error
//! frame the gateway sends back when it rejects a notification.

use std::fmt;

use crate::network::NetworkError;

/// Command byte of the push frame carrying an identifier and expiry.
pub const PUSH_COMMAND: u8 = 1;

/// Size of the error frame in bytes.
pub const ERROR_FRAME_SIZE: usize = 6;

/// Bytes in a push frame besides token and payload.
pub const PUSH_FRAME_OVERHEAD: usize = 1 + 4 + 4 + 2 + 2;

/// Encodes a push frame.
///
/// Layout: `command | identifier:u32 | expiry:u32 | token_len:u16 | token |
/// payload_len:u16 | payload`, integers big-endian.
pub fn encode_push_frame(
    identifier: u32,
    expiry: u32,
    token: &[u8],
    payload: &[u8],
) -> Result<Vec<u8>, NetworkError> {
    let token_len = u16::try_from(token.len())
        .map_err(|_| NetworkError::Protocol(format!("token too long: {} bytes", token.len())))?;
    let payload_len = u16::try_from(payload.len()).map_err(|_| {
        NetworkError::Protocol(format!("payload too long: {} bytes", payload.len()))
    })?;

    let mut frame = Vec::with_capacity(PUSH_FRAME_OVERHEAD + token.len() + payload.len());
    frame.push(PUSH_COMMAND);
    frame.extend_from_slice(&identifier.to_be_bytes());
    frame.extend_from_slice(&expiry.to_be_bytes());
    frame.extend_from_slice(&token_len.to_be_bytes());
    frame.extend_from_slice(token);
    frame.extend_from_slice(&payload_len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Meaning of the status byte in an error frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    NoError,
    ProcessingError,
    MissingDeviceToken,
    MissingTopic,
    MissingPayload,
    InvalidTokenSize,
    InvalidTopicSize,
    InvalidPayloadSize,
    InvalidToken,
    Shutdown,
    Unknown,
    /// A status byte the gateway does not document.
    Unrecognized(u8),
}

impl ErrorStatus {
    /// Maps a raw status byte.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ErrorStatus::NoError,
            1 => ErrorStatus::ProcessingError,
            2 => ErrorStatus::MissingDeviceToken,
            3 => ErrorStatus::MissingTopic,
            4 => ErrorStatus::MissingPayload,
            5 => ErrorStatus::InvalidTokenSize,
            6 => ErrorStatus::InvalidTopicSize,
            7 => ErrorStatus::InvalidPayloadSize,
            8 => ErrorStatus::InvalidToken,
            10 => ErrorStatus::Shutdown,
            255 => ErrorStatus::Unknown,
            other => ErrorStatus::Unrecognized(other),
        }
    }

    /// Human-readable description, used in log messages.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorStatus::NoError => "No errors encountered",
            ErrorStatus::ProcessingError => "Processing error",
            ErrorStatus::MissingDeviceToken => "Missing device token",
            ErrorStatus::MissingTopic => "Missing topic",
            ErrorStatus::MissingPayload => "Missing payload",
            ErrorStatus::InvalidTokenSize => "Invalid token size",
            ErrorStatus::InvalidTopicSize => "Invalid topic size",
            ErrorStatus::InvalidPayloadSize => "Invalid payload size",
            ErrorStatus::InvalidToken => "Invalid token",
            ErrorStatus::Shutdown => "Shutdown",
            ErrorStatus::Unknown => "Unknown error",
            ErrorStatus::Unrecognized(_) => "Unrecognized status",
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStatus::Unrecognized(code) => write!(f, "{} ({})", self.description(), code),
            _ => f.write_str(self.description()),
        }
    }
}

/// Error response naming the first notification the gateway rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorFrame {
    pub command: u8,
    pub status: u8,
    pub identifier: u32,
}

impl ErrorFrame {
    /// Decodes exactly [`ERROR_FRAME_SIZE`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, NetworkError> {
        let bytes: &[u8; ERROR_FRAME_SIZE] = bytes.try_into().map_err(|_| {
            NetworkError::Protocol(format!(
                "error frame must be {} bytes, got {}",
                ERROR_FRAME_SIZE,
                bytes.len()
            ))
        })?;

        Ok(ErrorFrame {
            command: bytes[0],
            status: bytes[1],
            identifier: u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
        })
    }

    /// Decoded meaning of the status byte.
    pub fn error_status(&self) -> ErrorStatus {
        ErrorStatus::from_code(self.status)
    }
}
