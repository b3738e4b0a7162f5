// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Error Types

use thiserror::Error;

/// Errors raised by transports, gateway connections and the protocols on top.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// DNS resolution or TCP connect failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Read, write or wait on a transport that is not open.
    #[error("Transport not connected")]
    NotConnected,

    /// Peer closed the connection while more data was expected.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A readiness wait expired.
    #[error("Connection timeout")]
    Timeout,

    /// Socket-level I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// TLS protocol error raised by the session; eligible for handshake retry.
    #[error("TLS error: {0}")]
    Tls(String),

    /// TLS negotiation failed after the retry budget was spent.
    #[error("TLS handshake failed: {0}")]
    Handshake(String),

    /// Certificate or private key could not be loaded.
    #[error("Invalid credential: {0}")]
    Credential(String),

    /// Endpoint URI could not be parsed.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Bytes on the wire did not match the expected layout.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl NetworkError {
    /// Returns true for errors the handshake retry policy may retry.
    pub fn is_retryable_handshake(&self) -> bool {
        matches!(self, NetworkError::Tls(_))
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => NetworkError::Timeout,
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe => NetworkError::ConnectionClosed,
            _ => NetworkError::Io(e.to_string()),
        }
    }
}

impl From<rustls::Error> for NetworkError {
    fn from(e: rustls::Error) -> Self {
        NetworkError::Tls(e.to_string())
    }
}
