// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Platform-agnostic abstraction over the encrypted byte stream to a
//! gateway endpoint.

use std::time::Duration;

use super::credential::Credential;
use super::endpoint::Endpoint;
use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Transport lifecycle state.
///
/// There is no error state: a failure while opening leaves the transport
/// `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket or TLS session.
    Closed,
    /// Socket connected, TLS handshake not finished.
    Opening,
    /// Handshake complete; reads and writes allowed.
    Open,
}

/// Outcome of a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Readiness {
    /// Data (or an error/hangup condition) is waiting to be read.
    pub readable: bool,
    /// The socket can accept more bytes.
    pub writable: bool,
}

impl Readiness {
    /// Nothing became ready before the timeout.
    pub fn is_idle(&self) -> bool {
        !self.readable && !self.writable
    }
}

/// Timeouts and retry budget for gateway connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Socket send/receive timeout for blocking reads and writes.
    pub io_timeout: Duration,
    /// Bound on each readiness wait during the TLS handshake.
    pub transmit_timeout: Duration,
    /// Additional handshake attempts after a TLS protocol error.
    pub handshake_retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(5),
            transmit_timeout: Duration::from_secs(5),
            handshake_retries: 2,
        }
    }
}

impl TransportConfig {
    /// Overrides the handshake readiness bound.
    pub fn with_transmit_timeout(mut self, timeout: Duration) -> Self {
        self.transmit_timeout = timeout;
        self
    }

    /// Overrides the blocking read/write timeout.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Overrides the number of extra handshake attempts.
    pub fn with_handshake_retries(mut self, retries: u32) -> Self {
        self.handshake_retries = retries;
        self
    }
}

/// Encrypted stream to a single endpoint.
///
/// # Synchronous Interface
///
/// All methods block. The readiness waits let callers check for
/// unsolicited data from the peer without committing to a blocking read.
///
/// # Example
///
/// ```ignore
/// use courier_core::network::{Endpoint, TlsTransport, Transport, TransportConfig};
///
/// let mut transport = TlsTransport::new();
/// transport.open(&Endpoint::production_gateway(), &TransportConfig::default())?;
/// transport.handshake(&credential)?;
/// transport.write(&frame)?;
/// transport.close()?;
/// ```
pub trait Transport: Send {
    /// Connects the stream socket and applies send/receive timeouts.
    ///
    /// On success the state is `Opening`.
    fn open(&mut self, endpoint: &Endpoint, config: &TransportConfig) -> TransportResult<()>;

    /// Layers a TLS session on the open socket and completes the handshake.
    ///
    /// TLS protocol errors are reported as [`NetworkError::Tls`]; retrying
    /// is the caller's decision.
    fn handshake(&mut self, credential: &Credential) -> TransportResult<()>;

    /// Releases the TLS session, then the socket.
    ///
    /// Safe to call when already closed.
    fn close(&mut self) -> TransportResult<()>;

    /// Returns the current lifecycle state.
    fn state(&self) -> ConnectionState;

    /// Reads up to `buf.len()` bytes. `Ok(0)` means the peer closed.
    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize>;

    /// Writes all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> TransportResult<()>;

    /// Waits until data is readable. `None` waits indefinitely.
    ///
    /// Returns `false` if the timeout expired first.
    fn wait_readable(&mut self, timeout: Option<Duration>) -> TransportResult<bool>;

    /// Waits until the stream is readable or writable. `None` waits indefinitely.
    fn wait_readable_or_writable(&mut self, timeout: Option<Duration>)
        -> TransportResult<Readiness>;
}

/// Produces fresh transports, one per connection.
///
/// Each push round and each feedback drain opens its own connection, so
/// callers hand over a factory rather than a single transport.
pub trait TransportFactory {
    type Transport: Transport;

    /// Creates a new, closed transport.
    fn create(&self) -> Self::Transport;
}

impl<T, F> TransportFactory for F
where
    T: Transport,
    F: Fn() -> T,
{
    type Transport = T;

    fn create(&self) -> T {
        self()
    }
}
