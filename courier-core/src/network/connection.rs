// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gateway Connection
//!
//! Binds a transport to one endpoint, runs the handshake retry policy and
//! guarantees the transport is closed on every exit path.

use std::time::Duration;

use tracing::{debug, warn};

use super::credential::Credential;
use super::endpoint::Endpoint;
use super::error::NetworkError;
use super::transport::{ConnectionState, Readiness, Transport, TransportConfig, TransportResult};

/// A transport bound to a single gateway endpoint.
///
/// Wraps a transport implementation and adds:
/// - Bounded retry of the TLS handshake on protocol errors
/// - Closing on failure, on scope exit and on drop
/// - Fixed-size record reads
///
/// # Example
///
/// ```ignore
/// use courier_core::network::{Endpoint, GatewayConnection, TlsTransport, TransportConfig};
///
/// let frame = GatewayConnection::with_connection(
///     TlsTransport::new(),
///     &Endpoint::production_gateway(),
///     &credential,
///     &TransportConfig::default(),
///     |conn| conn.write(&frame),
/// )?;
/// ```
pub struct GatewayConnection<T: Transport> {
    transport: T,
    endpoint: Endpoint,
    config: TransportConfig,
}

impl<T: Transport> GatewayConnection<T> {
    /// Creates a closed connection.
    pub fn new(transport: T, endpoint: Endpoint, config: TransportConfig) -> Self {
        GatewayConnection {
            transport,
            endpoint,
            config,
        }
    }

    /// Opens `endpoint`, runs `body`, and closes the connection whatever
    /// `body` returns.
    pub fn with_connection<R, F>(
        transport: T,
        endpoint: &Endpoint,
        credential: &Credential,
        config: &TransportConfig,
        body: F,
    ) -> TransportResult<R>
    where
        F: FnOnce(&mut GatewayConnection<T>) -> TransportResult<R>,
    {
        let mut connection = GatewayConnection::new(transport, endpoint.clone(), config.clone());
        connection.open(credential)?;

        let result = body(&mut connection);
        let closed = connection.close();

        let value = result?;
        closed?;
        Ok(value)
    }

    /// Opens the socket and completes the TLS handshake.
    ///
    /// A TLS protocol error closes the transport and retries the whole
    /// open + handshake, up to `handshake_retries` extra times. Any other
    /// failure propagates at once. The transport is closed on every error.
    pub fn open(&mut self, credential: &Credential) -> TransportResult<()> {
        if self.transport.state() == ConnectionState::Open {
            return Ok(());
        }

        let mut retries = self.config.handshake_retries;
        loop {
            match self.try_open(credential) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let _ = self.transport.close();

                    if !e.is_retryable_handshake() {
                        return Err(e);
                    }
                    if retries == 0 {
                        return Err(NetworkError::Handshake(e.to_string()));
                    }

                    retries -= 1;
                    warn!(
                        "TLS handshake with {} failed ({}), retrying ({} left)",
                        self.endpoint, e, retries
                    );
                }
            }
        }
    }

    fn try_open(&mut self, credential: &Credential) -> TransportResult<()> {
        self.transport.open(&self.endpoint, &self.config)?;
        self.transport.handshake(credential)?;
        debug!("gateway connection to {} open", self.endpoint);
        Ok(())
    }

    /// Closes the connection. Safe to call repeatedly.
    pub fn close(&mut self) -> TransportResult<()> {
        self.transport.close()
    }

    /// Returns true once the handshake has completed.
    pub fn is_open(&self) -> bool {
        self.transport.state() == ConnectionState::Open
    }

    /// The endpoint this connection is bound to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Reads up to `buf.len()` bytes; `Ok(0)` means the peer closed.
    pub fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        self.transport.read(buf)
    }

    /// Fills `buf` completely.
    ///
    /// Returns `Ok(false)` if the peer closed before sending any byte of
    /// the record. A close partway through is a protocol error.
    pub fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> TransportResult<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.transport.read(&mut buf[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(NetworkError::Protocol(format!(
                    "short read: expected {} bytes, got {}",
                    buf.len(),
                    filled
                )));
            }
            filled += n;
        }
        Ok(true)
    }

    /// Writes all of `bytes`.
    pub fn write(&mut self, bytes: &[u8]) -> TransportResult<()> {
        self.transport.write(bytes)
    }

    /// See [`Transport::wait_readable`].
    pub fn wait_readable(&mut self, timeout: Option<Duration>) -> TransportResult<bool> {
        self.transport.wait_readable(timeout)
    }

    /// See [`Transport::wait_readable_or_writable`].
    pub fn wait_readable_or_writable(
        &mut self,
        timeout: Option<Duration>,
    ) -> TransportResult<Readiness> {
        self.transport.wait_readable_or_writable(timeout)
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for GatewayConnection<T> {
    fn drop(&mut self) {
        if self.transport.state() != ConnectionState::Closed {
            let _ = self.transport.close();
        }
    }
}
