// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TLS Transport
//!
//! Production transport: a blocking `TcpStream` with a rustls client
//! session on top. The handshake runs non-blocking and is driven by
//! readiness waits; afterwards the socket is blocking with timeouts.
//! Readiness uses `poll(2)` on the socket descriptor. A readable socket
//! only counts as readable once it yields application data or end of
//! stream: session tickets and key updates are consumed in passing.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::os::fd::{AsRawFd, RawFd};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore};
use tracing::debug;

use super::credential::Credential;
use super::endpoint::Endpoint;
use super::error::NetworkError;
use super::transport::{ConnectionState, Readiness, Transport, TransportConfig, TransportResult};

/// TLS-over-TCP transport for the gateway and feedback services.
///
/// # Example
///
/// ```ignore
/// use courier_core::network::{Endpoint, TlsTransport, Transport, TransportConfig};
///
/// let mut transport = TlsTransport::new();
/// transport.open(&Endpoint::development_gateway(), &TransportConfig::default())?;
/// transport.handshake(&credential)?;
/// ```
pub struct TlsTransport {
    socket: Option<TcpStream>,
    session: Option<ClientConnection>,
    host: String,
    config: TransportConfig,
    state: ConnectionState,
}

impl TlsTransport {
    /// Creates a closed transport.
    pub fn new() -> Self {
        TlsTransport {
            socket: None,
            session: None,
            host: String::new(),
            config: TransportConfig::default(),
            state: ConnectionState::Closed,
        }
    }

    /// Resolves the endpoint and connects to the first reachable address.
    fn connect_socket(endpoint: &Endpoint, config: &TransportConfig) -> TransportResult<TcpStream> {
        let addrs = endpoint.authority().to_socket_addrs().map_err(|e| {
            NetworkError::ConnectionFailed(format!("cannot resolve {}: {}", endpoint.host(), e))
        })?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, config.connect_timeout) {
                Ok(socket) => {
                    socket.set_read_timeout(Some(config.io_timeout))?;
                    socket.set_write_timeout(Some(config.io_timeout))?;
                    socket.set_nodelay(true)?;
                    return Ok(socket);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(NetworkError::ConnectionFailed(match last_error {
            Some(e) => format!("{}: {}", endpoint, e),
            None => format!("{}: no addresses", endpoint),
        }))
    }

    fn streams(&mut self) -> TransportResult<(&mut ClientConnection, &mut TcpStream)> {
        match (self.session.as_mut(), self.socket.as_mut()) {
            (Some(session), Some(socket)) => Ok((session, socket)),
            _ => Err(NetworkError::NotConnected),
        }
    }

    /// True if the session already holds decrypted bytes.
    fn has_buffered_plaintext(&mut self) -> TransportResult<bool> {
        let (session, _) = self.streams()?;
        let state = session.process_new_packets()?;
        Ok(state.plaintext_bytes_to_read() > 0)
    }

    /// Pulls whatever the socket holds into the session without blocking.
    ///
    /// Returns true if that left decrypted bytes to read or the peer
    /// closed the stream.
    fn pump_incoming(&mut self) -> TransportResult<bool> {
        let (session, socket) = self.streams()?;
        socket.set_nonblocking(true)?;
        let received = session.read_tls(socket);
        socket.set_nonblocking(false)?;

        match received {
            Ok(0) => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }

        let state = session.process_new_packets()?;
        Ok(state.peer_has_closed() || state.plaintext_bytes_to_read() > 0)
    }

    fn raw_fd(&self) -> TransportResult<RawFd> {
        match (&self.session, &self.socket) {
            (Some(_), Some(socket)) => Ok(socket.as_raw_fd()),
            _ => Err(NetworkError::NotConnected),
        }
    }
}

impl Default for TlsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TlsTransport {
    fn open(&mut self, endpoint: &Endpoint, config: &TransportConfig) -> TransportResult<()> {
        if self.state != ConnectionState::Closed {
            return Ok(());
        }

        self.state = ConnectionState::Opening;
        match Self::connect_socket(endpoint, config) {
            Ok(socket) => {
                debug!("connected to {}", endpoint);
                self.socket = Some(socket);
                self.host = endpoint.host().to_string();
                self.config = config.clone();
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Closed;
                Err(e)
            }
        }
    }

    fn handshake(&mut self, credential: &Credential) -> TransportResult<()> {
        if self.state != ConnectionState::Opening {
            return Err(NetworkError::NotConnected);
        }
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        let server_name = ServerName::try_from(self.host.clone()).map_err(|_| {
            NetworkError::ConnectionFailed(format!("invalid server name: {}", self.host))
        })?;
        let config = client_config(credential)?;
        if let Ok(fingerprint) = credential.fingerprint() {
            debug!("presenting client certificate {} to {}", fingerprint, self.host);
        }
        let mut session = ClientConnection::new(config, server_name)?;

        socket.set_nonblocking(true)?;
        let result = drive_handshake(&mut session, socket, self.config.transmit_timeout);
        socket.set_nonblocking(false)?;
        result?;

        debug!("TLS session established with {}", self.host);
        self.session = Some(session);
        self.state = ConnectionState::Open;
        Ok(())
    }

    fn close(&mut self) -> TransportResult<()> {
        if let (Some(session), Some(socket)) = (self.session.as_mut(), self.socket.as_mut()) {
            session.send_close_notify();
            let _ = session.write_tls(socket); // Best effort
        }
        self.session = None;

        if let Some(socket) = self.socket.take() {
            let _ = socket.shutdown(Shutdown::Both);
            debug!("closed connection to {}", self.host);
        }
        self.state = ConnectionState::Closed;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        let (session, socket) = self.streams()?;
        let mut stream = rustls::Stream::new(session, socket);

        match stream.read(buf) {
            Ok(n) => Ok(n),
            // Peer hung up without close_notify
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> TransportResult<()> {
        let (session, socket) = self.streams()?;
        let mut stream = rustls::Stream::new(session, socket);
        stream.write_all(bytes)?;
        stream.flush()?;
        Ok(())
    }

    fn wait_readable(&mut self, timeout: Option<Duration>) -> TransportResult<bool> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if self.has_buffered_plaintext()? {
                return Ok(true);
            }
            if !poll_fd(self.raw_fd()?, libc::POLLIN, remaining(deadline))?.readable {
                return Ok(false);
            }
            if self.pump_incoming()? {
                return Ok(true);
            }
            if expired(deadline) {
                return Ok(false);
            }
        }
    }

    fn wait_readable_or_writable(
        &mut self,
        timeout: Option<Duration>,
    ) -> TransportResult<Readiness> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let mut readiness =
                poll_fd(self.raw_fd()?, libc::POLLIN | libc::POLLOUT, remaining(deadline))?;
            if readiness.readable {
                readiness.readable = self.pump_incoming()?;
            }
            if self.has_buffered_plaintext()? {
                readiness.readable = true;
            }
            if !readiness.is_idle() || expired(deadline) {
                return Ok(readiness);
            }
        }
    }
}

fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Builds the rustls client config presenting `credential`.
fn client_config(credential: &Credential) -> TransportResult<Arc<ClientConfig>> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_client_auth_cert(credential.certificate_chain()?, credential.private_key()?)
        .map_err(|e| NetworkError::Credential(format!("certificate and key rejected: {}", e)))?;

    Ok(Arc::new(config))
}

/// Completes the handshake on a non-blocking socket.
///
/// Whenever the session would block, waits up to `timeout` for the
/// readiness it asked for. No readiness before the timeout is `Timeout`.
fn drive_handshake(
    session: &mut ClientConnection,
    socket: &mut TcpStream,
    timeout: Duration,
) -> TransportResult<()> {
    while session.is_handshaking() || session.wants_write() {
        let step = if session.is_handshaking() {
            session.complete_io(socket).map(|_| ())
        } else {
            session.write_tls(socket).map(|_| ())
        };

        match step {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                let ready = if session.wants_write() {
                    poll_fd(socket.as_raw_fd(), libc::POLLOUT, Some(timeout))?.writable
                } else {
                    poll_fd(socket.as_raw_fd(), libc::POLLIN, Some(timeout))?.readable
                };
                if !ready {
                    return Err(NetworkError::Timeout);
                }
            }
            // rustls reports protocol failures as InvalidData
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(NetworkError::Tls(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Single-descriptor `poll(2)`. Error and hangup conditions count as readable.
fn poll_fd(
    fd: RawFd,
    events: libc::c_short,
    timeout: Option<Duration>,
) -> TransportResult<Readiness> {
    let timeout_ms = match timeout {
        Some(d) => d.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
        None => -1,
    };

    let mut pollfd = libc::pollfd {
        fd,
        events,
        revents: 0,
    };

    loop {
        // SAFETY: one valid pollfd, exclusively borrowed for the call
        let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }
        if ready == 0 {
            return Ok(Readiness::default());
        }

        let error_bits = libc::POLLERR | libc::POLLHUP | libc::POLLNVAL;
        return Ok(Readiness {
            readable: pollfd.revents & (libc::POLLIN | error_bits) != 0,
            writable: pollfd.revents & libc::POLLOUT != 0,
        });
    }
}
