// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! Scripted in-memory gateway for tests. A [`MockGateway`] hands out
//! [`MockTransport`]s that share its script and log, so a test can follow
//! every connection a push or feedback drain opens.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::credential::Credential;
use super::endpoint::Endpoint;
use super::error::NetworkError;
use super::transport::{ConnectionState, Readiness, Transport, TransportConfig, TransportResult};

/// Behaviour of one scripted connection.
#[derive(Debug, Clone, Default)]
pub struct MockConnectionScript {
    /// After this many writes, queue these bytes for reading.
    pub reply_after_writes: Option<(usize, Vec<u8>)>,
    /// Bytes readable right after the handshake.
    pub inbound: Vec<u8>,
    /// Peer hangs up once the inbound bytes are drained.
    pub hang_up: bool,
}

impl MockConnectionScript {
    /// Connection on which the gateway answers write number `after_writes`
    /// (1-based) with `frame`.
    pub fn reply_after(after_writes: usize, frame: &[u8]) -> Self {
        MockConnectionScript {
            reply_after_writes: Some((after_writes, frame.to_vec())),
            ..Default::default()
        }
    }

    /// Connection that streams `bytes` and then closes.
    pub fn stream(bytes: &[u8]) -> Self {
        MockConnectionScript {
            inbound: bytes.to_vec(),
            hang_up: true,
            ..Default::default()
        }
    }
}

/// What happened on one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockConnectionLog {
    /// Every write, in order.
    pub written: Vec<Vec<u8>>,
    /// Calls to `wait_readable`.
    pub readable_waits: usize,
    /// Calls to `wait_readable_or_writable`.
    pub readiness_waits: usize,
    /// Whether the connection was closed.
    pub closed: bool,
}

#[derive(Debug, Default)]
struct GatewayState {
    scripts: VecDeque<MockConnectionScript>,
    open_errors: VecDeque<NetworkError>,
    handshake_errors: VecDeque<NetworkError>,
    connections: Vec<MockConnectionLog>,
    handshakes: usize,
}

/// Shared script and log behind a family of mock transports.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl MockGateway {
    /// Creates a gateway with no scripted behaviour.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GatewayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Scripts the next connection to be opened.
    pub fn queue_connection(&self, script: MockConnectionScript) {
        self.lock().scripts.push_back(script);
    }

    /// Makes the next `open` fail with `error`.
    pub fn fail_next_open(&self, error: NetworkError) {
        self.lock().open_errors.push_back(error);
    }

    /// Makes the next handshakes fail, one error per attempt.
    pub fn fail_handshakes(&self, errors: impl IntoIterator<Item = NetworkError>) {
        self.lock().handshake_errors.extend(errors);
    }

    /// Creates a closed transport bound to this gateway.
    pub fn transport(&self) -> MockTransport {
        MockTransport {
            gateway: self.clone(),
            state: ConnectionState::Closed,
            connection: None,
            script: MockConnectionScript::default(),
            pending: VecDeque::new(),
            writes: 0,
        }
    }

    /// Snapshot of every connection opened so far.
    pub fn connections(&self) -> Vec<MockConnectionLog> {
        self.lock().connections.clone()
    }

    /// Number of successful socket opens.
    pub fn open_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Number of handshake attempts, failed ones included.
    pub fn handshake_count(&self) -> usize {
        self.lock().handshakes
    }
}

/// In-memory transport driven by a [`MockGateway`].
#[derive(Debug)]
pub struct MockTransport {
    gateway: MockGateway,
    state: ConnectionState,
    connection: Option<usize>,
    script: MockConnectionScript,
    pending: VecDeque<u8>,
    writes: usize,
}

impl MockTransport {
    /// Creates a transport with its own private gateway.
    pub fn new() -> Self {
        MockGateway::new().transport()
    }

    /// Queues bytes to be read on the current connection.
    pub fn queue_receive(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes.iter().copied());
    }

    /// The gateway this transport reports to.
    pub fn gateway(&self) -> &MockGateway {
        &self.gateway
    }

    fn with_log(&self, f: impl FnOnce(&mut MockConnectionLog)) {
        if let Some(index) = self.connection {
            if let Some(log) = self.gateway.lock().connections.get_mut(index) {
                f(log);
            }
        }
    }

    fn ensure_open(&self) -> TransportResult<()> {
        if self.state == ConnectionState::Open {
            Ok(())
        } else {
            Err(NetworkError::NotConnected)
        }
    }

    fn readable(&self) -> bool {
        !self.pending.is_empty() || self.script.hang_up
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn open(&mut self, _endpoint: &Endpoint, _config: &TransportConfig) -> TransportResult<()> {
        if self.state != ConnectionState::Closed {
            return Ok(());
        }

        let mut gateway = self.gateway.lock();
        if let Some(error) = gateway.open_errors.pop_front() {
            return Err(error);
        }

        self.script = gateway.scripts.pop_front().unwrap_or_default();
        self.pending = self.script.inbound.iter().copied().collect();
        self.writes = 0;
        self.connection = Some(gateway.connections.len());
        gateway.connections.push(MockConnectionLog::default());
        self.state = ConnectionState::Opening;
        Ok(())
    }

    fn handshake(&mut self, _credential: &Credential) -> TransportResult<()> {
        if self.state != ConnectionState::Opening {
            return Err(NetworkError::NotConnected);
        }

        let mut gateway = self.gateway.lock();
        gateway.handshakes += 1;
        if let Some(error) = gateway.handshake_errors.pop_front() {
            return Err(error);
        }

        self.state = ConnectionState::Open;
        Ok(())
    }

    fn close(&mut self) -> TransportResult<()> {
        if self.state != ConnectionState::Closed {
            self.with_log(|log| log.closed = true);
        }
        self.state = ConnectionState::Closed;
        self.pending.clear();
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        self.ensure_open()?;

        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, bytes: &[u8]) -> TransportResult<()> {
        self.ensure_open()?;

        self.writes += 1;
        self.with_log(|log| log.written.push(bytes.to_vec()));

        if let Some((after, reply)) = &self.script.reply_after_writes {
            if *after == self.writes {
                self.pending.extend(reply.iter().copied());
            }
        }
        Ok(())
    }

    fn wait_readable(&mut self, _timeout: Option<Duration>) -> TransportResult<bool> {
        self.ensure_open()?;
        self.with_log(|log| log.readable_waits += 1);
        Ok(self.readable())
    }

    fn wait_readable_or_writable(
        &mut self,
        _timeout: Option<Duration>,
    ) -> TransportResult<Readiness> {
        self.ensure_open()?;
        self.with_log(|log| log.readiness_waits += 1);
        Ok(Readiness {
            readable: self.readable(),
            writable: true,
        })
    }
}
