// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Push Session
//!
//! Streams notifications to the gateway and recovers from the asynchronous
//! error frame. The gateway drops everything after the notification it
//! rejects, so the tail of the batch is resent on a new connection until a
//! round finishes without an error frame.

use std::time::Duration;

use tracing::debug;

use crate::network::{
    Credential, Endpoint, GatewayConnection, NetworkError, Transport, TransportConfig,
    TransportFactory, TransportResult,
};

use super::frame::{ErrorFrame, ERROR_FRAME_SIZE};
use super::notification::Notification;
use super::observer::{PushObserver, TracingObserver};

/// Default wait for a late error frame after the last write.
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_millis(500);

/// Summary of one [`PushSession::push`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Connections opened, one per round.
    pub rounds: usize,
    /// Frames written across all rounds.
    pub written: usize,
    /// Notifications the gateway rejected.
    pub rejected: usize,
    /// Notifications left out because they were already sent or invalid.
    pub skipped: usize,
}

/// Pushes batches of notifications through fresh gateway connections.
///
/// # Example
///
/// ```ignore
/// use courier_core::push::{Notification, PushSession};
/// use courier_core::network::{Endpoint, TlsTransport};
///
/// let mut session = PushSession::new(TlsTransport::new, Endpoint::production_gateway(), credential);
/// let mut batch = vec![Notification::new(token, payload)];
/// session.push(&mut batch)?;
/// assert!(batch[0].is_sent());
/// ```
pub struct PushSession<F: TransportFactory, O: PushObserver = TracingObserver> {
    factory: F,
    endpoint: Endpoint,
    credential: Credential,
    transport_config: TransportConfig,
    timeout: Duration,
    observer: O,
}

impl<F: TransportFactory> PushSession<F, TracingObserver> {
    /// Creates a session that logs rejections through `tracing`.
    pub fn new(factory: F, endpoint: Endpoint, credential: Credential) -> Self {
        PushSession {
            factory,
            endpoint,
            credential,
            transport_config: TransportConfig::default(),
            timeout: DEFAULT_PUSH_TIMEOUT,
            observer: TracingObserver,
        }
    }
}

impl<F: TransportFactory, O: PushObserver> PushSession<F, O> {
    /// Replaces the rejection observer.
    pub fn with_observer<P: PushObserver>(self, observer: P) -> PushSession<F, P> {
        PushSession {
            factory: self.factory,
            endpoint: self.endpoint,
            credential: self.credential,
            transport_config: self.transport_config,
            timeout: self.timeout,
            observer,
        }
    }

    /// Sets how long to wait for an error frame after the last write.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets connection timeouts and the handshake retry budget.
    pub fn with_transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pushes `notifications`, updating their sent flag and error code.
    ///
    /// Already-sent and invalid notifications are skipped silently. When
    /// the gateway rejects a notification, everything after it is marked
    /// unsent and pushed again on a new connection. Connection and
    /// handshake failures propagate.
    pub fn push(&mut self, notifications: &mut [Notification]) -> TransportResult<PushReport> {
        let mut report = PushReport::default();
        let mut remaining: Vec<&mut Notification> = notifications.iter_mut().collect();

        loop {
            let offered = remaining.len();
            let mut batch: Vec<&mut Notification> = remaining
                .into_iter()
                .filter(|n| !n.is_sent() && n.is_valid())
                .collect();
            report.skipped += offered - batch.len();

            if batch.is_empty() {
                return Ok(report);
            }

            for (index, notification) in batch.iter_mut().enumerate() {
                let id = u32::try_from(index)
                    .map_err(|_| NetworkError::Protocol("batch exceeds identifier space".into()))?;
                notification.assign_id(id);
            }

            report.rounds += 1;
            debug!(
                "push round {}: {} notification(s) to {}",
                report.rounds,
                batch.len(),
                self.endpoint
            );

            let (frame, written) = self.push_round(&mut batch, &mut report)?;
            let Some(frame) = frame else {
                return Ok(report);
            };

            // Only a notification written this round can be the rejected one
            let failed = frame.identifier as usize;
            if failed >= written {
                return Err(NetworkError::Protocol(format!(
                    "error frame names identifier {} but only {} of {} notification(s) were written",
                    frame.identifier,
                    written,
                    batch.len()
                )));
            }

            batch[failed].set_error_code(frame.status);
            self.observer.push_failed(&*batch[failed], &frame);
            report.rejected += 1;

            // The gateway discarded everything after the rejected notification
            remaining = batch.split_off(failed + 1);
            for notification in remaining.iter_mut() {
                notification.mark_unsent();
            }
        }
    }

    /// Writes one batch over a new connection. Returns the error frame, if
    /// the gateway sent one, and how many frames went out before it.
    fn push_round(
        &self,
        batch: &mut [&mut Notification],
        report: &mut PushReport,
    ) -> TransportResult<(Option<ErrorFrame>, usize)> {
        let timeout = self.timeout;

        GatewayConnection::with_connection(
            self.factory.create(),
            &self.endpoint,
            &self.credential,
            &self.transport_config,
            |conn| {
                let last = batch.len() - 1;
                let mut frame = None;
                let mut written = 0;

                for (index, notification) in batch.iter_mut().enumerate() {
                    conn.write(&notification.message()?)?;
                    notification.mark_sent();
                    written += 1;
                    report.written += 1;

                    if index == last {
                        break;
                    }

                    // Errors arrive asynchronously; check before the next write
                    if conn.wait_readable_or_writable(None)?.readable {
                        frame = Some(read_error_frame(conn)?);
                        break;
                    }
                }

                // A lone notification returns without waiting for a late
                // error frame. Rejections of it go unnoticed in exchange for
                // not paying the timeout on every single push.
                if batch.len() == 1 {
                    return Ok((frame, written));
                }

                if frame.is_none() && conn.wait_readable(Some(timeout))? {
                    frame = Some(read_error_frame(conn)?);
                }
                Ok((frame, written))
            },
        )
    }
}

fn read_error_frame<T: Transport>(conn: &mut GatewayConnection<T>) -> TransportResult<ErrorFrame> {
    let mut buf = [0u8; ERROR_FRAME_SIZE];
    if !conn.read_exact_or_eof(&mut buf)? {
        return Err(NetworkError::ConnectionClosed);
    }
    let frame = ErrorFrame::decode(&buf)?;
    debug!(
        "gateway error frame: command={} status={} id={}",
        frame.command, frame.status, frame.identifier
    );
    Ok(frame)
}
