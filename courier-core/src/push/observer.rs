// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Push Failure Reporting

use std::sync::{Arc, Mutex};

use tracing::warn;

use super::frame::ErrorFrame;
use super::notification::Notification;

/// Receives every notification the gateway rejects.
///
/// Failures never abort a push; this is where they become visible.
pub trait PushObserver {
    fn push_failed(&self, notification: &Notification, frame: &ErrorFrame);
}

/// Logs rejections at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PushObserver for TracingObserver {
    fn push_failed(&self, notification: &Notification, frame: &ErrorFrame) {
        warn!(
            token = notification.token(),
            id = frame.identifier,
            status = frame.status,
            "Push failed for notification {:?}. Error was '{}'.",
            notification.id(),
            frame.error_status()
        );
    }
}

/// A rejection captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFailure {
    pub token: String,
    pub frame: ErrorFrame,
}

/// Keeps rejections in memory; clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    failures: Arc<Mutex<Vec<RecordedFailure>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejections seen so far, oldest first.
    pub fn failures(&self) -> Vec<RecordedFailure> {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl PushObserver for RecordingObserver {
    fn push_failed(&self, notification: &Notification, frame: &ErrorFrame) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedFailure {
                token: notification.token().to_string(),
                frame: *frame,
            });
    }
}
