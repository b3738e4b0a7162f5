// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Push Protocol
//!
//! Notifications, their wire frames, and the session that streams them to
//! the gateway and resends after a rejection.

pub mod frame;
pub mod notification;
pub mod observer;
pub mod session;

pub use frame::{
    encode_push_frame, ErrorFrame, ErrorStatus, ERROR_FRAME_SIZE, PUSH_COMMAND,
    PUSH_FRAME_OVERHEAD,
};
pub use notification::Notification;
pub use observer::{PushObserver, RecordedFailure, RecordingObserver, TracingObserver};
pub use session::{PushReport, PushSession, DEFAULT_PUSH_TIMEOUT};
