// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for push::session
//! Drives whole pushes against a scripted gateway.

mod common;

use common::*;
use courier_core::network::*;
use courier_core::push::*;

fn session(
    gateway: &MockGateway,
) -> PushSession<impl TransportFactory<Transport = MockTransport>, RecordingObserver> {
    PushSession::new(factory(gateway), Endpoint::development_gateway(), credential())
        .with_observer(RecordingObserver::new())
}

#[test]
fn test_batch_without_errors_sent_on_one_connection() {
    let gateway = MockGateway::new();
    let mut notifications = batch(3);

    let report = session(&gateway).push(&mut notifications).unwrap();

    assert_eq!(report.rounds, 1);
    assert_eq!(report.written, 3);
    assert_eq!(report.rejected, 0);
    for (index, notification) in notifications.iter().enumerate() {
        assert!(notification.is_sent());
        assert_eq!(notification.id(), Some(index as u32));
        assert_eq!(notification.error_code(), None);
    }

    let logs = gateway.connections();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].written.len(), 3);
    assert!(logs[0].closed);
}

#[test]
fn test_frames_written_in_order_with_batch_identifiers() {
    let gateway = MockGateway::new();
    let mut notifications = batch(3);

    session(&gateway).push(&mut notifications).unwrap();

    let written = &gateway.connections()[0].written;
    for (index, frame) in written.iter().enumerate() {
        assert_eq!(frame[0], PUSH_COMMAND);
        assert_eq!(frame_identifier(frame), index as u32);
        assert_eq!(frame, &notifications[index].message().unwrap());
    }
}

#[test]
fn test_push_frames_use_enhanced_command() {
    let gateway = MockGateway::new();
    let mut notifications = batch(2);

    session(&gateway).push(&mut notifications).unwrap();

    // Command 1 carries the identifier echoed by error frames
    let written = &gateway.connections()[0].written;
    assert_eq!(written[0][0], 1);
    assert_eq!(written[1][0], 1);
}

#[test]
fn test_readiness_checked_between_writes_then_timeout_wait() {
    let gateway = MockGateway::new();
    let mut notifications = batch(4);

    session(&gateway).push(&mut notifications).unwrap();

    let log = &gateway.connections()[0];
    // No check after the last write; a bounded wait instead
    assert_eq!(log.readiness_waits, 3);
    assert_eq!(log.readable_waits, 1);
}

#[test]
fn test_error_mid_batch_resends_tail_on_new_connection() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::reply_after(2, &error_frame(8, 1)));
    let mut notifications = batch(4);

    let mut session = session(&gateway);
    let report = session.push(&mut notifications).unwrap();

    assert_eq!(report.rounds, 2);
    assert_eq!(report.written, 4);
    assert_eq!(report.rejected, 1);

    assert_eq!(notifications[0].error_code(), None);
    assert_eq!(notifications[1].error_code(), Some(8));
    assert_eq!(notifications[1].error(), Some(ErrorStatus::InvalidToken));
    assert!(notifications.iter().all(|n| n.is_sent()));

    // Identifiers restart at zero in the resend round
    assert_eq!(notifications[2].id(), Some(0));
    assert_eq!(notifications[3].id(), Some(1));

    let logs = gateway.connections();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].written.len(), 2);
    assert_eq!(logs[1].written.len(), 2);
    assert_eq!(frame_identifier(&logs[1].written[0]), 0);
    assert_eq!(logs[1].written[0], notifications[2].message().unwrap());
    assert!(logs.iter().all(|log| log.closed));

    let failures = session.observer().failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].token, token(1));
    assert_eq!(failures[0].frame.identifier, 1);
}

#[test]
fn test_error_on_first_notification() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::reply_after(1, &error_frame(7, 0)));
    let mut notifications = batch(3);

    let report = session(&gateway).push(&mut notifications).unwrap();

    assert_eq!(report.rounds, 2);
    assert_eq!(notifications[0].error(), Some(ErrorStatus::InvalidPayloadSize));
    assert_eq!(notifications[1].error_code(), None);
    assert_eq!(notifications[1].id(), Some(0));
    assert_eq!(notifications[2].id(), Some(1));
    assert_eq!(gateway.connections()[1].written.len(), 2);
}

#[test]
fn test_error_on_last_notification_seen_by_timeout_wait() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::reply_after(3, &error_frame(8, 2)));
    let mut notifications = batch(3);

    let report = session(&gateway).push(&mut notifications).unwrap();

    assert_eq!(report.rounds, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(notifications[2].error_code(), Some(8));
    assert_eq!(gateway.open_count(), 1);
}

#[test]
fn test_repeated_rejections() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::reply_after(2, &error_frame(8, 1)));
    gateway.queue_connection(MockConnectionScript::reply_after(1, &error_frame(8, 0)));
    let mut notifications = batch(5);

    let mut session = session(&gateway);
    let report = session.push(&mut notifications).unwrap();

    assert_eq!(report.rounds, 3);
    assert_eq!(report.rejected, 2);
    assert_eq!(notifications[1].error_code(), Some(8));
    assert_eq!(notifications[2].error_code(), Some(8));
    assert_eq!(notifications[3].id(), Some(0));
    assert_eq!(notifications[4].id(), Some(1));
    assert!(notifications.iter().all(|n| n.is_sent()));
    assert_eq!(session.observer().failures().len(), 2);
}

#[test]
fn test_single_notification_does_not_wait() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::reply_after(1, &error_frame(8, 0)));
    let mut notifications = batch(1);

    let report = session(&gateway).push(&mut notifications).unwrap();

    // The rejection goes unnoticed
    assert_eq!(report.rejected, 0);
    assert!(notifications[0].is_sent());
    assert_eq!(notifications[0].error_code(), None);

    let log = &gateway.connections()[0];
    assert_eq!(log.readiness_waits, 0);
    assert_eq!(log.readable_waits, 0);
    assert!(log.closed);
}

#[test]
fn test_invalid_and_sent_notifications_skipped() {
    let gateway = MockGateway::new();
    let mut notifications = vec![
        notification(0),
        Notification::new("not hex", "{}"),
        notification(2),
        Notification::new(&token(3), ""),
    ];

    let mut session = session(&gateway);
    let report = session.push(&mut notifications).unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.written, 2);
    assert_eq!(notifications[0].id(), Some(0));
    assert_eq!(notifications[2].id(), Some(1));
    assert_eq!(notifications[1].id(), None);
    assert!(!notifications[1].is_sent());
    assert!(!notifications[3].is_sent());

    // Everything valid is already sent; nothing to connect for
    let report = session.push(&mut notifications).unwrap();
    assert_eq!(report.rounds, 0);
    assert_eq!(report.skipped, 4);
    assert_eq!(gateway.open_count(), 1);
}

#[test]
fn test_empty_batch_opens_nothing() {
    let gateway = MockGateway::new();
    let report = session(&gateway).push(&mut []).unwrap();

    assert_eq!(report, PushReport::default());
    assert_eq!(gateway.open_count(), 0);
}

#[test]
fn test_identifier_outside_batch_is_protocol_error() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::reply_after(1, &error_frame(8, 9)));
    let mut notifications = batch(2);

    let err = session(&gateway).push(&mut notifications).unwrap_err();

    assert!(matches!(err, NetworkError::Protocol(_)));
    assert!(gateway.connections()[0].closed);
}

#[test]
fn test_identifier_of_unwritten_notification_is_protocol_error() {
    let gateway = MockGateway::new();
    // Rejects identifier 2 after only one frame went out
    gateway.queue_connection(MockConnectionScript::reply_after(1, &error_frame(8, 2)));
    let mut notifications = batch(5);

    let err = session(&gateway).push(&mut notifications).unwrap_err();

    assert!(matches!(err, NetworkError::Protocol(_)));
    assert_eq!(gateway.connections()[0].written.len(), 1);
    assert!(gateway.connections()[0].closed);
    assert_eq!(notifications[2].error_code(), None);
    assert_eq!(gateway.open_count(), 1);
}

#[test]
fn test_already_sent_notification_between_unsent_ones() {
    let mut notifications = batch(3);

    let earlier = MockGateway::new();
    session(&earlier)
        .push(std::slice::from_mut(&mut notifications[1]))
        .unwrap();
    assert_eq!(notifications[1].id(), Some(0));

    let gateway = MockGateway::new();
    let report = session(&gateway).push(&mut notifications).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, 2);
    assert_eq!(notifications[0].id(), Some(0));
    assert_eq!(notifications[2].id(), Some(1));
    // Keeps the identifier from its own push
    assert_eq!(notifications[1].id(), Some(0));

    let written = &gateway.connections()[0].written;
    assert_eq!(written.len(), 2);
    assert_eq!(frame_identifier(&written[0]), 0);
    assert_eq!(frame_identifier(&written[1]), 1);
    assert_eq!(written[1], notifications[2].message().unwrap());
}

#[test]
fn test_peer_close_instead_of_error_frame() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript {
        hang_up: true,
        ..Default::default()
    });
    let mut notifications = batch(2);

    let err = session(&gateway).push(&mut notifications).unwrap_err();

    assert_eq!(err, NetworkError::ConnectionClosed);
    assert!(gateway.connections()[0].closed);
}

#[test]
fn test_truncated_error_frame_is_protocol_error() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::reply_after(1, &[8, 8, 0]));
    let mut notifications = batch(2);

    let err = session(&gateway).push(&mut notifications).unwrap_err();
    assert!(matches!(err, NetworkError::Protocol(_)));
}

#[test]
fn test_handshake_failure_propagates_and_closes() {
    let gateway = MockGateway::new();
    gateway.fail_handshakes((0..3).map(|_| NetworkError::Tls("handshake alert".into())));
    let mut notifications = batch(2);

    let err = session(&gateway).push(&mut notifications).unwrap_err();

    assert!(matches!(err, NetworkError::Handshake(_)));
    assert_eq!(gateway.handshake_count(), 3);
    assert!(gateway.connections().iter().all(|log| log.closed));
    assert!(notifications.iter().all(|n| !n.is_sent()));
}

#[test]
fn test_handshake_recovers_within_retry_budget() {
    let gateway = MockGateway::new();
    gateway.fail_handshakes([NetworkError::Tls("bad record mac".into())]);
    let mut notifications = batch(2);

    session(&gateway).push(&mut notifications).unwrap();

    assert_eq!(gateway.handshake_count(), 2);
    assert!(notifications.iter().all(|n| n.is_sent()));
}

#[test]
fn test_connect_failure_propagates() {
    let gateway = MockGateway::new();
    gateway.fail_next_open(NetworkError::ConnectionFailed("refused".into()));
    let mut notifications = batch(2);

    let err = session(&gateway).push(&mut notifications).unwrap_err();

    assert_eq!(err, NetworkError::ConnectionFailed("refused".into()));
    assert_eq!(gateway.open_count(), 0);
}
