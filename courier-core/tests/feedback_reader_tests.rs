// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for feedback
//! Drains scripted feedback streams.

mod common;

use common::*;
use courier_core::feedback::*;
use courier_core::network::*;

fn reader(gateway: &MockGateway) -> FeedbackReader<impl TransportFactory<Transport = MockTransport>> {
    FeedbackReader::new(factory(gateway), Endpoint::development_feedback(), credential())
}

#[test]
fn test_empty_stream_yields_no_records() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::stream(&[]));

    let records = reader(&gateway).drain().unwrap();

    assert!(records.is_empty());
    assert!(gateway.connections()[0].closed);
}

#[test]
fn test_drain_decodes_every_record() {
    let gateway = MockGateway::new();
    let mut stream = feedback_record(1_700_000_000, &[0xAA; 32]);
    stream.extend(feedback_record(1_700_000_060, &[0x0F; 32]));
    gateway.queue_connection(MockConnectionScript::stream(&stream));

    let records = reader(&gateway).drain().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp(), 1_700_000_000);
    assert_eq!(records[0].token(), "aa".repeat(32));
    assert_eq!(records[1].timestamp(), 1_700_000_060);
    assert_eq!(records[1].token(), "0f".repeat(32));
}

#[test]
fn test_devices_returns_tokens_only() {
    let gateway = MockGateway::new();
    let mut stream = feedback_record(1, &[1; 32]);
    stream.extend(feedback_record(2, &[2; 32]));
    gateway.queue_connection(MockConnectionScript::stream(&stream));

    let devices = reader(&gateway).devices().unwrap();

    assert_eq!(devices, vec![token(1), token(2)]);
}

#[test]
fn test_partial_trailing_record_is_protocol_error() {
    let gateway = MockGateway::new();
    let mut stream = feedback_record(1, &[1; 32]);
    stream.extend_from_slice(&[0, 0, 0, 2, 0, 32, 9, 9]);
    gateway.queue_connection(MockConnectionScript::stream(&stream));

    let err = reader(&gateway).drain().unwrap_err();

    assert!(matches!(err, NetworkError::Protocol(_)));
    assert!(gateway.connections()[0].closed);
}

#[test]
fn test_each_drain_uses_a_fresh_connection() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::stream(&feedback_record(1, &[1; 32])));
    gateway.queue_connection(MockConnectionScript::stream(&[]));

    let reader = reader(&gateway);
    assert_eq!(reader.drain().unwrap().len(), 1);
    assert!(reader.drain().unwrap().is_empty());
    assert_eq!(gateway.open_count(), 2);
}

#[test]
fn test_handshake_failure_propagates() {
    let gateway = MockGateway::new();
    gateway.fail_handshakes((0..3).map(|_| NetworkError::Tls("unknown ca".into())));

    let err = reader(&gateway).drain().unwrap_err();

    assert!(matches!(err, NetworkError::Handshake(_)));
    assert!(gateway.connections().iter().all(|log| log.closed));
}

#[test]
fn test_no_writes_to_feedback_service() {
    let gateway = MockGateway::new();
    gateway.queue_connection(MockConnectionScript::stream(&feedback_record(1, &[1; 32])));

    reader(&gateway).drain().unwrap();

    assert!(gateway.connections()[0].written.is_empty());
}
