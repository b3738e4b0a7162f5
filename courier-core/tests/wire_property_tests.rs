// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Property Tests for wire decoding
//!
//! Decoders must never panic on arbitrary input and must accept exactly
//! the fixed frame widths.

use courier_core::feedback::{FeedbackRecord, FEEDBACK_RECORD_SIZE};
use courier_core::push::{encode_push_frame, ErrorFrame, ERROR_FRAME_SIZE, PUSH_FRAME_OVERHEAD};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_error_frame_decode_total(bytes in proptest::collection::vec(any::<u8>(), 0..16)) {
        let decoded = ErrorFrame::decode(&bytes);
        prop_assert_eq!(decoded.is_ok(), bytes.len() == ERROR_FRAME_SIZE);
    }

    #[test]
    fn prop_error_frame_identifier_big_endian(status in any::<u8>(), id in any::<u32>()) {
        let mut bytes = vec![8, status];
        bytes.extend_from_slice(&id.to_be_bytes());

        let frame = ErrorFrame::decode(&bytes).unwrap();
        prop_assert_eq!(frame.status, status);
        prop_assert_eq!(frame.identifier, id);
    }

    #[test]
    fn prop_feedback_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..80)) {
        let _ = FeedbackRecord::decode(&bytes);
    }

    #[test]
    fn prop_feedback_token_hex_matches_length(
        timestamp in any::<u32>(),
        token in proptest::collection::vec(any::<u8>(), 1..=32),
    ) {
        let mut bytes = timestamp.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(token.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&token);
        bytes.resize(FEEDBACK_RECORD_SIZE, 0xFF);

        let record = FeedbackRecord::decode(&bytes).unwrap();
        prop_assert_eq!(record.timestamp(), timestamp);
        prop_assert_eq!(record.token(), hex::encode(&token));
    }

    #[test]
    fn prop_push_frame_length(
        id in any::<u32>(),
        token in proptest::collection::vec(any::<u8>(), 1..64),
        payload in proptest::collection::vec(any::<u8>(), 1..512),
    ) {
        let frame = encode_push_frame(id, 0, &token, &payload).unwrap();
        prop_assert_eq!(frame.len(), PUSH_FRAME_OVERHEAD + token.len() + payload.len());
        prop_assert_eq!(&frame[1..5], &id.to_be_bytes()[..]);
    }
}
