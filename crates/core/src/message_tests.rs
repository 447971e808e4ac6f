// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;

#[test]
fn message_merges_action_into_payload() {
    let frame = OutboundFrame::new("speak").with("body", "hello");
    let message = Value::Object(frame.message());
    assert_eq!(message, json!({"action": "speak", "body": "hello"}));
}

#[test]
fn action_wins_over_payload_field() {
    let frame = OutboundFrame::new("speak").with(ACTION_KEY, "shout");
    assert_eq!(frame.message()[ACTION_KEY], json!("speak"));
}

#[test]
fn message_does_not_mutate_payload() {
    let frame = OutboundFrame::new("speak").with("body", "hello");
    let _ = frame.message();
    assert!(!frame.payload().contains_key(ACTION_KEY));
}

#[test]
fn raw_is_valid_json_of_message() {
    let frame = OutboundFrame::new("join").with("room", 3);
    let decoded: Value = serde_json::from_str(&frame.raw()).unwrap();
    assert_eq!(decoded, json!({"action": "join", "room": 3}));
}

#[test]
fn from_value_accepts_objects() {
    let frame = OutboundFrame::from_value("speak", json!({"body": "hi"})).unwrap();
    assert_eq!(frame.action(), "speak");
    assert_eq!(frame.payload()["body"], json!("hi"));
}

#[test]
fn from_value_rejects_non_objects() {
    let err = OutboundFrame::from_value("speak", json!(["hi"])).unwrap_err();
    assert!(matches!(err, Error::InvalidPayload(_)));
}
