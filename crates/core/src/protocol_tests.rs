// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

fn chat() -> Identifier {
    Identifier::new("ChatChannel").with("room", 1)
}

#[test]
fn subscribe_wire_format() {
    let json: Value = serde_json::from_str(&Command::subscribe(&chat()).to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        json!({
            "command": "subscribe",
            "identifier": "{\"channel\":\"ChatChannel\",\"room\":1}"
        })
    );
}

#[test]
fn unsubscribe_wire_format() {
    let json: Value =
        serde_json::from_str(&Command::unsubscribe(&chat()).to_json().unwrap()).unwrap();
    assert_eq!(json["command"], "unsubscribe");
    assert_eq!(json["identifier"], chat().to_json());
}

#[test]
fn message_wire_format_double_encodes_data() {
    let frame = OutboundFrame::new("speak").with("body", "hi");
    let json: Value =
        serde_json::from_str(&Command::message(&chat(), &frame).to_json().unwrap()).unwrap();

    assert_eq!(json["command"], "message");
    let data: Value = serde_json::from_str(json["data"].as_str().unwrap()).unwrap();
    assert_eq!(data, json!({"action": "speak", "body": "hi"}));
}

#[test]
fn command_identifier_accessor() {
    let frame = OutboundFrame::new("speak");
    for command in [
        Command::subscribe(&chat()),
        Command::unsubscribe(&chat()),
        Command::message(&chat(), &frame),
    ] {
        assert_eq!(command.identifier(), chat().to_json());
    }
}

#[parameterized(
    welcome = { r#"{"type":"welcome"}"#, Some(FrameType::Welcome) },
    ping = { r#"{"type":"ping","message":1700000000}"#, Some(FrameType::Ping) },
    confirm = { r#"{"type":"confirm_subscription","identifier":"{\"channel\":\"ChatChannel\"}"}"#, Some(FrameType::ConfirmSubscription) },
    reject = { r#"{"type":"reject_subscription","identifier":"{\"channel\":\"ChatChannel\"}"}"#, Some(FrameType::RejectSubscription) },
    disconnect = { r#"{"type":"disconnect","reason":"unauthorized","reconnect":false}"#, Some(FrameType::Unknown) },
    broadcast = { r#"{"identifier":"{\"channel\":\"ChatChannel\"}","message":{"body":"hi"}}"#, None },
)]
fn server_frame_types(raw: &str, expected: Option<FrameType>) {
    let frame = ServerFrame::from_json(raw).unwrap();
    assert_eq!(frame.frame_type(), expected);
}

#[test]
fn server_frame_decodes_nested_identifier() {
    let raw = r#"{"identifier":"{\"room\":1,\"channel\":\"ChatChannel\"}","message":{"body":"hi"}}"#;
    let frame = ServerFrame::from_json(raw).unwrap();
    assert_eq!(frame.decode_identifier().unwrap().unwrap(), chat());
    assert_eq!(frame.message, Some(json!({"body": "hi"})));
}

#[test]
fn server_frame_without_identifier() {
    let frame = ServerFrame::from_json(r#"{"type":"welcome"}"#).unwrap();
    assert!(frame.decode_identifier().is_none());
}

#[test]
fn server_frame_keeps_unknown_fields() {
    let frame =
        ServerFrame::from_json(r#"{"type":"disconnect","reason":"unauthorized","reconnect":false}"#)
            .unwrap();
    assert_eq!(frame.extra["reason"], json!("unauthorized"));
    assert_eq!(frame.extra["reconnect"], json!(false));
}

#[parameterized(
    not_json = { "not json" },
    array = { "[1,2,3]" },
    numeric_type = { r#"{"type":5}"# },
)]
fn server_frame_rejects_malformed(raw: &str) {
    assert!(ServerFrame::from_json(raw).is_err());
}

#[test]
fn server_frame_constructors_match_wire_format() {
    assert_eq!(ServerFrame::welcome().to_json().unwrap(), r#"{"type":"welcome"}"#);

    let confirm: Value = serde_json::from_str(&ServerFrame::confirm(&chat()).to_json().unwrap()).unwrap();
    assert_eq!(
        confirm,
        json!({"type": "confirm_subscription", "identifier": chat().to_json()})
    );

    let broadcast: Value =
        serde_json::from_str(&ServerFrame::broadcast(&chat(), json!({"body": "hi"})).to_json().unwrap())
            .unwrap();
    assert_eq!(
        broadcast,
        json!({"identifier": chat().to_json(), "message": {"body": "hi"}})
    );
}
