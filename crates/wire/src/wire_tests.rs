// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(1);

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = Response::Ok;
    let encoded = encode(&response).expect("encode failed");

    // encode() returns raw JSON, no length prefix
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(json_str.starts_with('{'), "should be JSON object: {}", json_str);
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");
    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn truncated_payload_is_connection_closed() {
    let mut buffer = 10u32.to_be_bytes().to_vec();
    buffer.extend_from_slice(b"abc");
    let err = read_message(&mut std::io::Cursor::new(buffer)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_length_prefix_rejected() {
    let buffer = (MAX_MESSAGE_BYTES as u32 + 1).to_be_bytes().to_vec();
    let err = read_message(&mut std::io::Cursor::new(buffer)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge(_)));
}

#[tokio::test]
async fn request_roundtrip_through_duplex() {
    let (mut client, mut server) = tokio::io::duplex(1024);
    let request = Request::Cancel { id: "job-abc".into() };

    write_request(&mut client, &request, TIMEOUT).await.unwrap();
    let received = read_request(&mut server, TIMEOUT).await.unwrap();
    assert_eq!(received, request);

    write_response(&mut server, &Response::ShuttingDown, TIMEOUT).await.unwrap();
    assert_eq!(read_response(&mut client, TIMEOUT).await.unwrap(), Response::ShuttingDown);
}

#[tokio::test]
async fn read_times_out_when_peer_is_silent() {
    let (_client, mut server) = tokio::io::duplex(64);
    let err = read_request(&mut server, Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));
}

#[tokio::test]
async fn garbage_payload_is_json_error() {
    let mut buffer = Vec::new();
    write_message(&mut buffer, b"not json").await.unwrap();
    let err = read_request(&mut std::io::Cursor::new(buffer), TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Json(_)));
}
