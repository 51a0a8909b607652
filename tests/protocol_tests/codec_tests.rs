//! Codec Tests
//!
//! Tests for framing, response encoding and state update decoding.

use std::io::{self, Cursor, Read};
use iothouse::house::{Field, HouseState};
use iothouse::protocol::{
    Assignment, FrameReader, Response,
    encode_response, write_response, format_state_update,
    encode_get_request, encode_set_request, decode_state_update,
};
use iothouse::HouseError;

// =============================================================================
// Helper Functions
// =============================================================================

fn reader(input: &[u8]) -> FrameReader<Cursor<Vec<u8>>> {
    FrameReader::new(Cursor::new(input.to_vec()), 1024)
}

/// Fails with `Interrupted` before every real read
struct InterruptingReader {
    inner: Cursor<Vec<u8>>,
    interrupt_next: bool,
}

impl Read for InterruptingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupt_next {
            self.interrupt_next = false;
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        self.interrupt_next = true;
        self.inner.read(buf)
    }
}

// =============================================================================
// Frame Reader Tests
// =============================================================================

#[test]
fn test_read_single_frame_strips_terminator() {
    let mut frames = reader(b"G.");
    let frame = frames.read_frame().unwrap().unwrap();
    assert_eq!(&frame[..], b"G");
}

#[test]
fn test_read_multiple_frames_in_order() {
    let mut frames = reader(b"G.S: D=1;.X.");
    assert_eq!(&frames.read_frame().unwrap().unwrap()[..], b"G");
    assert_eq!(&frames.read_frame().unwrap().unwrap()[..], b"S: D=1;");
    assert_eq!(&frames.read_frame().unwrap().unwrap()[..], b"X");
    assert!(frames.read_frame().unwrap().is_none());
}

#[test]
fn test_empty_frame_is_valid() {
    let mut frames = reader(b".");
    let frame = frames.read_frame().unwrap().unwrap();
    assert!(frame.is_empty());
}

#[test]
fn test_end_of_stream_without_data_is_none() {
    let mut frames = reader(b"");
    assert!(frames.read_frame().unwrap().is_none());
}

#[test]
fn test_end_of_stream_closes_partial_frame() {
    let mut frames = reader(b"GS");
    assert_eq!(&frames.read_frame().unwrap().unwrap()[..], b"GS");
    assert!(frames.read_frame().unwrap().is_none());
}

#[test]
fn test_frame_at_limit_is_accepted() {
    let mut input = vec![b'a'; 1024];
    input.push(b'.');
    let mut frames = reader(&input);
    assert_eq!(frames.read_frame().unwrap().unwrap().len(), 1024);
}

#[test]
fn test_frame_over_limit_fails() {
    let input = vec![b'a'; 1025];
    let mut frames = reader(&input);
    match frames.read_frame() {
        Err(HouseError::FrameTooLarge { limit }) => assert_eq!(limit, 1024),
        other => panic!("Expected FrameTooLarge, got {:?}", other),
    }
}

#[test]
fn test_oversized_frame_is_connection_fatal() {
    let err = HouseError::FrameTooLarge { limit: 1024 };
    assert!(err.is_connection_fatal());
    assert!(!HouseError::UnknownCommand(Some(b'X')).is_connection_fatal());
}

#[test]
fn test_reader_does_not_consume_past_terminator() {
    let mut frames = reader(b"G.rest");
    frames.read_frame().unwrap();

    let mut rest = Vec::new();
    frames.into_inner().read_to_end(&mut rest).unwrap();
    assert_eq!(rest, b"rest");
}

#[test]
fn test_interrupted_reads_are_retried() {
    let source = InterruptingReader {
        inner: Cursor::new(b"G.".to_vec()),
        interrupt_next: true,
    };
    let mut frames = FrameReader::new(source, 1024);
    assert_eq!(&frames.read_frame().unwrap().unwrap()[..], b"G");
}

// =============================================================================
// Response Encoding Tests
// =============================================================================

#[test]
fn test_state_update_for_initial_state() {
    assert_eq!(
        format_state_update(&HouseState::default()),
        "SU:TR=-1;HR=-1;DS=0;LS=0;PS=0;AS=0."
    );
}

#[test]
fn test_state_update_renders_every_field_in_order() {
    let state = HouseState {
        temperature: 72,
        humidity: 40,
        door_open: true,
        light_on: false,
        proximity_detected: true,
        alarm_on: true,
    };
    let encoded = encode_response(&Response::StateUpdate(state));
    assert_eq!(encoded, b"SU:TR=72;HR=40;DS=1;LS=0;PS=1;AS=1.");
}

#[test]
fn test_ack_has_no_terminator() {
    assert_eq!(encode_response(&Response::Ack), b"OK");
}

#[test]
fn test_write_response_to_stream() {
    let mut out = Vec::new();
    write_response(&mut out, &Response::Ack).unwrap();
    write_response(&mut out, &Response::StateUpdate(HouseState::default())).unwrap();
    assert_eq!(out, b"OKSU:TR=-1;HR=-1;DS=0;LS=0;PS=0;AS=0.");
}

// =============================================================================
// Controller Request Tests
// =============================================================================

#[test]
fn test_get_request() {
    assert_eq!(encode_get_request(), b"GS.");
}

#[test]
fn test_set_request_uses_canonical_tokens() {
    let request = encode_set_request(&[
        Assignment::new(Field::Door, true),
        Assignment::new(Field::Light, false),
        Assignment::new(Field::Alarm, true),
    ]);
    assert_eq!(request, b"SS:DS=1;LS=0;AS=1;.");
}

#[test]
fn test_empty_set_request() {
    assert_eq!(encode_set_request(&[]), b"SS:.");
}

// =============================================================================
// State Update Decoding Tests
// =============================================================================

#[test]
fn test_decode_state_update() {
    let state = decode_state_update(b"SU:TR=21;HR=-1;DS=1;LS=0;PS=1;AS=0.").unwrap();
    assert_eq!(
        state,
        HouseState {
            temperature: 21,
            humidity: -1,
            door_open: true,
            light_on: false,
            proximity_detected: true,
            alarm_on: false,
        }
    );
}

#[test]
fn test_decode_without_terminator() {
    let state = decode_state_update(b"SU:TR=-1;HR=-1;DS=0;LS=1;PS=0;AS=0").unwrap();
    assert!(state.light_on);
}

#[test]
fn test_decode_ignores_unknown_keys() {
    let state = decode_state_update(b"SU:TR=1;HR=2;HUS=1;DS=0;LS=0;PS=0;AS=1;").unwrap();
    assert_eq!(state.temperature, 1);
    assert_eq!(state.humidity, 2);
    assert!(state.alarm_on);
}

#[test]
fn test_decode_rejects_wrong_prefix() {
    assert!(matches!(
        decode_state_update(b"OK"),
        Err(HouseError::Protocol(_))
    ));
}

#[test]
fn test_decode_rejects_missing_field() {
    assert!(matches!(
        decode_state_update(b"SU:TR=1;HR=2;DS=0;LS=0;PS=0."),
        Err(HouseError::Protocol(_))
    ));
}

#[test]
fn test_decode_rejects_non_integer_value() {
    assert!(matches!(
        decode_state_update(b"SU:TR=hot;HR=2;DS=0;LS=0;PS=0;AS=0."),
        Err(HouseError::Protocol(_))
    ));
}

#[test]
fn test_encoded_state_decodes_back() {
    let state = HouseState {
        temperature: -40,
        humidity: 99,
        door_open: false,
        light_on: true,
        proximity_detected: false,
        alarm_on: true,
    };
    let encoded = format_state_update(&state);
    assert_eq!(decode_state_update(encoded.as_bytes()).unwrap(), state);
}
