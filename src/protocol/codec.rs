//! Wire codec
//!
//! Converts payloads to bytes and request frames back into `Request`s.
//! The default codec sends one JSON document per line.

use crate::error::CodecError;
use crate::protocol::{Payload, Request};

/// Byte-level encoding used by the connection layer.
pub trait WireCodec: Send + Sync {
    /// Encodes a payload as one complete frame, terminator included.
    fn encode_payload(&self, payload: &Payload) -> Result<Vec<u8>, CodecError>;

    /// Decodes one received frame.
    fn decode_request(&self, frame: &[u8]) -> Result<Request, CodecError>;
}

/// Newline-delimited JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLineCodec;

impl WireCodec for JsonLineCodec {
    fn encode_payload(&self, payload: &Payload) -> Result<Vec<u8>, CodecError> {
        let mut bytes =
            serde_json::to_vec(payload).map_err(|e| CodecError::Encode(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn decode_request(&self, frame: &[u8]) -> Result<Request, CodecError> {
        let frame = frame.trim_ascii();
        if frame.is_empty() {
            return Err(CodecError::Malformed("empty request".into()));
        }
        serde_json::from_slice(frame).map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::UserStatus;
    use crate::protocol::{Operation, StatusCode, build_simple};

    #[test]
    fn encoded_payload_is_one_line() {
        let payload = build_simple(Operation::SendMessage, StatusCode::Ok, "sent");
        let bytes = JsonLineCodec.encode_payload(&payload).unwrap();

        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn decodes_requests_with_trailing_crlf() {
        let request = JsonLineCodec
            .decode_request(b"{\"operation\":\"register_user\",\"username\":\"alice\"}\r\n")
            .unwrap();
        assert_eq!(
            request,
            Request::RegisterUser {
                username: "alice".into()
            }
        );
    }

    #[test]
    fn optional_fields_default_to_none() {
        let request = JsonLineCodec
            .decode_request(b"{\"operation\":\"get_users\"}")
            .unwrap();
        assert_eq!(request, Request::GetUsers { username: None });

        let request = JsonLineCodec
            .decode_request(b"{\"operation\":\"update_status\",\"status\":\"offline\"}")
            .unwrap();
        assert_eq!(
            request,
            Request::UpdateStatus {
                status: UserStatus::Offline
            }
        );
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(
            JsonLineCodec.decode_request(b"   \r\n"),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            JsonLineCodec.decode_request(b"{\"operation\":\"dance\"}"),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            JsonLineCodec.decode_request(b"not json"),
            Err(CodecError::Malformed(_))
        ));
    }
}
