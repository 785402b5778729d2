//! Request body decoding.
//!
//! Bodies are decoded from raw bytes whatever the `Content-Type`; every
//! decoding failure is a 400.

use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Decode a JSON body, rejecting empty and malformed payloads with 400.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    if is_blank(body) {
        return Err(AppError::bad_request("request body is required"));
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("invalid JSON body: {err}")))
}

/// Decode an optional JSON body; empty bodies yield `None`.
pub fn parse_optional_json<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, AppError> {
    if is_blank(body) {
        return Ok(None);
    }
    parse_json(body).map(Some)
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        titulo: Option<String>,
    }

    #[test]
    fn empty_body_is_a_bad_request() {
        let err = parse_json::<Payload>(b"  \n").unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn type_mismatch_is_a_bad_request() {
        let err = parse_json::<Payload>(br#"{"titulo": 3}"#).unwrap_err();
        assert!(err.to_string().contains("invalid JSON body"));
    }

    #[test]
    fn optional_body_allows_empty() {
        assert_eq!(parse_optional_json::<String>(b"").unwrap(), None);
        assert_eq!(
            parse_optional_json::<String>(br#""abc""#).unwrap(),
            Some("abc".to_string())
        );
    }
}
