//! JSON formatter for 0.8-era clustered servers.

use models::Serie;

use super::{is_blank, EncodedBody, FormatError, Formatter, Payload};

/// Every body is plain JSON; series travel as `[{name, columns, points}]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFormatter;

impl Formatter for LegacyFormatter {
    fn encode(&self, payload: &Payload<'_>) -> Result<EncodedBody, FormatError> {
        Ok(EncodedBody::json(payload.to_json()?))
    }

    fn decode_document(&self, body: &[u8]) -> Result<serde_json::Value, FormatError> {
        if is_blank(body) {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(body)?)
    }

    fn decode_series(&self, body: &[u8]) -> Result<Vec<Serie>, FormatError> {
        if is_blank(body) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(body)?)
    }
}
