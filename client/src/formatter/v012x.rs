//! Formatter for 0.12.x servers.
//!
//! Writes are line protocol. Every `/query` response is wrapped in a results
//! envelope:
//!
//! ```json
//! {"results":[{"series":[{"name":"cpu","tags":{},"columns":["time","value"],"values":[[1,0.5]]}]}]}
//! ```
//!
//! Statement failures arrive in-band as `{"results":[{"error":"..."}]}` with a
//! 200 status, so the envelope is checked even for fire-and-forget calls.

use std::collections::BTreeMap;

use models::Serie;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    is_blank, line_protocol, EncodedBody, FormatError, Formatter, Payload,
    LINE_PROTOCOL_CONTENT_TYPE,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct V012xFormatter;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<EnvelopeSeries>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeSeries {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl Envelope {
    /// Surface the first in-band error, top level first.
    fn into_checked(self) -> Result<Vec<StatementResult>, FormatError> {
        if let Some(error) = self.error {
            return Err(FormatError::ServerReported(error));
        }
        if let Some(error) = self.results.iter().find_map(|r| r.error.clone()) {
            return Err(FormatError::ServerReported(error));
        }
        Ok(self.results)
    }
}

fn is_envelope(document: &Value) -> bool {
    document
        .as_object()
        .is_some_and(|o| o.contains_key("results") || o.contains_key("error"))
}

impl Formatter for V012xFormatter {
    fn encode(&self, payload: &Payload<'_>) -> Result<EncodedBody, FormatError> {
        match payload {
            Payload::Series(series) => Ok(EncodedBody {
                content_type: LINE_PROTOCOL_CONTENT_TYPE,
                bytes: line_protocol::encode(series)?.into_bytes(),
            }),
            other => Ok(EncodedBody::json(other.to_json()?)),
        }
    }

    /// Envelopes become an array of row objects keyed by column name; any
    /// other JSON passes through unchanged.
    fn decode_document(&self, body: &[u8]) -> Result<Value, FormatError> {
        if is_blank(body) {
            return Ok(Value::Null);
        }
        let document: Value = serde_json::from_slice(body)?;
        if !is_envelope(&document) {
            return Ok(document);
        }

        let envelope: Envelope = serde_json::from_value(document)?;
        let rows = envelope
            .into_checked()?
            .into_iter()
            .flat_map(|result| result.series)
            .flat_map(|series| {
                let columns = series.columns;
                series.values.into_iter().map(move |row| {
                    Value::Object(columns.iter().cloned().zip(row).collect::<Map<_, _>>())
                })
            })
            .collect();
        Ok(Value::Array(rows))
    }

    fn decode_series(&self, body: &[u8]) -> Result<Vec<Serie>, FormatError> {
        if is_blank(body) {
            return Ok(Vec::new());
        }
        let envelope: Envelope = serde_json::from_slice(body)?;
        Ok(envelope
            .into_checked()?
            .into_iter()
            .flat_map(|result| result.series)
            .map(|s| Serie {
                name: s.name,
                tags: s.tags,
                columns: s.columns,
                points: s.values,
            })
            .collect())
    }

    fn check_acknowledgement(&self, body: &[u8]) -> Result<(), FormatError> {
        if is_blank(body) {
            return Ok(());
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(document) if is_envelope(&document) => {
                serde_json::from_value::<Envelope>(document)?.into_checked()?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
