//! Wire encoding and decoding, one [`Formatter`] per server dialect.
//!
//! The request builder hands outgoing [`Payload`]s to the dialect formatter and
//! the client facade hands response bodies back to it. Decoding goes through a
//! `serde_json::Value` document so that envelope differences between server
//! generations stay inside the formatter; the facade only converts the final
//! document into the operation's return type.

mod legacy;
mod line_protocol;
mod v012x;

use std::fmt;

use models::{Database, DatabaseConfiguration, Serie, Shard, ShardMember, ShardSpace, User};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use legacy::LegacyFormatter;
pub use v012x::V012xFormatter;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const LINE_PROTOCOL_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server reported: {0}")]
    ServerReported(String),
    #[error("cannot encode series '{series}': {reason}")]
    Unencodable { series: String, reason: String },
}

// ------------------------------------------------------------------ //
//  Payloads                                                           //
// ------------------------------------------------------------------ //

/// A request body, borrowed from the caller for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Database(&'a Database),
    DatabaseConfiguration(&'a DatabaseConfiguration),
    User(&'a User),
    Series(&'a [Serie]),
    Shard(&'a Shard),
    ShardMember(&'a ShardMember),
    ShardSpace(&'a ShardSpace),
}

impl Payload<'_> {
    /// Plain JSON rendering shared by every dialect for document bodies.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Payload::Database(v) => serde_json::to_vec(v),
            Payload::DatabaseConfiguration(v) => serde_json::to_vec(v),
            Payload::User(v) => serde_json::to_vec(v),
            Payload::Series(v) => serde_json::to_vec(v),
            Payload::Shard(v) => serde_json::to_vec(v),
            Payload::ShardMember(v) => serde_json::to_vec(v),
            Payload::ShardSpace(v) => serde_json::to_vec(v),
        }
    }
}

/// Bytes ready to be sent, with the matching `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl EncodedBody {
    pub fn json(bytes: Vec<u8>) -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE,
            bytes,
        }
    }
}

// ------------------------------------------------------------------ //
//  Trait                                                              //
// ------------------------------------------------------------------ //

pub trait Formatter: Send + Sync + fmt::Debug {
    fn encode(&self, payload: &Payload<'_>) -> Result<EncodedBody, FormatError>;

    /// Decode a response body into a plain document. An empty body decodes
    /// to `null`.
    fn decode_document(&self, body: &[u8]) -> Result<serde_json::Value, FormatError>;

    fn decode_series(&self, body: &[u8]) -> Result<Vec<Serie>, FormatError>;

    /// Inspect the body of a successful fire-and-forget call for errors the
    /// server reported in-band.
    fn check_acknowledgement(&self, _body: &[u8]) -> Result<(), FormatError> {
        Ok(())
    }
}

/// Decode `body` through `formatter` and convert the document into `T`.
pub fn decode_as<T: DeserializeOwned>(
    formatter: &dyn Formatter,
    body: &[u8],
) -> Result<T, FormatError> {
    let document = formatter.decode_document(body)?;
    Ok(serde_json::from_value(document)?)
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}
