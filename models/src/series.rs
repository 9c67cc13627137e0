//! Time-series payloads.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One named series: a column header plus rows of values.
///
/// A column called `time` holds the point timestamp in the precision given to
/// the write or query call. `tags` are only understood by servers that have
/// tagged series; older servers never return them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Serie {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub points: Vec<Vec<serde_json::Value>>,
}

impl Serie {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            columns: columns.into_iter().map(Into::into).collect(),
            points: Vec::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Append a row. Values are matched to `columns` by position.
    pub fn with_point(mut self, values: Vec<serde_json::Value>) -> Self {
        self.points.push(values);
        self
    }
}

/// Liveness probe result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Pong {
    #[serde(default)]
    pub status: String,
    /// Round-trip time measured by the client.
    #[serde(skip)]
    pub response_time: Duration,
    /// Value of the `X-Influxdb-Version` response header, if sent.
    #[serde(skip)]
    pub version: Option<String>,
}
