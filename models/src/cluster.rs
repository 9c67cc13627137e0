//! Cluster topology payloads: servers, shards and shard spaces.

use serde::{Deserialize, Serialize};

/// A cluster member as listed by `GET /cluster/servers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: u64,
    #[serde(default)]
    pub is_leader: bool,
    #[serde(default)]
    pub is_up: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protobuf_connect_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raft_connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raft_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,
}

/// The set of servers holding one shard replica.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardMember {
    pub server_ids: Vec<u64>,
}

/// A shard covering `[start_time, end_time)` in epoch seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    /// Assigned by the server; absent when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub long_term: bool,
    #[serde(default)]
    pub shards: Vec<ShardMember>,
}

/// Response of `GET /cluster/shards`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shards {
    #[serde(default)]
    pub long_term: Vec<Shard>,
    #[serde(default)]
    pub short_term: Vec<Shard>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardSpace {
    pub name: String,
    /// Filled in by the server when listing; the create route carries it in
    /// the path instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub regex: String,
    pub retention_policy: String,
    pub shard_duration: String,
    pub replication_factor: u32,
    pub split: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shards_listing_decodes_both_terms() {
        let shards: Shards = serde_json::from_value(serde_json::json!({
            "longTerm": [
                { "id": 1, "startTime": 0, "endTime": 604800, "longTerm": true,
                  "shards": [{ "serverIds": [1, 2] }] }
            ],
            "shortTerm": []
        }))
        .unwrap();
        assert_eq!(shards.long_term.len(), 1);
        assert_eq!(shards.long_term[0].shards[0].server_ids, vec![1, 2]);
        assert!(shards.short_term.is_empty());
    }

    #[test]
    fn new_shard_omits_id() {
        let shard = Shard {
            start_time: 10,
            end_time: 20,
            ..Default::default()
        };
        let json = serde_json::to_value(&shard).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["startTime"], 10);
    }
}
