//! Database, user and continuous-query payloads.

use serde::{Deserialize, Serialize};

use crate::cluster::ShardSpace;

/// A database as listed by `GET /db` or created by `POST /db`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Database {
    pub name: String,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Shard-space layout and continuous queries applied when a database is
/// created through `/cluster/database_configs/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfiguration {
    #[serde(default)]
    pub spaces: Vec<ShardSpace>,
    #[serde(default)]
    pub continuous_queries: Vec<String>,
}

/// A cluster admin or database user.
///
/// `password` is only sent on create/update; the server never returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// Regex of series the user may read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_from: Option<String>,
    /// Regex of series the user may write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_to: Option<String>,
}

impl User {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: Some(password.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContinuousQuery {
    pub id: u64,
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_omits_absent_optionals() {
        let user = User::new("paul", "secret");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "paul", "password": "secret", "isAdmin": false })
        );
    }

    #[test]
    fn user_listing_without_password_decodes() {
        let users: Vec<User> = serde_json::from_value(serde_json::json!([
            { "name": "dbuser", "isAdmin": true, "readFrom": ".*", "writeTo": "^cpu" }
        ]))
        .unwrap();
        assert_eq!(users[0].password, None);
        assert!(users[0].is_admin);
        assert_eq!(users[0].write_to.as_deref(), Some("^cpu"));
    }

    #[test]
    fn database_configuration_uses_camel_case() {
        let config = DatabaseConfiguration {
            spaces: vec![],
            continuous_queries: vec!["select * from cpu into cpu.1m".into()],
        };
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("continuousQueries").is_some());
    }
}
