//! Client configuration.
//!
//! A [`ClientConfiguration`] is built once by the caller and handed to
//! [`crate::InfluxDbClient::new`]. It is never mutated afterwards.
//!
//! # Environment variables
//! | Var                              | Default      |
//! |----------------------------------|--------------|
//! | `INFLUXDB_URL`                   | required     |
//! | `INFLUXDB_USERNAME`              | required     |
//! | `INFLUXDB_PASSWORD`              | required     |
//! | `INFLUXDB_VERSION`               | required     |
//! | `INFLUXDB_TIMEOUT_SECS`          | none         |
//! | `INFLUXDB_CONNECT_TIMEOUT_SECS`  | none         |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown server version '{0}'")]
    UnknownVersion(String),
    #[error("invalid base url '{url}'")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("environment variable '{0}' is not set")]
    MissingVar(&'static str),
    #[error("environment variable '{name}' has invalid value '{value}'")]
    InvalidVar { name: &'static str, value: String },
    #[error("failed to construct HTTP transport")]
    HttpClient(#[source] reqwest::Error),
}

// ------------------------------------------------------------------ //
//  Server version                                                     //
// ------------------------------------------------------------------ //

/// Protocol generation of the target server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerVersion {
    /// 0.8-era clustered server: `/db/{name}/series`, JSON series bodies.
    Legacy,
    /// 0.12.x server: `/write` + `/query`, line protocol writes.
    V012x,
}

impl ServerVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ServerVersion::Legacy => "legacy-cluster",
            ServerVersion::V012x => "v0.12.x",
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "legacy-cluster" | "0.8" | "0.8.x" | "v0.8.x" => Ok(ServerVersion::Legacy),
            "0.12" | "0.12.x" | "v0.12.x" | "v012x" => Ok(ServerVersion::V012x),
            _ => Err(ConfigError::UnknownVersion(s.to_string())),
        }
    }
}

// ------------------------------------------------------------------ //
//  Credentials / transport tuning                                     //
// ------------------------------------------------------------------ //

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Settings passed through to the HTTP transport untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Whole-request timeout.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            user_agent: concat!("influxdb-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ------------------------------------------------------------------ //
//  Configuration                                                      //
// ------------------------------------------------------------------ //

#[derive(Debug, Clone)]
pub struct ClientConfiguration {
    base_url: Url,
    credentials: Credentials,
    version: ServerVersion,
    transport: TransportOptions,
}

impl ClientConfiguration {
    /// Validate `base_url` and assemble a configuration with default
    /// transport options.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
        version: ServerVersion,
    ) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.to_string()));
        }

        Ok(Self {
            base_url: url,
            credentials: Credentials::new(username, password),
            version,
            transport: TransportOptions::default(),
        })
    }

    pub fn with_transport_options(mut self, options: TransportOptions) -> Self {
        self.transport = options;
        self
    }

    /// Load `.env` (if present) and build a configuration from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));
        let seconds = |name: &'static str| -> Result<Option<Duration>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(|secs| Some(Duration::from_secs(secs)))
                    .map_err(|_| ConfigError::InvalidVar { name, value }),
            }
        };

        let version: ServerVersion = required("INFLUXDB_VERSION")?.parse()?;
        let config = Self::new(
            &required("INFLUXDB_URL")?,
            required("INFLUXDB_USERNAME")?,
            required("INFLUXDB_PASSWORD")?,
            version,
        )?;

        Ok(config.with_transport_options(TransportOptions {
            timeout: seconds("INFLUXDB_TIMEOUT_SECS")?,
            connect_timeout: seconds("INFLUXDB_CONNECT_TIMEOUT_SECS")?,
            ..TransportOptions::default()
        }))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn version(&self) -> ServerVersion {
        self.version
    }

    pub fn transport(&self) -> &TransportOptions {
        &self.transport
    }
}

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name: &'static str| vars.get(name).cloned()
    }

    #[test]
    fn parses_known_version_spellings() {
        assert_eq!("legacy-cluster".parse::<ServerVersion>().unwrap(), ServerVersion::Legacy);
        assert_eq!("0.8.x".parse::<ServerVersion>().unwrap(), ServerVersion::Legacy);
        assert_eq!("v0.12.x".parse::<ServerVersion>().unwrap(), ServerVersion::V012x);
        assert_eq!(" 0.12 ".parse::<ServerVersion>().unwrap(), ServerVersion::V012x);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let err = "0.7".parse::<ServerVersion>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVersion(v) if v == "0.7"));
    }

    #[test]
    fn rejects_malformed_and_non_http_urls() {
        assert!(matches!(
            ClientConfiguration::new("not a url", "u", "p", ServerVersion::Legacy),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ClientConfiguration::new("ftp://host", "u", "p", ServerVersion::Legacy),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = Credentials::new("root", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("root"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn from_lookup_reads_all_vars() {
        let config = ClientConfiguration::from_lookup(lookup(&[
            ("INFLUXDB_URL", "http://localhost:8086"),
            ("INFLUXDB_USERNAME", "root"),
            ("INFLUXDB_PASSWORD", "root"),
            ("INFLUXDB_VERSION", "0.8"),
            ("INFLUXDB_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.version(), ServerVersion::Legacy);
        assert_eq!(config.base_url().as_str(), "http://localhost:8086/");
        assert_eq!(config.transport().timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.transport().connect_timeout, None);
    }

    #[test]
    fn from_lookup_requires_version() {
        let err = ClientConfiguration::from_lookup(lookup(&[
            ("INFLUXDB_URL", "http://localhost:8086"),
            ("INFLUXDB_USERNAME", "root"),
            ("INFLUXDB_PASSWORD", "root"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("INFLUXDB_VERSION")));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let err = ClientConfiguration::from_lookup(lookup(&[
            ("INFLUXDB_URL", "http://localhost:8086"),
            ("INFLUXDB_USERNAME", "root"),
            ("INFLUXDB_PASSWORD", "root"),
            ("INFLUXDB_VERSION", "0.12"),
            ("INFLUXDB_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "INFLUXDB_TIMEOUT_SECS", .. }));
    }
}
