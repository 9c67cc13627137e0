//! Async HTTP client for InfluxDB servers.
//!
//! One [`InfluxDbClient`] talks to one server. The server generation is fixed
//! at construction through [`ServerVersion`] and selects the dialect: endpoint
//! table, credential parameters and wire formatter.
//!
//! ```no_run
//! # async fn run() -> influxdb_client::Result<()> {
//! use influxdb_client::{ClientConfiguration, InfluxDbClient, ServerVersion, TimePrecision};
//!
//! let config = ClientConfiguration::new("http://localhost:8086", "root", "root", ServerVersion::Legacy)?;
//! let client = InfluxDbClient::new(config)?;
//! let series = client.query("mydb", "select * from cpu", TimePrecision::Seconds).await?;
//! # let _ = series;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment
//! | Env var                          | Meaning                               |
//! |----------------------------------|---------------------------------------|
//! | `INFLUXDB_URL`                   | base URL, `http` or `https`           |
//! | `INFLUXDB_USERNAME`              | account name sent as `u`              |
//! | `INFLUXDB_PASSWORD`              | account password sent as `p`          |
//! | `INFLUXDB_VERSION`               | `legacy` or `0.12.x`                  |
//! | `INFLUXDB_TIMEOUT_SECS`          | optional request timeout              |
//! | `INFLUXDB_CONNECT_TIMEOUT_SECS`  | optional connect timeout              |
//!
//! # Modules
//! | Module | Role |
//! |--------|------|
//! | [`config`] | configuration, credentials, server version |
//! | [`dialect`] | per-version endpoint tables |
//! | [`request`] | path and query resolution |
//! | [`formatter`] | body encoding and response decoding |
//! | [`transport`] | the HTTP seam and its test double |
//! | [`client`] | the public facade |

pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod formatter;
pub mod precision;
pub mod request;
pub mod transport;

pub use client::InfluxDbClient;
pub use config::{ClientConfiguration, ConfigError, Credentials, ServerVersion, TransportOptions};
pub use error::{ClientError, Result};
pub use precision::TimePrecision;
pub use transport::{FakeTransport, HttpTransport, RawResponse, ReqwestTransport};

pub use models::{
    ContinuousQuery, Database, DatabaseConfiguration, Pong, Serie, Server, Shard, ShardMember,
    ShardSpace, Shards, User,
};
