//! The version-bound client facade.
//!
//! Every public method follows the same path: the dialect routes the
//! [`Operation`] to a [`RequestSpec`], the builder resolves it, the invoker
//! sends it, a non-2xx status becomes [`ClientError::Server`], and the
//! formatter decodes the body into the declared return type.

use std::sync::Arc;
use std::time::Instant;

use models::{
    ContinuousQuery, Database, DatabaseConfiguration, Pong, Serie, Server, Shard, ShardMember,
    ShardSpace, Shards, User,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{ClientConfiguration, ConfigError, Credentials, ServerVersion};
use crate::dialect::{self, Dialect, Operation};
use crate::error::{ClientError, Result};
use crate::formatter::{self, FormatError, Formatter};
use crate::precision::TimePrecision;
use crate::request::RequestBuilder;
use crate::transport::{HttpTransport, Invoker, RawResponse, ReqwestTransport};

const VERSION_HEADER: &str = "X-Influxdb-Version";

/// A successful (2xx) round-trip, remembered with the call it answered.
struct Exchange {
    method: Method,
    path: &'static str,
    response: RawResponse,
}

impl Exchange {
    /// Errors the server reported inside a 2xx body are rejections, not
    /// shape mismatches.
    fn decode_error(&self, source: FormatError) -> ClientError {
        match source {
            FormatError::ServerReported(message) => {
                warn!(
                    method = %self.method,
                    path = self.path,
                    status = self.response.status,
                    error = %message,
                    "server reported statement error"
                );
                ClientError::Server {
                    method: self.method.clone(),
                    path: self.path.to_string(),
                    status: self.response.status,
                    body: message,
                }
            }
            source => ClientError::Decode {
                method: self.method.clone(),
                path: self.path.to_string(),
                source,
            },
        }
    }
}

/// Client for one InfluxDB server, bound to that server's dialect.
///
/// Cheap to clone and safe to share between tasks; nothing is mutated after
/// construction.
#[derive(Clone)]
pub struct InfluxDbClient {
    dialect: Arc<dyn Dialect>,
    formatter: Arc<dyn Formatter>,
    builder: RequestBuilder,
    invoker: Invoker,
}

impl InfluxDbClient {
    /// Build a client with the production `reqwest` transport.
    pub fn new(config: ClientConfiguration) -> Result<Self> {
        let transport = ReqwestTransport::new(config.transport()).map_err(ConfigError::HttpClient)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client over any transport.
    pub fn with_transport(config: ClientConfiguration, transport: Arc<dyn HttpTransport>) -> Self {
        let dialect = dialect::for_version(config.version());
        let formatter = dialect.formatter();
        let builder = RequestBuilder::new(
            config.base_url().clone(),
            config.credentials().clone(),
            dialect.auth_params(),
            Arc::clone(&formatter),
        );

        info!(
            version = %config.version(),
            base_url = %config.base_url(),
            "influxdb client ready"
        );

        Self {
            dialect,
            formatter,
            builder,
            invoker: Invoker::new(transport),
        }
    }

    pub fn server_version(&self) -> ServerVersion {
        self.dialect.version()
    }

    // ------------------------------------------------------------------ //
    //  Plumbing                                                           //
    // ------------------------------------------------------------------ //

    async fn send(&self, operation: Operation<'_>) -> Result<Exchange> {
        let spec = self
            .dialect
            .route(&operation)
            .ok_or_else(|| ClientError::Unsupported {
                version: self.dialect.version(),
                operation: operation.name(),
            })?;

        let method = spec.method.clone();
        let path = spec.template;
        let request = self.builder.build(spec).map_err(|source| ClientError::Build {
            method: method.clone(),
            path: path.to_string(),
            source,
        })?;

        let response = self.invoker.invoke(&request).await?;
        if !response.is_success() {
            warn!(%method, path, status = response.status, "server rejected request");
            return Err(ClientError::Server {
                method,
                path: path.to_string(),
                status: response.status,
                body: response.body_text(),
            });
        }

        Ok(Exchange {
            method,
            path,
            response,
        })
    }

    /// Fire-and-forget: only success matters.
    async fn execute(&self, operation: Operation<'_>) -> Result<()> {
        let exchange = self.send(operation).await?;
        self.formatter
            .check_acknowledgement(&exchange.response.body)
            .map_err(|e| exchange.decode_error(e))
    }

    async fn fetch<T: DeserializeOwned>(&self, operation: Operation<'_>) -> Result<T> {
        let exchange = self.send(operation).await?;
        formatter::decode_as(self.formatter.as_ref(), &exchange.response.body)
            .map_err(|e| exchange.decode_error(e))
    }

    // ------------------------------------------------------------------ //
    //  Diagnostics                                                        //
    // ------------------------------------------------------------------ //

    /// Unauthenticated liveness probe.
    pub async fn ping(&self) -> Result<Pong> {
        let started = Instant::now();
        let exchange = self.send(Operation::Ping).await?;
        let response_time = started.elapsed();

        let mut pong = decode_pong(self.formatter.as_ref(), &exchange.response.body)
            .map_err(|e| exchange.decode_error(e))?;
        pong.response_time = response_time;
        pong.version = exchange.response.header(VERSION_HEADER).map(str::to_string);
        Ok(pong)
    }

    /// Unauthenticated version probe; the server reports its version in the
    /// `X-Influxdb-Version` header.
    pub async fn version(&self) -> Result<Option<String>> {
        let exchange = self.send(Operation::Version).await?;
        Ok(exchange.response.header(VERSION_HEADER).map(str::to_string))
    }

    pub async fn interfaces(&self) -> Result<Vec<String>> {
        self.fetch(Operation::Interfaces).await
    }

    pub async fn sync(&self) -> Result<bool> {
        self.fetch(Operation::Sync).await
    }

    // ------------------------------------------------------------------ //
    //  Databases                                                          //
    // ------------------------------------------------------------------ //

    pub async fn create_database(&self, database: &Database) -> Result<()> {
        self.execute(Operation::CreateDatabase(database)).await
    }

    pub async fn create_database_with_config(
        &self,
        name: &str,
        config: &DatabaseConfiguration,
    ) -> Result<()> {
        self.execute(Operation::CreateDatabaseWithConfig { name, config })
            .await
    }

    pub async fn delete_database(&self, name: &str) -> Result<()> {
        self.execute(Operation::DeleteDatabase { name }).await
    }

    pub async fn describe_databases(&self) -> Result<Vec<Database>> {
        self.fetch(Operation::DescribeDatabases).await
    }

    // ------------------------------------------------------------------ //
    //  Series                                                             //
    // ------------------------------------------------------------------ //

    /// Write `series` to `database`. Series without points send nothing.
    pub async fn write(
        &self,
        database: &str,
        series: &[Serie],
        precision: TimePrecision,
    ) -> Result<()> {
        if series.iter().all(|serie| serie.points.is_empty()) {
            debug!(database, "nothing to write");
            return Ok(());
        }
        self.execute(Operation::Write {
            database,
            series,
            precision,
        })
        .await
    }

    /// Run `query` as-is; the client never inspects the statement.
    pub async fn query(
        &self,
        database: &str,
        query: &str,
        precision: TimePrecision,
    ) -> Result<Vec<Serie>> {
        let exchange = self
            .send(Operation::Query {
                database,
                query,
                precision,
            })
            .await?;
        self.formatter
            .decode_series(&exchange.response.body)
            .map_err(|e| exchange.decode_error(e))
    }

    pub async fn delete_series(&self, database: &str, name: &str) -> Result<()> {
        self.execute(Operation::DeleteSeries { database, name })
            .await
    }

    // ------------------------------------------------------------------ //
    //  Cluster admins                                                     //
    // ------------------------------------------------------------------ //

    pub async fn create_cluster_admin(&self, user: &User) -> Result<()> {
        self.execute(Operation::CreateClusterAdmin(user)).await
    }

    pub async fn update_cluster_admin(&self, user: &User, name: &str) -> Result<()> {
        self.execute(Operation::UpdateClusterAdmin { name, user })
            .await
    }

    pub async fn delete_cluster_admin(&self, name: &str) -> Result<()> {
        self.execute(Operation::DeleteClusterAdmin { name }).await
    }

    pub async fn describe_cluster_admins(&self) -> Result<Vec<User>> {
        self.fetch(Operation::DescribeClusterAdmins).await
    }

    // ------------------------------------------------------------------ //
    //  Database users                                                     //
    // ------------------------------------------------------------------ //

    pub async fn create_database_user(&self, database: &str, user: &User) -> Result<()> {
        self.execute(Operation::CreateDatabaseUser { database, user })
            .await
    }

    pub async fn update_database_user(&self, database: &str, user: &User, name: &str) -> Result<()> {
        self.execute(Operation::UpdateDatabaseUser {
            database,
            name,
            user,
        })
        .await
    }

    pub async fn delete_database_user(&self, database: &str, name: &str) -> Result<()> {
        self.execute(Operation::DeleteDatabaseUser { database, name })
            .await
    }

    pub async fn describe_database_users(&self, database: &str) -> Result<Vec<User>> {
        self.fetch(Operation::DescribeDatabaseUsers { database })
            .await
    }

    /// Check a database user's own credentials. The configured credentials
    /// are not sent.
    pub async fn authenticate_database_user(
        &self,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let credentials = Credentials::new(username, password);
        self.execute(Operation::AuthenticateDatabaseUser {
            database,
            credentials: &credentials,
        })
        .await
    }

    // ------------------------------------------------------------------ //
    //  Continuous queries                                                 //
    // ------------------------------------------------------------------ //

    pub async fn get_continuous_queries(&self, database: &str) -> Result<Vec<ContinuousQuery>> {
        self.fetch(Operation::GetContinuousQueries { database })
            .await
    }

    pub async fn delete_continuous_query(&self, database: &str, id: u64) -> Result<()> {
        self.execute(Operation::DeleteContinuousQuery { database, id })
            .await
    }

    // ------------------------------------------------------------------ //
    //  Cluster                                                            //
    // ------------------------------------------------------------------ //

    pub async fn force_raft_compaction(&self) -> Result<()> {
        self.execute(Operation::ForceRaftCompaction).await
    }

    pub async fn list_servers(&self) -> Result<Vec<Server>> {
        self.fetch(Operation::ListServers).await
    }

    pub async fn remove_server(&self, id: u64) -> Result<()> {
        self.execute(Operation::RemoveServer { id }).await
    }

    pub async fn create_shard(&self, shard: &Shard) -> Result<()> {
        self.execute(Operation::CreateShard(shard)).await
    }

    pub async fn get_shards(&self) -> Result<Shards> {
        self.fetch(Operation::GetShards).await
    }

    /// Remove the shard `id` from the listed servers.
    pub async fn drop_shard(&self, id: u64, servers: &ShardMember) -> Result<()> {
        self.execute(Operation::DropShard { id, servers }).await
    }

    pub async fn get_shard_spaces(&self) -> Result<Vec<ShardSpace>> {
        self.fetch(Operation::GetShardSpaces).await
    }

    pub async fn create_shard_space(&self, database: &str, space: &ShardSpace) -> Result<()> {
        self.execute(Operation::CreateShardSpace { database, space })
            .await
    }

    pub async fn drop_shard_space(&self, database: &str, name: &str) -> Result<()> {
        self.execute(Operation::DropShardSpace { database, name })
            .await
    }
}

/// An empty ping body means the server is up.
fn decode_pong(formatter: &dyn Formatter, body: &[u8]) -> std::result::Result<Pong, FormatError> {
    let document = formatter.decode_document(body)?;
    let mut pong: Pong = if document.is_null() {
        Pong::default()
    } else {
        serde_json::from_value(document)?
    };
    if pong.status.is_empty() {
        pong.status = "ok".to_string();
    }
    Ok(pong)
}

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //
