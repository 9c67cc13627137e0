//! Endpoint table for 0.8-era clustered servers.

use std::sync::Arc;

use crate::config::ServerVersion;
use crate::formatter::{Formatter, LegacyFormatter, Payload};
use crate::request::RequestSpec;

use super::{Dialect, Operation, DATABASE, ID, NAME};

const QUERY: &str = "q";
const TIME_PRECISION: &str = "time_precision";

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDialect;

impl Dialect for LegacyDialect {
    fn version(&self) -> ServerVersion {
        ServerVersion::Legacy
    }

    fn formatter(&self) -> Arc<dyn Formatter> {
        Arc::new(LegacyFormatter)
    }

    fn route<'a>(&self, operation: &Operation<'a>) -> Option<RequestSpec<'a>> {
        let spec = match *operation {
            Operation::Ping => RequestSpec::get("/ping").anonymous(),
            Operation::Version => RequestSpec::get("/interfaces").anonymous(),

            // Databases
            Operation::CreateDatabase(database) => {
                RequestSpec::post("/db").body(Payload::Database(database))
            }
            Operation::CreateDatabaseWithConfig { name, config } => {
                RequestSpec::post("/cluster/database_configs/{name}")
                    .segment(NAME, name)
                    .body(Payload::DatabaseConfiguration(config))
            }
            Operation::DeleteDatabase { name } => {
                RequestSpec::delete("/db/{name}").segment(NAME, name)
            }
            Operation::DescribeDatabases => RequestSpec::get("/db"),

            // Series
            Operation::Write {
                database,
                series,
                precision,
            } => RequestSpec::post("/db/{name}/series")
                .segment(NAME, database)
                .param(TIME_PRECISION, precision.as_str())
                .body(Payload::Series(series)),
            Operation::Query {
                database,
                query,
                precision,
            } => RequestSpec::get("/db/{name}/series")
                .segment(NAME, database)
                .param(QUERY, query)
                .param(TIME_PRECISION, precision.as_str()),
            Operation::DeleteSeries { database, name } => {
                RequestSpec::delete("/db/{database}/series/{name}")
                    .segment(DATABASE, database)
                    .segment(NAME, name)
            }

            // Cluster admins
            Operation::CreateClusterAdmin(user) => {
                RequestSpec::post("/cluster_admins").body(Payload::User(user))
            }
            Operation::UpdateClusterAdmin { name, user } => {
                RequestSpec::post("/cluster_admins/{name}")
                    .segment(NAME, name)
                    .body(Payload::User(user))
            }
            Operation::DeleteClusterAdmin { name } => {
                RequestSpec::delete("/cluster_admins/{name}").segment(NAME, name)
            }
            Operation::DescribeClusterAdmins => RequestSpec::get("/cluster_admins"),

            // Database users
            Operation::CreateDatabaseUser { database, user } => {
                RequestSpec::post("/db/{database}/users")
                    .segment(DATABASE, database)
                    .body(Payload::User(user))
            }
            Operation::UpdateDatabaseUser {
                database,
                name,
                user,
            } => RequestSpec::post("/db/{database}/users/{name}")
                .segment(DATABASE, database)
                .segment(NAME, name)
                .body(Payload::User(user)),
            Operation::DeleteDatabaseUser { database, name } => {
                RequestSpec::delete("/db/{database}/users/{name}")
                    .segment(DATABASE, database)
                    .segment(NAME, name)
            }
            Operation::DescribeDatabaseUsers { database } => {
                RequestSpec::get("/db/{database}/users").segment(DATABASE, database)
            }
            Operation::AuthenticateDatabaseUser {
                database,
                credentials,
            } => RequestSpec::get("/db/{database}/authenticate")
                .segment(DATABASE, database)
                .with_credentials(credentials.clone()),

            // Continuous queries
            Operation::GetContinuousQueries { database } => {
                RequestSpec::get("/db/{database}/continuous_queries").segment(DATABASE, database)
            }
            Operation::DeleteContinuousQuery { database, id } => {
                RequestSpec::delete("/db/{database}/continuous_queries/{id}")
                    .segment(DATABASE, database)
                    .segment(ID, id)
            }

            // Cluster
            Operation::ForceRaftCompaction => RequestSpec::post("/raft/force_compaction"),
            Operation::Interfaces => RequestSpec::get("/interfaces"),
            Operation::Sync => RequestSpec::get("/sync"),
            Operation::ListServers => RequestSpec::get("/cluster/servers"),
            Operation::RemoveServer { id } => {
                RequestSpec::delete("/cluster/servers/{id}").segment(ID, id)
            }
            Operation::CreateShard(shard) => {
                RequestSpec::post("/cluster/shards").body(Payload::Shard(shard))
            }
            Operation::GetShards => RequestSpec::get("/cluster/shards"),
            Operation::DropShard { id, servers } => RequestSpec::delete("/cluster/shards/{id}")
                .segment(ID, id)
                .body(Payload::ShardMember(servers)),
            Operation::GetShardSpaces => RequestSpec::get("/cluster/shard_spaces"),
            Operation::CreateShardSpace { database, space } => {
                RequestSpec::post("/cluster/shard_spaces/{database}")
                    .segment(DATABASE, database)
                    .body(Payload::ShardSpace(space))
            }
            Operation::DropShardSpace { database, name } => {
                RequestSpec::delete("/cluster/shard_spaces/{database}/{name}")
                    .segment(DATABASE, database)
                    .segment(NAME, name)
            }
        };
        Some(spec)
    }
}
