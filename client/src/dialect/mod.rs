//! Server dialects and version dispatch.
//!
//! A [`Dialect`] owns everything that differs between server generations:
//! the formatter, the credential parameter names, and the endpoint table that
//! maps each logical [`Operation`] to a [`RequestSpec`]. [`for_version`] is the
//! only place a [`ServerVersion`] is inspected.
//!
//! Adding a server generation means one new `Dialect` implementation and one
//! new arm in [`for_version`]; the facade and builder stay untouched.

mod legacy;
mod v012x;

use std::fmt;
use std::sync::Arc;

use models::{Database, DatabaseConfiguration, Serie, Shard, ShardMember, ShardSpace, User};

use crate::config::{Credentials, ServerVersion};
use crate::formatter::Formatter;
use crate::precision::TimePrecision;
use crate::request::{AuthParams, RequestSpec};

pub use legacy::LegacyDialect;
pub use v012x::V012xDialect;

// Placeholder names shared by the path templates.
pub(crate) const NAME: &str = "name";
pub(crate) const DATABASE: &str = "database";
pub(crate) const ID: &str = "id";

/// One logical client action with its typed arguments.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Ping,
    Version,
    CreateDatabase(&'a Database),
    CreateDatabaseWithConfig {
        name: &'a str,
        config: &'a DatabaseConfiguration,
    },
    DeleteDatabase {
        name: &'a str,
    },
    DescribeDatabases,
    Write {
        database: &'a str,
        series: &'a [Serie],
        precision: TimePrecision,
    },
    Query {
        database: &'a str,
        query: &'a str,
        precision: TimePrecision,
    },
    CreateClusterAdmin(&'a User),
    UpdateClusterAdmin {
        name: &'a str,
        user: &'a User,
    },
    DeleteClusterAdmin {
        name: &'a str,
    },
    DescribeClusterAdmins,
    CreateDatabaseUser {
        database: &'a str,
        user: &'a User,
    },
    UpdateDatabaseUser {
        database: &'a str,
        name: &'a str,
        user: &'a User,
    },
    DeleteDatabaseUser {
        database: &'a str,
        name: &'a str,
    },
    DescribeDatabaseUsers {
        database: &'a str,
    },
    AuthenticateDatabaseUser {
        database: &'a str,
        credentials: &'a Credentials,
    },
    GetContinuousQueries {
        database: &'a str,
    },
    DeleteContinuousQuery {
        database: &'a str,
        id: u64,
    },
    DeleteSeries {
        database: &'a str,
        name: &'a str,
    },
    ForceRaftCompaction,
    Interfaces,
    Sync,
    ListServers,
    RemoveServer {
        id: u64,
    },
    CreateShard(&'a Shard),
    GetShards,
    DropShard {
        id: u64,
        servers: &'a ShardMember,
    },
    GetShardSpaces,
    CreateShardSpace {
        database: &'a str,
        space: &'a ShardSpace,
    },
    DropShardSpace {
        database: &'a str,
        name: &'a str,
    },
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Ping => "ping",
            Operation::Version => "version",
            Operation::CreateDatabase(_) => "create_database",
            Operation::CreateDatabaseWithConfig { .. } => "create_database_with_config",
            Operation::DeleteDatabase { .. } => "delete_database",
            Operation::DescribeDatabases => "describe_databases",
            Operation::Write { .. } => "write",
            Operation::Query { .. } => "query",
            Operation::CreateClusterAdmin(_) => "create_cluster_admin",
            Operation::UpdateClusterAdmin { .. } => "update_cluster_admin",
            Operation::DeleteClusterAdmin { .. } => "delete_cluster_admin",
            Operation::DescribeClusterAdmins => "describe_cluster_admins",
            Operation::CreateDatabaseUser { .. } => "create_database_user",
            Operation::UpdateDatabaseUser { .. } => "update_database_user",
            Operation::DeleteDatabaseUser { .. } => "delete_database_user",
            Operation::DescribeDatabaseUsers { .. } => "describe_database_users",
            Operation::AuthenticateDatabaseUser { .. } => "authenticate_database_user",
            Operation::GetContinuousQueries { .. } => "get_continuous_queries",
            Operation::DeleteContinuousQuery { .. } => "delete_continuous_query",
            Operation::DeleteSeries { .. } => "delete_series",
            Operation::ForceRaftCompaction => "force_raft_compaction",
            Operation::Interfaces => "interfaces",
            Operation::Sync => "sync",
            Operation::ListServers => "list_servers",
            Operation::RemoveServer { .. } => "remove_server",
            Operation::CreateShard(_) => "create_shard",
            Operation::GetShards => "get_shards",
            Operation::DropShard { .. } => "drop_shard",
            Operation::GetShardSpaces => "get_shard_spaces",
            Operation::CreateShardSpace { .. } => "create_shard_space",
            Operation::DropShardSpace { .. } => "drop_shard_space",
        }
    }
}

pub trait Dialect: Send + Sync + fmt::Debug {
    fn version(&self) -> ServerVersion;

    fn formatter(&self) -> Arc<dyn Formatter>;

    fn auth_params(&self) -> AuthParams {
        AuthParams::default()
    }

    /// The request shape for `operation`, or `None` when this server
    /// generation has no endpoint for it.
    fn route<'a>(&self, operation: &Operation<'a>) -> Option<RequestSpec<'a>>;
}

/// Pick the dialect for `version`.
pub fn for_version(version: ServerVersion) -> Arc<dyn Dialect> {
    match version {
        ServerVersion::Legacy => Arc::new(LegacyDialect),
        ServerVersion::V012x => Arc::new(V012xDialect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_matches_requested_version() {
        for version in [ServerVersion::Legacy, ServerVersion::V012x] {
            assert_eq!(for_version(version).version(), version);
        }
    }

    #[test]
    fn probes_are_anonymous_in_every_dialect() {
        use crate::request::Auth;

        for version in [ServerVersion::Legacy, ServerVersion::V012x] {
            let dialect = for_version(version);
            for operation in [Operation::Ping, Operation::Version] {
                let spec = dialect.route(&operation).unwrap();
                assert_eq!(spec.auth, Auth::Anonymous, "{version} {}", operation.name());
            }
        }
    }
}
