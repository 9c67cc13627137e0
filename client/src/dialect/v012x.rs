//! Endpoint table for 0.12.x servers.
//!
//! Reads and writes go through `/write` and `/query`, with the database as a
//! query parameter. Database administration is expressed as statements sent to
//! `/query`. The cluster-admin, shard, raft and server endpoints of the older
//! clustered servers no longer exist, so those operations have no route.

use std::sync::Arc;

use crate::config::ServerVersion;
use crate::formatter::{Formatter, Payload, V012xFormatter};
use crate::request::RequestSpec;

use super::{Dialect, Operation};

const DB: &str = "db";
const QUERY: &str = "q";
const WRITE_PRECISION: &str = "precision";
const QUERY_EPOCH: &str = "epoch";

#[derive(Debug, Clone, Copy, Default)]
pub struct V012xDialect;

/// Double-quote an identifier for use inside a statement.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Dialect for V012xDialect {
    fn version(&self) -> ServerVersion {
        ServerVersion::V012x
    }

    fn formatter(&self) -> Arc<dyn Formatter> {
        Arc::new(V012xFormatter)
    }

    fn route<'a>(&self, operation: &Operation<'a>) -> Option<RequestSpec<'a>> {
        let spec = match *operation {
            Operation::Ping | Operation::Version => RequestSpec::get("/ping").anonymous(),

            Operation::Write {
                database,
                series,
                precision,
            } => RequestSpec::post("/write")
                .param(DB, database)
                .param(WRITE_PRECISION, precision.as_str())
                .body(Payload::Series(series)),
            Operation::Query {
                database,
                query,
                precision,
            } => RequestSpec::get("/query")
                .param(DB, database)
                .param(QUERY, query)
                .param(QUERY_EPOCH, precision.as_str()),

            Operation::CreateDatabase(database) => RequestSpec::get("/query")
                .param(QUERY, format!("CREATE DATABASE {}", quote_ident(&database.name))),
            Operation::DeleteDatabase { name } => {
                RequestSpec::get("/query").param(QUERY, format!("DROP DATABASE {}", quote_ident(name)))
            }
            Operation::DescribeDatabases => RequestSpec::get("/query").param(QUERY, "SHOW DATABASES"),
            Operation::DeleteSeries { database, name } => RequestSpec::get("/query")
                .param(DB, database)
                .param(QUERY, format!("DROP SERIES FROM {}", quote_ident(name))),

            _ => return None,
        };
        Some(spec)
    }
}
