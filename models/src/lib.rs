//! Plain data containers exchanged with an InfluxDB server.
//!
//! These types carry no behaviour beyond serde derives. The client crate hands
//! them to a dialect formatter for encoding and receives them back from it;
//! field names follow the server's camelCase JSON conventions.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`admin`] | `Database`, `DatabaseConfiguration`, `User`, `ContinuousQuery` |
//! | [`cluster`] | `Server`, `Shard`, `ShardMember`, `Shards`, `ShardSpace` |
//! | [`series`] | `Serie` and `Pong` |

pub mod admin;
pub mod cluster;
pub mod series;

pub use admin::{ContinuousQuery, Database, DatabaseConfiguration, User};
pub use cluster::{Server, Shard, ShardMember, ShardSpace, Shards};
pub use series::{Pong, Serie};
