mod client;
mod criteria;
mod env;
mod error;
mod schema;
mod store;

pub use client::PostgresClient;
pub use criteria::{AsSqlxArg, FilterCondition, OrderDirection, QueryCriteria};
pub use env::PostgresEnv;
pub use schema::{init_schema, TableSchema, TABLES};
pub use store::PgStore;
