//! SQLite persistence layer for the movies MCP server.
//!
//! Implements the repository contracts from `movies_domain` on a bounded
//! sqlx connection pool. All CREATE TABLE statements live in [`schema`] -
//! single source of truth - and are applied through a versioned migration
//! table so `--migrate-only` is idempotent.

pub mod actor_store;
pub mod config;
pub mod link_store;
pub mod movie_store;
pub mod schema;
pub mod store;

pub use actor_store::SqliteActorRepository;
pub use config::{ConfigError, StoreConfig};
pub use link_store::SqliteLinkRepository;
pub use movie_store::SqliteMovieRepository;
pub use store::{DbStats, MoviesDb};
