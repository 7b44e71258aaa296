//! Domain model for the movies MCP server.
//!
//! This crate is pure: value objects, aggregates and their invariants, the
//! search criteria vocabulary, and the repository contracts the store must
//! satisfy. No I/O happens here; everything that touches a database or the
//! wire lives in `movies_db` and `movies_mcp`.

pub mod actor;
pub mod criteria;
pub mod decade;
pub mod error;
pub mod movie;
pub mod repository;
pub mod value;

pub use actor::Actor;
pub use criteria::{ActorCriteria, ActorOrder, MovieCriteria, MovieOrder, OrderDir};
pub use decade::Decade;
pub use error::{DomainError, Result};
pub use movie::Movie;
pub use repository::{ActorRepository, LinkRepository, MovieRepository};
pub use value::{ActorId, BirthYear, Genre, MovieId, Rating, ReleaseYear};
