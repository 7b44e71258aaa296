//! Repository contracts the store must satisfy.
//!
//! Split per aggregate so a handler only depends on the capabilities it
//! needs. Every method is cancellable by dropping the returned future and
//! reports failures through the closed [`DomainError`] set: `NotFound`,
//! `Conflict`, or `StoreUnavailable`.

use crate::actor::Actor;
use crate::criteria::{ActorCriteria, MovieCriteria};
use crate::error::Result;
use crate::movie::Movie;
use crate::value::{ActorId, MovieId};
use async_trait::async_trait;

/// Persistence contract for the movie aggregate.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn find_by_id(&self, id: MovieId) -> Result<Movie>;

    /// Upsert: a zero ID inserts and assigns the generated ID on the
    /// returned aggregate; a set ID updates the existing row or fails with
    /// `NotFound`.
    async fn save(&self, movie: Movie) -> Result<Movie>;

    /// Delete the movie and, by cascade, every link referencing it.
    async fn delete(&self, id: MovieId) -> Result<()>;

    async fn find_by_criteria(&self, criteria: &MovieCriteria) -> Result<Vec<Movie>>;

    /// Count of rows matching the criteria's filters, ignoring pagination.
    async fn count_by_criteria(&self, criteria: &MovieCriteria) -> Result<i64>;

    /// Movies whose director matches exactly (case-sensitive), ordered by
    /// year then title ascending, capped at `limit` rows. Unlike the
    /// criteria path, this is not a substring filter.
    async fn find_by_director(&self, director: &str, limit: i64) -> Result<Vec<Movie>>;

    /// Top `limit` movies by rating descending, ties broken by title
    /// ascending. Unrated movies are excluded.
    async fn find_top_rated(&self, limit: i64) -> Result<Vec<Movie>>;

    async fn count_all(&self) -> Result<i64>;
}

/// Persistence contract for the actor aggregate.
#[async_trait]
pub trait ActorRepository: Send + Sync {
    async fn find_by_id(&self, id: ActorId) -> Result<Actor>;

    async fn save(&self, actor: Actor) -> Result<Actor>;

    /// Delete the actor and, by cascade, every link referencing it.
    async fn delete(&self, id: ActorId) -> Result<()>;

    async fn find_by_criteria(&self, criteria: &ActorCriteria) -> Result<Vec<Actor>>;

    async fn count_by_criteria(&self, criteria: &ActorCriteria) -> Result<i64>;

    /// Actors linked to the given movie.
    async fn find_by_movie(&self, movie_id: MovieId) -> Result<Vec<Actor>>;

    async fn count_all(&self) -> Result<i64>;
}

/// Persistence contract for the actor↔movie link relation.
///
/// Link and unlink wrap the companion aggregate lookups and the link-table
/// mutation in a single transaction.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Create the link. Fails `NotFound` when either side is absent and
    /// `Conflict` when the link already exists.
    async fn link(&self, movie_id: MovieId, actor_id: ActorId) -> Result<()>;

    /// Remove the link. Fails `NotFound` when either side or the link
    /// itself is absent.
    async fn unlink(&self, movie_id: MovieId, actor_id: ActorId) -> Result<()>;

    /// Movie IDs linked to the given actor.
    async fn list_by_actor(&self, actor_id: ActorId) -> Result<Vec<MovieId>>;
}
