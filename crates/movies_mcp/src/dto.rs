//! Data transfer objects: the serialized projections of aggregates at the
//! tool boundary.

use chrono::{DateTime, Utc};
use movies_domain::{Actor, Movie};
use serde::{Deserialize, Serialize};

/// Movie projection. An unrated movie serializes `rating: 0.0`; the wire
/// does not distinguish that from a user-supplied zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDto {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub rating: f64,
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Movie> for MovieDto {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id().value(),
            title: movie.title().to_string(),
            director: movie.director().to_string(),
            year: movie.year().value(),
            rating: movie.rating().map(|r| r.value()).unwrap_or(0.0),
            genres: movie.genres().iter().map(|g| g.as_str().to_string()).collect(),
            poster_url: movie.poster_url().map(String::from),
            created_at: movie.created_at(),
            updated_at: movie.updated_at(),
        }
    }
}

/// Actor projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDto {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub movie_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Actor> for ActorDto {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id().value(),
            name: actor.name().to_string(),
            birth_year: actor.birth_year().map(|y| y.value()),
            bio: actor.bio().map(String::from),
            movie_ids: actor.movie_ids().iter().map(|id| id.value()).collect(),
            created_at: actor.created_at(),
            updated_at: actor.updated_at(),
        }
    }
}

/// Search result page for movies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieListDto {
    pub movies: Vec<MovieDto>,
    pub total: i64,
    pub description: String,
}

/// Search result page for actors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorListDto {
    pub actors: Vec<ActorDto>,
    pub total: i64,
}
