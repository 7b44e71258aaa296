//! Application services: command/query coordinators between the tool
//! handlers and the domain.
//!
//! Services exclusively own aggregate construction and mutation. Handlers
//! hand them typed inputs and get DTOs back; aggregates never cross a tool
//! call boundary.

mod actor;
mod movie;

pub use actor::{ActorFilmography, ActorService, CreateActorInput, SearchActorsInput, UpdateActorInput};
pub use movie::{
    CreateMovieInput, MovieService, RatingRangeInput, SearchMoviesInput, UpdateMovieInput,
};
