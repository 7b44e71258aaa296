//! Actor command/query coordinator, including the link workflow.

use crate::dto::{ActorDto, ActorListDto};
use movies_domain::{
    Actor, ActorCriteria, ActorId, ActorOrder, ActorRepository, BirthYear, LinkRepository,
    MovieId, MovieRepository, OrderDir, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Typed input for actor creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActorInput {
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Typed input for an actor update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateActorInput {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Typed input for actor search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchActorsInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min_birth_year: Option<i32>,
    #[serde(default)]
    pub max_birth_year: Option<i32>,
    #[serde(default)]
    pub movie_id: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_dir: Option<String>,
}

impl SearchActorsInput {
    fn into_criteria(self) -> ActorCriteria {
        ActorCriteria {
            name: self.name.filter(|s| !s.trim().is_empty()),
            min_birth_year: self.min_birth_year,
            max_birth_year: self.max_birth_year,
            movie_id: self.movie_id,
            limit: self.limit.unwrap_or(movies_domain::criteria::DEFAULT_SEARCH_LIMIT),
            offset: self.offset.unwrap_or(0),
            order_by: self.order_by.as_deref().map(ActorOrder::parse).unwrap_or_default(),
            order_dir: self.order_dir.as_deref().map(OrderDir::parse).unwrap_or_default(),
        }
        .normalized()
    }
}

/// An actor's filmography as the wire reports it.
#[derive(Debug, Clone, Serialize)]
pub struct ActorFilmography {
    pub actor_id: i64,
    pub actor_name: String,
    pub movie_ids: Vec<i64>,
    pub total_movies: usize,
}

/// Coordinates actor commands, queries, and the actor↔movie link workflow.
#[derive(Clone)]
pub struct ActorService {
    actors: Arc<dyn ActorRepository>,
    movies: Arc<dyn MovieRepository>,
    links: Arc<dyn LinkRepository>,
}

impl ActorService {
    pub fn new(
        actors: Arc<dyn ActorRepository>,
        movies: Arc<dyn MovieRepository>,
        links: Arc<dyn LinkRepository>,
    ) -> Self {
        Self {
            actors,
            movies,
            links,
        }
    }

    pub async fn create(&self, input: CreateActorInput) -> Result<ActorDto> {
        let birth_year = input.birth_year.map(BirthYear::new).transpose()?;
        let mut actor = Actor::new(input.name, birth_year)?;
        actor.set_bio(input.bio);
        let saved = self.actors.save(actor).await?;
        debug!(id = saved.id().value(), "Actor created");
        Ok(ActorDto::from(&saved))
    }

    pub async fn get(&self, id: i64) -> Result<ActorDto> {
        let actor = self.actors.find_by_id(ActorId::new(id)?).await?;
        Ok(ActorDto::from(&actor))
    }

    pub async fn update(&self, input: UpdateActorInput) -> Result<ActorDto> {
        let id = ActorId::new(input.id)?;
        let mut actor = self.actors.find_by_id(id).await?;

        actor.set_name(input.name)?;
        actor.set_birth_year(input.birth_year.map(BirthYear::new).transpose()?);
        actor.set_bio(input.bio);

        let saved = self.actors.save(actor).await?;
        debug!(id = saved.id().value(), "Actor updated");
        Ok(ActorDto::from(&saved))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.actors.delete(ActorId::new(id)?).await?;
        debug!(id, "Actor deleted");
        Ok(())
    }

    pub async fn search(&self, input: SearchActorsInput) -> Result<ActorListDto> {
        let criteria = input.into_criteria();
        let found = self.actors.find_by_criteria(&criteria).await?;
        let total = self.actors.count_by_criteria(&criteria).await?;
        Ok(ActorListDto {
            actors: found.iter().map(ActorDto::from).collect(),
            total,
        })
    }

    /// Actors linked to a movie. Fails `NotFound` when the movie is absent.
    pub async fn cast_of(&self, movie_id: i64) -> Result<Vec<ActorDto>> {
        let movie_id = MovieId::new(movie_id)?;
        self.movies.find_by_id(movie_id).await?;
        let cast = self.actors.find_by_movie(movie_id).await?;
        Ok(cast.iter().map(ActorDto::from).collect())
    }

    /// An actor's filmography. Fails `NotFound` when the actor is absent.
    pub async fn filmography(&self, actor_id: i64) -> Result<ActorFilmography> {
        let id = ActorId::new(actor_id)?;
        let actor = self.actors.find_by_id(id).await?;
        let movie_ids: Vec<i64> = self
            .links
            .list_by_actor(id)
            .await?
            .into_iter()
            .map(|m| m.value())
            .collect();
        Ok(ActorFilmography {
            actor_id: actor.id().value(),
            actor_name: actor.name().to_string(),
            total_movies: movie_ids.len(),
            movie_ids,
        })
    }

    pub async fn link(&self, actor_id: i64, movie_id: i64) -> Result<()> {
        self.links
            .link(MovieId::new(movie_id)?, ActorId::new(actor_id)?)
            .await?;
        debug!(actor_id, movie_id, "Link created");
        Ok(())
    }

    pub async fn unlink(&self, actor_id: i64, movie_id: i64) -> Result<()> {
        self.links
            .unlink(MovieId::new(movie_id)?, ActorId::new(actor_id)?)
            .await?;
        debug!(actor_id, movie_id, "Link removed");
        Ok(())
    }
}
