//! Actor aggregate.
//!
//! `movie_ids` mirrors the actor↔movie link table; only the application
//! service's link operations may change it.

use crate::error::{DomainError, Result};
use crate::value::{ActorId, BirthYear, MovieId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Actor aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    name: String,
    birth_year: Option<BirthYear>,
    bio: Option<String>,
    movie_ids: BTreeSet<MovieId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Actor {
    /// Create a new, not-yet-persisted actor with a zero ID.
    pub fn new(name: impl Into<String>, birth_year: Option<BirthYear>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        let now = Utc::now();
        Ok(Self {
            id: ActorId::zero(),
            name: trimmed.to_string(),
            birth_year,
            bio: None,
            movie_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a persisted actor from store columns.
    pub fn from_store(
        id: ActorId,
        name: String,
        birth_year: Option<BirthYear>,
        bio: Option<String>,
        movie_ids: BTreeSet<MovieId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            birth_year,
            bio,
            movie_ids,
            created_at,
            updated_at,
        }
    }

    /// Assign the store-generated ID. Legal only while the ID is zero.
    pub fn assign_id(&mut self, id: ActorId) -> Result<()> {
        if !self.id.is_zero() {
            return Err(DomainError::conflict(format!(
                "actor {} already has an assigned ID",
                self.id
            )));
        }
        self.id = id;
        Ok(())
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_year(&self) -> Option<BirthYear> {
        self.birth_year
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn movie_ids(&self) -> &BTreeSet<MovieId> {
        &self.movie_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        self.name = trimmed.to_string();
        self.touch();
        Ok(())
    }

    pub fn set_birth_year(&mut self, birth_year: Option<BirthYear>) {
        self.birth_year = birth_year;
        self.touch();
    }

    pub fn set_bio(&mut self, bio: Option<String>) {
        self.bio = bio.filter(|b| !b.trim().is_empty());
        self.touch();
    }

    /// Record membership in a movie's cast. Idempotence is the link table's
    /// concern; the set silently absorbs duplicates.
    pub fn attach_movie(&mut self, movie_id: MovieId) {
        self.movie_ids.insert(movie_id);
        self.touch();
    }

    pub fn detach_movie(&mut self, movie_id: MovieId) {
        self.movie_ids.remove(&movie_id);
        self.touch();
    }

    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::nanoseconds(1)
        };
    }
}
