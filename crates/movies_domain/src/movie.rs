//! Movie aggregate.
//!
//! The application services are the only legal construction and mutation
//! entry point. Every mutation bumps `updated_at`; `updated_at >= created_at`
//! holds for the aggregate's whole life.

use crate::error::{DomainError, Result};
use crate::value::{Genre, MovieId, Rating, ReleaseYear};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Movie aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    id: MovieId,
    title: String,
    director: String,
    year: ReleaseYear,
    rating: Option<Rating>,
    genres: Vec<Genre>,
    poster_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Movie {
    /// Create a new, not-yet-persisted movie with a zero ID.
    pub fn new(
        title: impl Into<String>,
        director: impl Into<String>,
        year: ReleaseYear,
    ) -> Result<Self> {
        let title = validate_text("title", title.into())?;
        let director = validate_text("director", director.into())?;
        let now = Utc::now();
        Ok(Self {
            id: MovieId::zero(),
            title,
            director,
            year,
            rating: None,
            genres: Vec::new(),
            poster_url: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a persisted movie from store columns.
    ///
    /// Timestamps come back exactly as stored; invariants were enforced when
    /// the row was written.
    #[allow(clippy::too_many_arguments)]
    pub fn from_store(
        id: MovieId,
        title: String,
        director: String,
        year: ReleaseYear,
        rating: Option<Rating>,
        genres: Vec<Genre>,
        poster_url: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            director,
            year,
            rating,
            genres,
            poster_url,
            created_at,
            updated_at,
        }
    }

    /// Assign the store-generated ID. Legal only while the ID is zero.
    pub fn assign_id(&mut self, id: MovieId) -> Result<()> {
        if !self.id.is_zero() {
            return Err(DomainError::conflict(format!(
                "movie {} already has an assigned ID",
                self.id
            )));
        }
        self.id = id;
        Ok(())
    }

    pub fn id(&self) -> MovieId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn director(&self) -> &str {
        &self.director
    }

    pub fn year(&self) -> ReleaseYear {
        self.year
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn poster_url(&self) -> Option<&str> {
        self.poster_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.title = validate_text("title", title.into())?;
        self.touch();
        Ok(())
    }

    pub fn set_director(&mut self, director: impl Into<String>) -> Result<()> {
        self.director = validate_text("director", director.into())?;
        self.touch();
        Ok(())
    }

    pub fn set_year(&mut self, year: ReleaseYear) {
        self.year = year;
        self.touch();
    }

    pub fn set_rating(&mut self, rating: Option<Rating>) {
        self.rating = rating;
        self.touch();
    }

    /// Replace the genre list. Duplicates (exact match) are rejected.
    pub fn set_genres(&mut self, genres: Vec<Genre>) -> Result<()> {
        for (i, genre) in genres.iter().enumerate() {
            if genres[..i].contains(genre) {
                return Err(DomainError::conflict(format!(
                    "duplicate genre: {genre}"
                )));
            }
        }
        self.genres = genres;
        self.touch();
        Ok(())
    }

    /// Append one genre, rejecting duplicates.
    pub fn add_genre(&mut self, genre: Genre) -> Result<()> {
        if self.genres.contains(&genre) {
            return Err(DomainError::conflict(format!("duplicate genre: {genre}")));
        }
        self.genres.push(genre);
        self.touch();
        Ok(())
    }

    pub fn set_poster_url(&mut self, poster_url: Option<String>) {
        self.poster_url = poster_url.filter(|u| !u.trim().is_empty());
        self.touch();
    }

    /// True when at least one of the movie's genres matches `label`
    /// case-insensitively.
    pub fn has_genre(&self, label: &str) -> bool {
        self.genres.iter().any(|g| g.matches(label))
    }

    /// Strictly advance `updated_at` while keeping it >= `created_at`.
    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::nanoseconds(1)
        };
    }
}

fn validate_text(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Movie {
        Movie::new("The Matrix", "The Wachowskis", ReleaseYear::new(1999).unwrap()).unwrap()
    }

    #[test]
    fn test_new_movie_unassigned() {
        let movie = sample();
        assert!(movie.id().is_zero());
        assert_eq!(movie.title(), "The Matrix");
        assert_eq!(movie.created_at(), movie.updated_at());
    }

    #[test]
    fn test_empty_title_rejected() {
        let year = ReleaseYear::new(1999).unwrap();
        assert!(Movie::new("   ", "Someone", year).is_err());
        assert!(Movie::new("Title", "", year).is_err());
    }

    #[test]
    fn test_title_trimmed() {
        let year = ReleaseYear::new(1999).unwrap();
        let movie = Movie::new("  Alien  ", "Ridley Scott", year).unwrap();
        assert_eq!(movie.title(), "Alien");
    }

    #[test]
    fn test_assign_id_once() {
        let mut movie = sample();
        movie.assign_id(MovieId::new(3).unwrap()).unwrap();
        assert_eq!(movie.id().value(), 3);
        assert!(movie.assign_id(MovieId::new(4).unwrap()).is_err());
    }

    #[test]
    fn test_mutation_advances_updated_at() {
        let mut movie = sample();
        let before = movie.updated_at();
        movie.set_rating(Some(Rating::new(8.7).unwrap()));
        assert!(movie.updated_at() > before);
        assert!(movie.updated_at() >= movie.created_at());
    }

    #[test]
    fn test_duplicate_genres_rejected() {
        let mut movie = sample();
        let genres = vec![
            Genre::new("Action").unwrap(),
            Genre::new("Sci-Fi").unwrap(),
            Genre::new("Action").unwrap(),
        ];
        assert!(matches!(
            movie.set_genres(genres),
            Err(DomainError::Conflict(_))
        ));

        movie.add_genre(Genre::new("Action").unwrap()).unwrap();
        assert!(movie.add_genre(Genre::new("Action").unwrap()).is_err());
    }

    #[test]
    fn test_has_genre_case_insensitive() {
        let mut movie = sample();
        movie.add_genre(Genre::new("Sci-Fi").unwrap()).unwrap();
        assert!(movie.has_genre("sci-fi"));
        assert!(!movie.has_genre("Drama"));
    }

    #[test]
    fn test_blank_poster_url_normalized() {
        let mut movie = sample();
        movie.set_poster_url(Some("   ".to_string()));
        assert!(movie.poster_url().is_none());
        movie.set_poster_url(Some("https://example.com/p.jpg".to_string()));
        assert_eq!(movie.poster_url(), Some("https://example.com/p.jpg"));
    }
}
