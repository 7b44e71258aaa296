//! Movie command/query coordinator.

use crate::dto::{MovieDto, MovieListDto};
use movies_domain::{
    Decade, DomainError, Genre, Movie, MovieCriteria, MovieId, MovieOrder, MovieRepository,
    OrderDir, Rating, ReleaseYear, Result,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Typed input for movie creation (also each row of a bulk import).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieInput {
    pub title: String,
    pub director: String,
    pub year: i32,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// Typed input for a movie update. The update is a full replacement:
/// absent optional fields reset to their empty state.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMovieInput {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i32,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// Typed input for multi-criteria search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMoviesInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub min_year: Option<i32>,
    #[serde(default)]
    pub max_year: Option<i32>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub max_rating: Option<f64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_dir: Option<String>,
}

impl SearchMoviesInput {
    pub fn into_criteria(self) -> MovieCriteria {
        MovieCriteria {
            title: self.title.filter(|s| !s.trim().is_empty()),
            director: self.director.filter(|s| !s.trim().is_empty()),
            genre: self.genre.filter(|s| !s.trim().is_empty()),
            min_year: self.min_year,
            max_year: self.max_year,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
            limit: self.limit.unwrap_or(movies_domain::criteria::DEFAULT_SEARCH_LIMIT),
            offset: self.offset.unwrap_or(0),
            order_by: self.order_by.as_deref().map(MovieOrder::parse).unwrap_or_default(),
            order_dir: self.order_dir.as_deref().map(OrderDir::parse).unwrap_or_default(),
        }
        .normalized()
    }
}

/// Typed input for the rating-range search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingRangeInput {
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub max_rating: Option<f64>,
}

/// Coordinates movie commands and queries against the repository.
#[derive(Clone)]
pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieRepository>) -> Self {
        Self { movies }
    }

    pub async fn create(&self, input: CreateMovieInput) -> Result<MovieDto> {
        let movie = build_movie(input)?;
        let saved = self.movies.save(movie).await?;
        debug!(id = saved.id().value(), "Movie created");
        Ok(MovieDto::from(&saved))
    }

    pub async fn get(&self, id: i64) -> Result<MovieDto> {
        let movie = self.movies.find_by_id(MovieId::new(id)?).await?;
        Ok(MovieDto::from(&movie))
    }

    pub async fn update(&self, input: UpdateMovieInput) -> Result<MovieDto> {
        let id = MovieId::new(input.id)?;
        let mut movie = self.movies.find_by_id(id).await?;

        movie.set_title(input.title)?;
        movie.set_director(input.director)?;
        movie.set_year(ReleaseYear::new(input.year)?);
        movie.set_rating(input.rating.map(Rating::new).transpose()?);
        movie.set_genres(parse_genres(input.genres)?)?;
        movie.set_poster_url(input.poster_url);

        let saved = self.movies.save(movie).await?;
        debug!(id = saved.id().value(), "Movie updated");
        Ok(MovieDto::from(&saved))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        // Link rows cascade with the movie row.
        self.movies.delete(MovieId::new(id)?).await?;
        debug!(id, "Movie deleted");
        Ok(())
    }

    pub async fn search(&self, criteria: MovieCriteria) -> Result<MovieListDto> {
        let criteria = criteria.normalized();
        let found = self.movies.find_by_criteria(&criteria).await?;
        let total = self.movies.count_by_criteria(&criteria).await?;
        Ok(MovieListDto {
            movies: found.iter().map(MovieDto::from).collect(),
            total,
            description: criteria.describe(),
        })
    }

    pub async fn top_rated(&self, limit: i64) -> Result<Vec<MovieDto>> {
        let found = self.movies.find_top_rated(limit.clamp(1, 100)).await?;
        Ok(found.iter().map(MovieDto::from).collect())
    }

    /// Movies of a decade, ordered by year ascending.
    pub async fn by_decade(&self, seed: &str) -> Result<(Decade, MovieListDto)> {
        let decade = Decade::parse(seed)?;
        let criteria = MovieCriteria {
            min_year: Some(decade.start),
            max_year: Some(decade.end),
            limit: 100,
            order_by: MovieOrder::Year,
            order_dir: OrderDir::Asc,
            ..Default::default()
        };
        let list = self.search(criteria).await?;
        Ok((decade, list))
    }

    /// Movies within an inclusive rating band, ordered by rating descending.
    ///
    /// At least one bound is required, each must sit in `[0, 10]`, and
    /// `min <= max`.
    pub async fn by_rating_range(&self, input: RatingRangeInput) -> Result<MovieListDto> {
        if input.min_rating.is_none() && input.max_rating.is_none() {
            return Err(DomainError::validation(
                "at least one of min_rating or max_rating is required",
            ));
        }
        for bound in [input.min_rating, input.max_rating].into_iter().flatten() {
            Rating::new(bound)?;
        }
        if let (Some(min), Some(max)) = (input.min_rating, input.max_rating) {
            if min > max {
                return Err(DomainError::validation("min cannot be greater than max"));
            }
        }

        let criteria = MovieCriteria {
            min_rating: input.min_rating,
            max_rating: input.max_rating,
            limit: 100,
            order_by: MovieOrder::Rating,
            order_dir: OrderDir::Desc,
            ..Default::default()
        };
        self.search(criteria).await
    }

    /// A director's filmography: exact, case-sensitive match, chronological
    /// order, capped at `limit` rows.
    pub async fn by_director(&self, director: &str, limit: i64) -> Result<Vec<MovieDto>> {
        let found = self.movies.find_by_director(director, limit).await?;
        Ok(found.iter().map(MovieDto::from).collect())
    }

    /// Materialize a search result for the context cache: first `cap` rows
    /// of the filtered, ordered result, bypassing the page-size clamp.
    pub async fn materialize(&self, criteria: MovieCriteria, cap: usize) -> Result<Vec<MovieDto>> {
        let criteria = MovieCriteria {
            limit: cap as i64,
            offset: 0,
            ..criteria
        };
        let found = self.movies.find_by_criteria(&criteria).await?;
        Ok(found.iter().map(MovieDto::from).collect())
    }
}

fn build_movie(input: CreateMovieInput) -> Result<Movie> {
    let mut movie = Movie::new(input.title, input.director, ReleaseYear::new(input.year)?)?;
    movie.set_rating(input.rating.map(Rating::new).transpose()?);
    movie.set_genres(parse_genres(input.genres)?)?;
    movie.set_poster_url(input.poster_url);
    Ok(movie)
}

fn parse_genres(labels: Vec<String>) -> Result<Vec<Genre>> {
    labels.into_iter().map(Genre::new).collect()
}
