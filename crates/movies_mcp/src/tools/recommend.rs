//! Recommendation engine.
//!
//! Scores a candidate pool against the caller's preferences with a weighted
//! sum: genre match 0.40, rating band 0.30, year-range relevance 0.20,
//! popularity boost 0.10. Scores at or below 0.30 are discarded.

use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use crate::dto::MovieDto;
use async_trait::async_trait;
use movies_domain::{MovieCriteria, Result};
use serde::Deserialize;
use serde_json::{json, Value};

const GENRE_WEIGHT: f64 = 0.40;
const RATING_WEIGHT: f64 = 0.30;
const YEAR_WEIGHT: f64 = 0.20;
const POPULARITY_BOOST: f64 = 0.10;

/// Minimum score a recommendation must exceed.
const SCORE_THRESHOLD: f64 = 0.30;

/// Rating at which a movie counts as popular / highly rated.
const HIGHLY_RATED: f64 = 8.0;

/// Outside the preferred year range the relevance decays by 1/50 per year.
const YEAR_DECAY_PER_YEAR: f64 = 1.0 / 50.0;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default)]
    pub year_to: Option<i32>,
    #[serde(default)]
    pub exclude_movies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendArgs {
    #[serde(default)]
    preferences: Option<Preferences>,
    limit: i64,
}

pub struct MovieRecommendationEngineTool;

#[async_trait]
impl McpTool for MovieRecommendationEngineTool {
    fn name(&self) -> &'static str {
        "movie_recommendation_engine"
    }

    fn description(&self) -> &'static str {
        "Recommend movies scored against genre, rating, and year preferences"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::object(
                "preferences",
                "Optional preferences: genres[], min_rating, year_from, year_to, exclude_movies[]",
            ))
            .field(
                FieldSpec::integer("limit", "How many recommendations to return")
                    .default_value(10)
                    .minimum(1.0),
            )
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: RecommendArgs = decode_args(args)?;
        let prefs = args.preferences.unwrap_or_default();
        let limit = args.limit.max(1);

        // Score the whole pool: up to 3x the requested page, unfiltered.
        let pool_limit = (limit * 3).clamp(1, 100);
        let pool = app
            .movies
            .search(MovieCriteria::all().with_limit(pool_limit))
            .await?
            .movies;

        let excluded: Vec<String> = prefs
            .exclude_movies
            .iter()
            .map(|t| t.trim().to_lowercase())
            .collect();

        let mut scored: Vec<(f64, MovieDto)> = pool
            .into_iter()
            .filter(|m| !excluded.contains(&m.title.trim().to_lowercase()))
            .map(|m| (match_score(&m, &prefs), m))
            .filter(|(score, _)| *score > SCORE_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.title.cmp(&b.1.title))
        });
        scored.truncate(limit as usize);

        let recommendations: Vec<Value> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (score, movie))| {
                json!({
                    "rank": i + 1,
                    "match_score": format!("{:.1}%", score * 100.0),
                    "reason": compose_reason(score, &movie, &prefs),
                    "movie": movie,
                })
            })
            .collect();

        Ok(json!({
            "recommendations": recommendations,
            "total": recommendations.len(),
        }))
    }
}

/// Weighted match score in `[0, 1]`.
fn match_score(movie: &MovieDto, prefs: &Preferences) -> f64 {
    genre_component(movie, prefs) + rating_component(movie, prefs) + year_component(movie, prefs)
        + popularity_component(movie)
}

fn genre_component(movie: &MovieDto, prefs: &Preferences) -> f64 {
    if prefs.genres.is_empty() {
        return GENRE_WEIGHT;
    }
    let matched = matched_genres(movie, prefs).len();
    GENRE_WEIGHT * matched as f64 / prefs.genres.len() as f64
}

fn rating_component(movie: &MovieDto, prefs: &Preferences) -> f64 {
    match prefs.min_rating {
        Some(min) if movie.rating >= min => RATING_WEIGHT * movie.rating / 10.0,
        _ => 0.0,
    }
}

fn year_component(movie: &MovieDto, prefs: &Preferences) -> f64 {
    let from = prefs.year_from.unwrap_or(1900);
    let to = prefs.year_to.unwrap_or(2100);
    let distance = if movie.year < from {
        (from - movie.year) as f64
    } else if movie.year > to {
        (movie.year - to) as f64
    } else {
        0.0
    };
    YEAR_WEIGHT * (1.0 - distance * YEAR_DECAY_PER_YEAR).max(0.0)
}

fn popularity_component(movie: &MovieDto) -> f64 {
    if movie.rating >= HIGHLY_RATED {
        POPULARITY_BOOST
    } else {
        0.0
    }
}

/// Preferred genres present in the movie's genre list, case-insensitively.
fn matched_genres<'a>(movie: &MovieDto, prefs: &'a Preferences) -> Vec<&'a str> {
    prefs
        .genres
        .iter()
        .filter(|wanted| {
            movie
                .genres
                .iter()
                .any(|g| g.eq_ignore_ascii_case(wanted.trim()))
        })
        .map(|s| s.as_str())
        .collect()
}

fn compose_reason(score: f64, movie: &MovieDto, prefs: &Preferences) -> String {
    let mut segments = Vec::new();
    if score > 0.8 {
        segments.push("Excellent match".to_string());
    } else if score > 0.6 {
        segments.push("Good match".to_string());
    }
    if movie.rating >= HIGHLY_RATED {
        segments.push("Highly rated".to_string());
    }
    for genre in matched_genres(movie, prefs) {
        segments.push(format!("Matches your interest in {genre}"));
    }
    segments.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn movie(title: &str, year: i32, rating: f64, genres: &[&str]) -> MovieDto {
        let now = Utc::now();
        MovieDto {
            id: 1,
            title: title.to_string(),
            director: "Someone".to_string(),
            year,
            rating,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            poster_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_full_match_scores_high() {
        let prefs = Preferences {
            genres: vec!["Sci-Fi".to_string()],
            min_rating: Some(8.0),
            ..Default::default()
        };
        let m = movie("The Matrix", 1999, 8.7, &["Action", "Sci-Fi"]);
        let score = match_score(&m, &prefs);
        // 0.40 + 0.30*0.87 + 0.20 + 0.10
        assert!((score - 0.961).abs() < 1e-9);
        assert!(score > 0.8);
    }

    #[test]
    fn test_reason_composition() {
        let prefs = Preferences {
            genres: vec!["Sci-Fi".to_string()],
            min_rating: Some(8.0),
            ..Default::default()
        };
        let m = movie("The Matrix", 1999, 8.7, &["Action", "Sci-Fi"]);
        let reason = compose_reason(match_score(&m, &prefs), &m, &prefs);
        assert!(reason.contains("Excellent match"));
        assert!(reason.contains("Highly rated"));
        assert!(reason.contains("Matches your interest in Sci-Fi"));
        assert_eq!(reason, "Excellent match; Highly rated; Matches your interest in Sci-Fi");
    }

    #[test]
    fn test_no_preferred_genres_gives_full_genre_weight() {
        let prefs = Preferences::default();
        let m = movie("Heat", 1995, 7.0, &["Crime"]);
        assert!((genre_component(&m, &prefs) - GENRE_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_genre_fraction() {
        let prefs = Preferences {
            genres: vec!["Crime".to_string(), "Drama".to_string()],
            ..Default::default()
        };
        let m = movie("Heat", 1995, 7.0, &["crime"]);
        assert!((genre_component(&m, &prefs) - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_no_min_rating_means_zero_rating_component() {
        let prefs = Preferences::default();
        let m = movie("Heat", 1995, 9.0, &[]);
        assert_eq!(rating_component(&m, &prefs), 0.0);
    }

    #[test]
    fn test_below_min_rating_scores_zero() {
        let prefs = Preferences {
            min_rating: Some(8.0),
            ..Default::default()
        };
        let m = movie("Heat", 1995, 7.9, &[]);
        assert_eq!(rating_component(&m, &prefs), 0.0);
    }

    #[test]
    fn test_year_decay() {
        let prefs = Preferences {
            year_from: Some(1990),
            year_to: Some(1999),
            ..Default::default()
        };
        let inside = movie("A", 1995, 0.0, &[]);
        assert!((year_component(&inside, &prefs) - YEAR_WEIGHT).abs() < 1e-9);

        // Ten years out decays by 10/50.
        let outside = movie("B", 2009, 0.0, &[]);
        assert!((year_component(&outside, &prefs) - YEAR_WEIGHT * 0.8).abs() < 1e-9);

        // Far enough out clamps at zero.
        let distant = movie("C", 1888, 0.0, &[]);
        assert_eq!(year_component(&distant, &prefs), 0.0);
    }

    #[test]
    fn test_popularity_boost_boundary() {
        assert_eq!(popularity_component(&movie("A", 2000, 8.0, &[])), POPULARITY_BOOST);
        assert_eq!(popularity_component(&movie("B", 2000, 7.9, &[])), 0.0);
    }
}
