//! Director career analysis.
//!
//! Partitions a director's chronological filmography into early/mid/late
//! phases by year offset within the career span, then labels the trajectory
//! by comparing phase averages.

use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use crate::dto::MovieDto;
use async_trait::async_trait;
use movies_domain::{DomainError, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Cap on a director's analyzed filmography.
const CAREER_FETCH_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
struct CareerArgs {
    director: String,
}

#[derive(Debug, Default)]
struct Phase {
    count: usize,
    rating_sum: f64,
    rated: usize,
}

impl Phase {
    fn push(&mut self, rating: f64) {
        self.count += 1;
        if rating > 0.0 {
            self.rating_sum += rating;
            self.rated += 1;
        }
    }

    fn average(&self) -> f64 {
        if self.rated == 0 {
            0.0
        } else {
            self.rating_sum / self.rated as f64
        }
    }
}

pub struct DirectorCareerAnalysisTool;

#[async_trait]
impl McpTool for DirectorCareerAnalysisTool {
    fn name(&self) -> &'static str {
        "director_career_analysis"
    }

    fn description(&self) -> &'static str {
        "Analyze a director's career: phases, genres, trajectory, and filmography"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::string("director", "Director name, matched exactly").required())
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: CareerArgs = decode_args(args)?;

        // Exact, case-sensitive match; the store returns the filmography
        // already in chronological order, capped at the career window.
        let movies: Vec<MovieDto> = app
            .movies
            .by_director(&args.director, CAREER_FETCH_LIMIT)
            .await?;

        if movies.is_empty() {
            return Err(DomainError::not_found("director", args.director));
        }

        let first_year = movies[0].year;
        let last_year = movies[movies.len() - 1].year;
        let span = (last_year - first_year) as f64;

        let rated: Vec<f64> = movies.iter().map(|m| m.rating).filter(|r| *r > 0.0).collect();
        let average_rating = if rated.is_empty() {
            0.0
        } else {
            rated.iter().sum::<f64>() / rated.len() as f64
        };

        let mut early = Phase::default();
        let mut mid = Phase::default();
        let mut late = Phase::default();
        for movie in &movies {
            let offset = (movie.year - first_year) as f64;
            if offset < span / 3.0 {
                early.push(movie.rating);
            } else if offset < span * 2.0 / 3.0 {
                mid.push(movie.rating);
            } else {
                late.push(movie.rating);
            }
        }

        let top_genres = top_genres(&movies, 3);
        let highest = movies
            .iter()
            .max_by(|a, b| a.rating.partial_cmp(&b.rating).unwrap_or(std::cmp::Ordering::Equal))
            .cloned();
        // Lowest excludes unrated rows; all-unrated falls back to the first
        // movie chronologically.
        let lowest = movies
            .iter()
            .filter(|m| m.rating > 0.0)
            .min_by(|a, b| a.rating.partial_cmp(&b.rating).unwrap_or(std::cmp::Ordering::Equal))
            .or(movies.first())
            .cloned();

        let trajectory = trajectory(early.average(), mid.average(), late.average());

        Ok(json!({
            "director": args.director,
            "total_movies": movies.len(),
            "first_year": first_year,
            "last_year": last_year,
            "career_span_years": last_year - first_year,
            "average_rating": average_rating,
            "phases": {
                "early": {"count": early.count, "average_rating": early.average()},
                "mid": {"count": mid.count, "average_rating": mid.average()},
                "late": {"count": late.count, "average_rating": late.average()},
            },
            "top_genres": top_genres,
            "highest_rated": highest,
            "lowest_rated": lowest,
            "trajectory": trajectory,
            "filmography": movies,
        }))
    }
}

fn top_genres(movies: &[MovieDto], limit: usize) -> Vec<Value> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for movie in movies {
        for genre in &movie.genres {
            *counts.entry(genre.as_str()).or_default() += 1;
        }
    }
    let mut entries: Vec<(&str, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(genre, count)| json!({"genre": genre, "count": count}))
        .collect()
}

fn trajectory(early: f64, mid: f64, late: f64) -> &'static str {
    if early < mid && mid < late {
        "Ascending"
    } else if early > mid && mid > late {
        "Descending"
    } else if mid > early && mid > late {
        "Peak in mid-career"
    } else if late > early {
        "Late career resurgence"
    } else {
        "Consistent quality throughout career"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_labels() {
        assert_eq!(trajectory(6.0, 7.0, 8.0), "Ascending");
        assert_eq!(trajectory(8.0, 7.0, 6.0), "Descending");
        assert_eq!(trajectory(6.0, 8.0, 7.0), "Peak in mid-career");
        assert_eq!(trajectory(6.0, 6.0, 7.0), "Late career resurgence");
        assert_eq!(trajectory(7.0, 7.0, 7.0), "Consistent quality throughout career");
    }

    #[test]
    fn test_phase_average_ignores_unrated() {
        let mut phase = Phase::default();
        phase.push(8.0);
        phase.push(0.0);
        phase.push(6.0);
        assert_eq!(phase.count, 3);
        assert!((phase.average() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_phase_average_is_zero() {
        assert_eq!(Phase::default().average(), 0.0);
    }
}
