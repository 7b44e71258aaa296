//! Search criteria for movies and actors.
//!
//! Criteria are conjunctive. Text filters match case-insensitive substring;
//! `genre` matches exactly one element of the movie's genre list; numeric
//! bounds are inclusive on both ends.

use serde::{Deserialize, Serialize};

/// Default page size for searches.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Hard cap on a single search page.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Sort direction. Anything that is not "desc" (case-insensitive) is
/// ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDir {
    #[default]
    Asc,
    Desc,
}

impl OrderDir {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Movie sort keys. Unrecognized keys fall back to the natural key (title).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieOrder {
    #[default]
    Title,
    Director,
    Year,
    Rating,
    CreatedAt,
}

impl MovieOrder {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "director" => Self::Director,
            "year" => Self::Year,
            "rating" => Self::Rating,
            "created_at" => Self::CreatedAt,
            _ => Self::Title,
        }
    }

    /// Whitelisted ORDER BY column.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Director => "director",
            Self::Year => "year",
            Self::Rating => "rating",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Actor sort keys. Unrecognized keys fall back to the natural key (name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorOrder {
    #[default]
    Name,
    BirthYear,
    CreatedAt,
}

impl ActorOrder {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "birth_year" => Self::BirthYear,
            "created_at" => Self::CreatedAt,
            _ => Self::Name,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::BirthYear => "birth_year",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Conjunctive movie search criteria with offset pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieCriteria {
    pub title: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub limit: i64,
    pub offset: i64,
    pub order_by: MovieOrder,
    pub order_dir: OrderDir,
}

impl MovieCriteria {
    /// Criteria matching everything, first page, natural order.
    pub fn all() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            ..Default::default()
        }
    }

    /// Clamp limit to `[1, 100]` and offset to `>= 0`.
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_SEARCH_LIMIT);
        self.offset = self.offset.max(0);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Human-readable summary of the active filters, used in search results.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref t) = self.title {
            parts.push(format!("title contains \"{t}\""));
        }
        if let Some(ref d) = self.director {
            parts.push(format!("director contains \"{d}\""));
        }
        if let Some(ref g) = self.genre {
            parts.push(format!("genre is \"{g}\""));
        }
        match (self.min_year, self.max_year) {
            (Some(a), Some(b)) => parts.push(format!("year {a}-{b}")),
            (Some(a), None) => parts.push(format!("year >= {a}")),
            (None, Some(b)) => parts.push(format!("year <= {b}")),
            (None, None) => {}
        }
        match (self.min_rating, self.max_rating) {
            (Some(a), Some(b)) => parts.push(format!("rating {a}-{b}")),
            (Some(a), None) => parts.push(format!("rating >= {a}")),
            (None, Some(b)) => parts.push(format!("rating <= {b}")),
            (None, None) => {}
        }
        if parts.is_empty() {
            "all movies".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Conjunctive actor search criteria with offset pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorCriteria {
    pub name: Option<String>,
    pub min_birth_year: Option<i32>,
    pub max_birth_year: Option<i32>,
    pub movie_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
    pub order_by: ActorOrder,
    pub order_dir: OrderDir,
}

impl ActorCriteria {
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_SEARCH_LIMIT);
        self.offset = self.offset.max(0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_dir_parse() {
        assert_eq!(OrderDir::parse("desc"), OrderDir::Desc);
        assert_eq!(OrderDir::parse("DESC"), OrderDir::Desc);
        assert_eq!(OrderDir::parse("asc"), OrderDir::Asc);
        assert_eq!(OrderDir::parse("sideways"), OrderDir::Asc);
    }

    #[test]
    fn test_movie_order_fallback() {
        assert_eq!(MovieOrder::parse("rating"), MovieOrder::Rating);
        assert_eq!(MovieOrder::parse("RATING"), MovieOrder::Rating);
        assert_eq!(MovieOrder::parse("popularity"), MovieOrder::Title);
        assert_eq!(ActorOrder::parse("shoe_size"), ActorOrder::Name);
    }

    #[test]
    fn test_limit_clamped() {
        let c = MovieCriteria::all().with_limit(500).normalized();
        assert_eq!(c.limit, 100);
        let c = MovieCriteria::all().with_limit(0).normalized();
        assert_eq!(c.limit, 1);
        let c = MovieCriteria {
            offset: -3,
            ..MovieCriteria::all()
        }
        .normalized();
        assert_eq!(c.offset, 0);
    }

    #[test]
    fn test_describe() {
        assert_eq!(MovieCriteria::all().describe(), "all movies");
        let c = MovieCriteria {
            genre: Some("Drama".to_string()),
            min_year: Some(1990),
            max_year: Some(1999),
            ..MovieCriteria::all()
        };
        assert_eq!(c.describe(), "genre is \"Drama\", year 1990-1999");
    }
}
