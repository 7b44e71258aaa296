//! Value objects shared by the movie and actor aggregates.
//!
//! Identifiers are opaque positive integers; zero is the "unassigned"
//! sentinel used only between construction and first persistence.

use crate::error::{DomainError, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Earliest year a movie can carry (the first film on record).
pub const MIN_RELEASE_YEAR: i32 = 1888;

/// Earliest birth year an actor can carry.
pub const MIN_BIRTH_YEAR: i32 = 1850;

/// How far past the current year a release may be announced.
const RELEASE_YEAR_HEADROOM: i32 = 10;

macro_rules! define_int_id {
    ($name:ident, $label:expr) => {
        /// Opaque positive integer identifier. Zero means "not yet persisted".
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap an assigned identifier. Fails unless the value is positive.
            pub fn new(value: i64) -> Result<Self> {
                if value <= 0 {
                    return Err(DomainError::validation(format!(
                        "{} must be positive, got {}",
                        $label, value
                    )));
                }
                Ok(Self(value))
            }

            /// The unassigned sentinel.
            pub fn zero() -> Self {
                Self(0)
            }

            /// True while the aggregate has never been persisted.
            pub fn is_zero(&self) -> bool {
                self.0 == 0
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_int_id!(MovieId, "movie ID");
define_int_id!(ActorId, "actor ID");

/// A rating in `[0.0, 10.0]` inclusive.
///
/// A rating of exactly `0.0` carries the semantic "unrated" when derived from
/// a nullable store column; the DTO layer collapses both forms.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(f64);

impl Rating {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || !(0.0..=10.0).contains(&value) {
            return Err(DomainError::validation(format!(
                "rating must be between 0.0 and 10.0, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// A release year in `[1888, current year + 10]`.
///
/// The upper bound is evaluated at validation time, not fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseYear(i32);

impl ReleaseYear {
    pub fn new(value: i32) -> Result<Self> {
        let max = Utc::now().year() + RELEASE_YEAR_HEADROOM;
        if value < MIN_RELEASE_YEAR || value > max {
            return Err(DomainError::validation(format!(
                "year must be between {MIN_RELEASE_YEAR} and {max}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An actor's birth year in `[1850, current year]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirthYear(i32);

impl BirthYear {
    pub fn new(value: i32) -> Result<Self> {
        let max = Utc::now().year();
        if value < MIN_BIRTH_YEAR || value > max {
            return Err(DomainError::validation(format!(
                "birth year must be between {MIN_BIRTH_YEAR} and {max}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// A non-empty, trimmed genre label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genre(String);

impl Genre {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("genre must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against an arbitrary label.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
