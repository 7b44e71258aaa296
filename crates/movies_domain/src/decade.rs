//! Decade parsing for the decade search tool.
//!
//! Accepted seeds: `"1990s"`, `"90s"`, `"1990"`. A two-digit year pivots at
//! 30/31: `00-30` lands in 2000-2030, `31-99` in 1931-1999.

use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Two-digit years at or below this value resolve to the 2000s.
const TWO_DIGIT_PIVOT: u32 = 30;

/// An inclusive ten-year span, e.g. `[1990, 1999]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decade {
    pub start: i32,
    pub end: i32,
}

impl Decade {
    /// Parse a decade seed into its `[start, start + 9]` span.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_suffix('s')
            .or_else(|| trimmed.strip_suffix('S'))
            .unwrap_or(trimmed);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "cannot parse decade from \"{input}\""
            )));
        }

        let year: i32 = match digits.len() {
            2 => {
                let two: u32 = digits.parse().map_err(|_| {
                    DomainError::validation(format!("cannot parse decade from \"{input}\""))
                })?;
                if two <= TWO_DIGIT_PIVOT {
                    2000 + two as i32
                } else {
                    1900 + two as i32
                }
            }
            4 => digits.parse().map_err(|_| {
                DomainError::validation(format!("cannot parse decade from \"{input}\""))
            })?,
            _ => {
                return Err(DomainError::validation(format!(
                    "cannot parse decade from \"{input}\""
                )))
            }
        };

        let start = year - year.rem_euclid(10);
        Ok(Self {
            start,
            end: start + 9,
        })
    }
}

impl std::fmt::Display for Decade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_digit_forms() {
        for seed in ["1990s", "1990"] {
            let d = Decade::parse(seed).unwrap();
            assert_eq!((d.start, d.end), (1990, 1999), "seed {seed}");
        }
        // A mid-decade year floors to its decade.
        let d = Decade::parse("1994").unwrap();
        assert_eq!((d.start, d.end), (1990, 1999));
    }

    #[test]
    fn test_two_digit_forms() {
        let d = Decade::parse("90s").unwrap();
        assert_eq!((d.start, d.end), (1990, 1999));
        let d = Decade::parse("20s").unwrap();
        assert_eq!((d.start, d.end), (2020, 2029));
    }

    #[test]
    fn test_pivot_boundary() {
        // 30 is the last two-digit year mapping to the 2000s.
        let d = Decade::parse("30s").unwrap();
        assert_eq!(d.start, 2030);
        let d = Decade::parse("31s").unwrap();
        assert_eq!(d.start, 1930);
    }

    #[test]
    fn test_rejects_garbage() {
        for seed in ["", "abc", "199", "19905", "nineties", "19x0"] {
            assert!(Decade::parse(seed).is_err(), "seed {seed:?}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Decade::parse("90s").unwrap().to_string(), "1990s");
    }
}
