//! Search tools: multi-criteria, top-rated, decade, rating range, actors.

use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use crate::service::{RatingRangeInput, SearchActorsInput, SearchMoviesInput};
use async_trait::async_trait;
use movies_domain::Result;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct SearchMoviesTool;

#[async_trait]
impl McpTool for SearchMoviesTool {
    fn name(&self) -> &'static str {
        "search_movies"
    }

    fn description(&self) -> &'static str {
        "Search movies by any combination of title, director, genre, year range, and rating range"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::string("title", "Substring match on title"))
            .field(FieldSpec::string("director", "Substring match on director"))
            .field(FieldSpec::string("genre", "Exact match against one genre label"))
            .field(FieldSpec::integer("min_year", "Earliest release year, inclusive"))
            .field(FieldSpec::integer("max_year", "Latest release year, inclusive"))
            .field(
                FieldSpec::number("min_rating", "Lowest rating, inclusive")
                    .minimum(0.0)
                    .maximum(10.0),
            )
            .field(
                FieldSpec::number("max_rating", "Highest rating, inclusive")
                    .minimum(0.0)
                    .maximum(10.0),
            )
            .field(
                FieldSpec::integer("limit", "Page size, clamped to [1, 100]")
                    .default_value(20),
            )
            .field(FieldSpec::integer("offset", "Rows to skip").default_value(0))
            .field(
                FieldSpec::string("order_by", "Sort key: title, director, year, rating, created_at")
                    .default_value("title"),
            )
            .field(FieldSpec::string("order_dir", "Sort direction: asc or desc").default_value("asc"))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let input: SearchMoviesInput = decode_args(args)?;
        let list = app.movies.search(input.into_criteria()).await?;
        Ok(serde_json::to_value(list).unwrap_or(Value::Null))
    }
}

pub struct ListTopMoviesTool;

#[derive(Debug, Deserialize)]
struct TopMoviesArgs {
    limit: i64,
}

#[async_trait]
impl McpTool for ListTopMoviesTool {
    fn name(&self) -> &'static str {
        "list_top_movies"
    }

    fn description(&self) -> &'static str {
        "List the top-rated movies, best first"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field(
            FieldSpec::integer("limit", "How many movies to return")
                .default_value(10)
                .minimum(1.0)
                .maximum(100.0),
        )
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: TopMoviesArgs = decode_args(args)?;
        let movies = app.movies.top_rated(args.limit).await?;
        Ok(json!({
            "movies": movies,
            "total": movies.len(),
        }))
    }
}

pub struct SearchByDecadeTool;

#[derive(Debug, Deserialize)]
struct DecadeArgs {
    decade: String,
}

#[async_trait]
impl McpTool for SearchByDecadeTool {
    fn name(&self) -> &'static str {
        "search_by_decade"
    }

    fn description(&self) -> &'static str {
        "Find movies released in a decade, e.g. \"1990s\", \"90s\", or \"1990\""
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field(FieldSpec::string("decade", "Decade seed").required())
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: DecadeArgs = decode_args(args)?;
        let (decade, list) = app.movies.by_decade(&args.decade).await?;
        Ok(json!({
            "decade": decade.to_string(),
            "start_year": decade.start,
            "end_year": decade.end,
            "movies": list.movies,
            "total": list.total,
        }))
    }
}

pub struct SearchByRatingRangeTool;

#[async_trait]
impl McpTool for SearchByRatingRangeTool {
    fn name(&self) -> &'static str {
        "search_by_rating_range"
    }

    fn description(&self) -> &'static str {
        "Find movies within an inclusive rating range, best first"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(
                FieldSpec::number("min_rating", "Lowest rating, inclusive")
                    .minimum(0.0)
                    .maximum(10.0),
            )
            .field(
                FieldSpec::number("max_rating", "Highest rating, inclusive")
                    .minimum(0.0)
                    .maximum(10.0),
            )
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let input: RatingRangeInput = decode_args(args)?;
        let list = app.movies.by_rating_range(input).await?;
        Ok(serde_json::to_value(list).unwrap_or(Value::Null))
    }
}

pub struct SearchActorsTool;

#[async_trait]
impl McpTool for SearchActorsTool {
    fn name(&self) -> &'static str {
        "search_actors"
    }

    fn description(&self) -> &'static str {
        "Search actors by name, birth-year range, or movie membership"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::string("name", "Substring match on name"))
            .field(FieldSpec::integer("min_birth_year", "Earliest birth year, inclusive"))
            .field(FieldSpec::integer("max_birth_year", "Latest birth year, inclusive"))
            .field(FieldSpec::integer("movie_id", "Only actors linked to this movie"))
            .field(
                FieldSpec::integer("limit", "Page size, clamped to [1, 100]")
                    .default_value(20),
            )
            .field(FieldSpec::integer("offset", "Rows to skip").default_value(0))
            .field(
                FieldSpec::string("order_by", "Sort key: name, birth_year, created_at")
                    .default_value("name"),
            )
            .field(FieldSpec::string("order_dir", "Sort direction: asc or desc").default_value("asc"))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let input: SearchActorsInput = decode_args(args)?;
        let list = app.actors.search(input).await?;
        Ok(serde_json::to_value(list).unwrap_or(Value::Null))
    }
}
