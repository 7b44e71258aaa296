//! Movie CRUD tools.

use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use crate::service::{CreateMovieInput, UpdateMovieInput};
use async_trait::async_trait;
use movies_domain::Result;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct MovieIdArgs {
    movie_id: i64,
}

pub struct GetMovieTool;

#[async_trait]
impl McpTool for GetMovieTool {
    fn name(&self) -> &'static str {
        "get_movie"
    }

    fn description(&self) -> &'static str {
        "Get a movie by its ID"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::integer("movie_id", "Movie ID").required().minimum(1.0))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: MovieIdArgs = decode_args(args)?;
        let movie = app.movies.get(args.movie_id).await?;
        Ok(serde_json::to_value(movie).unwrap_or(Value::Null))
    }
}

pub struct AddMovieTool;

/// Shared by add_movie and each row of bulk_movie_import.
pub(crate) fn movie_payload_schema(with_id: bool) -> InputSchema {
    let mut schema = InputSchema::new();
    if with_id {
        schema = schema.field(FieldSpec::integer("id", "Movie ID").required().minimum(1.0));
    }
    schema
        .field(FieldSpec::string("title", "Movie title").required())
        .field(FieldSpec::string("director", "Director name").required())
        .field(FieldSpec::integer("year", "Release year").required().minimum(1888.0))
        .field(
            FieldSpec::number("rating", "Rating from 0.0 to 10.0")
                .minimum(0.0)
                .maximum(10.0),
        )
        .field(FieldSpec::string_array("genres", "Genre labels"))
        .field(FieldSpec::string("poster_url", "Poster image URL"))
}

#[async_trait]
impl McpTool for AddMovieTool {
    fn name(&self) -> &'static str {
        "add_movie"
    }

    fn description(&self) -> &'static str {
        "Add a new movie to the database"
    }

    fn input_schema(&self) -> InputSchema {
        movie_payload_schema(false)
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let input: CreateMovieInput = decode_args(args)?;
        let movie = app.movies.create(input).await?;
        Ok(serde_json::to_value(movie).unwrap_or(Value::Null))
    }
}

pub struct UpdateMovieTool;

#[async_trait]
impl McpTool for UpdateMovieTool {
    fn name(&self) -> &'static str {
        "update_movie"
    }

    fn description(&self) -> &'static str {
        "Update an existing movie"
    }

    fn input_schema(&self) -> InputSchema {
        movie_payload_schema(true)
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let input: UpdateMovieInput = decode_args(args)?;
        let movie = app.movies.update(input).await?;
        Ok(serde_json::to_value(movie).unwrap_or(Value::Null))
    }
}

pub struct DeleteMovieTool;

#[async_trait]
impl McpTool for DeleteMovieTool {
    fn name(&self) -> &'static str {
        "delete_movie"
    }

    fn description(&self) -> &'static str {
        "Delete a movie and its cast links"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::integer("movie_id", "Movie ID").required().minimum(1.0))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: MovieIdArgs = decode_args(args)?;
        app.movies.delete(args.movie_id).await?;
        Ok(json!({
            "status": "success",
            "message": format!("Movie {} deleted", args.movie_id),
        }))
    }
}
