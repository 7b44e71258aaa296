//! Cast link tools: link/unlink and the two membership queries.

use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use async_trait::async_trait;
use movies_domain::Result;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct LinkArgs {
    actor_id: i64,
    movie_id: i64,
}

fn link_schema() -> InputSchema {
    InputSchema::new()
        .field(FieldSpec::integer("actor_id", "Actor ID").required().minimum(1.0))
        .field(FieldSpec::integer("movie_id", "Movie ID").required().minimum(1.0))
}

pub struct LinkActorToMovieTool;

#[async_trait]
impl McpTool for LinkActorToMovieTool {
    fn name(&self) -> &'static str {
        "link_actor_to_movie"
    }

    fn description(&self) -> &'static str {
        "Add an actor to a movie's cast"
    }

    fn input_schema(&self) -> InputSchema {
        link_schema()
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: LinkArgs = decode_args(args)?;
        app.actors.link(args.actor_id, args.movie_id).await?;
        Ok(json!({
            "status": "success",
            "message": format!("Actor {} linked to movie {}", args.actor_id, args.movie_id),
        }))
    }
}

pub struct UnlinkActorFromMovieTool;

#[async_trait]
impl McpTool for UnlinkActorFromMovieTool {
    fn name(&self) -> &'static str {
        "unlink_actor_from_movie"
    }

    fn description(&self) -> &'static str {
        "Remove an actor from a movie's cast"
    }

    fn input_schema(&self) -> InputSchema {
        link_schema()
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: LinkArgs = decode_args(args)?;
        app.actors.unlink(args.actor_id, args.movie_id).await?;
        Ok(json!({
            "status": "success",
            "message": format!("Actor {} unlinked from movie {}", args.actor_id, args.movie_id),
        }))
    }
}

pub struct GetMovieCastTool;

#[derive(Debug, Deserialize)]
struct MovieIdArgs {
    movie_id: i64,
}

#[async_trait]
impl McpTool for GetMovieCastTool {
    fn name(&self) -> &'static str {
        "get_movie_cast"
    }

    fn description(&self) -> &'static str {
        "List the actors linked to a movie"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::integer("movie_id", "Movie ID").required().minimum(1.0))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: MovieIdArgs = decode_args(args)?;
        let cast = app.actors.cast_of(args.movie_id).await?;
        Ok(json!({
            "movie_id": args.movie_id,
            "cast": cast,
            "total": cast.len(),
        }))
    }
}

pub struct GetActorMoviesTool;

#[derive(Debug, Deserialize)]
struct ActorIdArgs {
    actor_id: i64,
}

#[async_trait]
impl McpTool for GetActorMoviesTool {
    fn name(&self) -> &'static str {
        "get_actor_movies"
    }

    fn description(&self) -> &'static str {
        "List the movies an actor is linked to"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::integer("actor_id", "Actor ID").required().minimum(1.0))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: ActorIdArgs = decode_args(args)?;
        let filmography = app.actors.filmography(args.actor_id).await?;
        Ok(serde_json::to_value(filmography).unwrap_or(Value::Null))
    }
}
