//! MCP Tool Implementations
//!
//! Each tool exposes one operation of the movies catalog via the MCP
//! protocol. Tools are registered in the ToolRegistry and dispatched by
//! name after their arguments pass schema validation.
//!
//! # Tool Families
//!
//! - **Movie CRUD**: get/add/update/delete_movie
//! - **Actor CRUD**: get/add/update/delete_actor
//! - **Search**: search_movies, list_top_movies, search_by_decade,
//!   search_by_rating_range, search_actors
//! - **Links**: link/unlink, get_movie_cast, get_actor_movies
//! - **Bulk**: bulk_movie_import
//! - **Analytics**: movie_recommendation_engine, director_career_analysis
//! - **Contexts**: create_search_context, get_context_page, get_context_info

pub mod schema;

mod registry;

mod actor;
mod bulk;
mod career;
mod context;
mod link;
mod movie;
mod recommend;
mod search;

pub use registry::ToolRegistry;
pub use schema::{FieldSpec, InputSchema};

use crate::context_cache::ContextCache;
use crate::protocol::ToolDefinition;
use crate::service::{ActorService, MovieService};
use async_trait::async_trait;
use movies_domain::Result;
use serde_json::Value;
use std::sync::Arc;

/// Dependencies every tool handler receives.
#[derive(Clone)]
pub struct AppContext {
    pub movies: MovieService,
    pub actors: ActorService,
    pub contexts: Arc<ContextCache>,
}

/// Trait for MCP tools.
///
/// `execute` receives arguments already validated and coerced against the
/// tool's [`InputSchema`]; handlers deserialize them into a typed struct and
/// never touch raw wire maps.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_movies")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Declared input schema
    fn input_schema(&self) -> InputSchema;

    /// Execute the tool
    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value>;

    /// Get the tool definition for tools/list
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema().to_value(),
        }
    }
}

/// Deserialize a validated arguments map into a typed input struct.
///
/// The schema has already coerced types, so a failure here means the schema
/// and the struct disagree; it still surfaces as a validation error.
pub(crate) fn decode_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| movies_domain::DomainError::validation(format!("invalid arguments: {e}")))
}
