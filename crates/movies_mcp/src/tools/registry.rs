//! Tool Registry - Tool Discovery and Dispatch
//!
//! Maintains the list of available tools and dispatches calls by name.
//! Schemas are derived once at registration and cached; the registry is
//! immutable after startup.

use super::{actor, bulk, career, context, link, movie, recommend, search};
use super::{AppContext, InputSchema, McpTool};
use crate::protocol::ToolDefinition;
use movies_domain::Result;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

struct RegisteredTool {
    tool: Box<dyn McpTool>,
    schema: InputSchema,
    definition: ToolDefinition,
}

/// Registry of available MCP tools.
pub struct ToolRegistry {
    tools: HashMap<&'static str, RegisteredTool>,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    /// Create a new tool registry with the full catalog registered.
    pub fn new() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            order: Vec::new(),
        };

        registry.register(Box::new(movie::GetMovieTool));
        registry.register(Box::new(movie::AddMovieTool));
        registry.register(Box::new(movie::UpdateMovieTool));
        registry.register(Box::new(movie::DeleteMovieTool));
        registry.register(Box::new(search::SearchMoviesTool));
        registry.register(Box::new(search::ListTopMoviesTool));
        registry.register(Box::new(search::SearchByDecadeTool));
        registry.register(Box::new(search::SearchByRatingRangeTool));
        registry.register(Box::new(actor::GetActorTool));
        registry.register(Box::new(actor::AddActorTool));
        registry.register(Box::new(actor::UpdateActorTool));
        registry.register(Box::new(actor::DeleteActorTool));
        registry.register(Box::new(link::LinkActorToMovieTool));
        registry.register(Box::new(link::UnlinkActorFromMovieTool));
        registry.register(Box::new(link::GetMovieCastTool));
        registry.register(Box::new(link::GetActorMoviesTool));
        registry.register(Box::new(search::SearchActorsTool));
        registry.register(Box::new(bulk::BulkMovieImportTool));
        registry.register(Box::new(recommend::MovieRecommendationEngineTool));
        registry.register(Box::new(career::DirectorCareerAnalysisTool));
        registry.register(Box::new(context::CreateSearchContextTool));
        registry.register(Box::new(context::GetContextPageTool));
        registry.register(Box::new(context::GetContextInfoTool));

        debug!("Registered {} tools", registry.tools.len());

        registry
    }

    fn register(&mut self, tool: Box<dyn McpTool>) {
        let name = tool.name();
        let schema = tool.input_schema();
        let definition = tool.definition();
        self.order.push(name);
        self.tools.insert(
            name,
            RegisteredTool {
                tool,
                schema,
                definition,
            },
        );
    }

    /// List all tool definitions in registration order.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|entry| entry.definition.clone())
            .collect()
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Validate arguments against the tool's schema, then dispatch.
    ///
    /// The caller is expected to have resolved the name already; an unknown
    /// name here is a dispatch bug, reported as not-found.
    pub async fn call(&self, name: &str, args: &Value, app: &AppContext) -> Result<Value> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| movies_domain::DomainError::not_found("tool", name))?;
        let clean = entry.schema.validate(args)?;
        entry.tool.execute(app, Value::Object(clean)).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_full_catalog() {
        let registry = ToolRegistry::new();

        for name in [
            "get_movie",
            "add_movie",
            "update_movie",
            "delete_movie",
            "search_movies",
            "list_top_movies",
            "search_by_decade",
            "search_by_rating_range",
            "get_actor",
            "add_actor",
            "update_actor",
            "delete_actor",
            "link_actor_to_movie",
            "unlink_actor_from_movie",
            "get_movie_cast",
            "get_actor_movies",
            "search_actors",
            "bulk_movie_import",
            "movie_recommendation_engine",
            "director_career_analysis",
            "create_search_context",
            "get_context_page",
            "get_context_info",
        ] {
            assert!(registry.has_tool(name), "missing tool {name}");
        }
        assert_eq!(registry.list_tools().len(), 23);
    }

    #[test]
    fn test_definitions_are_object_schemas() {
        let registry = ToolRegistry::new();
        for def in registry.list_tools() {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
            assert!(def.input_schema["properties"].is_object(), "{}", def.name);
        }
    }
}
