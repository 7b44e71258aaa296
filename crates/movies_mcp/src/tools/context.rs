//! Search context tools: create, page, info.

use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use crate::context_cache::MAX_MATERIALIZED_ROWS;
use crate::service::SearchMoviesInput;
use async_trait::async_trait;
use movies_domain::Result;
use serde_json::{json, Value};

pub struct CreateSearchContextTool;

#[async_trait]
impl McpTool for CreateSearchContextTool {
    fn name(&self) -> &'static str {
        "create_search_context"
    }

    fn description(&self) -> &'static str {
        "Run a movie search once and cache the full result for paging"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::object(
                "query",
                "Search filters; same fields as search_movies",
            ))
            .field(
                FieldSpec::integer("page_size", "Rows per page, clamped to [1, 1000]")
                    .default_value(50)
                    .minimum(1.0)
                    .maximum(1000.0),
            )
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let query = args.get("query").cloned().unwrap_or_else(|| json!({}));
        let page_size = args.get("page_size").and_then(Value::as_i64);

        let input: SearchMoviesInput = decode_args(query.clone())?;
        let rows = app
            .movies
            .materialize(input.into_criteria(), MAX_MATERIALIZED_ROWS)
            .await?
            .into_iter()
            .map(|dto| serde_json::to_value(dto).unwrap_or(Value::Null))
            .collect();

        let info = app.contexts.create(query, rows, page_size);
        Ok(serde_json::to_value(info).unwrap_or(Value::Null))
    }
}

pub struct GetContextPageTool;

#[async_trait]
impl McpTool for GetContextPageTool {
    fn name(&self) -> &'static str {
        "get_context_page"
    }

    fn description(&self) -> &'static str {
        "Read one page of a cached search context"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::string("context_id", "Context ID from create_search_context").required())
            .field(FieldSpec::integer("page", "Page number, 1-based").default_value(1))
            .field(FieldSpec::integer("page_size", "Per-call page size override"))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let context_id = args
            .get("context_id")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let page = args.get("page").and_then(Value::as_i64);
        let page_size = args.get("page_size").and_then(Value::as_i64);

        let result = app.contexts.page(context_id, page, page_size)?;
        Ok(serde_json::to_value(result).unwrap_or(Value::Null))
    }
}

pub struct GetContextInfoTool;

#[async_trait]
impl McpTool for GetContextInfoTool {
    fn name(&self) -> &'static str {
        "get_context_info"
    }

    fn description(&self) -> &'static str {
        "Read a cached search context's metadata without its data"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::string("context_id", "Context ID from create_search_context").required())
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let context_id = args
            .get("context_id")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let info = app.contexts.info(context_id)?;
        Ok(serde_json::to_value(info).unwrap_or(Value::Null))
    }
}
