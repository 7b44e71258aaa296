//! Bulk movie import.
//!
//! Iterates the submitted rows, attempts each one, and reports a structured
//! summary. A bad row never aborts the batch; its error is collected with
//! its index instead.

use super::movie::movie_payload_schema;
use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use crate::service::CreateMovieInput;
use async_trait::async_trait;
use movies_domain::Result;
use serde_json::{json, Value};
use tracing::debug;

pub struct BulkMovieImportTool;

#[async_trait]
impl McpTool for BulkMovieImportTool {
    fn name(&self) -> &'static str {
        "bulk_movie_import"
    }

    fn description(&self) -> &'static str {
        "Import several movies in one call, reporting per-row results"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::object_array("movies", "Movies to import; same shape as add_movie").required())
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let rows = args
            .get("movies")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let row_schema = movie_payload_schema(false);

        let total = rows.len();
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let title = row
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let attempt = async {
                let clean = row_schema.validate(&row)?;
                let input: CreateMovieInput = decode_args(Value::Object(clean))?;
                app.movies.create(input).await
            };

            match attempt.await {
                Ok(movie) => results.push(serde_json::to_value(movie).unwrap_or(Value::Null)),
                Err(err) => errors.push(json!({
                    "index": index,
                    "title": title,
                    "error": err.to_string(),
                })),
            }
        }

        let imported = results.len();
        let failed = errors.len();
        let success_rate = if total > 0 {
            format!("{:.1}%", imported as f64 * 100.0 / total as f64)
        } else {
            "0.0%".to_string()
        };
        debug!(imported, failed, total, "Bulk import finished");

        Ok(json!({
            "imported": imported,
            "failed": failed,
            "total": total,
            "success_rate": success_rate,
            "results": results,
            "errors": errors,
        }))
    }
}
