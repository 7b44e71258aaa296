//! Actor CRUD tools.

use super::{decode_args, AppContext, FieldSpec, InputSchema, McpTool};
use crate::service::{CreateActorInput, UpdateActorInput};
use async_trait::async_trait;
use movies_domain::Result;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ActorIdArgs {
    actor_id: i64,
}

pub struct GetActorTool;

#[async_trait]
impl McpTool for GetActorTool {
    fn name(&self) -> &'static str {
        "get_actor"
    }

    fn description(&self) -> &'static str {
        "Get an actor by their ID"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::integer("actor_id", "Actor ID").required().minimum(1.0))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: ActorIdArgs = decode_args(args)?;
        let actor = app.actors.get(args.actor_id).await?;
        Ok(serde_json::to_value(actor).unwrap_or(Value::Null))
    }
}

pub struct AddActorTool;

fn actor_payload_schema(with_id: bool) -> InputSchema {
    let mut schema = InputSchema::new();
    if with_id {
        schema = schema.field(FieldSpec::integer("id", "Actor ID").required().minimum(1.0));
    }
    schema
        .field(FieldSpec::string("name", "Actor name").required())
        .field(FieldSpec::integer("birth_year", "Year of birth").minimum(1850.0))
        .field(FieldSpec::string("bio", "Short biography"))
}

#[async_trait]
impl McpTool for AddActorTool {
    fn name(&self) -> &'static str {
        "add_actor"
    }

    fn description(&self) -> &'static str {
        "Add a new actor to the database"
    }

    fn input_schema(&self) -> InputSchema {
        actor_payload_schema(false)
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let input: CreateActorInput = decode_args(args)?;
        let actor = app.actors.create(input).await?;
        Ok(serde_json::to_value(actor).unwrap_or(Value::Null))
    }
}

pub struct UpdateActorTool;

#[async_trait]
impl McpTool for UpdateActorTool {
    fn name(&self) -> &'static str {
        "update_actor"
    }

    fn description(&self) -> &'static str {
        "Update an existing actor"
    }

    fn input_schema(&self) -> InputSchema {
        actor_payload_schema(true)
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let input: UpdateActorInput = decode_args(args)?;
        let actor = app.actors.update(input).await?;
        Ok(serde_json::to_value(actor).unwrap_or(Value::Null))
    }
}

pub struct DeleteActorTool;

#[async_trait]
impl McpTool for DeleteActorTool {
    fn name(&self) -> &'static str {
        "delete_actor"
    }

    fn description(&self) -> &'static str {
        "Delete an actor and their movie links"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(FieldSpec::integer("actor_id", "Actor ID").required().minimum(1.0))
    }

    async fn execute(&self, app: &AppContext, args: Value) -> Result<Value> {
        let args: ActorIdArgs = decode_args(args)?;
        app.actors.delete(args.actor_id).await?;
        Ok(json!({
            "status": "success",
            "message": format!("Actor {} deleted", args.actor_id),
        }))
    }
}
