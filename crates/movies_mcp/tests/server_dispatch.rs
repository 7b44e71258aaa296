//! Protocol-level tests: the full session pipeline through `handle_line`.

use movies_db::{
    MoviesDb, SqliteActorRepository, SqliteLinkRepository, SqliteMovieRepository, StoreConfig,
};
use movies_mcp::protocol::{JsonRpcResponse, RequestId};
use movies_mcp::{
    ActorService, AppContext, ContextCache, McpServer, McpServerConfig, MovieService,
    PromptRegistry, ResourceRegistry,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

async fn test_server() -> (TempDir, McpServer) {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::for_path(dir.path().join("movies.sqlite"));
    let db = MoviesDb::connect(&config).await.unwrap();
    db.migrate().await.unwrap();

    let movie_repo = Arc::new(SqliteMovieRepository::new(db.pool().clone()));
    let actor_repo = Arc::new(SqliteActorRepository::new(db.pool().clone()));
    let link_repo = Arc::new(SqliteLinkRepository::new(db.pool().clone()));

    let movies = MovieService::new(movie_repo.clone());
    let app = AppContext {
        movies: movies.clone(),
        actors: ActorService::new(actor_repo, movie_repo, link_repo),
        contexts: Arc::new(ContextCache::default()),
    };
    let resources = ResourceRegistry::new(movies, db.clone());
    let prompts = PromptRegistry::new(db);

    let server = McpServer::new(McpServerConfig::default(), app, resources, prompts);
    (dir, server)
}

async fn send(server: &McpServer, message: Value) -> Option<JsonRpcResponse> {
    server.handle_line(&message.to_string()).await
}

async fn initialize(server: &McpServer) {
    let response = send(
        server,
        json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0"},
        }}),
    )
    .await
    .unwrap();
    assert!(response.error.is_none());
}

fn result(response: Option<JsonRpcResponse>) -> Value {
    let response = response.expect("expected a response");
    assert!(response.error.is_none(), "error: {:?}", response.error);
    response.result.unwrap()
}

#[tokio::test]
async fn test_initialize_shape() {
    let (_dir, server) = test_server().await;
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
    )
    .await
    .unwrap();

    assert_eq!(response.id, Some(RequestId::Number(1)));
    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "movies-mcp-server");
    assert!(result["serverInfo"]["version"].is_string());
    assert_eq!(
        result["capabilities"],
        json!({"tools": {}, "resources": {}, "prompts": {}})
    );
}

#[tokio::test]
async fn test_requests_before_initialize_are_rejected() {
    let (_dir, server) = test_server().await;
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32600);

    // After initialize everything is enabled.
    initialize(&server).await;
    let listed = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        )
        .await,
    );
    assert_eq!(listed["tools"].as_array().unwrap().len(), 23);
}

#[tokio::test]
async fn test_parse_error_gets_null_id() {
    let (_dir, server) = test_server().await;
    let response = server.handle_line("{not json").await.unwrap();
    assert_eq!(response.id, None);
    assert_eq!(response.error.unwrap().code, -32700);

    let raw = serde_json::to_string(&server.handle_line("{not json").await.unwrap()).unwrap();
    assert!(raw.contains(r#""id":null"#));
}

#[tokio::test]
async fn test_notifications_are_silent() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;

    // Known notification, unknown notification, and a notification-shaped
    // request method: none of them produce a response.
    for message in [
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "method": "notifications/made_up"}),
        json!({"jsonrpc": "2.0", "method": "no/such/method"}),
    ] {
        assert!(send(&server, message).await.is_none());
    }

    // Empty lines are ignored too.
    assert!(server.handle_line("   ").await.is_none());
}

#[tokio::test]
async fn test_unknown_request_method_is_method_not_found() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 5, "method": "movies/teleport"}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn test_wrong_jsonrpc_version_rejected() {
    let (_dir, server) = test_server().await;
    let response = send(
        &server,
        json!({"jsonrpc": "1.0", "id": 1, "method": "initialize"}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32600);
}

#[tokio::test]
async fn test_string_ids_are_preserved() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": "req-77", "method": "tools/list"}),
    )
    .await
    .unwrap();
    assert_eq!(response.id, Some(RequestId::String("req-77".to_string())));
}

#[tokio::test]
async fn test_tools_call_envelope_and_errors() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;

    let call = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
                "name": "add_movie",
                "arguments": {"title": "Heat", "director": "Michael Mann", "year": 1995},
            }}),
        )
        .await,
    );
    assert_eq!(call["content"][0]["type"], "text");
    let movie: Value = serde_json::from_str(call["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(movie["title"], "Heat");

    // Unknown tool: method-level not found.
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
            "name": "no_such_tool", "arguments": {},
        }}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32601);

    // Schema violation: invalid params with the validation kind.
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
            "name": "add_movie", "arguments": {"title": "No Year", "director": "X"},
        }}),
    )
    .await
    .unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32602);
    assert_eq!(error.data.unwrap()["kind"], "validation");

    // Entity lookup failure: invalid params with the not_found kind.
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {
            "name": "get_movie", "arguments": {"movie_id": 999},
        }}),
    )
    .await
    .unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32602);
    assert_eq!(error.data.unwrap()["kind"], "not_found");

    // Missing params entirely.
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call"}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn test_resources_list_and_read() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;

    result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
                "name": "add_movie",
                "arguments": {"title": "Heat", "director": "Michael Mann", "year": 1995,
                              "rating": 8.3, "genres": ["Crime"],
                              "poster_url": "https://example.com/heat.png"},
            }}),
        )
        .await,
    );

    let listed = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"}),
        )
        .await,
    );
    let uris: Vec<&str> = listed["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert_eq!(
        uris,
        vec![
            "movies://database/all",
            "movies://database/stats",
            "movies://posters/collection",
        ]
    );

    let dump = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "resources/read",
                   "params": {"uri": "movies://database/all"}}),
        )
        .await,
    );
    assert_eq!(dump["contents"][0]["mimeType"], "application/json");
    let movies: Value =
        serde_json::from_str(dump["contents"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(movies.as_array().unwrap().len(), 1);

    let stats = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 5, "method": "resources/read",
                   "params": {"uri": "movies://database/stats"}}),
        )
        .await,
    );
    let stats: Value =
        serde_json::from_str(stats["contents"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(stats["total_movies"], 1);
    assert_eq!(stats["genres"]["Crime"], 1);
    assert_eq!(stats["movies_with_posters"], 1);
    assert!(stats["database_size"].is_string());

    let posters = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 6, "method": "resources/read",
                   "params": {"uri": "movies://posters/collection"}}),
        )
        .await,
    );
    // A remote poster URI contributes metadata only - no blob element.
    assert_eq!(posters["contents"].as_array().unwrap().len(), 1);
    let posters: Value =
        serde_json::from_str(posters["contents"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(posters[0]["mime_type"], "image/png");

    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 7, "method": "resources/read",
               "params": {"uri": "movies://database/nope"}}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);

    let templates = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 8, "method": "resources/templates/list"}),
        )
        .await,
    );
    assert_eq!(templates["resourceTemplates"], json!([]));
}

#[tokio::test]
async fn test_poster_stored_on_disk_travels_as_blob() {
    use base64::Engine;

    let (dir, server) = test_server().await;
    initialize(&server).await;

    let poster_bytes = b"fake png bytes";
    let poster_path = dir.path().join("heat.png");
    std::fs::write(&poster_path, poster_bytes).unwrap();
    let poster_uri = poster_path.to_string_lossy().to_string();

    result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
                "name": "add_movie",
                "arguments": {"title": "Heat", "director": "Michael Mann", "year": 1995,
                              "poster_url": poster_uri},
            }}),
        )
        .await,
    );

    let read = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "resources/read",
                   "params": {"uri": "movies://posters/collection"}}),
        )
        .await,
    );
    let contents = read["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 2);

    // Element 0: the metadata array.
    let metadata: Value = serde_json::from_str(contents[0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(metadata[0]["poster_uri"], poster_uri.as_str());

    // Element 1: the poster bytes, base64 in `blob`.
    assert_eq!(contents[1]["uri"], poster_uri.as_str());
    assert_eq!(contents[1]["mimeType"], "image/png");
    assert!(contents[1].get("text").is_none());
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(contents[1]["blob"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, poster_bytes);
}

#[tokio::test]
async fn test_prompts_and_completion() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;

    result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
                "name": "add_movie",
                "arguments": {"title": "Heat", "director": "Michael Mann", "year": 1995,
                              "genres": ["Crime", "Drama"]},
            }}),
        )
        .await,
    );

    let listed = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "prompts/list"}),
        )
        .await,
    );
    assert_eq!(listed["prompts"].as_array().unwrap().len(), 2);

    let rendered = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "prompts/get", "params": {
                "name": "movie_analysis", "arguments": {"title": "Heat"},
            }}),
        )
        .await,
    );
    assert_eq!(rendered["messages"][0]["role"], "user");
    assert!(rendered["messages"][0]["content"]["text"]
        .as_str()
        .unwrap()
        .contains("Heat"));

    // Missing required argument.
    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 5, "method": "prompts/get",
               "params": {"name": "movie_analysis"}}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);

    let completed = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 6, "method": "completion/complete", "params": {
                "ref": {"type": "ref/prompt", "name": "movie_recommendation"},
                "argument": {"name": "genre", "value": "cr"},
            }}),
        )
        .await,
    );
    assert_eq!(completed["completion"]["values"], json!(["Crime"]));

    // Completing anything else yields an empty list.
    let completed = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 7, "method": "completion/complete", "params": {
                "ref": {"type": "ref/resource", "uri": "movies://database/all"},
                "argument": {"name": "x", "value": ""},
            }}),
        )
        .await,
    );
    assert_eq!(completed["completion"]["values"], json!([]));
}

#[tokio::test]
async fn test_logging_set_level() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;

    let set = result(
        send(
            &server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "logging/setLevel",
                   "params": {"level": "warning"}}),
        )
        .await,
    );
    assert_eq!(set, json!({}));

    let response = send(
        &server,
        json!({"jsonrpc": "2.0", "id": 3, "method": "logging/setLevel",
               "params": {"level": "chatty"}}),
    )
    .await
    .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn test_pipelined_requests_pair_by_id() {
    let (_dir, server) = test_server().await;
    initialize(&server).await;

    // Fire several requests concurrently; every response must carry its
    // caller's ID regardless of completion order.
    let mut handles = Vec::new();
    for i in 1..=8 {
        let server = server.clone();
        handles.push(tokio::spawn(async move {
            let response = server
                .handle_line(
                    &json!({"jsonrpc": "2.0", "id": i, "method": "tools/list"}).to_string(),
                )
                .await
                .unwrap();
            (i, response)
        }));
    }
    for handle in handles {
        let (i, response) = handle.await.unwrap();
        assert_eq!(response.id, Some(RequestId::Number(i)));
        assert!(response.error.is_none());
    }
}
