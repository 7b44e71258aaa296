//! movies-mcp-server launcher
//!
//! Binary entry point: CLI parsing, logging bootstrap (stderr only - stdout
//! carries the protocol), store setup, and the MCP stdio session.
//!
//! Exit codes: 0 on clean shutdown (stdin EOF), 1 on startup failure, 2 on
//! panic.
//!
//! Example usage with Claude Desktop, in claude_desktop_config.json:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "movies": {
//!       "command": "movies-mcp-server",
//!       "env": { "MOVIES_DB_PATH": "~/.movies-mcp/movies.sqlite" }
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use movies_db::{
    MoviesDb, SqliteActorRepository, SqliteLinkRepository, SqliteMovieRepository, StoreConfig,
};
use movies_mcp::context_cache::DEFAULT_TTL_SECS;
use movies_mcp::{
    ActorService, AppContext, ContextCache, McpServer, McpServerConfig, MovieService,
    PromptRegistry, ResourceRegistry,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "movies-mcp-server",
    version,
    about = "MCP server exposing a movie and actor catalog over stdio"
)]
struct Cli {
    /// Run schema migrations and exit
    #[arg(long)]
    migrate_only: bool,

    /// Exit 0 iff the store answers a liveness probe
    #[arg(long)]
    health_check: bool,

    /// Directory of *.sql migration files (instead of the embedded set)
    #[arg(long, value_name = "PATH")]
    migrations: Option<PathBuf>,

    /// Store file path (overrides MOVIES_DB_PATH / DATABASE_URL)
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
}

fn main() {
    // A panic anywhere is exit code 2, distinct from startup failure.
    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {info}");
        std::process::exit(2);
    }));

    let cli = Cli::parse();
    let reload_handle = init_logging();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(cli, reload_handle)) {
        Ok(()) => {}
        Err(e) => {
            error!("startup failed: {e:#}");
            std::process::exit(1);
        }
    }
}

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// Stderr logging with an env-driven filter and a reload handle for the
/// MCP `logging/setLevel` method.
fn init_logging() -> ReloadHandle {
    let filter = EnvFilter::try_from_env("MOVIES_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();

    handle
}

async fn run(cli: Cli, reload_handle: ReloadHandle) -> Result<()> {
    let store_config = match cli.db_path {
        Some(path) => StoreConfig::for_path(path),
        None => StoreConfig::from_env().context("invalid store configuration")?,
    };

    let db = MoviesDb::connect(&store_config)
        .await
        .context("cannot open store")?;

    if cli.health_check {
        db.ping().await.context("store not ready")?;
        info!("health check passed");
        return Ok(());
    }

    match cli.migrations {
        Some(ref dir) => db.migrate_from_dir(dir).await.context("migrations failed")?,
        None => db.migrate().await.context("migrations failed")?,
    }
    if cli.migrate_only {
        info!("migrations applied");
        return Ok(());
    }

    let movie_repo = Arc::new(SqliteMovieRepository::new(db.pool().clone()));
    let actor_repo = Arc::new(SqliteActorRepository::new(db.pool().clone()));
    let link_repo = Arc::new(SqliteLinkRepository::new(db.pool().clone()));

    let movies = MovieService::new(movie_repo.clone());
    let actors = ActorService::new(actor_repo, movie_repo, link_repo);

    let ttl_secs = std::env::var("MOVIES_CONTEXT_TTL_SECS")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TTL_SECS);

    let app = AppContext {
        movies: movies.clone(),
        actors,
        contexts: Arc::new(ContextCache::with_ttl_secs(ttl_secs)),
    };
    let resources = ResourceRegistry::new(movies, db.clone());
    let prompts = PromptRegistry::new(db);

    let server = McpServer::new(McpServerConfig::from_env(), app, resources, prompts)
        .with_log_reload(Box::new(move |level| {
            reload_handle
                .reload(EnvFilter::new(level))
                .map_err(|e| e.to_string())
        }));

    server.run().await.context("stdio session failed")?;
    Ok(())
}
