//! Database schema for the movies store.
//!
//! All CREATE TABLE statements live here - single source of truth. Each
//! migration is applied at most once, tracked in `schema_migrations`.

use crate::store::map_sqlx_err;
use movies_domain::{DomainError, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};

/// Embedded migration set, applied in order.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial",
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        director TEXT NOT NULL,
        year INTEGER NOT NULL,
        rating REAL,
        genres TEXT NOT NULL DEFAULT '[]',
        poster_url TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS actors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        birth_year INTEGER,
        bio TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS movie_actors (
        movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
        actor_id INTEGER NOT NULL REFERENCES actors(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        PRIMARY KEY (movie_id, actor_id)
    );

    CREATE INDEX IF NOT EXISTS idx_movies_title ON movies(title);
    CREATE INDEX IF NOT EXISTS idx_movies_director ON movies(director);
    CREATE INDEX IF NOT EXISTS idx_movies_year ON movies(year);
    CREATE INDEX IF NOT EXISTS idx_movies_rating ON movies(rating);
    CREATE INDEX IF NOT EXISTS idx_actors_name ON actors(name);
    CREATE INDEX IF NOT EXISTS idx_movie_actors_actor ON movie_actors(actor_id)
    "#,
)];

/// Apply the embedded migration set.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    ensure_version_table(pool).await?;
    for (version, sql) in MIGRATIONS {
        apply_migration(pool, version, sql).await?;
    }
    info!("Database schema verified");
    Ok(())
}

/// Apply `*.sql` files from a directory instead of the embedded set,
/// sorted by file name. The file stem is the recorded version.
pub async fn migrate_from_dir(pool: &SqlitePool, dir: &Path) -> Result<()> {
    ensure_version_table(pool).await?;

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| DomainError::store(format!("cannot read migrations dir: {e}")))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    entries.sort();

    for path in entries {
        let version = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let sql = std::fs::read_to_string(&path)
            .map_err(|e| DomainError::store(format!("cannot read {}: {e}", path.display())))?;
        apply_migration(pool, &version, &sql).await?;
    }
    info!("Database schema verified");
    Ok(())
}

async fn ensure_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await
    .map_err(map_sqlx_err)?;
    Ok(())
}

async fn apply_migration(pool: &SqlitePool, version: &str, sql: &str) -> Result<()> {
    let applied: Option<String> =
        sqlx::query_scalar("SELECT version FROM schema_migrations WHERE version = ?")
            .bind(version)
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx_err)?;
    if applied.is_some() {
        debug!("Migration {} already applied", version);
        return Ok(());
    }

    let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
    // One statement per execute; sqlx prepares each statement individually.
    for statement in sql.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
    }
    sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
        .bind(version)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;
    tx.commit().await.map_err(map_sqlx_err)?;

    info!("Applied migration {}", version);
    Ok(())
}
