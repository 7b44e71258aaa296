//! Pool setup and store-wide queries.

use crate::config::StoreConfig;
use crate::schema;
use movies_domain::{DomainError, Result};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{error, info};

/// Handle on the backing store: owns the bounded connection pool.
#[derive(Clone)]
pub struct MoviesDb {
    pool: SqlitePool,
}

/// Aggregate statistics for the stats resource.
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub total_movies: i64,
    pub total_actors: i64,
    pub average_rating: f64,
    pub movies_with_posters: i64,
    pub database_size: String,
}

impl MoviesDb {
    /// Open the store, creating the file (and parent directory) on first
    /// use. WAL journal mode and enforced foreign keys on every connection.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DomainError::store(format!("cannot create store directory: {e}"))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(map_sqlx_err)?;

        info!(path = %config.db_path.display(), "Store opened");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the embedded migration set.
    pub async fn migrate(&self) -> Result<()> {
        schema::migrate(&self.pool).await
    }

    /// Apply `*.sql` migrations from a directory.
    pub async fn migrate_from_dir(&self, dir: &Path) -> Result<()> {
        schema::migrate_from_dir(&self.pool, dir).await
    }

    /// Liveness probe used by `--health-check`.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    /// Aggregate statistics for the stats resource.
    pub async fn stats(&self) -> Result<DbStats> {
        let total_movies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        let total_actors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM actors")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        let average_rating: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating) FROM movies WHERE rating IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        let movies_with_posters: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM movies WHERE poster_url IS NOT NULL AND poster_url != ''",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        let size_bytes = self.database_size_bytes().await?;

        Ok(DbStats {
            total_movies,
            total_actors,
            average_rating: average_rating.unwrap_or(0.0),
            movies_with_posters,
            database_size: format_size(size_bytes),
        })
    }

    /// Genre label → movie count, most frequent first.
    pub async fn genre_histogram(&self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT je.value AS genre, COUNT(*) AS movie_count
            FROM movies, json_each(movies.genres) AS je
            GROUP BY je.value
            ORDER BY movie_count DESC, genre ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(rows)
    }

    async fn database_size_bytes(&self) -> Result<i64> {
        let (page_count, page_size): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT page_count FROM pragma_page_count), (SELECT page_size FROM pragma_page_size)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(page_count * page_size)
    }
}

/// Map a sqlx failure to the domain's store-unavailable category.
///
/// The SQL-level detail goes to the log; the message that travels to the
/// wire stays generic.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(ref db) = err {
        if db.kind() == sqlx::error::ErrorKind::UniqueViolation {
            return DomainError::conflict("duplicate entry");
        }
    }
    error!("Store error: {err}");
    DomainError::store("database operation failed")
}

fn format_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= MB {
        format!("{:.1} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}
