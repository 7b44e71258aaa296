//! Actor↔movie link repository on SQLite.
//!
//! Link and unlink wrap the companion aggregate lookups and the link-table
//! mutation in one transaction, so a concurrently deleted movie or actor
//! cannot leave a dangling link behind.

use crate::store::map_sqlx_err;
use async_trait::async_trait;
use movies_domain::{ActorId, DomainError, LinkRepository, MovieId, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// SQLite-backed [`LinkRepository`].
#[derive(Clone)]
pub struct SqliteLinkRepository {
    pool: SqlitePool,
}

impl SqliteLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn require_movie(tx: &mut Transaction<'_, Sqlite>, movie_id: MovieId) -> Result<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM movies WHERE id = ?")
            .bind(movie_id.value())
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx_err)?;
        if exists.is_none() {
            return Err(DomainError::not_found("movie", movie_id.to_string()));
        }
        Ok(())
    }

    async fn require_actor(tx: &mut Transaction<'_, Sqlite>, actor_id: ActorId) -> Result<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM actors WHERE id = ?")
            .bind(actor_id.value())
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx_err)?;
        if exists.is_none() {
            return Err(DomainError::not_found("actor", actor_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn link(&self, movie_id: MovieId, actor_id: ActorId) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        Self::require_movie(&mut tx, movie_id).await?;
        Self::require_actor(&mut tx, actor_id).await?;

        let result = sqlx::query(
            "INSERT INTO movie_actors (movie_id, actor_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(movie_id.value())
        .bind(actor_id.value())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(err) => {
                return Err(match map_sqlx_err(err) {
                    DomainError::Conflict(_) => DomainError::conflict(format!(
                        "actor {actor_id} is already linked to movie {movie_id}"
                    )),
                    other => other,
                });
            }
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn unlink(&self, movie_id: MovieId, actor_id: ActorId) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        Self::require_movie(&mut tx, movie_id).await?;
        Self::require_actor(&mut tx, actor_id).await?;

        let affected = sqlx::query("DELETE FROM movie_actors WHERE movie_id = ? AND actor_id = ?")
            .bind(movie_id.value())
            .bind(actor_id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();

        if affected == 0 {
            return Err(DomainError::not_found(
                "link",
                format!("actor {actor_id} / movie {movie_id}"),
            ));
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_by_actor(&self, actor_id: ActorId) -> Result<Vec<MovieId>> {
        let rows: Vec<i64> = sqlx::query_scalar(
            "SELECT movie_id FROM movie_actors WHERE actor_id = ? ORDER BY movie_id ASC",
        )
        .bind(actor_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(MovieId::new).collect()
    }
}
