//! Actor repository on SQLite.

use crate::store::map_sqlx_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_domain::{
    Actor, ActorCriteria, ActorId, ActorRepository, BirthYear, DomainError, MovieId, Result,
};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::collections::{BTreeSet, HashMap};

const ACTOR_COLUMNS: &str = "id, name, birth_year, bio, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ActorRow {
    id: i64,
    name: String,
    birth_year: Option<i64>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ActorRow {
    fn into_actor(self, movie_ids: BTreeSet<MovieId>) -> Result<Actor> {
        let birth_year = self
            .birth_year
            .map(|y| BirthYear::new(y as i32))
            .transpose()?;
        Ok(Actor::from_store(
            ActorId::new(self.id)?,
            self.name,
            birth_year,
            self.bio,
            movie_ids,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// SQLite-backed [`ActorRepository`].
#[derive(Clone)]
pub struct SqliteActorRepository {
    pool: SqlitePool,
}

impl SqliteActorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Link-table memberships for a batch of actors in one query.
    async fn movie_ids_for(&self, actor_ids: &[i64]) -> Result<HashMap<i64, BTreeSet<MovieId>>> {
        let mut map: HashMap<i64, BTreeSet<MovieId>> = HashMap::new();
        if actor_ids.is_empty() {
            return Ok(map);
        }

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT actor_id, movie_id FROM movie_actors WHERE actor_id IN (");
        let mut separated = qb.separated(", ");
        for id in actor_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64, i64)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        for (actor_id, movie_id) in rows {
            map.entry(actor_id)
                .or_default()
                .insert(MovieId::new(movie_id)?);
        }
        Ok(map)
    }

    async fn hydrate(&self, rows: Vec<ActorRow>) -> Result<Vec<Actor>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut links = self.movie_ids_for(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let movie_ids = links.remove(&row.id).unwrap_or_default();
                row.into_actor(movie_ids)
            })
            .collect()
    }

    fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, criteria: &'a ActorCriteria) {
        if let Some(ref name) = criteria.name {
            qb.push(" AND name LIKE ")
                .push_bind(like_pattern(name))
                .push(" ESCAPE '\\'");
        }
        if let Some(min) = criteria.min_birth_year {
            qb.push(" AND birth_year >= ").push_bind(min);
        }
        if let Some(max) = criteria.max_birth_year {
            qb.push(" AND birth_year <= ").push_bind(max);
        }
        if let Some(movie_id) = criteria.movie_id {
            qb.push(" AND EXISTS (SELECT 1 FROM movie_actors WHERE movie_actors.actor_id = actors.id AND movie_actors.movie_id = ")
                .push_bind(movie_id)
                .push(")");
        }
    }
}

#[async_trait]
impl ActorRepository for SqliteActorRepository {
    async fn find_by_id(&self, id: ActorId) -> Result<Actor> {
        let row: Option<ActorRow> =
            sqlx::query_as(&format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE id = ?"))
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        let row = row.ok_or_else(|| DomainError::not_found("actor", id.to_string()))?;

        let links = self.movie_ids_for(&[row.id]).await?;
        let movie_ids = links.get(&row.id).cloned().unwrap_or_default();
        row.into_actor(movie_ids)
    }

    async fn save(&self, mut actor: Actor) -> Result<Actor> {
        if actor.id().is_zero() {
            let result = sqlx::query(
                r#"
                INSERT INTO actors (name, birth_year, bio, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(actor.name())
            .bind(actor.birth_year().map(|y| y.value()))
            .bind(actor.bio())
            .bind(actor.created_at().to_rfc3339())
            .bind(actor.updated_at().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

            actor.assign_id(ActorId::new(result.last_insert_rowid())?)?;
            Ok(actor)
        } else {
            let affected = sqlx::query(
                r#"
                UPDATE actors
                SET name = ?, birth_year = ?, bio = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(actor.name())
            .bind(actor.birth_year().map(|y| y.value()))
            .bind(actor.bio())
            .bind(actor.updated_at().to_rfc3339())
            .bind(actor.id().value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();

            if affected == 0 {
                return Err(DomainError::not_found("actor", actor.id().to_string()));
            }
            Ok(actor)
        }
    }

    async fn delete(&self, id: ActorId) -> Result<()> {
        let affected = sqlx::query("DELETE FROM actors WHERE id = ?")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();
        if affected == 0 {
            return Err(DomainError::not_found("actor", id.to_string()));
        }
        Ok(())
    }

    async fn find_by_criteria(&self, criteria: &ActorCriteria) -> Result<Vec<Actor>> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE 1=1"));
        Self::push_filters(&mut qb, criteria);
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            criteria.order_by.as_sql(),
            criteria.order_dir.as_sql()
        ));
        qb.push(" LIMIT ")
            .push_bind(criteria.limit)
            .push(" OFFSET ")
            .push_bind(criteria.offset);

        let rows: Vec<ActorRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        self.hydrate(rows).await
    }

    async fn count_by_criteria(&self, criteria: &ActorCriteria) -> Result<i64> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM actors WHERE 1=1");
        Self::push_filters(&mut qb, criteria);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(count)
    }

    async fn find_by_movie(&self, movie_id: MovieId) -> Result<Vec<Actor>> {
        let rows: Vec<ActorRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ACTOR_COLUMNS} FROM actors
            WHERE id IN (SELECT actor_id FROM movie_actors WHERE movie_id = ?)
            ORDER BY name ASC
            "#
        ))
        .bind(movie_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        self.hydrate(rows).await
    }

    async fn count_all(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM actors")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
