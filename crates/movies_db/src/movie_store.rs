//! Movie repository on SQLite.

use crate::store::map_sqlx_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_domain::{
    DomainError, Genre, Movie, MovieCriteria, MovieId, MovieRepository, Rating, ReleaseYear,
    Result,
};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

const MOVIE_COLUMNS: &str =
    "id, title, director, year, rating, genres, poster_url, created_at, updated_at";

#[derive(Debug, FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    director: String,
    year: i64,
    rating: Option<f64>,
    genres: String,
    poster_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MovieRow {
    fn into_movie(self) -> Result<Movie> {
        let labels: Vec<String> = serde_json::from_str(&self.genres)
            .map_err(|_| DomainError::store(format!("corrupt genres column on movie {}", self.id)))?;
        let genres = labels
            .into_iter()
            .map(Genre::new)
            .collect::<Result<Vec<_>>>()?;
        let rating = self.rating.map(Rating::new).transpose()?;
        Ok(Movie::from_store(
            MovieId::new(self.id)?,
            self.title,
            self.director,
            ReleaseYear::new(self.year as i32)?,
            rating,
            genres,
            self.poster_url,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// SQLite-backed [`MovieRepository`].
#[derive(Clone)]
pub struct SqliteMovieRepository {
    pool: SqlitePool,
}

impl SqliteMovieRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, criteria: &'a MovieCriteria) {
        if let Some(ref title) = criteria.title {
            qb.push(" AND title LIKE ")
                .push_bind(like_pattern(title))
                .push(" ESCAPE '\\'");
        }
        if let Some(ref director) = criteria.director {
            qb.push(" AND director LIKE ")
                .push_bind(like_pattern(director))
                .push(" ESCAPE '\\'");
        }
        if let Some(ref genre) = criteria.genre {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(movies.genres) WHERE json_each.value = ")
                .push_bind(genre.clone())
                .push(")");
        }
        if let Some(min_year) = criteria.min_year {
            qb.push(" AND year >= ").push_bind(min_year);
        }
        if let Some(max_year) = criteria.max_year {
            qb.push(" AND year <= ").push_bind(max_year);
        }
        if let Some(min_rating) = criteria.min_rating {
            qb.push(" AND rating >= ").push_bind(min_rating);
        }
        if let Some(max_rating) = criteria.max_rating {
            qb.push(" AND rating <= ").push_bind(max_rating);
        }
    }
}

#[async_trait]
impl MovieRepository for SqliteMovieRepository {
    async fn find_by_id(&self, id: MovieId) -> Result<Movie> {
        let row: Option<MovieRow> =
            sqlx::query_as(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?"))
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        row.ok_or_else(|| DomainError::not_found("movie", id.to_string()))?
            .into_movie()
    }

    async fn save(&self, mut movie: Movie) -> Result<Movie> {
        let genres_json = serde_json::to_string(
            &movie.genres().iter().map(Genre::as_str).collect::<Vec<_>>(),
        )
        .map_err(|e| DomainError::store(e.to_string()))?;

        if movie.id().is_zero() {
            let result = sqlx::query(
                r#"
                INSERT INTO movies (title, director, year, rating, genres, poster_url, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(movie.title())
            .bind(movie.director())
            .bind(movie.year().value())
            .bind(movie.rating().map(|r| r.value()))
            .bind(&genres_json)
            .bind(movie.poster_url())
            .bind(movie.created_at().to_rfc3339())
            .bind(movie.updated_at().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

            movie.assign_id(MovieId::new(result.last_insert_rowid())?)?;
            Ok(movie)
        } else {
            let affected = sqlx::query(
                r#"
                UPDATE movies
                SET title = ?, director = ?, year = ?, rating = ?, genres = ?, poster_url = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(movie.title())
            .bind(movie.director())
            .bind(movie.year().value())
            .bind(movie.rating().map(|r| r.value()))
            .bind(&genres_json)
            .bind(movie.poster_url())
            .bind(movie.updated_at().to_rfc3339())
            .bind(movie.id().value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();

            if affected == 0 {
                return Err(DomainError::not_found("movie", movie.id().to_string()));
            }
            Ok(movie)
        }
    }

    async fn delete(&self, id: MovieId) -> Result<()> {
        // Links go with the row via ON DELETE CASCADE.
        let affected = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();
        if affected == 0 {
            return Err(DomainError::not_found("movie", id.to_string()));
        }
        Ok(())
    }

    async fn find_by_criteria(&self, criteria: &MovieCriteria) -> Result<Vec<Movie>> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE 1=1"));
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

        let rows: Vec<MovieRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        rows.into_iter().map(MovieRow::into_movie).collect()
    }

    async fn count_by_criteria(&self, criteria: &MovieCriteria) -> Result<i64> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM movies WHERE 1=1");
        Self::push_filters(&mut qb, criteria);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(count)
    }

    async fn find_by_director(&self, director: &str, limit: i64) -> Result<Vec<Movie>> {
        // Exact comparison under the default BINARY collation, so the cap
        // bounds the director's own rows rather than a substring superset.
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            r#"
            SELECT {MOVIE_COLUMNS} FROM movies
            WHERE director = ?
            ORDER BY year ASC, title ASC
            LIMIT ?
            "#
        ))
        .bind(director)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(MovieRow::into_movie).collect()
    }

    async fn find_top_rated(&self, limit: i64) -> Result<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            r#"
            SELECT {MOVIE_COLUMNS} FROM movies
            WHERE rating IS NOT NULL
            ORDER BY rating DESC, title ASC
            LIMIT ?
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.into_iter().map(MovieRow::into_movie).collect()
    }

    async fn count_all(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }
}

/// Substring pattern for a LIKE filter, with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern("matrix"), "%matrix%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
