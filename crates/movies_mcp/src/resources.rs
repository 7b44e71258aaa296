//! Resource handlers.
//!
//! Three fixed resources with URI-string identity, dispatched by equality.
//! The dump and stats payloads are JSON text. The poster collection leads
//! with its JSON metadata array, then carries one base64 `blob` element per
//! poster whose URI the server can read from local disk; remote poster URIs
//! stay metadata-only (the server never downloads images).

use crate::protocol::{ResourceContent, ResourceDescriptor, ResourcesReadResult};
use crate::service::MovieService;
use movies_domain::{DomainError, MovieCriteria, Result};
use movies_db::MoviesDb;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::debug;

/// Full movie dump.
pub const URI_ALL: &str = "movies://database/all";

/// Database statistics.
pub const URI_STATS: &str = "movies://database/stats";

/// Poster collection (metadata plus locally-readable poster bytes).
pub const URI_POSTERS: &str = "movies://posters/collection";

const JSON_MIME: &str = "application/json";

/// Cap on rows in the full dump resource.
const DUMP_LIMIT: usize = 10_000;

/// Registry of the fixed resource set.
pub struct ResourceRegistry {
    movies: MovieService,
    db: MoviesDb,
}

impl ResourceRegistry {
    pub fn new(movies: MovieService, db: MoviesDb) -> Self {
        Self { movies, db }
    }

    /// Descriptors for resources/list.
    pub fn list(&self) -> Vec<ResourceDescriptor> {
        vec![
            ResourceDescriptor {
                uri: URI_ALL.to_string(),
                name: "All Movies".to_string(),
                description: "Complete dump of the movie database".to_string(),
                mime_type: JSON_MIME.to_string(),
            },
            ResourceDescriptor {
                uri: URI_STATS.to_string(),
                name: "Database Statistics".to_string(),
                description: "Movie counts, average rating, genre histogram, and store size"
                    .to_string(),
                mime_type: JSON_MIME.to_string(),
            },
            ResourceDescriptor {
                uri: URI_POSTERS.to_string(),
                name: "Poster Collection".to_string(),
                description: "Poster metadata and image bytes for movies that have one"
                    .to_string(),
                mime_type: JSON_MIME.to_string(),
            },
        ]
    }

    /// Dispatch a resources/read by URI equality.
    pub async fn read(&self, uri: &str) -> Result<ResourcesReadResult> {
        match uri {
            URI_ALL => text_contents(uri, &self.read_all().await?),
            URI_STATS => text_contents(uri, &self.read_stats().await?),
            URI_POSTERS => self.read_posters().await,
            _ => Err(DomainError::validation(format!(
                "unknown resource URI: {uri}"
            ))),
        }
    }

    async fn read_all(&self) -> Result<Value> {
        let movies = self
            .movies
            .materialize(MovieCriteria::all(), DUMP_LIMIT)
            .await?;
        Ok(serde_json::to_value(movies).unwrap_or(Value::Null))
    }

    async fn read_stats(&self) -> Result<Value> {
        let stats = self.db.stats().await?;
        let mut genres = Map::new();
        for (label, count) in self.db.genre_histogram().await? {
            genres.insert(label, Value::from(count));
        }
        Ok(json!({
            "total_movies": stats.total_movies,
            "total_actors": stats.total_actors,
            "average_rating": stats.average_rating,
            "genres": genres,
            "movies_with_posters": stats.movies_with_posters,
            "database_size": stats.database_size,
        }))
    }

    /// Metadata array first, then the binary payloads: every poster whose
    /// URI resolves to a readable local file is base64-encoded into a
    /// `blob` element. An unreadable file drops only its own blob.
    async fn read_posters(&self) -> Result<ResourcesReadResult> {
        let movies = self
            .movies
            .materialize(MovieCriteria::all(), DUMP_LIMIT)
            .await?;

        let mut metadata = Vec::new();
        let mut blobs = Vec::new();
        for movie in movies {
            let Some(uri) = movie.poster_url.clone() else {
                continue;
            };
            let mime_type = poster_mime_type(&uri);
            metadata.push(json!({
                "movie_id": movie.id,
                "title": movie.title,
                "director": movie.director,
                "year": movie.year,
                "poster_uri": uri,
                "mime_type": mime_type,
            }));

            if let Some(path) = local_poster_path(&uri) {
                match std::fs::read(&path) {
                    Ok(bytes) => blobs.push(ResourceContent::blob(&uri, mime_type, &bytes)),
                    Err(e) => debug!("Skipping unreadable poster {}: {e}", path.display()),
                }
            }
        }

        let text = serde_json::to_string(&metadata)
            .map_err(|e| DomainError::store(e.to_string()))?;
        let mut contents = vec![ResourceContent::text(URI_POSTERS, JSON_MIME, text)];
        contents.extend(blobs);
        Ok(ResourcesReadResult { contents })
    }
}

fn text_contents(uri: &str, payload: &Value) -> Result<ResourcesReadResult> {
    let text = serde_json::to_string(payload).map_err(|e| DomainError::store(e.to_string()))?;
    Ok(ResourcesReadResult {
        contents: vec![ResourceContent::text(uri, JSON_MIME, text)],
    })
}

/// A poster URI the server can read bytes from: a `file://` URI or a bare
/// filesystem path. Anything with a remote scheme stays metadata-only.
fn local_poster_path(uri: &str) -> Option<PathBuf> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if uri.contains("://") {
        return None;
    }
    Some(PathBuf::from(uri))
}

/// Guess a poster's MIME type from its URI extension.
fn poster_mime_type(uri: &str) -> &'static str {
    let lower = uri.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_mime_type() {
        assert_eq!(poster_mime_type("https://x/p.PNG"), "image/png");
        assert_eq!(poster_mime_type("https://x/p.webp"), "image/webp");
        assert_eq!(poster_mime_type("https://x/p.jpg"), "image/jpeg");
        assert_eq!(poster_mime_type("https://x/p"), "image/jpeg");
    }

    #[test]
    fn test_local_poster_path() {
        assert_eq!(
            local_poster_path("file:///var/posters/heat.jpg"),
            Some(PathBuf::from("/var/posters/heat.jpg"))
        );
        assert_eq!(
            local_poster_path("/var/posters/heat.jpg"),
            Some(PathBuf::from("/var/posters/heat.jpg"))
        );
        assert_eq!(local_poster_path("https://example.com/p.jpg"), None);
        assert_eq!(local_poster_path("s3://bucket/p.jpg"), None);
    }
}
