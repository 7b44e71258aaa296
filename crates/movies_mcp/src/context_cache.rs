//! Context cache: TTL-bound, paginated search-result materializations.
//!
//! Lets the agent cursor through a large result set without repeating the
//! query. Entries are keyed by UUIDv4, live behind one read/write lock
//! (reads take the read lock, create and the sweep take the write lock),
//! and the lock is never held across I/O.

use chrono::{DateTime, Duration, Utc};
use movies_domain::{DomainError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Page size used when `create_search_context` does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound for a context page.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Cap on rows materialized into one context.
pub const MAX_MATERIALIZED_ROWS: usize = 10_000;

/// Default context lifetime: one hour.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// A materialized, TTL-bound query result.
#[derive(Debug, Clone)]
struct DataContext {
    query: Value,
    total_count: usize,
    page_size: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    data: Vec<Value>,
}

/// Metadata view of a context (`get_context_info`, and the creation result).
#[derive(Debug, Clone, Serialize)]
pub struct ContextInfo {
    pub context_id: String,
    pub query: Value,
    pub total: usize,
    pub page_size: i64,
    pub total_pages: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One page of a context (`get_context_page`).
#[derive(Debug, Clone, Serialize)]
pub struct ContextPage {
    pub context_id: String,
    pub page: i64,
    pub page_size: i64,
    pub total: usize,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub data: Vec<Value>,
}

/// In-memory cache of live contexts.
pub struct ContextCache {
    entries: RwLock<HashMap<Uuid, DataContext>>,
    ttl: Duration,
}

impl ContextCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn with_ttl_secs(secs: i64) -> Self {
        Self::new(Duration::seconds(secs))
    }

    /// Materialize a result set into a new context.
    ///
    /// Rows beyond [`MAX_MATERIALIZED_ROWS`] are dropped. The sweep of
    /// expired entries runs under the same write lock.
    pub fn create(&self, query: Value, mut data: Vec<Value>, page_size: Option<i64>) -> ContextInfo {
        data.truncate(MAX_MATERIALIZED_ROWS);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let now = Utc::now();
        let id = Uuid::new_v4();
        let context = DataContext {
            query,
            total_count: data.len(),
            page_size,
            created_at: now,
            expires_at: now + self.ttl,
            data,
        };
        let info = info_view(id, &context);

        let mut entries = self.entries.write().expect("context cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, ctx| ctx.expires_at > now);
        let reaped = before - entries.len();
        if reaped > 0 {
            debug!(reaped, "Swept expired contexts");
        }
        entries.insert(id, context);

        info
    }

    /// Read one page. An expired entry is removed synchronously and
    /// reported as expired.
    pub fn page(
        &self,
        context_id: &str,
        page: Option<i64>,
        page_size_override: Option<i64>,
    ) -> Result<ContextPage> {
        let id = parse_context_id(context_id)?;
        let entries = self.entries.read().expect("context cache lock poisoned");
        let Some(context) = entries.get(&id) else {
            return Err(DomainError::not_found("context", context_id));
        };
        if context.expires_at <= Utc::now() {
            drop(entries);
            self.remove(id);
            return Err(DomainError::not_found(
                "context",
                format!("{context_id} (expired)"),
            ));
        }

        let page_size = page_size_override
            .unwrap_or(context.page_size)
            .clamp(1, MAX_PAGE_SIZE);
        let total_pages = page_count(context.total_count, page_size);
        let page = page.unwrap_or(1).clamp(1, total_pages);

        let start = ((page - 1) * page_size) as usize;
        let end = (start + page_size as usize).min(context.total_count);
        let data = if start < context.total_count {
            context.data[start..end].to_vec()
        } else {
            Vec::new()
        };

        Ok(ContextPage {
            context_id: id.to_string(),
            page,
            page_size,
            total: context.total_count,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
            data,
        })
    }

    /// The metadata view, without the data slice.
    pub fn info(&self, context_id: &str) -> Result<ContextInfo> {
        let id = parse_context_id(context_id)?;
        let entries = self.entries.read().expect("context cache lock poisoned");
        let Some(context) = entries.get(&id) else {
            return Err(DomainError::not_found("context", context_id));
        };
        if context.expires_at <= Utc::now() {
            drop(entries);
            self.remove(id);
            return Err(DomainError::not_found(
                "context",
                format!("{context_id} (expired)"),
            ));
        }
        Ok(info_view(id, context))
    }

    /// Live entry count (expired-but-unswept entries included).
    pub fn len(&self) -> usize {
        self.entries.read().expect("context cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: Uuid) {
        let mut entries = self.entries.write().expect("context cache lock poisoned");
        entries.remove(&id);
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::with_ttl_secs(DEFAULT_TTL_SECS)
    }
}

fn parse_context_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| DomainError::validation(format!("invalid context ID: {raw}")))
}

fn info_view(id: Uuid, context: &DataContext) -> ContextInfo {
    ContextInfo {
        context_id: id.to_string(),
        query: context.query.clone(),
        total: context.total_count,
        page_size: context.page_size,
        total_pages: page_count(context.total_count, context.page_size),
        created_at: context.created_at,
        expires_at: context.expires_at,
    }
}

fn page_count(total: usize, page_size: i64) -> i64 {
    let pages = (total as i64 + page_size - 1) / page_size;
    pages.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"i": i})).collect()
    }

    #[test]
    fn test_create_and_page_math() {
        let cache = ContextCache::default();
        let info = cache.create(json!({"genre": "Drama"}), rows(125), Some(50));
        assert_eq!(info.total, 125);
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.expires_at, info.created_at + Duration::seconds(3600));

        let page1 = cache.page(&info.context_id, Some(1), None).unwrap();
        assert_eq!(page1.data.len(), 50);
        assert!(page1.has_next);
        assert!(!page1.has_previous);

        let page3 = cache.page(&info.context_id, Some(3), None).unwrap();
        assert_eq!(page3.data.len(), 25);
        assert!(!page3.has_next);
        assert!(page3.has_previous);
    }

    #[test]
    fn test_pages_concatenate_to_materialized_data() {
        let cache = ContextCache::default();
        let info = cache.create(json!({}), rows(7), Some(3));
        let mut seen = Vec::new();
        for page in 1..=info.total_pages {
            let p = cache.page(&info.context_id, Some(page), None).unwrap();
            assert_eq!(p.has_next, page < info.total_pages);
            seen.extend(p.data);
        }
        assert_eq!(seen, rows(7));
    }

    #[test]
    fn test_page_and_size_clamped() {
        let cache = ContextCache::default();
        let info = cache.create(json!({}), rows(10), Some(5000));
        assert_eq!(info.page_size, MAX_PAGE_SIZE);

        // Page beyond the end clamps to the last page; page 0 clamps to 1.
        let p = cache.page(&info.context_id, Some(99), Some(4)).unwrap();
        assert_eq!(p.page, 3);
        assert_eq!(p.data.len(), 2);
        let p = cache.page(&info.context_id, Some(0), Some(4)).unwrap();
        assert_eq!(p.page, 1);
    }

    #[test]
    fn test_materialization_cap() {
        let cache = ContextCache::default();
        let info = cache.create(json!({}), rows(MAX_MATERIALIZED_ROWS + 5), None);
        assert_eq!(info.total, MAX_MATERIALIZED_ROWS);
    }

    #[test]
    fn test_expired_read_reaps_entry() {
        let cache = ContextCache::with_ttl_secs(-1);
        let info = cache.create(json!({}), rows(3), None);
        assert_eq!(cache.len(), 1);

        let err = cache.page(&info.context_id, Some(1), None).unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert!(err.to_string().contains("expired"));
        assert_eq!(cache.len(), 0);

        let err = cache.info(&info.context_id).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_create_sweeps_expired() {
        let cache = ContextCache::with_ttl_secs(-1);
        cache.create(json!({}), rows(1), None);
        cache.create(json!({}), rows(1), None);
        // Each create reaps the previous, already-expired entry.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unknown_and_malformed_ids() {
        let cache = ContextCache::default();
        let err = cache.info("not-a-uuid").unwrap_err();
        assert_eq!(err.kind(), "validation");
        let err = cache
            .info("00000000-0000-4000-8000-000000000000")
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_info_has_no_data_slice() {
        let cache = ContextCache::default();
        let info = cache.create(json!({"q": 1}), rows(4), Some(2));
        let loaded = cache.info(&info.context_id).unwrap();
        assert_eq!(loaded.total, 4);
        assert_eq!(loaded.total_pages, 2);
        assert_eq!(loaded.query, json!({"q": 1}));
    }
}
