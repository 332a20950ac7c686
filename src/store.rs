use async_trait::async_trait;
use sqlx::SqlitePool;

/// One page of token enumeration. `next` carries the keyset cursor to pass
/// back as `after`, or `None` when the store has been exhausted.
#[derive(Debug, Clone)]
pub struct TokenPage {
    pub tokens: Vec<String>,
    pub next: Option<String>,
}

/// Key-value persistence contract for mappings.
///
/// The store exclusively owns persisted state; the service holds nothing in
/// memory between requests. Writes are create-only — a token is never
/// rebound or deleted through this interface.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Look up the URL bound to `token`.
    async fn get(&self, token: &str) -> anyhow::Result<Option<String>>;

    /// Atomically bind `token` to `url` unless the token is already bound.
    /// Returns `None` when this call created the mapping, or the previously
    /// stored URL when one already existed (which may equal `url`).
    async fn put_if_absent(&self, token: &str, url: &str) -> anyhow::Result<Option<String>>;

    /// Enumerate up to `limit` tokens strictly after the `after` cursor, in
    /// store order. Values are not included; callers re-read them via `get`.
    async fn scan_tokens(&self, after: Option<&str>, limit: u32) -> anyhow::Result<TokenPage>;
}

// ── SQLite backend ─────────────────────────────────────────────────────────

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingStore for SqliteStore {
    async fn get(&self, token: &str) -> anyhow::Result<Option<String>> {
        let url: Option<String> =
            sqlx::query_scalar("SELECT original_url FROM mappings WHERE token = ?1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(url)
    }

    async fn put_if_absent(&self, token: &str, url: &str) -> anyhow::Result<Option<String>> {
        // ON CONFLICT DO NOTHING makes the insert-if-absent a single atomic
        // statement, so two concurrent writers racing on one token cannot
        // both observe "absent".
        let inserted = sqlx::query(
            "INSERT INTO mappings (token, original_url) VALUES (?1, ?2)
             ON CONFLICT(token) DO NOTHING",
        )
        .bind(token)
        .bind(url)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 1 {
            return Ok(None);
        }

        // Lost to an existing row. Mappings are never deleted, so it is
        // still there to read back.
        let existing: String =
            sqlx::query_scalar("SELECT original_url FROM mappings WHERE token = ?1")
                .bind(token)
                .fetch_one(&self.pool)
                .await?;
        Ok(Some(existing))
    }

    async fn scan_tokens(&self, after: Option<&str>, limit: u32) -> anyhow::Result<TokenPage> {
        let tokens: Vec<String> = match after {
            Some(cursor) => {
                sqlx::query_scalar(
                    "SELECT token FROM mappings WHERE token > ?1 ORDER BY token LIMIT ?2",
                )
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT token FROM mappings ORDER BY token LIMIT ?1")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        // A short page means the scan is complete; a full one may have more.
        let next = if tokens.len() as u32 == limit {
            tokens.last().cloned()
        } else {
            None
        };

        Ok(TokenPage { tokens, next })
    }
}

// ── In-memory test double ──────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// BTreeMap-backed store that counts reads and actual inserts, so tests
    /// can assert how often the service touched it.
    #[derive(Default)]
    pub struct MemoryStore {
        entries: Mutex<BTreeMap<String, String>>,
        gets: AtomicUsize,
        writes: AtomicUsize,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a mapping directly, bypassing the counters.
        pub fn seed(&self, token: &str, url: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(token.to_owned(), url.to_owned());
        }

        pub fn get_count(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MappingStore for MemoryStore {
        async fn get(&self, token: &str) -> anyhow::Result<Option<String>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().get(token).cloned())
        }

        async fn put_if_absent(&self, token: &str, url: &str) -> anyhow::Result<Option<String>> {
            let mut entries = self.entries.lock().unwrap();
            match entries.get(token) {
                Some(existing) => Ok(Some(existing.clone())),
                None => {
                    entries.insert(token.to_owned(), url.to_owned());
                    self.writes.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }
            }
        }

        async fn scan_tokens(&self, after: Option<&str>, limit: u32) -> anyhow::Result<TokenPage> {
            let entries = self.entries.lock().unwrap();
            let tokens: Vec<String> = match after {
                Some(cursor) => entries
                    .range::<str, _>((
                        std::ops::Bound::Excluded(cursor),
                        std::ops::Bound::Unbounded,
                    ))
                    .take(limit as usize)
                    .map(|(k, _)| k.clone())
                    .collect(),
                None => entries.keys().take(limit as usize).cloned().collect(),
            };
            let next = if tokens.len() as u32 == limit {
                tokens.last().cloned()
            } else {
                None
            };
            Ok(TokenPage { tokens, next })
        }
    }
}
