use std::sync::Arc;

use crate::{
    analytics::{AnalyticsSink, UsageEvent},
    error::ServiceError,
    limiter::RateLimiter,
    store::MappingStore,
    token,
};

/// The shortener core: create, resolve and list mappings.
///
/// Stateless at the call level — every operation re-reads and re-writes
/// through the store, and concurrent requests only meet inside it.
pub struct Shortener {
    store: Arc<dyn MappingStore>,
    limiter: Arc<dyn RateLimiter>,
    analytics: AnalyticsSink,
    slice_len: usize,
    list_page_size: u32,
}

impl Shortener {
    pub fn new(
        store: Arc<dyn MappingStore>,
        limiter: Arc<dyn RateLimiter>,
        analytics: AnalyticsSink,
        slice_len: usize,
        list_page_size: u32,
    ) -> Self {
        Self {
            store,
            limiter,
            analytics,
            slice_len,
            list_page_size,
        }
    }

    /// Derive a token for `url` and bind the pair in the store.
    ///
    /// Re-submitting an already-shortened URL succeeds with the same token
    /// and writes nothing. A token already bound to a *different* URL is a
    /// collision: the write is refused and the first mapping kept.
    pub async fn create_mapping(&self, url: &str) -> Result<String, ServiceError> {
        if url.is_empty() {
            return Err(ServiceError::Validation("url must not be empty"));
        }

        let token = token::token_for(url, self.slice_len);

        match self.store.put_if_absent(&token, url).await? {
            None => {
                tracing::info!("created mapping {} -> {}", token, url);
                Ok(token)
            }
            Some(existing) if existing == url => Ok(token),
            Some(existing) => {
                tracing::warn!(
                    "token collision on '{}': stored '{}', incoming '{}'",
                    token,
                    existing,
                    url
                );
                Err(ServiceError::Collision { token })
            }
        }
    }

    /// Resolve a token to its stored URL.
    ///
    /// The rate limiter is consulted before the store is touched; a throttled
    /// token fails with `RateLimited` even if a mapping exists. A hit emits
    /// one usage event on the side channel without awaiting it.
    pub async fn resolve(&self, token: &str) -> Result<String, ServiceError> {
        if token.is_empty() {
            return Err(ServiceError::Validation("token must not be empty"));
        }

        if !self.limiter.allow(token).await {
            return Err(ServiceError::RateLimited);
        }

        let url = self
            .store
            .get(token)
            .await?
            .ok_or(ServiceError::NotFound)?;

        self.analytics.record(UsageEvent {
            token: token.to_owned(),
            url: url.clone(),
            count: 1,
        });

        Ok(url)
    }

    /// Enumerate every mapping in the store, one `(token, url)` pair per key,
    /// in store order. Pages through the enumeration so no single call has
    /// to return the whole key set; values are re-read per key since the
    /// enumeration yields keys only.
    pub async fn list_all(&self) -> Result<Vec<(String, String)>, ServiceError> {
        let mut entries = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let page = self
                .store
                .scan_tokens(after.as_deref(), self.list_page_size)
                .await?;

            for token in page.tokens {
                if let Some(url) = self.store.get(&token).await? {
                    entries.push((token, url));
                }
            }

            match page.next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        Ok(entries)
    }
}
