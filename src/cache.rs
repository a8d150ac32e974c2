//! Process-local memoization of normalized weather results
//!
//! Keyed by (location, start date, end date) at day granularity. Entries
//! are immutable once stored and never expire within a process run; the
//! cache is best-effort and owned by the process bootstrap, not a global.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{DateRange, TripWeather};

/// In-memory weather cache with an injected lifetime
#[derive(Default)]
pub struct WeatherCache {
    entries: Mutex<HashMap<String, Arc<TripWeather>>>,
}

impl WeatherCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached payload for a key, or run `fetch` and store its
    /// result on success
    ///
    /// A failed fetch leaves no entry behind (no negative caching).
    /// Concurrent misses for the same key may each call the provider; the
    /// result is idempotent to refetch, so no in-flight guard is held.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        location: &str,
        range: DateRange,
        fetch: F,
    ) -> crate::Result<Arc<TripWeather>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<TripWeather>>,
    {
        let key = range.cache_key(location);

        if let Some(cached) = self.entries.lock().await.get(&key) {
            debug!("Weather cache hit for {key}");
            return Ok(Arc::clone(cached));
        }

        debug!("Weather cache miss for {key}");
        let weather = Arc::new(fetch().await?);
        self.entries
            .lock()
            .await
            .insert(key, Arc::clone(&weather));
        Ok(weather)
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
