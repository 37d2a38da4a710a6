//! In-memory cache of calendar months.
//!
//! A reconciliation looks up seven consecutive days, which almost always
//! fall in one or two calendar months. Caching the decoded month payload
//! turns those lookups into one or two requests. Uses [`moka`] for
//! async-friendly caching with TTL and automatic eviction.
//!
//! Each [`crate::TimeServiceClient`] owns its own cache; there is no
//! process-wide instance.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::parse::RawDay;
use crate::types::Locality;

/// Maximum number of cached months per client.
const MAX_CACHE_ENTRIES: u64 = 48;

/// Cache key: normalised locality plus calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthKey {
    city: String,
    country: String,
    year: i32,
    month: u32,
    method: u8,
}

impl MonthKey {
    /// Build a key. City and country are trimmed and lowercased so
    /// `"Cairo"` and `" cairo "` share an entry.
    pub fn new(locality: &Locality, year: i32, month: u32, method: u8) -> Self {
        Self {
            city: locality.city.trim().to_lowercase(),
            country: locality.country.trim().to_lowercase(),
            year,
            month,
            method,
        }
    }
}

/// Month cache; a zero TTL disables it entirely.
#[derive(Clone)]
pub(crate) struct MonthCache {
    inner: Option<Cache<MonthKey, Arc<Vec<RawDay>>>>,
}

impl MonthCache {
    pub fn new(ttl_seconds: u64) -> Self {
        let inner = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner }
    }

    pub async fn get(&self, key: &MonthKey) -> Option<Arc<Vec<RawDay>>> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    pub async fn insert(&self, key: MonthKey, days: Arc<Vec<RawDay>>) {
        if let Some(cache) = &self.inner {
            cache.insert(key, days).await;
        }
    }
}
