use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::debug;

use super::types::YearlyForecast;
use crate::error::Result;

/// Identifies one cached scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub year: i32,
    /// Changes whenever the provider's numerics change
    pub provider_version: String,
}

impl CacheKey {
    pub fn new(year: i32, provider_version: impl Into<String>) -> Self {
        Self {
            year,
            provider_version: provider_version.into(),
        }
    }
}

struct Entry {
    forecast: Arc<YearlyForecast>,
    inserted: Instant,
}

/// Read-through cache for yearly forecasts, owned by the caller.
pub struct ForecastCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl ForecastCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live entry for `key`; an expired entry is dropped.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<YearlyForecast>> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        match entries.get(key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => Some(entry.forecast.clone()),
            Some(_) => {
                debug!("Forecast cache entry for {:?} expired", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: CacheKey, forecast: YearlyForecast) -> Arc<YearlyForecast> {
        let forecast = Arc::new(forecast);
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted.elapsed() < ttl);
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            Entry {
                forecast: forecast.clone(),
                inserted: Instant::now(),
            },
        );
        forecast
    }

    /// Return the cached forecast or compute and store it.
    ///
    /// The lock is not held while computing, so concurrent misses for the
    /// same key may both compute; the later result wins.
    pub fn get_or_try_insert_with<F>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<Arc<YearlyForecast>>
    where
        F: FnOnce() -> Result<YearlyForecast>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let forecast = compute()?;
        Ok(self.insert(key, forecast))
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
