use std::{
    collections::{HashMap, hash_map::Entry},
    fmt::{Display, Formatter},
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use futures_util::{
    FutureExt,
    future::{BoxFuture, Shared},
};

use super::Error;
use crate::prelude::*;

pub type Outcome<V> = Result<Arc<V>, Error>;

/// Query result shared between all the callers of the same key.
pub type SharedOutcome<V> = Shared<BoxFuture<'static, Outcome<V>>>;

/// Memoized station queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllTime { station_id: String },
    Year { station_id: String, year: i32 },
    Month { station_id: String, year: i32, month: u32 },
}

impl CacheKey {
    pub const fn resource(&self) -> &'static str {
        match self {
            Self::AllTime { .. } => "stationAll",
            Self::Year { .. } => "stationYear",
            Self::Month { .. } => "stationMonth",
        }
    }

    pub fn station_id(&self) -> &str {
        match self {
            Self::AllTime { station_id }
            | Self::Year { station_id, .. }
            | Self::Month { station_id, .. } => station_id,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllTime { station_id } => write!(f, "{}({station_id})", self.resource()),
            Self::Year { station_id, year } => {
                write!(f, "{}({station_id}, {year})", self.resource())
            }
            Self::Month { station_id, year, month } => {
                write!(f, "{}({station_id}, {year}, {month})", self.resource())
            }
        }
    }
}

/// Single-flight memoization.
///
/// The first caller of a key installs the computation, every later caller gets the same shared
/// future, whether it is still pending or already resolved. Failures are cached as well.
/// Entries are never evicted.
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, SharedOutcome<V>>>,
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Display,
    V: Send + Sync + 'static,
{
    /// Get the existing entry, or install the one computed by `compute`.
    ///
    /// `compute` is called at most once per key and only builds the future: the work happens
    /// when any of the callers polls it. The lock is released before returning, so `compute`
    /// must not access the cache.
    pub fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> SharedOutcome<V>
    where
        F: FnOnce(&K) -> Fut,
        Fut: Future<Output = Result<V, Error>> + Send + 'static,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.entry(key) {
            Entry::Occupied(entry) => {
                trace!(key = %entry.key(), "hit");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                debug!(key = %entry.key(), "miss");
                let future = compute(entry.key()).map(|result| result.map(Arc::new)).boxed().shared();
                entry.insert(future).clone()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
