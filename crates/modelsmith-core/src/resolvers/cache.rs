use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use super::CacheLevel;

/// Key of a memoized ordering: the declaring type plus a member-set
/// discriminator (empty for properties, the signature for constructors).
pub(crate) type CacheKey = (TypeId, String);

pub(crate) type CacheStore<T> = Mutex<HashMap<CacheKey, Vec<T>>>;

/// Ordered-member cache whose lifetime follows a [`CacheLevel`].
pub(crate) struct OrderCache<T: 'static> {
    level: CacheLevel,
    local: CacheStore<T>,
    global: &'static LazyLock<CacheStore<T>>,
}

impl<T: Clone> OrderCache<T> {
    pub(crate) fn new(level: CacheLevel, global: &'static LazyLock<CacheStore<T>>) -> Self {
        Self {
            level,
            local: Mutex::new(HashMap::new()),
            global,
        }
    }

    pub(crate) fn level(&self) -> CacheLevel {
        self.level
    }

    pub(crate) fn get_or_compute(&self, key: CacheKey, compute: impl FnOnce() -> Vec<T>) -> Vec<T> {
        let store: &CacheStore<T> = match self.level {
            CacheLevel::None => return compute(),
            CacheLevel::PerInstance => &self.local,
            CacheLevel::Global => self.global,
        };
        if let Some(hit) = lock(store).get(&key) {
            return hit.clone();
        }
        let computed = compute();
        lock(store).insert(key, computed.clone());
        computed
    }
}

fn lock<V>(store: &Mutex<V>) -> MutexGuard<'_, V> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
