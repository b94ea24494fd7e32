use std::collections::HashMap;

use crate::types::{ContentTypeFilter, YearCount};

/// Additions-per-year series already computed for the current row set,
/// one per content filter. Must be cleared whenever the rows change.
#[derive(Debug, Clone, Default)]
pub struct CacheManager {
    cache: HashMap<ContentTypeFilter, Vec<YearCount>>,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached series for `filter`, computing it on a miss
    pub fn get_or_compute(
        &mut self,
        filter: ContentTypeFilter,
        compute: impl FnOnce() -> Vec<YearCount>,
    ) -> &[YearCount] {
        self.cache.entry(filter).or_insert_with(compute)
    }

    /// Number of filters with a cached series
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
