//! Bounded memoization caches owned by `LayoutEngine`.
//!
//! Both caches evict by capacity in insertion order (FIFO), never by recency.
//! Access is single-threaded; the engine is the only owner.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::layout::font_metrics::{GlyphMetrics, TextStyle};

/// Capacity-capped map that forgets its oldest insertion when full.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// A zero capacity disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Glyph metrics memoization
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MetricsKey {
    family: String,
    weight: u16,
    size_bits: u32,
    text: String,
}

/// Memoizing wrapper around a `GlyphMetrics` provider.
pub struct MetricsCache<M> {
    provider: M,
    widths: BoundedCache<MetricsKey, f32>,
    hits: u64,
    misses: u64,
}

impl<M: GlyphMetrics> MetricsCache<M> {
    pub fn new(provider: M, capacity: usize) -> Self {
        Self {
            provider,
            widths: BoundedCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Raw provider width, memoized.
    pub fn measure(&mut self, family: &str, weight: u16, size_px: f32, text: &str) -> f32 {
        let key = MetricsKey {
            family: family.to_string(),
            weight,
            size_bits: size_px.to_bits(),
            text: text.to_string(),
        };
        if let Some(width) = self.widths.get(&key) {
            self.hits += 1;
            return *width;
        }
        self.misses += 1;
        let width = self.provider.measure(family, weight, size_px, text);
        self.widths.insert(key, width);
        width
    }

    /// Width including the style's letter spacing.
    pub fn measure_styled(&mut self, style: &TextStyle, size_px: f32, text: &str) -> f32 {
        self.measure(&style.family, style.weight, size_px, text) + style.spacing_px(size_px, text)
    }

    pub fn clear(&mut self) {
        self.widths.clear();
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::MonoMetrics;

    #[test]
    fn test_bounded_cache_evicts_oldest_insertion() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        // Reading "a" does not protect it: eviction ignores recency.
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_bounded_cache_overwrite_keeps_size() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("a", 5);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), Some(&5));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = BoundedCache::new(0);
        cache.insert(1, 1);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_metrics_cache_memoizes_and_clears() {
        let mut cache = MetricsCache::new(MonoMetrics::default(), 16);
        let first = cache.measure("Inter", 400, 20.0, "abcd");
        let second = cache.measure("Inter", 400, 20.0, "abcd");
        assert_eq!(first, second);
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert_eq!(cache.len(), 0);
        cache.measure("Inter", 400, 20.0, "abcd");
        assert_eq!(cache.stats(), (1, 2));
    }

    #[test]
    fn test_measure_styled_includes_letter_spacing() {
        let mut cache = MetricsCache::new(MonoMetrics::default(), 16);
        let style = TextStyle::new("Inter", 400).with_letter_spacing(0.05);
        // 4 chars * 0.5em * 20px = 40, plus 4 * 0.05 * 20 = 4
        let width = cache.measure_styled(&style, 20.0, "abcd");
        assert!((width - 44.0).abs() < 1e-4);
    }
}
