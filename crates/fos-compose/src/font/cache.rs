//! Face Cache
//!
//! Keeps recently used font faces open, keyed by file path.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::{FontFace, FontRef};
use crate::config::ComposerConfig;

/// Face cache with LRU eviction
///
/// Failed loads are remembered as `None` so a broken file is not re-read on
/// every run. Entries are evicted by capacity only; there is no time based
/// expiry.
pub struct FaceCache {
    /// Cached faces (`None` for files that failed to load)
    faces: HashMap<(PathBuf, u32), Option<Arc<FontFace>>>,
    /// Maximum entries
    capacity: usize,
    /// Usage order for LRU (key -> last_used)
    usage: HashMap<(PathBuf, u32), u64>,
    /// Counter for usage tracking
    counter: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Default for FaceCache {
    fn default() -> Self {
        Self::with_config(&ComposerConfig::default())
    }
}

impl FaceCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            faces: HashMap::with_capacity(capacity),
            capacity,
            usage: HashMap::with_capacity(capacity),
            counter: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Cache sized by `config.face_cache_capacity`
    pub fn with_config(config: &ComposerConfig) -> Self {
        Self::new(config.face_cache_capacity)
    }

    /// Face for a font, loading it on a miss
    ///
    /// Returns `None` for fonts without a path, fonts the shaper cannot read
    /// and files that fail to load. Callers fall back to simple shaping.
    pub fn lookup(&mut self, font: &FontRef) -> Option<Arc<FontFace>> {
        let path = font.path.as_ref()?;
        if !font.technology.is_shapeable() {
            return None;
        }

        let key = (path.clone(), font.index);
        self.counter += 1;

        if let Some(entry) = self.faces.get(&key) {
            self.hits += 1;
            let entry = entry.clone();
            self.usage.insert(key, self.counter);
            return entry;
        }

        self.misses += 1;
        let face = match FontFace::from_file(path, font.index) {
            Ok(face) => Some(Arc::new(face)),
            Err(e) => {
                tracing::warn!("Font face unavailable, using fallback shaping: {}", e);
                None
            }
        };

        self.insert(key, face.clone());
        face
    }

    /// Insert an already loaded face
    pub fn insert_face(&mut self, font: &FontRef, face: FontFace) -> Option<Arc<FontFace>> {
        let path = font.path.clone()?;
        let face = Arc::new(face);
        self.counter += 1;
        self.insert((path, font.index), Some(Arc::clone(&face)));
        Some(face)
    }

    fn insert(&mut self, key: (PathBuf, u32), face: Option<Arc<FontFace>>) {
        while self.faces.len() >= self.capacity {
            if !self.evict_lru() {
                break;
            }
        }

        self.usage.insert(key.clone(), self.counter);
        self.faces.insert(key, face);
    }

    /// Evict least recently used entry
    fn evict_lru(&mut self) -> bool {
        let oldest = self
            .usage
            .iter()
            .min_by_key(|&(_, used)| *used)
            .map(|(k, _)| k.clone());

        match oldest {
            Some(key) => {
                tracing::debug!("Evicting font face {}", key.0.display());
                self.faces.remove(&key);
                self.usage.remove(&key);
                self.evictions += 1;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, font: &FontRef) -> bool {
        font.path
            .as_ref()
            .is_some_and(|p| self.faces.contains_key(&(p.clone(), font.index)))
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> FaceCacheStats {
        FaceCacheStats {
            size: self.faces.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            hit_rate: if self.hits + self.misses > 0 {
                self.hits as f64 / (self.hits + self.misses) as f64
            } else {
                0.0
            },
        }
    }

    pub fn clear(&mut self) {
        self.faces.clear();
        self.usage.clear();
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct FaceCacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{test_font_data, FontTechnology};

    fn missing(name: &str) -> FontRef {
        FontRef::new(format!("/nonexistent/{}.ttf", name), FontTechnology::TrueType)
    }

    #[test]
    fn test_font_without_path_is_not_cached() {
        let mut cache = FaceCache::new(4);
        assert!(cache.lookup(&FontRef::default()).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 0);
    }

    #[test]
    fn test_unshapeable_technology_is_skipped() {
        let mut cache = FaceCache::new(4);
        let font = FontRef::new("/nonexistent/a.pfb", FontTechnology::Type1);
        assert!(cache.lookup(&font).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_load_is_remembered() {
        let mut cache = FaceCache::new(4);
        let font = missing("a");

        assert!(cache.lookup(&font).is_none());
        assert!(cache.contains(&font));
        assert!(cache.lookup(&font).is_none());

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = FaceCache::new(2);
        let (a, b, c) = (missing("a"), missing("b"), missing("c"));

        cache.lookup(&a);
        cache.lookup(&b);
        // Touch `a` so `b` becomes the oldest
        cache.lookup(&a);
        cache.lookup(&c);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_capacity_from_config() {
        let config = ComposerConfig::default().face_cache_capacity(2);
        let mut cache = FaceCache::with_config(&config);
        assert_eq!(cache.stats().capacity, 2);

        cache.lookup(&missing("a"));
        cache.lookup(&missing("b"));
        cache.lookup(&missing("c"));
        assert_eq!(cache.len(), 2);

        assert_eq!(FaceCache::default().stats().capacity, 16);
    }

    #[test]
    fn test_inserted_face_is_returned() {
        let face = FontFace::from_data(test_font_data(1000, 800, -200), 0).unwrap();
        let font = FontRef::new("/fonts/inserted.ttf", FontTechnology::TrueType);
        let mut cache = FaceCache::new(4);

        let inserted = cache.insert_face(&font, face).unwrap();
        let found = cache.lookup(&font).unwrap();
        assert!(Arc::ptr_eq(&inserted, &found));
        assert_eq!(found.units_per_em(), 1000);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 0);

        assert!(cache.insert_face(&FontRef::default(), found.as_ref().clone()).is_none());
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let mut cache = FaceCache::new(0);
        cache.lookup(&missing("a"));
        cache.lookup(&missing("b"));
        assert_eq!(cache.len(), 1);
    }
}
