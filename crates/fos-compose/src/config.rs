//! Composer Configuration

/// Composer configuration options
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Maximum number of faces kept open by the face cache
    pub face_cache_capacity: usize,

    /// Maximum propose/fill/check rounds for one line before giving up
    pub max_line_attempts: usize,

    /// Maximum consecutive `TileQuery::Retry` answers accepted from the host
    pub max_tile_queries: usize,

    /// Divisor applied to the desired width to get the fallback break target
    pub fallback_stretch_factor: f32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            face_cache_capacity: 16,
            max_line_attempts: 4,
            max_tile_queries: 8,
            fallback_stretch_factor: 1.2,
        }
    }
}

impl ComposerConfig {
    /// Set the face cache capacity
    pub fn face_cache_capacity(mut self, capacity: usize) -> Self {
        self.face_cache_capacity = capacity;
        self
    }

    /// Set the retry bound for line geometry
    pub fn max_line_attempts(mut self, attempts: usize) -> Self {
        self.max_line_attempts = attempts.max(1);
        self
    }

    /// Set how many `TileQuery::Retry` answers one proposal accepts
    pub fn max_tile_queries(mut self, queries: usize) -> Self {
        self.max_tile_queries = queries.max(1);
        self
    }

    /// Set the fallback stretch factor used by the break search
    pub fn fallback_stretch_factor(mut self, factor: f32) -> Self {
        if factor > 0.0 {
            self.fallback_stretch_factor = factor;
        }
        self
    }
}
