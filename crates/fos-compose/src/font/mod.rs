//! Font faces and the face cache

mod cache;
mod face;

pub use cache::{FaceCache, FaceCacheStats};
pub use face::FontFace;

#[cfg(test)]
pub(crate) use face::test_font_data;

use std::path::PathBuf;

/// Outline technology of a host font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontTechnology {
    OpenType,
    TrueType,
    Type1,
    #[default]
    Other,
}

impl FontTechnology {
    /// Whether the smart shaper can read fonts of this technology
    pub fn is_shapeable(self) -> bool {
        matches!(self, FontTechnology::OpenType | FontTechnology::TrueType)
    }
}

/// Reference to a font file on disk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FontRef {
    pub path: Option<PathBuf>,
    /// Face index inside a collection
    pub index: u32,
    pub technology: FontTechnology,
}

impl FontRef {
    pub fn new(path: impl Into<PathBuf>, technology: FontTechnology) -> Self {
        Self {
            path: Some(path.into()),
            index: 0,
            technology,
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }
}
