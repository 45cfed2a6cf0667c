//! Font face with parsed metrics

use std::path::Path;
use std::sync::Arc;

use ttf_parser::Face;

use crate::{ComposeError, Result};

/// Loaded font face
///
/// Owns the file bytes; parsers borrow them on demand.
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
    cap_height: Option<i16>,
    x_height: Option<i16>,
}

impl FontFace {
    /// Parse a face from font data
    pub fn from_data(data: Vec<u8>, index: u32) -> std::result::Result<Self, String> {
        let face = Face::parse(&data, index).map_err(|e| e.to_string())?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let line_gap = face.line_gap();
        let cap_height = face.capital_height();
        let x_height = face.x_height();

        Ok(Self {
            data: Arc::new(data),
            index,
            units_per_em,
            ascender,
            descender,
            line_gap,
            cap_height,
            x_height,
        })
    }

    /// Read and parse a face from a file
    pub fn from_file(path: &Path, index: u32) -> Result<Self> {
        let font_load = |reason: String| ComposeError::FontLoad {
            path: path.display().to_string(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| font_load(e.to_string()))?;
        Self::from_data(data, index).map_err(font_load)
    }

    /// Raw font file bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Face index within a collection
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Design units per em
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Ascender in design units
    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    /// Descender in design units, usually negative
    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// Line gap in design units
    pub fn line_gap(&self) -> i16 {
        self.line_gap
    }

    /// Capital height, when the face has an OS/2 table
    pub fn cap_height(&self) -> Option<i16> {
        self.cap_height
    }

    /// Lowercase x height, when the face has an OS/2 table
    pub fn x_height(&self) -> Option<i16> {
        self.x_height
    }

    /// Shaping face borrowing this face's data
    pub fn rustybuzz_face(&self) -> Option<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(&self.data, self.index)
    }
}

/// Minimal TrueType data with `head`, `hhea` and `maxp` tables
#[cfg(test)]
pub(crate) fn test_font_data(units_per_em: u16, ascender: i16, descender: i16) -> Vec<u8> {
    let mut head = vec![0u8; 54];
    head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    head[18..20].copy_from_slice(&units_per_em.to_be_bytes());

    let mut hhea = vec![0u8; 36];
    hhea[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    hhea[4..6].copy_from_slice(&ascender.to_be_bytes());
    hhea[6..8].copy_from_slice(&descender.to_be_bytes());
    hhea[34..36].copy_from_slice(&1u16.to_be_bytes());

    let mut maxp = vec![0u8; 6];
    maxp[0..4].copy_from_slice(&0x0000_5000u32.to_be_bytes());
    maxp[4..6].copy_from_slice(&1u16.to_be_bytes());

    // Records must be sorted by tag
    let tables: [(&[u8; 4], Vec<u8>); 3] = [(b"head", head), (b"hhea", hhea), (b"maxp", maxp)];
    let mut data = Vec::new();
    data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    data.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    data.extend_from_slice(&[0u8; 6]);

    let mut offset = 12 + 16 * tables.len();
    for (tag, table) in &tables {
        data.extend_from_slice(*tag);
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&(offset as u32).to_be_bytes());
        data.extend_from_slice(&(table.len() as u32).to_be_bytes());
        offset += table.len();
    }
    for (_, table) in tables {
        data.extend_from_slice(&table);
    }
    data
}
