//! Font faces used for text measurement.
//!
//! Faces come from the installed system fonts, the same database the PNG and
//! PDF back ends render with, so measured widths match the rasterized text.

use std::sync::{Arc, OnceLock};

use ab_glyph::FontVec;
use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

use crate::RenderError;
use crate::primitives::{FontStyle, FontWeight};

/// Families tried in order, mirroring the SVG `font-family` fallback chain.
const FAMILIES: &[Family<'static>] = &[
    Family::Name("Helvetica"),
    Family::Name("Arial"),
    Family::Name("Liberation Sans"),
    Family::Name("DejaVu Sans"),
    Family::SansSerif,
];

static SYSTEM_DB: OnceLock<Arc<Database>> = OnceLock::new();
static SYSTEM_FONTS: OnceLock<Option<FontHandle>> = OnceLock::new();

/// The installed system fonts, scanned once per process.
pub fn system_database() -> Arc<Database> {
    SYSTEM_DB
        .get_or_init(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            tracing::debug!("{} system font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

pub struct FontHandle {
    pub regular: FontVec,
    pub bold: FontVec,
    pub italic: FontVec,
}

impl FontHandle {
    /// Sans-serif faces from the system fonts, `None` when none is installed.
    pub fn system() -> Option<&'static FontHandle> {
        SYSTEM_FONTS
            .get_or_init(|| match Self::from_database(&system_database()) {
                Ok(fonts) => Some(fonts),
                Err(e) => {
                    tracing::warn!("{e}; text widths are estimated");
                    None
                }
            })
            .as_ref()
    }

    /// Pick regular, bold and italic faces out of `db`.
    ///
    /// A missing bold or italic face falls back to the closest match fontdb finds.
    pub fn from_database(db: &Database) -> crate::Result<Self> {
        Ok(Self {
            regular: load_face(db, Weight::NORMAL, Style::Normal)?,
            bold: load_face(db, Weight::BOLD, Style::Normal)?,
            italic: load_face(db, Weight::NORMAL, Style::Italic)?,
        })
    }

    pub fn select(&self, weight: FontWeight, style: FontStyle) -> &FontVec {
        match (weight, style) {
            (FontWeight::Bold, _) => &self.bold,
            (_, FontStyle::Italic) => &self.italic,
            _ => &self.regular,
        }
    }
}

fn load_face(db: &Database, weight: Weight, style: Style) -> crate::Result<FontVec> {
    let query = Query { families: FAMILIES, weight, stretch: Stretch::Normal, style };
    let id = db
        .query(&query)
        .ok_or_else(|| RenderError::Font("no sans-serif font installed".into()))?;
    db.with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index))
        .ok_or_else(|| RenderError::Font(format!("font face {id:?} is not readable")))?
        .map_err(|e| RenderError::Font(e.to_string()))
}
