//! # Lamina
//!
//! A layout and pagination engine.
//!
//! Lamina takes a declarative tree of boxes, stacking containers, tables,
//! text and barcodes and turns it into a flat list of drawing primitives
//! with absolute positions and sizes, broken into pages. Renderers (HTML,
//! PDF, thermal label printer command streams) only read that list; no
//! layout logic lives downstream.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Document tree: nodes, sizes, fonts, content
//!       ↓
//!   [layout]   Box-model solver over an infinitely tall canvas
//!       ↓        (uses [text] for wrapping, [font] for metrics)
//!   [pager]    Page windows, repeated templates, split text
//!       ↓
//!   Vec<Draw>
//! ```
//!
//! All lengths are device units ("dots"). Font sizes are points and are
//! converted with the configured resolution, see [`units`].

pub mod config;
pub mod error;
pub mod font;
pub mod geom;
pub mod layout;
pub mod markup;
pub mod model;
pub mod pager;
pub mod text;
pub mod units;

use log::debug;

pub use config::Config;
pub use error::{Error, Result};
use font::FontManager;
use layout::Layouter;
use model::Document;
pub use pager::Draw;

/// Lay out and paginate a document.
///
/// This is the primary entry point. Registers the document's fonts, lays
/// out the tree and returns the flat draw list, with a page marker between
/// consecutive pages.
pub fn layout_document(document: &Document) -> Result<Vec<Draw>> {
    let config = &document.config;
    config.validate()?;

    let mut fonts = FontManager::new(config.units());
    for entry in &document.fonts {
        fonts.register_source(&entry.name, &entry.src)?;
        if let Some(base) = &entry.variant_of {
            fonts.register_variant(base, entry.style, &entry.name);
        }
    }

    let layouter = Layouter::new(&fonts);
    let root = layouter.layout_root(&document.root, config)?;
    debug!("laid out {:?} root at {:?}", root.kind, root.calc);
    pager::paginate(&root, config)
}

/// Lay out a document described as JSON, returning the draw list as JSON.
pub fn render_json(json: &str) -> Result<String> {
    let document: Document = serde_json::from_str(json)?;
    let draws = layout_document(&document)?;
    Ok(serde_json::to_string_pretty(&draws)?)
}
