//! # Folio
//!
//! A declarative document layout engine.
//!
//! You hand Folio a document description, an ordered tree of text, list,
//! image and table components, and it turns that into a paginated layout
//! on a [`surface::DrawingSurface`] you provide. The engine owns the hard
//! parts: distributing table column widths, measuring variable-height cell
//! content, growing rows to fit, and moving rows wholesale to the next page
//! when they would overflow. The surface owns fonts, glyphs, and final
//! document bytes.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]     — Document tree: content nodes, tables, cells, styles
//!       ↓
//!   [resolver]  — Prefetch every image URL, concurrently, before layout
//!       ↓
//!   [layout]    — Cursor-threaded layout; table engine; pagination
//!       ↓
//!   [surface]   — Your paint target (measure text, paint primitives)
//! ```
//!
//! Image resolution is the only parallel stage, and it has a hard barrier:
//! layout never reads an image's properties until every referenced URL has
//! resolved. Layout itself is strictly sequential: each node mutates the
//! shared cursor before the next one renders.

pub mod error;
pub mod layout;
pub mod model;
pub mod resolver;
pub mod surface;

use std::sync::Arc;

pub use error::FolioError;
pub use layout::{Cursor, Renderer};
pub use model::Document;
pub use resolver::{HttpFetcher, ImageFetcher, ImageResolver, ImageStore};
pub use surface::DrawingSurface;

/// Parse a JSON document description.
pub fn parse_document(json: &str) -> Result<Document, FolioError> {
    Ok(serde_json::from_str(json)?)
}

/// Render a document onto a surface.
///
/// This is the primary entry point: resolves every referenced image (the
/// barrier), runs the sequential layout pass, then stamps page numbers.
/// The temporary image artifacts are released when this returns, whether
/// rendering succeeded or failed.
pub async fn render<S: DrawingSurface>(
    doc: &Document,
    surface: &mut S,
    fetcher: Arc<dyn ImageFetcher>,
) -> Result<(), FolioError> {
    let images = ImageResolver::new(fetcher).resolve(doc).await?;
    let mut renderer = Renderer::new(surface, &images);
    renderer.render_document(doc)
}

/// Render a document described as JSON onto a surface.
pub async fn render_json<S: DrawingSurface>(
    json: &str,
    surface: &mut S,
    fetcher: Arc<dyn ImageFetcher>,
) -> Result<(), FolioError> {
    let doc = parse_document(json)?;
    render(&doc, surface, fetcher).await
}
