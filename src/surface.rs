//! # Drawing Surface
//!
//! The seam between layout and actual painting. The engine computes where
//! everything goes; a [`DrawingSurface`] implementation owns fonts, glyph
//! rendering, and final document bytes. The engine only ever asks it for
//! page geometry, text measurement, and primitive paint operations.
//!
//! Surfaces buffer their pages: the page-number pass revisits every page
//! through [`DrawingSurface::buffered_page_range`] and
//! [`DrawingSurface::switch_to_page`] after the content pass finishes.

use std::path::Path;

use thiserror::Error;

use crate::model::{Dash, Edges, FontVariant, LineCap, LineJoin, TextOptions};

/// An opaque failure reported by the drawing surface. Passed through to the
/// caller unmodified; the engine never retries paint operations.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SurfaceError(pub String);

/// The contiguous range of pages the surface has buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub count: usize,
}

/// Text paint state: color, size, and font variant. Pushed to the surface
/// before each node (and each restyled table cell) draws.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: String,
    pub size: f64,
    pub variant: FontVariant,
}

impl TextStyle {
    /// Engine defaults: 11pt black light.
    pub fn base(size: f64) -> Self {
        TextStyle {
            color: "#000000".to_string(),
            size,
            variant: FontVariant::Light,
        }
    }
}

/// Sizing options for a single image paint.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaintOptions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Uniform scale factor, applied by the surface.
    pub scale: Option<f64>,
    /// Fit the image inside a box, preserving aspect ratio.
    pub fit: Option<(f64, f64)>,
}

/// Stroke and fill styling for one rectangle paint.
#[derive(Debug, Clone, PartialEq)]
pub struct RectStyle {
    pub line_width: f64,
    pub line_join: LineJoin,
    pub line_cap: LineCap,
    pub dash: Option<Dash>,
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

/// The paintable canvas the engine renders onto.
///
/// Implementations are stateful and not safe for concurrent mutation; the
/// engine serializes every call. `measure_text_height` must reflect the
/// style last pushed with `set_text_style`.
pub trait DrawingSurface {
    /// Current page width in points.
    fn page_width(&self) -> f64;

    /// Current page height in points.
    fn page_height(&self) -> f64;

    /// Configured page content margins.
    fn page_margins(&self) -> Edges;

    /// Append a new page and make it the current paint target.
    fn add_page(&mut self);

    /// Set the text paint state for subsequent text operations.
    fn set_text_style(&mut self, style: &TextStyle);

    /// Height the given text occupies when wrapped at `width` (unconstrained
    /// when `None`), under the current text style.
    fn measure_text_height(&self, text: &str, width: Option<f64>) -> f64;

    fn paint_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        options: &TextOptions,
    ) -> Result<(), SurfaceError>;

    fn paint_list(
        &mut self,
        x: f64,
        y: f64,
        items: &[String],
        options: &TextOptions,
    ) -> Result<(), SurfaceError>;

    fn paint_image(
        &mut self,
        x: f64,
        y: f64,
        path: &Path,
        options: &ImagePaintOptions,
    ) -> Result<(), SurfaceError>;

    fn paint_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: &RectStyle,
    ) -> Result<(), SurfaceError>;

    /// The contiguous page range produced so far.
    fn buffered_page_range(&self) -> PageRange;

    /// Switch the paint target to an already-buffered page.
    fn switch_to_page(&mut self, index: usize) -> Result<(), SurfaceError>;
}
