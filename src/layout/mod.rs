//! # Layout Engine
//!
//! Walks the document top to bottom, threading an explicit cursor through
//! every render routine. Each node may pin itself to absolute coordinates;
//! otherwise it continues the flow at the cursor. Margins shift the cursor
//! before and after each node.
//!
//! Layout is strictly sequential: a node's render mutates the cursor before
//! the next node begins, and tables advance page by page through the same
//! cursor. The one parallel stage, image resolution, has already finished
//! by the time this module runs.

pub mod page_number;
pub mod table;

use crate::error::FolioError;
use crate::model::{ContentKind, ContentNode, Document, Margin, TextOptions};
use crate::resolver::{ImageProperties, ImageStore};
use crate::surface::{DrawingSurface, TextStyle};

/// Default font size when a node doesn't set one.
pub const DEFAULT_FONT_SIZE: f64 = 11.0;

/// The current draw position on the active page.
///
/// `x` returns to a component's start after it renders; `y` only ever
/// increases within a page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

impl Cursor {
    /// Explicit coordinates are absolute overrides; omitted coordinates
    /// continue the flow layout.
    pub fn resolve(&self, x: Option<f64>, y: Option<f64>) -> Cursor {
        Cursor {
            x: x.unwrap_or(self.x),
            y: y.unwrap_or(self.y),
        }
    }

    /// Applied before a node renders. A 4-tuple margin adds its left value
    /// to x and its top value to y; a scalar adds to both axes.
    pub fn apply_margin_top(&mut self, margin: &Margin) {
        match *margin {
            Margin::Uniform(m) => {
                self.x += m;
                self.y += m;
            }
            Margin::Edges([left, top, _, _]) => {
                self.x += left;
                self.y += top;
            }
        }
    }

    /// Applied after a node renders. A 4-tuple margin subtracts its left
    /// value from x (returning the horizontal cursor to baseline) and adds
    /// its bottom value to y; a scalar adds to both axes.
    pub fn apply_margin_bottom(&mut self, margin: &Margin) {
        match *margin {
            Margin::Uniform(m) => {
                self.x += m;
                self.y += m;
            }
            Margin::Edges([left, _, _, bottom]) => {
                self.x -= left;
                self.y += bottom;
            }
        }
    }
}

/// Renders a document onto a drawing surface.
///
/// Owns the cursor for one in-progress layout and reads resolved image
/// metadata from the (already populated) store.
pub struct Renderer<'a, S: DrawingSurface> {
    pub(crate) surface: &'a mut S,
    pub(crate) images: &'a ImageStore,
    pub(crate) cursor: Cursor,
    pub(crate) base_font_size: f64,
}

impl<'a, S: DrawingSurface> Renderer<'a, S> {
    pub fn new(surface: &'a mut S, images: &'a ImageStore) -> Self {
        let margins = surface.page_margins();
        Renderer {
            surface,
            images,
            cursor: Cursor {
                x: margins.left,
                y: margins.top,
            },
            base_font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Override the default font size used when nodes don't set one.
    pub fn with_base_font_size(mut self, size: f64) -> Self {
        self.base_font_size = size;
        self
    }

    /// The current cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Render the full document: every content node in order, then the
    /// page-number pass over all produced pages.
    pub fn render_document(&mut self, doc: &Document) -> Result<(), FolioError> {
        for node in &doc.content {
            self.cursor.apply_margin_top(&node.margin);
            self.render_node(node)?;
            self.cursor.apply_margin_bottom(&node.margin);
        }

        self.render_page_numbers(doc.page_number_options.as_ref())?;
        Ok(())
    }

    /// Dispatch one node to its type-specific render routine.
    fn render_node(&mut self, node: &ContentNode) -> Result<(), FolioError> {
        self.set_node_style(node);

        match &node.kind {
            ContentKind::Text { text, options } => self.render_text(node, text, options),
            ContentKind::List { list, options } => self.render_list(node, list, options),
            ContentKind::Image { image } => self.render_image(node, image),
            ContentKind::Table { table } => self.render_table(node, table),
        }
    }

    /// Push the node's text paint state, falling back to engine defaults.
    fn set_node_style(&mut self, node: &ContentNode) {
        let mut style = TextStyle::base(self.base_font_size);
        if let Some(color) = &node.text_color {
            style.color = color.clone();
        }
        if let Some(size) = node.font_size {
            style.size = size;
        }
        if let Some(variant) = node.font_type {
            style.variant = variant;
        }
        self.surface.set_text_style(&style);
    }

    fn render_text(
        &mut self,
        node: &ContentNode,
        text: &str,
        options: &TextOptions,
    ) -> Result<(), FolioError> {
        let pos = self.cursor.resolve(node.x, node.y);
        self.surface.paint_text(pos.x, pos.y, text, options)?;

        let height = self.surface.measure_text_height(text, options.width);
        self.cursor.x = pos.x;
        self.cursor.y = pos.y + height;
        Ok(())
    }

    fn render_list(
        &mut self,
        node: &ContentNode,
        items: &[String],
        options: &TextOptions,
    ) -> Result<(), FolioError> {
        let pos = self.cursor.resolve(node.x, node.y);
        self.surface.paint_list(pos.x, pos.y, items, options)?;

        let height: f64 = items
            .iter()
            .map(|item| self.surface.measure_text_height(item, options.width))
            .sum();
        self.cursor.x = pos.x;
        self.cursor.y = pos.y + height;
        Ok(())
    }

    fn render_image(
        &mut self,
        node: &ContentNode,
        image: &crate::model::ImageRef,
    ) -> Result<(), FolioError> {
        let pos = self.cursor.resolve(node.x, node.y);

        let mut options = image.options;
        if node.width.is_some() || node.height.is_some() {
            options.width = node.width.or(options.width);
            options.height = node.height.or(options.height);
        } else {
            // No explicit size: take the full width remaining to the right
            // of the cursor within the page margins.
            let margins = self.surface.page_margins();
            let width =
                self.surface.page_width() - margins.horizontal() - (pos.x - margins.left);
            options.width = Some(width);
        }

        // Resolution ran before layout; a miss means the URL was never in
        // the document and there is nothing to paint.
        let Some(properties) = self.images.get(&image.url) else {
            return Ok(());
        };

        self.surface
            .paint_image(pos.x, pos.y, &properties.path, &options)?;

        self.cursor.x = pos.x;
        self.cursor.y = pos.y + rendered_image_height(properties, &options);
        Ok(())
    }
}

/// The vertical space an image paint occupies, from its explicit size or
/// aspect-scaled width.
fn rendered_image_height(
    properties: &ImageProperties,
    options: &crate::surface::ImagePaintOptions,
) -> f64 {
    match (options.width, options.height) {
        (_, Some(height)) => height,
        (Some(width), None) => properties.height_for_width(width),
        (None, None) => properties.height_px as f64,
    }
}

impl ImageProperties {
    /// Height of this image scaled to `width`, preserving aspect ratio.
    pub fn height_for_width(&self, width: f64) -> f64 {
        if self.width_px == 0 {
            return 0.0;
        }
        self.height_px as f64 * width / self.width_px as f64
    }

    /// Width of this image scaled to `height`, preserving aspect ratio.
    pub fn width_for_height(&self, height: f64) -> f64 {
        if self.height_px == 0 {
            return 0.0;
        }
        self.width_px as f64 * height / self.height_px as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_resolve_prefers_explicit() {
        let cursor = Cursor { x: 10.0, y: 20.0 };
        assert_eq!(
            cursor.resolve(Some(50.0), None),
            Cursor { x: 50.0, y: 20.0 }
        );
        assert_eq!(cursor.resolve(None, None), cursor);
        assert_eq!(
            cursor.resolve(Some(0.0), Some(0.0)),
            Cursor { x: 0.0, y: 0.0 }
        );
    }

    #[test]
    fn test_scalar_margin_adds_on_both_sides() {
        let mut cursor = Cursor { x: 0.0, y: 0.0 };
        let margin = Margin::Uniform(5.0);
        cursor.apply_margin_top(&margin);
        assert_eq!(cursor, Cursor { x: 5.0, y: 5.0 });
        cursor.apply_margin_bottom(&margin);
        assert_eq!(cursor, Cursor { x: 10.0, y: 10.0 });
    }

    #[test]
    fn test_edges_margin_asymmetry() {
        // Top adds left to x; bottom subtracts it again, so x returns to
        // baseline while y accumulates top + bottom.
        let mut cursor = Cursor { x: 100.0, y: 50.0 };
        let margin = Margin::Edges([10.0, 4.0, 0.0, 6.0]);
        cursor.apply_margin_top(&margin);
        assert_eq!(cursor, Cursor { x: 110.0, y: 54.0 });
        cursor.apply_margin_bottom(&margin);
        assert_eq!(cursor, Cursor { x: 100.0, y: 60.0 });
    }

    #[test]
    fn test_aspect_scaling() {
        let properties = ImageProperties {
            path: std::path::PathBuf::from("/tmp/x.png"),
            width_px: 200,
            height_px: 100,
        };
        assert_eq!(properties.height_for_width(100.0), 50.0);
        assert_eq!(properties.width_for_height(50.0), 100.0);

        let degenerate = ImageProperties {
            path: std::path::PathBuf::from("/tmp/y.png"),
            width_px: 0,
            height_px: 0,
        };
        assert_eq!(degenerate.height_for_width(100.0), 0.0);
        assert_eq!(degenerate.width_for_height(100.0), 0.0);
    }
}
