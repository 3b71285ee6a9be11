//! # Page Numbering
//!
//! Runs after the full content pass. Revisits every buffered page through
//! the surface's page range and stamps a label with the same text primitive
//! the rest of the engine uses. Skipped entirely when the document carries
//! no page-number configuration.

use crate::error::FolioError;
use crate::model::{
    PageNumberAlign, PageNumberConfig, PageNumberKind, PageNumberLocation, TextOptions,
};
use crate::surface::{DrawingSurface, TextStyle};

use super::Renderer;

/// Reserved label width when the configuration doesn't set one.
const DEFAULT_LABEL_WIDTH: f64 = 30.0;

impl<'a, S: DrawingSurface> Renderer<'a, S> {
    pub(crate) fn render_page_numbers(
        &mut self,
        config: Option<&PageNumberConfig>,
    ) -> Result<(), FolioError> {
        let Some(config) = config else {
            return Ok(());
        };

        let range = self.surface.buffered_page_range();
        let total = range.start + range.count;

        for index in range.start..total {
            self.surface.switch_to_page(index)?;
            self.stamp_page(config, index + 1, total)?;
        }
        Ok(())
    }

    fn stamp_page(
        &mut self,
        config: &PageNumberConfig,
        current: usize,
        total: usize,
    ) -> Result<(), FolioError> {
        let label = match config.kind {
            PageNumberKind::Basic => current.to_string(),
            PageNumberKind::Seperator => format!("{current}{}{total}", config.seperator),
        };

        let label_width = config.width.unwrap_or(DEFAULT_LABEL_WIDTH);
        let margins = self.surface.page_margins();

        self.surface.set_text_style(&TextStyle::base(self.base_font_size));
        let text_height = self.surface.measure_text_height(&label, Some(label_width));

        let y = match config.location {
            PageNumberLocation::Bottom => {
                self.surface.page_height() - margins.bottom - text_height
            }
            PageNumberLocation::Top => margins.top - text_height,
        };

        let mut options = TextOptions {
            width: Some(label_width),
            ..Default::default()
        };
        let x = match config.align {
            PageNumberAlign::Center => self.surface.page_width() / 2.0 - label_width / 2.0,
            PageNumberAlign::Left => margins.left,
            PageNumberAlign::Right => {
                options.align = Some(crate::model::Align::Right);
                self.surface.page_width() - margins.right - label_width
            }
        };

        self.surface.paint_text(x, y, &label, &options)?;
        Ok(())
    }
}
