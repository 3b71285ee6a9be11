//! # Table Layout Engine
//!
//! The dominant component of the crate. For each table it:
//!
//! 1. Resolves column widths: fixed entries keep their value, wildcard
//!    entries split the remaining usable width equally.
//! 2. Measures each row's tallest cell and grows the row to fit it, unless
//!    the table is in ellipsis mode, where the configured height wins and
//!    overflow is clipped.
//! 3. Checks the page boundary before every row; a row that would overflow
//!    moves wholesale to a fresh page. Rows never split.
//! 4. Paints each cell: border/fill rectangle first, then the content
//!    positioned inside the padded inner rectangle by `justify` / `align`.
//!
//! Row groups render header, body, footer, each exactly once, with the cell
//! margin as the inter-group gap, and the cursor's x returns to the table's
//! start afterwards.

use crate::error::FolioError;
use crate::model::{
    Align, Cell, CellContent, CellStyle, ColumnWidth, ContentNode, Justify, Row, Table,
    TextOptions,
};
use crate::surface::{DrawingSurface, RectStyle, TextStyle};

use super::Renderer;

/// Default row height when the table doesn't configure one.
const DEFAULT_ROW_HEIGHT: f64 = 25.0;

/// Default cell padding on every side.
const DEFAULT_CELL_MARGIN: f64 = 5.0;

/// Resolve the width spec against the usable table width.
///
/// Fixed widths pass through; wildcards split `usable - total_fixed`
/// equally. Fails when no fixed width anchors the table, or when the fixed
/// widths already consume the usable width but wildcards still need room.
pub fn resolve_widths(widths: &[ColumnWidth], usable: f64) -> Result<Vec<f64>, FolioError> {
    let mut total_fixed = 0.0;
    let mut wildcard_count = 0usize;
    for width in widths {
        match width {
            ColumnWidth::Fixed(w) => total_fixed += w,
            ColumnWidth::Wildcard => wildcard_count += 1,
        }
    }

    if total_fixed == 0.0 {
        return Err(FolioError::Configuration(
            "table widths must include at least one fixed width".to_string(),
        ));
    }

    if wildcard_count == 0 {
        return Ok(widths
            .iter()
            .map(|w| match w {
                ColumnWidth::Fixed(v) => *v,
                ColumnWidth::Wildcard => unreachable!(),
            })
            .collect());
    }

    if usable <= total_fixed {
        return Err(FolioError::Configuration(format!(
            "fixed column widths ({total_fixed}pt) leave no room for wildcard columns \
             within {usable}pt of usable width"
        )));
    }

    let share = (usable - total_fixed) / wildcard_count as f64;
    Ok(widths
        .iter()
        .map(|w| match w {
            ColumnWidth::Fixed(v) => *v,
            ColumnWidth::Wildcard => share,
        })
        .collect())
}

/// Render a scalar cell value the way it reads in the input: integral
/// numbers without a trailing `.0`.
fn format_scalar(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A cell with its content and style fully resolved against the table's
/// base options.
struct ResolvedCell {
    content: CellContent,
    justify: Justify,
    align: Align,
    rect: RectStyle,
    cell_margin: f64,
    text_color: Option<String>,
    font_size: Option<f64>,
    font_type: Option<crate::model::FontVariant>,
}

fn resolve_cell(cell: &Cell, base: &CellStyle) -> ResolvedCell {
    let (content, style) = match cell {
        Cell::Text(text) => (
            CellContent::Text {
                text: text.clone(),
                options: TextOptions::default(),
            },
            base.clone(),
        ),
        Cell::Number(value) => (
            CellContent::Text {
                text: format_scalar(*value),
                options: TextOptions::default(),
            },
            base.clone(),
        ),
        Cell::Styled(options) => (options.content.clone(), options.style.merged_over(base)),
    };

    ResolvedCell {
        content,
        justify: style.justify.unwrap_or_default(),
        align: style.align.unwrap_or_default(),
        rect: RectStyle {
            line_width: style.line_width.unwrap_or(0.5),
            line_join: style.line_join.unwrap_or_default(),
            line_cap: style.line_cap.unwrap_or_default(),
            dash: style.dash,
            stroke_color: style.stroke_color.unwrap_or_else(|| "black".to_string()),
            stroke_opacity: style.stroke_opacity.unwrap_or(1.0),
            fill_color: style.fill_color.unwrap_or_else(|| "white".to_string()),
            fill_opacity: style.fill_opacity.unwrap_or(0.0),
        },
        cell_margin: style.cell_margin.unwrap_or(DEFAULT_CELL_MARGIN),
        text_color: style.text_color,
        font_size: style.font_size,
        font_type: style.font_type,
    }
}

impl<'a, S: DrawingSurface> Renderer<'a, S> {
    pub(crate) fn render_table(
        &mut self,
        node: &ContentNode,
        table: &Table,
    ) -> Result<(), FolioError> {
        self.cursor = self.cursor.resolve(node.x, node.y);
        let start_x = self.cursor.x;

        let page_width = table
            .options
            .max_width
            .unwrap_or_else(|| self.surface.page_width());
        let margins = table
            .options
            .margins
            .unwrap_or_else(|| self.surface.page_margins());
        let cell_margin = table
            .options
            .cell
            .cell_margin
            .unwrap_or(DEFAULT_CELL_MARGIN);
        let row_height = table.height.unwrap_or(DEFAULT_ROW_HEIGHT);
        let is_ellipsis = table.options.is_ellipsis;

        // Width remaining to the right of the table's start, bounded by the
        // page margins.
        let usable = page_width - margins.horizontal() - (self.cursor.x - margins.left);
        let widths = resolve_widths(&table.widths, usable)?;

        let base_style = &table.options.cell;

        for row in &table.header {
            self.draw_table_row(row_height, &widths, row, cell_margin, base_style, is_ellipsis)?;
        }
        self.cursor.y += cell_margin;

        for row in &table.body {
            self.draw_table_row(row_height, &widths, row, cell_margin, base_style, is_ellipsis)?;
        }
        self.cursor.y += cell_margin;

        for row in &table.footer {
            self.draw_table_row(row_height, &widths, row, cell_margin, base_style, is_ellipsis)?;
        }
        self.cursor.y += cell_margin;

        self.cursor.x = start_x;
        Ok(())
    }

    fn draw_table_row(
        &mut self,
        configured_height: f64,
        widths: &[f64],
        row: &Row,
        cell_margin: f64,
        base_style: &CellStyle,
        is_ellipsis: bool,
    ) -> Result<(), FolioError> {
        let start_x = self.cursor.x;

        let mut row_height = configured_height;
        if !is_ellipsis {
            let tallest = self.measure_row_height(row, widths, cell_margin);
            if configured_height < tallest + cell_margin * 2.0 {
                row_height = tallest + cell_margin * 2.0;
            }
        }

        // A row never splits: if it would overflow the drawable height, it
        // moves wholesale to a fresh page. x is preserved across the break.
        let page_margins = self.surface.page_margins();
        let drawable_height = self.surface.page_height() - page_margins.vertical();
        if self.cursor.y + row_height > drawable_height {
            log::debug!(
                "table row (height {:.1}) overflows page at y {:.1}; breaking to a new page",
                row_height,
                self.cursor.y
            );
            self.surface.add_page();
            self.cursor.y = page_margins.top;
        }

        for (cell, &width) in row.iter().zip(widths) {
            let resolved = resolve_cell(cell, base_style);
            self.draw_table_cell(row_height, width, &resolved, is_ellipsis)?;
            self.cursor.x += width;
        }

        self.cursor.x = start_x;
        self.cursor.y += row_height;
        Ok(())
    }

    /// The tallest measured cell content in the row, at each cell's padded
    /// inner width.
    fn measure_row_height(&self, row: &Row, widths: &[f64], cell_margin: f64) -> f64 {
        let mut tallest = 0.0f64;
        for (cell, &width) in row.iter().zip(widths) {
            let inner_width = width - cell_margin * 2.0;
            let height = match cell {
                Cell::Text(text) => self.surface.measure_text_height(text, Some(inner_width)),
                Cell::Number(value) => self
                    .surface
                    .measure_text_height(&format_scalar(*value), Some(inner_width)),
                Cell::Styled(options) => self.measure_cell_content(&options.content, inner_width),
            };
            tallest = tallest.max(height);
        }
        tallest
    }

    /// Required height for one cell's content at the given inner width.
    ///
    /// Lists are approximated as one representative line times the item
    /// count; images scale their aspect ratio to the column width.
    fn measure_cell_content(&self, content: &CellContent, inner_width: f64) -> f64 {
        match content {
            CellContent::Text { text, .. } => {
                self.surface.measure_text_height(text, Some(inner_width))
            }
            CellContent::List { list, .. } => match list.first() {
                Some(first) => {
                    self.surface.measure_text_height(first, Some(inner_width)) * list.len() as f64
                }
                None => 0.0,
            },
            CellContent::Image { image } => self
                .images
                .get(&image.url)
                .map(|properties| properties.height_for_width(inner_width))
                .unwrap_or(0.0),
        }
    }

    fn draw_table_cell(
        &mut self,
        row_height: f64,
        width: f64,
        cell: &ResolvedCell,
        is_ellipsis: bool,
    ) -> Result<(), FolioError> {
        let margin = cell.cell_margin;
        let mut content_x = self.cursor.x + margin;
        let mut content_y = self.cursor.y + margin;
        let inner_width = width - margin * 2.0;
        let inner_height = row_height - margin * 2.0;

        // One representative line height, used for whole-line placement in
        // ellipsis mode.
        let line_height = self.surface.measure_text_height("CONST", Some(100.0));
        let content_height = self.measure_cell_content(&cell.content, inner_width);
        let whole_lines = if line_height > 0.0 {
            (inner_height / line_height).floor()
        } else {
            0.0
        };
        let fits = inner_height > content_height;
        let half_height = inner_height / 2.0;

        match cell.justify {
            Justify::Top => {}
            Justify::Bottom => {
                if is_ellipsis {
                    content_y += inner_height - line_height * whole_lines;
                } else if fits {
                    content_y += inner_height - content_height;
                }
            }
            Justify::Center => {
                let mut offset = if is_ellipsis {
                    line_height * whole_lines / 2.0
                } else {
                    content_height / 2.0
                };
                // Clamp so oversized content never pushes above the cell.
                if offset > half_height {
                    offset = half_height;
                }
                content_y += half_height - offset;
            }
        }

        self.surface
            .paint_rect(self.cursor.x, self.cursor.y, width, row_height, &cell.rect)?;

        // Cells reset to the engine's text defaults unless the cell (or the
        // table's base options) restyle them.
        let mut text_style = TextStyle::base(self.base_font_size);
        if let Some(color) = &cell.text_color {
            text_style.color = color.clone();
        }
        if let Some(size) = cell.font_size {
            text_style.size = size;
        }
        if let Some(variant) = cell.font_type {
            text_style.variant = variant;
        }
        self.surface.set_text_style(&text_style);

        match &cell.content {
            CellContent::Text { text, options } => {
                let constrained = TextOptions {
                    width: Some(inner_width),
                    height: Some(inner_height),
                    align: options.align.or(Some(cell.align)),
                    ellipsis: true,
                };
                self.surface
                    .paint_text(content_x, content_y, text, &constrained)?;
            }
            CellContent::List { list, options } => {
                let constrained = TextOptions {
                    width: Some(inner_width),
                    height: Some(inner_height),
                    align: options.align.or(Some(cell.align)),
                    ellipsis: true,
                };
                self.surface
                    .paint_list(content_x, content_y, list, &constrained)?;
            }
            CellContent::Image { image } => {
                let Some(properties) = self.images.get(&image.url) else {
                    return Ok(());
                };

                let mut image_height = properties.height_px as f64;
                let mut image_width = properties.width_px as f64;
                if inner_height < image_height {
                    image_height = inner_height;
                }
                if inner_width < image_width {
                    image_width = inner_width;
                }

                // Horizontal alignment shifts the paint x by the unused
                // width, computed from the clamped height's aspect width.
                match cell.align {
                    Align::Center => {
                        content_x +=
                            inner_width / 2.0 - properties.width_for_height(image_height) / 2.0;
                    }
                    Align::Right => {
                        content_x += inner_width - properties.width_for_height(image_height);
                    }
                    Align::Left | Align::Justify => {}
                }

                // Only the clipped axis is overridden; the caller's other
                // sizing option passes through.
                let mut options = image.options;
                if is_ellipsis {
                    options.height = Some(image_height);
                } else {
                    options.width = Some(image_width);
                }
                self.surface
                    .paint_image(content_x, content_y, &properties.path, &options)?;
            }
        }

        Ok(())
    }
}
