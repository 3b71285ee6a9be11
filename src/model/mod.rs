//! # Document Model
//!
//! The input representation for the layout engine. A document is an ordered
//! sequence of content nodes (text, lists, images, and tables) plus an
//! optional page-number configuration. This is designed to be easily produced
//! by direct JSON construction or programmatically.
//!
//! Which component a node is gets decided at construction time: the JSON
//! shape keys on which content field is present (`text`, `list`, `image`,
//! `table`), and deserialization turns that into the [`ContentKind`] tagged
//! union. There is no runtime key-probing after this point.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::surface::ImagePaintOptions;

/// A complete document ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The content nodes, rendered top to bottom.
    #[serde(default)]
    pub content: Vec<ContentNode>,

    /// When set, every produced page gets a page-number stamp in a
    /// post-layout pass. When absent the pass is skipped entirely.
    #[serde(default)]
    pub page_number_options: Option<PageNumberConfig>,
}

/// One renderable unit in the document: common placement fields plus the
/// content variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// What kind of content this node carries.
    #[serde(flatten)]
    pub kind: ContentKind,

    /// Explicit x coordinate. Overrides the flow cursor when set.
    pub x: Option<f64>,
    /// Explicit y coordinate. Overrides the flow cursor when set.
    pub y: Option<f64>,

    /// Explicit size, used by image nodes.
    pub width: Option<f64>,
    pub height: Option<f64>,

    /// Margin applied around the node (scalar or [left, top, right, bottom]).
    #[serde(default)]
    pub margin: Margin,

    /// Text paint state pushed to the surface before this node draws.
    pub text_color: Option<String>,
    pub font_size: Option<f64>,
    pub font_type: Option<FontVariant>,
}

/// The content variants. Untagged: the present key selects the variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentKind {
    Table {
        table: Table,
    },
    Image {
        image: ImageRef,
    },
    List {
        list: Vec<String>,
        #[serde(default)]
        options: TextOptions,
    },
    Text {
        text: String,
        #[serde(default)]
        options: TextOptions,
    },
}

impl ContentNode {
    fn new(kind: ContentKind) -> Self {
        ContentNode {
            kind,
            x: None,
            y: None,
            width: None,
            height: None,
            margin: Margin::default(),
            text_color: None,
            font_size: None,
            font_type: None,
        }
    }

    /// Create a text node.
    pub fn text(content: &str) -> Self {
        Self::new(ContentKind::Text {
            text: content.to_string(),
            options: TextOptions::default(),
        })
    }

    /// Create a list node.
    pub fn list(items: Vec<String>) -> Self {
        Self::new(ContentKind::List {
            list: items,
            options: TextOptions::default(),
        })
    }

    /// Create an image node referencing a URL.
    pub fn image(url: &str) -> Self {
        Self::new(ContentKind::Image {
            image: ImageRef::new(url),
        })
    }

    /// Create a table node.
    pub fn table(table: Table) -> Self {
        Self::new(ContentKind::Table { table })
    }

    /// Pin this node to an explicit position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Set the node margin.
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }
}

/// Per-component margin: a scalar applied to all sides, or a 4-tuple
/// [left, top, right, bottom].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Margin {
    Uniform(f64),
    Edges([f64; 4]),
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Uniform(0.0)
    }
}

/// Edge values (top, right, bottom, left) for page margins.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Font variants the drawing surface is expected to provide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontVariant {
    #[default]
    Light,
    Normal,
    Regular,
    Italic,
    Bold,
    BoldItalic,
}

/// Horizontal alignment for text content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
    Justify,
}

/// Vertical alignment for table-cell content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Constraints passed through to the surface's text primitives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub align: Option<Align>,
    #[serde(default)]
    pub ellipsis: bool,
}

/// A reference to a remote image plus its rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub options: ImagePaintOptions,
}

impl ImageRef {
    pub fn new(url: &str) -> Self {
        ImageRef {
            url: url.to_string(),
            options: ImagePaintOptions::default(),
        }
    }
}

// ─── Tables ─────────────────────────────────────────────────────

/// A table: column width spec, optional default row height, and three
/// optional row groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub options: TableOptions,

    /// Ordered column widths: fixed points or `"*"` wildcards that split
    /// the remaining usable width equally.
    pub widths: Vec<ColumnWidth>,

    /// Default row height in points. Rows grow to fit their tallest cell
    /// unless the table is in ellipsis mode. Defaults to 25.
    pub height: Option<f64>,

    #[serde(default)]
    pub header: Vec<Row>,
    #[serde(default)]
    pub body: Vec<Row>,
    #[serde(default)]
    pub footer: Vec<Row>,
}

pub type Row = Vec<Cell>;

/// A column width entry: a fixed point value, or a wildcard taking an
/// equal share of the leftover width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    Fixed(f64),
    Wildcard,
}

impl Serialize for ColumnWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnWidth::Fixed(w) => serializer.serialize_f64(*w),
            ColumnWidth::Wildcard => serializer.serialize_str("*"),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnWidthVisitor;

        impl<'v> Visitor<'v> for ColumnWidthVisitor {
            type Value = ColumnWidth;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a number or \"*\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ColumnWidth, E> {
                Ok(ColumnWidth::Fixed(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ColumnWidth, E> {
                Ok(ColumnWidth::Fixed(v as f64))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ColumnWidth, E> {
                Ok(ColumnWidth::Fixed(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ColumnWidth, E> {
                if v == "*" {
                    Ok(ColumnWidth::Wildcard)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(ColumnWidthVisitor)
    }
}

/// Table-wide options: base cell styling applied to every cell (overridable
/// per cell), plus table geometry overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOptions {
    /// Base styling inherited by every cell in the table.
    #[serde(flatten)]
    pub cell: CellStyle,

    /// Overrides the surface's page width for width resolution.
    pub max_width: Option<f64>,

    /// Overrides the surface's page margins for width resolution.
    pub margins: Option<Edges>,

    /// Ellipsis mode: keep the configured row height and clip overflowing
    /// cell content instead of growing the row.
    #[serde(default)]
    pub is_ellipsis: bool,
}

/// A table cell: a bare scalar rendered as text, or a styled cell with
/// text, list, or image content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Styled(Box<CellOptions>),
}

/// A styled cell: content plus styling overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellOptions {
    #[serde(flatten)]
    pub content: CellContent,
    #[serde(flatten)]
    pub style: CellStyle,
}

/// The content of a styled cell. Untagged, like [`ContentKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellContent {
    Image {
        image: ImageRef,
    },
    List {
        list: Vec<String>,
        #[serde(default)]
        options: TextOptions,
    },
    Text {
        text: String,
        #[serde(default)]
        options: TextOptions,
    },
}

/// Dash pattern for cell borders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dash {
    pub length: f64,
    pub space: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    #[default]
    Square,
}

/// Cell styling. Every field is optional so table-level base options and
/// per-cell overrides can be merged before resolving against defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub justify: Option<Justify>,
    pub align: Option<Align>,
    pub line_join: Option<LineJoin>,
    pub line_cap: Option<LineCap>,
    pub dash: Option<Dash>,
    pub line_width: Option<f64>,
    pub stroke_opacity: Option<f64>,
    pub stroke_color: Option<String>,
    pub fill_opacity: Option<f64>,
    pub fill_color: Option<String>,
    pub cell_margin: Option<f64>,

    /// Cells may restyle their text content.
    pub text_color: Option<String>,
    pub font_size: Option<f64>,
    pub font_type: Option<FontVariant>,
}

impl CellStyle {
    /// Layer `self` over `base`: any field set on the cell wins, anything
    /// else falls back to the table-level base.
    pub fn merged_over(&self, base: &CellStyle) -> CellStyle {
        CellStyle {
            justify: self.justify.or(base.justify),
            align: self.align.or(base.align),
            line_join: self.line_join.or(base.line_join),
            line_cap: self.line_cap.or(base.line_cap),
            dash: self.dash.or(base.dash),
            line_width: self.line_width.or(base.line_width),
            stroke_opacity: self.stroke_opacity.or(base.stroke_opacity),
            stroke_color: self.stroke_color.clone().or_else(|| base.stroke_color.clone()),
            fill_opacity: self.fill_opacity.or(base.fill_opacity),
            fill_color: self.fill_color.clone().or_else(|| base.fill_color.clone()),
            cell_margin: self.cell_margin.or(base.cell_margin),
            text_color: self.text_color.clone().or_else(|| base.text_color.clone()),
            font_size: self.font_size.or(base.font_size),
            font_type: self.font_type.or(base.font_type),
        }
    }
}

// ─── Page numbers ───────────────────────────────────────────────

/// Page-number stamp configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNumberConfig {
    #[serde(rename = "type", default)]
    pub kind: PageNumberKind,

    /// Separator between current and total in `Seperator` mode.
    /// The spelling is the input format's.
    #[serde(default = "default_seperator")]
    pub seperator: String,

    #[serde(default)]
    pub align: PageNumberAlign,

    #[serde(default)]
    pub location: PageNumberLocation,

    /// Reserved label width in points. Defaults to 30.
    pub width: Option<f64>,
}

impl Default for PageNumberConfig {
    fn default() -> Self {
        PageNumberConfig {
            kind: PageNumberKind::default(),
            seperator: default_seperator(),
            align: PageNumberAlign::default(),
            location: PageNumberLocation::default(),
            width: None,
        }
    }
}

fn default_seperator() -> String {
    "-".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageNumberKind {
    #[default]
    Basic,
    Seperator,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageNumberAlign {
    Left,
    Center,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageNumberLocation {
    Top,
    #[default]
    Bottom,
}
