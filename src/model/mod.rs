//! # Document Model
//!
//! The input representation for the layout engine: a tree of nodes, each
//! with a kind, an author-specified box and a handful of attributes. It is
//! produced by whatever builds documents (a template resolver, a script,
//! direct JSON construction) and is never mutated by the engine.
//!
//! All lengths are device units. A zero or negative length means "unset,
//! resolve it from context".

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::geom::{Dim, Edges, Pos};
use crate::markup::Tag;

/// A complete document ready for layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The root node. A `page` root is paginated, anything else is laid
    /// out as a single page.
    pub root: Node,

    /// Engine configuration. Missing fields take their defaults.
    #[serde(default)]
    pub config: Config,

    /// Custom fonts to register before layout.
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

/// A TrueType/OpenType font to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Name nodes refer to in `font.name`.
    pub name: String,
    /// Base64-encoded font data, a data URI (`data:font/ttf;base64,...`)
    /// or a path to a font file.
    pub src: String,
    /// Register this face as a style variant of another font instead of
    /// as a plain face, e.g. `{ "name": "inter-bold", "variantOf": "inter",
    /// "style": "BOLD" }`.
    #[serde(default, rename = "variantOf")]
    pub variant_of: Option<String>,
    #[serde(default)]
    pub style: Tag,
}

/// One element of the layout tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub kind: NodeKind,

    /// Offset inside a free-form parent. Acts as extra left/top margin.
    pub pos: Pos,

    /// Author-specified size. Unset components are resolved from context.
    pub dim: Dim,

    pub margin: Option<Edges>,
    pub padding: Option<Edges>,

    /// Horizontal placement within the available width. Inherited.
    pub align: Option<Align>,

    /// Spacing between siblings in vbox, hbox and table.
    pub gap: f64,

    /// Default child size on the stacking axis (vbox: `h`, hbox: `w`,
    /// table rows: `h`).
    pub sub: Dim,

    /// Table column widths; entries `<= 0` share the remaining width.
    pub cols: Vec<f64>,

    /// Tables: repeat the first row at the top of every continuation page.
    pub head: bool,

    /// Font attributes. Each unset field is inherited from the nearest
    /// ancestor that sets it.
    pub font: Option<FontSpec>,

    /// Per-side border widths for text and rect leaves.
    pub border: Option<Edges>,

    /// Line width for line, rect and ellipse.
    pub stroke: f64,

    /// Barcode/QR parameters.
    pub code: Option<Code>,

    /// Payload of text, markup, barcode and qrcode leaves.
    pub data: String,

    pub children: Vec<Node>,
}

/// What a node is, and therefore how it is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The outer frame of a single-page document. Needs explicit w and h.
    Stage,
    #[default]
    Box,
    Group,
    VBox,
    HBox,
    Table,
    /// The root of a paginated document. Needs explicit w and h.
    Page,
    Header,
    Footer,
    Cover,
    Extra,
    Text,
    Markup,
    Line,
    Rect,
    Ellipse,
    QrCode,
    Barcode,
}

impl NodeKind {
    /// Root-level regions the pager repeats instead of flowing.
    pub fn is_template(self) -> bool {
        matches!(
            self,
            NodeKind::Header | NodeKind::Footer | NodeKind::Cover | NodeKind::Extra
        )
    }

    pub fn is_text(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Markup)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// Font attributes as written on a node. `None` means inherit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub name: Option<String>,
    /// Size in points.
    pub size: Option<f64>,
    /// A multiplier of the face height below 8, an absolute device length
    /// from 8 up.
    pub line: Option<f64>,
    pub style: Option<Tag>,
}

/// Barcode/QR parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Code {
    /// Symbology, e.g. `code128`, `ean13`, `qr`.
    pub name: String,
    /// Print the human-readable text under the bars.
    pub human: bool,
    /// Module width factor.
    pub wide: f64,
}

impl Default for Code {
    fn default() -> Self {
        Self {
            name: "code128".to_string(),
            human: false,
            wide: 2.0,
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn text(data: &str) -> Self {
        Self {
            kind: NodeKind::Text,
            data: data.to_string(),
            ..Default::default()
        }
    }

    pub fn with_dim(mut self, w: f64, h: f64) -> Self {
        self.dim = Dim::new(w, h);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_node_json() {
        let node: Node = serde_json::from_str(r#"{ "kind": "text", "data": "hi" }"#).unwrap();
        assert_eq!(node.kind, NodeKind::Text);
        assert_eq!(node.data, "hi");
        assert_eq!(node.dim, Dim::default());
        assert!(node.margin.is_none());
    }

    #[test]
    fn kind_names() {
        for (name, kind) in [
            ("vbox", NodeKind::VBox),
            ("hbox", NodeKind::HBox),
            ("qrcode", NodeKind::QrCode),
            ("barcode", NodeKind::Barcode),
            ("extra", NodeKind::Extra),
        ] {
            let parsed: NodeKind = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let res: Result<Node, _> = serde_json::from_str(r#"{ "kind": "image" }"#);
        assert!(res.is_err());
    }

    #[test]
    fn document_defaults() {
        let doc: Document = serde_json::from_str(r#"{ "root": { "kind": "stage" } }"#).unwrap();
        assert_eq!(doc.config, Config::default());
        assert!(doc.fonts.is_empty());
    }

    #[test]
    fn partial_font_spec() {
        let node: Node =
            serde_json::from_str(r#"{ "kind": "text", "font": { "size": 12 } }"#).unwrap();
        let font = node.font.unwrap();
        assert_eq!(font.size, Some(12.0));
        assert!(font.name.is_none());
    }
}
