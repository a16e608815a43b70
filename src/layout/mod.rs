//! # Layout Engine
//!
//! The recursive box-model solver. Takes a [`Node`] tree and an available
//! box and produces a [`Frame`] tree with an absolute `calc` box for every
//! node, wrapped text, and resolved fonts.
//!
//! Layout happens on a conceptually infinite canvas: a height of zero
//! means "unbounded, grow to content". Breaking the result into finite
//! pages is the job of the [`crate::pager`].
//!
//! Per node:
//!
//! 1. The margin (plus `pos` as extra left/top margin) is inset from the
//!    available box.
//! 2. Width is the explicit width clamped to what is available, else the
//!    full available width. Height is explicit, else resolved from content.
//! 3. The kind decides how children are placed and how content sizes the box.
//! 4. Alignment shifts the finished box right or to the center of the
//!    available width.

pub mod page_break;
pub mod table;

use std::cell::RefCell;
use std::collections::HashMap;

use log::{trace, warn};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::font::FontManager;
use crate::geom::{Dim, Edges, Rect};
use crate::markup::{self, Tag};
use crate::model::{Align, Code, Node, NodeKind};
use crate::text::{Line, TextSplitter};

/// Line values from this size up are absolute device lengths, below it
/// they multiply the face height.
const ABSOLUTE_LINE: f64 = 8.0;

/// A fully resolved font.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Font {
    pub name: String,
    /// Size in points.
    pub size: f64,
    pub line: f64,
    pub style: Tag,
    /// Line height in device units. Only resolved for text-bearing nodes.
    pub height: f64,
}

/// A laid-out node.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub kind: NodeKind,
    /// The node's absolute box, without margin.
    pub calc: Rect,
    pub margin: Edges,
    pub padding: Edges,
    pub font: Font,
    /// Payload. For text and markup, the wrapped lines joined by `\n`.
    pub data: String,
    pub stroke: f64,
    pub border: Option<Edges>,
    pub code: Option<Code>,
    /// Tables: repeat the first row on continuation pages.
    pub head: bool,
    /// Tables: resolved column widths.
    pub cols: Vec<f64>,
    pub children: Vec<Frame>,
}

impl Frame {
    /// The box including margin, as the parent accounts for it.
    pub fn outer(&self) -> Rect {
        self.margin.outset(self.calc)
    }

    /// Move this frame and everything inside it.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.calc.x += dx;
        self.calc.y += dy;
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }

    /// Number of wrapped lines of a text frame.
    pub fn line_count(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.split('\n').count()
        }
    }
}

/// Attributes inherited down the tree. Passed by value, so siblings never
/// see each other's overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutContext {
    pub font_name: String,
    pub font_size: f64,
    pub font_line: f64,
    pub font_style: Tag,
    pub align: Align,
}

impl LayoutContext {
    pub fn new(config: &Config) -> Self {
        Self {
            font_name: config.font.name.clone(),
            font_size: config.font.size,
            font_line: config.font.line,
            font_style: Tag::empty(),
            align: Align::Left,
        }
    }

    /// The context inside `node`: each attribute the node sets wins.
    pub fn inherit(&self, node: &Node) -> Self {
        let mut ctx = self.clone();
        if let Some(align) = node.align {
            ctx.align = align;
        }
        if let Some(font) = &node.font {
            if let Some(name) = &font.name {
                ctx.font_name = name.clone();
            }
            if let Some(size) = font.size.filter(|s| *s > 0.0) {
                ctx.font_size = size;
            }
            if let Some(line) = font.line.filter(|l| *l > 0.0) {
                ctx.font_line = line;
            }
            if let Some(style) = font.style {
                ctx.font_style = style;
            }
        }
        ctx
    }
}

fn positive(v: f64) -> Option<f64> {
    (v > 0.0).then_some(v)
}

/// The node's margin, with `pos` added as extra left/top margin.
fn margin_of(node: &Node) -> Edges {
    let mut margin = node.margin.unwrap_or_default();
    margin.left += node.pos.x;
    margin.top += node.pos.y;
    margin
}

pub struct Layouter<'a> {
    fonts: &'a FontManager,
    line_heights: RefCell<HashMap<String, f64>>,
}

impl<'a> Layouter<'a> {
    pub fn new(fonts: &'a FontManager) -> Self {
        Self {
            fonts,
            line_heights: RefCell::new(HashMap::new()),
        }
    }

    /// Lay out a document root. The root needs an explicit width; its
    /// height bounds the canvas only when set.
    pub fn layout_root(&self, root: &Node, config: &Config) -> Result<Frame> {
        let margin = margin_of(root);
        let Some(w) = positive(root.dim.w) else {
            return Err(Error::Measure(format!(
                "root {:?} needs an explicit width",
                root.kind
            )));
        };
        let h = positive(root.dim.h).map_or(0.0, |h| h + margin.vertical());
        let avail = Rect::new(0.0, 0.0, w + margin.horizontal(), h);
        self.layout(root, avail, &LayoutContext::new(config), Dim::default())
    }

    /// Lay out `node` inside `avail`.
    ///
    /// `fallback` supplies sizes for unset dimensions, the way a stacking
    /// parent's `sub` does. An available height of zero is unbounded.
    pub fn layout(
        &self,
        node: &Node,
        avail: Rect,
        ctx: &LayoutContext,
        fallback: Dim,
    ) -> Result<Frame> {
        self.place(node, avail, ctx, fallback, true)
    }

    /// Lay out `node`; `aligned` decides whether the finished box is shifted
    /// by the alignment slack. Rows pack their children unshifted and align
    /// the packed row as a whole.
    fn place(
        &self,
        node: &Node,
        avail: Rect,
        ctx: &LayoutContext,
        fallback: Dim,
        aligned: bool,
    ) -> Result<Frame> {
        if avail.w <= 0.0 {
            return Err(Error::Measure(format!(
                "{:?} node has no available width ({})",
                node.kind, avail.w
            )));
        }

        let ctx = ctx.inherit(node);
        let margin = margin_of(node);
        let outer = margin.inset(avail);
        let explicit_w = positive(node.dim.w).or(positive(fallback.w));
        let explicit_h = positive(node.dim.h).or(positive(fallback.h));

        let mut frame = Frame {
            kind: node.kind,
            calc: Rect::new(
                outer.x,
                outer.y,
                explicit_w.map_or(outer.w, |w| w.min(outer.w)),
                explicit_h.unwrap_or(0.0),
            ),
            margin,
            padding: node.padding.unwrap_or_default(),
            font: self.font(&ctx, node)?,
            data: node.data.clone(),
            stroke: node.stroke,
            border: node.border,
            code: node.code.clone(),
            head: node.head,
            cols: Vec::new(),
            children: Vec::new(),
        };

        match node.kind {
            NodeKind::Stage | NodeKind::Page => {
                if positive(node.dim.w).is_none() || positive(node.dim.h).is_none() {
                    return Err(Error::Measure(format!(
                        "{:?} needs an explicit width and height",
                        node.kind
                    )));
                }
                self.free(node, &mut frame, &ctx, explicit_h.is_none())?;
            }
            NodeKind::Box
            | NodeKind::Group
            | NodeKind::Header
            | NodeKind::Footer
            | NodeKind::Cover
            | NodeKind::Extra
            | NodeKind::Rect
            | NodeKind::Ellipse => {
                if node.children.is_empty() {
                    fill_height(&mut frame, explicit_h, outer);
                } else {
                    self.free(node, &mut frame, &ctx, explicit_h.is_none())?;
                }
            }
            NodeKind::Barcode => fill_height(&mut frame, explicit_h, outer),
            NodeKind::VBox => self.vbox(node, &mut frame, &ctx, explicit_h.is_none())?,
            NodeKind::HBox => self.hbox(node, &mut frame, &ctx, explicit_w, explicit_h, outer)?,
            NodeKind::Table => self.table(node, &mut frame, &ctx, explicit_w, explicit_h, outer)?,
            NodeKind::Text | NodeKind::Markup => {
                self.text(node, &mut frame, &ctx, explicit_w, explicit_h, outer)?
            }
            NodeKind::Line => {
                frame.calc.w = explicit_w.unwrap_or(0.0);
                frame.calc.h = explicit_h.unwrap_or(0.0);
            }
            NodeKind::QrCode => {
                let h = explicit_h.or_else(|| positive(outer.h));
                let side = h.map_or(frame.calc.w, |h| frame.calc.w.min(h));
                frame.calc.w = side;
                frame.calc.h = side;
            }
        }

        if aligned {
            let dx = align_offset(ctx.align, outer.w - frame.calc.w);
            if dx > 0.0 {
                frame.translate(dx, 0.0);
            }
        }

        trace!("{:?} -> {:?}", node.kind, frame.calc);
        Ok(frame)
    }

    fn font(&self, ctx: &LayoutContext, node: &Node) -> Result<Font> {
        let name = self.fonts.styled(&ctx.font_name, ctx.font_style);
        let height = if node.kind.is_text() || node.kind == NodeKind::Barcode {
            self.line_height(&name, ctx.font_size, ctx.font_line)?
        } else {
            0.0
        };
        Ok(Font {
            name,
            size: ctx.font_size,
            line: ctx.font_line,
            style: ctx.font_style,
            height,
        })
    }

    /// Line height in device units, cached per face, size and line value.
    fn line_height(&self, face_name: &str, size: f64, line: f64) -> Result<f64> {
        if line >= ABSOLUTE_LINE {
            return Ok(line);
        }
        let key = format!("{face_name}/{size}/{line}");
        if let Some(h) = self.line_heights.borrow().get(&key) {
            return Ok(*h);
        }
        let face = self.fonts.face(face_name, size)?;
        let h = (line * self.fonts.units().pt_to_dot(face.height())).round();
        self.line_heights.borrow_mut().insert(key, h);
        Ok(h)
    }

    /// Free-form placement: every child starts at the content origin and
    /// positions itself with its own margin.
    fn free(&self, node: &Node, frame: &mut Frame, ctx: &LayoutContext, auto_h: bool) -> Result<()> {
        let content = frame.padding.inset(frame.calc);
        let paged = node.kind == NodeKind::Page;
        let mut bottom = content.y;
        for child in &node.children {
            // page flow grows past the page; the pager breaks it up
            let avail = if paged && !child.kind.is_template() {
                Rect { h: 0.0, ..content }
            } else {
                content
            };
            let f = self.layout(child, avail, ctx, Dim::default())?;
            bottom = bottom.max(f.outer().bottom());
            frame.children.push(f);
        }
        if auto_h {
            frame.calc.h = (bottom - frame.calc.y + frame.padding.bottom).max(0.0);
        }
        Ok(())
    }

    fn vbox(&self, node: &Node, frame: &mut Frame, ctx: &LayoutContext, auto_h: bool) -> Result<()> {
        let content = frame.padding.inset(frame.calc);
        let fallback = Dim::new(0.0, node.sub.h);
        let mut y = content.y;
        for (i, child) in node.children.iter().enumerate() {
            if i > 0 {
                y += node.gap;
            }
            let avail = Rect::new(content.x, y, content.w, 0.0);
            let f = self.layout(child, avail, ctx, fallback)?;
            y = f.outer().bottom();
            frame.children.push(f);
        }
        if auto_h {
            frame.calc.h = y - content.y + frame.padding.vertical();
        }
        Ok(())
    }

    fn hbox(
        &self,
        node: &Node,
        frame: &mut Frame,
        ctx: &LayoutContext,
        explicit_w: Option<f64>,
        explicit_h: Option<f64>,
        outer: Rect,
    ) -> Result<()> {
        let mut content = frame.padding.inset(frame.calc);
        if explicit_h.is_none() && !outer.unbounded() {
            // children may fill the height the row could grow to
            content.h = (outer.h - frame.padding.vertical()).max(0.0);
        }
        let fallback = Dim::new(node.sub.w, 0.0);
        let mut x = content.x;
        let mut tallest: f64 = 0.0;
        for (i, child) in node.children.iter().enumerate() {
            if i > 0 {
                x += node.gap;
            }
            let mut w = content.right() - x;
            // children with a set width are never shrunk, the box overflows
            if let Some(want) = positive(child.dim.w).or(positive(node.sub.w)) {
                w = w.max(want + margin_of(child).horizontal());
            }
            let avail = Rect::new(x, content.y, w, content.h);
            let f = self.place(child, avail, ctx, fallback, false)?;
            let outer = f.outer();
            x = outer.right();
            tallest = tallest.max(outer.h);
            frame.children.push(f);
        }
        match explicit_w {
            // an auto-width row shrinks to its children and is aligned as a whole
            None => frame.calc.w = x - content.x + frame.padding.horizontal(),
            Some(_) => {
                let dx = align_offset(ctx.align, content.right() - x);
                if dx > 0.0 {
                    for child in &mut frame.children {
                        child.translate(dx, 0.0);
                    }
                }
            }
        }
        if explicit_h.is_none() {
            frame.calc.h = tallest + frame.padding.vertical();
        }
        Ok(())
    }

    fn table(
        &self,
        node: &Node,
        frame: &mut Frame,
        ctx: &LayoutContext,
        explicit_w: Option<f64>,
        explicit_h: Option<f64>,
        outer: Rect,
    ) -> Result<()> {
        let cols = table::resolve_columns(&node.cols, frame.padding.inset(frame.calc).w);
        let total: f64 = cols.iter().sum();
        if explicit_w.is_none() {
            let natural = total + frame.padding.horizontal();
            if natural > outer.w {
                warn!("table columns ({total}) are wider than the available width ({})", outer.w);
            }
            frame.calc.w = natural.min(outer.w);
        }

        let content = frame.padding.inset(frame.calc);
        let fallback = Dim::new(0.0, node.sub.h);
        let mut y = content.y;
        for (r, row) in node.children.chunks(cols.len()).enumerate() {
            if r > 0 {
                y += node.gap;
            }
            let mut x = content.x;
            let mut cells = Vec::with_capacity(row.len());
            for (cell, &w) in row.iter().zip(&cols) {
                let f = self.layout(cell, Rect::new(x, y, w, 0.0), ctx, fallback)?;
                x += w;
                cells.push(f);
            }
            let row_h = cells.iter().map(|f| f.outer().h).fold(0.0, f64::max);
            for f in &mut cells {
                f.calc.h = f.calc.h.max(row_h - f.margin.vertical());
            }
            y += row_h;
            frame.children.extend(cells);
        }

        if explicit_h.is_none() {
            frame.calc.h = y - content.y + frame.padding.vertical();
        }
        frame.cols = cols;
        Ok(())
    }

    fn text(
        &self,
        node: &Node,
        frame: &mut Frame,
        ctx: &LayoutContext,
        explicit_w: Option<f64>,
        explicit_h: Option<f64>,
        outer: Rect,
    ) -> Result<()> {
        let pad = frame.padding;
        let max_width = frame.calc.w - pad.horizontal();
        let splitter = TextSplitter::new(self.fonts, &ctx.font_name, ctx.font_size);
        let base = ctx.font_style;
        let runs: Vec<(String, Tag)> = match node.kind {
            NodeKind::Markup => markup::tag(&node.data)
                .into_iter()
                .map(|(text, tag)| (text, base | tag))
                .collect(),
            _ => vec![(node.data.clone(), base)],
        };
        let lines = splitter.split(&runs, max_width)?;
        let line_h = frame.font.height;

        if explicit_w.is_none() {
            let widest = lines.iter().map(|l| l.width).fold(0.0, f64::max);
            frame.calc.w = (widest.ceil() + pad.horizontal()).min(outer.w);
        }
        if explicit_h.is_none() {
            frame.calc.h = lines.len() as f64 * line_h + pad.vertical();
        }
        frame.data = lines.iter().map(Line::text).collect::<Vec<_>>().join("\n");

        if node.kind == NodeKind::Markup {
            let content = pad.inset(frame.calc);
            for (i, line) in lines.iter().enumerate() {
                let mut x = content.x + align_offset(ctx.align, content.w - line.width);
                let y = content.y + i as f64 * line_h;
                for span in &line.spans {
                    if !span.text.trim().is_empty() {
                        frame.children.push(Frame {
                            kind: NodeKind::Text,
                            calc: Rect::new(x, y, span.width.ceil(), line_h),
                            margin: Edges::default(),
                            padding: Edges::default(),
                            font: Font {
                                name: self.fonts.styled(&ctx.font_name, span.tag),
                                style: span.tag,
                                ..frame.font.clone()
                            },
                            data: span.text.clone(),
                            stroke: 0.0,
                            border: None,
                            code: None,
                            head: false,
                            cols: Vec::new(),
                            children: Vec::new(),
                        });
                    }
                    x += span.width;
                }
            }
        }
        Ok(())
    }
}

/// Horizontal shift for `slack` spare width.
fn align_offset(align: Align, slack: f64) -> f64 {
    if slack <= 0.0 {
        return 0.0;
    }
    match align {
        Align::Left => 0.0,
        Align::Right => slack,
        Align::Center => (slack / 2.0).floor(),
    }
}

/// Childless boxes without a height take the whole available height, when
/// there is one.
fn fill_height(frame: &mut Frame, explicit_h: Option<f64>, outer: Rect) {
    if explicit_h.is_none() && !outer.unbounded() {
        frame.calc.h = outer.h;
    }
}
