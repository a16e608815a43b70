//! # Pager
//!
//! Turns a laid-out [`Frame`] tree into a flat, ordered list of [`Draw`]
//! primitives, broken into pages.
//!
//! Layout happens on an infinitely tall canvas. For a `page` root, pages are
//! finite windows onto that canvas: each starts at an origin (`org`) in
//! flow coordinates and owns a content area between its top template (cover
//! on the first page, header on later pages) and the footer. Leaves are
//! placed in document order on the last page whose origin is not below
//! them. What does not fit moves to the next page; text is split between
//! lines instead.
//!
//! The root's `extra`, `cover`, `header` and `footer` children are not
//! flowed but repeated on every page they apply to. Page number and total
//! placeholders in text are filled in once the page count is known.

use log::{debug, warn};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geom::{Edges, Rect};
use crate::layout::page_break::{decide_break, fit_count, BreakDecision};
use crate::layout::{Font, Frame};
use crate::model::{Code, NodeKind};

const EPSILON: f64 = 1e-9;

/// One drawable primitive in page coordinates, or a page marker
/// (`kind: page`) between two pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draw {
    pub kind: NodeKind,
    pub calc: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data: String,
    pub padding: Edges,
    pub stroke: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Edges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
}

impl Draw {
    fn from_frame(frame: &Frame) -> Self {
        let font = matches!(frame.kind, NodeKind::Text | NodeKind::Barcode)
            .then(|| frame.font.clone());
        Self {
            kind: frame.kind,
            calc: frame.calc,
            font,
            data: frame.data.clone(),
            padding: frame.padding,
            stroke: frame.stroke,
            border: frame.border,
            code: frame.code.clone(),
        }
    }

    /// The bordered box of a markup block, without its text. Its spans are
    /// emitted separately.
    fn decoration(frame: &Frame) -> Option<Self> {
        frame.border.map(|_| Self {
            font: None,
            data: String::new(),
            ..Self::from_frame(frame)
        })
    }

    fn marker(page: Rect) -> Self {
        Self {
            kind: NodeKind::Page,
            calc: page,
            font: None,
            data: String::new(),
            padding: Edges::default(),
            stroke: 0.0,
            border: None,
            code: None,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.kind == NodeKind::Page
    }

    /// Number of lines of a text draw.
    pub fn line_count(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.split('\n').count()
        }
    }
}

/// Split a text draw after its first `lines` lines.
///
/// The first part keeps the top padding, the remainder the bottom padding
/// and starts right below the first part. Returns the draw unchanged and no
/// remainder when it has no more than `lines` lines.
pub fn split_text(draw: &Draw, lines: usize) -> (Draw, Option<Draw>) {
    let all: Vec<&str> = if draw.data.is_empty() {
        Vec::new()
    } else {
        draw.data.split('\n').collect()
    };
    if lines >= all.len() {
        return (draw.clone(), None);
    }

    let pad = draw.padding;
    let line_h = (draw.calc.h - pad.vertical()).max(0.0) / all.len() as f64;

    let mut head = draw.clone();
    head.data = all[..lines].join("\n");
    head.padding.bottom = 0.0;
    head.calc.h = pad.top + line_h * lines as f64;

    let mut tail = draw.clone();
    tail.data = all[lines..].join("\n");
    tail.padding.top = 0.0;
    tail.calc.y = draw.calc.y + head.calc.h;
    tail.calc.h = draw.calc.h - head.calc.h;

    (head, Some(tail))
}

/// Break a laid-out tree into pages.
///
/// A `page` root is paginated. Any other root yields a single page without
/// markers.
pub fn paginate(root: &Frame, config: &Config) -> Result<Vec<Draw>> {
    if root.kind != NodeKind::Page {
        let mut out = Vec::new();
        collect(root, &mut out)?;
        substitute(&mut out, config, 1, 1);
        return Ok(out);
    }

    let mut pager = Pager::new(root, config)?;
    for child in root.children.iter().filter(|c| !c.kind.is_template()) {
        pager.flow(child)?;
    }
    pager.finish()
}

/// Append the leaves of `frame` in document order, without pagination.
fn collect(frame: &Frame, out: &mut Vec<Draw>) -> Result<()> {
    match frame.kind {
        NodeKind::Text | NodeKind::Line | NodeKind::QrCode | NodeKind::Barcode => {
            out.push(Draw::from_frame(frame))
        }
        NodeKind::Markup => {
            out.extend(Draw::decoration(frame));
            out.extend(frame.children.iter().map(Draw::from_frame));
        }
        NodeKind::Rect | NodeKind::Ellipse => {
            out.push(Draw::from_frame(frame));
            for child in &frame.children {
                collect(child, out)?;
            }
        }
        NodeKind::Stage
        | NodeKind::Box
        | NodeKind::Group
        | NodeKind::VBox
        | NodeKind::HBox
        | NodeKind::Table => {
            for child in &frame.children {
                collect(child, out)?;
            }
        }
        NodeKind::Page | NodeKind::Header | NodeKind::Footer | NodeKind::Cover | NodeKind::Extra => {
            return Err(misplaced(frame.kind));
        }
    }
    Ok(())
}

/// The leaves of a template region.
fn collect_region(region: &Frame, out: &mut Vec<Draw>) -> Result<()> {
    for child in &region.children {
        collect(child, out)?;
    }
    Ok(())
}

fn misplaced(kind: NodeKind) -> Error {
    Error::Structure(format!(
        "{kind:?} is only allowed as a direct child of a page root"
    ))
}

/// Replace the page tokens in every text draw.
fn substitute(draws: &mut [Draw], config: &Config, page: usize, total: usize) {
    let page = page.to_string();
    let total = total.to_string();
    for d in draws.iter_mut().filter(|d| d.kind == NodeKind::Text) {
        if d.data.contains(&config.page_token) {
            d.data = d.data.replace(&config.page_token, &page);
        }
        if d.data.contains(&config.total_token) {
            d.data = d.data.replace(&config.total_token, &total);
        }
    }
}

/// A finite page over the flow.
#[derive(Debug)]
struct Sheet {
    /// Flow offset of the content top.
    org: f64,
    /// Content area in page coordinates.
    top: f64,
    bottom: f64,
    items: Vec<Draw>,
}

/// A table's first row, repeated at the top of continuation pages.
#[derive(Debug, Clone)]
struct HeadRow {
    draws: Vec<Draw>,
    top: f64,
    height: f64,
}

#[derive(Default)]
struct Templates<'a> {
    extra: Vec<&'a Frame>,
    cover: Option<&'a Frame>,
    header: Option<&'a Frame>,
    footer: Option<&'a Frame>,
}

fn set_once<'a>(slot: &mut Option<&'a Frame>, frame: &'a Frame) -> Result<()> {
    if slot.replace(frame).is_some() {
        return Err(Error::Structure(format!(
            "a page root can have only one {:?}",
            frame.kind
        )));
    }
    Ok(())
}

struct Pager<'a> {
    config: &'a Config,
    page: Rect,
    /// The page's content box, before templates.
    body: Rect,
    templates: Templates<'a>,
    sheets: Vec<Sheet>,
    head: Option<HeadRow>,
}

impl<'a> Pager<'a> {
    fn new(root: &'a Frame, config: &'a Config) -> Result<Self> {
        let mut templates = Templates::default();
        for child in &root.children {
            match child.kind {
                NodeKind::Extra => templates.extra.push(child),
                NodeKind::Cover => set_once(&mut templates.cover, child)?,
                NodeKind::Header => set_once(&mut templates.header, child)?,
                NodeKind::Footer => set_once(&mut templates.footer, child)?,
                _ => {}
            }
        }
        let mut pager = Self {
            config,
            page: root.calc,
            body: root.padding.inset(root.calc),
            templates,
            sheets: Vec::new(),
            head: None,
        };
        pager.new_page(0.0)?;
        Ok(pager)
    }

    fn new_page(&mut self, org: f64) -> Result<usize> {
        let slot = if self.sheets.is_empty() {
            self.templates.cover
        } else {
            self.templates.header
        };
        let mut top = self.body.y + slot.map_or(0.0, |f| f.outer().h);
        let bottom = self.body.bottom() - self.templates.footer.map_or(0.0, |f| f.outer().h);

        let mut items = Vec::new();
        if let Some(head) = &self.head {
            for d in &head.draws {
                let mut d = d.clone();
                d.calc.y += top - head.top;
                items.push(d);
            }
            top += head.height;
        }

        if bottom - top <= EPSILON {
            return Err(Error::Structure(format!(
                "page templates leave no room for content ({top}..{bottom})"
            )));
        }

        debug!("page {} at flow offset {org}", self.sheets.len() + 1);
        self.sheets.push(Sheet {
            org,
            top,
            bottom,
            items,
        });
        Ok(self.sheets.len() - 1)
    }

    /// The page following `i`, created at flow offset `org` if needed.
    fn next_page(&mut self, i: usize, org: f64) -> Result<usize> {
        if i + 1 < self.sheets.len() {
            Ok(i + 1)
        } else {
            self.new_page(org)
        }
    }

    /// The last page whose origin is not below flow offset `y`.
    fn page_at(&self, y: f64) -> usize {
        self.sheets
            .iter()
            .rposition(|s| s.org <= y + EPSILON)
            .unwrap_or(0)
    }

    /// Flow offset of the top of `draw`'s margin box.
    fn flow_y(&self, draw: &Draw, margin: Edges) -> f64 {
        draw.calc.y - margin.top - self.body.y
    }

    /// Put `draw` on page `i`, its box `dy` below the content top.
    fn put(&mut self, i: usize, mut draw: Draw, dy: f64) {
        let sheet = &mut self.sheets[i];
        draw.calc.y = sheet.top + dy;
        sheet.items.push(draw);
    }

    fn flow(&mut self, frame: &Frame) -> Result<()> {
        match frame.kind {
            NodeKind::Text => self.place_text(Draw::from_frame(frame), frame.margin),
            NodeKind::Line | NodeKind::QrCode | NodeKind::Barcode => {
                self.place(Draw::from_frame(frame), frame.margin)
            }
            NodeKind::Markup => {
                if let Some(block) = Draw::decoration(frame) {
                    self.place(block, frame.margin)?;
                }
                for span in &frame.children {
                    self.place(Draw::from_frame(span), span.margin)?;
                }
                Ok(())
            }
            NodeKind::Rect | NodeKind::Ellipse => {
                self.place(Draw::from_frame(frame), frame.margin)?;
                for child in &frame.children {
                    self.flow(child)?;
                }
                Ok(())
            }
            NodeKind::Table => self.table(frame),
            NodeKind::Stage | NodeKind::Box | NodeKind::Group | NodeKind::VBox | NodeKind::HBox => {
                for child in &frame.children {
                    self.flow(child)?;
                }
                Ok(())
            }
            NodeKind::Page
            | NodeKind::Header
            | NodeKind::Footer
            | NodeKind::Cover
            | NodeKind::Extra => Err(misplaced(frame.kind)),
        }
    }

    /// Place an unbreakable draw, moving it to the next page when it does
    /// not fit.
    fn place(&mut self, draw: Draw, margin: Edges) -> Result<()> {
        let y = self.flow_y(&draw, margin);
        let height = margin.outset(draw.calc).h;
        let i = self.page_at(y);
        let offset = y - self.sheets[i].org;
        let sheet = &self.sheets[i];
        let remaining = sheet.bottom - sheet.top - offset;

        match decide_break(remaining, &[height], false, 1, 1) {
            BreakDecision::Place => self.put(i, draw, offset + margin.top),
            _ if offset <= EPSILON => {
                warn!(
                    "{:?} of height {height} is taller than the page content, placed anyway",
                    draw.kind
                );
                self.put(i, draw, offset + margin.top);
            }
            _ => {
                let i = self.next_page(i, y)?;
                self.put(i, draw, margin.top);
            }
        }
        Ok(())
    }

    /// Place a text draw, splitting it between lines across pages.
    fn place_text(&mut self, draw: Draw, margin: Edges) -> Result<()> {
        let lines = draw.line_count();
        if lines == 0 {
            return self.place(draw, margin);
        }
        let line_h = (draw.calc.h - draw.padding.vertical()).max(0.0) / lines as f64;

        let mut rest = draw;
        let mut margin = margin;
        let y = self.flow_y(&rest, margin);
        let mut i = self.page_at(y);
        let mut offset = y - self.sheets[i].org;

        loop {
            let sheet = &self.sheets[i];
            let n = rest.line_count();
            let room =
                sheet.bottom - sheet.top - offset - margin.vertical() - rest.padding.vertical();
            let heights = vec![line_h; n];

            let take = match decide_break(room, &heights, true, self.config.orphans, self.config.widows)
            {
                BreakDecision::Place => n,
                BreakDecision::Split {
                    lines_on_current_page,
                } => lines_on_current_page,
                // already at the top: the next page has no more room
                BreakDecision::MoveToNextPage if offset <= EPSILON => {
                    let fit = fit_count(room, &heights);
                    if fit == 0 {
                        warn!("text line of height {line_h} does not fit a page, placed alone");
                    }
                    fit.max(1)
                }
                BreakDecision::MoveToNextPage => 0,
            };

            if take > 0 {
                let (head, tail) = split_text(&rest, take);
                self.put(i, head, offset + margin.top);
                match tail {
                    Some(tail) => {
                        debug!("text split after {take} of {n} lines");
                        rest = tail;
                        margin.top = 0.0;
                    }
                    None => return Ok(()),
                }
            }

            let y = self.flow_y(&rest, margin);
            i = self.next_page(i, y)?;
            offset = 0.0;
        }
    }

    fn table(&mut self, frame: &Frame) -> Result<()> {
        let head_cells = if frame.head {
            frame.cols.len().max(1).min(frame.children.len())
        } else {
            0
        };
        let (head, body) = frame.children.split_at(head_cells);
        for cell in head {
            self.flow(cell)?;
        }

        let outer_head = if head.is_empty() {
            None
        } else {
            let mut draws = Vec::new();
            for cell in head {
                collect(cell, &mut draws)?;
            }
            let top = head.iter().map(|c| c.outer().y).fold(f64::INFINITY, f64::min);
            let bottom = head
                .iter()
                .map(|c| c.outer().bottom())
                .fold(f64::NEG_INFINITY, f64::max);
            Some(self.head.replace(HeadRow {
                draws,
                top,
                height: bottom - top,
            }))
        };

        for cell in body {
            self.flow(cell)?;
        }

        if let Some(prev) = outer_head {
            self.head = prev;
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<Draw>> {
        let Pager {
            config,
            page,
            templates,
            sheets,
            ..
        } = self;
        let total = sheets.len();
        let mut out = Vec::new();

        for (i, sheet) in sheets.into_iter().enumerate() {
            if i > 0 {
                out.push(Draw::marker(page));
            }
            let mut draws = Vec::new();
            for extra in &templates.extra {
                collect_region(extra, &mut draws)?;
            }
            let slot = if i == 0 { templates.cover } else { templates.header };
            if let Some(region) = slot {
                collect_region(region, &mut draws)?;
            }
            draws.extend(sheet.items);
            if let Some(footer) = templates.footer {
                let start = draws.len();
                collect_region(footer, &mut draws)?;
                let dy = sheet.bottom - footer.outer().y;
                for d in &mut draws[start..] {
                    d.calc.y += dy;
                }
            }
            substitute(&mut draws, config, i + 1, total);
            out.extend(draws);
        }

        debug!("{total} pages, {} draws", out.len());
        Ok(out)
    }
}
