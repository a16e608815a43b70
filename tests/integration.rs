//! Integration tests for the Lamina layout pipeline.
//!
//! These tests exercise the full path from a node tree (or JSON) to the
//! paginated draw list. They verify:
//! - Stacking containers and tables place children where expected
//! - Text wraps within its width and never loses content
//! - Pages break at line boundaries, with markers between pages
//! - Templates and table heads repeat, and page tokens are filled in

use lamina::config::Config;
use lamina::font::FontManager;
use lamina::geom::{Dim, Edges, Rect};
use lamina::layout::{Frame, Layouter};
use lamina::markup::Tag;
use lamina::model::*;
use lamina::pager::split_text;
use lamina::text::TextSplitter;
use lamina::{layout_document, render_json, Draw, Error};

// ─── Helpers ────────────────────────────────────────────────────

fn make_rect(h: f64) -> Node {
    Node::new(NodeKind::Rect).with_dim(0.0, h)
}

fn make_sized(kind: NodeKind, w: f64, h: f64) -> Node {
    Node::new(kind).with_dim(w, h)
}

fn make_page(w: f64, h: f64, children: Vec<Node>) -> Node {
    Node::new(NodeKind::Page)
        .with_dim(w, h)
        .with_children(children)
}

fn make_region(kind: NodeKind, text: &str) -> Node {
    Node::new(kind).with_children(vec![Node::text(text)])
}

fn make_doc(root: Node) -> Document {
    Document {
        root,
        config: Config::default(),
        fonts: vec![],
    }
}

fn layout_frame(root: &Node) -> Frame {
    let fonts = FontManager::default();
    Layouter::new(&fonts)
        .layout_root(root, &Config::default())
        .unwrap()
}

fn draws(root: Node) -> Vec<Draw> {
    layout_document(&make_doc(root)).unwrap()
}

fn data(draws: &[Draw]) -> Vec<&str> {
    draws.iter().map(|d| d.data.as_str()).collect()
}

fn page_count(draws: &[Draw]) -> usize {
    draws.iter().filter(|d| d.is_marker()).count() + 1
}

fn walk<'a>(frame: &'a Frame, out: &mut Vec<&'a Frame>) {
    out.push(frame);
    for child in &frame.children {
        walk(child, out);
    }
}

// ─── Layout scenarios ───────────────────────────────────────────

#[test]
fn test_vbox_sub_height_scenario() {
    let mut vbox = make_sized(NodeKind::VBox, 360.0, 360.0)
        .with_children(vec![make_rect(0.0), make_rect(72.0), make_rect(0.0)]);
    vbox.sub = Dim::new(0.0, 36.0);

    let out = draws(vbox);
    let boxes: Vec<(f64, f64)> = out.iter().map(|d| (d.calc.y, d.calc.h)).collect();
    assert_eq!(boxes, vec![(0.0, 36.0), (36.0, 72.0), (108.0, 36.0)]);
    assert!(out.iter().all(|d| d.kind == NodeKind::Rect && d.calc.w == 360.0));
}

#[test]
fn test_hello_world_wraps_into_two_lines() {
    let fonts = FontManager::default();
    let lines = TextSplitter::new(&fonts, "helvetica", 10.0)
        .split_plain("Hello World", Tag::empty(), 120.0)
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.width <= 120.0));
    let joined: Vec<String> = lines.iter().map(|l| l.text()).collect();
    assert_eq!(joined.join(" "), "Hello World");

    let stage =
        make_sized(NodeKind::Stage, 120.0, 200.0).with_children(vec![Node::text("Hello World")]);
    let out = draws(stage);
    assert_eq!(data(&out), vec!["Hello\nWorld"]);
    assert!(out[0].calc.w <= 120.0);
}

#[test]
fn test_table_cells_scenario() {
    let mut table = Node::new(NodeKind::Table).with_children(vec![
        Node::new(NodeKind::Rect),
        Node::new(NodeKind::Rect),
        Node::new(NodeKind::Rect),
        Node::new(NodeKind::Rect),
    ]);
    table.cols = vec![100.0, 200.0];
    table.sub = Dim::new(0.0, 41.0);
    let stage = make_sized(NodeKind::Stage, 400.0, 400.0).with_children(vec![table]);

    let out = draws(stage);
    let origins: Vec<(f64, f64)> = out.iter().map(|d| (d.calc.x, d.calc.y)).collect();
    assert_eq!(
        origins,
        vec![(0.0, 0.0), (100.0, 0.0), (0.0, 41.0), (100.0, 41.0)]
    );
    assert_eq!(out[1].calc.w, 200.0);
    assert!(out.iter().all(|d| d.calc.h == 41.0));
}

#[test]
fn test_explicit_dim_is_idempotent() {
    let mut node = make_sized(NodeKind::Rect, 80.0, 30.0);
    node.margin = Some(Edges::uniform(4.0));
    let stage = make_sized(NodeKind::Stage, 200.0, 200.0).with_children(vec![node]);
    let frame = layout_frame(&stage);
    let rect = &frame.children[0];
    assert_eq!(rect.calc, Rect::new(4.0, 4.0, 80.0, 30.0));
    assert_eq!(rect.outer(), Rect::new(0.0, 0.0, 88.0, 38.0));
}

#[test]
fn test_calc_is_never_negative() {
    let mut tight = make_sized(NodeKind::Box, 50.0, 10.0).with_children(vec![
        Node::text("squeezed text that wraps"),
        make_rect(0.0),
    ]);
    tight.padding = Some(Edges::symmetric(20.0, 2.0));
    let mut hbox = Node::new(NodeKind::HBox).with_children(vec![
        make_sized(NodeKind::QrCode, 40.0, 0.0),
        Node::text("label"),
        Node::new(NodeKind::Barcode),
    ]);
    hbox.gap = 6.0;
    let root = make_sized(NodeKind::Stage, 300.0, 300.0).with_children(vec![
        tight,
        hbox,
        make_sized(NodeKind::Line, 0.0, 0.0),
    ]);

    let frame = layout_frame(&root);
    let mut all = Vec::new();
    walk(&frame, &mut all);
    assert!(all.len() > 5);
    for f in all {
        assert!(f.calc.w >= 0.0 && f.calc.h >= 0.0, "{:?} has {:?}", f.kind, f.calc);
    }
}

#[test]
fn test_vbox_height_sums_children() {
    let mut vbox = Node::new(NodeKind::VBox).with_children(vec![
        Node::text("first"),
        make_rect(17.0),
        Node::text("third\nline"),
    ]);
    vbox.gap = 5.0;
    let stage = make_sized(NodeKind::Stage, 200.0, 400.0).with_children(vec![vbox]);
    let frame = layout_frame(&stage);
    let vbox = &frame.children[0];
    let sum: f64 = vbox.children.iter().map(|c| c.calc.h).sum();
    assert_eq!(sum + 2.0 * 5.0, vbox.calc.h);
    assert_eq!(vbox.calc.h, 31.0 + 17.0 + 62.0 + 10.0);
}

#[test]
fn test_hbox_width_sums_children() {
    let mut hbox = Node::new(NodeKind::HBox).with_children(vec![
        make_sized(NodeKind::Rect, 20.0, 10.0),
        make_sized(NodeKind::Ellipse, 35.0, 10.0),
        make_sized(NodeKind::Rect, 45.0, 10.0),
    ]);
    hbox.gap = 3.0;
    let stage = make_sized(NodeKind::Stage, 400.0, 100.0).with_children(vec![hbox]);
    let frame = layout_frame(&stage);
    let hbox = &frame.children[0];
    let sum: f64 = hbox.children.iter().map(|c| c.calc.w).sum();
    assert_eq!(sum + 2.0 * 3.0, hbox.calc.w);
}

#[test]
fn test_table_width_and_row_heights() {
    let mut table = Node::new(NodeKind::Table).with_children(vec![
        Node::text("a"),
        Node::text("two\nlines"),
        Node::text("b"),
        Node::text("c"),
        Node::text("d"),
        Node::text("three\nline\ncell"),
    ]);
    table.cols = vec![60.0, 90.0, 120.0];
    table.gap = 4.0;
    let stage = make_sized(NodeKind::Stage, 400.0, 400.0).with_children(vec![table]);
    let frame = layout_frame(&stage);
    let table = &frame.children[0];

    assert_eq!(table.cols.iter().sum::<f64>(), table.calc.w);
    for row in table.children.chunks(3) {
        let h = row[0].calc.h;
        assert!(row.iter().all(|c| c.calc.h == h));
    }
    assert_eq!(table.children[0].calc.h, 62.0);
    assert_eq!(table.children[3].calc.y, 66.0);
    assert_eq!(table.calc.h, 62.0 + 4.0 + 93.0);
}

#[test]
fn test_alignment_and_markup_spans() {
    let mut markup = Node::text("# Title\nplain *bold* _it_");
    markup.kind = NodeKind::Markup;
    markup.align = Some(Align::Center);
    let stage = make_sized(NodeKind::Stage, 400.0, 200.0).with_children(vec![markup]);

    let out = draws(stage);
    // blank spans are not drawn
    assert_eq!(data(&out), vec!["Title", "plain ", "bold", "it"]);
    let fonts: Vec<String> = out
        .iter()
        .map(|d| d.font.as_ref().unwrap().name.clone())
        .collect();
    assert_eq!(
        fonts,
        vec!["helvetica-bold", "helvetica", "helvetica-bold", "helvetica-oblique"]
    );
    // centered: the markup box does not start at the left edge
    assert!(out[0].calc.x > 0.0);
    assert_eq!(out[1].calc.y, out[0].calc.y + 31.0);
}

#[test]
fn test_inherited_alignment_packs_hbox_rows() {
    for (align, xs) in [(Align::Right, [268.0, 284.0]), (Align::Center, [134.0, 150.0])] {
        let row = Node::new(NodeKind::HBox).with_children(vec![Node::text("a"), Node::text("b")]);
        let mut stage = make_sized(NodeKind::Stage, 300.0, 100.0).with_children(vec![row]);
        stage.align = Some(align);

        let out = draws(stage);
        assert_eq!(data(&out), vec!["a", "b"]);
        let got: Vec<f64> = out.iter().map(|d| d.calc.x).collect();
        assert_eq!(got, xs.to_vec(), "{align:?}");
        assert!(out.iter().all(|d| d.calc.w == 16.0));
    }
}

#[test]
fn test_stacked_leaves_use_sub_size() {
    let mut vbox = Node::new(NodeKind::VBox).with_children(vec![
        Node::new(NodeKind::Line),
        make_rect(0.0),
        Node::new(NodeKind::Barcode),
    ]);
    vbox.sub = Dim::new(0.0, 36.0);
    let stage = make_sized(NodeKind::Stage, 200.0, 200.0).with_children(vec![vbox]);

    let out = draws(stage);
    let kinds: Vec<NodeKind> = out.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Line, NodeKind::Rect, NodeKind::Barcode]);
    let boxes: Vec<(f64, f64)> = out.iter().map(|d| (d.calc.y, d.calc.h)).collect();
    assert_eq!(boxes, vec![(0.0, 36.0), (36.0, 36.0), (72.0, 36.0)]);
}

#[test]
fn test_bordered_markup_keeps_its_box() {
    let mut markup = Node::text("plain *bold*");
    markup.kind = NodeKind::Markup;
    markup.border = Some(Edges::uniform(1.0));
    markup.padding = Some(Edges::uniform(2.0));
    let stage = make_sized(NodeKind::Stage, 300.0, 100.0).with_children(vec![markup]);

    let out = draws(stage);
    assert_eq!(data(&out), vec!["", "plain ", "bold"]);
    let block = &out[0];
    assert_eq!(block.kind, NodeKind::Markup);
    assert_eq!(block.border, Some(Edges::uniform(1.0)));
    assert_eq!(block.calc.h, 31.0 + 4.0);
    assert!(block.font.is_none());
    assert_eq!((out[1].calc.x, out[1].calc.y), (2.0, 2.0));

    // unbordered markup only emits its spans
    let mut plain = Node::text("plain *bold*");
    plain.kind = NodeKind::Markup;
    let out = draws(make_sized(NodeKind::Stage, 300.0, 100.0).with_children(vec![plain]));
    assert_eq!(data(&out), vec!["plain ", "bold"]);
}

// ─── Text properties ────────────────────────────────────────────

#[test]
fn test_wrapped_lines_fit_their_width() {
    let fonts = FontManager::default();
    let splitter = TextSplitter::new(&fonts, "helvetica", 10.0);
    let text = "The quick brown fox jumps over the lazy dog, then a well-known \
                state-of-the-art hyphenated word appears.";
    for width in [40.0, 75.0, 120.0, 200.0, 333.0] {
        let lines = splitter.split_plain(text, Tag::empty(), width).unwrap();
        for line in &lines {
            let single_glyph = line.text().chars().count() == 1;
            assert!(line.width <= width + 1e-6 || single_glyph, "{:?} at {}", line.text(), width);
        }
        let rebuilt: String = lines.iter().map(|l| l.text()).collect::<Vec<_>>().join(" ");
        let squash = |s: &str| s.replace([' ', '-'], "");
        assert_eq!(squash(&rebuilt), squash(text));
    }
}

#[test]
fn test_forced_break_terminates_and_keeps_content() {
    let fonts = FontManager::default();
    let splitter = TextSplitter::new(&fonts, "helvetica", 10.0);
    let word = "Supercalifragilisticexpialidocious";
    for width in [0.5, 10.0, 30.0] {
        let lines = splitter.split_plain(word, Tag::empty(), width).unwrap();
        let rebuilt: String = lines.iter().map(|l| l.text()).collect();
        assert_eq!(rebuilt, word);
        assert!(lines.len() > 1);
    }
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_text_split_across_two_pages() {
    let page = make_page(200.0, 80.0, vec![Node::text("one\ntwo\nthree\nfour")]);
    let out = draws(page);
    assert_eq!(data(&out), vec!["one\ntwo", "", "three\nfour"]);
    assert!(out[1].is_marker());
    assert_eq!(out[2].calc.y, 0.0);
    assert_eq!(out[2].calc.h, 62.0);
}

#[test]
fn test_one_line_per_page() {
    let page = make_page(200.0, 41.0, vec![Node::text("Page1\nPage2\nPage3")]);
    let out = draws(page);
    assert_eq!(page_count(&out), 3);
    let texts: Vec<&str> = out.iter().filter(|d| !d.is_marker()).map(|d| d.data.as_str()).collect();
    assert_eq!(texts, vec!["Page1", "Page2", "Page3"]);
}

#[test]
fn test_pagination_conserves_leaves() {
    let mut children = Vec::new();
    for i in 0..5 {
        children.push(Node::text(&format!("p{i} a\np{i} b\np{i} c")));
        if i % 2 == 0 {
            children.push(make_rect(20.0));
        }
    }
    let mut vbox = Node::new(NodeKind::VBox).with_children(children);
    vbox.gap = 2.0;
    let out = draws(make_page(200.0, 100.0, vec![vbox]));

    assert!(page_count(&out) > 1);
    let rects = out.iter().filter(|d| d.kind == NodeKind::Rect).count();
    assert_eq!(rects, 3);
    let lines: Vec<&str> = out
        .iter()
        .filter(|d| d.kind == NodeKind::Text)
        .flat_map(|d| d.data.split('\n'))
        .collect();
    let expected: Vec<String> = (0..5)
        .flat_map(|i| ["a", "b", "c"].map(|s| format!("p{i} {s}")))
        .collect();
    assert_eq!(lines, expected);
    // nothing spills past a page
    assert!(out.iter().filter(|d| !d.is_marker()).all(|d| d.calc.bottom() <= 100.0));
}

#[test]
fn test_table_head_repeats() {
    let rows = ["Name", "r1", "r2", "r3", "r4", "r5"];
    let mut table = Node::new(NodeKind::Table)
        .with_children(rows.iter().map(|r| Node::text(r)).collect());
    table.head = true;
    let out = draws(make_page(300.0, 120.0, vec![table]));

    assert_eq!(
        data(&out),
        vec!["Name", "r1", "r2", "", "Name", "r3", "r4", "", "Name", "r5"]
    );
    let ys: Vec<f64> = out[4..7].iter().map(|d| d.calc.y).collect();
    assert_eq!(ys, vec![0.0, 31.0, 62.0]);
}

#[test]
fn test_footer_and_page_tokens() {
    let page = make_page(
        300.0,
        100.0,
        vec![
            make_region(NodeKind::Footer, "µP/µT"),
            Node::text("a\nb\nc\nd"),
        ],
    );
    let out = draws(page);
    assert_eq!(data(&out), vec!["a\nb", "1/2", "", "c\nd", "2/2"]);
    assert_eq!(out[1].calc.y, 69.0);
    assert_eq!(out[4].calc.y, 69.0);
}

#[test]
fn test_cover_then_header() {
    let page = make_page(
        300.0,
        100.0,
        vec![
            make_region(NodeKind::Cover, "Cover"),
            make_region(NodeKind::Header, "Head µP"),
            Node::text("a\nb\nc\nd"),
        ],
    );
    let out = draws(page);
    assert_eq!(data(&out), vec!["Cover", "a\nb", "", "Head 2", "c\nd"]);
    assert_eq!(out[1].calc.y, 31.0);
    assert_eq!(out[4].calc.y, 31.0);
}

#[test]
fn test_extra_on_every_page() {
    let mut extra = make_region(NodeKind::Extra, "draft");
    extra.children[0].pos.y = 90.0;
    let page = make_page(300.0, 100.0, vec![extra, Node::text("a\nb\nc\nd")]);
    let out = draws(page);
    assert_eq!(data(&out), vec!["draft", "a\nb\nc", "", "draft", "d"]);
}

#[test]
fn test_split_text_reconstructs() {
    let page = make_page(200.0, 400.0, vec![Node::text("x\ny\nz")]);
    let out = draws(page);
    let (head, tail) = split_text(&out[0], 2);
    let tail = tail.unwrap();
    assert_eq!(format!("{}\n{}", head.data, tail.data), out[0].data);
    assert_eq!(tail.calc.y, head.calc.y + head.calc.h);
}

// ─── Errors and JSON ────────────────────────────────────────────

#[test]
fn test_template_outside_page_root_is_structural() {
    let vbox = Node::new(NodeKind::VBox).with_children(vec![make_region(NodeKind::Footer, "x")]);
    let err = layout_document(&make_doc(make_page(200.0, 100.0, vec![vbox]))).unwrap_err();
    assert!(matches!(err, Error::Structure(_)));
}

#[test]
fn test_stage_without_height_fails() {
    let err = layout_document(&make_doc(make_sized(NodeKind::Stage, 200.0, 0.0))).unwrap_err();
    assert!(matches!(err, Error::Measure(_)));
}

#[test]
fn test_unknown_font_fails() {
    let mut text = Node::text("x");
    text.font = Some(FontSpec {
        name: Some("nowhere".to_string()),
        ..Default::default()
    });
    let err = layout_document(&make_doc(make_sized(NodeKind::Stage, 200.0, 50.0).with_children(vec![text])))
        .unwrap_err();
    assert!(matches!(err, Error::Font(_)));
}

#[test]
fn test_render_json_end_to_end() {
    let json = r#"{
        "config": { "totalToken": "%T" },
        "root": {
            "kind": "page",
            "dim": { "w": 300, "h": 80 },
            "children": [
                { "kind": "footer", "children": [ { "kind": "text", "data": "of %T" } ] },
                { "kind": "vbox", "children": [
                    { "kind": "text", "data": "first" },
                    { "kind": "rect", "dim": { "h": 20 }, "stroke": 2 }
                ] }
            ]
        }
    }"#;
    let out: serde_json::Value = serde_json::from_str(&render_json(json).unwrap()).unwrap();
    let items = out.as_array().unwrap();
    let kinds: Vec<&str> = items.iter().map(|d| d["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["text", "text", "page", "rect", "text"]);
    assert_eq!(items[1]["data"], "of 2");
    assert_eq!(items[3]["stroke"], 2.0);
}

#[test]
fn test_invalid_json_has_hint() {
    let err = render_json(r#"{ "root": { "kind": "stage", } }"#).unwrap_err();
    match err {
        Error::Parse { hint, .. } => assert!(hint.contains("trailing commas")),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_unknown_kind_is_a_schema_error() {
    let err = render_json(r#"{ "root": { "kind": "image" } }"#).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(err.to_string().contains("Hint"));
}
