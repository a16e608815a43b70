//! # Lamina CLI
//!
//! Usage:
//!   lamina input.json -o draws.json
//!   echo '{ ... }' | lamina
//!   lamina label.json --config printer.json
//!   lamina --example > label.json
//!
//! Set `RUST_LOG=debug` to see page and font decisions.

use std::env;
use std::fs;
use std::io::{self, Read};

use lamina::model::Document;
use lamina::Config;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_label_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

/// The value following `flag`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn run(args: &[String]) -> Result<(), String> {
    // Read input: the first positional argument, or stdin
    let input_path = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, a)| !a.starts_with('-') && !matches!(args[i - 1].as_str(), "-o" | "--config"))
        .map(|(_, a)| a.as_str());
    let input = match input_path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read input file '{}': {}", path, e))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buf
        }
    };

    let mut document: Document = serde_json::from_str(&input)
        .map_err(|e| lamina::Error::from(e).to_string())?;

    if let Some(path) = flag_value(args, "--config") {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;
        document.config = Config::from_json(&json).map_err(|e| e.to_string())?;
    }

    let draws = lamina::layout_document(&document).map_err(|e| e.to_string())?;
    let pages = draws.iter().filter(|d| d.is_marker()).count() + 1;
    let json = serde_json::to_string_pretty(&draws).map_err(|e| e.to_string())?;

    match flag_value(args, "-o") {
        Some(path) => {
            fs::write(path, json).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
            eprintln!("✓ Written {} draws on {} pages to {}", draws.len(), pages, path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn example_label_json() -> &'static str {
    r##"{
  "config": { "dpi": 203.2 },
  "root": {
    "kind": "page",
    "dim": { "w": 800, "h": 480 },
    "padding": { "top": 16, "right": 16, "bottom": 16, "left": 16 },
    "children": [
      {
        "kind": "cover",
        "children": [
          { "kind": "markup", "data": "# Packing list", "font": { "size": 14 } }
        ]
      },
      {
        "kind": "header",
        "children": [
          { "kind": "text", "data": "Packing list (continued)" }
        ]
      },
      {
        "kind": "footer",
        "children": [
          { "kind": "text", "data": "Page µP of µT", "align": "right" }
        ]
      },
      {
        "kind": "vbox",
        "gap": 8,
        "children": [
          {
            "kind": "hbox",
            "gap": 16,
            "children": [
              {
                "kind": "barcode",
                "dim": { "w": 360, "h": 80 },
                "code": { "name": "code128", "human": true, "wide": 2 },
                "data": "SHIP-2026-0042"
              },
              { "kind": "qrcode", "dim": { "w": 80 }, "data": "https://example.com/s/0042" }
            ]
          },
          { "kind": "line", "dim": { "w": 768 }, "stroke": 2 },
          {
            "kind": "table",
            "cols": [120, 0, 120],
            "head": true,
            "sub": { "h": 32 },
            "children": [
              { "kind": "markup", "data": "*Item*" },
              { "kind": "markup", "data": "*Description*" },
              { "kind": "markup", "data": "*Qty*" },
              { "kind": "text", "data": "A-100" },
              { "kind": "text", "data": "Thermal labels, 100 x 60 mm" },
              { "kind": "text", "data": "12" },
              { "kind": "text", "data": "B-200" },
              { "kind": "text", "data": "Ribbon, wax, 110 mm x 74 m" },
              { "kind": "text", "data": "4" }
            ]
          },
          {
            "kind": "text",
            "data": "Handle with care. Keep dry and away from direct sunlight.\nReturns: see `example.com/returns` within 30 days."
          }
        ]
      }
    ]
  }
}
"##
}
