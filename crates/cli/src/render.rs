//! Text rendering of decoded values for the shell.
//!
//! Trees print in the brace-delimited text form:
//!
//! ```text
//! "common"
//! {
//!     "name"      "Portal"
//!     "gameid"    "400"
//! }
//! ```

use appinfo::{SectionTree, Value};
use std::fmt::Write;

const INDENT: &str = "    ";

/// Renders a scalar for `GET`; sections render as a full tree.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Section(tree) => render_tree(tree),
        other => scalar(other),
    }
}

/// Renders every entry of `tree`, one per line, nested sections in braces.
pub fn render_tree(tree: &SectionTree) -> String {
    let mut out = String::new();
    write_tree(&mut out, tree, 0);
    out
}

fn write_tree(out: &mut String, tree: &SectionTree, depth: usize) {
    let pad = INDENT.repeat(depth);
    for (key, value) in tree.iter() {
        match value {
            Value::Section(child) => {
                let _ = writeln!(out, "{}{}", pad, quoted(key));
                let _ = writeln!(out, "{}{{", pad);
                write_tree(out, child, depth + 1);
                let _ = writeln!(out, "{}}}", pad);
            }
            other => {
                let _ = writeln!(out, "{}{}\t\t{}", pad, quoted(key), quoted(scalar(other).as_bytes()));
            }
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Section(tree) => format!("<section: {} keys>", tree.len()),
        Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => hex(bytes),
        },
        Value::Int32(n) => n.to_string(),
        Value::Int64(n) => n.to_string(),
    }
}

fn quoted(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Lower-case hex, used for checksums and non-UTF-8 strings.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    })
}
