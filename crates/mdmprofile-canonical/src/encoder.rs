//! XML property-list writer for the canonical text form.
//!
//! Output layout: XML declaration, plist DOCTYPE, `<plist version="1.0">`, the
//! root value at depth zero, one indent unit per nesting level and a trailing
//! newline. Empty containers keep separate open and close tags. Dictionary
//! keys are written in the order they are stored, so the bytes are only
//! canonical when the input came out of the canonicalizer.

use crate::value::Value;

/// XML declaration written at the top of every document.
pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
/// DOCTYPE line written after the declaration.
pub const PLIST_DOCTYPE: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;
/// Default indent unit.
pub const DEFAULT_INDENT: &str = "\t";

/// Encodes `value` as a complete XML property list.
pub fn encode_plist(value: &Value, indent: &str) -> String {
    let mut out = String::new();
    out.push_str(XML_HEADER);
    out.push('\n');
    out.push_str(PLIST_DOCTYPE);
    out.push('\n');
    out.push_str("<plist version=\"1.0\">\n");
    write_value(&mut out, value, 0, indent);
    out.push_str("</plist>\n");
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, indent: &str) {
    match value {
        Value::Dictionary(map) => {
            line(out, depth, indent, "<dict>");
            for (key, child) in map {
                line(
                    out,
                    depth + 1,
                    indent,
                    &format!("<key>{}</key>", escape(key)),
                );
                write_value(out, child, depth + 1, indent);
            }
            line(out, depth, indent, "</dict>");
        }
        Value::Array(items) => {
            line(out, depth, indent, "<array>");
            for item in items {
                write_value(out, item, depth + 1, indent);
            }
            line(out, depth, indent, "</array>");
        }
        Value::String(s) => line(out, depth, indent, &format!("<string>{}</string>", escape(s))),
        Value::Integer(n) => line(out, depth, indent, &format!("<integer>{}</integer>", n)),
        Value::Boolean(true) => line(out, depth, indent, "<true/>"),
        Value::Boolean(false) => line(out, depth, indent, "<false/>"),
    }
}

fn line(out: &mut String, depth: usize, indent: &str, text: &str) {
    for _ in 0..depth {
        out.push_str(indent);
    }
    out.push_str(text);
    out.push('\n');
}

/// Escapes text content. Carriage returns are written as character references
/// because XML readers fold them into line feeds otherwise.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#13;"),
            other => escaped.push(other),
        }
    }
    escaped
}
