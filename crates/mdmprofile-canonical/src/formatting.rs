//! Whitespace check for serialized property lists.
//!
//! The comparator only sees parsed structure; this check holds the text
//! itself to the canonical layout, so hand-authored plists have to go through
//! the canonicalizer before they are accepted.

use regex::Regex;
use std::sync::OnceLock;

use crate::encoder::DEFAULT_INDENT;

/// Error describing the first non-canonical line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormattingError {
    /// Leading whitespace is not `expected` indent units.
    #[error("line {line}: expected indentation depth {expected}, found {found:?}")]
    Indentation {
        /// 1-based line number.
        line: usize,
        /// Expected nesting depth.
        expected: usize,
        /// Leading whitespace actually present.
        found: String,
    },
    /// The line ends in whitespace.
    #[error("line {line}: trailing whitespace")]
    TrailingWhitespace {
        /// 1-based line number.
        line: usize,
    },
    /// A closing tag without an opener, or an opener never closed.
    #[error("line {line}: unbalanced <{tag}> tag")]
    UnbalancedTag {
        /// 1-based line number.
        line: usize,
        /// Tag name.
        tag: String,
    },
}

fn container_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<(/?)(dict|array)\s*(/?)>").expect("invalid regex"))
}

fn text_open_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<(string|key)>").expect("invalid regex"))
}

/// Checks `serialized` against the canonical layout with a tab indent.
pub fn check_indentation(serialized: &str) -> Result<(), FormattingError> {
    check_indentation_with(serialized, DEFAULT_INDENT)
}

/// Checks `serialized` against the canonical layout with a custom indent.
///
/// Depth rises after each `<dict>`/`<array>` and falls at each closing tag;
/// the `<plist>` wrapper adds no depth. Lines inside a multi-line `<string>`
/// or `<key>` are content and are not checked. Empty lines are skipped; a
/// line holding only whitespace is trailing whitespace.
pub fn check_indentation_with(serialized: &str, indent: &str) -> Result<(), FormattingError> {
    let result = scan(serialized, indent);
    match &result {
        Ok(()) => tracing::debug!(op = "check_indentation", "formatting ok"),
        Err(err) => tracing::debug!(op = "check_indentation", error = %err, "formatting rejected"),
    }
    result
}

fn scan(serialized: &str, indent: &str) -> Result<(), FormattingError> {
    let mut depth: usize = 0;
    let mut open_stack: Vec<(String, usize)> = Vec::new();
    let mut in_text: Option<String> = None;
    let mut last_line = 0;

    for (idx, raw_line) in serialized.split('\n').enumerate() {
        let line = idx + 1;
        last_line = line;

        if let Some(close) = &in_text {
            if raw_line.contains(close.as_str()) {
                in_text = None;
            }
            continue;
        }

        if raw_line.is_empty() {
            continue;
        }
        if raw_line.trim().is_empty() {
            return Err(FormattingError::TrailingWhitespace { line });
        }

        let content = raw_line.trim_start_matches([' ', '\t']);
        let leading = &raw_line[..raw_line.len() - content.len()];

        let starts_with_close = content.starts_with("</dict>") || content.starts_with("</array>");
        let expected = if starts_with_close {
            depth.saturating_sub(1)
        } else {
            depth
        };
        if leading != indent.repeat(expected) {
            return Err(FormattingError::Indentation {
                line,
                expected,
                found: leading.to_string(),
            });
        }

        if let Some(caps) = text_open_tag().captures(content) {
            let close = format!("</{}>", &caps[1]);
            if !content.contains(close.as_str()) {
                in_text = Some(close);
                continue;
            }
        }

        if content.ends_with(char::is_whitespace) {
            return Err(FormattingError::TrailingWhitespace { line });
        }

        for caps in container_tag().captures_iter(content) {
            let tag = caps[2].to_string();
            let closing = !caps[1].is_empty();
            let self_closing = !caps[3].is_empty();
            if self_closing {
                continue;
            }
            if closing {
                match open_stack.pop() {
                    Some((open, _)) if open == tag => depth -= 1,
                    _ => return Err(FormattingError::UnbalancedTag { line, tag }),
                }
            } else {
                open_stack.push((tag, line));
                depth += 1;
            }
        }
    }

    if let Some(close) = in_text {
        return Err(FormattingError::UnbalancedTag {
            line: last_line,
            tag: close.trim_start_matches("</").trim_end_matches('>').to_string(),
        });
    }
    if let Some((tag, line)) = open_stack.pop() {
        return Err(FormattingError::UnbalancedTag { line, tag });
    }
    Ok(())
}
