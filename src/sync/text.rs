//! Byte-range surgery on source text.
//!
//! All offsets are byte offsets taken from parser spans, so they always sit
//! on character boundaries.

use crate::base::Span;
use crate::syntax::PrintOptions;
use std::ops::Range;

fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t')
}

/// Start of the line containing `offset`.
fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Leading whitespace of the line containing `offset`.
pub(super) fn line_indent(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let rest = &source[start..];
    let width = rest.bytes().take_while(|b| is_blank(*b)).count();
    &rest[..width]
}

/// Range to delete when removing the construct at `span`.
///
/// A construct alone on its line takes its indentation and one line break
/// with it; one sharing a line takes the blanks before it.
pub(super) fn removal_range(source: &str, span: Span) -> Range<usize> {
    let bytes = source.as_bytes();
    let (start, end) = (span.start_offset(), span.end_offset().min(source.len()));

    let mut from = start;
    while from > 0 && is_blank(bytes[from - 1]) {
        from -= 1;
    }
    let own_line = from == 0 || bytes[from - 1] == b'\n';

    let mut to = end;
    if own_line {
        while to < bytes.len() && is_blank(bytes[to]) {
            to += 1;
        }
        if bytes[to..].starts_with(b"\r\n") {
            to += 2;
        } else if to < bytes.len() && bytes[to] == b'\n' {
            to += 1;
        } else if to < bytes.len() {
            // Something follows on the same line.
            to = end;
            from = start;
        }
    }
    from..to
}

/// `source` without the construct at `span`.
pub(super) fn remove(source: &str, span: Span) -> String {
    let mut result = source.to_string();
    result.replace_range(removal_range(source, span), "");
    result
}

/// Offset in `text` of the `;` ending a bodiless header or of the `}`
/// closing the first top-level `{`.
///
/// Quoted names, strings and comments are skipped. `None` unless that byte is
/// the last non-blank one of `text`, as for a body left unclosed.
fn terminator(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    let found = loop {
        let byte = *bytes.get(i)?;
        match byte {
            b'\'' | b'"' => {
                i += 1;
                while *bytes.get(i)? != byte {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i += text[i..].find('\n')?;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2 + text[i + 2..].find("*/")? + 1;
            }
            b';' if depth == 0 => break i,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    break i;
                }
            }
            _ => {}
        }
        i += 1;
    };
    (found + 1 == text.trim_end().len()).then_some(found)
}

/// Insert `statement` as the last member of the construct at `span`.
///
/// A `;`-terminated construct gets a body. `None` when the construct has no
/// terminator of its own.
pub(super) fn insert_member(
    source: &str,
    span: Span,
    statement: &str,
    options: &PrintOptions,
) -> Option<String> {
    let (start, end) = (span.start_offset(), span.end_offset().min(source.len()));
    let text = &source[start..end];
    let close = start + terminator(text)?;
    let indent = line_indent(source, start);
    let child = format!("{indent}{}", options.indent(1));
    let statement = statement
        .trim()
        .lines()
        .collect::<Vec<_>>()
        .join(format!("\n{child}").as_str());

    let mut result = source.to_string();
    match source.as_bytes()[close] {
        b'}' => {
            let bytes = source.as_bytes();
            let mut cut = close;
            while cut > start && is_blank(bytes[cut - 1]) {
                cut -= 1;
            }
            if cut > start && bytes[cut - 1] == b'\n' {
                // Closing brace on its own line.
                result.insert_str(cut, &format!("{child}{statement}\n"));
            } else {
                result.replace_range(cut..close, &format!("\n{child}{statement}\n{indent}"));
            }
        }
        b';' => {
            result.replace_range(
                close..close + 1,
                &format!(" {{\n{child}{statement}\n{indent}}}"),
            );
        }
        _ => return None,
    }
    Some(result)
}

/// Append `statement` as a new top-level line.
pub(super) fn append(source: &str, statement: &str) -> String {
    let mut result = source.trim_end().to_string();
    if !result.is_empty() {
        result.push('\n');
    }
    result.push_str(statement.trim());
    result.push('\n');
    result
}

/// `snippet` with `indent` stripped from every line after the first.
pub(super) fn dedent(snippet: &str, indent: &str) -> String {
    snippet
        .lines()
        .enumerate()
        .map(|(i, line)| match i {
            0 => line,
            _ => line.strip_prefix(indent).unwrap_or(line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace the bytes of `span` with `replacement`.
pub(super) fn replace(source: &str, span: Span, replacement: &str) -> String {
    let mut result = source.to_string();
    result.replace_range(span.start_offset()..span.end_offset().min(source.len()), replacement);
    result
}
