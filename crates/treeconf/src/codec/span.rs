//! Mapping parser errors onto source spans.

use miette::{NamedSource, SourceSpan};

use super::error::{DecodeError, PAYLOAD_NAME};

/// Converts a byte offset to a [`SourceSpan`] covering the token there.
pub(crate) fn offset_to_span(offset: usize, content: &str) -> SourceSpan {
    let offset = offset.min(content.len());
    let remaining = content.get(offset..).unwrap_or_default();
    let len = remaining
        .find(|c: char| c.is_whitespace() || c == ',' || c == '}' || c == ']')
        .unwrap_or(remaining.len().min(20))
        .max(1);

    SourceSpan::new(offset.into(), len)
}

/// Converts a 1-indexed line/column pair to a byte offset.
pub(crate) fn line_col_to_offset(content: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;

    for (i, l) in content.lines().enumerate() {
        if (i + 1) == line {
            return offset + col.saturating_sub(1);
        }

        offset += l.len() + 1;
    }

    offset
}

fn parse_error(
    format: &'static str,
    content: &str,
    span: SourceSpan,
    message: String,
    help: &str,
) -> DecodeError {
    DecodeError::Parse {
        format,
        src: NamedSource::new(PAYLOAD_NAME, content.to_string()),
        span,
        message,
        help: help.to_string(),
    }
}

pub(crate) fn json_error(e: &serde_json::Error, content: &str) -> DecodeError {
    let offset = line_col_to_offset(content, e.line(), e.column());

    parse_error(
        "JSON",
        content,
        offset_to_span(offset, content),
        e.to_string(),
        "check for missing commas, quotes, or brackets",
    )
}

#[cfg(feature = "toml")]
pub(crate) fn toml_error(e: &toml::de::Error, content: &str) -> DecodeError {
    const HELP: &str = "check for missing quotes, invalid values, or syntax errors";

    match e.span() {
        Some(span) => parse_error(
            "TOML",
            content,
            SourceSpan::new(span.start.into(), span.end.saturating_sub(span.start)),
            e.message().to_string(),
            HELP,
        ),

        None => DecodeError::ParseNoSpan {
            format: "TOML",
            message: e.to_string(),
            help: HELP.to_string(),
        },
    }
}

#[cfg(feature = "yaml")]
pub(crate) fn yaml_error(e: &serde_saphyr::Error, content: &str) -> DecodeError {
    const HELP: &str = "check indentation and ensure proper YAML syntax";
    let msg = e.to_string();

    match extract_yaml_location(&msg) {
        Some((line, col)) => {
            let offset = line_col_to_offset(content, line, col);
            parse_error("YAML", content, offset_to_span(offset, content), msg, HELP)
        }

        None => DecodeError::ParseNoSpan {
            format: "YAML",
            message: msg,
            help: HELP.to_string(),
        },
    }
}

/// Pulls `line N ... column M` out of a YAML error message.
#[cfg(feature = "yaml")]
pub(crate) fn extract_yaml_location(msg: &str) -> Option<(usize, usize)> {
    let line_idx = msg.find("line ")?;
    let after_line = &msg[(line_idx + 5)..];
    let line_end = after_line.find(|c: char| !c.is_ascii_digit())?;
    let line = after_line[..line_end].parse::<usize>().ok()?;

    let col_idx = after_line.find("column ")?;
    let after_col = &after_line[(col_idx + 7)..];
    let col_end = after_col
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_col.len());
    let col = after_col[..col_end].parse::<usize>().ok()?;

    Some((line, col))
}
