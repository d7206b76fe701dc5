//! Minimal meta-block extractor for JSX/TSX blog sources.
//!
//! Pulls the `export const meta = { ... }` object literal out of a post
//! source and reads its plain-string fields:
//! - slug, title, image, date, author, canonical
//! - description (or `excerpt` — description wins when both appear)
//! - tags (array of strings)
//!
//! The scan is structural, not a JS parse: comments and string literals are
//! honored while locating the block and while splitting entries, and any
//! value that is not a plain string (or a string array, for `tags`) is
//! skipped. Template-literal values are read verbatim, without interpolation.
//!
//! Zero external dependencies — pure Rust, byte-level scanning.

use crate::types::PostMeta;
use std::path::Path;

/// Read the meta block from a post source file.
/// Returns default (empty) metadata on any read or parse failure.
pub fn read_post_meta(path: &Path) -> PostMeta {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return PostMeta::default(),
    };
    parse_meta_block(&source).unwrap_or_default()
}

/// Parse the first `const meta = { ... }` block out of source text.
///
/// Returns `None` when no such block exists or its braces never balance.
/// A block that parses but contains no recognized string fields yields
/// `Some(PostMeta::default())`.
pub fn parse_meta_block(source: &str) -> Option<PostMeta> {
    let block = find_meta_object(source)?;
    Some(parse_fields(block))
}

// ---------------------------------------------------------------------------
// Block location
// ---------------------------------------------------------------------------

/// Locate the object literal assigned to `meta` and return its interior
/// (text between the outer braces).
///
/// The identifier must be declared (`const`/`let`/`var meta =`), which keeps
/// JSX attributes like `<Helmet meta={...}>` from matching. Comments and
/// strings encountered on the way are skipped, so a commented-out block
/// never wins over the real one.
fn find_meta_object(source: &str) -> Option<&str> {
    let bytes = source.as_bytes();
    let mut pos = 0;
    let mut prev_ident: Option<&str> = None;

    while pos < bytes.len() {
        match bytes[pos] {
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = skip_line_comment(bytes, pos);
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_block_comment(bytes, pos);
            }
            b'"' | b'\'' | b'`' => {
                pos = skip_string_raw(bytes, pos);
            }
            c if is_ident_start(c) => {
                let start = pos;
                while pos < bytes.len() && is_ident_char(bytes[pos]) {
                    pos += 1;
                }
                let word = &source[start..pos];
                if word == "meta" && matches!(prev_ident, Some("const" | "let" | "var")) {
                    let mut p = skip_ws_and_comments(bytes, pos);
                    if bytes.get(p) == Some(&b'=') {
                        p = skip_ws_and_comments(bytes, p + 1);
                        if bytes.get(p) == Some(&b'{') {
                            let end = scan_object_end(bytes, p)?;
                            return Some(&source[p + 1..end]);
                        }
                    }
                }
                prev_ident = Some(word);
            }
            _ => pos += 1,
        }
    }
    None
}

/// Find the `}` matching the `{` at `open`. Returns its index.
fn scan_object_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = open + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = skip_line_comment(bytes, pos);
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_block_comment(bytes, pos);
            }
            b'"' | b'\'' | b'`' => {
                pos = skip_string_raw(bytes, pos);
            }
            b'{' => {
                depth += 1;
                pos += 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
                pos += 1;
            }
            _ => pos += 1,
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

/// Split the block interior into `key: value` entries and collect the
/// recognized string fields.
fn parse_fields(block: &str) -> PostMeta {
    let bytes = block.as_bytes();
    let mut meta = PostMeta::default();
    let mut description: Option<String> = None;
    let mut excerpt: Option<String> = None;
    let mut pos = 0;

    loop {
        pos = skip_ws_and_comments(bytes, pos);
        while bytes.get(pos) == Some(&b',') {
            pos = skip_ws_and_comments(bytes, pos + 1);
        }
        if pos >= bytes.len() {
            break;
        }

        let (key, after_key) = match read_key(block, pos) {
            Some(k) => k,
            None => {
                // Stray token; resync past it. skip_entry stops before an
                // unbalanced closer, so force at least one byte of progress.
                let next = skip_entry(bytes, pos);
                pos = next.max(pos + 1);
                continue;
            }
        };
        pos = skip_ws_and_comments(bytes, after_key);
        if bytes.get(pos) != Some(&b':') {
            pos = skip_entry(bytes, pos);
            continue;
        }
        pos = skip_ws_and_comments(bytes, pos + 1);

        match key.as_str() {
            "tags" => match read_string_array(block, pos) {
                Some((values, next)) => {
                    meta.tags = values;
                    pos = next;
                }
                None => pos = skip_entry(bytes, pos),
            },
            "slug" | "title" | "description" | "excerpt" | "image" | "date" | "author"
            | "canonical" => match read_string_literal(block, pos) {
                Some((value, next)) => {
                    pos = next;
                    let value = value.trim().to_string();
                    if !value.is_empty() {
                        match key.as_str() {
                            "slug" => meta.slug = Some(value),
                            "title" => meta.title = Some(value),
                            "description" => description = Some(value),
                            "excerpt" => excerpt = Some(value),
                            "image" => meta.image = Some(value),
                            "date" => meta.date = Some(value),
                            "author" => meta.author = Some(value),
                            _ => meta.canonical = Some(value),
                        }
                    }
                }
                None => pos = skip_entry(bytes, pos),
            },
            _ => pos = skip_entry(bytes, pos),
        }
    }

    meta.description = description.or(excerpt);
    meta
}

/// Read an object key at `pos`: a bare identifier or a quoted string.
/// Returns the key text and the position right after it.
fn read_key(block: &str, pos: usize) -> Option<(String, usize)> {
    let bytes = block.as_bytes();
    match bytes.get(pos)? {
        b'"' | b'\'' => read_string_literal(block, pos),
        c if is_ident_start(*c) => {
            let mut end = pos;
            while end < bytes.len() && is_ident_char(bytes[end]) {
                end += 1;
            }
            Some((block[pos..end].to_string(), end))
        }
        _ => None,
    }
}

/// Read a string literal at `pos` (any quote style), processing the common
/// escapes. Returns the value and the position after the closing quote.
fn read_string_literal(block: &str, pos: usize) -> Option<(String, usize)> {
    let bytes = block.as_bytes();
    let quote = *bytes.get(pos)?;
    if quote != b'"' && quote != b'\'' && quote != b'`' {
        return None;
    }
    let quote = quote as char;

    let mut value = String::new();
    let mut iter = block[pos + 1..].char_indices();
    while let Some((i, c)) = iter.next() {
        if c == '\\' {
            let (_, escaped) = iter.next()?;
            value.push(match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => other,
            });
        } else if c == quote {
            return Some((value, pos + 1 + i + 1));
        } else {
            value.push(c);
        }
    }
    None
}

/// Read a `[ ... ]` array of string literals at `pos`. Non-string elements
/// are skipped; empty strings are dropped.
fn read_string_array(block: &str, pos: usize) -> Option<(Vec<String>, usize)> {
    let bytes = block.as_bytes();
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }
    let mut values = Vec::new();
    let mut pos = pos + 1;

    loop {
        pos = skip_ws_and_comments(bytes, pos);
        match bytes.get(pos) {
            None => return None,
            Some(b']') => return Some((values, pos + 1)),
            Some(b',') => pos += 1,
            _ => match read_string_literal(block, pos) {
                Some((value, next)) => {
                    let value = value.trim().to_string();
                    if !value.is_empty() {
                        values.push(value);
                    }
                    pos = next;
                }
                None => {
                    let next = skip_element(bytes, pos);
                    pos = next.max(pos + 1);
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Structural skipping
// ---------------------------------------------------------------------------

/// Skip one entry: advance past the next `,` at nesting depth zero.
/// Stops before an unbalanced closer so the caller's loop terminates.
fn skip_entry(bytes: &[u8], pos: usize) -> usize {
    skip_until_separator(bytes, pos, true)
}

/// Skip one array element: like `skip_entry` but stops before `]` too.
fn skip_element(bytes: &[u8], pos: usize) -> usize {
    skip_until_separator(bytes, pos, false)
}

fn skip_until_separator(bytes: &[u8], mut pos: usize, consume_comma: bool) -> usize {
    let mut depth = 0usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = skip_line_comment(bytes, pos);
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_block_comment(bytes, pos);
            }
            b'"' | b'\'' | b'`' => {
                pos = skip_string_raw(bytes, pos);
            }
            b'{' | b'[' | b'(' => {
                depth += 1;
                pos += 1;
            }
            b'}' | b']' | b')' => {
                if depth == 0 {
                    return pos;
                }
                depth -= 1;
                pos += 1;
            }
            b',' if depth == 0 => {
                return if consume_comma { pos + 1 } else { pos };
            }
            _ => pos += 1,
        }
    }
    pos
}

/// Skip a string literal starting at `pos` without decoding it.
/// Template literals honor `${ ... }` interpolations. Returns the position
/// after the closing quote, or the end of input when unterminated.
fn skip_string_raw(bytes: &[u8], pos: usize) -> usize {
    let quote = bytes[pos];
    let mut pos = pos + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'$' if quote == b'`' && bytes.get(pos + 1) == Some(&b'{') => {
                pos = skip_interpolation(bytes, pos + 1);
            }
            c if c == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

/// Skip a `{ ... }` interpolation body. `pos` sits on the opening brace.
fn skip_interpolation(bytes: &[u8], pos: usize) -> usize {
    let mut depth = 1usize;
    let mut pos = pos + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' | b'\'' | b'`' => pos = skip_string_raw(bytes, pos),
            b'{' => {
                depth += 1;
                pos += 1;
            }
            b'}' => {
                depth -= 1;
                pos += 1;
                if depth == 0 {
                    return pos;
                }
            }
            _ => pos += 1,
        }
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos] != b'\n' {
        pos += 1;
    }
    pos
}

fn skip_block_comment(bytes: &[u8], pos: usize) -> usize {
    let mut pos = pos + 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
            return pos + 2;
        }
        pos += 1;
    }
    bytes.len()
}

fn skip_ws_and_comments(bytes: &[u8], mut pos: usize) -> usize {
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes.get(pos) == Some(&b'/') && bytes.get(pos + 1) == Some(&b'/') {
            pos = skip_line_comment(bytes, pos);
        } else if bytes.get(pos) == Some(&b'/') && bytes.get(pos + 1) == Some(&b'*') {
            pos = skip_block_comment(bytes, pos);
        } else {
            return pos;
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_char(c: u8) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
