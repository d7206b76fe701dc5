//! HTML page emission.
//!
//! Takes the built client shell, replaces its stale head metadata with the
//! resolved fragment, injects server-rendered markup into the mount point,
//! and writes one `index.html` per route:
//!
//! ```text
//! /            → dist/index.html
//! /blog        → dist/blog/index.html
//! /blog/post   → dist/blog/post/index.html
//! ```
//!
//! The template is read once per run and never mutated; every route derives
//! a fresh string from it. When `dist/index.html` is not readable yet (the
//! client build may still be flushing), the read is retried a few times
//! before falling back to the unbuilt source shell with a warning.
//!
//! All tag matching is ASCII case-insensitive substring scanning. The shell
//! is build output with known shape, not arbitrary HTML, so no parser is
//! involved.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no page template at {0} or {1}")]
    TemplateNotFound(PathBuf, PathBuf),
}

/// The page shell every route is emitted from.
#[derive(Debug)]
pub struct PageTemplate {
    pub html: String,
    /// True when the built template never became readable and the unbuilt
    /// source shell was used instead.
    pub used_fallback: bool,
}

/// Load the page template, preferring the built shell.
///
/// `dist_index` is attempted `attempts` times with `retry_ms` between reads,
/// then `fallback` once. Only when both are unreadable does this fail.
pub fn load_template(
    dist_index: &Path,
    fallback: &Path,
    attempts: u32,
    retry_ms: u64,
) -> Result<PageTemplate, EmitError> {
    for attempt in 0..attempts.max(1) {
        if attempt > 0 {
            thread::sleep(Duration::from_millis(retry_ms));
        }
        if let Ok(html) = fs::read_to_string(dist_index) {
            return Ok(PageTemplate {
                html,
                used_fallback: false,
            });
        }
    }
    match fs::read_to_string(fallback) {
        Ok(html) => Ok(PageTemplate {
            html,
            used_fallback: true,
        }),
        Err(_) => Err(EmitError::TemplateNotFound(
            dist_index.to_path_buf(),
            fallback.to_path_buf(),
        )),
    }
}

/// Produce the final document for one route: strip stale title/description
/// tags, splice the head fragment in before `</head>`, and fill the mount
/// point with the rendered markup.
pub fn render_page(template: &str, head: &str, markup: &str) -> String {
    let stripped = strip_description_metas(&strip_title_elements(template));
    inject_markup(&inject_head(&stripped, head), markup)
}

/// Output path for a route, mirroring the route as a directory tree.
pub fn page_path(dist: &Path, route: &str) -> PathBuf {
    let rest = route.trim_start_matches('/');
    if rest.is_empty() {
        dist.join("index.html")
    } else {
        dist.join(rest).join("index.html")
    }
}

/// Write the emitted document, creating route directories as needed.
pub fn write_page(dist: &Path, route: &str, html: &str) -> Result<PathBuf, EmitError> {
    let path = page_path(dist, route);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, html)?;
    Ok(path)
}

/// ASCII case-insensitive substring search.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() {
        return Some(0);
    }
    if h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Finds the start of an opening tag for `name`, tolerating attributes and
/// any ASCII case. `<titlebar>` does not count as `<title>`.
fn find_element_start(html: &str, name: &str) -> Option<usize> {
    let open = format!("<{name}");
    let mut from = 0;
    while let Some(rel) = find_ci(&html[from..], &open) {
        let start = from + rel;
        let after = html.as_bytes().get(start + open.len()).copied();
        if matches!(after, Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/')) {
            return Some(start);
        }
        from = start + 1;
    }
    None
}

/// Remove every `<title>...</title>` element.
fn strip_title_elements(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    loop {
        let Some(start) = find_element_start(rest, "title") else {
            break;
        };
        let Some(close) = find_ci(&rest[start..], "</title>") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + close + "</title>".len()..];
    }
    out.push_str(rest);
    out
}

/// Remove every `<meta name="description" ...>` tag.
fn strip_description_metas(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    loop {
        let Some(start) = find_element_start(rest, "meta") else {
            break;
        };
        let Some(tag_end) = rest[start..].find('>') else {
            break;
        };
        let cut = start + tag_end + 1;
        if !is_description_meta(&rest[start..cut]) {
            out.push_str(&rest[..cut]);
        } else {
            out.push_str(&rest[..start]);
        }
        rest = &rest[cut..];
    }
    out.push_str(rest);
    out
}

fn is_description_meta(tag: &str) -> bool {
    let lower = tag.to_ascii_lowercase();
    lower.contains("name=\"description\"") || lower.contains("name='description'")
}

/// Splice the head fragment in before `</head>`. A template without a head
/// close tag passes through unchanged.
fn inject_head(html: &str, head: &str) -> String {
    match find_ci(html, "</head>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + head.len() + 1);
            out.push_str(&html[..idx]);
            out.push_str(head);
            out.push('\n');
            out.push_str(&html[idx..]);
            out
        }
        None => html.to_string(),
    }
}

/// Fill the mount element with the rendered markup, replacing whatever the
/// shell carried there. A template without a mount element gets one appended
/// before `</body>`.
fn inject_markup(html: &str, markup: &str) -> String {
    if let Some((content_start, content_end)) = find_mount(html) {
        let mut out = String::with_capacity(html.len() + markup.len());
        out.push_str(&html[..content_start]);
        out.push_str(markup);
        out.push_str(&html[content_end..]);
        return out;
    }

    let wrapper = format!("<div id=\"root\">{markup}</div>");
    match find_ci(html, "</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + wrapper.len());
            out.push_str(&html[..idx]);
            out.push_str(&wrapper);
            out.push_str(&html[idx..]);
            out
        }
        None => {
            let mut out = String::with_capacity(html.len() + wrapper.len());
            out.push_str(html);
            out.push_str(&wrapper);
            out
        }
    }
}

/// Locate the mount element's content span: the byte range between the
/// opening `<div id="root" ...>` tag and its matching `</div>`. Shells may
/// ship placeholder children (loading skeletons) inside the mount, so nested
/// divs must be stepped over, not matched.
fn find_mount(html: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    loop {
        let rest = &html[offset..];
        let start = find_element_start(rest, "div")?;
        let tag_end = rest[start..].find('>')?;
        let tag = &rest[start..start + tag_end + 1];
        if has_root_id(tag) {
            let content_start = offset + start + tag_end + 1;
            let content_end = find_matching_div_close(html, content_start)?;
            return Some((content_start, content_end));
        }
        offset += start + tag_end + 1;
    }
}

/// Offset of the `</div>` closing the element whose content starts at
/// `from`, depth-counting nested `<div>` openings along the way.
fn find_matching_div_close(html: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    let mut depth = 0usize;
    loop {
        let rest = &html[pos..];
        let close = find_ci(rest, "</div>")?;
        match find_element_start(&rest[..close], "div") {
            Some(open) => {
                depth += 1;
                let open_end = rest[open..].find('>')?;
                pos += open + open_end + 1;
            }
            None if depth == 0 => return Some(pos + close),
            None => {
                depth -= 1;
                pos += close + "</div>".len();
            }
        }
    }
}

fn has_root_id(tag: &str) -> bool {
    let lower = tag.to_ascii_lowercase();
    lower.contains("id=\"root\"") || lower.contains("id='root'")
}
