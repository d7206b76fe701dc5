//! Shared test utilities for the prerender test suite.
//!
//! Builds throwaway project trees with the pieces the pipeline reads: a
//! built client shell under `dist/`, a blog content directory, and optional
//! override/index files. Everything is written programmatically so each test
//! gets an isolated [`TempDir`] it can mutate freely.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_project();
//! write_post(tmp.path(), "blog1.jsx", &jsx_post("Exam Stress", "Tips.", "2025-03-10"));
//! ```

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A client shell the way the frontend bundler emits it: hashed asset
/// references, a placeholder title/description pair, and an empty mount.
pub const SHELL: &str = "<!doctype html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    <link rel=\"icon\" type=\"image/svg+xml\" href=\"/favicon.svg\" />\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    <title>InzightEd</title>\n    <meta name=\"description\" content=\"placeholder\" />\n    <script type=\"module\" crossorigin src=\"/assets/index-CJw9ZJ7d.js\"></script>\n    <link rel=\"stylesheet\" crossorigin href=\"/assets/index-D2L9queN.css\" />\n  </head>\n  <body>\n    <div id=\"root\"></div>\n  </body>\n</html>\n";

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a project tree with a built shell and an empty blog directory,
/// matching the default configuration's paths.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_shell(tmp.path());
    fs::create_dir_all(tmp.path().join("src/content/blog")).unwrap();
    tmp
}

/// Write the built client shell at `dist/index.html`.
pub fn write_shell(root: &Path) {
    let dist = root.join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("index.html"), SHELL).unwrap();
}

/// Write one post source file under the blog content directory.
pub fn write_post(root: &Path, file: &str, source: &str) {
    let dir = root.join("src/content/blog");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), source).unwrap();
}

/// Write the per-route metadata override table.
pub fn write_overrides(root: &Path, json: &str) {
    fs::write(root.join("seo-overrides.json"), json).unwrap();
}

// =========================================================================
// Source builders
// =========================================================================

/// A minimal post component with a populated meta block.
pub fn jsx_post(title: &str, description: &str, date: &str) -> String {
    format!(
        "export const meta = {{\n  title: \"{title}\",\n  description: \"{description}\",\n  date: \"{date}\",\n}};\n\nexport default function Post() {{\n  return <article>{{meta.title}}</article>;\n}}\n"
    )
}

/// A post with an explicit slug declared in its meta block.
pub fn jsx_post_with_slug(slug: &str, title: &str) -> String {
    format!(
        "export const meta = {{\n  slug: \"{slug}\",\n  title: \"{title}\",\n}};\n\nexport default function Post() {{\n  return <article>{{meta.title}}</article>;\n}}\n"
    )
}
