//! Sitemap generation.
//!
//! Builds `sitemap.xml` from the configured static routes plus one entry per
//! discovered blog post, and writes it into the public assets directory where
//! the frontend build ships it verbatim.
//!
//! ## Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://inzighted.com/</loc>
//!   </url>
//!   <url>
//!     <loc>https://inzighted.com/blog/exam-stress</loc>
//!     <lastmod>2025-03-10</lastmod>
//!   </url>
//! </urlset>
//! ```
//!
//! Static routes never carry `<lastmod>`; post entries carry the post's
//! declared date verbatim. With identical inputs the output is identical
//! byte for byte, so repeated builds do not dirty the working tree.

use crate::config::PrerenderConfig;
use crate::types::ContentDocument;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One `<url>` element of the sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// Fully qualified URL.
    pub loc: String,
    /// Verbatim `<lastmod>` value, omitted when absent.
    pub lastmod: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    pub urls: Vec<UrlEntry>,
}

impl Sitemap {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Render the sitemap as XML text.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in &self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = &entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&escape_xml(lastmod));
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// Assemble the sitemap: static routes first, then one entry per post under
/// the blog prefix, in discovery order.
pub fn build_sitemap(config: &PrerenderConfig, documents: &[ContentDocument]) -> Sitemap {
    let base_url = config.site.base_url.trim_end_matches('/');

    let mut urls: Vec<UrlEntry> = config
        .routes
        .static_routes
        .iter()
        .map(|route| UrlEntry {
            loc: format!("{base_url}{route}"),
            lastmod: None,
        })
        .collect();

    for doc in documents {
        urls.push(UrlEntry {
            loc: format!("{base_url}{}/{}", config.content.blog_prefix, doc.slug),
            lastmod: doc.meta.date.clone(),
        });
    }

    Sitemap { urls }
}

/// Write `sitemap.xml` into the public dir, creating it if needed.
/// Returns the path written, for reporting.
pub fn write_sitemap(sitemap: &Sitemap, public_dir: &Path) -> Result<PathBuf, SitemapError> {
    fs::create_dir_all(public_dir)?;
    let path = public_dir.join("sitemap.xml");
    fs::write(&path, sitemap.to_xml())?;
    Ok(path)
}

/// Write a `robots.txt` next to the sitemap: allow everything crawlable,
/// disallow the denylisted prefixes, point at the sitemap URL.
pub fn write_robots(config: &PrerenderConfig, public_dir: &Path) -> Result<PathBuf, SitemapError> {
    let base_url = config.site.base_url.trim_end_matches('/');

    let mut body = String::new();
    body.push_str("User-agent: *\n");
    body.push_str("Allow: /\n");
    for prefix in &config.routes.deny_prefixes {
        body.push_str("Disallow: ");
        body.push_str(prefix);
        body.push('\n');
    }
    body.push('\n');
    body.push_str(&format!("Sitemap: {base_url}/sitemap.xml\n"));

    fs::create_dir_all(public_dir)?;
    let path = public_dir.join("robots.txt");
    fs::write(&path, body)?;
    Ok(path)
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
