//! SEO metadata resolution and rendering.
//!
//! Every prerendered route gets a [`MetadataRecord`] resolved from up to
//! three layers, then rendered into head tags and JSON-LD blocks.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently. The first non-empty value wins:
//!
//! 1. **Per-route overrides** — `seo-overrides.json`, keyed by route path.
//!    The only layer that can attach structured-data facets (FAQ, video,
//!    item lists, ...) to a route.
//! 2. **Content layer** — for `/blog/<slug>` routes, the post's own meta;
//!    for `/` and the blog index, the hardcoded records below; empty for
//!    everything else.
//! 3. **Site fallbacks** — the configured default social image. Titles have
//!    no third layer: a route that resolves no title is rendered with the
//!    brand name alone.
//!
//! A blog route whose slug is unknown resolves like any other route with an
//! empty content layer. That page still gets a branded title, the default
//! image, and a canonical URL, so a stale sitemap entry degrades into a
//! generic-but-valid page instead of failing the run.
//!
//! ## Brand composition
//!
//! Composed titles append ` — {brand}` unless the brand already appears in
//! the title as a whole word, in any case. `"Pricing"` becomes
//! `"Pricing — InzightEd"`; `"Why INZIGHTED wins"` stays as written;
//! `"InzightEdge"` does not count as the brand.
//!
//! ## The module is split into:
//! - **mod**: resolution, brand composition, URL absolutization
//! - **head**: meta/link tag rendering (maud)
//! - **jsonld**: structured-data script blocks (serde_json)

pub mod head;
pub mod jsonld;

pub use head::render_head;
pub use jsonld::structured_data_blocks;

use crate::config::PrerenderConfig;
use crate::types::{MetadataRecord, PostMeta};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverridesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the per-route override table. A missing file is an empty table;
/// a present-but-broken file is an error the caller downgrades to a warning.
pub fn load_overrides(path: &Path) -> Result<BTreeMap<String, MetadataRecord>, OverridesError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Resolve a metadata field from multiple sources.
///
/// Takes optional values in priority order and returns the first non-None,
/// non-empty value, trimmed. The core merge operation behind every field of
/// [`resolve_metadata`].
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Resolve the full metadata record for one route.
pub fn resolve_metadata(
    route: &str,
    overrides: &BTreeMap<String, MetadataRecord>,
    posts: &BTreeMap<String, PostMeta>,
    config: &PrerenderConfig,
) -> MetadataRecord {
    let override_rec = overrides.get(route).cloned().unwrap_or_default();
    let content = content_layer(route, posts, config);

    MetadataRecord {
        title: resolve(&[override_rec.title.as_deref(), content.title.as_deref()]),
        description: resolve(&[
            override_rec.description.as_deref(),
            content.description.as_deref(),
        ]),
        canonical: resolve(&[
            override_rec.canonical.as_deref(),
            content.canonical.as_deref(),
        ]),
        image: resolve(&[
            override_rec.image.as_deref(),
            content.image.as_deref(),
            Some(config.site.default_image.as_str()),
        ]),
        robots: resolve(&[override_rec.robots.as_deref()]),
        date: resolve(&[override_rec.date.as_deref(), content.date.as_deref()]),
        author: resolve(&[override_rec.author.as_deref(), content.author.as_deref()]),
        tags: if override_rec.tags.is_empty() {
            content.tags
        } else {
            override_rec.tags
        },
        organization: override_rec.organization,
        video: override_rec.video,
        faq: override_rec.faq,
        item_list: override_rec.item_list,
        how_to: override_rec.how_to,
        review: override_rec.review,
    }
}

/// The content layer of the resolution stack for a route.
fn content_layer(
    route: &str,
    posts: &BTreeMap<String, PostMeta>,
    config: &PrerenderConfig,
) -> MetadataRecord {
    let blog_prefix = config.content.blog_prefix.as_str();
    if let Some(slug) = route
        .strip_prefix(blog_prefix)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        return match posts.get(slug) {
            Some(meta) => record_from_post(meta),
            None => MetadataRecord::default(),
        };
    }
    if route == "/" {
        return home_record(&config.site.brand);
    }
    if route == blog_prefix {
        return blog_record(&config.site.brand);
    }
    MetadataRecord::default()
}

fn record_from_post(meta: &PostMeta) -> MetadataRecord {
    MetadataRecord {
        title: meta.title.clone(),
        description: meta.description.clone(),
        canonical: meta.canonical.clone(),
        image: meta.image.clone(),
        date: meta.date.clone(),
        author: meta.author.clone(),
        tags: meta.tags.clone(),
        ..MetadataRecord::default()
    }
}

/// Hardcoded record for the landing page. Copy lives here rather than in
/// config: it changes with the product, not with the deployment.
fn home_record(brand: &str) -> MetadataRecord {
    MetadataRecord {
        title: Some("AI-powered assessment and tutoring for schools".to_string()),
        description: Some(format!(
            "{brand} turns every quiz into insight: adaptive assessments, \
             instant feedback, and clear next steps for educators and students."
        )),
        ..MetadataRecord::default()
    }
}

/// Hardcoded record for the blog index.
fn blog_record(brand: &str) -> MetadataRecord {
    MetadataRecord {
        title: Some("Blog".to_string()),
        description: Some(format!(
            "Ideas and research on teaching, learning, and AI in education \
             from the {brand} team."
        )),
        ..MetadataRecord::default()
    }
}

/// Compose the final page title from a resolved title and the brand.
pub fn compose_title(title: Option<&str>, brand: &str) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) if contains_brand_word(t, brand) => t.to_string(),
        Some(t) => format!("{t} — {brand}"),
        None => brand.to_string(),
    }
}

/// Whether the brand appears in the title as a whole word, case-insensitive.
/// Matches are bounded by non-alphanumeric characters or the string ends.
pub fn contains_brand_word(title: &str, brand: &str) -> bool {
    let title = title.to_lowercase();
    let brand = brand.to_lowercase();
    if brand.is_empty() {
        return false;
    }

    let mut from = 0;
    while let Some(idx) = title[from..].find(&brand) {
        let start = from + idx;
        let end = start + brand.len();
        let bounded_left = title[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let bounded_right = title[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
        if bounded_left && bounded_right {
            return true;
        }
        from = end;
    }
    false
}

/// Make a URL absolute against the site base.
///
/// Absolute `http(s)` URLs pass through unchanged. Site-relative values are
/// joined onto the base origin and percent-encoded, so a cover image named
/// `exam tips.png` still forms a valid `og:image` URL.
pub fn absolutize(value: &str, base_url: &str) -> String {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        return value.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if value.starts_with('/') {
        format!("{base}{}", encode_path(value))
    } else {
        format!("{base}/{}", encode_path(value))
    }
}

/// Percent-encode a path, leaving unreserved characters, separators, and
/// existing `%` escapes alone.
fn encode_path(path: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        let keep = b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'.' | b'_' | b'~' | b'/' | b'%' | b'?' | b'=' | b'&' | b'#');
        if keep {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}
