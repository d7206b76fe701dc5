//! Head fragment rendering.
//!
//! Turns a resolved [`MetadataRecord`] into the block of tags injected
//! before `</head>`: title, description, canonical, robots, Open Graph and
//! Twitter cards, then any JSON-LD script blocks. Tag text goes through
//! maud, so titles and descriptions are HTML-escaped on the way out.

use maud::{Markup, html};

use crate::config::SiteConfig;
use crate::seo::jsonld::structured_data_blocks;
use crate::seo::{absolutize, compose_title};
use crate::types::MetadataRecord;

/// Robots directive used when no override sets one.
const DEFAULT_ROBOTS: &str = "index, follow";

/// Renders the full head fragment for one route.
pub fn render_head(record: &MetadataRecord, route: &str, site: &SiteConfig) -> Markup {
    let title = compose_title(record.title.as_deref(), &site.brand);
    let canonical = canonical_url(record, route, site);
    let robots = record.robots.as_deref().unwrap_or(DEFAULT_ROBOTS);
    let image = record
        .image
        .as_deref()
        .map(|img| absolutize(img, &site.base_url));
    let og_type = if record.date.is_some() { "article" } else { "website" };
    let blocks = structured_data_blocks(record, &canonical, site);

    html! {
        title { (title) }
        @if let Some(description) = &record.description {
            meta name="description" content=(description);
        }
        link rel="canonical" href=(canonical);
        meta name="robots" content=(robots);
        meta property="og:type" content=(og_type);
        meta property="og:title" content=(title);
        @if let Some(description) = &record.description {
            meta property="og:description" content=(description);
        }
        meta property="og:url" content=(canonical);
        meta property="og:site_name" content=(site.brand);
        @if let Some(image) = &image {
            meta property="og:image" content=(image);
        }
        meta name="twitter:card" content="summary_large_image";
        meta name="twitter:title" content=(title);
        @if let Some(description) = &record.description {
            meta name="twitter:description" content=(description);
        }
        @if let Some(image) = &image {
            meta name="twitter:image" content=(image);
        }
        @for block in &blocks {
            (block)
        }
    }
}

/// The canonical URL for a route: an explicit canonical from the record
/// (absolutized if site-relative), or the base URL joined with the route.
fn canonical_url(record: &MetadataRecord, route: &str, site: &SiteConfig) -> String {
    match record.canonical.as_deref() {
        Some(canonical) => absolutize(canonical, &site.base_url),
        None => format!("{}{route}", site.base_url.trim_end_matches('/')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    fn record(title: &str, description: &str) -> MetadataRecord {
        MetadataRecord {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            image: Some("/og-image.png".to_string()),
            ..MetadataRecord::default()
        }
    }

    #[test]
    fn renders_composed_title() {
        let html = render_head(&record("Pricing", "Plans"), "/pricing", &site()).into_string();
        assert!(html.contains("<title>Pricing — InzightEd</title>"));
        assert!(html.contains(r#"<meta property="og:title" content="Pricing — InzightEd">"#));
    }

    #[test]
    fn title_with_brand_is_not_suffixed() {
        let html = render_head(
            &record("Why InzightEd wins", "x"),
            "/blog/why",
            &site(),
        )
        .into_string();
        assert!(html.contains("<title>Why InzightEd wins</title>"));
        assert!(!html.contains("wins — InzightEd"));
    }

    #[test]
    fn missing_title_renders_brand_alone() {
        let rec = MetadataRecord::default();
        let html = render_head(&rec, "/contact", &site()).into_string();
        assert!(html.contains("<title>InzightEd</title>"));
    }

    #[test]
    fn canonical_derived_from_route() {
        let html = render_head(&record("T", "D"), "/blog/x", &site()).into_string();
        assert!(html.contains(r#"<link rel="canonical" href="https://inzighted.com/blog/x">"#));
        assert!(html.contains(r#"<meta property="og:url" content="https://inzighted.com/blog/x">"#));
    }

    #[test]
    fn canonical_override_wins_and_is_absolutized() {
        let mut rec = record("T", "D");
        rec.canonical = Some("/elsewhere".to_string());
        let html = render_head(&rec, "/blog/x", &site()).into_string();
        assert!(html.contains(r#"href="https://inzighted.com/elsewhere""#));
        assert!(!html.contains(r#"href="https://inzighted.com/blog/x""#));
    }

    #[test]
    fn robots_defaults_to_index_follow() {
        let html = render_head(&record("T", "D"), "/", &site()).into_string();
        assert!(html.contains(r#"<meta name="robots" content="index, follow">"#));
    }

    #[test]
    fn robots_override_is_respected() {
        let mut rec = record("T", "D");
        rec.robots = Some("noindex, nofollow".to_string());
        let html = render_head(&rec, "/wait", &site()).into_string();
        assert!(html.contains(r#"<meta name="robots" content="noindex, nofollow">"#));
    }

    #[test]
    fn og_type_article_for_dated_records() {
        let mut rec = record("T", "D");
        rec.date = Some("2025-03-10".to_string());
        let html = render_head(&rec, "/blog/x", &site()).into_string();
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
    }

    #[test]
    fn og_type_website_without_date() {
        let html = render_head(&record("T", "D"), "/pricing", &site()).into_string();
        assert!(html.contains(r#"<meta property="og:type" content="website">"#));
    }

    #[test]
    fn image_is_absolutized() {
        let html = render_head(&record("T", "D"), "/", &site()).into_string();
        assert!(html
            .contains(r#"<meta property="og:image" content="https://inzighted.com/og-image.png">"#));
        assert!(html
            .contains(r#"<meta name="twitter:image" content="https://inzighted.com/og-image.png">"#));
    }

    #[test]
    fn missing_description_omits_tags() {
        let rec = MetadataRecord {
            title: Some("T".to_string()),
            ..MetadataRecord::default()
        };
        let html = render_head(&rec, "/contact", &site()).into_string();
        assert!(!html.contains(r#"name="description""#));
        assert!(!html.contains("og:description"));
    }

    #[test]
    fn title_text_is_escaped() {
        let html = render_head(
            &record("Tips & <Tricks>", "A & B"),
            "/blog/tips",
            &site(),
        )
        .into_string();
        assert!(html.contains("Tips &amp; &lt;Tricks&gt; — InzightEd"));
        assert!(!html.contains("<Tricks>"));
    }

    #[test]
    fn dated_record_gets_blog_posting_block() {
        let mut rec = record("Post", "Desc");
        rec.date = Some("2025-01-01".to_string());
        let html = render_head(&rec, "/blog/post", &site()).into_string();
        assert!(html.contains(r#"<script type="application/ld+json">"#));
        assert!(html.contains("BlogPosting"));
    }
}
