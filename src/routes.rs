//! Route selection.
//!
//! Stage 2 of the prerender pipeline. Reads the sitemap back in, converts
//! each `<loc>` URL into a route path, drops denylisted prefixes, and
//! de-duplicates while preserving order.
//!
//! The sitemap is read from the dist dir first (the built copy), falling
//! back to the public assets dir. Nothing here parses XML generically: the
//! sitemap format is fully owned by this tool, so a `<loc>` scan is enough
//! and stays enough.
//!
//! Denylist matching is per segment: `/auth` blocks `/auth` and
//! `/auth/login`, never `/authors`.

use crate::config::RoutesConfig;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no sitemap at {0} or {1}; run the sitemap stage first")]
    SitemapNotFound(PathBuf, PathBuf),
}

/// Counters describing what route selection kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// `<loc>` entries found in the sitemap.
    pub discovered: usize,
    /// Entries dropped by the denylist.
    pub denied: usize,
    /// Entries dropped as repeats of an earlier path.
    pub duplicates: usize,
}

impl SelectionStats {
    pub fn kept(&self) -> usize {
        self.discovered - self.denied - self.duplicates
    }
}

impl fmt::Display for SelectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denied > 0 {
            if self.duplicates > 0 {
                write!(
                    f,
                    "{} kept, {} denied, {} duplicate ({} discovered)",
                    self.kept(),
                    self.denied,
                    self.duplicates,
                    self.discovered
                )
            } else {
                write!(
                    f,
                    "{} kept, {} denied ({} discovered)",
                    self.kept(),
                    self.denied,
                    self.discovered
                )
            }
        } else if self.duplicates > 0 {
            write!(
                f,
                "{} kept, {} duplicate ({} discovered)",
                self.kept(),
                self.duplicates,
                self.discovered
            )
        } else {
            write!(f, "{} kept", self.kept())
        }
    }
}

/// The selected routes, in sitemap order, plus selection counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSelection {
    pub routes: Vec<String>,
    pub stats: SelectionStats,
}

/// Read sitemap text, preferring the built copy in dist over the source
/// copy in public.
pub fn read_sitemap_text(dist: &Path, public: &Path) -> Result<String, RouteError> {
    let dist_path = dist.join("sitemap.xml");
    let public_path = public.join("sitemap.xml");
    for candidate in [&dist_path, &public_path] {
        if candidate.exists() {
            return Ok(fs::read_to_string(candidate)?);
        }
    }
    Err(RouteError::SitemapNotFound(dist_path, public_path))
}

/// Select the prerenderable routes out of sitemap text.
pub fn select_routes(xml: &str, config: &RoutesConfig) -> RouteSelection {
    let locs = extract_locs(xml);
    let mut stats = SelectionStats {
        discovered: locs.len(),
        ..SelectionStats::default()
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut routes = Vec::new();
    for loc in locs {
        let path = url_to_path(&loc);
        if is_denied(&path, &config.deny_prefixes) {
            stats.denied += 1;
            continue;
        }
        if !seen.insert(path.clone()) {
            stats.duplicates += 1;
            continue;
        }
        routes.push(path);
    }

    RouteSelection { routes, stats }
}

/// Pull every `<loc>` value out of sitemap text, XML-unescaped.
pub fn extract_locs(xml: &str) -> Vec<String> {
    let mut locs = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<loc>") {
        let after = &rest[start + "<loc>".len()..];
        let Some(end) = after.find("</loc>") else {
            break;
        };
        locs.push(unescape_xml(after[..end].trim()));
        rest = &after[end + "</loc>".len()..];
    }
    locs
}

/// Convert a sitemap URL into a route path.
///
/// Strips scheme and host when present, drops query and fragment, and
/// removes one trailing slash (the root `/` stays untouched).
pub fn url_to_path(url: &str) -> String {
    let url = url.trim();

    let mut path = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "/",
            }
        }
        None => url,
    };
    if let Some(cut) = path.find(['?', '#']) {
        path = &path[..cut];
    }
    if path.len() > 1 {
        path = path.strip_suffix('/').unwrap_or(path);
    }

    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Whether a path falls under one of the denylisted prefixes.
pub fn is_denied(path: &str, deny_prefixes: &[String]) -> bool {
    deny_prefixes.iter().any(|prefix| {
        path == prefix
            || (path.starts_with(prefix.as_str())
                && path.as_bytes().get(prefix.len()) == Some(&b'/'))
    })
}

fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrerenderConfig;
    use crate::sitemap::{Sitemap, UrlEntry};
    use tempfile::TempDir;

    fn deny() -> Vec<String> {
        PrerenderConfig::default().routes.deny_prefixes
    }

    // =========================================================================
    // loc extraction tests
    // =========================================================================

    #[test]
    fn extract_locs_in_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://inzighted.com/</loc>
  </url>
  <url>
    <loc>https://inzighted.com/blog</loc>
    <lastmod>2025-01-01</lastmod>
  </url>
</urlset>
"#;
        assert_eq!(
            extract_locs(xml),
            vec!["https://inzighted.com/", "https://inzighted.com/blog"]
        );
    }

    #[test]
    fn extract_locs_trims_inner_whitespace() {
        let xml = "<loc>\n    https://inzighted.com/pricing\n  </loc>";
        assert_eq!(extract_locs(xml), vec!["https://inzighted.com/pricing"]);
    }

    #[test]
    fn extract_locs_unescapes_entities() {
        let xml = "<loc>https://inzighted.com/search?q=a&amp;b=c</loc>";
        assert_eq!(
            extract_locs(xml),
            vec!["https://inzighted.com/search?q=a&b=c"]
        );
    }

    #[test]
    fn extract_locs_ignores_unterminated_tag() {
        let xml = "<loc>https://inzighted.com/complete</loc><loc>https://broken";
        assert_eq!(extract_locs(xml), vec!["https://inzighted.com/complete"]);
    }

    // =========================================================================
    // URL to path tests
    // =========================================================================

    #[test]
    fn url_to_path_root() {
        assert_eq!(url_to_path("https://inzighted.com/"), "/");
        assert_eq!(url_to_path("https://inzighted.com"), "/");
    }

    #[test]
    fn url_to_path_strips_one_trailing_slash() {
        assert_eq!(url_to_path("https://inzighted.com/blog/"), "/blog");
        assert_eq!(url_to_path("https://inzighted.com/blog/x/"), "/blog/x");
    }

    #[test]
    fn url_to_path_keeps_path_untouched() {
        assert_eq!(
            url_to_path("https://inzighted.com/blog/exam-stress"),
            "/blog/exam-stress"
        );
    }

    #[test]
    fn url_to_path_drops_query_and_fragment() {
        assert_eq!(url_to_path("https://inzighted.com/blog?page=2"), "/blog");
        assert_eq!(url_to_path("https://inzighted.com/pricing#plans"), "/pricing");
    }

    #[test]
    fn url_to_path_accepts_bare_paths() {
        assert_eq!(url_to_path("/contact"), "/contact");
        assert_eq!(url_to_path("contact"), "/contact");
    }

    // =========================================================================
    // Denylist tests
    // =========================================================================

    #[test]
    fn denylist_blocks_prefix_and_children() {
        assert!(is_denied("/auth", &deny()));
        assert!(is_denied("/auth/login", &deny()));
        assert!(is_denied("/educator/dashboard", &deny()));
    }

    #[test]
    fn denylist_is_segment_aware() {
        assert!(!is_denied("/authors", &deny()));
        assert!(!is_denied("/errors-explained", &deny()));
    }

    #[test]
    fn denylist_allows_public_routes() {
        for route in ["/", "/contact", "/pricing", "/blog", "/blog/exam-stress"] {
            assert!(!is_denied(route, &deny()), "{route} should be allowed");
        }
    }

    // =========================================================================
    // Selection tests
    // =========================================================================

    #[test]
    fn select_routes_filters_and_counts() {
        let xml = r#"
<loc>https://inzighted.com/</loc>
<loc>https://inzighted.com/auth/login</loc>
<loc>https://inzighted.com/blog</loc>
<loc>https://inzighted.com/blog/</loc>
<loc>https://inzighted.com/student</loc>
"#;
        let selection = select_routes(xml, &PrerenderConfig::default().routes);
        assert_eq!(selection.routes, vec!["/", "/blog"]);
        assert_eq!(selection.stats.discovered, 5);
        assert_eq!(selection.stats.denied, 2);
        assert_eq!(selection.stats.duplicates, 1);
    }

    #[test]
    fn select_routes_first_occurrence_wins() {
        let xml = r#"
<loc>https://inzighted.com/pricing</loc>
<loc>https://inzighted.com/contact</loc>
<loc>https://inzighted.com/pricing/</loc>
"#;
        let selection = select_routes(xml, &PrerenderConfig::default().routes);
        assert_eq!(selection.routes, vec!["/pricing", "/contact"]);
    }

    #[test]
    fn select_routes_roundtrips_generated_sitemap() {
        let config = PrerenderConfig::default();
        let sitemap = crate::sitemap::build_sitemap(&config, &[]);
        let selection = select_routes(&sitemap.to_xml(), &config.routes);
        assert_eq!(selection.routes, vec!["/", "/contact", "/pricing", "/blog"]);
        assert_eq!(selection.stats.denied, 0);
    }

    #[test]
    fn select_routes_empty_input() {
        let selection = select_routes("", &PrerenderConfig::default().routes);
        assert!(selection.routes.is_empty());
        assert_eq!(selection.stats.discovered, 0);
    }

    // =========================================================================
    // Sitemap reading tests
    // =========================================================================

    #[test]
    fn read_prefers_dist_copy() {
        let tmp = TempDir::new().unwrap();
        let dist = tmp.path().join("dist");
        let public = tmp.path().join("public");

        let built = Sitemap {
            urls: vec![UrlEntry {
                loc: "https://inzighted.com/from-dist".to_string(),
                lastmod: None,
            }],
        };
        let source = Sitemap {
            urls: vec![UrlEntry {
                loc: "https://inzighted.com/from-public".to_string(),
                lastmod: None,
            }],
        };
        crate::sitemap::write_sitemap(&built, &dist).unwrap();
        crate::sitemap::write_sitemap(&source, &public).unwrap();

        let text = read_sitemap_text(&dist, &public).unwrap();
        assert!(text.contains("from-dist"));
    }

    #[test]
    fn read_falls_back_to_public_copy() {
        let tmp = TempDir::new().unwrap();
        let dist = tmp.path().join("dist");
        let public = tmp.path().join("public");

        let source = Sitemap {
            urls: vec![UrlEntry {
                loc: "https://inzighted.com/from-public".to_string(),
                lastmod: None,
            }],
        };
        crate::sitemap::write_sitemap(&source, &public).unwrap();

        let text = read_sitemap_text(&dist, &public).unwrap();
        assert!(text.contains("from-public"));
    }

    #[test]
    fn read_errors_when_no_sitemap_anywhere() {
        let tmp = TempDir::new().unwrap();
        let result = read_sitemap_text(&tmp.path().join("dist"), &tmp.path().join("public"));
        assert!(matches!(result, Err(RouteError::SitemapNotFound(_, _))));
    }

    // =========================================================================
    // Stats display tests
    // =========================================================================

    #[test]
    fn stats_display_compact_when_nothing_dropped() {
        let stats = SelectionStats {
            discovered: 9,
            ..SelectionStats::default()
        };
        assert_eq!(stats.to_string(), "9 kept");
    }

    #[test]
    fn stats_display_itemizes_drops() {
        let stats = SelectionStats {
            discovered: 12,
            denied: 2,
            duplicates: 1,
        };
        assert_eq!(stats.kept(), 9);
        assert_eq!(
            stats.to_string(),
            "9 kept, 2 denied, 1 duplicate (12 discovered)"
        );
    }

    #[test]
    fn stats_display_elides_zero_components() {
        let denied_only = SelectionStats {
            discovered: 5,
            denied: 2,
            duplicates: 0,
        };
        assert_eq!(denied_only.to_string(), "3 kept, 2 denied (5 discovered)");

        let duplicates_only = SelectionStats {
            discovered: 5,
            denied: 0,
            duplicates: 1,
        };
        assert_eq!(
            duplicates_only.to_string(),
            "4 kept, 1 duplicate (5 discovered)"
        );
    }
}
