//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (URL, route, post) is its semantic identity — the public
//! path and positional index — with filesystem detail shown as secondary
//! context via indented `Source:` lines or a trailing arrow to the written
//! file. This makes the output readable as a site inventory while still
//! letting users trace entries back to specific files.
//!
//! # Output Format
//!
//! ## Sitemap
//!
//! ```text
//! URLs
//!     001 https://inzighted.com/
//!     002 https://inzighted.com/blog/exam-stress (2025-03-10)
//!
//! Wrote 2 URLs → public/sitemap.xml
//! ```
//!
//! ## Routes
//!
//! ```text
//! Routes
//!     001 /
//!     002 /blog
//!     003 /blog/exam-stress
//!
//! 3 kept, 1 denied (4 discovered)
//! ```
//!
//! ## Prerender
//!
//! ```text
//! Rendering 3 routes
//!     / → dist/index.html
//!     /blog → dist/blog/index.html
//!     /blog/exam-stress: render failed: boom
//!
//! Prerendered 2 of 3 routes
//! Failed 1:
//!     /blog/exam-stress: render failed: boom
//! ```
//!
//! ## Check
//!
//! ```text
//! Posts
//! 001 Managing Exam Stress
//!     Source: exam-stress.jsx
//!     Date: 2025-03-10
//!     Practical tips for the week before finals.
//! 002 (blog7)
//!     Source: blog7.jsx
//!
//! Found 2 posts (directory scan)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use std::path::Path;

use crate::content::{ContentSet, ContentSource};
use crate::prerender::RouteEvent;
use crate::routes::RouteSelection;
use crate::sitemap::Sitemap;
use crate::types::RunSummary;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Truncate text to `max` characters, appending `...` if truncated.
/// The cut lands on a char boundary, so multi-byte text never splits.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

// ============================================================================
// Stage 1: Sitemap output
// ============================================================================

/// Format sitemap stage output: the URL inventory plus where it was written.
pub fn format_sitemap_output(sitemap: &Sitemap, output: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("URLs".to_string());
    for (i, entry) in sitemap.urls.iter().enumerate() {
        match &entry.lastmod {
            Some(date) => lines.push(format!(
                "    {} {} ({})",
                format_index(i + 1),
                entry.loc,
                date
            )),
            None => lines.push(format!("    {} {}", format_index(i + 1), entry.loc)),
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Wrote {} URLs \u{2192} {}",
        sitemap.len(),
        output.display()
    ));
    lines
}

/// Print sitemap output to stdout.
pub fn print_sitemap_output(sitemap: &Sitemap, output: &Path) {
    for line in format_sitemap_output(sitemap, output) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Route selection output
// ============================================================================

/// Format route selection output: the kept routes plus selection stats.
pub fn format_routes_output(selection: &RouteSelection) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Routes".to_string());
    for (i, route) in selection.routes.iter().enumerate() {
        lines.push(format!("    {} {}", format_index(i + 1), route));
    }
    lines.push(String::new());
    lines.push(selection.stats.to_string());
    lines
}

/// Print route selection output to stdout.
pub fn print_routes_output(selection: &RouteSelection) {
    for line in format_routes_output(selection) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 3: Prerender output
// ============================================================================

/// Format a single prerender progress event as display lines.
///
/// Rendered routes lead with the route and point at the written file;
/// failures show the route and the error inline so a streaming log stays
/// readable without the final summary.
pub fn format_route_event(event: &RouteEvent) -> Vec<String> {
    match event {
        RouteEvent::Started { total } => vec![format!("Rendering {} routes", total)],
        RouteEvent::Warning { message } => vec![format!("Warning: {}", message)],
        RouteEvent::Rendered { route, output } => {
            vec![format!("    {} \u{2192} {}", route, output.display())]
        }
        RouteEvent::Failed { route, message } => {
            vec![format!("    {}: {}", route, message)]
        }
    }
}

/// Format the end-of-run summary, itemizing failures.
pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Prerendered {} of {} routes",
        summary.emitted,
        summary.total()
    ));
    if !summary.failures.is_empty() {
        lines.push(format!("Failed {}:", summary.failed()));
        for failure in &summary.failures {
            lines.push(format!("    {}: {}", failure.route, failure.message));
        }
    }
    lines
}

/// Print the run summary to stdout.
pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format check output: the discovered post inventory plus any warnings.
///
/// Information-first: each post leads with its positional index and title;
/// untitled posts show their slug in parens (the slug IS the identity).
/// Duplicate-slug detail is already in the warnings, so the summary line
/// only counts them.
pub fn format_check_output(set: &ContentSet, duplicates: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Posts".to_string());
    for (i, doc) in set.documents.iter().enumerate() {
        let header = match doc.meta.title.as_deref() {
            Some(t) if !t.is_empty() => format!("{} {}", format_index(i + 1), t),
            _ => format!("{} ({})", format_index(i + 1), doc.slug),
        };
        lines.push(header);
        lines.push(format!("    Source: {}", doc.source));
        if let Some(date) = &doc.meta.date {
            lines.push(format!("    Date: {}", date));
        }
        if let Some(desc) = &doc.meta.description {
            let truncated = truncate_desc(desc.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("    {}", truncated));
            }
        }
    }

    if !set.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for warning in &set.warnings {
            lines.push(format!("    {}", warning));
        }
    }

    let source = match set.source {
        ContentSource::ExplicitIndex => "post index",
        ContentSource::DirectoryScan => "directory scan",
        ContentSource::Empty => "no content",
    };
    lines.push(String::new());
    if duplicates > 0 {
        lines.push(format!(
            "Found {} posts ({}), {} duplicate slugs",
            set.documents.len(),
            source,
            duplicates
        ));
    } else {
        lines.push(format!("Found {} posts ({})", set.documents.len(), source));
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(set: &ContentSet, duplicates: usize) {
    for line in format_check_output(set, duplicates) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::SelectionStats;
    use crate::sitemap::UrlEntry;
    use crate::types::{ContentDocument, PostMeta, RouteFailure};
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_single_digit() {
        assert_eq!(format_index(1), "001");
    }

    #[test]
    fn format_index_three_digits() {
        assert_eq!(format_index(123), "123");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_empty() {
        assert_eq!(truncate_desc("", 40), "");
    }

    #[test]
    fn truncate_desc_cuts_at_char_boundaries() {
        // Multi-byte characters straddling the cut point must not split.
        let text = format!("{}€€€€", "a".repeat(58));
        let cut = truncate_desc(&text, 60);
        assert_eq!(cut, format!("{}€€...", "a".repeat(58)));
    }

    #[test]
    fn truncate_desc_counts_chars_not_bytes() {
        // 40 two-byte characters are 80 bytes but still within a 40-char cap.
        let text = "é".repeat(40);
        assert_eq!(truncate_desc(&text, 40), text);
    }

    // =========================================================================
    // Sitemap output tests
    // =========================================================================

    fn sample_sitemap() -> Sitemap {
        Sitemap {
            urls: vec![
                UrlEntry {
                    loc: "https://inzighted.com/".to_string(),
                    lastmod: None,
                },
                UrlEntry {
                    loc: "https://inzighted.com/blog/exam-stress".to_string(),
                    lastmod: Some("2025-03-10".to_string()),
                },
            ],
        }
    }

    #[test]
    fn sitemap_output_lists_urls_with_index() {
        let lines = format_sitemap_output(&sample_sitemap(), Path::new("public/sitemap.xml"));
        assert_eq!(lines[0], "URLs");
        assert_eq!(lines[1], "    001 https://inzighted.com/");
        assert_eq!(
            lines[2],
            "    002 https://inzighted.com/blog/exam-stress (2025-03-10)"
        );
    }

    #[test]
    fn sitemap_output_ends_with_write_summary() {
        let lines = format_sitemap_output(&sample_sitemap(), Path::new("public/sitemap.xml"));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Wrote 2 URLs \u{2192} public/sitemap.xml")
        );
    }

    // =========================================================================
    // Route output tests
    // =========================================================================

    #[test]
    fn routes_output_lists_routes_and_stats() {
        let selection = RouteSelection {
            routes: vec!["/".to_string(), "/blog".to_string()],
            stats: SelectionStats {
                discovered: 3,
                denied: 1,
                duplicates: 0,
            },
        };
        let lines = format_routes_output(&selection);
        assert_eq!(lines[0], "Routes");
        assert_eq!(lines[1], "    001 /");
        assert_eq!(lines[2], "    002 /blog");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("2 kept, 1 denied (3 discovered)")
        );
    }

    // =========================================================================
    // Prerender event tests
    // =========================================================================

    #[test]
    fn started_event_announces_total() {
        let lines = format_route_event(&RouteEvent::Started { total: 4 });
        assert_eq!(lines, vec!["Rendering 4 routes"]);
    }

    #[test]
    fn rendered_event_points_at_output() {
        let lines = format_route_event(&RouteEvent::Rendered {
            route: "/blog".to_string(),
            output: PathBuf::from("dist/blog/index.html"),
        });
        assert_eq!(lines, vec!["    /blog \u{2192} dist/blog/index.html"]);
    }

    #[test]
    fn failed_event_shows_error_inline() {
        let lines = format_route_event(&RouteEvent::Failed {
            route: "/blog/x".to_string(),
            message: "render failed: boom".to_string(),
        });
        assert_eq!(lines, vec!["    /blog/x: render failed: boom"]);
    }

    #[test]
    fn warning_event_is_prefixed() {
        let lines = format_route_event(&RouteEvent::Warning {
            message: "no built template".to_string(),
        });
        assert_eq!(lines, vec!["Warning: no built template"]);
    }

    // =========================================================================
    // Run summary tests
    // =========================================================================

    #[test]
    fn clean_summary_is_one_line() {
        let summary = RunSummary {
            emitted: 3,
            failures: Vec::new(),
            used_fallback_template: false,
        };
        assert_eq!(format_run_summary(&summary), vec!["Prerendered 3 of 3 routes"]);
    }

    #[test]
    fn summary_itemizes_failures() {
        let summary = RunSummary {
            emitted: 2,
            failures: vec![RouteFailure {
                route: "/blog/x".to_string(),
                message: "render failed: boom".to_string(),
            }],
            used_fallback_template: false,
        };
        let lines = format_run_summary(&summary);
        assert_eq!(lines[0], "Prerendered 2 of 3 routes");
        assert_eq!(lines[1], "Failed 1:");
        assert_eq!(lines[2], "    /blog/x: render failed: boom");
    }

    // =========================================================================
    // Check output tests
    // =========================================================================

    fn doc(slug: &str, source: &str, meta: PostMeta) -> ContentDocument {
        ContentDocument {
            slug: slug.to_string(),
            source: source.to_string(),
            meta,
        }
    }

    #[test]
    fn check_output_titled_post_shows_context() {
        let set = ContentSet {
            documents: vec![doc(
                "exam-stress",
                "exam-stress.jsx",
                PostMeta {
                    title: Some("Managing Exam Stress".to_string()),
                    description: Some("Practical tips.".to_string()),
                    date: Some("2025-03-10".to_string()),
                    ..PostMeta::default()
                },
            )],
            source: ContentSource::DirectoryScan,
            warnings: Vec::new(),
        };
        let lines = format_check_output(&set, 0);
        assert_eq!(lines[0], "Posts");
        assert_eq!(lines[1], "001 Managing Exam Stress");
        assert_eq!(lines[2], "    Source: exam-stress.jsx");
        assert_eq!(lines[3], "    Date: 2025-03-10");
        assert_eq!(lines[4], "    Practical tips.");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Found 1 posts (directory scan)")
        );
    }

    #[test]
    fn check_output_untitled_post_shows_slug() {
        let set = ContentSet {
            documents: vec![doc("blog7", "blog7.jsx", PostMeta::default())],
            source: ContentSource::DirectoryScan,
            warnings: Vec::new(),
        };
        let lines = format_check_output(&set, 0);
        assert_eq!(lines[1], "001 (blog7)");
        assert_eq!(lines[2], "    Source: blog7.jsx");
    }

    #[test]
    fn check_output_counts_duplicates_in_summary() {
        let set = ContentSet {
            documents: vec![
                doc("dup", "a.jsx", PostMeta::default()),
                doc("dup", "b.jsx", PostMeta::default()),
            ],
            source: ContentSource::DirectoryScan,
            warnings: vec!["duplicate slug \"dup\" in a.jsx, b.jsx; the last one wins".to_string()],
        };
        let lines = format_check_output(&set, 1);
        assert!(lines.contains(&"Warnings".to_string()));
        assert!(
            lines
                .iter()
                .any(|l| l.contains("duplicate slug \"dup\""))
        );
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Found 2 posts (directory scan), 1 duplicate slugs")
        );
    }

    #[test]
    fn check_output_long_description_truncated() {
        let set = ContentSet {
            documents: vec![doc(
                "long",
                "long.jsx",
                PostMeta {
                    description: Some("x".repeat(80)),
                    ..PostMeta::default()
                },
            )],
            source: ContentSource::DirectoryScan,
            warnings: Vec::new(),
        };
        let lines = format_check_output(&set, 0);
        let desc_line = format!("    {}...", "x".repeat(60));
        assert!(lines.contains(&desc_line));
    }
}
