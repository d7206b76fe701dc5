//! Shared types used across the pipeline stages.
//!
//! `PostMeta` and `PostIndexEntry` mirror the JSON shapes read from the
//! content tree (`posts.json`, per-file meta blocks); `MetadataRecord` mirrors
//! `seo-overrides.json` values. Data files are parsed leniently: unknown keys
//! are ignored and missing fields become `None`, unlike `prerender.toml`
//! which rejects typos outright.

use serde::Deserialize;

/// Metadata declared by one blog post, either in its source file's
/// `export const meta = { ... }` block or in the explicit post index.
///
/// Every field is optional; resolution downstream fills gaps from defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PostMeta {
    /// URL slug under the blog prefix. Absent → derived from the file name.
    pub slug: Option<String>,
    pub title: Option<String>,
    /// Meta description. Post sources commonly call this `excerpt`.
    #[serde(alias = "excerpt")]
    pub description: Option<String>,
    /// Cover image, site-relative or absolute.
    pub image: Option<String>,
    /// Publish date, carried verbatim into `<lastmod>` and JSON-LD.
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    /// Canonical URL override for syndicated posts.
    pub canonical: Option<String>,
}

impl PostMeta {
    /// True when no field carries a value. Used to tell "no meta block"
    /// apart from "meta block with nothing useful in it".
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.date.is_none()
            && self.tags.is_empty()
            && self.author.is_none()
            && self.canonical.is_none()
    }
}

/// One entry of the explicit post index (`posts.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct PostIndexEntry {
    /// Route path of the post, e.g. `/blog/exam-stress`.
    pub path: String,
    #[serde(default)]
    pub meta: PostMeta,
}

/// A blog post discovered by the content loader, with its slug resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDocument {
    /// Resolved slug: declared in meta, or the source file stem.
    pub slug: String,
    /// Where the document came from (file name or index path), for messages.
    pub source: String,
    pub meta: PostMeta,
}

/// Resolved head metadata for one route.
///
/// Also the deserialized shape of `seo-overrides.json` values, which is why
/// the structured-data facets live here: an override may attach any of them
/// to any route. Keys follow the frontend's camelCase convention.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetadataRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Canonical URL, site-relative or absolute. Absent → derived from route.
    pub canonical: Option<String>,
    /// Social card image, site-relative or absolute.
    pub image: Option<String>,
    /// Robots directive, e.g. `noindex, nofollow`. Absent → `index, follow`.
    pub robots: Option<String>,
    /// Publish date. Presence marks the route as an article (BlogPosting).
    pub date: Option<String>,
    pub author: Option<String>,
    /// Post tags, carried into JSON-LD `keywords`.
    pub tags: Vec<String>,
    pub organization: Option<OrganizationData>,
    pub video: Option<VideoData>,
    pub faq: Option<Vec<FaqEntry>>,
    pub item_list: Option<Vec<ListItemData>>,
    pub how_to: Option<HowToData>,
    pub review: Option<ReviewData>,
}

/// Organization facet (rendered as `schema.org/Organization`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrganizationData {
    /// Absent → site brand.
    pub name: Option<String>,
    /// Absent → site base URL.
    pub url: Option<String>,
    /// Logo image, site-relative or absolute.
    pub logo: Option<String>,
    /// Social profile URLs (`sameAs`).
    pub same_as: Vec<String>,
}

/// Video facet (rendered as `schema.org/VideoObject`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoData {
    pub name: String,
    pub description: Option<String>,
    /// Thumbnail image, site-relative or absolute.
    pub thumbnail: Option<String>,
    pub upload_date: Option<String>,
    /// ISO 8601 duration, e.g. `PT2M30S`.
    pub duration: Option<String>,
    pub content_url: Option<String>,
    pub embed_url: Option<String>,
}

/// One question/answer pair of an FAQ facet (`schema.org/FAQPage`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// One item of an ItemList facet. Positions are assigned from list order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemData {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// HowTo facet (`schema.org/HowTo`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HowToData {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<HowToStep>,
}

/// One step of a HowTo facet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HowToStep {
    pub name: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Review facet. With a `reviewCount` it renders as an `AggregateRating`
/// attached to the item, otherwise as a single `Review`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewData {
    pub item_name: String,
    pub rating_value: f64,
    /// Absent → 5.
    pub best_rating: Option<f64>,
    pub review_count: Option<u64>,
    /// Review author, only meaningful for single reviews.
    pub author: Option<String>,
}

/// One failed route of a prerender run.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFailure {
    pub route: String,
    pub message: String,
}

/// Aggregate result of a prerender run, for the console summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Pages written successfully.
    pub emitted: usize,
    /// Routes that failed to render or write. The run still exits zero;
    /// failures are listed so CI logs show them.
    pub failures: Vec<RouteFailure>,
    /// True when the dist template was unreadable and the unbuilt source
    /// shell was used instead.
    pub used_fallback_template: bool,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.emitted + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_meta_excerpt_alias() {
        let meta: PostMeta =
            serde_json::from_str(r#"{"title": "T", "excerpt": "E"}"#).unwrap();
        assert_eq!(meta.description.as_deref(), Some("E"));
    }

    #[test]
    fn post_meta_unknown_keys_ignored() {
        let meta: PostMeta =
            serde_json::from_str(r#"{"title": "T", "readingTime": 4}"#).unwrap();
        assert_eq!(meta.title.as_deref(), Some("T"));
    }

    #[test]
    fn post_meta_is_empty() {
        assert!(PostMeta::default().is_empty());
        let meta = PostMeta {
            date: Some("2025-03-01".to_string()),
            ..PostMeta::default()
        };
        assert!(!meta.is_empty());
    }

    #[test]
    fn metadata_record_camel_case_facets() {
        let record: MetadataRecord = serde_json::from_str(
            r#"{
                "title": "Pricing",
                "itemList": [{"name": "Starter", "url": "/pricing#starter"}],
                "howTo": {"name": "Set up", "steps": [{"name": "Sign up"}]}
            }"#,
        )
        .unwrap();
        assert_eq!(record.title.as_deref(), Some("Pricing"));
        assert_eq!(record.item_list.as_ref().unwrap()[0].name, "Starter");
        assert_eq!(record.how_to.as_ref().unwrap().steps.len(), 1);
    }

    #[test]
    fn run_summary_counts() {
        let summary = RunSummary {
            emitted: 5,
            failures: vec![RouteFailure {
                route: "/blog/x".to_string(),
                message: "render exited with status 1".to_string(),
            }],
            used_fallback_template: false,
        };
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total(), 6);
    }
}
