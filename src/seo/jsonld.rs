//! JSON-LD structured-data blocks.
//!
//! Each facet of a [`MetadataRecord`] becomes one
//! `<script type="application/ld+json">` element. Payloads are built as
//! `serde_json` values and serialized in one place, so quoting and escaping
//! are never hand-assembled.
//!
//! A dated record additionally gets a `BlogPosting` block derived from its
//! core fields; all other block types come from override facets only.

use maud::{Markup, PreEscaped, html};
use serde_json::{Value, json};

use crate::config::SiteConfig;
use crate::seo::absolutize;
use crate::types::{
    FaqEntry, HowToData, ListItemData, MetadataRecord, OrganizationData, ReviewData, VideoData,
};

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Builds every JSON-LD block the record calls for, in a fixed order.
pub fn structured_data_blocks(
    record: &MetadataRecord,
    canonical: &str,
    site: &SiteConfig,
) -> Vec<Markup> {
    let mut blocks = Vec::new();
    if record.date.is_some() {
        blocks.push(script_block(&blog_posting(record, canonical, site)));
    }
    if let Some(org) = &record.organization {
        blocks.push(script_block(&organization(org, site)));
    }
    if let Some(video) = &record.video {
        blocks.push(script_block(&video_object(video, site)));
    }
    if let Some(faq) = &record.faq
        && !faq.is_empty()
    {
        blocks.push(script_block(&faq_page(faq)));
    }
    if let Some(items) = &record.item_list
        && !items.is_empty()
    {
        blocks.push(script_block(&item_list(items, site)));
    }
    if let Some(how_to) = &record.how_to {
        blocks.push(script_block(&how_to_doc(how_to)));
    }
    if let Some(review) = &record.review {
        blocks.push(script_block(&review_doc(review)));
    }
    blocks
}

/// Wraps a serialized payload in a script element. A literal `</` inside
/// the payload would end the script element early, so it is escaped with
/// the JSON solidus escape, which parsers read back as `/`.
fn script_block(value: &Value) -> Markup {
    let payload = value.to_string().replace("</", "<\\/");
    html! {
        script type="application/ld+json" { (PreEscaped(payload)) }
    }
}

fn blog_posting(record: &MetadataRecord, canonical: &str, site: &SiteConfig) -> Value {
    let mut doc = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BlogPosting",
        "headline": record.title.as_deref().unwrap_or(&site.brand),
        "mainEntityOfPage": canonical,
        "publisher": {
            "@type": "Organization",
            "name": site.brand,
            "url": site.base_url.trim_end_matches('/'),
        },
    });
    if let Some(date) = &record.date {
        doc["datePublished"] = json!(date);
    }
    if let Some(description) = &record.description {
        doc["description"] = json!(description);
    }
    if let Some(image) = &record.image {
        doc["image"] = json!(absolutize(image, &site.base_url));
    }
    if let Some(author) = &record.author {
        doc["author"] = json!({ "@type": "Person", "name": author });
    }
    if !record.tags.is_empty() {
        doc["keywords"] = json!(record.tags.join(", "));
    }
    doc
}

fn organization(org: &OrganizationData, site: &SiteConfig) -> Value {
    let mut doc = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Organization",
        "name": org.name.as_deref().unwrap_or(&site.brand),
        "url": org
            .url
            .as_deref()
            .unwrap_or(site.base_url.trim_end_matches('/')),
    });
    if let Some(logo) = &org.logo {
        doc["logo"] = json!(absolutize(logo, &site.base_url));
    }
    if !org.same_as.is_empty() {
        doc["sameAs"] = json!(org.same_as);
    }
    doc
}

fn video_object(video: &VideoData, site: &SiteConfig) -> Value {
    let mut doc = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "VideoObject",
        "name": video.name,
    });
    if let Some(description) = &video.description {
        doc["description"] = json!(description);
    }
    if let Some(thumbnail) = &video.thumbnail {
        doc["thumbnailUrl"] = json!(absolutize(thumbnail, &site.base_url));
    }
    if let Some(upload_date) = &video.upload_date {
        doc["uploadDate"] = json!(upload_date);
    }
    if let Some(duration) = &video.duration {
        doc["duration"] = json!(duration);
    }
    if let Some(url) = &video.content_url {
        doc["contentUrl"] = json!(absolutize(url, &site.base_url));
    }
    if let Some(url) = &video.embed_url {
        doc["embedUrl"] = json!(absolutize(url, &site.base_url));
    }
    doc
}

fn faq_page(entries: &[FaqEntry]) -> Value {
    let questions: Vec<Value> = entries
        .iter()
        .map(|entry| {
            json!({
                "@type": "Question",
                "name": entry.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": entry.answer,
                },
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "FAQPage",
        "mainEntity": questions,
    })
}

fn item_list(items: &[ListItemData], site: &SiteConfig) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let mut element = json!({
                "@type": "ListItem",
                "position": idx + 1,
                "name": item.name,
            });
            if let Some(url) = &item.url {
                element["url"] = json!(absolutize(url, &site.base_url));
            }
            element
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "ItemList",
        "itemListElement": elements,
    })
}

fn how_to_doc(data: &HowToData) -> Value {
    let steps: Vec<Value> = data
        .steps
        .iter()
        .map(|step| {
            let mut doc = json!({ "@type": "HowToStep", "name": step.name });
            if let Some(text) = &step.text {
                doc["text"] = json!(text);
            }
            doc
        })
        .collect();
    let mut doc = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "HowTo",
        "name": data.name,
        "step": steps,
    });
    if let Some(description) = &data.description {
        doc["description"] = json!(description);
    }
    doc
}

fn review_doc(data: &ReviewData) -> Value {
    let item = json!({ "@type": "Product", "name": data.item_name });
    let best = data.best_rating.unwrap_or(5.0);
    match data.review_count {
        // Many reviews: aggregate rating over the item.
        Some(count) => json!({
            "@context": SCHEMA_CONTEXT,
            "@type": "AggregateRating",
            "itemReviewed": item,
            "ratingValue": data.rating_value,
            "bestRating": best,
            "reviewCount": count,
        }),
        // One review, optionally attributed.
        None => {
            let mut doc = json!({
                "@context": SCHEMA_CONTEXT,
                "@type": "Review",
                "itemReviewed": item,
                "reviewRating": {
                    "@type": "Rating",
                    "ratingValue": data.rating_value,
                    "bestRating": best,
                },
            });
            if let Some(author) = &data.author {
                doc["author"] = json!({ "@type": "Person", "name": author });
            }
            doc
        }
    }
}
