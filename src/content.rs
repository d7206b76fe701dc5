//! Blog content discovery.
//!
//! Stage 1 input of the prerender pipeline. Finds the blog posts that feed
//! sitemap entries and metadata lookups, via two loaders tried in order:
//!
//! 1. **Explicit index**: `posts.json` in the content dir, an ordered array
//!    of `{path, meta}` records maintained alongside the posts.
//! 2. **Directory scan**: every matching source file under the content dir
//!    (sorted walk), with its meta block extracted from source text.
//!
//! A loader that fails or comes up empty hands over to the next; when both
//! come up empty the pipeline proceeds with an empty post list and the
//! sitemap still carries the static routes. Content problems are therefore
//! warnings, never fatal errors.
//!
//! The slug `index` is reserved for the barrel file that re-exports all
//! posts; it never becomes a post of its own.

use crate::config::ContentConfig;
use crate::extract;
use crate::types::{ContentDocument, PostIndexEntry, PostMeta};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which loader produced the documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Loaded from the explicit post index file.
    ExplicitIndex,
    /// Loaded by scanning the content directory.
    DirectoryScan,
    /// No loader succeeded; the post list is empty.
    Empty,
}

/// Result of content discovery: documents in publish order plus any
/// warnings to surface. Warnings are data here; printing happens at the CLI
/// edge.
#[derive(Debug)]
pub struct ContentSet {
    pub documents: Vec<ContentDocument>,
    pub source: ContentSource,
    pub warnings: Vec<String>,
}

/// Discover blog posts under the project root.
pub fn load_documents(root: &Path, config: &ContentConfig) -> ContentSet {
    let content_dir = root.join(&config.dir);
    let mut warnings = Vec::new();

    let index_path = content_dir.join(&config.index_file);
    if index_path.exists() {
        match load_index(&index_path) {
            Ok(entries) => {
                let mut documents = Vec::new();
                for entry in entries {
                    match document_from_index_entry(&entry) {
                        Some(doc) => documents.push(doc),
                        None => warnings.push(format!(
                            "index entry {:?} has no usable slug, skipped",
                            entry.path
                        )),
                    }
                }
                if documents.is_empty() {
                    warnings.push(format!(
                        "{} lists no posts; falling back to directory scan",
                        index_path.display()
                    ));
                } else {
                    warn_on_duplicates(&documents, &mut warnings);
                    return ContentSet {
                        documents,
                        source: ContentSource::ExplicitIndex,
                        warnings,
                    };
                }
            }
            Err(err) => warnings.push(format!(
                "could not load {}: {err}; falling back to directory scan",
                index_path.display()
            )),
        }
    }

    if !content_dir.is_dir() {
        warnings.push(format!(
            "content dir {} not found; no posts",
            content_dir.display()
        ));
        return ContentSet {
            documents: Vec::new(),
            source: ContentSource::Empty,
            warnings,
        };
    }

    let documents = scan_content_dir(&content_dir, config, &mut warnings);
    warn_on_duplicates(&documents, &mut warnings);
    ContentSet {
        documents,
        source: ContentSource::DirectoryScan,
        warnings,
    }
}

fn load_index(path: &Path) -> Result<Vec<PostIndexEntry>, IndexError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Resolve an index entry into a document. The declared slug wins; otherwise
/// the last path segment is used. Entries without either, and the reserved
/// `index` slug, yield `None`.
fn document_from_index_entry(entry: &PostIndexEntry) -> Option<ContentDocument> {
    let slug = match &entry.meta.slug {
        Some(s) => s.clone(),
        None => entry
            .path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())?
            .to_string(),
    };
    if slug == "index" {
        return None;
    }
    Some(ContentDocument {
        slug,
        source: entry.path.clone(),
        meta: entry.meta.clone(),
    })
}

/// Walk the content dir and build one document per matching source file,
/// in sorted file-name order so repeated runs see the same sequence.
fn scan_content_dir(
    content_dir: &Path,
    config: &ContentConfig,
    warnings: &mut Vec<String>,
) -> Vec<ContentDocument> {
    let mut documents = Vec::new();

    let walker = WalkDir::new(content_dir).sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warnings.push(format!("scan error: {err}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || !has_matching_extension(&name, &config.extensions) {
            continue;
        }

        let meta = extract::read_post_meta(entry.path());
        let slug = match &meta.slug {
            Some(s) => s.clone(),
            None => entry
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
        };
        if slug.is_empty() || slug == "index" {
            continue;
        }

        let source = entry
            .path()
            .strip_prefix(content_dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .to_string();
        documents.push(ContentDocument { slug, source, meta });
    }

    documents
}

fn has_matching_extension(file_name: &str, extensions: &[String]) -> bool {
    let ext = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return false,
    };
    extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

fn warn_on_duplicates(documents: &[ContentDocument], warnings: &mut Vec<String>) {
    for (slug, sources) in duplicate_slugs(documents) {
        warnings.push(format!(
            "duplicate slug \"{slug}\" in {}; the last one wins",
            sources.join(", ")
        ));
    }
}

/// Map slugs to their metadata. On duplicate slugs the last document wins,
/// matching the warning emitted during discovery.
pub fn slug_map(documents: &[ContentDocument]) -> BTreeMap<String, PostMeta> {
    let mut map = BTreeMap::new();
    for doc in documents {
        map.insert(doc.slug.clone(), doc.meta.clone());
    }
    map
}

/// Slugs declared by more than one document, with the sources that declare
/// them (discovery order). The `check` command turns these into a failing
/// exit; the pipeline only warns.
pub fn duplicate_slugs(documents: &[ContentDocument]) -> Vec<(String, Vec<String>)> {
    let mut by_slug: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for doc in documents {
        by_slug.entry(&doc.slug).or_default().push(&doc.source);
    }
    by_slug
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(slug, sources)| {
            (
                slug.to_string(),
                sources.into_iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}
