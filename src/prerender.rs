//! Per-route prerendering.
//!
//! Stage 3 of the pipeline. Takes the selected routes, renders each through
//! the server entry, resolves its metadata, and emits the final HTML file:
//!
//! ```text
//! routes ──render──▶ markup ──resolve──▶ head tags ──emit──▶ dist/**/index.html
//! ```
//!
//! ## Setup, then fan-out
//!
//! Everything shared is loaded once up front: the page template, the blog
//! slug map, and the override table. Routes then process independently —
//! the lookup tables are read-only and output paths are disjoint, so the
//! per-route loop runs in parallel under [rayon](https://docs.rs/rayon).
//!
//! ## Failure model
//!
//! Two failures abort the whole run before any file is written: no usable
//! server entry, and no readable template. Everything else is per-route —
//! a route that fails to render or write is recorded in the [`RunSummary`]
//! and the batch continues, so one broken post never blocks the rest of
//! the site.
//!
//! Progress is reported through an optional channel of [`RouteEvent`]s,
//! which the CLI drains from a printer thread.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use rayon::prelude::*;
use thiserror::Error;

use crate::config::PrerenderConfig;
use crate::content;
use crate::emit::{self, EmitError};
use crate::seo;
use crate::ssr::{NodeBackend, SsrBackend, SsrError};
use crate::types::{MetadataRecord, PostMeta, RouteFailure, RunSummary};

#[derive(Error, Debug)]
pub enum PrerenderError {
    #[error("server renderer unavailable: {0}")]
    Ssr(#[from] SsrError),
    #[error("template unavailable: {0}")]
    Template(#[from] EmitError),
}

/// Progress event emitted while routes render.
#[derive(Debug, Clone)]
pub enum RouteEvent {
    Started { total: usize },
    Warning { message: String },
    Rendered { route: String, output: PathBuf },
    Failed { route: String, message: String },
}

/// Run the prerender stage with the production Node backend.
pub fn run_prerender(
    config: &PrerenderConfig,
    root: &Path,
    routes: &[String],
    events: Option<Sender<RouteEvent>>,
) -> Result<RunSummary, PrerenderError> {
    let dist = root.join(&config.output.dist);
    let backend = NodeBackend::locate(&dist, &config.render)?;
    run_prerender_with_backend(&backend, config, root, routes, events)
}

/// Run the prerender stage with a specific backend (allows testing without
/// Node installed).
pub fn run_prerender_with_backend(
    backend: &impl SsrBackend,
    config: &PrerenderConfig,
    root: &Path,
    routes: &[String],
    events: Option<Sender<RouteEvent>>,
) -> Result<RunSummary, PrerenderError> {
    let dist = root.join(&config.output.dist);
    let template = emit::load_template(
        &dist.join("index.html"),
        &root.join(&config.output.fallback_template),
        config.output.template_attempts,
        config.output.template_retry_ms,
    )?;
    if template.used_fallback {
        send(
            &events,
            RouteEvent::Warning {
                message: format!(
                    "no built template under {}; using {} instead",
                    dist.display(),
                    config.output.fallback_template
                ),
            },
        );
    }

    // Lookup tables are built once and shared read-only across routes.
    let content = content::load_documents(root, &config.content);
    for warning in &content.warnings {
        send(
            &events,
            RouteEvent::Warning {
                message: warning.clone(),
            },
        );
    }
    let posts = content::slug_map(&content.documents);

    let overrides_path = root.join(&config.seo.overrides_file);
    let overrides = match seo::load_overrides(&overrides_path) {
        Ok(map) => map,
        Err(err) => {
            send(
                &events,
                RouteEvent::Warning {
                    message: format!("ignoring {}: {err}", overrides_path.display()),
                },
            );
            BTreeMap::new()
        }
    };

    send(
        &events,
        RouteEvent::Started {
            total: routes.len(),
        },
    );

    let results: Vec<Result<PathBuf, RouteFailure>> = routes
        .par_iter()
        .map_with(events, |tx, route| {
            let result =
                render_route(backend, config, &template.html, &overrides, &posts, &dist, route);
            match &result {
                Ok(output) => {
                    // Event paths are relative to the project root.
                    let shown = output.strip_prefix(root).unwrap_or(output.as_path());
                    send(
                        tx,
                        RouteEvent::Rendered {
                            route: route.clone(),
                            output: shown.to_path_buf(),
                        },
                    )
                }
                Err(message) => send(
                    tx,
                    RouteEvent::Failed {
                        route: route.clone(),
                        message: message.clone(),
                    },
                ),
            }
            result.map_err(|message| RouteFailure {
                route: route.clone(),
                message,
            })
        })
        .collect();

    let mut summary = RunSummary {
        used_fallback_template: template.used_fallback,
        ..RunSummary::default()
    };
    for result in results {
        match result {
            Ok(_) => summary.emitted += 1,
            Err(failure) => summary.failures.push(failure),
        }
    }
    Ok(summary)
}

/// One route, end to end: render markup, resolve metadata, emit the page.
/// Failures come back as display strings so one bad route never stops the
/// batch.
fn render_route(
    backend: &impl SsrBackend,
    config: &PrerenderConfig,
    template: &str,
    overrides: &BTreeMap<String, MetadataRecord>,
    posts: &BTreeMap<String, PostMeta>,
    dist: &Path,
    route: &str,
) -> Result<PathBuf, String> {
    let markup = backend.render(route).map_err(|e| e.to_string())?;
    let record = seo::resolve_metadata(route, overrides, posts, config);
    let head = seo::render_head(&record, route, &config.site).into_string();
    let document = emit::render_page(template, &head, &markup);
    emit::write_page(dist, route, &document).map_err(|e| e.to_string())
}

fn send(events: &Option<Sender<RouteEvent>>, event: RouteEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}
