//! Server-side rendering through the built Node entry point.
//!
//! The frontend build produces a server bundle alongside the client bundle.
//! [`NodeBackend::locate`] probes a fixed list of conventional locations
//! inside the build output for that bundle and keeps the first one that both
//! exists and exports a callable render function (`render` or the default
//! export). Finding none is fatal: no route could possibly render.
//!
//! Rendering shells out to `node` once per route with a small inline module
//! that imports the entry and calls its render function:
//!
//! ```text
//! node --input-type=module -e <driver> <entry> <route>
//! ```
//!
//! The render function may return a string, a promise, or an object with an
//! `html` field. A falsy result is treated as empty markup, not an error;
//! the emitter then writes a page with an empty mount point.
//!
//! The [`SsrBackend`] trait keeps the rest of the pipeline independent of
//! Node, so tests drive it with a canned backend instead.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::RenderConfig;

#[derive(Error, Debug)]
pub enum SsrError {
    #[error("could not run {0}: {1}")]
    Spawn(String, std::io::Error),
    #[error("no usable server entry under {0}; tried: {1}")]
    EntryNotFound(PathBuf, String),
    #[error("render failed: {0}")]
    RenderFailed(String),
}

/// Trait for server-side render backends.
///
/// `Sync` because routes render in parallel under rayon.
pub trait SsrBackend: Sync {
    /// Render one route to the HTML fragment for the mount point.
    fn render(&self, route: &str) -> Result<String, SsrError>;
}

/// Checks that a candidate module exposes a callable render export.
/// Exit status is the whole answer; output is discarded.
const PROBE: &str = r#"
import { pathToFileURL } from "node:url";
const mod = await import(pathToFileURL(process.argv[1]).href);
const render = typeof mod.render === "function" ? mod.render : mod.default;
process.exit(typeof render === "function" ? 0 : 1);
"#;

/// Per-route driver. Accepts a string result, a promise, or an object with
/// an `html` field; coerces falsy results to empty markup.
const DRIVER: &str = r#"
import { pathToFileURL } from "node:url";
const [entry, route] = process.argv.slice(1);
const mod = await import(pathToFileURL(entry).href);
const render = typeof mod.render === "function" ? mod.render : mod.default;
if (typeof render !== "function") {
  console.error(`no render export in ${entry}`);
  process.exit(1);
}
const result = await render(route);
const html = typeof result === "string" ? result : (result && result.html) || "";
process.stdout.write(html);
"#;

/// The production backend: one `node` invocation per route.
pub struct NodeBackend {
    node_binary: String,
    entry: PathBuf,
}

impl NodeBackend {
    /// Probe the candidate entry locations under the build output directory
    /// and keep the first usable one.
    pub fn locate(dist: &Path, config: &RenderConfig) -> Result<Self, SsrError> {
        for candidate in &config.entry_candidates {
            let entry = dist.join(candidate);
            if !entry.is_file() {
                continue;
            }
            if probe_render_export(&config.node_binary, &entry)? {
                return Ok(Self {
                    node_binary: config.node_binary.clone(),
                    entry,
                });
            }
        }
        Err(SsrError::EntryNotFound(
            dist.to_path_buf(),
            config.entry_candidates.join(", "),
        ))
    }

    /// The entry module this backend renders through.
    pub fn entry(&self) -> &Path {
        &self.entry
    }
}

fn probe_render_export(node_binary: &str, entry: &Path) -> Result<bool, SsrError> {
    let status = Command::new(node_binary)
        .arg("--input-type=module")
        .arg("-e")
        .arg(PROBE)
        .arg(entry.as_os_str())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| SsrError::Spawn(node_binary.to_string(), e))?;
    Ok(status.success())
}

impl SsrBackend for NodeBackend {
    fn render(&self, route: &str) -> Result<String, SsrError> {
        let output = Command::new(&self.node_binary)
            .arg("--input-type=module")
            .arg("-e")
            .arg(DRIVER)
            .arg(self.entry.as_os_str())
            .arg(route)
            .output()
            .map_err(|e| SsrError::Spawn(self.node_binary.clone(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(SsrError::RenderFailed(if detail.is_empty() {
                format!("{} exited with {}", self.entry.display(), output.status)
            } else {
                detail.to_string()
            }));
        }
        String::from_utf8(output.stdout).map_err(|_| {
            SsrError::RenderFailed(format!(
                "non-UTF-8 output from {}",
                self.entry.display()
            ))
        })
    }
}
