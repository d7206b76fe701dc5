//! Tool configuration module.
//!
//! Handles loading, validating, and merging `prerender.toml`. Configuration is
//! two-layered: stock defaults are overridden by an optional config file in the
//! project root. Paths in the file are resolved relative to the project root.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! base_url = "https://inzighted.com"  # Absolute origin for canonical URLs
//! brand = "InzightEd"                 # Appended to titles that lack it
//! default_image = "/og-image.png"     # Social card fallback image
//!
//! [content]
//! dir = "src/content/blog"            # Blog post sources (.jsx/.tsx)
//! index_file = "posts.json"           # Optional explicit post index
//! extensions = ["jsx", "tsx"]         # Source extensions to scan
//! blog_prefix = "/blog"               # Route prefix for post pages
//!
//! [routes]
//! static_routes = ["/", "/contact", "/pricing", "/blog"]
//! deny_prefixes = ["/auth", "/educator", "/student", "/institution", "/report", "/wait", "/error"]
//!
//! [render]
//! node_binary = "node"                # Node executable for the SSR bundle
//! entry_candidates = [                # Probed in order, first hit wins
//!     "server/entry-server.mjs",
//!     "server/entry-server.js",
//!     "ssr/entry-server.mjs",
//!     "ssr/entry-server.js",
//! ]
//! max_processes = 4                   # Max parallel renders (omit for auto = CPU cores)
//!
//! [output]
//! dist = "dist"                       # Built client app + prerender target
//! public = "public"                   # Static assets dir (sitemap.xml home)
//! fallback_template = "index.html"    # Unbuilt shell used when dist template is unreadable
//! template_attempts = 3               # Reads attempted before falling back
//! template_retry_ms = 300             # Delay between template read attempts
//! write_robots = true                 # Emit robots.txt next to sitemap.xml
//!
//! [seo]
//! overrides_file = "seo-overrides.json"  # Optional per-route metadata table
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Only point the tool at a different content directory
//! [content]
//! dir = "web/src/content/blog"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `prerender.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrerenderConfig {
    /// Site identity (origin URL, brand, social fallback image).
    pub site: SiteConfig,
    /// Blog content scanning settings.
    pub content: ContentConfig,
    /// Route selection settings (static routes, denylist).
    pub routes: RoutesConfig,
    /// Server-side rendering settings.
    pub render: RenderConfig,
    /// Output tree settings (dist/public dirs, template fallback).
    pub output: OutputConfig,
    /// SEO metadata settings.
    pub seo: SeoConfig,
}

impl Default for PrerenderConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            content: ContentConfig::default(),
            routes: RoutesConfig::default(),
            render: RenderConfig::default(),
            output: OutputConfig::default(),
            seo: SeoConfig::default(),
        }
    }
}

impl PrerenderConfig {
    /// Validate config values are usable before any stage runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site.base_url.starts_with("http://") && !self.site.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "site.base_url must start with http:// or https://".into(),
            ));
        }
        if self.site.brand.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.brand must not be empty".into(),
            ));
        }
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions must not be empty".into(),
            ));
        }
        if !self.content.blog_prefix.starts_with('/') || self.content.blog_prefix.ends_with('/') {
            return Err(ConfigError::Validation(
                "content.blog_prefix must start with '/' and not end with '/'".into(),
            ));
        }
        for route in &self.routes.static_routes {
            if !route.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "routes.static_routes entry {route:?} must start with '/'"
                )));
            }
        }
        for prefix in &self.routes.deny_prefixes {
            if !prefix.starts_with('/') || prefix == "/" {
                return Err(ConfigError::Validation(format!(
                    "routes.deny_prefixes entry {prefix:?} must start with '/' and not be the root"
                )));
            }
        }
        if self.render.entry_candidates.is_empty() {
            return Err(ConfigError::Validation(
                "render.entry_candidates must not be empty".into(),
            ));
        }
        if self.output.template_attempts == 0 {
            return Err(ConfigError::Validation(
                "output.template_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Site identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute origin used for canonical URLs, og:url, and absolutized
    /// image paths. No trailing slash expected; one is tolerated.
    pub base_url: String,
    /// Brand name appended to page titles that do not already carry it.
    pub brand: String,
    /// Site-relative fallback image for social cards when a page has none.
    pub default_image: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://inzighted.com".to_string(),
            brand: "InzightEd".to_string(),
            default_image: "/og-image.png".to_string(),
        }
    }
}

/// Blog content scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Directory holding blog post sources, relative to the project root.
    pub dir: String,
    /// Optional explicit post index inside the content dir. When present and
    /// parseable it wins over the directory scan.
    pub index_file: String,
    /// Source file extensions recognized by the directory scan (no dots).
    pub extensions: Vec<String>,
    /// Route prefix under which posts are published.
    pub blog_prefix: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: "src/content/blog".to_string(),
            index_file: "posts.json".to_string(),
            extensions: vec!["jsx".to_string(), "tsx".to_string()],
            blog_prefix: "/blog".to_string(),
        }
    }
}

/// Route selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutesConfig {
    /// Routes always present in the sitemap, ahead of post routes.
    pub static_routes: Vec<String>,
    /// Path prefixes excluded from prerendering. Matching is per segment:
    /// `/auth` blocks `/auth` and `/auth/login` but not `/authors`.
    pub deny_prefixes: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            static_routes: vec![
                "/".to_string(),
                "/contact".to_string(),
                "/pricing".to_string(),
                "/blog".to_string(),
            ],
            deny_prefixes: vec![
                "/auth".to_string(),
                "/educator".to_string(),
                "/student".to_string(),
                "/institution".to_string(),
                "/report".to_string(),
                "/wait".to_string(),
                "/error".to_string(),
            ],
        }
    }
}

/// Server-side rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Node executable used to run the SSR bundle.
    pub node_binary: String,
    /// Entry point candidates relative to the dist dir, probed in order.
    pub entry_candidates: Vec<String>,
    /// Maximum number of parallel render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_binary: "node".to_string(),
            entry_candidates: vec![
                "server/entry-server.mjs".to_string(),
                "server/entry-server.js".to_string(),
                "ssr/entry-server.mjs".to_string(),
                "ssr/entry-server.js".to_string(),
            ],
            max_processes: None,
        }
    }
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &RenderConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Output tree settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Built client app directory, relative to the project root. Prerendered
    /// pages are written here, mirroring the route tree.
    pub dist: String,
    /// Static assets directory where `sitemap.xml` (and `robots.txt`) land.
    pub public: String,
    /// Unbuilt HTML shell used when the dist template stays unreadable.
    pub fallback_template: String,
    /// Reads attempted on the dist template before falling back.
    pub template_attempts: u32,
    /// Delay between template read attempts, in milliseconds.
    pub template_retry_ms: u64,
    /// Whether to emit `robots.txt` next to `sitemap.xml`.
    pub write_robots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dist: "dist".to_string(),
            public: "public".to_string(),
            fallback_template: "index.html".to_string(),
            template_attempts: 3,
            template_retry_ms: 300,
            write_robots: true,
        }
    }
}

/// SEO metadata settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeoConfig {
    /// Optional per-route metadata override table, relative to the project
    /// root. Missing file means no overrides.
    pub overrides_file: String,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            overrides_file: "seo-overrides.json".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PrerenderConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PrerenderConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrerenderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `prerender.toml` in the given project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<PrerenderConfig, ConfigError> {
    load_config_file(&root.join("prerender.toml"))
}

/// Load config from an explicit file path (the `--config` flag).
pub fn load_config_file(path: &Path) -> Result<PrerenderConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `prerender.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# InzightEd Prerender Configuration
# =================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as `prerender.toml` in the frontend project root (the
# directory holding dist/, public/, and the content sources). Paths below
# are resolved relative to that root.
#
# Each file only needs the keys it wants to override.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Absolute origin for canonical URLs, og:url, and absolutized image paths.
base_url = "https://inzighted.com"

# Brand name. Appended to page titles that do not already contain it.
brand = "InzightEd"

# Site-relative fallback image for social cards when a page has none.
default_image = "/og-image.png"

# ---------------------------------------------------------------------------
# Blog content
# ---------------------------------------------------------------------------
[content]
# Directory holding blog post sources.
dir = "src/content/blog"

# Explicit post index inside the content dir. When present and parseable
# it wins over the directory scan.
index_file = "posts.json"

# Source file extensions recognized by the directory scan (no dots).
extensions = ["jsx", "tsx"]

# Route prefix under which posts are published.
blog_prefix = "/blog"

# ---------------------------------------------------------------------------
# Route selection
# ---------------------------------------------------------------------------
[routes]
# Routes always present in the sitemap, ahead of post routes.
static_routes = ["/", "/contact", "/pricing", "/blog"]

# Path prefixes excluded from prerendering. Matching is per segment:
# "/auth" blocks /auth and /auth/login but not /authors.
deny_prefixes = ["/auth", "/educator", "/student", "/institution", "/report", "/wait", "/error"]

# ---------------------------------------------------------------------------
# Server-side rendering
# ---------------------------------------------------------------------------
[render]
# Node executable used to run the SSR bundle.
node_binary = "node"

# Entry point candidates relative to the dist dir, probed in order.
entry_candidates = [
    "server/entry-server.mjs",
    "server/entry-server.js",
    "ssr/entry-server.mjs",
    "ssr/entry-server.js",
]

# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Output tree
# ---------------------------------------------------------------------------
[output]
# Built client app directory. Prerendered pages are written here.
dist = "dist"

# Static assets directory where sitemap.xml (and robots.txt) land.
public = "public"

# Unbuilt HTML shell used when the dist template stays unreadable.
fallback_template = "index.html"

# Reads attempted on the dist template before falling back.
template_attempts = 3

# Delay between template read attempts, in milliseconds.
template_retry_ms = 300

# Emit robots.txt next to sitemap.xml.
write_robots = true

# ---------------------------------------------------------------------------
# SEO metadata
# ---------------------------------------------------------------------------
[seo]
# Per-route metadata override table. Missing file means no overrides.
overrides_file = "seo-overrides.json"
"##
}
