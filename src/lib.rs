//! # InzightEd Prerender
//!
//! Build-time static prerendering for the InzightEd web app. The served app
//! stays a normal single-page app; this pipeline runs after the client build
//! and turns every public route into a crawlable HTML file with resolved SEO
//! metadata, so search engines and link unfurlers see real content instead
//! of an empty shell.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! The pipeline runs three independent stages, handing off through files the
//! deploy also ships:
//!
//! ```text
//! 1. Sitemap     src/content/blog/  →  public/sitemap.xml    (posts → URL inventory)
//! 2. Routes      sitemap.xml        →  route list            (denylist filter + dedupe)
//! 3. Prerender   routes             →  dist/**/index.html    (SSR + metadata injection)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Inspectability**: the handoff artifact is `sitemap.xml` itself — the
//!   same file crawlers fetch, readable and diffable in CI logs.
//! - **Partial runs**: each stage is a subcommand, so CI can rebuild the
//!   sitemap without rendering, or re-render without touching content.
//! - **Testability**: route selection and metadata resolution are pure
//!   functions over explicit inputs, so unit tests exercise them without a
//!   built app or a Node runtime.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Blog post discovery — explicit index file or directory scan |
//! | [`extract`] | Best-effort `export const meta = { ... }` parser for post sources |
//! | [`sitemap`] | Stage 1 — builds and writes `sitemap.xml` (and `robots.txt`) |
//! | [`routes`] | Stage 2 — selects prerenderable routes from `sitemap.xml` |
//! | [`prerender`] | Stage 3 — parallel per-route render/resolve/emit orchestration |
//! | [`ssr`] | Server bundle probing and per-route rendering through Node |
//! | [`seo`] | Metadata resolution, head tag rendering, JSON-LD structured data |
//! | [`emit`] | Template cleanup, markup injection, output path mapping |
//! | [`config`] | `prerender.toml` loading, merging, and validation |
//! | [`types`] | Shared types (post metadata, resolved head records, run summary) |
//! | [`report`] | CLI output formatting — inventory display of pipeline results |
//!
//! # Design Decisions
//!
//! ## Explicit Inputs, No Ambient State
//!
//! Every lookup table the resolver consults — the blog slug map, the
//! per-route override table, the site identity — is loaded once at pipeline
//! start and passed by parameter. Nothing reads config or content from
//! global state. This keeps metadata precedence trivially unit-testable:
//! construct two maps, call [`seo::resolve_metadata`], assert.
//!
//! ## Maud Over Template Engines
//!
//! Head tags and JSON-LD script blocks are generated with
//! [Maud](https://maud.lambda.xyz/), a compile-time HTML macro system,
//! rather than string templates. Malformed markup is a build error, template
//! variables are Rust expressions, and interpolation is auto-escaped — which
//! matters when post titles contain `&` or `<`.
//!
//! ## First Usable Entry Wins
//!
//! The server bundle's location varies between bundler versions, so the
//! renderer probes an ordered list of entry candidates and uses the first
//! one that exists and exposes a callable render export. A miss is a typed
//! "not found" carrying every path tried, not a dynamic-import stack trace.
//!
//! ## Per-Route Isolation
//!
//! One route failing to render or write must never lose the rest of the
//! site. Only two conditions abort a run: no usable server entry and no
//! readable template. Everything else is recorded per route and reported in
//! the summary; a missed page simply stays client-rendered when served.
//!
//! ## Best-Effort Metadata Extraction
//!
//! Post sources declare metadata in an `export const meta = { ... }` block.
//! The extractor parses what it can and returns `Option` per field; a post
//! with no parseable block still gets a sitemap entry and a route, with its
//! slug derived from the file name. Content mistakes degrade one page's
//! tags, never the build.

pub mod config;
pub mod content;
pub mod emit;
pub mod extract;
pub mod prerender;
pub mod report;
pub mod routes;
pub mod seo;
pub mod sitemap;
pub mod ssr;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
