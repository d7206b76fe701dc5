use clap::{Parser, Subcommand};
use inzighted_prerender::{config, content, prerender, report, routes, sitemap};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup — trivial, called exactly once
        Box::leak(format!("{}+{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "inzighted-prerender")]
#[command(about = "Static prerendering pipeline for the InzightEd web app")]
#[command(long_about = "\
Static prerendering pipeline for the InzightEd web app

Runs after the client build. Scans blog sources into sitemap.xml, selects
the public routes, renders each through the server bundle, and writes one
static HTML file per route with resolved SEO metadata.

Project layout:

  <root>/
  ├── prerender.toml               # Pipeline config (optional)
  ├── index.html                   # Unbuilt shell, last-resort template
  ├── seo-overrides.json           # Per-route metadata overrides (optional)
  ├── public/                      # Static assets; sitemap.xml lands here
  ├── src/content/blog/            # Blog post sources
  │   ├── posts.json               # Explicit post index (optional, wins)
  │   └── exam-stress.jsx          # export const meta = { ... }
  └── dist/                        # Built client app
      ├── index.html               # Page template
      └── server/entry-server.mjs  # SSR entry (first usable candidate wins)

Metadata resolution (first available wins):
  Title:       override → post meta → section default → brand
  Description: override → post meta → section default
  Image:       override → post meta → site default

Run 'inzighted-prerender gen-config' to generate a documented prerender.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root holding the built app and content sources
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file, relative to the project root
    #[arg(long, default_value = "prerender.toml", global = true)]
    config: PathBuf,

    /// Override the built app directory from config
    #[arg(long, global = true)]
    dist: Option<String>,

    /// Override the static assets directory from config
    #[arg(long, global = true)]
    public: Option<String>,

    /// Override the blog content directory from config
    #[arg(long, global = true)]
    content: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan blog content and write sitemap.xml
    Sitemap,
    /// Select prerenderable routes from sitemap.xml
    Routes,
    /// Render selected routes and emit static HTML into dist
    Prerender,
    /// Run the full pipeline: sitemap → routes → prerender
    Build,
    /// Validate blog content without writing anything
    Check,
    /// Print a stock prerender.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Sitemap => {
            let config = resolve_cli_config(&cli)?;
            let set = content::load_documents(&cli.root, &config.content);
            for warning in &set.warnings {
                println!("Warning: {}", warning);
            }
            let sitemap = sitemap::build_sitemap(&config, &set.documents);
            let public_dir = cli.root.join(&config.output.public);
            let path = sitemap::write_sitemap(&sitemap, &public_dir)?;
            if config.output.write_robots {
                sitemap::write_robots(&config, &public_dir)?;
            }
            let shown = path.strip_prefix(&cli.root).unwrap_or(&path);
            report::print_sitemap_output(&sitemap, shown);
        }
        Command::Routes => {
            let config = resolve_cli_config(&cli)?;
            let dist = cli.root.join(&config.output.dist);
            let public = cli.root.join(&config.output.public);
            let xml = routes::read_sitemap_text(&dist, &public)?;
            let selection = routes::select_routes(&xml, &config.routes);
            report::print_routes_output(&selection);
        }
        Command::Prerender => {
            let config = resolve_cli_config(&cli)?;
            let dist = cli.root.join(&config.output.dist);
            let public = cli.root.join(&config.output.public);
            let xml = routes::read_sitemap_text(&dist, &public)?;
            let selection = routes::select_routes(&xml, &config.routes);
            if selection.routes.is_empty() {
                println!("Warning: no routes selected; nothing to prerender");
                return Ok(());
            }
            init_thread_pool(&config.render);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in report::format_route_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = prerender::run_prerender(&config, &cli.root, &selection.routes, Some(tx))?;
            printer.join().unwrap();
            println!();
            report::print_run_summary(&summary);
        }
        Command::Build => {
            let config = resolve_cli_config(&cli)?;
            let content_dir = cli.root.join(&config.content.dir);
            let dist = cli.root.join(&config.output.dist);
            let public_dir = cli.root.join(&config.output.public);

            println!("==> Stage 1: Building sitemap from {}", content_dir.display());
            let set = content::load_documents(&cli.root, &config.content);
            for warning in &set.warnings {
                println!("Warning: {}", warning);
            }
            let sitemap = sitemap::build_sitemap(&config, &set.documents);
            let path = sitemap::write_sitemap(&sitemap, &public_dir)?;
            if config.output.write_robots {
                sitemap::write_robots(&config, &public_dir)?;
            }
            let shown = path.strip_prefix(&cli.root).unwrap_or(&path);
            report::print_sitemap_output(&sitemap, shown);

            println!("==> Stage 2: Selecting routes");
            let xml = routes::read_sitemap_text(&dist, &public_dir)?;
            let selection = routes::select_routes(&xml, &config.routes);
            report::print_routes_output(&selection);

            if selection.routes.is_empty() {
                println!("Warning: no routes selected; skipping prerender");
            } else {
                println!("==> Stage 3: Prerendering → {}", dist.display());
                init_thread_pool(&config.render);
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        for line in report::format_route_event(&event) {
                            println!("{}", line);
                        }
                    }
                });
                let summary =
                    prerender::run_prerender(&config, &cli.root, &selection.routes, Some(tx))?;
                printer.join().unwrap();
                println!();
                report::print_run_summary(&summary);
            }

            println!("==> Build complete: {}", dist.display());
        }
        Command::Check => {
            let config = resolve_cli_config(&cli)?;
            let content_dir = cli.root.join(&config.content.dir);
            println!("==> Checking {}", content_dir.display());
            let set = content::load_documents(&cli.root, &config.content);
            let duplicates = content::duplicate_slugs(&set.documents);
            report::print_check_output(&set, duplicates.len());
            if !duplicates.is_empty() {
                std::process::exit(1);
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config for this invocation: the config file (if present) merged
/// over stock defaults, then directory flags applied on top.
fn resolve_cli_config(cli: &Cli) -> Result<config::PrerenderConfig, config::ConfigError> {
    let mut loaded = config::load_config_file(&cli.root.join(&cli.config))?;
    if let Some(dist) = &cli.dist {
        loaded.output.dist = dist.clone();
    }
    if let Some(public) = &cli.public {
        loaded.output.public = public.clone();
    }
    if let Some(content) = &cli.content {
        loaded.content.dir = content.clone();
    }
    loaded.validate()?;
    Ok(loaded)
}

/// Initialize the rayon thread pool based on render config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(render: &config::RenderConfig) {
    let workers = config::effective_workers(render);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .ok();
}
