use anyhow::Result;
use bridgecheck::{Config, Viewport};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Smoke checks for the link bridge service
#[derive(Parser)]
#[command(name = "bridgecheck", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct CommonArgs {
    /// Base URL of the service under test
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// GET /api/bridge once and report whether a shortened URL came back
    Probe(ProbeArgs),
    /// GET /api/health once
    Health,
    /// Render the background test page and save a screenshot
    Render(RenderArgs),
}

#[derive(Args)]
struct ProbeArgs {
    /// Provider API token
    #[arg(long)]
    api: Option<String>,
    /// Destination URL to shorten
    #[arg(long)]
    url: Option<String>,
    /// Shortener provider endpoint
    #[arg(long)]
    provider: Option<String>,
}

#[derive(Args)]
struct RenderArgs {
    /// Background image to embed
    #[arg(long)]
    image: Option<PathBuf>,
    /// Where to write the PNG
    #[arg(long)]
    output: Option<PathBuf>,
    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
    /// How long to wait for the page to finish loading, in milliseconds
    #[arg(long)]
    ready_timeout_ms: Option<u64>,
    /// Heading drawn over the background
    #[arg(long)]
    heading: Option<String>,
}

impl CommonArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
    }
}

impl ProbeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(api) = self.api {
            config.bridge.api = api;
        }
        if let Some(url) = self.url {
            config.bridge.url = url;
        }
        if let Some(provider) = self.provider {
            config.bridge.provider = provider;
        }
    }
}

impl RenderArgs {
    fn apply(self, config: &mut Config) {
        if let Some(image) = self.image {
            config.image_path = image;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        config.viewport = Viewport {
            width: self.width.unwrap_or(config.viewport.width),
            height: self.height.unwrap_or(config.viewport.height),
        };
        if let Some(ready_timeout_ms) = self.ready_timeout_ms {
            config.ready_timeout_ms = ready_timeout_ms;
        }
        if let Some(heading) = self.heading {
            config.heading = heading;
        }
    }
}

// Probe and health report every outcome on stdout and never fail the process.
fn run_probe(config: &Config, json: bool) {
    let result = bridgecheck::probe::probe(config);

    if json {
        let value = match &result {
            Ok(report) => serde_json::to_value(report).unwrap_or_default(),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        println!("{}", value);
        return;
    }

    println!("Testing /api/bridge with params: {}", config.bridge);
    match result {
        Ok(report) => {
            println!("Status: {}", report.status);
            println!("Response: {}", report.body);
            println!("{}", report.verdict.message());
            if !report.verdict.is_success() {
                if let Some(detail) = report.error_detail() {
                    println!("Detail: {}", detail);
                }
            }
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn run_health(config: &Config, json: bool) {
    let result = bridgecheck::probe::health(config);

    if json {
        let value = match &result {
            Ok(report) => serde_json::to_value(report).unwrap_or_default(),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        println!("{}", value);
        return;
    }

    match result {
        Ok(report) => {
            println!("Status: {}", report.status);
            println!("{}", report.verdict.message());
        }
        Err(e) => println!("Error: {}", e),
    }
}

#[cfg(feature = "cdp")]
fn run_render(config: &Config, json: bool) -> Result<()> {
    use bridgecheck::RenderOutcome;

    let outcome = bridgecheck::render::render_background(config)?;
    if json {
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(());
    }

    match outcome {
        RenderOutcome::Saved(report) => {
            println!("Screenshot saved to {}", report.output_path.display());
        }
        RenderOutcome::ImageMissing { path } => {
            println!("Error: {} not found!", path.display());
        }
    }
    Ok(())
}

#[cfg(not(feature = "cdp"))]
fn run_render(_config: &Config, _json: bool) -> Result<()> {
    anyhow::bail!("bridgecheck was built without the `cdp` feature; rendering is unavailable")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();

    let cli = Cli::parse();
    let mut config = Config::default();
    cli.common.apply(&mut config);

    match cli.command {
        Command::Probe(args) => {
            args.apply(&mut config);
            run_probe(&config, cli.common.json);
        }
        Command::Health => run_health(&config, cli.common.json),
        Command::Render(args) => {
            args.apply(&mut config);
            run_render(&config, cli.common.json)?;
        }
    }

    Ok(())
}
