use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use wavepanels::{
    content_ready, BuildMode, DocumentSurfaces, JsonHandoff, Page, PageConfig, RunConfig,
    Viewport, WasmLoader,
};

/// Size the panels of a perlin-wave page and hand them to the wave module.
#[derive(Parser, Debug)]
#[command(name = "wavepanels", version, about)]
struct Cli {
    /// HTML page containing the panel elements
    #[arg(long)]
    page: PathBuf,

    /// JSON page config (defaults to the stock control + wave panels)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport used to lay out the page, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720")]
    viewport: Viewport,

    /// Build mode; decides the default module location
    #[arg(long)]
    mode: Option<BuildMode>,

    /// Module path or URL, overriding the config and mode
    #[arg(long)]
    module: Option<String>,

    /// Base URL for relative module locations
    #[arg(long)]
    base_url: Option<Url>,

    /// Write the applied panel heights as CSS to this file
    #[arg(long)]
    styles_out: Option<PathBuf>,

    /// Module load timeout in milliseconds
    #[arg(long, default_value_t = wavepanels::module::DEFAULT_LOAD_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Only size the panels; do not load the module
    #[arg(long)]
    skip_module: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("wavepanels: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => PageConfig::from_path(path)?,
        None => PageConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if cli.module.is_some() {
        config.module = cli.module.clone();
    }

    let (signal, ready) = content_ready();
    let html = tokio::fs::read_to_string(&cli.page)
        .await
        .with_context(|| format!("reading page {}", cli.page.display()))?;
    let surfaces = DocumentSurfaces::parse(&html, cli.viewport);
    signal.fire();

    let mut page = Page::new(config, surfaces)?;
    if let Some(base) = cli.base_url.clone() {
        page = page.with_base_url(base);
    }

    let mut handoff = JsonHandoff::new(io::stdout());
    if cli.skip_module {
        ready.wait().await?;
        let panels = page.measure()?;
        handoff.write(&RunConfig::new(page.config().bgcolor.clone(), &panels))?;
    } else {
        let loader = WasmLoader::new(cli.timeout_ms)?;
        page.start(ready, &loader, &mut handoff).await?;
    }

    if let Some(path) = &cli.styles_out {
        tokio::fs::write(path, page.lookup().style_patch())
            .await
            .with_context(|| format!("writing styles to {}", path.display()))?;
    }
    Ok(())
}
