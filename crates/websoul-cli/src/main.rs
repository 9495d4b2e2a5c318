//! # websoul
//!
//! Binary entry point. `serve` runs the inquiry relay next to the static
//! site; `assemble` runs the page pipeline against a URL or local file and
//! prints the assembled HTML.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use websoul_page::prefs::{DISPLAY_MODE_KEY, TEXT_SIZE_KEY};
use websoul_page::{
    DisplayMode, Location, MemoryPreferences, PageAssembler, PreferenceStore, SiteBehaviors,
    SiteFetcher,
};
use websoul_server::{AppState, InquiryRouting, ServerConfig, SmtpMailTransport};
use websoul_settings::WebsoulSettings;

/// websoul site tooling.
#[derive(Parser, Debug)]
#[command(name = "websoul", about = "websoul site relay and page assembler", version)]
struct Cli {
    /// Settings file (default: `$WEBSOUL_CONFIG` or `./websoul.json`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the inquiry relay and serve the static site.
    Serve(ServeArgs),
    /// Assemble one page and print the resulting HTML.
    Assemble(AssembleArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Port to bind (overrides settings and `PORT`).
    #[arg(long)]
    port: Option<u16>,

    /// Host to bind.
    #[arg(long)]
    host: Option<String>,

    /// Directory served as the static site.
    #[arg(long)]
    site_root: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Page URL (`http://`, `https://`, `file://`) or a local file path.
    target: String,

    /// Print the assembly report as JSON on stderr.
    #[arg(long)]
    report: bool,

    /// Text size preference applied during initialization.
    #[arg(long)]
    text_size: Option<String>,

    /// Display mode preference applied during initialization.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Light,
    Dark,
}

impl From<ModeArg> for DisplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Light => Self::Light,
            ModeArg::Dark => Self::Dark,
        }
    }
}

impl ServeArgs {
    /// Command-line values win over settings.
    fn apply(&self, settings: &mut WebsoulSettings) {
        if let Some(port) = self.port {
            settings.relay.port = port;
        }
        if let Some(host) = &self.host {
            settings.relay.host.clone_from(host);
        }
        if let Some(root) = &self.site_root {
            settings.relay.site_root = root.display().to_string();
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<WebsoulSettings> {
    let settings = match path {
        Some(path) => websoul_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => websoul_settings::load_settings().context("Failed to load settings")?,
    };
    Ok(settings)
}

/// Interpret `target` as a URL when it has a scheme, else as a file path.
fn parse_target(target: &str) -> Result<Location> {
    if target.contains("://") {
        return Location::parse(target).with_context(|| format!("Invalid page URL: {target}"));
    }
    let path = std::fs::canonicalize(target)
        .with_context(|| format!("Page file not found: {target}"))?;
    Location::from_file_path(&path).with_context(|| format!("Invalid page path: {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    websoul_core::init_subscriber(&settings.logging.level, settings.logging.format);

    match cli.command {
        Command::Serve(args) => {
            args.apply(&mut settings);
            serve(settings).await
        }
        Command::Assemble(args) => assemble(settings, args).await,
    }
}

async fn serve(settings: WebsoulSettings) -> Result<()> {
    let metrics = websoul_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;
    let mailer = SmtpMailTransport::from_settings(&settings.smtp)
        .context("Invalid SMTP configuration")?;
    if settings.smtp.sender().is_none() {
        warn!("no sender address configured, set SMTP_FROM or SMTP_USER");
    }

    let state = AppState::new(Arc::new(mailer), InquiryRouting::from(&settings.smtp))
        .with_metrics(metrics);
    let handle = websoul_server::start(ServerConfig::from(&settings.relay), state)
        .await
        .context("Failed to bind relay")?;

    let addr = handle.local_addr();
    info!("websoul relay listening on http://{addr}");
    info!("inquiry page: http://{addr}/support/inquiry.html");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("shutting down");
    let outcome = handle.stop().await;
    info!(?outcome, "shutdown complete");
    Ok(())
}

async fn assemble(settings: WebsoulSettings, args: AssembleArgs) -> Result<()> {
    let location = parse_target(&args.target)?;

    let prefs = Arc::new(MemoryPreferences::new());
    if let Some(size) = &args.text_size {
        prefs.set(TEXT_SIZE_KEY, size);
    }
    if let Some(mode) = args.mode {
        prefs.set(DISPLAY_MODE_KEY, DisplayMode::from(mode).as_str());
    }

    let site = settings.site;
    let fetcher = Arc::new(SiteFetcher::new(site.fetch_timeout()));
    let assembler = PageAssembler::new(fetcher, site, Arc::new(SiteBehaviors::new(prefs)));

    let page = assembler
        .open(location)
        .await
        .context("Failed to load page")?;
    let report = assembler.assemble(&page).await;

    println!("{}", page.html());
    if args.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        eprintln!("{json}");
    }
    Ok(())
}
