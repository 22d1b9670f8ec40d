//! Entry point: parse flags, launch the browser, run the scrape.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use ticketscrape::config::{ConfigFile, ScrapeConfig};
use ticketscrape::driver::chrome::ChromeDriver;
use ticketscrape::driver::{await_operator, PageDriver};
use ticketscrape::run;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ticketscrape",
    version,
    about = "Scrape change-request Information tabs into a CSV file"
)]
struct Cli {
    /// Ticket identifiers to process, in order.
    #[arg(value_name = "TICKET")]
    tickets: Vec<String>,

    /// Landing URL of the ticketing site.
    #[arg(long)]
    base_url: Option<String>,

    /// Destination CSV path (default: tickets.csv).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run the browser headless. No interactive login is possible; implies
    /// --skip-login-wait.
    #[arg(long)]
    headless: bool,

    /// Start scraping immediately instead of pausing for a manual login.
    #[arg(long)]
    skip_login_wait: bool,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    config.validate()?;
    if config.tickets.is_empty() {
        warn!("no tickets configured, nothing will be exported");
    }

    let interactive = !(cli.headless || cli.skip_login_wait);

    let mut driver = ChromeDriver::launch(cli.headless)
        .await
        .context("launching browser")?;

    let outcome = scrape(&config, &mut driver, interactive).await;
    driver.close().await;
    let results = outcome?;

    if !results.is_empty() {
        eprintln!(
            "Saved {} ticket(s) to {}",
            results.len(),
            config.output.display()
        );
    }
    Ok(())
}

/// Navigate to the site, wait for the operator's login, run the scrape, and
/// optionally hold the browser open at the end.
async fn scrape(
    config: &ScrapeConfig,
    driver: &mut ChromeDriver,
    interactive: bool,
) -> Result<ticketscrape::ResultSet> {
    driver
        .navigate(&config.base_url)
        .await
        .with_context(|| format!("opening {}", config.base_url))?;

    if interactive {
        await_operator(
            "Log in in the browser window (SSO / VPN as needed). \
             When the landing page is fully loaded, press ENTER here...",
        )
        .await
        .context("waiting for login confirmation")?;
    }

    let results = run::run(config, driver).await?;

    if interactive {
        await_operator("Press ENTER to close the browser...")
            .await
            .context("waiting before closing the browser")?;
    }

    Ok(results)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "ticketscrape=debug"
    } else {
        "ticketscrape=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the optional config file with CLI flags; flags win.
fn resolve_config(cli: &Cli) -> Result<ScrapeConfig> {
    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };

    let base_url = cli
        .base_url
        .clone()
        .or(file.base_url)
        .context("a base URL is required (--base-url or the config file)")?;

    let tickets = if cli.tickets.is_empty() {
        file.tickets
    } else {
        cli.tickets.clone()
    };

    Ok(ScrapeConfig {
        base_url,
        tickets,
        output: cli
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from("tickets.csv")),
        nav: file.nav.unwrap_or_default(),
        fields: file.fields.unwrap_or_default(),
    })
}
