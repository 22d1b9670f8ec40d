//! Per-ticket orchestration: drive the search flow, extract, accumulate,
//! export.
//!
//! Strictly sequential: one ticket is fully processed before the next begins,
//! and the export happens once, after the loop. The caller is responsible for
//! bringing the driver to a ready (logged-in) state first.

use crate::config::ScrapeConfig;
use crate::driver::{DriverError, PageDriver};
use crate::export::ResultSet;
use crate::extract::extract_record;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Settle time after opening the search form.
const MENU_SETTLE_MS: u64 = 1_000;
/// Settle time after submitting a ticket lookup.
const TICKET_LOAD_MS: u64 = 3_000;
/// Settle time after switching to the Information tab.
const TAB_SETTLE_MS: u64 = 1_000;

/// Process every configured ticket and export the result set.
///
/// A navigation failure aborts the run (nothing is exported); field-level
/// failures inside extraction degrade to empty values and do not.
pub async fn run(config: &ScrapeConfig, driver: &mut dyn PageDriver) -> Result<ResultSet> {
    let mut results = ResultSet::new();

    for ticket in &config.tickets {
        info!(%ticket, "processing ticket");
        open_information_tab(config, driver, ticket)
            .await
            .with_context(|| format!("bringing up ticket {ticket}"))?;

        let record = extract_record(driver, &config.fields, ticket).await;
        debug!(%ticket, fields = record.len() - 1, "extracted record");
        results.push(record);
    }

    if results.export_csv(&config.output)? {
        info!(
            path = %config.output.display(),
            tickets = results.len(),
            "run complete"
        );
    } else {
        info!("no tickets processed, skipping export");
    }

    Ok(results)
}

/// Walk the search form until the ticket's Information tab is showing.
async fn open_information_tab(
    config: &ScrapeConfig,
    driver: &mut dyn PageDriver,
    ticket: &str,
) -> Result<(), DriverError> {
    driver.click(&config.nav.search_menu).await?;
    driver.wait(MENU_SETTLE_MS).await;

    driver.fill(&config.nav.ticket_input, ticket).await?;
    driver.click(&config.nav.get_ticket_button).await?;
    driver.wait(TICKET_LOAD_MS).await;

    // The tab may already be active, in which case the click can fail.
    match driver.click(&config.nav.information_tab).await {
        Ok(()) => driver.wait(TAB_SETTLE_MS).await,
        Err(e) => debug!(error = %e, "information tab click failed, assuming already active"),
    }

    Ok(())
}
