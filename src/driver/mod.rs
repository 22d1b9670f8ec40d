//! Page driver capability: the narrow surface the scraper needs from a browser.
//!
//! The core never talks to a browser library directly. It consumes this trait,
//! which keeps the extraction and export logic testable with a scripted fake
//! and keeps browser concerns (launch, login, readiness) out of the core.

pub mod chrome;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Opaque reference to an element located on the current page state.
///
/// Handles are only valid until the next [`PageDriver::locate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandle(pub(crate) usize);

/// Failures surfaced by a page driver.
///
/// These are typed values, not panics: callers decide whether a failure is
/// fatal (navigation steps) or degradable (field lookups).
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("no element matched {selector}")]
    NotFound { selector: String },

    #[error("lookup failed for {selector}: {message}")]
    Lookup { selector: String, message: String },

    #[error("interaction with {selector} failed: {message}")]
    Interaction { selector: String, message: String },

    #[error("text extraction failed: {message}")]
    Text { message: String },

    #[error("stale element handle")]
    StaleHandle,
}

/// Synchronous page capability over an interactive browser.
///
/// All operations act on whatever page state the browser is currently showing.
/// The core only consumes [`locate`](PageDriver::locate) and
/// [`text_of`](PageDriver::text_of); the remaining operations exist for the
/// run loop's navigation glue.
#[async_trait]
pub trait PageDriver {
    /// Load a URL in the working tab.
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Click the first element matching the selector.
    async fn click(&mut self, selector: &str) -> Result<(), DriverError>;

    /// Type a value into the first element matching the selector.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), DriverError>;

    /// Fixed-duration settle wait.
    async fn wait(&mut self, ms: u64);

    /// Resolve a locator against the current page state.
    ///
    /// Zero matches is `Ok(vec![])`, not an error.
    async fn locate(&mut self, selector: &str) -> Result<Vec<ElementHandle>, DriverError>;

    /// Text content of a located element; `None` when the element has none.
    async fn text_of(&mut self, handle: ElementHandle) -> Result<Option<String>, DriverError>;
}

/// Block until the operator confirms readiness by pressing ENTER.
///
/// This is the human-in-the-loop step: the SSO login happens by hand in the
/// browser window, and the run must not start until the operator says the
/// landing page is up.
pub async fn await_operator(prompt: &str) -> std::io::Result<()> {
    eprintln!("{prompt}");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(())
}
