//! chromiumoxide-backed page driver.
//!
//! Launches a headed Chrome/Chromium so the operator can complete the SSO
//! login by hand, then serves the run loop's navigation and lookup calls
//! against the single working tab.

use super::{DriverError, ElementHandle, PageDriver};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Locator expression split, mirroring the `xpath=` prefix convention of
/// browser-automation selector strings.
enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
}

fn parse_locator(selector: &str) -> Locator<'_> {
    if let Some(expr) = selector.strip_prefix("xpath=") {
        Locator::XPath(expr)
    } else if selector.starts_with("//") || selector.starts_with('(') {
        Locator::XPath(selector)
    } else {
        Locator::Css(selector)
    }
}

/// A real browser implementing [`PageDriver`] over one working tab.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    /// Elements from the most recent locate call; handles index into this.
    located: Vec<Element>,
}

impl ChromeDriver {
    /// Launch a browser and open a blank working tab.
    ///
    /// Headed by default so a human can log in; `headless` exists for
    /// selector debugging against pages that need no authentication.
    pub async fn launch(headless: bool) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        // Pump CDP events until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler_task,
            located: Vec::new(),
        })
    }

    /// Close the browser and stop the event handler.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "browser did not exit cleanly");
        }
        self.handler_task.abort();
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        let found = match parse_locator(selector) {
            Locator::Css(expr) => self.page.find_elements(expr).await,
            Locator::XPath(expr) => self.page.find_xpaths(expr).await,
        };
        found.map_err(|e| DriverError::Lookup {
            selector: selector.to_string(),
            message: e.to_string(),
        })
    }

    async fn find_first(&self, selector: &str) -> Result<Element, DriverError> {
        self.find_all(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound {
                selector: selector.to_string(),
            })
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if let Err(e) = self.page.wait_for_navigation().await {
            debug!(url, error = %e, "load wait failed, continuing with current state");
        }
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        let element = self.find_first(selector).await?;
        element
            .click()
            .await
            .map_err(|e| DriverError::Interaction {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        let element = self.find_first(selector).await?;
        let typed = async {
            element.click().await?;
            element.type_str(value).await
        };
        typed.await.map_err(|e| DriverError::Interaction {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn wait(&mut self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    async fn locate(&mut self, selector: &str) -> Result<Vec<ElementHandle>, DriverError> {
        self.located = self.find_all(selector).await?;
        Ok((0..self.located.len()).map(ElementHandle).collect())
    }

    async fn text_of(&mut self, handle: ElementHandle) -> Result<Option<String>, DriverError> {
        let element = self.located.get(handle.0).ok_or(DriverError::StaleHandle)?;
        element
            .inner_text()
            .await
            .map_err(|e| DriverError::Text {
                message: e.to_string(),
            })
    }
}
