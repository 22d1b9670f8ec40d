//! Run configuration: target site, tickets to process, and the field spec.
//!
//! Configuration is an explicit value handed to the run entry point, never
//! process-global state. A JSON file can supply any part of it; CLI flags
//! override the file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reserved name of the leading identifier column in every record.
pub const TICKET_COLUMN: &str = "TicketNumber";

/// One named field and the locator expression that finds it on the page.
///
/// Locators starting with `xpath=` or `//` are XPath expressions, everything
/// else is a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub selector: String,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
        }
    }
}

/// Ordered set of fields to extract from each ticket page.
///
/// Field names are unique and define the output column order after the
/// leading [`TICKET_COLUMN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldRule>", into = "Vec<FieldRule>")]
pub struct FieldSpec {
    rules: Vec<FieldRule>,
}

impl FieldSpec {
    /// Build a spec, rejecting duplicate names and the reserved ticket column.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self> {
        for (i, rule) in rules.iter().enumerate() {
            if rule.name == TICKET_COLUMN {
                bail!("field name {TICKET_COLUMN:?} is reserved for the ticket identifier");
            }
            if rules[..i].iter().any(|r| r.name == rule.name) {
                bail!("duplicate field name {:?} in field spec", rule.name);
            }
        }
        Ok(Self { rules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<FieldRule>> for FieldSpec {
    type Error = String;

    fn try_from(rules: Vec<FieldRule>) -> Result<Self, Self::Error> {
        FieldSpec::new(rules).map_err(|e| e.to_string())
    }
}

impl From<FieldSpec> for Vec<FieldRule> {
    fn from(spec: FieldSpec) -> Self {
        spec.rules
    }
}

impl Default for FieldSpec {
    /// The Information-tab fields of the change-request form: each value sits
    /// in the table cell following its label cell.
    fn default() -> Self {
        let label = |text: &str| {
            format!("xpath=//td[normalize-space()='{text}']/following-sibling::td[1]")
        };
        let label_contains = |text: &str| {
            format!("xpath=//td[contains(normalize-space(),'{text}')]/following-sibling::td[1]")
        };

        Self {
            rules: vec![
                FieldRule::new("Category", label("Category:")),
                FieldRule::new("Type", label("Type:")),
                FieldRule::new("Item", label("Item:")),
                FieldRule::new("ChangeRequestNumber", label_contains("Change Request Number")),
                FieldRule::new("ApprovalStatus", label("Approval Status:")),
                FieldRule::new("Status", label("Status:")),
                FieldRule::new("Urgency", label("Urgency:")),
                FieldRule::new("ClosureCode", label_contains("Closure Code")),
                FieldRule::new("Sequence", label("Sequence:")),
                FieldRule::new("Summary", label("Summary:")),
                FieldRule::new("Description", label("Description:")),
                FieldRule::new("RequesterName", label_contains("Requester Name")),
                FieldRule::new("RequesterLogin", label_contains("Requester Login")),
                FieldRule::new("RequesterEmail", label_contains("Requester Email")),
                FieldRule::new("RequesterPhone", label_contains("Requester Phone")),
            ],
        }
    }
}

/// Selectors for the in-application navigation steps of the search flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSelectors {
    /// Left-menu link that opens the change-request search form.
    pub search_menu: String,
    /// Input where the ticket number is typed.
    pub ticket_input: String,
    /// Button that submits the lookup.
    pub get_ticket_button: String,
    /// Tab holding the fields to extract; clicking it is best-effort.
    pub information_tab: String,
}

impl Default for NavSelectors {
    fn default() -> Self {
        Self {
            search_menu: "xpath=//*[normalize-space(text())='Search Change Requests']".into(),
            ticket_input: "input[name='aotsCmTicket']".into(),
            get_ticket_button: "input[type='button'][value*='Get Ticket']".into(),
            information_tab: "xpath=//*[normalize-space(text())='Information']".into(),
        }
    }
}

/// Everything one run needs: where to go, what to look up, what to extract,
/// and where the result lands.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Landing URL of the ticketing site.
    pub base_url: String,
    /// Ticket identifiers to process, in order.
    pub tickets: Vec<String>,
    /// Destination CSV path.
    pub output: PathBuf,
    pub nav: NavSelectors,
    pub fields: FieldSpec,
}

impl ScrapeConfig {
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .with_context(|| format!("invalid base URL {:?}", self.base_url))?;
        Ok(())
    }
}

/// The subset of [`ScrapeConfig`] readable from a JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub tickets: Vec<String>,
    pub output: Option<PathBuf>,
    pub nav: Option<NavSelectors>,
    pub fields: Option<FieldSpec>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}
