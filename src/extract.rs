//! Field extraction: one page state plus one field spec yields one record.
//!
//! Extraction is deliberately lossy in one direction only: any failure to
//! resolve a single field (no match, missing text, lookup error) becomes an
//! empty string, so one bad field on one ticket never aborts a run. The
//! record shape never varies: every spec field is present in every record.

use crate::config::{FieldSpec, TICKET_COLUMN};
use crate::driver::{DriverError, PageDriver};
use tracing::{debug, warn};

/// One extracted row: the ticket identifier plus every spec field, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    columns: Vec<(String, String)>,
}

impl Record {
    /// Start a record for a ticket; the identifier is always the first column.
    pub fn new(ticket: &str) -> Self {
        Self {
            columns: vec![(TICKET_COLUMN.to_string(), ticket.to_string())],
        }
    }

    pub(crate) fn push_field(&mut self, name: &str, value: String) {
        self.columns.push((name.to_string(), value));
    }

    /// The ticket identifier this record was extracted for.
    pub fn ticket(&self) -> &str {
        &self.columns[0].1
    }

    /// Column names in output order, identifier first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    /// Column values in output order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, v)| v.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of columns, including the identifier.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Extract one record from the current page state.
///
/// Reads only; the page is never mutated. The returned record contains the
/// identifier plus one entry per spec field, empty string for anything that
/// could not be read.
pub async fn extract_record(
    driver: &mut dyn PageDriver,
    spec: &FieldSpec,
    ticket: &str,
) -> Record {
    let mut record = Record::new(ticket);

    for rule in spec.iter() {
        let value = match first_match_text(driver, &rule.selector).await {
            Ok(Some(text)) => text.trim().to_string(),
            Ok(None) => {
                debug!(field = %rule.name, "locator matched nothing, recording empty value");
                String::new()
            }
            Err(e) => {
                warn!(
                    field = %rule.name,
                    selector = %rule.selector,
                    error = %e,
                    "field lookup failed, recording empty value"
                );
                String::new()
            }
        };
        record.push_field(&rule.name, value);
    }

    record
}

/// Text of the first element matching the selector, `None` when nothing
/// matches or the match has no text.
async fn first_match_text(
    driver: &mut dyn PageDriver,
    selector: &str,
) -> Result<Option<String>, DriverError> {
    let handles = driver.locate(selector).await?;
    match handles.first() {
        Some(&first) => driver.text_of(first).await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldRule;
    use crate::driver::fake::FakeDriver;

    fn spec(rules: &[(&str, &str)]) -> FieldSpec {
        FieldSpec::new(
            rules
                .iter()
                .map(|(name, sel)| FieldRule::new(*name, *sel))
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_trimmed_text() {
        let mut driver = FakeDriver::new()
            .element("#urgency", vec![Some("  Urgent  ")])
            .element("#status", vec![Some("Closed")]);
        let spec = spec(&[("Urgency", "#urgency"), ("Status", "#status")]);

        let record = extract_record(&mut driver, &spec, "CHG-1").await;

        assert_eq!(record.ticket(), "CHG-1");
        assert_eq!(record.get("Urgency"), Some("Urgent"));
        assert_eq!(record.get("Status"), Some("Closed"));
    }

    #[tokio::test]
    async fn test_takes_first_of_multiple_matches() {
        let mut driver =
            FakeDriver::new().element("td.status", vec![Some("Approved"), Some("Rejected")]);
        let spec = spec(&[("Status", "td.status")]);

        let record = extract_record(&mut driver, &spec, "CHG-1").await;
        assert_eq!(record.get("Status"), Some("Approved"));
    }

    #[tokio::test]
    async fn test_zero_matches_yields_empty_string() {
        let mut driver = FakeDriver::new();
        let spec = spec(&[("Category", "#missing")]);

        let record = extract_record(&mut driver, &spec, "CHG-1").await;
        assert_eq!(record.get("Category"), Some(""));
    }

    #[tokio::test]
    async fn test_textless_element_yields_empty_string() {
        let mut driver = FakeDriver::new().element("#icon", vec![None]);
        let spec = spec(&[("Icon", "#icon")]);

        let record = extract_record(&mut driver, &spec, "CHG-1").await;
        assert_eq!(record.get("Icon"), Some(""));
    }

    #[tokio::test]
    async fn test_lookup_error_yields_empty_string() {
        let mut driver = FakeDriver::new()
            .failing_lookup("#broken")
            .element("#status", vec![Some("Open")]);
        let spec = spec(&[("Broken", "#broken"), ("Status", "#status")]);

        let record = extract_record(&mut driver, &spec, "CHG-1").await;
        assert_eq!(record.get("Broken"), Some(""));
        assert_eq!(record.get("Status"), Some("Open"));
    }

    #[tokio::test]
    async fn test_record_shape_is_stable_under_total_failure() {
        let mut driver = FakeDriver::new()
            .failing_lookup("#a")
            .failing_lookup("#b");
        let spec = spec(&[("A", "#a"), ("B", "#b")]);

        let record = extract_record(&mut driver, &spec, "CHG-9").await;

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec![TICKET_COLUMN, "A", "B"]);
        assert_eq!(record.len(), 3);
    }

    #[tokio::test]
    async fn test_extraction_only_reads() {
        let mut driver = FakeDriver::new().element("#status", vec![Some("Open")]);
        let spec = spec(&[("Status", "#status")]);

        extract_record(&mut driver, &spec, "CHG-1").await;

        use crate::driver::fake::Call;
        assert!(driver
            .calls
            .iter()
            .all(|c| matches!(c, Call::Locate(_))));
    }
}
