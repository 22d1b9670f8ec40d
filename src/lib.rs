//! Interactive scraper for change-request tickets.
//!
//! Drives a headed browser through a ticketing site's search form, extracts a
//! fixed set of labeled fields from each ticket's Information tab, and writes
//! the accumulated rows to a CSV file at the end of the run.
//!
//! The crate splits into a small core and a replaceable collaborator:
//!
//! - [`extract`] turns a page state plus a [`config::FieldSpec`] into one
//!   stable-shape [`extract::Record`] per ticket.
//! - [`export`] accumulates records in input order and performs the single
//!   end-of-run CSV export.
//! - [`driver`] is the narrow page capability (navigate, click, fill, wait,
//!   locate, read text) the core consumes; [`driver::chrome`] implements it
//!   over a real browser, tests use a scripted fake.
//! - [`run`] sequences the per-ticket search flow.

pub mod config;
pub mod driver;
pub mod export;
pub mod extract;
pub mod run;

pub use config::{FieldSpec, ScrapeConfig};
pub use export::{ExportError, ResultSet};
pub use extract::Record;
