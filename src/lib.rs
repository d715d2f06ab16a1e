//! # comp-refresh
//!
//! Refreshes the market data behind a compensation calculator's YAML config
//! by reading it off public web pages through a Chrome/Chromium session.
//!
//! ## Features
//!
//! - **Four sources**: the EUR→USD 10-year average exchange rate, country cost of living,
//!   city location factors and per-role base salaries
//! - **Page scripts**: every source drives the same `navigate → configure → submit → wait → read`
//!   state machine over semantic locators (role and name, label, text)
//! - **Comment-preserving writes**: only the refreshed scalars change, comments and layout stay
//! - **Source atomicity**: a source either updates all of its entries or none
//!
//! ## Command Line
//!
//! ```bash
//! # Refresh ./config.yml headless
//! cargo run --bin refresh-config
//!
//! # Only the salaries, with a visible browser, without writing the file
//! cargo run --bin refresh-config -- --only salaries --headed --dry-run
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use comp_refresh::{BrowserSession, ConfigDocument, LaunchOptions, LogProgress, Pipeline, RefreshSettings};
//!
//! # fn main() -> comp_refresh::Result<()> {
//! let settings = RefreshSettings::default();
//! let mut doc = ConfigDocument::load(&settings.config_path)?;
//! let mut session = BrowserSession::launch(LaunchOptions::default())?;
//!
//! let mut progress = LogProgress::default();
//! let report = Pipeline::new(&mut session, &settings, &mut progress).run(&mut doc);
//! print!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! Anything implementing [`PageNavigator`] can stand in for the browser; the
//! [`CannedNavigator`] serves fixed page text for tests.
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and configuration
//! - [`config`]: Config document reads and in-place writes
//! - [`error`]: Error types and result aliases
//! - [`extract`]: Sources, page scripts and page text parsing
//! - [`navigator`]: The page navigation capability and semantic locators
//! - [`normalize`]: Affordability compression and rounding
//! - [`pipeline`]: Dependency-ordered runs, progress and reports
//! - [`settings`]: Run options

pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod navigator;
pub mod normalize;
pub mod pipeline;
pub mod settings;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use config::{ConfigDocument, ConfigPath, Scalar};
pub use error::{RefreshError, Result};
pub use extract::SourceKind;
pub use navigator::{CannedNavigator, CannedPage, ElementHandle, Locator, PageNavigator, Role};
pub use normalize::{CompressionPolicy, SalaryBasis};
pub use pipeline::{LogProgress, Pipeline, ProgressReporter, RunReport, SourceOutcome};
pub use settings::{FailurePolicy, PersistMode, ReferenceCity, RefreshSettings};

#[cfg(feature = "cli")]
pub use pipeline::ConsoleProgress;
