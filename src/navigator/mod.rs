//! Page navigation capability
//!
//! The refresh pipeline only talks to pages through [`PageNavigator`]. This
//! module provides:
//! - Locator: semantic element descriptors (role and name, text, label, ...)
//! - PageNavigator: navigate, locate, wait, read and act on elements
//! - CannedNavigator: in-memory navigator serving fixed page text

pub mod canned;
pub mod locator;

pub use canned::{CannedNavigator, CannedPage};
pub use locator::{Locator, Query, Role};

use crate::error::Result;
use std::time::Duration;

/// A located element. Navigators re-resolve it on every action, so a handle
/// stays valid across re-renders of the same page.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHandle {
    locator: Locator,
    query: Query,
}

impl ElementHandle {
    pub fn new(locator: &Locator) -> Result<Self> {
        Ok(Self { locator: locator.clone(), query: locator.to_query()? })
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

/// What the pipeline needs from a browser page
pub trait PageNavigator {
    /// Load `url` and wait for the navigation to finish
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Find an element that is present right now
    fn locate(&mut self, locator: &Locator) -> Result<ElementHandle>;

    /// Wait up to `timeout` for the element to be visible
    fn wait_until_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<ElementHandle>;

    fn read_text(&mut self, element: &ElementHandle) -> Result<String>;

    fn click(&mut self, element: &ElementHandle) -> Result<()>;

    /// Replace the element's value with `text`
    fn fill(&mut self, element: &ElementHandle, text: &str) -> Result<()>;

    /// Make sure a checkbox or radio is checked
    fn check(&mut self, element: &ElementHandle) -> Result<()>;
}
