use super::{ElementHandle, Locator, PageNavigator};
use crate::error::{RefreshError, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Elements of one canned page and the text they contain
#[derive(Debug, Clone, Default)]
pub struct CannedPage {
    elements: HashMap<Locator, String>,
}

impl CannedPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add an element with no text (a button, a checkbox, ...)
    pub fn with_element(mut self, locator: Locator) -> Self {
        self.elements.entry(locator).or_default();
        self
    }

    /// Builder method: add an element holding `text`
    pub fn with_text(mut self, locator: Locator, text: impl Into<String>) -> Self {
        self.elements.insert(locator, text.into());
        self
    }
}

/// Navigator serving canned pages keyed by URL
///
/// Every call is recorded so tests can assert the order of page steps.
#[derive(Debug, Default)]
pub struct CannedNavigator {
    pages: HashMap<String, CannedPage>,
    current: Option<String>,
    actions: Vec<String>,
}

impl CannedNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: serve `page` at `url`
    pub fn with_page(mut self, url: impl Into<String>, page: CannedPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    pub fn insert_page(&mut self, url: impl Into<String>, page: CannedPage) {
        self.pages.insert(url.into(), page);
    }

    /// Recorded calls, e.g. `navigate https://...` or `click button "Close"`
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn element(&self, locator: &Locator) -> Option<&String> {
        let url = self.current.as_ref()?;
        self.pages.get(url)?.elements.get(locator)
    }

    fn act(&mut self, action: &'static str, element: &ElementHandle) -> Result<()> {
        if self.element(element.locator()).is_none() {
            return Err(RefreshError::ActionFailed {
                action,
                locator: element.locator().to_string(),
                reason: "element detached".to_string(),
            });
        }
        self.actions.push(format!("{} {}", action, element.locator()));
        Ok(())
    }
}

impl PageNavigator for CannedNavigator {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.actions.push(format!("navigate {}", url));
        if !self.pages.contains_key(url) {
            self.current = None;
            return Err(RefreshError::NavigationFailed(format!("{} is unreachable", url)));
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    fn locate(&mut self, locator: &Locator) -> Result<ElementHandle> {
        let handle = ElementHandle::new(locator)?;
        match self.element(locator) {
            Some(_) => Ok(handle),
            None => Err(RefreshError::ElementNotFound(locator.to_string())),
        }
    }

    fn wait_until_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<ElementHandle> {
        let handle = ElementHandle::new(locator)?;
        self.actions.push(format!("wait {}", locator));
        match self.element(locator) {
            Some(_) => Ok(handle),
            None => Err(RefreshError::ReadinessTimeout { locator: locator.to_string(), timeout }),
        }
    }

    fn read_text(&mut self, element: &ElementHandle) -> Result<String> {
        self.actions.push(format!("read {}", element.locator()));
        self.element(element.locator()).cloned().ok_or_else(|| RefreshError::ActionFailed {
            action: "read",
            locator: element.locator().to_string(),
            reason: "element detached".to_string(),
        })
    }

    fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.act("click", element)
    }

    fn fill(&mut self, element: &ElementHandle, text: &str) -> Result<()> {
        self.act("fill", element)?;
        if let Some(last) = self.actions.last_mut() {
            last.push_str(&format!(" = {}", text));
        }
        Ok(())
    }

    fn check(&mut self, element: &ElementHandle) -> Result<()> {
        self.act("check", element)
    }
}
