use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            error::{RefreshError, Result},
            navigator::{ElementHandle, Locator, PageNavigator, Query}};
use headless_chrome::{Browser, Element, Tab};
use std::{ffi::OsStr,
          sync::Arc,
          time::{Duration, Instant}};

/// Interval between visibility checks while waiting for an element
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const IS_VISIBLE_JS: &str = r#"
    function() {
        const rect = this.getBoundingClientRect();
        const style = window.getComputedStyle(this);
        return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none';
    }
"#;

const IS_CHECKED_JS: &str = "function() { return this.checked === true; }";

const CLEAR_VALUE_JS: &str = r#"
    function() {
        this.value = '';
        this.dispatchEvent(new Event('input', { bubbles: true }));
    }
"#;

/// One Chrome/Chromium tab used for every extraction of a run
///
/// The tab is closed when the session is dropped, and the browser process
/// exits with the underlying `Browser`.
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        launch_opts.idle_browser_timeout = options.idle_timeout;
        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| RefreshError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| RefreshError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::info!("Launched browser (headless: {})", options.headless);
        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url.clone(), Duration::from_millis(options.timeout))
            .map_err(|e| RefreshError::ConnectionFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| RefreshError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;

        log::info!("Connected to browser at {}", options.ws_url);
        Ok(Self { browser, tab })
    }

    /// Get the session's tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the session's tab
    pub fn close(&self) -> Result<()> {
        self.tab
            .close(false)
            .map_err(|e| RefreshError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }

    fn find(&self, element: &ElementHandle) -> Result<Element<'_>> {
        let found = match element.query() {
            Query::Css(selector) => self.tab.find_element(selector),
            Query::XPath(xpath) => self.tab.find_element_by_xpath(xpath),
        };
        found.map_err(|e| RefreshError::ElementNotFound(format!("{}: {}", element.locator(), e)))
    }

    fn eval_bool(element: &Element<'_>, function: &str) -> Option<bool> {
        element
            .call_js_fn(function, vec![], false)
            .ok()
            .and_then(|remote| remote.value)
            .as_ref()
            .and_then(serde_json::Value::as_bool)
    }
}

fn action_failed(action: &'static str, element: &ElementHandle, err: impl std::fmt::Display) -> RefreshError {
    RefreshError::ActionFailed { action, locator: element.locator().to_string(), reason: err.to_string() }
}

impl PageNavigator for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        log::debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .map_err(|e| RefreshError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| RefreshError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        Ok(())
    }

    fn locate(&mut self, locator: &Locator) -> Result<ElementHandle> {
        let handle = ElementHandle::new(locator)?;
        self.find(&handle)?;
        Ok(handle)
    }

    fn wait_until_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<ElementHandle> {
        let handle = ElementHandle::new(locator)?;
        let deadline = Instant::now() + timeout;

        loop {
            if let Ok(element) = self.find(&handle) {
                if Self::eval_bool(&element, IS_VISIBLE_JS).unwrap_or(false) {
                    return Ok(handle);
                }
            }

            if Instant::now() >= deadline {
                return Err(RefreshError::ReadinessTimeout { locator: locator.to_string(), timeout });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn read_text(&mut self, element: &ElementHandle) -> Result<String> {
        self.find(element)?.get_inner_text().map_err(|e| action_failed("read", element, e))
    }

    fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.find(element)?.click().map_err(|e| action_failed("click", element, e))?;
        Ok(())
    }

    fn fill(&mut self, element: &ElementHandle, text: &str) -> Result<()> {
        let found = self.find(element)?;
        found
            .call_js_fn(CLEAR_VALUE_JS, vec![], false)
            .map_err(|e| action_failed("fill", element, e))?;
        found.type_into(text).map_err(|e| action_failed("fill", element, e))?;
        Ok(())
    }

    fn check(&mut self, element: &ElementHandle) -> Result<()> {
        let found = self.find(element)?;
        if Self::eval_bool(&found, IS_CHECKED_JS) == Some(true) {
            return Ok(());
        }
        found.click().map_err(|e| action_failed("check", element, e))?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::debug!("Ignoring error while closing tab: {}", e);
        }
    }
}
