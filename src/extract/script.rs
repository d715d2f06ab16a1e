use crate::error::Result;
use crate::navigator::{Locator, PageNavigator};
use std::fmt;
use std::time::Duration;

/// Stage of an extraction. Steps of a script never move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Navigate,
    ConfigureQuery,
    Submit,
    AwaitReady,
    ReadValue,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Navigate => "NAVIGATE",
            Phase::ConfigureQuery => "CONFIGURE_QUERY",
            Phase::Submit => "SUBMIT",
            Phase::AwaitReady => "AWAIT_READY",
            Phase::ReadValue => "READ_VALUE",
            Phase::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// What a step does to the page
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    Navigate(String),
    Click(Locator),
    Check(Locator),
    Fill(Locator, String),
    AwaitVisible(Locator),
}

impl PageAction {
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            PageAction::Navigate(_) => None,
            PageAction::Click(locator)
            | PageAction::Check(locator)
            | PageAction::Fill(locator, _)
            | PageAction::AwaitVisible(locator) => Some(locator),
        }
    }
}

/// One countable unit of page work
#[derive(Debug, Clone, PartialEq)]
pub struct PageStep {
    pub phase: Phase,
    pub label: String,
    pub action: PageAction,
    /// Failures are logged and skipped
    pub optional: bool,
}

/// Ordered page steps for one page template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageScript {
    steps: Vec<PageStep>,
}

impl PageScript {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, phase: Phase, label: impl Into<String>, action: PageAction) -> Self {
        self.steps.push(PageStep { phase, label: label.into(), action, optional: false });
        self
    }

    /// Builder method: load `url`
    pub fn navigate(self, url: impl Into<String>) -> Self {
        self.push(Phase::Navigate, "load page", PageAction::Navigate(url.into()))
    }

    /// Builder method: select an option of the query form
    pub fn configure(self, label: impl Into<String>, action: PageAction) -> Self {
        self.push(Phase::ConfigureQuery, label, action)
    }

    /// Builder method: send the query
    pub fn submit(self, label: impl Into<String>, action: PageAction) -> Self {
        self.push(Phase::Submit, label, action)
    }

    /// Builder method: wait for the result to show up
    pub fn await_ready(self, locator: Locator) -> Self {
        self.push(Phase::AwaitReady, "wait for data", PageAction::AwaitVisible(locator))
    }

    /// Builder method: mark the last step optional
    pub fn optional(mut self) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.optional = true;
        }
        self
    }

    /// Finish the script with the element whose text holds the value
    pub fn read(self, locator: Locator) -> Extraction {
        Extraction { script: self, read: locator }
    }

    pub fn steps(&self) -> &[PageStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether phases never move backwards
    pub fn is_ordered(&self) -> bool {
        self.steps.windows(2).all(|pair| pair[0].phase <= pair[1].phase)
    }

    /// Run every step, calling `on_step` with its label once it is done
    pub fn run<N: PageNavigator + ?Sized>(
        &self,
        navigator: &mut N,
        timeout: Duration,
        on_step: &mut dyn FnMut(&str),
    ) -> Result<()> {
        let mut phase = None;

        for step in &self.steps {
            if phase != Some(step.phase) {
                log::debug!("{}", step.phase);
                phase = Some(step.phase);
            }

            match run_action(navigator, &step.action, timeout) {
                Ok(()) => log::debug!("  {}: ok", step.label),
                Err(e) if step.optional => log::warn!("Skipping optional step '{}': {}", step.label, e),
                Err(e) => return Err(e),
            }
            on_step(&step.label);
        }

        Ok(())
    }
}

fn run_action<N: PageNavigator + ?Sized>(navigator: &mut N, action: &PageAction, timeout: Duration) -> Result<()> {
    match action {
        PageAction::Navigate(url) => navigator.navigate(url),
        PageAction::Click(locator) => {
            let element = navigator.locate(locator)?;
            navigator.click(&element)
        }
        PageAction::Check(locator) => {
            let element = navigator.locate(locator)?;
            navigator.check(&element)
        }
        PageAction::Fill(locator, text) => {
            let element = navigator.locate(locator)?;
            navigator.fill(&element, text)
        }
        PageAction::AwaitVisible(locator) => navigator.wait_until_visible(locator, timeout).map(|_| ()),
    }
}

/// A page script followed by one text read
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub script: PageScript,
    pub read: Locator,
}

impl Extraction {
    /// Steps reported as progress, the final read included
    pub fn step_count(&self) -> usize {
        self.script.len() + 1
    }

    /// Drive the page and return the raw text of the value element
    pub fn run<N: PageNavigator + ?Sized>(
        &self,
        navigator: &mut N,
        timeout: Duration,
        on_step: &mut dyn FnMut(&str),
    ) -> Result<String> {
        self.script.run(navigator, timeout, on_step)?;

        log::debug!("{}", Phase::ReadValue);
        let element = navigator.locate(&self.read)?;
        let text = navigator.read_text(&element)?;
        on_step("read value");

        log::debug!("{}: '{}'", Phase::Done, text.trim());
        Ok(text)
    }
}
