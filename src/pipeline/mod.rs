//! Refresh orchestration
//!
//! A [`Pipeline`] runs the selected sources in dependency order against one
//! [`ConfigDocument`]. A source only changes the document when every one of
//! its work units succeeded; its updates are staged and applied together.

mod derive;
pub mod progress;
pub mod report;

pub use progress::{LogProgress, ProgressReporter};
pub use report::{RunReport, SourceFailure, SourceOutcome};

#[cfg(feature = "cli")]
pub use progress::ConsoleProgress;

use crate::config::{ConfigDocument, ConfigPath, Scalar};
use crate::error::RefreshError;
use crate::extract::SourceKind;
use crate::navigator::PageNavigator;
use crate::settings::{FailurePolicy, PersistMode, RefreshSettings};

/// Label of the progress step that applies a source's staged updates
const STORE_STEP: &str = "store";

/// Drives every selected source through one navigator
pub struct Pipeline<'a, N: PageNavigator + ?Sized> {
    navigator: &'a mut N,
    settings: &'a RefreshSettings,
    progress: &'a mut dyn ProgressReporter,
}

impl<'a, N: PageNavigator + ?Sized> Pipeline<'a, N> {
    pub fn new(navigator: &'a mut N, settings: &'a RefreshSettings, progress: &'a mut dyn ProgressReporter) -> Self {
        Self { navigator, settings, progress }
    }

    /// Run the selected sources and persist the document per the settings
    ///
    /// Never fails as a whole: every source failure is recorded in the report,
    /// and so is a failure to save.
    pub fn run(&mut self, doc: &mut ConfigDocument) -> RunReport {
        let mut report = RunReport::default();
        let mut failed: Vec<SourceKind> = Vec::new();
        let mut aborted = false;

        let settings = self.settings;
        let selected = SourceKind::ALL.into_iter().filter(|kind| settings.includes(*kind));
        for kind in selected {
            let outcome = if aborted {
                SourceOutcome::Aborted
            } else if let Some(blocked_by) = kind.depends_on().filter(|dep| failed.contains(dep)) {
                log::warn!("Skipping {}: {} failed", kind, blocked_by);
                SourceOutcome::Skipped { blocked_by }
            } else {
                log::info!("Refreshing {}", kind);
                match run_source(&mut *self.navigator, settings, &mut *self.progress, kind, doc) {
                    Ok((units, updated)) => {
                        *doc = updated;
                        SourceOutcome::Updated { units }
                    }
                    Err(failure) => {
                        log::error!("{} failed: {}", kind, failure);
                        SourceOutcome::Failed(failure)
                    }
                }
            };

            match &outcome {
                SourceOutcome::Updated { .. } => {
                    if settings.persist == PersistMode::PerSource {
                        self.persist(doc, &mut report);
                    }
                }
                SourceOutcome::Failed(_) | SourceOutcome::Skipped { .. } => {
                    failed.push(kind);
                    if settings.on_failure == FailurePolicy::Abort {
                        aborted = true;
                    }
                }
                SourceOutcome::Aborted => {}
            }

            self.progress.finish(kind, &outcome);
            report.outcomes.push((kind, outcome));
        }

        if settings.persist == PersistMode::EndOfRun && self.is_persistable(&report) {
            self.persist(doc, &mut report);
        }

        report
    }

    /// At least one source succeeded, and failures do not veto saving
    fn is_persistable(&self, report: &RunReport) -> bool {
        let any_success = report.updated_count() > 0;
        let any_failure = report.outcomes.iter().any(|(_, outcome)| !outcome.is_success());
        any_success && (self.settings.on_failure == FailurePolicy::Continue || !any_failure)
    }

    fn persist(&self, doc: &mut ConfigDocument, report: &mut RunReport) {
        if self.settings.dry_run {
            log::info!("Dry run, not saving");
            return;
        }
        if !doc.is_dirty() {
            return;
        }
        match doc.save() {
            Ok(()) => report.saved = true,
            Err(e) => {
                log::error!("Failed to save config: {}", e);
                report.persist_error = Some(e);
            }
        }
    }
}

/// Run one source to completion against a snapshot of `doc`
///
/// Returns the number of refreshed units and the document with every staged
/// update applied. `doc` itself is left untouched.
fn run_source<N: PageNavigator + ?Sized>(
    navigator: &mut N,
    settings: &RefreshSettings,
    progress: &mut dyn ProgressReporter,
    kind: SourceKind,
    doc: &ConfigDocument,
) -> Result<(usize, ConfigDocument), SourceFailure> {
    let whole = |error: RefreshError| SourceFailure { unit: None, error };

    let plan = kind.plan(doc, &settings.reference_city).map_err(whole)?;
    progress.begin(kind, plan.step_count() + 1);

    let timeout = settings.readiness_timeout;
    if let Some(prelude) = &plan.prelude {
        prelude
            .run(navigator, timeout, &mut |label| progress.step(kind, label))
            .map_err(whole)?;
    }

    let mut staged = Vec::new();
    for unit in &plan.units {
        let at_unit = |error: RefreshError| SourceFailure { unit: Some(unit.label.clone()), error };

        let text = unit
            .extraction
            .run(navigator, timeout, &mut |label| progress.step(kind, label))
            .map_err(at_unit)?;
        let raw = kind.parse(&text).map_err(at_unit)?;
        log::debug!("{} {}: {}", kind, unit.label, raw);

        staged.extend(derive::derive(unit.target, raw, doc, settings).map_err(at_unit)?);
    }

    let mut updated = doc.clone();
    for (path, value) in staged {
        updated.set(&path, value).map_err(whole)?;
    }
    if settings.stamp_dates
        && let Some(collection) = kind.collection()
    {
        let stamp = settings.stamp_date().format("%Y-%m-%d").to_string();
        let path = ConfigPath::root().key(format!("{}_updated", collection));
        updated.set(&path, Scalar::Str(stamp)).map_err(whole)?;
    }
    progress.step(kind, STORE_STEP);

    Ok((plan.units.len(), updated))
}
