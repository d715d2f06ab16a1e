use crate::error::RefreshError;
use crate::extract::SourceKind;
use std::fmt;

/// A source that stopped on an error
#[derive(Debug)]
pub struct SourceFailure {
    /// Work unit that failed; `None` when planning or applying failed
    pub unit: Option<String>,
    pub error: RefreshError,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "[{}] {}: {}", unit, self.error.kind(), self.error),
            None => write!(f, "{}: {}", self.error.kind(), self.error),
        }
    }
}

/// What happened to one source
#[derive(Debug)]
pub enum SourceOutcome {
    /// All units succeeded and their values were applied
    Updated { units: usize },
    Failed(SourceFailure),
    /// Not run because a source it depends on failed
    Skipped { blocked_by: SourceKind },
    /// Not run because an earlier failure aborted the run
    Aborted,
}

impl SourceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceOutcome::Updated { .. })
    }
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Updated { units } => write!(f, "updated {} value(s)", units),
            SourceOutcome::Failed(failure) => write!(f, "failed {}", failure),
            SourceOutcome::Skipped { blocked_by } => write!(f, "skipped, {} failed", blocked_by),
            SourceOutcome::Aborted => write!(f, "not run, run aborted"),
        }
    }
}

/// Result of a whole run
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<(SourceKind, SourceOutcome)>,
    /// Whether the document was written at least once
    pub saved: bool,
    pub persist_error: Option<RefreshError>,
}

impl RunReport {
    /// Every selected source updated and the document was handled without error
    pub fn is_success(&self) -> bool {
        self.persist_error.is_none() && self.outcomes.iter().all(|(_, outcome)| outcome.is_success())
    }

    pub fn outcome(&self, source: SourceKind) -> Option<&SourceOutcome> {
        self.outcomes.iter().find(|(kind, _)| *kind == source).map(|(_, outcome)| outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (SourceKind, &SourceFailure)> {
        self.outcomes.iter().filter_map(|(kind, outcome)| match outcome {
            SourceOutcome::Failed(failure) => Some((*kind, failure)),
            _ => None,
        })
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, outcome)| outcome.is_success()).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, outcome) in &self.outcomes {
            writeln!(f, "{}: {}", kind, outcome)?;
        }
        if let Some(error) = &self.persist_error {
            writeln!(f, "save failed: {}", error)?;
        }
        Ok(())
    }
}
