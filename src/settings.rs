use crate::config::DEFAULT_CONFIG_FILE;
use crate::extract::SourceKind;
use crate::normalize::CompressionPolicy;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Readiness wait used when none is configured
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(3);

/// What to do with the rest of the run when a source fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failed source and save nothing
    Abort,
    /// Run the remaining independent sources and save what succeeded
    #[default]
    Continue,
}

/// When the document is written back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Once, after every source ran
    #[default]
    EndOfRun,
    /// After every successful source, so later failures keep earlier results
    PerSource,
}

/// City that location factors are measured against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCity {
    pub city: String,
    pub country: String,
}

impl Default for ReferenceCity {
    fn default() -> Self {
        Self { city: "New York, NY".to_string(), country: "United States".to_string() }
    }
}

/// Options for one refresh run
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub config_path: PathBuf,

    /// Bound on every readiness wait
    pub readiness_timeout: Duration,

    /// Sources to run; always executed in dependency order
    pub sources: Vec<SourceKind>,

    pub on_failure: FailurePolicy,
    pub persist: PersistMode,
    pub compression: CompressionPolicy,

    /// Scale base salaries by `affordability_ratio`
    pub affordability_adjusted_salaries: bool,

    pub reference_city: ReferenceCity,

    /// Write `<collection>_updated` dates
    pub stamp_dates: bool,

    /// Date used for stamps; today when `None`
    pub today: Option<NaiveDate>,

    /// Never write the document
    pub dry_run: bool,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            sources: SourceKind::ALL.to_vec(),
            on_failure: FailurePolicy::default(),
            persist: PersistMode::default(),
            compression: CompressionPolicy::default(),
            affordability_adjusted_salaries: false,
            reference_city: ReferenceCity::default(),
            stamp_dates: true,
            today: None,
            dry_run: false,
        }
    }
}

impl RefreshSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the document path
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Builder method: set the readiness timeout
    pub fn readiness_timeout(mut self, timeout: Duration) -> Self {
        self.readiness_timeout = timeout;
        self
    }

    /// Builder method: restrict the run to `sources`
    pub fn sources(mut self, sources: impl IntoIterator<Item = SourceKind>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    /// Builder method: set the failure policy
    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Builder method: set the persist mode
    pub fn persist(mut self, mode: PersistMode) -> Self {
        self.persist = mode;
        self
    }

    /// Builder method: set the compression policy
    pub fn compression(mut self, policy: CompressionPolicy) -> Self {
        self.compression = policy;
        self
    }

    /// Builder method: scale base salaries by the affordability ratio
    pub fn affordability_adjusted_salaries(mut self, enabled: bool) -> Self {
        self.affordability_adjusted_salaries = enabled;
        self
    }

    /// Builder method: set the reference city
    pub fn reference_city(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.reference_city = ReferenceCity { city: city.into(), country: country.into() };
        self
    }

    /// Builder method: enable or disable last-updated stamps
    pub fn stamp_dates(mut self, enabled: bool) -> Self {
        self.stamp_dates = enabled;
        self
    }

    /// Builder method: fix the stamp date
    pub fn today(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    /// Builder method: never write the document
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether `kind` is part of this run
    pub fn includes(&self, kind: SourceKind) -> bool {
        self.sources.contains(&kind)
    }

    /// Stamp date for this run
    pub fn stamp_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
