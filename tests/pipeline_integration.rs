use chrono::NaiveDate;
use comp_refresh::extract::{templates, Extraction, PageAction, PageScript};
use comp_refresh::{CannedNavigator, CannedPage, ConfigDocument, ConfigPath, FailurePolicy, LogProgress, PersistMode,
                   Pipeline, ProgressReporter, RefreshError, RefreshSettings, RunReport, SourceKind, SourceOutcome};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONFIG: &str = "\
# Compensation calculator market data
eur_to_usd_10_year_avg: 1.05 # 10-year EUR->USD average
affordability: 0.53
affordability_ratio: 0.53

countries:
-   name: Spain
    cost_of_living: 0.5
    compressed_cost_of_living: 0.5
-   name: Netherlands
    cost_of_living: 1.0
    compressed_cost_of_living: 1.0 # pinned manually

cities:
-   name: Lisbon
    country: Portugal
    locationFactor: 1.0 # vs New York

careers:
-   name: Engineering
    roles:
    -   name: Junior
        salary_com_key: software-engineer-i
        baseSalary: 4000
";

const REFRESHED: &str = "\
# Compensation calculator market data
eur_to_usd_10_year_avg: 1.1 # 10-year EUR->USD average
affordability: 0.53
affordability_ratio: 0.53

countries:
-   name: Spain
    cost_of_living: 0.4
    compressed_cost_of_living: 0.49
-   name: Netherlands
    cost_of_living: 1.1
    compressed_cost_of_living: 0.91 # pinned manually

cities:
-   name: Lisbon
    country: Portugal
    locationFactor: 0.97 # vs New York

careers:
-   name: Engineering
    roles:
    -   name: Junior
        salary_com_key: software-engineer-i
        baseSalary: 1000
countries_updated: '2024-03-01'
cities_updated: '2024-03-01'
careers_updated: '2024-03-01'
";

const LISBON_SUMMARY: &str = "You would need around 3,840.6$ in Lisbon to maintain the same standard of life \
                              that you can have with 8,000.0$ in New York, NY (assuming you rent in both cities).";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn url_of(script: &PageScript) -> String {
    match &script.steps()[0].action {
        PageAction::Navigate(url) => url.clone(),
        other => panic!("script starts with {:?}", other),
    }
}

/// Serve a page holding every element `extraction` touches, with `text` in the value element
fn serve(nav: &mut CannedNavigator, extraction: &Extraction, text: &str) {
    let mut page = CannedPage::new();
    for step in extraction.script.steps() {
        if let Some(locator) = step.action.locator() {
            page = page.with_element(locator.clone());
        }
    }
    nav.insert_page(url_of(&extraction.script), page.with_text(extraction.read.clone(), text));
}

/// Navigator where every source page answers; `skip` leaves a page out
fn navigator(skip: &[&str]) -> CannedNavigator {
    let mut nav = CannedNavigator::new();
    let pages = [
        ("exchange-rate", templates::exchange_rate(), "1.100000"),
        (
            "Spain",
            templates::country_cost_of_living("Spain"),
            "Cost of Living Including Rent in Spain is 60% lower than in United States",
        ),
        (
            "Netherlands",
            templates::country_cost_of_living("Netherlands"),
            "Cost of Living Including Rent in Netherlands is 10% higher than in United States",
        ),
        ("Lisbon", templates::city_cost_of_living("United States", "New York, NY", "Portugal", "Lisbon"), LISBON_SUMMARY),
        ("Junior", templates::role_salary("software-engineer-i"), "$13,200"),
    ];
    for (name, extraction, text) in pages {
        if !skip.contains(&name) {
            serve(&mut nav, &extraction, text);
        }
    }
    // Popups are optional, an empty page is enough
    nav.insert_page(url_of(&templates::salary_popup_prelude()), CannedPage::new());
    nav
}

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.yml");
    std::fs::write(&path, CONFIG).unwrap();
    path
}

fn settings(path: &Path) -> RefreshSettings {
    RefreshSettings::new().config_path(path).today(today())
}

fn run(nav: &mut CannedNavigator, settings: &RefreshSettings) -> (ConfigDocument, RunReport) {
    let mut doc = ConfigDocument::load(&settings.config_path).unwrap();
    let mut progress = LogProgress::default();
    let report = Pipeline::new(nav, settings, &mut progress).run(&mut doc);
    (doc, report)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_full_run_refreshes_every_source() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let mut nav = navigator(&[]);

    let (doc, report) = run(&mut nav, &settings(&path));

    assert!(report.is_success(), "{}", report);
    assert!(report.saved);
    assert_eq!(report.updated_count(), 4);
    assert!(matches!(report.outcome(SourceKind::CountryCostOfLiving), Some(SourceOutcome::Updated { units: 2 })));
    assert_eq!(read(&path), REFRESHED);
    assert!(!doc.is_dirty());

    assert!(nav.actions()[0].starts_with("navigate https://www.ofx.com"));
}

#[test]
fn test_stale_derived_values_are_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    let stale = CONFIG
        .replace("baseSalary: 4000", "baseSalary: 4000.0")
        .replace("locationFactor: 1.0 #", "locationFactor: TBD #");
    std::fs::write(&path, stale).unwrap();

    let (_, report) = run(&mut navigator(&[]), &settings(&path));

    assert!(report.is_success(), "{}", report);
    assert_eq!(read(&path), REFRESHED);
}

#[test]
fn test_refreshed_file_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    run(&mut navigator(&[]), &settings(&path));

    let doc = ConfigDocument::load(&path).unwrap();
    assert_eq!(doc.get_f64(&ConfigPath::parse("countries[0].compressed_cost_of_living").unwrap()).unwrap(), 0.49);
    assert_eq!(doc.get_f64(&ConfigPath::parse("cities[0].locationFactor").unwrap()).unwrap(), 0.97);
    assert_eq!(doc.get_str(&ConfigPath::parse("careers_updated").unwrap()).unwrap(), "2024-03-01");
    // Never written by the refresh
    assert_eq!(doc.get_f64(&ConfigPath::parse("affordability").unwrap()).unwrap(), 0.53);
}

#[test]
fn test_salaries_alone_use_stored_exchange_rate() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let settings = settings(&path).sources([SourceKind::RoleSalary]);

    let (_, report) = run(&mut navigator(&[]), &settings);

    assert!(report.is_success(), "{}", report);
    assert_eq!(report.outcomes.len(), 1);
    // 13200 / 12 / 1.05
    assert!(read(&path).contains("        baseSalary: 1048\n"));
    assert!(read(&path).contains("eur_to_usd_10_year_avg: 1.05 #"));
}

#[test]
fn test_failed_exchange_rate_skips_salaries() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);

    let (_, report) = run(&mut navigator(&["exchange-rate"]), &settings(&path));

    assert!(!report.is_success());
    assert!(matches!(
        report.outcome(SourceKind::ExchangeRate),
        Some(SourceOutcome::Failed(failure)) if matches!(failure.error, RefreshError::NavigationFailed(_))
    ));
    assert!(matches!(
        report.outcome(SourceKind::RoleSalary),
        Some(SourceOutcome::Skipped { blocked_by: SourceKind::ExchangeRate })
    ));

    // Independent sources still land on disk
    assert!(report.saved);
    let text = read(&path);
    assert!(text.contains("eur_to_usd_10_year_avg: 1.05 #"));
    assert!(text.contains("baseSalary: 4000"));
    assert!(text.contains("locationFactor: 0.97 # vs New York"));
    assert!(text.contains("cities_updated: '2024-03-01'"));
    assert!(!text.contains("careers_updated"));
}

#[test]
fn test_failed_unit_leaves_whole_source_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let mut nav = navigator(&["Netherlands"]);
    let mut page = CannedPage::new();
    let netherlands = templates::country_cost_of_living("Netherlands");
    for step in netherlands.script.steps() {
        if let Some(locator) = step.action.locator() {
            page = page.with_element(locator.clone());
        }
    }
    nav.insert_page(url_of(&netherlands.script), page.with_text(netherlands.read.clone(), "Netherlands is pricey"));

    let (_, report) = run(&mut nav, &settings(&path));

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    let (kind, failure) = failures[0];
    assert_eq!(kind, SourceKind::CountryCostOfLiving);
    assert_eq!(failure.unit.as_deref(), Some("Netherlands"));
    assert_eq!(failure.error.kind(), "UnexpectedPageFormat");

    // Spain succeeded but belongs to the failed source
    let text = read(&path);
    assert!(text.contains("-   name: Spain\n    cost_of_living: 0.5\n    compressed_cost_of_living: 0.5\n"));
    assert!(!text.contains("countries_updated"));
    assert!(text.contains("baseSalary: 1000"));
}

#[test]
fn test_abort_policy_saves_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let settings = settings(&path).on_failure(FailurePolicy::Abort);

    let (_, report) = run(&mut navigator(&["Lisbon"]), &settings);

    let kinds: Vec<_> = report.outcomes.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, SourceKind::ALL);
    assert!(report.outcome(SourceKind::ExchangeRate).unwrap().is_success());
    assert!(matches!(
        report.outcome(SourceKind::CityCostOfLiving),
        Some(SourceOutcome::Failed(failure)) if matches!(failure.error, RefreshError::NavigationFailed(_))
    ));
    assert!(matches!(report.outcome(SourceKind::RoleSalary), Some(SourceOutcome::Aborted)));
    assert!(!report.saved);
    assert_eq!(read(&path), CONFIG);
}

#[test]
fn test_per_source_persistence_keeps_earlier_results() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let settings = settings(&path).on_failure(FailurePolicy::Abort).persist(PersistMode::PerSource);

    let (_, report) = run(&mut navigator(&["Junior"]), &settings);

    assert!(report.saved);
    assert!(matches!(
        report.outcome(SourceKind::RoleSalary),
        Some(SourceOutcome::Failed(failure)) if failure.unit.as_deref() == Some("Engineering / Junior")
    ));
    let text = read(&path);
    assert!(text.contains("eur_to_usd_10_year_avg: 1.1 #"));
    assert!(text.contains("cities_updated: '2024-03-01'"));
    assert!(text.contains("baseSalary: 4000"));
}

#[test]
fn test_dry_run_never_writes() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let settings = settings(&path).dry_run(true);

    let (doc, report) = run(&mut navigator(&[]), &settings);

    assert!(report.is_success());
    assert!(!report.saved);
    assert_eq!(read(&path), CONFIG);
    assert_eq!(doc.as_str(), REFRESHED);
}

#[test]
fn test_no_stamp() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let settings = settings(&path).stamp_dates(false);

    run(&mut navigator(&[]), &settings);

    let text = read(&path);
    assert!(!text.contains("_updated"));
    assert!(text.ends_with("baseSalary: 1000\n"));
}

#[test]
fn test_missing_affordability_fails_cost_sources() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, CONFIG.replace("affordability: 0.53\naffordability_ratio: 0.53\n", "")).unwrap();

    let (_, report) = run(&mut navigator(&[]), &settings(&path));

    for kind in [SourceKind::CountryCostOfLiving, SourceKind::CityCostOfLiving] {
        assert!(matches!(
            report.outcome(kind),
            Some(SourceOutcome::Failed(failure)) if matches!(failure.error, RefreshError::ConfigFieldMissing(_))
        ));
    }
    assert!(report.outcome(SourceKind::RoleSalary).unwrap().is_success());
}

/// Counts steps per source
#[derive(Default)]
struct RecordingProgress {
    totals: HashMap<SourceKind, usize>,
    steps: HashMap<SourceKind, Vec<String>>,
    finished: Vec<SourceKind>,
}

impl ProgressReporter for RecordingProgress {
    fn begin(&mut self, source: SourceKind, total: usize) {
        self.totals.insert(source, total);
    }

    fn step(&mut self, source: SourceKind, label: &str) {
        self.steps.entry(source).or_default().push(label.to_string());
    }

    fn finish(&mut self, source: SourceKind, _outcome: &SourceOutcome) {
        self.finished.push(source);
    }
}

#[test]
fn test_progress_counts_every_step() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir);
    let settings = settings(&path);
    let mut doc = ConfigDocument::load(&path).unwrap();
    let mut nav = navigator(&[]);
    let mut progress = RecordingProgress::default();

    let report = Pipeline::new(&mut nav, &settings, &mut progress).run(&mut doc);

    assert!(report.is_success());
    assert_eq!(progress.finished, SourceKind::ALL);
    for kind in SourceKind::ALL {
        let steps = &progress.steps[&kind];
        assert_eq!(steps.len(), progress.totals[&kind], "{}", kind);
        assert_eq!(steps.last().map(String::as_str), Some("store"));
    }
    assert_eq!(
        progress.steps[&SourceKind::ExchangeRate][..],
        [
            "load page",
            "swap to EUR -> USD",
            "select yearly frequency",
            "retrieve data",
            "wait for data",
            "read value",
            "store",
        ]
    );
}
