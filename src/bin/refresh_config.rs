//! refresh-config
//!
//! Refreshes exchange rate, cost-of-living and salary figures in the
//! compensation calculator's config from their public sources.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use comp_refresh::{BrowserSession, CompressionPolicy, ConfigDocument, ConnectionOptions, ConsoleProgress,
                   FailurePolicy, LaunchOptions, PersistMode, Pipeline, RefreshSettings, SourceKind};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Exit code when the config cannot be loaded or the browser cannot be reached
const SETUP_FAILURE: u8 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    /// EUR→USD 10-year average
    ExchangeRate,
    /// Country cost of living
    Countries,
    /// City location factors
    Cities,
    /// Role base salaries
    Salaries,
}

impl From<Source> for SourceKind {
    fn from(source: Source) -> Self {
        match source {
            Source::ExchangeRate => SourceKind::ExchangeRate,
            Source::Countries => SourceKind::CountryCostOfLiving,
            Source::Cities => SourceKind::CityCostOfLiving,
            Source::Salaries => SourceKind::RoleSalary,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnFailure {
    /// Stop at the first failed source and save nothing
    Abort,
    /// Keep running independent sources and save what succeeded
    Continue,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Persist {
    /// Save once after the run
    EndOfRun,
    /// Save after every successful source
    PerSource,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Compression {
    /// 0.33 below affordability, 0.67 above
    Paired,
    /// 0.33 in both directions
    Uniform,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SalaryBasisArg {
    /// Reference-market salary converted to monthly EUR
    Reference,
    /// Reference salary scaled by affordability_ratio
    AffordabilityAdjusted,
}

#[derive(Parser)]
#[command(name = "refresh-config")]
#[command(version)]
#[command(about = "Refresh market data in the compensation calculator config", long_about = None)]
struct Cli {
    /// Config file to refresh
    #[arg(long, short = 'c', value_name = "PATH", env = "REFRESH_CONFIG", default_value = "config.yml")]
    config: PathBuf,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Seconds to wait for a page's data to show up
    #[arg(long, value_name = "SECS", default_value = "3")]
    timeout_secs: u64,

    /// Only refresh these sources (default: all)
    #[arg(long, value_enum, num_args = 1..)]
    only: Vec<Source>,

    /// What to do when a source fails
    #[arg(long, value_enum, default_value = "continue")]
    on_failure: OnFailure,

    /// When to write the config back
    #[arg(long, value_enum, default_value = "end-of-run")]
    persist: Persist,

    /// How cost of living is compressed towards affordability
    #[arg(long, value_enum, default_value = "paired")]
    compression: Compression,

    /// How base salaries are derived
    #[arg(long, value_enum, default_value = "reference")]
    salary_basis: SalaryBasisArg,

    /// City location factors are measured against
    #[arg(long, value_name = "CITY", default_value = "New York, NY")]
    reference_city: String,

    /// Country of the reference city
    #[arg(long, value_name = "COUNTRY", default_value = "United States")]
    reference_country: String,

    /// Do not write <collection>_updated dates
    #[arg(long)]
    no_stamp: bool,

    /// Run every source but never write the config
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn settings(&self) -> RefreshSettings {
        let mut settings = RefreshSettings::new()
            .config_path(&self.config)
            .readiness_timeout(Duration::from_secs(self.timeout_secs))
            .on_failure(match self.on_failure {
                OnFailure::Abort => FailurePolicy::Abort,
                OnFailure::Continue => FailurePolicy::Continue,
            })
            .persist(match self.persist {
                Persist::EndOfRun => PersistMode::EndOfRun,
                Persist::PerSource => PersistMode::PerSource,
            })
            .compression(match self.compression {
                Compression::Paired => CompressionPolicy::Paired,
                Compression::Uniform => CompressionPolicy::Uniform,
            })
            .affordability_adjusted_salaries(matches!(self.salary_basis, SalaryBasisArg::AffordabilityAdjusted))
            .reference_city(&self.reference_city, &self.reference_country)
            .stamp_dates(!self.no_stamp)
            .dry_run(self.dry_run);

        if !self.only.is_empty() {
            settings = settings.sources(self.only.iter().copied().map(SourceKind::from));
        }
        settings
    }

    fn open_session(&self) -> anyhow::Result<BrowserSession> {
        if let Some(ref endpoint) = self.ws_endpoint {
            eprintln!("WebSocket endpoint: {}", endpoint);
            return BrowserSession::connect(ConnectionOptions::new(endpoint))
                .with_context(|| format!("Failed to connect to {}", endpoint));
        }

        let mut options = LaunchOptions::new().headless(!self.headed);
        if let Some(ref path) = self.chrome_path {
            options = options.chrome_path(path);
        }
        if let Some(ref dir) = self.user_data_dir {
            options = options.user_data_dir(dir);
        }
        BrowserSession::launch(options).context("Failed to launch browser")
    }
}

/// Load the config, then start the browser
fn setup(cli: &Cli, settings: &RefreshSettings) -> anyhow::Result<(ConfigDocument, BrowserSession)> {
    let doc = ConfigDocument::load(&settings.config_path)
        .with_context(|| format!("Failed to load {}", settings.config_path.display()))?;
    let session = cli.open_session()?;
    Ok((doc, session))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = cli.settings();

    let (mut doc, mut session) = match setup(&cli, &settings) {
        Ok(ready) => ready,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(SETUP_FAILURE);
        }
    };

    let mut progress = ConsoleProgress::new();
    let report = Pipeline::new(&mut session, &settings, &mut progress).run(&mut doc);
    drop(session);

    println!();
    print!("{}", report);
    if settings.dry_run {
        println!("Dry run: {} was not modified", settings.config_path.display());
    } else if report.saved {
        println!("Saved {}", settings.config_path.display());
    }

    if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
