use super::report::SourceOutcome;
use crate::extract::SourceKind;

/// Receives one call per completed page step
pub trait ProgressReporter {
    /// A source starts with `total` countable steps
    fn begin(&mut self, source: SourceKind, total: usize);

    /// One step finished
    fn step(&mut self, source: SourceKind, label: &str);

    fn finish(&mut self, source: SourceKind, outcome: &SourceOutcome);
}

/// Reports progress through the `log` facade
#[derive(Debug, Default)]
pub struct LogProgress {
    done: usize,
    total: usize,
}

impl ProgressReporter for LogProgress {
    fn begin(&mut self, source: SourceKind, total: usize) {
        self.done = 0;
        self.total = total;
        log::info!("Processing {} ({} steps)", source, total);
    }

    fn step(&mut self, source: SourceKind, label: &str) {
        self.done += 1;
        log::debug!("{} [{}/{}] {}", source, self.done, self.total, label);
    }

    fn finish(&mut self, source: SourceKind, outcome: &SourceOutcome) {
        log::info!("{}: {}", source, outcome);
    }
}

#[cfg(feature = "cli")]
pub use console::ConsoleProgress;

#[cfg(feature = "cli")]
mod console {
    use super::*;
    use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

    const TEMPLATE: &str = "{prefix:>14} [{bar:30}] {pos}/{len} {msg}";

    /// One indicatif bar per source, drawn on stdout
    #[derive(Default)]
    pub struct ConsoleProgress {
        bar: Option<ProgressBar>,
    }

    impl ConsoleProgress {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl ProgressReporter for ConsoleProgress {
        fn begin(&mut self, source: SourceKind, total: usize) {
            let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stdout());
            if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar.set_prefix(source.name());
            self.bar = Some(bar);
        }

        fn step(&mut self, _source: SourceKind, label: &str) {
            if let Some(bar) = &self.bar {
                bar.set_message(label.to_string());
                bar.inc(1);
            }
        }

        fn finish(&mut self, _source: SourceKind, outcome: &SourceOutcome) {
            match self.bar.take() {
                Some(bar) if outcome.is_success() => bar.finish_with_message(outcome.to_string()),
                Some(bar) => bar.abandon_with_message(outcome.to_string()),
                None => println!("{}", outcome),
            }
        }
    }
}
