use crate::browser::{ArticleFetcher, BrowserError, BrowserSession, FetchError};
use crate::config::Config;
use crate::input::{self, InputError, UrlReader};
use crate::output::{ArticleWriter, OutputMode};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("InputError: {0}")]
    InputError(#[from] InputError),
    #[error("BrowserError: {0}")]
    BrowserError(#[from] BrowserError),
    #[error("Time format error: {0}")]
    TimeFormatError(#[from] time::error::Format),
}

pub type Result<T> = std::result::Result<T, RunError>;

/// When the run started. Names the run directory and times every log line.
pub struct RunContext {
    started_at: OffsetDateTime,
    started: Instant,
}

impl RunContext {
    pub fn start() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::starting_at(now)
    }

    pub fn starting_at(started_at: OffsetDateTime) -> Self {
        Self {
            started_at,
            started: Instant::now(),
        }
    }

    /// `YYYY-MM-DD_HH-MM-SS`
    pub fn timestamp(&self) -> Result<String> {
        let format = format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
        Ok(self.started_at.format(format)?)
    }

    pub fn run_dir_name(&self, output_folder_name: &str) -> Result<String> {
        Ok(format!("{}_{}", output_folder_name, self.timestamp()?))
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_str(&self) -> String {
        format_elapsed(self.elapsed())
    }
}

/// `H:MM:SS`, sub-second part dropped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Creates `<parent>/<output_folder_name>_<timestamp>` if it does not exist yet.
pub fn create_run_dir(parent: &Path, output_folder_name: &str, ctx: &RunContext) -> Result<PathBuf> {
    let run_dir = parent.join(ctx.run_dir_name(output_folder_name)?);
    std::fs::create_dir_all(&run_dir)?;
    Ok(run_dir)
}

#[derive(Debug)]
pub enum UrlOutcome {
    Saved(PathBuf),
    Failed(FetchError),
}

#[derive(Debug)]
pub struct UrlReport {
    pub url: Url,
    pub outcome: UrlOutcome,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<UrlReport>,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, UrlOutcome::Saved(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, UrlOutcome::Failed(_)))
    }

    pub fn timed_out(&self) -> usize {
        self.count(|o| matches!(o, UrlOutcome::Failed(e) if e.is_timeout()))
    }

    pub fn content_missing(&self) -> usize {
        self.count(|o| matches!(o, UrlOutcome::Failed(e) if e.is_content_not_found()))
    }

    fn count(&self, pred: impl Fn(&UrlOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Downloads every article listed in the configured CSV file.
///
/// Returns `Ok(None)` without touching the disk when no CSV file was given.
/// The browser is closed on every return path.
pub fn start(config: &Config) -> Result<Option<RunSummary>> {
    let Some(csv_file) = config.csv_path() else {
        warn!(
            "No CSV file provided, please provide a csv file path in the '--csv_file' argument. Exiting..."
        );
        return Ok(None);
    };

    let ctx = RunContext::start();
    let run_dir = create_run_dir(&std::env::current_dir()?, &config.output_folder_name, &ctx)?;
    info!("Writing articles to {}", run_dir.display());

    let session = BrowserSession::launch(config.browser_options())?;

    let summary = run_csv(csv_file, &run_dir, config.output_mode(), &session, &ctx, config.delay)?;

    info!(
        "Finished: {} saved, {} skipped, {} failed | Time Elapsed: {}",
        summary.saved(),
        summary.content_missing(),
        summary.failed() - summary.content_missing(),
        ctx.elapsed_str()
    );

    Ok(Some(summary))
}

/// Reads `csv_file` and processes its URLs into `run_dir`.
pub fn run_csv<F: ArticleFetcher + ?Sized>(
    csv_file: &Path,
    run_dir: &Path,
    mode: OutputMode,
    fetcher: &F,
    ctx: &RunContext,
    delay: Duration,
) -> Result<RunSummary> {
    let mut reader = UrlReader::from_path(csv_file)?;
    let writer = ArticleWriter::new(run_dir, mode);
    process_urls(reader.urls(), fetcher, &writer, ctx, delay)
}

/// Fetches and saves each URL in turn, pausing `delay` after each one.
///
/// A failed fetch is logged and recorded; the loop moves on. Input and
/// write errors stop the run.
pub fn process_urls<I, F>(
    urls: I,
    fetcher: &F,
    writer: &ArticleWriter,
    ctx: &RunContext,
    delay: Duration,
) -> Result<RunSummary>
where
    I: IntoIterator<Item = input::Result<Url>>,
    F: ArticleFetcher + ?Sized,
{
    let mut summary = RunSummary::default();

    for url in urls {
        let url = url?;
        let outcome = match fetcher.fetch_article(&url) {
            Ok(text) => {
                let path = writer.write(&url, &text)?;
                log_saved(&url, &path, writer.mode(), ctx);
                UrlOutcome::Saved(path)
            }
            Err(e) => {
                if e.is_content_not_found() {
                    warn!("Skipped: {e} in {url} | Time Elapsed: {}", ctx.elapsed_str());
                } else {
                    warn!("Failed to download {url}: {e} | Time Elapsed: {}", ctx.elapsed_str());
                }
                UrlOutcome::Failed(e)
            }
        };
        summary.reports.push(UrlReport { url, outcome });

        std::thread::sleep(delay);
    }

    Ok(summary)
}

fn log_saved(url: &Url, path: &Path, mode: OutputMode, ctx: &RunContext) {
    match mode {
        OutputMode::Concatenate => {
            info!("Appended content from {url} | Time Elapsed: {}", ctx.elapsed_str());
        }
        OutputMode::PerFile => {
            let filename = path.file_name().unwrap_or_default().to_string_lossy();
            info!("Saved {url} as {filename} | Time Elapsed: {}", ctx.elapsed_str());
        }
    }
}
