use clap::Parser;
use kb_downloader::browser::{
    BrowserOptions, DEFAULT_CONTENT_SELECTOR, DEFAULT_IDLE_TIMEOUT, DEFAULT_READY_SELECTOR,
};
use kb_downloader::config::{Config, DEFAULT_OUTPUT_FOLDER_NAME, parse_bool_flag, parse_seconds};
use kb_downloader::{logging, run};
use std::path::PathBuf;
use std::time::Duration;

/// Download KB articles as a single, or separate, .txt files.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the input CSV file containing URLs
    #[arg(long = "csv_file")]
    csv_file: Option<PathBuf>,

    /// Output folder name (name only, not a full path)
    #[arg(long = "output_folder_name", default_value = DEFAULT_OUTPUT_FOLDER_NAME)]
    output_folder_name: String,

    /// Append every article to one file (`true`) or write one file per URL (`false`)
    #[arg(
        long,
        action = clap::ArgAction::Set,
        default_value = "true",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_bool_flag
    )]
    concatenate: bool,

    /// Seconds to wait for the article to finish rendering
    #[arg(long = "wait_timeout", default_value = "20", value_parser = parse_seconds)]
    wait_timeout: Duration,

    /// Seconds to pause between URLs
    #[arg(long, default_value = "1", value_parser = parse_seconds)]
    delay: Duration,

    /// CSS selector of the element rendered last on an article page
    #[arg(long = "ready_selector", default_value = DEFAULT_READY_SELECTOR)]
    ready_selector: String,

    /// CSS selector of the element holding the article text
    #[arg(long = "content_selector", default_value = DEFAULT_CONTENT_SELECTOR)]
    content_selector: String,

    /// Launch Chrome without its sandbox (needed in some containers)
    #[arg(long = "no_sandbox")]
    no_sandbox: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            csv_file: args.csv_file,
            output_folder_name: args.output_folder_name,
            concatenate: args.concatenate,
            delay: args.delay,
            browser: BrowserOptions {
                ready_selector: args.ready_selector,
                content_selector: args.content_selector,
                ready_timeout: args.wait_timeout,
                idle_timeout: DEFAULT_IDLE_TIMEOUT,
                sandbox: !args.no_sandbox,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let config = Config::from(Args::parse());
    run::start(&config)?;

    Ok(())
}
