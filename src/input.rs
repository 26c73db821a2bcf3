use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use url::Url;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("CsvError: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, InputError>;

/// Returns true when `s` is an absolute URL with a scheme and a host.
///
/// Header rows and other garbage are filtered out with this check.
pub fn is_url(s: &str) -> bool {
    parse_url(s).is_some()
}

fn parse_url(s: &str) -> Option<Url> {
    let url = Url::parse(s).ok()?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Reads candidate URLs from the first column of a CSV file.
pub struct UrlReader<R: io::Read>(csv::Reader<R>);

impl UrlReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self(Self::builder().from_path(path)?))
    }
}

impl<R: io::Read> UrlReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self(Self::builder().from_reader(reader))
    }

    /// Lazily yields every row whose first field is a URL.
    ///
    /// Rows that are empty, not valid UTF-8, or not URL-shaped are skipped.
    /// Only record-level read failures come out as errors.
    pub fn urls(&mut self) -> impl Iterator<Item = Result<Url>> + '_ {
        self.0.byte_records().filter_map(|record| {
            let record = match record {
                Ok(r) => r,
                Err(e) => return Some(Err(InputError::from(e))),
            };

            let field = record.get(0)?;
            let value = match std::str::from_utf8(field) {
                Ok(v) => v,
                Err(_) => {
                    info!("{} is not a url, skipping...", String::from_utf8_lossy(field));
                    return None;
                }
            };

            match parse_url(value) {
                Some(url) => Some(Ok(url)),
                None => {
                    info!("{value} is not a url, skipping...");
                    None
                }
            }
        })
    }

    fn builder() -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(false).flexible(true);
        builder
    }
}
