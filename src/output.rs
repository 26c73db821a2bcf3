use crate::sanitize::{DEFAULT_MAX_FILENAME_LENGTH, sanitize_filename};
use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use url::Url;

pub const CONCATENATED_FILENAME: &str = "all_kb_articles.txt";

const SEPARATOR: &str = "---------------------------------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Every article is appended to `all_kb_articles.txt`.
    Concatenate,
    /// One file per article, named after the URL path.
    PerFile,
}

impl OutputMode {
    pub fn from_concatenate(concatenate: bool) -> Self {
        if concatenate {
            OutputMode::Concatenate
        } else {
            OutputMode::PerFile
        }
    }
}

/// Writes extracted article text into the run directory.
pub struct ArticleWriter {
    run_dir: PathBuf,
    mode: OutputMode,
}

impl ArticleWriter {
    pub fn new<P: Into<PathBuf>>(run_dir: P, mode: OutputMode) -> Self {
        Self {
            run_dir: run_dir.into(),
            mode,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Persists `text` for `url` and returns the path written to.
    pub fn write(&self, url: &Url, text: &str) -> io::Result<PathBuf> {
        match self.mode {
            OutputMode::Concatenate => self.append(url, text),
            OutputMode::PerFile => self.write_file(url, text),
        }
    }

    fn append(&self, url: &Url, text: &str) -> io::Result<PathBuf> {
        let path = self.run_dir.join(CONCATENATED_FILENAME);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        let block = format!("KB: {url}\n{SEPARATOR}\n{text}\n{SEPARATOR}\n\n\n");
        file.write_all(block.as_bytes())?;
        file.flush()?;

        Ok(path)
    }

    fn write_file(&self, url: &Url, text: &str) -> io::Result<PathBuf> {
        let path = self.run_dir.join(article_filename(url));
        fs::write(&path, text)?;
        Ok(path)
    }
}

/// `https://site.com/a/b` becomes `_a_b.txt`.
///
/// The path is percent-decoded first, so `/kb/%C3%BC` names `_kb_ü.txt`.
pub fn article_filename(url: &Url) -> String {
    let path = urlencoding::decode(url.path()).unwrap_or(Cow::Borrowed(url.path()));
    let raw = format!("{}.txt", path.replace('/', "_"));
    sanitize_filename(&raw, DEFAULT_MAX_FILENAME_LENGTH)
}
