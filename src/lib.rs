//! Downloads knowledge-base articles listed in a CSV file.
//!
//! Every URL is loaded in a headless Chrome, the article text is read once the
//! page has finished rendering, and the text is written to a timestamped run
//! directory.

pub mod browser;
pub mod config;
pub mod input;
pub mod logging;
pub mod output;
pub mod run;
pub mod sanitize;
