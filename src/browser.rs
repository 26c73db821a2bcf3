use headless_chrome::{LaunchOptions, Tab, util::Wait};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Last element rendered inside a knowledge-base article ("Last Updated").
pub const DEFAULT_READY_SELECTOR: &str = r#"span[data-aura-class="uiOutputDateTime"]"#;
pub const DEFAULT_CONTENT_SELECTOR: &str = "article.content[data-aura-rendered-by]";
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(20);
/// headless_chrome drops its Chrome connection after this long without traffic.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

const VISIBLE_JS: &str = "function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.visibility !== 'hidden' && style.display !== 'none'
        && style.opacity !== '0' && (rect.width > 0 || rect.height > 0);
}";

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("ChromeError: {0}")]
    ChromeError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Why a single article could not be fetched.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("NavigationError: {0}")]
    Navigation(anyhow::Error),
    #[error("Timed out after {}s waiting for {selector}", .waited.as_secs_f32())]
    Timeout { selector: String, waited: Duration },
    #[error("Could not find {selector}")]
    ContentNotFound { selector: String },
    #[error("ExtractionError: {0}")]
    Extraction(anyhow::Error),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    pub fn is_content_not_found(&self) -> bool {
        matches!(self, FetchError::ContentNotFound { .. })
    }
}

/// Loads a page and returns the visible text of its article.
pub trait ArticleFetcher {
    fn fetch_article(&self, url: &Url) -> std::result::Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub ready_selector: String,
    pub content_selector: String,
    pub ready_timeout: Duration,
    /// Longest quiet period (pause between URLs included) the connection survives.
    pub idle_timeout: Duration,
    pub sandbox: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            ready_selector: DEFAULT_READY_SELECTOR.to_string(),
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sandbox: true,
        }
    }
}

/// One headless Chrome with a single tab, reused for every article.
///
/// The Chrome process is killed when the session is dropped.
pub struct BrowserSession {
    tab: Arc<Tab>,
    options: BrowserOptions,
    // Dropped after `tab`; owns the Chrome process.
    _browser: headless_chrome::Browser,
}

impl BrowserSession {
    pub fn launch(options: BrowserOptions) -> Result<Self> {
        info!("Starting headless browser...");
        let browser = headless_chrome::Browser::new(LaunchOptions {
            headless: true,
            sandbox: options.sandbox,
            idle_browser_timeout: options.idle_timeout,
            ..Default::default()
        })?;
        let tab = browser.new_tab()?;

        Ok(Self {
            tab,
            options,
            _browser: browser,
        })
    }

    fn navigate(&self, url: &Url) -> std::result::Result<(), FetchError> {
        info!("Getting page...");
        self.tab
            .navigate_to(url.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(FetchError::Navigation)?;
        Ok(())
    }

    /// Blocks until the ready selector matches a visible element.
    fn wait_for_render(&self) -> std::result::Result<(), FetchError> {
        info!("Waiting for content load...");
        let selector = &self.options.ready_selector;
        let timeout = self.options.ready_timeout;

        Wait::with_timeout(timeout)
            .until(|| {
                let element = self.tab.find_element(selector).ok()?;
                let visible = element
                    .call_js_fn(VISIBLE_JS, vec![], false)
                    .ok()?
                    .value?
                    .as_bool()?;
                visible.then_some(())
            })
            .map_err(|_| FetchError::Timeout {
                selector: selector.clone(),
                waited: timeout,
            })
    }

    fn extract_text(&self) -> std::result::Result<String, FetchError> {
        let selector = &self.options.content_selector;
        debug!("Finding {selector} element...");

        let element = self
            .tab
            .find_element(selector)
            .map_err(|_| FetchError::ContentNotFound {
                selector: selector.clone(),
            })?;

        info!("Separating article text from HTML/CSS...");
        element.get_inner_text().map_err(FetchError::Extraction)
    }
}

impl ArticleFetcher for BrowserSession {
    fn fetch_article(&self, url: &Url) -> std::result::Result<String, FetchError> {
        self.navigate(url)?;
        self.wait_for_render()?;
        self.extract_text()
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("Closing headless browser");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "data:text/html,<html><body>\
        <article class=\"content\" data-aura-rendered-by=\"1:0\"><p>Reset your password</p>\
        <span data-aura-class=\"uiOutputDateTime\">1/1/2024</span></article></body></html>";

    const NO_ARTICLE: &str = "data:text/html,<html><body>\
        <div><span data-aura-class=\"uiOutputDateTime\">1/1/2024</span></div></body></html>";

    const NEVER_READY: &str = "data:text/html,<html><body>\
        <article class=\"content\" data-aura-rendered-by=\"1:0\">\
        <span data-aura-class=\"uiOutputDateTime\" style=\"display:none\">x</span></article></body></html>";

    const TRANSPARENT_READY: &str = "data:text/html,<html><body>\
        <article class=\"content\" data-aura-rendered-by=\"1:0\">\
        <span data-aura-class=\"uiOutputDateTime\" style=\"opacity:0\">x</span></article></body></html>";

    fn session() -> BrowserSession {
        BrowserSession::launch(BrowserOptions {
            ready_timeout: Duration::from_secs(2),
            idle_timeout: Duration::from_secs(10),
            sandbox: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn error_kinds() {
        let timeout = FetchError::Timeout {
            selector: DEFAULT_READY_SELECTOR.to_string(),
            waited: DEFAULT_READY_TIMEOUT,
        };
        assert!(timeout.is_timeout());
        assert!(!timeout.is_content_not_found());
        assert_eq!(
            timeout.to_string(),
            format!("Timed out after 20s waiting for {DEFAULT_READY_SELECTOR}")
        );

        let missing = FetchError::ContentNotFound {
            selector: DEFAULT_CONTENT_SELECTOR.to_string(),
        };
        assert!(missing.is_content_not_found());
        assert_eq!(
            missing.to_string(),
            "Could not find article.content[data-aura-rendered-by]"
        );
    }

    #[test]
    #[ignore = "needs a local Chrome"]
    fn extracts_rendered_article() {
        let session = session();
        let url = Url::parse(ARTICLE).unwrap();
        let text = session.fetch_article(&url).unwrap();
        assert!(text.contains("Reset your password"));
    }

    #[test]
    #[ignore = "needs a local Chrome"]
    fn missing_article_is_reported() {
        let session = session();
        let url = Url::parse(NO_ARTICLE).unwrap();
        assert!(session.fetch_article(&url).unwrap_err().is_content_not_found());
    }

    #[test]
    #[ignore = "needs a local Chrome"]
    fn hidden_indicator_times_out() {
        let session = session();
        let url = Url::parse(NEVER_READY).unwrap();
        assert!(session.fetch_article(&url).unwrap_err().is_timeout());
    }

    #[test]
    #[ignore = "needs a local Chrome"]
    fn transparent_indicator_times_out() {
        let session = session();
        let url = Url::parse(TRANSPARENT_READY).unwrap();
        assert!(session.fetch_article(&url).unwrap_err().is_timeout());
    }
}
