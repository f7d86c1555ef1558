//! Browser actions resolved from voice commands.
//!
//! Actions are plain data. The command table produces them; the controller
//! hands them to an [`ActionDispatcher`], which is whatever the host
//! environment uses to drive a browser.

use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Search engines known to the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    YouTube,
}

impl SearchEngine {
    /// Build the search results URL for a query.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        match self {
            Self::Google => format!("https://www.google.com/search?q={encoded}"),
            Self::YouTube => {
                format!("https://www.youtube.com/results?search_query={encoded}")
            }
        }
    }
}

/// A fully-resolved browser action, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    /// Open a URL in a new tab.
    OpenUrl { url: String },
    /// Run a web search for a query.
    WebSearch { engine: SearchEngine, query: String },
}

impl BrowserAction {
    /// The URL this action navigates to.
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::OpenUrl { url } => url.clone(),
            Self::WebSearch { engine, query } => engine.search_url(query),
        }
    }
}

/// Executes browser actions on behalf of the controller.
#[async_trait]
pub trait ActionDispatcher: Send {
    /// Perform the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the host environment cannot perform the
    /// navigation; the controller reports it to the user.
    async fn dispatch(&mut self, action: &BrowserAction) -> Result<()>;
}

/// Dispatcher for headless environments: records the navigation in the
/// log instead of driving a browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDispatcher;

#[async_trait]
impl ActionDispatcher for LoggingDispatcher {
    async fn dispatch(&mut self, action: &BrowserAction) -> Result<()> {
        info!("navigate: {}", action.url());
        Ok(())
    }
}
