//! Boundary between the login workflow and the browser-automation layer.
//!
//! Mirrors the capability set the workflow actually uses: navigate, type,
//! click, read text, and one bounded wait. [`crate::session::BrowserSession`]
//! implements it over CDP; tests substitute the recording double from
//! [`crate::testing`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Address of a single element on the current page.
///
/// The target forms expose a stable `id` attribute for every control except
/// the security-question label, which is only reachable structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Lookup by `id` attribute.
    Id(String),
    /// Lookup by CSS selector.
    Css(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    /// CSS form of the locator, for driver-side element queries.
    ///
    /// Ids are rendered as attribute selectors; the target site uses ids
    /// containing `:`, which a `#`-selector would require escaping.
    pub fn as_css(&self) -> String {
        match self {
            Locator::Id(id) => format!("[id='{id}']"),
            Locator::Css(css) => css.clone(),
        }
    }

    /// JavaScript expression resolving the element, for page-side probes.
    pub fn as_js_lookup(&self) -> String {
        match self {
            Locator::Id(id) => {
                format!("document.getElementById('{}')", escape_single_quotes(id))
            }
            Locator::Css(css) => {
                format!("document.querySelector('{}')", escape_single_quotes(css))
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={id}"),
            Locator::Css(css) => write!(f, "{css}"),
        }
    }
}

fn escape_single_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Browser-automation capability set used by the login workflow.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigates the page to `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Types `text` into the element at `locator`.
    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Clicks the element at `locator`.
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Returns the visible text of the element at `locator`.
    async fn text(&self, locator: &Locator) -> Result<String>;

    /// Blocks until the element at `locator` is clickable (present, visible,
    /// enabled) or `timeout` elapses.
    async fn wait_clickable(&self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Terminates the browser. Must be called exactly once per launch; the
    /// driver must not be used afterwards.
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_locators_render_as_attribute_selectors() {
        let locator = Locator::id("LoginForm:ContinueInput");
        assert_eq!(locator.as_css(), "[id='LoginForm:ContinueInput']");
    }

    #[test]
    fn css_locators_pass_through() {
        let locator = Locator::css("#LoginForm td:nth-child(2)");
        assert_eq!(locator.as_css(), "#LoginForm td:nth-child(2)");
    }

    #[test]
    fn id_js_lookup_uses_get_element_by_id() {
        let locator = Locator::id("USER");
        assert_eq!(locator.as_js_lookup(), "document.getElementById('USER')");
    }

    #[test]
    fn js_lookup_escapes_single_quotes() {
        let locator = Locator::css("td[title='Q']");
        assert_eq!(
            locator.as_js_lookup(),
            "document.querySelector('td[title=\\'Q\\']')"
        );
    }
}
