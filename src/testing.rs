//! Test doubles for the driver boundary and the interactive prompts.
//!
//! [`MockDriver`] records every call for sequence assertions and can be
//! scripted per locator: text responses, missing elements, a failing
//! navigation, and whether the clickability wait succeeds.
//! [`ScriptedPrompter`] feeds canned responses and records each label
//! together with whether echo was suppressed.
//!
//! # Example
//!
//! ```ignore
//! use vglogin::driver::Locator;
//! use vglogin::testing::{DriverCall, MockDriver};
//!
//! let driver = MockDriver::new();
//! driver.set_text(&Locator::css("td.question"), "Mother's maiden name?");
//!
//! // After running the workflow...
//! let calls = driver.calls();
//! assert!(calls.iter().any(|c| matches!(c, DriverCall::Close)));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::driver::{Driver, Locator};
use crate::error::{LoginError, Result};
use crate::prompt::Prompter;

/// One call observed by [`MockDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// Navigation was performed.
    Goto { url: String },
    /// Text was typed into an element.
    SendKeys { locator: Locator, text: String },
    /// An element was clicked.
    Click { locator: Locator },
    /// An element's text was read.
    Text { locator: Locator },
    /// A bounded clickability wait was issued.
    WaitClickable { locator: Locator },
    /// The browser was torn down.
    Close,
}

/// Mock driver for exercising the workflow without a browser.
#[derive(Default)]
pub struct MockDriver {
    calls: Mutex<Vec<DriverCall>>,
    text_by_locator: Mutex<HashMap<Locator, String>>,
    missing: Mutex<HashSet<Locator>>,
    goto_fails: Mutex<bool>,
    wait_times_out: Mutex<bool>,
    close_count: Mutex<usize>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the text returned for `locator`.
    pub fn set_text(&self, locator: &Locator, text: &str) {
        self.text_by_locator
            .lock()
            .unwrap()
            .insert(locator.clone(), text.to_string());
    }

    /// Marks `locator` as absent; lookups against it fail.
    pub fn set_missing(&self, locator: &Locator) {
        self.missing.lock().unwrap().insert(locator.clone());
    }

    /// Makes navigation fail.
    pub fn set_goto_fails(&self, fails: bool) {
        *self.goto_fails.lock().unwrap() = fails;
    }

    /// Makes every clickability wait run out instead of succeeding.
    pub fn set_wait_times_out(&self, times_out: bool) {
        *self.wait_times_out.lock().unwrap() = times_out;
    }

    /// Calls observed so far, in order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times `close` was invoked.
    pub fn close_count(&self) -> usize {
        *self.close_count.lock().unwrap()
    }

    fn record(&self, call: DriverCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(&self, locator: &Locator) -> Result<()> {
        if self.missing.lock().unwrap().contains(locator) {
            Err(LoginError::ElementNotFound {
                selector: locator.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(DriverCall::Goto {
            url: url.to_string(),
        });
        if *self.goto_fails.lock().unwrap() {
            Err(LoginError::Navigation {
                url: url.to_string(),
                source: anyhow::anyhow!("scripted navigation failure"),
            })
        } else {
            Ok(())
        }
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        self.record(DriverCall::SendKeys {
            locator: locator.clone(),
            text: text.to_string(),
        });
        self.lookup(locator)
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.record(DriverCall::Click {
            locator: locator.clone(),
        });
        self.lookup(locator)
    }

    async fn text(&self, locator: &Locator) -> Result<String> {
        self.record(DriverCall::Text {
            locator: locator.clone(),
        });
        self.lookup(locator)?;
        Ok(self
            .text_by_locator
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .unwrap_or_default())
    }

    async fn wait_clickable(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.record(DriverCall::WaitClickable {
            locator: locator.clone(),
        });
        if *self.wait_times_out.lock().unwrap() {
            Err(LoginError::Timeout {
                ms: timeout.as_millis() as u64,
                condition: format!("clickable: {locator}"),
            })
        } else {
            self.lookup(locator)
        }
    }

    async fn close(&self) -> Result<()> {
        self.record(DriverCall::Close);
        *self.close_count.lock().unwrap() += 1;
        Ok(())
    }
}

/// Prompter feeding canned responses in order.
#[derive(Default)]
pub struct ScriptedPrompter {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<(String, bool)>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Labels seen so far, paired with whether echo was suppressed.
    pub fn prompts(&self) -> Vec<(String, bool)> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_response(&self, label: &str, secret: bool) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((label.to_string(), secret));
        self.responses.lock().unwrap().pop_front().ok_or_else(|| {
            LoginError::Anyhow(anyhow::anyhow!(
                "no scripted response left for prompt {label:?}"
            ))
        })
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt_line(&self, label: &str) -> Result<String> {
        self.next_response(label, false)
    }

    fn prompt_secret(&self, label: &str) -> Result<String> {
        self.next_response(label, true)
    }
}
