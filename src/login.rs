//! The scripted Vanguard Personal Investor login sequence.
//!
//! The workflow only moves forward: load the login page, enter the username
//! and password, submit, wait for the security-question page, answer the
//! question, decline device memory, continue. There are no branches and no
//! retries; the first failure propagates, and the session is torn down
//! regardless of how far the sequence got.

use std::time::Duration;

use tracing::info;

use crate::driver::{Driver, Locator};
use crate::error::Result;
use crate::prompt::Prompter;

/// Personal Investor login address.
pub const LOGIN_URL: &str = "https://investor.vanguard.com/home/";

// Form ids on the login page.
const USERNAME_FIELD: &str = "USER";
const PASSWORD_FIELD: &str = "PASSWORD";
const LOGIN_BUTTON: &str = "login";

// Form ids on the security-question follow-up page.
const CONTINUE_BUTTON: &str = "LoginForm:ContinueInput";
const ANSWER_FIELD: &str = "LoginForm:ANSWER";
const DO_NOT_REMEMBER_DEVICE: &str = "LoginForm:DEVICE:1";

// The question label carries no id; this structural path is the only address
// the site exposes for it, and it breaks silently if the table layout changes.
const SECURITY_QUESTION_CELL: &str =
    "#LoginForm tbody:nth-child(1) tr:nth-child(2) td:nth-child(2)";

/// How long the security-question page gets to become interactive.
const SECURITY_PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the whole workflow against `driver`, then closes it exactly once —
/// on the success path and on every failure path. A workflow error is
/// reported in preference to a teardown error.
pub async fn run<D: Driver>(driver: &D, prompter: &dyn Prompter) -> Result<()> {
    let page = LoginPage::new(driver);
    let outcome = async {
        page.load().await?;
        page.login(prompter).await
    }
    .await;
    let closed = driver.close().await;
    outcome.and(closed)
}

/// The login form and its security-question follow-up.
pub struct LoginPage<'a, D: Driver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: Driver + ?Sized> LoginPage<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Navigates to the Personal Investor login page.
    pub async fn load(&self) -> Result<()> {
        info!(target = "vglogin", url = LOGIN_URL, "loading login page");
        self.driver.goto(LOGIN_URL).await
    }

    /// Drives the login sequence.
    ///
    /// Username, password, and the security-question answer are read from
    /// `prompter` at the step that needs them. Accounts with two-factor
    /// authentication enabled are not supported.
    ///
    /// Precondition: the driver's current page is the login page; call
    /// [`load`](Self::load) first. This is not verified here — a violation
    /// surfaces as element-lookup failures downstream.
    pub async fn login(&self, prompter: &dyn Prompter) -> Result<()> {
        self.fill_in_username(prompter).await?;
        self.fill_in_password(prompter).await?;
        self.submit_credentials().await?;
        self.wait_for_security_question_page().await?;
        self.answer_security_question(prompter).await?;
        self.decline_device_memory().await?;
        self.submit_security_answer().await?;
        info!(target = "vglogin", "login sequence submitted");
        Ok(())
    }

    async fn fill_in_username(&self, prompter: &dyn Prompter) -> Result<()> {
        let username = prompter.prompt_line("Username: ")?;
        self.driver
            .send_keys(&Locator::id(USERNAME_FIELD), &username)
            .await
    }

    async fn fill_in_password(&self, prompter: &dyn Prompter) -> Result<()> {
        let password = prompter.prompt_secret("Password: ")?;
        self.driver
            .send_keys(&Locator::id(PASSWORD_FIELD), &password)
            .await
    }

    async fn submit_credentials(&self) -> Result<()> {
        info!(target = "vglogin", "submitting credentials");
        self.driver.click(&Locator::id(LOGIN_BUTTON)).await
    }

    async fn wait_for_security_question_page(&self) -> Result<()> {
        info!(target = "vglogin", "waiting for security-question page");
        self.driver
            .wait_clickable(&Locator::id(CONTINUE_BUTTON), SECURITY_PAGE_TIMEOUT)
            .await
    }

    async fn answer_security_question(&self, prompter: &dyn Prompter) -> Result<()> {
        let question = self
            .driver
            .text(&Locator::css(SECURITY_QUESTION_CELL))
            .await?;
        let answer = prompter.prompt_secret(&format!("{question}: "))?;
        self.driver
            .send_keys(&Locator::id(ANSWER_FIELD), &answer)
            .await
    }

    async fn decline_device_memory(&self) -> Result<()> {
        self.driver
            .click(&Locator::id(DO_NOT_REMEMBER_DEVICE))
            .await
    }

    async fn submit_security_answer(&self) -> Result<()> {
        self.driver.click(&Locator::id(CONTINUE_BUTTON)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoginError;
    use crate::testing::{DriverCall, MockDriver, ScriptedPrompter};

    fn prompter() -> ScriptedPrompter {
        ScriptedPrompter::new(["alice", "secret", "blue"])
    }

    fn driver_with_question() -> MockDriver {
        let driver = MockDriver::new();
        driver.set_text(
            &Locator::css(SECURITY_QUESTION_CELL),
            "What is your favorite color?",
        );
        driver
    }

    #[tokio::test]
    async fn issues_the_fixed_driver_call_sequence() {
        let driver = driver_with_question();

        run(&driver, &prompter()).await.unwrap();

        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Goto {
                    url: LOGIN_URL.to_string(),
                },
                DriverCall::SendKeys {
                    locator: Locator::id("USER"),
                    text: "alice".to_string(),
                },
                DriverCall::SendKeys {
                    locator: Locator::id("PASSWORD"),
                    text: "secret".to_string(),
                },
                DriverCall::Click {
                    locator: Locator::id("login"),
                },
                DriverCall::WaitClickable {
                    locator: Locator::id("LoginForm:ContinueInput"),
                },
                DriverCall::Text {
                    locator: Locator::css(SECURITY_QUESTION_CELL),
                },
                DriverCall::SendKeys {
                    locator: Locator::id("LoginForm:ANSWER"),
                    text: "blue".to_string(),
                },
                DriverCall::Click {
                    locator: Locator::id("LoginForm:DEVICE:1"),
                },
                DriverCall::Click {
                    locator: Locator::id("LoginForm:ContinueInput"),
                },
                DriverCall::Close,
            ]
        );
        assert_eq!(driver.close_count(), 1);
    }

    #[tokio::test]
    async fn uses_the_extracted_question_as_secret_prompt() {
        let driver = driver_with_question();
        let prompter = prompter();

        run(&driver, &prompter).await.unwrap();

        assert_eq!(
            prompter.prompts(),
            vec![
                ("Username: ".to_string(), false),
                ("Password: ".to_string(), true),
                ("What is your favorite color?: ".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn security_page_timeout_stops_the_workflow() {
        let driver = MockDriver::new();
        driver.set_wait_times_out(true);

        let err = run(&driver, &prompter()).await.unwrap_err();

        assert!(matches!(err, LoginError::Timeout { .. }));
        // Nothing past the wait ran, except the guaranteed teardown.
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Goto {
                    url: LOGIN_URL.to_string(),
                },
                DriverCall::SendKeys {
                    locator: Locator::id("USER"),
                    text: "alice".to_string(),
                },
                DriverCall::SendKeys {
                    locator: Locator::id("PASSWORD"),
                    text: "secret".to_string(),
                },
                DriverCall::Click {
                    locator: Locator::id("login"),
                },
                DriverCall::WaitClickable {
                    locator: Locator::id("LoginForm:ContinueInput"),
                },
                DriverCall::Close,
            ]
        );
        assert_eq!(driver.close_count(), 1);
    }

    #[tokio::test]
    async fn missing_element_propagates_and_still_tears_down() {
        let driver = MockDriver::new();
        driver.set_missing(&Locator::id("USER"));

        let err = run(&driver, &prompter()).await.unwrap_err();

        assert!(matches!(err, LoginError::ElementNotFound { .. }));
        assert_eq!(driver.close_count(), 1);
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Goto {
                    url: LOGIN_URL.to_string(),
                },
                DriverCall::SendKeys {
                    locator: Locator::id("USER"),
                    text: "alice".to_string(),
                },
                DriverCall::Close,
            ]
        );
    }

    #[tokio::test]
    async fn navigation_failure_still_tears_down() {
        let driver = MockDriver::new();
        driver.set_goto_fails(true);

        let err = run(&driver, &prompter()).await.unwrap_err();

        assert!(matches!(err, LoginError::Navigation { .. }));
        assert_eq!(driver.close_count(), 1);
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Goto {
                    url: LOGIN_URL.to_string(),
                },
                DriverCall::Close,
            ]
        );
    }
}
