//! Login screen.

use async_trait::async_trait;

use super::{open, BasePage};
use crate::browser::Page;
use crate::expect::{expect, expect_page};
use crate::fixtures::Route;
use crate::locator::{Locator, Role};
use crate::result::E2eResult;
use crate::wait::LoadState;

/// Sign-in form and its outcomes
#[derive(Debug, Clone)]
pub struct LoginPage {
    page: Page,
    username_input: Locator,
    password_input: Locator,
    login_button: Locator,
    wrong_credentials_error: Locator,
    empty_fields_error: Locator,
    welcome_message: Locator,
}

impl LoginPage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            username_input: Locator::role(Role::Textbox)
                .with_name("USERNAME")
                .describe("Username input field"),
            password_input: Locator::role(Role::Textbox)
                .with_name("PASSWORD")
                .describe("Password input field"),
            login_button: Locator::role(Role::Button)
                .with_name("Sign In")
                .describe("Login button"),
            wrong_credentials_error: Locator::role(Role::Heading)
                .with_name("Wrong credentials")
                .describe("Wrong credentials error message"),
            empty_fields_error: Locator::role(Role::Heading)
                .with_name("Fields can not be empty")
                .describe("Empty fields error message"),
            welcome_message: Locator::role(Role::Heading)
                .with_name("Welcome!")
                .describe("Welcome message heading"),
        }
    }

    /// Fill both fields, submit and wait for the network to settle.
    ///
    /// Does not check the outcome; follow with one of the `expect_*`
    /// methods.
    pub async fn login_as(&self, username: &str, password: &str) -> E2eResult<()> {
        tracing::debug!(username, "login");
        self.page.fill(&self.username_input, username).await?;
        self.page.fill(&self.password_input, password).await?;
        self.page.click(&self.login_button).await?;
        self.page.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Submit with both fields blank and wait for the empty-fields error
    pub async fn login_with_empty_credentials(&self) -> E2eResult<()> {
        self.page.fill(&self.username_input, "").await?;
        self.page.fill(&self.password_input, "").await?;
        self.page.click(&self.login_button).await?;
        expect(&self.page, &self.empty_fields_error)
            .to_be_visible()
            .await
    }

    /// Landed on `/home`, greeted, and the username is shown
    pub async fn expect_successful_login(&self, username: &str) -> E2eResult<()> {
        expect_page(&self.page).to_have_url(".*/home").await?;
        expect(&self.page, &self.welcome_message)
            .to_be_visible()
            .await?;
        let shown = Locator::text(username).describe(format!("text {username:?}"));
        expect(&self.page, &shown).to_be_visible().await
    }

    pub async fn expect_wrong_credentials_error(&self) -> E2eResult<()> {
        expect(&self.page, &self.wrong_credentials_error)
            .to_be_visible()
            .await
    }

    pub async fn expect_empty_fields_error(&self) -> E2eResult<()> {
        expect(&self.page, &self.empty_fields_error)
            .to_be_visible()
            .await
    }

    pub async fn wrong_credentials_error_message(&self) -> E2eResult<String> {
        self.visible_text(&self.wrong_credentials_error).await
    }

    pub async fn empty_fields_error_message(&self) -> E2eResult<String> {
        self.visible_text(&self.empty_fields_error).await
    }

    pub async fn welcome_message(&self) -> E2eResult<String> {
        self.visible_text(&self.welcome_message).await
    }

    async fn visible_text(&self, locator: &Locator) -> E2eResult<String> {
        expect(&self.page, locator).to_be_visible().await?;
        Ok(self.page.text_content(locator).await?.unwrap_or_default())
    }
}

#[async_trait]
impl BasePage for LoginPage {
    fn page(&self) -> &Page {
        &self.page
    }

    async fn navigate(&self) -> E2eResult<()> {
        open(self, Route::Login).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::fixtures::{INVALID_CREDENTIALS, VALID_CREDENTIALS};
    use crate::mock::MockDriver;

    async fn login_page() -> LoginPage {
        let login = LoginPage::new(Page::new(MockDriver::default(), SuiteConfig::default()));
        login.navigate().await.unwrap();
        login
    }

    #[tokio::test]
    async fn test_valid_login_shows_welcome() {
        let login = login_page().await;
        login
            .login_as(VALID_CREDENTIALS.username, VALID_CREDENTIALS.password)
            .await
            .unwrap();
        login
            .expect_successful_login(VALID_CREDENTIALS.username)
            .await
            .unwrap();
        assert_eq!(login.welcome_message().await.unwrap(), "Welcome!");
    }

    #[tokio::test]
    async fn test_invalid_login_message() {
        let login = login_page().await;
        login
            .login_as(INVALID_CREDENTIALS.username, INVALID_CREDENTIALS.password)
            .await
            .unwrap();
        assert_eq!(
            login.wrong_credentials_error_message().await.unwrap(),
            "Wrong credentials"
        );
    }

    #[tokio::test]
    async fn test_empty_login_message() {
        let login = login_page().await;
        login.login_with_empty_credentials().await.unwrap();
        assert_eq!(
            login.empty_fields_error_message().await.unwrap(),
            "Fields can not be empty"
        );
    }
}
