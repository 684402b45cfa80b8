//! Search screen.

use async_trait::async_trait;

use super::{open, BasePage};
use crate::browser::Page;
use crate::expect::expect;
use crate::fixtures::Route;
use crate::locator::{Locator, Role};
use crate::result::E2eResult;
use crate::wait::LoadState;

const SUCCESS_PREFIX: &str = "Found one result for";
const EMPTY_TERM_MESSAGE: &str = "Please provide a search word.";

/// Search form and its result message
#[derive(Debug, Clone)]
pub struct SearchPage {
    page: Page,
    search_input: Locator,
    search_button: Locator,
    search_results: Locator,
    search_message: Locator,
}

impl SearchPage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            search_input: Locator::placeholder("Search..").describe("Search input field"),
            // the only button on the screen
            search_button: Locator::role(Role::Button).describe("Search submit button"),
            search_results: Locator::test_id("search-results")
                .describe("Search results container"),
            search_message: Locator::text_pattern(
                "Found one result for|Please provide a search word",
            )
            .describe("Search result message"),
        }
    }

    /// Type a term, submit and wait for the network to settle
    pub async fn search_for(&self, term: &str) -> E2eResult<()> {
        tracing::debug!(term, "search");
        self.page.fill(&self.search_input, term).await?;
        self.page.click(&self.search_button).await?;
        self.page.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Submit a blank term and wait for the result message
    pub async fn search_with_empty_term(&self) -> E2eResult<()> {
        self.page.fill(&self.search_input, "").await?;
        self.page.click(&self.search_button).await?;
        expect(&self.page, &self.search_message)
            .to_be_visible()
            .await
    }

    pub async fn expect_search_success(&self, term: &str) -> E2eResult<()> {
        self.expect_message(&format!("{SUCCESS_PREFIX} {term}"))
            .await
    }

    pub async fn expect_empty_search_error(&self) -> E2eResult<()> {
        self.expect_message(EMPTY_TERM_MESSAGE).await
    }

    /// Text of the result message once it is shown
    pub async fn search_message(&self) -> E2eResult<String> {
        expect(&self.page, &self.search_message)
            .to_be_visible()
            .await?;
        Ok(self
            .page
            .text_content(&self.search_message)
            .await?
            .unwrap_or_default())
    }

    /// Whether the results container is shown right now
    pub async fn has_search_results(&self) -> E2eResult<bool> {
        self.page.is_visible(&self.search_results).await
    }

    async fn expect_message(&self, text: &str) -> E2eResult<()> {
        let message = expect(&self.page, &self.search_message);
        message.to_be_visible().await?;
        message.to_contain_text(text).await
    }
}

#[async_trait]
impl BasePage for SearchPage {
    fn page(&self) -> &Page {
        &self.page
    }

    async fn navigate(&self) -> E2eResult<()> {
        open(self, Route::Search).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::mock::MockDriver;

    async fn search_page() -> SearchPage {
        let search = SearchPage::new(Page::new(MockDriver::default(), SuiteConfig::default()));
        search.navigate().await.unwrap();
        search
    }

    #[tokio::test]
    async fn test_no_results_before_searching() {
        let search = search_page().await;
        assert!(!search.has_search_results().await.unwrap());
    }

    #[tokio::test]
    async fn test_search_message_text() {
        let search = search_page().await;
        search.search_for("automation").await.unwrap();
        assert_eq!(
            search.search_message().await.unwrap(),
            "Found one result for automation"
        );
        assert!(search.has_search_results().await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_term_fails_expectation() {
        let config = SuiteConfig::default().with_timeouts(crate::config::Timeouts {
            default: std::time::Duration::from_millis(50),
            ..crate::config::Timeouts::default()
        });
        let search = SearchPage::new(Page::new(MockDriver::default(), config));
        search.navigate().await.unwrap();
        search.search_for("rust").await.unwrap();
        let err = search.expect_search_success("automation").await.unwrap_err();
        assert!(err.is_assertion());
        assert!(err.to_string().contains("Search result message"));
    }
}
