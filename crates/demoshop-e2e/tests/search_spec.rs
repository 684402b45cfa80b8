//! Search scenarios

#[macro_use]
mod common;

use demoshop_e2e::prelude::*;

async fn valid_term_finds_result(page: Page) -> E2eResult<()> {
    let search = SearchPage::new(page);
    step("Navigate to search page", search.navigate()).await?;
    step("Search for valid term", search.search_for(search_terms::VALID)).await?;
    step("Assert search success message", async {
        search.expect_search_success(search_terms::VALID).await?;
        let message = search.search_message().await?;
        let expected = format!("Found one result for {}", search_terms::VALID);
        if message.contains(&expected) {
            Ok(())
        } else {
            Err(E2eError::assertion(format!(
                "search message {message:?} does not contain {expected:?}"
            )))
        }
    })
    .await
}

async fn empty_term_shows_error(page: Page) -> E2eResult<()> {
    let search = SearchPage::new(page);
    step("Navigate to search page", search.navigate()).await?;
    step("Submit empty search", search.search_with_empty_term()).await?;
    step("Assert empty search error", async {
        search.expect_empty_search_error().await?;
        let message = search.search_message().await?;
        if message.contains("Please provide a search word.") {
            Ok(())
        } else {
            Err(E2eError::assertion(format!("unexpected message {message:?}")))
        }
    })
    .await
}

scenarios!(valid_term_finds_result, empty_term_shows_error);

#[tokio::test]
async fn test_results_container_only_for_hits() {
    let search = SearchPage::new(common::mock_page());
    search.navigate().await.unwrap();
    search.search_for(search_terms::EMPTY).await.unwrap();
    assert!(!search.has_search_results().await.unwrap());
    search.search_for(search_terms::VALID).await.unwrap();
    assert!(search.has_search_results().await.unwrap());
}

#[tokio::test]
async fn test_whitespace_term_is_empty() {
    let search = SearchPage::new(common::mock_page());
    search.navigate().await.unwrap();
    search.search_for("   ").await.unwrap();
    search.expect_empty_search_error().await.unwrap();
}
