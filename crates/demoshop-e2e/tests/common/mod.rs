//! Shared setup for the scenario specs.
//!
//! Every scenario is an `async fn(Page) -> E2eResult<()>`. It runs once
//! against the in-memory storefront and, with `--features browser`, once
//! against the live shop at `BASE_URL` (those runs are `#[ignore]`d; use
//! `cargo test --features browser -- --ignored`).

#![allow(dead_code, unused_macros)]

use demoshop_e2e::prelude::*;

/// Page over the seeded in-memory storefront
pub fn mock_page() -> Page {
    mock_page_with(DemoStorefront::default())
}

/// Page over a customized in-memory storefront
pub fn mock_page_with(storefront: DemoStorefront) -> Page {
    init_logging();
    Page::new(MockDriver::new(storefront), SuiteConfig::default())
}

/// Run a scenario in a fresh Chromium page, closing the browser afterwards
#[cfg(feature = "browser")]
pub async fn run_live<F, Fut>(scenario: F) -> E2eResult<()>
where
    F: FnOnce(Page) -> Fut,
    Fut: std::future::Future<Output = E2eResult<()>>,
{
    init_logging();
    let config = SuiteConfig::from_env()?;
    let browser = Browser::launch(config).await?;
    let page = browser.new_page().await?;
    let outcome = scenario(page.clone()).await;
    if outcome.is_err() {
        if let Err(e) = page.screenshot_named("failure").await {
            tracing::warn!(error = %e, "failure screenshot not taken");
        }
    }
    let closed = browser.close().await;
    finish(outcome, closed)
}

/// The scenario's own error wins over a failure to close the browser
pub fn finish(outcome: E2eResult<()>, closed: E2eResult<()>) -> E2eResult<()> {
    if let Err(e) = &closed {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
    outcome.and(closed)
}

/// Register scenarios as a mock test each and, under the `browser`
/// feature, an ignored live test each
macro_rules! scenarios {
    ($($name:ident),* $(,)?) => {
        mod mock {
            $(
                #[tokio::test]
                async fn $name() {
                    super::$name($crate::common::mock_page()).await.unwrap();
                }
            )*
        }

        #[cfg(feature = "browser")]
        mod live {
            $(
                #[tokio::test]
                #[ignore = "needs chromium and the demo shop at BASE_URL"]
                async fn $name() {
                    $crate::common::run_live(super::$name).await.unwrap();
                }
            )*
        }
    };
}
