//! Page objects for the demo shop.
//!
//! Each screen gets one type that owns a [`Page`] handle and a fixed set of
//! [`crate::Locator`]s built once at construction. Scenarios talk to the
//! page objects only; locators never leak into test code.
//!
//! ```ignore
//! let login = LoginPage::new(page.clone());
//! login.navigate().await?;
//! login.login_as("johndoe19", "supersecret").await?;
//! login.expect_successful_login("johndoe19").await?;
//! ```

mod checkout;
mod grid;
mod login;
mod search;

pub use checkout::CheckoutPage;
pub use grid::{GridItem, GridPage};
pub use login::LoginPage;
pub use search::SearchPage;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::browser::Page;
use crate::fixtures::Route;
use crate::result::E2eResult;
use crate::wait::LoadState;

/// Capabilities shared by every page object.
///
/// Only [`BasePage::navigate`] has no default: every screen must say how it
/// is reached.
#[async_trait]
pub trait BasePage: Send + Sync {
    /// The page handle this object drives
    fn page(&self) -> &Page;

    /// Go to this screen and wait for it to settle
    async fn navigate(&self) -> E2eResult<()>;

    /// Same as [`BasePage::navigate`]
    async fn goto(&self) -> E2eResult<()> {
        self.navigate().await
    }

    /// Wait until the network has been idle
    async fn wait_for_page_load(&self) -> E2eResult<()> {
        self.page().wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Document title
    async fn page_title(&self) -> E2eResult<String> {
        self.page().title().await
    }

    /// Current URL
    async fn current_url(&self) -> E2eResult<String> {
        self.page().url().await
    }

    /// Write `<screenshot_dir>/<name>.png` and return its path
    async fn take_screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        tracing::debug!(page = self.page_name(), name, "screenshot");
        self.page().screenshot_named(name).await
    }

    /// Name used in logs
    fn page_name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("page")
    }
}

/// Shared body of every `navigate`
async fn open<P: BasePage + ?Sized>(page_object: &P, route: Route) -> E2eResult<()> {
    tracing::debug!(page = page_object.page_name(), %route, "navigate");
    page_object.page().goto(route).await?;
    page_object.wait_for_page_load().await
}
