//! Browser control for end-to-end tests.
//!
//! [`Page`] is the handle page objects hold. It wraps any [`PageDriver`]
//! and layers Playwright-style semantics on top of the driver primitives:
//!
//! - actions wait until their locator resolves to exactly one visible
//!   element, and fail fast on a strict-mode violation;
//! - soft lookups (`text_content`, `is_visible`, `count`) answer from the
//!   page as it is right now and never wait;
//! - dialogs are captured by subscribing *before* the triggering action.
//!
//! When compiled with the `browser` feature, [`Browser`] launches Chromium
//! over CDP via chromiumoxide and hands out pages backed by a
//! `ChromiumDriver`. Without the feature, pages are built over
//! [`crate::mock::MockDriver`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SuiteConfig;
use crate::dialog::{DialogHandler, DialogWatch};
use crate::driver::{ElementAction, ElementState, PageDriver};
use crate::fixtures::Route;
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, LoadState, Poll, WaitOptions};

/// Cloneable page handle: a driver plus the suite configuration
#[derive(Debug, Clone)]
pub struct Page {
    driver: Arc<dyn PageDriver>,
    config: Arc<SuiteConfig>,
}

impl Page {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: impl PageDriver + 'static, config: SuiteConfig) -> Self {
        Self {
            driver: Arc::new(driver),
            config: Arc::new(config),
        }
    }

    /// Wrap an already shared driver
    #[must_use]
    pub fn from_shared(driver: Arc<dyn PageDriver>, config: Arc<SuiteConfig>) -> Self {
        Self { driver, config }
    }

    /// Suite configuration this page was created with
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Dialog routing for this page
    #[must_use]
    pub fn dialogs(&self) -> &DialogHandler {
        self.driver.dialogs()
    }

    /// Navigate to a screen of the application
    pub async fn goto(&self, route: Route) -> E2eResult<()> {
        self.goto_url(&self.config.url_for(route)).await
    }

    /// Navigate to an absolute URL
    pub async fn goto_url(&self, url: &str) -> E2eResult<()> {
        tracing::debug!(url, "goto");
        self.driver.goto(url).await
    }

    /// Wait for a load state, bounded by the long timeout
    pub async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()> {
        tracing::debug!(%state, "wait for load state");
        self.driver
            .wait_for_load_state(state, self.config.timeouts.long)
            .await
    }

    /// Document title
    pub async fn title(&self) -> E2eResult<String> {
        self.driver.title().await
    }

    /// Current URL
    pub async fn url(&self) -> E2eResult<String> {
        self.driver.url().await
    }

    /// Capture a PNG screenshot to `path`, creating parent directories
    pub async fn screenshot(&self, path: &Path) -> E2eResult<Vec<u8>> {
        let bytes = self.driver.screenshot().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "screenshot written");
        Ok(bytes)
    }

    /// Capture a screenshot into the configured directory as `<name>.png`
    pub async fn screenshot_named(&self, name: &str) -> E2eResult<PathBuf> {
        let path = self.config.screenshot_path(name);
        self.screenshot(&path).await?;
        Ok(path)
    }

    /// Snapshot every element the locator resolves to right now
    pub async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>> {
        self.driver.query(locator).await
    }

    /// Number of elements the locator resolves to right now
    pub async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        Ok(self.driver.query(locator).await?.len())
    }

    /// Text of the single matching element, `None` when nothing matches.
    ///
    /// Does not wait. More than one match is a strict-mode violation.
    pub async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>> {
        let mut found = self.driver.query(locator).await?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop().map(|el| el.text)),
            count => Err(strict_violation(locator, count)),
        }
    }

    /// Text of every matching element, in document order
    pub async fn all_text_contents(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        Ok(self
            .driver
            .query(locator)
            .await?
            .into_iter()
            .map(|el| el.text)
            .collect())
    }

    /// Whether the single matching element is visible; `false` when absent
    pub async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let found = self.driver.query(locator).await?;
        match found.as_slice() {
            [] => Ok(false),
            [el] => Ok(el.visible),
            _ => Err(strict_violation(locator, found.len())),
        }
    }

    /// Checked state of the single matching checkbox, waiting for it to attach
    pub async fn is_checked(&self, locator: &Locator) -> E2eResult<bool> {
        let state = self.resolve_one(locator, false).await?;
        state.checked.ok_or_else(|| E2eError::ActionError {
            locator: locator.description(),
            message: "not a checkbox or radio button".to_string(),
        })
    }

    /// Fill a text control
    pub async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.act(locator, ElementAction::Fill(value.to_string()))
            .await
    }

    /// Click an element
    pub async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.act(locator, ElementAction::Click).await
    }

    /// Ensure a checkbox is checked
    pub async fn check(&self, locator: &Locator) -> E2eResult<()> {
        self.act(locator, ElementAction::SetChecked(true)).await
    }

    /// Ensure a checkbox is unchecked
    pub async fn uncheck(&self, locator: &Locator) -> E2eResult<()> {
        self.act(locator, ElementAction::SetChecked(false)).await
    }

    /// Select an option of a `<select>` by its label
    pub async fn select_option(&self, locator: &Locator, label: &str) -> E2eResult<()> {
        self.act(locator, ElementAction::SelectOption(label.to_string()))
            .await
    }

    /// Subscribe to the next dialog; arm this before the triggering action
    #[must_use]
    pub fn once_dialog(&self) -> DialogWatch {
        self.driver.dialogs().arm_once()
    }

    async fn act(&self, locator: &Locator, action: ElementAction) -> E2eResult<()> {
        self.resolve_one(locator, true).await?;
        tracing::debug!(locator = %locator, %action, "action");
        self.driver.perform(locator, &action).await
    }

    /// Wait until the locator resolves to exactly one element.
    ///
    /// Zero matches keeps waiting until the default timeout; more than one
    /// fails immediately.
    async fn resolve_one(&self, locator: &Locator, visible: bool) -> E2eResult<ElementState> {
        let options = WaitOptions::with_timeout(self.config.timeouts.default);
        poll_until(
            options,
            || async move {
                let mut found = self.driver.query(locator).await?;
                match found.len() {
                    0 => Ok(Poll::Pending("no matching element")),
                    1 => {
                        let state = found.remove(0);
                        if visible && !state.visible {
                            Ok(Poll::Pending("element is not visible"))
                        } else {
                            Ok(Poll::Ready(state))
                        }
                    }
                    count => Err(strict_violation(locator, count)),
                }
            },
            |last, elapsed| E2eError::Timeout {
                what: format!(
                    "{locator} ({})",
                    last.unwrap_or("no matching element")
                ),
                ms: duration_ms(elapsed),
            },
        )
        .await
    }
}

fn strict_violation(locator: &Locator, count: usize) -> E2eError {
    E2eError::StrictModeViolation {
        locator: locator.description(),
        count,
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::wildcard_imports,
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::items_after_statements
)]
mod cdp {
    use super::*;
    use crate::dialog::{Dialog, DialogAction, DialogType};
    use crate::script::{self, ActionOutcome, LoadProbe};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams, DialogType as CdpDialogType,
        EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::time::Instant;
    use tokio::sync::Mutex;

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: Arc<SuiteConfig>,
        inner: Arc<Mutex<CdpBrowser>>,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch Chromium as described by the suite config
        pub async fn launch(config: SuiteConfig) -> E2eResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|e| E2eError::BrowserLaunchError { message: e })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                E2eError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config: Arc::new(config),
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a new page
        pub async fn new_page(&self) -> E2eResult<Page> {
            let browser = self.inner.lock().await;
            let cdp_page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| E2eError::PageError {
                    message: e.to_string(),
                })?;
            let driver = ChromiumDriver::attach(cdp_page).await?;
            Ok(Page::from_shared(Arc::new(driver), Arc::clone(&self.config)))
        }

        /// Get the suite configuration
        #[must_use]
        pub fn config(&self) -> &SuiteConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> E2eResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| E2eError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            Ok(())
        }
    }

    /// [`PageDriver`] over a chromiumoxide page
    #[derive(Debug)]
    pub struct ChromiumDriver {
        page: CdpPage,
        dialogs: DialogHandler,
        dialog_task: tokio::task::JoinHandle<()>,
    }

    impl ChromiumDriver {
        /// Take over a CDP page and start answering its dialogs
        pub async fn attach(page: CdpPage) -> E2eResult<Self> {
            let mut events = page
                .event_listener::<EventJavascriptDialogOpening>()
                .await
                .map_err(page_error)?;
            let dialogs = DialogHandler::new();
            let handler = dialogs.clone();
            let responder = page.clone();

            let dialog_task = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let kind = match event.r#type {
                        CdpDialogType::Alert => DialogType::Alert,
                        CdpDialogType::Confirm => DialogType::Confirm,
                        CdpDialogType::Prompt => DialogType::Prompt,
                        _ => DialogType::BeforeUnload,
                    };
                    let dialog = handler.handle(Dialog::new(kind, event.message.clone()));
                    let accept = match dialog.action() {
                        DialogAction::Accept => true,
                        DialogAction::Dismiss => false,
                        DialogAction::Pending => continue,
                    };
                    if let Err(e) = responder
                        .execute(HandleJavaScriptDialogParams::new(accept))
                        .await
                    {
                        tracing::warn!(error = %e, "failed to answer dialog");
                    }
                }
            });

            Ok(Self {
                page,
                dialogs,
                dialog_task,
            })
        }

        async fn evaluate<T: serde::de::DeserializeOwned>(&self, expr: &str) -> E2eResult<T> {
            let result = self.page.evaluate(expr).await.map_err(page_error)?;
            result.into_value().map_err(page_error)
        }

        async fn click_at(&self, locator: &Locator, x: f64, y: f64) -> E2eResult<()> {
            let input_error = |message: String| E2eError::ActionError {
                locator: locator.description(),
                message,
            };
            let sequence = [
                (DispatchMouseEventType::MouseMoved, false),
                (DispatchMouseEventType::MousePressed, true),
                (DispatchMouseEventType::MouseReleased, true),
            ];
            for (kind, with_button) in sequence {
                let mut builder = DispatchMouseEventParams::builder().r#type(kind).x(x).y(y);
                if with_button {
                    builder = builder.button(MouseButton::Left).click_count(1);
                }
                let params = builder.build().map_err(input_error)?;
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| input_error(e.to_string()))?;
            }
            Ok(())
        }
    }

    impl Drop for ChromiumDriver {
        fn drop(&mut self) {
            self.dialog_task.abort();
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn goto(&self, url: &str) -> E2eResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| E2eError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()> {
            let idle = Duration::from_millis(crate::wait::NETWORK_IDLE_THRESHOLD_MS);
            let interval = Duration::from_millis(crate::wait::DEFAULT_POLL_INTERVAL_MS);
            let start = Instant::now();
            let mut resources = None;
            let mut quiet_since = Instant::now();
            loop {
                let probe: LoadProbe = self.evaluate(script::LOAD_STATE_PROBE).await?;
                if resources != Some(probe.resources) {
                    resources = Some(probe.resources);
                    quiet_since = Instant::now();
                }
                let reached = match state {
                    LoadState::DomContentLoaded => probe.ready != "loading",
                    LoadState::Load => probe.ready == "complete",
                    LoadState::NetworkIdle => {
                        probe.ready == "complete" && quiet_since.elapsed() >= idle
                    }
                };
                if reached {
                    return Ok(());
                }
                if start.elapsed() >= timeout {
                    return Err(E2eError::Timeout {
                        what: format!("load state '{state}'"),
                        ms: duration_ms(start.elapsed()),
                    });
                }
                tokio::time::sleep(interval).await;
            }
        }

        async fn title(&self) -> E2eResult<String> {
            Ok(self
                .page
                .get_title()
                .await
                .map_err(page_error)?
                .unwrap_or_default())
        }

        async fn url(&self) -> E2eResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(page_error)?
                .unwrap_or_default())
        }

        async fn screenshot(&self) -> E2eResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot =
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| E2eError::ScreenshotError {
                        message: e.to_string(),
                    })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| E2eError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>> {
            self.evaluate(&script::query_script(locator)?).await
        }

        async fn perform(&self, locator: &Locator, action: &ElementAction) -> E2eResult<()> {
            let outcome: ActionOutcome =
                self.evaluate(&script::action_script(locator, action)?).await?;
            match outcome.count {
                0 => {
                    return Err(E2eError::ActionError {
                        locator: locator.description(),
                        message: "element detached before the action".to_string(),
                    })
                }
                1 => {}
                count => return Err(strict_violation(locator, count)),
            }
            if let Some(message) = outcome.error {
                return Err(E2eError::ActionError {
                    locator: locator.description(),
                    message,
                });
            }
            if let Some(point) = outcome.click {
                self.click_at(locator, point.x, point.y).await?;
            }
            Ok(())
        }

        fn dialogs(&self) -> &DialogHandler {
            &self.dialogs
        }
    }

    fn page_error(e: impl std::fmt::Display) -> E2eError {
        E2eError::PageError {
            message: e.to_string(),
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, ChromiumDriver};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Role;
    use crate::mock::MockDriver;

    mod resolution_tests {
        use super::*;

        #[tokio::test]
        async fn test_text_content_absent_is_none() {
            let page = Page::new(MockDriver::default(), SuiteConfig::default());
            page.goto(Route::Login).await.unwrap();
            let missing = Locator::css("#does-not-exist");
            assert_eq!(page.text_content(&missing).await.unwrap(), None);
            assert!(!page.is_visible(&missing).await.unwrap());
            assert_eq!(page.count(&missing).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_click_ambiguous_locator_is_strict_violation() {
            let page = Page::new(MockDriver::default(), SuiteConfig::default());
            page.goto(Route::Grid).await.unwrap();
            let err = page
                .click(&Locator::role(Role::Button).with_name("Add to Order"))
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::StrictModeViolation { count: 9, .. }));
        }

        #[tokio::test]
        async fn test_click_missing_element_times_out() {
            let config = SuiteConfig::default().with_timeouts(crate::config::Timeouts {
                default: Duration::from_millis(40),
                long: Duration::from_millis(40),
                short: Duration::from_millis(20),
            });
            let page = Page::new(MockDriver::default(), config);
            page.goto(Route::Login).await.unwrap();
            let err = page.click(&Locator::css("#nope")).await.unwrap_err();
            assert!(matches!(err, E2eError::Timeout { .. }));
            assert!(err.to_string().contains("#nope"));
        }
    }

    mod screenshot_tests {
        use super::*;

        #[tokio::test]
        async fn test_screenshot_creates_directory() {
            let dir = tempfile::tempdir().unwrap();
            let config = SuiteConfig::default().with_screenshot_dir(dir.path().join("shots"));
            let page = Page::new(MockDriver::default(), config);
            page.goto(Route::Login).await.unwrap();

            let path = page.screenshot_named("login").await.unwrap();
            assert_eq!(path, dir.path().join("shots").join("login.png"));
            let bytes = std::fs::read(&path).unwrap();
            assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        }

        #[tokio::test]
        async fn test_screenshot_into_file_path_fails_with_io() {
            let dir = tempfile::tempdir().unwrap();
            let blocker = dir.path().join("blocker");
            std::fs::write(&blocker, b"not a directory").unwrap();
            let config = SuiteConfig::default().with_screenshot_dir(&blocker);
            let page = Page::new(MockDriver::default(), config);
            page.goto(Route::Login).await.unwrap();

            let err = page.screenshot_named("x").await.unwrap_err();
            assert!(matches!(err, E2eError::Io(_)));
        }
    }

    mod dialog_tests {
        use super::*;

        #[tokio::test]
        async fn test_unsubscribed_dialog_is_dismissed() {
            let page = Page::new(MockDriver::default(), SuiteConfig::default());
            page.goto(Route::Checkout).await.unwrap();
            page.uncheck(&Locator::role(Role::Checkbox).with_name("Shipping address same as billing"))
                .await
                .unwrap();
            page.click(&Locator::role(Role::Button).with_name("Continue to checkout"))
                .await
                .unwrap();
            let last = page.dialogs().last_dialog().unwrap();
            assert_eq!(last.action(), &crate::dialog::DialogAction::Dismiss);
        }
    }
}
