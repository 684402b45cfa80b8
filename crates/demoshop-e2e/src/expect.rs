//! Web-first assertions (Playwright's `expect()`).
//!
//! ```ignore
//! expect(&page, &welcome).to_be_visible().await?;
//! expect(&page, &results).to_contain_text("Found one result for automation").await?;
//! expect_page(&page).to_have_url(".*/home").await?;
//! ```
//!
//! Every assertion re-queries the page until it holds or the page's
//! default timeout runs out. Failures name the locator and report what was
//! last observed.

use regex::Regex;
use std::time::Duration;

use crate::browser::{duration_ms, Page};
use crate::driver::ElementState;
use crate::locator::{normalize_whitespace, Locator};
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, Poll, WaitOptions};

/// Assertion types for `expect()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectAssertion {
    /// Element is visible
    IsVisible,
    /// Element is absent or hidden
    IsHidden,
    /// Element text equals, after whitespace normalization
    HasText(String),
    /// Element text contains, after whitespace normalization
    ContainsText(String),
    /// Checkbox is in this state
    IsChecked(bool),
    /// Locator resolves to this many elements
    HasCount(usize),
}

impl std::fmt::Display for ExpectAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IsVisible => f.write_str("to be visible"),
            Self::IsHidden => f.write_str("to be hidden"),
            Self::HasText(text) => write!(f, "to have text {text:?}"),
            Self::ContainsText(text) => write!(f, "to contain text {text:?}"),
            Self::IsChecked(true) => f.write_str("to be checked"),
            Self::IsChecked(false) => f.write_str("not to be checked"),
            Self::HasCount(n) => write!(f, "to have count {n}"),
        }
    }
}

impl ExpectAssertion {
    /// Check the assertion against one query result.
    ///
    /// `Ok(Err(observed))` means "not yet", with what was seen instead.
    /// `Err` is a strict-mode violation for single-element assertions.
    pub fn evaluate(
        &self,
        locator: &Locator,
        found: &[ElementState],
    ) -> E2eResult<Result<(), String>> {
        if let Self::HasCount(expected) = self {
            return Ok(if found.len() == *expected {
                Ok(())
            } else {
                Err(format!("{} elements", found.len()))
            });
        }

        let el = match found {
            [] => {
                return Ok(if *self == Self::IsHidden {
                    Ok(())
                } else {
                    Err("no matching element".to_string())
                })
            }
            [el] => el,
            _ => {
                return Err(E2eError::StrictModeViolation {
                    locator: locator.description(),
                    count: found.len(),
                })
            }
        };

        let text = normalize_whitespace(&el.text);
        Ok(match self {
            Self::IsVisible if el.visible => Ok(()),
            Self::IsVisible => Err("hidden".to_string()),
            Self::IsHidden if !el.visible => Ok(()),
            Self::IsHidden => Err("visible".to_string()),
            Self::HasText(expected) if text == normalize_whitespace(expected) => Ok(()),
            Self::ContainsText(expected) if text.contains(&normalize_whitespace(expected)) => {
                Ok(())
            }
            Self::HasText(_) | Self::ContainsText(_) => Err(format!("{text:?}")),
            Self::IsChecked(expected) => match el.checked {
                Some(actual) if actual == *expected => Ok(()),
                Some(actual) => Err(if actual { "checked" } else { "unchecked" }.to_string()),
                None => Err("not a checkbox".to_string()),
            },
            Self::HasCount(_) => Ok(()),
        })
    }
}

/// Smart assertion builder for a locator
#[derive(Debug, Clone)]
pub struct Expect<'a> {
    page: &'a Page,
    locator: Locator,
    timeout: Duration,
}

/// Create an expectation for a locator on a page
#[must_use]
pub fn expect<'a>(page: &'a Page, locator: &Locator) -> Expect<'a> {
    Expect {
        page,
        locator: locator.clone(),
        timeout: page.config().timeouts.default,
    }
}

impl Expect<'_> {
    /// Override the polling timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Assert the element is visible
    pub async fn to_be_visible(&self) -> E2eResult<()> {
        self.assert(ExpectAssertion::IsVisible).await
    }

    /// Assert the element is absent or hidden
    pub async fn to_be_hidden(&self) -> E2eResult<()> {
        self.assert(ExpectAssertion::IsHidden).await
    }

    /// Assert the element has exactly this text
    pub async fn to_have_text(&self, expected: impl Into<String>) -> E2eResult<()> {
        self.assert(ExpectAssertion::HasText(expected.into())).await
    }

    /// Assert the element contains this text
    pub async fn to_contain_text(&self, expected: impl Into<String>) -> E2eResult<()> {
        self.assert(ExpectAssertion::ContainsText(expected.into()))
            .await
    }

    /// Assert the checkbox is checked
    pub async fn to_be_checked(&self) -> E2eResult<()> {
        self.assert(ExpectAssertion::IsChecked(true)).await
    }

    /// Assert the checkbox is unchecked
    pub async fn not_to_be_checked(&self) -> E2eResult<()> {
        self.assert(ExpectAssertion::IsChecked(false)).await
    }

    /// Assert the locator resolves to `count` elements
    pub async fn to_have_count(&self, count: usize) -> E2eResult<()> {
        self.assert(ExpectAssertion::HasCount(count)).await
    }

    async fn assert(&self, assertion: ExpectAssertion) -> E2eResult<()> {
        let locator = &self.locator;
        let page = self.page;
        let check = &assertion;
        poll_until(
            WaitOptions::with_timeout(self.timeout),
            || async move {
                let found = page.query(locator).await?;
                Ok(match check.evaluate(locator, &found)? {
                    Ok(()) => Poll::Ready(()),
                    Err(observed) => Poll::Pending(observed),
                })
            },
            |last, elapsed| {
                E2eError::assertion(format!(
                    "expected {locator} {assertion}, got {} after {}ms",
                    last.unwrap_or_default(),
                    duration_ms(elapsed)
                ))
            },
        )
        .await
    }
}

/// Page-level assertions
#[derive(Debug, Clone, Copy)]
pub struct ExpectPage<'a> {
    page: &'a Page,
    timeout: Duration,
}

/// Create an expectation for the page itself
#[must_use]
pub fn expect_page(page: &Page) -> ExpectPage<'_> {
    ExpectPage {
        page,
        timeout: page.config().timeouts.default,
    }
}

impl ExpectPage<'_> {
    /// Override the polling timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Assert the URL matches a regular expression
    pub async fn to_have_url(&self, pattern: &str) -> E2eResult<()> {
        self.url_matches(pattern, true).await
    }

    /// Assert the URL does not match a regular expression
    pub async fn not_to_have_url(&self, pattern: &str) -> E2eResult<()> {
        self.url_matches(pattern, false).await
    }

    async fn url_matches(&self, pattern: &str, wanted: bool) -> E2eResult<()> {
        let regex = Regex::new(pattern).map_err(|e| E2eError::ConfigError {
            message: format!("invalid URL pattern '{pattern}': {e}"),
        })?;
        let page = self.page;
        let regex = &regex;
        poll_until(
            WaitOptions::with_timeout(self.timeout),
            || async move {
                let url = page.url().await?;
                Ok(if regex.is_match(&url) == wanted {
                    Poll::Ready(())
                } else {
                    Poll::Pending(url)
                })
            },
            |last, elapsed| {
                let relation = if wanted { "to match" } else { "not to match" };
                E2eError::assertion(format!(
                    "expected URL {relation} /{pattern}/, got {:?} after {}ms",
                    last.unwrap_or_default(),
                    duration_ms(elapsed)
                ))
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SuiteConfig, Timeouts};
    use crate::fixtures::Route;
    use crate::locator::Role;
    use crate::mock::MockDriver;

    fn state(text: &str, visible: bool) -> ElementState {
        ElementState {
            text: text.to_string(),
            visible,
            ..ElementState::default()
        }
    }

    fn quick_page() -> Page {
        let config = SuiteConfig::default().with_timeouts(Timeouts {
            default: Duration::from_millis(60),
            long: Duration::from_millis(60),
            short: Duration::from_millis(30),
        });
        Page::new(MockDriver::default(), config)
    }

    mod evaluate_tests {
        use super::*;

        #[test]
        fn test_contains_text_normalizes_whitespace() {
            let loc = Locator::css("p");
            let found = [state("  Found one result\n  for automation ", true)];
            let check = ExpectAssertion::ContainsText("one result for automation".into());
            assert_eq!(check.evaluate(&loc, &found).unwrap(), Ok(()));
        }

        #[test]
        fn test_has_text_reports_actual() {
            let loc = Locator::css("p");
            let found = [state("Total $30", true)];
            let observed = ExpectAssertion::HasText("Total $31".into())
                .evaluate(&loc, &found)
                .unwrap()
                .unwrap_err();
            assert_eq!(observed, "\"Total $30\"");
        }

        #[test]
        fn test_hidden_accepts_absence() {
            let loc = Locator::css("p");
            assert_eq!(
                ExpectAssertion::IsHidden.evaluate(&loc, &[]).unwrap(),
                Ok(())
            );
            assert!(ExpectAssertion::IsVisible
                .evaluate(&loc, &[])
                .unwrap()
                .is_err());
        }

        #[test]
        fn test_multiple_matches_is_strict_violation() {
            let loc = Locator::css("p");
            let found = [state("a", true), state("b", true)];
            let err = ExpectAssertion::IsVisible
                .evaluate(&loc, &found)
                .unwrap_err();
            assert!(matches!(err, E2eError::StrictModeViolation { count: 2, .. }));
            assert_eq!(
                ExpectAssertion::HasCount(2).evaluate(&loc, &found).unwrap(),
                Ok(())
            );
        }

        #[test]
        fn test_checked_on_non_checkbox() {
            let loc = Locator::css("p");
            let observed = ExpectAssertion::IsChecked(true)
                .evaluate(&loc, &[state("x", true)])
                .unwrap()
                .unwrap_err();
            assert_eq!(observed, "not a checkbox");
        }
    }

    mod polling_tests {
        use super::*;

        #[tokio::test]
        async fn test_visible_heading_passes() {
            let page = quick_page();
            page.goto(Route::Login).await.unwrap();
            let button = Locator::role(Role::Button).with_name("Sign In");
            expect(&page, &button).to_be_visible().await.unwrap();
        }

        #[tokio::test]
        async fn test_failure_names_locator() {
            let page = quick_page();
            page.goto(Route::Login).await.unwrap();
            let heading = Locator::role(Role::Heading).with_name("Welcome!");
            let err = expect(&page, &heading).to_be_visible().await.unwrap_err();
            assert!(err.is_assertion());
            let message = err.to_string();
            assert!(message.contains("Welcome!"), "{message}");
            assert!(message.contains("no matching element"), "{message}");
        }

        #[tokio::test]
        async fn test_url_assertions() {
            let page = quick_page();
            page.goto(Route::Search).await.unwrap();
            expect_page(&page).to_have_url(".*/search").await.unwrap();
            expect_page(&page).not_to_have_url(".*/home").await.unwrap();
            let err = expect_page(&page).to_have_url(".*/home").await.unwrap_err();
            assert!(err.to_string().contains("/search"));
        }

        #[tokio::test]
        async fn test_invalid_url_pattern_is_config_error() {
            let page = quick_page();
            let err = expect_page(&page).to_have_url("(").await.unwrap_err();
            assert!(matches!(err, E2eError::ConfigError { .. }));
        }
    }
}
