//! PageDriver - abstract browser automation trait.
//!
//! Page objects never talk to a browser directly. They go through a
//! [`crate::Page`] handle, which adds auto-waiting and strictness on top of
//! the primitives below. Two implementations exist:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (object-safe async trait)                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────┐  ┌──────────────────────────┐  │
//! │  │  ChromiumDriver          │  │  MockDriver              │  │
//! │  │  feature = "browser"     │  │  always available        │  │
//! │  │  CDP via chromiumoxide   │  │  in-memory storefront    │  │
//! │  └──────────────────────────┘  └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::dialog::DialogHandler;
use crate::locator::Locator;
use crate::result::E2eResult;
use crate::wait::LoadState;

/// Snapshot of one matched element, taken at query time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Raw text content
    pub text: String,
    /// Rendered and not hidden
    pub visible: bool,
    /// Checked state for checkboxes/radios, `None` for other elements
    pub checked: Option<bool>,
    /// Current value for form controls
    pub value: Option<String>,
}

/// Actions applied to exactly one resolved element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ElementAction {
    /// Replace the control's value
    Fill(String),
    /// Click the element
    Click,
    /// Select an `<option>` by its label
    SelectOption(String),
    /// Click a checkbox if its state differs from the target
    SetChecked(bool),
}

impl std::fmt::Display for ElementAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fill(text) => write!(f, "fill({text:?})"),
            Self::Click => f.write_str("click()"),
            Self::SelectOption(label) => write!(f, "selectOption({label:?})"),
            Self::SetChecked(true) => f.write_str("check()"),
            Self::SetChecked(false) => f.write_str("uncheck()"),
        }
    }
}

/// Abstract driver trait for browser automation.
///
/// Primitives do not wait: [`PageDriver::query`] reports what is on the page
/// right now, and [`PageDriver::perform`] fails unless the locator resolves
/// to exactly one element at call time. Waiting is layered on top by
/// [`crate::Page`].
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Wait for a load state
    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()>;

    /// Document title
    async fn title(&self) -> E2eResult<String>;

    /// Current URL
    async fn url(&self) -> E2eResult<String>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    /// Snapshot every element the locator currently resolves to
    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>>;

    /// Apply an action to the single element the locator resolves to
    async fn perform(&self, locator: &Locator, action: &ElementAction) -> E2eResult<()>;

    /// Dialog routing for this page
    fn dialogs(&self) -> &DialogHandler;
}
