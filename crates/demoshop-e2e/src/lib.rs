//! demoshop-e2e: page-object end-to-end suite for the demo shop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  tests/*_spec.rs          scenarios                             │
//! │        │                                                        │
//! │        ▼                                                        │
//! │  pages::{Login,Grid,Search,Checkout}Page   (BasePage)           │
//! │        │            locators + intent-revealing methods         │
//! │        ▼                                                        │
//! │  Page  ── auto-wait, strictness, dialogs, expect()              │
//! │        │                                                        │
//! │        ▼                                                        │
//! │  PageDriver ──► ChromiumDriver (feature "browser", CDP)         │
//! │             └─► MockDriver     (in-memory storefront)           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod browser;
pub mod cart;
pub mod config;
pub mod dialog;
mod driver;
mod expect;
pub mod fixtures;
mod locator;
pub mod logging;
pub mod mock;
pub mod pages;
mod result;
#[cfg(any(feature = "browser", test))]
mod script;
mod wait;

pub use browser::Page;
#[cfg(feature = "browser")]
pub use browser::{Browser, ChromiumDriver};
pub use config::{SuiteConfig, Timeouts};
pub use dialog::{AutoDialogBehavior, Dialog, DialogAction, DialogHandler, DialogType, DialogWatch};
pub use driver::{ElementAction, ElementState, PageDriver};
pub use expect::{expect, expect_page, Expect, ExpectAssertion, ExpectPage};
pub use locator::{normalize_whitespace, Locator, Role, Selector, Step, TextMatch};
pub use result::{E2eError, E2eResult};
pub use wait::{poll_until, LoadState, Poll, WaitOptions};

/// Everything a scenario needs
pub mod prelude {
    pub use super::cart::*;
    pub use super::config::*;
    pub use super::dialog::*;
    pub use super::expect::*;
    pub use super::fixtures::*;
    pub use super::locator::*;
    pub use super::logging::{init as init_logging, step};
    pub use super::mock::{DemoStorefront, MockDriver, Product};
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::wait::LoadState;
    pub use super::{ElementAction, ElementState, Page, PageDriver};
    #[cfg(feature = "browser")]
    pub use super::{Browser, ChromiumDriver};
}
