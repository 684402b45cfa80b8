//! [`PageDriver`] over the in-memory storefront.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::dom::{Dom, Node};
use super::storefront::{DemoStorefront, Reaction, Screen};
use crate::dialog::DialogHandler;
use crate::driver::{ElementAction, ElementState, PageDriver};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::wait::LoadState;

const SCREENSHOT_WIDTH: u32 = 320;
const SCREENSHOT_HEIGHT: u32 = 200;

#[derive(Debug)]
struct State {
    url: String,
    screen: Option<Screen>,
    dom: Dom,
    call_history: Vec<String>,
}

/// Mock driver for running page objects without a browser.
///
/// Navigation renders the matching storefront screen; clicks on buttons
/// run the storefront's reaction, which may re-render the page or raise a
/// dialog through the shared [`DialogHandler`].
#[derive(Debug)]
pub struct MockDriver {
    storefront: DemoStorefront,
    state: Mutex<State>,
    dialogs: DialogHandler,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new(DemoStorefront::default())
    }
}

impl MockDriver {
    /// Create a driver serving `storefront`, starting on a blank page
    #[must_use]
    pub fn new(storefront: DemoStorefront) -> Self {
        Self {
            storefront,
            state: Mutex::new(State {
                url: "about:blank".to_string(),
                screen: None,
                dom: Dom::new(Node::new("body")),
                call_history: Vec::new(),
            }),
            dialogs: DialogHandler::new(),
        }
    }

    /// Storefront this driver serves
    #[must_use]
    pub const fn storefront(&self) -> &DemoStorefront {
        &self.storefront
    }

    /// Screen currently shown, `None` before the first navigation
    #[must_use]
    pub fn screen(&self) -> Option<Screen> {
        self.lock().ok().and_then(|s| s.screen.clone())
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock()
            .map(|s| s.call_history.clone())
            .unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock()
            .is_ok_and(|s| s.call_history.iter().any(|c| c.starts_with(method)))
    }

    fn lock(&self) -> E2eResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| E2eError::PageError {
            message: "mock page state poisoned".to_string(),
        })
    }

    fn show(&self, state: &mut State, screen: Screen) {
        let origin = origin_of(&state.url).to_string();
        state.url = format!("{origin}{}", screen.path());
        state.dom = self.storefront.render(&screen);
        state.screen = Some(screen);
    }

    fn resolve_one(dom: &Dom, locator: &Locator) -> E2eResult<super::dom::NodeId> {
        let found = dom.resolve(locator).map_err(|message| E2eError::PageError { message })?;
        match found.as_slice() {
            [node] => Ok(*node),
            [] => Err(action_error(locator, "no matching element")),
            _ => Err(E2eError::StrictModeViolation {
                locator: locator.description(),
                count: found.len(),
            }),
        }
    }
}

/// `scheme://host[:port]` part of a URL, empty when there is none
fn origin_of(url: &str) -> &str {
    let Some(scheme_end) = url.find("://") else {
        return "";
    };
    let host_start = scheme_end + 3;
    let end = url[host_start..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |offset| host_start + offset);
    &url[..end]
}

fn path_of(url: &str) -> &str {
    let path = &url[origin_of(url).len()..];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

fn action_error(locator: &Locator, message: impl Into<String>) -> E2eError {
    E2eError::ActionError {
        locator: locator.description(),
        message: message.into(),
    }
}

/// Flat-color PNG; the color is derived from the page title so screens
/// differ from one another
fn encode_screenshot(title: &str) -> E2eResult<Vec<u8>> {
    let seed = title
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let [r, g, b, _] = seed.to_le_bytes();
    let pixel = [r, g, b, 0xff];
    let rgba: Vec<u8> = pixel
        .iter()
        .copied()
        .cycle()
        .take((SCREENSHOT_WIDTH * SCREENSHOT_HEIGHT * 4) as usize)
        .collect();

    let mut output = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut output, SCREENSHOT_WIDTH, SCREENSHOT_HEIGHT);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| E2eError::ScreenshotError {
                message: format!("Failed to write PNG header: {e}"),
            })?;

        writer
            .write_image_data(&rgba)
            .map_err(|e| E2eError::ScreenshotError {
                message: format!("Failed to write PNG data: {e}"),
            })?;
    }
    Ok(output)
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.lock()?;
        state.call_history.push(format!("goto:{url}"));
        let screen = self.storefront.screen_for(path_of(url));
        state.dom = self.storefront.render(&screen);
        state.url = url.to_string();
        state.screen = Some(screen);
        Ok(())
    }

    async fn wait_for_load_state(&self, state: LoadState, _timeout: Duration) -> E2eResult<()> {
        self.lock()?
            .call_history
            .push(format!("wait_for_load_state:{state}"));
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        let state = self.lock()?;
        Ok(state
            .screen
            .as_ref()
            .map(Screen::title)
            .unwrap_or_default())
    }

    async fn url(&self) -> E2eResult<String> {
        Ok(self.lock()?.url.clone())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let title = {
            let mut state = self.lock()?;
            state.call_history.push("screenshot".to_string());
            state
                .screen
                .as_ref()
                .map(Screen::title)
                .unwrap_or_default()
        };
        encode_screenshot(&title)
    }

    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>> {
        let state = self.lock()?;
        let found = state
            .dom
            .resolve(locator)
            .map_err(|message| E2eError::PageError { message })?;
        Ok(found.into_iter().map(|n| state.dom.snapshot(n)).collect())
    }

    async fn perform(&self, locator: &Locator, action: &ElementAction) -> E2eResult<()> {
        let reaction = {
            let mut state = self.lock()?;
            state
                .call_history
                .push(format!("perform:{}:{action}", locator.selector_chain()));
            let node = Self::resolve_one(&state.dom, locator)?;
            let dom = &mut state.dom;
            match action {
                ElementAction::Fill(value) => {
                    dom.fill(node, value).map_err(|m| action_error(locator, m))?;
                    Reaction::Nothing
                }
                ElementAction::SelectOption(label) => {
                    dom.select_option(node, label)
                        .map_err(|m| action_error(locator, m))?;
                    Reaction::Nothing
                }
                ElementAction::SetChecked(wanted) => {
                    match dom.snapshot(node).checked {
                        None => return Err(action_error(locator, "not a checkbox or radio button")),
                        Some(current) if current != *wanted => {
                            dom.toggle(node).map_err(|m| action_error(locator, m))?;
                        }
                        Some(_) => {}
                    }
                    Reaction::Nothing
                }
                ElementAction::Click => {
                    if let Some(trigger) = dom.trigger(node) {
                        self.storefront.react(trigger, dom)
                    } else {
                        // clicking a checkbox flips it; other clicks are inert
                        if dom.snapshot(node).checked.is_some() {
                            dom.toggle(node).map_err(|m| action_error(locator, m))?;
                        }
                        Reaction::Nothing
                    }
                }
            }
        };

        match reaction {
            Reaction::Nothing => {}
            Reaction::Show(screen) => {
                tracing::debug!(path = %screen.path(), "storefront navigated");
                let mut state = self.lock()?;
                self.show(&mut state, screen);
            }
            Reaction::Dialog(dialog) => {
                let handled = self.dialogs.handle(dialog);
                tracing::debug!(action = ?handled.action(), "storefront raised a dialog");
            }
        }
        Ok(())
    }

    fn dialogs(&self) -> &DialogHandler {
        &self.dialogs
    }
}
