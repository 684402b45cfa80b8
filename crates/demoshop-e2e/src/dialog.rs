//! Dialog handling (alert, confirm, prompt, beforeunload).
//!
//! Dialogs are routed through a [`DialogHandler`] shared between a driver
//! and the page handle. A test subscribes to the *next* dialog with
//! [`DialogHandler::arm_once`] before triggering it; the subscription
//! accepts the dialog and delivers it over a oneshot channel. Dialogs that
//! arrive with no subscription get the handler's automatic behavior
//! (dismiss by default).

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogType {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// Action taken on a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    /// Dialog was accepted (OK/Yes/Leave)
    Accept,
    /// Dialog was dismissed (Cancel/No/Stay)
    Dismiss,
    /// Dialog is pending (not yet handled)
    Pending,
}

/// A browser dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    dialog_type: DialogType,
    message: String,
    action: DialogAction,
}

impl Dialog {
    /// Create a new, pending dialog
    #[must_use]
    pub fn new(dialog_type: DialogType, message: impl Into<String>) -> Self {
        Self {
            dialog_type,
            message: message.into(),
            action: DialogAction::Pending,
        }
    }

    /// Create an alert dialog
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(DialogType::Alert, message)
    }

    /// Get dialog type
    #[must_use]
    pub const fn dialog_type(&self) -> DialogType {
        self.dialog_type
    }

    /// Get dialog message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get action taken
    #[must_use]
    pub const fn action(&self) -> &DialogAction {
        &self.action
    }

    /// Check if dialog was handled
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        !matches!(self.action, DialogAction::Pending)
    }

    /// Accept the dialog
    pub fn accept(&mut self) {
        self.action = DialogAction::Accept;
    }

    /// Dismiss the dialog
    pub fn dismiss(&mut self) {
        self.action = DialogAction::Dismiss;
    }
}

/// What to do with a dialog nobody subscribed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AutoDialogBehavior {
    /// Accept it
    AcceptAll,
    /// Dismiss it
    #[default]
    DismissAll,
    /// Leave it pending (the page stays blocked)
    Manual,
}

#[derive(Debug, Default)]
struct HandlerState {
    subscriber: Option<oneshot::Sender<Dialog>>,
    history: Vec<Dialog>,
    auto_behavior: AutoDialogBehavior,
}

/// Routes dialogs to a one-shot subscriber or the automatic behavior
#[derive(Debug, Clone, Default)]
pub struct DialogHandler {
    state: Arc<Mutex<HandlerState>>,
}

impl DialogHandler {
    /// Create a new dialog handler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set automatic behavior for unsubscribed dialogs
    pub fn set_auto_behavior(&self, behavior: AutoDialogBehavior) {
        if let Ok(mut state) = self.state.lock() {
            state.auto_behavior = behavior;
        }
    }

    /// Subscribe to the next dialog.
    ///
    /// The subscription accepts the dialog it receives. Arming again
    /// replaces an earlier unfired subscription.
    #[must_use]
    pub fn arm_once(&self) -> DialogWatch {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut state) = self.state.lock() {
            state.subscriber = Some(tx);
        }
        DialogWatch { rx }
    }

    /// Handle an incoming dialog and return it with the action applied
    pub fn handle(&self, mut dialog: Dialog) -> Dialog {
        let Ok(mut state) = self.state.lock() else {
            dialog.dismiss();
            return dialog;
        };

        if let Some(subscriber) = state.subscriber.take() {
            dialog.accept();
            state.history.push(dialog.clone());
            if subscriber.send(dialog.clone()).is_err() {
                tracing::debug!(text = dialog.message(), "dialog subscriber dropped");
            }
            return dialog;
        }

        match state.auto_behavior {
            AutoDialogBehavior::AcceptAll => dialog.accept(),
            AutoDialogBehavior::DismissAll => dialog.dismiss(),
            AutoDialogBehavior::Manual => {}
        }
        tracing::warn!(
            kind = %dialog.dialog_type(),
            text = dialog.message(),
            action = ?dialog.action(),
            "dialog arrived with no subscriber"
        );
        state.history.push(dialog.clone());
        dialog
    }

    /// Get all dialogs encountered
    #[must_use]
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.state
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Check if any dialog was left pending
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.history.iter().any(|d| !d.is_handled()))
            .unwrap_or(false)
    }

    /// Get last dialog
    #[must_use]
    pub fn last_dialog(&self) -> Option<Dialog> {
        self.state.lock().ok().and_then(|s| s.history.last().cloned())
    }
}

/// A single-use subscription to the next dialog
#[derive(Debug)]
pub struct DialogWatch {
    rx: oneshot::Receiver<Dialog>,
}

impl DialogWatch {
    /// Wait for the dialog to arrive, up to `timeout`.
    ///
    /// Returns `None` if nothing arrived in time; absence of a dialog is
    /// not an error here.
    pub async fn arrival(self, timeout: Duration) -> Option<Dialog> {
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(dialog)) => Some(dialog),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}
