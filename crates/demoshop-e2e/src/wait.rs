//! Wait mechanisms: load states and bounded polling.
//!
//! Every auto-wait in the suite (actions resolving their target,
//! `expect` assertions, load-state barriers) goes through [`poll_until`],
//! which re-evaluates a probe until it yields a value or the deadline passes.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::result::{E2eError, E2eResult};

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// The `load` event fired
    #[default]
    Load,
    /// `DOMContentLoaded` fired
    DomContentLoaded,
    /// No network requests for [`NETWORK_IDLE_THRESHOLD_MS`]
    NetworkIdle,
}

impl LoadState {
    /// Event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Options for a polling wait
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Give up after this long
    pub timeout: Duration,
    /// Pause between probes
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(crate::fixtures::timeouts::DEFAULT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Options with a specific timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Set polling interval
    #[must_use]
    pub const fn poll_every(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Outcome of a single probe
#[derive(Debug)]
pub enum Poll<T, L> {
    /// Condition satisfied
    Ready(T),
    /// Not yet; `L` is the last observation, reported on timeout
    Pending(L),
}

/// Re-run `probe` until it returns [`Poll::Ready`] or the timeout elapses.
///
/// The probe runs at least once. Errors from the probe abort the wait
/// immediately. On timeout, `on_timeout` receives the last pending
/// observation and builds the error to return.
pub async fn poll_until<T, L, F, Fut, E>(
    options: WaitOptions,
    mut probe: F,
    on_timeout: E,
) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Poll<T, L>>>,
    E: FnOnce(Option<L>, Duration) -> E2eError,
{
    let start = Instant::now();
    let mut last = None;
    loop {
        match probe().await? {
            Poll::Ready(value) => return Ok(value),
            Poll::Pending(observed) => last = Some(observed),
        }
        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            return Err(on_timeout(last, elapsed));
        }
        let remaining = options.timeout - elapsed;
        tokio::time::sleep(options.poll_interval.min(remaining)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_load_state_names() {
        assert_eq!(LoadState::NetworkIdle.to_string(), "networkidle");
        assert_eq!(LoadState::DomContentLoaded.event_name(), "domcontentloaded");
        assert_eq!(LoadState::default(), LoadState::Load);
    }

    #[tokio::test]
    async fn test_poll_until_ready_after_retries() {
        let calls = AtomicUsize::new(0);
        let options = WaitOptions::with_timeout(Duration::from_secs(2))
            .poll_every(Duration::from_millis(1));
        let value = poll_until(
            options,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Ok(if n >= 3 {
                        Poll::Ready(n)
                    } else {
                        Poll::Pending(n)
                    })
                }
            },
            |_, _| E2eError::assertion("unreachable"),
        )
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out_with_last_observation() {
        let options = WaitOptions::with_timeout(Duration::from_millis(30))
            .poll_every(Duration::from_millis(5));
        let err = poll_until(
            options,
            || async { Ok(Poll::<(), _>::Pending("still hidden")) },
            |last, _| E2eError::assertion(format!("last: {}", last.unwrap_or("none"))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: last: still hidden");
    }

    #[tokio::test]
    async fn test_poll_until_check_error_aborts() {
        let calls = AtomicUsize::new(0);
        let err = poll_until(
            WaitOptions::default(),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<Poll<(), ()>, _>(E2eError::PageError {
                        message: "detached".to_string(),
                    })
                }
            },
            |_, _| E2eError::assertion("unreachable"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, E2eError::PageError { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poll_until_zero_timeout_checks_once() {
        let calls = AtomicUsize::new(0);
        let result = poll_until(
            WaitOptions::with_timeout(Duration::ZERO),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Poll::<(), ()>::Pending(())) }
            },
            |_, elapsed| E2eError::Timeout {
                what: "nothing".to_string(),
                ms: elapsed.as_millis() as u64,
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
