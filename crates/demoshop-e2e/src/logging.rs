//! Tracing setup and named scenario steps.

use std::future::Future;
use std::time::Instant;

use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use crate::browser::duration_ms;
use crate::result::E2eResult;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "demoshop_e2e=info";

/// Output format of the test log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init() {
    init_with(LogFormat::default());
}

/// Install a subscriber with an explicit format
pub fn init_with(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false);
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // a subscriber from an earlier test is fine
    drop(installed);
}

/// Run one named step of a scenario inside an `info` span, logging the
/// outcome and elapsed time.
pub async fn step<T, F>(title: &str, fut: F) -> E2eResult<T>
where
    F: Future<Output = E2eResult<T>>,
{
    let span = tracing::info_span!("step", title);
    async move {
        let start = Instant::now();
        let result = fut.await;
        let elapsed_ms = duration_ms(start.elapsed());
        match &result {
            Ok(_) => tracing::info!(elapsed_ms, "step passed"),
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "step failed"),
        }
        result
    }
    .instrument(span)
    .await
}
