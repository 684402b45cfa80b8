//! Outcome of a scenario run once the browser has been torn down

mod common;

use common::finish;
use demoshop_e2e::prelude::*;

fn close_failed() -> E2eResult<()> {
    Err(E2eError::PageError {
        message: "websocket closed".to_string(),
    })
}

#[test]
fn test_scenario_error_outranks_close_error() {
    let err = finish(Err(E2eError::assertion("total mismatch")), close_failed()).unwrap_err();
    assert!(err.is_assertion());
    assert_eq!(err.to_string(), "Assertion failed: total mismatch");
}

#[test]
fn test_close_error_surfaces_after_passing_scenario() {
    let err = finish(Ok(()), close_failed()).unwrap_err();
    assert_eq!(err.to_string(), "Page error: websocket closed");
}

#[test]
fn test_clean_run() {
    finish(Ok(()), Ok(())).unwrap();
}
