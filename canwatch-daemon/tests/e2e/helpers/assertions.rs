//! Timeout-based assertions for the live alert channel and alert log polling.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

/// Default timeout for receive/poll assertions.
#[allow(dead_code)]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Short timeout for asserting that nothing arrives.
#[allow(dead_code)]
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(200);

/// Assert that a value is received within the given timeout.
///
/// # Panics
///
/// Panics if the timeout expires or the channel is closed first.
#[allow(dead_code)]
pub async fn assert_received_within<T: Debug>(rx: &mut mpsc::Receiver<T>, timeout: Duration) -> T {
    match tokio::time::timeout(timeout, rx.recv()).await {
        Ok(Some(value)) => value,
        Ok(None) => panic!("channel closed before receiving a value"),
        Err(_) => panic!("timed out after {:?} waiting for value on channel", timeout),
    }
}

/// Assert that no value is received within the given timeout.
#[allow(dead_code)]
pub async fn assert_not_received_within<T: Debug>(rx: &mut mpsc::Receiver<T>, timeout: Duration) {
    if let Ok(Some(value)) = tokio::time::timeout(timeout, rx.recv()).await {
        panic!("expected no value but received: {:?}", value);
    }
}

/// Poll `check` every 20ms until it returns true.
///
/// # Panics
///
/// Panics if the condition does not hold within the timeout.
#[allow(dead_code)]
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let polled = tokio::time::timeout(timeout, async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "condition not met within {:?}", timeout);
}
