use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

/// Probes a store until it answers, sleeping `backoff` between attempts.
///
/// Boot-time only: it never gives up. Request paths use the bounded
/// [`RetryPolicy`](crate::transport::RetryPolicy) instead. Returns the number
/// of attempts made.
pub async fn wait_forever<F, Fut, E>(label: &str, backoff: Duration, mut probe: F) -> u32
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match probe().await {
            Ok(()) => {
                info!(store = label, attempt, "Store reachable");
                return attempt;
            }
            Err(e) => {
                warn!(store = label, attempt, error = %e, "Store unreachable, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
