//! Remote call plumbing shared by every service client.
//!
//! A client owns a [`RemoteChannel`] to the service's request queue. Each call
//! carries a `oneshot` reply channel and is bounded by the policy's timeout, so a
//! stalled service looks the same as an unreachable host. Idempotent reads may be
//! retried a bounded number of times; writes go out exactly once.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Reply channel embedded in every request message.
pub type Reply<T, E> = oneshot::Sender<Result<T, E>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("service closed")]
    Closed,
    #[error("service dropped the reply")]
    Dropped,
    #[error("call timed out after {0:?}")]
    TimedOut(Duration),
}

/// Marks failures that are worth retrying at the boundary owning the retry policy.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Per-call timeout plus bounded retry for idempotent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration, timeout: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
            timeout,
        }
    }

    /// A single attempt with the given timeout.
    pub fn once(timeout: Duration) -> Self {
        Self::new(1, Duration::ZERO, timeout)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(50), Duration::from_secs(2))
    }
}

pub struct RemoteChannel<R> {
    sender: mpsc::Sender<R>,
    policy: RetryPolicy,
}

impl<R> Clone for RemoteChannel<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            policy: self.policy,
        }
    }
}

impl<R: Send + 'static> RemoteChannel<R> {
    pub fn new(sender: mpsc::Sender<R>, policy: RetryPolicy) -> Self {
        Self { sender, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends one request and waits for its reply.
    pub async fn call<T, E>(&self, request: impl FnOnce(Reply<T, E>) -> R) -> Result<T, E>
    where
        E: From<TransportError>,
    {
        let (respond_to, response) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(request(respond_to))
                .await
                .map_err(|_| TransportError::Closed)?;
            response.await.map_err(|_| TransportError::Dropped)
        };

        match tokio::time::timeout(self.policy.timeout, exchange).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(TransportError::TimedOut(self.policy.timeout).into()),
        }
    }

    /// Like [`call`](Self::call), but retried on transient failures.
    ///
    /// Only for requests that can be repeated without changing the outcome.
    pub async fn call_idempotent<T, E, F>(&self, mut request: F) -> Result<T, E>
    where
        E: From<TransportError> + Transient + std::fmt::Display,
        F: FnMut(Reply<T, E>) -> R,
    {
        let mut attempt = 1;
        loop {
            match self.call(&mut request).await {
                Err(e) if e.is_transient() && attempt < self.policy.attempts => {
                    warn!(attempt, error = %e, "Transient failure, retrying");
                    tokio::time::sleep(self.policy.backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
