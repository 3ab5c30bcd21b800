//! Per-call execution context: deadline, cancellation and an optional tag.

use crate::error::{BondError, BondResult};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Execution context forwarded to engines.
///
/// Clones share one cancellation token, so cancelling any clone interrupts
/// every call in flight with the others.
///
/// ```ignore
/// let ctx = Context::background()
///     .with_timeout(Duration::from_secs(2))
///     .with_tag("nightly-report");
/// let rows = sess.with_context(ctx).fetch(&stmt, &[]).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    tag: Option<Arc<str>>,
    cancel: CancellationToken,
}

impl Context {
    /// An empty context: no deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Label carried into engine logs.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(Arc::from(tag.into()));
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail fast when the context is already cancelled or past its deadline.
    pub fn check(&self) -> BondResult<()> {
        if self.is_cancelled() {
            return Err(BondError::Cancelled);
        }
        match self.remaining() {
            Some(left) if left.is_zero() => Err(BondError::Timeout(Duration::ZERO)),
            _ => Ok(()),
        }
    }

    /// Drive `fut` under this context's deadline and cancellation token.
    ///
    /// `fut` is dropped as soon as the context is cancelled or the deadline
    /// passes. A result `fut` already produced is returned as is.
    pub async fn run<F, T>(&self, fut: F) -> BondResult<T>
    where
        F: Future<Output = BondResult<T>>,
    {
        self.check()?;
        let guarded = async {
            tokio::select! {
                biased;
                result = fut => result,
                () = self.cancel.cancelled() => {
                    bond_debug!(target: "sqlbond.session", tag = self.tag().unwrap_or_default(), "call cancelled");
                    Err(BondError::Cancelled)
                }
            }
        };
        match self.remaining() {
            Some(left) => tokio::time::timeout(left, guarded)
                .await
                .map_err(|_| BondError::Timeout(left))?,
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_has_no_deadline() {
        let ctx = Context::background();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(ctx.tag().is_none());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn clones_share_cancellation() {
        let ctx = Context::background().with_tag("report");
        let clone = ctx.clone();
        clone.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check(), Err(BondError::Cancelled)));
        assert_eq!(ctx.tag(), Some("report"));
    }

    #[tokio::test]
    async fn run_passes_through_result() {
        let ctx = Context::background().with_timeout(Duration::from_secs(5));
        let value = ctx.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn run_times_out() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn run_rejects_expired_deadline() {
        let ctx = Context::background().with_deadline(Instant::now());
        let err = ctx.run(async { Ok(()) }).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn run_rejects_cancelled_context() {
        let ctx = Context::background();
        ctx.cancel();
        let err = ctx.run(async { Ok(()) }).await.unwrap_err();
        assert!(matches!(err, BondError::Cancelled));
    }

    #[tokio::test]
    async fn cancel_interrupts_call_in_flight() {
        let ctx = Context::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = ctx
            .run(std::future::pending::<BondResult<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, BondError::Cancelled));
    }

    #[tokio::test]
    async fn completed_result_survives_late_cancel() {
        let ctx = Context::background();
        let value = ctx
            .run(async {
                ctx.cancel();
                Ok(5)
            })
            .await
            .unwrap();
        assert_eq!(value, 5);
        assert!(ctx.is_cancelled());
    }
}
