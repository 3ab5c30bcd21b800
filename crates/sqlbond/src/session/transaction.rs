//! Transaction control for sessions.

use super::Session;
use crate::context::Context;
use crate::engine::{Backend, Tx};
use crate::error::{BondError, BondResult};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    Committed,
    RolledBack,
}

/// Finish and close bookkeeping for one transaction handle.
///
/// Every session over the same transaction (nested bodies, context rebinds)
/// shares one state, so the handle is finished and closed at most once.
#[derive(Debug, Default)]
pub(super) struct TxState {
    finished: Mutex<Option<Finish>>,
    closed: AtomicBool,
}

impl TxState {
    /// Record `finish` unless the transaction already ended; returns the
    /// earlier outcome in that case.
    fn claim(&self, finish: Finish) -> Option<Finish> {
        let mut slot = self.finished.lock().unwrap_or_else(PoisonError::into_inner);
        match *slot {
            Some(earlier) => Some(earlier),
            None => {
                *slot = Some(finish);
                None
            }
        }
    }

    fn settle(&self, finish: Finish) {
        *self.finished.lock().unwrap_or_else(PoisonError::into_inner) = Some(finish);
    }

    fn claim_close(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }
}

impl Session {
    /// Run `f` inside a transaction started with a background context.
    ///
    /// See [`Session::transaction_context`].
    pub async fn transaction<F, Fut, T>(&self, f: F) -> BondResult<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = BondResult<T>>,
    {
        self.transaction_context(Context::background(), f).await
    }

    /// Run `f` inside a transaction bound to `ctx`.
    ///
    /// `f` receives a new session over the transaction. The transaction is
    /// committed when `f` returns `Ok` and rolled back when it returns `Err`;
    /// either way the handle is closed afterwards. When the rollback itself
    /// fails, the returned [`BondError::Rollback`] carries both errors.
    ///
    /// Called on a session that already wraps a transaction, the same
    /// transaction is reused (there are no savepoints) and finished when `f`
    /// returns. The enclosing call then finds it finished: its commit,
    /// rollback and close are no-ops, except that committing a transaction
    /// a nested call rolled back is an error.
    ///
    /// ```ignore
    /// sess.transaction_context(ctx, |tx| async move {
    ///     tx.save(&debit).await?;
    ///     tx.save(&credit).await?;
    ///     Ok(())
    /// })
    /// .await?;
    /// ```
    pub async fn transaction_context<F, Fut, T>(&self, ctx: Context, f: F) -> BondResult<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = BondResult<T>>,
    {
        let (tx, state) = match self.engine()? {
            Backend::Database(db) => {
                let tx = db.begin(&ctx).await?;
                bond_debug!(target: "sqlbond.session", "transaction started");
                (tx, Arc::<TxState>::default())
            }
            Backend::Tx(tx) => {
                bond_debug!(target: "sqlbond.session", "reusing enclosing transaction");
                (
                    tx.with_context(ctx),
                    self.inner.tx_state.clone().unwrap_or_default(),
                )
            }
        };
        finish(tx, state, f).await
    }

    /// Start a transaction and return a session over it.
    ///
    /// Finish it with [`Session::commit`] or [`Session::rollback`].
    pub async fn begin(&self, ctx: &Context) -> BondResult<Session> {
        match self.engine()? {
            Backend::Database(db) => {
                let tx = db.begin(ctx).await?;
                bond_debug!(target: "sqlbond.session", "transaction started");
                Ok(Session::new(Backend::Tx(tx)))
            }
            Backend::Tx(_) => Err(BondError::validation(
                "session already wraps a transaction",
            )),
        }
    }

    /// Commit the transaction this session wraps, then close it.
    pub async fn commit(&self) -> BondResult<()> {
        let (tx, state) = self.tx()?;
        let committed = commit_once(tx, state).await;
        close_after(tx, state, committed).await
    }

    /// Roll back the transaction this session wraps, then close it.
    pub async fn rollback(&self) -> BondResult<()> {
        let (tx, state) = self.tx()?;
        let rolled_back = rollback_once(tx, state).await;
        close_after(tx, state, rolled_back).await
    }

    fn tx(&self) -> BondResult<(&Arc<dyn Tx>, &TxState)> {
        let tx = self
            .backend()
            .and_then(Backend::as_tx)
            .ok_or(BondError::NotTransaction)?;
        let state = self
            .inner
            .tx_state
            .as_deref()
            .ok_or(BondError::NotTransaction)?;
        Ok((tx, state))
    }
}

async fn finish<F, Fut, T>(tx: Arc<dyn Tx>, state: Arc<TxState>, f: F) -> BondResult<T>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = BondResult<T>>,
{
    let body = Session::with_tx_state(Backend::Tx(Arc::clone(&tx)), Some(Arc::clone(&state)));
    let outcome = match f(body).await {
        Ok(value) => commit_once(&tx, &state).await.map(|()| value),
        Err(error) => {
            bond_debug!(target: "sqlbond.session", error = %error, "transaction body failed, rolling back");
            match rollback_once(&tx, &state).await {
                Ok(()) => Err(error),
                Err(rollback) => {
                    bond_warn!(target: "sqlbond.session", error = %rollback, "rollback failed");
                    Err(BondError::rollback_failed(error, rollback))
                }
            }
        }
    };
    close_after(&tx, &state, outcome).await
}

async fn commit_once(tx: &Arc<dyn Tx>, state: &TxState) -> BondResult<()> {
    match state.claim(Finish::Committed) {
        None => {
            let committed = tx.commit().await;
            if committed.is_err() {
                state.settle(Finish::RolledBack);
            }
            committed
        }
        Some(Finish::Committed) => Ok(()),
        Some(Finish::RolledBack) => Err(BondError::validation(
            "transaction was already rolled back",
        )),
    }
}

async fn rollback_once(tx: &Arc<dyn Tx>, state: &TxState) -> BondResult<()> {
    match state.claim(Finish::RolledBack) {
        None => tx.rollback().await,
        Some(_) => Ok(()),
    }
}

/// Close `tx` once, surfacing a close failure only when `outcome` succeeded.
async fn close_after<T>(
    tx: &Arc<dyn Tx>,
    state: &TxState,
    outcome: BondResult<T>,
) -> BondResult<T> {
    let closed = if state.claim_close() {
        tx.close().await
    } else {
        Ok(())
    };
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close)) => Err(close),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(close)) => {
            bond_warn!(target: "sqlbond.session", error = %close, "closing transaction failed");
            Err(error)
        }
    }
}
