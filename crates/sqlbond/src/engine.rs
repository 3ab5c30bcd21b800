//! Engine capabilities a session runs on.
//!
//! A driver implements [`Database`] for its pool or connection and [`Tx`] for
//! an open transaction. Both speak SQL through [`Executor`]; statements reach
//! them already compiled, with `?` placeholders and a parameter slice.

use crate::context::Context;
use crate::error::BondResult;
use crate::exql::Template;
use crate::param::{Param, Record};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Runs compiled SQL.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Name of the adapter this engine belongs to.
    fn adapter(&self) -> &str;

    /// Dialect template shared by every engine of the adapter.
    fn template(&self) -> &Arc<Template>;

    /// Context the engine honors for each call.
    fn context(&self) -> &Context;

    /// Execute a statement; returns the number of affected rows.
    async fn exec(&self, sql: &str, params: &[Param]) -> BondResult<u64>;

    /// Execute a statement and collect every row.
    async fn query(&self, sql: &str, params: &[Param]) -> BondResult<Vec<Record>>;
}

/// A database handle that can start transactions.
#[async_trait]
pub trait Database: Executor {
    /// Same database, bound to another context.
    fn with_context(&self, ctx: Context) -> Arc<dyn Database>;

    async fn begin(&self, ctx: &Context) -> BondResult<Arc<dyn Tx>>;
}

/// An open transaction.
///
/// `close` is called exactly once after `commit` or `rollback`, and must
/// release the underlying connection even when neither ran.
#[async_trait]
pub trait Tx: Executor {
    /// Same transaction, bound to another context.
    fn with_context(&self, ctx: Context) -> Arc<dyn Tx>;

    async fn commit(&self) -> BondResult<()>;

    async fn rollback(&self) -> BondResult<()>;

    async fn close(&self) -> BondResult<()>;
}

/// The engine behind a session.
#[derive(Clone)]
pub enum Backend {
    Database(Arc<dyn Database>),
    Tx(Arc<dyn Tx>),
}

impl Backend {
    pub fn is_tx(&self) -> bool {
        matches!(self, Backend::Tx(_))
    }

    pub fn as_tx(&self) -> Option<&Arc<dyn Tx>> {
        match self {
            Backend::Tx(tx) => Some(tx),
            Backend::Database(_) => None,
        }
    }

    /// Rebind to `ctx` through the engine's own capability.
    pub fn with_context(&self, ctx: Context) -> Backend {
        match self {
            Backend::Database(db) => Backend::Database(db.with_context(ctx)),
            Backend::Tx(tx) => Backend::Tx(tx.with_context(ctx)),
        }
    }

    fn executor(&self) -> &dyn Executor {
        match self {
            Backend::Database(db) => db.as_ref(),
            Backend::Tx(tx) => tx.as_ref(),
        }
    }
}

#[async_trait]
impl Executor for Backend {
    fn adapter(&self) -> &str {
        self.executor().adapter()
    }

    fn template(&self) -> &Arc<Template> {
        self.executor().template()
    }

    fn context(&self) -> &Context {
        self.executor().context()
    }

    async fn exec(&self, sql: &str, params: &[Param]) -> BondResult<u64> {
        self.executor().exec(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Param]) -> BondResult<Vec<Record>> {
        self.executor().query(sql, params).await
    }
}

impl From<Arc<dyn Database>> for Backend {
    fn from(db: Arc<dyn Database>) -> Self {
        Backend::Database(db)
    }
}

impl From<Arc<dyn Tx>> for Backend {
    fn from(tx: Arc<dyn Tx>) -> Self {
        Backend::Tx(tx)
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_tx() { "Tx" } else { "Database" };
        f.debug_struct("Backend")
            .field("kind", &kind)
            .field("adapter", &self.adapter())
            .finish()
    }
}
