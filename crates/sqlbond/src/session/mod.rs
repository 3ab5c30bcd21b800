//! Sessions: store resolution and memoization over one engine.
//!
//! # Example
//!
//! ```ignore
//! use sqlbond::{Model, Session};
//!
//! #[derive(Model)]
//! #[bond(store = "accounts")]
//! struct Account { id: i64, balance: i64 }
//!
//! let sess = Session::open("postgresql", "postgres://localhost/bank").await?;
//! let accounts = sess.store("accounts");
//! assert!(sqlbond::Store::ptr_eq(&accounts, &sess.store("accounts")));
//!
//! sess.transaction(|tx| async move {
//!     tx.save(&Account { id: 1, balance: 10 }).await?;
//!     Ok(())
//! })
//! .await?;
//! ```

mod item;
mod store;
mod transaction;


pub use item::Item;
pub use store::Store;

use transaction::TxState;

use crate::adapter::adapter;
use crate::collection::{Collection, SqlCollection};
use crate::context::Context;
use crate::engine::{Backend, Executor};
use crate::error::{BondError, BondResult};
use crate::exql::{Statement, Template};
use crate::model::Model;
use crate::param::{Param, Record};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A handle over one database or transaction engine.
///
/// Cloning is cheap and clones share the store map. Sessions derived through
/// [`Session::with_context`] or handed to a transaction body are separate
/// sessions with their own map.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    backend: Option<Backend>,
    stores: Mutex<HashMap<String, Store>>,
    // Shared by every session over the same transaction.
    tx_state: Option<Arc<TxState>>,
}

impl Session {
    pub fn new(backend: impl Into<Backend>) -> Self {
        let backend = backend.into();
        let tx_state = backend.is_tx().then(Arc::default);
        Self::with_tx_state(backend, tx_state)
    }

    fn with_tx_state(backend: Backend, tx_state: Option<Arc<TxState>>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend: Some(backend),
                stores: Mutex::default(),
                tx_state,
            }),
        }
    }

    /// Open a database through a registered adapter.
    pub async fn open(adapter_name: &str, url: &str) -> BondResult<Self> {
        let db = adapter(adapter_name)?.open(url).await?;
        bond_debug!(target: "sqlbond.session", adapter = adapter_name, "opened session");
        Ok(Self::new(Backend::Database(db)))
    }

    /// Wrap an existing database or transaction engine of `adapter_name`.
    pub fn bind(adapter_name: &str, backend: Backend) -> BondResult<Self> {
        let registered = adapter(adapter_name)?;
        if backend.adapter() != registered.name() {
            return Err(BondError::UnsupportedEngine(format!(
                "{} engine cannot back a {} session",
                backend.adapter(),
                registered.name()
            )));
        }
        Ok(Self::new(backend))
    }

    pub fn backend(&self) -> Option<&Backend> {
        self.inner.backend.as_ref()
    }

    fn engine(&self) -> BondResult<&Backend> {
        self.inner.backend.as_ref().ok_or(BondError::MissingEngine)
    }

    pub fn adapter(&self) -> Option<&str> {
        self.backend().map(|b| b.adapter())
    }

    pub fn template(&self) -> Option<&Arc<Template>> {
        self.backend().map(|b| b.template())
    }

    pub fn is_transaction(&self) -> bool {
        self.backend().is_some_and(Backend::is_tx)
    }

    /// The engine's context; background for an unbound session.
    pub fn context(&self) -> Context {
        self.backend()
            .map(|b| b.context().clone())
            .unwrap_or_default()
    }

    /// A new session over the same engine bound to `ctx`, with an empty
    /// store map.
    ///
    /// # Panics
    ///
    /// When the session has no engine.
    pub fn with_context(&self, ctx: Context) -> Session {
        let Some(backend) = self.backend() else {
            panic!("sqlbond: with_context called on a session without an engine");
        };
        Session::with_tx_state(backend.with_context(ctx), self.inner.tx_state.clone())
    }

    /// Name of the store `item` refers to; empty when it refers to none.
    pub fn resolve_store_name(&self, item: Item<'_>) -> String {
        match item {
            Item::Name(name) => name.to_string(),
            Item::Factory(factory) => factory(self).name().to_string(),
            Item::Collection(collection) => collection.name().to_string(),
            Item::Model(model) => model.store(self).name().to_string(),
            Item::Unknown => String::new(),
        }
    }

    /// The store for `item`, created on first use and reused afterwards.
    ///
    /// Items that resolve to no name get a fresh storeless handle that is
    /// never remembered.
    pub fn store<'a>(&self, item: impl Into<Item<'a>>) -> Store {
        let name = self.resolve_store_name(item.into());
        if name.is_empty() {
            return Store::storeless();
        }

        let mut stores = self
            .inner
            .stores
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores.get(&name) {
            return store.clone();
        }

        let collection = self.inner.backend.clone().map(|backend| {
            Arc::new(SqlCollection::new(name.clone(), backend)) as Arc<dyn Collection>
        });
        bond_debug!(target: "sqlbond.session", store = %name, bound = collection.is_some(), "created store");
        let store = Store::new(name.clone(), collection);
        stores.insert(name, store.clone());
        store
    }

    /// Save `model` through the store it reports.
    pub async fn save<'a, M>(&self, model: impl Into<Option<&'a M>>) -> BondResult<()>
    where
        M: Model + 'a,
    {
        let model = model.into().ok_or(BondError::NilModel)?;
        model.store(self).save(model).await
    }

    /// Delete `model` through the store it reports.
    pub async fn delete<'a, M>(&self, model: impl Into<Option<&'a M>>) -> BondResult<()>
    where
        M: Model + 'a,
    {
        let model = model.into().ok_or(BondError::NilModel)?;
        model.store(self).delete(model).await
    }

    /// Compile `stmt` with the engine's dialect.
    pub fn compile(&self, stmt: &Statement) -> BondResult<String> {
        Ok(stmt.compile(self.engine()?.template()))
    }

    /// Compile and execute `stmt`; returns the number of affected rows.
    pub async fn execute(&self, stmt: &Statement, params: &[Param]) -> BondResult<u64> {
        let engine = self.engine()?;
        let sql = stmt.compile(engine.template());
        engine.exec(&sql, params).await
    }

    /// Compile and run `stmt`, collecting every row.
    pub async fn fetch(&self, stmt: &Statement, params: &[Param]) -> BondResult<Vec<Record>> {
        let engine = self.engine()?;
        let sql = stmt.compile(engine.template());
        engine.query(&sql, params).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stores = self
            .inner
            .stores
            .lock()
            .map(|s| s.len())
            .unwrap_or_default();
        f.debug_struct("Session")
            .field("backend", &self.inner.backend)
            .field("stores", &stores)
            .finish()
    }
}
