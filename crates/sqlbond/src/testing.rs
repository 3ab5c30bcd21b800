//! In-memory recording engine used by unit tests.

use crate::adapter::{Adapter, adapter, register_adapter};
use crate::context::Context;
use crate::engine::{Database, Executor, Tx};
use crate::error::{BondError, BondResult};
use crate::exql::{Layouts, StatementKind, Template};
use crate::param::{Param, Record};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

pub(crate) const ADAPTER: &str = "memory";

pub(crate) fn memory_layouts() -> Layouts {
    Layouts::new()
        .layout(
            StatementKind::Select,
            "SELECT {^columns}*{/columns}{columns} FROM {table}{#where} WHERE {where}{/where}{#limit} LIMIT {limit}{/limit}",
        )
        .layout(
            StatementKind::Insert,
            "INSERT INTO {table}{#columns} ({columns}){/columns}{#values} VALUES {values}{/values}{^values} DEFAULT VALUES{/values}",
        )
        .layout(
            StatementKind::Update,
            "UPDATE {table} SET {column_values}{#where} WHERE {where}{/where}",
        )
        .layout(StatementKind::Delete, "DELETE FROM {table}{#where} WHERE {where}{/where}")
        .layout(
            StatementKind::Count,
            "SELECT COUNT(1) AS _t FROM {table}{#where} WHERE {where}{/where}",
        )
        .layout(StatementKind::Truncate, "TRUNCATE TABLE {table}")
        .layout(StatementKind::DropTable, "DROP TABLE {table}")
}

pub(crate) fn memory_adapter() -> Arc<Adapter> {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        let adapter = Adapter::from_layouts(ADAPTER, memory_layouts()).unwrap();
        register_adapter(adapter);
    });
    adapter(ADAPTER).unwrap()
}

/// Everything the engine saw, plus knobs for the next answers.
#[derive(Default)]
pub(crate) struct Journal {
    sql: Mutex<Vec<(Option<usize>, String)>>,
    params: Mutex<Vec<Vec<Param>>>,
    lifecycle: Mutex<Vec<String>>,
    affected: Mutex<VecDeque<u64>>,
    rows: Mutex<VecDeque<Vec<Record>>>,
    next_tx: AtomicUsize,
    pub fail_exec: AtomicBool,
    pub fail_commit: AtomicBool,
    pub fail_rollback: AtomicBool,
    pub fail_close: AtomicBool,
}

impl Journal {
    pub fn push_affected(&self, n: u64) {
        self.affected.lock().unwrap().push_back(n);
    }

    pub fn push_rows(&self, rows: Vec<Record>) {
        self.rows.lock().unwrap().push_back(rows);
    }

    /// SQL text in execution order.
    pub fn statements(&self) -> Vec<String> {
        self.sql.lock().unwrap().iter().map(|(_, s)| s.clone()).collect()
    }

    /// SQL text executed inside transaction `tx`.
    pub fn statements_in(&self, tx: usize) -> Vec<String> {
        self.sql
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == Some(tx))
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn last_params(&self) -> Vec<Param> {
        self.params.lock().unwrap().last().cloned().unwrap_or_default()
    }

    /// `begin#1`, `commit#1`, `close#1`, ...
    pub fn lifecycle(&self) -> Vec<String> {
        self.lifecycle.lock().unwrap().clone()
    }

    fn log_event(&self, event: &str, tx: usize) {
        self.lifecycle.lock().unwrap().push(format!("{event}#{tx}"));
    }

    fn record(&self, tx: Option<usize>, sql: &str, params: &[Param]) -> BondResult<()> {
        if self.fail_exec.load(Ordering::SeqCst) {
            return Err(BondError::Other(format!("exec failed: {sql}")));
        }
        self.sql.lock().unwrap().push((tx, sql.to_string()));
        self.params.lock().unwrap().push(params.to_vec());
        Ok(())
    }

    fn exec(&self, tx: Option<usize>, sql: &str, params: &[Param]) -> BondResult<u64> {
        self.record(tx, sql, params)?;
        Ok(self.affected.lock().unwrap().pop_front().unwrap_or(1))
    }

    fn query(&self, tx: Option<usize>, sql: &str, params: &[Param]) -> BondResult<Vec<Record>> {
        self.record(tx, sql, params)?;
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub(crate) struct MemoryDatabase {
    journal: Arc<Journal>,
    template: Arc<Template>,
    ctx: Context,
}

/// A fresh database over the shared `memory` adapter, and its journal.
pub(crate) fn memory_database() -> (Arc<dyn Database>, Arc<Journal>) {
    let journal = Arc::new(Journal::default());
    let db = MemoryDatabase {
        journal: Arc::clone(&journal),
        template: Arc::clone(memory_adapter().template()),
        ctx: Context::background(),
    };
    (Arc::new(db), journal)
}

#[async_trait]
impl Executor for MemoryDatabase {
    fn adapter(&self) -> &str {
        ADAPTER
    }

    fn template(&self) -> &Arc<Template> {
        &self.template
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    async fn exec(&self, sql: &str, params: &[Param]) -> BondResult<u64> {
        self.ctx.check()?;
        self.journal.exec(None, sql, params)
    }

    async fn query(&self, sql: &str, params: &[Param]) -> BondResult<Vec<Record>> {
        self.ctx.check()?;
        self.journal.query(None, sql, params)
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    fn with_context(&self, ctx: Context) -> Arc<dyn Database> {
        Arc::new(MemoryDatabase {
            journal: Arc::clone(&self.journal),
            template: Arc::clone(&self.template),
            ctx,
        })
    }

    async fn begin(&self, ctx: &Context) -> BondResult<Arc<dyn Tx>> {
        ctx.check()?;
        let id = self.journal.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        self.journal.log_event("begin", id);
        Ok(Arc::new(MemoryTx {
            id,
            journal: Arc::clone(&self.journal),
            template: Arc::clone(&self.template),
            ctx: ctx.clone(),
        }))
    }
}

pub(crate) struct MemoryTx {
    id: usize,
    journal: Arc<Journal>,
    template: Arc<Template>,
    ctx: Context,
}

#[async_trait]
impl Executor for MemoryTx {
    fn adapter(&self) -> &str {
        ADAPTER
    }

    fn template(&self) -> &Arc<Template> {
        &self.template
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    async fn exec(&self, sql: &str, params: &[Param]) -> BondResult<u64> {
        self.ctx.check()?;
        self.journal.exec(Some(self.id), sql, params)
    }

    async fn query(&self, sql: &str, params: &[Param]) -> BondResult<Vec<Record>> {
        self.ctx.check()?;
        self.journal.query(Some(self.id), sql, params)
    }
}

#[async_trait]
impl Tx for MemoryTx {
    fn with_context(&self, ctx: Context) -> Arc<dyn Tx> {
        Arc::new(MemoryTx {
            id: self.id,
            journal: Arc::clone(&self.journal),
            template: Arc::clone(&self.template),
            ctx,
        })
    }

    async fn commit(&self) -> BondResult<()> {
        self.journal.log_event("commit", self.id);
        if self.journal.fail_commit.load(Ordering::SeqCst) {
            return Err(BondError::Connection("commit failed".into()));
        }
        Ok(())
    }

    async fn rollback(&self) -> BondResult<()> {
        self.journal.log_event("rollback", self.id);
        if self.journal.fail_rollback.load(Ordering::SeqCst) {
            return Err(BondError::Connection("rollback failed".into()));
        }
        Ok(())
    }

    async fn close(&self) -> BondResult<()> {
        self.journal.log_event("close", self.id);
        if self.journal.fail_close.load(Ordering::SeqCst) {
            return Err(BondError::Connection("close failed".into()));
        }
        Ok(())
    }
}
