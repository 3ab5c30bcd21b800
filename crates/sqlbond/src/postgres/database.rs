use super::convert::{decode_row, rewrite_placeholders};
use super::{ADAPTER, layouts};
use crate::adapter::{AdapterRegistration, adapter};
use crate::context::Context;
use crate::engine::{Database, Executor, Tx};
use crate::error::{BondError, BondResult};
use crate::exql::Template;
use crate::param::{Param, Record};
use async_trait::async_trait;
use deadpool_postgres::{Client, Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use futures_core::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

/// A pool of 16 connections without TLS.
pub fn create_pool(database_url: &str) -> BondResult<Pool> {
    create_pool_with_config(database_url, 16)
}

/// A pool of `max_size` connections without TLS.
///
/// Pools built elsewhere (TLS, custom recycling) can be handed straight to
/// [`PgDatabase::new`].
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> BondResult<Pool> {
    let config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| BondError::Connection(e.to_string()))?;
    let manager = Manager::from_config(
        config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| BondError::Pool(e.to_string()))
}

fn bind_refs(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

async fn exec_on(client: &Client, ctx: &Context, sql: &str, params: &[Param]) -> BondResult<u64> {
    let sql = rewrite_placeholders(sql);
    bond_debug!(target: "sqlbond.postgres", sql = %sql, params = params.len(), tag = ctx.tag().unwrap_or_default(), "exec");
    ctx.run(async {
        let stmt = client.prepare_cached(&sql).await?;
        Ok::<_, BondError>(client.execute(&stmt, &bind_refs(params)).await?)
    })
    .await
}

async fn query_on(
    client: &Client,
    ctx: &Context,
    sql: &str,
    params: &[Param],
) -> BondResult<Vec<Record>> {
    let sql = rewrite_placeholders(sql);
    bond_debug!(target: "sqlbond.postgres", sql = %sql, params = params.len(), tag = ctx.tag().unwrap_or_default(), "query");
    ctx.run(async {
        let stmt = client.prepare_cached(&sql).await?;
        let rows = client.query(&stmt, &bind_refs(params)).await?;
        rows.iter().map(decode_row).collect::<BondResult<Vec<_>>>()
    })
    .await
}

/// A PostgreSQL database reached through a connection pool.
#[derive(Clone)]
pub struct PgDatabase {
    pool: Pool,
    template: Arc<Template>,
    ctx: Context,
}

impl PgDatabase {
    /// Wrap `pool`, using the registered PostgreSQL template.
    pub fn new(pool: Pool) -> BondResult<Self> {
        let template = Arc::clone(adapter(ADAPTER)?.template());
        Ok(Self::with_template(pool, template))
    }

    pub fn with_template(pool: Pool, template: Arc<Template>) -> Self {
        Self {
            pool,
            template,
            ctx: Context::background(),
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn client(&self, ctx: &Context) -> BondResult<Client> {
        ctx.run(async { Ok::<_, BondError>(self.pool.get().await?) })
            .await
    }
}

#[async_trait]
impl Executor for PgDatabase {
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
        let client = self.client(&self.ctx).await?;
        exec_on(&client, &self.ctx, sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Param]) -> BondResult<Vec<Record>> {
        let client = self.client(&self.ctx).await?;
        query_on(&client, &self.ctx, sql, params).await
    }
}

#[async_trait]
impl Database for PgDatabase {
    fn with_context(&self, ctx: Context) -> Arc<dyn Database> {
        Arc::new(Self {
            pool: self.pool.clone(),
            template: Arc::clone(&self.template),
            ctx,
        })
    }

    async fn begin(&self, ctx: &Context) -> BondResult<Arc<dyn Tx>> {
        let client = self.client(ctx).await?;
        ctx.run(async { Ok::<_, BondError>(client.batch_execute("BEGIN").await?) })
            .await?;
        bond_debug!(target: "sqlbond.postgres", "BEGIN");
        Ok(Arc::new(PgTx {
            conn: Arc::new(TxConn {
                client: Mutex::new(Some(client)),
                finished: AtomicBool::new(false),
            }),
            template: Arc::clone(&self.template),
            ctx: ctx.clone(),
        }))
    }
}

impl fmt::Debug for PgDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgDatabase")
            .field("pool", &self.pool.status())
            .finish()
    }
}

/// The connection behind a transaction, shared by its context rebinds.
struct TxConn {
    client: Mutex<Option<Client>>,
    finished: AtomicBool,
}

impl Drop for TxConn {
    // Dropped without `close`, e.g. when the caller's future was cancelled.
    // A connection still inside BEGIN must not go back to the pool.
    fn drop(&mut self) {
        let Some(client) = self.client.get_mut().take() else {
            return;
        };
        if !*self.finished.get_mut() {
            bond_warn!(target: "sqlbond.postgres", "open transaction dropped, discarding its connection");
            drop(Object::take(client));
        }
    }
}

/// A transaction on one pooled connection.
///
/// Clones made through `with_context` share the connection. The connection
/// goes back to the pool on `close`; a transaction dropped while still open
/// discards its connection instead.
pub struct PgTx {
    conn: Arc<TxConn>,
    template: Arc<Template>,
    ctx: Context,
}

impl PgTx {
    async fn finish(&self, command: &str) -> BondResult<()> {
        let conn = self.conn.client.lock().await;
        let client = conn.as_ref().ok_or_else(closed)?;
        if self.conn.finished.swap(true, Ordering::SeqCst) {
            return Err(BondError::validation("transaction already finished"));
        }
        bond_debug!(target: "sqlbond.postgres", command, "finishing transaction");
        client.batch_execute(command).await?;
        Ok(())
    }
}

fn closed() -> BondError {
    BondError::Connection("transaction is closed".into())
}

#[async_trait]
impl Executor for PgTx {
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
        let conn = self.conn.client.lock().await;
        let client = conn.as_ref().ok_or_else(closed)?;
        exec_on(client, &self.ctx, sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Param]) -> BondResult<Vec<Record>> {
        let conn = self.conn.client.lock().await;
        let client = conn.as_ref().ok_or_else(closed)?;
        query_on(client, &self.ctx, sql, params).await
    }
}

#[async_trait]
impl Tx for PgTx {
    fn with_context(&self, ctx: Context) -> Arc<dyn Tx> {
        Arc::new(PgTx {
            conn: Arc::clone(&self.conn),
            template: Arc::clone(&self.template),
            ctx,
        })
    }

    async fn commit(&self) -> BondResult<()> {
        self.ctx.check()?;
        self.finish("COMMIT").await
    }

    async fn rollback(&self) -> BondResult<()> {
        self.finish("ROLLBACK").await
    }

    /// Roll back if still open, then return the connection to the pool.
    /// Closing twice is a no-op.
    async fn close(&self) -> BondResult<()> {
        let Some(client) = self.conn.client.lock().await.take() else {
            return Ok(());
        };
        if !self.conn.finished.swap(true, Ordering::SeqCst) {
            bond_warn!(target: "sqlbond.postgres", "closing an open transaction, rolling back");
            if let Err(e) = client.batch_execute("ROLLBACK").await {
                drop(Object::take(client));
                return Err(e.into());
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PgTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgTx")
            .field("finished", &self.conn.finished.load(Ordering::SeqCst))
            .finish()
    }
}

fn open(url: &str, template: Arc<Template>) -> BoxFuture<'static, BondResult<Arc<dyn Database>>> {
    let url = url.to_string();
    Box::pin(async move {
        let pool = create_pool(&url)?;
        // Fail at open time on bad credentials or an unreachable server.
        drop(pool.get().await?);
        bond_debug!(target: "sqlbond.postgres", "opened pool");
        Ok(Arc::new(PgDatabase::with_template(pool, template)) as Arc<dyn Database>)
    })
}

inventory::submit! {
    AdapterRegistration {
        name: ADAPTER,
        layouts,
        open: Some(open),
    }
}
