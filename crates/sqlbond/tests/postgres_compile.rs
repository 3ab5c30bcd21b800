//! Compile-only checks for the PostgreSQL wiring.
//!
//! Nothing here touches a server; the functions only need to type-check.

#![cfg(feature = "postgres")]
#![allow(dead_code)]

use sqlbond::exql::{ColumnValue, ColumnValues, Value};
use sqlbond::postgres::{PgDatabase, create_pool_with_config};
use sqlbond::prelude::*;
use sqlbond::{Backend, BondResult};
use std::sync::Arc;
use std::time::Duration;

async fn open_by_name(url: &str) -> BondResult<Session> {
    Session::open("postgresql", url).await
}

fn bind_existing_pool(url: &str) -> BondResult<Session> {
    let pool = create_pool_with_config(url, 4)?;
    let db = PgDatabase::new(pool)?;
    Session::bind("postgresql", Backend::Database(Arc::new(db)))
}

async fn transfer(sess: &Session, from: i64, to: i64, amount: i64) -> BondResult<()> {
    let ctx = Context::background().with_timeout(Duration::from_secs(5));
    sess.transaction_context(ctx, |tx| async move {
        let debit = Statement::update()
            .table(Table::new("accounts"))
            .column_values(ColumnValues::new([ColumnValue::new("balance", "=", Value::raw("balance - ?"))]))
            .where_clause(Where::bind_eq(["id"]));
        tx.execute(&debit, &[amount.into(), from.into()]).await?;

        let credit = Statement::update()
            .table(Table::new("accounts"))
            .column_values(ColumnValues::new([ColumnValue::new("balance", "=", Value::raw("balance + ?"))]))
            .where_clause(Where::bind_eq(["id"]));
        tx.execute(&credit, &[amount.into(), to.into()]).await?;
        Ok(())
    })
    .await
}

async fn list_names(sess: &Session) -> BondResult<Vec<String>> {
    let stmt = Statement::select()
        .columns(Columns::new(["name"]))
        .table(Table::new("users"))
        .order_by(OrderBy::new([SortColumn::asc("name")]))
        .limit(50);
    let rows = sess.fetch(&stmt, &[]).await?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("name").and_then(Param::as_str).map(str::to_string))
        .collect())
}

async fn wipe(sess: &Session) -> BondResult<u64> {
    let store = sess.store("events");
    let before = store.count().await?;
    store.truncate().await?;
    Ok(before)
}
