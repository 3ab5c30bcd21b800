//! Transaction lifecycle against a live server. Skipped without `DATABASE_URL`.

#![cfg(feature = "postgres")]

use sqlbond::postgres::{PgDatabase, create_pool_with_config};
use sqlbond::{Backend, BondResult, Session, Statement};
use std::sync::Arc;
use std::time::Duration;

fn database_url(test: &str) -> Option<String> {
    match std::env::var("DATABASE_URL") {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            None
        }
    }
}

#[tokio::test]
async fn dropped_transaction_does_not_return_open_connection() -> BondResult<()> {
    let Some(url) = database_url("dropped_transaction_does_not_return_open_connection") else {
        return Ok(());
    };
    let pool = create_pool_with_config(&url, 1)?;
    let sess = Session::new(Backend::Database(Arc::new(PgDatabase::new(pool.clone())?)));

    let abandoned = sess.transaction(|tx| async move {
        tx.execute(&Statement::raw("CREATE TEMP TABLE bond_abandoned_tx (x int)"), &[])
            .await?;
        std::future::pending::<BondResult<()>>().await
    });
    assert!(
        tokio::time::timeout(Duration::from_millis(500), abandoned)
            .await
            .is_err()
    );

    let client = pool.get().await?;
    let row = client
        .query_one(
            "SELECT to_regclass('pg_temp.bond_abandoned_tx')::text, txid_current_if_assigned()::text",
            &[],
        )
        .await?;
    let table: Option<String> = row.get(0);
    let txid: Option<String> = row.get(1);
    assert!(table.is_none());
    assert!(txid.is_none());
    Ok(())
}

#[tokio::test]
async fn nested_transaction_finishes_once() -> BondResult<()> {
    let Some(url) = database_url("nested_transaction_finishes_once") else {
        return Ok(());
    };
    let pool = create_pool_with_config(&url, 2)?;
    let sess = Session::new(Backend::Database(Arc::new(PgDatabase::new(pool)?)));

    sess.transaction(|tx| async move {
        tx.transaction(|inner| async move {
            inner.execute(&Statement::raw("SELECT 1"), &[]).await?;
            Ok(())
        })
        .await
    })
    .await?;
    Ok(())
}
