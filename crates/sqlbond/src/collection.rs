//! Collections: the storage behind a named store.

use crate::engine::{Backend, Executor};
use crate::error::{BondError, BondResult};
use crate::exql::{ColumnValues, Columns, Statement, Table, Values, Where};
use crate::model::Model;
use crate::param::Param;
use async_trait::async_trait;
use std::fmt;

/// Storage operations for one named collection (a table, for SQL engines).
#[async_trait]
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    /// Insert or update the model.
    async fn save(&self, model: &dyn Model) -> BondResult<()>;

    async fn delete(&self, model: &dyn Model) -> BondResult<()>;

    async fn count(&self) -> BondResult<u64>;

    async fn truncate(&self) -> BondResult<()>;

    async fn drop_table(&self) -> BondResult<()>;
}

/// A table reached through a SQL engine.
#[derive(Clone)]
pub struct SqlCollection {
    name: String,
    backend: Backend,
}

impl SqlCollection {
    pub fn new(name: impl Into<String>, backend: Backend) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    async fn exec(&self, stmt: &Statement, params: &[Param]) -> BondResult<u64> {
        let sql = stmt.compile(self.backend.template());
        self.backend.exec(&sql, params).await
    }
}

fn split(columns: Vec<(String, Param)>) -> (Vec<String>, Vec<Param>) {
    columns.into_iter().unzip()
}

fn has_key(keys: &[(String, Param)]) -> bool {
    !keys.is_empty() && keys.iter().all(|(_, v)| !v.is_null())
}

#[async_trait]
impl Collection for SqlCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn save(&self, model: &dyn Model) -> BondResult<()> {
        let keys = model.primary_key();
        let fields = model.fields();
        if keys.is_empty() && fields.is_empty() {
            return Err(BondError::validation(format!(
                "model for {} has no columns to save",
                self.name
            )));
        }

        if has_key(&keys) && !fields.is_empty() {
            let (key_names, key_values) = split(keys.clone());
            let (field_names, mut params) = split(fields.clone());
            params.extend(key_values);
            let stmt = Statement::update()
                .table(Table::new(&self.name))
                .column_values(ColumnValues::bind(field_names))
                .where_clause(Where::bind_eq(key_names));
            if self.exec(&stmt, &params).await? > 0 {
                return Ok(());
            }
        }

        // Null keys are left to column defaults.
        let (names, params) = split(
            keys.into_iter()
                .filter(|(_, v)| !v.is_null())
                .chain(fields)
                .collect(),
        );
        let mut stmt = Statement::insert().table(Table::new(&self.name));
        if !names.is_empty() {
            stmt = stmt
                .values(Values::placeholders(names.len()))
                .columns(Columns::new(names));
        }
        self.exec(&stmt, &params).await?;
        Ok(())
    }

    async fn delete(&self, model: &dyn Model) -> BondResult<()> {
        let keys = model.primary_key();
        if !has_key(&keys) {
            return Err(BondError::validation(format!(
                "cannot delete from {} without a primary key",
                self.name
            )));
        }
        let (names, params) = split(keys);
        let stmt = Statement::delete()
            .table(Table::new(&self.name))
            .where_clause(Where::bind_eq(names));
        self.exec(&stmt, &params).await?;
        Ok(())
    }

    async fn count(&self) -> BondResult<u64> {
        let stmt = Statement::count().table(Table::new(&self.name));
        let sql = stmt.compile(self.backend.template());
        let rows = self.backend.query(&sql, &[]).await?;
        match rows.first().and_then(|r| r.get_index(0)) {
            Some(Param::Int(n)) => u64::try_from(*n)
                .map_err(|_| BondError::decode("count", format!("negative count {n}"))),
            Some(other) => Err(BondError::decode(
                "count",
                format!("expected an integer, got {other:?}"),
            )),
            None => Err(BondError::decode("count", "no rows returned")),
        }
    }

    async fn truncate(&self) -> BondResult<()> {
        self.exec(&Statement::truncate().table(Table::new(&self.name)), &[])
            .await?;
        Ok(())
    }

    async fn drop_table(&self) -> BondResult<()> {
        self.exec(&Statement::drop_table().table(Table::new(&self.name)), &[])
            .await?;
        Ok(())
    }
}

impl fmt::Debug for SqlCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCollection")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .finish()
    }
}
