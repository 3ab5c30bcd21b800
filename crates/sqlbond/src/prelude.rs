//! Common imports:
//!
//! ```ignore
//! use sqlbond::prelude::*;
//! ```

pub use crate::exql::{
    Columns, Condition, Join, Joins, OrderBy, SortColumn, Statement, Table, Template, Values, Where,
};
pub use crate::{BondError, BondResult, Collection, Context, Item, Model, Param, Record, Session, Store};

#[cfg(feature = "postgres")]
pub use crate::postgres::{create_pool, create_pool_with_config};
