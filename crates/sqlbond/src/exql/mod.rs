//! Statement compiler.
//!
//! A [`Statement`] is a dialect-agnostic description of one SQL operation,
//! assembled from [`Fragment`]s. Compiling it against a dialect's
//! [`Template`] renders the layout for its kind and caches the result by
//! content hash, so structurally equal statements are rendered once per
//! dialect.
//!
//! # Example
//!
//! ```ignore
//! use sqlbond::exql::{Layouts, Statement, StatementKind, Table, Template, Where};
//!
//! let template = Template::new(
//!     Layouts::new().layout(StatementKind::Select, "SELECT * FROM {table} WHERE {where} LIMIT {limit}"),
//! )?;
//!
//! let stmt = Statement::select()
//!     .table(Table::new("users"))
//!     .where_clause(Where::raw("id = 1"))
//!     .limit(10);
//!
//! assert_eq!(stmt.compile(&template), "SELECT * FROM users WHERE id = 1 LIMIT 10");
//! ```

mod column;
mod fragment;
mod hash;
mod join;
mod layout;
mod order_by;
mod raw;
mod statement;
mod table;
mod template;
mod value;
mod where_clause;


pub use column::{Column, Columns, Returning};
pub use fragment::Fragment;
pub use hash::{ContentHash, ContentHasher};
pub use join::{Join, JoinConstraint, JoinKind, Joins};
pub use layout::{Field, Layout, LayoutData};
pub use order_by::{GroupBy, Order, OrderBy, SortColumn};
pub use raw::Raw;
pub use statement::{Amendment, Statement, StatementKind};
pub use table::{Database, Table};
pub use template::{CacheStats, Layouts, Template, TemplateOptions};
pub use value::{ColumnValue, ColumnValues, Value, ValueGroups, Values};
pub use where_clause::{Condition, Where};
