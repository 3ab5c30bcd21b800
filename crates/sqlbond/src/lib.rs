//! # sqlbond
//!
//! A dialect-agnostic SQL statement compiler with a session/store layer on
//! top.
//!
//! ## Features
//!
//! - **Statement compiler**: describe a statement once as fragments, compile
//!   it for any dialect; compiled text is cached per dialect by content hash
//! - **Sessions and stores**: look up named stores by name, collection or
//!   model, memoized per session
//! - **Transactions**: run a closure in a transaction with commit, rollback
//!   and close handled for you
//! - **Adapters**: dialects register through `inventory` or at runtime; the
//!   PostgreSQL adapter ships behind the `postgres` feature
//!
//! ## Example
//!
//! ```ignore
//! use sqlbond::exql::{Statement, Table, Where};
//! use sqlbond::{Model, Session};
//!
//! #[derive(Model)]
//! #[bond(store = "users")]
//! struct User { id: i64 }
//!
//! let sess = Session::open("postgresql", "postgres://localhost/app").await?;
//!
//! let stmt = Statement::select()
//!     .table(Table::new("users"))
//!     .where_clause(Where::bind_eq(["id"]))
//!     .limit(1);
//! let rows = sess.fetch(&stmt, &[1_i64.into()]).await?;
//!
//! let users = sess.store(&User { id: 1 });
//! println!("{} users", users.count().await?);
//! ```

#[macro_use]
mod log;

pub mod adapter;
pub mod collection;
pub mod context;
pub mod engine;
pub mod error;
pub mod exql;
pub mod model;
pub mod param;
pub mod prelude;
pub mod session;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(test)]
mod testing;

pub use adapter::{Adapter, AdapterRegistration, Opener, adapter, register_adapter, registered_adapters};
pub use collection::{Collection, SqlCollection};
pub use context::Context;
pub use engine::{Backend, Database, Executor, Tx};
pub use error::{BondError, BondResult};
pub use exql::{Statement, StatementKind, Template};
pub use model::Model;
pub use param::{Param, Record};
pub use session::{Item, Session, Store};

#[cfg(feature = "derive")]
pub use sqlbond_derive::Model;

// Re-exported for `inventory::submit!` in adapter crates.
pub use inventory;
