//! Model capability.

use crate::param::Param;
use crate::session::{Session, Store};

/// A value that knows which store it belongs to.
///
/// Usually derived:
///
/// ```ignore
/// #[derive(Model)]
/// #[bond(store = "accounts")]
/// struct Account { id: i64, balance: i64 }
/// ```
///
/// `primary_key` and `fields` feed the SQL collection's `save` and `delete`;
/// models that only need store resolution can leave them at their defaults.
pub trait Model: Send + Sync {
    /// The store this model is persisted in, resolved against `sess`.
    fn store(&self, sess: &Session) -> Store;

    /// Primary key columns and their values. Empty when the model has none.
    fn primary_key(&self) -> Vec<(String, Param)> {
        Vec::new()
    }

    /// Non-key columns written by `save`.
    fn fields(&self) -> Vec<(String, Param)> {
        Vec::new()
    }
}

impl<M: Model + ?Sized> Model for &M {
    fn store(&self, sess: &Session) -> Store {
        (**self).store(sess)
    }

    fn primary_key(&self) -> Vec<(String, Param)> {
        (**self).primary_key()
    }

    fn fields(&self) -> Vec<(String, Param)> {
        (**self).fields()
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn store(&self, sess: &Session) -> Store {
        (**self).store(sess)
    }

    fn primary_key(&self) -> Vec<(String, Param)> {
        (**self).primary_key()
    }

    fn fields(&self) -> Vec<(String, Param)> {
        (**self).fields()
    }
}

impl<M: Model + ?Sized> Model for std::sync::Arc<M> {
    fn store(&self, sess: &Session) -> Store {
        (**self).store(sess)
    }

    fn primary_key(&self) -> Vec<(String, Param)> {
        (**self).primary_key()
    }

    fn fields(&self) -> Vec<(String, Param)> {
        (**self).fields()
    }
}
