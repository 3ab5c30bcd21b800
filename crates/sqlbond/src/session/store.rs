use crate::collection::Collection;
use crate::error::{BondError, BondResult};
use crate::model::Model;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A named endpoint for persisting models.
///
/// Handed out by [`Session::store`](super::Session::store), which returns the
/// same instance for the same name for the lifetime of the session. Two
/// stores compare equal when they have the same name; use [`Store::ptr_eq`]
/// to test identity.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    name: String,
    collection: Option<Arc<dyn Collection>>,
}

impl Store {
    pub(crate) fn new(name: String, collection: Option<Arc<dyn Collection>>) -> Self {
        Self {
            inner: Arc::new(StoreInner { name, collection }),
        }
    }

    /// A store that is not bound to any collection.
    pub fn storeless() -> Self {
        Self::new(String::new(), None)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_storeless(&self) -> bool {
        self.inner.name.is_empty()
    }

    pub fn collection(&self) -> Option<&Arc<dyn Collection>> {
        self.inner.collection.as_ref()
    }

    pub fn ptr_eq(a: &Store, b: &Store) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn target(&self) -> BondResult<&Arc<dyn Collection>> {
        if self.is_storeless() {
            return Err(BondError::NoStore);
        }
        self.inner.collection.as_ref().ok_or(BondError::MissingEngine)
    }

    pub async fn save(&self, model: &dyn Model) -> BondResult<()> {
        self.target()?.save(model).await
    }

    pub async fn delete(&self, model: &dyn Model) -> BondResult<()> {
        self.target()?.delete(model).await
    }

    pub async fn count(&self) -> BondResult<u64> {
        self.target()?.count().await
    }

    pub async fn truncate(&self) -> BondResult<()> {
        self.target()?.truncate().await
    }

    pub async fn drop_table(&self) -> BondResult<()> {
        self.target()?.drop_table().await
    }
}

#[async_trait]
impl Collection for Store {
    fn name(&self) -> &str {
        Store::name(self)
    }

    async fn save(&self, model: &dyn Model) -> BondResult<()> {
        Store::save(self, model).await
    }

    async fn delete(&self, model: &dyn Model) -> BondResult<()> {
        Store::delete(self, model).await
    }

    async fn count(&self) -> BondResult<u64> {
        Store::count(self).await
    }

    async fn truncate(&self) -> BondResult<()> {
        Store::truncate(self).await
    }

    async fn drop_table(&self) -> BondResult<()> {
        Store::drop_table(self).await
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Store {}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("bound", &self.inner.collection.is_some())
            .finish()
    }
}
