//! Adapter registry.
//!
//! An adapter pairs a dialect [`Template`] with an optional function that
//! opens a [`Database`] from a URL. Drivers built into this crate register
//! statically through `inventory`; applications can add their own at runtime
//! with [`register_adapter`].
//!
//! ```ignore
//! sqlbond::inventory::submit! {
//!     sqlbond::AdapterRegistration {
//!         name: "sqlite",
//!         layouts: sqlite_layouts,
//!         open: Some(open_sqlite),
//!     }
//! }
//! ```

use crate::engine::Database;
use crate::error::{BondError, BondResult};
use crate::exql::{Layouts, Template};
use futures_core::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Opens a database for an adapter from a connection URL.
pub type Opener = fn(&str, Arc<Template>) -> BoxFuture<'static, BondResult<Arc<dyn Database>>>;

/// Static adapter registration, collected with `inventory`.
pub struct AdapterRegistration {
    pub name: &'static str,
    /// Dialect layouts; turned into a [`Template`] on first lookup.
    pub layouts: fn() -> Layouts,
    pub open: Option<Opener>,
}

inventory::collect!(AdapterRegistration);

/// A registered dialect.
pub struct Adapter {
    name: String,
    template: Arc<Template>,
    opener: Option<Opener>,
}

impl Adapter {
    pub fn new(name: impl Into<String>, template: Template) -> Self {
        Self {
            name: name.into(),
            template: Arc::new(template),
            opener: None,
        }
    }

    /// Build the adapter's template from layout data.
    pub fn from_layouts(name: impl Into<String>, layouts: Layouts) -> BondResult<Self> {
        Ok(Self::new(name, Template::new(layouts)?))
    }

    pub fn with_opener(mut self, opener: Opener) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Open a database through the adapter's opener.
    pub async fn open(&self, url: &str) -> BondResult<Arc<dyn Database>> {
        let Some(opener) = self.opener else {
            return Err(BondError::Connection(format!(
                "adapter {} cannot open connections",
                self.name
            )));
        };
        opener(url, Arc::clone(&self.template)).await
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("name", &self.name)
            .field("can_open", &self.opener.is_some())
            .finish()
    }
}

fn registry() -> &'static RwLock<HashMap<String, Arc<Adapter>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<Adapter>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Add or replace an adapter.
pub fn register_adapter(adapter: Adapter) -> Arc<Adapter> {
    let adapter = Arc::new(adapter);
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(adapter.name.clone(), Arc::clone(&adapter));
    bond_debug!(target: "sqlbond.session", adapter = %adapter.name, "registered adapter");
    adapter
}

/// Look up an adapter by name.
///
/// Static registrations are materialized on first lookup; later lookups
/// return the same instance and therefore share one compile cache.
pub fn adapter(name: &str) -> BondResult<Arc<Adapter>> {
    if let Some(found) = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
    {
        return Ok(Arc::clone(found));
    }

    let reg = inventory::iter::<AdapterRegistration>
        .into_iter()
        .find(|reg| reg.name == name)
        .ok_or_else(|| BondError::UnknownAdapter(name.to_string()))?;

    let mut built = Adapter::from_layouts(reg.name, (reg.layouts)())?;
    built.opener = reg.open;

    let mut map = registry().write().unwrap_or_else(PoisonError::into_inner);
    let entry = map
        .entry(name.to_string())
        .or_insert_with(|| Arc::new(built));
    Ok(Arc::clone(entry))
}

/// Names of every adapter, static or runtime, sorted.
pub fn registered_adapters() -> Vec<String> {
    let mut names: Vec<String> = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    for reg in inventory::iter::<AdapterRegistration> {
        names.push(reg.name.to_string());
    }
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exql::{Statement, StatementKind, Table};

    fn layouts() -> Layouts {
        Layouts::new().layout(StatementKind::Select, "SELECT * FROM {table}")
    }

    #[test]
    fn unknown_adapter_is_an_error() {
        let err = adapter("no-such-adapter").unwrap_err();
        assert!(matches!(err, BondError::UnknownAdapter(ref n) if n == "no-such-adapter"));
    }

    #[test]
    fn runtime_registration_is_shared() {
        register_adapter(Adapter::from_layouts("adapter-test-shared", layouts()).unwrap());
        let a = adapter("adapter-test-shared").unwrap();
        let b = adapter("adapter-test-shared").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registered_adapters().contains(&"adapter-test-shared".to_string()));

        let stmt = Statement::select().table(Table::new("users"));
        assert_eq!(stmt.compile(a.template()), "SELECT * FROM users");
        assert_eq!(b.template().cache_stats().entries, 1);
    }

    #[tokio::test]
    async fn open_without_opener_fails() {
        let a = Adapter::from_layouts("adapter-test-no-opener", layouts()).unwrap();
        let err = a.open("mem://").await.err().unwrap();
        assert!(matches!(err, BondError::Connection(_)));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn postgres_is_registered_statically() {
        let pg = adapter(crate::postgres::ADAPTER).unwrap();
        assert_eq!(pg.name(), "postgresql");
        assert!(Arc::ptr_eq(&pg, &adapter("postgresql").unwrap()));
    }
}
