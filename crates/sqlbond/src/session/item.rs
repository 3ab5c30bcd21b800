use super::{Session, Store};
use crate::collection::{Collection, SqlCollection};
use crate::model::Model;
use std::fmt;
use std::sync::Arc;

/// Something a store can be looked up by.
///
/// Resolution order when turned into a store name: a plain name is used as
/// is; a factory is called with the session and its collection's name used;
/// a collection gives its own name; a model gives the name of the store it
/// reports. Anything else resolves to the empty name, which yields a
/// storeless handle.
#[derive(Clone, Copy, Default)]
pub enum Item<'a> {
    Name(&'a str),
    Factory(&'a (dyn Fn(&Session) -> Arc<dyn Collection> + 'a)),
    Collection(&'a dyn Collection),
    Model(&'a dyn Model),
    #[default]
    Unknown,
}

impl<'a> Item<'a> {
    pub fn model<M: Model>(model: &'a M) -> Self {
        Item::Model(model)
    }

    pub fn factory<F>(factory: &'a F) -> Self
    where
        F: Fn(&Session) -> Arc<dyn Collection> + 'a,
    {
        Item::Factory(factory)
    }
}

impl<'a> From<&'a str> for Item<'a> {
    fn from(name: &'a str) -> Self {
        Item::Name(name)
    }
}

impl<'a> From<&'a String> for Item<'a> {
    fn from(name: &'a String) -> Self {
        Item::Name(name)
    }
}

impl<'a> From<&'a dyn Model> for Item<'a> {
    fn from(model: &'a dyn Model) -> Self {
        Item::Model(model)
    }
}

impl<'a> From<&'a Box<dyn Model>> for Item<'a> {
    fn from(model: &'a Box<dyn Model>) -> Self {
        Item::Model(model.as_ref())
    }
}

impl<'a> From<&'a Arc<dyn Model>> for Item<'a> {
    fn from(model: &'a Arc<dyn Model>) -> Self {
        Item::Model(model.as_ref())
    }
}

impl<'a> From<&'a dyn Collection> for Item<'a> {
    fn from(collection: &'a dyn Collection) -> Self {
        Item::Collection(collection)
    }
}

impl<'a> From<&'a Arc<dyn Collection>> for Item<'a> {
    fn from(collection: &'a Arc<dyn Collection>) -> Self {
        Item::Collection(collection.as_ref())
    }
}

impl<'a> From<&'a SqlCollection> for Item<'a> {
    fn from(collection: &'a SqlCollection) -> Self {
        Item::Collection(collection)
    }
}

impl<'a> From<&'a Store> for Item<'a> {
    fn from(store: &'a Store) -> Self {
        Item::Collection(store)
    }
}

impl fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Item::Factory(_) => f.write_str("Factory(..)"),
            Item::Collection(c) => f.debug_tuple("Collection").field(&c.name()).finish(),
            Item::Model(_) => f.write_str("Model(..)"),
            Item::Unknown => f.write_str("Unknown"),
        }
    }
}
