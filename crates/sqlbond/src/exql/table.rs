use super::fragment::Fragment;
use super::hash::ContentHasher;
use super::template::Template;

/// One or more comma separated table names, each optionally aliased
/// (`"users AS u, roles"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Fragment for Table {
    fn compile(&self, template: &Template) -> String {
        self.name
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| template.quote_ident(s))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("table").str(&self.name);
    }
}

/// A database name, used by `DROP DATABASE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: String,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Fragment for Database {
    fn compile(&self, template: &Template) -> String {
        template.quote_ident(&self.name)
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("database").str(&self.name);
    }
}
