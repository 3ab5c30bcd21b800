use super::fragment::Fragment;
use super::hash::ContentHasher;
use super::template::Template;

/// A column reference: a (possibly dotted or aliased) identifier, or a raw
/// expression such as `COUNT(*)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Name(String),
    Raw(String),
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column::Name(name.into())
    }

    pub fn raw(expr: impl Into<String>) -> Self {
        Column::Raw(expr.into())
    }
}

impl Fragment for Column {
    fn compile(&self, template: &Template) -> String {
        match self {
            Column::Name(name) => template.quote_ident(name),
            Column::Raw(expr) => expr.clone(),
        }
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            Column::Name(name) => hasher.tag("column").str(name),
            Column::Raw(expr) => hasher.tag("column_raw").str(expr),
        };
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}

/// A comma separated column list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    pub columns: Vec<Column>,
}

impl Columns {
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push(&mut self, column: impl Into<Column>) {
        self.columns.push(column.into());
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn hash_items(&self, hasher: &mut ContentHasher) {
        hasher.count(self.columns.len());
        for column in &self.columns {
            column.hash_into(hasher);
        }
    }
}

impl Fragment for Columns {
    fn compile(&self, template: &Template) -> String {
        self.columns
            .iter()
            .map(|c| c.compile(template))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("columns");
        self.hash_items(hasher);
    }
}

/// Columns listed after `RETURNING`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Returning(pub Columns);

impl Returning {
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self(Columns::new(columns))
    }
}

impl Fragment for Returning {
    fn compile(&self, template: &Template) -> String {
        self.0.compile(template)
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("returning");
        self.0.hash_items(hasher);
    }
}
