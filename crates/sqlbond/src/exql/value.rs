use super::column::Column;
use super::fragment::Fragment;
use super::hash::ContentHasher;
use super::template::Template;

/// A value slot in a statement.
///
/// Values are never inlined: a bound parameter renders as `?` and the engine
/// maps it to the driver's placeholder syntax. The parameter itself travels
/// separately, so statements differing only in parameter values share one
/// cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Placeholder,
    Raw(String),
}

impl Value {
    pub fn placeholder() -> Self {
        Value::Placeholder
    }

    pub fn raw(expr: impl Into<String>) -> Self {
        Value::Raw(expr.into())
    }
}

impl Fragment for Value {
    fn compile(&self, _template: &Template) -> String {
        match self {
            Value::Placeholder => "?".to_string(),
            Value::Raw(expr) => expr.clone(),
        }
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            Value::Placeholder => hasher.tag("placeholder"),
            Value::Raw(expr) => hasher.tag("value_raw").str(expr),
        };
    }
}

/// One parenthesized row of values: `(?, ?, DEFAULT)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values {
    pub values: Vec<Value>,
}

impl Values {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// `n` placeholders.
    pub fn placeholders(n: usize) -> Self {
        Self {
            values: vec![Value::Placeholder; n],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Fragment for Values {
    fn compile(&self, template: &Template) -> String {
        let inner = self
            .values
            .iter()
            .map(|v| v.compile(template))
            .collect::<Vec<_>>()
            .join(", ");
        format!("({inner})")
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("values").count(self.values.len());
        for value in &self.values {
            value.hash_into(hasher);
        }
    }
}

/// Several value rows for multi-row inserts: `(?, ?), (?, ?)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueGroups {
    pub groups: Vec<Values>,
}

impl ValueGroups {
    pub fn new(groups: impl IntoIterator<Item = Values>) -> Self {
        Self {
            groups: groups.into_iter().collect(),
        }
    }
}

impl Fragment for ValueGroups {
    fn compile(&self, template: &Template) -> String {
        self.groups
            .iter()
            .map(|g| g.compile(template))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("value_groups").count(self.groups.len());
        for group in &self.groups {
            group.hash_into(hasher);
        }
    }
}

/// `column <op> value`, as used in `SET` lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnValue {
    pub column: Column,
    pub operator: String,
    pub value: Value,
}

impl ColumnValue {
    pub fn new(column: impl Into<Column>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value,
        }
    }

    /// `column = ?`
    pub fn bind(column: impl Into<Column>) -> Self {
        Self::new(column, "=", Value::Placeholder)
    }
}

impl Fragment for ColumnValue {
    fn compile(&self, template: &Template) -> String {
        format!(
            "{} {} {}",
            self.column.compile(template),
            self.operator,
            self.value.compile(template)
        )
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("column_value");
        self.column.hash_into(hasher);
        hasher.str(&self.operator);
        self.value.hash_into(hasher);
    }
}

/// Comma separated `column = value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnValues {
    pub pairs: Vec<ColumnValue>,
}

impl ColumnValues {
    pub fn new(pairs: impl IntoIterator<Item = ColumnValue>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// `a = ?, b = ?` for each column name.
    pub fn bind<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self::new(columns.into_iter().map(ColumnValue::bind))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Fragment for ColumnValues {
    fn compile(&self, template: &Template) -> String {
        self.pairs
            .iter()
            .map(|p| p.compile(template))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("column_values").count(self.pairs.len());
        for pair in &self.pairs {
            pair.hash_into(hasher);
        }
    }
}
