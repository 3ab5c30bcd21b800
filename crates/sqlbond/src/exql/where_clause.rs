use super::column::Column;
use super::fragment::Fragment;
use super::hash::ContentHasher;
use super::template::Template;
use super::value::Value;

/// A boolean condition tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Literal SQL, e.g. `id = 1`.
    Raw(String),
    /// `column <op> value`
    Compare {
        column: Column,
        operator: String,
        value: Value,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition::Raw(sql.into())
    }

    pub fn compare(column: impl Into<Column>, operator: impl Into<String>, value: Value) -> Self {
        Condition::Compare {
            column: column.into(),
            operator: operator.into(),
            value,
        }
    }

    /// `column = ?`
    pub fn eq(column: impl Into<Column>) -> Self {
        Self::compare(column, "=", Value::Placeholder)
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<Column>) -> Self {
        Self::compare(column, "IS", Value::raw("NULL"))
    }

    fn compile_in(&self, template: &Template, grouped: bool) -> String {
        match self {
            Condition::Raw(sql) if grouped => format!("({sql})"),
            Condition::Raw(sql) => sql.clone(),
            Condition::Compare {
                column,
                operator,
                value,
            } => format!(
                "{} {} {}",
                column.compile(template),
                operator,
                value.compile(template)
            ),
            Condition::And(items) => join_group(items, " AND ", template, grouped),
            Condition::Or(items) => join_group(items, " OR ", template, grouped),
        }
    }
}

fn join_group(items: &[Condition], sep: &str, template: &Template, grouped: bool) -> String {
    // A single-item group is transparent and keeps the caller's grouping.
    if let [only] = items {
        return only.compile_in(template, grouped);
    }
    let nested = items.len() > 1;
    let body = items
        .iter()
        .map(|c| c.compile_in(template, nested))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep);
    if grouped && nested {
        format!("({body})")
    } else {
        body
    }
}

impl Fragment for Condition {
    fn compile(&self, template: &Template) -> String {
        self.compile_in(template, false)
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            Condition::Raw(sql) => {
                hasher.tag("cond_raw").str(sql);
            }
            Condition::Compare {
                column,
                operator,
                value,
            } => {
                hasher.tag("cond_compare");
                column.hash_into(hasher);
                hasher.str(operator);
                value.hash_into(hasher);
            }
            Condition::And(items) | Condition::Or(items) => {
                let tag = if matches!(self, Condition::And(_)) {
                    "cond_and"
                } else {
                    "cond_or"
                };
                hasher.tag(tag).count(items.len());
                for item in items {
                    item.hash_into(hasher);
                }
            }
        }
    }
}

/// The conditions after `WHERE`, joined with `AND`.
///
/// The `WHERE` keyword itself belongs to the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Where {
    pub conditions: Vec<Condition>,
}

impl Where {
    pub fn new(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new([Condition::raw(sql)])
    }

    /// `a = ? AND b = ?` for each column.
    pub fn bind_eq<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self::new(columns.into_iter().map(Condition::eq))
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Fragment for Where {
    fn compile(&self, template: &Template) -> String {
        join_group(&self.conditions, " AND ", template, false)
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("where").count(self.conditions.len());
        for condition in &self.conditions {
            condition.hash_into(hasher);
        }
    }
}
