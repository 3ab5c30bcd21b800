use super::column::{Column, Columns};
use super::fragment::Fragment;
use super::hash::ContentHasher;
use super::template::Template;

/// Sort direction. `Default` leaves the direction to the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Default,
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    pub column: Column,
    pub order: Order,
}

impl SortColumn {
    pub fn new(column: impl Into<Column>, order: Order) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    pub fn asc(column: impl Into<Column>) -> Self {
        Self::new(column, Order::Asc)
    }

    pub fn desc(column: impl Into<Column>) -> Self {
        Self::new(column, Order::Desc)
    }
}

impl Fragment for SortColumn {
    fn compile(&self, template: &Template) -> String {
        let column = self.column.compile(template);
        match self.order {
            Order::Default => column,
            Order::Asc => format!("{column} ASC"),
            Order::Desc => format!("{column} DESC"),
        }
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("sort");
        self.column.hash_into(hasher);
        hasher.str(match self.order {
            Order::Default => "",
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        });
    }
}

/// The list after `ORDER BY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    pub columns: Vec<SortColumn>,
}

impl OrderBy {
    pub fn new(columns: impl IntoIterator<Item = SortColumn>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }
}

impl Fragment for OrderBy {
    fn compile(&self, template: &Template) -> String {
        self.columns
            .iter()
            .map(|c| c.compile(template))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("order_by").count(self.columns.len());
        for column in &self.columns {
            column.hash_into(hasher);
        }
    }
}

/// The list after `GROUP BY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupBy(pub Columns);

impl GroupBy {
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self(Columns::new(columns))
    }
}

impl Fragment for GroupBy {
    fn compile(&self, template: &Template) -> String {
        self.0.compile(template)
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("group_by");
        self.0.hash_items(hasher);
    }
}
