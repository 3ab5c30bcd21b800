use super::column::Columns;
use super::fragment::Fragment;
use super::hash::ContentHasher;
use super::table::Table;
use super::template::Template;
use super::where_clause::Where;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// How a join matches rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinConstraint {
    None,
    On(Where),
    Using(Columns),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Table,
    pub constraint: JoinConstraint,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: Table::new(table),
            constraint: JoinConstraint::None,
        }
    }

    pub fn inner(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, table)
    }

    pub fn left(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, table)
    }

    pub fn on(mut self, on: Where) -> Self {
        self.constraint = JoinConstraint::On(on);
        self
    }

    pub fn using(mut self, columns: Columns) -> Self {
        self.constraint = JoinConstraint::Using(columns);
        self
    }
}

impl Fragment for Join {
    fn compile(&self, template: &Template) -> String {
        let head = format!("{} {}", self.kind.keyword(), self.table.compile(template));
        match &self.constraint {
            JoinConstraint::None => head,
            JoinConstraint::On(on) => format!("{head} ON {}", on.compile(template)),
            JoinConstraint::Using(cols) => format!("{head} USING ({})", cols.compile(template)),
        }
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("join").str(self.kind.keyword());
        self.table.hash_into(hasher);
        match &self.constraint {
            JoinConstraint::None => {
                hasher.absent();
            }
            JoinConstraint::On(on) => on.hash_into(hasher),
            JoinConstraint::Using(cols) => {
                hasher.tag("using");
                cols.hash_items(hasher);
            }
        }
    }
}

/// Space separated joins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Joins {
    pub joins: Vec<Join>,
}

impl Joins {
    pub fn new(joins: impl IntoIterator<Item = Join>) -> Self {
        Self {
            joins: joins.into_iter().collect(),
        }
    }
}

impl Fragment for Joins {
    fn compile(&self, template: &Template) -> String {
        self.joins
            .iter()
            .map(|j| j.compile(template))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag("joins").count(self.joins.len());
        for join in &self.joins {
            join.hash_into(hasher);
        }
    }
}
