use super::fragment::{Fragment, compile_opt, hash_opt};
use super::hash::{ContentHash, ContentHasher};
use super::layout::{Field, LayoutData};
use super::template::Template;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// What a [`Statement`] does; selects the layout it compiles with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatementKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
    Count,
    Truncate,
    DropTable,
    DropDatabase,
    /// Literal SQL; never templated or cached.
    RawSql,
}

impl StatementKind {
    fn tag(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Count => "count",
            StatementKind::Truncate => "truncate",
            StatementKind::DropTable => "drop_table",
            StatementKind::DropDatabase => "drop_database",
            StatementKind::RawSql => "raw_sql",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Post-compilation text transform attached to one statement.
pub type Amendment = Arc<dyn Fn(&str) -> String + Send + Sync>;

type Slot = Option<Box<dyn Fragment>>;

/// A dialect-agnostic SQL statement.
///
/// Built once through the consuming setters, then compiled any number of
/// times against any number of [`Template`]s:
///
/// ```ignore
/// let stmt = Statement::select()
///     .table(Table::new("users"))
///     .where_clause(Where::raw("id = 1"))
///     .limit(10);
/// let sql = stmt.compile(&template);
/// ```
///
/// The content hash is computed on first use and then reused; setters take
/// `self` by value, so a statement that has been shared can no longer change.
#[derive(Default)]
pub struct Statement {
    kind: StatementKind,
    table: Slot,
    database: Slot,
    columns: Slot,
    values: Slot,
    column_values: Slot,
    order_by: Slot,
    group_by: Slot,
    joins: Slot,
    where_clause: Slot,
    returning: Slot,
    distinct: bool,
    limit: Option<u64>,
    offset: Option<u64>,
    sql: String,
    hash: OnceLock<ContentHash>,
    amendment: Option<Amendment>,
}

macro_rules! slot_setter {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub fn $name(mut self, fragment: impl Fragment + 'static) -> Self {
            self.$name = Some(Box::new(fragment));
            self.hash = OnceLock::new();
            self
        }
    };
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn select() -> Self {
        Self::new(StatementKind::Select)
    }

    pub fn insert() -> Self {
        Self::new(StatementKind::Insert)
    }

    pub fn update() -> Self {
        Self::new(StatementKind::Update)
    }

    pub fn delete() -> Self {
        Self::new(StatementKind::Delete)
    }

    pub fn count() -> Self {
        Self::new(StatementKind::Count)
    }

    pub fn truncate() -> Self {
        Self::new(StatementKind::Truncate)
    }

    pub fn drop_table() -> Self {
        Self::new(StatementKind::DropTable)
    }

    pub fn drop_database() -> Self {
        Self::new(StatementKind::DropDatabase)
    }

    /// A literal SQL statement, returned verbatim by [`Statement::compile`].
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            kind: StatementKind::RawSql,
            sql: sql.into(),
            ..Default::default()
        }
    }

    slot_setter!(table);
    slot_setter!(
        /// Target of `DROP DATABASE`.
        database
    );
    slot_setter!(columns);
    slot_setter!(values);
    slot_setter!(
        /// `SET` pairs of an update.
        column_values
    );
    slot_setter!(order_by);
    slot_setter!(group_by);
    slot_setter!(joins);
    slot_setter!(where_clause);
    slot_setter!(returning);

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self.hash = OnceLock::new();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self.hash = OnceLock::new();
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self.hash = OnceLock::new();
        self
    }

    /// Attach a text transform applied after every compile.
    ///
    /// The transform is not part of the statement hash and its output is
    /// never cached.
    pub fn with_amendment(mut self, amend: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.amendment = Some(Arc::new(amend));
        self
    }

    pub fn set_amendment(&mut self, amend: Option<Amendment>) {
        self.amendment = amend;
    }

    /// Apply the amendment hook, if any.
    pub fn amend(&self, compiled: &str) -> String {
        match &self.amendment {
            Some(amend) => amend(compiled),
            None => compiled.to_string(),
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// The literal text of a raw statement ("" for other kinds).
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Content hash of the statement, computed once.
    pub fn hash(&self) -> ContentHash {
        *self.hash.get_or_init(|| self.compute_hash())
    }

    fn compute_hash(&self) -> ContentHash {
        let mut h = ContentHasher::new();
        h.tag("statement").str(self.kind().tag());
        if self.kind() == StatementKind::RawSql {
            h.str(&self.sql);
            return h.finish();
        }
        for slot in self.slots() {
            hash_opt(slot, &mut h);
        }
        h.bool(self.distinct)
            .opt_u64(self.limit)
            .opt_u64(self.offset);
        h.finish()
    }

    fn slots(&self) -> [Option<&dyn Fragment>; 10] {
        [
            self.table.as_deref(),
            self.database.as_deref(),
            self.columns.as_deref(),
            self.values.as_deref(),
            self.column_values.as_deref(),
            self.order_by.as_deref(),
            self.group_by.as_deref(),
            self.joins.as_deref(),
            self.where_clause.as_deref(),
            self.returning.as_deref(),
        ]
    }

    /// Compile into SQL text for the given dialect.
    ///
    /// Raw statements come back verbatim. Everything else is looked up in
    /// the template's cache by content hash and rendered on a miss; the
    /// amendment hook runs last, on every call.
    ///
    /// # Panics
    ///
    /// When the template has no layout for this statement's kind. That is a
    /// dialect wiring defect, not a runtime condition.
    pub fn compile(&self, template: &Template) -> String {
        let kind = self.kind();
        if kind == StatementKind::RawSql {
            return self.sql.clone();
        }

        let hash = self.hash();
        if let Some(cached) = template.read(&hash) {
            return self.amend(&cached);
        }

        let Some(layout) = template.layout(kind) else {
            panic!("sqlbond: no layout registered for {kind} statements");
        };

        let mut data = LayoutData::new();
        data.set(Field::Table, compile_opt(self.table.as_deref(), template))
            .set(Field::Database, compile_opt(self.database.as_deref(), template))
            .set(Field::Columns, compile_opt(self.columns.as_deref(), template))
            .set(Field::Values, compile_opt(self.values.as_deref(), template))
            .set(
                Field::ColumnValues,
                compile_opt(self.column_values.as_deref(), template),
            )
            .set(Field::OrderBy, compile_opt(self.order_by.as_deref(), template))
            .set(Field::GroupBy, compile_opt(self.group_by.as_deref(), template))
            .set(Field::Joins, compile_opt(self.joins.as_deref(), template))
            .set(
                Field::Where,
                compile_opt(self.where_clause.as_deref(), template),
            )
            .set(
                Field::Returning,
                compile_opt(self.returning.as_deref(), template),
            )
            .set(Field::Distinct, if self.distinct { "DISTINCT" } else { "" })
            .set(
                Field::Limit,
                self.limit.map(|n| n.to_string()).unwrap_or_default(),
            )
            .set(
                Field::Offset,
                self.offset.map(|n| n.to_string()).unwrap_or_default(),
            );

        let rendered = layout.render(&data);
        let compiled = rendered.trim();
        bond_trace!(target: "sqlbond.exql", kind = %kind, hash = ?hash, sql = %compiled, "compiled statement");
        template.write(hash, compiled);

        self.amend(compiled)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Statement");
        s.field("kind", &self.kind());
        if self.kind() == StatementKind::RawSql {
            s.field("sql", &self.sql);
        } else {
            s.field("table", &self.table)
                .field("database", &self.database)
                .field("columns", &self.columns)
                .field("values", &self.values)
                .field("column_values", &self.column_values)
                .field("order_by", &self.order_by)
                .field("group_by", &self.group_by)
                .field("joins", &self.joins)
                .field("where", &self.where_clause)
                .field("returning", &self.returning)
                .field("distinct", &self.distinct)
                .field("limit", &self.limit)
                .field("offset", &self.offset);
        }
        s.field("amended", &self.amendment.is_some()).finish()
    }
}
