use super::hash::ContentHash;
use super::layout::Layout;
use super::statement::StatementKind;
use crate::error::{BondError, BondResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Dialect layouts as plain data.
///
/// Any statement kind may be left out; compiling a statement of a kind the
/// dialect has no layout for panics.
///
/// ```ignore
/// let layouts: Layouts = serde_json::from_str(r#"{
///     "identifier_quote": "`",
///     "select": "SELECT {^columns}*{/columns}{columns} FROM {table}"
/// }"#)?;
/// let template = Template::new(layouts)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layouts {
    /// Wraps each identifier part, e.g. `"` for `"users"."id"`. Empty disables quoting.
    pub identifier_quote: String,
    pub select: Option<String>,
    pub insert: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
    pub count: Option<String>,
    pub truncate: Option<String>,
    pub drop_table: Option<String>,
    pub drop_database: Option<String>,
}

impl Layouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier_quote(mut self, quote: impl Into<String>) -> Self {
        self.identifier_quote = quote.into();
        self
    }

    /// Set the layout for one statement kind.
    ///
    /// Raw SQL statements never use a layout; setting one for them is ignored.
    pub fn layout(mut self, kind: StatementKind, layout: impl Into<String>) -> Self {
        let layout = Some(layout.into());
        match kind {
            StatementKind::Select => self.select = layout,
            StatementKind::Insert => self.insert = layout,
            StatementKind::Update => self.update = layout,
            StatementKind::Delete => self.delete = layout,
            StatementKind::Count => self.count = layout,
            StatementKind::Truncate => self.truncate = layout,
            StatementKind::DropTable => self.drop_table = layout,
            StatementKind::DropDatabase => self.drop_database = layout,
            StatementKind::RawSql => {}
        }
        self
    }
}

/// Options for a [`Template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateOptions {
    /// Maximum number of compiled statements kept. `None` means unbounded,
    /// `Some(0)` disables caching.
    pub cache_capacity: Option<usize>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            cache_capacity: Some(4096),
        }
    }
}

impl TemplateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn unbounded_cache(mut self) -> Self {
        self.cache_capacity = None;
        self
    }

    pub fn disable_cache(mut self) -> Self {
        self.cache_capacity = Some(0);
        self
    }
}

/// Snapshot of a template's compile cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
struct ParsedLayouts {
    select: Option<Layout>,
    insert: Option<Layout>,
    update: Option<Layout>,
    delete: Option<Layout>,
    count: Option<Layout>,
    truncate: Option<Layout>,
    drop_table: Option<Layout>,
    drop_database: Option<Layout>,
}

fn parse_layout(kind: &str, source: &Option<String>) -> BondResult<Option<Layout>> {
    source
        .as_deref()
        .map(|src| {
            Layout::parse(src).map_err(|e| BondError::Layout(format!("{kind} layout: {e}")))
        })
        .transpose()
}

/// A dialect's layouts plus its compiled-statement cache.
///
/// One `Template` exists per adapter; it is shared (`Arc`) by every engine
/// of that adapter and safe to use from many tasks at once.
#[derive(Debug)]
pub struct Template {
    layouts: Layouts,
    parsed: ParsedLayouts,
    options: TemplateOptions,
    cache: DashMap<ContentHash, Arc<str>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Template {
    /// Parse `layouts` with default options.
    pub fn new(layouts: Layouts) -> BondResult<Self> {
        Self::with_options(layouts, TemplateOptions::default())
    }

    pub fn with_options(layouts: Layouts, options: TemplateOptions) -> BondResult<Self> {
        let parsed = ParsedLayouts {
            select: parse_layout("select", &layouts.select)?,
            insert: parse_layout("insert", &layouts.insert)?,
            update: parse_layout("update", &layouts.update)?,
            delete: parse_layout("delete", &layouts.delete)?,
            count: parse_layout("count", &layouts.count)?,
            truncate: parse_layout("truncate", &layouts.truncate)?,
            drop_table: parse_layout("drop_table", &layouts.drop_table)?,
            drop_database: parse_layout("drop_database", &layouts.drop_database)?,
        };
        Ok(Self {
            layouts,
            parsed,
            options,
            cache: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Layout sources this template was built from.
    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Parsed layout for `kind`, if the dialect defines one.
    pub fn layout(&self, kind: StatementKind) -> Option<&Layout> {
        let p = &self.parsed;
        match kind {
            StatementKind::Select => p.select.as_ref(),
            StatementKind::Insert => p.insert.as_ref(),
            StatementKind::Update => p.update.as_ref(),
            StatementKind::Delete => p.delete.as_ref(),
            StatementKind::Count => p.count.as_ref(),
            StatementKind::Truncate => p.truncate.as_ref(),
            StatementKind::DropTable => p.drop_table.as_ref(),
            StatementKind::DropDatabase => p.drop_database.as_ref(),
            StatementKind::RawSql => None,
        }
    }

    /// Quote an identifier, honoring dotted names, `*` and `name AS alias`.
    pub fn quote_ident(&self, ident: &str) -> String {
        let ident = ident.trim();
        if let Some((name, alias)) = split_alias(ident) {
            return format!("{} AS {}", self.quote_ident(name), self.quote_part(alias));
        }
        ident
            .split('.')
            .map(|part| self.quote_part(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn quote_part(&self, part: &str) -> String {
        let q = self.layouts.identifier_quote.as_str();
        let part = part.trim();
        if q.is_empty() || part == "*" || (part.starts_with(q) && part.ends_with(q) && part.len() > q.len()) {
            return part.to_string();
        }
        let escaped = part.replace(q, &q.repeat(2));
        format!("{q}{escaped}{q}")
    }

    /// Cached text for a statement hash.
    pub fn read(&self, hash: &ContentHash) -> Option<Arc<str>> {
        match self.cache.get(hash) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store compiled text. Ignored once the cache is at capacity.
    pub fn write(&self, hash: ContentHash, compiled: &str) {
        if let Some(capacity) = self.options.cache_capacity {
            if self.cache.len() >= capacity && !self.cache.contains_key(&hash) {
                return;
            }
        }
        self.cache.insert(hash, Arc::from(compiled));
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn split_alias(ident: &str) -> Option<(&str, &str)> {
    let lower = ident.to_ascii_lowercase();
    let idx = lower.rfind(" as ")?;
    let (name, alias) = (ident[..idx].trim(), ident[idx + 4..].trim());
    (!name.is_empty() && !alias.is_empty()).then_some((name, alias))
}
