//! The layout language statement templates are written in.
//!
//! - `{field}` substitutes a field
//! - `{#field}...{/field}` renders its body only when the field is non-empty
//! - `{^field}...{/field}` renders its body only when the field is empty
//! - `{{` and `}}` are literal braces
//!
//! Layouts are parsed once when a [`Template`](super::Template) is built, so
//! rendering never fails.

use crate::error::{BondError, BondResult};
use std::fmt;
use std::str::FromStr;

/// A statement slot a layout can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Table,
    Database,
    Columns,
    Values,
    ColumnValues,
    OrderBy,
    GroupBy,
    Joins,
    Where,
    Returning,
    Distinct,
    Limit,
    Offset,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Table,
        Field::Database,
        Field::Columns,
        Field::Values,
        Field::ColumnValues,
        Field::OrderBy,
        Field::GroupBy,
        Field::Joins,
        Field::Where,
        Field::Returning,
        Field::Distinct,
        Field::Limit,
        Field::Offset,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Table => "table",
            Field::Database => "database",
            Field::Columns => "columns",
            Field::Values => "values",
            Field::ColumnValues => "column_values",
            Field::OrderBy => "order_by",
            Field::GroupBy => "group_by",
            Field::Joins => "joins",
            Field::Where => "where",
            Field::Returning => "returning",
            Field::Distinct => "distinct",
            Field::Limit => "limit",
            Field::Offset => "offset",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Field {
    type Err = BondError;

    fn from_str(s: &str) -> BondResult<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| BondError::Layout(format!("unknown field '{s}'")))
    }
}

/// Rendered fragment texts and scalars for one statement.
#[derive(Debug, Default, Clone)]
pub struct LayoutData {
    values: [String; 13],
}

impl LayoutData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) -> &mut Self {
        self.values[field.index()] = value.into();
        self
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(Field),
    Section {
        field: Field,
        inverted: bool,
        body: Vec<Node>,
    },
}

/// A parsed layout.
#[derive(Clone, PartialEq)]
pub struct Layout {
    source: String,
    nodes: Vec<Node>,
}

impl Layout {
    /// Parse a layout, rejecting unknown fields and unbalanced sections.
    pub fn parse(source: &str) -> BondResult<Self> {
        let mut parser = Parser {
            src: source,
            pos: 0,
        };
        let nodes = parser.parse_nodes(None)?;
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    /// The layout text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, data: &LayoutData) -> String {
        let mut out = String::with_capacity(self.source.len() + 64);
        render_nodes(&self.nodes, data, &mut out);
        out
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Layout").field(&self.source).finish()
    }
}

impl FromStr for Layout {
    type Err = BondError;

    fn from_str(s: &str) -> BondResult<Self> {
        Layout::parse(s)
    }
}

fn render_nodes(nodes: &[Node], data: &LayoutData, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(field) => out.push_str(data.get(*field)),
            Node::Section {
                field,
                inverted,
                body,
            } => {
                let present = !data.get(*field).is_empty();
                if present != *inverted {
                    render_nodes(body, data, out);
                }
            }
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    /// Parse until end of input, or until the closing tag of `open`.
    fn parse_nodes(&mut self, open: Option<Field>) -> BondResult<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];

            if rest.starts_with("{{") {
                text.push('{');
                self.pos += 2;
                continue;
            }
            if rest.starts_with("}}") {
                text.push('}');
                self.pos += 2;
                continue;
            }
            if rest.starts_with('}') {
                return Err(BondError::Layout(format!(
                    "unexpected '}}' at byte {}",
                    self.pos
                )));
            }
            if !rest.starts_with('{') {
                let ch = rest.chars().next().unwrap_or_default();
                text.push(ch);
                self.pos += ch.len_utf8();
                continue;
            }

            let Some(end) = rest.find('}') else {
                return Err(BondError::Layout(format!(
                    "unclosed tag at byte {}",
                    self.pos
                )));
            };
            let tag = rest[1..end].trim();
            self.pos += end + 1;

            if !text.is_empty() {
                nodes.push(Node::Text(std::mem::take(&mut text)));
            }

            if let Some(name) = tag.strip_prefix('/') {
                let field: Field = name.trim().parse()?;
                return match open {
                    Some(expected) if expected == field => Ok(nodes),
                    Some(expected) => Err(BondError::Layout(format!(
                        "section '{}' closed by '{}'",
                        expected.name(),
                        field.name()
                    ))),
                    None => Err(BondError::Layout(format!(
                        "closing '{}' without an open section",
                        field.name()
                    ))),
                };
            }

            let (inverted, name) = match tag.as_bytes().first() {
                Some(b'#') => (Some(false), &tag[1..]),
                Some(b'^') => (Some(true), &tag[1..]),
                _ => (None, tag),
            };
            let field: Field = name.trim().parse()?;

            match inverted {
                Some(inverted) => {
                    let body = self.parse_nodes(Some(field))?;
                    nodes.push(Node::Section {
                        field,
                        inverted,
                        body,
                    });
                }
                None => nodes.push(Node::Var(field)),
            }
        }

        if let Some(field) = open {
            return Err(BondError::Layout(format!(
                "section '{}' is never closed",
                field.name()
            )));
        }
        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }
        Ok(nodes)
    }
}
