//! Conversions between [`Param`]/[`Record`] and the PostgreSQL wire types.

use crate::error::{BondError, BondResult};
use crate::param::{Param, Record};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

/// Rewrite `?` placeholders to `$1`, `$2`, ...
///
/// String constants (including `E'...'` with backslash escapes and
/// `$tag$...$tag$` bodies), quoted identifiers and comments are copied
/// unchanged. `??` is an escaped literal `?`, for the JSONB operators.
pub fn rewrite_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    let mut i = 0;

    while i < sql.len() {
        let rest = &sql[i..];
        let verbatim = match rest.as_bytes()[0] {
            b'\'' => Some(quoted_len(rest, false)),
            b'E' | b'e' if rest[1..].starts_with('\'') && !word_before(sql, i) => {
                Some(1 + quoted_len(&rest[1..], true))
            }
            b'"' => Some(rest[1..].find('"').map_or(rest.len(), |end| end + 2)),
            b'-' if rest.starts_with("--") => {
                Some(rest.find('\n').map_or(rest.len(), |end| end + 1))
            }
            b'/' if rest.starts_with("/*") => {
                Some(rest[2..].find("*/").map_or(rest.len(), |end| end + 4))
            }
            b'$' if !word_before(sql, i) => dollar_quoted_len(rest),
            _ => None,
        };
        if let Some(len) = verbatim {
            out.push_str(&rest[..len]);
            i += len;
        } else if rest.starts_with("??") {
            out.push('?');
            i += 2;
        } else if rest.starts_with('?') {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
            i += 1;
        } else {
            let Some(c) = rest.chars().next() else {
                break;
            };
            out.push(c);
            i += c.len_utf8();
        }
    }
    out
}

/// Length of the `'...'` constant at the start of `s`, closing quote included.
fn quoted_len(s: &str, backslash_escapes: bool) -> usize {
    let mut chars = s.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if backslash_escapes => {
                chars.next();
            }
            '\'' if matches!(chars.peek(), Some((_, '\''))) => {
                chars.next();
            }
            '\'' => return i + 1,
            _ => {}
        }
    }
    s.len()
}

/// Length of the dollar-quoted body at the start of `s`, or `None` when the
/// `$` does not open one (e.g. `$1`).
fn dollar_quoted_len(s: &str) -> Option<usize> {
    let after = &s[1..];
    let tag_len = after.find(|c: char| !(c.is_alphanumeric() || c == '_'))?;
    if after.starts_with(|c: char| c.is_ascii_digit()) || !after[tag_len..].starts_with('$') {
        return None;
    }
    let delim = &s[..tag_len + 2];
    let body = &s[delim.len()..];
    Some(body.find(delim).map_or(s.len(), |end| 2 * delim.len() + end))
}

fn word_before(sql: &str, i: usize) -> bool {
    sql[..i]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl ToSql for Param {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Param::Null => Ok(IsNull::Yes),
            Param::Bool(v) => v.to_sql_checked(ty, out),
            Param::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::OID => u32::try_from(*v)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Param::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Param::Text(v) => match *ty {
                Type::JSON | Type::JSONB => {
                    serde_json::from_str::<serde_json::Value>(v)?.to_sql_checked(ty, out)
                }
                Type::UUID => Uuid::parse_str(v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Param::Bytes(v) => v.to_sql_checked(ty, out),
            Param::Json(v) => v.to_sql_checked(ty, out),
            Param::Uuid(v) => v.to_sql_checked(ty, out),
            Param::Timestamp(v) => match *ty {
                Type::TIMESTAMP => v.naive_utc().to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
        }
    }

    // Each variant checks its own type in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn get<'a, T>(row: &'a Row, idx: usize, column: &str) -> BondResult<Option<T>>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| BondError::decode(column, e.to_string()))
}

/// Decode one row into a [`Record`], column by column.
pub fn decode_row(row: &Row) -> BondResult<Record> {
    let mut record = Record::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let name = col.name();
        let value: Param = match *col.type_() {
            Type::BOOL => get::<bool>(row, idx, name)?.into(),
            Type::INT2 => get::<i16>(row, idx, name)?.into(),
            Type::INT4 => get::<i32>(row, idx, name)?.into(),
            Type::INT8 => get::<i64>(row, idx, name)?.into(),
            Type::OID => get::<u32>(row, idx, name)?.into(),
            Type::FLOAT4 => get::<f32>(row, idx, name)?.into(),
            Type::FLOAT8 => get::<f64>(row, idx, name)?.into(),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                get::<String>(row, idx, name)?.into()
            }
            Type::BYTEA => get::<Vec<u8>>(row, idx, name)?.into(),
            Type::JSON | Type::JSONB => get::<serde_json::Value>(row, idx, name)?.into(),
            Type::UUID => get::<Uuid>(row, idx, name)?.into(),
            Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx, name)?.into(),
            Type::TIMESTAMP => get::<NaiveDateTime>(row, idx, name)?
                .map(|ts| ts.and_utc())
                .into(),
            ref other => {
                return Err(BondError::decode(
                    name,
                    format!("unsupported column type {other}"),
                ));
            }
        };
        record.push(name, value);
    }
    Ok(record)
}
