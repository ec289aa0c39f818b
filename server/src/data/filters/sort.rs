//! Sort specification parsing
//!
//! `order_by` strings are comma-separated field names with an optional
//! leading sign: `+name,-registered_at` (ascending when unsigned). Any
//! declared attribute of the entity is sortable, computed fields included;
//! sortability is governed by existence, not by the filter allow-list.

use super::error::FilterError;
use super::schema::{EntityKind, FieldDef};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One resolved ordering term
#[derive(Debug, Clone)]
pub struct SortField {
    pub field: &'static FieldDef,
    pub direction: Direction,
}

/// Parse and validate an `order_by` string against the entity's full
/// attribute set. Empty input yields an empty ordering.
pub fn parse_sort(kind: EntityKind, raw: &str) -> Result<Vec<SortField>, FilterError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let desc = kind.descriptor();
    let mut fields = Vec::new();
    for token in raw.split(',') {
        let (direction, name) = match token.strip_prefix('-') {
            Some(rest) => (Direction::Desc, rest),
            None => (Direction::Asc, token.strip_prefix('+').unwrap_or(token)),
        };
        let Some(field) = desc.field(name) else {
            return Err(FilterError::UnknownField {
                entity: kind.name(),
                field: name.to_string(),
            });
        };
        fields.push(SortField { field, direction });
    }
    Ok(fields)
}

/// Render an ORDER BY clause body, or `None` for an empty ordering
pub fn order_by_sql(fields: &[SortField]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let terms: Vec<String> = fields
        .iter()
        .map(|s| format!("{} {}", s.field.sql_expr(), s.direction.sql()))
        .collect();
    Some(terms.join(", "))
}
