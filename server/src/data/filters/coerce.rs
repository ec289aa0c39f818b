//! Value coercion
//!
//! Converts the raw value text of a parsed comparison into typed values
//! using the entity descriptor. The raw text is split on `,` first; how
//! many tokens are legal depends on the operator:
//!
//! - single-valued operators require exactly one token (extra tokens are
//!   rejected, not silently dropped),
//! - `in` takes one or more,
//! - `between` takes exactly two (low, high).

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::error::FilterError;
use super::ops::Op;
use super::parse::RawComparison;
use super::schema::{EntityDescriptor, FieldDef, FieldType};

/// Delimiter between value tokens inside one raw value
const VALUE_DELIMITER: char = ',';

/// A typed scalar value coerced from filter text
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
}

/// A validated comparison with typed values.
///
/// `values` holds exactly one element for single-valued operators, two for
/// `between` (low, high), one or more for `in`.
#[derive(Debug, Clone)]
pub struct TypedComparison {
    pub field: &'static FieldDef,
    pub op: Op,
    pub values: Vec<Value>,
}

/// Coerce one raw comparison against the entity descriptor.
///
/// The field was already validated against the allow-list during parsing;
/// the descriptor lookup here is the fail-safe for a field that somehow
/// has no declared attribute.
pub fn coerce(
    desc: &'static EntityDescriptor,
    comparison: &RawComparison<'_>,
) -> Result<TypedComparison, FilterError> {
    let Some(field) = desc.field(comparison.field) else {
        return Err(FilterError::UnknownField {
            entity: desc.kind.name(),
            field: comparison.field.to_string(),
        });
    };

    if comparison.op.is_string_match() && !field.ty.is_text() {
        return Err(FilterError::InvalidValue {
            field: field.name.to_string(),
            value: comparison.raw_value.to_string(),
            expected: "string",
        });
    }

    let tokens: Vec<&str> = comparison.raw_value.split(VALUE_DELIMITER).collect();

    match comparison.op {
        Op::Between => {
            if tokens.len() != 2 {
                return Err(FilterError::WrongArity {
                    field: field.name.to_string(),
                    op: comparison.op.token(),
                    expected: "exactly 2",
                    got: tokens.len(),
                });
            }
        }
        Op::In => {}
        _ => {
            if tokens.len() != 1 {
                return Err(FilterError::WrongArity {
                    field: field.name.to_string(),
                    op: comparison.op.token(),
                    expected: "exactly 1",
                    got: tokens.len(),
                });
            }
        }
    }

    let values = tokens
        .iter()
        .map(|token| coerce_token(field, token))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TypedComparison {
        field,
        op: comparison.op,
        values,
    })
}

/// Convert one value token to the field's semantic type
fn coerce_token(field: &FieldDef, token: &str) -> Result<Value, FilterError> {
    let invalid = || FilterError::InvalidValue {
        field: field.name.to_string(),
        value: token.to_string(),
        expected: field.ty.label(),
    };

    let value = match field.ty {
        FieldType::Bool => match token {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => return Err(invalid()),
        },
        FieldType::Int => Value::Int(token.parse::<i64>().map_err(|_| invalid())?),
        FieldType::Float => Value::Float(token.parse::<f64>().map_err(|_| invalid())?),
        FieldType::Str => Value::Str(token.to_string()),
        FieldType::Date => {
            Value::Date(NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| invalid())?)
        }
        FieldType::DateTime => {
            // RFC 3339, with a date-only fallback promoted to UTC midnight
            if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
                Value::DateTime(dt.with_timezone(&Utc))
            } else if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
                let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
                Value::DateTime(midnight.and_utc())
            } else {
                return Err(invalid());
            }
        }
        FieldType::Uuid => Value::Uuid(Uuid::parse_str(token).map_err(|_| invalid())?),
        FieldType::Enum(variants) => {
            if !variants.contains(&token) {
                return Err(invalid());
            }
            Value::Str(token.to_string())
        }
    };
    Ok(value)
}
