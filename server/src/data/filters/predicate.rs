//! Predicate building and SQL rendering
//!
//! Turns typed comparisons into backend-agnostic predicate values and
//! composes them into the final condition tree: comparisons within a group
//! are AND'd, groups are OR'd. Rendering produces a parameterized SQL
//! fragment with `?` placeholders; bind values are collected in order into
//! `SqlParams` and never interpolated into the SQL text.

use super::coerce::{TypedComparison, Value};
use super::error::FilterError;
use super::ops::Op;
use super::schema::FieldDef;
use crate::utils::sql::escape_like_pattern;

/// Ordered bind values collected during SQL rendering
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<Value>,
}

/// Anchoring of a string pattern match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Pattern passes through, wildcard semantics backend-defined
    Like,
    /// Anchored prefix, input escaped
    Prefix,
    /// Substring, input escaped
    Substring,
}

/// Boolean condition over a single field
#[derive(Debug, Clone)]
pub enum Predicate {
    Compare {
        field: &'static FieldDef,
        op: Op,
        value: Value,
    },
    InSet {
        field: &'static FieldDef,
        values: Vec<Value>,
    },
    Between {
        field: &'static FieldDef,
        low: Value,
        high: Value,
    },
    Match {
        field: &'static FieldDef,
        kind: MatchKind,
        value: String,
    },
}

impl Predicate {
    /// Build a predicate from a typed comparison.
    ///
    /// Value arity was established by coercion; a mismatch here would be a
    /// programming error, so it surfaces as a malformed-expression error
    /// rather than a panic.
    pub fn build(comparison: TypedComparison) -> Result<Predicate, FilterError> {
        let TypedComparison { field, op, values } = comparison;
        let arity_mismatch = || FilterError::Malformed {
            reason: format!("internal arity mismatch for operator '{op}'"),
        };

        let predicate = match op {
            Op::In => Predicate::InSet { field, values },
            Op::Between => {
                let mut it = values.into_iter();
                let (Some(low), Some(high)) = (it.next(), it.next()) else {
                    return Err(arity_mismatch());
                };
                Predicate::Between { field, low, high }
            }
            Op::Like | Op::StartsWith | Op::Contains => {
                let Some(Value::Str(text)) = values.into_iter().next() else {
                    return Err(arity_mismatch());
                };
                let kind = match op {
                    Op::Like => MatchKind::Like,
                    Op::StartsWith => MatchKind::Prefix,
                    _ => MatchKind::Substring,
                };
                Predicate::Match {
                    field,
                    kind,
                    value: text,
                }
            }
            Op::Eq | Op::Ne | Op::Gt | Op::Gte | Op::Lt | Op::Lte => {
                let Some(value) = values.into_iter().next() else {
                    return Err(arity_mismatch());
                };
                Predicate::Compare { field, op, value }
            }
        };
        Ok(predicate)
    }

    /// Field this predicate constrains
    pub fn field(&self) -> &'static FieldDef {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::InSet { field, .. }
            | Predicate::Between { field, .. }
            | Predicate::Match { field, .. } => *field,
        }
    }

    /// Render to a SQL fragment with `?` placeholders, pushing bind values
    /// onto `params` in placeholder order
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        match self {
            Predicate::Compare { field, op, value } => {
                let symbol = match op {
                    Op::Eq => "=",
                    Op::Ne => "<>",
                    Op::Gt => ">",
                    Op::Gte => ">=",
                    Op::Lt => "<",
                    Op::Lte => "<=",
                    // non-comparison operators never construct this variant
                    _ => unreachable!("non-comparison operator in Compare"),
                };
                params.values.push(value.clone());
                format!("{} {} ?", field.sql_expr(), symbol)
            }
            Predicate::InSet { field, values } => {
                let placeholders = vec!["?"; values.len()].join(", ");
                params.values.extend(values.iter().cloned());
                format!("{} IN ({})", field.sql_expr(), placeholders)
            }
            Predicate::Between { field, low, high } => {
                params.values.push(low.clone());
                params.values.push(high.clone());
                format!("{} BETWEEN ? AND ?", field.sql_expr())
            }
            Predicate::Match { field, kind, value } => {
                let pattern = match kind {
                    MatchKind::Like => value.clone(),
                    MatchKind::Prefix => format!("{}%", escape_like_pattern(value)),
                    MatchKind::Substring => format!("%{}%", escape_like_pattern(value)),
                };
                params.values.push(Value::Str(pattern));
                match kind {
                    MatchKind::Like => format!("{} LIKE ?", field.sql_expr()),
                    _ => format!("{} LIKE ? ESCAPE '\\'", field.sql_expr()),
                }
            }
        }
    }
}

/// The final condition tree: OR of AND groups
#[derive(Debug, Clone, Default)]
pub struct CompositePredicate {
    groups: Vec<Vec<Predicate>>,
}

impl CompositePredicate {
    /// Build the composite from coerced comparison groups
    pub fn from_groups(groups: Vec<Vec<TypedComparison>>) -> Result<Self, FilterError> {
        let groups = groups
            .into_iter()
            .map(|group| group.into_iter().map(Predicate::build).collect())
            .collect::<Result<Vec<Vec<_>>, _>>()?;
        Ok(Self { groups })
    }

    /// True when the source expression was empty; renders to no SQL
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[Vec<Predicate>] {
        &self.groups
    }

    /// Render the whole tree, or `None` for the empty composite
    pub fn to_sql(&self, params: &mut SqlParams) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let rendered: Vec<String> = self
            .groups
            .iter()
            .map(|group| {
                let parts: Vec<String> = group.iter().map(|p| p.to_sql(params)).collect();
                format!("({})", parts.join(" AND "))
            })
            .collect();
        Some(format!("({})", rendered.join(" OR ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::schema::EntityKind;

    fn lesson_field(name: &str) -> &'static FieldDef {
        EntityKind::Lesson.descriptor().field(name).unwrap()
    }

    fn typed(field: &str, op: Op, values: Vec<Value>) -> TypedComparison {
        TypedComparison {
            field: lesson_field(field),
            op,
            values,
        }
    }

    #[test]
    fn compare_renders_placeholder() {
        let p = Predicate::build(typed("max_students", Op::Gte, vec![Value::Int(10)])).unwrap();
        let mut params = SqlParams::default();
        assert_eq!(p.to_sql(&mut params), "max_students >= ?");
        assert_eq!(params.values, vec![Value::Int(10)]);
    }

    #[test]
    fn in_set_renders_one_placeholder_per_value() {
        let p = Predicate::build(typed(
            "max_students",
            Op::In,
            vec![Value::Int(5), Value::Int(10)],
        ))
        .unwrap();
        let mut params = SqlParams::default();
        assert_eq!(p.to_sql(&mut params), "max_students IN (?, ?)");
        assert_eq!(params.values.len(), 2);
    }

    #[test]
    fn between_is_inclusive_range() {
        let p = Predicate::build(typed(
            "max_students",
            Op::Between,
            vec![Value::Int(5), Value::Int(10)],
        ))
        .unwrap();
        let mut params = SqlParams::default();
        assert_eq!(p.to_sql(&mut params), "max_students BETWEEN ? AND ?");
        assert_eq!(params.values, vec![Value::Int(5), Value::Int(10)]);
    }

    #[test]
    fn contains_escapes_and_anchors() {
        let p = Predicate::build(typed(
            "name",
            Op::Contains,
            vec![Value::Str("50%_off".to_string())],
        ))
        .unwrap();
        let mut params = SqlParams::default();
        assert_eq!(p.to_sql(&mut params), "name LIKE ? ESCAPE '\\'");
        assert_eq!(params.values, vec![Value::Str("%50\\%\\_off%".to_string())]);
    }

    #[test]
    fn startswith_anchors_prefix_only() {
        let p = Predicate::build(typed(
            "name",
            Op::StartsWith,
            vec![Value::Str("Yo".to_string())],
        ))
        .unwrap();
        let mut params = SqlParams::default();
        p.to_sql(&mut params);
        assert_eq!(params.values, vec![Value::Str("Yo%".to_string())]);
    }

    #[test]
    fn like_passes_pattern_through() {
        let p = Predicate::build(typed(
            "name",
            Op::Like,
            vec![Value::Str("%oga".to_string())],
        ))
        .unwrap();
        let mut params = SqlParams::default();
        assert_eq!(p.to_sql(&mut params), "name LIKE ?");
        assert_eq!(params.values, vec![Value::Str("%oga".to_string())]);
    }

    #[test]
    fn computed_field_renders_its_expression() {
        let field = EntityKind::Timetable
            .descriptor()
            .field("signed_count")
            .unwrap();
        let p = Predicate::Compare {
            field,
            op: Op::Gt,
            value: Value::Int(0),
        };
        let mut params = SqlParams::default();
        let sql = p.to_sql(&mut params);
        assert!(sql.starts_with("(SELECT COUNT(*)"));
        assert!(sql.ends_with(") > ?"));
    }

    #[test]
    fn composite_ands_within_groups_and_ors_across() {
        let groups = vec![
            vec![
                typed("name", Op::Contains, vec![Value::Str("yoga".to_string())]),
                typed("max_students", Op::Lte, vec![Value::Int(12)]),
            ],
            vec![typed("name", Op::Eq, vec![Value::Str("Pilates".to_string())])],
        ];
        let composite = CompositePredicate::from_groups(groups).unwrap();
        let mut params = SqlParams::default();
        let sql = composite.to_sql(&mut params).unwrap();
        assert_eq!(
            sql,
            "((name LIKE ? ESCAPE '\\' AND max_students <= ?) OR (name = ?))"
        );
        assert_eq!(params.values.len(), 3);
    }

    #[test]
    fn empty_composite_renders_nothing() {
        let composite = CompositePredicate::default();
        assert!(composite.is_empty());
        let mut params = SqlParams::default();
        assert_eq!(composite.to_sql(&mut params), None);
        assert!(params.values.is_empty());
    }
}
