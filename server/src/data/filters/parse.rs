//! Filter expression parsing
//!
//! Wire grammar, a fixed two-level structure:
//!
//! ```text
//! query  :=  group ("|" group)*          groups are OR'd together
//! group  :=  comp ("&" comp)*           comparisons AND'd within a group
//! comp   :=  field "__" op "=" value
//! ```
//!
//! Example: `name__contains=John&removed__eq=false|surname__startswith=Do`.
//! The string arrives already percent-decoded; transport decoding is the
//! route layer's concern.
//!
//! Allow-list validation happens inline during the parse: an unknown field
//! or a disallowed operator rejects the whole expression, never a partial
//! result.

use super::allow::AllowedFields;
use super::error::FilterError;
use super::ops::Op;
use super::schema::EntityKind;

/// OR between groups
const GROUP_SEPARATOR: char = '|';
/// AND between comparisons inside a group
const COMPARISON_SEPARATOR: char = '&';
/// Between field name and operator token
const OPERATOR_SEPARATOR: &str = "__";

/// One raw comparison: field, operator, unconverted value text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComparison<'a> {
    pub field: &'a str,
    pub op: Op,
    pub raw_value: &'a str,
}

/// Parse and validate a filter expression against the resolved allow-list.
///
/// Returns the two-level structure: outer list of OR groups, each an inner
/// list of AND'd comparisons. An empty input yields no groups.
pub fn parse_filter<'a>(
    kind: EntityKind,
    raw: &'a str,
    allowed: &AllowedFields,
) -> Result<Vec<Vec<RawComparison<'a>>>, FilterError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut groups = Vec::new();
    for group in raw.split(GROUP_SEPARATOR) {
        let mut comparisons = Vec::new();
        for expr in group.split(COMPARISON_SEPARATOR) {
            let comparison = parse_comparison(expr)?;
            validate_comparison(kind, &comparison, allowed)?;
            comparisons.push(comparison);
        }
        groups.push(comparisons);
    }
    Ok(groups)
}

fn parse_comparison(expr: &str) -> Result<RawComparison<'_>, FilterError> {
    if expr.is_empty() {
        return Err(FilterError::Malformed {
            reason: "empty comparison".to_string(),
        });
    }

    let (lhs, raw_value) = expr.split_once('=').ok_or_else(|| FilterError::Malformed {
        reason: format!("missing '=' in '{expr}'"),
    })?;

    // rsplit so field names containing "__" keep working
    let (field, op_token) =
        lhs.rsplit_once(OPERATOR_SEPARATOR)
            .ok_or_else(|| FilterError::Malformed {
                reason: format!("missing '__' operator separator in '{lhs}'"),
            })?;

    if field.is_empty() {
        return Err(FilterError::Malformed {
            reason: format!("empty field name in '{expr}'"),
        });
    }

    let op = Op::parse(op_token).ok_or_else(|| FilterError::Malformed {
        reason: format!("unknown operator '{op_token}'"),
    })?;

    Ok(RawComparison {
        field,
        op,
        raw_value,
    })
}

fn validate_comparison(
    kind: EntityKind,
    comparison: &RawComparison<'_>,
    allowed: &AllowedFields,
) -> Result<(), FilterError> {
    let Some(permitted) = allowed.get(comparison.field) else {
        return Err(FilterError::UnknownField {
            entity: kind.name(),
            field: comparison.field.to_string(),
        });
    };
    if !permitted.contains(&comparison.op) {
        return Err(FilterError::DisallowedOperator {
            entity: kind.name(),
            field: comparison.field.to_string(),
            op: comparison.op.token(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::allow::{Role, resolve};

    fn coach_basic() -> AllowedFields {
        resolve(EntityKind::Coach, Role::Client)
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let groups = parse_filter(EntityKind::Coach, "", &coach_basic()).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn two_level_structure() {
        let raw = "name__contains=John&surname__eq=Doe|id__eq=abc";
        let groups = parse_filter(EntityKind::Coach, raw, &coach_basic()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
        assert_eq!(
            groups[0][0],
            RawComparison {
                field: "name",
                op: Op::Contains,
                raw_value: "John",
            }
        );
        assert_eq!(groups[1][0].field, "id");
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let groups = parse_filter(EntityKind::Coach, "name__eq=a=b", &coach_basic()).unwrap();
        assert_eq!(groups[0][0].raw_value, "a=b");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse_filter(EntityKind::Coach, "salary__eq=1", &coach_basic()).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownField {
                entity: "Coach",
                field: "salary".to_string(),
            }
        );
    }

    #[test]
    fn disallowed_operator_is_rejected() {
        // id permits eq/in/ne, not between
        let err = parse_filter(EntityKind::Coach, "id__between=1,2", &coach_basic()).unwrap_err();
        assert_eq!(
            err,
            FilterError::DisallowedOperator {
                entity: "Coach",
                field: "id".to_string(),
                op: "between",
            }
        );
    }

    #[test]
    fn elevated_field_rejected_for_basic_tier() {
        let err =
            parse_filter(EntityKind::Coach, "removed__eq=false", &coach_basic()).unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { .. }));

        let admin = resolve(EntityKind::Coach, Role::Admin);
        assert!(parse_filter(EntityKind::Coach, "removed__eq=false", &admin).is_ok());
    }

    #[test]
    fn structural_errors_are_malformed() {
        for raw in ["name__contains", "nameeq=John", "__eq=x", "name__foo=x", "&"] {
            let err = parse_filter(EntityKind::Coach, raw, &coach_basic()).unwrap_err();
            assert!(matches!(err, FilterError::Malformed { .. }), "input: {raw}");
        }
    }

    #[test]
    fn no_partial_results_on_late_failure() {
        let raw = "name__eq=John|salary__eq=1";
        assert!(parse_filter(EntityKind::Coach, raw, &coach_basic()).is_err());
    }
}
