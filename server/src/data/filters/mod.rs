//! Query filter compiler
//!
//! Compiles client-supplied filter and sort expressions into SQL
//! predicates, validated against per-entity, per-role allow-lists.
//!
//! ```text
//! GET /api/v1/lessons?filter=name__contains=yoga&order_by=-max_students
//! ```
//!
//! Pipeline: [`allow::resolve`] supplies the permitted (field -> operators)
//! map for the caller's role, [`parse::parse_filter`] splits the raw string
//! into OR groups of AND'd comparisons and validates them inline,
//! [`coerce::coerce`] converts raw value text to typed values using the
//! entity descriptor, and [`predicate`] emits the composite condition tree
//! that the repository renders to parameterized SQL.
//!
//! Everything here is a pure, synchronous transformation over immutable
//! static tables; query execution stays in the repository layer.

pub mod allow;
pub mod coerce;
pub mod error;
pub mod ops;
pub mod parse;
pub mod predicate;
pub mod schema;
pub mod sort;

pub use allow::{AllowedFields, Role, resolve};
pub use coerce::Value;
pub use error::FilterError;
pub use ops::Op;
pub use predicate::{CompositePredicate, SqlParams};
pub use schema::{EntityDescriptor, EntityKind, FieldType};
pub use sort::{Direction, SortField};

/// Compile a raw filter expression for one entity kind and caller role.
///
/// An empty expression compiles to the empty composite, which renders to no
/// WHERE clause; default visibility for that case is the repository's
/// responsibility.
pub fn compile_filter(
    kind: EntityKind,
    role: Role,
    raw: &str,
) -> Result<CompositePredicate, FilterError> {
    let allowed = resolve(kind, role);
    let groups = parse::parse_filter(kind, raw, &allowed)?;
    let desc = kind.descriptor();
    let typed = groups
        .into_iter()
        .map(|group| {
            group
                .iter()
                .map(|comparison| coerce::coerce(desc, comparison))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    CompositePredicate::from_groups(typed)
}

/// Compile a raw `order_by` specification for one entity kind
pub fn compile_sort(kind: EntityKind, raw: &str) -> Result<Vec<SortField>, FilterError> {
    sort::parse_sort(kind, raw)
}

/// The resolved allow-list for introspection endpoints
pub fn allowed_fields(kind: EntityKind, role: Role) -> AllowedFields {
    resolve(kind, role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_allowed_pair_compiles_to_a_predicate() {
        for kind in EntityKind::ALL {
            for role in [Role::Client, Role::Admin] {
                for (field, ops) in resolve(*kind, role).entries() {
                    for op in *ops {
                        let raw = match op {
                            Op::Between => format!(
                                "{field}__{op}={},{}",
                                sample(*kind, field, 0),
                                sample(*kind, field, 1)
                            ),
                            _ => format!("{field}__{op}={}", sample(*kind, field, 0)),
                        };
                        let composite = compile_filter(*kind, role, &raw)
                            .unwrap_or_else(|e| panic!("{kind}.{field} {op}: {e}"));
                        assert_eq!(composite.groups().len(), 1);
                        assert_eq!(composite.groups()[0][0].field().name, *field);
                    }
                }
            }
        }
    }

    /// A value token that coerces for the field's type
    fn sample(kind: EntityKind, field: &str, n: usize) -> String {
        let (ty, _) = kind.descriptor().infer(field).unwrap();
        match ty {
            FieldType::Bool => ["false", "true"][n % 2].to_string(),
            FieldType::Int => (n + 1).to_string(),
            FieldType::Float => format!("{}.5", n + 1),
            FieldType::Str => format!("text{n}"),
            FieldType::Date => format!("2026-03-0{}", n + 1),
            FieldType::DateTime => format!("2026-03-0{}T10:00:00Z", n + 1),
            FieldType::Uuid => format!("00000000-0000-4000-8000-00000000000{n}"),
            FieldType::Enum(variants) => variants[n % variants.len()].to_string(),
        }
    }

    #[test]
    fn pairs_outside_the_allow_list_fail() {
        // field not filterable at basic tier
        let err = compile_filter(EntityKind::Coach, Role::Client, "removed__eq=true").unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { .. }));
        // operator not permitted for the field
        let err = compile_filter(EntityKind::Coach, Role::Admin, "removed__gt=true").unwrap_err();
        assert!(matches!(err, FilterError::DisallowedOperator { .. }));
        // field that is not an attribute at all
        let err = compile_filter(EntityKind::Coach, Role::Admin, "salary__eq=1").unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { .. }));
    }

    #[test]
    fn coach_example_from_both_role_tiers() {
        assert!(compile_filter(EntityKind::Coach, Role::Client, "name__contains=John").is_ok());
        assert!(compile_filter(EntityKind::Coach, Role::Client, "removed__eq=false").is_err());
        assert!(compile_filter(EntityKind::Coach, Role::Admin, "removed__eq=false").is_ok());
    }

    #[test]
    fn empty_filter_compiles_to_empty_composite() {
        let composite = compile_filter(EntityKind::Coach, Role::Client, "").unwrap();
        assert!(composite.is_empty());
    }

    #[test]
    fn round_trip_two_groups() {
        let composite = compile_filter(
            EntityKind::Lesson,
            Role::Client,
            "name__contains=yoga&max_students__lte=12|name__eq=Pilates",
        )
        .unwrap();
        assert_eq!(composite.groups().len(), 2);
        assert_eq!(composite.groups()[0].len(), 2);
        assert_eq!(composite.groups()[1].len(), 1);

        let mut params = SqlParams::default();
        let sql = composite.to_sql(&mut params).unwrap();
        assert_eq!(
            sql,
            "((name LIKE ? ESCAPE '\\' AND max_students <= ?) OR (name = ?))"
        );
    }

    #[test]
    fn compilation_is_all_or_nothing() {
        let err = compile_filter(
            EntityKind::Lesson,
            Role::Client,
            "name__eq=yoga|max_students__eq=lots",
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { .. }));
    }

    #[test]
    fn sort_compiles_against_full_attribute_set() {
        let sorted = compile_sort(EntityKind::Timetable, "-signed_count,starts_at").unwrap();
        assert_eq!(sorted.len(), 2);
        assert!(compile_sort(EntityKind::Timetable, "nonsense").is_err());
    }
}
