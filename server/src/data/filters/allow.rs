//! Per-entity, per-role filter allow-lists
//!
//! Static tables mapping each entity kind to the fields a caller may filter
//! on and the operators permitted per field. Two tiers per kind: `basic`
//! (every caller) and `elevated` (merged in for admins, winning on
//! collision). The tables are total over `EntityKind`, so an unregistered
//! kind cannot be looked up.
//!
//! For a real deployment the operator sets could be derived from field
//! types; they are spelled out per field here so the tiers stay auditable.

use super::ops::Op;
use super::schema::EntityKind;

/// Caller tier for allow-list resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// One tier: field name -> permitted operators, in declaration order
type Tier = &'static [(&'static str, &'static [Op])];

/// Both tiers for one entity kind
#[derive(Debug, Clone, Copy)]
pub struct AllowRules {
    pub basic: Tier,
    pub elevated: Tier,
}

const ID_OPS: &[Op] = &[Op::Eq, Op::In, Op::Ne];
const TEXT_OPS: &[Op] = &[Op::Like, Op::StartsWith, Op::Contains, Op::Eq, Op::Ne];
const RANGE_OPS: &[Op] = &[Op::Eq, Op::In, Op::Between, Op::Gt, Op::Lt, Op::Gte, Op::Lte];
const DATE_OPS: &[Op] = &[Op::Eq, Op::In, Op::Between, Op::Gte, Op::Lte, Op::Gt, Op::Lt];
const FLAG_OPS: &[Op] = &[Op::Eq, Op::Ne];

/// Allow-list rules for an entity kind. Total over `EntityKind`.
pub fn rules(kind: EntityKind) -> AllowRules {
    match kind {
        EntityKind::Coach => AllowRules {
            basic: &[("id", ID_OPS), ("name", TEXT_OPS), ("surname", TEXT_OPS)],
            elevated: &[("removed", FLAG_OPS)],
        },
        EntityKind::Lesson => AllowRules {
            basic: &[
                ("id", ID_OPS),
                ("name", TEXT_OPS),
                ("description", TEXT_OPS),
                ("max_students", RANGE_OPS),
            ],
            elevated: &[("removed", FLAG_OPS)],
        },
        EntityKind::SubscriptionType => AllowRules {
            basic: &[
                ("id", ID_OPS),
                ("name", TEXT_OPS),
                ("description", TEXT_OPS),
                ("lesson_quota", RANGE_OPS),
                ("period_days", RANGE_OPS),
                ("price", RANGE_OPS),
            ],
            elevated: &[("removed", FLAG_OPS)],
        },
        EntityKind::Timetable => AllowRules {
            basic: &[
                ("id", ID_OPS),
                ("coach_id", ID_OPS),
                ("lesson_id", ID_OPS),
                ("starts_at", DATE_OPS),
                ("signed_count", RANGE_OPS),
                ("removed", FLAG_OPS),
            ],
            elevated: &[],
        },
        EntityKind::ClientSubscription => AllowRules {
            basic: &[
                ("id", ID_OPS),
                ("plan_id", ID_OPS),
                ("paid_on", DATE_OPS),
                ("expires_on", DATE_OPS),
                ("used_visits", RANGE_OPS),
                ("remaining_visits", RANGE_OPS),
                ("removed", &[Op::Eq]),
            ],
            elevated: &[("user_id", ID_OPS)],
        },
        EntityKind::Attendance => AllowRules {
            basic: &[
                ("id", ID_OPS),
                ("timetable_id", ID_OPS),
                ("subscription_id", ID_OPS),
                ("visited", &[Op::Eq]),
                ("class_starts_at", DATE_OPS),
                ("removed", &[Op::Eq]),
            ],
            elevated: &[("user_id", ID_OPS)],
        },
        EntityKind::User => AllowRules {
            basic: &[],
            elevated: &[
                ("id", ID_OPS),
                ("name", TEXT_OPS),
                ("surname", TEXT_OPS),
                ("patronymic", TEXT_OPS),
                ("email", TEXT_OPS),
                ("login", TEXT_OPS),
                ("role", FLAG_OPS),
                ("registered_at", DATE_OPS),
            ],
        },
    }
}

/// Resolved allow-list for one (entity kind, role) pair
#[derive(Debug, Clone)]
pub struct AllowedFields {
    entries: Vec<(&'static str, &'static [Op])>,
}

impl AllowedFields {
    /// Permitted operators for a field, `None` when the field is not
    /// filterable at this tier
    pub fn get(&self, field: &str) -> Option<&'static [Op]> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, ops)| *ops)
    }

    /// (field, operators) pairs in declaration order
    pub fn entries(&self) -> &[(&'static str, &'static [Op])] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the allow-list for a caller. Admins get `basic` with `elevated`
/// merged on top (elevated wins when both tiers name the same field).
pub fn resolve(kind: EntityKind, role: Role) -> AllowedFields {
    let rules = rules(kind);
    let mut entries: Vec<(&'static str, &'static [Op])> = rules.basic.to_vec();
    if role.is_privileged() {
        for &(field, ops) in rules.elevated {
            match entries.iter_mut().find(|(name, _)| *name == field) {
                Some(entry) => entry.1 = ops,
                None => entries.push((field, ops)),
            }
        }
    }
    AllowedFields { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevated_tier_is_additive() {
        for kind in EntityKind::ALL {
            let basic = resolve(*kind, Role::Client);
            let admin = resolve(*kind, Role::Admin);
            for (field, _) in basic.entries() {
                assert!(
                    admin.get(field).is_some(),
                    "{kind}: admin lost basic field {field}"
                );
            }
            assert!(admin.entries().len() >= basic.entries().len());
        }
    }

    #[test]
    fn every_allowed_field_exists_on_the_entity() {
        for kind in EntityKind::ALL {
            let desc = kind.descriptor();
            for (field, ops) in resolve(*kind, Role::Admin).entries() {
                assert!(desc.has_field(field), "{kind}: {field} not an attribute");
                assert!(!ops.is_empty(), "{kind}: {field} has empty operator set");
            }
        }
    }

    #[test]
    fn removed_is_elevated_only_for_coach() {
        assert!(
            resolve(EntityKind::Coach, Role::Client)
                .get("removed")
                .is_none()
        );
        assert!(
            resolve(EntityKind::Coach, Role::Admin)
                .get("removed")
                .is_some()
        );
    }

    #[test]
    fn users_are_not_filterable_by_clients() {
        assert!(resolve(EntityKind::User, Role::Client).is_empty());
        assert!(!resolve(EntityKind::User, Role::Admin).is_empty());
    }

    #[test]
    fn elevated_merge_order() {
        // no collisions in the shipped tables; exercise the merge anyway
        let admin = resolve(EntityKind::ClientSubscription, Role::Admin);
        assert_eq!(admin.get("user_id"), Some(ID_OPS));
    }
}
