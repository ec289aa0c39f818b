//! Entity descriptors
//!
//! Static schema metadata for every persisted entity kind: field names,
//! semantic types, nullability, and how each field is stored (a physical
//! column or a SQL expression computed at query time). The descriptors are
//! the single source of truth for filter validation, value coercion, sort
//! validation, and row decoding.
//!
//! Shared columns (`id`, the soft-delete flag, the owner link) are applied
//! through the descriptor builder rather than inheritance, and ownership /
//! soft-delete presence are resolved once into capability flags instead of
//! being probed reflectively per request.

use std::fmt;
use std::sync::LazyLock;

/// A named category of persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Coach,
    Lesson,
    SubscriptionType,
    Timetable,
    ClientSubscription,
    Attendance,
    User,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Coach,
        EntityKind::Lesson,
        EntityKind::SubscriptionType,
        EntityKind::Timetable,
        EntityKind::ClientSubscription,
        EntityKind::Attendance,
        EntityKind::User,
    ];

    /// Display name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Coach => "Coach",
            EntityKind::Lesson => "Lesson",
            EntityKind::SubscriptionType => "SubscriptionType",
            EntityKind::Timetable => "Timetable",
            EntityKind::ClientSubscription => "ClientSubscription",
            EntityKind::Attendance => "Attendance",
            EntityKind::User => "User",
        }
    }

    /// The entity descriptor for this kind
    pub fn descriptor(self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Coach => &COACH,
            EntityKind::Lesson => &LESSON,
            EntityKind::SubscriptionType => &SUBSCRIPTION_TYPE,
            EntityKind::Timetable => &TIMETABLE,
            EntityKind::ClientSubscription => &CLIENT_SUBSCRIPTION,
            EntityKind::Attendance => &ATTENDANCE,
            EntityKind::User => &USER,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// UTC timestamp, RFC 3339
    DateTime,
    Uuid,
    /// String restricted to a fixed set of variants
    Enum(&'static [&'static str]),
}

impl FieldType {
    /// Human-readable type name for error messages
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Bool => "boolean",
            FieldType::Int => "integer",
            FieldType::Float => "number",
            FieldType::Str => "string",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Uuid => "uuid",
            FieldType::Enum(_) => "enum",
        }
    }

    /// Whether string pattern operators apply to this type
    pub fn is_text(self) -> bool {
        matches!(self, FieldType::Str)
    }
}

/// How a field is materialized in SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Physical table column
    Column(&'static str),
    /// SQL expression evaluated per row (correlated subquery or the like);
    /// no physical column exists
    Computed(&'static str),
}

/// One queryable field of an entity
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
    pub source: FieldSource,
}

impl FieldDef {
    /// SQL fragment selecting this field's value
    pub fn sql_expr(&self) -> String {
        match self.source {
            FieldSource::Column(col) => col.to_string(),
            FieldSource::Computed(expr) => format!("({expr})"),
        }
    }
}

/// Static schema of one entity kind
#[derive(Debug)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub table: &'static str,
    fields: Vec<FieldDef>,
    /// Name of the field linking a record to its owning user, if any
    pub owner_field: Option<&'static str>,
    /// Name of the soft-delete flag field, if any
    pub soft_delete_field: Option<&'static str>,
}

impl EntityDescriptor {
    fn builder(kind: EntityKind, table: &'static str) -> DescriptorBuilder {
        DescriptorBuilder {
            kind,
            table,
            fields: Vec::new(),
        }
    }

    /// Look up a field by name. `None` means the entity has no such
    /// attribute (relationships are never declared here).
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the entity exposes the named attribute at all
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Semantic type and nullability of a field, if it exists
    pub fn infer(&self, name: &str) -> Option<(FieldType, bool)> {
        self.field(name).map(|f| (f.ty, f.nullable))
    }
}

/// Composes an entity descriptor from individual fields and shared traits
struct DescriptorBuilder {
    kind: EntityKind,
    table: &'static str,
    fields: Vec<FieldDef>,
}

impl DescriptorBuilder {
    fn column(mut self, name: &'static str, ty: FieldType, nullable: bool) -> Self {
        self.fields.push(FieldDef {
            name,
            ty,
            nullable,
            source: FieldSource::Column(name),
        });
        self
    }

    /// Object-level field with no physical column. Nullability of computed
    /// values cannot be established from storage, so they are nullable.
    fn computed(mut self, name: &'static str, ty: FieldType, expr: &'static str) -> Self {
        self.fields.push(FieldDef {
            name,
            ty,
            nullable: true,
            source: FieldSource::Computed(expr),
        });
        self
    }

    /// Shared trait: UUID primary key
    fn uuid_id(self) -> Self {
        self.column("id", FieldType::Uuid, false)
    }

    /// Shared trait: soft-delete flag
    fn soft_delete(self) -> Self {
        self.column("removed", FieldType::Bool, false)
    }

    /// Shared trait: owner link to the users table
    fn owned_by_user(self) -> Self {
        self.column("user_id", FieldType::Uuid, false)
    }

    fn build(self) -> EntityDescriptor {
        let owner_field = self
            .fields
            .iter()
            .find(|f| f.name == "user_id")
            .map(|f| f.name);
        let soft_delete_field = self
            .fields
            .iter()
            .find(|f| f.name == "removed")
            .map(|f| f.name);
        EntityDescriptor {
            kind: self.kind,
            table: self.table,
            fields: self.fields,
            owner_field,
            soft_delete_field,
        }
    }
}

/// Role variants stored on a user record
pub const USER_ROLES: &[&str] = &["client", "admin"];

static COACH: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::builder(EntityKind::Coach, "coach")
        .uuid_id()
        .column("name", FieldType::Str, false)
        .column("surname", FieldType::Str, false)
        .soft_delete()
        .build()
});

static LESSON: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::builder(EntityKind::Lesson, "lesson")
        .uuid_id()
        .column("name", FieldType::Str, false)
        .column("description", FieldType::Str, true)
        .column("max_students", FieldType::Int, false)
        .soft_delete()
        .build()
});

static SUBSCRIPTION_TYPE: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::builder(EntityKind::SubscriptionType, "subscription_type")
        .uuid_id()
        .column("name", FieldType::Str, false)
        .column("description", FieldType::Str, true)
        .column("lesson_quota", FieldType::Int, false)
        .column("period_days", FieldType::Int, false)
        .column("price", FieldType::Float, false)
        .soft_delete()
        .build()
});

static TIMETABLE: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::builder(EntityKind::Timetable, "timetable")
        .uuid_id()
        .column("coach_id", FieldType::Uuid, false)
        .column("lesson_id", FieldType::Uuid, false)
        .column("starts_at", FieldType::DateTime, false)
        .computed(
            "signed_count",
            FieldType::Int,
            "SELECT COUNT(*) FROM attendance a \
             WHERE a.timetable_id = timetable.id AND a.removed = 0",
        )
        .soft_delete()
        .build()
});

static CLIENT_SUBSCRIPTION: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::builder(EntityKind::ClientSubscription, "client_subscription")
        .uuid_id()
        .owned_by_user()
        .column("plan_id", FieldType::Uuid, false)
        .column("paid_on", FieldType::Date, false)
        .column("expires_on", FieldType::Date, false)
        .computed(
            "used_visits",
            FieldType::Int,
            "SELECT COUNT(*) FROM attendance a \
             WHERE a.subscription_id = client_subscription.id AND a.removed = 0",
        )
        .computed(
            "remaining_visits",
            FieldType::Int,
            "SELECT st.lesson_quota - COUNT(a.id) \
             FROM subscription_type st \
             LEFT JOIN attendance a \
               ON a.subscription_id = client_subscription.id AND a.removed = 0 \
             WHERE st.id = client_subscription.plan_id",
        )
        .soft_delete()
        .build()
});

static ATTENDANCE: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::builder(EntityKind::Attendance, "attendance")
        .uuid_id()
        .owned_by_user()
        .column("timetable_id", FieldType::Uuid, false)
        .column("subscription_id", FieldType::Uuid, false)
        .column("visited", FieldType::Bool, false)
        .computed(
            "class_starts_at",
            FieldType::DateTime,
            "SELECT t.starts_at FROM timetable t WHERE t.id = attendance.timetable_id",
        )
        .soft_delete()
        .build()
});

static USER: LazyLock<EntityDescriptor> = LazyLock::new(|| {
    EntityDescriptor::builder(EntityKind::User, "user")
        .uuid_id()
        .column("name", FieldType::Str, false)
        .column("surname", FieldType::Str, false)
        .column("patronymic", FieldType::Str, true)
        .column("email", FieldType::Str, false)
        .column("login", FieldType::Str, false)
        .column("role", FieldType::Enum(USER_ROLES), false)
        .column("registered_at", FieldType::DateTime, false)
        .build()
});
