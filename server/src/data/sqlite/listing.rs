//! Filtered entity listing
//!
//! Executes compiled filter queries: renders the composite predicate and
//! sort specification to one SELECT, prepends the caller's visibility
//! scope, binds parameters, and decodes rows to JSON objects using the
//! entity descriptor (so computed fields come back exactly like columns).

use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::core::constants::MAX_LIST_ROWS;
use crate::data::error::DataError;
use crate::data::filters::schema::{EntityDescriptor, EntityKind, FieldSource, FieldType};
use crate::data::filters::sort::{SortField, order_by_sql};
use crate::data::filters::{CompositePredicate, Role, SqlParams, Value};

/// Default visibility scope appended outside the compiled filter.
///
/// Admins are never scoped. For clients: with no explicit filter, records
/// are restricted to the caller's own (when the entity has an owner field)
/// or to non-removed records (when it has a soft-delete field and no owner
/// field). With an explicit filter, both restrictions apply where present,
/// so a client can never filter their way into foreign or removed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityScope {
    owner: Option<Uuid>,
    hide_removed: bool,
}

impl VisibilityScope {
    /// Unrestricted scope (admin callers)
    pub fn unrestricted() -> Self {
        Self {
            owner: None,
            hide_removed: false,
        }
    }

    /// Resolve the scope for a caller against the entity's capability flags
    pub fn for_caller(
        desc: &EntityDescriptor,
        role: Role,
        caller: Option<Uuid>,
        has_filter: bool,
    ) -> Self {
        if role.is_privileged() {
            return Self::unrestricted();
        }
        let owner = desc.owner_field.and(caller);
        let hide_removed = desc.soft_delete_field.is_some()
            && (has_filter || desc.owner_field.is_none());
        Self {
            owner,
            hide_removed,
        }
    }

    fn conditions(&self, desc: &EntityDescriptor, params: &mut SqlParams) -> Vec<String> {
        let mut conds = Vec::new();
        if let (Some(owner), Some(field)) = (self.owner, desc.owner_field) {
            params.values.push(Value::Uuid(owner));
            conds.push(format!("{field} = ?"));
        }
        if self.hide_removed {
            if let Some(field) = desc.soft_delete_field {
                conds.push(format!("{field} = 0"));
            }
        }
        conds
    }
}

/// One compiled listing request
#[derive(Debug)]
pub struct ListQuery {
    pub predicate: CompositePredicate,
    pub sort: Vec<SortField>,
    pub scope: VisibilityScope,
}

/// Execute a listing query and decode the rows to JSON objects
pub async fn list_entities(
    pool: &SqlitePool,
    kind: EntityKind,
    query: &ListQuery,
) -> Result<Vec<JsonValue>, DataError> {
    let desc = kind.descriptor();

    let select_list: Vec<String> = desc
        .fields()
        .iter()
        .map(|f| match f.source {
            FieldSource::Column(col) => col.to_string(),
            FieldSource::Computed(expr) => format!("({expr}) AS {}", f.name),
        })
        .collect();

    let mut params = SqlParams::default();
    let mut conditions = query.scope.conditions(desc, &mut params);
    if let Some(filter_sql) = query.predicate.to_sql(&mut params) {
        conditions.push(filter_sql);
    }

    let mut sql = format!(
        "SELECT {} FROM {}",
        select_list.join(", "),
        desc.table
    );
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    if let Some(order) = order_by_sql(&query.sort) {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);
    }
    sql.push_str(&format!(" LIMIT {MAX_LIST_ROWS}"));

    tracing::trace!(entity = %kind, sql = %sql, "listing query");

    let mut q = sqlx::query(&sql);
    for value in params.values {
        q = bind_value(q, value);
    }
    let rows = q.fetch_all(pool).await?;

    rows.iter().map(|row| decode_row(desc, row)).collect()
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

/// Bind one typed value, rendering temporal and UUID values to the
/// canonical TEXT forms the schema stores
fn bind_value(q: SqliteQuery<'_>, value: Value) -> SqliteQuery<'_> {
    match value {
        Value::Bool(b) => q.bind(b),
        Value::Int(i) => q.bind(i),
        Value::Float(f) => q.bind(f),
        Value::Str(s) => q.bind(s),
        Value::Date(d) => q.bind(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => q.bind(dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        Value::Uuid(u) => q.bind(u.to_string()),
    }
}

/// Decode one row into a JSON object, field by declared field
fn decode_row(desc: &EntityDescriptor, row: &SqliteRow) -> Result<JsonValue, DataError> {
    let mut object = serde_json::Map::new();
    for field in desc.fields() {
        let value = match field.ty {
            FieldType::Bool => row
                .try_get::<Option<bool>, _>(field.name)?
                .map(JsonValue::Bool),
            FieldType::Int => row
                .try_get::<Option<i64>, _>(field.name)?
                .map(JsonValue::from),
            FieldType::Float => row
                .try_get::<Option<f64>, _>(field.name)?
                .map(JsonValue::from),
            // strings, enums, dates, timestamps, and UUIDs are all TEXT
            _ => row
                .try_get::<Option<String>, _>(field.name)?
                .map(JsonValue::String),
        };
        object.insert(field.name.to_string(), value.unwrap_or(JsonValue::Null));
    }
    Ok(JsonValue::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::{compile_filter, compile_sort};
    use crate::data::sqlite::SqliteService;

    const YOGA: &str = "10000000-0000-4000-8000-000000000001";
    const BOXING: &str = "10000000-0000-4000-8000-000000000002";
    const CLIENT: &str = "20000000-0000-4000-8000-000000000001";
    const OTHER: &str = "20000000-0000-4000-8000-000000000002";

    async fn seeded() -> SqliteService {
        let db = SqliteService::init_in_memory().await.unwrap();
        let pool = db.pool();

        for (id, name, surname, login) in [
            (CLIENT, "Anna", "Petrova", "anna"),
            (OTHER, "Boris", "Ivanov", "boris"),
        ] {
            sqlx::query(
                "INSERT INTO user (id, name, surname, email, login, password_hash, role, registered_at) \
                 VALUES (?, ?, ?, ?, ?, 'x', 'client', '2026-01-01T00:00:00Z')",
            )
            .bind(id)
            .bind(name)
            .bind(surname)
            .bind(format!("{login}@example.com"))
            .bind(login)
            .execute(pool)
            .await
            .unwrap();
        }

        for (id, name, max, removed) in [
            (YOGA, "Morning Yoga", 12_i64, 0_i64),
            (BOXING, "Boxing", 8, 0),
            ("10000000-0000-4000-8000-000000000003", "Old Pilates", 10, 1),
        ] {
            sqlx::query("INSERT INTO lesson (id, name, max_students, removed) VALUES (?, ?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(max)
                .bind(removed)
                .execute(pool)
                .await
                .unwrap();
        }

        db
    }

    fn query(kind: EntityKind, role: Role, filter: &str, sort: &str, caller: Option<Uuid>) -> ListQuery {
        let predicate = compile_filter(kind, role, filter).unwrap();
        let has_filter = !predicate.is_empty();
        ListQuery {
            sort: compile_sort(kind, sort).unwrap(),
            scope: VisibilityScope::for_caller(kind.descriptor(), role, caller, has_filter),
            predicate,
        }
    }

    #[tokio::test]
    async fn empty_filter_hides_removed_rows_for_clients() {
        let db = seeded().await;
        let q = query(EntityKind::Lesson, Role::Client, "", "name", None);
        let rows = list_entities(db.pool(), EntityKind::Lesson, &q).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Boxing");
        assert_eq!(rows[1]["name"], "Morning Yoga");
    }

    #[tokio::test]
    async fn admins_see_removed_rows_by_default() {
        let db = seeded().await;
        let q = query(EntityKind::Lesson, Role::Admin, "", "", None);
        let rows = list_entities(db.pool(), EntityKind::Lesson, &q).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn filter_narrows_and_sorts() {
        let db = seeded().await;
        let q = query(
            EntityKind::Lesson,
            Role::Client,
            "max_students__gte=8",
            "-max_students",
            None,
        );
        let rows = list_entities(db.pool(), EntityKind::Lesson, &q).await.unwrap();
        // removed Pilates stays hidden even though it matches the filter
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["max_students"], 12);
        assert_eq!(rows[1]["max_students"], 8);
    }

    #[tokio::test]
    async fn contains_filter_matches_substring() {
        let db = seeded().await;
        let q = query(EntityKind::Lesson, Role::Client, "name__contains=yoga", "", None);
        let rows = list_entities(db.pool(), EntityKind::Lesson, &q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Morning Yoga");
    }

    #[tokio::test]
    async fn owner_scope_restricts_clients_to_their_rows() {
        let db = seeded().await;
        let pool = db.pool();

        sqlx::query(
            "INSERT INTO subscription_type (id, name, lesson_quota, period_days, price) \
             VALUES ('30000000-0000-4000-8000-000000000001', 'Monthly 8', 8, 30, 120.0)",
        )
        .execute(pool)
        .await
        .unwrap();
        for (id, user) in [
            ("40000000-0000-4000-8000-000000000001", CLIENT),
            ("40000000-0000-4000-8000-000000000002", OTHER),
        ] {
            sqlx::query(
                "INSERT INTO client_subscription (id, user_id, plan_id, paid_on, expires_on) \
                 VALUES (?, ?, '30000000-0000-4000-8000-000000000001', '2026-02-01', '2026-03-03')",
            )
            .bind(id)
            .bind(user)
            .execute(pool)
            .await
            .unwrap();
        }

        let caller = Some(Uuid::parse_str(CLIENT).unwrap());
        let q = query(EntityKind::ClientSubscription, Role::Client, "", "", caller);
        let rows = list_entities(pool, EntityKind::ClientSubscription, &q)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["user_id"], CLIENT);
        // computed fields decode alongside columns
        assert_eq!(rows[0]["used_visits"], 0);

        let q = query(EntityKind::ClientSubscription, Role::Admin, "", "", None);
        let rows = list_entities(pool, EntityKind::ClientSubscription, &q)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn computed_field_is_filterable_and_sortable() {
        let db = seeded().await;
        let pool = db.pool();
        sqlx::query(
            "INSERT INTO coach (id, name, surname) \
             VALUES ('50000000-0000-4000-8000-000000000001', 'Ivan', 'Orlov')",
        )
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO timetable (id, coach_id, lesson_id, starts_at) \
             VALUES ('60000000-0000-4000-8000-000000000001', \
                     '50000000-0000-4000-8000-000000000001', ?, '2026-03-01T10:00:00Z')",
        )
        .bind(YOGA)
        .execute(pool)
        .await
        .unwrap();

        let q = query(EntityKind::Timetable, Role::Client, "signed_count__eq=0", "-signed_count", None);
        let rows = list_entities(pool, EntityKind::Timetable, &q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["signed_count"], 0);
    }

    #[test]
    fn scope_resolution_matches_policy() {
        let caller = Some(Uuid::parse_str(CLIENT).unwrap());

        // admin: never scoped
        let scope = VisibilityScope::for_caller(
            EntityKind::ClientSubscription.descriptor(),
            Role::Admin,
            caller,
            false,
        );
        assert_eq!(scope, VisibilityScope::unrestricted());

        // client, owned entity, no filter: owner only
        let scope = VisibilityScope::for_caller(
            EntityKind::ClientSubscription.descriptor(),
            Role::Client,
            caller,
            false,
        );
        assert_eq!(scope.owner, caller);
        assert!(!scope.hide_removed);

        // client, owned entity, explicit filter: owner and soft-delete
        let scope = VisibilityScope::for_caller(
            EntityKind::ClientSubscription.descriptor(),
            Role::Client,
            caller,
            true,
        );
        assert!(scope.owner.is_some());
        assert!(scope.hide_removed);

        // client, unowned soft-deletable entity: soft-delete only
        let scope =
            VisibilityScope::for_caller(EntityKind::Coach.descriptor(), Role::Client, caller, false);
        assert_eq!(scope.owner, None);
        assert!(scope.hide_removed);
    }
}
