//! Entity listing endpoints
//!
//! One handler per entity kind, all delegating to [`list_kind`]: compile
//! the caller's `filter` and `order_by` expressions, resolve the default
//! visibility scope, and run the query.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::api::auth::AuthUser;
use crate::api::server::AppState;
use crate::api::types::ApiError;
use crate::data::filters::{EntityKind, allowed_fields, compile_filter, compile_sort};
use crate::data::sqlite::{ListQuery, VisibilityScope, list_entities};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub order_by: Option<String>,
}

async fn list_kind(
    state: &AppState,
    kind: EntityKind,
    auth: AuthUser,
    params: ListParams,
) -> Result<Json<JsonValue>, ApiError> {
    let predicate = compile_filter(kind, auth.role, params.filter.as_deref().unwrap_or(""))?;
    let sort = compile_sort(kind, params.order_by.as_deref().unwrap_or(""))?;
    let scope = VisibilityScope::for_caller(
        kind.descriptor(),
        auth.role,
        auth.user_id,
        !predicate.is_empty(),
    );

    let query = ListQuery {
        predicate,
        sort,
        scope,
    };
    let items = list_entities(&state.pool, kind, &query).await?;
    Ok(Json(serde_json::json!({ "items": items })))
}

macro_rules! list_handler {
    ($name:ident, $kind:expr) => {
        pub async fn $name(
            State(state): State<AppState>,
            auth: AuthUser,
            Query(params): Query<ListParams>,
        ) -> Result<Json<JsonValue>, ApiError> {
            list_kind(&state, $kind, auth, params).await
        }
    };
}

list_handler!(list_coaches, EntityKind::Coach);
list_handler!(list_lessons, EntityKind::Lesson);
list_handler!(list_subscription_types, EntityKind::SubscriptionType);
list_handler!(list_timetable, EntityKind::Timetable);
list_handler!(list_client_subscriptions, EntityKind::ClientSubscription);
list_handler!(list_attendance, EntityKind::Attendance);
list_handler!(list_users, EntityKind::User);

/// Route segment -> entity kind, as used under `/api/v1/`
pub fn kind_from_route(segment: &str) -> Option<EntityKind> {
    match segment {
        "coaches" => Some(EntityKind::Coach),
        "lessons" => Some(EntityKind::Lesson),
        "subscription-types" => Some(EntityKind::SubscriptionType),
        "timetable" => Some(EntityKind::Timetable),
        "client-subscriptions" => Some(EntityKind::ClientSubscription),
        "attendance" => Some(EntityKind::Attendance),
        "users" => Some(EntityKind::User),
        _ => None,
    }
}

/// Allow-list introspection: which fields and operators the caller's role
/// may filter by, and which fields sort is accepted on
pub async fn filter_meta(
    auth: AuthUser,
    Path(kind): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    let kind = kind_from_route(&kind)
        .ok_or_else(|| ApiError::not_found("UNKNOWN_ENTITY", format!("Unknown entity '{kind}'")))?;

    let mut fields = serde_json::Map::new();
    for (field, ops) in allowed_fields(kind, auth.role).entries() {
        let tokens: Vec<JsonValue> = ops
            .iter()
            .map(|op| JsonValue::String(op.token().to_string()))
            .collect();
        fields.insert(field.to_string(), JsonValue::Array(tokens));
    }

    let sortable: Vec<JsonValue> = kind
        .descriptor()
        .fields()
        .iter()
        .map(|f| JsonValue::String(f.name.to_string()))
        .collect();

    Ok(Json(serde_json::json!({
        "entity": kind.name(),
        "fields": fields,
        "sortable": sortable,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_segment_resolves() {
        for (segment, kind) in [
            ("coaches", EntityKind::Coach),
            ("lessons", EntityKind::Lesson),
            ("subscription-types", EntityKind::SubscriptionType),
            ("timetable", EntityKind::Timetable),
            ("client-subscriptions", EntityKind::ClientSubscription),
            ("attendance", EntityKind::Attendance),
            ("users", EntityKind::User),
        ] {
            assert_eq!(kind_from_route(segment), Some(kind));
        }
        assert_eq!(kind_from_route("bookings"), None);
    }
}
