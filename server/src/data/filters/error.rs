//! Filter compilation errors
//!
//! Every variant is a deterministic, per-request validation failure; any of
//! them aborts the whole compilation with no partial predicate. Fatal
//! configuration faults (unregistered entity kind, uninferable column type)
//! are unrepresentable here: the registry and descriptors are total over
//! the `EntityKind` and `FieldType` enums.

use thiserror::Error;

/// Client-side filter compilation failure (maps to HTTP 400)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Field is not an attribute of the entity, or not filterable at the
    /// caller's role tier
    #[error("unknown field '{field}' for {entity}")]
    UnknownField { entity: &'static str, field: String },

    /// Field exists but the operator is not in its permitted set
    #[error("operator '{op}' is not allowed for field '{field}' of {entity}")]
    DisallowedOperator {
        entity: &'static str,
        field: String,
        op: &'static str,
    },

    /// Raw value does not convert to the field's semantic type
    #[error("invalid {expected} value '{value}' for field '{field}'")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Wrong number of values for the operator (`between` needs exactly
    /// two, single-valued operators exactly one)
    #[error("operator '{op}' expects {expected} value(s) for field '{field}', got {got}")]
    WrongArity {
        field: String,
        op: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// Structurally invalid expression (missing separator, empty token,
    /// unknown operator token)
    #[error("malformed filter expression: {reason}")]
    Malformed { reason: String },
}

impl FilterError {
    /// Stable machine-readable code for the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::UnknownField { .. } => "UNKNOWN_FIELD",
            FilterError::DisallowedOperator { .. } => "OPERATOR_NOT_ALLOWED",
            FilterError::InvalidValue { .. } => "INVALID_FILTER_VALUE",
            FilterError::WrongArity { .. } => "INVALID_FILTER_VALUE",
            FilterError::Malformed { .. } => "MALFORMED_FILTER",
        }
    }

    /// Field-level detail report (field name -> reason), when the failure
    /// is attributable to a single field
    pub fn details(&self) -> Option<serde_json::Value> {
        let field = match self {
            FilterError::UnknownField { field, .. }
            | FilterError::DisallowedOperator { field, .. }
            | FilterError::InvalidValue { field, .. }
            | FilterError::WrongArity { field, .. } => field,
            FilterError::Malformed { .. } => return None,
        };
        let mut report = serde_json::Map::new();
        report.insert(field.clone(), serde_json::Value::String(self.to_string()));
        Some(serde_json::Value::Object(report))
    }
}
