//! Shared helper functions for PostgreSQL queries and row conversion.

use chorus_core::error::{StorageError, StorageResult};
use chorus_core::models::MessageId;
use chorus_core::ports::{IdFilter, OrderDirection};

/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// SQL comparison for an id filter, with the bound to bind.
///
/// Returns `None` for [`IdFilter::All`]. Operators are hardcoded here and
/// never built from user input; the bound is always bound as a parameter.
pub fn id_condition(filter: IdFilter) -> Option<(&'static str, i64)> {
    match filter {
        IdFilter::All => None,
        IdFilter::Lt(id) => Some(("<", id.get())),
        IdFilter::Le(id) => Some(("<=", id.get())),
        IdFilter::Gt(id) => Some((">", id.get())),
        IdFilter::Ge(id) => Some((">=", id.get())),
    }
}

/// SQL keyword for an order direction.
pub fn order_sql(order: OrderDirection) -> &'static str {
    match order {
        OrderDirection::Asc => "ASC",
        OrderDirection::Desc => "DESC",
    }
}

/// Convert a stored id into a [`MessageId`], rejecting non-positive values as corrupt.
pub fn row_to_message_id(raw: i64, field_name: &str) -> StorageResult<MessageId> {
    let id = MessageId(raw);
    if !id.is_valid() {
        return Err(StorageError::SerializationError(format!(
            "{} is {}, which indicates data corruption",
            field_name, raw
        )));
    }
    Ok(id)
}

/// Map an insert error, surfacing foreign key failures as constraint violations.
pub fn map_insert_error(err: sqlx::Error) -> StorageError {
    let is_fk_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);

    if is_fk_violation {
        StorageError::ConstraintViolation(err.to_string())
    } else {
        StorageError::QueryError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: détecte les données corrompues (id <= 0 = jamais attribué par la base)
    #[test]
    fn test_rejects_non_positive_ids() {
        let result = row_to_message_id(0, "messages.id");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("corruption"));
        assert!(row_to_message_id(-1, "messages.id").is_err());
        assert_eq!(row_to_message_id(41, "messages.id").unwrap(), MessageId(41));
    }

    // Test critique: erreurs incluent le nom du champ pour debug
    #[test]
    fn test_error_includes_field_name() {
        let err = row_to_message_id(0, "messages.id").unwrap_err().to_string();
        assert!(err.contains("messages.id"));
    }

    #[test]
    fn test_id_condition_operators() {
        let b = MessageId(41);
        assert_eq!(id_condition(IdFilter::All), None);
        assert_eq!(id_condition(IdFilter::Lt(b)), Some(("<", 41)));
        assert_eq!(id_condition(IdFilter::Le(b)), Some(("<=", 41)));
        assert_eq!(id_condition(IdFilter::Gt(b)), Some((">", 41)));
        assert_eq!(id_condition(IdFilter::Ge(b)), Some((">=", 41)));
    }

    #[test]
    fn test_non_database_errors_are_query_errors() {
        let err = map_insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::QueryError(_)));
    }
}
