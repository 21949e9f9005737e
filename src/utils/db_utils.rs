use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value enum
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// SQL update container
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Build a dynamic UPDATE from a JSON payload.
///
/// Column names never come from the payload directly: every key must appear
/// in `allowed_columns`, and all values travel as bound parameters.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed_columns: &[&str],
    id_column: &str,
    id_value: SqlValue,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    if let Some(unknown) = obj.keys().find(|k| !allowed_columns.contains(&k.as_str())) {
        return Err(ErrorBadRequest(format!("Unknown field: {}", unknown)));
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }

    values.push(id_value);

    Ok(SqlUpdate { sql, values })
}

/// Execute the update
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_columns_outside_the_allowlist() {
        let payload = json!({"full_name": "Jane", "role_id": 1});

        let err = build_update_sql(
            "employees",
            &payload,
            &["full_name", "position"],
            "id",
            SqlValue::I64(1),
        )
        .unwrap_err();

        assert!(err.to_string().contains("role_id"));
    }

    #[test]
    fn builds_parameterized_set_clause() {
        let payload = json!({"full_name": "Jane"});

        let update = build_update_sql(
            "employees",
            &payload,
            &["full_name"],
            "id",
            SqlValue::I64(7),
        )
        .unwrap();

        assert_eq!(update.sql, "UPDATE employees SET full_name = ? WHERE id = ?");
        assert_eq!(update.values.len(), 2);
    }
}
