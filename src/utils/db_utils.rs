use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Build a partial UPDATE from an admin-UI JSON payload.
///
/// Only keys present in `allowed` make it into the SET clause; anything
/// else in the payload is ignored. The payload comes straight from the
/// back-office JS, so column names must never be taken from it blindly.
pub fn build_update_sql(
    table: &str,
    allowed: &[&str],
    payload: &Value,
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    let fields: Vec<(&String, &Value)> = obj
        .iter()
        .filter(|(k, _)| allowed.contains(&k.as_str()))
        .collect();

    if fields.is_empty() {
        return Err(ErrorBadRequest("No updatable fields provided"));
    }

    let set_clause = fields
        .iter()
        .map(|(k, _)| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(fields.len() + 1);

    for (_, value) in fields {
        match value {
            Value::String(s) => {
                // Dates arrive as strings from the UI.
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

    values.push(SqlValue::I64(id_value as i64));

    Ok(SqlUpdate { sql, values })
}

/// MySQL integrity-constraint violation (duplicate key lands here).
pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23000"))
}

/// Next free sequence for DEV-/FAC- style numbering within a prefix.
/// Derived from MAX, not COUNT, so deleted rows never shift it back;
/// callers still retry on a duplicate because two creates can read the
/// same MAX.
pub async fn next_numero_seq(
    pool: &MySqlPool,
    table: &str,
    prefix: &str,
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        "SELECT MAX(CAST(SUBSTRING_INDEX(numero, '-', -1) AS UNSIGNED)) FROM {} WHERE numero LIKE ?",
        table
    );
    let max: Option<u64> = sqlx::query_scalar(&sql)
        .bind(format!("{}%", prefix))
        .fetch_one(pool)
        .await?;
    Ok(max.unwrap_or(0) + 1)
}

pub fn format_numero(prefix: &str, seq: u64) -> String {
    format!("{}{:04}", prefix, seq)
}

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
    fn builds_set_clause_from_allowed_keys_only() {
        let payload = json!({
            "nom": "Martin",
            "statut": "en_cours",
            "id": 99,
            "drop table": "x"
        });
        let update =
            build_update_sql("chantiers", &["nom", "statut"], &payload, "id", 7).unwrap();

        assert_eq!(update.sql, "UPDATE chantiers SET nom = ?, statut = ? WHERE id = ?");
        assert_eq!(update.values.last(), Some(&SqlValue::I64(7)));
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn rejects_payload_without_updatable_fields() {
        let payload = json!({ "id": 1 });
        assert!(build_update_sql("clients", &["nom"], &payload, "id", 1).is_err());
        assert!(build_update_sql("clients", &["nom"], &json!([1, 2]), "id", 1).is_err());
    }

    #[test]
    fn numero_formatting_pads_to_four_digits() {
        assert_eq!(format_numero("DEV-2025-", 3), "DEV-2025-0003");
        assert_eq!(format_numero("FAC-2025-", 12345), "FAC-2025-12345");
    }

    #[test]
    fn non_database_errors_are_not_duplicates() {
        assert!(!is_duplicate_key(&sqlx::Error::RowNotFound));
        assert!(!is_duplicate_key(&sqlx::Error::PoolClosed));
    }

    #[test]
    fn date_strings_bind_as_dates() {
        let payload = json!({ "date_debut": "2025-04-01", "budget_initial": 120000.5 });
        let update = build_update_sql(
            "chantiers",
            &["date_debut", "budget_initial"],
            &payload,
            "id",
            3,
        )
        .unwrap();

        assert!(update
            .values
            .iter()
            .any(|v| matches!(v, SqlValue::Date(d) if d.to_string() == "2025-04-01")));
        assert!(update
            .values
            .iter()
            .any(|v| matches!(v, SqlValue::F64(f) if *f == 120000.5)));
    }
}
