use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{
    Alias, Asterisk, Expr, OnConflict, Order as SortOrder, Query, SimpleExpr,
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, FromQueryResult, JsonValue, Value,
};

use super::mapping::{ColumnKind, ColumnMap, Row};

/// Row-oriented client for the hosted relational backend. Clones share one
/// connection.
#[derive(Clone)]
pub struct RemoteStore {
    conn: Arc<DatabaseConnection>,
}

impl RemoteStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn: Arc::new(conn),
        }
    }

    pub async fn fetch_all(&self, map: &ColumnMap) -> Result<Vec<Row>, DbErr> {
        let order = if map.descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        let stmt = Query::select()
            .column(Asterisk)
            .from(Alias::new(map.table))
            .order_by(Alias::new(map.order_by), order)
            .to_owned();
        let backend = self.conn.get_database_backend();
        let rows = JsonValue::find_by_statement(backend.build(&stmt))
            .all(self.conn.as_ref())
            .await?;
        Ok(rows.into_iter().filter_map(into_row).collect())
    }

    pub async fn insert(&self, map: &ColumnMap, row: &Row) -> Result<Row, DbErr> {
        let (columns, values) = bind_row(map, row);
        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(map.table))
            .columns(columns)
            .values(values)
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .returning_all();
        let backend = self.conn.get_database_backend();
        JsonValue::find_by_statement(backend.build(&stmt))
            .one(self.conn.as_ref())
            .await?
            .and_then(into_row)
            .ok_or(DbErr::RecordNotInserted)
    }

    /// Inserts the row, or overwrites every mapped column when the key exists.
    pub async fn upsert(&self, map: &ColumnMap, row: &Row) -> Result<(), DbErr> {
        let (columns, values) = bind_row(map, row);
        let updatable: Vec<Alias> = map
            .columns
            .iter()
            .filter(|c| c.name != map.key)
            .map(|c| Alias::new(c.name))
            .collect();
        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(map.table))
            .columns(columns)
            .values(values)
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .on_conflict(
                OnConflict::column(Alias::new(map.key))
                    .update_columns(updatable)
                    .to_owned(),
            );
        let backend = self.conn.get_database_backend();
        self.conn.execute(backend.build(&stmt)).await?;
        Ok(())
    }

    /// Writes the given columns of one row. Fails with `RecordNotFound` when no
    /// row carries the key.
    pub async fn update(&self, map: &ColumnMap, id: &str, partial: &Row) -> Result<(), DbErr> {
        let assignments: Vec<(Alias, SimpleExpr)> = partial
            .iter()
            .filter(|(name, _)| name.as_str() != map.key)
            .filter_map(|(name, value)| {
                let column = map.column(name)?;
                Some((Alias::new(column.name), to_sea_value(column.kind, value).into()))
            })
            .collect();
        if assignments.is_empty() {
            return Ok(());
        }
        let stmt = Query::update()
            .table(Alias::new(map.table))
            .values(assignments)
            .and_where(Expr::col(Alias::new(map.key)).eq(id))
            .to_owned();
        let backend = self.conn.get_database_backend();
        let result = self.conn.execute(backend.build(&stmt)).await?;
        if result.rows_affected() == 0 {
            return Err(DbErr::RecordNotFound(format!("{} {}", map.table, id)));
        }
        Ok(())
    }

    pub async fn delete(&self, map: &ColumnMap, id: &str) -> Result<(), DbErr> {
        let stmt = Query::delete()
            .from_table(Alias::new(map.table))
            .and_where(Expr::col(Alias::new(map.key)).eq(id))
            .to_owned();
        let backend = self.conn.get_database_backend();
        let result = self.conn.execute(backend.build(&stmt)).await?;
        if result.rows_affected() == 0 {
            return Err(DbErr::RecordNotFound(format!("{} {}", map.table, id)));
        }
        Ok(())
    }
}

fn into_row(value: JsonValue) -> Option<Row> {
    match value {
        JsonValue::Object(row) => Some(row),
        other => {
            tracing::warn!(value = %other, "remote returned a non-object row, skipping");
            None
        }
    }
}

fn bind_row(map: &ColumnMap, row: &Row) -> (Vec<Alias>, Vec<SimpleExpr>) {
    map.columns
        .iter()
        .map(|column| {
            let value = row.get(column.name).unwrap_or(&JsonValue::Null);
            (
                Alias::new(column.name),
                SimpleExpr::from(to_sea_value(column.kind, value)),
            )
        })
        .unzip()
}

/// Converts a row value to a typed bind parameter. Values that cannot be
/// represented in the column's type are sent as NULL.
pub fn to_sea_value(kind: ColumnKind, value: &JsonValue) -> Value {
    match kind {
        ColumnKind::Text => Value::String(match value {
            JsonValue::Null => None,
            JsonValue::String(s) => Some(Box::new(s.clone())),
            other => Some(Box::new(other.to_string())),
        }),
        ColumnKind::Integer => Value::BigInt(value.as_i64()),
        ColumnKind::Decimal => Value::Decimal(
            match value {
                JsonValue::Number(n) => Decimal::from_str(&n.to_string())
                    .or_else(|_| Decimal::from_scientific(&n.to_string()))
                    .ok(),
                JsonValue::String(s) => Decimal::from_str(s).ok(),
                _ => None,
            }
            .map(Box::new),
        ),
        ColumnKind::Boolean => Value::Bool(value.as_bool()),
        ColumnKind::Timestamp => Value::ChronoDateTimeUtc(
            value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| Box::new(dt.with_timezone(&Utc))),
        ),
        ColumnKind::Date => Value::ChronoDate(
            value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(Box::new),
        ),
        ColumnKind::Json => Value::Json(match value {
            JsonValue::Null => None,
            other => Some(Box::new(other.clone())),
        }),
    }
}
