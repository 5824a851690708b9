//! Value conversion between SeaQuery and may_postgres.
//!
//! Outbound, `sea_query::Value`s produced by a built statement are turned into
//! owned `ToSql` parameters. Inbound, a `may_postgres::Row` is decoded into a
//! [`Row`] keyed by column name, one typed read per declared field.

use crate::executor::{LifeError, Row};
use crate::model::FieldInfo;
use crate::value::FieldType;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use may_postgres::types::{FromSqlOwned, ToSql};
use rust_decimal::Decimal;
use sea_query::Value;
use uuid::Uuid;

/// Convert SeaQuery values to may_postgres `ToSql` parameters and run `f` with them.
///
/// Nulls are bound with the type of the variant that carries them, so the
/// server sees a typed NULL.
///
/// # Errors
///
/// Returns `LifeError::Other` if an unsupported value type is encountered, or
/// an unsigned value does not fit the signed column type it binds to.
pub fn with_converted_params<F, R>(values: &sea_query::Values, f: F) -> Result<R, LifeError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, LifeError>,
{
    let owned = values
        .iter()
        .map(to_sql_param)
        .collect::<Result<Vec<_>, _>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
    f(&params)
}

fn decode<T: sea_query::ValueType>(value: &Value) -> Result<T, LifeError> {
    T::try_from(value.clone())
        .map_err(|_| LifeError::Other(format!("Unsupported value type in query: {:?}", value)))
}

fn to_sql_param(value: &Value) -> Result<Box<dyn ToSql>, LifeError> {
    let param: Box<dyn ToSql> = match value {
        Value::Bool(v) => Box::new(*v),
        Value::TinyInt(v) => Box::new(v.map(i16::from)),
        Value::SmallInt(v) => Box::new(*v),
        Value::Int(v) => Box::new(*v),
        Value::BigInt(v) => Box::new(*v),
        Value::TinyUnsigned(v) => Box::new(v.map(i16::from)),
        Value::SmallUnsigned(v) => Box::new(v.map(i32::from)),
        Value::Unsigned(v) => Box::new(v.map(i64::from)),
        Value::BigUnsigned(v) => {
            let signed = v
                .map(i64::try_from)
                .transpose()
                .map_err(|_| {
                    LifeError::Other(format!(
                        "BigUnsigned value {:?} exceeds i64::MAX ({}), cannot be safely cast to i64",
                        v,
                        i64::MAX
                    ))
                })?;
            Box::new(signed)
        }
        Value::Float(v) => Box::new(*v),
        Value::Double(v) => Box::new(*v),
        Value::Char(v) => Box::new(v.map(|c| c.to_string())),
        Value::String(_) => Box::new(decode::<Option<String>>(value)?),
        Value::Bytes(_) => Box::new(decode::<Option<Vec<u8>>>(value)?),
        Value::Json(_) => Box::new(decode::<Option<serde_json::Value>>(value)?),
        Value::ChronoDate(_) => Box::new(decode::<Option<NaiveDate>>(value)?),
        Value::ChronoTime(_) => Box::new(decode::<Option<NaiveTime>>(value)?),
        Value::ChronoDateTime(_) => Box::new(decode::<Option<NaiveDateTime>>(value)?),
        Value::ChronoDateTimeUtc(_) => Box::new(decode::<Option<DateTime<Utc>>>(value)?),
        Value::ChronoDateTimeLocal(_) => Box::new(decode::<Option<DateTime<Local>>>(value)?),
        Value::ChronoDateTimeWithTimeZone(_) => {
            Box::new(decode::<Option<DateTime<FixedOffset>>>(value)?)
        }
        Value::Uuid(_) => Box::new(decode::<Option<Uuid>>(value)?),
        Value::Decimal(_) => Box::new(decode::<Option<Decimal>>(value)?),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(LifeError::Other(format!(
                "Unsupported value type in query: {:?}",
                value
            )))
        }
    };
    Ok(param)
}

fn read<T>(row: &may_postgres::Row, field: &FieldInfo) -> Result<Option<T>, LifeError>
where
    T: FromSqlOwned,
{
    row.try_get::<&str, Option<T>>(field.column_name())
        .map_err(|e| LifeError::ParseError(format!("Failed to read column {}: {}", field.column_name(), e)))
}

/// Decode the declared fields of a PostgreSQL row into a [`Row`]
pub fn decode_row(row: &may_postgres::Row, fields: &[FieldInfo]) -> Result<Row, LifeError> {
    let mut decoded = Row::new();
    for field in fields {
        let value = match field.field_type() {
            FieldType::Text => Value::from(read::<String>(row, field)?),
            FieldType::Boolean => Value::Bool(read::<bool>(row, field)?),
            FieldType::Integer => Value::Int(read::<i32>(row, field)?),
            FieldType::BigInteger => Value::BigInt(read::<i64>(row, field)?),
            FieldType::Float => Value::Float(read::<f32>(row, field)?),
            FieldType::Double => Value::Double(read::<f64>(row, field)?),
            FieldType::Decimal => Value::from(read::<Decimal>(row, field)?),
            FieldType::Timestamp => Value::from(read::<NaiveDateTime>(row, field)?),
            FieldType::Date => Value::from(read::<NaiveDate>(row, field)?),
            FieldType::Uuid => Value::from(read::<Uuid>(row, field)?),
            FieldType::Time => Value::from(read::<NaiveTime>(row, field)?),
            FieldType::Json => Value::from(read::<serde_json::Value>(row, field)?),
            FieldType::Binary => Value::from(read::<Vec<u8>>(row, field)?),
        };
        decoded.insert(field.column_name().to_string(), value);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::Values;

    #[test]
    fn test_converts_every_comparable_value() {
        let values = Values(vec![
            Value::Bool(Some(true)),
            Value::Int(None),
            Value::BigInt(Some(7)),
            Value::from("text"),
            Value::from(Some(Uuid::nil())),
            Value::from(Some(Decimal::new(15, 1))),
            Value::from(NaiveDate::from_ymd_opt(2024, 1, 2)),
        ]);
        let count = with_converted_params(&values, |params| Ok(params.len())).unwrap();
        assert_eq!(count, 7);
    }

    #[test]
    fn test_big_unsigned_overflow_is_rejected() {
        let values = Values(vec![Value::BigUnsigned(Some(u64::MAX))]);
        let result = with_converted_params(&values, |_| Ok(()));
        assert!(matches!(result, Err(LifeError::Other(_))));
    }
}
