//! Scan：把驱动返回的行写入语句的目标（单条记录、记录列表、单个模型、模型列表）。
//!
//! 每行先由驱动读入一组 `SqlValue`，再按列名经 schema 找到字段，通过字段的 setter 写入。
//! 找不到字段的列直接丢弃；单行读取失败记录在语句上，继续处理后面的行。

use crate::driver::Rows;
use crate::error::Error;
use crate::model::ModelValue;
use crate::schema::{Field, Schema};
use crate::statement::{Dest, Statement};
use crate::value::{Record, SqlValue};
use std::sync::Arc;

/// 扫描/类型转换错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("cannot convert {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("failed to parse int: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error("failed to parse float: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
    #[error("value out of range for {0}")]
    OutOfRange(&'static str),
    #[error("invalid utf-8 in text column")]
    InvalidUtf8,
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("row has {got} values, expected {expected}")]
    ColumnCount { expected: usize, got: usize },
    #[error("driver scan failed: {0}")]
    Driver(String),
}

fn kind(v: &SqlValue) -> &'static str {
    match v {
        SqlValue::Null => "NULL",
        SqlValue::Bool(_) => "bool",
        SqlValue::I64(_) => "i64",
        SqlValue::U64(_) => "u64",
        SqlValue::F64(_) => "f64",
        SqlValue::String(_) => "string",
        SqlValue::Bytes(_) => "bytes",
        SqlValue::DateTime(_) => "datetime",
    }
}

fn mismatch<T>(expected: &'static str, v: &SqlValue) -> Result<T, ScanError> {
    Err(ScanError::TypeMismatch {
        expected,
        found: kind(v),
    })
}

/// 从列值构造字段值。文本形式的数字、布尔会被解析（部分驱动只返回文本）。
pub trait FromSqlValue: Sized {
    fn from_sql_value(v: SqlValue) -> Result<Self, ScanError>;
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
        Ok(v)
    }
}

impl FromSqlValue for String {
    fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
        match v {
            SqlValue::String(s) => Ok(s.into_owned()),
            SqlValue::Bytes(b) => String::from_utf8(b).map_err(|_| ScanError::InvalidUtf8),
            SqlValue::I64(n) => Ok(n.to_string()),
            SqlValue::U64(n) => Ok(n.to_string()),
            SqlValue::F64(n) => Ok(n.to_string()),
            SqlValue::Bool(b) => Ok(b.to_string()),
            other => mismatch("String", &other),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
        match &v {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::I64(n) => Ok(*n != 0),
            SqlValue::U64(n) => Ok(*n != 0),
            SqlValue::String(s) => match s.as_ref() {
                "1" | "true" | "TRUE" | "t" => Ok(true),
                "0" | "false" | "FALSE" | "f" => Ok(false),
                _ => mismatch("bool", &v),
            },
            _ => mismatch("bool", &v),
        }
    }
}

macro_rules! from_sql_int {
    ($($t:ty),+ $(,)?) => {
        $(impl FromSqlValue for $t {
            fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
                match v {
                    SqlValue::I64(n) => <$t>::try_from(n).map_err(|_| ScanError::OutOfRange(stringify!($t))),
                    SqlValue::U64(n) => <$t>::try_from(n).map_err(|_| ScanError::OutOfRange(stringify!($t))),
                    SqlValue::Bool(b) => Ok(<$t>::from(b)),
                    SqlValue::String(s) => Ok(s.trim().parse::<$t>()?),
                    SqlValue::Bytes(b) => {
                        let s = std::str::from_utf8(&b).map_err(|_| ScanError::InvalidUtf8)?;
                        Ok(s.trim().parse::<$t>()?)
                    }
                    other => mismatch(stringify!($t), &other),
                }
            }
        })+
    };
}

from_sql_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! from_sql_float {
    ($($t:ty),+ $(,)?) => {
        $(impl FromSqlValue for $t {
            fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
                match v {
                    SqlValue::F64(n) => Ok(n as $t),
                    SqlValue::I64(n) => Ok(n as $t),
                    SqlValue::U64(n) => Ok(n as $t),
                    SqlValue::String(s) => Ok(s.trim().parse::<$t>()?),
                    other => mismatch(stringify!($t), &other),
                }
            }
        })+
    };
}

from_sql_float!(f32, f64);

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
        match v {
            SqlValue::Bytes(b) => Ok(b),
            SqlValue::String(s) => Ok(s.into_owned().into_bytes()),
            other => mismatch("Vec<u8>", &other),
        }
    }
}

impl FromSqlValue for time::OffsetDateTime {
    fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
        match v {
            SqlValue::DateTime(dt) => Ok(dt),
            SqlValue::I64(n) => time::OffsetDateTime::from_unix_timestamp(n)
                .map_err(|_| ScanError::OutOfRange("OffsetDateTime")),
            other => mismatch("OffsetDateTime", &other),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(v: SqlValue) -> Result<Self, ScanError> {
        match v {
            SqlValue::Null => Ok(None),
            v => T::from_sql_value(v).map(Some),
        }
    }
}

fn resolve_fields(schema: &Schema, columns: &[String]) -> Vec<Option<Field>> {
    columns
        .iter()
        .map(|c| schema.look_up_field(c).cloned())
        .collect()
}

/// 把一行值按列写入模型；无法转换的值记录为错误并跳过。
fn assign_row(
    stmt: &mut Statement<'_>,
    target: &mut dyn ModelValue,
    fields: &[Option<Field>],
    values: &mut [SqlValue],
) {
    for (field, value) in fields.iter().zip(values.iter_mut()) {
        let Some(field) = field else { continue };
        if let Err(e) = field.set(target, std::mem::replace(value, SqlValue::Null)) {
            stmt.add_error(Error::scan(field.db_name.clone(), e));
        }
    }
}

fn read_row(
    stmt: &mut Statement<'_>,
    rows: &mut dyn Rows,
    columns: &[String],
    values: &mut [SqlValue],
) -> bool {
    values.fill(SqlValue::Null);
    match rows.scan(values) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(target: "halo_orm::sql", error = %e, "row scan failed");
            stmt.add_error(Error::scan(columns.join(","), e));
            false
        }
    }
}

fn record_of(columns: &[String], values: &mut [SqlValue]) -> Record {
    columns
        .iter()
        .zip(values.iter_mut())
        .map(|(c, v)| (c.clone(), std::mem::replace(v, SqlValue::Null)))
        .collect()
}

/// 把 `rows` 全部写入语句目标，累加 `rows_affected`。
///
/// 目标为空（`Dest::None`）时写入语句的 model。
/// 没有读到任何行且 `raise_error_on_not_found` 时记录 `RecordNotFound`。
pub fn scan(rows: &mut dyn Rows, stmt: &mut Statement<'_>) {
    let columns = rows.columns().to_vec();
    let mut values = vec![SqlValue::Null; columns.len()];
    let mut count = 0u64;
    let naming = stmt.config.naming.clone();

    let mut dest = std::mem::take(&mut stmt.dest);
    match &mut dest {
        Dest::Record(record) => {
            if rows.next_row() {
                count += 1;
                if read_row(stmt, rows, &columns, &mut values) {
                    record.extend(record_of(&columns, &mut values));
                }
            }
        }
        Dest::Records(records) => {
            while rows.next_row() {
                count += 1;
                if read_row(stmt, rows, &columns, &mut values) {
                    records.push(record_of(&columns, &mut values));
                }
            }
        }
        Dest::Models(list) => {
            let schema: Arc<Schema> = list.schema(&naming);
            let fields = resolve_fields(&schema, &columns);
            list.clear();
            while rows.next_row() {
                count += 1;
                let ok = read_row(stmt, rows, &columns, &mut values);
                let elem = list.push_default();
                if ok {
                    assign_row(stmt, elem, &fields, &mut values);
                }
            }
        }
        Dest::Model(target) => {
            count += scan_one(stmt, rows, &columns, &mut values, &mut **target, &naming);
        }
        Dest::None => match stmt.model.take() {
            Some(target) => {
                count += scan_one(stmt, rows, &columns, &mut values, &mut *target, &naming);
                stmt.model = Some(target);
            }
            None => stmt.add_error(Error::UnsupportedDest("no destination")),
        },
    }
    stmt.dest = dest;

    stmt.rows_affected += count;
    if count == 0 && stmt.raise_error_on_not_found {
        stmt.add_error(Error::RecordNotFound);
    }
}

fn scan_one(
    stmt: &mut Statement<'_>,
    rows: &mut dyn Rows,
    columns: &[String],
    values: &mut [SqlValue],
    target: &mut dyn ModelValue,
    naming: &crate::field_mapper::NamingStrategy,
) -> u64 {
    if !rows.next_row() {
        return 0;
    }
    let schema = target.schema(naming);
    let fields = resolve_fields(&schema, columns);
    if read_row(stmt, rows, columns, values) {
        assign_row(stmt, target, &fields, values);
    }
    1
}
