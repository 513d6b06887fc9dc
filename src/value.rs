//! SQL 参数值类型：语句绑定的参数、扫描读出的列值都用它表示。

use std::borrow::Cow;
use std::collections::BTreeMap;

/// SQL 参数值。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Cow<'static, str>),
    Bytes(Vec<u8>),
    DateTime(time::OffsetDateTime),
}

/// 通用 key/value 记录：既是扫描目标，也是 map 形式的更新载荷。
///
/// 使用 `BTreeMap` 保证按 key 排序遍历，生成的 SQL 顺序稳定。
pub type Record = BTreeMap<String, SqlValue>;

impl SqlValue {
    /// 将 `Option<T>` 映射为 `SqlValue`：`None => Null`，`Some(v) => v.into()`。
    pub fn from_option<T: Into<SqlValue>>(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }

    /// 零值判断：NULL、false、0、空串、空字节、Unix epoch。
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !*b,
            Self::I64(n) => *n == 0,
            Self::U64(n) => *n == 0,
            Self::F64(n) => n.to_bits() == 0,
            Self::String(s) => s.is_empty(),
            Self::Bytes(b) => b.is_empty(),
            Self::DateTime(dt) => *dt == time::OffsetDateTime::UNIX_EPOCH,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// 当前时间（UTC），用于 autoupdatetime 字段。
    pub fn now() -> Self {
        Self::DateTime(time::OffsetDateTime::now_utc())
    }
}

impl From<()> for SqlValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! from_signed {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                Self::I64(v as i64)
            }
        })+
    };
}

macro_rules! from_unsigned {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                Self::U64(v as u64)
            }
        })+
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::F64(v as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::String(Cow::Owned(v))
    }
}

impl From<&'static str> for SqlValue {
    fn from(v: &'static str) -> Self {
        Self::String(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<time::OffsetDateTime> for SqlValue {
    fn from(v: time::OffsetDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        Self::from_option(v)
    }
}

#[cfg(test)]
mod tests {
    use super::SqlValue;

    #[test]
    fn from_option_some() {
        assert_eq!(SqlValue::from_option(Some(123_i64)), SqlValue::I64(123));
    }

    #[test]
    fn from_option_none() {
        assert_eq!(SqlValue::from_option::<i64>(None), SqlValue::Null);
    }

    #[test]
    fn from_unsigned_widths() {
        assert_eq!(SqlValue::from(7_u32), SqlValue::U64(7));
        assert_eq!(SqlValue::from(7_i16), SqlValue::I64(7));
    }

    #[test]
    fn zero_values() {
        assert!(SqlValue::Null.is_zero());
        assert!(SqlValue::from("").is_zero());
        assert!(SqlValue::from(0_u64).is_zero());
        assert!(SqlValue::DateTime(time::OffsetDateTime::UNIX_EPOCH).is_zero());
        assert!(!SqlValue::from("x").is_zero());
        assert!(!SqlValue::from(true).is_zero());
        assert!(!SqlValue::now().is_zero());
    }
}
