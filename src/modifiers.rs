//! 参数类型与辅助函数：`Arg` 是绑定阶段的动态参数，`add_var` 按变体分类渲染。

use crate::expr::{Column, Expression, Table};
use crate::value::SqlValue;
use crate::valuer::SqlValuer;

/// 命名参数：在 SQL 中以 `@name` 占位，与位置参数分开记录。
///
/// 名字为空时按普通位置参数处理。
#[derive(Debug, Clone, PartialEq)]
pub struct SqlNamedArg {
    pub name: String,
    pub value: SqlValue,
}

impl SqlNamedArg {
    pub fn new(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Named：构造一个命名参数。
pub fn named(name: impl Into<String>, value: impl Into<SqlValue>) -> Arg {
    Arg::SqlNamed(SqlNamedArg::new(name, value))
}

/// List：标记为参数列表，绑定时展开成 `(?,?,?)`，空列表展开成 `(NULL)`。
pub fn list<T: FlattenIntoArgs>(values: T) -> Arg {
    Arg::List(flatten(values))
}

/// Flatten：把嵌套的 Vec/数组递归展开成一维参数序列。
pub fn flatten<T: FlattenIntoArgs>(v: T) -> Vec<Arg> {
    let mut out = Vec::new();
    v.flatten_into(&mut out);
    out
}

/// 语句构建使用的动态参数类型。
#[derive(Debug, Clone)]
pub enum Arg {
    Value(SqlValue),
    Valuer(Box<dyn SqlValuer>),
    SqlNamed(SqlNamedArg),
    Column(Column),
    Table(Table),
    List(Vec<Arg>),
    /// 自带渲染逻辑的表达式（原生 SQL、相等、IN、map 条件）。
    Expression(Box<Expression>),
}

impl Arg {
    /// 展开 valuer；其他变体原样返回。
    pub fn resolve(self) -> Result<Arg, crate::valuer::ValuerError> {
        match self {
            Self::Valuer(v) => Ok(Self::Value(v.value()?)),
            other => Ok(other),
        }
    }

    pub fn as_value(&self) -> Option<&SqlValue> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Valuer(_), _) | (_, Self::Valuer(_)) => false,
            (Self::SqlNamed(a), Self::SqlNamed(b)) => a == b,
            (Self::Column(a), Self::Column(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Expression(a), Self::Expression(b)) => a == b,
            _ => false,
        }
    }
}

impl From<SqlValue> for Arg {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

impl From<Box<dyn SqlValuer>> for Arg {
    fn from(v: Box<dyn SqlValuer>) -> Self {
        Self::Valuer(v)
    }
}

impl From<SqlNamedArg> for Arg {
    fn from(v: SqlNamedArg) -> Self {
        Self::SqlNamed(v)
    }
}

impl From<Column> for Arg {
    fn from(v: Column) -> Self {
        Self::Column(v)
    }
}

impl From<Table> for Arg {
    fn from(v: Table) -> Self {
        Self::Table(v)
    }
}

impl From<Expression> for Arg {
    fn from(v: Expression) -> Self {
        Self::Expression(Box::new(v))
    }
}

macro_rules! arg_from_value {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Self::Value(SqlValue::from(v))
            }
        })+
    };
}

arg_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &'static str,
    Vec<u8>,
    time::OffsetDateTime,
);

impl<T> From<Option<T>> for Arg
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        Self::Value(SqlValue::from_option(v))
    }
}

/// 用 trait 实现“递归展开”：单值直接追加，Vec/数组逐个展开。
pub trait FlattenIntoArgs {
    fn flatten_into(self, out: &mut Vec<Arg>);
}

impl<T: Into<Arg>> FlattenIntoArgs for T {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        out.push(self.into());
    }
}

impl<T: FlattenIntoArgs> FlattenIntoArgs for Vec<T> {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        for v in self {
            v.flatten_into(out);
        }
    }
}

impl<T: FlattenIntoArgs, const N: usize> FlattenIntoArgs for [T; N] {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        for v in self {
            v.flatten_into(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flatten_vec_and_array() {
        match list(vec![1_i64, 2, 3]) {
            Arg::List(args) => assert_eq!(args.len(), 3),
            _ => panic!("expected list"),
        }
        match list([vec![1_i64], vec![2, 3]]) {
            Arg::List(args) => assert_eq!(args, vec![Arg::from(1_i64), 2_i64.into(), 3_i64.into()]),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn empty_list_stays_empty() {
        assert_eq!(list(Vec::<i64>::new()), Arg::List(vec![]));
    }

    #[test]
    fn named_arg_keeps_name() {
        assert_eq!(
            named("start", 10_i64),
            Arg::SqlNamed(SqlNamedArg {
                name: "start".into(),
                value: SqlValue::I64(10),
            })
        );
    }
}
