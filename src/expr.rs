//! 标识符与表达式：表、列、原生 SQL、相等、IN、map 条件、赋值。
//!
//! 这些类型只描述“要渲染什么”，真正的引号与占位符由 `clause::Builder`
//! （通常是 `Statement`）在渲染时按方言写入。

use crate::clause::Builder;
use crate::modifiers::{Arg, FlattenIntoArgs, flatten};
use crate::value::SqlValue;
use std::collections::BTreeMap;

/// “当前表”标记：渲染时替换为语句的目标表。
pub const CURRENT_TABLE: &str = "@@@table@@@";
/// “主键”标记：渲染时替换为 schema 的主键列。
pub const PRIMARY_KEY: &str = "@@@primary_key@@@";

/// 表引用。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub alias: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
        }
    }

    /// 语句自身的目标表。
    pub fn current() -> Self {
        Self::new(CURRENT_TABLE)
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

/// 列引用。`table` 为空时不带表前缀。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub table: String,
    pub name: String,
    pub alias: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: String::new(),
            name: name.into(),
            alias: String::new(),
        }
    }

    /// 当前表的主键列（渲染为 `` `users`.`id` `` 之类）。
    pub fn primary() -> Self {
        Self {
            table: CURRENT_TABLE.to_string(),
            name: PRIMARY_KEY.to_string(),
            alias: String::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// 原生 SQL 片段：`?` 依次绑定 `vars`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    pub sql: String,
    pub vars: Vec<Arg>,
}

/// Expr：构造原生 SQL 表达式。
pub fn expr<T: FlattenIntoArgs>(sql: impl Into<String>, vars: T) -> Expr {
    Expr {
        sql: sql.into(),
        vars: flatten(vars),
    }
}

impl Expr {
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            vars: Vec::new(),
        }
    }

    /// `?` 依次绑定非命名参数；`@name` 绑定同名的命名参数。
    /// SQL 中没有引用到的参数追加在末尾，不会丢失。
    fn build(&self, b: &mut dyn Builder) {
        let mut used = vec![false; self.vars.len()];
        let mut next = 0usize;
        let mut rest = self.sql.as_str();
        while let Some(pos) = rest.find(['?', '@']) {
            b.write_str(&rest[..pos]);
            let marker = rest.as_bytes()[pos];
            rest = &rest[pos + 1..];

            if marker == b'?' {
                while next < self.vars.len() && (used[next] || is_named(&self.vars[next])) {
                    next += 1;
                }
                match self.vars.get(next) {
                    Some(v) => {
                        used[next] = true;
                        b.add_var(std::slice::from_ref(v));
                    }
                    None => b.write_char('?'),
                }
                continue;
            }

            let len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let name = &rest[..len];
            rest = &rest[len..];
            let found = self
                .vars
                .iter()
                .position(|v| !name.is_empty() && named_as(v, name));
            match found {
                Some(i) if !used[i] => {
                    used[i] = true;
                    b.add_var(std::slice::from_ref(&self.vars[i]));
                }
                _ => {
                    b.write_char('@');
                    b.write_str(name);
                }
            }
        }
        b.write_str(rest);

        for (v, used) in self.vars.iter().zip(used) {
            if !used {
                b.add_var(std::slice::from_ref(v));
            }
        }
    }
}

fn is_named(v: &Arg) -> bool {
    matches!(v, Arg::SqlNamed(n) if !n.name.is_empty())
}

fn named_as(v: &Arg, name: &str) -> bool {
    matches!(v, Arg::SqlNamed(n) if n.name == name)
}

/// 相等条件：`col = ?`；值为 NULL 时渲染 `col IS NULL`。
#[derive(Debug, Clone, PartialEq)]
pub struct Eq {
    pub column: Column,
    pub value: Arg,
}

impl Eq {
    pub fn new(column: impl Into<Column>, value: impl Into<Arg>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    fn build(&self, b: &mut dyn Builder) {
        b.write_quoted(Ident::Column(&self.column));
        write_comparison(b, &self.value);
    }
}

/// IN 条件：0 个值渲染 `IN (NULL)`，1 个值退化为相等（唯一的值是列表时仍为 IN）。
#[derive(Debug, Clone, PartialEq)]
pub struct In {
    pub column: Column,
    pub values: Vec<Arg>,
}

impl In {
    pub fn new<T: FlattenIntoArgs>(column: impl Into<Column>, values: T) -> Self {
        Self {
            column: column.into(),
            values: flatten(values),
        }
    }

    fn build(&self, b: &mut dyn Builder) {
        b.write_quoted(Ident::Column(&self.column));
        match self.values.len() {
            0 => b.write_str(" IN (NULL)"),
            1 if matches!(self.values[0], Arg::List(_)) => {
                b.write_str(" IN ");
                b.add_var(&self.values);
            }
            1 => {
                b.write_str(" = ");
                b.add_var(&self.values);
            }
            _ => {
                b.write_str(" IN (");
                b.add_var(&self.values);
                b.write_char(')');
            }
        }
    }
}

/// 通用 key/value 条件：按 key 排序，逐项相等并以 AND 连接。
pub type Map = BTreeMap<String, Arg>;

fn build_map(map: &Map, b: &mut dyn Builder) {
    for (i, (k, v)) in map.iter().enumerate() {
        if i > 0 {
            b.write_str(" AND ");
        }
        let col = Column::new(k.as_str());
        b.write_quoted(Ident::Column(&col));
        write_comparison(b, v);
    }
}

fn write_comparison(b: &mut dyn Builder, value: &Arg) {
    match value {
        Arg::Value(SqlValue::Null) => b.write_str(" IS NULL"),
        Arg::List(_) => {
            b.write_str(" IN ");
            b.add_var(std::slice::from_ref(value));
        }
        _ => {
            b.write_str(" = ");
            b.add_var(std::slice::from_ref(value));
        }
    }
}

/// 条件表达式。
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Expr(Expr),
    Eq(Eq),
    In(In),
    Map(Map),
}

impl Expression {
    pub fn build(&self, b: &mut dyn Builder) {
        match self {
            Self::Expr(e) => e.build(b),
            Self::Eq(e) => e.build(b),
            Self::In(e) => e.build(b),
            Self::Map(m) => build_map(m, b),
        }
    }
}

impl From<Expr> for Expression {
    fn from(v: Expr) -> Self {
        Self::Expr(v)
    }
}

impl From<Eq> for Expression {
    fn from(v: Eq) -> Self {
        Self::Eq(v)
    }
}

impl From<In> for Expression {
    fn from(v: In) -> Self {
        Self::In(v)
    }
}

impl From<Map> for Expression {
    fn from(v: Map) -> Self {
        Self::Map(v)
    }
}

impl From<crate::value::Record> for Expression {
    fn from(v: crate::value::Record) -> Self {
        Self::Map(v.into_iter().map(|(k, v)| (k, Arg::Value(v))).collect())
    }
}

impl From<crate::value::Record> for Arg {
    fn from(v: crate::value::Record) -> Self {
        Expression::from(v).into()
    }
}

impl From<Expr> for Arg {
    fn from(v: Expr) -> Self {
        Expression::Expr(v).into()
    }
}

impl From<Eq> for Arg {
    fn from(v: Eq) -> Self {
        Expression::Eq(v).into()
    }
}

impl From<In> for Arg {
    fn from(v: In) -> Self {
        Expression::In(v).into()
    }
}

impl From<Map> for Arg {
    fn from(v: Map) -> Self {
        Expression::Map(v).into()
    }
}

/// SET 列表中的一项。
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Column,
    pub value: Arg,
}

impl Assignment {
    pub fn new(column: impl Into<Column>, value: impl Into<Arg>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// 需要按方言加引号的标识符。
#[derive(Debug, Clone, Copy)]
pub enum Ident<'a> {
    Table(&'a Table),
    Column(&'a Column),
    Name(&'a str),
}

impl<'a> From<&'a Table> for Ident<'a> {
    fn from(v: &'a Table) -> Self {
        Self::Table(v)
    }
}

impl<'a> From<&'a Column> for Ident<'a> {
    fn from(v: &'a Column) -> Self {
        Self::Column(v)
    }
}

impl<'a> From<&'a str> for Ident<'a> {
    fn from(v: &'a str) -> Self {
        Self::Name(v)
    }
}
