//! Statement：单条语句的可变构建状态（子句表、SQL 缓冲、参数列表、目标与错误）。
//!
//! 一个 Statement 在执行后可通过 `reinit` 重置再复用；不可跨并发操作共享。

use crate::clause::{Builder, Clause, Interface, WHERE, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::expr::{CURRENT_TABLE, Column, Expr, Expression, Ident, In, PRIMARY_KEY};
use crate::model::{ModelSlice, ModelValue};
use crate::modifiers::{Arg, SqlNamedArg};
use crate::schema::Schema;
use crate::value::{Record, SqlValue};
use crate::where_clause::Where;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// 语句的目标：扫描写入的位置，或更新载荷。
#[derive(Default)]
pub enum Dest<'a> {
    #[default]
    None,
    Record(&'a mut Record),
    Records(&'a mut Vec<Record>),
    Model(&'a mut dyn ModelValue),
    Models(&'a mut dyn ModelSlice),
}

impl fmt::Debug for Dest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Record(r) => f.debug_tuple("Record").field(r).finish(),
            Self::Records(r) => f.debug_tuple("Records").field(&r.len()).finish(),
            Self::Model(_) => f.write_str("Model"),
            Self::Models(m) => f.debug_tuple("Models").field(&m.len()).finish(),
        }
    }
}

impl<'a> From<&'a mut Record> for Dest<'a> {
    fn from(v: &'a mut Record) -> Self {
        Self::Record(v)
    }
}

impl<'a> From<&'a mut Vec<Record>> for Dest<'a> {
    fn from(v: &'a mut Vec<Record>) -> Self {
        Self::Records(v)
    }
}

/// 语句级的 key/value 设置，可在并发下安全读写与清空。
#[derive(Debug, Default)]
pub struct Settings {
    inner: RwLock<HashMap<String, SqlValue>>,
}

impl Settings {
    pub fn set(&self, key: impl Into<String>, value: impl Into<SqlValue>) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<SqlValue> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn delete(&self, key: &str) -> Option<SqlValue> {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }

    /// 遍历当前快照；回调返回 false 时停止。
    pub fn range(&self, mut f: impl FnMut(&str, &SqlValue) -> bool) {
        let snapshot: Vec<(String, SqlValue)> = self
            .inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, v) in &snapshot {
            if !f(k, v) {
                break;
            }
        }
    }

    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Statement<'a> {
    pub config: Arc<Config>,
    pub table: String,
    /// 显式的模型实例；为 None 时目标本身就是模型。
    pub model: Option<&'a mut dyn ModelValue>,
    pub dest: Dest<'a>,
    pub schema: Option<Arc<Schema>>,
    pub clauses: HashMap<String, Clause>,
    pub selects: Vec<String>,
    pub omits: Vec<String>,
    pub settings: Settings,
    pub raise_error_on_not_found: bool,
    pub sql: String,
    pub vars: Vec<SqlValue>,
    pub named_vars: Vec<SqlNamedArg>,
    pub rows_affected: u64,
    pub errors: Vec<Error>,
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("table", &self.table)
            .field("model", &self.model.is_some())
            .field("dest", &self.dest)
            .field("clauses", &self.clauses)
            .field("sql", &self.sql)
            .field("vars", &self.vars)
            .field("rows_affected", &self.rows_affected)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl<'a> Statement<'a> {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            table: String::new(),
            model: None,
            dest: Dest::None,
            schema: None,
            clauses: HashMap::new(),
            selects: Vec::new(),
            omits: Vec::new(),
            settings: Settings::default(),
            raise_error_on_not_found: false,
            sql: String::new(),
            vars: Vec::new(),
            named_vars: Vec::new(),
            rows_affected: 0,
            errors: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_model(mut self, model: &'a mut dyn ModelValue) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_dest(mut self, dest: impl Into<Dest<'a>>) -> Self {
        self.dest = dest.into();
        self
    }

    /// 解析 schema（优先显式 model，其次目标），并在未指定表时使用 schema 的表名。
    pub fn parse(&mut self) {
        let naming = &self.config.naming;
        let schema = match (&self.model, &self.dest) {
            (Some(m), _) => Some(m.schema(naming)),
            (None, Dest::Model(m)) => Some(m.schema(naming)),
            (None, Dest::Models(list)) => Some(list.schema(naming)),
            _ => None,
        };
        if let Some(s) = schema {
            if self.table.is_empty() {
                self.table = s.table.clone();
            }
            self.schema = Some(s);
        }
    }

    /// 重置为初始状态以复用，保留配置。
    pub fn reinit(&mut self) {
        self.table.clear();
        self.model = None;
        self.dest = Dest::None;
        self.schema = None;
        self.clauses.clear();
        self.selects.clear();
        self.omits.clear();
        self.settings.clear();
        self.raise_error_on_not_found = false;
        self.sql.clear();
        self.vars.clear();
        self.named_vars.clear();
        self.rows_affected = 0;
        self.errors.clear();
    }

    /// 把标识符按方言加引号写入 `writer`。
    ///
    /// 当前表标记解析为语句的表；主键标记解析为 schema 的主键列，无法解析时不输出。
    pub fn quote_to(&self, writer: &mut dyn Writer, ident: Ident<'_>) {
        let d = &self.config.dialector;
        match ident {
            Ident::Table(t) => {
                if t.name == CURRENT_TABLE {
                    d.quote_to(writer, &self.table);
                } else {
                    d.quote_to(writer, &t.name);
                }
                if !t.alias.is_empty() {
                    writer.write_str(" AS ");
                    d.quote_to(writer, &t.alias);
                }
            }
            Ident::Column(c) => {
                if !c.table.is_empty() {
                    if c.table == CURRENT_TABLE {
                        d.quote_to(writer, &self.table);
                    } else {
                        d.quote_to(writer, &c.table);
                    }
                    writer.write_char('.');
                }
                if c.name == PRIMARY_KEY {
                    if let Some(f) = self
                        .schema
                        .as_ref()
                        .and_then(|s| s.prioritized_primary_field())
                    {
                        d.quote_to(writer, &f.db_name);
                    }
                } else if c.name == "*" {
                    writer.write_char('*');
                } else {
                    d.quote_to(writer, &c.name);
                }
                if !c.alias.is_empty() {
                    writer.write_str(" AS ");
                    d.quote_to(writer, &c.alias);
                }
            }
            Ident::Name(n) => d.quote_to(writer, n),
        }
    }

    pub fn quote<'i>(&self, ident: impl Into<Ident<'i>>) -> String {
        let mut out = String::new();
        self.quote_to(&mut out, ident.into());
        out
    }

    fn push_var(&mut self, v: SqlValue) {
        self.vars.push(v);
        self.config.dialector.bind_var_to(&mut self.sql, self.vars.len());
    }

    /// 合并子句：先让子句修改语句，再合并进同名子句（不存在时先初始化）。
    pub fn add_clause<C: Interface>(&mut self, c: C) {
        c.modify_statement(self);
        let name = c.name().to_string();
        let clause = self
            .clauses
            .entry(name.clone())
            .or_insert_with(|| Clause::new(name));
        c.merge_clause(clause);
    }

    /// 同名子句已存在时不做任何事。
    pub fn add_clause_if_not_exists<C: Interface>(&mut self, c: C) {
        if !self.clauses.contains_key(c.name()) {
            self.add_clause(c);
        }
    }

    pub fn clause(&self, name: &str) -> Option<&Clause> {
        self.clauses.get(name)
    }

    /// 把查询条件参数分类成表达式。
    ///
    /// - 可解析为整数的字符串：主键相等；
    /// - 其余字符串在没有参数、或含 `?`/`@` 时作为原生 SQL；
    /// - 否则逐个参数分类（valuer 先取值），表达式与 map 原样保留，列表展开；
    /// - 一个都没分类出来时，全部参数作为主键的 IN 列表。
    pub fn build_condition(&mut self, query: impl Into<Arg>, args: Vec<Arg>) -> Vec<Expression> {
        let mut query = query.into();
        if let Arg::Value(SqlValue::String(sql)) = &query {
            if let Ok(id) = sql.parse::<i64>() {
                query = Arg::from(id);
            } else if args.is_empty() || sql.contains('?') || sql.contains('@') {
                return vec![Expression::Expr(Expr {
                    sql: sql.to_string(),
                    vars: args,
                })];
            }
        }

        let mut values = Vec::with_capacity(args.len() + 1);
        let mut conditions = Vec::new();
        for arg in std::iter::once(query).chain(args) {
            let arg = match arg.resolve() {
                Ok(a) => a,
                Err(e) => {
                    self.add_error(e.into());
                    Arg::Value(SqlValue::Null)
                }
            };
            match arg {
                Arg::Expression(e) => {
                    conditions.push((*e).clone());
                    values.push(Arg::Expression(e));
                }
                // 主键值列表展开为 IN 的各个值
                Arg::List(items) => values.extend(items),
                arg => values.push(arg),
            }
        }

        if conditions.is_empty() {
            conditions.push(Expression::In(In {
                column: Column::primary(),
                values,
            }));
        }
        conditions
    }

    /// `build_condition` 后合并进 WHERE。
    pub fn where_(&mut self, query: impl Into<Arg>, args: Vec<Arg>) {
        let conds = self.build_condition(query, args);
        if !conds.is_empty() {
            self.add_clause(Where::new(conds));
        }
    }

    /// 按给定顺序渲染子句，子句之间以一个空格分隔；不存在或为空的子句跳过。
    ///
    /// `Config::clause_builders` 中有同名覆盖时使用覆盖的渲染函数。
    pub fn build(&mut self, names: &[&str]) {
        let clauses = std::mem::take(&mut self.clauses);
        let mut first = true;
        for name in names {
            let Some(c) = clauses.get(*name) else {
                continue;
            };
            if c.is_empty() {
                continue;
            }
            if !first {
                self.sql.push(' ');
            }
            first = false;
            match self.config.clause_builders.get(*name).cloned() {
                Some(custom) => custom(c, self),
                None => c.build(self),
            }
        }
        self.clauses = clauses;
    }

    pub fn has_where(&self) -> bool {
        self.clauses.get(WHERE).is_some_and(|c| !c.is_empty())
    }

    /// 只更新/查询这些列；`*` 表示 schema 的全部列。
    pub fn select<S: Into<String>>(&mut self, columns: impl IntoIterator<Item = S>) {
        self.selects.extend(columns.into_iter().map(Into::into));
    }

    /// 排除这些列。
    pub fn omit<S: Into<String>>(&mut self, columns: impl IntoIterator<Item = S>) {
        self.omits.extend(columns.into_iter().map(Into::into));
    }

    /// 把参数展开进 SQL，仅用于日志。
    pub fn explain(&self) -> String {
        self.config.dialector.explain(&self.sql, &self.vars)
    }

    pub fn add_error(&mut self, err: Error) {
        self.errors.push(err);
    }

    /// 第一个错误。
    pub fn error(&self) -> Option<&Error> {
        self.errors.first()
    }

    /// 有错误时返回第一个错误，否则返回影响行数。
    pub fn into_result(self) -> Result<u64, Error> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.rows_affected),
        }
    }
}

impl Writer for Statement<'_> {
    fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }
}

impl Builder for Statement<'_> {
    fn write_quoted(&mut self, field: Ident<'_>) {
        let mut sql = std::mem::take(&mut self.sql);
        self.quote_to(&mut sql, field);
        self.sql = sql;
    }

    /// 绑定参数：命名参数写 `@name`；列、表加引号；表达式内联渲染；
    /// 非空列表写 `(a,b)`，空列表写 `(NULL)`；其余值追加到位置参数并写方言占位符。
    fn add_var(&mut self, vars: &[Arg]) {
        for (idx, v) in vars.iter().enumerate() {
            if idx > 0 {
                self.sql.push(',');
            }
            match v {
                Arg::SqlNamed(n) if !n.name.is_empty() => {
                    self.named_vars.push(n.clone());
                    self.sql.push('@');
                    self.sql.push_str(&n.name);
                }
                Arg::SqlNamed(n) => self.push_var(n.value.clone()),
                Arg::Column(c) => self.write_quoted(Ident::Column(c)),
                Arg::Table(t) => self.write_quoted(Ident::Table(t)),
                Arg::Expression(e) => e.build(self),
                Arg::List(list) if list.is_empty() => self.sql.push_str("(NULL)"),
                Arg::List(list) => {
                    self.sql.push('(');
                    self.add_var(list);
                    self.sql.push(')');
                }
                Arg::Valuer(valuer) => match valuer.value() {
                    Ok(value) => self.push_var(value),
                    Err(e) => {
                        self.add_error(e.into());
                        self.push_var(SqlValue::Null);
                    }
                },
                Arg::Value(value) => self.push_var(value.clone()),
            }
        }
    }

    fn add_error(&mut self, err: Error) {
        self.errors.push(err);
    }
}
