//! Clause：具名、可合并的 SQL 片段，以及渲染时使用的 Writer/Builder 接口。
//!
//! 同一个 Statement 中每个名字最多只有一个 `Clause`；再次添加同名子句时，
//! 由子句类型决定如何合并到已有的 payload 上（WHERE 去重追加、SET 按列覆盖或追加、
//! UPDATE/SELECT/FROM 整体替换）。

use crate::error::Error;
use crate::expr::Ident;
use crate::modifiers::Arg;
use crate::select::{self, Select};
use crate::statement::Statement;
use crate::update::{Set, Update};
use crate::where_clause::Where;
use std::fmt::Debug;

/// 子句名常量。
pub const SELECT: &str = "SELECT";
pub const FROM: &str = "FROM";
pub const UPDATE: &str = "UPDATE";
pub const SET: &str = "SET";
pub const WHERE: &str = "WHERE";

/// 渲染目标：只负责追加文本。
pub trait Writer {
    fn write_str(&mut self, s: &str);
    fn write_char(&mut self, c: char);
}

impl Writer for String {
    fn write_str(&mut self, s: &str) {
        self.push_str(s);
    }

    fn write_char(&mut self, c: char) {
        self.push(c);
    }
}

/// 渲染上下文：在 Writer 之上提供引号、参数绑定与错误记录。
pub trait Builder: Writer {
    fn write_quoted(&mut self, field: Ident<'_>);
    fn add_var(&mut self, vars: &[Arg]);
    fn add_error(&mut self, err: Error);
}

/// 方言或调用方扩展的子句类型；同名再次添加时整体替换。
pub trait CustomClause: Debug {
    fn build(&self, b: &mut dyn Builder);
}

/// 子句 payload：封闭的内置集合 + 一个扩展变体。
#[derive(Debug)]
pub enum ClauseExpression {
    Select(Select),
    From(select::From),
    Update(Update),
    Set(Set),
    Where(Where),
    Custom(Box<dyn CustomClause>),
}

impl ClauseExpression {
    pub fn build(&self, b: &mut dyn Builder) {
        match self {
            Self::Select(c) => c.build(b),
            Self::From(c) => c.build(b),
            Self::Update(c) => c.build(b),
            Self::Set(c) => c.build(b),
            Self::Where(c) => c.build(b),
            Self::Custom(c) => c.build(b),
        }
    }
}

/// 注册表中的一个子句。
#[derive(Debug, Default)]
pub struct Clause {
    pub name: String,
    pub expression: Option<ClauseExpression>,
}

impl Clause {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.expression {
            None => true,
            Some(ClauseExpression::Where(w)) => w.exprs.is_empty(),
            Some(ClauseExpression::Set(s)) => s.0.is_empty(),
            Some(_) => false,
        }
    }

    pub fn build(&self, b: &mut dyn Builder) {
        if let Some(e) = &self.expression {
            e.build(b);
        }
    }
}

/// 可加入 Statement 的子句。
pub trait Interface {
    fn name(&self) -> &str;

    /// 把自身合并进已存在（或刚初始化）的同名子句。
    fn merge_clause(self, clause: &mut Clause);

    /// 合并前修改语句本身（例如 UPDATE 显式指定的表）。
    fn modify_statement(&self, _stmt: &mut Statement<'_>) {}
}

/// 按名字覆盖子句渲染的函数（见 `Config::with_clause_builder`）。
pub type ClauseBuilderFn = std::sync::Arc<dyn Fn(&Clause, &mut dyn Builder) + Send + Sync>;

/// 扩展子句的包装：名字 + 自定义 payload。
#[derive(Debug)]
pub struct Custom {
    pub name: String,
    pub clause: Box<dyn CustomClause>,
}

impl Custom {
    pub fn new(name: impl Into<String>, clause: impl CustomClause + 'static) -> Self {
        Self {
            name: name.into(),
            clause: Box::new(clause),
        }
    }
}

impl Interface for Custom {
    fn name(&self) -> &str {
        &self.name
    }

    fn merge_clause(self, clause: &mut Clause) {
        clause.expression = Some(ClauseExpression::Custom(self.clause));
    }
}
