//! UPDATE 与 SET 子句。

use crate::clause::{Builder, Clause, ClauseExpression, Interface, SET, UPDATE};
use crate::expr::{Assignment, Ident, Table};
use crate::statement::Statement;

/// UPDATE 子句：可选修饰符（如 `LOW_PRIORITY`）与目标表，缺省为当前表。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub modifier: String,
    pub table: Option<Table>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(table: Table) -> Self {
        Self {
            modifier: String::new(),
            table: Some(table),
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = modifier.into();
        self
    }

    pub(crate) fn build(&self, b: &mut dyn Builder) {
        b.write_str("UPDATE ");
        if !self.modifier.is_empty() {
            b.write_str(&self.modifier);
            b.write_char(' ');
        }
        match &self.table {
            Some(t) => b.write_quoted(Ident::Table(t)),
            None => b.write_quoted(Ident::Table(&Table::current())),
        }
    }
}

impl Interface for Update {
    fn name(&self) -> &str {
        UPDATE
    }

    fn merge_clause(self, clause: &mut Clause) {
        clause.expression = Some(ClauseExpression::Update(self));
    }

    fn modify_statement(&self, stmt: &mut Statement<'_>) {
        if let Some(t) = &self.table
            && stmt.table.is_empty()
            && t.name != crate::expr::CURRENT_TABLE
        {
            stmt.table = t.name.clone();
        }
    }
}

/// SET 子句：赋值列表，按加入顺序渲染为 `col=?,col=?`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Set(pub Vec<Assignment>);

impl Set {
    pub fn new(assignments: impl IntoIterator<Item = Assignment>) -> Self {
        Self(assignments.into_iter().collect())
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn build(&self, b: &mut dyn Builder) {
        b.write_str("SET ");
        for (i, a) in self.0.iter().enumerate() {
            if i > 0 {
                b.write_char(',');
            }
            b.write_quoted(Ident::Column(&a.column));
            b.write_char('=');
            b.add_var(std::slice::from_ref(&a.value));
        }
    }

    /// 同列再次赋值时原位覆盖，否则追加到末尾。
    fn merge(&mut self, other: Vec<Assignment>) {
        for a in other {
            match self.0.iter_mut().find(|x| x.column == a.column) {
                Some(existing) => existing.value = a.value,
                None => self.0.push(a),
            }
        }
    }
}

impl Interface for Set {
    fn name(&self) -> &str {
        SET
    }

    fn merge_clause(self, clause: &mut Clause) {
        match &mut clause.expression {
            Some(ClauseExpression::Set(existing)) => existing.merge(self.0),
            _ => {
                let mut s = Set::default();
                s.merge(self.0);
                clause.expression = Some(ClauseExpression::Set(s));
            }
        }
    }
}
