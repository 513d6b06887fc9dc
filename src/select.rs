//! SELECT 与 FROM 子句。

use crate::clause::{Builder, Clause, ClauseExpression, FROM, Interface, SELECT};
use crate::expr::{Column, Ident, Table};

/// SELECT 子句：列为空时渲染 `SELECT *`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub columns: Vec<Column>,
}

impl Select {
    pub fn columns(columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            distinct: false,
            columns: columns.into_iter().collect(),
        }
    }

    pub(crate) fn build(&self, b: &mut dyn Builder) {
        b.write_str("SELECT ");
        if self.distinct {
            b.write_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            b.write_char('*');
            return;
        }
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                b.write_char(',');
            }
            b.write_quoted(Ident::Column(c));
        }
    }
}

impl Interface for Select {
    fn name(&self) -> &str {
        SELECT
    }

    fn merge_clause(self, clause: &mut Clause) {
        clause.expression = Some(ClauseExpression::Select(self));
    }
}

/// FROM 子句：表为空时使用当前表。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct From {
    pub tables: Vec<Table>,
}

impl From {
    pub fn tables(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    pub(crate) fn build(&self, b: &mut dyn Builder) {
        b.write_str("FROM ");
        if self.tables.is_empty() {
            b.write_quoted(Ident::Table(&Table::current()));
            return;
        }
        for (i, t) in self.tables.iter().enumerate() {
            if i > 0 {
                b.write_char(',');
            }
            b.write_quoted(Ident::Table(t));
        }
    }
}

impl Interface for From {
    fn name(&self) -> &str {
        FROM
    }

    fn merge_clause(self, clause: &mut Clause) {
        clause.expression = Some(ClauseExpression::From(self));
    }
}
