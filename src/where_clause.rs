//! Where：WHERE 子句，多个条件以 AND 连接。

use crate::clause::{Builder, Clause, ClauseExpression, Interface, WHERE};
use crate::expr::Expression;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    pub exprs: Vec<Expression>,
}

impl Where {
    pub fn new(exprs: impl IntoIterator<Item = Expression>) -> Self {
        Self {
            exprs: exprs.into_iter().collect(),
        }
    }

    pub(crate) fn build(&self, b: &mut dyn Builder) {
        if self.exprs.is_empty() {
            return;
        }
        b.write_str("WHERE ");
        for (i, e) in self.exprs.iter().enumerate() {
            if i > 0 {
                b.write_str(" AND ");
            }
            e.build(b);
        }
    }

    /// 追加条件；已存在的相同条件跳过，重复添加不改变渲染结果。
    fn extend(&mut self, exprs: Vec<Expression>) {
        for e in exprs {
            if !self.exprs.contains(&e) {
                self.exprs.push(e);
            }
        }
    }
}

impl Interface for Where {
    fn name(&self) -> &str {
        WHERE
    }

    fn merge_clause(self, clause: &mut Clause) {
        match &mut clause.expression {
            Some(ClauseExpression::Where(existing)) => existing.extend(self.exprs),
            _ => {
                let mut w = Where::default();
                w.extend(self.exprs);
                clause.expression = Some(ClauseExpression::Where(w));
            }
        }
    }
}
