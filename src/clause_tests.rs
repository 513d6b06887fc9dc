#[cfg(test)]
mod tests {
    use crate::clause::{
        Builder, Clause, ClauseExpression, Custom, CustomClause, FROM, SELECT, SET, UPDATE,
        WHERE,
    };
    use crate::config::Config;
    use crate::expr::{Assignment, Column, Eq, Expression, In, Map, Table, expr};
    use crate::flavor::Flavor;
    use crate::modifiers::Arg;
    use crate::select::{self, Select};
    use crate::statement::Statement;
    use crate::test_support::{User, mysql};
    use crate::update::{Set, Update};
    use crate::value::SqlValue;
    use crate::where_clause::Where;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn set_merges_after_update() {
        let mut user = User::default();
        let mut stmt = Statement::new(mysql()).with_model(&mut user);
        stmt.parse();

        stmt.add_clause(Update::new());
        stmt.add_clause(Set::new([Assignment::new(Column::primary(), 1_i64)]));
        stmt.build(&[UPDATE, SET]);
        assert_eq!(stmt.sql, "UPDATE `users` SET `users`.`id`=?");
        assert_eq!(stmt.vars, vec![SqlValue::I64(1)]);

        stmt.sql.clear();
        stmt.vars.clear();
        stmt.add_clause(Set::new([Assignment::new("name", "jinzhu")]));
        stmt.build(&[UPDATE, SET]);
        assert_eq!(stmt.sql, "UPDATE `users` SET `users`.`id`=?,`name`=?");
        assert_eq!(stmt.vars, vec![SqlValue::I64(1), SqlValue::from("jinzhu")]);
    }

    #[test]
    fn set_overwrites_same_column() {
        let mut stmt = Statement::new(mysql()).with_table("users");
        stmt.add_clause(Set::new([
            Assignment::new("a", 1_i64),
            Assignment::new("b", 2_i64),
        ]));
        stmt.add_clause(Set::new([Assignment::new("a", 3_i64)]));
        stmt.build(&[SET]);
        assert_eq!(stmt.sql, "SET `a`=?,`b`=?");
        assert_eq!(stmt.vars, vec![SqlValue::I64(3), SqlValue::I64(2)]);
    }

    #[test]
    fn where_merge_skips_duplicates() {
        let mut stmt = Statement::new(mysql()).with_table("users");
        let name = || Where::new([Eq::new("name", "jinzhu").into()]);
        stmt.add_clause(name());
        stmt.add_clause(name());
        stmt.add_clause(Where::new([Expression::from(expr("age > ?", 18_i64))]));
        stmt.build(&[WHERE]);
        assert_eq!(stmt.sql, "WHERE `name` = ? AND age > ?");
        assert_eq!(
            stmt.vars,
            vec![SqlValue::from("jinzhu"), SqlValue::I64(18)]
        );
    }

    #[test]
    fn where_renders_map_and_in() {
        let mut stmt = Statement::new(mysql()).with_table("users");
        let mut m = Map::new();
        m.insert("name".to_string(), Arg::Value(SqlValue::Null));
        m.insert("age".to_string(), Arg::from(18_i64));
        stmt.add_clause(Where::new([
            Expression::from(m),
            In::new("id", vec![1_i64, 2, 3]).into(),
            In::new("role", vec![7_i64]).into(),
            In::new("x", Vec::<i64>::new()).into(),
        ]));
        stmt.build(&[WHERE]);
        assert_eq!(
            stmt.sql,
            "WHERE `age` = ? AND `name` IS NULL AND `id` IN (?,?,?) AND `role` = ? AND `x` IN (NULL)"
        );
        assert_eq!(stmt.vars.len(), 5);
    }

    #[test]
    fn select_and_from_defaults() {
        let mut stmt = Statement::new(mysql()).with_table("users");
        stmt.add_clause(Select::default());
        stmt.add_clause(select::From::default());
        stmt.build(&[SELECT, FROM]);
        assert_eq!(stmt.sql, "SELECT * FROM `users`");

        stmt.sql.clear();
        stmt.add_clause(Select::columns([
            Column::new("id"),
            Column::new("name").with_alias("n"),
        ]));
        stmt.add_clause(select::From::tables([Table::new("people").with_alias("p")]));
        stmt.build(&[SELECT, FROM]);
        assert_eq!(stmt.sql, "SELECT `id`,`name` AS `n` FROM `people` AS `p`");
    }

    #[test]
    fn update_with_modifier_sets_statement_table() {
        let mut stmt = Statement::new(mysql());
        stmt.add_clause(
            Update::table(Table::new("accounts").with_alias("a")).with_modifier("LOW_PRIORITY"),
        );
        assert_eq!(stmt.table, "accounts");
        stmt.add_clause(Set::new([Assignment::new("balance", 10_i64)]));
        stmt.build(&[UPDATE, SET]);
        assert_eq!(stmt.sql, "UPDATE LOW_PRIORITY `accounts` AS `a` SET `balance`=?");
    }

    #[test]
    fn add_clause_if_not_exists_keeps_first() {
        let mut stmt = Statement::new(mysql()).with_table("users");
        stmt.add_clause(Update::table(Table::new("users")));
        stmt.add_clause_if_not_exists(Update::table(Table::new("orders")));
        stmt.build(&[UPDATE]);
        assert_eq!(stmt.sql, "UPDATE `users`");
        assert_eq!(stmt.table, "users");
    }

    #[derive(Debug)]
    struct Limit(u64);

    impl CustomClause for Limit {
        fn build(&self, b: &mut dyn Builder) {
            b.write_str("LIMIT ");
            b.add_var(&[Arg::from(self.0)]);
        }
    }

    #[test]
    fn custom_clause_replaces_and_renders() {
        let mut stmt = Statement::new(mysql()).with_table("users");
        stmt.add_clause(Custom::new("LIMIT", Limit(10)));
        stmt.add_clause(Custom::new("LIMIT", Limit(5)));
        stmt.add_clause(Where::new([Eq::new("id", 3_i64).into()]));
        stmt.build(&[WHERE, "LIMIT"]);
        assert_eq!(stmt.sql, "WHERE `id` = ? LIMIT ?");
        assert_eq!(stmt.vars, vec![SqlValue::I64(3), SqlValue::U64(5)]);
    }

    #[test]
    fn clause_builder_overrides_rendering() {
        let config = Config::new(Flavor::MySQL).with_clause_builder(
            WHERE,
            |c: &Clause, b: &mut dyn Builder| {
                b.write_str("WHERE ");
                if let Some(ClauseExpression::Where(w)) = &c.expression {
                    for (i, e) in w.exprs.iter().enumerate() {
                        if i > 0 {
                            b.write_str(" OR ");
                        }
                        e.build(b);
                    }
                }
            },
        );
        let mut stmt = Statement::new(Arc::new(config)).with_table("users");
        stmt.add_clause(Where::new([
            Eq::new("name", "a").into(),
            Eq::new("name", "b").into(),
        ]));
        stmt.add_clause(Select::default());
        stmt.build(&[SELECT, WHERE]);
        assert_eq!(stmt.sql, "SELECT * WHERE `name` = ? OR `name` = ?");
    }

    #[test]
    fn empty_and_missing_clauses_are_skipped() {
        let mut stmt = Statement::new(mysql()).with_table("users");
        stmt.add_clause(Select::default());
        stmt.add_clause(Where::default());
        stmt.add_clause(Set::default());
        stmt.build(&[SELECT, SET, "LIMIT", WHERE]);
        assert_eq!(stmt.sql, "SELECT *");
        assert!(!stmt.has_where());
    }

    #[test]
    fn postgres_placeholders_number_across_clauses() {
        let mut stmt = Statement::new(crate::test_support::config(Flavor::PostgreSQL))
            .with_table("users");
        stmt.add_clause(Update::new());
        stmt.add_clause(Set::new([
            Assignment::new("name", "jinzhu"),
            Assignment::new("age", 18_i64),
        ]));
        stmt.add_clause(Where::new([In::new("id", vec![1_i64, 2]).into()]));
        stmt.build(&[UPDATE, SET, WHERE]);
        assert_eq!(
            stmt.sql,
            "UPDATE \"users\" SET \"name\"=$1,\"age\"=$2 WHERE \"id\" IN ($3,$4)"
        );
    }
}
