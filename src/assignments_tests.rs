#[cfg(test)]
mod tests {
    use crate::assignments::{convert_to_assignments, select_and_omit_columns};
    use crate::clause::{ClauseExpression, SET, UPDATE, WHERE};
    use crate::error::Error;
    use crate::expr::{Eq, Expression};
    use crate::modifiers::Arg;
    use crate::scan::ScanError;
    use crate::statement::{Dest, Statement};
    use crate::test_support::{Account, User, mysql};
    use crate::update::{Set, Update};
    use crate::value::{Record, SqlValue};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn columns(set: &Set) -> Vec<String> {
        set.assignments().iter().map(|a| a.column.name.clone()).collect()
    }

    fn where_exprs(stmt: &Statement<'_>) -> Vec<Expression> {
        match stmt.clause(WHERE).and_then(|c| c.expression.as_ref()) {
            Some(ClauseExpression::Where(w)) => w.exprs.clone(),
            _ => Vec::new(),
        }
    }

    fn jinzhu() -> User {
        User {
            id: 7,
            name: "jinzhu".to_string(),
            age: 0,
            updated_at: None,
        }
    }

    #[test]
    fn model_payload_moves_primary_key_to_where() {
        let mut user = jinzhu();
        let mut stmt = Statement::new(mysql()).with_dest(Dest::Model(&mut user));
        stmt.parse();
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["name", "updated_at"]);
        assert_eq!(
            where_exprs(&stmt),
            vec![Expression::Eq(Eq::new("id", SqlValue::U64(7)))]
        );

        stmt.add_clause(Update::new());
        stmt.add_clause(set);
        stmt.build(&[UPDATE, SET, WHERE]);
        assert_eq!(
            stmt.sql,
            "UPDATE `users` SET `name`=?,`updated_at`=? WHERE `id` = ?"
        );
        assert_eq!(stmt.vars[0], SqlValue::from("jinzhu"));
        assert_eq!(stmt.vars[2], SqlValue::U64(7));
        drop(stmt);

        assert!(user.updated_at.is_some());
    }

    #[test]
    fn select_includes_zero_values_and_restricts() {
        let mut user = jinzhu();
        let mut stmt = Statement::new(mysql()).with_dest(Dest::Model(&mut user));
        stmt.parse();
        stmt.select(["age"]);
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["age"]);
        assert_eq!(set.assignments()[0].value, Arg::Value(SqlValue::I64(0)));
    }

    #[test]
    fn select_star_and_omit() {
        let mut user = jinzhu();
        let mut stmt = Statement::new(mysql()).with_dest(Dest::Model(&mut user));
        stmt.parse();
        stmt.select(["*"]);
        stmt.omit(["name"]);
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["age", "updated_at"]);
    }

    #[test]
    fn omit_keeps_other_fields() {
        let mut user = jinzhu();
        let mut stmt = Statement::new(mysql()).with_dest(Dest::Model(&mut user));
        stmt.parse();
        stmt.omit(["name"]);
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["updated_at"]);
    }

    #[test]
    fn select_and_omit_resolve_field_names() {
        let mut account = Account::default();
        let mut stmt = Statement::new(mysql()).with_dest(Dest::Model(&mut account));
        stmt.parse();
        stmt.select(["modified", "balance"]);
        stmt.omit(["id"]);
        let (selected, restricted) = select_and_omit_columns(&stmt);
        let expected: HashMap<String, bool> = [
            ("updated_at".to_string(), true),
            ("balance".to_string(), true),
            ("id".to_string(), false),
        ]
        .into_iter()
        .collect();
        assert_eq!(selected, expected);
        assert!(restricted);
    }

    #[test]
    fn record_payload_is_sorted_and_written_back() {
        let mut user = User {
            id: 9,
            ..User::default()
        };
        let mut record = Record::new();
        record.insert("name".to_string(), SqlValue::from("x"));
        record.insert("age".to_string(), SqlValue::I64(20));
        record.insert("nickname".to_string(), SqlValue::from("n"));

        let mut stmt = Statement::new(mysql())
            .with_model(&mut user)
            .with_dest(&mut record);
        stmt.parse();
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["age", "name", "nickname", "updated_at"]);
        assert_eq!(
            where_exprs(&stmt),
            vec![Expression::Eq(Eq::new("id", SqlValue::U64(9)))]
        );
        drop(stmt);

        assert_eq!(user.name, "x");
        assert_eq!(user.age, 20);
        assert!(user.updated_at.is_some());
    }

    #[test]
    fn auto_update_time_added_once_by_column_name() {
        let mut account = Account {
            id: 1,
            ..Account::default()
        };
        let mut record = Record::new();
        record.insert("balance".to_string(), SqlValue::I64(5));
        record.insert("updated_at".to_string(), SqlValue::Null);

        let mut stmt = Statement::new(mysql())
            .with_model(&mut account)
            .with_dest(&mut record);
        stmt.parse();
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["balance", "updated_at"]);
        // 自动更新时间总是取当前时间
        assert!(matches!(
            set.assignments()[1].value.as_value(),
            Some(SqlValue::DateTime(_))
        ));
        drop(stmt);

        assert!(matches!(record.get("updated_at"), Some(SqlValue::DateTime(_))));
        assert!(account.modified.is_some());
    }

    #[test]
    fn auto_update_time_added_once_by_field_name() {
        let mut account = Account {
            id: 1,
            ..Account::default()
        };
        let mut record = Record::new();
        record.insert("modified".to_string(), SqlValue::Null);

        let mut stmt = Statement::new(mysql())
            .with_model(&mut account)
            .with_dest(&mut record);
        stmt.parse();
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["updated_at"]);
    }

    #[test]
    fn separate_model_receives_assignments() {
        let mut target = User {
            id: 5,
            ..User::default()
        };
        let mut payload = User {
            name: "new".to_string(),
            ..User::default()
        };
        let mut stmt = Statement::new(mysql())
            .with_model(&mut target)
            .with_dest(Dest::Model(&mut payload));
        stmt.parse();
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["name", "updated_at"]);
        assert_eq!(
            where_exprs(&stmt),
            vec![Expression::Eq(Eq::new("id", SqlValue::U64(5)))]
        );
        drop(stmt);

        assert_eq!(target.name, "new");
        assert!(target.updated_at.is_some());
        assert!(payload.updated_at.is_none());
    }

    #[test]
    fn sequences_produce_no_assignments() {
        let mut users = vec![jinzhu()];
        let mut stmt = Statement::new(mysql()).with_dest(Dest::Models(&mut users));
        stmt.parse();
        assert!(convert_to_assignments(&mut stmt).is_empty());

        let mut records = vec![Record::new()];
        let mut stmt = Statement::new(mysql()).with_dest(&mut records);
        assert!(convert_to_assignments(&mut stmt).is_empty());
    }

    #[test]
    fn zero_primary_key_adds_no_condition() {
        let mut user = User {
            name: "a".to_string(),
            ..User::default()
        };
        let mut stmt = Statement::new(mysql()).with_dest(Dest::Model(&mut user));
        stmt.parse();
        let _ = convert_to_assignments(&mut stmt);
        assert!(!stmt.has_where());
    }

    #[test]
    fn failed_write_back_is_an_assign_error() {
        let mut user = User {
            id: 3,
            ..User::default()
        };
        let mut record = Record::new();
        record.insert("age".to_string(), SqlValue::from("not a number"));

        let mut stmt = Statement::new(mysql())
            .with_model(&mut user)
            .with_dest(&mut record);
        stmt.parse();
        let set = convert_to_assignments(&mut stmt);
        assert_eq!(columns(&set), vec!["age", "updated_at"]);
        assert_eq!(stmt.errors.len(), 1);
        assert!(matches!(
            &stmt.errors[0],
            Error::Assign { column, source: ScanError::ParseInt(_) } if column == "age"
        ));
    }
}
