//! 把更新载荷（记录或模型）转换为 SET 赋值列表，主键转为 WHERE 条件。

use crate::error::Error;
use crate::expr::{Assignment, Eq};
use crate::model::ModelValue;
use crate::schema::{Field, Schema};
use crate::statement::{Dest, Statement};
use crate::update::Set;
use crate::value::{Record, SqlValue};
use crate::where_clause::Where;
use std::collections::HashMap;

/// 列选择策略：列名 -> 是否选中；第二项为 true 表示只允许显式选中的列。
///
/// `*` 选中 schema 的全部列；select/omit 中能解析为字段的名字统一换成列名。
pub fn select_and_omit_columns(stmt: &Statement<'_>) -> (HashMap<String, bool>, bool) {
    let mut results = HashMap::new();
    let schema = stmt.schema.as_deref();
    let resolve = |name: &str| -> String {
        schema
            .and_then(|s| s.look_up_field(name))
            .map(|f| f.db_name.clone())
            .unwrap_or_else(|| name.to_string())
    };

    for column in &stmt.selects {
        if column == "*" {
            if let Some(s) = schema {
                for db_name in &s.db_names {
                    results.insert(db_name.clone(), true);
                }
            }
            continue;
        }
        results.insert(resolve(column), true);
    }
    for column in &stmt.omits {
        results.insert(resolve(column), false);
    }
    (results, !stmt.selects.is_empty())
}

struct Policy {
    selected: HashMap<String, bool>,
    restricted: bool,
}

impl Policy {
    /// 返回 (是否允许, 是否显式出现在 select/omit 中)。
    fn check(&self, column: &str) -> (bool, bool) {
        match self.selected.get(column) {
            Some(&v) => (v, true),
            None => (!self.restricted, false),
        }
    }
}

fn primary_key_condition(stmt: &mut Statement<'_>, column: &str, value: SqlValue) {
    stmt.add_clause(Where::new([Eq::new(column, value).into()]));
}

/// 生成 SET 列表。
///
/// - 记录载荷：按 key 排序；能解析为字段的 key 使用列名，并写回语句的 model；
///   `autoupdatetime` 字段若在记录中既没有字段名也没有列名，追加一次当前时间。
/// - 模型载荷：按字段声明顺序；主键从不进入 SET，非零主键转为 WHERE 相等；
///   其余字段在显式选中、或不受限且非零时加入；`autoupdatetime` 字段总是设为当前时间。
/// - 模型序列、记录序列不生成赋值。
/// - 目标与 model 不同时，model 的非零主键都转为 WHERE 相等。
pub fn convert_to_assignments(stmt: &mut Statement<'_>) -> Set {
    let (selected, restricted) = select_and_omit_columns(stmt);
    let policy = Policy {
        selected,
        restricted,
    };
    let schema = stmt.schema.clone();
    let mut set = Vec::new();
    let mut dest_is_model = false;

    let mut dest = std::mem::take(&mut stmt.dest);
    match &mut dest {
        Dest::Record(record) => {
            record_assignments(stmt, record, schema.as_deref(), &policy, &mut set);
        }
        Dest::Model(value) => {
            if let Some(schema) = &schema {
                let write_to_self = stmt.model.is_none();
                dest_is_model = write_to_self;
                struct_assignments(stmt, &mut **value, write_to_self, schema, &policy, &mut set);
            }
        }
        Dest::None => {
            // 没有单独的目标时，model 本身就是载荷
            if let Some(schema) = &schema
                && let Some(model) = stmt.model.take()
            {
                dest_is_model = true;
                struct_assignments(stmt, &mut *model, true, schema, &policy, &mut set);
                stmt.model = Some(model);
            }
        }
        Dest::Records(_) | Dest::Models(_) => {}
    }
    stmt.dest = dest;

    if !dest_is_model && let Some(schema) = &schema {
        mirror_model_primary_keys(stmt, schema);
    }
    Set(set)
}

fn record_assignments(
    stmt: &mut Statement<'_>,
    record: &mut Record,
    schema: Option<&Schema>,
    policy: &Policy,
    set: &mut Vec<Assignment>,
) {
    let keys: Vec<String> = record.keys().cloned().collect();
    for key in keys {
        match schema.and_then(|s| s.look_up_field(&key)) {
            Some(field) => {
                if !policy.check(&field.db_name).0 {
                    continue;
                }
                if field.auto_update_time {
                    record.insert(key.clone(), SqlValue::now());
                }
                let value = record.get(&key).cloned().unwrap_or(SqlValue::Null);
                set.push(Assignment::new(field.db_name.as_str(), value.clone()));
                write_back(stmt, field, value);
            }
            None => {
                if !policy.check(&key).0 {
                    continue;
                }
                let value = record.get(&key).cloned().unwrap_or(SqlValue::Null);
                set.push(Assignment::new(key.as_str(), value));
            }
        }
    }

    let Some(schema) = schema else { return };
    for field in schema.fields.iter().filter(|f| f.auto_update_time) {
        if record.contains_key(field.name) || record.contains_key(&field.db_name) {
            continue;
        }
        let now = SqlValue::now();
        set.push(Assignment::new(field.db_name.as_str(), now.clone()));
        write_back(stmt, field, now);
    }
}

fn struct_assignments(
    stmt: &mut Statement<'_>,
    value: &mut dyn ModelValue,
    write_to_self: bool,
    schema: &Schema,
    policy: &Policy,
    set: &mut Vec<Assignment>,
) {
    for field in &schema.fields {
        if field.primary_key {
            let (pk, zero) = field.value_of(value);
            if !zero {
                primary_key_condition(stmt, &field.db_name, pk);
            }
            continue;
        }

        let (ok, explicit) = policy.check(&field.db_name);
        if !ok {
            continue;
        }
        let (mut v, mut zero) = field.value_of(value);
        if field.auto_update_time {
            v = SqlValue::now();
            zero = false;
        }
        if !explicit && zero {
            continue;
        }

        set.push(Assignment::new(field.db_name.as_str(), v.clone()));
        if write_to_self {
            if let Err(e) = field.set(value, v) {
                stmt.add_error(Error::assign(field.db_name.clone(), e));
            }
        } else {
            write_back(stmt, field, v);
        }
    }
}

/// 把赋值写回语句的 model（没有 model 时忽略）。
fn write_back(stmt: &mut Statement<'_>, field: &Field, value: SqlValue) {
    let Some(model) = stmt.model.as_deref_mut() else {
        return;
    };
    if let Err(e) = field.set(model, value) {
        stmt.add_error(Error::assign(field.db_name.clone(), e));
    }
}

fn mirror_model_primary_keys(stmt: &mut Statement<'_>, schema: &Schema) {
    let Some(model) = stmt.model.as_deref() else {
        return;
    };
    let conds: Vec<(String, SqlValue)> = schema
        .primary_fields()
        .filter_map(|f| {
            let (v, zero) = f.value_of(model);
            (!zero).then(|| (f.db_name.clone(), v))
        })
        .collect();
    for (column, value) in conds {
        primary_key_condition(stmt, &column, value);
    }
}
