//! 回调：在 Statement 上执行的步骤函数（原生执行、查询、更新及其前后钩子）。
//!
//! 每个回调都检查语句上已有的错误；链上某一步记录错误后，后续步骤不再执行实际工作。

use crate::assignments::convert_to_assignments;
use crate::clause::{FROM, SELECT, SET, UPDATE, WHERE};
use crate::error::Error;
use crate::expr::Column;
use crate::model::ModelValue;
use crate::scan::scan;
use crate::select::{self, Select};
use crate::statement::{Dest, Statement};
use crate::update::Update;

/// 回调函数类型。
pub type Callback = fn(&mut Statement<'_>);

/// 更新链：解析 schema -> 前置钩子 -> 更新 -> 后置钩子。
pub const UPDATE_CALLBACKS: &[Callback] = &[parse, before_update, update, after_update];

/// 查询链。
pub const QUERY_CALLBACKS: &[Callback] = &[parse, query];

/// 依次执行回调。
pub fn run(stmt: &mut Statement<'_>, callbacks: &[Callback]) {
    for cb in callbacks {
        cb(stmt);
    }
}

pub fn update_callbacks(stmt: &mut Statement<'_>) {
    run(stmt, UPDATE_CALLBACKS);
}

pub fn parse(stmt: &mut Statement<'_>) {
    stmt.parse();
}

fn log_before(stmt: &Statement<'_>, kind: &'static str) {
    tracing::debug!(
        target: "halo_orm::sql",
        kind,
        table = %stmt.table,
        param_count = stmt.vars.len(),
        sql = %stmt.explain(),
    );
}

/// 执行语句上已有的 SQL。
pub fn raw_exec(stmt: &mut Statement<'_>) {
    if !stmt.errors.is_empty() {
        return;
    }
    let Some(pool) = stmt.config.conn_pool.clone() else {
        stmt.add_error(Error::MissingConnPool);
        return;
    };
    log_before(stmt, "exec");
    match pool.exec(&stmt.sql, &stmt.vars) {
        Ok(n) => {
            stmt.rows_affected = n;
            tracing::debug!(target: "halo_orm::sql", rows_affected = n, "exec done");
        }
        Err(e) => stmt.add_error(e),
    }
}

/// 查询：没有现成 SQL 时按 SELECT/FROM/WHERE 构建，执行后扫描进目标。
pub fn query(stmt: &mut Statement<'_>) {
    if !stmt.errors.is_empty() {
        return;
    }
    if stmt.sql.is_empty() {
        let columns: Vec<Column> = stmt
            .selects
            .iter()
            .filter(|c| c.as_str() != "*")
            .map(|c| Column::new(c.as_str()))
            .collect();
        stmt.add_clause_if_not_exists(Select::columns(columns));
        stmt.add_clause_if_not_exists(select::From::default());
        stmt.build(&[SELECT, FROM, WHERE]);
    }

    let Some(pool) = stmt.config.conn_pool.clone() else {
        stmt.add_error(Error::MissingConnPool);
        return;
    };
    log_before(stmt, "query");
    let sql = stmt.sql.clone();
    let vars = stmt.vars.clone();
    match pool.query(&sql, &vars) {
        Ok(mut rows) => {
            let before = stmt.rows_affected;
            scan(rows.as_mut(), stmt);
            tracing::debug!(
                target: "halo_orm::sql",
                rows = stmt.rows_affected - before,
                "query done"
            );
        }
        Err(e) => stmt.add_error(e),
    }
}

/// 对目标（单个模型或模型序列的每个元素）调用 `call`；目标不是模型时使用语句的 model。
fn for_each_hook_target(
    stmt: &mut Statement<'_>,
    mut call: impl FnMut(&mut dyn ModelValue, &mut Statement<'_>),
) {
    let mut dest = std::mem::take(&mut stmt.dest);
    match &mut dest {
        Dest::Model(value) => call(&mut **value, stmt),
        Dest::Models(list) => {
            for i in 0..list.len() {
                if let Some(value) = list.get_mut(i) {
                    call(value, stmt);
                }
            }
        }
        Dest::None | Dest::Record(_) | Dest::Records(_) => {
            if let Some(model) = stmt.model.take() {
                call(&mut *model, stmt);
                stmt.model = Some(model);
            }
        }
    }
    stmt.dest = dest;
}

pub fn before_update(stmt: &mut Statement<'_>) {
    if !stmt.errors.is_empty() {
        return;
    }
    let Some(schema) = stmt.schema.clone() else {
        return;
    };
    if !(schema.before_save || schema.before_update) {
        return;
    }
    for_each_hook_target(stmt, |value, stmt| {
        if schema.before_save
            && let Some(hook) = value.as_before_save()
            && let Err(e) = hook.before_save(stmt)
        {
            stmt.add_error(e);
        }
        if schema.before_update
            && let Some(hook) = value.as_before_update()
            && let Err(e) = hook.before_update(stmt)
        {
            stmt.add_error(e);
        }
    });
}

/// 更新：补齐 UPDATE 子句、生成 SET、检查 WHERE，构建并执行。
pub fn update(stmt: &mut Statement<'_>) {
    if !stmt.errors.is_empty() {
        return;
    }
    stmt.add_clause_if_not_exists(Update::new());
    let set = convert_to_assignments(stmt);
    if set.is_empty() && stmt.clause(SET).is_none_or(|c| c.is_empty()) {
        tracing::debug!(target: "halo_orm::sql", table = %stmt.table, "nothing to update");
        return;
    }
    stmt.add_clause(set);

    if !stmt.has_where() && !stmt.config.allow_global_update {
        tracing::warn!(
            target: "halo_orm::sql",
            table = %stmt.table,
            "update without WHERE conditions rejected"
        );
        stmt.add_error(Error::MissingWhereConditions);
        return;
    }

    if stmt.sql.is_empty() {
        stmt.build(&[UPDATE, SET, WHERE]);
    }
    raw_exec(stmt);
}

pub fn after_update(stmt: &mut Statement<'_>) {
    if !stmt.errors.is_empty() {
        return;
    }
    let Some(schema) = stmt.schema.clone() else {
        return;
    };
    if !(schema.after_save || schema.after_update) {
        return;
    }
    for_each_hook_target(stmt, |value, stmt| {
        if schema.after_save
            && let Some(hook) = value.as_after_save()
            && let Err(e) = hook.after_save(stmt)
        {
            stmt.add_error(e);
        }
        if schema.after_update
            && let Some(hook) = value.as_after_update()
            && let Err(e) = hook.after_update(stmt)
        {
            stmt.add_error(e);
        }
    });
}
