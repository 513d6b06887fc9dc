//! halo-orm：ORM 核心，包含子句合并、语句构建、结构体映射、行扫描与更新赋值。

pub mod assignments;
#[cfg(test)]
mod assignments_tests;
pub mod callbacks;
pub mod clause;
#[cfg(test)]
mod clause_tests;
pub mod config;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod explain;
pub mod expr;
pub mod field_mapper;
pub mod flavor;
pub mod model;
pub mod modifiers;
pub mod scan;
pub mod schema;
pub mod select;
pub mod statement;
#[cfg(test)]
mod test_support;
pub mod update;
pub mod value;
pub mod valuer;
pub mod where_clause;

pub use crate::assignments::{convert_to_assignments, select_and_omit_columns};
pub use crate::callbacks::{Callback, QUERY_CALLBACKS, UPDATE_CALLBACKS, update_callbacks};
pub use crate::clause::{
    Builder, Clause, ClauseBuilderFn, ClauseExpression, Custom, CustomClause, Interface, Writer,
};
pub use crate::config::Config;
pub use crate::dialect::Dialector;
pub use crate::driver::{ConnPool, Rows};
pub use crate::error::{BoxError, Error, Result};
pub use crate::explain::ExplainError;
pub use crate::expr::{
    Assignment, CURRENT_TABLE, Column, Eq, Expr, Expression, Ident, In, Map, PRIMARY_KEY, Table,
    expr,
};
pub use crate::field_mapper::{
    FieldMapperFunc, NamingStrategy, default_field_mapper, identity_mapper,
    set_default_field_mapper, set_default_field_mapper_scoped, snake_case_mapper,
};
pub use crate::flavor::{Flavor, default_flavor, set_default_flavor, set_default_flavor_scoped};
pub use crate::model::{
    AfterSave, AfterUpdate, BaseModel, BeforeSave, BeforeUpdate, Model, ModelSlice, ModelValue,
};
pub use crate::modifiers::{Arg, FlattenIntoArgs, SqlNamedArg, flatten, list, named};
pub use crate::scan::{FromSqlValue, ScanError, scan};
pub use crate::schema::{DataType, Field, FieldMeta, Schema, SqlType};
pub use crate::select::Select;
pub use crate::statement::{Dest, Settings, Statement};
pub use crate::update::{Set, Update};
pub use crate::value::{Record, SqlValue};
pub use crate::valuer::{SqlValuer, ValuerError};
pub use crate::where_clause::Where;

/// 便捷命名空间：允许 `use halo_orm::orm::{...}` 形式导入。
pub mod orm {
    pub use crate::*;
}
