//! Dialector：方言相关的渲染接口（引号、占位符、列类型、日志用 SQL 展开）。
//!
//! 内置实现见 `Flavor`；外部方言实现此 trait 后通过 `Config::with_dialector` 注入。

use crate::clause::Writer;
use crate::schema::Field;
use crate::value::SqlValue;
use std::fmt::Debug;

pub trait Dialector: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// 为标识符加引号写入 `writer`。
    fn quote_to(&self, writer: &mut dyn Writer, name: &str);

    /// 写入第 `count` 个（从 1 开始）位置参数的占位符。
    fn bind_var_to(&self, writer: &mut dyn Writer, count: usize);

    /// 字段对应的列类型；方言不支持时返回空串。
    fn data_type_of(&self, field: &Field) -> String;

    /// 把参数展开进 SQL，仅用于日志。
    fn explain(&self, sql: &str, vars: &[SqlValue]) -> String;
}
