//! 驱动抽象：语句构建完成后，执行交给 `ConnPool`，查询结果通过 `Rows` 逐行读取。

use crate::error::Error;
use crate::scan::ScanError;
use crate::value::SqlValue;
use std::fmt::Debug;

/// 连接（池）：每条语句一次阻塞调用。
pub trait ConnPool: Send + Sync + Debug {
    /// 执行写语句，返回影响行数。
    fn exec(&self, sql: &str, vars: &[SqlValue]) -> Result<u64, Error>;

    /// 执行查询。
    fn query(&self, sql: &str, vars: &[SqlValue]) -> Result<Box<dyn Rows + '_>, Error>;
}

/// 查询结果游标。
pub trait Rows {
    fn columns(&self) -> &[String];

    /// 前进到下一行；没有更多行时返回 false。
    fn next_row(&mut self) -> bool;

    /// 把当前行按列顺序读入 `dest`（长度等于列数）。
    fn scan(&mut self, dest: &mut [SqlValue]) -> Result<(), ScanError>;
}
