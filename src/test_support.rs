//! 测试用的内存驱动与模型。

use crate::config::Config;
use crate::driver::{ConnPool, Rows};
use crate::error::Error;
use crate::flavor::Flavor;
use crate::model::{AfterUpdate, BaseModel, BeforeUpdate};
use crate::scan::ScanError;
use crate::statement::Statement;
use crate::value::SqlValue;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub age: i64,
    pub updated_at: Option<OffsetDateTime>,
}

crate::model! {
    impl User {
        table: "users",
        fields: {
            id: { tags: ["primarykey"] },
            name: { tags: ["size:64"] },
            age: { tags: [] },
            updated_at: { tags: ["autoupdatetime"] },
        }
    }
}

/// 嵌入基础字段的模型。
#[derive(Debug, Default, Clone)]
pub struct Post {
    pub base: BaseModel,
    pub title: String,
}

crate::model! {
    impl Post {
        fields: {
            id: { via: base, tags: ["primarykey"] },
            created_at: { via: base, tags: [] },
            updated_at: { via: base, tags: ["autoupdatetime"] },
            deleted_at: { via: base, tags: [] },
            title: { tags: [] },
        }
    }
}

/// 带更新钩子的模型；`modified` 映射到 `updated_at` 列。
#[derive(Debug, Default, Clone)]
pub struct Account {
    pub id: u64,
    pub balance: i64,
    pub modified: Option<OffsetDateTime>,
    pub before_calls: u32,
    pub after_calls: u32,
}

crate::model! {
    impl Account {
        hooks: [BeforeUpdate, AfterUpdate],
        fields: {
            id: { tags: [] },
            balance: { tags: [] },
            modified: { tags: ["column:updated_at", "autoupdatetime"] },
        }
    }
}

impl BeforeUpdate for Account {
    fn before_update(&mut self, _stmt: &mut Statement<'_>) -> Result<(), Error> {
        self.before_calls += 1;
        if self.balance < 0 {
            return Err(Error::hook("negative balance"));
        }
        Ok(())
    }
}

impl AfterUpdate for Account {
    fn after_update(&mut self, _stmt: &mut Statement<'_>) -> Result<(), Error> {
        self.after_calls += 1;
        Ok(())
    }
}

pub fn config(flavor: Flavor) -> Arc<Config> {
    Arc::new(Config::new(flavor))
}

pub fn mysql() -> Arc<Config> {
    config(Flavor::MySQL)
}

pub fn with_pool(pool: &Arc<FakePool>) -> Arc<Config> {
    Arc::new(Config::new(Flavor::MySQL).with_conn_pool(pool.clone()))
}

pub type FakeRow = Result<Vec<SqlValue>, ScanError>;

/// 记录每次调用的 SQL 与参数，返回预设的结果。
#[derive(Debug, Default)]
pub struct FakePool {
    pub rows_affected: u64,
    pub columns: Vec<String>,
    pub rows: Vec<FakeRow>,
    pub fail_with: Option<String>,
    log: Mutex<Vec<(String, Vec<SqlValue>)>>,
}

impl FakePool {
    pub fn affecting(rows_affected: u64) -> Arc<Self> {
        Arc::new(Self {
            rows_affected,
            ..Self::default()
        })
    }

    pub fn returning(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Arc<Self> {
        Arc::new(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.into_iter().map(Ok).collect(),
            ..Self::default()
        })
    }

    pub fn failing(msg: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(msg.to_string()),
            ..Self::default()
        })
    }

    pub fn executed(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, vars: &[SqlValue]) -> Result<(), Error> {
        self.log.lock().unwrap().push((sql.to_string(), vars.to_vec()));
        match &self.fail_with {
            Some(msg) => Err(Error::driver(msg.clone())),
            None => Ok(()),
        }
    }
}

impl ConnPool for FakePool {
    fn exec(&self, sql: &str, vars: &[SqlValue]) -> Result<u64, Error> {
        self.record(sql, vars)?;
        Ok(self.rows_affected)
    }

    fn query(&self, sql: &str, vars: &[SqlValue]) -> Result<Box<dyn Rows + '_>, Error> {
        self.record(sql, vars)?;
        Ok(Box::new(FakeRows::new(
            self.columns.clone(),
            self.rows.clone(),
        )))
    }
}

pub struct FakeRows {
    columns: Vec<String>,
    rows: std::vec::IntoIter<FakeRow>,
    current: Option<FakeRow>,
}

impl FakeRows {
    pub fn new(columns: Vec<String>, rows: Vec<FakeRow>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
            current: None,
        }
    }

    pub fn of(columns: &[&str], rows: Vec<FakeRow>) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }
}

impl Rows for FakeRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> bool {
        self.current = self.rows.next();
        self.current.is_some()
    }

    fn scan(&mut self, dest: &mut [SqlValue]) -> Result<(), ScanError> {
        match &self.current {
            Some(Ok(values)) if values.len() == dest.len() => {
                dest.clone_from_slice(values);
                Ok(())
            }
            Some(Ok(values)) => Err(ScanError::ColumnCount {
                expected: dest.len(),
                got: values.len(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ScanError::Driver("no current row".to_string())),
        }
    }
}
