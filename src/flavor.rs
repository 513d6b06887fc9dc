//! SQL Flavor（方言）：内置的 `Dialector` 实现，控制引号、占位符、列类型与日志展开。

use crate::clause::Writer;
use crate::dialect::Dialector;
use crate::explain::{self, PlaceholderStyle};
use crate::schema::{DataType, Field};
use crate::value::SqlValue;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

/// 内置方言。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    #[default]
    MySQL,
    PostgreSQL,
    SQLite,
    SQLServer,
    CQL,
    ClickHouse,
    Presto,
    Oracle,
    Informix,
    Doris,
}

static DEFAULT_FLAVOR: AtomicU8 = AtomicU8::new(Flavor::MySQL as u8);
static DEFAULT_FLAVOR_LOCK: Mutex<()> = Mutex::new(());

impl Flavor {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::MySQL,
            1 => Self::PostgreSQL,
            2 => Self::SQLite,
            3 => Self::SQLServer,
            4 => Self::CQL,
            5 => Self::ClickHouse,
            6 => Self::Presto,
            7 => Self::Oracle,
            8 => Self::Informix,
            9 => Self::Doris,
            _ => Self::MySQL,
        }
    }

    fn to_u8(self) -> u8 {
        self as u8
    }

    /// 标识符的引号字符。
    pub fn quote_char(self) -> char {
        match self {
            Self::MySQL | Self::ClickHouse | Self::Doris => '`',
            Self::CQL => '\'',
            Self::PostgreSQL
            | Self::SQLServer
            | Self::SQLite
            | Self::Presto
            | Self::Oracle
            | Self::Informix => '"',
        }
    }

    /// 为标识符加引号；名字中的引号字符成对转义。
    pub fn quote(self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.quote_to(&mut out, name);
        out
    }

    pub(crate) fn placeholder_style(self) -> PlaceholderStyle {
        match self {
            Self::PostgreSQL => PlaceholderStyle::Dollar,
            Self::SQLServer => PlaceholderStyle::AtP,
            Self::Oracle => PlaceholderStyle::Colon,
            _ => PlaceholderStyle::Question,
        }
    }

    /// 把参数按本方言的字面量写法展开进 SQL；参数不足时报错。
    ///
    /// 只用于不支持参数化的场景与调试，展开结果不应直接执行来自用户的输入。
    pub fn interpolate(self, sql: &str, vars: &[SqlValue]) -> Result<String, explain::ExplainError> {
        explain::interpolate(self, sql, vars)
    }
}

/// 获取当前全局默认 Flavor（`Config::default()` 使用它）。
pub fn default_flavor() -> Flavor {
    Flavor::from_u8(DEFAULT_FLAVOR.load(Ordering::Relaxed))
}

/// 设置全局默认 Flavor，返回旧值。
pub fn set_default_flavor(flavor: Flavor) -> Flavor {
    let old = DEFAULT_FLAVOR.swap(flavor.to_u8(), Ordering::Relaxed);
    Flavor::from_u8(old)
}

/// 修改全局默认 Flavor 的 RAII guard（会持有一个全局锁，避免并行测试互相干扰）。
pub struct DefaultFlavorGuard {
    _lock: MutexGuard<'static, ()>,
    old: Flavor,
}

impl Drop for DefaultFlavorGuard {
    fn drop(&mut self) {
        set_default_flavor(self.old);
    }
}

/// 在一个作用域内临时设置默认 Flavor，并保证退出作用域后自动恢复。
pub fn set_default_flavor_scoped(flavor: Flavor) -> DefaultFlavorGuard {
    let lock = DEFAULT_FLAVOR_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_flavor(flavor);
    DefaultFlavorGuard { _lock: lock, old }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
            Self::SQLServer => "SQLServer",
            Self::CQL => "CQL",
            Self::ClickHouse => "ClickHouse",
            Self::Presto => "Presto",
            Self::Oracle => "Oracle",
            Self::Informix => "Informix",
            Self::Doris => "Doris",
        };
        f.write_str(s)
    }
}

impl Dialector for Flavor {
    fn name(&self) -> &str {
        match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
            Self::SQLServer => "SQLServer",
            Self::CQL => "CQL",
            Self::ClickHouse => "ClickHouse",
            Self::Presto => "Presto",
            Self::Oracle => "Oracle",
            Self::Informix => "Informix",
            Self::Doris => "Doris",
        }
    }

    fn quote_to(&self, writer: &mut dyn Writer, name: &str) {
        let q = self.quote_char();
        writer.write_char(q);
        for c in name.chars() {
            if c == q {
                writer.write_char(q);
            }
            writer.write_char(c);
        }
        writer.write_char(q);
    }

    fn bind_var_to(&self, writer: &mut dyn Writer, count: usize) {
        match self.placeholder_style() {
            PlaceholderStyle::Question => writer.write_char('?'),
            PlaceholderStyle::Dollar => {
                writer.write_char('$');
                writer.write_str(&count.to_string());
            }
            PlaceholderStyle::AtP => {
                writer.write_str("@p");
                writer.write_str(&count.to_string());
            }
            PlaceholderStyle::Colon => {
                writer.write_char(':');
                writer.write_str(&count.to_string());
            }
        }
    }

    fn data_type_of(&self, field: &Field) -> String {
        match self {
            Self::MySQL | Self::Doris | Self::ClickHouse => mysql_data_type(field),
            Self::PostgreSQL => postgres_data_type(field),
            Self::SQLite => sqlite_data_type(field),
            Self::SQLServer => sqlserver_data_type(field),
            _ => String::new(),
        }
    }

    fn explain(&self, sql: &str, vars: &[SqlValue]) -> String {
        explain::explain(*self, sql, vars)
    }
}

fn mysql_data_type(field: &Field) -> String {
    match field.data_type {
        DataType::Bool => "boolean".to_string(),
        DataType::Int | DataType::Uint => {
            let mut s = match field.size {
                0..=8 => "tinyint",
                9..=16 => "smallint",
                17..=32 => "int",
                _ => "bigint",
            }
            .to_string();
            if field.data_type == DataType::Uint {
                s.push_str(" unsigned");
            }
            if field.auto_increment {
                s.push_str(" AUTO_INCREMENT");
            }
            s
        }
        DataType::Float => {
            if field.size <= 32 {
                "float".to_string()
            } else {
                "double".to_string()
            }
        }
        DataType::String => {
            let size = if field.size == 0 && field.primary_key {
                256
            } else {
                field.size
            };
            match size {
                0 => "longtext".to_string(),
                1..65536 => format!("varchar({size})"),
                65536..=16_777_215 => "mediumtext".to_string(),
                _ => "longtext".to_string(),
            }
        }
        DataType::Time => "datetime(3)".to_string(),
        DataType::Bytes => match field.size {
            1..65536 => format!("varbinary({})", field.size),
            _ => "longblob".to_string(),
        },
    }
}

fn postgres_data_type(field: &Field) -> String {
    match field.data_type {
        DataType::Bool => "boolean".to_string(),
        DataType::Int | DataType::Uint => {
            let serial = field.auto_increment;
            match (field.size, serial) {
                (0..16, true) => "smallserial",
                (16..31, true) => "serial",
                (_, true) => "bigserial",
                (0..16, false) => "smallint",
                (16..31, false) => "integer",
                (_, false) => "bigint",
            }
            .to_string()
        }
        DataType::Float => "decimal".to_string(),
        DataType::String => {
            if field.size > 0 {
                format!("varchar({})", field.size)
            } else {
                "text".to_string()
            }
        }
        DataType::Time => "timestamp with time zone".to_string(),
        DataType::Bytes => "bytea".to_string(),
    }
}

fn sqlite_data_type(field: &Field) -> String {
    match field.data_type {
        DataType::Bool => "numeric".to_string(),
        DataType::Int | DataType::Uint => {
            if field.auto_increment && !field.primary_key {
                "integer PRIMARY KEY AUTOINCREMENT".to_string()
            } else {
                "integer".to_string()
            }
        }
        DataType::Float => "real".to_string(),
        DataType::String => "text".to_string(),
        DataType::Time => "datetime".to_string(),
        DataType::Bytes => "blob".to_string(),
    }
}

fn sqlserver_data_type(field: &Field) -> String {
    match field.data_type {
        DataType::Bool => "bit".to_string(),
        DataType::Int | DataType::Uint => {
            let mut s = match field.size {
                0..16 => "smallint",
                16..31 => "int",
                _ => "bigint",
            }
            .to_string();
            if field.auto_increment {
                s.push_str(" IDENTITY(1,1)");
            }
            s
        }
        DataType::Float => "float".to_string(),
        DataType::String => match field.size {
            1..=4000 => format!("nvarchar({})", field.size),
            _ => "nvarchar(MAX)".to_string(),
        },
        DataType::Time => "datetimeoffset".to_string(),
        DataType::Bytes => "varbinary(MAX)".to_string(),
    }
}
