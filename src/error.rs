//! 语句级错误：执行过程中累积在 `Statement::errors` 上，结束时统一检查。

use crate::explain::ExplainError;
use crate::scan::ScanError;
use crate::valuer::ValuerError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("record not found")]
    RecordNotFound,
    #[error("scan column `{column}`: {source}")]
    Scan {
        column: String,
        #[source]
        source: ScanError,
    },
    #[error(transparent)]
    Valuer(#[from] ValuerError),
    #[error(transparent)]
    Explain(#[from] ExplainError),
    #[error("assign column `{column}`: {source}")]
    Assign {
        column: String,
        #[source]
        source: ScanError,
    },
    #[error("driver error: {0}")]
    Driver(#[source] BoxError),
    #[error("no connection pool configured")]
    MissingConnPool,
    #[error("unsupported destination: {0}")]
    UnsupportedDest(&'static str),
    #[error("hook aborted: {0}")]
    Hook(String),
    #[error("WHERE conditions required")]
    MissingWhereConditions,
}

impl Error {
    /// 包装驱动返回的错误，保留原始错误作为 source。
    pub fn driver(err: impl Into<BoxError>) -> Self {
        Self::Driver(err.into())
    }

    pub fn hook(msg: impl Into<String>) -> Self {
        Self::Hook(msg.into())
    }

    pub fn scan(column: impl Into<String>, source: ScanError) -> Self {
        Self::Scan {
            column: column.into(),
            source,
        }
    }

    /// 赋值写回模型失败。
    pub fn assign(column: impl Into<String>, source: ScanError) -> Self {
        Self::Assign {
            column: column.into(),
            source,
        }
    }

    pub fn is_record_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
