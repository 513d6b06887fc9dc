//! SqlValuer：能把自己渲染成数据库值的类型。
//!
//! 条件归一化（`Statement::build_condition`）与参数绑定（`Statement::add_var`）
//! 在分类前都会先把 valuer 展开成实际的 `SqlValue`。

use crate::value::SqlValue;

/// Valuer 错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sql valuer error: {0}")]
pub struct ValuerError(pub String);

/// 可在绑定阶段动态计算实际值的 trait。
pub trait SqlValuer: dyn_clone::DynClone + std::fmt::Debug {
    fn value(&self) -> Result<SqlValue, ValuerError>;
}

dyn_clone::clone_trait_object!(SqlValuer);
