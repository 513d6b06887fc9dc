//! 模型：`model!` 宏为结构体生成字段元数据与按字段名的读写访问器，
//! 以及作为钩子的能力查询（`as_before_update` 等）。
//!
//! ```ignore
//! #[derive(Debug, Default, Clone)]
//! struct User {
//!     id: u64,
//!     name: String,
//!     updated_at: Option<time::OffsetDateTime>,
//! }
//!
//! halo_orm::model! {
//!     impl User {
//!         table: "users",
//!         hooks: [BeforeUpdate],
//!         fields: {
//!             id: { tags: ["primarykey"] },
//!             name: { db: "name", tags: ["size:64"] },
//!             updated_at: { tags: ["autoupdatetime"] },
//!         }
//!     }
//! }
//! ```

use crate::error::Error;
use crate::field_mapper::NamingStrategy;
use crate::scan::ScanError;
use crate::schema::{FieldMeta, Schema};
use crate::statement::Statement;
use crate::value::SqlValue;
use std::any::Any;
use std::sync::Arc;
use time::OffsetDateTime;

pub trait BeforeSave {
    fn before_save(&mut self, stmt: &mut Statement<'_>) -> Result<(), Error>;
}

pub trait BeforeUpdate {
    fn before_update(&mut self, stmt: &mut Statement<'_>) -> Result<(), Error>;
}

pub trait AfterSave {
    fn after_save(&mut self, stmt: &mut Statement<'_>) -> Result<(), Error>;
}

pub trait AfterUpdate {
    fn after_update(&mut self, stmt: &mut Statement<'_>) -> Result<(), Error>;
}

/// 可嵌入的基础字段：主键、创建时间、更新时间、删除时间。
///
/// ```ignore
/// #[derive(Debug, Default)]
/// struct Post {
///     base: halo_orm::BaseModel,
///     title: String,
/// }
///
/// halo_orm::model! {
///     impl Post {
///         fields: {
///             id: { via: base, tags: ["primarykey"] },
///             created_at: { via: base, tags: [] },
///             updated_at: { via: base, tags: ["autoupdatetime"] },
///             deleted_at: { via: base, tags: [] },
///             title: { tags: [] },
///         }
///     }
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BaseModel {
    pub id: u64,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

/// 对象安全的模型实例接口：语句通过它读写字段、查询钩子。
pub trait ModelValue: Any {
    fn schema(&self, naming: &NamingStrategy) -> Arc<Schema>;

    /// 按声明的字段名取值。
    fn field_value(&self, name: &str) -> Option<SqlValue>;

    /// 按声明的字段名写值。
    fn set_field(&mut self, name: &str, value: SqlValue) -> Result<(), ScanError>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn as_before_save(&mut self) -> Option<&mut dyn BeforeSave> {
        None
    }

    fn as_before_update(&mut self) -> Option<&mut dyn BeforeUpdate> {
        None
    }

    fn as_after_save(&mut self) -> Option<&mut dyn AfterSave> {
        None
    }

    fn as_after_update(&mut self) -> Option<&mut dyn AfterUpdate> {
        None
    }
}

/// 静态模型信息，由 `model!` 生成。
pub trait Model: ModelValue + Default + Sized {
    const NAME: &'static str;
    const TABLE: Option<&'static str>;

    fn field_metas() -> Vec<FieldMeta>;
}

/// 模型序列：`Vec<T>` 或 `Vec<Box<T>>`，扫描与钩子按元素访问。
pub trait ModelSlice {
    fn schema(&self, naming: &NamingStrategy) -> Arc<Schema>;
    fn len(&self) -> usize;
    fn clear(&mut self);
    fn get(&self, idx: usize) -> Option<&dyn ModelValue>;
    fn get_mut(&mut self, idx: usize) -> Option<&mut dyn ModelValue>;

    /// 追加一个默认值元素并返回它。
    fn push_default(&mut self) -> &mut dyn ModelValue;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __model_opt {
    () => {
        None
    };
    ($v:literal) => {
        Some($v)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __model_hook {
    (BeforeSave) => {
        fn as_before_save(&mut self) -> Option<&mut dyn $crate::model::BeforeSave> {
            Some(self)
        }
    };
    (BeforeUpdate) => {
        fn as_before_update(&mut self) -> Option<&mut dyn $crate::model::BeforeUpdate> {
            Some(self)
        }
    };
    (AfterSave) => {
        fn as_after_save(&mut self) -> Option<&mut dyn $crate::model::AfterSave> {
            Some(self)
        }
    };
    (AfterUpdate) => {
        fn as_after_update(&mut self) -> Option<&mut dyn $crate::model::AfterUpdate> {
            Some(self)
        }
    };
}

/// 为结构体生成 `Model`/`ModelValue`，以及 `Vec<T>`/`Vec<Box<T>>` 的 `ModelSlice`。
///
/// - `table` 省略时按 `NamingStrategy` 由类型名推导。
/// - `hooks` 列出已实现的钩子 trait（`BeforeSave`/`BeforeUpdate`/`AfterSave`/`AfterUpdate`）。
/// - 字段的 `via` 指定嵌入的结构体字段（如 `BaseModel`），该字段从 `self.via.field` 读写，
///   列仍属于外层模型。
/// - 字段的 `db` 省略时按默认 field mapper 推导；`tags` 支持 `primarykey`、`autoincrement`、
///   `autoupdatetime`、`size:N`、`column:name`、`-`。
#[macro_export]
macro_rules! model {
    (
        impl $ty:ident {
            $(table: $table:literal,)?
            $(hooks: [ $($hook:ident),* $(,)? ],)?
            fields: {
                $(
                    $field:ident : {
                        $(via: $via:ident,)?
                        $(db: $db:literal,)?
                        tags: [ $($tag:literal),* $(,)? ] $(,)?
                    }
                ),* $(,)?
            } $(,)?
        }
    ) => {
        impl $crate::model::Model for $ty {
            const NAME: &'static str = stringify!($ty);
            const TABLE: Option<&'static str> = $crate::__model_opt!($($table)?);

            fn field_metas() -> Vec<$crate::schema::FieldMeta> {
                let sample = <Self as Default>::default();
                vec![
                    $({
                        let (data_type, size) = $crate::schema::sql_type_of(&sample $(.$via)? .$field);
                        $crate::schema::FieldMeta {
                            name: stringify!($field),
                            db: $crate::__model_opt!($($db)?),
                            data_type,
                            size,
                            tags: &[ $($tag),* ],
                        }
                    }),*
                ]
            }
        }

        impl $crate::model::ModelValue for $ty {
            fn schema(
                &self,
                naming: &$crate::field_mapper::NamingStrategy,
            ) -> std::sync::Arc<$crate::schema::Schema> {
                $crate::schema::parse::<Self>(naming)
            }

            fn field_value(&self, name: &str) -> Option<$crate::value::SqlValue> {
                match name {
                    $(
                        stringify!($field) => Some($crate::value::SqlValue::from(self $(.$via)? .$field.clone())),
                    )*
                    _ => None,
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: $crate::value::SqlValue,
            ) -> Result<(), $crate::scan::ScanError> {
                match name {
                    $(
                        stringify!($field) => {
                            self $(.$via)? .$field =
                                $crate::scan::FromSqlValue::from_sql_value(value)?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::scan::ScanError::UnknownField(name.to_string())),
                }
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }

            $($( $crate::__model_hook!($hook); )*)?
        }

        impl $crate::model::ModelSlice for Vec<$ty> {
            fn schema(
                &self,
                naming: &$crate::field_mapper::NamingStrategy,
            ) -> std::sync::Arc<$crate::schema::Schema> {
                $crate::schema::parse::<$ty>(naming)
            }

            fn len(&self) -> usize {
                Vec::len(self)
            }

            fn clear(&mut self) {
                Vec::clear(self)
            }

            fn get(&self, idx: usize) -> Option<&dyn $crate::model::ModelValue> {
                self.as_slice()
                    .get(idx)
                    .map(|v| v as &dyn $crate::model::ModelValue)
            }

            fn get_mut(&mut self, idx: usize) -> Option<&mut dyn $crate::model::ModelValue> {
                self.as_mut_slice()
                    .get_mut(idx)
                    .map(|v| v as &mut dyn $crate::model::ModelValue)
            }

            fn push_default(&mut self) -> &mut dyn $crate::model::ModelValue {
                self.push(<$ty as Default>::default());
                let last = Vec::len(self) - 1;
                &mut self[last]
            }
        }

        impl $crate::model::ModelSlice for Vec<Box<$ty>> {
            fn schema(
                &self,
                naming: &$crate::field_mapper::NamingStrategy,
            ) -> std::sync::Arc<$crate::schema::Schema> {
                $crate::schema::parse::<$ty>(naming)
            }

            fn len(&self) -> usize {
                Vec::len(self)
            }

            fn clear(&mut self) {
                Vec::clear(self)
            }

            fn get(&self, idx: usize) -> Option<&dyn $crate::model::ModelValue> {
                self.as_slice()
                    .get(idx)
                    .map(|v| &**v as &dyn $crate::model::ModelValue)
            }

            fn get_mut(&mut self, idx: usize) -> Option<&mut dyn $crate::model::ModelValue> {
                self.as_mut_slice()
                    .get_mut(idx)
                    .map(|v| &mut **v as &mut dyn $crate::model::ModelValue)
            }

            fn push_default(&mut self) -> &mut dyn $crate::model::ModelValue {
                self.push(Box::new(<$ty as Default>::default()));
                let last = Vec::len(self) - 1;
                &mut *self[last]
            }
        }
    };
}
