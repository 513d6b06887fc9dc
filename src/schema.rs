//! Schema：按类型解析一次的字段目录，进程内按 `TypeId` 缓存。
//!
//! 字段元数据由 `model!` 宏在编译期生成（`FieldMeta`），这里负责把 tag 解释成
//! 主键、自增、自动更新时间等标志，并建立按字段名/列名的索引。

use crate::field_mapper::NamingStrategy;
use crate::model::{Model, ModelValue};
use crate::scan::ScanError;
use crate::value::SqlValue;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// 字段的数据类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Time,
    Bytes,
}

/// Rust 类型到数据类别与默认位宽的映射。
pub trait SqlType {
    const DATA_TYPE: DataType;
    const SIZE: u32 = 0;
}

macro_rules! sql_type {
    ($($t:ty => $dt:ident, $size:expr);+ $(;)?) => {
        $(impl SqlType for $t {
            const DATA_TYPE: DataType = DataType::$dt;
            const SIZE: u32 = $size;
        })+
    };
}

sql_type! {
    bool => Bool, 0;
    i8 => Int, 8;
    i16 => Int, 16;
    i32 => Int, 32;
    i64 => Int, 64;
    isize => Int, 64;
    u8 => Uint, 8;
    u16 => Uint, 16;
    u32 => Uint, 32;
    u64 => Uint, 64;
    usize => Uint, 64;
    f32 => Float, 32;
    f64 => Float, 64;
    String => String, 0;
    Vec<u8> => Bytes, 0;
    time::OffsetDateTime => Time, 0;
}

impl<T: SqlType> SqlType for Option<T> {
    const DATA_TYPE: DataType = T::DATA_TYPE;
    const SIZE: u32 = T::SIZE;
}

/// 由字段的值推断类别（宏内使用，借助类型推断拿到字段类型）。
#[doc(hidden)]
pub fn sql_type_of<T: SqlType>(_: &T) -> (DataType, u32) {
    (T::DATA_TYPE, T::SIZE)
}

/// `model!` 宏生成的编译期字段描述。
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// 声明的字段名
    pub name: &'static str,
    /// 显式指定的列名
    pub db: Option<&'static str>,
    pub data_type: DataType,
    pub size: u32,
    pub tags: &'static [&'static str],
}

/// 解析后的字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub db_name: String,
    pub data_type: DataType,
    pub size: u32,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub auto_update_time: bool,
}

impl Field {
    /// 读取实例上的字段值，同时返回是否为零值。
    pub fn value_of(&self, value: &dyn ModelValue) -> (SqlValue, bool) {
        let v = value.field_value(self.name).unwrap_or(SqlValue::Null);
        let zero = v.is_zero();
        (v, zero)
    }

    /// 写入实例上的字段值。
    pub fn set(&self, value: &mut dyn ModelValue, v: SqlValue) -> Result<(), ScanError> {
        value.set_field(self.name, v)
    }
}

#[derive(Debug, Default)]
struct Tags {
    ignored: bool,
    primary_key: bool,
    auto_increment: Option<bool>,
    auto_update_time: bool,
    size: Option<u32>,
    column: Option<String>,
}

fn parse_tags(tags: &[&str]) -> Tags {
    let mut out = Tags::default();
    for tag in tags {
        let (key, val) = match tag.split_once(':') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (tag.trim(), None),
        };
        match key.to_ascii_lowercase().as_str() {
            "-" => out.ignored = true,
            "primarykey" | "primary_key" => out.primary_key = true,
            "autoincrement" => out.auto_increment = Some(val != Some("false")),
            "autoupdatetime" => out.auto_update_time = true,
            "size" => out.size = val.and_then(|v| v.parse().ok()),
            "column" => out.column = val.map(str::to_string),
            _ => {}
        }
    }
    out
}

/// 某个模型类型的字段目录。
#[derive(Debug)]
pub struct Schema {
    pub name: String,
    pub table: String,
    /// 按声明顺序
    pub fields: Vec<Field>,
    pub db_names: Vec<String>,
    fields_by_name: HashMap<&'static str, usize>,
    fields_by_db_name: HashMap<String, usize>,
    primary_fields: Vec<usize>,
    prioritized_primary_field: Option<usize>,
    pub before_save: bool,
    pub before_update: bool,
    pub after_save: bool,
    pub after_update: bool,
}

impl Schema {
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields_by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_by_db_name(&self, name: &str) -> Option<&Field> {
        self.fields_by_db_name.get(name).map(|&i| &self.fields[i])
    }

    /// 先按列名再按字段名查找。
    pub fn look_up_field(&self, name: &str) -> Option<&Field> {
        self.field_by_db_name(name)
            .or_else(|| self.field_by_name(name))
    }

    pub fn primary_fields(&self) -> impl Iterator<Item = &Field> {
        self.primary_fields.iter().map(|&i| &self.fields[i])
    }

    /// 单主键时即该主键；多主键时优先名为 `id` 的那个。
    pub fn prioritized_primary_field(&self) -> Option<&Field> {
        self.prioritized_primary_field.map(|i| &self.fields[i])
    }

    fn build<T: Model>(naming: &NamingStrategy) -> Self {
        let mut fields = Vec::new();

        for meta in T::field_metas() {
            let tags = parse_tags(meta.tags);
            if tags.ignored {
                continue;
            }
            let db_name = tags
                .column
                .or_else(|| meta.db.map(str::to_string))
                .unwrap_or_else(|| naming.column_name(meta.name));
            fields.push(Field {
                name: meta.name,
                db_name,
                data_type: meta.data_type,
                size: tags.size.unwrap_or(meta.size),
                primary_key: tags.primary_key,
                auto_increment: tags.auto_increment.unwrap_or(false),
                auto_update_time: tags.auto_update_time,
            });
        }

        // 未标记主键时，名为 id 的字段作为主键
        if !fields.iter().any(|f| f.primary_key)
            && let Some(f) = fields.iter_mut().find(|f| f.db_name == "id")
        {
            f.primary_key = true;
        }

        let primary_fields: Vec<usize> = (0..fields.len())
            .filter(|&i| fields[i].primary_key)
            .collect();
        let prioritized_primary_field = match primary_fields.as_slice() {
            [only] => Some(*only),
            many => many.iter().copied().find(|&i| fields[i].db_name == "id"),
        };

        // 整数主键默认自增，除非显式 `autoincrement:false`
        if let Some(i) = prioritized_primary_field {
            let explicit = T::field_metas()
                .iter()
                .find(|m| m.name == fields[i].name)
                .map(|m| parse_tags(m.tags).auto_increment.is_some())
                .unwrap_or(false);
            if !explicit && matches!(fields[i].data_type, DataType::Int | DataType::Uint) {
                fields[i].auto_increment = true;
            }
        }

        let fields_by_name = fields.iter().enumerate().map(|(i, f)| (f.name, i)).collect();
        let fields_by_db_name = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.db_name.clone(), i))
            .collect();
        let db_names = fields.iter().map(|f| f.db_name.clone()).collect();

        let mut probe = T::default();
        Self {
            name: T::NAME.to_string(),
            table: T::TABLE
                .map(str::to_string)
                .unwrap_or_else(|| naming.table_name(T::NAME)),
            fields,
            db_names,
            fields_by_name,
            fields_by_db_name,
            primary_fields,
            prioritized_primary_field,
            before_save: probe.as_before_save().is_some(),
            before_update: probe.as_before_update().is_some(),
            after_save: probe.as_after_save().is_some(),
            after_update: probe.as_after_update().is_some(),
        }
    }
}

type Cache = RwLock<HashMap<TypeId, Arc<Schema>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// 解析（或从缓存取出）`T` 的 schema。
///
/// 并发首次解析时只构建一次：读锁未命中后在写锁内再次检查。
/// 同一类型第一次解析时使用的 `NamingStrategy` 决定缓存内容。
pub fn parse<T: Model>(naming: &NamingStrategy) -> Arc<Schema> {
    let id = TypeId::of::<T>();
    if let Some(s) = cache()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&id)
    {
        return s.clone();
    }

    let mut guard = cache().write().unwrap_or_else(|e| e.into_inner());
    guard
        .entry(id)
        .or_insert_with(|| {
            let schema = Schema::build::<T>(naming);
            tracing::trace!(
                target: "halo_orm::schema",
                model = T::NAME,
                table = %schema.table,
                fields = schema.fields.len(),
                "schema parsed"
            );
            Arc::new(schema)
        })
        .clone()
}
