//! 命名：字段名到列名的 mapper，以及类型名到表名的 `NamingStrategy`。

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// 字段名映射函数类型。
pub type FieldMapperFunc = Arc<dyn Fn(&str) -> String + Send + Sync + 'static>;

fn identity_impl(s: &str) -> String {
    s.to_string()
}

/// 恒等 mapper：列名与声明的字段名一致。
pub fn identity_mapper() -> FieldMapperFunc {
    static IDENTITY_MAPPER: OnceLock<FieldMapperFunc> = OnceLock::new();
    IDENTITY_MAPPER
        .get_or_init(|| Arc::new(identity_impl))
        .clone()
}

static DEFAULT_FIELD_MAPPER: OnceLock<Mutex<FieldMapperFunc>> = OnceLock::new();
static DEFAULT_FIELD_MAPPER_LOCK: Mutex<()> = Mutex::new(());

fn mapper_cell() -> &'static Mutex<FieldMapperFunc> {
    DEFAULT_FIELD_MAPPER.get_or_init(|| Mutex::new(Arc::new(snake_case_mapper)))
}

/// 获取当前全局默认 FieldMapper（默认 `snake_case_mapper`）。
///
/// 只影响之后第一次解析的模型：schema 解析后即被缓存。
pub fn default_field_mapper() -> FieldMapperFunc {
    mapper_cell()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// 设置全局默认 FieldMapper，返回旧值。
pub fn set_default_field_mapper(mapper: FieldMapperFunc) -> FieldMapperFunc {
    let mut g = mapper_cell().lock().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut *g, mapper)
}

/// 修改全局默认 FieldMapper 的 RAII guard（会持有一个全局锁，避免并行测试互相干扰）。
pub struct DefaultFieldMapperGuard {
    _lock: MutexGuard<'static, ()>,
    old: FieldMapperFunc,
}

impl Drop for DefaultFieldMapperGuard {
    fn drop(&mut self) {
        let _ = set_default_field_mapper(self.old.clone());
    }
}

/// 在一个作用域内临时设置默认 FieldMapper，并保证退出作用域后自动恢复。
pub fn set_default_field_mapper_scoped(mapper: FieldMapperFunc) -> DefaultFieldMapperGuard {
    let lock = DEFAULT_FIELD_MAPPER_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_field_mapper(mapper);
    DefaultFieldMapperGuard { _lock: lock, old }
}

/// SnakeCaseMapper：将 `CamelCase` 转为 `snake_case`。
///
/// 单词边界：小写或数字后的大写（`aB`/`a1B`），以及连续大写的最后一个（`HTTPServer` -> `http_server`）。
pub fn snake_case_mapper(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut prev: Option<char> = None;
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        let next = chars.get(i + 1).copied();

        if c.is_ascii_uppercase() {
            if let Some(p) = prev {
                let prev_is_lower_or_digit = p.is_ascii_lowercase() || p.is_ascii_digit();
                let next_is_lower = next.map(|n| n.is_ascii_lowercase()).unwrap_or(false);

                if prev_is_lower_or_digit || (p.is_ascii_uppercase() && next_is_lower) {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }

        prev = Some(c);
    }

    out
}

/// 表名策略：`table_prefix` + snake_case(类型名)，默认取复数形式。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingStrategy {
    pub table_prefix: String,
    pub singular_table: bool,
}

impl NamingStrategy {
    pub fn table_name(&self, type_name: &str) -> String {
        let base = snake_case_mapper(type_name);
        let name = if self.singular_table {
            base
        } else {
            pluralize(&base)
        };
        format!("{}{}", self.table_prefix, name)
    }

    /// 未显式指定列名时使用全局默认 mapper。
    pub fn column_name(&self, field_name: &str) -> String {
        default_field_mapper()(field_name)
    }
}

fn pluralize(s: &str) -> String {
    if s.ends_with('s') || s.ends_with('x') || s.ends_with("ch") || s.ends_with("sh") {
        return format!("{s}es");
    }
    if let Some(stem) = s.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
        && !stem.is_empty()
    {
        return format!("{stem}ies");
    }
    format!("{s}s")
}
