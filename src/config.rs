//! Config：语句共享的配置（方言、连接、子句渲染覆盖、命名策略）。

use crate::clause::ClauseBuilderFn;
use crate::dialect::Dialector;
use crate::driver::ConnPool;
use crate::field_mapper::NamingStrategy;
use crate::flavor::default_flavor;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Config {
    pub dialector: Arc<dyn Dialector>,
    pub conn_pool: Option<Arc<dyn ConnPool>>,
    /// 按子句名覆盖渲染。
    pub clause_builders: HashMap<String, ClauseBuilderFn>,
    pub naming: NamingStrategy,
    /// 为 false 时拒绝执行没有 WHERE 的 UPDATE。
    pub allow_global_update: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialector: Arc::new(default_flavor()),
            conn_pool: None,
            clause_builders: HashMap::new(),
            naming: NamingStrategy::default(),
            allow_global_update: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builders: Vec<&str> = self.clause_builders.keys().map(String::as_str).collect();
        builders.sort_unstable();
        f.debug_struct("Config")
            .field("dialector", &self.dialector.name())
            .field("conn_pool", &self.conn_pool)
            .field("clause_builders", &builders)
            .field("naming", &self.naming)
            .field("allow_global_update", &self.allow_global_update)
            .finish()
    }
}

impl Config {
    pub fn new(dialector: impl Dialector + 'static) -> Self {
        Self {
            dialector: Arc::new(dialector),
            ..Self::default()
        }
    }

    pub fn with_dialector(mut self, dialector: impl Dialector + 'static) -> Self {
        self.dialector = Arc::new(dialector);
        self
    }

    pub fn with_conn_pool(mut self, pool: Arc<dyn ConnPool>) -> Self {
        self.conn_pool = Some(pool);
        self
    }

    pub fn with_clause_builder(
        mut self,
        name: impl Into<String>,
        builder: impl Fn(&crate::clause::Clause, &mut dyn crate::clause::Builder) + Send + Sync + 'static,
    ) -> Self {
        self.clause_builders.insert(name.into(), Arc::new(builder));
        self
    }

    pub fn with_naming_strategy(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    pub fn allow_global_update(mut self, allow: bool) -> Self {
        self.allow_global_update = allow;
        self
    }
}
