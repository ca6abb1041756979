use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use crate::blueprint::{ConstructorInfo, ParameterInfo};
use crate::config::BuildConfiguration;

use super::cache::{CacheStore, OrderCache};
use super::{CacheLevel, ParameterResolver, execute_priority, order_by_priority};

static GLOBAL_PARAMETERS: LazyLock<CacheStore<ParameterInfo>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Orders constructor parameters by execute-order rule priority, keeping
/// declaration order for parameters with equal priority.
pub struct DefaultParameterResolver {
    cache: OrderCache<ParameterInfo>,
}

impl DefaultParameterResolver {
    pub fn new(cache_level: CacheLevel) -> Self {
        Self {
            cache: OrderCache::new(cache_level, &GLOBAL_PARAMETERS),
        }
    }

    pub fn cache_level(&self) -> CacheLevel {
        self.cache.level()
    }
}

impl Default for DefaultParameterResolver {
    fn default() -> Self {
        Self::new(CacheLevel::default())
    }
}

impl ParameterResolver for DefaultParameterResolver {
    fn ordered_parameters(
        &self,
        configuration: &BuildConfiguration,
        constructor: &ConstructorInfo,
    ) -> Vec<ParameterInfo> {
        let key = (constructor.declaring_type().id(), constructor.signature());
        self.cache.get_or_compute(key, || {
            let rules = configuration.execute_order_rules();
            order_by_priority(constructor.parameters().to_vec(), |parameter| {
                execute_priority(
                    rules,
                    parameter.declaring_type(),
                    parameter.type_ref(),
                    parameter.name(),
                )
            })
        })
    }
}
