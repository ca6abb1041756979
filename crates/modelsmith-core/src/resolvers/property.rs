use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use crate::blueprint::{ConstructorCall, PropertyInfo};
use crate::config::BuildConfiguration;
use crate::error::Result;
use crate::types::TypeRef;
use crate::value::{Instance, Value};

use super::cache::{CacheStore, OrderCache};
use super::{CacheLevel, PropertyResolver, execute_priority, order_by_priority};

static GLOBAL_PROPERTIES: LazyLock<CacheStore<PropertyInfo>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Orders writable properties by execute-order rule priority and decides
/// which of them a build should leave alone.
pub struct DefaultPropertyResolver {
    cache: OrderCache<PropertyInfo>,
}

impl DefaultPropertyResolver {
    pub fn new(cache_level: CacheLevel) -> Self {
        Self {
            cache: OrderCache::new(cache_level, &GLOBAL_PROPERTIES),
        }
    }

    pub fn cache_level(&self) -> CacheLevel {
        self.cache.level()
    }

    /// Whether a constructor argument equal to the type's zero value was
    /// still assigned by the constructor, judged against an instance built
    /// through the public parameterless constructor.
    fn set_by_constructor(
        configuration: &BuildConfiguration,
        property: &PropertyInfo,
        arg: &Value,
    ) -> bool {
        let Some(blueprint) = configuration.types().get(property.declaring_type()) else {
            return false;
        };
        let Some(constructor) = blueprint
            .constructors()
            .iter()
            .find(|constructor| constructor.is_public() && constructor.parameters().is_empty())
        else {
            return false;
        };
        match constructor.invoke(Vec::new()) {
            Ok(throwaway) => property
                .get(&throwaway)
                .is_some_and(|untouched| untouched != *arg),
            Err(_) => false,
        }
    }
}

impl Default for DefaultPropertyResolver {
    fn default() -> Self {
        Self::new(CacheLevel::default())
    }
}

impl PropertyResolver for DefaultPropertyResolver {
    fn ordered_properties(
        &self,
        configuration: &BuildConfiguration,
        type_ref: TypeRef,
    ) -> Vec<PropertyInfo> {
        self.cache.get_or_compute((type_ref.id(), String::new()), || {
            let Some(blueprint) = configuration.types().get(type_ref) else {
                return Vec::new();
            };
            let rules = configuration.execute_order_rules();
            let writable = blueprint
                .properties()
                .iter()
                .filter(|property| property.can_write())
                .cloned()
                .collect();
            order_by_priority(writable, |property| {
                execute_priority(
                    rules,
                    property.declaring_type(),
                    property.type_ref(),
                    property.name(),
                )
            })
        })
    }

    fn is_ignored(
        &self,
        configuration: &BuildConfiguration,
        instance: &Instance,
        property: &PropertyInfo,
        call: Option<&ConstructorCall>,
    ) -> Result<bool> {
        if property.is_indexer() {
            return Ok(true);
        }
        if configuration
            .ignore_rules()
            .iter()
            .any(|rule| rule.is_match(property.declaring_type(), property.name()))
        {
            return Ok(true);
        }
        let Some(call) = call.filter(|call| !call.args().is_empty()) else {
            return Ok(false);
        };
        let args = call.args();

        let Some(current) = property.get(instance) else {
            return Ok(false);
        };
        let property_name = property.name().to_lowercase();

        for parameter in call.constructor().parameters() {
            if parameter.name().to_lowercase() != property_name
                || !parameter.type_ref().same_type(&property.type_ref())
            {
                continue;
            }
            let Some(arg) = args.get(parameter.position()) else {
                continue;
            };
            if arg.is_null() || current != *arg {
                continue;
            }
            if !arg.is_default_for(parameter.type_ref())
                || Self::set_by_constructor(configuration, property, arg)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, param};
    use crate::config::ConfigurationBuilder;
    use crate::rules::{ExecuteOrderRule, IgnoreRule};

    #[derive(Debug, Clone, PartialEq)]
    struct Gauge {
        label: String,
        level: i32,
        spare: i32,
    }

    impl Default for Gauge {
        fn default() -> Self {
            Self {
                label: String::new(),
                level: 5,
                spare: 0,
            }
        }
    }

    fn configuration() -> std::sync::Arc<BuildConfiguration> {
        builder()
            .ignore(IgnoreRule::for_property::<Gauge>("spare"))
            .execute_order(ExecuteOrderRule::for_name("level", 3))
            .build()
    }

    fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
            .register(
                Blueprint::of::<Gauge>()
                    .default_constructor()
                    .constructor([param::<String>("label"), param::<i32>("level")], |args| {
                        Ok(Gauge {
                            label: args.take()?,
                            level: args.take()?,
                            spare: 0,
                        })
                    })
                    .constructor([param::<i32>("spare")], |args| {
                        Ok(Gauge {
                            spare: args.take()?,
                            ..Gauge::default()
                        })
                    })
                    .property("label", |g: &Gauge| g.label.clone(), |g, v| g.label = v)
                    .property("level", |g: &Gauge| g.level, |g, v| g.level = v)
                    .property("spare", |g: &Gauge| g.spare, |g, v| g.spare = v)
                    .read_only("summary", |g: &Gauge| format!("{}:{}", g.label, g.level))
                    .build(),
            )
    }

    fn call(configuration: &BuildConfiguration, args: &[Value]) -> ConstructorCall {
        let constructor = configuration
            .constructor_resolver()
            .resolve(configuration.types(), TypeRef::of::<Gauge>(), Some(args))
            .expect("constructor");
        ConstructorCall::new(constructor, args.to_vec())
    }

    fn property(configuration: &BuildConfiguration, name: &str) -> PropertyInfo {
        configuration
            .types()
            .get(TypeRef::of::<Gauge>())
            .and_then(|blueprint| blueprint.property(name))
            .cloned()
            .expect("property")
    }

    #[test]
    fn ordered_properties_skip_read_only_and_honor_priority() {
        let configuration = configuration();
        let resolver = DefaultPropertyResolver::new(CacheLevel::None);

        let names: Vec<String> = resolver
            .ordered_properties(&configuration, TypeRef::of::<Gauge>())
            .iter()
            .map(|property| property.name().to_string())
            .collect();

        assert_eq!(names, vec!["level", "label", "spare"]);
    }

    #[test]
    fn ignore_rule_and_constructor_arguments_suppress_population() {
        let configuration = configuration();
        let resolver = DefaultPropertyResolver::default();
        let call = call(
            &configuration,
            &[Value::Text("depth".to_string()), Value::Int(9)],
        );
        let instance = Instance::new(Gauge {
            label: "depth".to_string(),
            level: 9,
            spare: 0,
        });

        let ignored = |name: &str, call: Option<&ConstructorCall>| {
            resolver
                .is_ignored(&configuration, &instance, &property(&configuration, name), call)
                .expect("is_ignored")
        };

        assert!(ignored("spare", None));
        assert!(!ignored("label", None));
        assert!(ignored("label", Some(&call)));
        assert!(ignored("level", Some(&call)));
    }

    #[test]
    fn zero_argument_is_compared_with_parameterless_instance() {
        let configuration = configuration();
        let resolver = DefaultPropertyResolver::default();
        let level = property(&configuration, "level");
        let call = call(&configuration, &[Value::Text(String::new()), Value::Int(0)]);
        let instance = Instance::new(Gauge {
            label: String::new(),
            level: 0,
            spare: 0,
        });

        // Parameterless construction yields level 5, so a 0 came from the
        // constructor argument.
        assert!(
            resolver
                .is_ignored(&configuration, &instance, &level, Some(&call))
                .expect("is_ignored")
        );

        // Empty text is not a value-type zero but still equals the argument.
        let label = property(&configuration, "label");
        assert!(
            resolver
                .is_ignored(&configuration, &instance, &label, Some(&call))
                .expect("is_ignored")
        );
    }

    #[test]
    fn zero_argument_matching_parameterless_instance_is_populated() {
        let configuration = builder().build();
        let resolver = DefaultPropertyResolver::default();
        let instance = Instance::new(Gauge::default());
        let call = call(&configuration, &[Value::Int(0)]);

        assert!(
            !resolver
                .is_ignored(&configuration, &instance, &property(&configuration, "spare"), Some(&call))
                .expect("is_ignored")
        );
        assert!(
            !resolver
                .is_ignored(&configuration, &instance, &property(&configuration, "level"), Some(&call))
                .expect("is_ignored")
        );
    }

    #[test]
    fn only_parameters_of_the_selected_constructor_are_compared() {
        let configuration = builder().build();
        let resolver = DefaultPropertyResolver::default();
        let instance = Instance::new(Gauge {
            label: String::new(),
            level: 9,
            spare: 9,
        });
        let spare_only = call(&configuration, &[Value::Int(9)]);

        let ignored = |name: &str| {
            resolver
                .is_ignored(&configuration, &instance, &property(&configuration, name), Some(&spare_only))
                .expect("is_ignored")
        };

        assert!(ignored("spare"));
        assert!(!ignored("level"));
    }
}
