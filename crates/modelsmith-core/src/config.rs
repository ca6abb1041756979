use std::fmt;
use std::path::Path;
use std::sync::Arc;

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::{Deserialize, Serialize};

use crate::blueprint::{Blueprint, TypeRegistry};
use crate::error::Result;
use crate::generator::{TypeCreator, ValueGenerator};
use crate::resolvers::{
    CacheLevel, ConstructorResolver, DefaultConstructorResolver, DefaultParameterResolver,
    DefaultPropertyResolver, ParameterResolver, PropertyResolver,
};
use crate::rules::{CreationRule, ExecuteOrderRule, IgnoreRule, PostBuildAction, TypeMappingRule};
use crate::strategy::ExecuteStrategy;
use crate::types::TypeRef;
use crate::value::ValueType;

/// Tunables for an execute strategy and its default collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BuildOptions {
    /// Seed for the random source; a random seed is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Deepest nesting of builds before failing with a recursion error.
    pub max_depth: usize,
    /// Reuse an ancestor under construction instead of recursing into a
    /// second instance of the same type.
    pub reuse_circular_references: bool,
    /// Fewest items a generated sequence contains.
    pub min_collection_len: usize,
    /// Most items a generated sequence contains.
    pub max_collection_len: usize,
    /// Memoization scope of the default property and parameter resolvers.
    pub cache_level: CacheLevel,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_depth: 64,
            reuse_circular_references: true,
            min_collection_len: 1,
            max_collection_len: 5,
            cache_level: CacheLevel::PerInstance,
        }
    }
}

impl BuildOptions {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(BuildOptions)
    }
}

/// Immutable set of blueprints, rules, generators, creators and resolvers
/// shared by execute strategies.
pub struct BuildConfiguration {
    types: TypeRegistry,
    creation_rules: Vec<CreationRule>,
    ignore_rules: Vec<IgnoreRule>,
    execute_order_rules: Vec<ExecuteOrderRule>,
    type_mapping_rules: Vec<TypeMappingRule>,
    post_build_actions: Vec<Box<dyn PostBuildAction>>,
    type_creators: Vec<Box<dyn TypeCreator>>,
    value_generators: Vec<Box<dyn ValueGenerator>>,
    constructor_resolver: Box<dyn ConstructorResolver>,
    property_resolver: Box<dyn PropertyResolver>,
    parameter_resolver: Box<dyn ParameterResolver>,
    options: BuildOptions,
}

// Strategies on different threads share one configuration.
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BuildConfiguration>();
    assert_send_sync::<Arc<BuildConfiguration>>();
};

impl BuildConfiguration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn creation_rules(&self) -> &[CreationRule] {
        &self.creation_rules
    }

    pub fn ignore_rules(&self) -> &[IgnoreRule] {
        &self.ignore_rules
    }

    pub fn execute_order_rules(&self) -> &[ExecuteOrderRule] {
        &self.execute_order_rules
    }

    pub fn type_mapping_rules(&self) -> &[TypeMappingRule] {
        &self.type_mapping_rules
    }

    /// Post-build actions, highest priority first.
    pub fn post_build_actions(&self) -> &[Box<dyn PostBuildAction>] {
        &self.post_build_actions
    }

    pub fn type_creators(&self) -> &[Box<dyn TypeCreator>] {
        &self.type_creators
    }

    pub fn value_generators(&self) -> &[Box<dyn ValueGenerator>] {
        &self.value_generators
    }

    pub fn constructor_resolver(&self) -> &dyn ConstructorResolver {
        self.constructor_resolver.as_ref()
    }

    pub fn property_resolver(&self) -> &dyn PropertyResolver {
        self.property_resolver.as_ref()
    }

    pub fn parameter_resolver(&self) -> &dyn ParameterResolver {
        self.parameter_resolver.as_ref()
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Concrete type to construct for `type_ref`.
    ///
    /// Mapping rules are followed transitively. A type without mapping rules
    /// and without a constructible blueprint falls back to the first
    /// registered blueprint implementing it.
    pub fn resolve_build_type(&self, type_ref: TypeRef) -> TypeRef {
        let mut current = type_ref;
        let mut mapped = false;
        for _ in 0..self.type_mapping_rules.len() {
            let next = self
                .type_mapping_rules
                .iter()
                .find(|rule| rule.source().same_type(&current))
                .map(TypeMappingRule::target);
            match next {
                Some(target) if !target.same_type(&current) => {
                    current = target;
                    mapped = true;
                }
                _ => break,
            }
        }
        if mapped {
            return current;
        }

        let constructible = |candidate: TypeRef| {
            self.types
                .get(candidate)
                .is_some_and(Blueprint::is_constructible)
        };
        if constructible(current) {
            return current;
        }
        self.types
            .implementors(current)
            .find(|implementor| constructible(*implementor))
            .unwrap_or(current)
    }

    /// Builds a `T` with a fresh execute strategy.
    pub fn create<T: ValueType>(self: &Arc<Self>) -> Result<T> {
        ExecuteStrategy::new(Arc::clone(self)).create_typed::<T>()
    }
}

impl fmt::Debug for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildConfiguration")
            .field("types", &self.types.iter().count())
            .field("creation_rules", &self.creation_rules.len())
            .field("ignore_rules", &self.ignore_rules.len())
            .field("execute_order_rules", &self.execute_order_rules.len())
            .field("type_mapping_rules", &self.type_mapping_rules.len())
            .field("post_build_actions", &self.post_build_actions.len())
            .field("type_creators", &self.type_creators.len())
            .field("value_generators", &self.value_generators.len())
            .field("options", &self.options)
            .finish()
    }
}

/// Collects everything a [`BuildConfiguration`] holds.
#[derive(Default)]
pub struct ConfigurationBuilder {
    types: TypeRegistry,
    creation_rules: Vec<CreationRule>,
    ignore_rules: Vec<IgnoreRule>,
    execute_order_rules: Vec<ExecuteOrderRule>,
    type_mapping_rules: Vec<TypeMappingRule>,
    post_build_actions: Vec<Box<dyn PostBuildAction>>,
    type_creators: Vec<Box<dyn TypeCreator>>,
    value_generators: Vec<Box<dyn ValueGenerator>>,
    constructor_resolver: Option<Box<dyn ConstructorResolver>>,
    property_resolver: Option<Box<dyn PropertyResolver>>,
    parameter_resolver: Option<Box<dyn ParameterResolver>>,
    options: BuildOptions,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, blueprint: Blueprint) -> Self {
        self.types.register(blueprint);
        self
    }

    pub fn add_creation_rule(mut self, rule: CreationRule) -> Self {
        self.creation_rules.push(rule);
        self
    }

    pub fn ignore(mut self, rule: IgnoreRule) -> Self {
        self.ignore_rules.push(rule);
        self
    }

    pub fn execute_order(mut self, rule: ExecuteOrderRule) -> Self {
        self.execute_order_rules.push(rule);
        self
    }

    pub fn map_type(mut self, rule: TypeMappingRule) -> Self {
        self.type_mapping_rules.push(rule);
        self
    }

    pub fn post_build(mut self, action: impl PostBuildAction + 'static) -> Self {
        self.post_build_actions.push(Box::new(action));
        self
    }

    pub fn type_creator(mut self, creator: impl TypeCreator + 'static) -> Self {
        self.type_creators.push(Box::new(creator));
        self
    }

    pub fn value_generator(mut self, generator: impl ValueGenerator + 'static) -> Self {
        self.value_generators.push(Box::new(generator));
        self
    }

    pub fn constructor_resolver(mut self, resolver: impl ConstructorResolver + 'static) -> Self {
        self.constructor_resolver = Some(Box::new(resolver));
        self
    }

    pub fn property_resolver(mut self, resolver: impl PropertyResolver + 'static) -> Self {
        self.property_resolver = Some(Box::new(resolver));
        self
    }

    pub fn parameter_resolver(mut self, resolver: impl ParameterResolver + 'static) -> Self {
        self.parameter_resolver = Some(Box::new(resolver));
        self
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    /// Finalizes the configuration. Resolvers not set explicitly use the
    /// defaults with the configured cache level.
    pub fn build(self) -> Arc<BuildConfiguration> {
        let cache_level = self.options.cache_level;
        let mut post_build_actions = self.post_build_actions;
        post_build_actions.sort_by(|left, right| right.priority().cmp(&left.priority()));

        Arc::new(BuildConfiguration {
            types: self.types,
            creation_rules: self.creation_rules,
            ignore_rules: self.ignore_rules,
            execute_order_rules: self.execute_order_rules,
            type_mapping_rules: self.type_mapping_rules,
            post_build_actions,
            type_creators: self.type_creators,
            value_generators: self.value_generators,
            constructor_resolver: self
                .constructor_resolver
                .unwrap_or_else(|| Box::new(DefaultConstructorResolver::new())),
            property_resolver: self
                .property_resolver
                .unwrap_or_else(|| Box::new(DefaultPropertyResolver::new(cache_level))),
            parameter_resolver: self
                .parameter_resolver
                .unwrap_or_else(|| Box::new(DefaultParameterResolver::new(cache_level))),
            options: self.options,
        })
    }
}
