//! Object-graph population engine for test fixtures.
//!
//! Types take part in a build by registering a [`Blueprint`] that lists
//! their constructors and properties. An [`ExecuteStrategy`] then creates
//! instances recursively: it asks the [`BuildProcessor`] which creation
//! rule, value generator or type creator handles each type, property and
//! constructor parameter, builds constructor arguments and properties in
//! execute order, and guards against runaway recursion.

pub mod blueprint;
pub mod capability;
pub mod config;
pub mod creators;
pub mod error;
pub mod generator;
pub mod history;
pub mod log;
pub mod processor;
pub mod resolvers;
pub mod rules;
pub mod strategy;
pub mod types;
pub mod value;

pub use blueprint::{
    Args, Blueprint, BlueprintBuilder, ConstructorCall, ConstructorInfo, ParameterInfo,
    ParameterSpec, PropertyInfo, TypeRegistry, Visibility, param,
};
pub use capability::{BuildCapability, BuildRequirement, BuildTarget, CapabilitySource};
pub use config::{BuildConfiguration, BuildOptions, ConfigurationBuilder};
pub use creators::{DefaultTypeCreator, SequenceTypeCreator};
pub use error::{BuildError, BuildFailure, Result};
pub use generator::{GeneratorContext, TypeCreator, ValueGenerator, normalize_name};
pub use history::BuildHistory;
pub use log::{BuildLog, DefaultBuildLog, NullBuildLog};
pub use processor::{BuildAction, BuildProcessor};
pub use resolvers::{
    CacheLevel, ConstructorResolver, DefaultConstructorResolver, DefaultParameterResolver,
    DefaultPropertyResolver, ParameterResolver, PropertyResolver,
};
pub use rules::{
    CreationRule, ExecuteOrderRule, IgnoreRule, NameMatch, PostBuildAction, TypeMappingRule,
    TypePostBuildAction,
};
pub use strategy::ExecuteStrategy;
pub use types::TypeRef;
pub use value::{Instance, Model, Value, ValueType};
