//! Constructor, parameter and property resolution.

mod cache;
mod constructor;
mod parameter;
mod property;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::blueprint::{ConstructorCall, ConstructorInfo, ParameterInfo, PropertyInfo, TypeRegistry};
use crate::config::BuildConfiguration;
use crate::error::Result;
use crate::rules::ExecuteOrderRule;
use crate::types::TypeRef;
use crate::value::{Instance, Value};

pub use constructor::DefaultConstructorResolver;
pub use parameter::DefaultParameterResolver;
pub use property::DefaultPropertyResolver;

/// Memoization scope for ordered member lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheLevel {
    /// Shared by every resolver in the process.
    Global,
    /// Owned by one resolver instance.
    #[default]
    PerInstance,
    /// Recomputed on every call.
    None,
}

pub trait ConstructorResolver: Send + Sync {
    /// Picks the constructor of `type_ref` to invoke, matching `args` when
    /// they are supplied.
    fn resolve(
        &self,
        types: &TypeRegistry,
        type_ref: TypeRef,
        args: Option<&[Value]>,
    ) -> Result<ConstructorInfo>;
}

pub trait ParameterResolver: Send + Sync {
    fn ordered_parameters(
        &self,
        configuration: &BuildConfiguration,
        constructor: &ConstructorInfo,
    ) -> Vec<ParameterInfo>;
}

pub trait PropertyResolver: Send + Sync {
    /// Public writable properties of `type_ref` in build order.
    fn ordered_properties(
        &self,
        configuration: &BuildConfiguration,
        type_ref: TypeRef,
    ) -> Vec<PropertyInfo>;

    fn is_ignored(
        &self,
        configuration: &BuildConfiguration,
        instance: &Instance,
        property: &PropertyInfo,
        call: Option<&ConstructorCall>,
    ) -> Result<bool>;

    fn should_populate_property(
        &self,
        configuration: &BuildConfiguration,
        instance: &Instance,
        property: &PropertyInfo,
        call: Option<&ConstructorCall>,
    ) -> Result<bool> {
        if !property.can_write() {
            return Ok(false);
        }
        Ok(!self.is_ignored(configuration, instance, property, call)?)
    }
}

/// Highest priority among matching execute-order rules, 0 when none match.
fn execute_priority(
    rules: &[ExecuteOrderRule],
    declaring_type: TypeRef,
    member_type: TypeRef,
    name: &str,
) -> i32 {
    rules
        .iter()
        .filter(|rule| rule.is_match(declaring_type, member_type, name))
        .map(ExecuteOrderRule::priority)
        .max()
        .unwrap_or(0)
}

/// Stable sort by descending priority; ties keep declaration order.
fn order_by_priority<T>(members: Vec<T>, priority: impl Fn(&T) -> i32) -> Vec<T> {
    let mut ranked: Vec<(i32, T)> = members
        .into_iter()
        .map(|member| (priority(&member), member))
        .collect();
    ranked.sort_by(|left, right| right.0.cmp(&left.0));
    ranked.into_iter().map(|(_, member)| member).collect()
}
