use std::fmt;

use crate::blueprint::{ParameterInfo, PropertyInfo};
use crate::types::TypeRef;

/// Which half of the lifecycle a capability is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildRequirement {
    Create,
    Populate,
}

impl fmt::Display for BuildRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildRequirement::Create => f.write_str("create"),
            BuildRequirement::Populate => f.write_str("populate"),
        }
    }
}

/// Configured item a capability dispatches to, by index into the
/// configuration's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilitySource {
    CreationRule(usize),
    ValueGenerator(usize),
    TypeCreator(usize),
}

/// Immutable answer to "what can be done for this target".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCapability {
    pub supports_create: bool,
    pub supports_populate: bool,
    pub auto_detect_constructor: bool,
    pub auto_populate: bool,
    pub implemented_by: String,
    pub source: CapabilitySource,
}

impl BuildCapability {
    /// Create-only capability without constructor detection or population.
    pub fn create_only(implemented_by: impl Into<String>, source: CapabilitySource) -> Self {
        Self {
            supports_create: true,
            supports_populate: false,
            auto_detect_constructor: false,
            auto_populate: false,
            implemented_by: implemented_by.into(),
            source,
        }
    }

    pub fn satisfies(&self, requirement: BuildRequirement) -> bool {
        match requirement {
            BuildRequirement::Create => self.supports_create,
            BuildRequirement::Populate => self.supports_populate,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.supports_create && !self.supports_populate
    }
}

/// Type, property or constructor parameter being built.
#[derive(Debug, Clone, Copy)]
pub enum BuildTarget<'a> {
    Type(TypeRef),
    Property(&'a PropertyInfo),
    Parameter(&'a ParameterInfo),
}

impl<'a> BuildTarget<'a> {
    pub fn type_ref(&self) -> TypeRef {
        match self {
            BuildTarget::Type(type_ref) => *type_ref,
            BuildTarget::Property(property) => property.type_ref(),
            BuildTarget::Parameter(parameter) => parameter.type_ref(),
        }
    }

    pub fn reference_name(&self) -> Option<&'a str> {
        match self {
            BuildTarget::Type(_) => None,
            BuildTarget::Property(property) => Some(property.name()),
            BuildTarget::Parameter(parameter) => Some(parameter.name()),
        }
    }

    pub fn declaring_type(&self) -> Option<TypeRef> {
        match self {
            BuildTarget::Type(_) => None,
            BuildTarget::Property(property) => Some(property.declaring_type()),
            BuildTarget::Parameter(parameter) => Some(parameter.declaring_type()),
        }
    }
}

impl fmt::Display for BuildTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildTarget::Type(type_ref) => write!(f, "type {type_ref}"),
            BuildTarget::Property(property) => write!(
                f,
                "property {}.{} ({})",
                property.declaring_type(),
                property.name(),
                property.type_ref()
            ),
            BuildTarget::Parameter(parameter) => write!(
                f,
                "parameter {} of {} ({})",
                parameter.name(),
                parameter.declaring_type(),
                parameter.type_ref()
            ),
        }
    }
}
