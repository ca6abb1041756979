use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;
use crate::generator::GeneratorContext;
use crate::types::TypeRef;
use crate::value::{Value, ValueType};

/// Predicate over a member or reference name.
#[derive(Debug, Clone)]
pub enum NameMatch {
    Any,
    Exact(String),
    Pattern(Regex),
}

impl NameMatch {
    pub fn is_match(&self, name: Option<&str>) -> bool {
        match self {
            NameMatch::Any => true,
            NameMatch::Exact(expected) => name == Some(expected.as_str()),
            NameMatch::Pattern(regex) => name.is_some_and(|name| regex.is_match(name)),
        }
    }
}

impl fmt::Display for NameMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameMatch::Any => f.write_str("*"),
            NameMatch::Exact(name) => f.write_str(name),
            NameMatch::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Suppresses population of one property on one declaring type.
///
/// Names are compared exactly; `name`, `Name` and `names` are different
/// properties.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    declaring_type: TypeRef,
    name: String,
}

impl IgnoreRule {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
        }
    }

    pub fn for_property<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(TypeRef::of::<T>(), name)
    }

    pub fn is_match(&self, declaring_type: TypeRef, name: &str) -> bool {
        self.declaring_type.same_type(&declaring_type) && self.name == name
    }
}

/// Priority-weighted predicate controlling the order members are built in.
#[derive(Debug, Clone)]
pub struct ExecuteOrderRule {
    declaring_type: Option<TypeRef>,
    member_type: Option<TypeRef>,
    name: NameMatch,
    priority: i32,
}

impl ExecuteOrderRule {
    /// Matches members with this exact name on any type.
    pub fn for_name(name: impl Into<String>, priority: i32) -> Self {
        Self {
            declaring_type: None,
            member_type: None,
            name: NameMatch::Exact(name.into()),
            priority,
        }
    }

    /// Matches one member of one declaring type.
    pub fn for_property<T: ?Sized + 'static>(name: impl Into<String>, priority: i32) -> Self {
        Self {
            declaring_type: Some(TypeRef::of::<T>()),
            ..Self::for_name(name, priority)
        }
    }

    /// Matches every member whose type is `member_type`.
    pub fn for_type(member_type: TypeRef, priority: i32) -> Self {
        Self {
            declaring_type: None,
            member_type: Some(member_type.underlying()),
            name: NameMatch::Any,
            priority,
        }
    }

    pub fn matching(pattern: &str, priority: i32) -> Result<Self> {
        Ok(Self {
            declaring_type: None,
            member_type: None,
            name: NameMatch::Pattern(Regex::new(pattern)?),
            priority,
        })
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_match(&self, declaring_type: TypeRef, member_type: TypeRef, name: &str) -> bool {
        self.declaring_type
            .is_none_or(|expected| expected.same_type(&declaring_type))
            && self
                .member_type
                .is_none_or(|expected| expected.same_type(&member_type))
            && self.name.is_match(Some(name))
    }
}

type CreationFactory = Arc<dyn Fn(&GeneratorContext<'_>) -> Result<Value> + Send + Sync>;

/// Literal or factory value that bypasses normal generation for matching
/// targets.
#[derive(Clone)]
pub struct CreationRule {
    target_type: Option<TypeRef>,
    declaring_type: Option<TypeRef>,
    name: NameMatch,
    priority: i32,
    description: String,
    factory: CreationFactory,
}

impl CreationRule {
    /// Rule producing values from `factory` for every target matching the
    /// optional type and the name predicate.
    pub fn new<F>(target_type: Option<TypeRef>, name: NameMatch, priority: i32, factory: F) -> Self
    where
        F: Fn(&GeneratorContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let description = match target_type {
            Some(target_type) => format!("creation-rule({target_type} {name})"),
            None => format!("creation-rule({name})"),
        };
        Self {
            target_type: target_type.map(TypeRef::underlying),
            declaring_type: None,
            name,
            priority,
            description,
            factory: Arc::new(factory),
        }
    }

    /// Always yields `value` when a `V` is requested.
    pub fn for_type<V>(value: V, priority: i32) -> Self
    where
        V: ValueType + Clone + Send + Sync,
    {
        Self::new(Some(V::type_ref()), NameMatch::Any, priority, move |_| {
            Ok(value.to_value())
        })
    }

    /// Always yields `value` for the property or parameter `name` declared
    /// on `T`.
    pub fn for_property<T, V>(name: &str, value: V, priority: i32) -> Self
    where
        T: ?Sized + 'static,
        V: ValueType + Clone + Send + Sync,
    {
        Self::new(
            Some(V::type_ref()),
            NameMatch::Exact(name.to_string()),
            priority,
            move |_| Ok(value.to_value()),
        )
        .declared_on(TypeRef::of::<T>())
    }

    /// Yields null for every request of `target_type`.
    pub fn null_for(target_type: TypeRef, priority: i32) -> Self {
        Self::new(Some(target_type), NameMatch::Any, priority, |_| Ok(Value::Null))
    }

    pub fn matching<F>(pattern: &str, priority: i32, factory: F) -> Result<Self>
    where
        F: Fn(&GeneratorContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Ok(Self::new(
            None,
            NameMatch::Pattern(Regex::new(pattern)?),
            priority,
            factory,
        ))
    }

    /// Restricts the rule to members declared on `declaring_type`.
    pub fn declared_on(mut self, declaring_type: TypeRef) -> Self {
        self.declaring_type = Some(declaring_type);
        self
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_match(&self, context: &GeneratorContext<'_>) -> bool {
        if let Some(target_type) = self.target_type
            && !target_type.same_type(&context.type_ref)
        {
            return false;
        }
        if let Some(declaring_type) = self.declaring_type
            && !context
                .declaring_type
                .is_some_and(|actual| actual.same_type(&declaring_type))
        {
            return false;
        }
        match &self.name {
            NameMatch::Any => true,
            other => other.is_match(context.reference_name),
        }
    }

    pub fn create(&self, context: &GeneratorContext<'_>) -> Result<Value> {
        (self.factory)(context)
    }
}

impl fmt::Debug for CreationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationRule")
            .field("description", &self.description)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Substitutes a concrete type for an abstract one during construction.
#[derive(Debug, Clone, Copy)]
pub struct TypeMappingRule {
    source: TypeRef,
    target: TypeRef,
}

impl TypeMappingRule {
    pub fn new(source: TypeRef, target: TypeRef) -> Self {
        Self {
            source: source.underlying(),
            target,
        }
    }

    pub fn between<S: ?Sized + 'static, T: 'static>() -> Self {
        Self::new(TypeRef::of::<S>(), TypeRef::of::<T>())
    }

    pub fn source(&self) -> TypeRef {
        self.source
    }

    pub fn target(&self) -> TypeRef {
        self.target
    }
}

/// Side effect run on a built value before it is returned.
pub trait PostBuildAction: Send + Sync {
    fn id(&self) -> &str;

    fn priority(&self) -> i32 {
        0
    }

    fn is_match(&self, context: &GeneratorContext<'_>) -> bool;

    fn execute(&self, value: &mut Value, context: &GeneratorContext<'_>) -> Result<()>;
}

/// Post-build action for every value of one type, backed by a closure.
pub struct TypePostBuildAction<F> {
    id: String,
    target_type: TypeRef,
    priority: i32,
    action: F,
}

impl<F> TypePostBuildAction<F>
where
    F: Fn(&mut Value, &GeneratorContext<'_>) -> Result<()> + Send + Sync,
{
    pub fn new(target_type: TypeRef, priority: i32, action: F) -> Self {
        Self {
            id: format!("post-build({target_type})"),
            target_type: target_type.underlying(),
            priority,
            action,
        }
    }
}

impl<F> PostBuildAction for TypePostBuildAction<F>
where
    F: Fn(&mut Value, &GeneratorContext<'_>) -> Result<()> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_match(&self, context: &GeneratorContext<'_>) -> bool {
        self.target_type.same_type(&context.type_ref)
    }

    fn execute(&self, value: &mut Value, context: &GeneratorContext<'_>) -> Result<()> {
        (self.action)(value, context)
    }
}
