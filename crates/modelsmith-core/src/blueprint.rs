//! Type metadata registered in place of runtime reflection.
//!
//! A [`Blueprint`] lists the constructors, properties and implemented
//! abstract types of one model type. Blueprints are collected in a
//! [`TypeRegistry`] owned by the build configuration.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{BuildError, Result};
use crate::types::TypeRef;
use crate::value::{Instance, Model, Value, ValueType};

/// Member visibility as seen by the resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

type ConstructFn = Arc<dyn Fn(&mut Args) -> Result<Instance> + Send + Sync>;
type GetFn = Arc<dyn Fn(&dyn Model) -> Option<Value> + Send + Sync>;
type SetFn = Arc<dyn Fn(&mut dyn Model, Value) -> Result<()> + Send + Sync>;

/// Name and type of a constructor parameter, before it is attached to a
/// constructor.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: String,
    type_ref: TypeRef,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}

/// Shorthand for a parameter of a [`ValueType`].
pub fn param<V: ValueType>(name: &str) -> ParameterSpec {
    ParameterSpec::new(name, V::type_ref())
}

#[derive(Debug, Clone)]
pub struct ParameterInfo {
    name: String,
    type_ref: TypeRef,
    position: usize,
    declaring_type: TypeRef,
}

impl ParameterInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// Zero-based position in the constructor's declared parameter list.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn declaring_type(&self) -> TypeRef {
        self.declaring_type
    }
}

#[derive(Clone)]
pub struct ConstructorInfo {
    declaring_type: TypeRef,
    parameters: Vec<ParameterInfo>,
    visibility: Visibility,
    construct: ConstructFn,
}

impl ConstructorInfo {
    pub fn declaring_type(&self) -> TypeRef {
        self.declaring_type
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// True when any parameter takes the declaring type itself.
    pub fn is_self_referencing(&self) -> bool {
        self.parameters
            .iter()
            .any(|parameter| parameter.type_ref.same_type(&self.declaring_type))
    }

    pub fn accepts(&self, args: &[Value], types: &TypeRegistry) -> bool {
        self.parameters.len() == args.len()
            && self
                .parameters
                .iter()
                .zip(args)
                .all(|(parameter, arg)| arg.is_assignable_to(parameter.type_ref, types))
    }

    pub fn invoke(&self, args: Vec<Value>) -> Result<Instance> {
        if args.len() != self.parameters.len() {
            return Err(BuildError::InvalidOperation(format!(
                "{} expects {} arguments but received {}",
                self.signature(),
                self.parameters.len(),
                args.len()
            )));
        }
        let mut args = Args::new(args);
        (self.construct)(&mut args)
    }

    /// Human readable signature, e.g. `Person(first_name: String)`.
    pub fn signature(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| format!("{}: {}", parameter.name, parameter.type_ref))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({parameters})", self.declaring_type)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("signature", &self.signature())
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// A selected constructor and the arguments built for it.
#[derive(Debug, Clone)]
pub struct ConstructorCall {
    constructor: ConstructorInfo,
    args: Vec<Value>,
}

impl ConstructorCall {
    pub fn new(constructor: ConstructorInfo, args: Vec<Value>) -> Self {
        Self { constructor, args }
    }

    pub fn constructor(&self) -> &ConstructorInfo {
        &self.constructor
    }

    /// Arguments in parameter declaration order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn invoke(&self) -> Result<Instance> {
        self.constructor.invoke(self.args.clone())
    }
}

#[derive(Clone)]
pub struct PropertyInfo {
    name: String,
    type_ref: TypeRef,
    declaring_type: TypeRef,
    visibility: Visibility,
    is_indexer: bool,
    getter: Option<GetFn>,
    setter: Option<SetFn>,
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    pub fn declaring_type(&self) -> TypeRef {
        self.declaring_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_indexer(&self) -> bool {
        self.is_indexer
    }

    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    /// Public with a setter.
    pub fn can_write(&self) -> bool {
        self.visibility == Visibility::Public && self.setter.is_some()
    }

    /// Current value on `instance`, or `None` when the property has no
    /// getter or the instance is of another type.
    pub fn get(&self, instance: &Instance) -> Option<Value> {
        let getter = self.getter.as_ref()?;
        instance.read(|model| getter(model))
    }

    pub fn set(&self, instance: &Instance, value: Value) -> Result<()> {
        let setter = self.setter.as_ref().ok_or_else(|| {
            BuildError::InvalidOperation(format!(
                "property {}.{} has no setter",
                self.declaring_type, self.name
            ))
        })?;
        let value = detach(value, instance);
        instance.write(|model| setter(model, value))
    }
}

/// Replaces references to `owner` inside `value` with copies, so an object
/// can be assigned to one of its own properties.
fn detach(value: Value, owner: &Instance) -> Value {
    match value {
        Value::Object(other) if other.ptr_eq(owner) => Value::Object(other.snapshot()),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| detach(item, owner))
                .collect(),
        ),
        other => other,
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("type_ref", &self.type_ref)
            .field("declaring_type", &self.declaring_type)
            .field("visibility", &self.visibility)
            .field("is_indexer", &self.is_indexer)
            .finish()
    }
}

/// Constructor arguments handed to a constructor closure in declaration order.
#[derive(Debug)]
pub struct Args {
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    pub fn take_value(&mut self) -> Result<Value> {
        let value = self.values.next().ok_or_else(|| {
            BuildError::InvalidOperation(format!("missing constructor argument {}", self.position))
        })?;
        self.position += 1;
        Ok(value)
    }

    pub fn take<T: ValueType>(&mut self) -> Result<T> {
        let value = self.take_value()?;
        T::from_value(value)
    }
}

/// Registered metadata for one model type.
#[derive(Debug, Clone)]
pub struct Blueprint {
    type_ref: TypeRef,
    constructors: Vec<ConstructorInfo>,
    properties: Vec<PropertyInfo>,
    implements: Vec<TypeRef>,
}

impl Blueprint {
    pub fn of<T: Model>() -> BlueprintBuilder<T> {
        BlueprintBuilder {
            blueprint: Blueprint {
                type_ref: TypeRef::of::<T>(),
                constructors: Vec::new(),
                properties: Vec::new(),
                implements: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn implements(&self) -> &[TypeRef] {
        &self.implements
    }

    pub fn is_constructible(&self) -> bool {
        !self.constructors.is_empty()
    }
}

/// Fluent builder for a [`Blueprint`] of `T`.
pub struct BlueprintBuilder<T> {
    blueprint: Blueprint,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Model> BlueprintBuilder<T> {
    pub fn constructor<F>(self, parameters: impl IntoIterator<Item = ParameterSpec>, construct: F) -> Self
    where
        F: Fn(&mut Args) -> Result<T> + Send + Sync + 'static,
    {
        self.add_constructor(Visibility::Public, parameters, construct)
    }

    pub fn private_constructor<F>(
        self,
        parameters: impl IntoIterator<Item = ParameterSpec>,
        construct: F,
    ) -> Self
    where
        F: Fn(&mut Args) -> Result<T> + Send + Sync + 'static,
    {
        self.add_constructor(Visibility::Private, parameters, construct)
    }

    /// Public parameterless constructor backed by `Default`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor([], |_| Ok(T::default()))
    }

    fn add_constructor<F>(
        mut self,
        visibility: Visibility,
        parameters: impl IntoIterator<Item = ParameterSpec>,
        construct: F,
    ) -> Self
    where
        F: Fn(&mut Args) -> Result<T> + Send + Sync + 'static,
    {
        let declaring_type = self.blueprint.type_ref;
        let parameters = parameters
            .into_iter()
            .enumerate()
            .map(|(position, spec)| ParameterInfo {
                name: spec.name,
                type_ref: spec.type_ref,
                position,
                declaring_type,
            })
            .collect();
        self.blueprint.constructors.push(ConstructorInfo {
            declaring_type,
            parameters,
            visibility,
            construct: Arc::new(move |args: &mut Args| construct(args).map(Instance::new)),
        });
        self
    }

    /// Public read/write property of a [`ValueType`].
    pub fn property<V, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        V: ValueType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.property_raw(
            name,
            V::type_ref(),
            move |target| get(target).to_value(),
            move |target, value| {
                set(target, V::from_value(value)?);
                Ok(())
            },
        )
    }

    /// Public property without a setter.
    pub fn read_only<V, G>(self, name: &str, get: G) -> Self
    where
        V: ValueType,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.add_property(
            name,
            V::type_ref(),
            Visibility::Public,
            false,
            Some(getter::<T, _>(move |target| get(target).to_value())),
            None,
        )
    }

    /// Read/write property whose conversion is handled by the caller, e.g.
    /// fields holding trait objects.
    pub fn property_raw<G, S>(self, name: &str, type_ref: TypeRef, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.add_property(
            name,
            type_ref,
            Visibility::Public,
            false,
            Some(getter::<T, _>(get)),
            Some(setter::<T, _>(set)),
        )
    }

    pub fn private_property<V, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        V: ValueType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.add_property(
            name,
            V::type_ref(),
            Visibility::Private,
            false,
            Some(getter::<T, _>(move |target| get(target).to_value())),
            Some(setter::<T, _>(move |target, value| {
                set(target, V::from_value(value)?);
                Ok(())
            })),
        )
    }

    /// Indexed accessor; never populated.
    pub fn indexer<G, S>(self, name: &str, type_ref: TypeRef, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.add_property(
            name,
            type_ref,
            Visibility::Public,
            true,
            Some(getter::<T, _>(get)),
            Some(setter::<T, _>(set)),
        )
    }

    /// Declares that `T` can stand in for the abstract type `I`.
    pub fn implements<I: ?Sized + 'static>(mut self) -> Self {
        self.blueprint.implements.push(TypeRef::of::<I>());
        self
    }

    fn add_property(
        mut self,
        name: &str,
        type_ref: TypeRef,
        visibility: Visibility,
        is_indexer: bool,
        getter: Option<GetFn>,
        setter: Option<SetFn>,
    ) -> Self {
        self.blueprint.properties.push(PropertyInfo {
            name: name.to_string(),
            type_ref,
            declaring_type: self.blueprint.type_ref,
            visibility,
            is_indexer,
            getter,
            setter,
        });
        self
    }

    pub fn build(self) -> Blueprint {
        self.blueprint
    }
}

fn getter<T: Model, G>(get: G) -> GetFn
where
    G: Fn(&T) -> Value + Send + Sync + 'static,
{
    Arc::new(move |model: &dyn Model| model.as_any().downcast_ref::<T>().map(&get))
}

fn setter<T: Model, S>(set: S) -> SetFn
where
    S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(move |model: &mut dyn Model, value: Value| {
        let target = model.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
            BuildError::InvalidOperation(format!(
                "instance is not a {}",
                TypeRef::of::<T>().short_name()
            ))
        })?;
        set(target, value)
    })
}

/// Blueprints known to a build configuration, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    blueprints: Vec<Blueprint>,
    index: HashMap<TypeId, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blueprint, replacing any earlier one for the same type.
    pub fn register(&mut self, blueprint: Blueprint) {
        let id = blueprint.type_ref.id();
        match self.index.get(&id) {
            Some(&slot) => self.blueprints[slot] = blueprint,
            None => {
                self.index.insert(id, self.blueprints.len());
                self.blueprints.push(blueprint);
            }
        }
    }

    pub fn get(&self, type_ref: TypeRef) -> Option<&Blueprint> {
        self.index
            .get(&type_ref.id())
            .and_then(|&slot| self.blueprints.get(slot))
    }

    pub fn contains(&self, type_ref: TypeRef) -> bool {
        self.index.contains_key(&type_ref.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.iter()
    }

    /// Registered types declaring `abstract_type` in their `implements` list.
    pub fn implementors(&self, abstract_type: TypeRef) -> impl Iterator<Item = TypeRef> + '_ {
        self.blueprints
            .iter()
            .filter(move |blueprint| {
                blueprint
                    .implements
                    .iter()
                    .any(|implemented| implemented.same_type(&abstract_type))
            })
            .map(|blueprint| blueprint.type_ref)
    }

    /// True when a value of `source` may be stored where `target` is expected.
    pub fn is_assignable(&self, source: TypeRef, target: TypeRef) -> bool {
        if source.same_type(&target) {
            return true;
        }
        self.get(source).is_some_and(|blueprint| {
            blueprint
                .implements
                .iter()
                .any(|implemented| implemented.same_type(&target))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Tag {
        label: String,
    }

    fn tag_blueprint() -> Blueprint {
        Blueprint::of::<Tag>()
            .default_constructor()
            .constructor([param::<String>("label")], |args| {
                Ok(Tag {
                    label: args.take()?,
                })
            })
            .property("label", |t: &Tag| t.label.clone(), |t, v| t.label = v)
            .build()
    }

    #[test]
    fn constructor_invocation_passes_arguments_in_order() {
        let blueprint = tag_blueprint();
        let constructor = &blueprint.constructors()[1];

        let instance = constructor
            .invoke(vec![Value::Text("red".to_string())])
            .expect("invoke");

        assert_eq!(instance.with(|t: &Tag| t.label.clone()), Some("red".to_string()));
        assert_eq!(constructor.signature(), "Tag(label: String)");
    }

    #[test]
    fn invoke_rejects_wrong_arity() {
        let blueprint = tag_blueprint();
        let result = blueprint.constructors()[1].invoke(Vec::new());
        assert!(matches!(result, Err(BuildError::InvalidOperation(_))));
    }

    #[test]
    fn property_accessors_round_trip_through_values() {
        let blueprint = tag_blueprint();
        let property = blueprint.property("label").expect("property");
        let instance = Instance::new(Tag::default());

        property
            .set(&instance, Value::Text("blue".to_string()))
            .expect("set");

        assert_eq!(property.get(&instance), Some(Value::Text("blue".to_string())));
        assert!(property.can_write());
    }
}
