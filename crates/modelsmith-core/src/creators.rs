//! Type creators shipped with the engine.

use rand::Rng;

use crate::blueprint::ConstructorCall;
use crate::config::ConfigurationBuilder;
use crate::error::{BuildError, Result};
use crate::generator::{GeneratorContext, TypeCreator};
use crate::strategy::ExecuteStrategy;
use crate::types::TypeRef;
use crate::value::Value;

/// Constructs registered blueprint types and populates their properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTypeCreator;

impl TypeCreator for DefaultTypeCreator {
    fn id(&self) -> &'static str {
        "default-type-creator"
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.element().is_none()
            && ctx
                .configuration
                .types()
                .get(ctx.type_ref)
                .is_some_and(|blueprint| blueprint.is_constructible())
    }

    fn create(
        &self,
        strategy: &mut ExecuteStrategy,
        type_ref: TypeRef,
        _reference_name: Option<&str>,
        args: Option<&[Value]>,
        call: Option<&ConstructorCall>,
    ) -> Result<Value> {
        if let Some(call) = call {
            return call.invoke().map(Value::Object);
        }
        let configuration = strategy.configuration();
        let constructor =
            configuration
                .constructor_resolver()
                .resolve(configuration.types(), type_ref, args)?;
        let instance = constructor.invoke(args.map(<[Value]>::to_vec).unwrap_or_default())?;
        Ok(Value::Object(instance))
    }

    fn populate(&self, strategy: &mut ExecuteStrategy, instance: Value) -> Result<Value> {
        let Value::Object(object) = &instance else {
            return Err(BuildError::NotSupported(format!(
                "cannot populate a {} value",
                instance.kind()
            )));
        };
        strategy.populate_properties(object)?;
        Ok(instance)
    }
}

/// Creates sequences such as `Vec<T>` by building each item through the
/// strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceTypeCreator;

impl TypeCreator for SequenceTypeCreator {
    fn id(&self) -> &'static str {
        "sequence-type-creator"
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.element().is_some()
    }

    fn supports_populate(&self) -> bool {
        false
    }

    fn auto_detect_constructor(&self) -> bool {
        false
    }

    fn auto_populate(&self) -> bool {
        false
    }

    fn create(
        &self,
        strategy: &mut ExecuteStrategy,
        type_ref: TypeRef,
        _reference_name: Option<&str>,
        args: Option<&[Value]>,
        _call: Option<&ConstructorCall>,
    ) -> Result<Value> {
        if let Some(items) = args {
            return Ok(Value::List(items.to_vec()));
        }
        let element = type_ref.element().ok_or_else(|| {
            BuildError::NotSupported(format!("{type_ref} is not a sequence type"))
        })?;

        let options = strategy.configuration().options();
        let min = options.min_collection_len;
        let max = options.max_collection_len.max(min);
        let count = strategy.rng().random_range(min..=max);

        let items = (0..count)
            .map(|_| strategy.create(element))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::List(items))
    }

    fn populate(&self, _strategy: &mut ExecuteStrategy, instance: Value) -> Result<Value> {
        Err(BuildError::NotSupported(format!(
            "{} values cannot be populated",
            instance.kind()
        )))
    }
}

/// Adds the built-in type creators, sequences first.
pub fn register(builder: ConfigurationBuilder) -> ConfigurationBuilder {
    builder
        .type_creator(SequenceTypeCreator)
        .type_creator(DefaultTypeCreator)
}
