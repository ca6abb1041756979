use crate::blueprint::{ConstructorInfo, TypeRegistry};
use crate::error::{BuildError, Result};
use crate::types::TypeRef;
use crate::value::Value;

use super::ConstructorResolver;

/// Picks the public constructor with the fewest parameters, skipping
/// constructors that take their own declaring type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConstructorResolver;

impl DefaultConstructorResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ConstructorResolver for DefaultConstructorResolver {
    fn resolve(
        &self,
        types: &TypeRegistry,
        type_ref: TypeRef,
        args: Option<&[Value]>,
    ) -> Result<ConstructorInfo> {
        let blueprint = types.get(type_ref).ok_or_else(|| {
            BuildError::missing_member(type_ref.to_string(), "no blueprint is registered")
        })?;
        let mut public = blueprint
            .constructors()
            .iter()
            .filter(|constructor| constructor.is_public());

        match args {
            Some(args) if !args.is_empty() => public
                .find(|constructor| constructor.accepts(args, types))
                .cloned()
                .ok_or_else(|| {
                    let kinds = args
                        .iter()
                        .map(Value::describe)
                        .collect::<Vec<_>>()
                        .join(", ");
                    BuildError::missing_member(
                        type_ref.to_string(),
                        format!("no public constructor accepts ({kinds})"),
                    )
                }),
            _ => public
                .filter(|constructor| !constructor.is_self_referencing())
                .min_by_key(|constructor| constructor.parameters().len())
                .cloned()
                .ok_or_else(|| {
                    BuildError::missing_member(
                        type_ref.to_string(),
                        "no public constructor that does not take its own type",
                    )
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, param};
    use crate::object_type;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Singleton {
        id: i32,
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Account {
        owner: String,
        limit: i64,
    }

    object_type!(Singleton);

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register(
            Blueprint::of::<Singleton>()
                .private_constructor([], |_| Ok(Singleton::default()))
                .constructor([param::<Singleton>("source")], |args| {
                    let source: Singleton = args.take()?;
                    Ok(source)
                })
                .build(),
        );
        types.register(
            Blueprint::of::<Account>()
                .constructor(
                    [param::<String>("owner"), param::<i64>("limit")],
                    |args| {
                        Ok(Account {
                            owner: args.take()?,
                            limit: args.take()?,
                        })
                    },
                )
                .constructor([param::<String>("owner")], |args| {
                    Ok(Account {
                        owner: args.take()?,
                        limit: 0,
                    })
                })
                .build(),
        );
        types
    }

    #[test]
    fn copy_constructor_only_type_is_missing_member() {
        let result =
            DefaultConstructorResolver.resolve(&registry(), TypeRef::of::<Singleton>(), None);
        assert!(matches!(result, Err(BuildError::MissingMember { .. })));
    }

    #[test]
    fn fewest_parameters_wins_without_arguments() {
        let constructor = DefaultConstructorResolver
            .resolve(&registry(), TypeRef::of::<Account>(), None)
            .expect("constructor");
        assert_eq!(constructor.parameters().len(), 1);
    }

    #[test]
    fn arguments_select_matching_constructor() {
        let args = [Value::Text("ana".to_string()), Value::Int(500)];
        let constructor = DefaultConstructorResolver
            .resolve(&registry(), TypeRef::of::<Account>(), Some(&args))
            .expect("constructor");
        assert_eq!(constructor.parameters().len(), 2);

        let mismatch = [Value::Int(1)];
        let result =
            DefaultConstructorResolver.resolve(&registry(), TypeRef::of::<Account>(), Some(&mismatch));
        assert!(matches!(result, Err(BuildError::MissingMember { .. })));
    }

    #[test]
    fn unregistered_type_is_missing_member() {
        let result = DefaultConstructorResolver.resolve(&registry(), TypeRef::of::<u8>(), None);
        assert!(matches!(result, Err(BuildError::MissingMember { .. })));
    }
}
