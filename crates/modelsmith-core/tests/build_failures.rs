mod common;

use common::{Company, Singleton, builder};
use modelsmith_core::{
    Blueprint, BuildError, BuildFailure, ConfigurationBuilder, CreationRule, ExecuteStrategy,
    TypeRef, Value, ValueType, param,
};

#[derive(Debug, Clone, PartialEq, Default)]
struct Registry {
    parent_id: i32,
}

#[test]
fn type_without_usable_constructor_is_missing_member() {
    let mut strategy = ExecuteStrategy::new(builder().build());

    let error = strategy
        .create(TypeRef::of::<Singleton>())
        .expect_err("only private and copy constructors");

    assert!(error.is_missing_member());
    let failure = error.failure().expect("wrapped failure");
    assert_eq!(failure.target_type.as_deref(), Some("Singleton"));
    assert!(failure.context.is_none());
    assert!(failure.build_log.contains("Singleton"));
}

#[test]
fn empty_configuration_is_not_supported() {
    let mut strategy = ExecuteStrategy::new(ConfigurationBuilder::new().build());

    let error = strategy
        .create(TypeRef::of::<String>())
        .expect_err("nothing can build a string");

    assert!(error.is_not_supported());
}

#[test]
fn failure_is_wrapped_once_at_the_innermost_build() {
    let configuration = builder()
        .add_creation_rule(CreationRule::new(
            Some(TypeRef::of::<String>()),
            modelsmith_core::NameMatch::Exact("city".to_string()),
            0,
            |_| Err(BuildError::InvalidValue("no cities today".to_string())),
        ))
        .build();
    let mut strategy = ExecuteStrategy::new(configuration);

    let error = strategy
        .create(TypeRef::of::<Company>())
        .expect_err("city rule fails");

    let failure = error.failure().expect("wrapped failure");
    assert_eq!(failure.reference_name.as_deref(), Some("city"));
    assert!(
        failure
            .context
            .as_ref()
            .is_some_and(|context| context.type_ref().is::<common::Address>())
    );
    assert!(matches!(
        error.root_cause(),
        BuildError::InvalidValue(message) if message == "no cities today"
    ));
}

#[test]
fn failure_serializes_without_context() {
    let mut strategy = ExecuteStrategy::new(builder().build());
    let error = strategy
        .create(TypeRef::of::<Singleton>())
        .expect_err("not constructible");
    let failure = error.failure().expect("wrapped failure");

    let json = serde_json::to_value(failure).expect("serialize");
    assert_eq!(json["target_type"], "Singleton");
    assert!(json.get("context").is_none());

    let restored: BuildFailure = serde_json::from_value(json).expect("deserialize");
    assert_eq!(restored.message, failure.message);
    assert!(restored.context.is_none());
    assert!(restored.source.is_none());
}

#[test]
fn mismatched_arguments_are_missing_member() {
    let configuration = builder()
        .register(
            Blueprint::of::<Registry>()
                .constructor([param::<i32>("parent_id")], |args| {
                    Ok(Registry {
                        parent_id: args.take()?,
                    })
                })
                .build(),
        )
        .build();
    let mut strategy = ExecuteStrategy::new(configuration);

    let error = strategy
        .create_with(TypeRef::of::<Registry>(), &[Value::Text("x".to_string())])
        .expect_err("no constructor takes text");

    assert!(error.is_missing_member());
}

#[test]
fn failed_build_closes_every_open_log_entry() {
    let configuration = builder()
        .add_creation_rule(CreationRule::new(
            Some(TypeRef::of::<String>()),
            modelsmith_core::NameMatch::Exact("city".to_string()),
            0,
            |_| Err(BuildError::InvalidValue("no cities today".to_string())),
        ))
        .build();
    let mut strategy = ExecuteStrategy::new(configuration);

    strategy
        .create(TypeRef::of::<Company>())
        .expect_err("city rule fails");

    let output = strategy.log().output();
    let indent_of = |entry: &str| {
        output
            .lines()
            .find(|line| line.trim_start() == entry)
            .map(|line| line.len() - entry.len())
    };
    assert!(output.starts_with("Start creating type Company"));
    assert_eq!(output.lines().last(), Some("Failed creating type Company"));
    let opened = output
        .lines()
        .find(|line| line.trim_start().starts_with("Start populating instance Address"))
        .map(|line| line.len() - line.trim_start().len());
    assert!(opened.is_some());
    assert_eq!(indent_of("Failed populating instance Address"), opened);
}

#[test]
fn populate_properties_outside_a_build_is_invalid() {
    let mut strategy = ExecuteStrategy::new(builder().build());
    let Value::Object(instance) = Company::default().to_value() else {
        panic!("companies are objects");
    };

    let error = strategy
        .populate_properties(&instance)
        .expect_err("no build is running");

    assert!(matches!(error, BuildError::InvalidOperation(_)));
    assert!(strategy.build_chain().is_empty());
}
