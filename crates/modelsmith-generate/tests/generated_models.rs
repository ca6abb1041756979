mod common;

use std::sync::{Arc, Mutex};

use common::{Contact, Employee, Profile, Team, builder, slug};
use modelsmith_core::{
    ExecuteOrderRule, ExecuteStrategy, GeneratorContext, TypePostBuildAction, TypeRef, Value,
};

#[test]
fn constructor_parameters_follow_execute_order_rules() {
    let built = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorder = Arc::clone(&built);
    let configuration = builder(5)
        .execute_order(ExecuteOrderRule::for_name("gender", 50))
        .execute_order(ExecuteOrderRule::for_name("first_name", 40))
        .execute_order(ExecuteOrderRule::for_name("last_name", 30))
        .execute_order(ExecuteOrderRule::for_name("domain", 20))
        .execute_order(ExecuteOrderRule::for_name("email", 10))
        .post_build(TypePostBuildAction::new(
            TypeRef::of::<String>(),
            0,
            move |_value: &mut Value, context: &GeneratorContext<'_>| {
                if let (Some(name), Ok(mut names)) = (context.reference_name, recorder.lock()) {
                    names.push(name.to_string());
                }
                Ok(())
            },
        ))
        .build();

    let profile = configuration.create::<Profile>().expect("profile");

    let order = built.lock().expect("lock").clone();
    assert_eq!(order, ["gender", "first_name", "last_name", "domain", "email"]);
    assert!(["Female", "Male", "Non-binary"].contains(&profile.gender()));
    assert!(profile.email().contains('@'));
}

#[test]
fn email_is_derived_from_populated_names() {
    let configuration = builder(11).build();

    let contact = configuration.create::<Contact>().expect("contact");

    assert!(!contact.first_name.is_empty());
    assert!(!contact.last_name.is_empty());
    let expected = format!("{}.{}@", slug(&contact.first_name), slug(&contact.last_name));
    assert!(
        contact.email.starts_with(&expected),
        "{} does not start with {expected}",
        contact.email
    );
    assert!(!contact.phone.is_empty());
}

#[test]
fn email_falls_back_when_ordered_first() {
    let configuration = builder(11)
        .execute_order(ExecuteOrderRule::for_property::<Contact>("email", 100))
        .build();

    let contact = configuration.create::<Contact>().expect("contact");

    assert!(contact.email.contains('@'));
    assert!(!contact.first_name.is_empty());
}

#[test]
fn same_seed_builds_same_graph() {
    let first = builder(42).build().create::<Team>().expect("team");
    let second = builder(42).build().create::<Team>().expect("team");

    assert_eq!(first, second);
    assert!(!first.members.is_empty());
}

#[test]
fn ages_are_adult() {
    let mut strategy = ExecuteStrategy::new(builder(3).build());

    for _ in 0..20 {
        let employee = strategy.create_typed::<Employee>().expect("employee");
        assert!((18..=80).contains(&employee.age), "age {}", employee.age);
        assert!(!employee.city.is_empty());
    }
}

#[test]
fn constructor_argument_is_not_overwritten() {
    let mut strategy = ExecuteStrategy::new(builder(8).build());

    let team = strategy
        .create_typed_with::<Team>(&[Value::Text("Falcons".to_string())])
        .expect("team");

    assert_eq!(team.name, "Falcons");
    assert!((1..=5).contains(&team.members.len()));
}
