//! Builds a small object graph with the bundled generators.
//!
//! Run with `RUST_LOG=modelsmith_core=debug` to see each build step.

use modelsmith_core::{Blueprint, ExecuteStrategy, IgnoreRule, object_type};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

#[derive(Debug, Clone, PartialEq, Default)]
struct Member {
    first_name: String,
    last_name: String,
    email: String,
    age: i32,
    notes: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Team {
    name: String,
    city: String,
    members: Vec<Member>,
}

object_type!(Member, Team);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(UtcTime::rfc_3339())
        .init();

    let configuration = modelsmith_generate::default_builder()
        .register(
            Blueprint::of::<Member>()
                .default_constructor()
                .property("first_name", |m: &Member| m.first_name.clone(), |m, v| m.first_name = v)
                .property("last_name", |m: &Member| m.last_name.clone(), |m, v| m.last_name = v)
                .property("email", |m: &Member| m.email.clone(), |m, v| m.email = v)
                .property("age", |m: &Member| m.age, |m, v| m.age = v)
                .property("notes", |m: &Member| m.notes.clone(), |m, v| m.notes = v)
                .build(),
        )
        .register(
            Blueprint::of::<Team>()
                .default_constructor()
                .property("name", |t: &Team| t.name.clone(), |t, v| t.name = v)
                .property("city", |t: &Team| t.city.clone(), |t, v| t.city = v)
                .property("members", |t: &Team| t.members.clone(), |t, v| t.members = v)
                .build(),
        )
        .ignore(IgnoreRule::for_property::<Member>("notes"))
        .seed(2024)
        .build();

    let mut strategy = ExecuteStrategy::new(configuration);
    let team = strategy.create_typed::<Team>()?;

    println!("{} ({})", team.name, team.city);
    for member in &team.members {
        println!(
            "  {} {} <{}> age {}",
            member.first_name, member.last_name, member.email, member.age
        );
    }
    Ok(())
}
