#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rand::RngCore;

use modelsmith_core::{
    Blueprint, ConfigurationBuilder, GeneratorContext, Result, Value, ValueGenerator, creators,
    object_type, param,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Company {
    pub name: String,
    pub address: Address,
    pub staff: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub label: String,
    pub next: Option<Box<Node>>,
}

/// Only constructible from another instance of itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Singleton {
    pub id: i32,
}

object_type!(Address, Person, Company, Node, Singleton);

pub fn address_blueprint() -> Blueprint {
    Blueprint::of::<Address>()
        .default_constructor()
        .property("street", |a: &Address| a.street.clone(), |a, v| a.street = v)
        .property("city", |a: &Address| a.city.clone(), |a, v| a.city = v)
        .build()
}

pub fn person_blueprint() -> Blueprint {
    Blueprint::of::<Person>()
        .default_constructor()
        .property("first_name", |p: &Person| p.first_name.clone(), |p, v| p.first_name = v)
        .property("last_name", |p: &Person| p.last_name.clone(), |p, v| p.last_name = v)
        .property("age", |p: &Person| p.age, |p, v| p.age = v)
        .build()
}

pub fn company_blueprint() -> Blueprint {
    Blueprint::of::<Company>()
        .default_constructor()
        .constructor([param::<String>("name")], |args| {
            Ok(Company {
                name: args.take()?,
                ..Company::default()
            })
        })
        .property("name", |c: &Company| c.name.clone(), |c, v| c.name = v)
        .property("address", |c: &Company| c.address.clone(), |c, v| c.address = v)
        .property("staff", |c: &Company| c.staff.clone(), |c, v| c.staff = v)
        .build()
}

pub fn node_blueprint() -> Blueprint {
    Blueprint::of::<Node>()
        .default_constructor()
        .property("label", |n: &Node| n.label.clone(), |n, v| n.label = v)
        .property("next", |n: &Node| n.next.clone(), |n, v| n.next = v)
        .build()
}

pub fn singleton_blueprint() -> Blueprint {
    Blueprint::of::<Singleton>()
        .private_constructor([], |_| Ok(Singleton::default()))
        .constructor([param::<Singleton>("other")], |args| args.take::<Singleton>())
        .property("id", |s: &Singleton| s.id, |s, v| s.id = v)
        .build()
}

/// Text named after the reference being built, e.g. `street-417`.
pub struct TextGenerator;

impl ValueGenerator for TextGenerator {
    fn id(&self) -> &'static str {
        "test-text"
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<String>()
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> Result<Value> {
        let prefix = ctx.reference_name.unwrap_or("text");
        Ok(Value::Text(format!("{prefix}-{}", rng.next_u32() % 1000)))
    }
}

/// Integers between 1 and 100, never the zero default.
pub struct IntGenerator;

impl ValueGenerator for IntGenerator {
    fn id(&self) -> &'static str {
        "test-int"
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is_integer()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> Result<Value> {
        Ok(Value::Int(i64::from(rng.next_u32() % 100) + 1))
    }
}

/// Records the reference name of every string it generates.
#[derive(Clone, Default)]
pub struct RecordingGenerator {
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingGenerator {
    pub fn names(&self) -> Vec<String> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl ValueGenerator for RecordingGenerator {
    fn id(&self) -> &'static str {
        "test-recording"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<String>()
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, _rng: &mut dyn RngCore) -> Result<Value> {
        let name = ctx.reference_name.unwrap_or_default().to_string();
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(name.clone());
        }
        Ok(Value::Text(name))
    }
}

/// Blueprints, stub generators and the built-in creators.
pub fn builder() -> ConfigurationBuilder {
    let builder = ConfigurationBuilder::new()
        .register(address_blueprint())
        .register(person_blueprint())
        .register(company_blueprint())
        .register(node_blueprint())
        .register(singleton_blueprint())
        .value_generator(TextGenerator)
        .value_generator(IntGenerator)
        .seed(7);
    creators::register(builder)
}
