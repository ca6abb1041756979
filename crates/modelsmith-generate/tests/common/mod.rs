#![allow(dead_code)]

use modelsmith_core::{Blueprint, ConfigurationBuilder, object_type, param};

/// Contact whose properties are declared so that the email comes last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Immutable profile built entirely through its constructor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    email: String,
    domain: String,
    last_name: String,
    first_name: String,
    gender: String,
}

impl Profile {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Employee {
    pub full_name: String,
    pub age: i32,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Team {
    pub name: String,
    pub members: Vec<Employee>,
}

object_type!(Contact, Profile, Employee, Team);

pub fn contact_blueprint() -> Blueprint {
    Blueprint::of::<Contact>()
        .default_constructor()
        .property("first_name", |c: &Contact| c.first_name.clone(), |c, v| c.first_name = v)
        .property("last_name", |c: &Contact| c.last_name.clone(), |c, v| c.last_name = v)
        .property("email", |c: &Contact| c.email.clone(), |c, v| c.email = v)
        .property("phone", |c: &Contact| c.phone.clone(), |c, v| c.phone = v)
        .build()
}

pub fn profile_blueprint() -> Blueprint {
    Blueprint::of::<Profile>()
        .constructor(
            [
                param::<String>("email"),
                param::<String>("domain"),
                param::<String>("last_name"),
                param::<String>("first_name"),
                param::<String>("gender"),
            ],
            |args| {
                Ok(Profile {
                    email: args.take()?,
                    domain: args.take()?,
                    last_name: args.take()?,
                    first_name: args.take()?,
                    gender: args.take()?,
                })
            },
        )
        .read_only("email", |p: &Profile| p.email.clone())
        .read_only("domain", |p: &Profile| p.domain.clone())
        .read_only("last_name", |p: &Profile| p.last_name.clone())
        .read_only("first_name", |p: &Profile| p.first_name.clone())
        .read_only("gender", |p: &Profile| p.gender.clone())
        .build()
}

pub fn employee_blueprint() -> Blueprint {
    Blueprint::of::<Employee>()
        .default_constructor()
        .property("full_name", |e: &Employee| e.full_name.clone(), |e, v| e.full_name = v)
        .property("age", |e: &Employee| e.age, |e, v| e.age = v)
        .property("city", |e: &Employee| e.city.clone(), |e, v| e.city = v)
        .build()
}

pub fn team_blueprint() -> Blueprint {
    Blueprint::of::<Team>()
        .default_constructor()
        .constructor([param::<String>("name")], |args| {
            Ok(Team {
                name: args.take()?,
                ..Team::default()
            })
        })
        .property("name", |t: &Team| t.name.clone(), |t, v| t.name = v)
        .property("members", |t: &Team| t.members.clone(), |t, v| t.members = v)
        .build()
}

/// Bundled generators plus every fixture blueprint, seeded.
pub fn builder(seed: u64) -> ConfigurationBuilder {
    modelsmith_generate::default_builder()
        .register(contact_blueprint())
        .register(profile_blueprint())
        .register(employee_blueprint())
        .register(team_blueprint())
        .seed(seed)
}

pub fn slug(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}
