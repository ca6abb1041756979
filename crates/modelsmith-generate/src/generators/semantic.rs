//! Generators that pick realistic values from the reference name.

use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, CountryName, PostCode, StreetName};
use fake::faker::internet::en::DomainSuffix;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use modelsmith_core::{ConfigurationBuilder, GeneratorContext, Result, Value, ValueGenerator};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::{SEMANTIC_PRIORITY, generator_error, slugify};

const GENDERS: &[&str] = &["Female", "Male", "Non-binary"];
const MIN_AGE: i64 = 18;
const MAX_AGE: i64 = 80;

pub fn register(builder: ConfigurationBuilder) -> ConfigurationBuilder {
    builder
        .value_generator(FirstNameGenerator)
        .value_generator(LastNameGenerator)
        .value_generator(GenderGenerator)
        .value_generator(DomainGenerator)
        .value_generator(EmailGenerator)
        .value_generator(PhoneGenerator)
        .value_generator(StreetGenerator)
        .value_generator(CityGenerator)
        .value_generator(PostcodeGenerator)
        .value_generator(CountryGenerator)
        .value_generator(AgeGenerator)
}

fn is_text(ctx: &GeneratorContext<'_>) -> bool {
    ctx.type_ref.is::<String>()
}

fn first_name(rng: &mut dyn rand::RngCore) -> String {
    FirstName().fake_with_rng(rng)
}

fn last_name(rng: &mut dyn rand::RngCore) -> String {
    LastName().fake_with_rng(rng)
}

fn domain(rng: &mut dyn rand::RngCore) -> String {
    let word: String = Word().fake_with_rng(rng);
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    format!("{}.{suffix}", slugify(&word))
}

pub struct FirstNameGenerator;

impl ValueGenerator for FirstNameGenerator {
    fn id(&self) -> &'static str {
        "semantic.first_name"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["first_name", "given_name", "forename"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        Ok(Value::Text(first_name(rng)))
    }
}

pub struct LastNameGenerator;

impl ValueGenerator for LastNameGenerator {
    fn id(&self) -> &'static str {
        "semantic.last_name"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["last_name", "surname", "family_name"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        Ok(Value::Text(last_name(rng)))
    }
}

pub struct GenderGenerator;

impl ValueGenerator for GenderGenerator {
    fn id(&self) -> &'static str {
        "semantic.gender"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["gender", "sex"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        GENDERS
            .choose(rng)
            .map(|gender| Value::Text((*gender).to_string()))
            .ok_or_else(|| generator_error(self.id(), "no genders to choose from"))
    }
}

pub struct DomainGenerator;

impl ValueGenerator for DomainGenerator {
    fn id(&self) -> &'static str {
        "semantic.domain"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["domain", "domain_name", "host"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        Ok(Value::Text(domain(rng)))
    }
}

/// Builds `first.last@domain` from sibling values when the owner already
/// has them, so an email agrees with the name next to it.
pub struct EmailGenerator;

impl ValueGenerator for EmailGenerator {
    fn id(&self) -> &'static str {
        "semantic.email"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_contains(&["email"])
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let first = ctx
            .sibling_text("first_name")
            .unwrap_or_else(|| first_name(rng));
        let last = ctx
            .sibling_text("last_name")
            .unwrap_or_else(|| last_name(rng));
        let domain = ctx.sibling_text("domain").unwrap_or_else(|| domain(rng));
        Ok(Value::Text(format!(
            "{}.{}@{domain}",
            slugify(&first),
            slugify(&last)
        )))
    }
}

pub struct PhoneGenerator;

impl ValueGenerator for PhoneGenerator {
    fn id(&self) -> &'static str {
        "semantic.phone"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_contains(&["phone", "mobile"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let phone: String = PhoneNumber().fake_with_rng(rng);
        Ok(Value::Text(phone))
    }
}

pub struct StreetGenerator;

impl ValueGenerator for StreetGenerator {
    fn id(&self) -> &'static str {
        "semantic.street"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["street", "address_line", "address_line1"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let number: String = BuildingNumber().fake_with_rng(rng);
        let street: String = StreetName().fake_with_rng(rng);
        Ok(Value::Text(format!("{number} {street}")))
    }
}

pub struct CityGenerator;

impl ValueGenerator for CityGenerator {
    fn id(&self) -> &'static str {
        "semantic.city"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["city", "town"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let city: String = CityName().fake_with_rng(rng);
        Ok(Value::Text(city))
    }
}

pub struct PostcodeGenerator;

impl ValueGenerator for PostcodeGenerator {
    fn id(&self) -> &'static str {
        "semantic.postcode"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["postcode", "post_code", "zip", "zip_code"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let code: String = PostCode().fake_with_rng(rng);
        Ok(Value::Text(code))
    }
}

pub struct CountryGenerator;

impl ValueGenerator for CountryGenerator {
    fn id(&self) -> &'static str {
        "semantic.country"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        is_text(ctx) && ctx.name_is(&["country"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let country: String = CountryName().fake_with_rng(rng);
        Ok(Value::Text(country))
    }
}

/// Adult ages for integer properties named `age`.
pub struct AgeGenerator;

impl ValueGenerator for AgeGenerator {
    fn id(&self) -> &'static str {
        "semantic.age"
    }

    fn priority(&self) -> i32 {
        SEMANTIC_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is_integer() && ctx.name_is(&["age"])
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        Ok(Value::Int(rng.random_range(MIN_AGE..=MAX_AGE)))
    }
}
