use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use fake::Fake;
use fake::faker::lorem::en::Word;
use modelsmith_core::{ConfigurationBuilder, GeneratorContext, Result, TypeRef, Value, ValueGenerator};
use rand::Rng;
use uuid::{Builder, Uuid};

use super::{PRIMITIVE_PRIORITY, generator_error};

const DEFAULT_INT_MAX: i64 = 1000;
const DEFAULT_FLOAT_MAX: f64 = 1000.0;
const DATE_SPAN_DAYS: u64 = 60 * 365;
const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

pub fn register(builder: ConfigurationBuilder) -> ConfigurationBuilder {
    builder
        .value_generator(BoolGenerator)
        .value_generator(IntegerGenerator)
        .value_generator(FloatGenerator)
        .value_generator(StringGenerator)
        .value_generator(UuidGenerator)
        .value_generator(DateGenerator)
        .value_generator(TimeGenerator)
        .value_generator(TimestampGenerator)
}

pub struct BoolGenerator;

impl ValueGenerator for BoolGenerator {
    fn id(&self) -> &'static str {
        "primitive.bool"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<bool>()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        Ok(Value::Bool(rng.random_bool(0.5)))
    }
}

/// Positive integers that fit every integer type.
pub struct IntegerGenerator;

impl IntegerGenerator {
    fn upper_bound(type_ref: TypeRef) -> i64 {
        if type_ref.is::<i8>() {
            i64::from(i8::MAX)
        } else if type_ref.is::<u8>() {
            i64::from(u8::MAX)
        } else {
            DEFAULT_INT_MAX
        }
    }
}

impl ValueGenerator for IntegerGenerator {
    fn id(&self) -> &'static str {
        "primitive.int"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is_integer()
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let max = Self::upper_bound(ctx.type_ref);
        Ok(Value::Int(rng.random_range(1..=max)))
    }
}

pub struct FloatGenerator;

impl ValueGenerator for FloatGenerator {
    fn id(&self) -> &'static str {
        "primitive.float"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is_float()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let raw: f64 = rng.random_range(0.0..DEFAULT_FLOAT_MAX);
        Ok(Value::Float((raw * 100.0).round() / 100.0))
    }
}

/// Fallback for strings no semantic generator claims.
pub struct StringGenerator;

impl ValueGenerator for StringGenerator {
    fn id(&self) -> &'static str {
        "primitive.string"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<String>()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let word: String = Word().fake_with_rng(rng);
        let suffix = rng.random_range(100..=999);
        Ok(Value::Text(format!("{word}{suffix}")))
    }
}

/// Version 4 UUIDs drawn from the build's random source.
pub struct UuidGenerator;

impl ValueGenerator for UuidGenerator {
    fn id(&self) -> &'static str {
        "primitive.uuid"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<Uuid>()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        Ok(Value::Uuid(Builder::from_random_bytes(bytes).into_uuid()))
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn random_date(id: &str, rng: &mut dyn rand::RngCore) -> Result<NaiveDate> {
    let offset = rng.random_range(0..=DATE_SPAN_DAYS);
    epoch()
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| generator_error(id, format!("date offset {offset} out of range")))
}

fn random_time(id: &str, rng: &mut dyn rand::RngCore) -> Result<NaiveTime> {
    let seconds = rng.random_range(0..SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .ok_or_else(|| generator_error(id, format!("{seconds} seconds is not a time of day")))
}

pub struct DateGenerator;

impl ValueGenerator for DateGenerator {
    fn id(&self) -> &'static str {
        "primitive.date"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<NaiveDate>()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        random_date(self.id(), rng).map(Value::Date)
    }
}

pub struct TimeGenerator;

impl ValueGenerator for TimeGenerator {
    fn id(&self) -> &'static str {
        "primitive.time"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<NaiveTime>()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        random_time(self.id(), rng).map(Value::Time)
    }
}

pub struct TimestampGenerator;

impl ValueGenerator for TimestampGenerator {
    fn id(&self) -> &'static str {
        "primitive.timestamp"
    }

    fn priority(&self) -> i32 {
        PRIMITIVE_PRIORITY
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool {
        ctx.type_ref.is::<NaiveDateTime>()
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn rand::RngCore) -> Result<Value> {
        let date = random_date(self.id(), rng)?;
        let time = random_time(self.id(), rng)?;
        Ok(Value::Timestamp(date.and_time(time)))
    }
}
