use std::any::{Any, type_name};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::blueprint::TypeRegistry;
use crate::error::{BuildError, Result};
use crate::types::TypeRef;

/// Dynamically typed value produced during a build.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned integer above `i64::MAX`; smaller ones are always `Int`.
    UInt(u64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    List(Vec<Value>),
    Object(Instance),
}

impl Value {
    /// Default value for a type: zero for value types, null otherwise.
    pub fn default_for(type_ref: TypeRef) -> Value {
        if !type_ref.is_value_type() {
            return Value::Null;
        }
        if type_ref.is_integer() {
            Value::Int(0)
        } else if type_ref.is_float() {
            Value::Float(0.0)
        } else if type_ref.is::<bool>() {
            Value::Bool(false)
        } else if type_ref.is::<Uuid>() {
            Value::Uuid(Uuid::nil())
        } else if type_ref.is::<NaiveDate>() {
            Value::Date(NaiveDate::default())
        } else if type_ref.is::<NaiveTime>() {
            Value::Time(NaiveTime::default())
        } else if type_ref.is::<NaiveDateTime>() {
            Value::Timestamp(NaiveDateTime::default())
        } else {
            Value::Null
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True when this value is the zero value of the given value type.
    pub fn is_default_for(&self, type_ref: TypeRef) -> bool {
        type_ref.is_value_type() && *self == Value::default_for(type_ref)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Short description used in diagnostics, e.g. `int` or `object Person`.
    pub fn describe(&self) -> String {
        match self {
            Value::Object(instance) => format!("object {}", instance.type_ref()),
            other => other.kind().to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::UInt(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(value) => u64::try_from(*value).ok(),
            Value::UInt(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::UInt(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Whether this value can be passed where `target` is expected.
    pub fn is_assignable_to(&self, target: TypeRef, types: &TypeRegistry) -> bool {
        match self {
            Value::Null => target.is_nullable() || target.element().is_some(),
            Value::Bool(_) => target.is::<bool>(),
            Value::Int(_) | Value::UInt(_) => target.is_integer() || target.is_float(),
            Value::Float(_) => target.is_float(),
            Value::Text(_) => target.is::<String>(),
            Value::Uuid(_) => target.is::<Uuid>(),
            Value::Date(_) => target.is::<NaiveDate>(),
            Value::Time(_) => target.is::<NaiveTime>(),
            Value::Timestamp(_) => target.is::<NaiveDateTime>(),
            Value::List(_) => target.element().is_some(),
            Value::Object(instance) => types.is_assignable(instance.type_ref(), target),
        }
    }
}

/// Object types stored behind an [`Instance`].
///
/// Implemented for every `Clone + PartialEq + Debug` type so blueprints can
/// compare and snapshot instances without knowing their concrete type.
pub trait Model: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_model(&self) -> Box<dyn Model>;
    fn eq_model(&self, other: &dyn Model) -> bool;
}

impl<T> Model for T
where
    T: Any + Clone + PartialEq + fmt::Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_model(&self) -> Box<dyn Model> {
        Box::new(self.clone())
    }

    fn eq_model(&self, other: &dyn Model) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// Shared handle to an object under construction or fully built.
#[derive(Clone)]
pub struct Instance {
    type_ref: TypeRef,
    inner: Rc<RefCell<Box<dyn Model>>>,
}

impl Instance {
    pub fn new<T: Model>(value: T) -> Self {
        Self {
            type_ref: TypeRef::of::<T>(),
            inner: Rc::new(RefCell::new(Box::new(value))),
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn read<R>(&self, f: impl FnOnce(&dyn Model) -> R) -> R {
        let guard = self.inner.borrow();
        f(&**guard)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut dyn Model) -> R) -> R {
        let mut guard = self.inner.borrow_mut();
        f(&mut **guard)
    }

    /// Runs `f` against the concrete object when it is a `T`.
    pub fn with<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.read(|model| model.as_any().downcast_ref::<T>().map(f))
    }

    pub fn with_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.write(|model| model.as_any_mut().downcast_mut::<T>().map(f))
    }

    /// Deep copy detached from every other handle.
    pub fn snapshot(&self) -> Instance {
        let copy = self.read(|model| model.clone_model());
        Instance {
            type_ref: self.type_ref,
            inner: Rc::new(RefCell::new(copy)),
        }
    }

    /// Moves the object out when this is the last handle, cloning otherwise.
    pub fn extract<T: Model + Clone>(self) -> Result<T> {
        let type_ref = self.type_ref;
        match Rc::try_unwrap(self.inner) {
            Ok(cell) => cell
                .into_inner()
                .into_any()
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| type_mismatch::<T>(&format!("object {type_ref}"))),
            Err(shared) => {
                let guard = shared.borrow();
                guard
                    .as_any()
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| type_mismatch::<T>(&format!("object {type_ref}")))
            }
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.type_ref != other.type_ref {
            return false;
        }
        match (self.inner.try_borrow(), other.inner.try_borrow()) {
            (Ok(left), Ok(right)) => left.eq_model(&**right),
            _ => false,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(model) => write!(f, "Instance({model:?})"),
            Err(_) => write!(f, "Instance({} <in use>)", self.type_ref),
        }
    }
}

/// Conversion between Rust types and [`Value`].
pub trait ValueType: Sized + 'static {
    fn type_ref() -> TypeRef;
    fn from_value(value: Value) -> Result<Self>;
    fn to_value(&self) -> Value;
}

fn type_mismatch<T>(found: &str) -> BuildError {
    BuildError::InvalidValue(format!("expected {} but found {found}", type_name::<T>()))
}

macro_rules! integer_value_type {
    ($($ty:ty => $to_value:expr),* $(,)?) => {
        $(
            impl ValueType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::of::<$ty>()
                }

                fn from_value(value: Value) -> Result<Self> {
                    let converted = match &value {
                        Value::Int(raw) => <$ty>::try_from(*raw).ok(),
                        Value::UInt(raw) => <$ty>::try_from(*raw).ok(),
                        other => return Err(type_mismatch::<$ty>(other.kind())),
                    };
                    converted.ok_or_else(|| {
                        BuildError::InvalidValue(format!(
                            "{value:?} is out of range for {}",
                            stringify!($ty)
                        ))
                    })
                }

                fn to_value(&self) -> Value {
                    let to_value: fn($ty) -> Value = $to_value;
                    to_value(*self)
                }
            }
        )*
    };
}

fn signed_value(raw: i64) -> Value {
    Value::Int(raw)
}

fn unsigned_value(raw: u64) -> Value {
    i64::try_from(raw).map_or(Value::UInt(raw), Value::Int)
}

integer_value_type!(
    i8 => |raw| signed_value(i64::from(raw)),
    i16 => |raw| signed_value(i64::from(raw)),
    i32 => |raw| signed_value(i64::from(raw)),
    i64 => signed_value,
    isize => |raw| signed_value(raw as i64),
    u8 => |raw| unsigned_value(u64::from(raw)),
    u16 => |raw| unsigned_value(u64::from(raw)),
    u32 => |raw| unsigned_value(u64::from(raw)),
    u64 => unsigned_value,
    usize => |raw| unsigned_value(raw as u64),
);

impl ValueType for f64 {
    fn type_ref() -> TypeRef {
        TypeRef::of::<f64>()
    }

    fn from_value(value: Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| type_mismatch::<f64>(value.kind()))
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ValueType for f32 {
    fn type_ref() -> TypeRef {
        TypeRef::of::<f32>()
    }

    fn from_value(value: Value) -> Result<Self> {
        value
            .as_f64()
            .map(|raw| raw as f32)
            .ok_or_else(|| type_mismatch::<f32>(value.kind()))
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

macro_rules! plain_value_type {
    ($ty:ty, $variant:ident) => {
        impl ValueType for $ty {
            fn type_ref() -> TypeRef {
                TypeRef::of::<$ty>()
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(type_mismatch::<$ty>(other.kind())),
                }
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }
    };
}

plain_value_type!(bool, Bool);
plain_value_type!(String, Text);
plain_value_type!(Uuid, Uuid);
plain_value_type!(NaiveDate, Date);
plain_value_type!(NaiveTime, Time);
plain_value_type!(NaiveDateTime, Timestamp);

impl<T: ValueType> ValueType for Option<T> {
    fn type_ref() -> TypeRef {
        T::type_ref().nullable()
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map(T::to_value).unwrap_or(Value::Null)
    }
}

impl<T: ValueType> ValueType for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ValueType> ValueType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::sequence_of::<Vec<T>>(T::type_ref)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(type_mismatch::<Vec<T>>(other.kind())),
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }
}

/// Extracts an object of type `T` from a [`Value::Object`].
pub fn object_from_value<T: Model + Clone>(value: Value) -> Result<T> {
    match value {
        Value::Object(instance) => instance.extract::<T>(),
        other => Err(type_mismatch::<T>(&other.describe())),
    }
}

/// Implements [`ValueType`] for model structs so they can be used as
/// properties, constructor parameters and typed build results.
#[macro_export]
macro_rules! object_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ValueType for $ty {
                fn type_ref() -> $crate::TypeRef {
                    $crate::TypeRef::of::<$ty>()
                }

                fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                    $crate::value::object_from_value::<$ty>(value)
                }

                fn to_value(&self) -> $crate::Value {
                    $crate::Value::Object($crate::Instance::new(::std::clone::Clone::clone(self)))
                }
            }
        )+
    };
}
