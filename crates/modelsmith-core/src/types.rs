use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

/// Runtime identity of a type taking part in a build.
///
/// Equality and hashing use the `TypeId` and the nullable flag; the name and
/// the element type are diagnostic metadata.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    nullable: bool,
    element: Option<fn() -> TypeRef>,
}

impl TypeRef {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            nullable: false,
            element: None,
        }
    }

    /// Sequence type `T` whose items are of the type returned by `element`.
    pub fn sequence_of<T: ?Sized + 'static>(element: fn() -> TypeRef) -> Self {
        Self {
            element: Some(element),
            ..Self::of::<T>()
        }
    }

    pub fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// The same type without the nullable flag.
    pub fn underlying(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn element(&self) -> Option<TypeRef> {
        self.element.map(|element| element())
    }

    /// True when the underlying type is `T`, ignoring nullability.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn same_type(&self, other: &TypeRef) -> bool {
        self.id == other.id
    }

    /// Value types default to a zero value instead of null.
    pub fn is_value_type(&self) -> bool {
        !self.nullable && (self.is_integer() || self.is_float() || self.is_plain_value())
    }

    pub fn is_integer(&self) -> bool {
        self.is::<i8>()
            || self.is::<i16>()
            || self.is::<i32>()
            || self.is::<i64>()
            || self.is::<isize>()
            || self.is::<u8>()
            || self.is::<u16>()
            || self.is::<u32>()
            || self.is::<u64>()
            || self.is::<usize>()
    }

    pub fn is_float(&self) -> bool {
        self.is::<f32>() || self.is::<f64>()
    }

    fn is_plain_value(&self) -> bool {
        self.is::<bool>()
            || self.is::<Uuid>()
            || self.is::<NaiveDate>()
            || self.is::<NaiveTime>()
            || self.is::<NaiveDateTime>()
    }

    /// Type name with module paths stripped, e.g. `Vec<Person>`.
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut segment = String::new();
        for ch in self.name.chars() {
            match ch {
                ':' => segment.clear(),
                '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                    out.push_str(&segment);
                    segment.clear();
                    out.push(ch);
                }
                _ => segment.push(ch),
            }
        }
        out.push_str(&segment);
        out
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.nullable == other.nullable
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.nullable.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({self})")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}
