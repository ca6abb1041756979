use rand::RngCore;

use crate::blueprint::ConstructorCall;
use crate::capability::BuildTarget;
use crate::config::BuildConfiguration;
use crate::error::Result;
use crate::history::BuildHistory;
use crate::strategy::ExecuteStrategy;
use crate::types::TypeRef;
use crate::value::{Instance, Value};

/// What is being built and where, handed to generators, creators and rules.
#[derive(Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub configuration: &'a BuildConfiguration,
    pub history: &'a BuildHistory,
    pub type_ref: TypeRef,
    pub reference_name: Option<&'a str>,
    pub declaring_type: Option<TypeRef>,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(
        configuration: &'a BuildConfiguration,
        history: &'a BuildHistory,
        target: &BuildTarget<'a>,
    ) -> Self {
        Self {
            configuration,
            history,
            type_ref: target.type_ref(),
            reference_name: target.reference_name(),
            declaring_type: target.declaring_type(),
        }
    }

    /// Same context with another requested type.
    pub fn with_type(self, type_ref: TypeRef) -> Self {
        Self { type_ref, ..self }
    }

    /// Instance currently being populated, if any.
    pub fn parent(&self) -> Option<&'a Instance> {
        self.history.first()
    }

    /// Value of a property on the instance being populated.
    ///
    /// Names compare case-insensitively with `_` ignored, so `first_name`
    /// finds `FirstName`.
    pub fn sibling(&self, name: &str) -> Option<Value> {
        let parent = self.parent()?;
        let blueprint = self.configuration.types().get(parent.type_ref())?;
        let wanted = normalize_name(name);
        blueprint
            .properties()
            .iter()
            .find(|property| normalize_name(property.name()) == wanted)
            .and_then(|property| property.get(parent))
    }

    pub fn sibling_text(&self, name: &str) -> Option<String> {
        match self.sibling(name)? {
            Value::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// True when the reference name matches one of `names`, using the same
    /// normalization as [`GeneratorContext::sibling`].
    pub fn name_is(&self, names: &[&str]) -> bool {
        self.reference_name.is_some_and(|reference| {
            let reference = normalize_name(reference);
            names.iter().any(|name| normalize_name(name) == reference)
        })
    }

    /// True when the reference name contains one of `fragments`.
    pub fn name_contains(&self, fragments: &[&str]) -> bool {
        self.reference_name.is_some_and(|reference| {
            let reference = normalize_name(reference);
            fragments
                .iter()
                .any(|fragment| reference.contains(&normalize_name(fragment)))
        })
    }
}

pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Leaf producer of values for simple types.
pub trait ValueGenerator: Send + Sync {
    fn id(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool;

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> Result<Value>;
}

/// Producer of composite values that may recurse through the strategy.
pub trait TypeCreator: Send + Sync {
    fn id(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    /// `ctx.type_ref` is the build type after type mapping.
    fn is_match(&self, ctx: &GeneratorContext<'_>) -> bool;

    fn supports_create(&self) -> bool {
        true
    }

    fn supports_populate(&self) -> bool {
        true
    }

    fn auto_detect_constructor(&self) -> bool {
        true
    }

    fn auto_populate(&self) -> bool {
        true
    }

    /// `call` is set when the strategy already picked the constructor of a
    /// registered blueprint; `args` then holds its arguments. Without a
    /// call, `args` are explicit values the creator interprets itself.
    fn create(
        &self,
        strategy: &mut ExecuteStrategy,
        type_ref: TypeRef,
        reference_name: Option<&str>,
        args: Option<&[Value]>,
        call: Option<&ConstructorCall>,
    ) -> Result<Value>;

    fn populate(&self, strategy: &mut ExecuteStrategy, instance: Value) -> Result<Value>;
}
