use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Instance;

/// Errors raised while resolving or building an object graph.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A required input was null.
    #[error("argument `{0}` must not be null")]
    ArgumentNull(&'static str),
    /// The operation is not valid in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// No constructor or member matches the request.
    #[error("missing member on {type_name}: {message}")]
    MissingMember { type_name: String, message: String },
    /// No build action knows how to build the target.
    #[error("not supported: {0}")]
    NotSupported(String),
    /// A value could not be converted to the requested type.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Nested builds went deeper than the configured limit.
    #[error("recursion limit of {limit} reached while building {type_name}")]
    RecursionLimit { limit: usize, type_name: String },
    /// A value generator or type creator reported a failure.
    #[error("generator '{id}' failed: {message}")]
    Generator { id: String, message: String },
    #[error("invalid options: {0}")]
    Options(#[from] toml::de::Error),
    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure wrapped with the build context where it first happened.
    #[error(transparent)]
    Build(Box<BuildFailure>),
}

impl BuildError {
    pub fn missing_member(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        BuildError::MissingMember {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Walks wrapped build failures down to the error that started them.
    pub fn root_cause(&self) -> &BuildError {
        match self {
            BuildError::Build(failure) => failure
                .source
                .as_deref()
                .map(BuildError::root_cause)
                .unwrap_or(self),
            _ => self,
        }
    }

    pub fn failure(&self) -> Option<&BuildFailure> {
        match self {
            BuildError::Build(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self.root_cause(), BuildError::NotSupported(_))
    }

    pub fn is_missing_member(&self) -> bool {
        matches!(self.root_cause(), BuildError::MissingMember { .. })
    }
}

/// Diagnostic record of a failed build.
///
/// The context instance is a live handle into the partially built graph and
/// is never serialized; a deserialized failure always has `context == None`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BuildFailure {
    pub message: String,
    pub target_type: Option<String>,
    pub reference_name: Option<String>,
    pub build_log: String,
    #[serde(skip)]
    pub context: Option<Instance>,
    #[serde(skip)]
    pub source: Option<Box<BuildError>>,
}

impl BuildFailure {
    pub fn new(
        message: impl Into<String>,
        target_type: Option<String>,
        reference_name: Option<String>,
        context: Option<Instance>,
        build_log: String,
        source: BuildError,
    ) -> Self {
        Self {
            message: message.into(),
            target_type,
            reference_name,
            build_log,
            context,
            source: Some(Box::new(source)),
        }
    }
}

impl std::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BuildFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Convenience alias for results returned by modelsmith crates.
pub type Result<T> = std::result::Result<T, BuildError>;
