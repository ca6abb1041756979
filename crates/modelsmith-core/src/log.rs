//! Human readable trace of a single build.
//!
//! The build log is separate from `tracing`: it records every step of the
//! current root build as an indented tree and is attached to failures so a
//! broken graph can be diagnosed after the fact.

use std::fmt::Write as _;

use crate::error::BuildError;
use crate::types::TypeRef;
use crate::value::Instance;

pub trait BuildLog {
    fn creating_type(&mut self, type_ref: TypeRef, implemented_by: &str);

    fn created_type(&mut self, type_ref: TypeRef);

    /// Closes a `creating_type` entry whose build failed.
    fn failed_type(&mut self, type_ref: TypeRef);

    fn creating_value(&mut self, type_ref: TypeRef, implemented_by: &str);

    fn create_property(&mut self, type_ref: TypeRef, name: &str);

    fn create_parameter(&mut self, type_ref: TypeRef, name: &str);

    fn populating_instance(&mut self, instance: &Instance);

    fn populated_instance(&mut self, instance: &Instance);

    /// Closes a `populating_instance` entry whose build failed.
    fn failed_populating(&mut self, instance: &Instance);

    fn mapped_type(&mut self, source: TypeRef, target: TypeRef);

    fn circular_reference_detected(&mut self, type_ref: TypeRef);

    fn ignoring_property(&mut self, type_ref: TypeRef, name: &str, reason: &str);

    fn post_build_action(&mut self, type_ref: TypeRef, action: &str);

    fn build_failure(&mut self, error: &BuildError);

    fn output(&self) -> String;

    fn clear(&mut self);

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Indented in-memory log.
#[derive(Debug, Default)]
pub struct DefaultBuildLog {
    buffer: String,
    indent: usize,
}

impl DefaultBuildLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, message: std::fmt::Arguments<'_>) {
        for _ in 0..self.indent {
            self.buffer.push_str("    ");
        }
        let _ = self.buffer.write_fmt(message);
        self.buffer.push('\n');
    }

    fn outdent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }
}

impl BuildLog for DefaultBuildLog {
    fn creating_type(&mut self, type_ref: TypeRef, implemented_by: &str) {
        self.line(format_args!("Start creating type {type_ref} using {implemented_by}"));
        self.indent += 1;
    }

    fn created_type(&mut self, type_ref: TypeRef) {
        self.outdent();
        self.line(format_args!("End creating type {type_ref}"));
    }

    fn failed_type(&mut self, type_ref: TypeRef) {
        self.outdent();
        self.line(format_args!("Failed creating type {type_ref}"));
    }

    fn creating_value(&mut self, type_ref: TypeRef, implemented_by: &str) {
        self.line(format_args!("Creating {type_ref} value using {implemented_by}"));
    }

    fn create_property(&mut self, type_ref: TypeRef, name: &str) {
        self.line(format_args!("Creating property {name} ({type_ref})"));
    }

    fn create_parameter(&mut self, type_ref: TypeRef, name: &str) {
        self.line(format_args!("Creating constructor parameter {name} ({type_ref})"));
    }

    fn populating_instance(&mut self, instance: &Instance) {
        self.line(format_args!("Start populating instance {}", instance.type_ref()));
        self.indent += 1;
    }

    fn populated_instance(&mut self, instance: &Instance) {
        self.outdent();
        self.line(format_args!("End populating instance {}", instance.type_ref()));
    }

    fn failed_populating(&mut self, instance: &Instance) {
        self.outdent();
        self.line(format_args!("Failed populating instance {}", instance.type_ref()));
    }

    fn mapped_type(&mut self, source: TypeRef, target: TypeRef) {
        self.line(format_args!("Mapped {source} to {target}"));
    }

    fn circular_reference_detected(&mut self, type_ref: TypeRef) {
        self.line(format_args!(
            "Circular reference detected for {type_ref}, reusing the instance under construction"
        ));
    }

    fn ignoring_property(&mut self, type_ref: TypeRef, name: &str, reason: &str) {
        self.line(format_args!("Ignoring property {name} ({type_ref}): {reason}"));
    }

    fn post_build_action(&mut self, type_ref: TypeRef, action: &str) {
        self.line(format_args!("Running post-build action {action} on {type_ref}"));
    }

    fn build_failure(&mut self, error: &BuildError) {
        self.line(format_args!("Build failed: {error}"));
    }

    fn output(&self) -> String {
        self.buffer.clone()
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.indent = 0;
    }
}

/// Log that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBuildLog;

impl BuildLog for NullBuildLog {
    fn creating_type(&mut self, _type_ref: TypeRef, _implemented_by: &str) {}

    fn created_type(&mut self, _type_ref: TypeRef) {}

    fn failed_type(&mut self, _type_ref: TypeRef) {}

    fn creating_value(&mut self, _type_ref: TypeRef, _implemented_by: &str) {}

    fn create_property(&mut self, _type_ref: TypeRef, _name: &str) {}

    fn create_parameter(&mut self, _type_ref: TypeRef, _name: &str) {}

    fn populating_instance(&mut self, _instance: &Instance) {}

    fn populated_instance(&mut self, _instance: &Instance) {}

    fn failed_populating(&mut self, _instance: &Instance) {}

    fn mapped_type(&mut self, _source: TypeRef, _target: TypeRef) {}

    fn circular_reference_detected(&mut self, _type_ref: TypeRef) {}

    fn ignoring_property(&mut self, _type_ref: TypeRef, _name: &str, _reason: &str) {}

    fn post_build_action(&mut self, _type_ref: TypeRef, _action: &str) {}

    fn build_failure(&mut self, _error: &BuildError) {}

    fn output(&self) -> String {
        String::new()
    }

    fn clear(&mut self) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_entries_are_indented() {
        let mut log = DefaultBuildLog::new();
        log.creating_type(TypeRef::of::<String>(), "outer");
        log.create_parameter(TypeRef::of::<i32>(), "count");
        log.created_type(TypeRef::of::<String>());

        let output = log.output();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("    Creating constructor parameter count"));
        assert!(lines[2].starts_with("End creating type String"));

        log.clear();
        assert!(log.output().is_empty());
    }

    #[test]
    fn failed_entries_close_their_indent() {
        let mut log = DefaultBuildLog::new();
        log.creating_type(TypeRef::of::<String>(), "outer");
        log.creating_type(TypeRef::of::<i32>(), "inner");
        log.failed_type(TypeRef::of::<i32>());
        log.failed_type(TypeRef::of::<String>());
        log.mapped_type(TypeRef::of::<u8>(), TypeRef::of::<u16>());

        let output = log.output();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], "    Failed creating type i32");
        assert_eq!(lines[3], "Failed creating type String");
        assert!(lines[4].starts_with("Mapped u8"));
    }

    #[test]
    fn null_log_is_disabled() {
        let mut log = NullBuildLog;
        log.creating_type(TypeRef::of::<String>(), "outer");
        assert!(!log.is_enabled());
        assert!(log.output().is_empty());
    }
}
