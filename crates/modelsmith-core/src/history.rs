use std::collections::HashMap;

use crate::capability::BuildCapability;
use crate::error::{BuildError, Result};
use crate::types::TypeRef;
use crate::value::Instance;

#[derive(Debug)]
struct HistoryEntry {
    instance: Instance,
    capabilities: HashMap<TypeRef, BuildCapability>,
}

/// Stack of instances currently under construction.
///
/// Each entry also carries a type → capability cache that lives exactly as
/// long as the entry stays on the stack.
#[derive(Debug, Default)]
pub struct BuildHistory {
    entries: Vec<HistoryEntry>,
}

impl BuildHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instance: Instance) {
        self.entries.push(HistoryEntry {
            instance,
            capabilities: HashMap::new(),
        });
    }

    pub fn pop(&mut self) -> Result<Instance> {
        self.entries
            .pop()
            .map(|entry| entry.instance)
            .ok_or_else(|| BuildError::InvalidOperation("build history is empty".to_string()))
    }

    /// Most recently pushed instance.
    pub fn first(&self) -> Option<&Instance> {
        self.entries.last().map(|entry| &entry.instance)
    }

    /// Least recently pushed instance.
    pub fn last(&self) -> Option<&Instance> {
        self.entries.first().map(|entry| &entry.instance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Caches a capability against the current entry; no-op when empty.
    pub fn add_capability(&mut self, type_ref: TypeRef, capability: BuildCapability) {
        if let Some(entry) = self.entries.last_mut() {
            entry.capabilities.insert(type_ref, capability);
        }
    }

    pub fn get_capability(&self, type_ref: TypeRef) -> Option<&BuildCapability> {
        self.entries
            .last()
            .and_then(|entry| entry.capabilities.get(&type_ref))
    }

    /// Nearest instance of `type_ref` on the stack.
    pub fn find_type(&self, type_ref: TypeRef) -> Option<&Instance> {
        self.iter()
            .find(|instance| instance.type_ref().same_type(&type_ref))
    }

    /// Instances from most recent to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.entries.iter().rev().map(|entry| &entry.instance)
    }
}
