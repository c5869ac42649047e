//! PropertyBag: an in-memory, shared property host.
//!
//! Handles are cheap clones over the same storage, so the application can
//! keep one handle to mutate values while pipelines read through another.
//! Entries are never removed, which lets accessors index storage directly.

use super::{Property, PropertyHost};
use crate::pipeline::error::PipelineError;
use crate::types::{Value, ValueType};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
struct Entry {
    name: String,
    value: Value,
    value_type: ValueType,
    readable: bool,
    writable: bool,
    /// Writes that came in through a pipeline setter.
    binding_writes: u64,
}

#[derive(Debug, Default)]
struct BagInner {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

/// Shared in-memory host object.
#[derive(Debug, Clone)]
pub struct PropertyBag {
    type_name: Rc<str>,
    inner: Rc<RefCell<BagInner>>,
}

impl PropertyBag {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: Rc::from(type_name),
            inner: Rc::new(RefCell::new(BagInner::default())),
        }
    }

    /// Declare a readable and writable property. Redefining replaces the value.
    pub fn define(self, name: &str, initial: impl Into<Value>) -> Self {
        self.insert(name, initial.into(), true, true)
    }

    pub fn define_read_only(self, name: &str, initial: impl Into<Value>) -> Self {
        self.insert(name, initial.into(), true, false)
    }

    pub fn define_write_only(self, name: &str, initial: impl Into<Value>) -> Self {
        self.insert(name, initial.into(), false, true)
    }

    fn insert(self, name: &str, value: Value, readable: bool, writable: bool) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            let entry = Entry {
                name: name.to_string(),
                value_type: value.value_type(),
                value,
                readable,
                writable,
                binding_writes: 0,
            };
            match inner.index.get(name).copied() {
                Some(idx) => inner.entries[idx] = entry,
                None => {
                    let idx = inner.entries.len();
                    inner.entries.push(entry);
                    inner.index.insert(name.to_string(), idx);
                }
            }
        }
        self
    }

    /// Current value, regardless of the property's access flags.
    pub fn get(&self, name: &str) -> Option<Value> {
        let inner = self.inner.borrow();
        inner
            .index
            .get(name)
            .map(|&idx| inner.entries[idx].value.clone())
    }

    /// Set a value from the application side.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), PipelineError> {
        let value = value.into();
        let mut inner = self.inner.borrow_mut();
        let idx = inner
            .index
            .get(name)
            .copied()
            .ok_or_else(|| PipelineError::HostWrite {
                property: name.to_string(),
                message: "no such property".to_string(),
            })?;
        let entry = &mut inner.entries[idx];
        if !entry.value_type.accepts(&value) {
            return Err(PipelineError::HostWrite {
                property: name.to_string(),
                message: format!("expected {}, got {}", entry.value_type, value.value_type()),
            });
        }
        entry.value = value;
        Ok(())
    }

    /// Number of writes that arrived through pipeline setters.
    pub fn binding_writes(&self, name: &str) -> u64 {
        let inner = self.inner.borrow();
        inner
            .index
            .get(name)
            .map(|&idx| inner.entries[idx].binding_writes)
            .unwrap_or(0)
    }

    pub fn names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }
}

impl PropertyHost for PropertyBag {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn property(&self, name: &str) -> Option<Property> {
        let inner = self.inner.borrow();
        let idx = *inner.index.get(name)?;
        let entry = &inner.entries[idx];
        let mut property = Property::new(name, entry.value_type);

        if entry.readable {
            let storage = self.inner.clone();
            property =
                property.with_getter(move || storage.borrow().entries[idx].value.clone());
        }
        if entry.writable {
            let storage = self.inner.clone();
            property = property.with_setter(move |value| {
                let mut inner = storage.borrow_mut();
                let entry = &mut inner.entries[idx];
                if !entry.value_type.accepts(&value) {
                    return Err(format!(
                        "expected {}, got {}",
                        entry.value_type,
                        value.value_type()
                    ));
                }
                entry.value = value;
                entry.binding_writes += 1;
                Ok(())
            });
        }
        Some(property)
    }
}
