//! PropertyAdapter: the leaf of every pipeline.
//!
//! Reads a property off its host each tick and compares it with the last
//! value it saw. Only a difference is reported as `Changed`. A write through
//! the adapter updates that cached value too, so the next read of the same
//! value is `NotChanged` and a two-way binding never echoes its own writes.

use crate::pipeline::error::{ConversionError, PipelineError, PipelineResult, WiringError};
use crate::pipeline::node::{BindingDirection, Node, TickContext};
use crate::source::{Property, PropertyHost};
use crate::types::{Polled, Value, ValueType};

/// Leaf node reading (and optionally writing) one host property.
pub struct PropertyAdapter {
    host: String,
    property: Property,
    direction: BindingDirection,
    cached: Option<Value>,
}

impl PropertyAdapter {
    /// Resolve `name` on `host`. Missing, unreadable, or (for two-way
    /// bindings) unwritable properties fail here rather than on first poll.
    pub fn new(
        host: &dyn PropertyHost,
        name: &str,
        direction: BindingDirection,
    ) -> Result<Self, WiringError> {
        let property = host
            .property(name)
            .ok_or_else(|| WiringError::MissingProperty {
                host: host.type_name().to_string(),
                property: name.to_string(),
            })?;
        Self::from_property(host.type_name(), property, direction)
    }

    /// Wrap an accessor obtained some other way.
    pub fn from_property(
        host: &str,
        property: Property,
        direction: BindingDirection,
    ) -> Result<Self, WiringError> {
        if !property.is_readable() {
            return Err(WiringError::Unreadable {
                host: host.to_string(),
                property: property.name().to_string(),
            });
        }
        if direction.is_two_way() && !property.is_writable() {
            return Err(WiringError::Unwritable {
                host: host.to_string(),
                property: property.name().to_string(),
            });
        }

        tracing::debug!(
            "Property adapter for {}.{} ({}, {:?})",
            host,
            property.name(),
            property.value_type(),
            direction
        );

        Ok(Self {
            host: host.to_string(),
            property,
            direction,
            cached: None,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Last value read from or written to the host.
    pub fn cached(&self) -> Option<&Value> {
        self.cached.as_ref()
    }
}

impl Node for PropertyAdapter {
    fn name(&self) -> &str {
        self.property.name()
    }

    fn input_type(&self) -> ValueType {
        self.property.value_type()
    }

    fn output_type(&self) -> ValueType {
        self.property.value_type()
    }

    fn is_two_way(&self) -> bool {
        self.direction.is_two_way() && self.property.is_writable()
    }

    fn try_get_value(&mut self, _ctx: &TickContext) -> PipelineResult<Polled<Value>> {
        let Some(value) = self.property.get() else {
            return Err(WiringError::Unreadable {
                host: self.host.clone(),
                property: self.property.name().to_string(),
            }
            .into());
        };

        if self
            .cached
            .as_ref()
            .is_some_and(|cached| cached.is_same(&value))
        {
            return Ok(Polled::NotChanged);
        }

        tracing::trace!("{}.{} -> {}", self.host, self.property.name(), value);
        self.cached = Some(value.clone());
        Ok(Polled::Changed(value))
    }

    fn set_value(&mut self, value: Value) -> PipelineResult<()> {
        if !self.is_two_way() {
            return Err(PipelineError::ReadOnly {
                stage: self.property.name().to_string(),
            });
        }
        let expected = self.property.value_type();
        if !expected.accepts(&value) {
            return Err(ConversionError::PayloadMismatch {
                expected,
                actual: value.value_type(),
            }
            .into());
        }

        // Writing back what we already hold would only feed the next read.
        if self
            .cached
            .as_ref()
            .is_some_and(|cached| cached.is_same(&value))
        {
            return Ok(());
        }

        self.property
            .set(value.clone())
            .map_err(|message| PipelineError::HostWrite {
                property: self.property.name().to_string(),
                message,
            })?;
        self.cached = Some(value);
        Ok(())
    }

    fn upstream(&self) -> Option<&dyn Node> {
        None
    }
}
