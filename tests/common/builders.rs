//! Test data builders for creating test hosts and bindings

use propbind_rs::enum_value::{BindableEnum, IntWidth};
use propbind_rs::pipeline::{BindingSpec, ImplicitConversionRegistry, Pipeline, PipelineCompiler};
use propbind_rs::source::PropertyBag;
use propbind_rs::types::{Value, ValueType};

/// Builder for a `PropertyBag` standing in for a game object
pub struct HostBuilder {
    bag: PropertyBag,
}

impl HostBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            bag: PropertyBag::new(type_name),
        }
    }

    pub fn with(mut self, name: &str, initial: impl Into<Value>) -> Self {
        self.bag = self.bag.define(name, initial);
        self
    }

    pub fn with_read_only(mut self, name: &str, initial: impl Into<Value>) -> Self {
        self.bag = self.bag.define_read_only(name, initial);
        self
    }

    pub fn build(self) -> PropertyBag {
        self.bag
    }
}

/// Wire `spec` against `host` with the default implicit conversions
pub fn wire(host: &PropertyBag, spec: BindingSpec, sink_type: ValueType) -> Pipeline {
    try_wire(host, spec, sink_type).expect("binding should wire")
}

pub fn try_wire(
    host: &PropertyBag,
    spec: BindingSpec,
    sink_type: ValueType,
) -> Result<Pipeline, propbind_rs::WiringError> {
    let registry = ImplicitConversionRegistry::with_defaults();
    PipelineCompiler::new(&registry).compile(host, spec, sink_type)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Difficulty {
    Easy = 0,
    Normal = 1,
    Hard = 2,
}

impl BindableEnum for Difficulty {
    const NAME: &'static str = "Difficulty";
    const WIDTH: IntWidth = IntWidth::U8;

    fn to_repr(self) -> i64 {
        self as i64
    }

    fn from_repr(value: i64) -> Option<Self> {
        match value {
            0 => Some(Difficulty::Easy),
            1 => Some(Difficulty::Normal),
            2 => Some(Difficulty::Hard),
            _ => None,
        }
    }

    fn variant_name(value: i64) -> Option<&'static str> {
        match value {
            0 => Some("Easy"),
            1 => Some("Normal"),
            2 => Some("Hard"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel {
    Left = 0,
    Right = 1,
    Center = 2,
    Lfe = 3,
    Surround = 4,
    Rear = 5,
}

impl BindableEnum for Channel {
    const NAME: &'static str = "Channel";
    const WIDTH: IntWidth = IntWidth::I32;

    fn to_repr(self) -> i64 {
        self as i64
    }

    fn from_repr(value: i64) -> Option<Self> {
        match value {
            0 => Some(Channel::Left),
            1 => Some(Channel::Right),
            2 => Some(Channel::Center),
            3 => Some(Channel::Lfe),
            4 => Some(Channel::Surround),
            5 => Some(Channel::Rear),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_builder() {
        let bag = HostBuilder::new("Player")
            .with("health", 10.0f32)
            .with_read_only("name", "bob")
            .build();

        assert_eq!(bag.get("health"), Some(Value::Float(10.0)));
        assert_eq!(bag.names().len(), 2);
    }
}
