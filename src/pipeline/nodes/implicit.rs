//! Adapter spliced in by the wiring algorithm to bridge a type mismatch.

use crate::enum_value::EnumTag;
use crate::pipeline::cast;
use crate::pipeline::error::{ConversionError, PipelineError, PipelineResult, StaleStateError};
use crate::pipeline::node::{BoxedNode, Node, TickContext};
use crate::types::{Polled, Value, ValueType};

/// Converts every value read from upstream to a fixed target type.
///
/// Writes are converted back to the upstream type with the same rules. When
/// the upstream produces the generic `EnumValue` carrier the concrete enum
/// type is only known once a value has been read, so a write before the
/// first read fails with [`StaleStateError`].
pub struct ImplicitConversionNode {
    prev: BoxedNode,
    from: ValueType,
    to: ValueType,
    name: String,
    learned_tag: Option<EnumTag>,
}

impl ImplicitConversionNode {
    pub fn new(prev: BoxedNode, to: ValueType) -> Self {
        let from = prev.output_type();
        let learned_tag = match from {
            ValueType::Enum(tag) => Some(tag),
            _ => None,
        };
        Self {
            prev,
            from,
            to,
            name: format!("{} -> {}", from, to),
            learned_tag,
        }
    }

    pub fn boxed(prev: BoxedNode, to: ValueType) -> BoxedNode {
        Box::new(Self::new(prev, to))
    }

    fn upstream_type(&self) -> PipelineResult<ValueType> {
        match self.from {
            ValueType::EnumValue => match self.learned_tag {
                Some(tag) => Ok(ValueType::Enum(tag)),
                None => Err(StaleStateError {
                    stage: self.name.clone(),
                }
                .into()),
            },
            other => Ok(other),
        }
    }
}

impl Node for ImplicitConversionNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_type(&self) -> ValueType {
        self.from
    }

    fn output_type(&self) -> ValueType {
        self.to
    }

    fn is_two_way(&self) -> bool {
        self.prev.is_two_way()
    }

    fn is_implicit(&self) -> bool {
        true
    }

    fn try_get_value(&mut self, ctx: &TickContext) -> PipelineResult<Polled<Value>> {
        let polled = self.prev.try_get_value(ctx)?;
        let to = self.to;
        let learned_tag = &mut self.learned_tag;
        polled.try_map(|value| {
            if let Value::Enum(e) = &value {
                *learned_tag = Some(e.tag());
            }
            Ok(cast::convert(value, &to)?)
        })
    }

    fn set_value(&mut self, value: Value) -> PipelineResult<()> {
        if !self.prev.is_two_way() {
            return Err(PipelineError::ReadOnly {
                stage: self.name.clone(),
            });
        }
        if !self.to.accepts(&value) {
            return Err(ConversionError::PayloadMismatch {
                expected: self.to,
                actual: value.value_type(),
            }
            .into());
        }
        let upstream = self.upstream_type()?;
        let converted = cast::convert(value, &upstream)?;
        self.prev.set_value(converted)
    }

    fn upstream(&self) -> Option<&dyn Node> {
        Some(self.prev.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::node::BindingDirection;
    use crate::pipeline::nodes::PropertyAdapter;
    use crate::source::PropertyBag;

    fn ctx() -> TickContext {
        TickContext::new(0.016)
    }

    #[test]
    fn test_reads_are_converted() {
        let bag = PropertyBag::new("Sprite").define("alpha", 300i32);
        let adapter = PropertyAdapter::new(&bag, "alpha", BindingDirection::OneWay).unwrap();
        let mut node = ImplicitConversionNode::new(Box::new(adapter), ValueType::Byte);

        assert_eq!(node.name(), "int -> byte");
        assert!(node.is_implicit());
        assert_eq!(
            node.try_get_value(&ctx()).unwrap(),
            Polled::Changed(Value::Byte(255))
        );
        assert_eq!(node.try_get_value(&ctx()).unwrap(), Polled::NotChanged);
    }

    #[test]
    fn test_writes_are_converted_back() {
        let bag = PropertyBag::new("Sprite").define("alpha", 10i32);
        let adapter = PropertyAdapter::new(&bag, "alpha", BindingDirection::TwoWay).unwrap();
        let mut node = ImplicitConversionNode::new(Box::new(adapter), ValueType::Double);

        assert!(node.is_two_way());
        node.set_value(Value::Double(41.7)).unwrap();
        assert_eq!(bag.get("alpha"), Some(Value::Int(41)));
    }

    #[test]
    fn test_generic_enum_write_before_read_is_stale() {
        struct Carrier;
        impl Node for Carrier {
            fn name(&self) -> &str {
                "carrier"
            }
            fn input_type(&self) -> ValueType {
                ValueType::EnumValue
            }
            fn output_type(&self) -> ValueType {
                ValueType::EnumValue
            }
            fn is_two_way(&self) -> bool {
                true
            }
            fn try_get_value(&mut self, _ctx: &TickContext) -> PipelineResult<Polled<Value>> {
                Ok(Polled::NotChanged)
            }
            fn set_value(&mut self, _value: Value) -> PipelineResult<()> {
                Ok(())
            }
            fn upstream(&self) -> Option<&dyn Node> {
                None
            }
        }

        let mut node = ImplicitConversionNode::new(Box::new(Carrier), ValueType::Long);
        assert!(matches!(
            node.set_value(Value::Long(1)),
            Err(PipelineError::StaleState(_))
        ));
    }
}
