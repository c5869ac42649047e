use super::compiled_plan::WiringPlan;
use super::error::WiringError;
use super::executor::Pipeline;
use super::node::{walk_chain, BindingDirection, BoxedNode};
use super::node_type::StageDescriptor;
use super::nodes::PropertyAdapter;
use super::registry::ImplicitConversionRegistry;
use crate::config::TweenSettings;
use crate::source::PropertyHost;
use crate::types::ValueType;

/// What to bind: a property, the stages to run it through, and the direction.
#[derive(Debug)]
pub struct BindingSpec {
    pub property: String,
    pub stages: Vec<StageDescriptor>,
    pub direction: BindingDirection,
}

impl BindingSpec {
    /// One-way binding of `property` with no stages.
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            stages: Vec::new(),
            direction: BindingDirection::OneWay,
        }
    }

    /// Append a stage.
    pub fn then(mut self, stage: StageDescriptor) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn two_way(mut self) -> Self {
        self.direction = BindingDirection::TwoWay;
        self
    }
}

/// Assembles a typed chain of nodes for one binding.
pub struct PipelineCompiler<'r> {
    registry: &'r ImplicitConversionRegistry,
    tween_defaults: TweenSettings,
}

impl<'r> PipelineCompiler<'r> {
    pub fn new(registry: &'r ImplicitConversionRegistry) -> Self {
        Self {
            registry,
            tween_defaults: TweenSettings::default(),
        }
    }

    /// Settings for tween stages that don't carry their own.
    pub fn with_tween_defaults(mut self, settings: TweenSettings) -> Self {
        self.tween_defaults = settings;
        self
    }

    /// Wire `spec` against `host`, ending in a sink that consumes `sink_type`.
    ///
    /// Every check happens here: the property is resolved, each stage's
    /// input is matched against the running output type (bridging through
    /// the registry when they differ), the final output is matched against
    /// the sink, and for two-way bindings every stage must be able to write
    /// back. Nothing is type-checked on the per-tick path.
    pub fn compile(
        &self,
        host: &dyn PropertyHost,
        spec: BindingSpec,
        sink_type: ValueType,
    ) -> Result<Pipeline, WiringError> {
        let start_time = std::time::Instant::now();
        let BindingSpec {
            property,
            stages,
            direction,
        } = spec;

        // Step 1: the leaf adapter
        let adapter = PropertyAdapter::new(host, &property, direction)?;
        let mut head: BoxedNode = Box::new(adapter);

        // Step 2: each requested stage, bridged when needed
        for stage in stages {
            head = self.bridge(head, stage.input_type(), stage.name())?;
            head = stage.attach(head, direction, &self.tween_defaults)?;
        }

        // Step 3: the sink
        head = self.bridge(head, sink_type, "sink")?;

        // Step 4: a two-way binding needs every stage to write back
        if direction.is_two_way() {
            if let Some(stage) = walk_chain(head.as_ref())
                .into_iter()
                .find(|node| !node.is_two_way())
            {
                return Err(WiringError::NotTwoWay {
                    stage: stage.name().to_string(),
                });
            }
        }

        let compile_time_us = start_time.elapsed().as_micros() as u64;
        let plan = WiringPlan::from_chain(head.as_ref(), direction, compile_time_us);

        tracing::debug!(
            "Wired {}.{}: {} stages ({} implicit) in {}us",
            host.type_name(),
            property,
            plan.stats.stages,
            plan.stats.implicit_conversions,
            compile_time_us
        );

        Ok(Pipeline::new(head, plan))
    }

    /// Make `head` produce `required`, splicing in an implicit conversion
    /// when its output type differs.
    fn bridge(
        &self,
        head: BoxedNode,
        required: ValueType,
        consumer: &str,
    ) -> Result<BoxedNode, WiringError> {
        let produced = head.output_type();
        if produced == required {
            return Ok(head);
        }

        let Some(conversion) = self.registry.find(&produced, &required) else {
            return Err(WiringError::TypeMismatch {
                from_stage: head.name().to_string(),
                from_type: produced,
                to_stage: consumer.to_string(),
                to_type: required,
            });
        };

        tracing::debug!(
            "Implicit conversion {} -> {} before '{}'",
            produced,
            required,
            consumer
        );
        let bridged = (conversion.factory)(head, required);

        // A custom factory may not produce what it was registered for.
        let bridged_output = bridged.output_type();
        if bridged_output != required {
            return Err(WiringError::TypeMismatch {
                from_stage: bridged.name().to_string(),
                from_type: bridged_output,
                to_stage: consumer.to_string(),
                to_type: required,
            });
        }
        Ok(bridged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::node_type::TweenKind;
    use crate::pipeline::node::TickContext;
    use crate::source::PropertyBag;
    use crate::types::{Polled, Value};

    fn compile(
        bag: &PropertyBag,
        spec: BindingSpec,
        sink: ValueType,
    ) -> Result<Pipeline, WiringError> {
        let registry = ImplicitConversionRegistry::with_defaults();
        PipelineCompiler::new(&registry).compile(bag, spec, sink)
    }

    #[test]
    fn test_compile_exact_chain() {
        let bag = PropertyBag::new("Player").define("health", 0.0f32);
        let spec = BindingSpec::new("health").then(StageDescriptor::FloatToString { decimals: None });
        let pipeline = compile(&bag, spec, ValueType::String).unwrap();

        assert_eq!(pipeline.plan().stats.stages, 2);
        assert_eq!(pipeline.plan().stats.implicit_conversions, 0);
        assert_eq!(pipeline.output_type(), ValueType::String);
    }

    #[test]
    fn test_compile_splices_implicit_conversion() {
        let bag = PropertyBag::new("Player").define("level", 3i32);
        let spec = BindingSpec::new("level").then(StageDescriptor::Negate);
        let mut pipeline = compile(&bag, spec, ValueType::Float).unwrap();

        let plan = pipeline.plan();
        assert_eq!(plan.stats.stages, 3);
        assert_eq!(plan.stats.implicit_conversions, 1);
        assert!(plan.stages[1].implicit);
        assert_eq!(plan.stages[1].name, "int -> float");

        assert_eq!(
            pipeline.poll(&TickContext::new(0.016)).unwrap(),
            Polled::Changed(Value::Float(-3.0))
        );
    }

    #[test]
    fn test_compile_bridges_to_sink() {
        let bag = PropertyBag::new("Player").define("level", 300i32);
        let mut pipeline = compile(&bag, BindingSpec::new("level"), ValueType::Byte).unwrap();
        assert_eq!(
            pipeline.poll(&TickContext::new(0.016)).unwrap(),
            Polled::Changed(Value::Byte(255))
        );
    }

    #[test]
    fn test_compile_mismatch_names_both_sides() {
        let bag = PropertyBag::new("Player").define("name", "bob");
        let spec = BindingSpec::new("name").then(StageDescriptor::Negate);
        let err = compile(&bag, spec, ValueType::Float).err().unwrap();
        assert_eq!(
            err,
            WiringError::TypeMismatch {
                from_stage: "name".to_string(),
                from_type: ValueType::String,
                to_stage: "Negate".to_string(),
                to_type: ValueType::Float,
            }
        );
    }

    #[test]
    fn test_compile_sink_mismatch() {
        let bag = PropertyBag::new("Player").define("health", 1.0f32);
        let err = compile(&bag, BindingSpec::new("health"), ValueType::String)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            WiringError::TypeMismatch { ref to_stage, .. } if to_stage == "sink"
        ));
    }

    #[test]
    fn test_compile_two_way_rejects_one_way_stage() {
        let bag = PropertyBag::new("Player").define("health", 1.0f32);
        let spec = BindingSpec::new("health")
            .then(StageDescriptor::Clamp { min: 0.0, max: 1.0 })
            .two_way();
        let err = compile(&bag, spec, ValueType::Float).err().unwrap();
        assert_eq!(
            err,
            WiringError::NotTwoWay {
                stage: "Clamp".to_string()
            }
        );
    }

    #[test]
    fn test_compile_invalid_parameter() {
        let bag = PropertyBag::new("Player").define("level", 1i32);
        let spec = BindingSpec::new("level").then(StageDescriptor::IntToBool { step_value: 0 });
        assert!(matches!(
            compile(&bag, spec, ValueType::Bool),
            Err(WiringError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_compile_uses_tween_defaults() {
        let bag = PropertyBag::new("Player").define("x", 0.0f32);
        let registry = ImplicitConversionRegistry::with_defaults();
        let compiler = PipelineCompiler::new(&registry)
            .with_tween_defaults(TweenSettings::default().with_smooth_time(-1.0));
        let spec = BindingSpec::new("x").then(StageDescriptor::tween(TweenKind::Float));
        assert!(matches!(
            compiler.compile(&bag, spec, ValueType::Float),
            Err(WiringError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_empty_registry_never_bridges() {
        let bag = PropertyBag::new("Player").define("level", 1i32);
        let registry = ImplicitConversionRegistry::empty();
        let result = PipelineCompiler::new(&registry).compile(
            &bag,
            BindingSpec::new("level"),
            ValueType::Long,
        );
        assert!(matches!(result, Err(WiringError::TypeMismatch { .. })));
    }
}
