//! Pipeline executor: wired bindings and the tick scheduler.
//!
//! Each tick the scheduler:
//! 1. Clamps the elapsed time and applies the time scale.
//! 2. Polls every binding once, in binding order.
//! 3. Hands each `Changed`/`Tweened` value to that binding's sink.
//! 4. Records errors per binding and moves on; one broken binding never
//!    stops the others.

use crate::config::{BindingConfig, SchedulerSettings, TweenSettings};
use crate::error::{BindError, Result};
use crate::pipeline::compiled_plan::WiringPlan;
use crate::pipeline::compiler::{BindingSpec, PipelineCompiler};
use crate::pipeline::error::{ConversionError, PipelineError, PipelineResult, WiringError};
use crate::pipeline::id::BindingId;
use crate::pipeline::node::{BindingDirection, BoxedNode, Node, TickContext};
use crate::pipeline::registry::ImplicitConversionRegistry;
use crate::pipeline::sink::Sink;
use crate::source::PropertyHost;
use crate::types::{Polled, Value, ValueType};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A wired binding: the owned chain of nodes plus its resolved plan.
pub struct Pipeline {
    head: BoxedNode,
    plan: WiringPlan,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("head", &self.head.name())
            .field("plan", &self.plan)
            .finish()
    }
}

impl Pipeline {
    pub fn new(head: BoxedNode, plan: WiringPlan) -> Self {
        Self { head, plan }
    }

    /// Read the binding for this tick.
    pub fn poll(&mut self, ctx: &TickContext) -> PipelineResult<Polled<Value>> {
        self.head.try_get_value(ctx)
    }

    /// Push a value from the sink side back to the source property.
    pub fn set_value(&mut self, value: Value) -> PipelineResult<()> {
        if !self.plan.is_two_way() {
            return Err(PipelineError::ReadOnly {
                stage: self.head.name().to_string(),
            });
        }
        let expected = self.head.output_type();
        if !expected.accepts(&value) {
            return Err(ConversionError::PayloadMismatch {
                expected,
                actual: value.value_type(),
            }
            .into());
        }
        self.head.set_value(value)
    }

    pub fn output_type(&self) -> ValueType {
        self.head.output_type()
    }

    pub fn direction(&self) -> BindingDirection {
        self.plan.direction
    }

    pub fn plan(&self) -> &WiringPlan {
        &self.plan
    }

    /// The last stage of the chain.
    pub fn head(&self) -> &dyn Node {
        self.head.as_ref()
    }
}

/// A binding owned by the scheduler.
struct BindingSlot {
    label: String,
    pipeline: Pipeline,
    sink: Box<dyn Sink>,
    errors: u64,
    last_error: Option<PipelineError>,
}

/// Scheduler statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerStats {
    /// Ticks run so far
    pub ticks: u64,
    /// Live bindings
    pub active_bindings: usize,
    /// Values handed to sinks
    pub values_applied: u64,
    /// Errors raised by polls and writes
    pub errors: u64,
    /// Duration of the last tick in microseconds
    pub last_tick_us: u64,
}

/// Owns a set of bindings and polls them once per tick.
pub struct Scheduler {
    registry: ImplicitConversionRegistry,
    settings: SchedulerSettings,
    tween_defaults: TweenSettings,
    bindings: BTreeMap<BindingId, BindingSlot>,
    next_id: BindingId,
    tick: u64,
    last_tick_time: Option<Instant>,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new(settings: SchedulerSettings) -> Self {
        Self {
            registry: ImplicitConversionRegistry::with_defaults(),
            settings,
            tween_defaults: TweenSettings::default(),
            bindings: BTreeMap::new(),
            next_id: BindingId::default(),
            tick: 0,
            last_tick_time: None,
            stats: SchedulerStats::default(),
        }
    }

    pub fn from_config(config: &BindingConfig) -> Self {
        Self::new(config.scheduler.clone()).with_tween_defaults(config.tween)
    }

    /// Replace the implicit conversion table used for new bindings.
    pub fn with_registry(mut self, registry: ImplicitConversionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_tween_defaults(mut self, settings: TweenSettings) -> Self {
        self.tween_defaults = settings;
        self
    }

    pub fn registry_mut(&mut self) -> &mut ImplicitConversionRegistry {
        &mut self.registry
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Change the time scale. Tweens using unscaled time are unaffected.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.settings.time_scale = time_scale.max(0.0);
    }

    /// Wire `spec` against `host` and start polling it into `sink`.
    ///
    /// A wiring failure is logged and returned; bindings that already exist
    /// are not affected.
    pub fn bind(
        &mut self,
        host: &dyn PropertyHost,
        spec: BindingSpec,
        sink: impl Sink + 'static,
    ) -> std::result::Result<BindingId, WiringError> {
        let label = format!("{}.{}", host.type_name(), spec.property);
        let compiler =
            PipelineCompiler::new(&self.registry).with_tween_defaults(self.tween_defaults);

        match compiler.compile(host, spec, sink.input_type()) {
            Ok(pipeline) => self.attach(label, pipeline, Box::new(sink)),
            Err(e) => {
                tracing::warn!("Failed to bind {}: {}", label, e);
                Err(e)
            }
        }
    }

    /// Add an already wired pipeline.
    pub fn attach(
        &mut self,
        label: impl Into<String>,
        pipeline: Pipeline,
        sink: Box<dyn Sink>,
    ) -> std::result::Result<BindingId, WiringError> {
        let label = label.into();
        let produced = pipeline.output_type();
        let expected = sink.input_type();
        if produced != expected {
            tracing::warn!("Failed to bind {}: sink expects {}", label, expected);
            return Err(WiringError::TypeMismatch {
                from_stage: pipeline.head().name().to_string(),
                from_type: produced,
                to_stage: "sink".to_string(),
                to_type: expected,
            });
        }

        let id = self.next_id;
        self.next_id = id.next();
        tracing::info!(
            "Bound {} as {} ({} stages, {:?})",
            label,
            id,
            pipeline.plan().stats.stages,
            pipeline.direction()
        );
        self.bindings.insert(
            id,
            BindingSlot {
                label,
                pipeline,
                sink,
                errors: 0,
                last_error: None,
            },
        );
        self.stats.active_bindings += 1;
        Ok(id)
    }

    /// Stop polling a binding. Any transition in flight is dropped with it.
    pub fn unbind(&mut self, id: BindingId) -> bool {
        match self.bindings.remove(&id) {
            Some(slot) => {
                tracing::info!("Unbound {} ({})", slot.label, id);
                self.stats.active_bindings -= 1;
                true
            }
            None => false,
        }
    }

    /// Run one tick with `elapsed` time since the previous one.
    ///
    /// Returns the number of values handed to sinks.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        let start_time = Instant::now();
        let unscaled = elapsed.as_secs_f32().min(self.settings.max_delta_seconds);
        let ctx = TickContext {
            delta: unscaled * self.settings.time_scale,
            unscaled_delta: unscaled,
            tick: self.tick,
        };

        let mut applied = 0;
        for (id, slot) in self.bindings.iter_mut() {
            match slot.pipeline.poll(&ctx) {
                Ok(polled) => {
                    let result = polled.result();
                    if let Some(value) = polled.into_value() {
                        tracing::trace!("{} {} {}", slot.label, result, value);
                        slot.sink.apply(result, &value);
                        applied += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Binding {} ({}) failed: {}", slot.label, id, e);
                    slot.errors += 1;
                    slot.last_error = Some(e);
                    self.stats.errors += 1;
                }
            }
        }

        self.tick += 1;
        self.stats.ticks = self.tick;
        self.stats.values_applied += applied as u64;
        self.stats.last_tick_us = start_time.elapsed().as_micros() as u64;
        applied
    }

    /// Run one tick using wall-clock time since the previous call.
    pub fn tick_realtime(&mut self) -> usize {
        let now = Instant::now();
        let elapsed = self
            .last_tick_time
            .map(|last| now.duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick_time = Some(now);
        self.tick(elapsed)
    }

    /// Write a value from the sink side of a two-way binding.
    pub fn write(&mut self, id: BindingId, value: Value) -> Result<()> {
        let slot = self
            .bindings
            .get_mut(&id)
            .ok_or(BindError::UnknownBinding(id))?;

        if let Err(e) = slot.pipeline.set_value(value) {
            tracing::warn!("Write to {} failed: {}", slot.label, e);
            slot.errors += 1;
            slot.last_error = Some(e.clone());
            self.stats.errors += 1;
            return Err(BindError::from(e).with_context(format!("write to {}", slot.label)));
        }
        Ok(())
    }

    fn slot(&self, id: BindingId) -> Option<&BindingSlot> {
        self.bindings.get(&id)
    }

    pub fn contains(&self, id: BindingId) -> bool {
        self.slot(id).is_some()
    }

    pub fn label(&self, id: BindingId) -> Option<&str> {
        self.slot(id).map(|slot| slot.label.as_str())
    }

    pub fn plan(&self, id: BindingId) -> Option<&WiringPlan> {
        self.slot(id).map(|slot| slot.pipeline.plan())
    }

    pub fn last_error(&self, id: BindingId) -> Option<&PipelineError> {
        self.slot(id).and_then(|slot| slot.last_error.as_ref())
    }

    pub fn error_count(&self, id: BindingId) -> u64 {
        self.slot(id).map_or(0, |slot| slot.errors)
    }

    pub fn len(&self) -> usize {
        self.stats.active_bindings
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerSettings::default())
    }
}
