//! Node abstraction for the pipeline.
//!
//! A pipeline is a chain of boxed [`Node`]s. Each node owns the node before
//! it, so a read on the last node recurses upstream to the property adapter
//! and the result flows back down. Writes travel the other way, on demand.
//!
//! Capabilities are flags rather than a type hierarchy: every node can be
//! read, and a node accepts `set_value` only when [`Node::is_two_way`] holds.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::types::{Polled, Value, ValueType};
use serde::{Deserialize, Serialize};

/// Timing information for one tick, supplied by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Elapsed seconds since the previous tick, after time scaling.
    pub delta: f32,
    /// Elapsed seconds since the previous tick, unscaled.
    pub unscaled_delta: f32,
    /// Monotonic tick counter.
    pub tick: u64,
}

impl TickContext {
    pub fn new(delta: f32) -> Self {
        Self {
            delta,
            unscaled_delta: delta,
            tick: 0,
        }
    }

    /// The delta a stage should advance by.
    #[inline]
    pub fn delta_for(&self, unscaled: bool) -> f32 {
        if unscaled {
            self.unscaled_delta
        } else {
            self.delta
        }
    }
}

/// Whether a binding only reads its source, or also writes back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BindingDirection {
    #[default]
    OneWay,
    TwoWay,
}

impl BindingDirection {
    pub fn is_two_way(self) -> bool {
        matches!(self, BindingDirection::TwoWay)
    }
}

/// One stage of a pipeline.
pub trait Node {
    /// Human-readable name of this stage.
    fn name(&self) -> &str;

    /// Type accepted from upstream. The property adapter reports its own type.
    fn input_type(&self) -> ValueType;

    fn output_type(&self) -> ValueType;

    /// Whether `set_value` is supported all the way down to the source.
    fn is_two_way(&self) -> bool {
        false
    }

    /// Whether the wiring algorithm inserted this stage on its own.
    fn is_implicit(&self) -> bool {
        false
    }

    /// Read this stage for the current tick.
    fn try_get_value(&mut self, ctx: &TickContext) -> PipelineResult<Polled<Value>>;

    /// Push a value of [`Node::output_type`] back towards the source.
    fn set_value(&mut self, value: Value) -> PipelineResult<()> {
        let _ = value;
        Err(PipelineError::ReadOnly {
            stage: self.name().to_string(),
        })
    }

    /// The node this one reads from. `None` for the source adapter.
    fn upstream(&self) -> Option<&dyn Node>;
}

/// Boxed node, the unit the wiring algorithm works with.
pub type BoxedNode = Box<dyn Node>;

/// Walk a chain from its last node, returning the nodes in source-to-sink order.
pub fn walk_chain(head: &dyn Node) -> Vec<&dyn Node> {
    let mut chain = Vec::new();
    let mut current = Some(head);
    while let Some(node) = current {
        chain.push(node);
        current = node.upstream();
    }
    chain.reverse();
    chain
}
