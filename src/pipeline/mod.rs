//! Typed property-binding pipelines.
//!
//! A binding reads one property of a host object every tick and feeds it,
//! through a chain of typed stages, to a sink. Each stage owns the stage
//! before it; a read on the last stage recurses down to the property adapter
//! and the result flows back up. Writes from a two-way sink travel the other
//! way, on demand.
//!
//! # Architecture
//!
//! ```text
//! [PropertyAdapter] ──► [int -> float] ──► [Scale] ──► [SmoothDamp] ──► sink
//!       leaf            implicit bridge    converter      tween
//! ```
//!
//! # Design
//!
//! - **Tri-state change signal**: every read returns `NotChanged`, `Changed`
//!   or `Tweened`; idle ticks carry no value and skip all conversion work.
//! - **Eager wiring**: type checks, implicit bridges and two-way checks all
//!   happen once in [`PipelineCompiler::compile`], never per tick.
//! - **Owned chains**: a pipeline owns its nodes exclusively; no node is
//!   shared between bindings.
//! - **Isolated failures**: a binding's errors are recorded against that
//!   binding; the [`Scheduler`] keeps ticking the rest.

pub mod cast;
pub mod compiled_plan;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod id;
pub mod node;
pub mod node_type;
pub mod nodes;
pub mod registry;
pub mod sink;

pub use compiled_plan::{PlanStats, StageInfo, WiringPlan};
pub use compiler::{BindingSpec, PipelineCompiler};
pub use error::{ConversionError, PipelineError, PipelineResult, StaleStateError, WiringError};
pub use executor::{Pipeline, Scheduler, SchedulerStats};
pub use id::BindingId;
pub use node::{walk_chain, BindingDirection, BoxedNode, Node, TickContext};
pub use node_type::{ConverterKind, StageDescriptor, StageFactory, TweenKind};
pub use registry::{
    AdapterFactory, ImplicitConversion, ImplicitConversionRegistry, OutputMatch, TypeFamily,
};
pub use sink::{FnSink, LatestValue, Sink};
