use super::node::{walk_chain, BindingDirection, Node};
use crate::types::ValueType;
use std::fmt::Write as _;

/// One resolved stage of a wired binding.
#[derive(Debug, Clone, PartialEq)]
pub struct StageInfo {
    pub name: String,
    pub input: ValueType,
    pub output: ValueType,
    /// Spliced in by the wiring algorithm rather than requested
    pub implicit: bool,
    pub two_way: bool,
}

/// Resolved layout of a binding, source to sink.
#[derive(Debug, Clone, PartialEq)]
pub struct WiringPlan {
    /// Stages in source-to-sink order, the property adapter first
    pub stages: Vec<StageInfo>,

    pub direction: BindingDirection,

    /// Wiring statistics
    pub stats: PlanStats,
}

/// Statistics about a wired binding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanStats {
    /// Number of stages including the property adapter
    pub stages: usize,

    /// Number of implicit conversions spliced in
    pub implicit_conversions: usize,

    /// Wiring time in microseconds
    pub compile_time_us: u64,
}

impl WiringPlan {
    /// Snapshot the chain ending at `head`.
    pub fn from_chain(head: &dyn Node, direction: BindingDirection, compile_time_us: u64) -> Self {
        let stages: Vec<StageInfo> = walk_chain(head)
            .into_iter()
            .map(|node| StageInfo {
                name: node.name().to_string(),
                input: node.input_type(),
                output: node.output_type(),
                implicit: node.is_implicit(),
                two_way: node.is_two_way(),
            })
            .collect();

        let stats = PlanStats {
            stages: stages.len(),
            implicit_conversions: stages.iter().filter(|s| s.implicit).count(),
            compile_time_us,
        };

        Self {
            stages,
            direction,
            stats,
        }
    }

    /// Type handed to the sink
    pub fn output_type(&self) -> Option<ValueType> {
        self.stages.last().map(|s| s.output)
    }

    pub fn is_two_way(&self) -> bool {
        self.direction.is_two_way()
    }

    /// One line per stage, e.g. `health: float -> float`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (i, stage) in self.stages.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>2}. {}: {} -> {}{}",
                i,
                stage.name,
                stage.input,
                stage.output,
                if stage.implicit { " (implicit)" } else { "" }
            );
        }
        out
    }
}
