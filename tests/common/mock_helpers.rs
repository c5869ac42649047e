//! Mock construction helpers

use propbind_rs::pipeline::nodes::FnConversion;
use propbind_rs::pipeline::{Node, PipelineResult, TickContext};
use propbind_rs::types::{Payload, Polled, Value, ValueType};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A conversion that counts how often it runs
pub fn counting_conversion<I, O>(
    name: &str,
    mut f: impl FnMut(I) -> O + 'static,
) -> (FnConversion<I, O>, Rc<Cell<usize>>)
where
    I: Payload,
    O: Payload,
{
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let conversion = FnConversion::new(name, move |input| {
        counter.set(counter.get() + 1);
        f(input)
    });
    (conversion, calls)
}

/// Source node replaying a fixed script of reads, then `NotChanged` forever
pub struct ScriptedSource {
    output: ValueType,
    script: VecDeque<Polled<Value>>,
}

impl ScriptedSource {
    pub fn new(output: ValueType, script: impl IntoIterator<Item = Polled<Value>>) -> Self {
        Self {
            output,
            script: script.into_iter().collect(),
        }
    }
}

impl Node for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn input_type(&self) -> ValueType {
        self.output
    }

    fn output_type(&self) -> ValueType {
        self.output
    }

    fn try_get_value(&mut self, _ctx: &TickContext) -> PipelineResult<Polled<Value>> {
        Ok(self.script.pop_front().unwrap_or(Polled::NotChanged))
    }

    fn upstream(&self) -> Option<&dyn Node> {
        None
    }
}
