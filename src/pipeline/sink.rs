//! Sinks: the consumers at the end of a binding.
//!
//! A sink is whatever displays the value, a UI control in a real host. The
//! scheduler hands it every dirty read together with its [`EResult`], so a
//! sink can tell an intermediate tween sample from a settled value.

use crate::types::{EResult, Value, ValueType};
use std::cell::RefCell;
use std::rc::Rc;

/// Consumer of a binding's output.
#[cfg_attr(test, mockall::automock)]
pub trait Sink {
    /// Type this sink consumes. The binding is wired to produce it.
    fn input_type(&self) -> ValueType;

    /// Receive a `Changed` or `Tweened` value. Never called for `NotChanged`.
    fn apply(&mut self, result: EResult, value: &Value);
}

/// Sink backed by a closure.
pub struct FnSink<F> {
    input_type: ValueType,
    apply: F,
}

impl<F: FnMut(EResult, &Value)> FnSink<F> {
    pub fn new(input_type: ValueType, apply: F) -> Self {
        Self { input_type, apply }
    }
}

impl<F: FnMut(EResult, &Value)> Sink for FnSink<F> {
    fn input_type(&self) -> ValueType {
        self.input_type
    }

    fn apply(&mut self, result: EResult, value: &Value) {
        (self.apply)(result, value)
    }
}

/// Sink that records everything it receives.
///
/// Clones share the same history, so a test or the demo can keep one handle
/// while the scheduler owns the other.
#[derive(Debug, Clone)]
pub struct LatestValue {
    input_type: ValueType,
    history: Rc<RefCell<Vec<(EResult, Value)>>>,
}

impl LatestValue {
    pub fn new(input_type: ValueType) -> Self {
        Self {
            input_type,
            history: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Most recent value received.
    pub fn latest(&self) -> Option<Value> {
        self.history.borrow().last().map(|(_, value)| value.clone())
    }

    /// Most recent signal received.
    pub fn latest_result(&self) -> Option<EResult> {
        self.history.borrow().last().map(|(result, _)| *result)
    }

    pub fn history(&self) -> Vec<(EResult, Value)> {
        self.history.borrow().clone()
    }

    /// Number of values received.
    pub fn len(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.history.borrow_mut().clear();
    }
}

impl Sink for LatestValue {
    fn input_type(&self) -> ValueType {
        self.input_type
    }

    fn apply(&mut self, result: EResult, value: &Value) {
        self.history.borrow_mut().push((result, value.clone()));
    }
}
