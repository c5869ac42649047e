//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use propbind_rs::pipeline::TickContext;
use propbind_rs::types::Value;
use std::time::Duration;

/// One 60 Hz frame
pub const FRAME: Duration = Duration::from_micros(16_667);

/// Tick context for one 60 Hz frame
pub fn frame() -> TickContext {
    TickContext::new(FRAME.as_secs_f32())
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Unwrap a float payload
pub fn as_float(value: &Value) -> f32 {
    match value {
        Value::Float(v) => *v,
        other => panic!("expected a float, got {:?}", other),
    }
}
