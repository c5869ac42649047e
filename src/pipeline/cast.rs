//! Value-level casts used by implicit conversion stages.
//!
//! Rules:
//! - widening is exact
//! - integer narrowing saturates at the target range
//! - float to integer clamps, then truncates toward zero; NaN is an error
//! - `double` to `float` saturates at `±f32::MAX` for finite inputs
//! - `bool` converts to 1/0, and a number converts to `bool` as `!= 0`
//! - enum discriminants are never clamped: a value that does not fit the
//!   enum's width is an error

use crate::enum_value::EnumValue;
use crate::pipeline::error::ConversionError;
use crate::types::{Value, ValueType};

/// Integer view of a value for the integer targets.
enum Numeric {
    Int(i64),
    Float(f64),
}

fn numeric(value: &Value) -> Option<Numeric> {
    Some(match value {
        Value::Bool(b) => Numeric::Int(i64::from(*b)),
        Value::Byte(v) => Numeric::Int(i64::from(*v)),
        Value::Int(v) => Numeric::Int(i64::from(*v)),
        Value::Long(v) => Numeric::Int(*v),
        Value::Enum(e) => Numeric::Int(e.value()),
        Value::Float(v) => Numeric::Float(f64::from(*v)),
        Value::Double(v) => Numeric::Float(*v),
        _ => return None,
    })
}

fn to_integer(value: &Value, target: ValueType, min: i64, max: i64) -> Result<i64, ConversionError> {
    match numeric(value) {
        Some(Numeric::Int(v)) => {
            if matches!(value, Value::Enum(_)) && !(min..=max).contains(&v) {
                return Err(ConversionError::OutOfRange {
                    value: v.to_string(),
                    target: target.to_string(),
                });
            }
            Ok(v.clamp(min, max))
        }
        Some(Numeric::Float(v)) => {
            if v.is_nan() {
                return Err(ConversionError::NotANumber { target });
            }
            // Float-to-int `as` saturates and truncates toward zero.
            let clamped = v.clamp(min as f64, max as f64);
            Ok((clamped as i64).clamp(min, max))
        }
        None => Err(ConversionError::PayloadMismatch {
            expected: target,
            actual: value.value_type(),
        }),
    }
}

/// Convert `value` so that it can flow through a port of type `target`.
pub fn convert(value: Value, target: &ValueType) -> Result<Value, ConversionError> {
    if target.accepts(&value) {
        return Ok(value);
    }

    match *target {
        ValueType::Byte => {
            to_integer(&value, *target, 0, i64::from(u8::MAX)).map(|v| Value::Byte(v as u8))
        }
        ValueType::Int => to_integer(&value, *target, i64::from(i32::MIN), i64::from(i32::MAX))
            .map(|v| Value::Int(v as i32)),
        ValueType::Long => to_integer(&value, *target, i64::MIN, i64::MAX).map(Value::Long),
        ValueType::Float => match value {
            Value::Double(v) if v.is_finite() => {
                Ok(Value::Float(v.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32))
            }
            other => other
                .as_f64()
                .map(|v| Value::Float(v as f32))
                .ok_or_else(|| mismatch(*target, &other)),
        },
        ValueType::Double => value
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| mismatch(*target, &value)),
        ValueType::Bool => match value {
            Value::Float(v) if v.is_nan() => Err(ConversionError::NotANumber { target: *target }),
            Value::Double(v) if v.is_nan() => Err(ConversionError::NotANumber { target: *target }),
            other => other
                .as_f64()
                .map(|v| Value::Bool(v != 0.0))
                .ok_or_else(|| mismatch(*target, &other)),
        },
        ValueType::Enum(tag) => {
            let raw = match value {
                Value::Byte(v) => i64::from(v),
                Value::Int(v) => i64::from(v),
                Value::Long(v) => v,
                Value::Enum(e) => {
                    return Err(ConversionError::EnumTypeMismatch {
                        expected: tag.name().to_string(),
                        actual: e.tag().name().to_string(),
                    })
                }
                other => return Err(mismatch(*target, &other)),
            };
            EnumValue::new(raw, tag).map(Value::Enum)
        }
        _ => Err(mismatch(*target, &value)),
    }
}

fn mismatch(target: ValueType, value: &Value) -> ConversionError {
    ConversionError::PayloadMismatch {
        expected: target,
        actual: value.value_type(),
    }
}
