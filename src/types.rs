//! Core value types for propbind-rs
//!
//! This module contains the payload model shared by every pipeline stage:
//! the runtime-tagged [`Value`], its [`ValueType`] descriptor, the tri-state
//! [`EResult`] change signal and the [`Polled`] read outcome that carries it.
//!
//! # Main Types
//!
//! - [`ValueType`] - Declared type of a property or stage port
//! - [`Value`] - A single payload of any supported type
//! - [`EResult`] - NotChanged / Changed / Tweened
//! - [`Polled`] - A read outcome: the `EResult` plus the value, when there is one
//! - [`Payload`] - Maps concrete Rust types to and from [`Value`]
//!
//! # Supported Payloads
//!
//! - Integers: `u8` (byte), `i32` (int), `i64` (long)
//! - Floating point: `f32` (float), `f64` (double)
//! - `bool`, `String`
//! - [`Vec2`], [`Vec3`], [`Color`]
//! - Enumerations via [`EnumValue`], either as a concrete enum type
//!   ([`ValueType::Enum`]) or through the generic carrier ([`ValueType::EnumValue`])

use crate::enum_value::{EnumTag, EnumValue};
use crate::pipeline::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state outcome of a stage read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EResult {
    /// Value identical to the last observed one.
    #[default]
    NotChanged,
    /// A new discrete value.
    Changed,
    /// An interpolated intermediate sample of a transition in progress.
    Tweened,
}

impl EResult {
    /// Whether downstream stages have anything to process.
    pub fn is_dirty(self) -> bool {
        !matches!(self, EResult::NotChanged)
    }
}

impl fmt::Display for EResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EResult::NotChanged => write!(f, "NotChanged"),
            EResult::Changed => write!(f, "Changed"),
            EResult::Tweened => write!(f, "Tweened"),
        }
    }
}

/// Result of reading a stage: the change signal together with the value.
///
/// `NotChanged` carries no value, so idle ticks never clone payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Polled<T> {
    NotChanged,
    Changed(T),
    Tweened(T),
}

impl<T> Polled<T> {
    /// Rebuild a read outcome from a signal and a value.
    pub fn from_parts(result: EResult, value: T) -> Self {
        match result {
            EResult::NotChanged => Polled::NotChanged,
            EResult::Changed => Polled::Changed(value),
            EResult::Tweened => Polled::Tweened(value),
        }
    }

    pub fn result(&self) -> EResult {
        match self {
            Polled::NotChanged => EResult::NotChanged,
            Polled::Changed(_) => EResult::Changed,
            Polled::Tweened(_) => EResult::Tweened,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Polled::NotChanged => None,
            Polled::Changed(v) | Polled::Tweened(v) => Some(v),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Polled::NotChanged => None,
            Polled::Changed(v) | Polled::Tweened(v) => Some(v),
        }
    }

    /// Transform the value, keeping the signal. `f` is not called for `NotChanged`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Polled<U> {
        match self {
            Polled::NotChanged => Polled::NotChanged,
            Polled::Changed(v) => Polled::Changed(f(v)),
            Polled::Tweened(v) => Polled::Tweened(f(v)),
        }
    }

    /// Fallible [`Polled::map`].
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Polled<U>, E> {
        Ok(match self {
            Polled::NotChanged => Polled::NotChanged,
            Polled::Changed(v) => Polled::Changed(f(v)?),
            Polled::Tweened(v) => Polled::Tweened(f(v)?),
        })
    }
}

/// A 2D vector payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A 3D vector payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Linear RGBA color payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Declared type of a property, a stage input or a stage output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean value
    Bool,
    /// 8-bit unsigned integer
    Byte,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// UTF-8 text
    String,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// RGBA color
    Color,
    /// The generic enum carrier: accepts a value of any enum type
    EnumValue,
    /// One concrete enum type
    Enum(EnumTag),
}

impl ValueType {
    /// Whether `value` may flow through a port declared with this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::EnumValue, Value::Enum(_)) => true,
            (ValueType::Enum(tag), Value::Enum(e)) => e.tag() == *tag,
            _ => *self == value.value_type(),
        }
    }

    /// Whether this is an integer or floating point type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Byte | ValueType::Int | ValueType::Long | ValueType::Float | ValueType::Double
        )
    }

    /// Whether this type carries an enumeration, concrete or generic.
    pub fn is_enum(&self) -> bool {
        matches!(self, ValueType::EnumValue | ValueType::Enum(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Byte => write!(f, "byte"),
            ValueType::Int => write!(f, "int"),
            ValueType::Long => write!(f, "long"),
            ValueType::Float => write!(f, "float"),
            ValueType::Double => write!(f, "double"),
            ValueType::String => write!(f, "string"),
            ValueType::Vec2 => write!(f, "vec2"),
            ValueType::Vec3 => write!(f, "vec3"),
            ValueType::Color => write!(f, "color"),
            ValueType::EnumValue => write!(f, "EnumValue"),
            ValueType::Enum(tag) => write!(f, "enum {}", tag.name()),
        }
    }
}

/// A single payload flowing through a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Vec2(Vec2),
    Vec3(Vec3),
    Color(Color),
    Enum(EnumValue),
}

impl Value {
    /// The concrete type of this value. Enum values report their own tag.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Byte(_) => ValueType::Byte,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Vec2(_) => ValueType::Vec2,
            Value::Vec3(_) => ValueType::Vec3,
            Value::Color(_) => ValueType::Color,
            Value::Enum(e) => ValueType::Enum(e.tag()),
        }
    }

    /// Change-detection equality.
    ///
    /// Same as `==` except that NaN compares equal to NaN, so a property stuck
    /// at NaN does not report `Changed` on every read.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Byte(v) => Some(*v as f64),
            Value::Int(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Enum(e) => Some(e.value() as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Vec2(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Vec3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Color(c) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            Value::Enum(e) => match e.variant_name() {
                Some(name) => write!(f, "{}::{}", e.tag().name(), name),
                None => write!(f, "{}({})", e.tag().name(), e.value()),
            },
        }
    }
}

/// A Rust type that can travel through a pipeline as a [`Value`].
///
/// Typed converters are written against `Payload` types; the pipeline moves
/// them around as `Value`s and checks the declared [`ValueType`]s at wiring time.
pub trait Payload: Clone + PartialEq + fmt::Debug + 'static {
    /// The declared type of this payload.
    fn value_type() -> ValueType;

    /// Unwrap a value, failing if it holds a different payload.
    fn from_value(value: Value) -> Result<Self, ConversionError>;

    fn into_value(self) -> Value;
}

macro_rules! impl_payload {
    ($ty:ty, $variant:ident) => {
        impl Payload for $ty {
            fn value_type() -> ValueType {
                ValueType::$variant
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(ConversionError::PayloadMismatch {
                        expected: ValueType::$variant,
                        actual: other.value_type(),
                    }),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_payload!(bool, Bool);
impl_payload!(u8, Byte);
impl_payload!(i32, Int);
impl_payload!(i64, Long);
impl_payload!(f32, Float);
impl_payload!(f64, Double);
impl_payload!(String, String);
impl_payload!(Vec2, Vec2);
impl_payload!(Vec3, Vec3);
impl_payload!(Color, Color);

/// The generic carrier: any enum value, whatever its tag.
impl Payload for EnumValue {
    fn value_type() -> ValueType {
        ValueType::EnumValue
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Enum(e) => Ok(e),
            other => Err(ConversionError::PayloadMismatch {
                expected: ValueType::EnumValue,
                actual: other.value_type(),
            }),
        }
    }

    fn into_value(self) -> Value {
        Value::Enum(self)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polled_map_skips_not_changed() {
        let mut calls = 0;
        let polled: Polled<i32> = Polled::NotChanged;
        let mapped = polled.map(|v| {
            calls += 1;
            v * 2
        });
        assert_eq!(mapped, Polled::NotChanged);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_polled_map_keeps_signal() {
        assert_eq!(Polled::Tweened(2).map(|v| v + 1), Polled::Tweened(3));
        assert_eq!(Polled::Changed(2).map(|v| v + 1), Polled::Changed(3));
        assert_eq!(Polled::Tweened(1).result(), EResult::Tweened);
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::Float.to_string(), "float");
        assert_eq!(ValueType::EnumValue.to_string(), "EnumValue");
    }

    #[test]
    fn test_nan_is_same() {
        let a = Value::Float(f32::NAN);
        assert_ne!(a, a.clone());
        assert!(a.is_same(&Value::Float(f32::NAN)));
        assert!(!Value::Float(1.0).is_same(&Value::Double(1.0)));
    }

    #[test]
    fn test_payload_mismatch() {
        let err = f32::from_value(Value::Int(3)).unwrap_err();
        assert_eq!(
            err,
            ConversionError::PayloadMismatch {
                expected: ValueType::Float,
                actual: ValueType::Int,
            }
        );
    }

    #[test]
    fn test_accepts() {
        assert!(ValueType::Int.accepts(&Value::Int(1)));
        assert!(!ValueType::Int.accepts(&Value::Long(1)));
    }
}
