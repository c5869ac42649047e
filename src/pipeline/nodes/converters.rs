//! Built-in conversions.
//!
//! Each type here implements [`Conversion`], and [`ReversibleConversion`]
//! where a meaningful inverse exists. Wrap them in a
//! [`OneWayConverter`](super::OneWayConverter) or
//! [`TwoWayConverter`](super::TwoWayConverter), or describe them with a
//! [`StageDescriptor`](crate::pipeline::StageDescriptor) and let the wiring
//! algorithm do it.

use super::converter::{Conversion, Reversed, ReversibleConversion};
use crate::enum_value::{EnumTag, EnumValue};
use crate::pipeline::error::{
    ConversionError, PipelineResult, StaleStateError, WiringError,
};
use crate::types::{Payload, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

fn invalid(stage: &str, parameter: &str, message: impl Into<String>) -> WiringError {
    WiringError::InvalidParameter {
        stage: stage.to_string(),
        parameter: parameter.to_string(),
        message: message.into(),
    }
}

fn parse_error(input: &str, target: ValueType) -> ConversionError {
    ConversionError::Parse {
        input: input.to_string(),
        target,
    }
}

/// `f32` to text, optionally with a fixed number of decimals.
///
/// Without fixed decimals the shortest round-tripping form is used, so `0.0`
/// formats as `"0"` and `2.5` as `"2.5"`. Parsing back accepts surrounding
/// whitespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatToString {
    decimals: Option<usize>,
}

impl FloatToString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(decimals: usize) -> Self {
        Self {
            decimals: Some(decimals),
        }
    }
}

impl Conversion for FloatToString {
    type Input = f32;
    type Output = String;

    fn name(&self) -> &str {
        "FloatToString"
    }

    fn convert(&mut self, input: f32) -> PipelineResult<String> {
        Ok(match self.decimals {
            Some(decimals) => format!("{:.*}", decimals, input),
            None => input.to_string(),
        })
    }
}

impl ReversibleConversion for FloatToString {
    fn convert_back(&mut self, output: String) -> PipelineResult<f32> {
        output
            .trim()
            .parse::<f32>()
            .map_err(|_| parse_error(&output, ValueType::Float).into())
    }
}

/// `i32` to decimal text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntToString;

impl Conversion for IntToString {
    type Input = i32;
    type Output = String;

    fn name(&self) -> &str {
        "IntToString"
    }

    fn convert(&mut self, input: i32) -> PipelineResult<String> {
        Ok(input.to_string())
    }
}

impl ReversibleConversion for IntToString {
    fn convert_back(&mut self, output: String) -> PipelineResult<i32> {
        output
            .trim()
            .parse::<i32>()
            .map_err(|_| parse_error(&output, ValueType::Int).into())
    }
}

/// Text to `f32`.
pub fn parse_float() -> Reversed<FloatToString> {
    Reversed::named(FloatToString::new(), "ParseFloat")
}

/// Text to `i32`.
pub fn parse_int() -> Reversed<IntToString> {
    Reversed::named(IntToString, "ParseInt")
}

/// `bool` to one of two labels.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolToString {
    true_text: String,
    false_text: String,
}

impl BoolToString {
    pub fn new(true_text: impl Into<String>, false_text: impl Into<String>) -> Self {
        Self {
            true_text: true_text.into(),
            false_text: false_text.into(),
        }
    }
}

impl Default for BoolToString {
    fn default() -> Self {
        Self::new("true", "false")
    }
}

impl Conversion for BoolToString {
    type Input = bool;
    type Output = String;

    fn name(&self) -> &str {
        "BoolToString"
    }

    fn convert(&mut self, input: bool) -> PipelineResult<String> {
        Ok(if input {
            self.true_text.clone()
        } else {
            self.false_text.clone()
        })
    }
}

/// `i32` to `bool`: true once the value reaches `step_value`.
///
/// Writing back maps `true` to `step_value` and `false` to zero, which makes
/// this the usual way to drive a toggle from an integer level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntToBool {
    step_value: i32,
}

impl IntToBool {
    pub fn new(step_value: i32) -> Result<Self, WiringError> {
        if step_value <= 0 {
            return Err(invalid(
                "IntToBool",
                "step_value",
                format!("must be > 0, got {}", step_value),
            ));
        }
        Ok(Self { step_value })
    }

    pub fn step_value(&self) -> i32 {
        self.step_value
    }
}

impl Conversion for IntToBool {
    type Input = i32;
    type Output = bool;

    fn name(&self) -> &str {
        "IntToBool"
    }

    fn convert(&mut self, input: i32) -> PipelineResult<bool> {
        Ok(input >= self.step_value)
    }
}

impl ReversibleConversion for IntToBool {
    fn convert_back(&mut self, output: bool) -> PipelineResult<i32> {
        Ok(if output { self.step_value } else { 0 })
    }
}

/// Logical not.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Invert;

impl Conversion for Invert {
    type Input = bool;
    type Output = bool;

    fn name(&self) -> &str {
        "Invert"
    }

    fn convert(&mut self, input: bool) -> PipelineResult<bool> {
        Ok(!input)
    }
}

impl ReversibleConversion for Invert {
    fn convert_back(&mut self, output: bool) -> PipelineResult<bool> {
        Ok(!output)
    }
}

/// Arithmetic negation of an `f32`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Negate;

impl Conversion for Negate {
    type Input = f32;
    type Output = f32;

    fn name(&self) -> &str {
        "Negate"
    }

    fn convert(&mut self, input: f32) -> PipelineResult<f32> {
        Ok(-input)
    }
}

impl ReversibleConversion for Negate {
    fn convert_back(&mut self, output: f32) -> PipelineResult<f32> {
        Ok(-output)
    }
}

/// `value * factor + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    factor: f32,
    offset: f32,
}

impl Scale {
    pub fn new(factor: f32, offset: f32) -> Result<Self, WiringError> {
        if !factor.is_finite() || factor == 0.0 {
            return Err(invalid(
                "Scale",
                "factor",
                format!("must be finite and non-zero, got {}", factor),
            ));
        }
        if !offset.is_finite() {
            return Err(invalid("Scale", "offset", format!("must be finite, got {}", offset)));
        }
        Ok(Self { factor, offset })
    }
}

impl Conversion for Scale {
    type Input = f32;
    type Output = f32;

    fn name(&self) -> &str {
        "Scale"
    }

    fn convert(&mut self, input: f32) -> PipelineResult<f32> {
        Ok(input * self.factor + self.offset)
    }
}

impl ReversibleConversion for Scale {
    fn convert_back(&mut self, output: f32) -> PipelineResult<f32> {
        Ok((output - self.offset) / self.factor)
    }
}

/// Limits an `f32` to `[min, max]`. One-way, the clamp loses information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamp {
    min: f32,
    max: f32,
}

impl Clamp {
    pub fn new(min: f32, max: f32) -> Result<Self, WiringError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(invalid(
                "Clamp",
                "range",
                format!("min must not exceed max, got [{}, {}]", min, max),
            ));
        }
        Ok(Self { min, max })
    }
}

impl Conversion for Clamp {
    type Input = f32;
    type Output = f32;

    fn name(&self) -> &str {
        "Clamp"
    }

    fn convert(&mut self, input: f32) -> PipelineResult<f32> {
        Ok(input.clamp(self.min, self.max))
    }
}

/// Linear map from one range onto another, e.g. `[0, 100]` to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Remap {
    from: (f32, f32),
    to: (f32, f32),
}

impl Remap {
    pub fn new(from: (f32, f32), to: (f32, f32)) -> Result<Self, WiringError> {
        for (parameter, (lo, hi)) in [("from", from), ("to", to)] {
            if !lo.is_finite() || !hi.is_finite() || lo == hi {
                return Err(invalid(
                    "Remap",
                    parameter,
                    format!("range must be finite and non-empty, got [{}, {}]", lo, hi),
                ));
            }
        }
        Ok(Self { from, to })
    }

    fn map(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
        let t = (value - from.0) / (from.1 - from.0);
        to.0 + t * (to.1 - to.0)
    }
}

impl Conversion for Remap {
    type Input = f32;
    type Output = f32;

    fn name(&self) -> &str {
        "Remap"
    }

    fn convert(&mut self, input: f32) -> PipelineResult<f32> {
        Ok(Self::map(input, self.from, self.to))
    }
}

impl ReversibleConversion for Remap {
    fn convert_back(&mut self, output: f32) -> PipelineResult<f32> {
        Ok(Self::map(output, self.to, self.from))
    }
}

/// How [`FloatToInt`] picks an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rounding {
    #[default]
    Nearest,
    Floor,
    Ceil,
    Truncate,
}

impl Rounding {
    fn apply(self, value: f32) -> f32 {
        match self {
            Rounding::Nearest => value.round(),
            Rounding::Floor => value.floor(),
            Rounding::Ceil => value.ceil(),
            Rounding::Truncate => value.trunc(),
        }
    }
}

/// `f32` to `i32` with an explicit rounding mode, saturating at the `i32` range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatToInt {
    rounding: Rounding,
}

impl FloatToInt {
    pub fn new(rounding: Rounding) -> Self {
        Self { rounding }
    }
}

impl Conversion for FloatToInt {
    type Input = f32;
    type Output = i32;

    fn name(&self) -> &str {
        "FloatToInt"
    }

    fn convert(&mut self, input: f32) -> PipelineResult<i32> {
        if input.is_nan() {
            return Err(ConversionError::NotANumber {
                target: ValueType::Int,
            }
            .into());
        }
        // `as` saturates for floats, the rounding is the only choice to make.
        Ok(self.rounding.apply(input) as i32)
    }
}

impl ReversibleConversion for FloatToInt {
    fn convert_back(&mut self, output: i32) -> PipelineResult<f32> {
        Ok(output as f32)
    }
}

/// Any enum to its `i64` discriminant.
///
/// The enum type is learned from the first value read. Writing back before
/// that has happened is a [`StaleStateError`], since there is no tag to put
/// on the outgoing value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnumToInt {
    tag: Option<EnumTag>,
}

impl EnumToInt {
    pub fn new() -> Self {
        Self::default()
    }

    /// The enum type seen so far, if any.
    pub fn tag(&self) -> Option<EnumTag> {
        self.tag
    }
}

impl Conversion for EnumToInt {
    type Input = EnumValue;
    type Output = i64;

    fn name(&self) -> &str {
        "EnumToInt"
    }

    fn convert(&mut self, input: EnumValue) -> PipelineResult<i64> {
        self.tag = Some(input.tag());
        Ok(input.value())
    }
}

impl ReversibleConversion for EnumToInt {
    fn convert_back(&mut self, output: i64) -> PipelineResult<EnumValue> {
        let tag = self.tag.ok_or_else(|| StaleStateError {
            stage: self.name().to_string(),
        })?;
        Ok(EnumValue::new(output, tag)?)
    }
}

/// `i64` discriminant to one concrete enum type.
///
/// Values outside the enum's storage width or without a matching variant
/// are rejected rather than truncated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntToEnum {
    tag: EnumTag,
    name: &'static str,
}

impl IntToEnum {
    pub fn new(tag: EnumTag) -> Self {
        Self {
            tag,
            name: "IntToEnum",
        }
    }
}

impl Conversion for IntToEnum {
    type Input = i64;
    type Output = EnumValue;

    fn name(&self) -> &str {
        self.name
    }

    fn output_type(&self) -> ValueType {
        ValueType::Enum(self.tag)
    }

    fn convert(&mut self, input: i64) -> PipelineResult<EnumValue> {
        let value = EnumValue::new(input, self.tag)?;
        if !self.tag.is_variant(input) {
            return Err(ConversionError::UnknownVariant {
                enum_name: self.tag.name().to_string(),
                value: input,
            }
            .into());
        }
        Ok(value)
    }
}

impl ReversibleConversion for IntToEnum {
    fn convert_back(&mut self, output: EnumValue) -> PipelineResult<i64> {
        if output.tag() != self.tag {
            return Err(ConversionError::EnumTypeMismatch {
                expected: self.tag.name().to_string(),
                actual: output.tag().name().to_string(),
            }
            .into());
        }
        Ok(output.value())
    }
}

/// Any enum to its variant name, or its discriminant when it has none.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnumToString;

impl Conversion for EnumToString {
    type Input = EnumValue;
    type Output = String;

    fn name(&self) -> &str {
        "EnumToString"
    }

    fn convert(&mut self, input: EnumValue) -> PipelineResult<String> {
        Ok(match input.variant_name() {
            Some(name) => name.to_string(),
            None => input.value().to_string(),
        })
    }
}

/// Substitutes the value into the first `{}` of a template.
pub struct Format<T> {
    template: String,
    _input: PhantomData<fn(T)>,
}

impl<T> Format<T> {
    pub fn new(template: impl Into<String>) -> Result<Self, WiringError> {
        let template = template.into();
        if !template.contains("{}") {
            return Err(invalid(
                "Format",
                "template",
                format!("{:?} has no {{}} placeholder", template),
            ));
        }
        Ok(Self {
            template,
            _input: PhantomData,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl<T: Payload + fmt::Display> Conversion for Format<T> {
    type Input = T;
    type Output = String;

    fn name(&self) -> &str {
        "Format"
    }

    fn convert(&mut self, input: T) -> PipelineResult<String> {
        Ok(self.template.replacen("{}", &input.to_string(), 1))
    }
}
