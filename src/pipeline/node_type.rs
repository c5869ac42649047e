//! Stage descriptors for the wiring algorithm.
//!
//! A [`StageDescriptor`] says which stage to build and with which
//! parameters, without building it yet: the wiring algorithm first needs the
//! stage's input type to decide whether an implicit conversion has to go in
//! front of it. [`ConverterKind`] is the flat catalogue of built-in stages.

use crate::config::TweenSettings;
use crate::enum_value::EnumTag;
use crate::pipeline::error::WiringError;
use crate::pipeline::node::{BindingDirection, BoxedNode};
use crate::pipeline::nodes::converters::{
    parse_float, parse_int, BoolToString, Clamp, EnumToInt, EnumToString, FloatToInt,
    FloatToString, Format, IntToBool, IntToEnum, IntToString, Invert, Negate, Remap, Rounding,
    Scale,
};
use crate::pipeline::nodes::{
    AngleTween, ColorTween, Conversion, DoubleTween, FloatTween, OneWayConverter,
    ReversibleConversion, TwoWayConverter, Vec2Tween, Vec3Tween,
};
use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Types of built-in stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConverterKind {
    FloatToString,
    ParseFloat,
    IntToString,
    ParseInt,
    BoolToString,
    IntToBool,
    Invert,
    Negate,
    Scale,
    Clamp,
    Remap,
    FloatToInt,
    EnumToInt,
    IntToEnum,
    EnumToString,
    Format,
    Tween,
}

impl ConverterKind {
    /// Get the display name for this stage type.
    pub fn display_name(&self) -> &'static str {
        match self {
            ConverterKind::FloatToString => "Float To String",
            ConverterKind::ParseFloat => "Parse Float",
            ConverterKind::IntToString => "Int To String",
            ConverterKind::ParseInt => "Parse Int",
            ConverterKind::BoolToString => "Bool To String",
            ConverterKind::IntToBool => "Int To Bool",
            ConverterKind::Invert => "Invert",
            ConverterKind::Negate => "Negate",
            ConverterKind::Scale => "Scale",
            ConverterKind::Clamp => "Clamp",
            ConverterKind::Remap => "Remap",
            ConverterKind::FloatToInt => "Float To Int",
            ConverterKind::EnumToInt => "Enum To Int",
            ConverterKind::IntToEnum => "Int To Enum",
            ConverterKind::EnumToString => "Enum To String",
            ConverterKind::Format => "Format",
            ConverterKind::Tween => "Tween",
        }
    }

    /// Get all built-in stage types.
    pub fn all() -> &'static [ConverterKind] {
        &[
            ConverterKind::FloatToString,
            ConverterKind::ParseFloat,
            ConverterKind::IntToString,
            ConverterKind::ParseInt,
            ConverterKind::BoolToString,
            ConverterKind::IntToBool,
            ConverterKind::Invert,
            ConverterKind::Negate,
            ConverterKind::Scale,
            ConverterKind::Clamp,
            ConverterKind::Remap,
            ConverterKind::FloatToInt,
            ConverterKind::EnumToInt,
            ConverterKind::IntToEnum,
            ConverterKind::EnumToString,
            ConverterKind::Format,
            ConverterKind::Tween,
        ]
    }

    /// Whether a stage of this type can sit in a two-way binding.
    pub fn is_reversible(&self) -> bool {
        !matches!(
            self,
            ConverterKind::BoolToString
                | ConverterKind::Clamp
                | ConverterKind::EnumToString
                | ConverterKind::Format
        )
    }

    pub fn is_tween(&self) -> bool {
        matches!(self, ConverterKind::Tween)
    }

    /// Get a detailed description of what this stage does.
    pub fn description(&self) -> &'static str {
        match self {
            ConverterKind::FloatToString =>
                "Formats a float as text.\n\
                 Optional fixed number of decimals.\n\
                 Writes parse the text back.",

            ConverterKind::ParseFloat => "Parses text as a float. Writes format it back.",

            ConverterKind::IntToString => "Formats an int as decimal text.",

            ConverterKind::ParseInt => "Parses decimal text as an int.",

            ConverterKind::BoolToString =>
                "Shows a bool as one of two labels.\n\
                 Read-only.",

            ConverterKind::IntToBool =>
                "True once the int reaches the step value.\n\
                 Writing true stores the step value, false stores 0.",

            ConverterKind::Invert => "Logical not, in both directions.",

            ConverterKind::Negate => "Arithmetic negation, in both directions.",

            ConverterKind::Scale =>
                "Multiplies by a factor and adds an offset.\n\
                 Writes apply the inverse.",

            ConverterKind::Clamp =>
                "Limits a float to a range.\n\
                 Read-only.",

            ConverterKind::Remap =>
                "Maps one range linearly onto another.\n\
                 Writes map back.",

            ConverterKind::FloatToInt =>
                "Rounds a float to an int.\n\
                 Saturates at the int range, NaN is an error.",

            ConverterKind::EnumToInt =>
                "Exposes any enum as its discriminant.\n\
                 Writes need one prior read to learn the enum type.",

            ConverterKind::IntToEnum =>
                "Turns a discriminant into one concrete enum type.\n\
                 Unknown discriminants are rejected.",

            ConverterKind::EnumToString =>
                "Shows an enum by its variant name.\n\
                 Read-only.",

            ConverterKind::Format =>
                "Substitutes the value into a text template.\n\
                 Read-only.",

            ConverterKind::Tween =>
                "Smooths discrete changes into a multi-tick transition.\n\
                 SmoothDamp for floats, angles, vectors and colors.",
        }
    }
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Payload a tween stage smooths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TweenKind {
    Float,
    Double,
    /// Degrees, along the shortest arc.
    Angle,
    Vec2,
    Vec3,
    Color,
}

impl TweenKind {
    pub fn value_type(&self) -> ValueType {
        match self {
            TweenKind::Float | TweenKind::Angle => ValueType::Float,
            TweenKind::Double => ValueType::Double,
            TweenKind::Vec2 => ValueType::Vec2,
            TweenKind::Vec3 => ValueType::Vec3,
            TweenKind::Color => ValueType::Color,
        }
    }
}

/// Builds an application-defined stage.
pub trait StageFactory {
    fn name(&self) -> &str;

    /// Type the stage expects from upstream.
    fn input_type(&self) -> ValueType;

    fn attach(
        self: Box<Self>,
        prev: BoxedNode,
        direction: BindingDirection,
    ) -> Result<BoxedNode, WiringError>;
}

struct OneWayFactory<C: Conversion>(C);

impl<C: Conversion> StageFactory for OneWayFactory<C> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn input_type(&self) -> ValueType {
        self.0.input_type()
    }

    fn attach(
        self: Box<Self>,
        prev: BoxedNode,
        _direction: BindingDirection,
    ) -> Result<BoxedNode, WiringError> {
        one_way(prev, self.0)
    }
}

struct TwoWayFactory<C: ReversibleConversion>(C);

impl<C: ReversibleConversion> StageFactory for TwoWayFactory<C> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn input_type(&self) -> ValueType {
        self.0.input_type()
    }

    fn attach(
        self: Box<Self>,
        prev: BoxedNode,
        direction: BindingDirection,
    ) -> Result<BoxedNode, WiringError> {
        two_way(prev, self.0, direction)
    }
}

fn one_way<C: Conversion>(prev: BoxedNode, conversion: C) -> Result<BoxedNode, WiringError> {
    Ok(Box::new(OneWayConverter::attach(prev, conversion)?))
}

fn two_way<C: ReversibleConversion>(
    prev: BoxedNode,
    conversion: C,
    direction: BindingDirection,
) -> Result<BoxedNode, WiringError> {
    Ok(Box::new(TwoWayConverter::attach(prev, conversion, direction)?))
}

/// One stage of a binding, before it is built.
pub enum StageDescriptor {
    FloatToString { decimals: Option<usize> },
    ParseFloat,
    IntToString,
    ParseInt,
    BoolToString { true_text: String, false_text: String },
    IntToBool { step_value: i32 },
    Invert,
    Negate,
    Scale { factor: f32, offset: f32 },
    Clamp { min: f32, max: f32 },
    Remap { from: (f32, f32), to: (f32, f32) },
    FloatToInt { rounding: Rounding },
    EnumToInt,
    IntToEnum(EnumTag),
    EnumToString,
    /// `input` is one of bool, int, long, float, double or string.
    Format { template: String, input: ValueType },
    /// `settings: None` uses the defaults from the binding configuration.
    Tween {
        kind: TweenKind,
        settings: Option<TweenSettings>,
    },
    Custom(Box<dyn StageFactory>),
}

impl StageDescriptor {
    /// Wrap an application conversion as a read-only stage.
    pub fn one_way<C: Conversion>(conversion: C) -> Self {
        StageDescriptor::Custom(Box::new(OneWayFactory(conversion)))
    }

    /// Wrap an application conversion as a stage that also writes back.
    pub fn two_way<C: ReversibleConversion>(conversion: C) -> Self {
        StageDescriptor::Custom(Box::new(TwoWayFactory(conversion)))
    }

    pub fn tween(kind: TweenKind) -> Self {
        StageDescriptor::Tween {
            kind,
            settings: None,
        }
    }

    pub fn tween_with(kind: TweenKind, settings: TweenSettings) -> Self {
        StageDescriptor::Tween {
            kind,
            settings: Some(settings),
        }
    }

    /// The catalogue entry for this stage, `None` for custom stages.
    pub fn kind(&self) -> Option<ConverterKind> {
        Some(match self {
            StageDescriptor::FloatToString { .. } => ConverterKind::FloatToString,
            StageDescriptor::ParseFloat => ConverterKind::ParseFloat,
            StageDescriptor::IntToString => ConverterKind::IntToString,
            StageDescriptor::ParseInt => ConverterKind::ParseInt,
            StageDescriptor::BoolToString { .. } => ConverterKind::BoolToString,
            StageDescriptor::IntToBool { .. } => ConverterKind::IntToBool,
            StageDescriptor::Invert => ConverterKind::Invert,
            StageDescriptor::Negate => ConverterKind::Negate,
            StageDescriptor::Scale { .. } => ConverterKind::Scale,
            StageDescriptor::Clamp { .. } => ConverterKind::Clamp,
            StageDescriptor::Remap { .. } => ConverterKind::Remap,
            StageDescriptor::FloatToInt { .. } => ConverterKind::FloatToInt,
            StageDescriptor::EnumToInt => ConverterKind::EnumToInt,
            StageDescriptor::IntToEnum(_) => ConverterKind::IntToEnum,
            StageDescriptor::EnumToString => ConverterKind::EnumToString,
            StageDescriptor::Format { .. } => ConverterKind::Format,
            StageDescriptor::Tween { .. } => ConverterKind::Tween,
            StageDescriptor::Custom(_) => return None,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            StageDescriptor::Custom(factory) => factory.name(),
            StageDescriptor::Tween { kind, .. } => match kind {
                TweenKind::Float => "SmoothDamp (float)",
                TweenKind::Double => "SmoothDamp (double)",
                TweenKind::Angle => "SmoothDamp (angle)",
                TweenKind::Vec2 => "SmoothDamp (vec2)",
                TweenKind::Vec3 => "SmoothDamp (vec3)",
                TweenKind::Color => "SmoothDamp (color)",
            },
            StageDescriptor::FloatToString { .. } => "FloatToString",
            StageDescriptor::ParseFloat => "ParseFloat",
            StageDescriptor::IntToString => "IntToString",
            StageDescriptor::ParseInt => "ParseInt",
            StageDescriptor::BoolToString { .. } => "BoolToString",
            StageDescriptor::IntToBool { .. } => "IntToBool",
            StageDescriptor::Invert => "Invert",
            StageDescriptor::Negate => "Negate",
            StageDescriptor::Scale { .. } => "Scale",
            StageDescriptor::Clamp { .. } => "Clamp",
            StageDescriptor::Remap { .. } => "Remap",
            StageDescriptor::FloatToInt { .. } => "FloatToInt",
            StageDescriptor::EnumToInt => "EnumToInt",
            StageDescriptor::IntToEnum(_) => "IntToEnum",
            StageDescriptor::EnumToString => "EnumToString",
            StageDescriptor::Format { .. } => "Format",
        }
    }

    /// Type the built stage will expect from upstream.
    pub fn input_type(&self) -> ValueType {
        match self {
            StageDescriptor::FloatToString { .. }
            | StageDescriptor::Negate
            | StageDescriptor::Scale { .. }
            | StageDescriptor::Clamp { .. }
            | StageDescriptor::Remap { .. }
            | StageDescriptor::FloatToInt { .. } => ValueType::Float,
            StageDescriptor::ParseFloat | StageDescriptor::ParseInt => ValueType::String,
            StageDescriptor::IntToString | StageDescriptor::IntToBool { .. } => ValueType::Int,
            StageDescriptor::BoolToString { .. } | StageDescriptor::Invert => ValueType::Bool,
            StageDescriptor::EnumToInt | StageDescriptor::EnumToString => ValueType::EnumValue,
            StageDescriptor::IntToEnum(_) => ValueType::Long,
            StageDescriptor::Format { input, .. } => *input,
            StageDescriptor::Tween { kind, .. } => kind.value_type(),
            StageDescriptor::Custom(factory) => factory.input_type(),
        }
    }

    /// Build the stage on top of `prev`, whose output type must already
    /// equal [`StageDescriptor::input_type`].
    pub fn attach(
        self,
        prev: BoxedNode,
        direction: BindingDirection,
        tween_defaults: &TweenSettings,
    ) -> Result<BoxedNode, WiringError> {
        match self {
            StageDescriptor::FloatToString { decimals } => {
                let conversion = match decimals {
                    Some(decimals) => FloatToString::with_decimals(decimals),
                    None => FloatToString::new(),
                };
                two_way(prev, conversion, direction)
            }
            StageDescriptor::ParseFloat => two_way(prev, parse_float(), direction),
            StageDescriptor::IntToString => two_way(prev, IntToString, direction),
            StageDescriptor::ParseInt => two_way(prev, parse_int(), direction),
            StageDescriptor::BoolToString {
                true_text,
                false_text,
            } => one_way(prev, BoolToString::new(true_text, false_text)),
            StageDescriptor::IntToBool { step_value } => {
                two_way(prev, IntToBool::new(step_value)?, direction)
            }
            StageDescriptor::Invert => two_way(prev, Invert, direction),
            StageDescriptor::Negate => two_way(prev, Negate, direction),
            StageDescriptor::Scale { factor, offset } => {
                two_way(prev, Scale::new(factor, offset)?, direction)
            }
            StageDescriptor::Clamp { min, max } => one_way(prev, Clamp::new(min, max)?),
            StageDescriptor::Remap { from, to } => two_way(prev, Remap::new(from, to)?, direction),
            StageDescriptor::FloatToInt { rounding } => {
                two_way(prev, FloatToInt::new(rounding), direction)
            }
            StageDescriptor::EnumToInt => two_way(prev, EnumToInt::new(), direction),
            StageDescriptor::IntToEnum(tag) => two_way(prev, IntToEnum::new(tag), direction),
            StageDescriptor::EnumToString => one_way(prev, EnumToString),
            StageDescriptor::Format { template, input } => match input {
                ValueType::Bool => one_way(prev, Format::<bool>::new(template)?),
                ValueType::Int => one_way(prev, Format::<i32>::new(template)?),
                ValueType::Long => one_way(prev, Format::<i64>::new(template)?),
                ValueType::Float => one_way(prev, Format::<f32>::new(template)?),
                ValueType::Double => one_way(prev, Format::<f64>::new(template)?),
                ValueType::String => one_way(prev, Format::<String>::new(template)?),
                other => Err(WiringError::InvalidParameter {
                    stage: "Format".to_string(),
                    parameter: "input".to_string(),
                    message: format!("{} values cannot be formatted", other),
                }),
            },
            StageDescriptor::Tween { kind, settings } => {
                let settings = settings.unwrap_or(*tween_defaults);
                let node: BoxedNode = match kind {
                    TweenKind::Float => Box::new(FloatTween::attach(prev, settings, direction)?),
                    TweenKind::Double => Box::new(DoubleTween::attach(prev, settings, direction)?),
                    TweenKind::Angle => Box::new(AngleTween::attach(prev, settings, direction)?),
                    TweenKind::Vec2 => Box::new(Vec2Tween::attach(prev, settings, direction)?),
                    TweenKind::Vec3 => Box::new(Vec3Tween::attach(prev, settings, direction)?),
                    TweenKind::Color => Box::new(ColorTween::attach(prev, settings, direction)?),
                };
                Ok(node)
            }
            StageDescriptor::Custom(factory) => factory.attach(prev, direction),
        }
    }
}

impl fmt::Debug for StageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StageDescriptor({} : {})", self.name(), self.input_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_complete() {
        assert_eq!(ConverterKind::all().len(), 17);
        for kind in ConverterKind::all() {
            assert!(!kind.display_name().is_empty());
            assert!(!kind.description().is_empty());
        }
        assert!(ConverterKind::Tween.is_tween());
        assert!(!ConverterKind::Clamp.is_reversible());
        assert!(ConverterKind::IntToBool.is_reversible());
    }

    #[test]
    fn test_descriptor_types() {
        assert_eq!(StageDescriptor::ParseFloat.input_type(), ValueType::String);
        assert_eq!(StageDescriptor::EnumToInt.input_type(), ValueType::EnumValue);
        assert_eq!(
            StageDescriptor::tween(TweenKind::Angle).input_type(),
            ValueType::Float
        );
        assert_eq!(
            StageDescriptor::tween(TweenKind::Color).kind(),
            Some(ConverterKind::Tween)
        );
    }

    #[test]
    fn test_custom_descriptor() {
        use crate::pipeline::nodes::FnConversion;

        let stage = StageDescriptor::one_way(FnConversion::new("Half", |v: f64| v / 2.0));
        assert_eq!(stage.name(), "Half");
        assert_eq!(stage.input_type(), ValueType::Double);
        assert_eq!(stage.kind(), None);
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&TweenKind::Vec3).unwrap();
        assert_eq!(json, "\"Vec3\"");
        let kind: ConverterKind = serde_json::from_str("\"IntToBool\"").unwrap();
        assert_eq!(kind, ConverterKind::IntToBool);
    }
}
