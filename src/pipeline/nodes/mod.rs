//! Built-in pipeline node implementations.

pub mod converter;
pub mod converters;
pub mod implicit;
pub mod property_adapter;
pub mod tween;

pub use converter::{
    Conversion, FnConversion, OneWayConverter, Reversed, ReversibleConversion, TwoWayConverter,
};
pub use converters::{
    parse_float, parse_int, BoolToString, Clamp, EnumToInt, EnumToString, FloatToInt,
    FloatToString, Format, IntToBool, IntToEnum, IntToString, Invert, Negate, Remap, Rounding,
    Scale,
};
pub use implicit::ImplicitConversionNode;
pub use property_adapter::PropertyAdapter;
pub use tween::{
    AngleTween, ColorTween, DoubleTween, FloatTween, TweenStage, Vec2Tween, Vec3Tween,
};
