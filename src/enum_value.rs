//! Allocation-free carrier for enum values of any concrete type.
//!
//! A single generic pipeline can move values of arbitrary enum types around
//! as an [`EnumValue`]: an integer payload plus an [`EnumTag`] naming the
//! concrete type. Converting back into a concrete enum is checked against
//! both the tag and the enum's storage width.

use crate::pipeline::error::ConversionError;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Underlying storage width of an enum. The carrier payload is an `i64`,
/// so every width here fits in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
}

impl IntWidth {
    pub const fn min(self) -> i64 {
        match self {
            IntWidth::I8 => i8::MIN as i64,
            IntWidth::I16 => i16::MIN as i64,
            IntWidth::I32 => i32::MIN as i64,
            IntWidth::I64 => i64::MIN,
            IntWidth::U8 | IntWidth::U16 | IntWidth::U32 => 0,
        }
    }

    pub const fn max(self) -> i64 {
        match self {
            IntWidth::I8 => i8::MAX as i64,
            IntWidth::U8 => u8::MAX as i64,
            IntWidth::I16 => i16::MAX as i64,
            IntWidth::U16 => u16::MAX as i64,
            IntWidth::I32 => i32::MAX as i64,
            IntWidth::U32 => u32::MAX as i64,
            IntWidth::I64 => i64::MAX,
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            IntWidth::I8 | IntWidth::U8 => 8,
            IntWidth::I16 | IntWidth::U16 => 16,
            IntWidth::I32 | IntWidth::U32 => 32,
            IntWidth::I64 => 64,
        }
    }

    /// Whether `value` is representable in this width.
    pub fn contains(self, value: i64) -> bool {
        value >= self.min() && value <= self.max()
    }
}

/// An enum type that can be bound through a pipeline.
///
/// ```
/// use propbind_rs::enum_value::{BindableEnum, IntWidth};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// #[repr(u8)]
/// enum Quality {
///     Low = 0,
///     High = 1,
/// }
///
/// impl BindableEnum for Quality {
///     const NAME: &'static str = "Quality";
///     const WIDTH: IntWidth = IntWidth::U8;
///
///     fn to_repr(self) -> i64 {
///         self as i64
///     }
///
///     fn from_repr(value: i64) -> Option<Self> {
///         match value {
///             0 => Some(Quality::Low),
///             1 => Some(Quality::High),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait BindableEnum: Copy + fmt::Debug + 'static {
    /// Type name used in diagnostics.
    const NAME: &'static str;
    /// Storage width of the discriminant.
    const WIDTH: IntWidth;

    fn to_repr(self) -> i64;

    /// `None` when no variant has this discriminant.
    fn from_repr(value: i64) -> Option<Self>;

    /// Variant name for display purposes. `None` falls back to the raw discriminant.
    fn variant_name(value: i64) -> Option<&'static str> {
        let _ = value;
        None
    }
}

fn is_variant_of<E: BindableEnum>(value: i64) -> bool {
    E::from_repr(value).is_some()
}

/// Runtime type tag of a concrete enum type.
///
/// Two tags are equal exactly when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct EnumTag {
    name: &'static str,
    type_id: TypeId,
    width: IntWidth,
    is_variant: fn(i64) -> bool,
    variant_name: fn(i64) -> Option<&'static str>,
}

impl EnumTag {
    pub fn of<E: BindableEnum>() -> Self {
        Self {
            name: E::NAME,
            type_id: TypeId::of::<E>(),
            width: E::WIDTH,
            is_variant: is_variant_of::<E>,
            variant_name: E::variant_name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn width(&self) -> IntWidth {
        self.width
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether `value` is the discriminant of a declared variant.
    pub fn is_variant(&self, value: i64) -> bool {
        (self.is_variant)(value)
    }

    pub fn variant_name(&self, value: i64) -> Option<&'static str> {
        (self.variant_name)(value)
    }
}

impl PartialEq for EnumTag {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EnumTag {}

impl Hash for EnumTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EnumTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumTag({})", self.name)
    }
}

impl fmt::Display for EnumTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An enum value: integer payload plus the tag of its concrete type.
///
/// Equality requires both fields to match, so the same discriminant in two
/// different enum types never compares equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    value: i64,
    tag: EnumTag,
}

impl EnumValue {
    /// Build a carrier from a raw payload, checking it fits the tag's width.
    pub fn new(value: i64, tag: EnumTag) -> Result<Self, ConversionError> {
        if !tag.width().contains(value) {
            return Err(ConversionError::OutOfRange {
                value: value.to_string(),
                target: tag.name().to_string(),
            });
        }
        Ok(Self { value, tag })
    }

    /// Wrap a concrete enum value.
    pub fn of<E: BindableEnum>(value: E) -> Self {
        Self {
            value: value.to_repr(),
            tag: EnumTag::of::<E>(),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn tag(&self) -> EnumTag {
        self.tag
    }

    /// Whether this carrier holds a value of `E`.
    pub fn is<E: BindableEnum>(&self) -> bool {
        self.tag.type_id() == TypeId::of::<E>()
    }

    /// Same enum type, different payload.
    pub fn with_value(self, value: i64) -> Result<Self, ConversionError> {
        Self::new(value, self.tag)
    }

    /// Unwrap into the concrete enum type.
    pub fn to_enum<E: BindableEnum>(&self) -> Result<E, ConversionError> {
        if !self.is::<E>() {
            return Err(ConversionError::EnumTypeMismatch {
                expected: E::NAME.to_string(),
                actual: self.tag.name().to_string(),
            });
        }
        if !E::WIDTH.contains(self.value) {
            return Err(ConversionError::OutOfRange {
                value: self.value.to_string(),
                target: E::NAME.to_string(),
            });
        }
        E::from_repr(self.value).ok_or_else(|| ConversionError::UnknownVariant {
            enum_name: E::NAME.to_string(),
            value: self.value,
        })
    }

    pub fn variant_name(&self) -> Option<&'static str> {
        self.tag.variant_name(self.value)
    }
}
