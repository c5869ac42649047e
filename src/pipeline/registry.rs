//! Implicit conversion registry.
//!
//! A lookup table from a source type family to the target types reachable
//! through an automatically inserted adapter. The wiring algorithm consults
//! it once, when a stage's input type does not match what the previous stage
//! produces. Nothing here runs on the per-tick path.

use crate::pipeline::node::BoxedNode;
use crate::pipeline::nodes::ImplicitConversionNode;
use crate::types::ValueType;
use std::collections::HashMap;

/// Coarse classification used as the registry key.
///
/// Every concrete enum type belongs to [`TypeFamily::Enum`], since the
/// registry cannot list enum types ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Bool,
    Byte,
    Int,
    Long,
    Float,
    Double,
    String,
    Vec2,
    Vec3,
    Color,
    Enum,
    EnumValue,
}

impl TypeFamily {
    pub fn of(value_type: &ValueType) -> Self {
        match value_type {
            ValueType::Bool => TypeFamily::Bool,
            ValueType::Byte => TypeFamily::Byte,
            ValueType::Int => TypeFamily::Int,
            ValueType::Long => TypeFamily::Long,
            ValueType::Float => TypeFamily::Float,
            ValueType::Double => TypeFamily::Double,
            ValueType::String => TypeFamily::String,
            ValueType::Vec2 => TypeFamily::Vec2,
            ValueType::Vec3 => TypeFamily::Vec3,
            ValueType::Color => TypeFamily::Color,
            ValueType::Enum(_) => TypeFamily::Enum,
            ValueType::EnumValue => TypeFamily::EnumValue,
        }
    }
}

/// Which target types a registered conversion can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMatch {
    /// Exactly this type.
    Exact(ValueType),
    /// Any concrete enum type. The factory receives the requested one.
    AnyEnum,
}

impl OutputMatch {
    pub fn matches(&self, target: &ValueType) -> bool {
        match self {
            OutputMatch::Exact(t) => t == target,
            OutputMatch::AnyEnum => matches!(target, ValueType::Enum(_)),
        }
    }
}

/// Builds the adapter around an upstream node, producing `target`.
pub type AdapterFactory = fn(BoxedNode, ValueType) -> BoxedNode;

/// One registered conversion.
#[derive(Clone, Copy)]
pub struct ImplicitConversion {
    pub output: OutputMatch,
    pub factory: AdapterFactory,
}

impl std::fmt::Debug for ImplicitConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplicitConversion")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Table of implicit conversions, keyed by source family.
#[derive(Debug, Clone, Default)]
pub struct ImplicitConversionRegistry {
    entries: HashMap<TypeFamily, Vec<ImplicitConversion>>,
}

impl ImplicitConversionRegistry {
    /// A registry with no conversions: every mismatch is a wiring error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard numeric, bool and enum conversions.
    pub fn with_defaults() -> Self {
        use TypeFamily as F;
        use ValueType as T;

        let mut registry = Self::empty();
        let cast: AdapterFactory = ImplicitConversionNode::boxed;

        let table: &[(TypeFamily, &[ValueType])] = &[
            (F::Bool, &[T::Byte, T::Int, T::Long, T::Float, T::Double]),
            (F::Byte, &[T::Int, T::Long, T::Float, T::Double]),
            (F::Int, &[T::Byte, T::Long, T::Float, T::Double]),
            (F::Long, &[T::Byte, T::Int, T::Float, T::Double]),
            (F::Float, &[T::Byte, T::Int, T::Long, T::Double]),
            (F::Double, &[T::Byte, T::Int, T::Long, T::Float]),
            (F::Enum, &[T::Int, T::Long]),
            (F::EnumValue, &[T::Int, T::Long]),
        ];
        for (family, outputs) in table {
            for output in outputs.iter() {
                registry.register(*family, OutputMatch::Exact(*output), cast);
            }
        }

        // A concrete enum widens to the generic carrier without conversion.
        registry.register(F::Enum, OutputMatch::Exact(T::EnumValue), cast);
        // The carrier narrows to whichever enum type the consumer asks for.
        registry.register(F::EnumValue, OutputMatch::AnyEnum, cast);

        registry
    }

    /// Register a conversion. Later registrations are tried first, so an
    /// application can override a default.
    pub fn register(&mut self, from: TypeFamily, output: OutputMatch, factory: AdapterFactory) {
        self.entries
            .entry(from)
            .or_default()
            .insert(0, ImplicitConversion { output, factory });
    }

    /// Every conversion registered for `family`.
    pub fn outputs(&self, family: TypeFamily) -> &[ImplicitConversion] {
        self.entries.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find a conversion from `from` to `to`.
    pub fn find(&self, from: &ValueType, to: &ValueType) -> Option<&ImplicitConversion> {
        self.outputs(TypeFamily::of(from))
            .iter()
            .find(|conversion| conversion.output.matches(to))
    }

    /// Whether `find` would succeed.
    pub fn can_convert(&self, from: &ValueType, to: &ValueType) -> bool {
        self.find(from, to).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
