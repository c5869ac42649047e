//! Source contract: how a pipeline reaches a property on a host object.
//!
//! The core never discovers properties by itself. A host resolves a property
//! name to a [`Property`], an explicit accessor pair (getter and optional
//! setter) plus the declared [`ValueType`]. Whether the host backs that with
//! plain fields, generated code or a dynamic store is its own business.

pub mod property_bag;

pub use property_bag::PropertyBag;

use crate::enum_value::{BindableEnum, EnumTag, EnumValue};
use crate::types::{Payload, Value, ValueType};
use std::fmt;

/// Reads the current value of a property.
pub type Getter = Box<dyn Fn() -> Value>;

/// Writes a new value. The error string is the host's reason for refusing.
pub type Setter = Box<dyn FnMut(Value) -> Result<(), String>>;

/// An object exposing named, typed properties.
pub trait PropertyHost {
    /// Name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Resolve a property accessor, or `None` if the host has no such property.
    fn property(&self, name: &str) -> Option<Property>;
}

/// Accessor pair for one property of a host object.
pub struct Property {
    name: String,
    value_type: ValueType,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl Property {
    /// A property with no accessors yet.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            getter: None,
            setter: None,
        }
    }

    pub fn with_getter(mut self, getter: impl Fn() -> Value + 'static) -> Self {
        self.getter = Some(Box::new(getter));
        self
    }

    pub fn with_setter(
        mut self,
        setter: impl FnMut(Value) -> Result<(), String> + 'static,
    ) -> Self {
        self.setter = Some(Box::new(setter));
        self
    }

    /// Read-only property backed by a typed getter.
    pub fn read_only<T: Payload>(name: impl Into<String>, get: impl Fn() -> T + 'static) -> Self {
        Self::new(name, T::value_type()).with_getter(move || get().into_value())
    }

    /// Readable and writable property backed by typed closures.
    pub fn read_write<T: Payload>(
        name: impl Into<String>,
        get: impl Fn() -> T + 'static,
        mut set: impl FnMut(T) + 'static,
    ) -> Self {
        Self::read_only(name, get).with_setter(move |value| {
            let typed = T::from_value(value).map_err(|e| e.to_string())?;
            set(typed);
            Ok(())
        })
    }

    /// Readable and writable property holding a concrete enum type.
    pub fn enumeration<E: BindableEnum>(
        name: impl Into<String>,
        get: impl Fn() -> E + 'static,
        mut set: impl FnMut(E) + 'static,
    ) -> Self {
        Self::new(name, ValueType::Enum(EnumTag::of::<E>()))
            .with_getter(move || Value::Enum(EnumValue::of(get())))
            .with_setter(move |value| match value {
                Value::Enum(e) => {
                    set(e.to_enum::<E>().map_err(|err| err.to_string())?);
                    Ok(())
                }
                other => Err(format!("expected enum {}, got {}", E::NAME, other.value_type())),
            })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Current value, or `None` for a write-only property.
    pub fn get(&self) -> Option<Value> {
        self.getter.as_ref().map(|get| get())
    }

    pub fn set(&mut self, value: Value) -> Result<(), String> {
        match self.setter.as_mut() {
            Some(set) => set(value),
            None => Err(format!("property '{}' has no setter", self.name)),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}
