//! Pipeline-specific error types.
//!
//! Everything here is local to one binding: a failing binding reports its
//! error and the scheduler keeps ticking every other binding.

use crate::types::ValueType;
use thiserror::Error;

/// A binding could not be assembled. Raised once, at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WiringError {
    #[error("property '{property}' not found on {host}")]
    MissingProperty { host: String, property: String },

    #[error("property '{property}' on {host} is not readable")]
    Unreadable { host: String, property: String },

    #[error("property '{property}' on {host} is not writable")]
    Unwritable { host: String, property: String },

    #[error(
        "no implicit conversion from '{from_stage}' ({from_type}) to '{to_stage}' ({to_type})"
    )]
    TypeMismatch {
        from_stage: String,
        from_type: ValueType,
        to_stage: String,
        to_type: ValueType,
    },

    #[error("stage '{stage}' cannot write back upstream in a two-way binding")]
    NotTwoWay { stage: String },

    #[error("invalid parameter '{parameter}' for '{stage}': {message}")]
    InvalidParameter {
        stage: String,
        parameter: String,
        message: String,
    },
}

/// A value could not be represented in its target type at runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: String },

    #[error("NaN cannot be converted to {target}")]
    NotANumber { target: ValueType },

    #[error("expected enum {expected}, got enum {actual}")]
    EnumTypeMismatch { expected: String, actual: String },

    #[error("{value} is not a variant of {enum_name}")]
    UnknownVariant { enum_name: String, value: i64 },

    #[error("expected {expected} payload, got {actual}")]
    PayloadMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("cannot parse {input:?} as {target}")]
    Parse { input: String, target: ValueType },
}

/// A write reached an enum-carrying stage before any read told it which enum
/// type it is carrying.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("write to '{stage}' before its enum type was observed by a read")]
pub struct StaleStateError {
    pub stage: String,
}

/// Errors that can occur within the pipeline system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Wiring error: {0}")]
    Wiring(#[from] WiringError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Stale state: {0}")]
    StaleState(#[from] StaleStateError),

    #[error("stage '{stage}' is read-only")]
    ReadOnly { stage: String },

    #[error("host rejected write to '{property}': {message}")]
    HostWrite { property: String, message: String },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
