//! Converter stages.
//!
//! A converter is written against typed payloads by implementing
//! [`Conversion`] (and [`ReversibleConversion`] if it can run backwards).
//! [`OneWayConverter`] and [`TwoWayConverter`] turn one into a pipeline
//! [`Node`]: they unwrap the upstream [`Value`], call the typed function and
//! forward the upstream change signal unchanged. An idle upstream
//! (`NotChanged`) never reaches the conversion function.

use crate::pipeline::error::{PipelineError, PipelineResult, WiringError};
use crate::pipeline::node::{BindingDirection, BoxedNode, Node, TickContext};
use crate::types::{Payload, Polled, Value, ValueType};
use std::marker::PhantomData;

/// A typed, forward value transformation.
pub trait Conversion: 'static {
    type Input: Payload;
    type Output: Payload;

    fn name(&self) -> &str;

    /// Declared input type. Override when it depends on configuration.
    fn input_type(&self) -> ValueType {
        Self::Input::value_type()
    }

    /// Declared output type. Override when it depends on configuration.
    fn output_type(&self) -> ValueType {
        Self::Output::value_type()
    }

    fn convert(&mut self, input: Self::Input) -> PipelineResult<Self::Output>;
}

/// A conversion that can also map a downstream value back upstream.
pub trait ReversibleConversion: Conversion {
    fn convert_back(&mut self, output: Self::Output) -> PipelineResult<Self::Input>;

    /// Whether `convert_back` can succeed at all. Checked at wiring time.
    fn can_convert_back(&self) -> bool {
        true
    }
}

fn check_input(prev: &dyn Node, stage: &str, required: ValueType) -> Result<(), WiringError> {
    let produced = prev.output_type();
    if produced != required {
        return Err(WiringError::TypeMismatch {
            from_stage: prev.name().to_string(),
            from_type: produced,
            to_stage: stage.to_string(),
            to_type: required,
        });
    }
    Ok(())
}

/// Read-only converter stage.
pub struct OneWayConverter<C: Conversion> {
    prev: BoxedNode,
    conversion: C,
}

impl<C: Conversion> OneWayConverter<C> {
    /// Splice `conversion` after `prev`. Types must already match exactly;
    /// bridging mismatches is the wiring algorithm's job.
    pub fn attach(prev: BoxedNode, conversion: C) -> Result<Self, WiringError> {
        check_input(prev.as_ref(), conversion.name(), conversion.input_type())?;
        tracing::debug!(
            "Attached '{}' ({} -> {})",
            conversion.name(),
            conversion.input_type(),
            conversion.output_type()
        );
        Ok(Self { prev, conversion })
    }

    pub fn conversion(&self) -> &C {
        &self.conversion
    }
}

impl<C: Conversion> Node for OneWayConverter<C> {
    fn name(&self) -> &str {
        self.conversion.name()
    }

    fn input_type(&self) -> ValueType {
        self.conversion.input_type()
    }

    fn output_type(&self) -> ValueType {
        self.conversion.output_type()
    }

    fn try_get_value(&mut self, ctx: &TickContext) -> PipelineResult<Polled<Value>> {
        let polled = self.prev.try_get_value(ctx)?;
        let conversion = &mut self.conversion;
        polled.try_map(|value| {
            let input = C::Input::from_value(value)?;
            Ok(conversion.convert(input)?.into_value())
        })
    }

    fn upstream(&self) -> Option<&dyn Node> {
        Some(self.prev.as_ref())
    }
}

/// Converter stage that also writes back upstream.
pub struct TwoWayConverter<C: ReversibleConversion> {
    prev: BoxedNode,
    conversion: C,
}

impl<C: ReversibleConversion> TwoWayConverter<C> {
    /// Splice `conversion` after `prev`. In a two-way binding the upstream
    /// must itself be two-way and the conversion must be able to run back.
    pub fn attach(
        prev: BoxedNode,
        conversion: C,
        direction: BindingDirection,
    ) -> Result<Self, WiringError> {
        check_input(prev.as_ref(), conversion.name(), conversion.input_type())?;
        if direction.is_two_way() {
            if !prev.is_two_way() {
                return Err(WiringError::NotTwoWay {
                    stage: prev.name().to_string(),
                });
            }
            if !conversion.can_convert_back() {
                return Err(WiringError::NotTwoWay {
                    stage: conversion.name().to_string(),
                });
            }
        }
        tracing::debug!(
            "Attached '{}' ({} <-> {})",
            conversion.name(),
            conversion.input_type(),
            conversion.output_type()
        );
        Ok(Self { prev, conversion })
    }

    pub fn conversion(&self) -> &C {
        &self.conversion
    }
}

impl<C: ReversibleConversion> Node for TwoWayConverter<C> {
    fn name(&self) -> &str {
        self.conversion.name()
    }

    fn input_type(&self) -> ValueType {
        self.conversion.input_type()
    }

    fn output_type(&self) -> ValueType {
        self.conversion.output_type()
    }

    fn is_two_way(&self) -> bool {
        self.prev.is_two_way() && self.conversion.can_convert_back()
    }

    fn try_get_value(&mut self, ctx: &TickContext) -> PipelineResult<Polled<Value>> {
        let polled = self.prev.try_get_value(ctx)?;
        let conversion = &mut self.conversion;
        polled.try_map(|value| {
            let input = C::Input::from_value(value)?;
            Ok(conversion.convert(input)?.into_value())
        })
    }

    fn set_value(&mut self, value: Value) -> PipelineResult<()> {
        if !self.is_two_way() {
            return Err(PipelineError::ReadOnly {
                stage: self.conversion.name().to_string(),
            });
        }
        let output = C::Output::from_value(value)?;
        let input = self.conversion.convert_back(output)?;
        self.prev.set_value(input.into_value())
    }

    fn upstream(&self) -> Option<&dyn Node> {
        Some(self.prev.as_ref())
    }
}

/// Runs a reversible conversion backwards, e.g. a parser out of a formatter.
pub struct Reversed<C: ReversibleConversion> {
    inner: C,
    name: String,
}

impl<C: ReversibleConversion> Reversed<C> {
    pub fn new(inner: C) -> Self {
        let name = format!("{} (reversed)", inner.name());
        Self { inner, name }
    }

    pub fn named(inner: C, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }
}

impl<C: ReversibleConversion> Conversion for Reversed<C> {
    type Input = C::Output;
    type Output = C::Input;

    fn name(&self) -> &str {
        &self.name
    }

    fn input_type(&self) -> ValueType {
        self.inner.output_type()
    }

    fn output_type(&self) -> ValueType {
        self.inner.input_type()
    }

    fn convert(&mut self, input: C::Output) -> PipelineResult<C::Input> {
        self.inner.convert_back(input)
    }
}

impl<C: ReversibleConversion> ReversibleConversion for Reversed<C> {
    fn convert_back(&mut self, output: C::Input) -> PipelineResult<C::Output> {
        self.inner.convert(output)
    }

    // Reading through a reversed stage already needs the inner inverse.
    fn can_convert_back(&self) -> bool {
        self.inner.can_convert_back()
    }
}

type ForwardFn<I, O> = Box<dyn FnMut(I) -> PipelineResult<O>>;

/// Conversion built from closures, for application-specific stages.
pub struct FnConversion<I: Payload, O: Payload> {
    name: String,
    forward: ForwardFn<I, O>,
    backward: Option<ForwardFn<O, I>>,
    _types: PhantomData<fn(I) -> O>,
}

impl<I: Payload, O: Payload> FnConversion<I, O> {
    pub fn new(name: impl Into<String>, forward: impl FnMut(I) -> O + 'static) -> Self {
        let mut forward = forward;
        Self::fallible(name, move |input| Ok(forward(input)))
    }

    pub fn fallible(
        name: impl Into<String>,
        forward: impl FnMut(I) -> PipelineResult<O> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            forward: Box::new(forward),
            backward: None,
            _types: PhantomData,
        }
    }

    pub fn with_inverse(mut self, backward: impl FnMut(O) -> I + 'static) -> Self {
        let mut backward = backward;
        self.backward = Some(Box::new(move |output| Ok(backward(output))));
        self
    }

    pub fn has_inverse(&self) -> bool {
        self.backward.is_some()
    }
}

impl<I: Payload, O: Payload> Conversion for FnConversion<I, O> {
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&mut self, input: I) -> PipelineResult<O> {
        (self.forward)(input)
    }
}

impl<I: Payload, O: Payload> ReversibleConversion for FnConversion<I, O> {
    fn convert_back(&mut self, output: O) -> PipelineResult<I> {
        match self.backward.as_mut() {
            Some(backward) => backward(output),
            None => Err(PipelineError::ReadOnly {
                stage: self.name.clone(),
            }),
        }
    }

    fn can_convert_back(&self) -> bool {
        self.has_inverse()
    }
}
