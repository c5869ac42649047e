//! Identity types for the pipeline system.
//!
//! A `BindingId` is handed out once per bound pipeline and never reused, so an
//! id kept after `unbind` can not reach a later binding.

use std::fmt;

/// Key of one binding in a `Scheduler`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BindingId(pub u64);

impl BindingId {
    /// The id issued after this one.
    #[inline]
    pub fn next(self) -> BindingId {
        BindingId(self.0 + 1)
    }
}

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingId({})", self.0)
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
