//! Scalar trait for tensor element types.

use std::fmt::Debug;
use std::ops::{Add, AddAssign};

/// Trait for scalar types carried by dense tensors.
///
/// The bookkeeping core only clones buffers and sums gradients
/// element-wise, so the bounds stay small: copyable, addable, with an
/// additive identity.
pub trait Scalar:
    Copy + Debug + Default + PartialEq + Add<Output = Self> + AddAssign + 'static
{
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;
}

impl Scalar for f32 {
    fn one() -> Self {
        1.0
    }
}

impl Scalar for f64 {
    fn one() -> Self {
        1.0
    }
}
