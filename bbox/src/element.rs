use crate::common::*;

/// The floating point type that box shapes can be compared in.
pub trait Element: Float {}

impl<T> Element for T where T: Float {}
