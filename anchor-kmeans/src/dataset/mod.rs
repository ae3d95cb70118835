//! Dataset loaders that turn annotated boxes into normalized box shapes.

mod csv;
mod dataset;
mod record;
mod voc;

pub use self::csv::*;
pub use dataset::*;
pub use record::*;
pub use voc::*;
