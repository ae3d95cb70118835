//! Anchor box estimation by k-means clustering over box shapes.
//!
//! The clustering compares shapes by their intersection over union when
//! anchored at a common origin, rather than by Euclidean distance.

mod common;
pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod iou;
pub mod kmeans;
pub mod report;

pub use aggregate::*;
pub use error::*;
pub use iou::*;
pub use kmeans::*;
pub use report::*;
