//! Strategies that reduce the members of a cluster to one representative shape.

use crate::common::*;

/// Reduce a non-empty collection of shapes to a single shape.
///
/// The clustering engine never calls it with an empty slice.
pub trait Aggregate {
    fn aggregate(&self, members: &[HW<f64>]) -> HW<f64>;
}

impl<F> Aggregate for F
where
    F: Fn(&[HW<f64>]) -> HW<f64>,
{
    fn aggregate(&self, members: &[HW<f64>]) -> HW<f64> {
        self(members)
    }
}

/// Per-dimension median. Width and height are aggregated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Median;

impl Aggregate for Median {
    fn aggregate(&self, members: &[HW<f64>]) -> HW<f64> {
        let w = median(members.iter().map(|shape| shape.w()));
        let h = median(members.iter().map(|shape| shape.h()));
        HW::from_wh([w, h])
    }
}

/// Per-dimension arithmetic mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mean;

impl Aggregate for Mean {
    fn aggregate(&self, members: &[HW<f64>]) -> HW<f64> {
        let len = members.len() as f64;
        let w = members.iter().map(|shape| shape.w()).sum::<f64>() / len;
        let h = members.iter().map(|shape| shape.h()).sum::<f64>() / len;
        HW::from_wh([w, h])
    }
}

/// The aggregation strategy selectable from configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    #[default]
    Median,
    Mean,
}

impl Aggregate for AggregateKind {
    fn aggregate(&self, members: &[HW<f64>]) -> HW<f64> {
        match self {
            Self::Median => Median.aggregate(members),
            Self::Mean => Mean.aggregate(members),
        }
    }
}

/// Median of the values. An even count takes the mean of the two middle values.
fn median(values: impl IntoIterator<Item = f64>) -> f64 {
    let sorted: Vec<R64> = values.into_iter().map(r64).sorted().collect();
    let len = sorted.len();
    let mid = len / 2;

    if len % 2 == 1 {
        sorted[mid].raw()
    } else {
        (sorted[mid - 1].raw() + sorted[mid].raw()) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn wh(w: f64, h: f64) -> HW<f64> {
        HW::from_wh([w, h])
    }

    #[test]
    fn median_odd_count() {
        let members = [wh(0.3, 0.1), wh(0.1, 0.9), wh(0.2, 0.5)];
        let shape = Median.aggregate(&members);
        assert_abs_diff_eq!(shape.w(), 0.2);
        assert_abs_diff_eq!(shape.h(), 0.5);
    }

    #[test]
    fn median_even_count() {
        let members = [wh(0.4, 0.1), wh(0.1, 0.2), wh(0.2, 0.8), wh(0.3, 0.4)];
        let shape = Median.aggregate(&members);
        assert_abs_diff_eq!(shape.w(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(shape.h(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn mean_aggregate() {
        let members = [wh(0.4, 0.1), wh(0.2, 0.3)];
        let shape = AggregateKind::Mean.aggregate(&members);
        assert_abs_diff_eq!(shape.w(), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(shape.h(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn closure_aggregate() {
        let first = |members: &[HW<f64>]| members[0];
        let shape = first.aggregate(&[wh(0.7, 0.2), wh(0.1, 0.1)]);
        assert_eq!(shape, wh(0.7, 0.2));
    }
}
