use crate::{common::*, error::KMeansError};

/// Compute the IoU of a box shape against each of the cluster shapes.
///
/// All shapes are compared at a common origin. The call fails if any pairing
/// involves a shape with no area, rather than producing a 0/0 ratio.
///
/// A degenerate cluster is reported with its index in `clusters`. A degenerate
/// box is checked first and reported with index 0.
pub fn iou(shape: &HW<f64>, clusters: &[HW<f64>]) -> Result<Vec<f64>, KMeansError> {
    if !clusters.is_empty() && !shape.has_area() {
        return Err(KMeansError::DegenerateBox {
            index: 0,
            w: shape.w(),
            h: shape.h(),
        });
    }

    clusters
        .iter()
        .enumerate()
        .map(|(index, cluster)| {
            if !cluster.has_area() {
                return Err(KMeansError::DegenerateBox {
                    index,
                    w: cluster.w(),
                    h: cluster.h(),
                });
            }

            Ok(shape.iou_with(cluster))
        })
        .collect()
}

/// The IoU distance, `1 - IoU`, of a box shape to each of the clusters.
pub fn iou_distance(shape: &HW<f64>, clusters: &[HW<f64>]) -> Result<Vec<f64>, KMeansError> {
    Ok(iou(shape, clusters)?
        .into_iter()
        .map(|iou| 1.0 - iou)
        .collect())
}

/// The mean over all boxes of the IoU with their best matching cluster.
pub fn avg_iou(shapes: &[HW<f64>], clusters: &[HW<f64>]) -> Result<f64, KMeansError> {
    if shapes.is_empty() || clusters.is_empty() {
        return Err(KMeansError::InsufficientData {
            boxes: shapes.len(),
            distinct: 0,
            k: clusters.len(),
        });
    }

    let sum: f64 = shapes
        .iter()
        .map(|shape| -> Result<_, KMeansError> {
            let best = iou(shape, clusters)?.into_iter().fold(0.0, f64::max);
            Ok(best)
        })
        .sum::<Result<f64, _>>()?;

    Ok(sum / shapes.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn wh(w: f64, h: f64) -> HW<f64> {
        HW::from_wh([w, h])
    }

    #[test]
    fn iou_within_unit_range() {
        let clusters = vec![wh(0.1, 0.9), wh(0.5, 0.5), wh(0.9, 0.1), wh(0.02, 0.03)];
        let shapes = [wh(0.3, 0.7), wh(1.0, 1.0), wh(0.01, 0.5), wh(0.5, 0.5)];

        for shape in &shapes {
            let ious = iou(shape, &clusters).unwrap();
            assert_eq!(ious.len(), clusters.len());
            assert!(ious.iter().all(|&iou| (0.0..=1.0).contains(&iou)));
        }
    }

    #[test]
    fn iou_of_identical_shape() {
        let clusters = vec![wh(0.1, 0.9), wh(0.3, 0.4)];
        let ious = iou(&wh(0.3, 0.4), &clusters).unwrap();
        assert_abs_diff_eq!(ious[1], 1.0);
        assert!(ious[0] < 1.0);
    }

    #[test]
    fn iou_known_value() {
        let ious = iou(&wh(0.4, 0.2), &[wh(0.2, 0.4)]).unwrap();
        assert_abs_diff_eq!(ious[0], 1.0 / 3.0, epsilon = 1e-12);

        let dists = iou_distance(&wh(0.4, 0.2), &[wh(0.2, 0.4)]).unwrap();
        assert_abs_diff_eq!(dists[0], 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn iou_degenerate_box() {
        let err = iou(&wh(0.0, 0.5), &[wh(0.2, 0.4)]).unwrap_err();
        assert_eq!(
            err,
            KMeansError::DegenerateBox {
                index: 0,
                w: 0.0,
                h: 0.5
            }
        );

        let err = iou(&wh(0.2, 0.5), &[wh(0.2, 0.4), wh(0.3, 0.0)]).unwrap_err();
        assert_eq!(
            err,
            KMeansError::DegenerateBox {
                index: 1,
                w: 0.3,
                h: 0.0
            }
        );
    }

    #[test]
    fn avg_iou_order_invariant() {
        let shapes = vec![wh(0.3, 0.7), wh(0.6, 0.2), wh(0.05, 0.1), wh(0.5, 0.5)];
        let clusters = vec![wh(0.1, 0.2), wh(0.4, 0.4), wh(0.2, 0.6)];
        let expect = avg_iou(&shapes, &clusters).unwrap();

        let mut rev_shapes = shapes.clone();
        rev_shapes.reverse();
        let mut rev_clusters = clusters.clone();
        rev_clusters.rotate_left(1);

        assert_abs_diff_eq!(avg_iou(&rev_shapes, &clusters).unwrap(), expect, epsilon = 1e-12);
        assert_abs_diff_eq!(avg_iou(&shapes, &rev_clusters).unwrap(), expect, epsilon = 1e-12);
        assert!((0.0..=1.0).contains(&expect));
    }

    #[test]
    fn avg_iou_empty_input() {
        assert!(matches!(
            avg_iou(&[], &[wh(0.1, 0.1)]),
            Err(KMeansError::InsufficientData { .. })
        ));
        assert!(matches!(
            avg_iou(&[wh(0.1, 0.1)], &[]),
            Err(KMeansError::InsufficientData { .. })
        ));
    }
}
