//! Anchor box summaries consumed by detector configurations.

use crate::{common::*, error::KMeansError, iou::avg_iou};

/// An anchor shape in ratio units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub w: f64,
    pub h: f64,
    /// Width over height, rounded to 2 decimal places.
    pub ratio: f64,
}

/// The clustering result with its quality score.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorReport {
    /// Anchors sorted by ascending ratio.
    pub anchors: Vec<Anchor>,
    /// Mean of the best IoU over all boxes.
    pub avg_iou: f64,
}

impl AnchorReport {
    pub fn new(shapes: &[HW<f64>], clusters: &[HW<f64>]) -> Result<Self, KMeansError> {
        let avg_iou = avg_iou(shapes, clusters)?;

        let anchors: Vec<_> = clusters
            .iter()
            .map(|cluster| Anchor {
                w: cluster.w(),
                h: cluster.h(),
                ratio: round2(cluster.ratio()),
            })
            .sorted_by_key(|anchor| (r64(anchor.ratio), r64(anchor.w)))
            .collect();

        Ok(Self { anchors, avg_iou })
    }

    /// The anchor sizes in pixels for the network input size, sorted by area.
    ///
    /// Every side is at least one pixel.
    pub fn pixel_anchors(&self, input_size: &HW<usize>) -> Vec<(usize, usize)> {
        let [input_w, input_h] = input_size.wh();

        self.anchors
            .iter()
            .map(|anchor| {
                let w = (anchor.w * input_w as f64).round().max(1.0) as usize;
                let h = (anchor.h * input_h as f64).round().max(1.0) as usize;
                (w, h)
            })
            .sorted_by_key(|&(w, h)| (w * h, w))
            .collect()
    }

    /// The value of the `anchors` key in a darknet `[yolo]` section.
    pub fn darknet_anchors(&self, input_size: &HW<usize>) -> String {
        self.pixel_anchors(input_size)
            .into_iter()
            .map(|(w, h)| format!("{},{}", w, h))
            .join(", ")
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
