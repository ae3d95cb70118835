use thiserror::Error;

/// The failures of the anchor clustering procedure.
///
/// None of them are recovered internally. A failed run yields no clusters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KMeansError {
    /// `index` is the position of the shape in the slice it was found in.
    #[error("box {index} with width {w} and height {h} has no area")]
    DegenerateBox { index: usize, w: f64, h: f64 },
    #[error("cluster {cluster} has no members at iteration {iteration}")]
    EmptyCluster { cluster: usize, iteration: usize },
    #[error("cannot form {k} clusters from {boxes} boxes ({distinct} distinct)")]
    InsufficientData {
        boxes: usize,
        distinct: usize,
        k: usize,
    },
    #[error("box assignment did not settle within {max_iterations} iterations")]
    NoConvergence { max_iterations: usize },
    #[error("expect {expected} initial clusters, but get {found}")]
    InvalidInitialClusters { expected: usize, found: usize },
}
