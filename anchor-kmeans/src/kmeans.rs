//! K-means clustering of box shapes with the IoU distance.

use crate::{
    aggregate::{Aggregate, Median},
    common::*,
    error::KMeansError,
    iou::iou_distance,
};

/// The default bound on the number of assign/update rounds.
pub const DEFAULT_MAX_ITERATIONS: usize = 300;

/// The way the initial cluster shapes are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum KMeansInit {
    /// Sample k boxes uniformly without replacement.
    ///
    /// The generator is seeded from entropy if no seed is given.
    Forgy { seed: Option<u64> },
    /// Start from the given shapes.
    Given(Vec<HW<f64>>),
}

impl Default for KMeansInit {
    fn default() -> Self {
        Self::Forgy { seed: None }
    }
}

impl KMeansInit {
    fn initial_clusters(&self, shapes: &[HW<f64>], k: usize) -> Result<Vec<HW<f64>>, KMeansError> {
        let clusters = match self {
            Self::Forgy { seed } => {
                let mut rng = match *seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                rand::seq::index::sample(&mut rng, shapes.len(), k)
                    .into_iter()
                    .map(|index| shapes[index])
                    .collect()
            }
            Self::Given(clusters) => {
                if clusters.len() != k {
                    return Err(KMeansError::InvalidInitialClusters {
                        expected: k,
                        found: clusters.len(),
                    });
                }
                check_shapes(clusters)?;
                clusters.clone()
            }
        };
        Ok(clusters)
    }
}

/// The converged clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct Clusters {
    /// The k representative shapes.
    pub clusters: Vec<HW<f64>>,
    /// The cluster index of each input box that terminated the loop.
    pub assignment: Vec<usize>,
    /// The number of update rounds performed.
    pub iterations: usize,
}

/// The IoU k-means clustering options.
///
/// The instance holds no state of a run and can be shared by concurrent runs.
#[derive(Debug, Clone)]
pub struct KMeans<A = Median> {
    pub init: KMeansInit,
    pub aggregate: A,
    pub max_iterations: usize,
}

impl Default for KMeans<Median> {
    fn default() -> Self {
        Self {
            init: KMeansInit::default(),
            aggregate: Median,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KMeans<Median> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A> KMeans<A>
where
    A: Aggregate,
{
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            init: KMeansInit::Forgy { seed: Some(seed) },
            ..self
        }
    }

    pub fn with_init(self, init: KMeansInit) -> Self {
        Self { init, ..self }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    pub fn with_aggregate<B>(self, aggregate: B) -> KMeans<B>
    where
        B: Aggregate,
    {
        let Self {
            init,
            max_iterations,
            ..
        } = self;

        KMeans {
            init,
            aggregate,
            max_iterations,
        }
    }

    /// Partition the box shapes into k clusters.
    ///
    /// A run converges when an assignment repeats the previous one, and it is
    /// allowed up to `max_iterations` update rounds to get there.
    pub fn fit(&self, shapes: &[HW<f64>], k: usize) -> Result<Clusters, KMeansError> {
        check_shapes(shapes)?;

        let distinct = shapes
            .iter()
            .map(|shape| (r64(shape.w()), r64(shape.h())))
            .unique()
            .count();

        if k == 0 || distinct < k {
            return Err(KMeansError::InsufficientData {
                boxes: shapes.len(),
                distinct,
                k,
            });
        }

        let mut clusters = self.init.initial_clusters(shapes, k)?;
        let mut last_assignment: Option<Vec<usize>> = None;

        for iteration in 0..=self.max_iterations {
            let assignment = assign(shapes, &clusters)?;

            match &last_assignment {
                Some(last) if *last == assignment => {
                    debug!("converged after {} iterations", iteration);
                    return Ok(Clusters {
                        clusters,
                        assignment,
                        iterations: iteration,
                    });
                }
                Some(last) => {
                    let num_moved = izip!(last, &assignment).filter(|(l, r)| l != r).count();
                    trace!("iteration {}: {} boxes moved", iteration, num_moved);
                }
                None => {}
            }

            if iteration == self.max_iterations {
                break;
            }

            clusters = (0..k)
                .map(|cluster| {
                    let members: Vec<HW<f64>> = izip!(shapes, &assignment)
                        .filter(|(_, index)| **index == cluster)
                        .map(|(shape, _)| *shape)
                        .collect();

                    if members.is_empty() {
                        return Err(KMeansError::EmptyCluster { cluster, iteration });
                    }

                    Ok(self.aggregate.aggregate(&members))
                })
                .try_collect()?;

            last_assignment = Some(assignment);
        }

        Err(KMeansError::NoConvergence {
            max_iterations: self.max_iterations,
        })
    }
}

/// Assign each box to its nearest cluster in IoU distance.
///
/// Ties go to the cluster with the lowest index.
pub fn assign(shapes: &[HW<f64>], clusters: &[HW<f64>]) -> Result<Vec<usize>, KMeansError> {
    shapes
        .iter()
        .map(|shape| {
            let distances = iou_distance(shape, clusters)?;
            let nearest = distances
                .into_iter()
                .map(r64)
                .position_min()
                .unwrap_or(0);
            Ok(nearest)
        })
        .collect()
}

fn check_shapes(shapes: &[HW<f64>]) -> Result<(), KMeansError> {
    match shapes.iter().position(|shape| !shape.has_area()) {
        Some(index) => Err(KMeansError::DegenerateBox {
            index,
            w: shapes[index].w(),
            h: shapes[index].h(),
        }),
        None => Ok(()),
    }
}
