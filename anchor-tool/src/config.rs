//! Anchor estimation program configuration format.

use crate::common::*;
use anchor_kmeans::{AggregateKind, KMeans, KMeansInit};

pub use clustering::*;
pub use dataset::*;
pub use report::*;

pub static CONFIG_VERSION: Lazy<VersionReq> = Lazy::new(|| VersionReq::parse("0.1.0").unwrap());

/// The main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_version")]
    pub version: Version,
    pub dataset: DatasetConfig,
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

mod dataset {
    use super::*;

    /// Dataset options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatasetConfig {
        /// Optional list of whitelisted classes.
        pub class_whitelist: Option<HashSet<String>>,
        /// The dataset configuration.
        pub kind: DatasetKind,
    }

    /// Variants of dataset and options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum DatasetKind {
        /// PASCAL VOC dataset options.
        Voc {
            dataset_dir: PathBuf,
            /// Use the size element in annotations instead of reading images.
            #[serde(default)]
            trust_annotation_size: bool,
        },
        /// CSV dataset options.
        Csv {
            image_dir: PathBuf,
            label_file: PathBuf,
        },
    }
}

mod clustering {
    use super::*;

    /// The k-means options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ClusteringConfig {
        /// The number of anchors.
        pub k: NonZeroUsize,
        /// The per-dimension aggregate of cluster members.
        #[serde(default)]
        pub aggregate: AggregateKind,
        /// The seed of initial cluster sampling. Runs are not reproducible if unset.
        pub seed: Option<u64>,
        /// Give up if box assignment does not settle within this number of iterations.
        #[serde(default = "default_max_iterations")]
        pub max_iterations: NonZeroUsize,
    }

    impl ClusteringConfig {
        pub fn kmeans(&self) -> KMeans<AggregateKind> {
            KMeans::new()
                .with_init(KMeansInit::Forgy { seed: self.seed })
                .with_max_iterations(self.max_iterations.get())
                .with_aggregate(self.aggregate)
        }
    }

    fn default_max_iterations() -> NonZeroUsize {
        NonZeroUsize::new(anchor_kmeans::DEFAULT_MAX_ITERATIONS).unwrap()
    }
}

mod report {
    use super::*;

    /// Output options.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct ReportConfig {
        /// If set, anchors are also printed in pixels for this square network input size.
        pub input_size: Option<NonZeroUsize>,
    }
}

pub fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let version = Version::parse(&text).map_err(|err| {
        D::Error::custom(format!(
            "failed to parse version number '{}': {:?}",
            text, err
        ))
    })?;

    if !CONFIG_VERSION.matches(&version) {
        return Err(D::Error::custom(format!(
            "incompatible version: get '{}', but it is incompatible with requirement '{}'",
            version, &*CONFIG_VERSION,
        )));
    }

    Ok(version)
}
