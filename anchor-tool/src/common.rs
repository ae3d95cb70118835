pub use anyhow::{ensure, Context as _, Result};
pub use futures::stream::{self, StreamExt as _, TryStreamExt as _};
pub use once_cell::sync::Lazy;
pub use semver::{Version, VersionReq};
pub use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize};
pub use std::{
    collections::HashSet,
    fs,
    num::NonZeroUsize,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tracing::{info, warn};
