pub use anyhow::{ensure, format_err, Context as _, Result};
pub use bbox::{RectFloat as _, HW, TLBR};
pub use futures::stream::{self, StreamExt as _, TryStreamExt as _};
pub use itertools::{izip, Itertools as _};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    collections::HashSet,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tracing::{debug, info, trace};
