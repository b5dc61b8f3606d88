//! Fixed thresholds used by the clustering, chaining and classification stages
//!

/// Facing breakend pairs closer than this are treated as overlapping deletion bridges rather
/// than templated insertions
pub const MIN_TEMPLATED_INSERTION_LENGTH: i64 = 30;

/// A deletion bridge at or below this length holds an SV within a group of simple SVs
pub const SHORT_DB_LENGTH: i64 = 30;

/// Templated insertions at or below this length are considered short
pub const SHORT_TI_LENGTH: i64 = 1000;

/// Max chain path length between the two SVs of a chained foldback
pub const MAX_FOLDBACK_CHAIN_LENGTH: i64 = 5000;

/// Max distance from a foldback to the next unresolved breakend of another cluster for the
/// two clusters to be merged
pub const MAX_FOLDBACK_NEXT_CLUSTER_DISTANCE: i64 = 5_000_000;

/// Inner-overlapping inversion pairs overlapping by less than this are resolved as a
/// duplication with templated insertion
pub const MAX_DUP_TI_INV_OVERLAP: i64 = 100_000;

/// Clusters at or below this size with consistent arms get a full chaining attempt in the
/// limited pass
pub const SMALL_CLUSTER_SIZE: usize = 3;

/// Upper bound on the number of logical copies of one SV within a cluster
pub const MAX_SV_REPLICATION: u32 = 16;

/// Absolute and relative tolerance for copy-number equality
pub const CN_ABS_TOLERANCE: f64 = 0.5;
pub const CN_REL_TOLERANCE: f64 = 0.1;

/// Bounds on the per-sample cutoff below which a lone DEL or DUP is a simple SV
pub const MIN_SIMPLE_DEL_DUP_CUTOFF: i64 = 5_000;
pub const MAX_SIMPLE_DEL_DUP_CUTOFF: i64 = 5_000_000;

/// The simple DEL/DUP cutoff is this multiple of the median length of each type
pub const SIMPLE_DEL_DUP_MEDIAN_FACTOR: i64 = 5;
