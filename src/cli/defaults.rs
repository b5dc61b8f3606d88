//! Default values of cluster command options, also used by unit tests
//!

/// Max distance between consecutive breakends in one initial cluster
pub const PROXIMITY_DISTANCE: i64 = 5000;

/// Clusters with more unique SVs than this are not chained
pub const CHAINING_SV_LIMIT: usize = 2000;

pub const DM_MIN_JCN: f64 = 5.0;

pub const BFB_MIN_JCN: f64 = 3.0;
