use crate::cli::ClusterSettings;

/// Thresholds and switches shared by all per-sample pipeline stages
///
/// This is built once from the command-line settings and never modified during a run.
///
#[derive(Clone, Debug)]
pub struct ClusteringConfig {
    /// Consecutive breakends closer than this are placed in the same initial cluster
    pub proximity_distance: i64,

    /// Clusters with more unique SVs than this are not chained
    pub chaining_sv_limit: usize,

    pub annotate_double_minutes: bool,
    pub annotate_bfb: bool,

    /// Minimum JCN of every SV in a double-minute candidate
    pub dm_min_jcn: f64,

    /// Minimum max-foldback JCN for a BFB annotation
    pub bfb_min_jcn: f64,

    /// Run clustering consistency checks after each major stage
    pub run_validation: bool,

    /// Print per-cluster trace messages directly to stderr
    pub log_verbose: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        use crate::cli::defaults::*;
        Self {
            proximity_distance: PROXIMITY_DISTANCE,
            chaining_sv_limit: CHAINING_SV_LIMIT,
            annotate_double_minutes: true,
            annotate_bfb: true,
            dm_min_jcn: DM_MIN_JCN,
            bfb_min_jcn: BFB_MIN_JCN,
            run_validation: false,
            log_verbose: false,
        }
    }
}

impl ClusteringConfig {
    pub fn new(settings: &ClusterSettings) -> Self {
        Self {
            proximity_distance: settings.proximity_distance,
            chaining_sv_limit: settings.chaining_sv_limit,
            annotate_double_minutes: !settings.skip_annotations,
            annotate_bfb: !settings.skip_annotations,
            dm_min_jcn: settings.dm_min_jcn,
            bfb_min_jcn: settings.bfb_min_jcn,
            run_validation: settings.run_validation,
            log_verbose: settings.log_verbose,
        }
    }
}
