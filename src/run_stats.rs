//! Track stats for the whole svchain run
//!

use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use unwrap::unwrap;

use crate::analyser::SampleClusteringResult;

pub const RUN_STATS_FILENAME: &str = "run_stats.json";

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    Complete,
    Failed,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SampleRunStats {
    pub sample_id: String,
    pub status: SampleStatus,
    pub sv_count: usize,
    pub cluster_count: usize,
    pub resolved_cluster_count: usize,
    pub chaining_skipped_cluster_count: usize,
    pub merge_count: usize,

    /// Reason the sample was skipped, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub total_sample_time_secs: f64,
}

impl SampleRunStats {
    pub fn from_result(result: &SampleClusteringResult, total_sample_time_secs: f64) -> Self {
        Self {
            sample_id: result.sample_id.clone(),
            status: SampleStatus::Complete,
            sv_count: result.svs.len(),
            cluster_count: result.clusters.len(),
            resolved_cluster_count: result.resolved_cluster_count(),
            chaining_skipped_cluster_count: result.chaining_skipped_count(),
            merge_count: result.merge_count,
            error: None,
            total_sample_time_secs,
        }
    }

    pub fn from_error(sample_id: &str, error: String, total_sample_time_secs: f64) -> Self {
        Self {
            sample_id: sample_id.to_string(),
            status: SampleStatus::Failed,
            sv_count: 0,
            cluster_count: 0,
            resolved_cluster_count: 0,
            chaining_skipped_cluster_count: 0,
            merge_count: 0,
            error: Some(error),
            total_sample_time_secs,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RunStats {
    pub completed_sample_count: usize,
    pub failed_sample_count: usize,
    pub samples: Vec<SampleRunStats>,
}

impl RunStats {
    pub fn new(samples: Vec<SampleRunStats>) -> Self {
        let failed_sample_count = samples
            .iter()
            .filter(|x| x.status == SampleStatus::Failed)
            .count();
        Self {
            completed_sample_count: samples.len() - failed_sample_count,
            failed_sample_count,
            samples,
        }
    }
}

/// Write run_stats structure out in json format
pub fn write_run_stats(output_dir: &Utf8Path, run_stats: &RunStats) {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create run statistics json file: '{filename}'"
    );

    serde_json::to_writer_pretty(&f, &run_stats).unwrap();
}
