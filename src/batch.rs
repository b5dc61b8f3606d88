//! Run the cluster command over all requested samples
//!

use std::sync::mpsc::channel;
use std::time::Instant;

use camino::Utf8Path;
use log::{error, info};
use simple_error::SimpleResult;
use unwrap::unwrap;

use crate::analyser::analyse_sample;
use crate::chromosome_arms::ChromosomeArmTable;
use crate::cli::{ClusterSettings, SharedSettings};
use crate::clustering_config::ClusteringConfig;
use crate::genome_regions::GenomeRegions;
use crate::run_stats::{RunStats, SampleRunStats, write_run_stats};
use crate::sample_input::{ReferenceData, SampleFiles, find_sample_files, read_sample};
use crate::sample_output::write_sample_output;

fn read_optional_regions(filename: Option<&Utf8Path>, label: &str) -> GenomeRegions {
    match filename {
        Some(filename) => unwrap!(
            GenomeRegions::from_bed(filename, label),
            "Unable to read {label} regions from file: '{filename}'"
        ),
        None => GenomeRegions::new(),
    }
}

/// Load the reference tables shared by every sample
///
/// Any failure here is fatal for the whole run.
///
fn read_reference_data(settings: &ClusterSettings) -> ReferenceData {
    let arms = match &settings.chrom_arms_filename {
        Some(filename) => unwrap!(
            ChromosomeArmTable::from_file(filename),
            "Unable to read chromosome arm table from file: '{filename}'"
        ),
        None => ChromosomeArmTable::grch37(),
    };
    ReferenceData {
        arms,
        line_elements: read_optional_regions(
            settings.line_elements_filename.as_deref(),
            "LINE element",
        ),
        fragile_sites: read_optional_regions(
            settings.fragile_sites_filename.as_deref(),
            "fragile site",
        ),
    }
}

/// Read, analyse and write one sample
fn process_sample(
    output_dir: &Utf8Path,
    config: &ClusteringConfig,
    reference: &ReferenceData,
    files: &SampleFiles,
) -> SimpleResult<SampleRunStats> {
    let start = Instant::now();
    let sample = read_sample(files, reference)?;
    let result = analyse_sample(config, sample)?;
    write_sample_output(output_dir, &result)?;
    Ok(SampleRunStats::from_result(
        &result,
        start.elapsed().as_secs_f64(),
    ))
}

/// Process all samples on a worker pool
///
/// A failing sample is logged and recorded, without affecting the other samples. The stats are
/// returned in sample name order.
///
pub fn process_all_samples(
    thread_count: usize,
    output_dir: &Utf8Path,
    config: &ClusteringConfig,
    reference: &ReferenceData,
    all_sample_files: &[SampleFiles],
) -> Vec<SampleRunStats> {
    info!("Processing {} samples", all_sample_files.len());

    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .unwrap();

    let (tx, rx) = channel();

    worker_pool.scope(move |scope| {
        for files in all_sample_files.iter() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let start = Instant::now();
                let sample_stats = match process_sample(output_dir, config, reference, files) {
                    Ok(x) => x,
                    Err(err) => {
                        error!("Skipping sample {}: {err}", files.sample_id);
                        SampleRunStats::from_error(
                            &files.sample_id,
                            err.to_string(),
                            start.elapsed().as_secs_f64(),
                        )
                    }
                };
                tx.send(sample_stats).unwrap();
            });
        }
    });

    let mut all_sample_stats = rx.into_iter().collect::<Vec<_>>();
    all_sample_stats.sort_by(|a, b| a.sample_id.cmp(&b.sample_id));
    all_sample_stats
}

pub fn run_cluster(shared_settings: &SharedSettings, settings: &ClusterSettings) {
    let config = ClusteringConfig::new(settings);
    let reference = read_reference_data(settings);
    let all_sample_files = unwrap!(
        find_sample_files(&settings.sv_dir, &settings.sample_list),
        "Unable to find sample input files"
    );

    let all_sample_stats = process_all_samples(
        shared_settings.thread_count,
        &settings.output_dir,
        &config,
        &reference,
        &all_sample_files,
    );

    let run_stats = RunStats::new(all_sample_stats);
    if run_stats.failed_sample_count > 0 {
        error!(
            "{} of {} samples failed",
            run_stats.failed_sample_count,
            run_stats.samples.len()
        );
    }
    write_run_stats(&settings.output_dir, &run_stats);
}
