//! Builders for SVs and pipeline runs shared by unit tests
//!

use camino::Utf8PathBuf;
use tempfile::TempDir;

use crate::analyser::{SampleClusteringResult, analyse_sample};
use crate::chromosome_arms::ChromosomeArmTable;
use crate::clustering::Cluster;
use crate::clustering_config::ClusteringConfig;
use crate::copy_number::LohEvent;
use crate::sample_input::SampleSvData;
use crate::sv_data::{Breakend, StructuralVariant, SvType};

pub fn create_breakend(chrom: &str, position: i64, orientation: i8) -> Breakend {
    let arm = ChromosomeArmTable::grch37()
        .get_arm(chrom, position)
        .unwrap();
    Breakend::new(chrom, position, orientation, arm, 2.0, 1.0)
}

/// Create an SV with default copy number 2, copy number change 1 and JCN 1
///
/// The SV id is expected to match the arena index in tests.
///
#[allow(clippy::too_many_arguments)]
pub fn create_sv(
    id: u32,
    sv_type: SvType,
    chrom_start: &str,
    pos_start: i64,
    orient_start: i8,
    chrom_end: &str,
    pos_end: i64,
    orient_end: i8,
) -> StructuralVariant {
    StructuralVariant {
        id,
        sv_type,
        start: create_breakend(chrom_start, pos_start, orient_start),
        end: Some(create_breakend(chrom_end, pos_end, orient_end)),
        jcn: 1.0,
        jcn_uncertainty: 0.0,
        assembly_linked_ids: Vec::new(),
        in_line_element: false,
    }
}

pub fn create_del(id: u32, chrom: &str, start: i64, end: i64) -> StructuralVariant {
    create_sv(id, SvType::Del, chrom, start, 1, chrom, end, -1)
}

pub fn create_dup(id: u32, chrom: &str, start: i64, end: i64) -> StructuralVariant {
    create_sv(id, SvType::Dup, chrom, start, -1, chrom, end, 1)
}

pub fn create_ins(id: u32, chrom: &str, start: i64, end: i64) -> StructuralVariant {
    create_sv(id, SvType::Ins, chrom, start, 1, chrom, end, -1)
}

pub fn create_inv(id: u32, chrom: &str, start: i64, end: i64, orientation: i8) -> StructuralVariant {
    create_sv(id, SvType::Inv, chrom, start, orientation, chrom, end, orientation)
}

pub fn create_bnd(
    id: u32,
    chrom_start: &str,
    pos_start: i64,
    orient_start: i8,
    chrom_end: &str,
    pos_end: i64,
    orient_end: i8,
) -> StructuralVariant {
    create_sv(
        id,
        SvType::Bnd,
        chrom_start,
        pos_start,
        orient_start,
        chrom_end,
        pos_end,
        orient_end,
    )
}

pub fn create_sgl(id: u32, chrom: &str, pos: i64, orientation: i8) -> StructuralVariant {
    StructuralVariant {
        id,
        sv_type: SvType::Sgl,
        start: create_breakend(chrom, pos, orientation),
        end: None,
        jcn: 1.0,
        jcn_uncertainty: 0.0,
        assembly_linked_ids: Vec::new(),
        in_line_element: false,
    }
}

pub fn create_loh(
    chrom: &str,
    pos_start: i64,
    pos_end: i64,
    start_sv: Option<u32>,
    end_sv: Option<u32>,
) -> LohEvent {
    LohEvent {
        chromosome: chrom.to_string(),
        pos_start,
        pos_end,
        start_sv,
        end_sv,
    }
}

pub fn test_config() -> ClusteringConfig {
    ClusteringConfig {
        run_validation: true,
        ..Default::default()
    }
}

pub fn run_pipeline_with_config(
    config: &ClusteringConfig,
    svs: Vec<StructuralVariant>,
    lohs: Vec<LohEvent>,
) -> SampleClusteringResult {
    let sample = SampleSvData {
        sample_id: "TEST".to_string(),
        svs,
        lohs,
    };
    analyse_sample(config, sample).unwrap()
}

/// Run the full clustering pipeline with validation enabled
pub fn run_pipeline(svs: Vec<StructuralVariant>, lohs: Vec<LohEvent>) -> SampleClusteringResult {
    run_pipeline_with_config(&test_config(), svs, lohs)
}

pub fn cluster_of(result: &SampleClusteringResult, sv: usize) -> &Cluster {
    result.clusters.cluster_of(sv)
}

/// Scratch directory which is deleted when the returned guard drops
pub fn create_test_dir() -> (TempDir, Utf8PathBuf) {
    let guard = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).unwrap();
    (guard, dir)
}
