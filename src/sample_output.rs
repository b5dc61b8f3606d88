//! Per-sample SV and cluster tables
//!

use std::fs::File;
use std::io::BufWriter;

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use serde::Serialize;
use simple_error::{SimpleResult, try_with};

use crate::analyser::SampleClusteringResult;
use crate::annotate::annotation_label;
use crate::clustering::Cluster;
use crate::sv_data::{BreakendKey, SvIndex};

pub const SV_OUTPUT_SUFFIX: &str = ".svs.tsv";
pub const CLUSTER_OUTPUT_SUFFIX: &str = ".clusters.tsv";
pub const MERGE_OUTPUT_SUFFIX: &str = ".merges.tsv";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SvOutputRecord {
    sv_id: u32,
    cluster_id: usize,
    chain_id: Option<usize>,
    resolved_type: String,
    chain_link_count: usize,
    chain_assembly_link_count: usize,
    chain_length: i64,
    is_foldback: bool,
    foldback_partner_id: Option<u32>,
    foldback_chain_info: String,
    db_partner_id_start: Option<u32>,
    db_length_start: Option<i64>,
    db_partner_id_end: Option<u32>,
    db_length_end: Option<i64>,
    is_fragile_site: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClusterOutputRecord {
    cluster_id: usize,
    sv_count: usize,
    unique_sv_count: usize,
    resolved_type: String,
    is_resolved: bool,
    chain_count: usize,
    is_fully_chained: bool,
    has_line_element: bool,
    foldback_count: usize,
    chaining_skipped: bool,
    annotations: String,
    traversed_range: i64,
    total_deleted: i64,
    valid_allele_jcn_segment_perc: f64,
    merge_reasons: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeOutputRecord {
    target_cluster_id: usize,
    source_cluster_id: usize,
    reason: String,
}

pub fn get_sample_output_filename(output_dir: &Utf8Path, sample_id: &str, suffix: &str) -> Utf8PathBuf {
    output_dir.join(format!("{sample_id}{suffix}"))
}

fn get_tsv_writer(filename: &Utf8Path, label: &str) -> SimpleResult<csv::Writer<BufWriter<File>>> {
    let f = try_with!(
        File::create(filename),
        "Unable to create {label} file: '{filename}'"
    );
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(f)))
}

fn get_sv_record(result: &SampleClusteringResult, cluster: &Cluster, sv_index: SvIndex) -> SvOutputRecord {
    let sv = &result.svs[sv_index];

    // A replicated SV may sit in several chains, report the lowest chain id
    let chain = cluster
        .chains
        .iter()
        .filter(|x| x.contains_sv(sv_index))
        .min_by_key(|x| x.id);

    let is_fragile_site =
        sv.start.in_fragile_site || sv.end.as_ref().is_some_and(|x| x.in_fragile_site);

    // Chain path of a foldback spanning SVs as linkCount;assemblyLinkCount;length
    let chain_info = result
        .foldbacks
        .sv_link(sv_index)
        .and_then(|x| x.chain_info)
        .unwrap_or_default();
    let foldback_chain_info = format!(
        "{};{};{}",
        chain_info.link_count, chain_info.assembly_link_count, chain_info.length
    );

    let db_link = |is_start| {
        result
            .deletion_bridges
            .get(BreakendKey::new(sv_index, is_start))
    };
    let (db_start, db_end) = (db_link(true), db_link(false));

    SvOutputRecord {
        sv_id: sv.id,
        cluster_id: cluster.id,
        chain_id: chain.map(|x| x.id),
        resolved_type: cluster.resolved_type.to_string(),
        chain_link_count: chain.map_or(0, |x| x.link_count()),
        chain_assembly_link_count: chain.map_or(0, |x| x.assembly_link_count()),
        chain_length: chain.map_or(0, |x| x.length()),
        is_foldback: result.foldbacks.sv_is_foldback(sv_index),
        foldback_partner_id: result
            .foldbacks
            .sv_partner(sv_index)
            .map(|x| result.svs[x].id),
        foldback_chain_info,
        db_partner_id_start: db_start.map(|x| result.svs[x.other.sv].id),
        db_length_start: db_start.map(|x| x.length),
        db_partner_id_end: db_end.map(|x| result.svs[x.other.sv].id),
        db_length_end: db_end.map(|x| x.length),
        is_fragile_site,
    }
}

fn get_cluster_record(result: &SampleClusteringResult, cluster: &Cluster) -> ClusterOutputRecord {
    let merge_reasons = result.clusters.merge_reasons(cluster.id);
    let merge_reasons = if merge_reasons.is_empty() {
        "NONE".to_string()
    } else {
        merge_reasons.iter().join(";")
    };

    ClusterOutputRecord {
        cluster_id: cluster.id,
        sv_count: cluster.replicated_sv_count(),
        unique_sv_count: cluster.sv_count(),
        resolved_type: cluster.resolved_type.to_string(),
        is_resolved: cluster.is_resolved,
        chain_count: cluster.chains.len(),
        is_fully_chained: cluster.is_fully_chained(),
        has_line_element: cluster.has_line_element,
        foldback_count: result.foldbacks.cluster_count(cluster),
        chaining_skipped: cluster.chaining_skipped,
        annotations: annotation_label(cluster),
        traversed_range: cluster.metrics.traversed_range,
        total_deleted: cluster.metrics.total_deleted,
        valid_allele_jcn_segment_perc: cluster.metrics.valid_allele_jcn_segment_perc,
        merge_reasons,
    }
}

/// Write one row per SV, in input order
pub fn write_sv_table(filename: &Utf8Path, result: &SampleClusteringResult) -> SimpleResult<()> {
    let mut writer = get_tsv_writer(filename, "SV output")?;
    for sv_index in 0..result.svs.len() {
        let cluster = result.clusters.cluster_of(sv_index);
        try_with!(
            writer.serialize(get_sv_record(result, cluster, sv_index)),
            "Unable to write SV record to file: '{filename}'"
        );
    }
    try_with!(writer.flush(), "Unable to write SV output file: '{filename}'");
    Ok(())
}

/// Write one row per cluster, in cluster id order
pub fn write_cluster_table(filename: &Utf8Path, result: &SampleClusteringResult) -> SimpleResult<()> {
    let mut writer = get_tsv_writer(filename, "cluster output")?;
    for cluster in result.clusters.iter() {
        try_with!(
            writer.serialize(get_cluster_record(result, cluster)),
            "Unable to write cluster record to file: '{filename}'"
        );
    }
    try_with!(
        writer.flush(),
        "Unable to write cluster output file: '{filename}'"
    );
    Ok(())
}

/// Write one row per cluster merge, in merge order
pub fn write_merge_table(filename: &Utf8Path, result: &SampleClusteringResult) -> SimpleResult<()> {
    let mut writer = get_tsv_writer(filename, "merge output")?;
    if result.clusters.merge_history().is_empty() {
        try_with!(
            writer.write_record(["targetClusterId", "sourceClusterId", "reason"]),
            "Unable to write merge output header to file: '{filename}'"
        );
    }
    for record in result.clusters.merge_history() {
        let record = MergeOutputRecord {
            target_cluster_id: record.target,
            source_cluster_id: record.source,
            reason: record.reason.to_string(),
        };
        try_with!(
            writer.serialize(record),
            "Unable to write merge record to file: '{filename}'"
        );
    }
    try_with!(writer.flush(), "Unable to write merge output file: '{filename}'");
    Ok(())
}

/// Write all per-sample tables to the output directory
pub fn write_sample_output(output_dir: &Utf8Path, result: &SampleClusteringResult) -> SimpleResult<()> {
    let sv_filename = get_sample_output_filename(output_dir, &result.sample_id, SV_OUTPUT_SUFFIX);
    write_sv_table(&sv_filename, result)?;

    let cluster_filename =
        get_sample_output_filename(output_dir, &result.sample_id, CLUSTER_OUTPUT_SUFFIX);
    write_cluster_table(&cluster_filename, result)?;

    let merge_filename =
        get_sample_output_filename(output_dir, &result.sample_id, MERGE_OUTPUT_SUFFIX);
    write_merge_table(&merge_filename, result)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::*;

    #[test]
    fn test_sv_records() {
        let svs = vec![
            create_inv(0, "1", 1000, 2000, -1),
            create_inv(1, "1", 5000, 6000, 1),
            create_del(2, "5", 10_000, 12_000),
        ];
        let result = run_pipeline(svs, Vec::new());

        let cluster = result.clusters.cluster_of(0);
        let record = get_sv_record(&result, cluster, 0);
        assert_eq!(record.resolved_type, "FB_INV_PAIR");
        assert_eq!(record.chain_id, Some(0));
        assert_eq!(record.chain_link_count, 1);
        assert_eq!(record.chain_length, 3000);

        let cluster = result.clusters.cluster_of(2);
        let record = get_sv_record(&result, cluster, 2);
        assert_eq!(record.resolved_type, "SIMPLE_SV");
        assert_eq!(record.chain_id, None);
        assert_eq!(record.chain_length, 0);
        assert!(!record.is_foldback);
        assert_eq!(record.foldback_partner_id, None);

        let record = get_cluster_record(&result, cluster);
        assert_eq!(record.sv_count, 1);
        assert_eq!(record.merge_reasons, "NONE");
        assert_eq!(record.annotations, "NONE");
    }

    #[test]
    fn test_write_sample_output() {
        let (_dir_guard, dir) = create_test_dir();
        let svs = vec![create_del(0, "1", 10_000, 12_000), create_sgl(1, "2", 5000, 1)];
        let result = run_pipeline_with_config(&test_config(), svs, Vec::new());
        write_sample_output(&dir, &result).unwrap();

        let sv_table = std::fs::read_to_string(get_sample_output_filename(
            &dir,
            "TEST",
            SV_OUTPUT_SUFFIX,
        ))
        .unwrap();
        let lines = sv_table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("svId\tclusterId\tchainId\tresolvedType"));
        assert!(lines[0].ends_with("foldbackPartnerId\tfoldbackChainInfo\tdbPartnerIdStart\tdbLengthStart\tdbPartnerIdEnd\tdbLengthEnd\tisFragileSite"));
        assert!(lines[1].starts_with("0\t0\t\tSIMPLE_SV\t"));

        let cluster_table = std::fs::read_to_string(get_sample_output_filename(
            &dir,
            "TEST",
            CLUSTER_OUTPUT_SUFFIX,
        ))
        .unwrap();
        let lines = cluster_table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("clusterId\tsvCount\tuniqueSvCount\tresolvedType"));
        assert!(lines[0].ends_with("mergeReasons"));

        let merge_table = std::fs::read_to_string(get_sample_output_filename(
            &dir,
            "TEST",
            MERGE_OUTPUT_SUFFIX,
        ))
        .unwrap();
        assert_eq!(merge_table, "targetClusterId\tsourceClusterId\treason\n");
    }

    #[test]
    fn test_merge_records() {
        let mut svs = vec![
            create_inv(0, "1", 1_000_000, 1_002_000, -1),
            create_inv(1, "1", 3_000_000, 3_002_000, -1),
        ];
        for sv in svs.iter_mut() {
            sv.end.as_mut().unwrap().copy_number = 3.0;
        }
        let result = run_pipeline(svs, Vec::new());

        let (_dir_guard, dir) = create_test_dir();
        let filename = dir.join("merges.tsv");
        write_merge_table(&filename, &result).unwrap();
        let merge_table = std::fs::read_to_string(&filename).unwrap();
        assert_eq!(
            merge_table,
            "targetClusterId\tsourceClusterId\treason\n0\t1\tFOLDBACKS\n"
        );
    }

    #[test]
    fn test_deletion_bridge_records() {
        let svs = vec![
            create_bnd(0, "1", 1000, 1, "2", 1000, 1),
            create_bnd(1, "1", 1500, -1, "2", 5000, -1),
        ];
        let result = run_pipeline(svs, Vec::new());

        let record = get_sv_record(&result, result.clusters.cluster_of(0), 0);
        assert_eq!(record.db_partner_id_start, Some(1));
        assert_eq!(record.db_length_start, Some(500));
        assert_eq!(record.foldback_chain_info, "0;0;0");

        let record = get_sv_record(&result, result.clusters.cluster_of(1), 1);
        assert_eq!(record.db_partner_id_start, Some(0));
        assert_eq!(record.db_length_start, Some(500));
    }
}
