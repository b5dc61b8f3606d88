//! Run the full clustering, chaining and classification pipeline on one sample
//!

use log::info;
use simple_error::SimpleResult;
use thousands::Separable;

use crate::annotate::{annotate_cluster, mark_line_clusters};
use crate::breakend_index::BreakendIndex;
use crate::breakend_pairs::{DeletionBridges, Foldbacks, find_deletion_bridges, mark_foldbacks};
use crate::chaining::link_finder::find_assembly_links;
use crate::chaining::{compute_cluster_metrics, find_cluster_chains};
use crate::classify::{ResolvedType, SimpleVariantLengths, classify_cluster};
use crate::clustering::{Cluster, ClusterSet};
use crate::clustering::merge::merge_clusters;
use crate::clustering::proximity::cluster_by_proximity;
use crate::clustering::simple_groups::dissolve_simple_groups;
use crate::clustering_config::ClusteringConfig;
use crate::constants::SMALL_CLUSTER_SIZE;
use crate::copy_number::LohEvent;
use crate::linked_pair::LinkedPair;
use crate::sample_input::SampleSvData;
use crate::sv_data::StructuralVariant;
use crate::validation::{validate_breakend_pairs, validate_clusters};

/// Read-only per-sample data shared by every pipeline stage
#[derive(Clone, Copy)]
pub struct SampleContext<'a> {
    pub svs: &'a [StructuralVariant],
    pub index: &'a BreakendIndex,
    pub dbs: &'a DeletionBridges,
    pub lohs: &'a [LohEvent],
    pub config: &'a ClusteringConfig,
    pub simple_lengths: SimpleVariantLengths,
}

/// Final clustering state of one sample
pub struct SampleClusteringResult {
    pub sample_id: String,
    pub svs: Vec<StructuralVariant>,
    pub clusters: ClusterSet,
    pub foldbacks: Foldbacks,
    pub deletion_bridges: DeletionBridges,
    pub merge_count: usize,
}

impl SampleClusteringResult {
    pub fn resolved_cluster_count(&self) -> usize {
        self.clusters.iter().filter(|x| x.is_resolved).count()
    }

    pub fn chaining_skipped_count(&self) -> usize {
        self.clusters.iter().filter(|x| x.chaining_skipped).count()
    }
}

/// Give each cluster the assembly links whose two SVs are both members
///
/// Links spanning two clusters are held back until a merge brings their SVs together.
///
fn assign_assembly_links(clusters: &mut ClusterSet, links: &[LinkedPair]) {
    for cluster in clusters.iter_mut() {
        cluster.assembly_links.clear();
    }
    for link in links.iter() {
        let id = clusters.cluster_id_of(link.lower.sv);
        if id == clusters.cluster_id_of(link.upper.sv) {
            clusters.get_mut(id).assembly_links.push(link.clone());
        }
    }
}

/// A simple cluster can be chained and classified before any merging
fn is_simple_cluster(svs: &[StructuralVariant], cluster: &Cluster) -> bool {
    cluster.sv_count() == 1
        || (cluster.sv_count() <= SMALL_CLUSTER_SIZE
            && cluster.is_consistent(svs)
            && !cluster.has_varied_jcn(svs))
}

/// Chain and classify simple clusters, other clusters only get their assembled chains
fn run_limited_pass(ctx: &SampleContext, clusters: &mut ClusterSet) {
    let no_foldbacks = Foldbacks::default();
    for cluster in clusters.iter_mut() {
        if cluster.is_resolved {
            continue;
        }
        if is_simple_cluster(ctx.svs, cluster) {
            find_cluster_chains(ctx, cluster, false);
            classify_cluster(ctx, &no_foldbacks, cluster);
        } else {
            find_cluster_chains(ctx, cluster, true);
        }
    }
}

/// Fully chain and classify every cluster which no earlier pass could type
fn run_full_pass(ctx: &SampleContext, clusters: &mut ClusterSet, foldbacks: &Foldbacks) {
    for cluster in clusters.iter_mut() {
        if cluster.is_resolved || cluster.resolved_type != ResolvedType::None {
            continue;
        }
        find_cluster_chains(ctx, cluster, false);
        classify_cluster(ctx, foldbacks, cluster);
    }
}

/// Settle types which depend on the final foldbacks, then annotate and measure each cluster
fn run_final_pass(ctx: &SampleContext, clusters: &mut ClusterSet, foldbacks: &Foldbacks) {
    for cluster in clusters.iter_mut() {
        if !cluster.is_resolved {
            if cluster.sv_count() == 1
                && ctx.simple_lengths.is_long_del_dup(&ctx.svs[cluster.svs[0]])
            {
                cluster.set_resolved(ResolvedType::SimpleSv, true);
            } else if matches!(
                cluster.resolved_type,
                ResolvedType::SimpleChain | ResolvedType::ComplexChain
            ) {
                let resolved_type = if foldbacks.cluster_count(cluster) > 0 {
                    ResolvedType::ComplexChain
                } else {
                    ResolvedType::SimpleChain
                };
                cluster.set_resolved(resolved_type, false);
            }
        }
        annotate_cluster(ctx, foldbacks, cluster);
        cluster.metrics = compute_cluster_metrics(ctx, cluster);
    }
}

/// Cluster, chain and classify all SVs of one sample
///
/// Any input inconsistency, or a validation failure when validation is enabled, is returned as an
/// error for this sample only.
///
pub fn analyse_sample(
    config: &ClusteringConfig,
    sample: SampleSvData,
) -> SimpleResult<SampleClusteringResult> {
    let SampleSvData {
        sample_id,
        svs,
        lohs,
    } = sample;

    let index = BreakendIndex::new(&svs)?;
    let assembly_links = find_assembly_links(&svs)?;
    let dbs = find_deletion_bridges(&svs, &index);
    let ctx = SampleContext {
        svs: &svs,
        index: &index,
        dbs: &dbs,
        lohs: &lohs,
        config,
        simple_lengths: SimpleVariantLengths::new(&svs),
    };

    let mut clusters = cluster_by_proximity(&svs, &index, config.proximity_distance);
    let line_cluster_count = mark_line_clusters(&svs, &mut clusters);
    assign_assembly_links(&mut clusters, &assembly_links);
    if config.run_validation {
        validate_clusters(&svs, &clusters, "proximity clustering")?;
    }

    run_limited_pass(&ctx, &mut clusters);

    let foldbacks = mark_foldbacks(&svs, &index, &dbs, &clusters);
    let merge_count = merge_clusters(&ctx, &mut clusters, &foldbacks);
    assign_assembly_links(&mut clusters, &assembly_links);
    let demerged_sv_count = dissolve_simple_groups(&ctx, &mut clusters);
    if config.run_validation {
        validate_clusters(&svs, &clusters, "cluster merging")?;
    }

    run_full_pass(&ctx, &mut clusters, &foldbacks);

    let foldbacks = mark_foldbacks(&svs, &index, &dbs, &clusters);
    if config.run_validation {
        validate_clusters(&svs, &clusters, "full chaining")?;
        validate_breakend_pairs(&svs, &foldbacks, &dbs)?;
    }

    run_final_pass(&ctx, &mut clusters, &foldbacks);

    let result = SampleClusteringResult {
        sample_id,
        svs,
        clusters,
        foldbacks,
        deletion_bridges: dbs,
        merge_count,
    };

    info!(
        "Sample {}: {} SVs in {} clusters, {} resolved, {} LINE, {} merges, {} simple SVs de-merged, {} deletion bridges, {} skipped by the chaining limit",
        result.sample_id,
        result.svs.len().separate_with_commas(),
        result.clusters.len().separate_with_commas(),
        result.resolved_cluster_count().separate_with_commas(),
        line_cluster_count,
        merge_count,
        demerged_sv_count,
        result.deletion_bridges.len().separate_with_commas(),
        result.chaining_skipped_count()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::clustering::ClusteringReason;
    use crate::test_utils::*;

    fn mixed_sample_svs() -> Vec<StructuralVariant> {
        vec![
            create_del(0, "1", 10_000, 12_000),
            create_inv(1, "1", 1_000_000, 1_002_000, -1),
            create_inv(2, "1", 3_000_000, 3_002_000, -1),
            create_bnd(3, "2", 5_000_000, 1, "3", 7_000_000, -1),
            create_bnd(4, "2", 5_000_400, -1, "3", 7_000_300, 1),
            create_dup(5, "4", 100_000, 900_000),
            create_sgl(6, "5", 2_000_000, 1),
        ]
    }

    fn with_foldback_cn(mut svs: Vec<StructuralVariant>) -> Vec<StructuralVariant> {
        for sv in svs.iter_mut().filter(|x| x.sv_type == crate::sv_data::SvType::Inv) {
            sv.end.as_mut().unwrap().copy_number = 3.0;
        }
        svs
    }

    #[test]
    fn test_merge_threshold() {
        // The inversions are far beyond the proximity distance but share a foldback arm
        let svs = with_foldback_cn(vec![
            create_inv(0, "1", 1_000_000, 1_002_000, -1),
            create_inv(1, "1", 3_000_000, 3_002_000, -1),
        ]);
        let result = run_pipeline(svs, Vec::new());
        assert_eq!(result.merge_count, 1);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(
            result.clusters.merge_reasons(cluster_of(&result, 0).id),
            vec![ClusteringReason::Foldbacks]
        );
    }

    #[test]
    fn test_idempotence() {
        let run = || run_pipeline(with_foldback_cn(mixed_sample_svs()), Vec::new());
        let result1 = run();
        let result2 = run();

        for sv in 0..result1.svs.len() {
            assert_eq!(
                result1.clusters.cluster_id_of(sv),
                result2.clusters.cluster_id_of(sv)
            );
        }
        for (c1, c2) in result1.clusters.iter().zip(result2.clusters.iter()) {
            assert_eq!(c1.id, c2.id);
            assert_eq!(c1.resolved_type, c2.resolved_type);
            assert_eq!(c1.is_resolved, c2.is_resolved);
            assert_eq!(c1.chains.len(), c2.chains.len());
            for (ch1, ch2) in c1.chains.iter().zip(c2.chains.iter()) {
                assert_eq!(ch1.svs(), ch2.svs());
                assert_eq!(ch1.links(), ch2.links());
            }
        }
    }

    #[test]
    fn test_cluster_coverage() {
        let result = run_pipeline(with_foldback_cn(mixed_sample_svs()), Vec::new());
        let mut seen = vec![0; result.svs.len()];
        for cluster in result.clusters.iter() {
            for &sv in cluster.svs.iter() {
                seen[sv] += 1;
            }
            let replicated = cluster
                .svs
                .iter()
                .map(|&x| cluster.replication(x) as usize)
                .sum::<usize>();
            assert_eq!(replicated, cluster.replicated_sv_count());
        }
        assert!(seen.iter().all(|&x| x == 1));
    }

    #[test]
    fn test_breakend_pair_symmetry() {
        let result = run_pipeline(with_foldback_cn(mixed_sample_svs()), Vec::new());
        for (key, link) in result.foldbacks.iter() {
            assert_eq!(result.foldbacks.get(link.other).unwrap().other, *key);
        }
        for (key, link) in result.deletion_bridges.iter() {
            assert_eq!(result.deletion_bridges.get(link.other).unwrap().other, *key);
        }
    }

    #[test]
    fn test_chain_validity() {
        let svs = vec![
            create_bnd(0, "2", 1000, 1, "1", 10_000, -1),
            create_bnd(1, "1", 10_500, 1, "1", 20_000, -1),
            create_bnd(2, "1", 20_700, 1, "3", 1000, -1),
        ];
        let result = run_pipeline(svs, Vec::new());
        assert_eq!(result.clusters.len(), 1);
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.chains.len(), 1);
        for chain in cluster.chains.iter() {
            assert!(chain.is_valid());
            assert_eq!(chain.link_count() + 1, chain.sv_count());
            for (link, pair) in chain.links().iter().zip(chain.svs().windows(2)) {
                assert!(link.has_breakend(pair[0].exit()));
                assert!(link.has_breakend(pair[1].entry()));
            }
        }
    }

    #[test]
    fn test_chaining_limit() {
        let svs = vec![
            create_bnd(0, "2", 1000, 1, "1", 10_000, -1),
            create_bnd(1, "1", 10_500, 1, "1", 20_000, -1),
            create_bnd(2, "1", 20_700, 1, "3", 1000, -1),
        ];
        let config = ClusteringConfig {
            chaining_sv_limit: 1,
            ..test_config()
        };
        let result = run_pipeline_with_config(&config, svs, Vec::new());
        let cluster = cluster_of(&result, 0);
        assert!(cluster.chaining_skipped);
        assert!(cluster.chains.is_empty());
        assert_eq!(cluster.resolved_type, ResolvedType::None);
        assert_eq!(result.chaining_skipped_count(), 1);
    }

    #[test]
    fn test_unknown_assembly_link_is_sample_error() {
        let mut svs = vec![create_del(0, "1", 10_000, 12_000)];
        svs[0].assembly_linked_ids.push(99);
        let sample = SampleSvData {
            sample_id: "BAD".to_string(),
            svs,
            lohs: Vec::new(),
        };
        assert!(analyse_sample(&test_config(), sample).is_err());
    }
}
