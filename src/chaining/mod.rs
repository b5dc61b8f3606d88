//! Chain building and chain-derived cluster metrics
//!

pub mod chain;
pub mod chain_finder;
pub mod link_finder;

use std::collections::BTreeMap;

use log::debug;

use self::chain_finder::ChainFinder;
use self::link_finder::find_inferred_links;
use crate::analyser::SampleContext;
use crate::clustering::{Cluster, ClusterMetrics};
use crate::constants::MAX_SV_REPLICATION;
use crate::copy_number::copy_numbers_equal;
use crate::sv_data::{StructuralVariant, get_breakend};

/// Set the replication count of each cluster SV from its JCN relative to the cluster minimum
///
/// Replication is only used when the cluster JCN varies. If the replicated total would exceed
/// the chaining limit every SV is left with a single copy.
///
pub fn set_jcn_replication(
    svs: &[StructuralVariant],
    cluster: &mut Cluster,
    chaining_sv_limit: usize,
) {
    cluster.replication.clear();
    if cluster.sv_count() < 2 || !cluster.has_varied_jcn(svs) {
        return;
    }
    let min_jcn = cluster
        .svs
        .iter()
        .map(|&x| svs[x].jcn)
        .fold(f64::INFINITY, f64::min);
    if min_jcn <= 0.0 {
        return;
    }

    let replication = cluster
        .svs
        .iter()
        .map(|&x| {
            let rep = ((svs[x].jcn / min_jcn).round() as u32).clamp(1, MAX_SV_REPLICATION);
            (x, rep)
        })
        .filter(|(_, rep)| *rep > 1)
        .collect::<BTreeMap<_, _>>();

    let total = cluster.sv_count() + replication.values().map(|&x| x as usize - 1).sum::<usize>();
    if total > chaining_sv_limit {
        debug!(
            "Cluster {} replicated SV count {total} exceeds the chaining limit, replication disabled",
            cluster.id
        );
        return;
    }
    cluster.replication = replication;
}

/// Build the chains of one cluster
///
/// With `assembled_only` set only assembly links are used and SVs are not replicated.
/// Otherwise all inferred templated insertions between facing breakends are also considered.
///
pub fn find_cluster_chains(ctx: &SampleContext, cluster: &mut Cluster, assembled_only: bool) {
    cluster.chains.clear();
    cluster.replication.clear();
    cluster.chaining_skipped = false;

    let limit = ctx.config.chaining_sv_limit;
    if cluster.sv_count() > limit {
        debug!(
            "Cluster {} with {} SVs exceeds the chaining limit {limit}, chaining skipped",
            cluster.id,
            cluster.sv_count()
        );
        cluster.chaining_skipped = true;
        return;
    }

    let mut candidates = cluster.assembly_links.clone();
    if !assembled_only {
        set_jcn_replication(ctx.svs, cluster, limit);
        let chr_breakends = cluster.chr_breakends(ctx.svs, ctx.index);
        for link in find_inferred_links(ctx.svs, &chr_breakends) {
            let is_assembled = candidates
                .iter()
                .any(|x| x.lower == link.lower && x.upper == link.upper);
            if !is_assembled {
                candidates.push(link);
            }
        }
    }

    let chains = ChainFinder::new(ctx.svs, cluster, ctx.config.log_verbose).find_chains(candidates);
    cluster.chains = chains;
}

/// Compute the chain-derived metrics of a cluster
pub fn compute_cluster_metrics(ctx: &SampleContext, cluster: &Cluster) -> ClusterMetrics {
    let svs = ctx.svs;
    let traversed_range = cluster.chains.iter().map(|x| x.length()).sum();

    let mut total_deleted = 0;
    for &sv in cluster.svs.iter() {
        for key in svs[sv].breakend_keys(sv) {
            if let Some(db) = ctx.dbs.get(key)
                && db.length > 0
                && key < db.other
                && cluster.contains(db.other.sv)
            {
                total_deleted += db.length;
            }
        }
    }

    let mut ti_count = 0;
    let mut valid_count = 0;
    for link in cluster.chains.iter().flat_map(|x| x.links()) {
        ti_count += 1;
        let link_jcn = (svs[link.lower.sv].jcn / cluster.replication(link.lower.sv) as f64
            + svs[link.upper.sv].jcn / cluster.replication(link.upper.sv) as f64)
            / 2.0;
        let segment_cn = get_breakend(svs, link.lower)
            .copy_number_high_side()
            .min(get_breakend(svs, link.upper).copy_number_low_side());
        if segment_cn >= link_jcn || copy_numbers_equal(segment_cn, link_jcn) {
            valid_count += 1;
        }
    }
    let valid_allele_jcn_segment_perc = if ti_count > 0 {
        100.0 * valid_count as f64 / ti_count as f64
    } else {
        0.0
    };

    ClusterMetrics {
        traversed_range,
        total_deleted,
        valid_allele_jcn_segment_perc,
    }
}
