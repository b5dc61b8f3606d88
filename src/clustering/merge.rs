//! Fixed-point merging of unresolved clusters
//!
//! Cross-cluster checks either go through a key index (foldback arms and common arm pairs) or
//! walk the chromosome-ordered breakend index, so no all-pairs cluster comparison is needed.
//!

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::arm_groups::{ArmPair, ChromArm, common_arm_keys};
use super::{ClusterId, ClusterSet, ClusteringReason};
use crate::analyser::SampleContext;
use crate::breakend_pairs::Foldbacks;
use crate::constants::MAX_FOLDBACK_NEXT_CLUSTER_DISTANCE;
use crate::copy_number::copy_numbers_equal;
use crate::sv_data::{BreakendKey, get_breakend};

/// Two-way index between clusters and the keys they hold
struct ClusterKeyIndex<K: Ord + Clone> {
    by_cluster: BTreeMap<ClusterId, BTreeSet<K>>,
    by_key: BTreeMap<K, BTreeSet<ClusterId>>,
}

impl<K: Ord + Clone> ClusterKeyIndex<K> {
    fn new() -> Self {
        Self {
            by_cluster: BTreeMap::new(),
            by_key: BTreeMap::new(),
        }
    }

    fn remove(&mut self, id: ClusterId) {
        if let Some(keys) = self.by_cluster.remove(&id) {
            for key in keys {
                if let Some(ids) = self.by_key.get_mut(&key) {
                    ids.remove(&id);
                    if ids.is_empty() {
                        self.by_key.remove(&key);
                    }
                }
            }
        }
    }

    fn set(&mut self, id: ClusterId, keys: BTreeSet<K>) {
        self.remove(id);
        if keys.is_empty() {
            return;
        }
        for key in keys.iter() {
            self.by_key.entry(key.clone()).or_default().insert(id);
        }
        self.by_cluster.insert(id, keys);
    }

    /// Other clusters sharing at least one key with this cluster
    fn partners(&self, id: ClusterId) -> BTreeSet<ClusterId> {
        let mut partners = BTreeSet::new();
        if let Some(keys) = self.by_cluster.get(&id) {
            for key in keys {
                partners.extend(self.by_key[key].iter().copied().filter(|&x| x != id));
            }
        }
        partners
    }
}

struct ClusterMerger<'a> {
    ctx: &'a SampleContext<'a>,
    foldbacks: &'a Foldbacks,
    foldback_arms: ClusterKeyIndex<ChromArm>,
    common_arms: ClusterKeyIndex<ArmPair>,
}

impl<'a> ClusterMerger<'a> {
    fn new(ctx: &'a SampleContext<'a>, foldbacks: &'a Foldbacks) -> Self {
        Self {
            ctx,
            foldbacks,
            foldback_arms: ClusterKeyIndex::new(),
            common_arms: ClusterKeyIndex::new(),
        }
    }

    fn is_mergeable(clusters: &ClusterSet, id: ClusterId) -> bool {
        clusters.contains(id) && !clusters.get(id).is_resolved
    }

    fn index_cluster(&mut self, clusters: &ClusterSet, id: ClusterId) {
        if !Self::is_mergeable(clusters, id) {
            self.foldback_arms.remove(id);
            self.common_arms.remove(id);
            return;
        }
        let svs = self.ctx.svs;
        let cluster = clusters.get(id);
        let arms = self
            .foldbacks
            .cluster_breakends(cluster)
            .into_iter()
            .map(|k| {
                let be = get_breakend(svs, k);
                (be.chrom.clone(), be.arm)
            })
            .collect();
        self.foldback_arms.set(id, arms);
        self.common_arms.set(
            id,
            common_arm_keys(svs, cluster, self.ctx.config.proximity_distance),
        );
    }

    /// Next breakend from `key` in the given direction whose cluster is unresolved
    fn next_unresolved_breakend(
        &self,
        clusters: &ClusterSet,
        key: BreakendKey,
        upward: bool,
    ) -> Option<BreakendKey> {
        let mut current = self.ctx.index.neighbour(key, upward);
        while let Some(next) = current {
            if !clusters.cluster_of(next.sv).is_resolved {
                return Some(next);
            }
            current = self.ctx.index.neighbour(next, upward);
        }
        None
    }

    /// Clusters faced by one of this cluster's foldbacks
    fn facing_foldback_partners(&self, clusters: &ClusterSet, id: ClusterId) -> BTreeSet<ClusterId> {
        let svs = self.ctx.svs;
        let mut partners = BTreeSet::new();
        for key in self.foldbacks.cluster_breakends(clusters.get(id)) {
            let fb_be = get_breakend(svs, key);
            let Some(next) = self.next_unresolved_breakend(clusters, key, fb_be.orientation == -1)
            else {
                continue;
            };
            let next_cluster = clusters.cluster_id_of(next.sv);
            if next_cluster == id {
                continue;
            }
            let next_be = get_breakend(svs, next);
            if (next_be.position - fb_be.position).abs() > MAX_FOLDBACK_NEXT_CLUSTER_DISTANCE {
                continue;
            }
            let fb_jcn = svs[key.sv].jcn;
            let next_jcn = svs[next.sv].jcn;
            if next_jcn < fb_jcn && !copy_numbers_equal(next_jcn, fb_jcn) {
                continue;
            }
            debug!(
                "cluster({id}) foldback SV({}) faces cluster({next_cluster}) SV({})",
                svs[key.sv].id, svs[next.sv].id
            );
            partners.insert(next_cluster);
        }
        partners
    }

    /// Clusters with opposing breakends inside consecutive same-orientation breakends of this
    /// cluster
    fn loose_overlap_partners(&self, clusters: &ClusterSet, id: ClusterId) -> BTreeSet<ClusterId> {
        let svs = self.ctx.svs;
        let cluster = clusters.get(id);
        let mut partners = BTreeSet::new();
        if cluster.is_fully_chained() {
            return partners;
        }

        for keys in cluster.chr_breakends(svs, self.ctx.index).values() {
            for i in 0..keys.len().saturating_sub(1) {
                let lower = keys[i];
                let mut upper = keys[i + 1];
                let lower_be = get_breakend(svs, lower);
                if !lower_be.same_arm(get_breakend(svs, upper)) {
                    continue;
                }
                if lower_be.orientation != get_breakend(svs, upper).orientation {
                    // A foldback can straddle a short deletion bridge
                    let is_foldback = i + 2 < keys.len()
                        && self
                            .foldbacks
                            .get(lower)
                            .is_some_and(|x| x.other == keys[i + 2]);
                    if !is_foldback {
                        continue;
                    }
                    upper = keys[i + 2];
                }

                let front = if lower_be.orientation == 1 { lower } else { upper };
                if self.ctx.dbs.get(front).is_some_and(|x| x.length < 0) {
                    continue;
                }

                for &between in self.ctx.index.breakends_between(lower, upper) {
                    if get_breakend(svs, between).orientation == lower_be.orientation {
                        continue;
                    }
                    let other_id = clusters.cluster_id_of(between.sv);
                    if other_id != id && !clusters.get(other_id).is_resolved {
                        partners.insert(other_id);
                    }
                }
            }
        }
        partners
    }

    /// Find the merge rule and partner for one cluster, rules are tried in priority order
    fn find_merge_partner(
        &self,
        clusters: &ClusterSet,
        id: ClusterId,
    ) -> Option<(ClusterId, ClusteringReason)> {
        let first_partner = |partners: BTreeSet<ClusterId>| {
            partners
                .into_iter()
                .find(|&x| x != id && Self::is_mergeable(clusters, x))
        };

        let mut foldback_partners = self.foldback_arms.partners(id);
        foldback_partners.extend(self.facing_foldback_partners(clusters, id));
        if let Some(x) = first_partner(foldback_partners) {
            return Some((x, ClusteringReason::Foldbacks));
        }
        if let Some(x) = first_partner(self.common_arms.partners(id)) {
            return Some((x, ClusteringReason::CommonArms));
        }
        if let Some(x) = first_partner(self.loose_overlap_partners(clusters, id)) {
            return Some((x, ClusteringReason::LooseOverlap));
        }
        None
    }

    /// Run one pass over all clusters, returning the number of merges
    fn merge_pass(&mut self, clusters: &mut ClusterSet) -> usize {
        for id in clusters.ids() {
            self.index_cluster(clusters, id);
        }

        let mut merge_count = 0;
        let mut queue = clusters
            .ids()
            .into_iter()
            .filter(|&x| Self::is_mergeable(clusters, x))
            .collect::<BTreeSet<_>>();
        while let Some(id) = queue.pop_first() {
            if !Self::is_mergeable(clusters, id) {
                continue;
            }
            let Some((other, reason)) = self.find_merge_partner(clusters, id) else {
                continue;
            };
            debug!(
                "cluster({id} svs={}) merges with cluster({other} svs={}) reason({reason})",
                clusters.get(id).sv_count(),
                clusters.get(other).sv_count()
            );
            let merged = clusters.merge(id, other, reason);
            let removed = if merged == id { other } else { id };
            self.foldback_arms.remove(removed);
            self.common_arms.remove(removed);
            queue.remove(&removed);
            self.index_cluster(clusters, merged);
            queue.insert(merged);
            merge_count += 1;
        }
        merge_count
    }
}

/// Merge unresolved clusters until no merge rule applies
///
/// Returns the total number of merges.
///
pub fn merge_clusters(ctx: &SampleContext, clusters: &mut ClusterSet, foldbacks: &Foldbacks) -> usize {
    let mut merger = ClusterMerger::new(ctx, foldbacks);
    let mut total = 0;
    loop {
        let merge_count = merger.merge_pass(clusters);
        if merge_count == 0 {
            break;
        }
        total += merge_count;
    }
    total
}
