//! Cluster membership and merge provenance for one sample
//!

pub mod arm_groups;
mod cluster;
pub mod merge;
pub mod proximity;
pub mod simple_groups;

use std::collections::BTreeMap;

pub use cluster::{Cluster, ClusterId, ClusterMetrics};

use crate::sv_data::SvIndex;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusteringReason {
    Foldbacks,
    CommonArms,
    LooseOverlap,
}

/// One entry of the append-only merge history
#[derive(Clone, Debug)]
pub struct MergeRecord {
    /// Cluster which absorbed the other
    pub target: ClusterId,
    pub source: ClusterId,
    pub reason: ClusteringReason,
}

/// All clusters of one sample
///
/// Membership is held as a flat SV-to-cluster table. Merges keep the lower cluster id and are
/// logged so that the original sub-clusters of any cluster can be recovered.
///
pub struct ClusterSet {
    clusters: BTreeMap<ClusterId, Cluster>,
    sv_cluster: Vec<ClusterId>,
    merge_history: Vec<MergeRecord>,
    next_id: ClusterId,
}

impl ClusterSet {
    /// Create one cluster per SV group, with ids assigned in group order
    ///
    pub fn from_groups(sv_count: usize, groups: Vec<Vec<SvIndex>>) -> Self {
        let mut clusters = BTreeMap::new();
        let mut sv_cluster = vec![ClusterId::MAX; sv_count];
        let next_id = groups.len();
        for (cluster_id, group) in groups.into_iter().enumerate() {
            for &sv in group.iter() {
                sv_cluster[sv] = cluster_id;
            }
            clusters.insert(cluster_id, Cluster::new(cluster_id, group));
        }
        Self {
            clusters,
            sv_cluster,
            merge_history: Vec::new(),
            next_id,
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn cluster_id_of(&self, sv: SvIndex) -> ClusterId {
        self.sv_cluster[sv]
    }

    pub fn cluster_of(&self, sv: SvIndex) -> &Cluster {
        self.get(self.cluster_id_of(sv))
    }

    pub fn get(&self, id: ClusterId) -> &Cluster {
        match self.clusters.get(&id) {
            Some(x) => x,
            None => panic!("Unknown cluster id {id}"),
        }
    }

    pub fn get_mut(&mut self, id: ClusterId) -> &mut Cluster {
        match self.clusters.get_mut(&id) {
            Some(x) => x,
            None => panic!("Unknown cluster id {id}"),
        }
    }

    pub fn contains(&self, id: ClusterId) -> bool {
        self.clusters.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<ClusterId> {
        self.clusters.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cluster> {
        self.clusters.values_mut()
    }

    /// Merge two clusters, returning the id of the combined cluster
    ///
    /// The merged cluster loses any previous classification and chains.
    ///
    pub fn merge(&mut self, id1: ClusterId, id2: ClusterId, reason: ClusteringReason) -> ClusterId {
        assert_ne!(id1, id2);
        let (target, source) = if id1 < id2 { (id1, id2) } else { (id2, id1) };
        let Some(source_cluster) = self.clusters.remove(&source) else {
            panic!("Unknown cluster id {source}");
        };
        for &sv in source_cluster.svs.iter() {
            self.sv_cluster[sv] = target;
        }
        self.get_mut(target).absorb(source_cluster);
        self.merge_history.push(MergeRecord {
            target,
            source,
            reason,
        });
        target
    }

    /// Move SVs out of a cluster, giving each its own new cluster
    ///
    /// A cluster left with fewer than two SVs is dissolved entirely. The ids of all new clusters
    /// are returned in SV order. The remaining cluster loses any previous classification.
    ///
    pub fn split_off(&mut self, id: ClusterId, svs: &[SvIndex]) -> Vec<ClusterId> {
        let cluster = self.get_mut(id);
        let remaining = cluster
            .svs
            .iter()
            .copied()
            .filter(|x| !svs.contains(x))
            .collect::<Vec<_>>();

        let moved = if remaining.len() < 2 {
            let Some(cluster) = self.clusters.remove(&id) else {
                panic!("Unknown cluster id {id}");
            };
            cluster.svs
        } else {
            cluster.svs = remaining;
            cluster
                .assembly_links
                .retain(|link| !svs.iter().any(|&sv| link.has_sv(sv)));
            cluster.reset();
            let mut moved = svs.to_vec();
            moved.sort_unstable();
            moved
        };

        moved
            .into_iter()
            .map(|sv| {
                let new_id = self.next_id;
                self.next_id += 1;
                self.sv_cluster[sv] = new_id;
                self.clusters.insert(new_id, Cluster::new(new_id, vec![sv]));
                new_id
            })
            .collect()
    }

    pub fn merge_history(&self) -> &[MergeRecord] {
        &self.merge_history
    }

    /// All cluster ids merged into this cluster, directly or through earlier merges
    pub fn sub_clusters(&self, id: ClusterId) -> Vec<ClusterId> {
        let mut members = vec![id];
        for record in self.merge_history.iter().rev() {
            if members.contains(&record.target) && !members.contains(&record.source) {
                members.push(record.source);
            }
        }
        members.sort_unstable();
        members
    }

    /// Reasons for every merge which contributed to this cluster
    pub fn merge_reasons(&self, id: ClusterId) -> Vec<ClusteringReason> {
        let members = self.sub_clusters(id);
        let mut reasons = self
            .merge_history
            .iter()
            .filter(|x| members.contains(&x.target))
            .map(|x| x.reason)
            .collect::<Vec<_>>();
        reasons.sort_unstable();
        reasons.dedup();
        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_history() {
        let mut clusters = ClusterSet::from_groups(4, vec![vec![0], vec![1], vec![2, 3]]);
        assert_eq!(clusters.len(), 3);

        let id = clusters.merge(2, 1, ClusteringReason::Foldbacks);
        assert_eq!(id, 1);
        assert_eq!(clusters.cluster_id_of(3), 1);
        assert_eq!(clusters.get(1).svs, vec![1, 2, 3]);

        let id = clusters.merge(1, 0, ClusteringReason::LooseOverlap);
        assert_eq!(id, 0);
        assert_eq!(clusters.len(), 1);
        assert!((0..4).all(|sv| clusters.cluster_id_of(sv) == 0));
        assert_eq!(clusters.sub_clusters(0), vec![0, 1, 2]);
        assert_eq!(
            clusters.merge_reasons(0),
            vec![ClusteringReason::Foldbacks, ClusteringReason::LooseOverlap]
        );
        assert_eq!(clusters.merge_history().len(), 2);
        assert_eq!(clusters.merge_history()[0].source, 2);
    }

    #[test]
    fn test_split_off() {
        let mut clusters = ClusterSet::from_groups(5, vec![vec![0, 1, 2], vec![3, 4]]);

        let new_ids = clusters.split_off(0, &[2]);
        assert_eq!(new_ids, vec![2]);
        assert_eq!(clusters.get(0).svs, vec![0, 1]);
        assert_eq!(clusters.cluster_id_of(2), 2);
        assert_eq!(clusters.get(2).svs, vec![2]);

        // A single SV can't be left behind
        let new_ids = clusters.split_off(1, &[4]);
        assert_eq!(new_ids, vec![3, 4]);
        assert!(!clusters.contains(1));
        assert_eq!(clusters.cluster_id_of(3), 3);
        assert_eq!(clusters.cluster_id_of(4), 4);
        assert_eq!(clusters.len(), 4);
    }
}
