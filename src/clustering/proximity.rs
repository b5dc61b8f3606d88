use log::debug;

use super::ClusterSet;
use crate::breakend_index::BreakendIndex;
use crate::sv_data::{StructuralVariant, get_breakend};
use crate::union_find::UnionFind;

/// Build the initial clusters by joining consecutive breakends closer than `proximity_distance`
///
/// The two breakends of an SV always share a cluster. Cluster ids follow the lowest member SV
/// arena index, so the grouping is fully determined by the SV set and the distance.
///
pub fn cluster_by_proximity(
    svs: &[StructuralVariant],
    index: &BreakendIndex,
    proximity_distance: i64,
) -> ClusterSet {
    let mut uf = UnionFind::new(svs.len());
    for (_, keys) in index.chromosomes() {
        for pair in keys.windows(2) {
            let distance =
                get_breakend(svs, pair[1]).position - get_breakend(svs, pair[0]).position;
            if distance < proximity_distance {
                uf.union(pair[0].sv, pair[1].sv);
            }
        }
    }

    let groups = uf.groups();
    debug!(
        "Proximity clustering formed {} clusters from {} SVs",
        groups.len(),
        svs.len()
    );
    ClusterSet::from_groups(svs.len(), groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::*;

    #[test]
    fn test_proximity_clustering() {
        let svs = vec![
            create_del(0, "1", 1000, 2000),
            create_del(1, "1", 10000, 11000),
            create_bnd(2, "1", 10500, 1, "2", 100000, -1),
            create_dup(3, "2", 104999, 110000),
            create_sgl(4, "3", 5000, 1),
        ];
        let index = BreakendIndex::new(&svs).unwrap();
        let clusters = cluster_by_proximity(&svs, &index, 5000);

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.cluster_id_of(0), 0);
        assert_eq!(clusters.get(1).svs, vec![1, 2, 3]);
        assert_eq!(clusters.cluster_id_of(4), 2);

        // Distance must be strictly below the threshold
        let clusters = cluster_by_proximity(&svs, &index, 4000);
        assert_eq!(clusters.cluster_id_of(1), clusters.cluster_id_of(2));
        assert_ne!(clusters.cluster_id_of(0), clusters.cluster_id_of(1));
        assert_ne!(clusters.cluster_id_of(2), clusters.cluster_id_of(3));
    }
}
