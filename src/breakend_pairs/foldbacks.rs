use std::collections::BTreeMap;

use log::debug;

use super::DeletionBridges;
use crate::breakend_index::BreakendIndex;
use crate::chaining::chain::ChainPathInfo;
use crate::clustering::{Cluster, ClusterSet};
use crate::constants::{MAX_FOLDBACK_CHAIN_LENGTH, MIN_TEMPLATED_INSERTION_LENGTH};
use crate::copy_number::copy_numbers_equal;
use crate::sv_data::{BreakendKey, StructuralVariant, SvIndex, SvType, get_breakend};

#[derive(Clone, Debug, PartialEq)]
pub struct FoldbackLink {
    /// Partner breakend, which is the breakend itself for a chained foldback on one SV
    pub other: BreakendKey,
    pub length: i64,

    /// Chain path joining the two SVs of the foldback, if it spans two SVs
    pub chain_info: Option<ChainPathInfo>,
}

/// Symmetric foldback relation between breakends
///
#[derive(Default)]
pub struct Foldbacks {
    links: BTreeMap<BreakendKey, FoldbackLink>,
}

impl Foldbacks {
    pub fn get(&self, key: BreakendKey) -> Option<&FoldbackLink> {
        self.links.get(&key)
    }

    pub fn is_foldback(&self, key: BreakendKey) -> bool {
        self.links.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BreakendKey, &FoldbackLink)> {
        self.links.iter()
    }

    pub fn sv_is_foldback(&self, sv: SvIndex) -> bool {
        self.is_foldback(BreakendKey::new(sv, true)) || self.is_foldback(BreakendKey::new(sv, false))
    }

    /// Foldback of the SV's start breakend, or else its end breakend
    pub fn sv_link(&self, sv: SvIndex) -> Option<&FoldbackLink> {
        self.get(BreakendKey::new(sv, true))
            .or_else(|| self.get(BreakendKey::new(sv, false)))
    }

    pub fn sv_partner(&self, sv: SvIndex) -> Option<SvIndex> {
        self.sv_link(sv).map(|x| x.other.sv)
    }

    /// Foldback breakends of the cluster in key order
    pub fn cluster_breakends(&self, cluster: &Cluster) -> Vec<BreakendKey> {
        self.links
            .keys()
            .filter(|k| cluster.contains(k.sv))
            .copied()
            .collect()
    }

    /// Count of distinct foldbacks in the cluster
    pub fn cluster_count(&self, cluster: &Cluster) -> usize {
        self.links
            .iter()
            .filter(|(k, link)| cluster.contains(k.sv) && **k <= link.other)
            .count()
    }

    /// True if a new foldback of this length may replace any foldback already on these breakends
    ///
    /// An existing foldback is only replaced by a strictly shorter one.
    ///
    fn can_replace(&self, keys: &[BreakendKey], length: i64) -> bool {
        keys.iter()
            .all(|key| self.get(*key).is_none_or(|x| length < x.length))
    }

    fn clear(&mut self, key: BreakendKey) {
        if let Some(link) = self.links.remove(&key)
            && link.other != key
            && self.links.get(&link.other).is_some_and(|x| x.other == key)
        {
            self.links.remove(&link.other);
        }
    }

    fn set(
        &mut self,
        be1: BreakendKey,
        be2: BreakendKey,
        length: i64,
        chain_info: Option<ChainPathInfo>,
    ) {
        self.clear(be1);
        self.clear(be2);
        self.links.insert(
            be1,
            FoldbackLink {
                other: be2,
                length,
                chain_info,
            },
        );
        self.links.insert(
            be2,
            FoldbackLink {
                other: be1,
                length,
                chain_info,
            },
        );
    }
}

struct FoldbackMarker<'a> {
    svs: &'a [StructuralVariant],
    dbs: &'a DeletionBridges,
    clusters: &'a ClusterSet,
    foldbacks: Foldbacks,
}

impl FoldbackMarker<'_> {
    /// Test a same-orientation breakend pair, and mark it as a foldback if all criteria are met
    ///
    fn check_foldback_breakends(&mut self, lower: BreakendKey, upper: BreakendKey) {
        let svs = self.svs;
        let lower_sv = &svs[lower.sv];
        let upper_sv = &svs[upper.sv];
        if lower_sv.sv_type == SvType::Ins || upper_sv.sv_type == SvType::Ins {
            return;
        }

        let cluster = self.clusters.cluster_of(upper.sv);
        if cluster.is_resolved && cluster.type_count(svs, SvType::Inv) == 0 {
            return;
        }

        let is_same_sv = lower.sv == upper.sv;
        let chain_info = if is_same_sv {
            // The inversion can't fold back if both of its ends lead off to translocations
            if let Some(chain) = cluster.chain_containing(lower.sv) {
                let bnd_links = chain
                    .links()
                    .iter()
                    .filter(|link| {
                        let other = if link.lower.sv == lower.sv {
                            link.upper
                        } else if link.upper.sv == lower.sv {
                            link.lower
                        } else {
                            return false;
                        };
                        svs[other.sv].sv_type == SvType::Bnd
                    })
                    .count();
                if bnd_links >= 2 {
                    return;
                }
            }
            None
        } else {
            if self.clusters.cluster_id_of(lower.sv) != cluster.id {
                return;
            }
            if cluster.replication(lower.sv) != cluster.replication(upper.sv) {
                return;
            }
            let (Some(chain1), Some(chain2)) = (
                cluster.chain_containing(lower.sv),
                cluster.chain_containing(upper.sv),
            ) else {
                return;
            };
            if chain1.id != chain2.id {
                return;
            }

            // The chain must join the two SVs through their other breakends
            let Some(path) = chain1.path_between(lower.other_end(), upper.other_end()) else {
                return;
            };
            if path.link_count == 0 || path.length > MAX_FOLDBACK_CHAIN_LENGTH {
                return;
            }
            Some(path)
        };

        // Copy number of the segment between the breakends must agree from both sides
        let lower_be = get_breakend(svs, lower);
        let upper_be = get_breakend(svs, upper);
        if !copy_numbers_equal(
            lower_be.copy_number_high_side(),
            upper_be.copy_number_low_side(),
        ) {
            return;
        }

        let length = upper_be.position - lower_be.position;

        // Single-SV foldbacks take priority
        if !is_same_sv && !self.foldbacks.can_replace(&[lower, upper], length) {
            return;
        }

        debug!(
            "cluster({}) foldback SV({}) SV({}) length({length})",
            cluster.id, lower_sv.id, upper_sv.id
        );
        self.foldbacks.set(lower, upper, length, chain_info);
    }

    /// Mark a translocation replicated twice which forms both open ends of a chain
    ///
    fn check_replicated_breakend_foldback(&mut self, key: BreakendKey) {
        let svs = self.svs;
        if svs[key.sv].sv_type != SvType::Bnd {
            return;
        }
        let cluster = self.clusters.cluster_of(key.sv);
        if cluster.replication(key.sv) != 2 {
            return;
        }
        for chain in cluster.chains.iter() {
            if let (Some(first), Some(last)) = chain.open_breakends(svs)
                && first == key
                && last == key
            {
                let chain_info = ChainPathInfo {
                    link_count: chain.link_count(),
                    assembly_link_count: chain.assembly_link_count(),
                    length: chain.length(),
                };
                debug!(
                    "cluster({}) chained foldback translocation SV({})",
                    cluster.id, svs[key.sv].id
                );
                self.foldbacks.set(key, key, 0, Some(chain_info));
                return;
            }
        }
    }
}

/// Find all foldbacks given the current clusters and chains
///
/// Foldbacks are recomputed from scratch on each call.
///
pub fn mark_foldbacks(
    svs: &[StructuralVariant],
    index: &BreakendIndex,
    dbs: &DeletionBridges,
    clusters: &ClusterSet,
) -> Foldbacks {
    let mut marker = FoldbackMarker {
        svs,
        dbs,
        clusters,
        foldbacks: Foldbacks::default(),
    };

    for (_, keys) in index.chromosomes() {
        for i in 0..keys.len() {
            let be = keys[i];
            if i + 1 < keys.len() {
                let next = keys[i + 1];
                let be_orient = get_breakend(svs, be).orientation;
                let next_be = get_breakend(svs, next);

                // (lower, upper, front) where the front breakend faces out of the foldback
                let candidate = if be_orient == next_be.orientation {
                    let front = if be_orient == 1 { be } else { next };
                    Some((be, next, front))
                } else if i + 2 < keys.len() {
                    // A short overlapping deletion bridge on either breakend can mask a foldback
                    let post = keys[i + 2];
                    let post_be = get_breakend(svs, post);
                    if be_orient != post_be.orientation {
                        None
                    } else if post_be.orientation == 1
                        && post_be.position - next_be.position < MIN_TEMPLATED_INSERTION_LENGTH
                    {
                        Some((be, post, be))
                    } else if post_be.orientation == -1
                        && next_be.position - get_breakend(svs, be).position
                            < MIN_TEMPLATED_INSERTION_LENGTH
                    {
                        Some((be, post, post))
                    } else {
                        None
                    }
                } else {
                    None
                };

                if let Some((lower, upper, front)) = candidate
                    && !marker.dbs.has_short_db(front)
                {
                    marker.check_foldback_breakends(lower, upper);
                }
            }
            marker.check_replicated_breakend_foldback(be);
        }
    }
    marker.foldbacks
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::breakend_pairs::find_deletion_bridges;
    use crate::classify::ResolvedType;
    use crate::test_utils::*;

    fn mark_single_clusters(svs: &[StructuralVariant]) -> Foldbacks {
        let index = BreakendIndex::new(svs).unwrap();
        let dbs = find_deletion_bridges(svs, &index);
        let clusters = ClusterSet::from_groups(svs.len(), vec![(0..svs.len()).collect()]);
        mark_foldbacks(svs, &index, &dbs, &clusters)
    }

    #[test]
    fn test_inversion_foldback() {
        let mut svs = vec![create_inv(0, "1", 10000, 12000, -1)];

        // Segment between the breakends has CN 2 from below and 1 from above
        assert!(!mark_single_clusters(&svs).is_foldback(BreakendKey::new(0, true)));

        svs[0].end.as_mut().unwrap().copy_number = 3.0;
        let foldbacks = mark_single_clusters(&svs);
        let link = foldbacks.get(BreakendKey::new(0, true)).unwrap();
        assert_eq!(link.other, BreakendKey::new(0, false));
        assert_eq!(link.length, 2000);
        assert_eq!(foldbacks.sv_partner(0), Some(0));
        assert_eq!(foldbacks.get(BreakendKey::new(0, false)).unwrap().other, BreakendKey::new(0, true));
    }

    #[test]
    fn test_equal_length_keeps_existing_foldback() {
        let mut foldbacks = Foldbacks::default();
        let (a, b, c) = (
            BreakendKey::new(0, true),
            BreakendKey::new(1, true),
            BreakendKey::new(2, true),
        );
        foldbacks.set(a, b, 500, None);

        assert!(!foldbacks.can_replace(&[b, c], 500));
        assert!(foldbacks.can_replace(&[b, c], 499));
        assert!(foldbacks.can_replace(&[c], 10_000));

        foldbacks.set(b, c, 499, None);
        assert!(!foldbacks.is_foldback(a));
        assert_eq!(foldbacks.get(b).unwrap().other, c);
    }

    fn chained_foldback_svs() -> Vec<StructuralVariant> {
        // Both BNDs leave chr1 facing down and are joined by a 1000 base TI on chr2
        let mut svs = vec![
            create_bnd(0, "1", 10000, 1, "2", 5000, -1),
            create_bnd(1, "1", 11000, 1, "2", 6000, 1),
        ];
        svs[0].start.copy_number = 3.0;
        svs
    }

    #[test]
    fn test_unassembled_chained_foldback() {
        let result = run_pipeline(chained_foldback_svs(), Vec::new());
        let link = result.foldbacks.get(BreakendKey::new(0, true)).unwrap();
        assert_eq!(link.other, BreakendKey::new(1, true));
        assert_eq!(link.length, 1000);
        assert_eq!(
            link.chain_info,
            Some(ChainPathInfo {
                link_count: 1,
                assembly_link_count: 0,
                length: 1000,
            })
        );
        assert_eq!(
            cluster_of(&result, 0).resolved_type,
            ResolvedType::ComplexChain
        );
    }

    #[test]
    fn test_assembled_chained_foldback() {
        let mut svs = chained_foldback_svs();
        svs[0].assembly_linked_ids = vec![1];
        let result = run_pipeline(svs, Vec::new());
        let link = result.foldbacks.get(BreakendKey::new(1, true)).unwrap();
        assert_eq!(link.other, BreakendKey::new(0, true));
        assert_eq!(link.chain_info.unwrap().assembly_link_count, 1);
    }

    #[test]
    fn test_insertion_is_never_foldback() {
        let mut svs = vec![create_sv(0, SvType::Ins, "1", 1000, 1, "1", 1200, 1)];
        svs[0].end.as_mut().unwrap().copy_number = 1.0;
        assert!(mark_single_clusters(&svs).iter().next().is_none());
    }

    #[test]
    fn test_short_db_on_front_blocks_foldback() {
        // The -1 INV foldback's front is its upper breakend, which overlaps the SGL by 10 bases
        let mut svs = vec![
            create_inv(0, "1", 10000, 12000, -1),
            create_sgl(1, "1", 12010, 1),
        ];
        svs[0].end.as_mut().unwrap().copy_number = 3.0;
        let foldbacks = mark_single_clusters(&svs);
        assert!(!foldbacks.sv_is_foldback(0));
    }
}
