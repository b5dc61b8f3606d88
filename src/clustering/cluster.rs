use std::collections::{BTreeMap, BTreeSet};

use crate::annotate::ClusterAnnotation;
use crate::breakend_index::BreakendIndex;
use crate::chaining::chain::Chain;
use crate::classify::ResolvedType;
use crate::copy_number::jcn_match;
use crate::linked_pair::LinkedPair;
use crate::sv_data::{BreakendKey, StructuralVariant, SvIndex, SvType, get_breakend};

pub type ClusterId = usize;

/// Summary values computed from the final chains of a cluster
#[derive(Clone, Debug, Default)]
pub struct ClusterMetrics {
    /// Total bases covered by templated insertions
    pub traversed_range: i64,

    /// Total bases removed by deletion bridges between the cluster's breakends
    pub total_deleted: i64,

    /// Percent of templated insertions whose segment copy number supports the link JCN
    pub valid_allele_jcn_segment_perc: f64,
}

/// A group of SVs which are classified together
///
#[derive(Clone, Debug)]
pub struct Cluster {
    pub id: ClusterId,

    /// Member SVs in ascending arena order
    pub svs: Vec<SvIndex>,

    /// Logical copy count of each member SV, members without an entry have one copy
    pub replication: BTreeMap<SvIndex, u32>,

    /// Assembly links between member SVs
    pub assembly_links: Vec<LinkedPair>,

    pub chains: Vec<Chain>,

    pub resolved_type: ResolvedType,
    pub is_resolved: bool,

    pub has_line_element: bool,

    /// Set when chaining was abandoned because the cluster is too large
    pub chaining_skipped: bool,

    pub annotations: BTreeSet<ClusterAnnotation>,
    pub metrics: ClusterMetrics,
}

impl Cluster {
    pub fn new(id: ClusterId, mut svs: Vec<SvIndex>) -> Self {
        svs.sort_unstable();
        svs.dedup();
        Self {
            id,
            svs,
            replication: BTreeMap::new(),
            assembly_links: Vec::new(),
            chains: Vec::new(),
            resolved_type: ResolvedType::None,
            is_resolved: false,
            has_line_element: false,
            chaining_skipped: false,
            annotations: BTreeSet::new(),
            metrics: ClusterMetrics::default(),
        }
    }

    /// Count of unique SVs
    pub fn sv_count(&self) -> usize {
        self.svs.len()
    }

    pub fn replication(&self, sv: SvIndex) -> u32 {
        self.replication.get(&sv).copied().unwrap_or(1)
    }

    /// Count of SVs including all replicated copies
    pub fn replicated_sv_count(&self) -> usize {
        self.svs.iter().map(|&x| self.replication(x) as usize).sum()
    }

    pub fn contains(&self, sv: SvIndex) -> bool {
        self.svs.binary_search(&sv).is_ok()
    }

    pub fn set_resolved(&mut self, resolved_type: ResolvedType, is_resolved: bool) {
        self.resolved_type = resolved_type;
        self.is_resolved = is_resolved;
    }

    /// Clear all classification and chaining state, used when a cluster's membership changes
    pub fn reset(&mut self) {
        self.resolved_type = ResolvedType::None;
        self.is_resolved = false;
        self.chains.clear();
        self.replication.clear();
        self.chaining_skipped = false;
        self.annotations.clear();
        self.metrics = ClusterMetrics::default();
    }

    /// Absorb all SVs and links of another cluster
    pub fn absorb(&mut self, other: Cluster) {
        self.svs.extend(other.svs);
        self.svs.sort_unstable();
        self.svs.dedup();
        self.assembly_links.extend(other.assembly_links);
        self.has_line_element |= other.has_line_element;
        self.reset();
    }

    pub fn chain_containing(&self, sv: SvIndex) -> Option<&Chain> {
        self.chains.iter().find(|x| x.contains_sv(sv))
    }

    /// True if a single chain covers every SV instance
    pub fn is_fully_chained(&self) -> bool {
        self.chains.len() == 1 && self.chains[0].sv_count() == self.replicated_sv_count()
    }

    pub fn type_count(&self, svs: &[StructuralVariant], sv_type: SvType) -> usize {
        self.svs.iter().filter(|&&x| svs[x].sv_type == sv_type).count()
    }

    /// True if the member SV junction copy numbers are not all compatible
    pub fn has_varied_jcn(&self, svs: &[StructuralVariant]) -> bool {
        let by_jcn = |&a: &&SvIndex, &b: &&SvIndex| svs[*a].jcn.total_cmp(&svs[*b].jcn);
        match (self.svs.iter().min_by(by_jcn), self.svs.iter().max_by(by_jcn)) {
            (Some(&min), Some(&max)) => !jcn_match(&svs[min], &svs[max]),
            _ => false,
        }
    }

    /// Replication-weighted sum of breakend orientations
    ///
    /// A cluster whose breakends balance out to zero has a consistent topology.
    ///
    pub fn consistency(&self, svs: &[StructuralVariant]) -> i64 {
        self.svs
            .iter()
            .map(|&sv_index| {
                let rep = self.replication(sv_index) as i64;
                svs[sv_index]
                    .breakend_keys(sv_index)
                    .into_iter()
                    .map(|k| get_breakend(svs, k).orientation as i64 * rep)
                    .sum::<i64>()
            })
            .sum()
    }

    pub fn is_consistent(&self, svs: &[StructuralVariant]) -> bool {
        self.consistency(svs) == 0
    }

    /// All breakends of the cluster by chromosome, in breakend index order
    pub fn chr_breakends(
        &self,
        svs: &[StructuralVariant],
        index: &BreakendIndex,
    ) -> BTreeMap<String, Vec<BreakendKey>> {
        let mut chr_breakends: BTreeMap<String, Vec<BreakendKey>> = BTreeMap::new();
        for &sv_index in self.svs.iter() {
            for key in svs[sv_index].breakend_keys(sv_index) {
                chr_breakends
                    .entry(get_breakend(svs, key).chrom.clone())
                    .or_default()
                    .push(key);
            }
        }
        for keys in chr_breakends.values_mut() {
            keys.sort_by_key(|&k| index.index_of(k));
        }
        chr_breakends
    }
}
