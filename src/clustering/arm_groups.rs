use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::Cluster;
use crate::chromosome_arms::ChromosomeArm;
use crate::int_range::IntRange;
use crate::sv_data::{BreakendKey, StructuralVariant, SvIndex, get_breakend};

pub type ChromArm = (String, ChromosomeArm);

/// The unordered pair of chromosome arms joined by a cross-arm SV
pub type ArmPair = (ChromArm, ChromArm);

/// All breakends of one cluster on one chromosome arm
///
#[derive(Debug)]
pub struct ArmGroup {
    pub chrom_arm: ChromArm,
    pub breakends: Vec<BreakendKey>,

    /// Replication-weighted sum of breakend orientations
    pub consistency: i64,

    /// Range covered by the group breakends
    pub range: IntRange,
}

impl ArmGroup {
    /// True if the group may take part in a common arm merge
    pub fn can_link(&self, arm_width_cutoff: i64) -> bool {
        self.consistency != 0 || self.range.size() > arm_width_cutoff
    }

    pub fn contains_sv(&self, sv: SvIndex) -> bool {
        self.breakends.iter().any(|x| x.sv == sv)
    }
}

fn chrom_arm(svs: &[StructuralVariant], key: BreakendKey) -> ChromArm {
    let be = get_breakend(svs, key);
    (be.chrom.clone(), be.arm)
}

/// Arm groups of the cluster in (chromosome, arm) order
pub fn cluster_arm_groups(svs: &[StructuralVariant], cluster: &Cluster) -> Vec<ArmGroup> {
    let mut groups: BTreeMap<ChromArm, ArmGroup> = BTreeMap::new();
    for &sv in cluster.svs.iter() {
        let rep = cluster.replication(sv) as i64;
        for key in svs[sv].breakend_keys(sv) {
            let be = get_breakend(svs, key);
            let pos_range = IntRange::from_int(be.position);
            let chrom_arm = chrom_arm(svs, key);
            let group = groups.entry(chrom_arm.clone()).or_insert_with(|| ArmGroup {
                chrom_arm,
                breakends: Vec::new(),
                consistency: 0,
                range: pos_range,
            });
            group.breakends.push(key);
            group.consistency += be.orientation as i64 * rep;
            group.range.merge(&pos_range);
        }
    }
    groups.into_values().collect()
}

/// Cross-arm SVs of the cluster with no breakend in a short templated insertion
///
/// Short templated insertions come from either the cluster's assembly links or its chains.
///
pub fn unlinked_remote_svs(svs: &[StructuralVariant], cluster: &Cluster) -> Vec<SvIndex> {
    let short_ti_svs = cluster
        .assembly_links
        .iter()
        .chain(cluster.chains.iter().flat_map(|x| x.links()))
        .filter(|x| x.is_templated_insertion() && x.is_short())
        .flat_map(|x| [x.lower.sv, x.upper.sv])
        .collect::<BTreeSet<_>>();

    cluster
        .svs
        .iter()
        .copied()
        .filter(|&x| svs[x].is_cross_arm() && !short_ti_svs.contains(&x))
        .collect()
}

/// Arm pairs on which this cluster could merge with another cluster through common arms
///
/// Each pair comes from an unlinked cross-arm SV which has a breakend in one of the cluster's
/// linkable arm groups. Two clusters sharing any arm pair satisfy the common arm rule.
///
pub fn common_arm_keys(
    svs: &[StructuralVariant],
    cluster: &Cluster,
    arm_width_cutoff: i64,
) -> BTreeSet<ArmPair> {
    let mut keys = BTreeSet::new();
    let groups = cluster_arm_groups(svs, cluster);
    let linkable = groups
        .iter()
        .filter(|x| x.can_link(arm_width_cutoff))
        .collect::<Vec<_>>();
    if linkable.is_empty() {
        return keys;
    }
    for group in linkable.iter() {
        debug!(
            "cluster({}) linkable arm group {:?} breakends({}) consistency({}) range({:?})",
            cluster.id,
            group.chrom_arm,
            group.breakends.len(),
            group.consistency,
            group.range
        );
    }

    for sv in unlinked_remote_svs(svs, cluster) {
        if !linkable.iter().any(|x| x.contains_sv(sv)) {
            continue;
        }
        let arm1 = chrom_arm(svs, BreakendKey::new(sv, true));
        let arm2 = chrom_arm(svs, BreakendKey::new(sv, false));
        keys.insert(if arm1 <= arm2 { (arm1, arm2) } else { (arm2, arm1) });
    }
    keys
}
