//! Resolved-type classification of clusters
//!

mod pair_types;

use log::debug;

use crate::analyser::SampleContext;
use crate::breakend_pairs::Foldbacks;
use crate::clustering::Cluster;
use crate::constants::{
    MAX_SIMPLE_DEL_DUP_CUTOFF, MIN_SIMPLE_DEL_DUP_CUTOFF, SIMPLE_DEL_DUP_MEDIAN_FACTOR,
};
use crate::sv_data::{StructuralVariant, SvType};

/// Terminal classification of a cluster
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    #[default]
    None,
    Line,
    SimpleSv,
    RecipInv,
    RecipInvDups,
    RecipInvDelDup,
    DupTi,
    DelTi,
    FbInvPair,
    PairOther,
    RecipTrans,
    RecipTransDelDup,
    RecipTransDups,
    UnbalTransTi,
    SglPairIns,
    SglPairDel,
    SglPairDup,
    SimpleChain,
    ComplexChain,
    DoubleMinute,
}

/// Sample-specific length cutoffs below which a lone DEL or DUP is a simple SV
///
#[derive(Clone, Copy, Debug)]
pub struct SimpleVariantLengths {
    pub del_cutoff: i64,
    pub dup_cutoff: i64,
}

fn median(mut values: Vec<i64>) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2
    } else {
        values[mid]
    })
}

impl SimpleVariantLengths {
    pub fn new(svs: &[StructuralVariant]) -> Self {
        let cutoff = |sv_type: SvType| {
            let lengths = svs
                .iter()
                .filter(|x| x.sv_type == sv_type)
                .map(|x| x.length())
                .collect::<Vec<_>>();
            median(lengths)
                .map(|x| x * SIMPLE_DEL_DUP_MEDIAN_FACTOR)
                .unwrap_or(MIN_SIMPLE_DEL_DUP_CUTOFF)
                .clamp(MIN_SIMPLE_DEL_DUP_CUTOFF, MAX_SIMPLE_DEL_DUP_CUTOFF)
        };
        Self {
            del_cutoff: cutoff(SvType::Del),
            dup_cutoff: cutoff(SvType::Dup),
        }
    }

    /// True if the SV is a DEL or DUP at least as long as its type cutoff
    pub fn is_long_del_dup(&self, sv: &StructuralVariant) -> bool {
        match sv.sv_type {
            SvType::Del => sv.length() >= self.del_cutoff,
            SvType::Dup => sv.length() >= self.dup_cutoff,
            _ => false,
        }
    }
}

fn classify_single_sv(ctx: &SampleContext, cluster: &mut Cluster) {
    let sv = &ctx.svs[cluster.svs[0]];
    match sv.sv_type {
        SvType::Del | SvType::Dup => {
            if !ctx.simple_lengths.is_long_del_dup(sv) {
                cluster.set_resolved(ResolvedType::SimpleSv, true);
            }
        }
        SvType::Ins => cluster.set_resolved(ResolvedType::SimpleSv, true),
        SvType::Inv | SvType::Bnd | SvType::Sgl => {}
    }
}

/// Assign a resolved type to the cluster from its SVs and chains
///
/// Rules are tried in a fixed priority order and the first one which applies sets the type.
/// A cluster matching no rule keeps type NONE.
///
pub fn classify_cluster(ctx: &SampleContext, foldbacks: &Foldbacks, cluster: &mut Cluster) {
    cluster.set_resolved(ResolvedType::None, false);

    if cluster.has_line_element {
        cluster.set_resolved(ResolvedType::Line, true);
        return;
    }

    if cluster.sv_count() == 1 {
        classify_single_sv(ctx, cluster);
        return;
    }

    let is_pair_classified = cluster.sv_count() == 2
        && cluster.is_consistent(ctx.svs)
        && pair_types::classify_pair(ctx, cluster);
    if !is_pair_classified && cluster.is_fully_chained() {
        let resolved_type = if foldbacks.cluster_count(cluster) > 0 {
            ResolvedType::ComplexChain
        } else {
            ResolvedType::SimpleChain
        };
        cluster.set_resolved(resolved_type, false);
    }

    debug!(
        "cluster({}) svs({}) resolved type {} resolved({})",
        cluster.id,
        cluster.sv_count(),
        cluster.resolved_type,
        cluster.is_resolved
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use crate::test_utils::*;

    #[test]
    fn test_resolved_type_strings() {
        assert_eq!(ResolvedType::None.to_string(), "NONE");
        assert_eq!(ResolvedType::RecipInvDelDup.to_string(), "RECIP_INV_DEL_DUP");
        assert_eq!(ResolvedType::UnbalTransTi.to_string(), "UNBAL_TRANS_TI");
        assert_eq!(
            ResolvedType::from_str("FB_INV_PAIR").unwrap(),
            ResolvedType::FbInvPair
        );
    }

    #[test]
    fn test_simple_variant_lengths() {
        let svs = vec![
            create_del(0, "1", 1000, 3000),
            create_del(1, "1", 10000, 12000),
            create_del(2, "1", 20000, 26000),
            create_dup(3, "2", 2_000_000, 8_000_000),
        ];
        let lengths = SimpleVariantLengths::new(&svs);
        assert_eq!(lengths.del_cutoff, 10000);
        assert_eq!(lengths.dup_cutoff, MAX_SIMPLE_DEL_DUP_CUTOFF);
        assert!(!lengths.is_long_del_dup(&svs[2]));
        assert!(lengths.is_long_del_dup(&svs[3]));

        let lengths = SimpleVariantLengths::new(&[]);
        assert_eq!(lengths.del_cutoff, MIN_SIMPLE_DEL_DUP_CUTOFF);
    }

    #[test]
    fn test_simple_svs() {
        let result = run_pipeline(
            vec![
                create_del(0, "1", 1000, 3000),
                create_ins(1, "2", 1000, 1001),
                create_dup(2, "3", 1_000_000, 80_000_000),
                create_inv(3, "4", 1000, 2_000_000, 1),
            ],
            Vec::new(),
        );
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::SimpleSv);
        assert!(cluster.is_resolved);
        assert_eq!(cluster_of(&result, 1).resolved_type, ResolvedType::SimpleSv);

        // A long DUP left alone after merging is still simple
        let cluster = cluster_of(&result, 2);
        assert_eq!(cluster.resolved_type, ResolvedType::SimpleSv);
        assert!(cluster.is_resolved);

        let cluster = cluster_of(&result, 3);
        assert_eq!(cluster.resolved_type, ResolvedType::None);
        assert!(!cluster.is_resolved);
    }

    #[test]
    fn test_reciprocal_inversion() {
        let result = run_pipeline(
            vec![
                create_inv(0, "1", 1000, 10000, 1),
                create_inv(1, "1", 1500, 10500, -1),
            ],
            Vec::new(),
        );
        assert_eq!(result.clusters.len(), 1);
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::RecipInv);
        assert!(cluster.is_resolved);
        assert!(cluster.chains.is_empty());
    }

    #[test]
    fn test_reciprocal_inversion_q_arm() {
        let result = run_pipeline(
            vec![
                create_inv(0, "3", 100_000_000, 100_050_000, 1),
                create_inv(1, "3", 100_000_400, 100_050_300, -1),
            ],
            Vec::new(),
        );
        let cluster = cluster_of(&result, 1);
        assert_eq!(cluster.resolved_type, ResolvedType::RecipInv);
        assert!(cluster.chains.is_empty());
    }

    #[test]
    fn test_facing_inversions() {
        let result = run_pipeline(
            vec![
                create_inv(0, "1", 1000, 2000, -1),
                create_inv(1, "1", 5000, 6000, 1),
            ],
            Vec::new(),
        );
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::FbInvPair);
        assert!(!cluster.is_resolved);
        assert_eq!(cluster.chains.len(), 1);
        assert_eq!(cluster.chains[0].link_count(), 1);
        assert_eq!(cluster.chains[0].length(), 3000);
    }

    #[test]
    fn test_enclosing_inversions() {
        let svs = vec![
            create_inv(0, "1", 1000, 200000, 1),
            create_inv(1, "1", 5000, 50000, -1),
        ];
        let result = run_pipeline(svs.clone(), Vec::new());
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::RecipInvDelDup);
        assert!(cluster.chains.is_empty());

        // An LOH event bounded by the templated insertion changes the interpretation
        let lohs = vec![create_loh("1", 200000, 1_000_000, Some(0), None)];
        let result = run_pipeline(svs, lohs);
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::DelTi);
        assert_eq!(cluster.chains.len(), 1);
        assert_eq!(cluster.chains[0].length(), 150000);
    }

    #[test]
    fn test_inner_overlap_inversions() {
        let result = run_pipeline(
            vec![
                create_inv(0, "1", 1000, 10000, -1),
                create_inv(1, "1", 1500, 10500, 1),
            ],
            Vec::new(),
        );
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::DupTi);
        assert_eq!(cluster.chains.len(), 1);
        assert_eq!(cluster.chains[0].length(), 500);

        // Long templated insertions with a large overlap, merged from two clusters
        let svs = vec![
            create_inv(0, "1", 1000, 400000, -1),
            create_inv(1, "1", 200000, 600000, 1),
        ];
        let result = run_pipeline(svs.clone(), Vec::new());
        assert_eq!(result.clusters.len(), 1);
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::RecipInvDups);
        assert!(cluster.chains.is_empty());

        let lohs = vec![create_loh("1", 400000, 600000, Some(1), Some(1))];
        let result = run_pipeline(svs, lohs);
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::DupTi);
        assert_eq!(cluster.chains[0].length(), 200000);
    }

    #[test]
    fn test_translocation_pairs() {
        let result = run_pipeline(
            vec![
                create_bnd(0, "1", 1000, 1, "2", 5000, -1),
                create_bnd(1, "1", 1500, -1, "2", 4500, 1),
            ],
            Vec::new(),
        );
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::RecipTrans);
        assert!(cluster.is_resolved);

        let result = run_pipeline(
            vec![
                create_bnd(0, "1", 1000, 1, "2", 5000, -1),
                create_bnd(1, "1", 1500, -1, "2", 5400, 1),
            ],
            Vec::new(),
        );
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::UnbalTransTi);
        assert_eq!(cluster.chains.len(), 1);
        assert_eq!(cluster.chains[0].length(), 400);
    }

    #[test]
    fn test_sgl_pairs() {
        let result = run_pipeline(
            vec![
                create_sgl(0, "1", 1000, -1),
                create_sgl(1, "1", 1010, 1),
                create_sgl(2, "2", 1000, 1),
                create_sgl(3, "2", 3000, -1),
                create_sgl(4, "3", 1000, -1),
                create_sgl(5, "3", 3000, 1),
            ],
            Vec::new(),
        );
        assert_eq!(cluster_of(&result, 0).resolved_type, ResolvedType::SglPairIns);
        assert_eq!(cluster_of(&result, 2).resolved_type, ResolvedType::SglPairDel);
        assert_eq!(cluster_of(&result, 4).resolved_type, ResolvedType::SglPairDup);
        assert!(cluster_of(&result, 4).is_resolved);
    }
}
