//! Rules for consistent two-SV clusters
//!

use log::debug;

use super::ResolvedType;
use crate::analyser::SampleContext;
use crate::chaining::chain::Chain;
use crate::clustering::Cluster;
use crate::constants::{MAX_DUP_TI_INV_OVERLAP, MIN_TEMPLATED_INSERTION_LENGTH};
use crate::int_range::{IntRange, get_overlap_range};
use crate::linked_pair::LinkedPair;
use crate::sv_data::{BreakendKey, StructuralVariant, SvIndex, SvType, get_breakend};

/// Outcome of a pair rule: the type, whether it is resolved, and the templated insertion to
/// keep as the cluster's only chain
struct PairResolution {
    resolved_type: ResolvedType,
    is_resolved: bool,
    chain_link: Option<LinkedPair>,
}

impl PairResolution {
    fn new(resolved_type: ResolvedType, is_resolved: bool) -> Self {
        Self {
            resolved_type,
            is_resolved,
            chain_link: None,
        }
    }

    fn with_chain(resolved_type: ResolvedType, link: LinkedPair) -> Self {
        Self {
            resolved_type,
            is_resolved: false,
            chain_link: Some(link),
        }
    }
}

fn is_loh_bounded(ctx: &SampleContext, link: &LinkedPair) -> bool {
    let svs = ctx.svs;
    ctx.lohs.iter().any(|loh| {
        [link.lower, link.upper]
            .iter()
            .any(|&k| loh.is_bounded_by(svs[k.sv].id, get_breakend(svs, k)))
    })
}

/// Templated insertion formed by one breakend of each SV
fn templated_insertion(
    svs: &[StructuralVariant],
    be1: BreakendKey,
    be2: BreakendKey,
) -> Option<LinkedPair> {
    LinkedPair::from_facing_breakends(svs, be1, be2, false).filter(|x| x.is_templated_insertion())
}

/// All templated insertions between a breakend of one SV and a breakend of the other
fn cross_templated_insertions(
    svs: &[StructuralVariant],
    sv1: SvIndex,
    sv2: SvIndex,
) -> Vec<LinkedPair> {
    let mut links = Vec::new();
    for be1 in svs[sv1].breakend_keys(sv1) {
        for be2 in svs[sv2].breakend_keys(sv2) {
            links.extend(templated_insertion(svs, be1, be2));
        }
    }
    links
}

/// Choose the templated insertion which best explains the pair
///
/// An LOH-bounded link is preferred, then the shortest.
///
fn select_templated_insertion(ctx: &SampleContext, links: Vec<LinkedPair>) -> Option<(LinkedPair, bool)> {
    links
        .into_iter()
        .map(|x| {
            let loh_bounded = is_loh_bounded(ctx, &x);
            (x, loh_bounded)
        })
        .min_by_key(|(x, loh_bounded)| (!loh_bounded, x.length, x.lower, x.upper))
}

fn sv_range(sv: &StructuralVariant) -> IntRange {
    let end = sv.get_breakend(false).position;
    IntRange::from_pair(sv.start.position.min(end), sv.start.position.max(end) + 1)
}

fn classify_inv_pair(ctx: &SampleContext, sv1: SvIndex, sv2: SvIndex) -> PairResolution {
    let svs = ctx.svs;
    if svs[sv1].start.chrom != svs[sv2].start.chrom {
        return PairResolution::new(ResolvedType::PairOther, false);
    }
    // Consistency guarantees one inversion of each orientation
    let (plus, minus) = if svs[sv1].start.orientation == 1 {
        (sv1, sv2)
    } else {
        (sv2, sv1)
    };
    let plus_range = sv_range(&svs[plus]);
    let minus_range = sv_range(&svs[minus]);

    let Some(overlap) = get_overlap_range(&plus_range, &minus_range) else {
        // Facing inversions: the lower one's end breakend faces the upper one's start
        if minus_range.end <= plus_range.start
            && let Some(link) = templated_insertion(
                svs,
                BreakendKey::new(minus, false),
                BreakendKey::new(plus, true),
            )
        {
            return PairResolution::with_chain(ResolvedType::FbInvPair, link);
        }
        return PairResolution::new(ResolvedType::PairOther, false);
    };

    let is_enclosing = plus_range.encloses(&minus_range) || minus_range.encloses(&plus_range);
    if !is_enclosing {
        let start_ti = templated_insertion(
            svs,
            BreakendKey::new(plus, true),
            BreakendKey::new(minus, true),
        );
        let end_ti = templated_insertion(
            svs,
            BreakendKey::new(plus, false),
            BreakendKey::new(minus, false),
        );
        if start_ti.is_none() && end_ti.is_none() {
            return PairResolution::new(ResolvedType::RecipInv, true);
        }
    }

    let Some((link, loh_bounded)) =
        select_templated_insertion(ctx, cross_templated_insertions(svs, plus, minus))
    else {
        return PairResolution::new(ResolvedType::PairOther, false);
    };

    if is_enclosing {
        if link.is_short() || loh_bounded {
            PairResolution::with_chain(ResolvedType::DelTi, link)
        } else {
            PairResolution::new(ResolvedType::RecipInvDelDup, false)
        }
    } else if link.is_short() || loh_bounded || overlap.size() < MAX_DUP_TI_INV_OVERLAP {
        PairResolution::with_chain(ResolvedType::DupTi, link)
    } else {
        PairResolution::new(ResolvedType::RecipInvDups, false)
    }
}

fn classify_bnd_pair(ctx: &SampleContext, sv1: SvIndex, sv2: SvIndex) -> PairResolution {
    let svs = ctx.svs;
    let chroms = |sv: SvIndex| {
        let mut c = [
            svs[sv].start.chrom.as_str(),
            svs[sv].get_breakend(false).chrom.as_str(),
        ];
        c.sort_unstable();
        c
    };
    if chroms(sv1) != chroms(sv2) || svs[sv1].start.chrom == svs[sv1].get_breakend(false).chrom {
        return PairResolution::new(ResolvedType::PairOther, false);
    }

    // Pair up the breakends of the two translocations on each chromosome
    let mut tis = Vec::new();
    for be1 in svs[sv1].breakend_keys(sv1) {
        let chrom = &get_breakend(svs, be1).chrom;
        let Some(be2) = svs[sv2]
            .breakend_keys(sv2)
            .into_iter()
            .find(|&k| &get_breakend(svs, k).chrom == chrom)
        else {
            return PairResolution::new(ResolvedType::PairOther, false);
        };
        if get_breakend(svs, be1).orientation == get_breakend(svs, be2).orientation {
            return PairResolution::new(ResolvedType::PairOther, false);
        }
        tis.extend(templated_insertion(svs, be1, be2));
    }

    let ti_count = tis.len();
    match select_templated_insertion(ctx, tis) {
        None => PairResolution::new(ResolvedType::RecipTrans, true),
        Some((link, loh_bounded)) if link.is_short() || loh_bounded => {
            PairResolution::with_chain(ResolvedType::UnbalTransTi, link)
        }
        Some(_) if ti_count == 1 => PairResolution::new(ResolvedType::RecipTransDelDup, false),
        Some(_) => PairResolution::new(ResolvedType::RecipTransDups, false),
    }
}

fn classify_sgl_pair(ctx: &SampleContext, sv1: SvIndex, sv2: SvIndex) -> PairResolution {
    let svs = ctx.svs;
    let (be1, be2) = (&svs[sv1].start, &svs[sv2].start);
    if be1.chrom != be2.chrom || be1.orientation == be2.orientation {
        return PairResolution::new(ResolvedType::PairOther, false);
    }
    let (lower, upper) = if be1.position <= be2.position {
        (be1, be2)
    } else {
        (be2, be1)
    };
    let resolved_type = if upper.position - lower.position < MIN_TEMPLATED_INSERTION_LENGTH {
        ResolvedType::SglPairIns
    } else if lower.orientation == 1 {
        ResolvedType::SglPairDel
    } else {
        ResolvedType::SglPairDup
    };
    PairResolution::new(resolved_type, true)
}

/// Classify a consistent cluster of two SVs by its SV type pair
///
/// Returns false if no pair rule covers these SV types.
///
pub(super) fn classify_pair(ctx: &SampleContext, cluster: &mut Cluster) -> bool {
    let (sv1, sv2) = (cluster.svs[0], cluster.svs[1]);
    let resolution = match (ctx.svs[sv1].sv_type, ctx.svs[sv2].sv_type) {
        (SvType::Inv, SvType::Inv) => classify_inv_pair(ctx, sv1, sv2),
        (SvType::Bnd, SvType::Bnd) => classify_bnd_pair(ctx, sv1, sv2),
        (SvType::Sgl, SvType::Sgl) => classify_sgl_pair(ctx, sv1, sv2),
        _ => return false,
    };

    match resolution.chain_link {
        Some(link) => {
            debug!(
                "cluster({}) pair chained through {}",
                cluster.id,
                link.describe(ctx.svs)
            );
            cluster.chains = vec![Chain::from_single_link(0, &link)];
        }
        None => cluster.chains.clear(),
    }
    cluster.set_resolved(resolution.resolved_type, resolution.is_resolved);
    true
}
