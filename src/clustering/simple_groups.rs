//! Break apart clusters of simple SVs which nothing ties together
//!

use log::debug;

use super::{Cluster, ClusterSet};
use crate::analyser::SampleContext;
use crate::constants::SHORT_DB_LENGTH;
use crate::sv_data::{SvIndex, SvType};

/// A short DEL or DUP, or any INS
fn is_simple_sv(ctx: &SampleContext, sv_index: SvIndex) -> bool {
    let sv = &ctx.svs[sv_index];
    match sv.sv_type {
        SvType::Ins => true,
        SvType::Del | SvType::Dup => !ctx.simple_lengths.is_long_del_dup(sv),
        SvType::Inv | SvType::Bnd | SvType::Sgl => false,
    }
}

/// An unresolved multi-SV cluster made up only of simple SVs
pub fn is_simple_group(ctx: &SampleContext, cluster: &Cluster) -> bool {
    cluster.sv_count() > 1
        && !cluster.is_resolved
        && !cluster.has_line_element
        && cluster.svs.iter().all(|&x| is_simple_sv(ctx, x))
}

/// True if an assembly link, an LOH bounded by two member SVs, or a short deletion bridge to
/// another member holds the SV in its cluster
fn is_held_in_group(ctx: &SampleContext, cluster: &Cluster, sv_index: SvIndex) -> bool {
    if cluster.assembly_links.iter().any(|x| x.has_sv(sv_index)) {
        return true;
    }

    let sv = &ctx.svs[sv_index];
    let is_member_id = |id: u32| cluster.svs.iter().any(|&x| ctx.svs[x].id == id);
    let in_loh = ctx.lohs.iter().any(|loh| match (loh.start_sv, loh.end_sv) {
        (Some(start_sv), Some(end_sv)) if start_sv != end_sv => {
            (start_sv == sv.id || end_sv == sv.id) && is_member_id(start_sv) && is_member_id(end_sv)
        }
        _ => false,
    });
    if in_loh {
        return true;
    }

    sv.breakend_keys(sv_index).into_iter().any(|key| {
        ctx.dbs.get(key).is_some_and(|db| {
            db.length <= SHORT_DB_LENGTH && db.other.sv != sv_index && cluster.contains(db.other.sv)
        })
    })
}

/// Move every loose SV of each simple group into its own cluster
///
/// Returns the number of SVs moved out. A group left with a single SV is dissolved entirely.
///
pub fn dissolve_simple_groups(ctx: &SampleContext, clusters: &mut ClusterSet) -> usize {
    let mut moved_count = 0;
    for id in clusters.ids() {
        let cluster = clusters.get(id);
        if !is_simple_group(ctx, cluster) {
            continue;
        }
        let loose_svs = cluster
            .svs
            .iter()
            .copied()
            .filter(|&x| !is_held_in_group(ctx, cluster, x))
            .collect::<Vec<_>>();
        if loose_svs.is_empty() {
            debug!(
                "cluster({id}) simple group of {} SVs kept",
                cluster.sv_count()
            );
            continue;
        }

        debug!(
            "cluster({id}) de-merging {} of {} simple SVs",
            loose_svs.len(),
            cluster.sv_count()
        );
        moved_count += clusters.split_off(id, &loose_svs).len();
    }
    moved_count
}
