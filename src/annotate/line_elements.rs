use log::debug;

use crate::classify::ResolvedType;
use crate::clustering::ClusterSet;
use crate::sv_data::StructuralVariant;

/// Mark every cluster holding an SV in a LINE element as a resolved LINE cluster
///
/// Returns the number of LINE clusters.
///
pub fn mark_line_clusters(svs: &[StructuralVariant], clusters: &mut ClusterSet) -> usize {
    let mut line_count = 0;
    for cluster in clusters.iter_mut() {
        cluster.has_line_element = cluster.svs.iter().any(|&x| svs[x].in_line_element);
        if cluster.has_line_element {
            debug!("cluster({}) marked as LINE", cluster.id);
            cluster.set_resolved(ResolvedType::Line, true);
            line_count += 1;
        }
    }
    line_count
}
