use log::debug;

use super::ClusterAnnotation;
use crate::analyser::SampleContext;
use crate::classify::ResolvedType;
use crate::clustering::Cluster;
use crate::sv_data::SvType;

/// Mark highly amplified single DUPs and closed high-JCN chains as double minutes
///
pub(super) fn annotate_double_minute(ctx: &SampleContext, cluster: &mut Cluster) {
    if cluster.resolved_type == ResolvedType::Line {
        return;
    }
    let svs = ctx.svs;
    let min_jcn = ctx.config.dm_min_jcn;

    let is_amplified_dup = cluster.sv_count() == 1
        && svs[cluster.svs[0]].sv_type == SvType::Dup
        && svs[cluster.svs[0]].jcn >= min_jcn;

    let has_closed_chain = cluster.chains.iter().any(|chain| {
        chain.is_closed() && chain.svs().iter().all(|x| svs[x.sv].jcn >= min_jcn)
    });

    if is_amplified_dup || has_closed_chain {
        debug!(
            "cluster({}) double minute from {}",
            cluster.id,
            if is_amplified_dup { "DUP" } else { "closed chain" }
        );
        cluster.set_resolved(ResolvedType::DoubleMinute, cluster.is_resolved);
        cluster.annotations.insert(ClusterAnnotation::DoubleMinute);
    }
}

#[cfg(test)]
mod tests {
    use crate::annotate::ClusterAnnotation;
    use crate::classify::ResolvedType;
    use crate::test_utils::*;

    #[test]
    fn test_amplified_dup() {
        let mut svs = vec![
            create_dup(0, "1", 10000, 50000),
            create_dup(1, "2", 10000, 50000),
        ];
        svs[0].jcn = 8.0;
        let result = run_pipeline(svs, Vec::new());
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::DoubleMinute);
        assert!(cluster.annotations.contains(&ClusterAnnotation::DoubleMinute));
        assert_eq!(cluster_of(&result, 1).resolved_type, ResolvedType::SimpleSv);
    }

    #[test]
    fn test_closed_chain() {
        // Three segments on different chromosomes joined into a circle
        let mut svs = vec![
            create_bnd(0, "1", 12000, 1, "2", 10000, -1),
            create_bnd(1, "2", 12000, 1, "3", 10000, -1),
            create_bnd(2, "3", 12000, 1, "1", 10000, -1),
        ];
        for sv in svs.iter_mut() {
            sv.jcn = 6.0;
        }
        let result = run_pipeline(svs.clone(), Vec::new());
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::DoubleMinute);
        assert_eq!(cluster.chains.len(), 1);
        assert!(cluster.chains[0].is_closed());

        for sv in svs.iter_mut() {
            sv.jcn = 2.0;
        }
        let result = run_pipeline(svs, Vec::new());
        let cluster = cluster_of(&result, 0);
        assert_eq!(cluster.resolved_type, ResolvedType::SimpleChain);
        assert!(cluster.annotations.is_empty());
    }
}
