use log::debug;

use super::ClusterAnnotation;
use crate::analyser::SampleContext;
use crate::breakend_pairs::Foldbacks;
use crate::clustering::Cluster;

/// Flag unresolved clusters with repeated high-JCN foldbacks as breakage-fusion-bridge events
///
pub(super) fn annotate_bfb(ctx: &SampleContext, foldbacks: &Foldbacks, cluster: &mut Cluster) {
    if cluster.is_resolved || foldbacks.cluster_count(cluster) < 2 {
        return;
    }
    let max_foldback_jcn = foldbacks
        .cluster_breakends(cluster)
        .iter()
        .map(|x| ctx.svs[x.sv].jcn)
        .fold(0.0, f64::max);
    if max_foldback_jcn >= ctx.config.bfb_min_jcn {
        debug!(
            "cluster({}) BFB with max foldback JCN {max_foldback_jcn:.2}",
            cluster.id
        );
        cluster.annotations.insert(ClusterAnnotation::Bfb);
    }
}

#[cfg(test)]
mod tests {
    use crate::annotate::ClusterAnnotation;
    use crate::test_utils::*;

    #[test]
    fn test_bfb_foldbacks() {
        let mut svs = vec![
            create_inv(0, "1", 1_000_000, 1_002_000, -1),
            create_inv(1, "1", 3_000_000, 3_002_000, -1),
        ];
        for sv in svs.iter_mut() {
            sv.end.as_mut().unwrap().copy_number = 3.0;
        }
        let result = run_pipeline(svs.clone(), Vec::new());
        let cluster = cluster_of(&result, 0);
        assert_eq!(result.foldbacks.cluster_count(cluster), 2);
        assert!(!cluster.annotations.contains(&ClusterAnnotation::Bfb));

        svs[1].jcn = 4.0;
        svs[1].jcn_uncertainty = 3.0;
        let result = run_pipeline(svs, Vec::new());
        let cluster = cluster_of(&result, 0);
        assert!(cluster.annotations.contains(&ClusterAnnotation::Bfb));
    }
}
