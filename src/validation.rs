//! Optional clustering consistency checks, enabled for tests and by `--run-validation`
//!

use simple_error::{SimpleResult, bail};

use crate::breakend_pairs::{DeletionBridges, Foldbacks};
use crate::clustering::ClusterSet;
use crate::constants::MAX_SV_REPLICATION;
use crate::sv_data::StructuralVariant;

/// Check that every SV belongs to exactly one cluster and that all chains are well formed
///
pub fn validate_clusters(
    svs: &[StructuralVariant],
    clusters: &ClusterSet,
    stage: &str,
) -> SimpleResult<()> {
    let mut member_count = 0;
    for cluster in clusters.iter() {
        if cluster.svs.is_empty() {
            bail!("Validation failed at {stage}: cluster {} is empty", cluster.id);
        }
        for &sv in cluster.svs.iter() {
            if sv >= svs.len() {
                bail!(
                    "Validation failed at {stage}: cluster {} holds unknown SV index {sv}",
                    cluster.id
                );
            }
            if clusters.cluster_id_of(sv) != cluster.id {
                bail!(
                    "Validation failed at {stage}: SV {} is held by cluster {} but assigned to cluster {}",
                    svs[sv].id,
                    cluster.id,
                    clusters.cluster_id_of(sv)
                );
            }
        }
        member_count += cluster.sv_count();

        let max_links = cluster.sv_count() * MAX_SV_REPLICATION as usize;
        let mut link_count = 0;
        for chain in cluster.chains.iter() {
            if !chain.is_valid() {
                bail!(
                    "Validation failed at {stage}: cluster {} chain {} has unconnected links",
                    cluster.id,
                    chain.id
                );
            }
            if let Some(x) = chain.svs().iter().find(|x| !cluster.contains(x.sv)) {
                bail!(
                    "Validation failed at {stage}: cluster {} chain {} references non-member SV {}",
                    cluster.id,
                    chain.id,
                    svs[x.sv].id
                );
            }
            if let (Some(link), Some(first), Some(last)) =
                (chain.closing_link(), chain.svs().first(), chain.svs().last())
                && !(link.has_breakend(first.entry()) && link.has_breakend(last.exit()))
            {
                bail!(
                    "Validation failed at {stage}: cluster {} chain {} has a closing link away from its open ends",
                    cluster.id,
                    chain.id
                );
            }
            link_count += chain.link_count();
        }
        if link_count > max_links {
            bail!(
                "Validation failed at {stage}: cluster {} has {link_count} chain links for {} SVs",
                cluster.id,
                cluster.sv_count()
            );
        }
    }

    if member_count != svs.len() {
        bail!(
            "Validation failed at {stage}: clusters hold {member_count} SVs out of {}",
            svs.len()
        );
    }
    Ok(())
}

/// Check that foldback and deletion bridge relations are symmetric
pub fn validate_breakend_pairs(
    svs: &[StructuralVariant],
    foldbacks: &Foldbacks,
    dbs: &DeletionBridges,
) -> SimpleResult<()> {
    for (key, link) in foldbacks.iter() {
        if foldbacks.get(link.other).is_none_or(|x| x.other != *key) {
            bail!(
                "Validation failed: foldback from SV {} to SV {} is not symmetric",
                svs[key.sv].id,
                svs[link.other.sv].id
            );
        }
    }
    for (key, link) in dbs.iter() {
        if dbs.get(link.other).is_none_or(|x| x.other != *key || x.length != link.length) {
            bail!(
                "Validation failed: deletion bridge from SV {} to SV {} is not symmetric",
                svs[key.sv].id,
                svs[link.other.sv].id
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::chaining::chain::{Chain, ChainedSv};
    use crate::linked_pair::LinkedPair;
    use crate::sv_data::BreakendKey;
    use crate::test_utils::*;

    #[test]
    fn test_cluster_coverage() {
        let svs = vec![
            create_del(0, "1", 1000, 2000),
            create_del(1, "1", 3000, 4000),
        ];
        let clusters = ClusterSet::from_groups(2, vec![vec![0, 1]]);
        assert!(validate_clusters(&svs, &clusters, "test").is_ok());

        let clusters = ClusterSet::from_groups(2, vec![vec![0]]);
        assert!(validate_clusters(&svs, &clusters, "test").is_err());
    }

    #[test]
    fn test_closing_link_joins_open_ends() {
        let svs = vec![
            create_inv(0, "1", 1000, 200000, -1),
            create_inv(1, "1", 110000, 350000, 1),
        ];
        let facing = |be1, be2| {
            LinkedPair::from_facing_breakends(&svs, be1, be2, false).unwrap()
        };
        let ti = facing(BreakendKey::new(0, true), BreakendKey::new(1, true));
        let chain_svs = vec![
            ChainedSv {
                sv: 0,
                entry_is_start: false,
            },
            ChainedSv {
                sv: 1,
                entry_is_start: true,
            },
        ];

        let closing = facing(BreakendKey::new(0, false), BreakendKey::new(1, false));
        let mut clusters = ClusterSet::from_groups(2, vec![vec![0, 1]]);
        clusters.get_mut(0).chains.push(Chain::new(
            0,
            chain_svs.clone(),
            vec![ti.clone()],
            Some(closing),
        ));
        assert!(validate_clusters(&svs, &clusters, "test").is_ok());

        let mut clusters = ClusterSet::from_groups(2, vec![vec![0, 1]]);
        clusters
            .get_mut(0)
            .chains
            .push(Chain::new(0, chain_svs, vec![ti.clone()], Some(ti)));
        assert!(validate_clusters(&svs, &clusters, "test").is_err());
    }
}
