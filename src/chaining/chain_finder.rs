use std::collections::BTreeMap;

use crate::clustering::Cluster;
use crate::copy_number::copy_numbers_equal;
use crate::linked_pair::LinkedPair;
use crate::log_utils::debug_msg;
use crate::sv_data::{BreakendKey, StructuralVariant, SvIndex};
use crate::union_find::UnionFind;

use super::chain::{Chain, ChainedSv};

fn slot(is_start: bool) -> usize {
    if is_start { 0 } else { 1 }
}

/// One logical copy of an SV, with the accepted link index on each of its breakends
struct SvInstance {
    sv: SvIndex,
    links: [Option<usize>; 2],
}

struct AcceptedLink {
    link: LinkedPair,

    /// SV instances on the lower and upper side of the link
    instances: [usize; 2],
}

/// Builds chains for one cluster from a set of candidate links
///
/// Each SV is expanded into its replicated instances. Candidate links are accepted greedily,
/// assembled links first and then shortest first, whenever both breakends still have a free
/// instance and the link does not close a loop. A rejected link which would join the two open
/// ends of a chain is kept as that chain's closing link.
///
pub struct ChainFinder<'a> {
    svs: &'a [StructuralVariant],
    cluster: &'a Cluster,
    instances: Vec<SvInstance>,
    sv_instances: BTreeMap<SvIndex, Vec<usize>>,
    components: UnionFind,
    accepted: Vec<AcceptedLink>,
    closing_links: Vec<LinkedPair>,
    log_verbose: bool,
}

impl<'a> ChainFinder<'a> {
    pub fn new(svs: &'a [StructuralVariant], cluster: &'a Cluster, log_verbose: bool) -> Self {
        let mut instances = Vec::new();
        let mut sv_instances = BTreeMap::new();
        for &sv in cluster.svs.iter() {
            let ids = (0..cluster.replication(sv))
                .map(|_| {
                    instances.push(SvInstance {
                        sv,
                        links: [None, None],
                    });
                    instances.len() - 1
                })
                .collect::<Vec<_>>();
            sv_instances.insert(sv, ids);
        }
        let components = UnionFind::new(instances.len());
        Self {
            svs,
            cluster,
            instances,
            sv_instances,
            components,
            accepted: Vec::new(),
            closing_links: Vec::new(),
            log_verbose,
        }
    }

    /// JCN carried by each replicated instance of the SV
    fn instance_jcn(&self, sv: SvIndex) -> f64 {
        self.svs[sv].jcn / self.cluster.replication(sv) as f64
    }

    fn free_instances(&self, key: BreakendKey) -> Vec<usize> {
        self.sv_instances
            .get(&key.sv)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|&i| self.instances[i].links[slot(key.is_start)].is_none())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn try_add_link(&mut self, link: LinkedPair) -> bool {
        if !link.is_templated_insertion() {
            return false;
        }
        if !link.is_assembled
            && !copy_numbers_equal(self.instance_jcn(link.lower.sv), self.instance_jcn(link.upper.sv))
        {
            return false;
        }

        let lower_free = self.free_instances(link.lower);
        let upper_free = self.free_instances(link.upper);
        if lower_free.is_empty() || upper_free.is_empty() {
            return false;
        }

        for &lower_instance in lower_free.iter() {
            for &upper_instance in upper_free.iter() {
                if self.components.find(lower_instance) == self.components.find(upper_instance) {
                    continue;
                }
                let link_index = self.accepted.len();
                self.instances[lower_instance].links[slot(link.lower.is_start)] = Some(link_index);
                self.instances[upper_instance].links[slot(link.upper.is_start)] = Some(link_index);
                self.components.union(lower_instance, upper_instance);
                debug_msg!(
                    self.log_verbose,
                    "cluster({}) adding link {}",
                    self.cluster.id,
                    link.describe(self.svs)
                );
                self.accepted.push(AcceptedLink {
                    link,
                    instances: [lower_instance, upper_instance],
                });
                return true;
            }
        }

        // Both free breakends are the open ends of one chain
        self.closing_links.push(link);
        false
    }

    /// Walk one chain starting from an instance with a single link
    fn walk_chain(&self, start: usize, visited: &mut [bool], chain_id: usize) -> Chain {
        let mut chain_svs = Vec::new();
        let mut chain_links = Vec::new();
        let mut current = start;
        let mut entry_slot = if self.instances[start].links[0].is_none() { 0 } else { 1 };
        loop {
            visited[current] = true;
            let instance = &self.instances[current];
            chain_svs.push(ChainedSv {
                sv: instance.sv,
                entry_is_start: entry_slot == 0,
            });
            let Some(link_index) = instance.links[1 - entry_slot] else {
                break;
            };
            let accepted = &self.accepted[link_index];
            chain_links.push(accepted.link.clone());
            let (next, next_key) = if accepted.instances[0] == current {
                (accepted.instances[1], accepted.link.upper)
            } else {
                (accepted.instances[0], accepted.link.lower)
            };
            current = next;
            entry_slot = slot(next_key.is_start);
        }

        let first_open = chain_svs[0].entry();
        let last_open = chain_svs[chain_svs.len() - 1].exit();
        let closing_link = self
            .closing_links
            .iter()
            .find(|x| {
                (x.lower == first_open && x.upper == last_open)
                    || (x.lower == last_open && x.upper == first_open)
            })
            .cloned();
        Chain::new(chain_id, chain_svs, chain_links, closing_link)
    }

    /// Accept candidate links and return the resulting chains
    pub fn find_chains(mut self, mut candidates: Vec<LinkedPair>) -> Vec<Chain> {
        candidates.sort_by_key(|x| (!x.is_assembled, x.length, x.lower, x.upper));
        for link in candidates {
            self.try_add_link(link);
        }

        let mut visited = vec![false; self.instances.len()];
        let mut chains = Vec::new();
        for start in 0..self.instances.len() {
            let link_count = self.instances[start].links.iter().flatten().count();
            if visited[start] || link_count != 1 {
                continue;
            }
            let chain = self.walk_chain(start, &mut visited, chains.len());
            chains.push(chain);
        }
        chains
    }
}
