use crate::linked_pair::LinkedPair;
use crate::sv_data::{BreakendKey, StructuralVariant, SvIndex};

/// One SV instance visited by a chain
///
/// The chain enters the SV on `entry_is_start` and leaves on the opposite breakend. For a
/// single-ended SV the missing end breakend can only be an open end of the chain.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChainedSv {
    pub sv: SvIndex,
    pub entry_is_start: bool,
}

impl ChainedSv {
    pub fn entry(&self) -> BreakendKey {
        BreakendKey::new(self.sv, self.entry_is_start)
    }

    pub fn exit(&self) -> BreakendKey {
        BreakendKey::new(self.sv, !self.entry_is_start)
    }
}

/// Link statistics for the chain path between two breakends
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ChainPathInfo {
    pub link_count: usize,
    pub assembly_link_count: usize,
    pub length: i64,
}

/// A walk through SV instances of one cluster, joined by templated insertions
///
#[derive(Clone, Debug)]
pub struct Chain {
    pub id: usize,
    svs: Vec<ChainedSv>,

    /// links[i] joins the exit of svs[i] to the entry of svs[i+1]
    links: Vec<LinkedPair>,

    /// Link which would join the two open ends of the chain into a circle
    closing_link: Option<LinkedPair>,
}

impl Chain {
    pub fn new(
        id: usize,
        svs: Vec<ChainedSv>,
        links: Vec<LinkedPair>,
        closing_link: Option<LinkedPair>,
    ) -> Self {
        Self {
            id,
            svs,
            links,
            closing_link,
        }
    }

    /// Chain of two SVs joined by one link
    pub fn from_single_link(id: usize, link: &LinkedPair) -> Self {
        let svs = vec![
            ChainedSv {
                sv: link.lower.sv,
                entry_is_start: !link.lower.is_start,
            },
            ChainedSv {
                sv: link.upper.sv,
                entry_is_start: link.upper.is_start,
            },
        ];
        Self::new(id, svs, vec![link.clone()], None)
    }

    pub fn svs(&self) -> &[ChainedSv] {
        &self.svs
    }

    pub fn links(&self) -> &[LinkedPair] {
        &self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Count of SV instances in the chain, replicated SVs are counted once per instance
    pub fn sv_count(&self) -> usize {
        self.svs.len()
    }

    pub fn assembly_link_count(&self) -> usize {
        self.links.iter().filter(|x| x.is_assembled).count()
    }

    /// Total length of all templated insertions
    pub fn length(&self) -> i64 {
        self.links.iter().map(|x| x.length).sum()
    }

    pub fn is_closed(&self) -> bool {
        self.closing_link.is_some()
    }

    pub fn closing_link(&self) -> Option<&LinkedPair> {
        self.closing_link.as_ref()
    }

    pub fn contains_sv(&self, sv: SvIndex) -> bool {
        self.svs.iter().any(|x| x.sv == sv)
    }

    /// The two open breakends at either end of the chain
    ///
    /// An open end is None where it would be the missing end of a single-ended SV.
    ///
    pub fn open_breakends(
        &self,
        svs: &[StructuralVariant],
    ) -> (Option<BreakendKey>, Option<BreakendKey>) {
        let existing = |key: BreakendKey| svs[key.sv].breakend(key.is_start).map(|_| key);
        match (self.svs.first(), self.svs.last()) {
            (Some(first), Some(last)) => (existing(first.entry()), existing(last.exit())),
            _ => (None, None),
        }
    }

    /// Find a chain path which starts by leaving an SV through `from` and ends by entering an
    /// SV through `to`, in either direction along the chain
    ///
    /// Returns the shortest such path.
    ///
    pub fn path_between(&self, from: BreakendKey, to: BreakendKey) -> Option<ChainPathInfo> {
        let mut best: Option<(usize, usize)> = None;
        let mut update = |i: usize, j: usize| {
            if best.is_none_or(|(bi, bj)| j - i < bj - bi) {
                best = Some((i, j));
            }
        };
        for (i, a) in self.svs.iter().enumerate() {
            for (j, b) in self.svs.iter().enumerate().skip(i + 1) {
                // walking forward: exit one SV through `from` and finally enter through `to`
                if a.exit() == from && b.entry() == to {
                    update(i, j);
                }
                // walking backward, the roles of entry and exit swap
                if a.exit() == to && b.entry() == from {
                    update(i, j);
                }
            }
        }
        best.map(|(i, j)| {
            let links = &self.links[i..j];
            ChainPathInfo {
                link_count: links.len(),
                assembly_link_count: links.iter().filter(|x| x.is_assembled).count(),
                length: links.iter().map(|x| x.length).sum(),
            }
        })
    }

    /// Check that every link joins the exit of one SV instance to the entry of the next
    pub fn is_valid(&self) -> bool {
        if self.svs.is_empty() || self.links.len() + 1 != self.svs.len() {
            return false;
        }
        self.links.iter().enumerate().all(|(i, link)| {
            link.has_breakend(self.svs[i].exit()) && link.has_breakend(self.svs[i + 1].entry())
        })
    }
}
