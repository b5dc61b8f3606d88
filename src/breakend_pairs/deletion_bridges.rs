use std::collections::HashMap;

use crate::breakend_index::BreakendIndex;
use crate::constants::MIN_TEMPLATED_INSERTION_LENGTH;
use crate::sv_data::{BreakendKey, StructuralVariant, get_breakend};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DbLink {
    pub other: BreakendKey,

    /// Gap between the breakends, negative if they overlap
    pub length: i64,
}

/// Symmetric deletion-bridge relation between adjacent breakends
///
#[derive(Default)]
pub struct DeletionBridges {
    links: HashMap<BreakendKey, DbLink>,
}

impl DeletionBridges {
    pub fn get(&self, key: BreakendKey) -> Option<&DbLink> {
        self.links.get(&key)
    }

    /// Count of deletion bridges
    pub fn len(&self) -> usize {
        self.links.len() / 2
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BreakendKey, &DbLink)> {
        self.links.iter()
    }

    /// True if the breakend has a deletion bridge shorter than the minimum TI length, including
    /// any overlapping bridge
    pub fn has_short_db(&self, key: BreakendKey) -> bool {
        self.get(key)
            .is_some_and(|x| x.length < MIN_TEMPLATED_INSERTION_LENGTH)
    }

    fn clear(&mut self, key: BreakendKey) {
        if let Some(link) = self.links.remove(&key) {
            self.links.remove(&link.other);
        }
    }

    /// Set a new bridge unless either breakend already has one at least as short
    ///
    /// Superseded bridges are cleared on both sides.
    ///
    fn try_link(&mut self, be1: BreakendKey, be2: BreakendKey, length: i64) -> bool {
        let blocked = [be1, be2].iter().any(|key| {
            self.links
                .get(key)
                .is_some_and(|x| x.length.abs() <= length.abs())
        });
        if blocked {
            return false;
        }
        self.clear(be1);
        self.clear(be2);
        self.links.insert(be1, DbLink { other: be2, length });
        self.links.insert(be2, DbLink { other: be1, length });
        true
    }
}

/// Find deletion bridges between adjacent breakends of different SVs
///
/// An adjacent lower +1 and upper -1 breakend pair forms a bridge over the gap between them.
/// An adjacent lower -1 and upper +1 pair closer than the minimum TI length forms an
/// overlapping bridge with negative length.
///
pub fn find_deletion_bridges(svs: &[StructuralVariant], index: &BreakendIndex) -> DeletionBridges {
    let mut dbs = DeletionBridges::default();
    for (_, keys) in index.chromosomes() {
        for pair in keys.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            if lower.sv == upper.sv {
                continue;
            }
            let lower_be = get_breakend(svs, lower);
            let upper_be = get_breakend(svs, upper);
            let distance = upper_be.position - lower_be.position;
            let length = match (lower_be.orientation, upper_be.orientation) {
                (1, -1) => distance,
                (-1, 1) if distance < MIN_TEMPLATED_INSERTION_LENGTH => -distance,
                _ => continue,
            };
            dbs.try_link(lower, upper, length);
        }
    }
    dbs
}
