//! Per-chromosome position-ordered breakend lists
//!

use simple_error::{SimpleResult, bail};

use crate::sv_data::{BreakendKey, StructuralVariant, get_breakend};

/// Location of one breakend in the index
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct IndexLocation {
    chrom_index: usize,
    pos_index: usize,
}

/// Breakends of one sample in ascending position order on each chromosome
///
/// Each breakend can find its neighbours in constant time. Ties on position are ordered by
/// orientation, then external SV id, then start before end, so that construction is
/// deterministic.
///
pub struct BreakendIndex {
    chroms: Vec<(String, Vec<BreakendKey>)>,

    /// Per SV, the start and end breakend locations
    locations: Vec<[Option<IndexLocation>; 2]>,
}

fn slot(is_start: bool) -> usize {
    if is_start { 0 } else { 1 }
}

impl BreakendIndex {
    pub fn new(svs: &[StructuralVariant]) -> SimpleResult<Self> {
        use std::collections::BTreeMap;

        let mut chrom_map: BTreeMap<&str, Vec<BreakendKey>> = BTreeMap::new();
        for (sv_index, sv) in svs.iter().enumerate() {
            for key in sv.breakend_keys(sv_index) {
                let be = get_breakend(svs, key);
                if be.chrom.is_empty() {
                    bail!("SV {} has a breakend with no chromosome", sv.id);
                }
                if be.position < 1 {
                    bail!(
                        "SV {} has an invalid breakend position {} on chromosome '{}'",
                        sv.id,
                        be.position,
                        be.chrom
                    );
                }
                if be.orientation != 1 && be.orientation != -1 {
                    bail!(
                        "SV {} has an invalid breakend orientation {}",
                        sv.id,
                        be.orientation
                    );
                }
                chrom_map.entry(be.chrom.as_str()).or_default().push(key);
            }
        }

        let mut chroms = Vec::new();
        let mut locations = vec![[None, None]; svs.len()];
        for (chrom_index, (chrom, mut keys)) in chrom_map.into_iter().enumerate() {
            keys.sort_by_key(|&k| {
                let be = get_breakend(svs, k);
                (be.position, be.orientation, svs[k.sv].id, !k.is_start)
            });
            for (pos_index, key) in keys.iter().enumerate() {
                locations[key.sv][slot(key.is_start)] = Some(IndexLocation {
                    chrom_index,
                    pos_index,
                });
            }
            chroms.push((chrom.to_string(), keys));
        }

        Ok(Self { chroms, locations })
    }

    /// Iterate over (chromosome, ordered breakends)
    pub fn chromosomes(&self) -> impl Iterator<Item = (&str, &[BreakendKey])> {
        self.chroms.iter().map(|(c, k)| (c.as_str(), k.as_slice()))
    }

    fn location(&self, key: BreakendKey) -> IndexLocation {
        match self.locations[key.sv][slot(key.is_start)] {
            Some(x) => x,
            None => panic!("Breakend {key:?} is not in the breakend index"),
        }
    }

    /// Position of the breakend within its chromosome's ordered list
    pub fn index_of(&self, key: BreakendKey) -> usize {
        self.location(key).pos_index
    }

    /// Neighbouring breakend, toward higher positions if `upward` is set
    pub fn neighbour(&self, key: BreakendKey, upward: bool) -> Option<BreakendKey> {
        let loc = self.location(key);
        let keys = &self.chroms[loc.chrom_index].1;
        if upward {
            keys.get(loc.pos_index + 1).copied()
        } else if loc.pos_index > 0 {
            Some(keys[loc.pos_index - 1])
        } else {
            None
        }
    }

    /// Breakends strictly between two breakends on the same chromosome
    pub fn breakends_between(&self, lower: BreakendKey, upper: BreakendKey) -> &[BreakendKey] {
        let lower_loc = self.location(lower);
        let upper_loc = self.location(upper);
        assert_eq!(lower_loc.chrom_index, upper_loc.chrom_index);
        if upper_loc.pos_index <= lower_loc.pos_index + 1 {
            return &[];
        }
        &self.chroms[lower_loc.chrom_index].1[lower_loc.pos_index + 1..upper_loc.pos_index]
    }
}
