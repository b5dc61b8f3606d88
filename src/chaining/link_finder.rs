use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use simple_error::{SimpleResult, bail};

use crate::linked_pair::LinkedPair;
use crate::sv_data::{BreakendKey, StructuralVariant, SvIndex, get_breakend};

/// Resolve the assembly-linked SV ids of every SV into templated insertion links
///
/// Each linked SV pair is joined through its closest pair of facing breakends. A link to an SV
/// id which is not in the sample is an input error.
///
pub fn find_assembly_links(svs: &[StructuralVariant]) -> SimpleResult<Vec<LinkedPair>> {
    let id_index = svs
        .iter()
        .enumerate()
        .map(|(i, sv)| (sv.id, i))
        .collect::<HashMap<u32, SvIndex>>();

    let mut links = Vec::new();
    let mut linked_svs = BTreeSet::new();
    for (sv_index, sv) in svs.iter().enumerate() {
        for &other_id in sv.assembly_linked_ids.iter() {
            let Some(&other_index) = id_index.get(&other_id) else {
                bail!("SV {} has an assembly link to unknown SV {other_id}", sv.id);
            };
            if other_index == sv_index {
                continue;
            }
            let pair = (sv_index.min(other_index), sv_index.max(other_index));
            if !linked_svs.insert(pair) {
                continue;
            }

            let mut best: Option<LinkedPair> = None;
            for key1 in svs[pair.0].breakend_keys(pair.0) {
                for key2 in svs[pair.1].breakend_keys(pair.1) {
                    if let Some(link) = LinkedPair::from_facing_breakends(svs, key1, key2, true)
                        && best
                            .as_ref()
                            .is_none_or(|x| link.length.abs() < x.length.abs())
                    {
                        best = Some(link);
                    }
                }
            }
            match best {
                Some(link) => links.push(link),
                None => debug!(
                    "Assembly link between SV {} and SV {other_id} has no facing breakends",
                    sv.id
                ),
            }
        }
    }
    Ok(links)
}

/// All templated insertions which could join two breakends of the cluster
///
/// Candidates are facing breakends of different SVs on the same chromosome arm, at least the
/// minimum templated insertion length apart.
///
pub fn find_inferred_links(
    svs: &[StructuralVariant],
    chr_breakends: &BTreeMap<String, Vec<BreakendKey>>,
) -> Vec<LinkedPair> {
    let mut links = Vec::new();
    for keys in chr_breakends.values() {
        for (i, &lower) in keys.iter().enumerate() {
            let lower_be = get_breakend(svs, lower);
            if lower_be.orientation != -1 {
                continue;
            }
            for &upper in keys[i + 1..].iter() {
                let upper_be = get_breakend(svs, upper);
                if upper_be.orientation != 1 || !lower_be.same_arm(upper_be) {
                    continue;
                }
                if let Some(link) = LinkedPair::from_facing_breakends(svs, lower, upper, false)
                    && link.is_templated_insertion()
                {
                    links.push(link);
                }
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::*;

    #[test]
    fn test_assembly_links() {
        let mut svs = vec![
            create_bnd(0, "1", 10000, 1, "2", 5000, -1),
            create_bnd(1, "2", 5400, 1, "3", 1000, -1),
        ];
        svs[0].assembly_linked_ids = vec![1];
        svs[1].assembly_linked_ids = vec![0];

        let links = find_assembly_links(&svs).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].lower, BreakendKey::new(0, false));
        assert_eq!(links[0].upper, BreakendKey::new(1, true));
        assert_eq!(links[0].length, 400);
        assert!(links[0].is_assembled);

        svs[1].assembly_linked_ids = vec![9];
        assert!(find_assembly_links(&svs).is_err());
    }

    #[test]
    fn test_inferred_links() {
        let svs = vec![
            create_inv(0, "1", 1000, 200000, -1),
            create_inv(1, "1", 110000, 350000, 1),
            create_sgl(2, "1", 1010, 1),
        ];
        let mut chr_breakends = BTreeMap::new();
        chr_breakends.insert(
            "1".to_string(),
            vec![
                BreakendKey::new(0, true),
                BreakendKey::new(2, true),
                BreakendKey::new(1, true),
                BreakendKey::new(0, false),
                BreakendKey::new(1, false),
            ],
        );
        let links = find_inferred_links(&svs, &chr_breakends);
        let lengths = links.iter().map(|x| x.length).collect::<Vec<_>>();

        // The 10 base SGL link is too short to be a templated insertion
        assert_eq!(lengths, vec![109000, 349000, 150000]);
    }
}
