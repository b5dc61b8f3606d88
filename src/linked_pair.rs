use crate::constants::{MIN_TEMPLATED_INSERTION_LENGTH, SHORT_TI_LENGTH};
use crate::sv_data::{BreakendKey, StructuralVariant, get_breakend};

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LinkType {
    /// Templated insertion: the segment between the breakends is retained
    #[strum(serialize = "TI")]
    TemplatedInsertion,

    /// Deletion bridge: the breakends face away from each other, or overlap by a few bases
    #[strum(serialize = "DB")]
    DeletionBridge,
}

/// An adjacency between breakends of two different SVs on the same chromosome
///
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedPair {
    /// Breakend with the lower position
    pub lower: BreakendKey,
    pub upper: BreakendKey,
    pub link_type: LinkType,
    pub is_assembled: bool,

    /// Bases between the breakends, negative for an overlapping deletion bridge
    pub length: i64,
}

impl LinkedPair {
    /// Build the link formed by two facing breakends, a lower -1 and an upper +1 breakend
    ///
    /// Returns None if the breakends are on the same SV, on different chromosomes, or don't
    /// face each other. Facing breakends closer than the minimum TI length are returned as an
    /// overlapping deletion bridge.
    ///
    pub fn from_facing_breakends(
        svs: &[StructuralVariant],
        be1: BreakendKey,
        be2: BreakendKey,
        is_assembled: bool,
    ) -> Option<Self> {
        if be1.sv == be2.sv {
            return None;
        }
        let b1 = get_breakend(svs, be1);
        let b2 = get_breakend(svs, be2);
        if b1.chrom != b2.chrom || b1.orientation == b2.orientation {
            return None;
        }
        let (lower, upper) = if b1.orientation == -1 {
            (be1, be2)
        } else {
            (be2, be1)
        };
        let length = get_breakend(svs, upper).position - get_breakend(svs, lower).position;
        if length < 0 {
            return None;
        }
        let (link_type, length) = if length < MIN_TEMPLATED_INSERTION_LENGTH {
            (LinkType::DeletionBridge, -length)
        } else {
            (LinkType::TemplatedInsertion, length)
        };
        Some(Self {
            lower,
            upper,
            link_type,
            is_assembled,
            length,
        })
    }

    pub fn is_templated_insertion(&self) -> bool {
        self.link_type == LinkType::TemplatedInsertion
    }

    pub fn is_short(&self) -> bool {
        self.length <= SHORT_TI_LENGTH
    }

    pub fn has_breakend(&self, key: BreakendKey) -> bool {
        self.lower == key || self.upper == key
    }

    pub fn has_sv(&self, sv: usize) -> bool {
        self.lower.sv == sv || self.upper.sv == sv
    }

    pub fn describe(&self, svs: &[StructuralVariant]) -> String {
        let lower = get_breakend(svs, self.lower);
        let upper = get_breakend(svs, self.upper);
        format!(
            "{}({}:{}:{} -> {}:{}:{} length {})",
            self.link_type,
            svs[self.lower.sv].id,
            lower.chrom,
            lower.position,
            svs[self.upper.sv].id,
            upper.chrom,
            upper.position,
            self.length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::*;

    #[test]
    fn test_facing_breakends() {
        let svs = vec![
            create_inv(0, "1", 1000, 2000, -1),
            create_inv(1, "1", 5000, 6000, 1),
            create_inv(2, "1", 8000, 9000, -1),
        ];
        let link = LinkedPair::from_facing_breakends(
            &svs,
            BreakendKey::new(1, true),
            BreakendKey::new(0, false),
            false,
        )
        .unwrap();
        assert_eq!(link.lower, BreakendKey::new(0, false));
        assert_eq!(link.upper, BreakendKey::new(1, true));
        assert_eq!(link.length, 3000);
        assert!(link.is_templated_insertion());
        assert!(!link.is_short());

        // The -1 breakend at 1000 and the +1 breakend at 6000 also face each other
        let link = LinkedPair::from_facing_breakends(
            &svs,
            BreakendKey::new(0, true),
            BreakendKey::new(1, false),
            false,
        )
        .unwrap();
        assert_eq!(link.lower, BreakendKey::new(0, true));
        assert_eq!(link.upper, BreakendKey::new(1, false));
        assert_eq!(link.length, 5000);

        // A lower +1 breakend and an upper -1 breakend face away from each other
        assert!(
            LinkedPair::from_facing_breakends(
                &svs,
                BreakendKey::new(1, false),
                BreakendKey::new(2, true),
                false
            )
            .is_none()
        );

        // Same orientation
        assert!(
            LinkedPair::from_facing_breakends(
                &svs,
                BreakendKey::new(0, true),
                BreakendKey::new(2, false),
                false
            )
            .is_none()
        );
    }

    #[test]
    fn test_short_overlap() {
        let svs = vec![
            create_inv(0, "1", 90, 10000, -1),
            create_inv(1, "1", 100, 10010, 1),
        ];
        let link = LinkedPair::from_facing_breakends(
            &svs,
            BreakendKey::new(0, true),
            BreakendKey::new(1, true),
            false,
        )
        .unwrap();
        assert_eq!(link.link_type, LinkType::DeletionBridge);
        assert_eq!(link.length, -10);
    }
}
