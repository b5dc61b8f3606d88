//! Copy-number comparisons and LOH events
//!

use serde::Deserialize;

use crate::constants::{CN_ABS_TOLERANCE, CN_REL_TOLERANCE};
use crate::sv_data::{Breakend, StructuralVariant};

/// Compare two copy numbers with a combined absolute and relative tolerance
///
/// The values are equal if they are within the absolute tolerance OR within the relative
/// tolerance of their mean.
///
pub fn copy_numbers_equal(cn1: f64, cn2: f64) -> bool {
    let diff = (cn1 - cn2).abs();
    if diff <= CN_ABS_TOLERANCE {
        return true;
    }
    let mean = (cn1 + cn2) / 2.0;
    mean > 0.0 && diff / mean <= CN_REL_TOLERANCE
}

/// Compare two junction copy numbers, also accepting overlapping uncertainty ranges
///
pub fn jcn_match(sv1: &StructuralVariant, sv2: &StructuralVariant) -> bool {
    if copy_numbers_equal(sv1.jcn, sv2.jcn) {
        return true;
    }
    let (low1, high1) = (sv1.jcn - sv1.jcn_uncertainty, sv1.jcn + sv1.jcn_uncertainty);
    let (low2, high2) = (sv2.jcn - sv2.jcn_uncertainty, sv2.jcn + sv2.jcn_uncertainty);
    low1 <= high2 && low2 <= high1
}

/// A loss-of-heterozygosity segment, optionally bounded by known SVs
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LohEvent {
    pub chromosome: String,
    pub pos_start: i64,
    pub pos_end: i64,
    #[serde(default, rename = "startSvId")]
    pub start_sv: Option<u32>,
    #[serde(default, rename = "endSvId")]
    pub end_sv: Option<u32>,
}

impl LohEvent {
    /// True if this breakend of SV `sv_id` forms one of the LOH boundaries
    ///
    pub fn is_bounded_by(&self, sv_id: u32, breakend: &Breakend) -> bool {
        if breakend.chrom != self.chromosome {
            return false;
        }
        let matches = |sv: Option<u32>, pos: i64| {
            sv == Some(sv_id) && (breakend.position - pos).abs() <= 1
        };
        matches(self.start_sv, self.pos_start) || matches(self.end_sv, self.pos_end)
    }
}
