//! Structural variant and breakend records for one sample
//!
//! SVs are held in a per-sample arena (a plain `Vec`) and referred to everywhere else by their
//! arena index. Breakends are referred to by an (SV index, start/end) key.
//!

use serde::{Deserialize, Serialize};

use crate::chromosome_arms::ChromosomeArm;

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum SvType {
    Del,
    Dup,
    Ins,
    Inv,
    Bnd,
    Sgl,
}

pub type SvIndex = usize;

/// Identifies one breakend of an SV in the sample arena
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BreakendKey {
    pub sv: SvIndex,
    pub is_start: bool,
}

impl BreakendKey {
    pub fn new(sv: SvIndex, is_start: bool) -> Self {
        Self { sv, is_start }
    }

    pub fn other_end(&self) -> Self {
        Self {
            sv: self.sv,
            is_start: !self.is_start,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Breakend {
    pub chrom: String,

    /// 1-indexed position
    pub position: i64,

    /// +1 if the retained segment is below the breakend, -1 if above
    pub orientation: i8,

    pub arm: ChromosomeArm,

    /// Copy number of the segment on the orientation side of the breakend
    pub copy_number: f64,

    /// Copy number change across the breakend
    pub copy_number_change: f64,

    pub in_fragile_site: bool,
}

impl Breakend {
    pub fn new(
        chrom: &str,
        position: i64,
        orientation: i8,
        arm: ChromosomeArm,
        copy_number: f64,
        copy_number_change: f64,
    ) -> Self {
        Self {
            chrom: chrom.to_string(),
            position,
            orientation,
            arm,
            copy_number,
            copy_number_change,
            in_fragile_site: false,
        }
    }

    /// Copy number of the segment immediately below the breakend
    pub fn copy_number_low_side(&self) -> f64 {
        if self.orientation == 1 {
            self.copy_number
        } else {
            self.copy_number - self.copy_number_change
        }
    }

    /// Copy number of the segment immediately above the breakend
    pub fn copy_number_high_side(&self) -> f64 {
        if self.orientation == -1 {
            self.copy_number
        } else {
            self.copy_number - self.copy_number_change
        }
    }

    pub fn same_arm(&self, other: &Breakend) -> bool {
        self.chrom == other.chrom && self.arm == other.arm
    }
}

#[derive(Clone, Debug)]
pub struct StructuralVariant {
    /// External SV id from the input record
    pub id: u32,
    pub sv_type: SvType,
    pub start: Breakend,

    /// None for single-ended SVs
    pub end: Option<Breakend>,

    /// Junction copy number
    pub jcn: f64,
    pub jcn_uncertainty: f64,

    /// External ids of SVs linked to this one by assembly evidence
    pub assembly_linked_ids: Vec<u32>,

    pub in_line_element: bool,
}

impl StructuralVariant {
    pub fn is_sgl(&self) -> bool {
        self.end.is_none()
    }

    pub fn breakend(&self, is_start: bool) -> Option<&Breakend> {
        if is_start {
            Some(&self.start)
        } else {
            self.end.as_ref()
        }
    }

    /// Access a breakend that is known to exist
    ///
    /// Breakend keys are only ever created for existing breakends, so a missing end here is a
    /// logic error.
    ///
    pub fn get_breakend(&self, is_start: bool) -> &Breakend {
        match self.breakend(is_start) {
            Some(x) => x,
            None => panic!("SV {} has no end breakend", self.id),
        }
    }

    /// Keys of all breakends of this SV
    pub fn breakend_keys(&self, sv_index: SvIndex) -> Vec<BreakendKey> {
        if self.is_sgl() {
            vec![BreakendKey::new(sv_index, true)]
        } else {
            vec![
                BreakendKey::new(sv_index, true),
                BreakendKey::new(sv_index, false),
            ]
        }
    }

    /// Distance between the two breakends, 0 if they are not on the same chromosome
    pub fn length(&self) -> i64 {
        match &self.end {
            Some(end) if end.chrom == self.start.chrom => (end.position - self.start.position).abs(),
            _ => 0,
        }
    }

    /// True if the SV has two breakends on different chromosome arms
    pub fn is_cross_arm(&self) -> bool {
        match &self.end {
            Some(end) => !end.same_arm(&self.start),
            None => false,
        }
    }
}

/// Look up a breakend from its key
pub fn get_breakend(svs: &[StructuralVariant], key: BreakendKey) -> &Breakend {
    svs[key.sv].get_breakend(key.is_start)
}
