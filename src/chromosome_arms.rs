//! Chromosome lengths, centromeres and arm assignment
//!

use std::collections::HashMap;

use camino::Utf8Path;
use log::info;
use simple_error::{SimpleResult, bail, try_with};

use crate::os_utils::open_text_reader;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, strum::Display)]
pub enum ChromosomeArm {
    P,
    Q,
}

#[derive(Clone, Debug)]
pub struct ChromInfo {
    pub length: i64,
    pub centromere: i64,
}

/// (chromosome, length, centromere) for GRCh37
const GRCH37_CHROM_INFO: [(&str, i64, i64); 24] = [
    ("1", 249_250_621, 123_035_434),
    ("2", 243_199_373, 93_826_171),
    ("3", 198_022_430, 92_004_854),
    ("4", 191_154_276, 51_160_117),
    ("5", 180_915_260, 47_905_641),
    ("6", 171_115_067, 60_330_166),
    ("7", 159_138_663, 59_554_331),
    ("8", 146_364_022, 45_338_887),
    ("9", 141_213_431, 48_267_445),
    ("10", 135_534_747, 40_640_102),
    ("11", 135_006_516, 52_810_570),
    ("12", 133_851_895, 36_356_694),
    ("13", 115_169_878, 17_500_000),
    ("14", 107_349_540, 17_500_000),
    ("15", 102_531_392, 18_500_000),
    ("16", 90_354_753, 36_835_801),
    ("17", 81_195_210, 23_763_006),
    ("18", 78_077_248, 16_960_898),
    ("19", 59_128_983, 26_181_782),
    ("20", 63_025_520, 27_869_569),
    ("21", 48_129_895, 12_788_129),
    ("22", 51_304_566, 14_500_000),
    ("X", 155_270_560, 60_132_012),
    ("Y", 59_373_566, 11_604_553),
];

/// Per-chromosome length and centromere lookup
///
/// Lookups accept chromosome names with or without a 'chr' prefix.
///
pub struct ChromosomeArmTable {
    chroms: HashMap<String, ChromInfo>,
}

impl ChromosomeArmTable {
    pub fn grch37() -> Self {
        let chroms = GRCH37_CHROM_INFO
            .iter()
            .map(|&(chrom, length, centromere)| (chrom.to_string(), ChromInfo { length, centromere }))
            .collect();
        Self { chroms }
    }

    /// Read a tab-delimited table of (chromosome, length, centromere)
    ///
    pub fn from_file(filename: &Utf8Path) -> SimpleResult<Self> {
        info!("Reading chromosome arm table from file: '{filename}'");

        let reader = open_text_reader(filename, "chromosome arm table")?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut chroms = HashMap::new();
        for (line_index, result) in rdr.deserialize().enumerate() {
            let (chrom, length, centromere): (String, i64, i64) = try_with!(
                result,
                "Failed to parse line {} of chromosome arm table: '{filename}'",
                line_index + 1
            );
            if centromere < 0 || centromere > length {
                bail!(
                    "Centromere position {centromere} is outside chromosome {chrom} in chromosome arm table: '{filename}'"
                );
            }
            chroms.insert(chrom, ChromInfo { length, centromere });
        }

        if chroms.is_empty() {
            bail!("No chromosomes found in chromosome arm table: '{filename}'");
        }
        Ok(Self { chroms })
    }

    pub fn get(&self, chrom: &str) -> Option<&ChromInfo> {
        if let Some(x) = self.chroms.get(chrom) {
            return Some(x);
        }
        match chrom.strip_prefix("chr") {
            Some(stripped) => self.chroms.get(stripped),
            None => self.chroms.get(&format!("chr{chrom}")),
        }
    }

    /// Get the arm of a breakend position, or an error if the position is not on the chromosome
    ///
    pub fn get_arm(&self, chrom: &str, pos: i64) -> SimpleResult<ChromosomeArm> {
        let Some(info) = self.get(chrom) else {
            bail!("Unknown chromosome '{chrom}'");
        };
        if pos < 1 || pos > info.length {
            bail!(
                "Position {pos} is outside of chromosome '{chrom}' (length {})",
                info.length
            );
        }
        Ok(if pos < info.centromere {
            ChromosomeArm::P
        } else {
            ChromosomeArm::Q
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_arm() {
        let arms = ChromosomeArmTable::grch37();
        assert_eq!(arms.get_arm("1", 1000).unwrap(), ChromosomeArm::P);
        assert_eq!(arms.get_arm("chr1", 200_000_000).unwrap(), ChromosomeArm::Q);
        assert_eq!(arms.get_arm("X", 60_132_012).unwrap(), ChromosomeArm::Q);
    }

    #[test]
    fn test_invalid_positions() {
        let arms = ChromosomeArmTable::grch37();
        assert!(arms.get_arm("1", 0).is_err());
        assert!(arms.get_arm("1", 249_250_622).is_err());
        assert!(arms.get_arm("chrUn", 100).is_err());
    }
}
