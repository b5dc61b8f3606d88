use std::collections::HashMap;
use std::io::Read;

use bio::data_structures::interval_tree::IntervalTree;
use camino::Utf8Path;
use log::info;
use simple_error::{SimpleResult, bail, try_with};

use crate::os_utils::open_text_reader;

/// A set of chromosome regions which can be efficiently queried
///
#[derive(Clone)]
pub struct ChromRegions {
    regions: IntervalTree<i64, ()>,
}

impl ChromRegions {
    pub fn new() -> Self {
        Self {
            regions: IntervalTree::new(),
        }
    }

    /// Return true if the start-end range intersects with any regions stored in this object
    ///
    pub fn intersect(&self, start: i64, end: i64) -> bool {
        self.regions.find(start..end).next().is_some()
    }

    /// Adds a region, regions are not collapsed
    ///
    pub fn add_region(&mut self, start: i64, end: i64) {
        self.regions.insert(start..end, ());
    }
}

/// Annotation regions such as LINE elements or fragile sites, keyed by chromosome
///
/// Regions are stored in bed coordinates (0-indexed, half-closed). Breakend positions are
/// 1-indexed and converted on lookup.
///
#[derive(Clone, Default)]
pub struct GenomeRegions {
    chroms: HashMap<String, ChromRegions>,
}

impl GenomeRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load regions from a bed file, optionally gzip compressed
    ///
    /// Blank, comment and track lines are skipped. Only the first 3 columns are read.
    ///
    /// # Arguments
    ///
    /// * `label` - Region type used in log and error messages, such as "fragile site"
    ///
    pub fn from_bed(filename: &Utf8Path, label: &str) -> SimpleResult<Self> {
        info!("Reading {label} regions from file '{filename}'");

        let mut content = String::new();
        try_with!(
            open_text_reader(filename, label)?.read_to_string(&mut content),
            "Can't read text from {label} regions file: '{filename}'"
        );

        let mut regions = Self::new();
        let mut region_count = 0;
        for (line_index, line) in content.lines().enumerate() {
            if line.is_empty() || line.starts_with('#') || line.starts_with("track") {
                continue;
            }
            let (chrom, start, end) = try_with!(
                parse_bed_line(line),
                "Invalid {label} region on line {} of file: '{filename}'",
                line_index + 1
            );
            regions.add_region(chrom, start, end);
            region_count += 1;
        }

        info!(
            "Read {region_count} {label} regions from {} chromosomes",
            regions.chroms.len()
        );
        Ok(regions)
    }

    /// # Arguments
    /// * `chrom` - the contig string
    /// * `start` - the start coordinate (included)
    /// * `end` - the end coordinates (excluded)
    pub fn add_region(&mut self, chrom: &str, start: i64, end: i64) {
        self.chroms
            .entry(chrom.to_owned())
            .or_insert_with(ChromRegions::new)
            .add_region(start, end);
    }

    fn get_chrom(&self, chrom: &str) -> Option<&ChromRegions> {
        if let Some(x) = self.chroms.get(chrom) {
            return Some(x);
        }
        match chrom.strip_prefix("chr") {
            Some(stripped) => self.chroms.get(stripped),
            None => self.chroms.get(&format!("chr{chrom}")),
        }
    }

    /// Return true if the 1-indexed breakend position falls inside any region
    ///
    pub fn contains_breakend(&self, chrom: &str, pos: i64) -> bool {
        match self.get_chrom(chrom) {
            Some(x) => x.intersect(pos - 1, pos),
            None => false,
        }
    }
}

/// Split a bed line into its chromosome and [start,end) coordinates
///
fn parse_bed_line(line: &str) -> SimpleResult<(&str, i64, i64)> {
    let mut words = line.split('\t');
    let (Some(chrom), Some(start), Some(end)) = (words.next(), words.next(), words.next()) else {
        bail!("Expected at least 3 tab-delimited columns");
    };
    let start = try_with!(start.parse::<i64>(), "Invalid start '{start}'");
    let end = try_with!(end.parse::<i64>(), "Invalid end '{end}'");
    if end <= start {
        bail!("Empty region {chrom}:{start}-{end}");
    }
    Ok((chrom, start, end))
}
