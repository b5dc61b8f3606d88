//! Per-sample SV and LOH input, and the reference tables used to annotate breakends
//!

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use serde::Deserialize;
use simple_error::{SimpleResult, bail, try_with};

use crate::chromosome_arms::ChromosomeArmTable;
use crate::copy_number::LohEvent;
use crate::genome_regions::GenomeRegions;
use crate::os_utils::open_text_reader;
use crate::sv_data::{Breakend, StructuralVariant, SvType};

const SV_FILE_SUFFIXES: [&str; 2] = [".sv_data.tsv", ".sv_data.tsv.gz"];
const LOH_FILE_SUFFIXES: [&str; 2] = [".loh.tsv", ".loh.tsv.gz"];

const DEFAULT_COPY_NUMBER: f64 = 2.0;
const DEFAULT_COPY_NUMBER_CHANGE: f64 = 1.0;

/// Reference data shared read-only by all samples
pub struct ReferenceData {
    pub arms: ChromosomeArmTable,
    pub line_elements: GenomeRegions,
    pub fragile_sites: GenomeRegions,
}

/// All input for one sample's pipeline run
pub struct SampleSvData {
    pub sample_id: String,
    pub svs: Vec<StructuralVariant>,
    pub lohs: Vec<LohEvent>,
}

/// Input file locations for one sample
#[derive(Clone, Debug)]
pub struct SampleFiles {
    pub sample_id: String,
    pub sv_filename: Utf8PathBuf,
    pub loh_filename: Option<Utf8PathBuf>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SvRecord {
    sv_id: u32,
    #[serde(rename = "type")]
    sv_type: SvType,
    chromosome_start: String,
    position_start: i64,
    orientation_start: i8,
    chromosome_end: Option<String>,
    position_end: Option<i64>,
    orientation_end: Option<i8>,
    junction_copy_number: f64,
    #[serde(default)]
    jcn_uncertainty: f64,
    #[serde(default)]
    assembly_linked_ids: Option<String>,
    copy_number_start: Option<f64>,
    copy_number_change_start: Option<f64>,
    copy_number_end: Option<f64>,
    copy_number_change_end: Option<f64>,
    #[serde(default)]
    in_line_element: Option<bool>,
}

fn parse_assembly_linked_ids(sv_id: u32, ids: Option<&str>) -> SimpleResult<Vec<u32>> {
    let mut linked_ids = Vec::new();
    for word in ids.unwrap_or_default().split(';').filter(|x| !x.is_empty()) {
        let id = try_with!(
            word.trim().parse::<u32>(),
            "Invalid assembly linked id '{word}' for SV {sv_id}"
        );
        linked_ids.push(id);
    }
    Ok(linked_ids)
}

fn make_breakend(
    reference: &ReferenceData,
    sv_id: u32,
    chrom: &str,
    position: i64,
    orientation: i8,
    copy_number: Option<f64>,
    copy_number_change: Option<f64>,
) -> SimpleResult<Breakend> {
    if orientation != 1 && orientation != -1 {
        bail!("SV {sv_id} has invalid breakend orientation {orientation}");
    }
    let arm = try_with!(
        reference.arms.get_arm(chrom, position),
        "SV {sv_id} has an invalid breakend"
    );
    let mut breakend = Breakend::new(
        chrom,
        position,
        orientation,
        arm,
        copy_number.unwrap_or(DEFAULT_COPY_NUMBER),
        copy_number_change.unwrap_or(DEFAULT_COPY_NUMBER_CHANGE),
    );
    breakend.in_fragile_site = reference.fragile_sites.contains_breakend(chrom, position);
    Ok(breakend)
}

impl SvRecord {
    fn into_sv(self, reference: &ReferenceData) -> SimpleResult<StructuralVariant> {
        let sv_id = self.sv_id;
        let start = make_breakend(
            reference,
            sv_id,
            &self.chromosome_start,
            self.position_start,
            self.orientation_start,
            self.copy_number_start,
            self.copy_number_change_start,
        )?;

        let end = if self.sv_type == SvType::Sgl {
            None
        } else {
            let (Some(chrom), Some(position), Some(orientation)) = (
                self.chromosome_end.as_deref().filter(|x| !x.is_empty()),
                self.position_end,
                self.orientation_end,
            ) else {
                bail!("SV {sv_id} of type {} is missing its end breakend", self.sv_type);
            };
            Some(make_breakend(
                reference,
                sv_id,
                chrom,
                position,
                orientation,
                self.copy_number_end,
                self.copy_number_change_end,
            )?)
        };

        let in_line_region = std::iter::once(&start)
            .chain(end.as_ref())
            .any(|x| reference.line_elements.contains_breakend(&x.chrom, x.position));

        Ok(StructuralVariant {
            id: sv_id,
            sv_type: self.sv_type,
            start,
            end,
            jcn: self.junction_copy_number,
            jcn_uncertainty: self.jcn_uncertainty,
            assembly_linked_ids: parse_assembly_linked_ids(
                sv_id,
                self.assembly_linked_ids.as_deref(),
            )?,
            in_line_element: self.in_line_element.unwrap_or(false) || in_line_region,
        })
    }
}

fn tsv_reader(filename: &Utf8Path, label: &str) -> SimpleResult<csv::Reader<Box<dyn std::io::Read>>> {
    let reader = open_text_reader(filename, label)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_reader(reader))
}

/// Read all SVs of one sample
///
/// Record parse errors, invalid breakends and duplicate SV ids are errors for the sample.
///
pub fn read_sv_file(
    filename: &Utf8Path,
    reference: &ReferenceData,
) -> SimpleResult<Vec<StructuralVariant>> {
    let mut rdr = tsv_reader(filename, "SV")?;
    let mut svs = Vec::new();
    let mut sv_ids = HashSet::new();
    for (line_index, result) in rdr.deserialize().enumerate() {
        let record: SvRecord = try_with!(
            result,
            "Failed to parse record {} from SV file: '{filename}'",
            line_index + 1
        );
        if !sv_ids.insert(record.sv_id) {
            bail!("Duplicate SV id {} in SV file: '{filename}'", record.sv_id);
        }
        let sv = try_with!(
            record.into_sv(reference),
            "Invalid record {} in SV file: '{filename}'",
            line_index + 1
        );
        svs.push(sv);
    }
    Ok(svs)
}

pub fn read_loh_file(filename: &Utf8Path) -> SimpleResult<Vec<LohEvent>> {
    let mut rdr = tsv_reader(filename, "LOH")?;
    let mut lohs = Vec::new();
    for (line_index, result) in rdr.deserialize().enumerate() {
        let loh: LohEvent = try_with!(
            result,
            "Failed to parse record {} from LOH file: '{filename}'",
            line_index + 1
        );
        lohs.push(loh);
    }
    Ok(lohs)
}

fn strip_any_suffix<'a>(name: &'a str, suffixes: &[&str]) -> Option<&'a str> {
    suffixes
        .iter()
        .find_map(|x| name.strip_suffix(x))
        .filter(|x| !x.is_empty())
}

/// Find the SV input file of each sample in the SV directory, with its optional LOH file
///
/// If `requested_samples` is empty every sample found is returned, otherwise each requested
/// sample must be present. Samples are returned in name order.
///
pub fn find_sample_files(
    sv_dir: &Utf8Path,
    requested_samples: &[String],
) -> SimpleResult<Vec<SampleFiles>> {
    let entries = try_with!(
        sv_dir.read_dir_utf8(),
        "Can't read SV input directory: '{sv_dir}'"
    );

    let mut sv_files = Vec::new();
    let mut loh_files = Vec::new();
    for entry in entries {
        let entry = try_with!(entry, "Can't read entry in SV input directory: '{sv_dir}'");
        let name = entry.file_name();
        if let Some(sample_id) = strip_any_suffix(name, &SV_FILE_SUFFIXES) {
            sv_files.push((sample_id.to_string(), entry.path().to_path_buf()));
        } else if let Some(sample_id) = strip_any_suffix(name, &LOH_FILE_SUFFIXES) {
            loh_files.push((sample_id.to_string(), entry.path().to_path_buf()));
        }
    }
    sv_files.sort();
    loh_files.sort();

    if !requested_samples.is_empty() {
        for sample_id in requested_samples {
            if !sv_files.iter().any(|(x, _)| x == sample_id) {
                bail!("No SV input file found for sample '{sample_id}' in directory: '{sv_dir}'");
            }
        }
        sv_files.retain(|(x, _)| requested_samples.contains(x));
    }

    let mut samples = Vec::new();
    for (sample_id, sv_filename) in sv_files {
        if samples.last().is_some_and(|x: &SampleFiles| x.sample_id == sample_id) {
            bail!("Multiple SV input files found for sample '{sample_id}' in directory: '{sv_dir}'");
        }
        let loh_filename = loh_files
            .iter()
            .find(|(x, _)| *x == sample_id)
            .map(|(_, f)| f.clone());
        samples.push(SampleFiles {
            sample_id,
            sv_filename,
            loh_filename,
        });
    }

    info!("Found {} samples in SV input directory '{sv_dir}'", samples.len());
    Ok(samples)
}

/// Read all input for one sample
pub fn read_sample(files: &SampleFiles, reference: &ReferenceData) -> SimpleResult<SampleSvData> {
    let svs = read_sv_file(&files.sv_filename, reference)?;
    let lohs = match &files.loh_filename {
        Some(x) => read_loh_file(x)?,
        None => Vec::new(),
    };
    Ok(SampleSvData {
        sample_id: files.sample_id.clone(),
        svs,
        lohs,
    })
}
