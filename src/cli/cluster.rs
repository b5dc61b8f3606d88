use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use simple_error::{SimpleResult, bail};

use super::defaults::{BFB_MIN_JCN, CHAINING_SV_LIMIT, DM_MIN_JCN, PROXIMITY_DISTANCE};
use super::utils::{check_optional_filename, check_required_dirname};

#[derive(Args)]
pub struct ClusterSettings {
    /// Directory of per-sample SV input files
    ///
    /// Each sample's SVs are read from '{sample}.sv_data.tsv', optionally gzipped. LOH events are
    /// read from '{sample}.loh.tsv' in the same directory when present.
    ///
    #[arg(long, value_name = "DIR")]
    pub sv_dir: Utf8PathBuf,

    /// Sample to analyze, may be given more than once. By default all samples found in the
    /// SV directory are analyzed.
    #[arg(long = "sample", value_name = "ID")]
    pub sample_list: Vec<String>,

    /// Directory for all cluster command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_output"))]
    pub output_dir: Utf8PathBuf,

    /// Chromosome arm table with columns chromosome, length and centromere position
    ///
    /// A built-in GRCh37 table is used by default.
    ///
    #[arg(long = "chrom-arms", value_name = "FILE")]
    pub chrom_arms_filename: Option<Utf8PathBuf>,

    /// Known LINE element regions in BED format. Clusters with a breakend in one of these regions
    /// are marked as LINE insertions.
    #[arg(long = "line-elements", value_name = "FILE")]
    pub line_elements_filename: Option<Utf8PathBuf>,

    /// Known fragile site regions in BED format. These are only reported in the SV output.
    #[arg(long = "fragile-sites", value_name = "FILE")]
    pub fragile_sites_filename: Option<Utf8PathBuf>,

    /// Breakends closer than this distance are placed in the same initial cluster
    #[arg(long, default_value_t = PROXIMITY_DISTANCE)]
    pub proximity_distance: i64,

    /// Clusters with more SVs than this are not chained
    #[arg(long, default_value_t = CHAINING_SV_LIMIT)]
    pub chaining_sv_limit: usize,

    /// Minimum junction copy number of all SVs in a double minute
    #[arg(long, default_value_t = DM_MIN_JCN)]
    pub dm_min_jcn: f64,

    /// Minimum foldback junction copy number for a breakage-fusion-bridge annotation
    #[arg(long, default_value_t = BFB_MIN_JCN)]
    pub bfb_min_jcn: f64,

    /// Skip the double minute and breakage-fusion-bridge annotation passes
    #[arg(long)]
    pub skip_annotations: bool,

    /// Check clustering consistency after each pipeline stage
    ///
    /// Any inconsistency fails the sample.
    ///
    #[arg(hide = true, long)]
    pub run_validation: bool,

    /// Print per-cluster chaining traces to stderr
    #[arg(hide = true, long)]
    pub log_verbose: bool,
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_cluster_settings(settings: ClusterSettings) -> SimpleResult<ClusterSettings> {
    check_required_dirname(&settings.sv_dir, "SV input")?;

    check_optional_filename(settings.chrom_arms_filename.as_deref(), "chromosome arm")?;
    check_optional_filename(settings.line_elements_filename.as_deref(), "LINE element")?;
    check_optional_filename(settings.fragile_sites_filename.as_deref(), "fragile site")?;

    if settings.proximity_distance <= 0 {
        bail!("--proximity-distance argument must be greater than 0");
    }

    if settings.chaining_sv_limit == 0 {
        bail!("--chaining-sv-limit argument must be greater than 0");
    }

    if settings.dm_min_jcn <= 0.0 {
        bail!("--dm-min-jcn argument must be greater than 0");
    }

    if settings.bfb_min_jcn <= 0.0 {
        bail!("--bfb-min-jcn argument must be greater than 0");
    }

    let mut settings = settings;
    settings.sample_list.sort();
    settings.sample_list.dedup();

    Ok(settings)
}
