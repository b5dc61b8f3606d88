use clap::Args;
use simple_error::{SimpleResult, bail};

/// Options accepted before or after the subcommand name
#[derive(Args)]
pub struct SharedSettings {
    /// Number of samples to analyze in parallel. Defaults to all logical cpus detected.
    ///
    /// Each sample runs on a single thread, so there is no benefit to using more threads than
    /// samples.
    ///
    #[arg(long = "threads", global = true, value_name = "THREAD_COUNT")]
    requested_thread_count: Option<usize>,

    /// Resolved from requested_thread_count during validation
    #[arg(skip)]
    pub thread_count: usize,

    /// Write into an existing output directory
    #[arg(long, global = true)]
    pub clobber: bool,

    /// Turn on debug logging, including per-stage cluster and merge traces
    ///
    /// This is very verbose for large samples. Per-link chaining traces are only shown with
    /// the cluster command's --log-verbose option.
    ///
    #[arg(long, global = true)]
    pub debug: bool,
}

pub fn validate_and_fix_shared_settings(
    mut settings: SharedSettings,
) -> SimpleResult<SharedSettings> {
    settings.thread_count = match settings.requested_thread_count {
        Some(0) => bail!("--threads argument must be greater than 0"),
        Some(count) => count,
        None => num_cpus::get(),
    };

    Ok(settings)
}
