//! Logger setup for svchain runs
//!

use camino::{Utf8Path, Utf8PathBuf};
use log::LevelFilter;

use crate::cli;
use crate::globals::PROGRAM_NAME;
use crate::os_utils::create_dir_all;

pub fn get_log_filename(output_dir: &Utf8Path) -> Utf8PathBuf {
    output_dir.join(format!("{PROGRAM_NAME}.log"))
}

fn get_log_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Log to stderr, and also to the given file if any
///
fn setup_logger(log_filename: Option<&Utf8Path>, level: LevelFilter) -> Result<(), fern::InitError> {
    let mut logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                PROGRAM_NAME,
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(log_filename) = log_filename {
        logger = logger.chain(fern::log_file(log_filename)?);
    }

    logger.apply()?;
    Ok(())
}

/// Check and create the output directory, then start logging to a file inside it
///
/// An existing output directory is only accepted when `clobber` is set. Any problem here is
/// reported directly to stderr because no logger exists yet.
///
/// * `debug` - If true use debug log level, and info level otherwise
///
pub fn setup_output_dir_and_logger(output_dir: &Utf8Path, clobber: bool, debug: bool) {
    if let Err(msg) = cli::check_novel_dirname(output_dir, "Output directory")
        && !clobber
    {
        eprintln!("Invalid command-line setting: {msg}");
        std::process::exit(exitcode::USAGE);
    }
    create_dir_all(output_dir, "output");

    let log_filename = get_log_filename(output_dir);
    if let Err(err) = setup_logger(Some(&log_filename), get_log_level(debug)) {
        eprintln!("Unable to setup logging to file '{log_filename}': {err}");
        std::process::exit(exitcode::CANTCREAT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_settings() {
        assert_eq!(get_log_level(true), LevelFilter::Debug);
        assert_eq!(get_log_level(false), LevelFilter::Info);
        assert_eq!(
            get_log_filename(Utf8Path::new("out")).as_str(),
            "out/svchain.log"
        );
    }
}
