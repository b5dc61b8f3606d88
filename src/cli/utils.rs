use camino::Utf8Path;
use simple_error::{SimpleResult, bail};

/// Check a required input directory
///
/// Assumes no logger has been configured yet
///
pub fn check_required_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.as_str().is_empty() {
        bail!("Must specify {label} directory");
    }
    if !dirname.exists() {
        bail!("Can't find specified {label} directory: '{dirname}'");
    }
    if !dirname.is_dir() {
        bail!("Specified {label} directory path does not appear to be a directory: '{dirname}'");
    }
    Ok(())
}

/// Check an optional input filename
///
/// Assumes no logger has been configured yet
///
pub fn check_optional_filename(filename_opt: Option<&Utf8Path>, label: &str) -> SimpleResult<()> {
    if let Some(filename) = filename_opt {
        if !filename.exists() {
            bail!("Can't find specified {label} file: '{filename}'");
        }
        if !filename.is_file() {
            bail!("Specified {label} file path does not appear to be a file: '{filename}'");
        }
    }
    Ok(())
}
