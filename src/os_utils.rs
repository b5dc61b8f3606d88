//! Utilities pertaining to filesystem access
//!

use std::fs::File;
use std::io::{BufReader, Read};

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;
use simple_error::{SimpleResult, try_with};

/// Create a novel directory path if it does not exist already
///
/// If the directory already exists no operations are performed
///
/// * `label` - used to describe the error directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) {
    if !dir.is_dir() {
        match std::fs::create_dir_all(dir) {
            Ok(_) => {}
            Err(e) => {
                panic!("Can't create new {} directory at '{}': {}", label, dir, e);
            }
        }
    }
}

/// Open a text file for reading, decompressing on the fly if the name ends in '.gz'
///
/// * `label` - used to describe the file in an error message
///
pub fn open_text_reader(filename: &Utf8Path, label: &str) -> SimpleResult<Box<dyn Read>> {
    let f = try_with!(
        File::open(filename),
        "Unable to open {label} file: '{filename}'"
    );
    let reader: Box<dyn Read> = if filename.extension() == Some("gz") {
        Box::new(MultiGzDecoder::new(BufReader::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use crate::test_utils::create_test_dir;

    #[test]
    fn test_open_gz_text_reader() {
        let (_dir_guard, dir) = create_test_dir();
        let filename = dir.join("x.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&filename).unwrap(), Compression::default());
        encoder.write_all(b"chr1\t10\t20\n").unwrap();
        encoder.finish().unwrap();

        let mut content = String::new();
        open_text_reader(&filename, "test")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "chr1\t10\t20\n");

        assert!(open_text_reader(&dir.join("missing.txt"), "test").is_err());
    }
}
