//! Plain-text summary of a link scan.

use crate::links::ComplexResult;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default summary file name inside the output directory.
pub const SUMMARY_FILE: &str = "summary_topo_links.txt";

/// Write one `<input> <pair key> <tln> <record>` line per successful pair.
pub fn write_summary<W: Write>(mut out: W, input: &str, res: &ComplexResult) -> std::io::Result<()> {
    for pair in res.successes() {
        writeln!(out, "{input} {} {} {pair}", pair.pair.key(), pair.tln)?;
    }
    Ok(())
}

/// Append the summary lines of `res` to `path`, creating the file and its
/// parent directories as needed. Returns the number of lines written.
pub fn append_summary(path: &Path, input: &str, res: &ComplexResult) -> std::io::Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    write_summary(&mut writer, input, res)?;
    writer.flush()?;
    Ok(res.successes().count())
}
