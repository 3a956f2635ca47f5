//! Parameters of a topological link scan.

use std::path::PathBuf;

/// Contact distance for interface selection (Å)
pub const DIST_CUTOFF: f64 = 10.0;
/// Threshold on the absolute GLN of a window
pub const THRESH_SCORE: f64 = 0.8;
/// Shortest scan window (backbone points)
pub const SCAN_BEGIN: usize = 4;
/// Longest scan window (backbone points)
pub const SCAN_END: usize = 36;
/// Residues removed from each chain terminus
pub const TERMINAL_TRIM: usize = 15;
/// Where detail files go unless told otherwise
pub const OUTPATH: &str = "/tmp/topo_links";

/// Settings shared by every chain pair of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkParams {
    /// Distance cutoff for interface selection (Å)
    pub dist_cutoff: f64,
    /// Threshold for the absolute value of window GLN scores
    pub thresh_score: f64,
    /// Lower limit of the scan windows (points)
    pub scan_begin: usize,
    /// Upper limit of the scan windows (points)
    pub scan_end: usize,
    /// Number of terminal residues ignored on each chain end
    pub terminal_trim: usize,
    /// Write interface structures, GLN maps and matrices
    pub detail: bool,
    /// Directory for detail files
    pub outpath: PathBuf,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            dist_cutoff: DIST_CUTOFF,
            thresh_score: THRESH_SCORE,
            scan_begin: SCAN_BEGIN,
            scan_end: SCAN_END,
            terminal_trim: TERMINAL_TRIM,
            detail: false,
            outpath: PathBuf::from(OUTPATH),
        }
    }
}
