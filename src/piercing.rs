//! Detection of chain segments piercing a loop of the partner chain.
//!
//! The linking matrix of a test curve is scanned with windows of
//! `scan_begin..scan_end` points. A window whose linking number exceeds the
//! threshold marks the residue at its midpoint as pierced. Marked residues are
//! then collapsed into runs of consecutive residue numbers, each run ending
//! inside the chain counting as one linked loop.

use crate::engine::LinkingMatrix;
use crate::interface::ChainFrames;
use crate::utils::round_half_even;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{trace, warn};

/// Extra window lengths tried past `scan_end` when the primary scan comes close.
const FALLBACK_EXTENSION: usize = 6;
/// Fraction of the threshold the primary scan must reach to try the fallback.
const FALLBACK_FRACTION: f64 = 0.9;
/// Slack below the threshold under which a matrix is rejected outright.
const REJECT_MARGIN: f64 = 0.01;

/// A run of consecutive pierced residue numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PierceInterval {
    /// First residue number of the run
    pub start: isize,
    /// Last residue number of the run, inclusive
    pub end: isize,
    /// The residue number before `start` is missing from the chain
    pub gap_before: bool,
    /// The residue number after `end` exists in the chain, so the run closes a loop
    pub closed: bool,
}

/// Pierced residues of one chain as runs of residue numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PierceRegions {
    intervals: Vec<PierceInterval>,
}

impl PierceRegions {
    /// Collapse marked residue numbers into runs.
    pub fn collapse(marked: &BTreeSet<isize>, frames: &ChainFrames) -> Self {
        let mut intervals: Vec<PierceInterval> = Vec::new();
        for &resi in marked {
            match intervals.last_mut() {
                Some(last) if last.end + 1 == resi => last.end = resi,
                _ => intervals.push(PierceInterval {
                    start: resi,
                    end: resi,
                    gap_before: !frames.has_residue_number(resi - 1),
                    closed: false,
                }),
            }
        }
        for interval in &mut intervals {
            interval.closed = frames.has_residue_number(interval.end + 1);
        }
        Self { intervals }
    }

    /// The runs in ascending residue order.
    pub fn intervals(&self) -> &[PierceInterval] {
        &self.intervals
    }

    /// Number of runs closing a loop within the chain.
    pub fn loop_count(&self) -> usize {
        self.intervals.iter().filter(|i| i.closed).count()
    }

    /// `true` if no residue was pierced.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Token string such as `10-12|20-20`.
///
/// A run is written `start-end`, prefixed with `--` when it follows a gap in
/// the residue numbering. Only runs that close a loop are followed by `|`,
/// and never the last one.
impl fmt::Display for PierceRegions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.intervals.len().saturating_sub(1);
        for (idx, interval) in self.intervals.iter().enumerate() {
            if interval.gap_before {
                write!(f, "--")?;
            }
            write!(f, "{}-{}", interval.start, interval.end)?;
            if interval.closed && idx < last {
                write!(f, "|")?;
            }
        }
        Ok(())
    }
}

/// Piercing result of one chain against its partner.
#[derive(Debug, Clone, PartialEq)]
pub struct PiercingRecord {
    /// Number of discrete linked loops
    pub n_links: usize,
    /// Pierced residue runs
    pub regions: PierceRegions,
    /// Entry of largest magnitude in the whole matrix, sign kept
    pub max_gln: f64,
    /// Entry of largest magnitude met by the primary scan, sign kept
    pub max_tln: f64,
    /// Shortest loop, in residues, that reached the threshold
    pub min_residues: usize,
}

impl PiercingRecord {
    /// Record of a chain without any link.
    pub fn unlinked(scan_end: usize) -> Self {
        Self {
            n_links: 0,
            regions: PierceRegions::default(),
            max_gln: 0.0,
            max_tln: 0.0,
            min_residues: default_min_residues(scan_end),
        }
    }
}

/// Minimal loop length reported when no link is found.
pub fn default_min_residues(scan_end: usize) -> usize {
    round_half_even(2.0 * scan_end as f64 / 3.0)
}

/// Scan state shared by the primary and fallback passes.
struct Scan<'a> {
    matrix: &'a LinkingMatrix,
    frames: &'a ChainFrames,
    thresh_score: f64,
    n_points: usize,
    marked: BTreeSet<isize>,
    min_residues: usize,
}

impl Scan<'_> {
    /// Visit windows starting at `0..starts` with lengths `lengths`.
    ///
    /// Returns the entry of largest magnitude seen.
    fn pass(&mut self, starts: usize, lengths: std::ops::Range<usize>) -> f64 {
        let mut max_seen = 0.0f64;
        for i in 0..starts {
            for j in lengths.clone() {
                let k = (i + j).min(self.n_points - 1);
                let score = self.matrix[(i, k)];
                if max_seen.abs() < score.abs() {
                    max_seen = score;
                }
                if score.abs() > self.thresh_score {
                    self.mark(i, k);
                }
            }
        }
        max_seen
    }

    fn mark(&mut self, i: usize, k: usize) {
        let mid = i + round_half_even((k - i) as f64 / 2.0);
        match self.frames.loop_residue_number(mid) {
            Some(resi) => {
                self.marked.insert(resi);
            }
            None => trace!("Window {i}..{k} has no residue at loop index {mid}"),
        }
        let loop_len = round_half_even((k - i + 1) as f64 / 3.0);
        self.min_residues = self.min_residues.min(loop_len);
    }
}

/// Find the residues of a chain that pierce a loop of its partner.
///
/// `matrix` is the linking matrix with this chain as the test curve and
/// `frames` this chain's index tables. Windows are `scan_begin..scan_end`
/// points long. The function is pure.
///
/// The matrix must cover at least `frames.n_points()` rows and columns, as
/// [`crate::validate_output`] guarantees for engine answers. A smaller matrix
/// is logged as a warning and the chain is reported unlinked.
pub fn identify_pierce(
    matrix: Option<&LinkingMatrix>,
    frames: &ChainFrames,
    thresh_score: f64,
    scan_begin: usize,
    scan_end: usize,
) -> PiercingRecord {
    let mut record = PiercingRecord::unlinked(scan_end);
    let n_points = frames.n_points();

    let Some(matrix) = matrix else {
        return record;
    };
    if n_points <= scan_begin {
        return record;
    }
    if matrix.nrows() < n_points || matrix.ncols() < n_points {
        warn!(
            "Matrix of shape {:?} is too small for {n_points} points, treating chain as unlinked",
            matrix.shape()
        );
        return record;
    }
    let scan_end = scan_end.min(n_points - 1);

    let max1 = matrix.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min1 = matrix.iter().copied().fold(f64::INFINITY, f64::min);
    record.max_gln = if max1.abs() > min1.abs() { max1 } else { min1 };
    if record.max_gln.abs() < thresh_score - REJECT_MARGIN {
        return record;
    }

    let mut scan = Scan {
        matrix,
        frames,
        thresh_score,
        n_points,
        marked: BTreeSet::new(),
        min_residues: record.min_residues,
    };
    record.max_tln = scan.pass(n_points - scan_begin, scan_begin..scan_end);

    if scan.marked.is_empty() && record.max_tln.abs() > FALLBACK_FRACTION * thresh_score {
        trace!(
            "Primary scan peaked at {:.3}; extending windows to {}..{}",
            record.max_tln,
            scan_end,
            scan_end + FALLBACK_EXTENSION
        );
        scan.pass(n_points - scan_end, scan_end..scan_end + FALLBACK_EXTENSION);
    }

    record.regions = PierceRegions::collapse(&scan.marked, frames);
    record.n_links = record.regions.loop_count();
    record.min_residues = scan.min_residues;
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    /// One point per residue, numbered `first..first + n`.
    fn single_point_frames(first: isize, n: usize) -> ChainFrames {
        let numbers: Vec<isize> = (first..first + n as isize).collect();
        ChainFrames::new(numbers, (0..n).collect()).unwrap()
    }

    fn matrix_with(n: usize, entries: &[((usize, usize), f64)]) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(n, n);
        for &(idx, v) in entries {
            m[idx] = v;
        }
        m
    }

    #[test]
    fn collapse_two_groups() {
        let frames = single_point_frames(5, 21); // 5..=25
        let marked = BTreeSet::from([10, 11, 12, 20]);
        let regions = PierceRegions::collapse(&marked, &frames);
        assert_eq!(regions.loop_count(), 2);
        assert_eq!(regions.to_string(), "10-12|20-20");
        assert_eq!(
            regions.intervals()[0],
            PierceInterval {
                start: 10,
                end: 12,
                gap_before: false,
                closed: true
            }
        );
    }

    #[test]
    fn collapse_around_gaps_and_chain_end() {
        // Residue 10 is missing, the chain ends at 15
        let numbers: Vec<isize> = (5..=9).chain(11..=15).collect();
        let n = numbers.len();
        let frames = ChainFrames::new(numbers, (0..n).collect()).unwrap();

        let regions = PierceRegions::collapse(&BTreeSet::from([11, 12]), &frames);
        assert_eq!(regions.to_string(), "--11-12");
        assert_eq!(regions.loop_count(), 1);

        let regions = PierceRegions::collapse(&BTreeSet::from([6, 7, 14, 15]), &frames);
        assert_eq!(regions.to_string(), "6-7|14-15");
        assert_eq!(regions.loop_count(), 1, "A run reaching the chain end is open");

        let regions = PierceRegions::collapse(&BTreeSet::from([8, 9, 11]), &frames);
        assert_eq!(regions.to_string(), "8-9--11-11");
        assert_eq!(regions.loop_count(), 1);

        assert!(PierceRegions::collapse(&BTreeSet::new(), &frames).is_empty());
    }

    #[test]
    fn too_few_points_is_unlinked() {
        let frames = single_point_frames(1, 4);
        let m = DMatrix::from_element(4, 4, 5.0);
        let record = identify_pierce(Some(&m), &frames, 0.8, 4, 36);
        assert_eq!(record, PiercingRecord::unlinked(36));
        assert_eq!(record.min_residues, 24);
    }

    #[test]
    fn missing_matrix_is_unlinked() {
        let frames = single_point_frames(1, 40);
        let record = identify_pierce(None, &frames, 0.8, 4, 36);
        assert_eq!(record.n_links, 0);
        assert!(record.regions.is_empty());
        assert_eq!(record.min_residues, 24);
    }

    #[test]
    fn undersized_matrix_is_unlinked() {
        // Strong enough to link if it were read, but it only covers half the chain
        let frames = single_point_frames(1, 20);
        let m = DMatrix::from_element(10, 10, 1.0);
        let record = identify_pierce(Some(&m), &frames, 0.8, 4, 36);
        assert_eq!(record, PiercingRecord::unlinked(36));
        assert_eq!(record.n_links, 0);
        assert_eq!(record.max_gln, 0.0);
    }

    #[test]
    fn weak_matrix_is_rejected_early() {
        let frames = single_point_frames(1, 20);
        let m = matrix_with(20, &[((2, 8), -0.5), ((3, 9), 0.4)]);
        let record = identify_pierce(Some(&m), &frames, 0.8, 4, 10);
        assert_eq!(record.n_links, 0);
        assert_eq!(record.max_gln, -0.5);
        assert_eq!(record.max_tln, 0.0, "No scan happened");
    }

    #[test]
    fn threshold_boundaries() {
        let thresh = 0.8;
        let frames = single_point_frames(1, 20);

        let at_margin = matrix_with(20, &[((0, 6), thresh - 0.01)]);
        let record = identify_pierce(Some(&at_margin), &frames, thresh, 4, 10);
        assert_eq!(record.n_links, 0);
        assert_eq!(record.max_gln, thresh - 0.01);

        let above = matrix_with(20, &[((0, 6), thresh + 0.0001)]);
        let record = identify_pierce(Some(&above), &frames, thresh, 4, 10);
        assert_eq!(record.n_links, 1);
        // Window 0..=6, midpoint 3 is loop index 3, residue 3
        assert_eq!(record.regions.to_string(), "3-3");
        assert_eq!(record.max_tln, thresh + 0.0001);
        assert_eq!(record.min_residues, 2);
    }

    #[test]
    fn signed_extremes_are_kept() {
        let frames = single_point_frames(1, 20);
        let m = matrix_with(20, &[((1, 7), 0.9), ((2, 8), -1.2)]);
        let record = identify_pierce(Some(&m), &frames, 0.8, 4, 10);
        assert_eq!(record.max_gln, -1.2);
        assert_eq!(record.max_tln, -1.2);
        // Midpoints 4 and 5 form a single run
        assert_eq!(record.regions.to_string(), "4-5");
        assert_eq!(record.n_links, 1);
    }

    #[test]
    fn fallback_scan_catches_longer_windows() {
        let thresh = 0.8;
        let frames = single_point_frames(101, 50);
        // In-window peak at 0.95 of the threshold, the real link one window further
        let m = matrix_with(50, &[((5, 10), 0.95 * thresh), ((5, 15), 0.9)]);
        let record = identify_pierce(Some(&m), &frames, thresh, 4, 10);
        assert_eq!(record.n_links, 1);
        assert_eq!(record.max_tln, 0.95 * thresh);
        assert_eq!(record.max_gln, 0.9);
        // Window 5..=15, midpoint 10 is loop index 10, residue 110
        assert_eq!(record.regions.to_string(), "110-110");
        assert_eq!(record.min_residues, 4);

        // Without the near miss the fallback never runs
        let m = matrix_with(50, &[((5, 10), 0.5), ((5, 15), 0.9)]);
        let record = identify_pierce(Some(&m), &frames, thresh, 4, 10);
        assert_eq!(record.n_links, 0);
        assert!(record.regions.is_empty());
    }

    #[test]
    fn scan_end_is_clamped() {
        let frames = single_point_frames(1, 12);
        // The last column is reached through the clamp of i + j
        let m = matrix_with(12, &[((3, 11), 1.5)]);
        let record = identify_pierce(Some(&m), &frames, 0.8, 4, 36);
        assert_eq!(record.n_links, 1);
        // Midpoint 3 + round(4) = 7
        assert_eq!(record.regions.to_string(), "7-7");
        assert_eq!(record.min_residues, 3);
    }

    #[test]
    fn scan_is_deterministic() {
        let frames = single_point_frames(1, 40);
        let m = DMatrix::from_fn(40, 40, |i, j| ((i * 7 + j * 3) % 11) as f64 / 5.0 - 1.0);
        let first = identify_pierce(Some(&m), &frames, 0.8, 4, 36);
        let second = identify_pierce(Some(&m), &frames, 0.8, 4, 36);
        assert_eq!(first, second);
    }

    #[test]
    fn backbone_points_map_to_residues() {
        // Three points per residue, residues 1..=10
        let numbers: Vec<isize> = (1..=10).collect();
        let loops: Vec<usize> = (0..10).flat_map(|g| [g, g, g]).collect();
        let frames = ChainFrames::new(numbers, loops).unwrap();
        let m = matrix_with(30, &[((6, 18), 1.0)]);
        let record = identify_pierce(Some(&m), &frames, 0.8, 4, 36);
        // Midpoint 12 is loop index 12, the C atom of residue 4
        assert_eq!(record.regions.to_string(), "4-4");
        assert_eq!(record.min_residues, 4);
    }
}
