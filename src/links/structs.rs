use crate::pairs::ChainPair;
use crate::piercing::PiercingRecord;
use std::fmt;

/// Topological link result of one chain pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairResult {
    /// The chains, in enumeration order
    pub pair: ChainPair,
    /// Number of links: the larger loop count of the two directions
    pub tln: usize,
    /// Linking number of the two whole interface windows
    pub whole_gln: f64,
    /// Piercing record of the first chain
    pub first: PiercingRecord,
    /// Piercing record of the second chain
    pub second: PiercingRecord,
    /// Residue numbers missing from both chains
    pub missing_residues: usize,
    /// Smaller of the two per-chain minimal loop lengths
    pub min_residues: usize,
    /// Non-fatal problems met while writing detail files
    pub warnings: Vec<String>,
}

impl PairResult {
    /// Zero-filled result for a pair without a usable interface.
    pub fn unlinked(pair: ChainPair, missing_residues: usize, scan_end: usize) -> Self {
        let first = PiercingRecord::unlinked(scan_end);
        let second = PiercingRecord::unlinked(scan_end);
        let min_residues = first.min_residues.min(second.min_residues);
        Self {
            pair,
            tln: 0,
            whole_gln: 0.0,
            first,
            second,
            missing_residues,
            min_residues,
            warnings: Vec::new(),
        }
    }

    /// Combine the two directional records of a pair.
    pub fn from_records(
        pair: ChainPair,
        whole_gln: f64,
        first: PiercingRecord,
        second: PiercingRecord,
        missing_residues: usize,
    ) -> Self {
        Self {
            tln: first.n_links.max(second.n_links),
            min_residues: first.min_residues.min(second.min_residues),
            pair,
            whole_gln,
            first,
            second,
            missing_residues,
            warnings: Vec::new(),
        }
    }

    /// `true` if at least one loop of either chain is pierced.
    pub fn is_linked(&self) -> bool {
        self.tln > 0
    }
}

/// Record in the keyed form used by summary files, e.g.
/// `{'tln': 1, 'wholegln': 0.93, 'chain_A': 1, 'chain_B': 0, ...}`.
impl fmt::Display for PairResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = (&self.pair.first, &self.pair.second);
        write!(
            f,
            "{{'tln': {}, 'wholegln': {}, 'chain_{a}': {}, 'chain_{b}': {}, \
             'resid_chain_{a}': '{}', 'resid_chain_{b}': '{}', 'res_breaks': {}, \
             'maxgln_{a}': {}, 'maxgln_{b}': {}, 'maxtln_{a}': {}, 'maxtln_{b}': {}, \
             'minres': {}}}",
            self.tln,
            self.whole_gln,
            self.first.n_links,
            self.second.n_links,
            self.first.regions,
            self.second.regions,
            self.missing_residues,
            self.first.max_gln,
            self.second.max_gln,
            self.first.max_tln,
            self.second.max_tln,
            self.min_residues,
        )
    }
}
