//! Interface selection for a chain pair.
//!
//! For each chain the residues in contact with the partner chain define a
//! window of global residue indices. Chain termini are trimmed from that
//! window, and the backbone atoms inside it become the curve handed to the
//! linking engine. Three index frames are involved:
//!
//! - the *loop index*, 1-based over the window's backbone atoms,
//! - the *global index*, 0-based over the chain's residues,
//! - the *residue number* written in the structure file.
//!
//! [`ChainFrames`] holds the lookup tables between them.

use crate::structure::{Backbone, BackboneChain, Coord};
use rstar::RTree;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Index tables of one chain for one pair analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainFrames {
    /// Residue number of every global index of the full chain
    residue_numbers: Vec<isize>,
    /// Global index of every loop index; loop index `l` lives at `l - 1`
    loop_to_global: Vec<usize>,
    /// Residue numbers present in the chain, for gap tests
    present: BTreeSet<isize>,
}

impl ChainFrames {
    /// Build the tables, checking that every loop index maps into the chain
    /// and that loop indices walk the chain forward.
    pub fn new(residue_numbers: Vec<isize>, loop_to_global: Vec<usize>) -> Option<Self> {
        let in_range = loop_to_global.iter().all(|&g| g < residue_numbers.len());
        let forward = loop_to_global.windows(2).all(|w| w[0] <= w[1]);
        if !(in_range && forward) {
            return None;
        }
        let present = residue_numbers.iter().copied().collect();
        Some(Self {
            residue_numbers,
            loop_to_global,
            present,
        })
    }

    /// Number of loop indices, i.e. points of the scanned curve.
    pub fn n_points(&self) -> usize {
        self.loop_to_global.len()
    }

    /// Global index of a 1-based loop index.
    pub fn global_index(&self, loop_index: usize) -> Option<usize> {
        loop_index
            .checked_sub(1)
            .and_then(|l| self.loop_to_global.get(l))
            .copied()
    }

    /// Residue number of a global index.
    pub fn residue_number(&self, global_index: usize) -> Option<isize> {
        self.residue_numbers.get(global_index).copied()
    }

    /// Residue number reached from a 1-based loop index.
    pub fn loop_residue_number(&self, loop_index: usize) -> Option<isize> {
        self.global_index(loop_index)
            .and_then(|g| self.residue_number(g))
    }

    /// Whether `number` is a residue number of the full chain.
    pub fn has_residue_number(&self, number: isize) -> bool {
        self.present.contains(&number)
    }

    /// Residue numbers indexed by global index.
    pub fn residue_numbers(&self) -> &[isize] {
        &self.residue_numbers
    }
}

/// The trimmed interface window of one chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainWindow {
    /// Chain identifier
    pub chain_id: String,
    /// First global index of the window
    pub lower: usize,
    /// Last global index of the window, inclusive
    pub upper: usize,
    /// Backbone coordinates of the window in loop-index order
    pub coords: Vec<Coord>,
    /// Index tables
    pub frames: ChainFrames,
}

/// Both windows of a pair with a usable interface.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfacePair {
    /// Window on the first chain
    pub first: ChainWindow,
    /// Window on the second chain
    pub second: ChainWindow,
    /// Residue numbers missing from both chains
    pub missing_residues: usize,
}

/// Outcome of interface selection.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceSelection {
    /// Both chains have a window worth scanning.
    Usable(InterfacePair),
    /// No contact between the chains, or a window vanished after trimming.
    NoUsableInterface {
        /// Residue numbers missing from both chains
        missing_residues: usize,
    },
}

impl InterfaceSelection {
    /// Missing residue count on either path.
    pub fn missing_residues(&self) -> usize {
        match self {
            InterfaceSelection::Usable(pair) => pair.missing_residues,
            InterfaceSelection::NoUsableInterface { missing_residues } => *missing_residues,
        }
    }
}

/// Global indices of the residues of `chain` with an atom within `cutoff` of `partner`.
fn contact_residues(chain: &BackboneChain, partner: &BackboneChain, cutoff: f64) -> Vec<usize> {
    let tree: RTree<[f64; 3]> = RTree::bulk_load(
        partner
            .indexed_atoms()
            .map(|(_, a)| [a.pos.x, a.pos.y, a.pos.z])
            .collect(),
    );
    let max_radius_squared = cutoff * cutoff;

    chain
        .indexed_atoms()
        .filter(|(_, a)| {
            tree.locate_within_distance([a.pos.x, a.pos.y, a.pos.z], max_radius_squared)
                .next()
                .is_some()
        })
        .map(|(i, _)| i)
        .collect()
}

/// Push contact bounds `[lo, hi]` inward when they lie within `ter_rm` of the chain ends.
///
/// Returns `None` when nothing is left of the window.
pub fn trim_terminals(lo: usize, hi: usize, n_residues: usize, ter_rm: usize) -> Option<(usize, usize)> {
    if n_residues == 0 {
        return None;
    }
    let chain_max = n_residues - 1;
    let lo = if lo <= ter_rm { ter_rm } else { lo };
    let hi = if chain_max.saturating_sub(hi) <= ter_rm {
        chain_max.saturating_sub(ter_rm)
    } else {
        hi
    };
    if hi <= lo {
        return None;
    }
    Some((lo, hi))
}

/// Window of `chain` covering residues `lower..=upper`.
fn build_window(chain: &BackboneChain, lower: usize, upper: usize) -> Option<ChainWindow> {
    let (loop_to_global, coords): (Vec<usize>, Vec<Coord>) = chain
        .indexed_atoms()
        .filter(|(i, _)| (lower..=upper).contains(i))
        .map(|(i, a)| (i, a.pos))
        .unzip();
    let frames = ChainFrames::new(chain.residue_numbers(), loop_to_global)?;
    Some(ChainWindow {
        chain_id: chain.id.clone(),
        lower,
        upper,
        coords,
        frames,
    })
}

/// Select the interface windows of chains `id1` and `id2`.
///
/// `dist_cutoff` is the contact distance in Å and `ter_rm` the number of
/// residues treated as floppy terminus on each chain end.
pub fn select_interface(
    backbone: &Backbone,
    id1: &str,
    id2: &str,
    dist_cutoff: f64,
    ter_rm: usize,
) -> InterfaceSelection {
    let (chain1, chain2) = match (backbone.chain(id1), backbone.chain(id2)) {
        (Some(c1), Some(c2)) => (c1, c2),
        _ => return InterfaceSelection::NoUsableInterface { missing_residues: 0 },
    };

    let missing_residues = chain1.missing_residues() + chain2.missing_residues();
    let no_interface = InterfaceSelection::NoUsableInterface { missing_residues };

    let contacts1 = contact_residues(chain1, chain2, dist_cutoff);
    let contacts2 = contact_residues(chain2, chain1, dist_cutoff);
    let bounds = |contacts: &[usize]| -> Option<(usize, usize)> {
        Some((*contacts.iter().min()?, *contacts.iter().max()?))
    };
    let (Some((lo1, hi1)), Some((lo2, hi2))) = (bounds(&contacts1[..]), bounds(&contacts2[..])) else {
        debug!("No contacts within {dist_cutoff} Å between chains {id1} and {id2}");
        return no_interface;
    };
    trace!("Contact bounds {id1}: {lo1}..{hi1}, {id2}: {lo2}..{hi2}");

    let trimmed1 = trim_terminals(lo1, hi1, chain1.residues.len(), ter_rm);
    let trimmed2 = trim_terminals(lo2, hi2, chain2.residues.len(), ter_rm);
    let (Some((lo1, hi1)), Some((lo2, hi2))) = (trimmed1, trimmed2) else {
        debug!("Interface of chains {id1} and {id2} vanishes after trimming {ter_rm} terminal residues");
        return no_interface;
    };

    match (
        build_window(chain1, lo1, hi1),
        build_window(chain2, lo2, hi2),
    ) {
        (Some(first), Some(second)) => {
            debug!(
                "Interface windows {id1}: {lo1}..={hi1} ({} points), {id2}: {lo2}..={hi2} ({} points)",
                first.coords.len(),
                second.coords.len()
            );
            InterfaceSelection::Usable(InterfacePair {
                first,
                second,
                missing_residues,
            })
        }
        _ => no_interface,
    }
}
