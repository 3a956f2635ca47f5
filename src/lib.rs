#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

//! # Topolinks Library
//!
//! This library detects topological links between the chains of protein
//! complexes: one chain threading through a loop closed by another. Chain
//! pairs are reduced to their interface windows, a Gauss linking number (GLN)
//! engine scores every sub-chain of one chain against the other, and windows
//! scoring above a threshold mark the pierced residues.
//!
//! Results come back as a [`ComplexResult`] and can be turned into a Polars
//! DataFrame with [`links_to_df`].

mod artifacts;
mod engine;
mod error;
mod interface;
mod links;
mod pairs;
mod piercing;
mod report;
mod structure;
mod utils;

// Re-export key public types
pub use artifacts::{matrix_to_df, write_interface_pdb, write_matrix, MAP_MIN_POINTS};
pub use engine::{validate_output, ExternalEngine, LinkingEngine, LinkingMatrix, LinkingOutput};
pub use error::{EngineError, LinkError};
pub use interface::{
    select_interface, trim_terminals, ChainFrames, ChainWindow, InterfacePair, InterfaceSelection,
};
pub use links::{
    evaluate_pair, get_topo_links, links_to_df, ComplexResult, LinkComplex, LinkParams,
    PairOutcome, PairResult, DIST_CUTOFF, OUTPATH, SCAN_BEGIN, SCAN_END, TERMINAL_TRIM,
    THRESH_SCORE,
};
pub use pairs::{chain_pairs, ChainPair};
pub use piercing::{
    default_min_residues, identify_pierce, PierceInterval, PierceRegions, PiercingRecord,
};
pub use report::{append_summary, write_summary, SUMMARY_FILE};
pub use structure::{
    Backbone, BackboneAtom, BackboneChain, BackboneResidue, Coord, BACKBONE_ATOMS,
};
pub use utils::{load_model, run_with_threads, write_df_to_file, DataFrameFileType};
