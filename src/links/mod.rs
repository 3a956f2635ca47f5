//! Topological links between the chains of a complex.

mod complex;
mod pair;
mod settings;
mod structs;

pub use complex::{ComplexResult, LinkComplex, PairOutcome};
pub use pair::evaluate_pair;
pub use settings::*;
pub use structs::PairResult;

use crate::engine::LinkingEngine;
use crate::error::LinkError;
use crate::structure::Backbone;
use pdbtbx::PDB;
use polars::prelude::*;

/// Find topological links between every chain pair of the first model of `pdb`.
///
/// Engine failures are kept per pair inside the returned [`ComplexResult`];
/// only a structure without models is an error.
pub fn get_topo_links(
    pdb: &PDB,
    params: &LinkParams,
    engine: &dyn LinkingEngine,
) -> Result<ComplexResult, LinkError> {
    let backbone = Backbone::from_pdb(pdb).ok_or(LinkError::EmptyStructure)?;
    Ok(LinkComplex::new(&backbone, params, engine).evaluate())
}

/// One row per successfully evaluated chain pair.
pub fn links_to_df(res: &ComplexResult) -> PolarsResult<DataFrame> {
    let rows: Vec<&PairResult> = res.successes().collect();
    df!(
        "pair" => rows.iter().map(|x| x.pair.key()).collect::<Vec<String>>(),
        "chain1" => rows.iter().map(|x| x.pair.first.to_owned()).collect::<Vec<String>>(),
        "chain2" => rows.iter().map(|x| x.pair.second.to_owned()).collect::<Vec<String>>(),
        "tln" => rows.iter().map(|x| x.tln as u32).collect::<Vec<u32>>(),
        "wholegln" => rows.iter().map(|x| x.whole_gln).collect::<Vec<f64>>(),
        "links1" => rows.iter().map(|x| x.first.n_links as u32).collect::<Vec<u32>>(),
        "links2" => rows.iter().map(|x| x.second.n_links as u32).collect::<Vec<u32>>(),
        "resid1" => rows.iter().map(|x| x.first.regions.to_string()).collect::<Vec<String>>(),
        "resid2" => rows.iter().map(|x| x.second.regions.to_string()).collect::<Vec<String>>(),
        "res_breaks" => rows.iter().map(|x| x.missing_residues as u32).collect::<Vec<u32>>(),
        "maxgln1" => rows.iter().map(|x| x.first.max_gln).collect::<Vec<f64>>(),
        "maxgln2" => rows.iter().map(|x| x.second.max_gln).collect::<Vec<f64>>(),
        "maxtln1" => rows.iter().map(|x| x.first.max_tln).collect::<Vec<f64>>(),
        "maxtln2" => rows.iter().map(|x| x.second.max_tln).collect::<Vec<f64>>(),
        "minres" => rows.iter().map(|x| x.min_residues as u32).collect::<Vec<u32>>(),
    )
}
