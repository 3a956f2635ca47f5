//! Files written for a chain pair in detail mode.

use crate::engine::LinkingMatrix;
use crate::interface::{ChainWindow, InterfacePair};
use crate::structure::Backbone;
use crate::utils::{write_df_to_file, DataFrameFileType};
use pdbtbx::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Windows with more points than this get a GLN map and a matrix file.
pub const MAP_MIN_POINTS: usize = 20;

/// Build the residues of `window` as `pdbtbx` residues, numbering atoms from `serial`.
fn window_residues(
    backbone: &Backbone,
    window: &ChainWindow,
    serial: &mut usize,
) -> Result<Vec<Residue>, String> {
    let chain = backbone
        .chain(&window.chain_id)
        .ok_or_else(|| format!("Chain {} is not in the structure", window.chain_id))?;

    chain.residues[window.lower..=window.upper]
        .iter()
        .map(|res| {
            let mut conformer = Conformer::new(res.name.as_str(), None, None)
                .ok_or_else(|| format!("Invalid residue name {}", res.name))?;
            for atom in &res.atoms {
                *serial += 1;
                let element = &atom.name[..1];
                let atom = Atom::new(
                    false,
                    *serial,
                    atom.name.as_str(),
                    atom.pos.x,
                    atom.pos.y,
                    atom.pos.z,
                    1.0,
                    0.0,
                    element,
                    0,
                )
                .ok_or_else(|| format!("Invalid atom {} in residue {}", atom.name, res.number))?;
                conformer.add_atom(atom);
            }
            Residue::new(res.number, res.insertion.as_deref(), Some(conformer))
                .ok_or_else(|| format!("Invalid residue {}", res.number))
        })
        .collect()
}

/// Write the backbone atoms of both interface windows to
/// `inter_selected_<key>.pdb` inside `dir`.
pub fn write_interface_pdb(
    dir: &Path,
    key: &str,
    backbone: &Backbone,
    interface: &InterfacePair,
) -> Result<PathBuf, String> {
    let mut model = Model::new(1);
    let mut serial = 0;
    for window in [&interface.first, &interface.second] {
        let mut chain = Chain::new(window.chain_id.as_str())
            .ok_or_else(|| format!("Invalid chain id {}", window.chain_id))?;
        for residue in window_residues(backbone, window, &mut serial)? {
            chain.add_residue(residue);
        }
        model.add_chain(chain);
    }
    let mut pdb = PDB::new();
    pdb.add_model(model);

    let path = dir.join(format!("inter_selected_{key}.pdb"));
    pdbtbx::save_pdb(&pdb, path.to_string_lossy(), StrictnessLevel::Loose).map_err(|errors| {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    })?;
    Ok(path)
}

/// Convert a linking matrix into a long-format DataFrame with columns
/// `start`, `end` and `gln`.
pub fn matrix_to_df(matrix: &LinkingMatrix) -> PolarsResult<DataFrame> {
    let (nrows, ncols) = matrix.shape();
    let cells: Vec<(u32, u32)> = (0..nrows)
        .flat_map(|i| (0..ncols).map(move |j| (i as u32, j as u32)))
        .collect();
    df!(
        "start" => cells.iter().map(|c| c.0).collect::<Vec<u32>>(),
        "end" => cells.iter().map(|c| c.1).collect::<Vec<u32>>(),
        "gln" => cells.iter().map(|c| matrix[(c.0 as usize, c.1 as usize)]).collect::<Vec<f64>>(),
    )
}

/// Write a linking matrix to `<dir>/<name>.csv`.
pub fn write_matrix(dir: &Path, name: &str, matrix: &LinkingMatrix) -> PolarsResult<PathBuf> {
    let mut df = matrix_to_df(matrix)?;
    let path = dir.join(name);
    write_df_to_file(&mut df, &path, DataFrameFileType::Csv)?;
    Ok(path.with_extension(DataFrameFileType::Csv.to_string()))
}
