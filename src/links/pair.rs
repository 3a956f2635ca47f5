use super::settings::LinkParams;
use super::structs::PairResult;
use crate::artifacts::{write_interface_pdb, write_matrix, MAP_MIN_POINTS};
use crate::engine::{validate_output, LinkingEngine, LinkingOutput};
use crate::error::EngineError;
use crate::interface::{select_interface, ChainWindow, InterfaceSelection};
use crate::pairs::ChainPair;
use crate::piercing::identify_pierce;
use crate::structure::Backbone;
use std::path::Path;
use tracing::{debug, warn};

/// Record a problem that does not invalidate the numeric result.
fn soft_failure(warnings: &mut Vec<String>, msg: String) {
    warn!("{msg}");
    warnings.push(msg);
}

/// Run the engine with `primary` as the fixed curve and `test` as the scanned one.
///
/// In detail mode a long enough primary window also asks the engine for its
/// map and stores the matrix next to it.
fn directional_linking(
    engine: &dyn LinkingEngine,
    primary: &ChainWindow,
    test: &ChainWindow,
    key: &str,
    detail_dir: Option<&Path>,
    warnings: &mut Vec<String>,
) -> Result<LinkingOutput, EngineError> {
    let artifact_dir = detail_dir.filter(|_| primary.coords.len() > MAP_MIN_POINTS);
    let map_file = artifact_dir.map(|dir| dir.join(format!("{key}-glnmap-{}", test.chain_id)));

    let output = engine.linking_matrix(&primary.coords, &test.coords, map_file.as_deref())?;
    validate_output(&output, test.coords.len())?;

    if let Some(dir) = artifact_dir {
        let name = format!("{key}-matrix-{}", test.chain_id);
        if let Err(e) = write_matrix(dir, &name, &output.matrix) {
            soft_failure(warnings, format!("Failed to write matrix {name}: {e}"));
        }
    }
    Ok(output)
}

/// Evaluate the topological links between the two chains of `pair`.
///
/// A pair without a usable interface gets a zero-filled result. Otherwise the
/// engine is called once per direction, and each chain is scanned with the
/// matrix in which it is the test curve. Only engine failures are errors;
/// problems with detail files end up in [`PairResult::warnings`].
pub fn evaluate_pair(
    backbone: &Backbone,
    pair: &ChainPair,
    params: &LinkParams,
    engine: &dyn LinkingEngine,
) -> Result<PairResult, EngineError> {
    let selection = select_interface(
        backbone,
        &pair.first,
        &pair.second,
        params.dist_cutoff,
        params.terminal_trim,
    );
    let interface = match selection {
        InterfaceSelection::Usable(interface) => interface,
        InterfaceSelection::NoUsableInterface { missing_residues } => {
            debug!("No usable interface for chains {pair}");
            return Ok(PairResult::unlinked(
                pair.clone(),
                missing_residues,
                params.scan_end,
            ));
        }
    };

    let key = pair.key();
    let mut warnings = Vec::new();
    let mut detail_dir = params.detail.then_some(params.outpath.as_path());
    if let Some(dir) = detail_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            soft_failure(
                &mut warnings,
                format!("Cannot create detail directory {}: {e}", dir.display()),
            );
            detail_dir = None;
        } else if let Err(e) = write_interface_pdb(dir, &key, backbone, &interface) {
            soft_failure(
                &mut warnings,
                format!("Failed to write interface structure of {key}: {e}"),
            );
        }
    }

    let on_second = directional_linking(
        engine,
        &interface.first,
        &interface.second,
        &key,
        detail_dir,
        &mut warnings,
    )?;
    let on_first = directional_linking(
        engine,
        &interface.second,
        &interface.first,
        &key,
        detail_dir,
        &mut warnings,
    )?;

    let first = identify_pierce(
        Some(&on_first.matrix),
        &interface.first.frames,
        params.thresh_score,
        params.scan_begin,
        params.scan_end,
    );
    let second = identify_pierce(
        Some(&on_second.matrix),
        &interface.second.frames,
        params.thresh_score,
        params.scan_begin,
        params.scan_end,
    );
    debug!(
        "Chains {pair}: {} link(s) on {}, {} on {}",
        first.n_links, pair.first, second.n_links, pair.second
    );

    let mut result = PairResult::from_records(
        pair.clone(),
        on_second.whole,
        first,
        second,
        interface.missing_residues,
    );
    result.warnings = warnings;
    Ok(result)
}
