use clap::Parser;
use std::path::PathBuf;
use topolinks::{chain_pairs, load_model, Backbone, LinkError};
use tracing::{error, trace};

#[derive(Parser, Debug, Clone)]
pub(crate) struct Args {
    /// PDB or mmCIF files to inspect
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

/// Chain pair keys of one structure, space separated.
fn pair_line(input_file: &str) -> Result<String, LinkError> {
    let (pdb, _) = load_model(input_file)?;
    let backbone = Backbone::from_pdb(&pdb).ok_or(LinkError::EmptyStructure)?;
    let pairs = chain_pairs(&backbone.chain_ids());
    if pairs.is_empty() {
        return Ok("not a complex".to_string());
    }
    Ok(pairs
        .iter()
        .map(|p| p.key())
        .collect::<Vec<_>>()
        .join(" "))
}

pub(crate) fn run(args: &Args) -> Result<(), LinkError> {
    trace!("{args:?}");

    for input in &args.inputs {
        let input_file = input.to_string_lossy();
        match pair_line(&input_file) {
            Ok(line) => println!("{input_file}: {line}"),
            Err(e) => error!("{e}"),
        }
    }
    Ok(())
}
