use crate::error::LinkError;
use pdbtbx::*;
use polars::prelude::*;
use std::path::Path;

/// Residue names accepted as amino acids when loading a structure.
const AMINO_ACIDS: [&str; 22] = [
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", "MSE", "SEC",
];

/// Open an atomic data file with [`pdbtbx::ReadOptions`] and remove non-protein residues.
///
/// Parser warnings are returned next to the structure; a file that cannot be
/// parsed at all gives [`LinkError::Structure`].
pub fn load_model(input_file: &str) -> Result<(PDB, Vec<PDBError>), LinkError> {
    let (mut pdb, errors) = pdbtbx::ReadOptions::default()
        .set_only_atomic_coords(true)
        .set_level(pdbtbx::StrictnessLevel::Loose)
        .read(input_file)
        .map_err(|errors| LinkError::Structure {
            path: input_file.to_string(),
            messages: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;

    // Remove non-protein residues from model
    pdb.remove_residues_by(|res| {
        !res.name()
            .is_some_and(|name| AMINO_ACIDS.contains(&name.to_uppercase().as_str()))
    });

    Ok((pdb, errors))
}

/// Run `op` inside a rayon pool with `num_threads` workers (0 means all cores).
pub fn run_with_threads<T, F>(num_threads: usize, op: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(op),
        // Fall back to the global pool
        Err(_) => op(),
    }
}

/// Python-style `round`: halfway cases go to the even neighbour.
pub(crate) fn round_half_even(x: f64) -> usize {
    x.round_ties_even().max(0.0) as usize
}

/// Write a DataFrame to a file, with the extension taken from `file_type`.
pub fn write_df_to_file(
    df: &mut DataFrame,
    file_path: &Path,
    file_type: DataFrameFileType,
) -> PolarsResult<()> {
    let file_suffix = file_type.to_string();
    let mut file = std::fs::File::create(file_path.with_extension(file_suffix))?;
    match file_type {
        DataFrameFileType::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        DataFrameFileType::NDJson => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
    }
    Ok(())
}

/// File format for writing DataFrames.
#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum DataFrameFileType {
    /// Comma-separated values
    Csv,
    /// Parquet columnar storage
    Parquet,
    /// Standard JSON
    Json,
    /// Newline-delimited JSON
    NDJson,
}

impl std::fmt::Display for DataFrameFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataFrameFileType::Csv => write!(f, "csv"),
            DataFrameFileType::Parquet => write!(f, "parquet"),
            DataFrameFileType::Json => write!(f, "json"),
            DataFrameFileType::NDJson => write!(f, "ndjson"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_matches_half_even() {
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(3.5), 4);
        assert_eq!(round_half_even(0.5), 0);
        assert_eq!(round_half_even(24.0), 24);
        assert_eq!(round_half_even(5.0 / 3.0), 2);
        assert_eq!(round_half_even(-1.0), 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let res = load_model("/nonexistent/structure.pdb");
        assert!(
            matches!(res, Err(LinkError::Structure { .. })),
            "Expected a structure error for a missing file"
        );
    }

    #[test]
    fn thread_pool_runs_closure() {
        let n = run_with_threads(2, rayon::current_num_threads);
        assert_eq!(n, 2);
    }

    #[test]
    fn df_written_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = df!("a" => [1i32, 2, 3]).unwrap();
        write_df_to_file(&mut df, &dir.path().join("table"), DataFrameFileType::Csv).unwrap();
        let content = std::fs::read_to_string(dir.path().join("table.csv")).unwrap();
        assert!(content.starts_with("a\n1\n"), "Unexpected CSV: {content}");
    }
}
