//! Seam to the Gauss linking number (GLN) engine.
//!
//! The crate does not evaluate linking integrals itself. A [`LinkingEngine`]
//! receives two open curves and returns, for every sub-chain `i..=j` of the
//! *test* curve, its linking number with the whole *primary* curve, plus the
//! linking number of the two complete curves.
//!
//! [`ExternalEngine`] talks to any program speaking a small JSON protocol on
//! stdin/stdout; `scripts/gln_engine.py` bridges it to a GLN library.

use crate::error::EngineError;
use crate::structure::Coord;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::trace;

/// Linking numbers indexed by `(sub-chain start, sub-chain end)` on the test curve.
pub type LinkingMatrix = DMatrix<f64>;

/// Result of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkingOutput {
    /// Sub-chain linking numbers, square with one row per test point
    pub matrix: LinkingMatrix,
    /// Linking number between the two whole curves
    pub whole: f64,
}

/// A provider of linking-number matrices.
pub trait LinkingEngine: Sync {
    /// Compute the linking matrix of `test` against `primary`.
    ///
    /// When `map_file` is given the engine should also render its spatial map
    /// of the matrix to that path.
    fn linking_matrix(
        &self,
        primary: &[Coord],
        test: &[Coord],
        map_file: Option<&Path>,
    ) -> Result<LinkingOutput, EngineError>;
}

/// Check that an engine answer fits a test curve of `n_points`.
pub fn validate_output(output: &LinkingOutput, n_points: usize) -> Result<(), EngineError> {
    let (rows, cols) = output.matrix.shape();
    if rows != n_points || cols != n_points {
        return Err(EngineError::Malformed(format!(
            "expected a {n_points}x{n_points} matrix, got {rows}x{cols}"
        )));
    }
    if !output.whole.is_finite() || output.matrix.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::Malformed(
            "matrix contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct EngineRequest<'a> {
    chain1: Vec<[f64; 3]>,
    chain2: Vec<[f64; 3]>,
    map_filename: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EngineResponse {
    matrix: Vec<Vec<f64>>,
    whole: f64,
}

impl TryFrom<EngineResponse> for LinkingOutput {
    type Error = EngineError;

    fn try_from(resp: EngineResponse) -> Result<Self, Self::Error> {
        let nrows = resp.matrix.len();
        let ncols = resp.matrix.first().map_or(0, |r| r.len());
        if let Some(row) = resp.matrix.iter().position(|r| r.len() != ncols) {
            return Err(EngineError::Malformed(format!(
                "row {row} has {} columns, expected {ncols}",
                resp.matrix[row].len()
            )));
        }
        Ok(LinkingOutput {
            matrix: DMatrix::from_row_iterator(nrows, ncols, resp.matrix.into_iter().flatten()),
            whole: resp.whole,
        })
    }
}

/// Engine backed by an external program.
///
/// The program reads one JSON object
/// `{"chain1": [[x, y, z], ...], "chain2": [...], "map_filename": str | null}`
/// from stdin, where `chain1` is the primary and `chain2` the test curve, and
/// writes `{"matrix": [[...], ...], "whole": float}` to stdout.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalEngine {
    /// Engine running `program` with extra `args`.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl LinkingEngine for ExternalEngine {
    fn linking_matrix(
        &self,
        primary: &[Coord],
        test: &[Coord],
        map_file: Option<&Path>,
    ) -> Result<LinkingOutput, EngineError> {
        let map_filename = map_file.map(|p| p.to_string_lossy().into_owned());
        let request = EngineRequest {
            chain1: primary.iter().map(|c| [c.x, c.y, c.z]).collect(),
            chain2: test.iter().map(|c| [c.x, c.y, c.z]).collect(),
            map_filename: map_filename.as_deref(),
        };
        let payload = serde_json::to_vec(&request)?;

        trace!(
            "Running {} on curves of {} and {} points",
            self.program.display(),
            primary.len(),
            test.len()
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        // Dropping stdin closes the pipe so the engine sees EOF. A failed write
        // usually means the engine already exited; its status explains why.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(EngineError::Status {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let response: EngineResponse = serde_json::from_slice(&output.stdout)?;
        let linking = LinkingOutput::try_from(response)?;
        validate_output(&linking, test.len())?;
        Ok(linking)
    }
}
