use super::pair::evaluate_pair;
use super::settings::LinkParams;
use super::structs::PairResult;
use crate::engine::LinkingEngine;
use crate::error::EngineError;
use crate::pairs::{chain_pairs, ChainPair};
use crate::structure::Backbone;
use rayon::prelude::*;
use tracing::{debug, error, warn};

/// Outcome of one chain pair of a complex.
#[derive(Debug)]
pub struct PairOutcome {
    /// The chains evaluated
    pub pair: ChainPair,
    /// The result, or the engine failure that prevented it
    pub result: Result<PairResult, EngineError>,
}

/// Results of every chain pair of a complex, in enumeration order.
#[derive(Debug, Default)]
pub struct ComplexResult {
    outcomes: Vec<PairOutcome>,
}

impl ComplexResult {
    /// Number of evaluated pairs.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// `true` if the structure had fewer than two chains.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// All outcomes in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &PairOutcome> + '_ {
        self.outcomes.iter()
    }

    /// Outcome of the pair with the given key, e.g. `"AB"`.
    pub fn get(&self, key: &str) -> Option<&Result<PairResult, EngineError>> {
        self.outcomes
            .iter()
            .find(|o| o.pair.key() == key)
            .map(|o| &o.result)
    }

    /// Successful pair results in enumeration order.
    pub fn successes(&self) -> impl Iterator<Item = &PairResult> + '_ {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

/// A structure prepared for link detection over all of its chain pairs.
pub struct LinkComplex<'a> {
    /// Backbone of the structure
    pub backbone: &'a Backbone,
    /// Scan parameters shared by every pair
    pub params: &'a LinkParams,
    /// Engine providing linking matrices
    pub engine: &'a dyn LinkingEngine,
}

impl<'a> LinkComplex<'a> {
    /// Bundle a backbone with the parameters and engine used for every pair.
    pub fn new(backbone: &'a Backbone, params: &'a LinkParams, engine: &'a dyn LinkingEngine) -> Self {
        Self {
            backbone,
            params,
            engine,
        }
    }

    /// Chain pairs to evaluate, in first-seen chain order.
    pub fn pairs(&self) -> Vec<ChainPair> {
        chain_pairs(&self.backbone.chain_ids())
    }

    /// Evaluate every chain pair.
    ///
    /// Pairs run in parallel on the current rayon pool; the result keeps the
    /// enumeration order. A failing pair does not affect the others.
    pub fn evaluate(&self) -> ComplexResult {
        let pairs = self.pairs();
        if pairs.is_empty() {
            warn!("The input structure may not be a complex");
            return ComplexResult::default();
        }
        debug!("Evaluating {} chain pair(s)", pairs.len());

        let outcomes = pairs
            .into_par_iter()
            .map(|pair| {
                let result = evaluate_pair(self.backbone, &pair, self.params, self.engine);
                if let Err(e) = &result {
                    error!("Chains {pair}: {e}");
                }
                PairOutcome { pair, result }
            })
            .collect();
        ComplexResult { outcomes }
    }
}
