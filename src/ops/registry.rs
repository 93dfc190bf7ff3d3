use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::flim::{FitParams, FitResults};

use super::{FitAlgorithm, OpsError, Result};

type Registry = HashMap<&'static str, Arc<dyn FitAlgorithm>>;

/// Fit algorithms keyed by the name the session dispatches with.
///
/// Starts empty; the host registers the numerical routines it ships.
#[derive(Clone, Default)]
pub struct AlgorithmRegistry {
    algorithms: Registry,
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AlgorithmRegistry")
            .field("algorithms", &self.names())
            .finish()
    }
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<A: FitAlgorithm + 'static>(&mut self, algorithm: A) {
        self.register_shared(Arc::new(algorithm));
    }

    pub fn register_shared(&mut self, algorithm: Arc<dyn FitAlgorithm>) {
        self.algorithms.insert(algorithm.name(), algorithm);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FitAlgorithm>> {
        self.algorithms.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.algorithms.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self.algorithms.keys().copied().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn run(&self, name: &str, params: &FitParams) -> Result<FitResults> {
        let algorithm = self
            .get(name)
            .ok_or_else(|| OpsError::UnknownAlgorithm(name.to_string()))?;
        debug!(
            "dispatching `{name}` over {:?} with {} parameters",
            params.trans_map.as_ref().map(|view| view.shape().to_vec()),
            params.n_param()
        );
        algorithm.fit(params)
    }
}
