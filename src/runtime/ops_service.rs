use std::sync::Arc;

use crate::ops::AlgorithmRegistry;
use crate::session::SessionServices;

/// Fit algorithms shared by every session the application opens.
#[derive(Debug, Clone, Default)]
pub struct OpsService {
    algorithms: Arc<AlgorithmRegistry>,
}

impl OpsService {
    pub fn new(algorithms: AlgorithmRegistry) -> Self {
        Self {
            algorithms: Arc::new(algorithms),
        }
    }

    pub fn list(&self) -> Vec<&'static str> {
        self.algorithms.names()
    }

    pub fn algorithms(&self) -> &Arc<AlgorithmRegistry> {
        &self.algorithms
    }

    pub fn session_services(&self) -> SessionServices {
        SessionServices::new(Arc::clone(&self.algorithms))
    }
}
