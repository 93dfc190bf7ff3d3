use super::{IoService, OpsService, RecipeService};

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    io_service: IoService,
    ops_service: OpsService,
    recipe_service: RecipeService,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose sessions dispatch to `ops`.
    pub fn with_ops(ops: OpsService) -> Self {
        Self {
            io_service: IoService,
            recipe_service: RecipeService::new(ops.clone()),
            ops_service: ops,
        }
    }

    pub fn io_service(&self) -> &IoService {
        &self.io_service
    }

    pub fn ops_service(&self) -> &OpsService {
        &self.ops_service
    }

    pub fn recipe_service(&self) -> &RecipeService {
        &self.recipe_service
    }
}
