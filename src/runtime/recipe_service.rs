use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::session::{FitSession, Preview};
use crate::workflow::{
    MapExport, PipelineError, SessionRecipe, SessionReport, load_recipe, run_recipe, save_report,
};

use super::{IoService, OpsService, Result};

#[derive(Debug, Clone, Default)]
pub struct RecipeService {
    io: IoService,
    ops: OpsService,
}

impl RecipeService {
    pub fn new(ops: OpsService) -> Self {
        Self { io: IoService, ops }
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<SessionRecipe> {
        Ok(load_recipe(path)?)
    }

    /// Reads `input` and the recipe's IRF, replays the recipe and writes its exports.
    pub fn run(
        &self,
        recipe: &SessionRecipe,
        input: impl AsRef<Path>,
    ) -> Result<(FitSession, SessionReport)> {
        let dataset = self.io.read(input)?;
        let irf = match &recipe.irf {
            Some(irf) => Some(self.io.read(&irf.path)?),
            None => None,
        };
        let (mut session, mut report) =
            run_recipe(recipe, &dataset, irf.as_ref(), self.ops.session_services())?;
        report.exports = self.export_maps(&mut session, &recipe.exports)?;
        Ok((session, report))
    }

    /// Writes each requested preview map. Maps that are not ready yet are skipped.
    pub fn export_maps(
        &self,
        session: &mut FitSession,
        exports: &[MapExport],
    ) -> Result<Vec<PathBuf>> {
        let options = session.preview_options();
        let mut written = Vec::with_capacity(exports.len());
        for export in exports {
            let index = options
                .iter()
                .position(|label| *label == export.option)
                .ok_or_else(|| {
                    PipelineError::Parse(format!(
                        "no preview option `{}` (have {})",
                        export.option,
                        options.join(", ")
                    ))
                })?;
            match session.preview_image(index)? {
                Preview::Ready(map) => {
                    self.io.write_map(&export.path, &map)?;
                    info!("wrote {} to {}", export.option, export.path.display());
                    written.push(export.path.clone());
                }
                Preview::NotReady => {
                    warn!("{} is not ready, skipping {}", export.option, export.path.display());
                }
            }
        }
        Ok(written)
    }

    pub fn save_report(&self, path: impl AsRef<Path>, report: &SessionReport) -> Result<()> {
        save_report(path, report)?;
        Ok(())
    }
}
