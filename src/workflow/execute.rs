use std::time::Instant;

use log::{debug, info};

use crate::model::DatasetF32;
use crate::session::{FitSession, SessionServices};

use super::{PipelineError, Result, SessionRecipe, SessionReport, StepReport};

fn timed<T>(
    steps: &mut Vec<StepReport>,
    step: &str,
    run: impl FnOnce() -> crate::session::Result<T>,
) -> Result<T> {
    let started = Instant::now();
    let value = run()?;
    let duration_ms = started.elapsed().as_millis();
    debug!("recipe step `{step}` took {duration_ms} ms");
    steps.push(StepReport {
        step: step.to_string(),
        duration_ms,
    });
    Ok(value)
}

/// Replays `recipe` against `dataset` and returns the resulting session with its report.
///
/// `irf` must be given when the recipe names one.
pub fn run_recipe(
    recipe: &SessionRecipe,
    dataset: &DatasetF32,
    irf: Option<&DatasetF32>,
    services: SessionServices,
) -> Result<(FitSession, SessionReport)> {
    recipe.validate()?;
    dataset.validate()?;
    let harvester = recipe.harvester();
    let mut steps = Vec::new();

    let mut session = timed(&mut steps, "configure", || {
        FitSession::configure(dataset, &recipe.axes, &harvester, services)
    })?;

    if recipe.binning > 0 {
        timed(&mut steps, "binning", || session.set_binning(recipe.binning))?;
    }
    if let Some(rect) = recipe.roi {
        timed(&mut steps, "roi", || session.set_roi_rect(Some(rect)))?;
    }

    if let Some(fit_type) = recipe.algorithm {
        timed(&mut steps, "model", || {
            session.set_model(fit_type, recipe.components)?;
            for fixed in &recipe.fixed {
                session.set_param_fixed(fixed.index, true)?;
                session.set_param_value(fixed.index, fixed.value)?;
            }
            Ok(())
        })?;
    }
    session.set_intensity_threshold(recipe.intensity_threshold);
    session.set_chisq_target(recipe.chisq_target);
    session.set_noise(recipe.noise);

    if let Some(irf_recipe) = &recipe.irf {
        let irf = irf.ok_or_else(|| {
            PipelineError::Parse(format!(
                "IRF `{}` was not loaded",
                irf_recipe.path.display()
            ))
        })?;
        timed(&mut steps, "irf", || {
            session.load_irf(irf, &irf_recipe.axes, &harvester)?;
            if let Some([x, y]) = irf_recipe.position {
                session.set_picking_irf(true)?;
                session.set_preview_position(x, y)?;
                session.set_picking_irf(false)?;
            }
            Ok(())
        })?;
    }

    if let Some([x, y]) = recipe.position {
        timed(&mut steps, "position", || session.set_preview_position(x, y))?;
    }

    if recipe.fit_dataset {
        timed(&mut steps, "fit", || session.fit().map(|_| ()))?;
    } else if recipe.algorithm.is_some() {
        timed(&mut steps, "preview_fit", || session.fit_preview().map(|_| ()))?;
    }

    let report = SessionReport::from_session(&session, recipe.name.clone(), steps);
    info!(
        "recipe `{}` finished after {} step(s)",
        recipe.name.as_deref().unwrap_or("unnamed"),
        report.steps.len()
    );
    Ok((session, report))
}
