use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::formats::DatasetDirectory;
use crate::runtime::{BackgroundWorker, UiQueue};
use crate::session::{AxisSelectors, BinnedView, FitSession, NumberHarvester, SessionError};

use super::panel::{Gate, QueuedRequest, Request};
use super::{ControllerError, Panel, PanelHandle, RefreshGuard, Result, SessionEdit};

/// What an update runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Fit the whole working view.
    #[default]
    WholeImage,
    /// Fit only the previewed pixel.
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum UpdateKind {
    None,
    Policy,
    WholeImage,
}

enum UiMessage {
    Binned {
        ticket: u64,
        result: crate::ops::Result<BinnedView>,
    },
}

/// Connects panels to a session: one user edit, at most one fit, every panel refreshed.
pub struct ControllerBridge {
    session: Option<FitSession>,
    panels: Vec<Box<dyn Panel>>,
    gate: Rc<Gate>,
    worker: BackgroundWorker,
    ui_queue: UiQueue<UiMessage>,
    pending: Vec<UiMessage>,
    binning_ticket: u64,
    /// Update owed to edits applied before a later edit failed.
    pending_update: UpdateKind,
    policy: UpdatePolicy,
    directory: Box<dyn DatasetDirectory>,
    harvester: Box<dyn NumberHarvester>,
    fit_count: usize,
}

impl std::fmt::Debug for ControllerBridge {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ControllerBridge")
            .field("session", &self.session)
            .field("panels", &self.panels.len())
            .field("worker", &self.worker)
            .field("binning_ticket", &self.binning_ticket)
            .field("policy", &self.policy)
            .finish()
    }
}

impl ControllerBridge {
    pub fn new(
        session: FitSession,
        directory: Box<dyn DatasetDirectory>,
        harvester: Box<dyn NumberHarvester>,
    ) -> Result<Self> {
        Ok(Self {
            session: Some(session),
            panels: Vec::new(),
            gate: Rc::new(Gate::default()),
            worker: BackgroundWorker::spawn("flim-binning")?,
            ui_queue: UiQueue::new(),
            pending: Vec::new(),
            binning_ticket: 0,
            pending_update: UpdateKind::None,
            policy: UpdatePolicy::default(),
            directory,
            harvester,
            fit_count: 0,
        })
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: UpdatePolicy) {
        self.policy = policy;
    }

    /// Capability handle for a new panel.
    pub fn handle(&self) -> PanelHandle {
        PanelHandle::new(Rc::clone(&self.gate))
    }

    pub fn session(&self) -> Result<&FitSession> {
        self.session.as_ref().ok_or(ControllerError::Destroyed)
    }

    pub fn session_mut(&mut self) -> Result<&mut FitSession> {
        self.session.as_mut().ok_or(ControllerError::Destroyed)
    }

    pub fn is_destroyed(&self) -> bool {
        self.session.is_none()
    }

    /// Number of fits dispatched through [`ControllerBridge::request_update`] and
    /// [`ControllerBridge::pump`].
    pub fn fit_count(&self) -> usize {
        self.fit_count
    }

    /// Adds a panel after refreshing it once.
    pub fn register<P: Panel + 'static>(&mut self, mut panel: P) -> Result<()> {
        let session = self.session.as_ref().ok_or(ControllerError::Destroyed)?;
        {
            let _guard = RefreshGuard::hold(Rc::clone(&self.gate));
            panel.refresh(session);
        }
        self.panels.push(Box::new(panel));
        Ok(())
    }

    /// Refreshes every panel in registration order under the refresh guard.
    pub fn request_refresh(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(ControllerError::Destroyed)?;
        {
            let _guard = RefreshGuard::hold(Rc::clone(&self.gate));
            for panel in &mut self.panels {
                panel.refresh(session);
            }
        }
        session.mark_refreshed();
        Ok(())
    }

    /// Runs one fit and refreshes every panel. Does nothing while the refresh guard is
    /// held. A failed fit is returned before any panel is refreshed.
    pub fn request_update(&mut self) -> Result<bool> {
        if self.gate.is_refreshing() {
            debug!("update suppressed during refresh");
            return Ok(false);
        }
        self.run_update(UpdateKind::Policy)?;
        Ok(true)
    }

    fn run_update(&mut self, kind: UpdateKind) -> Result<()> {
        let session = self.session.as_mut().ok_or(ControllerError::Destroyed)?;
        match (kind, self.policy) {
            (UpdateKind::None, _) => return Ok(()),
            (UpdateKind::WholeImage, _) | (UpdateKind::Policy, UpdatePolicy::WholeImage) => {
                session.fit()?;
            }
            (UpdateKind::Policy, UpdatePolicy::Preview) => {
                session.fit_preview()?;
            }
        }
        self.fit_count += 1;
        self.request_refresh()
    }

    /// Applies everything queued by panels and the worker, then runs at most one update.
    /// Returns whether an update ran. When an edit fails, the update owed to the edits
    /// already applied is carried over to the next pump.
    pub fn pump(&mut self) -> Result<bool> {
        let mut wanted = std::mem::replace(&mut self.pending_update, UpdateKind::None);

        let mut messages = std::mem::take(&mut self.pending);
        messages.extend(self.ui_queue.drain());
        let mut messages = messages.into_iter();
        while let Some(message) = messages.next() {
            match self.handle_message(message) {
                Ok(kind) => wanted = wanted.max(kind),
                Err(error) => {
                    self.pending.extend(messages);
                    self.pending_update = wanted;
                    return Err(error);
                }
            }
        }

        while let Some(QueuedRequest { request, guarded }) = self.gate.pop() {
            let kind = match request {
                Request::Update => UpdateKind::Policy,
                Request::Edit(edit) => match self.apply(edit) {
                    Ok(kind) => kind,
                    Err(error) => {
                        self.pending_update = wanted;
                        return Err(error);
                    }
                },
            };
            if !guarded {
                wanted = wanted.max(kind);
            }
        }

        if wanted == UpdateKind::None {
            return Ok(false);
        }
        self.run_update(wanted)?;
        Ok(true)
    }

    /// Waits up to `timeout` for background work to hand a result back, then pumps.
    /// Returns whether anything arrived.
    pub fn wait_for_background(&mut self, timeout: Duration) -> Result<bool> {
        match self.ui_queue.recv_timeout(timeout) {
            Some(message) => {
                self.pending.push(message);
                self.pump()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Starts binning on the worker. Only the latest submission is applied when results
    /// come back.
    pub fn submit_binning(&mut self, radius: usize) -> Result<()> {
        let session = self.session.as_ref().ok_or(ControllerError::Destroyed)?;
        self.binning_ticket += 1;
        let ticket = self.binning_ticket;
        let task = session.binning_task(radius);
        let sender = self.ui_queue.sender();
        self.worker.submit(move || {
            let result = task.run();
            if !sender.post(UiMessage::Binned { ticket, result }) {
                debug!("binning ticket {ticket} finished after the UI went away");
            }
        })?;
        debug!("binning radius {radius} submitted as ticket {ticket}");
        Ok(())
    }

    fn handle_message(&mut self, message: UiMessage) -> Result<UpdateKind> {
        match message {
            UiMessage::Binned { ticket, result } => {
                if ticket != self.binning_ticket {
                    warn!(
                        "discarding binning ticket {ticket}, superseded by {}",
                        self.binning_ticket
                    );
                    return Ok(UpdateKind::None);
                }
                let Some(session) = self.session.as_mut() else {
                    warn!("discarding binning ticket {ticket} for a destroyed session");
                    return Ok(UpdateKind::None);
                };
                session.apply_binned(result.map_err(SessionError::from)?)?;
                Ok(UpdateKind::Policy)
            }
        }
    }

    fn apply(&mut self, edit: SessionEdit) -> Result<UpdateKind> {
        debug!("applying {edit:?}");
        if let SessionEdit::Binning(radius) = edit {
            self.submit_binning(radius)?;
            return Ok(UpdateKind::None);
        }

        let session = self.session.as_mut().ok_or(ControllerError::Destroyed)?;
        let kind = match edit {
            SessionEdit::IntensityThreshold(threshold) => {
                session.set_intensity_threshold(threshold);
                UpdateKind::Policy
            }
            SessionEdit::ChisqTarget(target) => {
                session.set_chisq_target(target);
                UpdateKind::Policy
            }
            SessionEdit::ChisqDelta(delta) => {
                session.set_chisq_delta(delta);
                UpdateKind::None
            }
            SessionEdit::Noise(noise) => {
                session.set_noise(noise);
                UpdateKind::Policy
            }
            SessionEdit::Model { fit_type, n_comp } => {
                session.set_model(fit_type, n_comp)?;
                UpdateKind::Policy
            }
            SessionEdit::ParamValue { index, value } => {
                session.set_param_value(index, value)?;
                // free values are only initial guesses
                if session.params().param_free.get(index) == Some(&false) {
                    UpdateKind::Policy
                } else {
                    UpdateKind::None
                }
            }
            SessionEdit::ParamFixed { index, fixed } => {
                session.set_param_fixed(index, fixed)?;
                UpdateKind::Policy
            }
            SessionEdit::PreviewPosition { x, y } => {
                session.set_preview_position(x, y)?;
                UpdateKind::Policy
            }
            SessionEdit::PickingIrf(picking) => {
                session.set_picking_irf(picking)?;
                UpdateKind::None
            }
            SessionEdit::Roi(rect) => {
                session.set_roi_rect(rect)?;
                UpdateKind::Policy
            }
            SessionEdit::Irf(Some(name)) => {
                let dataset = self
                    .directory
                    .find(&name)?
                    .ok_or_else(|| SessionError::UnknownDataset(name.clone()))?;
                session.load_irf(&dataset, &AxisSelectors::default(), self.harvester.as_ref())?;
                UpdateKind::Policy
            }
            SessionEdit::Irf(None) => {
                session.clear_irf();
                UpdateKind::Policy
            }
            SessionEdit::FitDataset => UpdateKind::WholeImage,
            SessionEdit::Binning(_) => UpdateKind::None,
        };
        Ok(kind)
    }

    /// Tears down panels and the worker and releases the session.
    pub fn destroy(&mut self) {
        for panel in &mut self.panels {
            panel.destroy();
        }
        self.panels.clear();
        let cancelled = self.worker.shutdown();
        self.gate.clear();
        self.pending.clear();
        self.pending_update = UpdateKind::None;
        self.session = None;
        info!("session destroyed, {cancelled} queued job(s) cancelled");
    }
}
