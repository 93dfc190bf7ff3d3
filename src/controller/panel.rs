use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use log::debug;

use crate::session::FitSession;

use super::SessionEdit;

/// A view that mirrors session state.
pub trait Panel {
    /// Pulls the latest state into the panel's widgets. Edits raised from here never
    /// trigger an update.
    fn refresh(&mut self, session: &FitSession);

    /// Releases whatever the panel holds on to.
    fn destroy(&mut self) {}
}

#[derive(Debug)]
pub(crate) enum Request {
    Edit(SessionEdit),
    Update,
}

#[derive(Debug)]
pub(crate) struct QueuedRequest {
    pub(crate) request: Request,
    /// Raised while the refresh guard was held.
    pub(crate) guarded: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Gate {
    refreshing: Cell<bool>,
    queue: RefCell<VecDeque<QueuedRequest>>,
}

impl Gate {
    pub(crate) fn is_refreshing(&self) -> bool {
        self.refreshing.get()
    }

    pub(crate) fn pop(&self) -> Option<QueuedRequest> {
        self.queue.borrow_mut().pop_front()
    }

    pub(crate) fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    fn push(&self, request: Request) {
        let guarded = self.refreshing.get();
        if guarded {
            debug!("{request:?} raised during refresh");
        }
        self.queue
            .borrow_mut()
            .push_back(QueuedRequest { request, guarded });
    }
}

/// What a panel gets instead of the session itself: a way to raise edits and ask for
/// updates, sharing one refresh guard with every other panel.
#[derive(Debug, Clone)]
pub struct PanelHandle {
    gate: Rc<Gate>,
}

impl PanelHandle {
    pub(crate) fn new(gate: Rc<Gate>) -> Self {
        Self { gate }
    }

    pub fn submit(&self, edit: SessionEdit) {
        self.gate.push(Request::Edit(edit));
    }

    /// Asks for a fit and a full refresh. Returns `false`, and does nothing, while the
    /// refresh guard is held.
    pub fn request_update(&self) -> bool {
        if self.gate.is_refreshing() {
            return false;
        }
        self.gate.push(Request::Update);
        true
    }

    pub fn is_refreshing(&self) -> bool {
        self.gate.is_refreshing()
    }

    /// Holds the refresh guard until the returned value is dropped.
    pub fn hold_refresh(&self) -> RefreshGuard {
        RefreshGuard::hold(Rc::clone(&self.gate))
    }
}

/// Scope during which update requests are ignored.
#[derive(Debug)]
pub struct RefreshGuard {
    gate: Rc<Gate>,
    previous: bool,
}

impl RefreshGuard {
    pub(crate) fn hold(gate: Rc<Gate>) -> Self {
        let previous = gate.refreshing.replace(true);
        Self { gate, previous }
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.gate.refreshing.set(self.previous);
    }
}
