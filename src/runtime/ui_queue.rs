use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

/// Messages bound for the UI thread. Only the owner of the queue drains it.
#[derive(Debug)]
pub struct UiQueue<M> {
    sender: Sender<M>,
    receiver: Receiver<M>,
}

impl<M> Default for UiQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> UiQueue<M> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> UiSender<M> {
        UiSender(self.sender.clone())
    }

    /// Everything posted so far, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<M> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

/// Cloneable posting side of a [`UiQueue`].
#[derive(Debug)]
pub struct UiSender<M>(Sender<M>);

impl<M> Clone for UiSender<M> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<M> UiSender<M> {
    /// Returns `false` once the UI side is gone.
    pub fn post(&self, message: M) -> bool {
        self.0.send(message).is_ok()
    }
}
