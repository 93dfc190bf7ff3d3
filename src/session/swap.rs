use std::mem;
use std::ops::Deref;
use std::sync::Arc;

use ndarray::Array3;

use crate::flim::{FitParams, FitResults};

/// Values that trade places with fields of an owner.
///
/// `swap_with` is an involution: a second call puts both sides back.
pub(crate) trait Stash<O> {
    fn swap_with(&mut self, owner: &mut O);
}

/// Keeps a stash installed in its owner until dropped, on every exit path.
pub(crate) struct SwapScope<'a, O, S: Stash<O>> {
    owner: &'a mut O,
    stash: S,
}

impl<'a, O, S: Stash<O>> SwapScope<'a, O, S> {
    pub(crate) fn install(owner: &'a mut O, mut stash: S) -> Self {
        stash.swap_with(owner);
        Self { owner, stash }
    }
}

impl<O, S: Stash<O>> Deref for SwapScope<'_, O, S> {
    type Target = O;

    fn deref(&self) -> &O {
        &*self.owner
    }
}

impl<O, S: Stash<O>> Drop for SwapScope<'_, O, S> {
    fn drop(&mut self) {
        self.stash.swap_with(self.owner);
    }
}

/// The whole working view and no parameter map, in place of the preview buffers.
pub(crate) struct WholeImage {
    trans_map: Option<Arc<Array3<f32>>>,
    param_map: Option<Array3<f32>>,
}

impl WholeImage {
    pub(crate) fn new(view: Arc<Array3<f32>>) -> Self {
        Self {
            trans_map: Some(view),
            param_map: None,
        }
    }
}

impl Stash<FitParams> for WholeImage {
    fn swap_with(&mut self, owner: &mut FitParams) {
        mem::swap(&mut owner.trans_map, &mut self.trans_map);
        mem::swap(&mut owner.param_map, &mut self.param_map);
    }
}

/// A parameter map lent to a results bundle for the duration of a scope.
pub(crate) struct LentParamMap<'b>(pub(crate) &'b mut Option<Array3<f32>>);

impl Stash<FitResults> for LentParamMap<'_> {
    fn swap_with(&mut self, owner: &mut FitResults) {
        mem::swap(&mut owner.param_map, self.0);
    }
}
