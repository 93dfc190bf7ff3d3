use super::{OpsError, Result};

/// Square averaging kernel with an odd side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareKernel {
    side: usize,
}

impl SquareKernel {
    pub fn new(side: usize) -> Result<Self> {
        if side == 0 || side % 2 == 0 {
            return Err(OpsError::InvalidKernel(side));
        }
        Ok(Self { side })
    }

    /// Kernel of side `2 * radius + 1`.
    pub fn for_radius(radius: usize) -> Self {
        Self {
            side: 2 * radius + 1,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn radius(&self) -> usize {
        self.side / 2
    }

    pub fn is_identity(&self) -> bool {
        self.side == 1
    }

    /// Per-axis weights; applying them along both spatial axes averages the full square.
    pub fn weights_1d(&self) -> Vec<f32> {
        vec![1.0 / self.side as f32; self.side]
    }
}
