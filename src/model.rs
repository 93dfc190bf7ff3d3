mod axis;
mod dataset;
mod error;
mod metadata;


pub use axis::{AxisKind, PixelType, default_axis_for_index};
pub use dataset::{Dataset, DatasetF32};
pub use error::{CoreError, Result};
pub use metadata::{Dim, Metadata};
