mod api;
mod directory;
mod error;
mod export;
mod sidecar;
mod tiff;
mod util;

#[cfg(test)]
mod tests;

pub use api::{read_dataset, supported_formats, write_dataset};
pub use directory::{DatasetDirectory, FolderDirectory, MemoryDirectory};
pub use error::{IoError, Result};
pub use export::write_map;
pub use sidecar::{read_sidecar, sidecar_path, write_sidecar};
