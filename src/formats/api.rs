use std::path::Path;

use log::debug;

use crate::model::{Dataset, DatasetF32};

use super::sidecar::read_sidecar;
use super::tiff::{read_tiff, write_tiff};
use super::util::extension;
use super::{IoError, Result};

/// Reads a TIFF stack, letting a `<stack>.json` sidecar override the inferred layout.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<DatasetF32> {
    let path = path.as_ref();
    let dataset = match extension(path)?.as_str() {
        "tif" | "tiff" => read_tiff(path)?,
        other => return Err(IoError::UnsupportedFormat(other.to_string())),
    };
    match read_sidecar(path)? {
        Some(mut metadata) => {
            debug!("applying metadata sidecar for {}", path.display());
            metadata.source = Some(path.to_path_buf());
            metadata.pixel_type = dataset.metadata.pixel_type;
            Ok(Dataset::new(dataset.data, metadata)?)
        }
        None => Ok(dataset),
    }
}

pub fn write_dataset(path: impl AsRef<Path>, dataset: &DatasetF32) -> Result<()> {
    let path = path.as_ref();
    match extension(path)?.as_str() {
        "tif" | "tiff" => write_tiff(path, dataset),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

pub fn supported_formats() -> &'static [&'static str] {
    &["tif", "tiff"]
}
