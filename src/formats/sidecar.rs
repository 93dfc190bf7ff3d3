use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Metadata;

use super::Result;

/// `<stack>.json` next to `path`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("json")
}

pub fn read_sidecar(path: &Path) -> Result<Option<Metadata>> {
    let sidecar = sidecar_path(path);
    if !sidecar.is_file() {
        return Ok(None);
    }
    let contents = fs::read_to_string(sidecar)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

pub fn write_sidecar(path: &Path, metadata: &Metadata) -> Result<()> {
    let mut metadata = metadata.clone();
    metadata.source = None;
    fs::write(sidecar_path(path), serde_json::to_string_pretty(&metadata)?)?;
    Ok(())
}
