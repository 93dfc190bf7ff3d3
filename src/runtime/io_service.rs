use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::formats::{FolderDirectory, read_dataset, write_dataset, write_map};
use crate::model::DatasetF32;

use super::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct IoService;

impl IoService {
    pub fn read(&self, path: impl AsRef<Path>) -> Result<DatasetF32> {
        Ok(read_dataset(path)?)
    }

    pub fn write(&self, path: impl AsRef<Path>, dataset: &DatasetF32) -> Result<()> {
        write_dataset(path, dataset)?;
        Ok(())
    }

    pub fn write_map(&self, path: impl AsRef<Path>, map: &Array2<f32>) -> Result<()> {
        write_map(path, map)?;
        Ok(())
    }

    /// IRF candidates found next to the dataset being fitted.
    pub fn directory(&self, root: impl Into<PathBuf>) -> FolderDirectory {
        FolderDirectory::new(root)
    }
}
