use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::warn;

use crate::model::DatasetF32;

use super::util::extension;
use super::{Result, read_dataset, supported_formats};

/// Source of the datasets offered as instrument responses.
pub trait DatasetDirectory {
    fn list(&self) -> Result<Vec<(String, Arc<DatasetF32>)>>;

    fn find(&self, name: &str) -> Result<Option<Arc<DatasetF32>>> {
        Ok(self
            .list()?
            .into_iter()
            .find_map(|(candidate, dataset)| (candidate == name).then_some(dataset)))
    }
}

/// TIFF stacks in one folder, named by file stem.
#[derive(Debug, Clone)]
pub struct FolderDirectory {
    root: PathBuf,
}

impl FolderDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn stack_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                extension(path)
                    .map(|ext| supported_formats().contains(&ext.as_str()))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();
        paths.sort();
        Ok(paths)
    }
}

impl DatasetDirectory for FolderDirectory {
    fn list(&self) -> Result<Vec<(String, Arc<DatasetF32>)>> {
        let paths = self.stack_paths()?;
        let mut datasets = Vec::with_capacity(paths.len());
        for path in paths {
            match read_dataset(&path) {
                Ok(dataset) => {
                    let name = dataset
                        .name()
                        .unwrap_or_else(|| path.to_string_lossy().into_owned());
                    datasets.push((name, Arc::new(dataset)));
                }
                Err(error) => warn!("skipping {}: {error}", path.display()),
            }
        }
        Ok(datasets)
    }

    /// Decodes only the stacks whose file stem is `name`.
    fn find(&self, name: &str) -> Result<Option<Arc<DatasetF32>>> {
        let candidates = self
            .stack_paths()?
            .into_iter()
            .filter(|path| path.file_stem().and_then(|stem| stem.to_str()) == Some(name));
        for path in candidates {
            match read_dataset(&path) {
                Ok(dataset) => return Ok(Some(Arc::new(dataset))),
                Err(error) => warn!("skipping {}: {error}", path.display()),
            }
        }
        Ok(None)
    }
}

/// Datasets already loaded in this process.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    entries: Vec<(String, Arc<DatasetF32>)>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, dataset: DatasetF32) -> Self {
        self.insert(name, dataset);
        self
    }

    /// Adds `dataset`, replacing any entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, dataset: DatasetF32) {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, Arc::new(dataset)));
    }
}

impl DatasetDirectory for MemoryDirectory {
    fn list(&self) -> Result<Vec<(String, Arc<DatasetF32>)>> {
        Ok(self.entries.clone())
    }
}
