use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::loader::{self, LoadError};
use super::model::SalesDataset;

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// CSV fetched over HTTP GET.
    Remote(String),
    /// Local CSV / JSON / Parquet file.
    File(PathBuf),
}

impl DataSource {
    /// Load a fresh copy of the dataset from this source.
    pub fn load(&self) -> Result<SalesDataset, LoadError> {
        match self {
            DataSource::Remote(url) => loader::fetch_url(url),
            DataSource::File(path) => loader::load_file(path),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Shared, read-only view of the loaded dataset.
///
/// The dataset is loaded once when the handle is opened and never mutated.
/// [`DatasetHandle::reload`] is the only way to pick up new data: it loads
/// from the same source and swaps in a new `Arc`, leaving clones of the old
/// one untouched.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    source: DataSource,
    dataset: Arc<SalesDataset>,
}

impl DatasetHandle {
    /// Load `source` and wrap the result.
    pub fn open(source: DataSource) -> Result<Self, LoadError> {
        let dataset = source.load()?;
        log::info!("Loaded {} sales records from {source}", dataset.len());
        Ok(Self::from_dataset(source, dataset))
    }

    /// Wrap an already loaded dataset.
    pub fn from_dataset(source: DataSource, dataset: SalesDataset) -> Self {
        Self {
            source,
            dataset: Arc::new(dataset),
        }
    }

    pub fn dataset(&self) -> &Arc<SalesDataset> {
        &self.dataset
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Refetch from the same source. On failure the current data stays.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let dataset = self.source.load()?;
        log::info!(
            "Reloaded {} sales records from {}",
            dataset.len(),
            self.source
        );
        self.dataset = Arc::new(dataset);
        Ok(())
    }
}
