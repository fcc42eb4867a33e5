use std::path::Path;

use thiserror::Error;

use super::analysis::{analyze, Analysis};
use super::filter::AnalysisConfig;
use super::loader;
use super::model::Dataset;
use super::normalize::{detect_columns, ColumnBinding, ColumnKeywords, MissingColumnError};

#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read or decoded into records.
    #[error("could not read the sheet: {0:#}")]
    Decode(#[source] anyhow::Error),
    /// The sheet decoded but lacks a mandatory column.
    #[error(transparent)]
    MissingColumns(#[from] MissingColumnError),
}

/// A loaded dataset together with its column binding.
///
/// Created only by a successful load and never mutated; loading another file
/// produces a new session that replaces this one.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    binding: ColumnBinding,
}

impl Session {
    /// Bind columns of an already-decoded dataset.
    pub fn new(dataset: Dataset, keywords: &ColumnKeywords) -> Result<Self, MissingColumnError> {
        let binding = detect_columns(&dataset, keywords)?;
        Ok(Session { dataset, binding })
    }

    /// Decode `path` and bind its columns.
    pub fn load(path: &Path, keywords: &ColumnKeywords) -> Result<Self, LoadError> {
        let dataset = loader::load_file(path).map_err(LoadError::Decode)?;
        Ok(Self::new(dataset, keywords)?)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn binding(&self) -> &ColumnBinding {
        &self.binding
    }

    pub fn analyze(&self, config: AnalysisConfig) -> Analysis {
        analyze(&self.dataset, &self.binding, config)
    }
}
