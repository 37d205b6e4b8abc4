use crate::constants::dataset::CONFIG_NAME_SUFFIX;
use crate::constants::schema::{MAX_LENGTH, MIN_LENGTH};
use crate::constants::storage::{DEFAULT_BUCKET, DEFAULT_PREFIX, DEFAULT_PROJECT, URI_SCHEME};
use crate::errors::DatasetError;
use crate::types::{BucketName, ConfigName, PathPrefix, ProjectId};

/// Where the exported TFRecord files live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageLocation {
    /// Cloud project that owns the bucket.
    pub project: ProjectId,
    /// Bucket holding the export.
    pub bucket: BucketName,
    /// Object-name prefix to list under.
    pub prefix: PathPrefix,
}

impl StorageLocation {
    /// Build a location from explicit parts.
    pub fn new(
        project: impl Into<ProjectId>,
        bucket: impl Into<BucketName>,
        prefix: impl Into<PathPrefix>,
    ) -> Self {
        Self {
            project: project.into(),
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// `gs://bucket/prefix` form used in logs and errors.
    pub fn uri(&self) -> String {
        format!("{}{}/{}", URI_SCHEME, self.bucket, self.prefix)
    }
}

impl Default for StorageLocation {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT, DEFAULT_BUCKET, DEFAULT_PREFIX)
    }
}

/// Settings for one registered variant of the dataset.
///
/// The window length is validated on construction and cannot change afterwards;
/// every record processed under this config is windowed with the same length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLengthConfig {
    /// Registered config name (`5_years`).
    pub name: ConfigName,
    /// Human-readable description.
    pub description: String,
    /// Storage location of the export.
    pub storage: StorageLocation,
    time_series_length: usize,
}

impl DatasetLengthConfig {
    /// Create a config for windows of `time_series_length` years.
    ///
    /// Fails unless `MIN_LENGTH <= time_series_length <= MAX_LENGTH - 1`.
    pub fn new(time_series_length: usize) -> Result<Self, DatasetError> {
        validate_window_size(time_series_length)?;
        let name = config_name(time_series_length);
        Ok(Self {
            description: name.clone(),
            name,
            storage: StorageLocation::default(),
            time_series_length,
        })
    }

    /// Replace the storage location.
    pub fn with_storage(mut self, storage: StorageLocation) -> Self {
        self.storage = storage;
        self
    }

    /// Window length in years.
    pub fn time_series_length(&self) -> usize {
        self.time_series_length
    }
}

impl Default for DatasetLengthConfig {
    fn default() -> Self {
        Self {
            name: config_name(MIN_LENGTH),
            description: config_name(MIN_LENGTH),
            storage: StorageLocation::default(),
            time_series_length: MIN_LENGTH,
        }
    }
}

/// All registered configs, one per window length from `MIN_LENGTH` to `MAX_LENGTH - 1`.
pub fn builder_configs() -> Vec<DatasetLengthConfig> {
    (MIN_LENGTH..MAX_LENGTH)
        .map(|length| DatasetLengthConfig {
            name: config_name(length),
            description: config_name(length),
            storage: StorageLocation::default(),
            time_series_length: length,
        })
        .collect()
}

/// Look up a registered config by name (`7_years`).
pub fn builder_config(name: &str) -> Result<DatasetLengthConfig, DatasetError> {
    builder_configs()
        .into_iter()
        .find(|config| config.name == name)
        .ok_or_else(|| DatasetError::Configuration(format!("unknown dataset config '{name}'")))
}

pub(crate) fn validate_window_size(window_size: usize) -> Result<(), DatasetError> {
    if !(MIN_LENGTH..MAX_LENGTH).contains(&window_size) {
        return Err(DatasetError::Configuration(format!(
            "time_series_length must be between {} and {}, got {}",
            MIN_LENGTH,
            MAX_LENGTH - 1,
            window_size
        )));
    }
    Ok(())
}

fn config_name(length: usize) -> ConfigName {
    format!("{length}{CONFIG_NAME_SUFFIX}")
}
