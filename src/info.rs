//! Dataset registration metadata derived from a config.

use serde::Serialize;

use crate::config::DatasetLengthConfig;
use crate::constants::dataset::{
    DATASET_NAME, DATASET_VERSION, HOMEPAGE, RELEASE_NOTES, SPLIT_EVERYTHING,
};
use crate::schema::{DType, RecordSchema};
use crate::types::{ChannelName, ConfigName, SplitName};

/// Shape and type of one emitted feature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeatureSpec {
    /// Channel name.
    pub name: ChannelName,
    /// Tensor shape; always `[time_series_length]`.
    pub shape: Vec<usize>,
    /// Sample type.
    pub dtype: DType,
}

/// Metadata a dataset registry needs to index emitted examples.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    /// Registered dataset name.
    pub name: String,
    /// Config the info was derived from.
    pub config_name: ConfigName,
    /// Config description.
    pub description: String,
    /// Dataset version.
    pub version: String,
    /// `(version, note)` pairs, oldest first.
    pub release_notes: Vec<(String, String)>,
    /// Project homepage.
    pub homepage: String,
    /// Schema version the features were derived from.
    pub schema_version: u32,
    /// Emitted features in schema order.
    pub features: Vec<FeatureSpec>,
    /// Splits produced by the builder.
    pub splits: Vec<SplitName>,
    /// Always `None`: the dataset has no input/label pairing.
    pub supervised_keys: Option<(ChannelName, ChannelName)>,
}

/// Derive the feature dictionary for `config`: every schema channel, reshaped
/// to the config's window length.
pub fn dataset_info(config: &DatasetLengthConfig, schema: &RecordSchema) -> DatasetInfo {
    let window = config.time_series_length();
    DatasetInfo {
        name: DATASET_NAME.to_string(),
        config_name: config.name.clone(),
        description: config.description.clone(),
        version: DATASET_VERSION.to_string(),
        release_notes: RELEASE_NOTES
            .iter()
            .map(|(version, note)| (version.to_string(), note.to_string()))
            .collect(),
        homepage: HOMEPAGE.to_string(),
        schema_version: schema.version,
        features: schema
            .channels
            .iter()
            .map(|spec| FeatureSpec {
                name: spec.name.to_string(),
                shape: vec![window],
                dtype: spec.dtype,
            })
            .collect(),
        splits: vec![SPLIT_EVERYTHING.to_string()],
        supervised_keys: None,
    }
}
