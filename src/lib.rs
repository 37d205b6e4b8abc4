#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Pipeline orchestration and lazy example streams.
pub mod builder;
/// Dataset config and storage location types.
pub mod config;
/// Centralized constants used across schema, source, and hashing.
pub mod constants;
/// Record, window, and key types.
pub mod data;
/// Reusable CLI runners shared by example binaries.
pub mod example_apps;
/// Validity filter for pixels without observations.
pub mod filter;
mod hash;
/// Dataset registration metadata.
pub mod info;
/// Fixed channel schema of exported records.
pub mod schema;
/// Output consumers for keyed windows.
pub mod sink;
/// TFRecord reading and `tf.Example` decoding.
pub mod source;
/// Object storage backends (local filesystem, in-memory).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Fully observed window extraction.
pub mod windowing;

mod errors;

pub use builder::{DatasetBuilder, GeneratedExamples, GenerationSummary};
pub use config::{DatasetLengthConfig, StorageLocation, builder_config, builder_configs};
pub use data::{ChannelValues, KeyedWindow, TimeSeriesRecord, WindowKey};
pub use errors::DatasetError;
pub use filter::has_observations;
pub use info::{DatasetInfo, FeatureSpec, dataset_info};
pub use schema::{ChannelSpec, DEFAULT_SPEC, DType, RecordSchema};
pub use sink::{ExampleSink, JsonLinesSink};
pub use source::{RecordSource, SourceRecords};
pub use transport::{ObjectReader, ObjectStore};
pub use transport::fs::LocalObjectStore;
pub use transport::memory::InMemoryObjectStore;
pub use types::{
    BucketName, ChannelName, ConfigName, KeyHash, ObjectName, PathPrefix, ProjectId, SplitName,
};
pub use windowing::{ObservedStarts, Windows, WindowingEngine, observed_window_starts};
