use std::io;

use thiserror::Error;

use crate::types::{BucketName, KeyHash, ObjectName, PathPrefix};

/// Error type for configuration, storage, decoding, and record contract failures.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("storage location '{location}' is unavailable: {reason}")]
    StorageUnavailable { location: String, reason: String },
    #[error("no TFRecord objects found under gs://{bucket}/{prefix}")]
    NoSourceObjects {
        bucket: BucketName,
        prefix: PathPrefix,
    },
    #[error("failed to decode '{object}': {details}")]
    Decode { object: ObjectName, details: String },
    #[error("record contract violated: {0}")]
    RecordContract(String),
    #[error("duplicate example key {key:#018x}")]
    DuplicateKey { key: KeyHash },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
