/// Constants describing the exported per-pixel record layout.
pub mod schema {
    /// Number of yearly samples stored per channel in every exported record.
    pub const MAX_LENGTH: usize = 21;
    /// Shortest window length a dataset config may request.
    pub const MIN_LENGTH: usize = 2;
    /// Version tag of the built-in channel schema.
    pub const DEFAULT_SPEC_VERSION: u32 = 1;

    /// Channel holding the observation year (`0` marks a missing slot).
    pub const CHANNEL_YEAR: &str = "year";
    /// Channel holding the pixel latitude in degrees.
    pub const CHANNEL_LATITUDE: &str = "latitude";
    /// Channel holding the pixel longitude in degrees.
    pub const CHANNEL_LONGITUDE: &str = "longitude";
}

/// Constants used when registering the dataset.
pub mod dataset {
    /// Registered dataset name.
    pub const DATASET_NAME: &str = "ca_tree_mort";
    /// Current dataset version.
    pub const DATASET_VERSION: &str = "1.0.0";
    /// Release notes keyed by version, oldest first.
    pub const RELEASE_NOTES: &[(&str, &str)] = &[("1.0.0", "Initial release.")];
    /// Project homepage reported in dataset info.
    pub const HOMEPAGE: &str = "https://github.com/s-kganz/ForestLST";
    /// The only split produced; every window lands here.
    pub const SPLIT_EVERYTHING: &str = "everything";
    /// Suffix appended to the window length to build a config name (`5_years`).
    pub const CONFIG_NAME_SUFFIX: &str = "_years";
}

/// Default storage location of the exported records.
pub mod storage {
    /// Cloud project owning the export bucket.
    pub const DEFAULT_PROJECT: &str = "forest-lst";
    /// Bucket holding the exported TFRecord files.
    pub const DEFAULT_BUCKET: &str = "forest-lst-test-export";
    /// Object-name prefix of the export.
    pub const DEFAULT_PREFIX: &str = "ca_dense_tensors_v3";
    /// Substring an object name must contain to be read as a record file.
    pub const TFRECORD_MARKER: &str = ".tfrecord";
    /// Suffix of gzip-compressed record files.
    pub const GZIP_SUFFIX: &str = ".gz";
    /// URI scheme used when naming objects in logs and errors.
    pub const URI_SCHEME: &str = "gs://";
}

/// Constants used by TFRecord framing.
pub mod tfrecord {
    /// Rotation-and-add constant used to mask stored CRC32C values.
    pub const CRC_MASK_DELTA: u32 = 0xa282_ead8;
    /// Bytes in the little-endian length prefix of a frame.
    pub const LENGTH_BYTES: usize = 8;
    /// Bytes in each masked checksum of a frame.
    pub const CRC_BYTES: usize = 4;
}

/// Constants used by window key hashing.
pub mod key {
    /// Latitude/longitude are quantised to this many units per degree.
    pub const COORDINATE_SCALE: f64 = 1_000_000.0;
}
