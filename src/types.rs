/// Name of a record channel.
/// Examples: `EVI_p50`, `year`, `pct_mortality`
pub type ChannelName = String;
/// Object name inside a bucket, relative to the bucket root.
/// Example: `ca_dense_tensors_v3/part-00003.tfrecord.gz`
pub type ObjectName = String;
/// Storage bucket name.
/// Example: `forest-lst-test-export`
pub type BucketName = String;
/// Cloud project that owns the bucket.
/// Example: `forest-lst`
pub type ProjectId = String;
/// Object-name prefix used when listing a bucket.
/// Example: `ca_dense_tensors_v3`
pub type PathPrefix = String;
/// Registered dataset config name.
/// Examples: `2_years`, `20_years`
pub type ConfigName = String;
/// Dataset split name.
/// Example: `everything`
pub type SplitName = String;
/// Stable 64-bit hash of a window key.
pub type KeyHash = u64;
