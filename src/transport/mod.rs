//! Object storage backends the record source reads from.
//!
//! The source only needs two operations: list object names under a prefix and
//! open an object for sequential reading. Retrying and paging against a remote backend belong
//! to the implementation, not to callers.

use std::io::Read;

use crate::errors::DatasetError;
use crate::types::ObjectName;

/// Local directory-backed object store.
pub mod fs;
/// Map-backed object store.
pub mod memory;

/// Sequential reader over one object's bytes.
pub type ObjectReader = Box<dyn Read>;

/// Minimal read-only object storage interface.
pub trait ObjectStore {
    /// Names of every object in `bucket` whose name starts with `prefix`,
    /// sorted lexicographically.
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectName>, DatasetError>;

    /// Open object `name` in `bucket`. Bytes are pulled as the reader is
    /// consumed; the object is never buffered whole.
    fn read_object(&self, bucket: &str, name: &str) -> Result<ObjectReader, DatasetError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectName>, DatasetError> {
        (**self).list_objects(bucket, prefix)
    }

    fn read_object(&self, bucket: &str, name: &str) -> Result<ObjectReader, DatasetError> {
        (**self).read_object(bucket, name)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectName>, DatasetError> {
        (**self).list_objects(bucket, prefix)
    }

    fn read_object(&self, bucket: &str, name: &str) -> Result<ObjectReader, DatasetError> {
        (**self).read_object(bucket, name)
    }
}
