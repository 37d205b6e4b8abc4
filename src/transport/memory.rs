use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use crate::constants::storage::URI_SCHEME;
use crate::errors::DatasetError;
use crate::transport::{ObjectReader, ObjectStore};
use crate::types::{BucketName, ObjectName};

/// Object store held entirely in memory.
///
/// Readers share the stored bytes instead of copying them.
#[derive(Clone, Debug, Default)]
pub struct InMemoryObjectStore {
    objects: BTreeMap<(BucketName, ObjectName), Arc<[u8]>>,
}

impl InMemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object.
    pub fn insert(
        &mut self,
        bucket: impl Into<BucketName>,
        name: impl Into<ObjectName>,
        bytes: Vec<u8>,
    ) {
        self.objects.insert((bucket.into(), name.into()), bytes.into());
    }

    /// Builder-style `insert`.
    pub fn with_object(
        mut self,
        bucket: impl Into<BucketName>,
        name: impl Into<ObjectName>,
        bytes: Vec<u8>,
    ) -> Self {
        self.insert(bucket, name, bytes);
        self
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectName>, DatasetError> {
        Ok(self
            .objects
            .keys()
            .filter(|(object_bucket, name)| object_bucket == bucket && name.starts_with(prefix))
            .map(|(_, name)| name.clone())
            .collect())
    }

    fn read_object(&self, bucket: &str, name: &str) -> Result<ObjectReader, DatasetError> {
        let bytes = self
            .objects
            .get(&(bucket.to_string(), name.to_string()))
            .ok_or_else(|| DatasetError::StorageUnavailable {
                location: format!("{URI_SCHEME}{bucket}/{name}"),
                reason: "object not found".to_string(),
            })?;
        Ok(Box::new(Cursor::new(Arc::clone(bytes))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn lists_only_matching_bucket_and_prefix() {
        let store = InMemoryObjectStore::new()
            .with_object("b", "p/2.tfrecord", vec![2])
            .with_object("b", "p/1.tfrecord", vec![1])
            .with_object("b", "q/3.tfrecord", vec![3])
            .with_object("c", "p/4.tfrecord", vec![4]);
        assert_eq!(
            store.list_objects("b", "p/").unwrap(),
            ["p/1.tfrecord", "p/2.tfrecord"]
        );
        let mut bytes = Vec::new();
        store
            .read_object("c", "p/4.tfrecord")
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(bytes, [4]);
        assert!(store.read_object("c", "p/1.tfrecord").is_err());
    }
}
