use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::storage::URI_SCHEME;
use crate::errors::DatasetError;
use crate::transport::{ObjectReader, ObjectStore};
use crate::types::ObjectName;

/// Object store laid out on the local filesystem.
///
/// Each bucket is a directory directly under `root`; object names are
/// `/`-separated paths relative to the bucket directory, so a mirrored export
/// (`gsutil -m cp -r gs://bucket <root>`) can be read unchanged.
pub struct LocalObjectStore {
    root: PathBuf,
    follow_links: bool,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Root directory containing bucket directories.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, DatasetError> {
        let dir = self.root.join(bucket);
        if !dir.is_dir() {
            return Err(DatasetError::StorageUnavailable {
                location: format!("{URI_SCHEME}{bucket}"),
                reason: format!("bucket directory {} does not exist", dir.display()),
            });
        }
        Ok(dir)
    }
}

impl ObjectStore for LocalObjectStore {
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectName>, DatasetError> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let mut walker = WalkDir::new(&bucket_dir);
        if self.follow_links {
            walker = walker.follow_links(true);
        }
        let mut names = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|err| DatasetError::StorageUnavailable {
                location: format!("{URI_SCHEME}{bucket}"),
                reason: err.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = object_name(&bucket_dir, entry.path()) else {
                continue;
            };
            if name.starts_with(prefix) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_object(&self, bucket: &str, name: &str) -> Result<ObjectReader, DatasetError> {
        let path = self.bucket_dir(bucket)?.join(name);
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// `/`-joined path of `path` relative to `bucket_dir`, or `None` for
/// non-UTF-8 names.
fn object_name(bucket_dir: &Path, path: &Path) -> Option<ObjectName> {
    let relative = path.strip_prefix(bucket_dir).ok()?;
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect();
    Some(parts?.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;

    fn read_all(store: &LocalObjectStore, bucket: &str, name: &str) -> Vec<u8> {
        let mut bytes = Vec::new();
        store
            .read_object(bucket, name)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        bytes
    }

    #[test]
    fn lists_objects_under_prefix_in_name_order() {
        let temp = tempdir().unwrap();
        let bucket = temp.path().join("export");
        fs::create_dir_all(bucket.join("ca_dense/nested")).unwrap();
        fs::create_dir_all(bucket.join("other")).unwrap();
        fs::write(bucket.join("ca_dense/b.tfrecord.gz"), b"b").unwrap();
        fs::write(bucket.join("ca_dense/a.tfrecord.gz"), b"a").unwrap();
        fs::write(bucket.join("ca_dense/nested/c.tfrecord"), b"c").unwrap();
        fs::write(bucket.join("other/d.tfrecord"), b"d").unwrap();

        let store = LocalObjectStore::new(temp.path());
        let names = store.list_objects("export", "ca_dense").unwrap();
        assert_eq!(
            names,
            [
                "ca_dense/a.tfrecord.gz",
                "ca_dense/b.tfrecord.gz",
                "ca_dense/nested/c.tfrecord"
            ]
        );
        assert_eq!(store.list_objects("export", "").unwrap().len(), 4);
        assert_eq!(read_all(&store, "export", "ca_dense/nested/c.tfrecord"), b"c");
    }

    #[test]
    fn missing_bucket_is_unavailable() {
        let temp = tempdir().unwrap();
        let store = LocalObjectStore::new(temp.path());
        assert!(matches!(
            store.list_objects("nope", ""),
            Err(DatasetError::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn missing_object_is_io_error() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("export")).unwrap();
        let store = LocalObjectStore::new(temp.path());
        assert!(matches!(
            store.read_object("export", "absent.tfrecord").err(),
            Some(DatasetError::Io(_))
        ));
    }
}
