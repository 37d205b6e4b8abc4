//! Record source: enumerates TFRecord objects and decodes their records.
//!
//! Ownership model:
//! - `RecordSource::open` lists the export once and fails fast when it is empty.
//! - `RecordSource::into_records` consumes the source and streams one object at
//!   a time, frame by frame, so only the current record's payload is held in
//!   memory.

use flate2::read::GzDecoder;
use std::io::Read;
use tracing::{debug, info};

use crate::config::StorageLocation;
use crate::constants::storage::{GZIP_SUFFIX, TFRECORD_MARKER, URI_SCHEME};
use crate::data::TimeSeriesRecord;
use crate::errors::DatasetError;
use crate::schema::RecordSchema;
use crate::transport::ObjectStore;
use crate::types::{BucketName, ObjectName};

/// `tf.Example` messages and schema-checked decoding.
pub mod example;
/// TFRecord frame reader and writer.
pub mod tfrecord;

pub use example::{decode_record, encode_record};
pub use tfrecord::{TfRecordReader, write_tfrecord};

/// True if `name` should be read as a TFRecord file.
pub fn is_tfrecord_object(name: &str) -> bool {
    name.contains(TFRECORD_MARKER)
}

/// Enumerated TFRecord objects of one storage location.
pub struct RecordSource<S> {
    store: S,
    bucket: BucketName,
    objects: Vec<ObjectName>,
    schema: RecordSchema,
}

impl<S: ObjectStore> RecordSource<S> {
    /// List every TFRecord object under `location`.
    ///
    /// Fails with [`DatasetError::NoSourceObjects`] when none match.
    pub fn open(
        store: S,
        location: &StorageLocation,
        schema: RecordSchema,
    ) -> Result<Self, DatasetError> {
        let objects: Vec<ObjectName> = store
            .list_objects(&location.bucket, &location.prefix)?
            .into_iter()
            .filter(|name| is_tfrecord_object(name))
            .collect();
        if objects.is_empty() {
            return Err(DatasetError::NoSourceObjects {
                bucket: location.bucket.clone(),
                prefix: location.prefix.clone(),
            });
        }
        info!(
            "[ca_tree_mort:source] found {} TFRecord objects under {} (project={})",
            objects.len(),
            location.uri(),
            location.project
        );
        Ok(Self {
            store,
            bucket: location.bucket.clone(),
            objects,
            schema,
        })
    }

    /// Object names that will be read, in read order.
    pub fn objects(&self) -> &[ObjectName] {
        &self.objects
    }

    /// Consume the source into a lazy stream of decoded records.
    pub fn into_records(self) -> SourceRecords<S> {
        SourceRecords {
            store: self.store,
            bucket: self.bucket,
            objects: self.objects.into_iter(),
            schema: self.schema,
            current: None,
            finished: false,
        }
    }
}

struct OpenObject {
    name: ObjectName,
    frames: TfRecordReader<Box<dyn Read>>,
}

/// Lazy, finite, non-restartable stream of decoded records.
///
/// Stops after the first error.
pub struct SourceRecords<S> {
    store: S,
    bucket: BucketName,
    objects: std::vec::IntoIter<ObjectName>,
    schema: RecordSchema,
    current: Option<OpenObject>,
    finished: bool,
}

impl<S: ObjectStore> SourceRecords<S> {
    fn open_next_object(&mut self) -> Result<bool, DatasetError> {
        let Some(name) = self.objects.next() else {
            return Ok(false);
        };
        let object = self.store.read_object(&self.bucket, &name)?;
        let compressed = name.ends_with(GZIP_SUFFIX);
        debug!(
            "[ca_tree_mort:source] streaming {}{}/{} (gzip={})",
            URI_SCHEME, self.bucket, name, compressed
        );
        let reader: Box<dyn Read> = if compressed {
            Box::new(GzDecoder::new(object))
        } else {
            object
        };
        self.current = Some(OpenObject {
            frames: TfRecordReader::new(reader, name.clone()),
            name,
        });
        Ok(true)
    }

    fn next_record(&mut self) -> Result<Option<TimeSeriesRecord>, DatasetError> {
        loop {
            if let Some(open) = self.current.as_mut() {
                match open.frames.next() {
                    Some(frame) => {
                        let payload = frame?;
                        return decode_record(&payload, &self.schema, &open.name).map(Some);
                    }
                    None => self.current = None,
                }
            }
            if !self.open_next_object()? {
                return Ok(None);
            }
        }
    }
}

impl<S: ObjectStore> Iterator for SourceRecords<S> {
    type Item = Result<TimeSeriesRecord, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
