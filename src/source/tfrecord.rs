//! TFRecord framing.
//!
//! Each frame is laid out as:
//!
//! ```text
//! u64 length (little-endian)
//! u32 masked_crc32c(length bytes)
//! [u8; length] payload
//! u32 masked_crc32c(payload)
//! ```
//!
//! A stream cut inside a frame, or bytes the decompressor rejects, fail as
//! [`DatasetError::Decode`] for the object being read.

use std::io::{self, Read, Write};

use crate::constants::tfrecord::{CRC_BYTES, CRC_MASK_DELTA, LENGTH_BYTES};
use crate::errors::DatasetError;
use crate::types::ObjectName;

/// CRC32C of `data`, rotated and offset the way TFRecord stores it.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    crc.rotate_right(15).wrapping_add(CRC_MASK_DELTA)
}

/// Append one framed record to `writer`.
pub fn write_tfrecord<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let length = (payload.len() as u64).to_le_bytes();
    writer.write_all(&length)?;
    writer.write_all(&masked_crc32c(&length).to_le_bytes())?;
    writer.write_all(payload)?;
    writer.write_all(&masked_crc32c(payload).to_le_bytes())?;
    Ok(())
}

/// Iterator over the payloads of a TFRecord stream.
///
/// Stops after the first error; a stream that ends exactly on a frame
/// boundary ends cleanly.
pub struct TfRecordReader<R> {
    inner: R,
    object: ObjectName,
    finished: bool,
}

impl<R: Read> TfRecordReader<R> {
    /// Read frames from `inner`; `object` names the stream in errors.
    pub fn new(inner: R, object: impl Into<ObjectName>) -> Self {
        Self {
            inner,
            object: object.into(),
            finished: false,
        }
    }

    fn decode_error(&self, details: impl Into<String>) -> DatasetError {
        DatasetError::Decode {
            object: self.object.clone(),
            details: details.into(),
        }
    }

    /// Malformed or cut-off input becomes a `Decode` error naming the object;
    /// other I/O failures stay `Io`.
    fn read_error(&self, err: io::Error) -> DatasetError {
        match err.kind() {
            io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof => self.decode_error(err.to_string()),
            _ => DatasetError::Io(err),
        }
    }

    fn read_frame(&mut self) -> Result<Option<Vec<u8>>, DatasetError> {
        let mut length_bytes = [0u8; LENGTH_BYTES];
        let filled = read_full(&mut self.inner, &mut length_bytes);
        match filled.map_err(|err| self.read_error(err))? {
            0 => return Ok(None),
            LENGTH_BYTES => {}
            _ => return Err(self.decode_error("truncated frame header")),
        }
        let length_crc = self.read_crc("length checksum")?;
        if length_crc != masked_crc32c(&length_bytes) {
            return Err(self.decode_error("corrupt frame length checksum"));
        }
        let length = usize::try_from(u64::from_le_bytes(length_bytes))
            .map_err(|_| self.decode_error("frame length exceeds addressable memory"))?;

        let mut payload = Vec::new();
        let read = (&mut self.inner).take(length as u64).read_to_end(&mut payload);
        read.map_err(|err| self.read_error(err))?;
        if payload.len() != length {
            return Err(self.decode_error(format!(
                "truncated frame: expected {} payload bytes, found {}",
                length,
                payload.len()
            )));
        }
        let payload_crc = self.read_crc("payload checksum")?;
        if payload_crc != masked_crc32c(&payload) {
            return Err(self.decode_error("corrupt frame payload checksum"));
        }
        Ok(Some(payload))
    }

    fn read_crc(&mut self, what: &str) -> Result<u32, DatasetError> {
        let mut crc_bytes = [0u8; CRC_BYTES];
        let filled = read_full(&mut self.inner, &mut crc_bytes);
        let filled = filled.map_err(|err| self.read_error(err))?;
        if filled != CRC_BYTES {
            return Err(self.decode_error(format!("truncated frame: missing {what}")));
        }
        Ok(u32::from_le_bytes(crc_bytes))
    }
}

impl<R: Read> Iterator for TfRecordReader<R> {
    type Item = Result<Vec<u8>, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_frame() {
            Ok(Some(payload)) => Some(Ok(payload)),
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

/// Read until `buf` is full or the stream ends; returns the bytes filled.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(payloads: &[&[u8]]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for payload in payloads {
            write_tfrecord(&mut bytes, payload).unwrap();
        }
        bytes
    }

    #[test]
    fn crc32c_matches_check_value() {
        assert_eq!(crc32c::crc32c(b"123456789"), 0xe306_9283);
    }

    #[test]
    fn header_checksum_covers_length_bytes() {
        let bytes = framed(&[b"alpha"]);
        let stored = u32::from_le_bytes(bytes[LENGTH_BYTES..LENGTH_BYTES + CRC_BYTES].try_into().unwrap());
        assert_eq!(stored, masked_crc32c(&5u64.to_le_bytes()));
        assert_ne!(stored, crc32c::crc32c(&5u64.to_le_bytes()));
    }

    #[test]
    fn reads_frames_in_order() {
        let bytes = framed(&[b"alpha", b"", b"charlie"]);
        let payloads: Vec<Vec<u8>> = TfRecordReader::new(&bytes[..], "mem")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(payloads, [b"alpha".to_vec(), Vec::new(), b"charlie".to_vec()]);
    }

    #[test]
    fn empty_stream_has_no_frames() {
        assert_eq!(TfRecordReader::new(&[][..], "mem").count(), 0);
    }

    #[test]
    fn corrupt_payload_is_a_decode_error_and_stops() {
        let mut bytes = framed(&[b"alpha", b"bravo"]);
        bytes[LENGTH_BYTES + CRC_BYTES] ^= 0xff;
        let mut reader = TfRecordReader::new(&bytes[..], "shard-0.tfrecord");
        let err = reader.next().unwrap().unwrap_err();
        assert!(
            matches!(err, DatasetError::Decode { ref object, .. } if object == "shard-0.tfrecord")
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_payload_is_a_decode_error() {
        let bytes = framed(&[b"alpha"]);
        let truncated = &bytes[..bytes.len() - 6];
        let results: Vec<_> = TfRecordReader::new(truncated, "mem").collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(DatasetError::Decode { .. })));
    }

    #[test]
    fn truncated_header_is_a_decode_error() {
        let bytes = framed(&[b"alpha"]);
        // Inside the length field, then inside the length checksum.
        for cut in [3, 10] {
            let results: Vec<_> = TfRecordReader::new(&bytes[..cut], "shard.tfrecord").collect();
            assert_eq!(results.len(), 1, "cut at {cut}");
            assert!(
                matches!(results[0], Err(DatasetError::Decode { ref object, .. }) if object == "shard.tfrecord"),
                "cut at {cut}: {:?}",
                results[0]
            );
        }
    }

    #[test]
    fn missing_payload_checksum_is_a_decode_error() {
        let bytes = framed(&[b"alpha"]);
        let results: Vec<_> = TfRecordReader::new(&bytes[..bytes.len() - 2], "mem").collect();
        assert!(matches!(results[..], [Err(DatasetError::Decode { .. })]));
    }

    #[test]
    fn invalid_stream_data_is_a_decode_error() {
        struct Corrupt;
        impl Read for Corrupt {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::InvalidInput, "corrupt deflate stream"))
            }
        }
        let results: Vec<_> = TfRecordReader::new(Corrupt, "part.tfrecord.gz").collect();
        assert!(matches!(
            results[..],
            [Err(DatasetError::Decode { ref object, ref details })]
                if object == "part.tfrecord.gz" && details.contains("corrupt deflate")
        ));
    }

    #[test]
    fn other_read_failures_stay_io_errors() {
        struct Denied;
        impl Read for Denied {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            }
        }
        let results: Vec<_> = TfRecordReader::new(Denied, "mem").collect();
        assert!(matches!(results[..], [Err(DatasetError::Io(_))]));
    }
}
