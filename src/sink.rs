//! Consumers of keyed windows.

use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;

use crate::data::{KeyedWindow, TimeSeriesRecord};
use crate::errors::DatasetError;
use crate::types::KeyHash;

/// Receives each emitted window under its split name.
pub trait ExampleSink {
    /// Accept one window. Errors abort generation.
    fn accept(&mut self, split: &str, window: &KeyedWindow) -> Result<(), DatasetError>;

    /// Flush any buffered output. Called once after the last window.
    fn finish(&mut self) -> Result<(), DatasetError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    split: &'a str,
    key: KeyHash,
    latitude: f32,
    longitude: f32,
    year: i64,
    start: usize,
    features: &'a TimeSeriesRecord,
}

/// Writes one JSON object per window.
///
/// Rejects a repeated window key with [`DatasetError::DuplicateKey`]. Keys
/// are compared in their quantized form, so two distinct keys whose hashes
/// collide are both written.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    seen: HashSet<[i64; 3]>,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            seen: HashSet::new(),
        }
    }

    /// Number of windows written so far.
    pub fn written(&self) -> usize {
        self.seen.len()
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExampleSink for JsonLinesSink<W> {
    fn accept(&mut self, split: &str, window: &KeyedWindow) -> Result<(), DatasetError> {
        if !self.seen.insert(window.key.quantized()) {
            return Err(DatasetError::DuplicateKey { key: window.hash });
        }
        let line = JsonLine {
            split,
            key: window.hash,
            latitude: window.key.latitude,
            longitude: window.key.longitude,
            year: window.key.year,
            start: window.start,
            features: &window.record,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DatasetError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<T: ExampleSink + ?Sized> ExampleSink for &mut T {
    fn accept(&mut self, split: &str, window: &KeyedWindow) -> Result<(), DatasetError> {
        (**self).accept(split, window)
    }

    fn finish(&mut self) -> Result<(), DatasetError> {
        (**self).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChannelValues, WindowKey};

    fn window(year: i64) -> KeyedWindow {
        let key = WindowKey {
            latitude: 40.0,
            longitude: -121.0,
            year,
        };
        KeyedWindow {
            hash: key.stable_hash(),
            key,
            start: 3,
            record: TimeSeriesRecord::new()
                .with_channel("year", ChannelValues::Int64(vec![year, year + 1])),
        }
    }

    #[test]
    fn writes_one_json_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.accept("everything", &window(2001)).unwrap();
        sink.accept("everything", &window(2002)).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.written(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["split"], "everything");
        assert_eq!(lines[0]["key"], window(2001).hash);
        assert_eq!(lines[0]["year"], 2001);
        assert_eq!(lines[0]["start"], 3);
        assert_eq!(lines[1]["features"]["year"], serde_json::json!([2002, 2003]));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.accept("everything", &window(2001)).unwrap();
        let err = sink.accept("everything", &window(2001)).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateKey { key } if key == window(2001).hash));
    }

    #[test]
    fn colliding_hashes_of_distinct_keys_are_both_written() {
        let first = window(2001);
        let mut second = window(2002);
        second.hash = first.hash;

        let mut sink = JsonLinesSink::new(Vec::new());
        sink.accept("everything", &first).unwrap();
        sink.accept("everything", &second).unwrap();
        assert_eq!(sink.written(), 2);
    }

    #[test]
    fn repeated_key_is_a_duplicate_whatever_its_hash() {
        let first = window(2001);
        let mut second = window(2001);
        second.hash = first.hash.wrapping_add(1);

        let mut sink = JsonLinesSink::new(Vec::new());
        sink.accept("everything", &first).unwrap();
        assert!(matches!(
            sink.accept("everything", &second),
            Err(DatasetError::DuplicateKey { .. })
        ));
    }
}
