//! Slices records into fully observed fixed-length windows.
//!
//! A window starting at `idx` qualifies iff every `year` in
//! `[idx, idx + window_size)` is nonzero. Qualifying starts are found with a
//! sliding count of observed years: each step drops the outgoing slot and adds
//! the incoming one, so a record is scanned once regardless of window size.

use crate::config::validate_window_size;
use crate::constants::schema::{CHANNEL_LATITUDE, CHANNEL_LONGITUDE, CHANNEL_YEAR};
use crate::data::{KeyedWindow, TimeSeriesRecord, WindowKey};
use crate::errors::DatasetError;
use crate::schema::DType;

/// Iterator over starting indices whose `window_size` years are all observed.
///
/// Yields indices in increasing order. A `window_size` of zero or longer than
/// `years` yields nothing.
#[derive(Clone, Debug)]
pub struct ObservedStarts<'a> {
    years: &'a [i64],
    window_size: usize,
    next: usize,
    observed: usize,
}

/// Find every start whose window of `window_size` years contains no zero.
pub fn observed_window_starts(years: &[i64], window_size: usize) -> ObservedStarts<'_> {
    let observed = if window_size == 0 || window_size > years.len() {
        0
    } else {
        years[..window_size].iter().filter(|year| **year != 0).count()
    };
    ObservedStarts {
        years,
        window_size,
        next: 0,
        observed,
    }
}

impl Iterator for ObservedStarts<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.window_size == 0 {
            return None;
        }
        while self.next + self.window_size <= self.years.len() {
            let idx = self.next;
            if idx > 0 {
                if self.years[idx - 1] != 0 {
                    self.observed -= 1;
                }
                if self.years[idx + self.window_size - 1] != 0 {
                    self.observed += 1;
                }
            }
            self.next += 1;
            if self.observed == self.window_size {
                return Some(idx);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.years.len() + 1).saturating_sub(self.next + self.window_size);
        (0, Some(remaining))
    }
}

/// Produces keyed windows of a fixed length from individual records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowingEngine {
    window_size: usize,
}

impl WindowingEngine {
    /// Create an engine for windows of `window_size` slots.
    ///
    /// Fails unless `MIN_LENGTH <= window_size <= MAX_LENGTH - 1`.
    pub fn new(window_size: usize) -> Result<Self, DatasetError> {
        validate_window_size(window_size)?;
        Ok(Self { window_size })
    }

    /// Window length applied to every record.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Lazily window `record`.
    ///
    /// The record must carry index-aligned channels with integer `year` and
    /// float `latitude`/`longitude`; anything else is a
    /// [`DatasetError::RecordContract`] violation. A record with no fully
    /// observed window yields an empty iterator.
    pub fn windows<'a>(&self, record: &'a TimeSeriesRecord) -> Result<Windows<'a>, DatasetError> {
        record.len()?;
        let years = record
            .year()
            .ok_or_else(|| missing_channel(record, CHANNEL_YEAR, DType::Int64))?;
        let latitude = record
            .latitude()
            .ok_or_else(|| missing_channel(record, CHANNEL_LATITUDE, DType::Float32))?;
        let longitude = record
            .longitude()
            .ok_or_else(|| missing_channel(record, CHANNEL_LONGITUDE, DType::Float32))?;
        Ok(Windows {
            record,
            starts: observed_window_starts(years, self.window_size),
            years,
            latitude,
            longitude,
            window_size: self.window_size,
        })
    }
}

fn missing_channel(record: &TimeSeriesRecord, name: &str, dtype: DType) -> DatasetError {
    match record.channel(name) {
        Some(values) => DatasetError::RecordContract(format!(
            "channel '{}' must be {} but is {}",
            name,
            dtype.as_str(),
            values.dtype().as_str()
        )),
        None => DatasetError::RecordContract(format!("record is missing channel '{name}'")),
    }
}

/// Lazy iterator of windows over one record, in increasing start order.
#[derive(Clone, Debug)]
pub struct Windows<'a> {
    record: &'a TimeSeriesRecord,
    starts: ObservedStarts<'a>,
    years: &'a [i64],
    latitude: &'a [f32],
    longitude: &'a [f32],
    window_size: usize,
}

impl Iterator for Windows<'_> {
    type Item = KeyedWindow;

    fn next(&mut self) -> Option<KeyedWindow> {
        let start = self.starts.next()?;
        let key = WindowKey {
            latitude: self.latitude[start],
            longitude: self.longitude[start],
            year: self.years[start],
        };
        Some(KeyedWindow {
            hash: key.stable_hash(),
            key,
            start,
            record: self.record.slice(start..start + self.window_size),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.starts.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::schema::MAX_LENGTH;
    use crate::data::ChannelValues;

    fn pixel(years: Vec<i64>) -> TimeSeriesRecord {
        let len = years.len();
        TimeSeriesRecord::new()
            .with_channel("prcp", ChannelValues::Float32((0..len).map(|i| i as f32).collect()))
            .with_channel("latitude", ChannelValues::Float32(vec![37.75; len]))
            .with_channel("longitude", ChannelValues::Float32(vec![-119.5; len]))
            .with_channel("elevation", ChannelValues::Int64(vec![1800; len]))
            .with_channel("year", ChannelValues::Int64(years))
    }

    fn gapped_years() -> Vec<i64> {
        let mut years = vec![0, 2001, 2002, 2003, 0];
        years.extend(2005..2021);
        assert_eq!(years.len(), MAX_LENGTH);
        years
    }

    #[test]
    fn starts_skip_windows_touching_a_gap() {
        let years = gapped_years();
        let starts: Vec<usize> = observed_window_starts(&years, 3).collect();
        let mut expected = vec![1];
        expected.extend(5..=18);
        assert_eq!(starts, expected);
    }

    #[test]
    fn starts_handle_degenerate_sizes() {
        let years = [2001, 2002];
        assert_eq!(observed_window_starts(&years, 0).count(), 0);
        assert_eq!(observed_window_starts(&years, 3).count(), 0);
        assert_eq!(observed_window_starts(&years, 2).collect::<Vec<_>>(), [0]);
    }

    #[test]
    fn engine_rejects_out_of_range_window_sizes() {
        for bad in [0, 1, MAX_LENGTH, 40] {
            assert!(matches!(
                WindowingEngine::new(bad),
                Err(DatasetError::Configuration(_))
            ));
        }
    }

    #[test]
    fn windows_slice_every_channel_and_derive_keys() {
        let record = pixel(gapped_years());
        let engine = WindowingEngine::new(3).unwrap();
        let windows: Vec<KeyedWindow> = engine.windows(&record).unwrap().collect();
        assert_eq!(windows.len(), 15);

        let first = &windows[0];
        assert_eq!(first.start, 1);
        assert_eq!(first.record.year(), Some(&[2001, 2002, 2003][..]));
        assert_eq!(
            first.record.channel("prcp"),
            Some(&ChannelValues::Float32(vec![1.0, 2.0, 3.0]))
        );
        assert_eq!(
            first.record.channel("elevation"),
            Some(&ChannelValues::Int64(vec![1800; 3]))
        );
        assert_eq!(
            first.key,
            WindowKey {
                latitude: 37.75,
                longitude: -119.5,
                year: 2001
            }
        );
        assert_eq!(first.hash, first.key.stable_hash());

        let second = &windows[1];
        assert_eq!(second.start, 5);
        assert_eq!(second.key.year, 2005);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn longest_window_has_at_most_two_candidates() {
        let years: Vec<i64> = (2000..2021).collect();
        let record = pixel(years);
        let engine = WindowingEngine::new(MAX_LENGTH - 1).unwrap();
        let starts: Vec<usize> = engine.windows(&record).unwrap().map(|w| w.start).collect();
        assert_eq!(starts, [0, 1]);
    }

    #[test]
    fn window_longer_than_observed_run_yields_nothing() {
        let mut years = vec![0; MAX_LENGTH];
        years[3] = 2003;
        years[4] = 2004;
        let record = pixel(years);
        let engine = WindowingEngine::new(3).unwrap();
        assert_eq!(engine.windows(&record).unwrap().count(), 0);
    }

    #[test]
    fn contract_violations_are_reported() {
        let engine = WindowingEngine::new(2).unwrap();

        let mut missing = TimeSeriesRecord::new()
            .with_channel("year", ChannelValues::Int64(vec![2001; 4]))
            .with_channel("longitude", ChannelValues::Float32(vec![0.0; 4]));
        let err = engine.windows(&missing).unwrap_err();
        assert!(matches!(err, DatasetError::RecordContract(ref msg) if msg.contains("latitude")));

        missing.insert("latitude", ChannelValues::Int64(vec![0; 4]));
        let err = engine.windows(&missing).unwrap_err();
        assert!(matches!(err, DatasetError::RecordContract(ref msg) if msg.contains("float32")));

        let ragged = pixel(vec![2001; 5]).with_channel("prcp", ChannelValues::Float32(vec![0.0]));
        assert!(matches!(
            engine.windows(&ragged),
            Err(DatasetError::RecordContract(_))
        ));
    }
}
