use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::key::COORDINATE_SCALE;
use crate::constants::schema::{CHANNEL_LATITUDE, CHANNEL_LONGITUDE, CHANNEL_YEAR};
use crate::errors::DatasetError;
use crate::hash::stable_hash_i64s;
use crate::schema::DType;

pub use crate::types::{ChannelName, KeyHash};

/// Samples of one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelValues {
    /// 32-bit float samples.
    Float32(Vec<f32>),
    /// 64-bit integer samples.
    Int64(Vec<i64>),
}

impl ChannelValues {
    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            ChannelValues::Float32(values) => values.len(),
            ChannelValues::Int64(values) => values.len(),
        }
    }

    /// True when the channel carries no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample type of this channel.
    pub fn dtype(&self) -> DType {
        match self {
            ChannelValues::Float32(_) => DType::Float32,
            ChannelValues::Int64(_) => DType::Int64,
        }
    }

    /// Float samples, if this is a float channel.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            ChannelValues::Float32(values) => Some(values),
            ChannelValues::Int64(_) => None,
        }
    }

    /// Integer samples, if this is an integer channel.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            ChannelValues::Int64(values) => Some(values),
            ChannelValues::Float32(_) => None,
        }
    }

    /// Copy the samples in `range`. Panics if the range is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> ChannelValues {
        match self {
            ChannelValues::Float32(values) => ChannelValues::Float32(values[range].to_vec()),
            ChannelValues::Int64(values) => ChannelValues::Int64(values[range].to_vec()),
        }
    }
}

/// One pixel's multi-channel time series.
///
/// All channels are index-aligned: position `i` in every channel refers to
/// the same yearly slot. Channels keep insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeriesRecord {
    channels: IndexMap<ChannelName, ChannelValues>,
}

impl TimeSeriesRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a channel.
    pub fn insert(&mut self, name: impl Into<ChannelName>, values: ChannelValues) {
        self.channels.insert(name.into(), values);
    }

    /// Builder-style `insert`.
    pub fn with_channel(mut self, name: impl Into<ChannelName>, values: ChannelValues) -> Self {
        self.insert(name, values);
        self
    }

    /// Look up a channel.
    pub fn channel(&self, name: &str) -> Option<&ChannelValues> {
        self.channels.get(name)
    }

    /// Iterate channels in insertion order.
    pub fn channels(&self) -> impl Iterator<Item = (&str, &ChannelValues)> {
        self.channels
            .iter()
            .map(|(name, values)| (name.as_str(), values))
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Common sample count shared by every channel.
    ///
    /// Errors when channels disagree or the record has no channels.
    pub fn len(&self) -> Result<usize, DatasetError> {
        let mut iter = self.channels.iter();
        let Some((first_name, first)) = iter.next() else {
            return Err(DatasetError::RecordContract(
                "record has no channels".to_string(),
            ));
        };
        let expected = first.len();
        for (name, values) in iter {
            if values.len() != expected {
                return Err(DatasetError::RecordContract(format!(
                    "channel '{}' has {} samples but '{}' has {}",
                    name,
                    values.len(),
                    first_name,
                    expected
                )));
            }
        }
        Ok(expected)
    }

    /// `year` samples, if present as an integer channel.
    pub fn year(&self) -> Option<&[i64]> {
        self.channel(CHANNEL_YEAR).and_then(ChannelValues::as_i64)
    }

    /// `latitude` samples, if present as a float channel.
    pub fn latitude(&self) -> Option<&[f32]> {
        self.channel(CHANNEL_LATITUDE).and_then(ChannelValues::as_f32)
    }

    /// `longitude` samples, if present as a float channel.
    pub fn longitude(&self) -> Option<&[f32]> {
        self.channel(CHANNEL_LONGITUDE)
            .and_then(ChannelValues::as_f32)
    }

    /// New record with every channel sliced to `range`.
    ///
    /// Panics if `range` exceeds any channel; check `len()` first.
    pub fn slice(&self, range: Range<usize>) -> TimeSeriesRecord {
        TimeSeriesRecord {
            channels: self
                .channels
                .iter()
                .map(|(name, values)| (name.clone(), values.slice(range.clone())))
                .collect(),
        }
    }
}

/// Spatial/temporal origin of a window: its first latitude, longitude, and year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowKey {
    /// Latitude of the pixel in degrees.
    pub latitude: f32,
    /// Longitude of the pixel in degrees.
    pub longitude: f32,
    /// First year covered by the window.
    pub year: i64,
}

impl WindowKey {
    /// Integer encoding hashed into the key: micro-degree latitude and
    /// longitude (rounded half away from zero) and the year.
    pub fn quantized(&self) -> [i64; 3] {
        [
            quantize_degrees(self.latitude),
            quantize_degrees(self.longitude),
            self.year,
        ]
    }

    /// Stable FNV-1a hash of `quantized()`, identical across runs and platforms.
    pub fn stable_hash(&self) -> KeyHash {
        stable_hash_i64s(&self.quantized())
    }
}

fn quantize_degrees(value: f32) -> i64 {
    (f64::from(value) * COORDINATE_SCALE).round() as i64
}

/// A fully observed window together with its identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyedWindow {
    /// Stable hash of `key`; the key itself is the true identity.
    pub hash: KeyHash,
    /// Origin of the window.
    pub key: WindowKey,
    /// Starting index of the window within its source record.
    pub start: usize,
    /// Windowed channels, each `window_size` samples long.
    pub record: TimeSeriesRecord,
}
