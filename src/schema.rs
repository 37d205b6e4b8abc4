//! Fixed channel schema of the exported per-pixel records.

use serde::{Deserialize, Serialize};

use crate::constants::schema::{DEFAULT_SPEC_VERSION, MAX_LENGTH};

/// Numeric type stored by a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit float samples.
    Float32,
    /// 64-bit signed integer samples.
    Int64,
}

impl DType {
    /// Short display name (`float32`, `int64`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Int64 => "int64",
        }
    }
}

/// One fixed-length channel of the record schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Feature name in the serialized example.
    pub name: &'static str,
    /// Exact number of samples the channel must carry.
    pub length: usize,
    /// Sample type.
    pub dtype: DType,
}

impl ChannelSpec {
    const fn float(name: &'static str) -> Self {
        Self {
            name,
            length: MAX_LENGTH,
            dtype: DType::Float32,
        }
    }

    const fn int(name: &'static str) -> Self {
        Self {
            name,
            length: MAX_LENGTH,
            dtype: DType::Int64,
        }
    }
}

/// Versioned mapping from channel name to fixed length and type.
///
/// Channel order is significant: decoded records and dataset info list
/// channels in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordSchema {
    /// Schema version, bumped whenever the channel set changes.
    pub version: u32,
    /// Channels in canonical order.
    pub channels: &'static [ChannelSpec],
}

/// Channel layout produced by the Earth Engine export.
pub const DEFAULT_SPEC: RecordSchema = RecordSchema {
    version: DEFAULT_SPEC_VERSION,
    channels: &[
        ChannelSpec::float("EVI_p5"),
        ChannelSpec::float("EVI_p50"),
        ChannelSpec::float("EVI_p95"),
        ChannelSpec::float("dT_p5"),
        ChannelSpec::float("dT_p50"),
        ChannelSpec::float("dT_p95"),
        ChannelSpec::float("spei30d_p5"),
        ChannelSpec::float("spei30d_p50"),
        ChannelSpec::float("spei30d_p95"),
        ChannelSpec::float("winter_tmin"),
        ChannelSpec::float("prcp"),
        ChannelSpec::float("latitude"),
        ChannelSpec::float("longitude"),
        ChannelSpec::int("elevation"),
        ChannelSpec::int("year"),
        ChannelSpec::float("pct_mortality"),
    ],
};

impl RecordSchema {
    /// Look up a channel by name.
    pub fn channel(&self, name: &str) -> Option<&ChannelSpec> {
        self.channels.iter().find(|spec| spec.name == name)
    }

    /// Iterate channel names in canonical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.channels.iter().map(|spec| spec.name)
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        DEFAULT_SPEC
    }
}
