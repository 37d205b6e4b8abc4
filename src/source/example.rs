//! `tf.Example` protobuf messages and schema-checked decoding.

use prost::Message;
use std::collections::HashMap;

use crate::data::{ChannelValues, TimeSeriesRecord};
use crate::errors::DatasetError;
use crate::schema::{DType, RecordSchema};

/// `tensorflow.Example`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Example {
    /// Named features; absent when the message is empty.
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

/// `tensorflow.Features`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Features {
    /// Features keyed by channel name.
    #[prost(map = "string, message", tag = "1")]
    pub feature: HashMap<String, Feature>,
}

/// `tensorflow.Feature`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Feature {
    /// The populated value list, if any.
    #[prost(oneof = "FeatureKind", tags = "1, 2, 3")]
    pub kind: Option<FeatureKind>,
}

/// Value list carried by a `Feature`.
#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum FeatureKind {
    /// Raw byte strings; never part of the record schema.
    #[prost(message, tag = "1")]
    BytesList(BytesList),
    /// `float32` channel values.
    #[prost(message, tag = "2")]
    FloatList(FloatList),
    /// `int64` channel values.
    #[prost(message, tag = "3")]
    Int64List(Int64List),
}

/// `tensorflow.BytesList`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BytesList {
    /// Packed values.
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

/// `tensorflow.FloatList`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FloatList {
    /// Packed values.
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

/// `tensorflow.Int64List`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int64List {
    /// Packed values.
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

impl FeatureKind {
    fn type_name(&self) -> &'static str {
        match self {
            FeatureKind::BytesList(_) => "bytes_list",
            FeatureKind::FloatList(_) => "float_list",
            FeatureKind::Int64List(_) => "int64_list",
        }
    }
}

/// Decode a serialized `tf.Example` into a record with exactly the channels of
/// `schema`, in schema order.
///
/// Every schema channel must be present with the schema's type and exact
/// length. Features outside the schema are ignored. `object` names the source
/// in errors.
pub fn decode_record(
    bytes: &[u8],
    schema: &RecordSchema,
    object: &str,
) -> Result<TimeSeriesRecord, DatasetError> {
    let decode_error = |details: String| DatasetError::Decode {
        object: object.to_string(),
        details,
    };
    let example = Example::decode(bytes).map_err(|err| decode_error(err.to_string()))?;
    let mut features = example.features.unwrap_or_default().feature;

    let mut record = TimeSeriesRecord::new();
    for spec in schema.channels {
        let feature = features
            .remove(spec.name)
            .ok_or_else(|| decode_error(format!("missing feature '{}'", spec.name)))?;
        let values = match (spec.dtype, feature.kind) {
            (DType::Float32, Some(FeatureKind::FloatList(list))) => {
                ChannelValues::Float32(list.value)
            }
            (DType::Int64, Some(FeatureKind::Int64List(list))) => ChannelValues::Int64(list.value),
            (dtype, kind) => {
                return Err(decode_error(format!(
                    "feature '{}' expected {} but found {}",
                    spec.name,
                    dtype.as_str(),
                    kind.as_ref().map(FeatureKind::type_name).unwrap_or("no value")
                )));
            }
        };
        if values.len() != spec.length {
            return Err(decode_error(format!(
                "feature '{}' expected {} values but found {}",
                spec.name,
                spec.length,
                values.len()
            )));
        }
        record.insert(spec.name, values);
    }
    Ok(record)
}

/// Serialize a record as a `tf.Example`, one feature per channel.
pub fn encode_record(record: &TimeSeriesRecord) -> Vec<u8> {
    let feature = record
        .channels()
        .map(|(name, values)| {
            let kind = match values {
                ChannelValues::Float32(values) => FeatureKind::FloatList(FloatList {
                    value: values.clone(),
                }),
                ChannelValues::Int64(values) => FeatureKind::Int64List(Int64List {
                    value: values.clone(),
                }),
            };
            (name.to_string(), Feature { kind: Some(kind) })
        })
        .collect();
    Example {
        features: Some(Features { feature }),
    }
    .encode_to_vec()
}
