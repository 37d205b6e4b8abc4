//! Pipeline orchestration: record source, validity filter, windowing engine.

use std::time::Instant;
use tracing::{debug, info};

use crate::config::DatasetLengthConfig;
use crate::constants::dataset::SPLIT_EVERYTHING;
use crate::data::{KeyedWindow, TimeSeriesRecord};
use crate::errors::DatasetError;
use crate::filter::has_observations;
use crate::info::{DatasetInfo, dataset_info};
use crate::schema::{DEFAULT_SPEC, RecordSchema};
use crate::sink::ExampleSink;
use crate::source::{RecordSource, SourceRecords};
use crate::transport::ObjectStore;
use crate::types::SplitName;
use crate::windowing::WindowingEngine;

/// Counts reported after a generation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// TFRecord objects that were read.
    pub objects: usize,
    /// Windows handed to the sink.
    pub windows: usize,
}

/// Builds the windowed dataset for one config.
pub struct DatasetBuilder<S> {
    config: DatasetLengthConfig,
    store: S,
    schema: RecordSchema,
}

impl<S: ObjectStore> DatasetBuilder<S> {
    /// Builder reading `config.storage` from `store` with the default schema.
    pub fn new(config: DatasetLengthConfig, store: S) -> Self {
        Self {
            config,
            store,
            schema: DEFAULT_SPEC,
        }
    }

    /// Replace the record schema.
    pub fn with_schema(mut self, schema: RecordSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Active config.
    pub fn config(&self) -> &DatasetLengthConfig {
        &self.config
    }

    /// Registration metadata for the active config.
    pub fn info(&self) -> DatasetInfo {
        dataset_info(&self.config, &self.schema)
    }

    /// Every split with its example stream. There is a single split,
    /// `everything`.
    pub fn split_generators(
        self,
    ) -> Result<Vec<(SplitName, GeneratedExamples<SourceRecords<S>>)>, DatasetError> {
        Ok(vec![(
            SPLIT_EVERYTHING.to_string(),
            self.generate_examples()?,
        )])
    }

    /// Lazy stream of keyed windows across the whole export.
    ///
    /// Fails immediately when the export has no TFRecord objects.
    pub fn generate_examples(
        self,
    ) -> Result<GeneratedExamples<SourceRecords<S>>, DatasetError> {
        self.open_examples().map(|(_, examples)| examples)
    }

    /// Drain every split into `sink`.
    ///
    /// The first error aborts the pass; windows already accepted by the sink
    /// are not rolled back.
    pub fn write_to<K: ExampleSink>(self, mut sink: K) -> Result<GenerationSummary, DatasetError> {
        let started = Instant::now();
        let config_name = self.config.name.clone();
        let (objects, examples) = self.open_examples()?;
        let mut summary = GenerationSummary {
            objects,
            windows: 0,
        };
        for window in examples {
            sink.accept(SPLIT_EVERYTHING, &window?)?;
            summary.windows += 1;
        }
        sink.finish()?;
        info!(
            "[ca_tree_mort:builder] config={} wrote {} windows from {} objects in {:.2}s",
            config_name,
            summary.windows,
            summary.objects,
            started.elapsed().as_secs_f64()
        );
        Ok(summary)
    }

    fn open_examples(
        self,
    ) -> Result<(usize, GeneratedExamples<SourceRecords<S>>), DatasetError> {
        let engine = WindowingEngine::new(self.config.time_series_length())?;
        let source = RecordSource::open(self.store, &self.config.storage, self.schema)?;
        let objects = source.objects().len();
        Ok((objects, GeneratedExamples::new(source.into_records(), engine)))
    }
}

/// Filters and windows a stream of records.
///
/// Holds at most one record's windows at a time. Records without any observed
/// year are skipped silently. Stops after the first error.
pub struct GeneratedExamples<I> {
    records: I,
    engine: WindowingEngine,
    pending: std::vec::IntoIter<KeyedWindow>,
    finished: bool,
}

impl<I> GeneratedExamples<I>
where
    I: Iterator<Item = Result<TimeSeriesRecord, DatasetError>>,
{
    /// Window every record of `records` with `engine`.
    pub fn new(records: I, engine: WindowingEngine) -> Self {
        Self {
            records,
            engine,
            pending: Vec::new().into_iter(),
            finished: false,
        }
    }

    fn next_window(&mut self) -> Result<Option<KeyedWindow>, DatasetError> {
        loop {
            if let Some(window) = self.pending.next() {
                return Ok(Some(window));
            }
            let Some(record) = self.records.next().transpose()? else {
                return Ok(None);
            };
            if !has_observations(&record) {
                continue;
            }
            let windows: Vec<KeyedWindow> = self.engine.windows(&record)?.collect();
            debug!(
                "[ca_tree_mort:builder] record yielded {} windows",
                windows.len()
            );
            self.pending = windows.into_iter();
        }
    }
}

impl<I> Iterator for GeneratedExamples<I>
where
    I: Iterator<Item = Result<TimeSeriesRecord, DatasetError>>,
{
    type Item = Result<KeyedWindow, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_window() {
            Ok(Some(window)) => Some(Ok(window)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChannelValues;

    fn pixel(years: Vec<i64>) -> TimeSeriesRecord {
        let len = years.len();
        TimeSeriesRecord::new()
            .with_channel("latitude", ChannelValues::Float32(vec![36.0; len]))
            .with_channel("longitude", ChannelValues::Float32(vec![-118.0; len]))
            .with_channel("year", ChannelValues::Int64(years))
    }

    #[test]
    fn empty_records_never_reach_the_engine() {
        // A record without lat/lon would be a contract violation if windowed.
        let empty = TimeSeriesRecord::new().with_channel("year", ChannelValues::Int64(vec![0; 21]));
        let observed = pixel((2000..2021).collect());
        let engine = WindowingEngine::new(20).unwrap();
        let windows: Vec<KeyedWindow> =
            GeneratedExamples::new(vec![Ok(empty), Ok(observed)].into_iter(), engine)
                .collect::<Result<_, _>>()
                .unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].key.year, 2000);
        assert_eq!(windows[1].key.year, 2001);
    }

    #[test]
    fn windows_follow_record_then_start_order() {
        let mut gappy = vec![0; 21];
        gappy[10..14].copy_from_slice(&[1990, 1991, 1992, 1993]);
        let records = vec![Ok(pixel(gappy)), Ok(pixel((2000..2021).collect()))];
        let engine = WindowingEngine::new(3).unwrap();
        let years: Vec<i64> = GeneratedExamples::new(records.into_iter(), engine)
            .map(|window| window.unwrap().key.year)
            .collect();
        let mut expected = vec![1990, 1991];
        expected.extend(2000..=2018);
        assert_eq!(years, expected);
    }

    #[test]
    fn stream_stops_after_first_error() {
        let records = vec![
            Ok(pixel((2000..2021).collect())),
            Err(DatasetError::Decode {
                object: "x.tfrecord".to_string(),
                details: "bad".to_string(),
            }),
            Ok(pixel((2000..2021).collect())),
        ];
        let engine = WindowingEngine::new(20).unwrap();
        let results: Vec<_> = GeneratedExamples::new(records.into_iter(), engine).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(DatasetError::Decode { .. })));
    }

    #[test]
    fn contract_violation_surfaces_as_error() {
        let ragged = pixel(vec![2001; 21]).with_channel("prcp", ChannelValues::Float32(vec![1.0]));
        let engine = WindowingEngine::new(2).unwrap();
        let mut examples = GeneratedExamples::new(vec![Ok(ragged)].into_iter(), engine);
        assert!(matches!(
            examples.next(),
            Some(Err(DatasetError::RecordContract(_)))
        ));
        assert!(examples.next().is_none());
    }
}
