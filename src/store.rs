//! Module implementing the in-memory recording and result store.
//!
//! The [`DataStore`] owns the raw recordings and the append-only list of
//! analysis results. Analyses never touch the records directly: they work
//! through a [`DataStoreView`], a cheap filtered view supporting selection by
//! stimulus type, selection by sheet and partition by stimulus parameter. An
//! empty selection is a legitimate outcome, not an error.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use crate::error::EphysError;
use crate::results::{AnalysisResult, CyclicTuningCurve};
use crate::segment::Segment;
use crate::stimulus::StimulusDescriptor;

/// One recording entry: the segment of one trial together with the sheet it
/// was recorded from and the stimulus that was presented.
#[derive(Debug, PartialEq, Clone)]
struct Record {
    sheet: String,
    stimulus: StimulusDescriptor,
    segment: Segment,
}

/// The in-memory store of recordings and analysis results.
#[derive(Debug, Default)]
pub struct DataStore {
    records: Vec<Record>,
    results: Vec<(String, AnalysisResult)>,
}

impl DataStore {
    /// Create a new empty data store.
    pub fn new() -> Self {
        DataStore {
            records: vec![],
            results: vec![],
        }
    }

    /// Add one recorded segment with its sheet and stimulus.
    pub fn add_recording(
        &mut self,
        sheet: impl Into<String>,
        stimulus: StimulusDescriptor,
        segment: Segment,
    ) {
        self.records.push(Record {
            sheet: sheet.into(),
            stimulus,
            segment,
        });
    }

    /// Returns a view over all recordings.
    pub fn view(&self) -> DataStoreView<'_> {
        DataStoreView {
            store: self,
            indices: (0..self.records.len()).collect(),
        }
    }

    /// Append an immutable analysis result for the given sheet.
    pub fn add_analysis_result(&mut self, result: AnalysisResult, sheet: impl Into<String>) {
        self.results.push((sheet.into(), result));
    }

    /// Returns all stored analysis results for the given sheet, in insertion order.
    pub fn results(&self, sheet: &str) -> Vec<&AnalysisResult> {
        self.results
            .iter()
            .filter(|(s, _)| s == sheet)
            .map(|(_, result)| result)
            .collect()
    }

    /// Returns all stored cyclic tuning curves for the given sheet, in insertion order.
    pub fn tuning_curves(&self, sheet: &str) -> Vec<&CyclicTuningCurve> {
        self.results
            .iter()
            .filter(|(s, _)| s == sheet)
            .filter_map(|(_, result)| match result {
                AnalysisResult::CyclicTuningCurve(tc) => Some(tc),
                _ => None,
            })
            .collect()
    }

    /// Returns the distinct sheet names of all recordings, in first-occurrence order.
    pub fn sheets(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.sheet.as_str())
            .unique()
            .collect()
    }

    /// Save all stored analysis results to a JSON file.
    pub fn save_results_to<P: AsRef<Path>>(&self, path: P) -> Result<(), EphysError> {
        let file = File::create(path).map_err(|e| EphysError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.results)
            .map_err(|e| EphysError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| EphysError::IOError(e.to_string()))
    }

    /// Load previously saved analysis results from a JSON file and append them
    /// to the store, keeping their sheet association.
    pub fn load_results_from<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EphysError> {
        let file = File::open(path).map_err(|e| EphysError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        let results: Vec<(String, AnalysisResult)> =
            serde_json::from_reader(reader).map_err(|e| EphysError::IOError(e.to_string()))?;
        self.results.extend(results);
        Ok(())
    }
}

/// A filtered, read-only view over the recordings of a [`DataStore`].
#[derive(Debug, Clone)]
pub struct DataStoreView<'a> {
    store: &'a DataStore,
    indices: Vec<usize>,
}

impl<'a> DataStoreView<'a> {
    /// Returns the subset of recordings with the given stimulus type name.
    /// An empty result is not an error.
    pub fn select_stimulus_type(&self, name: &str) -> DataStoreView<'a> {
        self.filter(|record| record.stimulus.name() == name)
    }

    /// Returns the subset of recordings from the given sheet.
    /// An empty result is not an error.
    pub fn select_sheet(&self, sheet: &str) -> DataStoreView<'a> {
        self.filter(|record| record.sheet == sheet)
    }

    /// Partition the view into disjoint sub-views, one per distinct value of
    /// the stimulus parameter at the given index, in first-occurrence order.
    /// Returns an error if the index is out of bounds for some recording.
    pub fn partition_by_parameter(
        &self,
        index: usize,
    ) -> Result<Vec<DataStoreView<'a>>, EphysError> {
        let mut keys: Vec<u64> = vec![];
        let mut partitions: Vec<DataStoreView<'a>> = vec![];

        for &i in self.indices.iter() {
            let value = self.store.records[i].stimulus.value(index).ok_or_else(|| {
                EphysError::InvalidParameter(format!(
                    "The partition parameter index {} is out of bounds for stimulus '{}'",
                    index,
                    self.store.records[i].stimulus.name()
                ))
            })?;
            match keys.iter().position(|&key| key == value.to_bits()) {
                Some(pos) => partitions[pos].indices.push(i),
                None => {
                    keys.push(value.to_bits());
                    partitions.push(DataStoreView {
                        store: self.store,
                        indices: vec![i],
                    });
                }
            }
        }
        Ok(partitions)
    }

    /// Returns the distinct sheet names of the view, in first-occurrence order.
    pub fn sheets(&self) -> Vec<&'a str> {
        self.indices
            .iter()
            .map(|&i| self.store.records[i].sheet.as_str())
            .unique()
            .collect()
    }

    /// Returns the segments of the view, in insertion order.
    pub fn segments(&self) -> Vec<&'a Segment> {
        self.indices
            .iter()
            .map(|&i| &self.store.records[i].segment)
            .collect()
    }

    /// Returns the stimulus descriptors of the view, parallel to the segments.
    pub fn stimuli(&self) -> Vec<&'a StimulusDescriptor> {
        self.indices
            .iter()
            .map(|&i| &self.store.records[i].stimulus)
            .collect()
    }

    /// Returns the number of recordings in the view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the view contains no recordings.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn filter(&self, predicate: impl Fn(&Record) -> bool) -> DataStoreView<'a> {
        DataStoreView {
            store: self.store,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| predicate(&self.store.records[i]))
                .collect(),
        }
    }
}
