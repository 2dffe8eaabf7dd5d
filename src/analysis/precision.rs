//! Trial-to-trial precision analysis.
//!
//! The precision of a neuron is estimated as the normalized autocorrelation
//! of its peri-stimulus time histogram (PSTH), the spike counts binned over
//! time and aggregated across the trials of one stimulus condition.

use log::{debug, info};

use crate::analysis::Analysis;
use crate::error::EphysError;
use crate::results::{AnalogSignalList, AnalysisResult};
use crate::segment::Segment;
use crate::signal::{AnalogSignal, Unit};
use crate::store::DataStore;

/// Computes per-neuron PSTH autocorrelations per sheet.
///
/// Recordings are partitioned by a secondary stimulus parameter so that only
/// trials of the same condition are aggregated. Within each partition, the
/// PSTH of every selected neuron is autocorrelated in full mode (output
/// length 2N-1) and normalized by the sum of its squared bin counts; an
/// all-zero histogram is left unnormalized rather than divided by zero.
#[derive(Debug, PartialEq, Clone)]
pub struct Precision {
    /// The indices of the neurons to compute the autocorrelation for.
    neurons: Vec<usize>,
    /// The PSTH bin width (ms).
    bin_length: f64,
    /// The index of the stimulus parameter to partition the trials by.
    partition_index: usize,
    /// The tags attached to every produced result.
    tags: Vec<String>,
}

impl Precision {
    /// Create a new analysis with the specified parameters.
    /// Returns a configuration error if the bin width is not a finite positive
    /// number or if no neuron is selected.
    pub fn new(
        neurons: Vec<usize>,
        bin_length: f64,
        partition_index: usize,
        tags: Vec<String>,
    ) -> Result<Self, EphysError> {
        if !bin_length.is_finite() || bin_length <= 0.0 {
            return Err(EphysError::ConfigurationError(format!(
                "The bin width must be a finite positive number, got {}",
                bin_length
            )));
        }
        if neurons.is_empty() {
            return Err(EphysError::ConfigurationError(
                "At least one neuron must be selected".to_string(),
            ));
        }
        Ok(Precision {
            neurons,
            bin_length,
            partition_index,
            tags,
        })
    }
}

impl Analysis for Precision {
    fn analyse(&self, store: &mut DataStore) -> Result<(), EphysError> {
        info!("Starting precision analysis");
        let mut results: Vec<(String, AnalysisResult)> = vec![];

        let dsv = store.view();
        for sheet in dsv.sheets() {
            let dsv1 = dsv.select_sheet(sheet);
            for partition in dsv1.partition_by_parameter(self.partition_index)? {
                let segments = partition.segments();
                // partitions contain at least one recording by construction
                let duration = segments[0].t_stop() - segments[0].t_start();

                let hist = time_histogram_across_trials(&segments, self.bin_length)?;

                let mut signals = Vec::with_capacity(self.neurons.len());
                for &neuron in self.neurons.iter() {
                    let counts = hist.get(neuron).ok_or_else(|| {
                        EphysError::ConfigurationError(format!(
                            "The neuron index {} is out of bounds for the spike trains",
                            neuron
                        ))
                    })?;
                    let mut ac = correlate_full(counts, counts);
                    let norm: f64 = counts.iter().map(|c| c * c).sum();
                    if norm != 0.0 {
                        for value in ac.iter_mut() {
                            *value /= norm;
                        }
                    }
                    signals.push(AnalogSignal::new(
                        ac,
                        -duration,
                        self.bin_length,
                        Unit::Dimensionless,
                    )?);
                }

                debug!("Adding an autocorrelation signal list to sheet {}", sheet);
                let list = AnalogSignalList::new(
                    signals,
                    self.neurons.clone(),
                    "time",
                    "autocorrelation",
                    Unit::Milliseconds,
                    Unit::Dimensionless,
                    self.tags.clone(),
                )?;
                results.push((sheet.to_string(), AnalysisResult::AnalogSignalList(list)));
            }
        }

        for (sheet, result) in results {
            store.add_analysis_result(result, sheet);
        }
        Ok(())
    }
}

/// Build the PSTH of every neuron: spike counts per bin, aggregated across
/// trials. Spikes are binned relative to their own trial's start time.
/// Returns an error if the trials don't record all the same number of neurons.
pub fn time_histogram_across_trials(
    segments: &[&Segment],
    bin_length: f64,
) -> Result<Vec<Vec<f64>>, EphysError> {
    let first = segments.first().ok_or_else(|| {
        EphysError::EmptyInput("A time histogram requires at least one trial".to_string())
    })?;
    if segments
        .iter()
        .any(|segment| segment.num_neurons() != first.num_neurons())
    {
        return Err(EphysError::InvalidParameter(
            "All trials must record the same number of neurons".to_string(),
        ));
    }

    let num_bins = ((first.t_stop() - first.t_start()) / bin_length).ceil() as usize;
    let mut hist = vec![vec![0.0; num_bins]; first.num_neurons()];

    for segment in segments.iter() {
        for (neuron, times) in segment.spike_trains().iter().enumerate() {
            for &time in times.iter() {
                let bin = ((time - segment.t_start()) / bin_length).floor();
                if bin >= 0.0 && (bin as usize) < num_bins {
                    hist[neuron][bin as usize] += 1.0;
                }
            }
        }
    }
    Ok(hist)
}

/// Full-mode cross-correlation of two sequences, output length
/// `a.len() + v.len() - 1`, zero lag at index `v.len() - 1`.
pub fn correlate_full(a: &[f64], v: &[f64]) -> Vec<f64> {
    if a.is_empty() || v.is_empty() {
        return vec![];
    }
    let mut out = vec![0.0; a.len() + v.len() - 1];
    for (k, acc) in out.iter_mut().enumerate() {
        let shift = k as isize - (v.len() as isize - 1);
        for (j, value) in v.iter().enumerate() {
            let i = shift + j as isize;
            if i >= 0 && (i as usize) < a.len() {
                *acc += a[i as usize] * value;
            }
        }
    }
    out
}
