//! Module implementing recording segments.
//!
//! A [`Segment`] bundles everything recorded during one trial of one stimulus
//! presentation: the spike times of every neuron of a sheet and, optionally,
//! the excitatory and inhibitory synaptic conductance traces sampled at fixed
//! intervals. Segments are immutable once created; all times are in ms.

use serde::{Deserialize, Serialize};

use crate::error::EphysError;
use crate::signal::Unit;

/// Per-neuron conductance traces sampled on a common time grid.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ConductanceTraces {
    /// The sampled values, one trace per neuron.
    values: Vec<Vec<f64>>,
    /// The time of the first sample (ms).
    t_start: f64,
    /// The time between two consecutive samples (ms).
    sampling_period: f64,
    /// The unit of the sampled values.
    unit: Unit,
}

impl ConductanceTraces {
    /// Create new conductance traces with the specified parameters.
    /// Returns an error if the sampling period is not a finite positive number
    /// or if the traces don't have all the same length.
    pub fn new(
        values: Vec<Vec<f64>>,
        t_start: f64,
        sampling_period: f64,
        unit: Unit,
    ) -> Result<Self, EphysError> {
        if !sampling_period.is_finite() || sampling_period <= 0.0 {
            return Err(EphysError::InvalidParameter(format!(
                "The sampling period must be a finite positive number, got {}",
                sampling_period
            )));
        }
        if let Some(first) = values.first() {
            if values.iter().any(|trace| trace.len() != first.len()) {
                return Err(EphysError::InvalidParameter(
                    "All conductance traces must have the same length".to_string(),
                ));
            }
        }
        Ok(ConductanceTraces {
            values,
            t_start,
            sampling_period,
            unit,
        })
    }

    /// Returns the number of neurons.
    pub fn num_neurons(&self) -> usize {
        self.values.len()
    }

    /// Returns the trace of the given neuron, if any.
    pub fn trace(&self, neuron: usize) -> Option<&[f64]> {
        self.values.get(neuron).map(|trace| &trace[..])
    }

    /// Returns the time of the first sample (ms).
    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    /// Returns the time just after the last sample (ms).
    pub fn t_stop(&self) -> f64 {
        let len = self.values.first().map_or(0, |trace| trace.len());
        self.t_start + self.sampling_period * len as f64
    }

    /// Returns the time between two consecutive samples (ms).
    pub fn sampling_period(&self) -> f64 {
        self.sampling_period
    }

    /// Returns the unit of the sampled values.
    pub fn unit(&self) -> Unit {
        self.unit
    }
}

/// One trial's full recorded data for one stimulus presentation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// The spike times of every neuron, sorted in increasing order (ms).
    spike_trains: Vec<Vec<f64>>,
    /// The start time of the trial (ms).
    t_start: f64,
    /// The stop time of the trial (ms).
    t_stop: f64,
    /// The excitatory synaptic conductance traces, if recorded.
    esyn: Option<ConductanceTraces>,
    /// The inhibitory synaptic conductance traces, if recorded.
    isyn: Option<ConductanceTraces>,
}

impl Segment {
    /// Create a new segment with the specified parameters.
    /// Returns an error if the trial duration is not positive or if any spike
    /// train is not sorted.
    pub fn new(
        spike_trains: Vec<Vec<f64>>,
        t_start: f64,
        t_stop: f64,
        esyn: Option<ConductanceTraces>,
        isyn: Option<ConductanceTraces>,
    ) -> Result<Self, EphysError> {
        if !(t_stop - t_start).is_finite() || t_stop <= t_start {
            return Err(EphysError::InvalidParameter(format!(
                "The trial interval must be non-degenerate, got [{}, {}]",
                t_start, t_stop
            )));
        }
        for times in spike_trains.iter() {
            if times.windows(2).any(|ts| ts[0] > ts[1]) {
                return Err(EphysError::InvalidParameter(
                    "Spike times must be sorted in increasing order".to_string(),
                ));
            }
        }
        Ok(Segment {
            spike_trains,
            t_start,
            t_stop,
            esyn,
            isyn,
        })
    }

    /// Returns the number of neurons.
    pub fn num_neurons(&self) -> usize {
        self.spike_trains.len()
    }

    /// Returns the spike times of every neuron.
    pub fn spike_trains(&self) -> &[Vec<f64>] {
        &self.spike_trains
    }

    /// Returns the start time of the trial (ms).
    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    /// Returns the stop time of the trial (ms).
    pub fn t_stop(&self) -> f64 {
        self.t_stop
    }

    /// Returns the excitatory conductance traces, if recorded.
    pub fn esyn(&self) -> Option<&ConductanceTraces> {
        self.esyn.as_ref()
    }

    /// Returns the inhibitory conductance traces, if recorded.
    pub fn isyn(&self) -> Option<&ConductanceTraces> {
        self.isyn.as_ref()
    }

    /// Returns the mean firing rate of every neuron over the full trial duration,
    /// in spikes per second.
    pub fn mean_rates(&self) -> Vec<f64> {
        let duration_s = (self.t_stop - self.t_start) / 1000.0;
        self.spike_trains
            .iter()
            .map(|times| times.len() as f64 / duration_s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_new() {
        assert!(Segment::new(vec![], 0.0, 0.0, None, None).is_err());
        assert!(Segment::new(vec![vec![2.0, 1.0]], 0.0, 100.0, None, None).is_err());
        assert!(Segment::new(vec![vec![1.0, 2.0]], 0.0, 100.0, None, None).is_ok());
    }

    #[test]
    fn test_mean_rates() {
        // 500 ms trial: 5 spikes -> 10 spikes/s, 0 spikes -> 0 spikes/s
        let segment = Segment::new(
            vec![vec![10.0, 110.0, 210.0, 310.0, 410.0], vec![]],
            0.0,
            500.0,
            None,
            None,
        )
        .unwrap();
        assert_eq!(segment.mean_rates(), vec![10.0, 0.0]);
    }

    #[test]
    fn test_conductance_traces() {
        assert!(ConductanceTraces::new(vec![vec![0.0]], 0.0, 0.0, Unit::Nanosiemens).is_err());
        assert!(ConductanceTraces::new(
            vec![vec![0.0, 1.0], vec![0.0]],
            0.0,
            1.0,
            Unit::Nanosiemens
        )
        .is_err());

        let traces =
            ConductanceTraces::new(vec![vec![0.0; 10], vec![1.0; 10]], 0.0, 0.5, Unit::Nanosiemens)
                .unwrap();
        assert_eq!(traces.num_neurons(), 2);
        assert_eq!(traces.t_stop(), 5.0);
        assert_eq!(traces.trace(1).unwrap()[0], 1.0);
        assert_eq!(traces.trace(2), None);
    }
}
