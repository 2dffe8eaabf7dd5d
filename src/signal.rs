//! Module implementing uniformly sampled analog signals.
//!
//! An [`AnalogSignal`] is the common currency of the analysis layer: averaged
//! conductance waveforms, autocorrelation traces, and any other computed
//! continuous signal are all represented as a vector of samples with an
//! explicit start time, sampling period and unit.

use serde::{Deserialize, Serialize};

use crate::error::EphysError;

/// Physical unit attached to recorded or computed values.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Unit {
    /// Firing rate, spikes per second.
    SpikesPerSecond,
    /// Time, milliseconds.
    Milliseconds,
    /// Angle, radians.
    Radians,
    /// Conductance, nanosiemens.
    Nanosiemens,
    /// Unitless quantity, e.g., a normalized correlation.
    Dimensionless,
}

/// A uniformly sampled waveform with explicit time alignment and unit.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnalogSignal {
    /// The sampled values.
    values: Vec<f64>,
    /// The time of the first sample (ms).
    t_start: f64,
    /// The time between two consecutive samples (ms).
    sampling_period: f64,
    /// The unit of the sampled values.
    unit: Unit,
}

impl AnalogSignal {
    /// Create a new analog signal with the specified parameters.
    /// Returns an error if the sampling period is not a finite positive number.
    pub fn new(
        values: Vec<f64>,
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
        if !t_start.is_finite() {
            return Err(EphysError::InvalidParameter(format!(
                "The start time must be a finite number, got {}",
                t_start
            )));
        }
        Ok(AnalogSignal {
            values,
            t_start,
            sampling_period,
            unit,
        })
    }

    /// Returns the sampled values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the time of the first sample (ms).
    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    /// Returns the time just after the last sample (ms).
    pub fn t_stop(&self) -> f64 {
        self.t_start + self.sampling_period * self.values.len() as f64
    }

    /// Returns the time between two consecutive samples (ms).
    pub fn sampling_period(&self) -> f64 {
        self.sampling_period
    }

    /// Returns the unit of the sampled values.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the signal contains no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
