//! Module implementing the analysis result data structures.
//!
//! Every analysis produces one or more of the types below, tags them with the
//! caller-supplied labels and appends them to the data store. Results are
//! write-once: they are never mutated after creation.

use serde::{Deserialize, Serialize};

use crate::error::EphysError;
use crate::signal::{AnalogSignal, Unit};
use crate::stimulus::StimulusDescriptor;

/// A cyclic tuning curve: response magnitude as a function of a periodic
/// stimulus parameter, one response array (over neurons) per stimulus.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CyclicTuningCurve {
    /// The period of the varying parameter, e.g., pi for orientation.
    period: f64,
    /// The per-neuron responses, one array per stimulus.
    responses: Vec<Vec<f64>>,
    /// The stimulus descriptors, parallel to the responses.
    stimuli: Vec<StimulusDescriptor>,
    /// The index of the varying stimulus parameter.
    parameter_index: usize,
    /// The name of the response values, e.g., "Response".
    value_name: String,
    /// The unit of the response values.
    unit: Unit,
    /// Free-form labels propagated from the analysis invocation.
    tags: Vec<String>,
}

impl CyclicTuningCurve {
    /// Create a new cyclic tuning curve with the specified parameters.
    /// Returns an error if the period is not a finite positive number, if the
    /// responses and stimuli are not parallel, or if the varying parameter
    /// index is out of bounds for some stimulus.
    pub fn new(
        period: f64,
        responses: Vec<Vec<f64>>,
        stimuli: Vec<StimulusDescriptor>,
        parameter_index: usize,
        value_name: impl Into<String>,
        unit: Unit,
        tags: Vec<String>,
    ) -> Result<Self, EphysError> {
        if !period.is_finite() || period <= 0.0 {
            return Err(EphysError::InvalidParameter(format!(
                "The period must be a finite positive number, got {}",
                period
            )));
        }
        if responses.len() != stimuli.len() {
            return Err(EphysError::InvalidParameter(format!(
                "The number of response arrays ({}) must match the number of stimuli ({})",
                responses.len(),
                stimuli.len()
            )));
        }
        if stimuli
            .iter()
            .any(|stimulus| parameter_index >= stimulus.num_parameters())
        {
            return Err(EphysError::InvalidParameter(format!(
                "The varying parameter index {} is out of bounds",
                parameter_index
            )));
        }
        Ok(CyclicTuningCurve {
            period,
            responses,
            stimuli,
            parameter_index,
            value_name: value_name.into(),
            unit,
            tags,
        })
    }

    /// Returns the period of the varying parameter.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Returns the index of the varying stimulus parameter.
    pub fn parameter_index(&self) -> usize {
        self.parameter_index
    }

    /// Returns the per-neuron responses, one array per stimulus.
    pub fn responses(&self) -> &[Vec<f64>] {
        &self.responses
    }

    /// Returns the stimulus descriptors, parallel to the responses.
    pub fn stimuli(&self) -> &[StimulusDescriptor] {
        &self.stimuli
    }

    /// Returns the name of the response values.
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Returns the unit of the response values.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns the tags of the result.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Group the curve points by residual parametrization, i.e., by equality
    /// of all stimulus parameters except the varying one.
    ///
    /// Returns one entry per residual parametrization: a representative
    /// descriptor and the (varying-parameter value, per-neuron responses)
    /// pairs of the group, in first-occurrence order.
    pub fn parametrization_groups(&self) -> Vec<(&StimulusDescriptor, Vec<(f64, &[f64])>)> {
        let excluded = [self.parameter_index];
        let mut groups: Vec<(&StimulusDescriptor, Vec<(f64, &[f64])>)> = vec![];

        for (stimulus, responses) in self.stimuli.iter().zip(self.responses.iter()) {
            // parameter_index is validated against every stimulus at construction
            let value = stimulus.value(self.parameter_index).unwrap_or(f64::NAN);
            match groups
                .iter_mut()
                .find(|(rep, _)| rep.same_group(stimulus, &excluded))
            {
                Some((_, points)) => points.push((value, &responses[..])),
                None => groups.push((stimulus, vec![(value, &responses[..])])),
            }
        }
        groups
    }
}

/// A named scalar value per neuron, e.g., "orientation preference".
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PerNeuronValue {
    /// The value of every neuron.
    values: Vec<f64>,
    /// The name of the values.
    value_name: String,
    /// The unit of the values.
    unit: Unit,
    /// Free-form labels propagated from the analysis invocation.
    tags: Vec<String>,
}

impl PerNeuronValue {
    /// Create a new per-neuron value with the specified parameters.
    pub fn new(values: Vec<f64>, value_name: impl Into<String>, unit: Unit, tags: Vec<String>) -> Self {
        PerNeuronValue {
            values,
            value_name: value_name.into(),
            unit,
            tags,
        }
    }

    /// Returns the value of every neuron.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the name of the values.
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Returns the unit of the values.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns the tags of the result.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Paired excitatory and inhibitory averaged conductance waveforms for a
/// selected subset of neurons.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ConductanceSignalList {
    /// The excitatory waveforms, one per selected neuron.
    esyn: Vec<AnalogSignal>,
    /// The inhibitory waveforms, one per selected neuron.
    isyn: Vec<AnalogSignal>,
    /// The indices of the selected neurons.
    neurons: Vec<usize>,
    /// Free-form labels propagated from the analysis invocation.
    tags: Vec<String>,
}

impl ConductanceSignalList {
    /// Create a new conductance signal list with the specified parameters.
    /// Returns an error if the three lists are not parallel.
    pub fn new(
        esyn: Vec<AnalogSignal>,
        isyn: Vec<AnalogSignal>,
        neurons: Vec<usize>,
        tags: Vec<String>,
    ) -> Result<Self, EphysError> {
        if esyn.len() != neurons.len() || isyn.len() != neurons.len() {
            return Err(EphysError::InvalidParameter(
                "The conductance signal lists must be parallel to the neuron list".to_string(),
            ));
        }
        Ok(ConductanceSignalList {
            esyn,
            isyn,
            neurons,
            tags,
        })
    }

    /// Returns the excitatory waveforms.
    pub fn esyn(&self) -> &[AnalogSignal] {
        &self.esyn
    }

    /// Returns the inhibitory waveforms.
    pub fn isyn(&self) -> &[AnalogSignal] {
        &self.isyn
    }

    /// Returns the indices of the selected neurons.
    pub fn neurons(&self) -> &[usize] {
        &self.neurons
    }

    /// Returns the tags of the result.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// A list of computed analog signals for a selected subset of neurons, with
/// named and united axes.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnalogSignalList {
    /// The signals, one per selected neuron.
    signals: Vec<AnalogSignal>,
    /// The indices of the selected neurons.
    neurons: Vec<usize>,
    /// The name of the x axis, e.g., "time".
    x_axis_name: String,
    /// The name of the y axis, e.g., "autocorrelation".
    y_axis_name: String,
    /// The unit of the x axis.
    x_unit: Unit,
    /// The unit of the y axis.
    y_unit: Unit,
    /// Free-form labels propagated from the analysis invocation.
    tags: Vec<String>,
}

impl AnalogSignalList {
    /// Create a new analog signal list with the specified parameters.
    /// Returns an error if the signal and neuron lists are not parallel.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        signals: Vec<AnalogSignal>,
        neurons: Vec<usize>,
        x_axis_name: impl Into<String>,
        y_axis_name: impl Into<String>,
        x_unit: Unit,
        y_unit: Unit,
        tags: Vec<String>,
    ) -> Result<Self, EphysError> {
        if signals.len() != neurons.len() {
            return Err(EphysError::InvalidParameter(
                "The signal list must be parallel to the neuron list".to_string(),
            ));
        }
        Ok(AnalogSignalList {
            signals,
            neurons,
            x_axis_name: x_axis_name.into(),
            y_axis_name: y_axis_name.into(),
            x_unit,
            y_unit,
            tags,
        })
    }

    /// Returns the signals.
    pub fn signals(&self) -> &[AnalogSignal] {
        &self.signals
    }

    /// Returns the indices of the selected neurons.
    pub fn neurons(&self) -> &[usize] {
        &self.neurons
    }

    /// Returns the name of the y axis.
    pub fn y_axis_name(&self) -> &str {
        &self.y_axis_name
    }

    /// Returns the tags of the result.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// An immutable result object as appended to the data store.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum AnalysisResult {
    CyclicTuningCurve(CyclicTuningCurve),
    PerNeuronValue(PerNeuronValue),
    ConductanceSignalList(ConductanceSignalList),
    AnalogSignalList(AnalogSignalList),
}
