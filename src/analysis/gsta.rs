//! Spike-triggered average of synaptic conductances.
//!
//! Spikes are not assumed to be aligned with the conductance sampling grid:
//! the sample bin in which a spike falls is taken as the center of the
//! conductance window included in the average.

use log::{debug, info};

use crate::analysis::Analysis;
use crate::error::EphysError;
use crate::results::{AnalysisResult, ConductanceSignalList};
use crate::segment::ConductanceTraces;
use crate::signal::AnalogSignal;
use crate::store::DataStore;

/// Computes the conductance spike-triggered average per sheet.
///
/// For every selected neuron, a window of the conductance trace is extracted
/// around each of its spikes and accumulated over all trials; the accumulated
/// sum is divided by the number of accumulated windows. Spikes outside the
/// trace bounds, and spikes whose window does not fully fit inside the trace,
/// are silently skipped. A neuron without any accumulated window yields an
/// all-zero waveform, which is documented behavior rather than an error.
#[derive(Debug, PartialEq, Clone)]
pub struct Gsta {
    /// The half-window length (ms); rounded down to a whole number of samples.
    length: f64,
    /// The indices of the neurons to compute the average for.
    neurons: Vec<usize>,
    /// The tags attached to every produced result.
    tags: Vec<String>,
}

impl Gsta {
    /// Create a new analysis with the specified parameters.
    /// Returns a configuration error if the window length is not a finite
    /// positive number or if no neuron is selected.
    pub fn new(length: f64, neurons: Vec<usize>, tags: Vec<String>) -> Result<Self, EphysError> {
        if !length.is_finite() || length <= 0.0 {
            return Err(EphysError::ConfigurationError(format!(
                "The window length must be a finite positive number, got {}",
                length
            )));
        }
        if neurons.is_empty() {
            return Err(EphysError::ConfigurationError(
                "At least one neuron must be selected".to_string(),
            ));
        }
        Ok(Gsta {
            length,
            neurons,
            tags,
        })
    }

    /// Compute the spike-triggered average of one neuron over all trials.
    fn do_gsta(
        &self,
        trials: &[(&ConductanceTraces, &[f64])],
        neuron: usize,
    ) -> Result<AnalogSignal, EphysError> {
        // trials is non-empty, checked by the caller
        let dt = trials[0].0.sampling_period();
        let unit = trials[0].0.unit();
        let window = (self.length / dt) as usize;

        let mut sum = vec![0.0; 2 * window + 1];
        let mut count: usize = 0;

        for (traces, spikes) in trials.iter() {
            let trace = traces.trace(neuron).ok_or_else(|| {
                EphysError::ConfigurationError(format!(
                    "The neuron index {} is out of bounds for the conductance traces",
                    neuron
                ))
            })?;
            for &time in spikes.iter() {
                if time < traces.t_start() || time >= traces.t_stop() {
                    continue;
                }
                let idx = ((time - traces.t_start()) / dt) as usize;
                // legacy window-fit rule: the window must fit strictly inside
                // the trace on the left and within its bounds on the right
                if idx > window && idx + window + 1 <= trace.len() {
                    for (acc, value) in sum.iter_mut().zip(&trace[idx - window..=idx + window]) {
                        *acc += value;
                    }
                    count += 1;
                }
            }
        }

        // a neuron without qualifying spikes keeps an all-zero waveform
        let count = count.max(1);
        for acc in sum.iter_mut() {
            *acc /= count as f64;
        }

        AnalogSignal::new(sum, -(window as f64) * dt, dt, unit)
    }
}

impl Analysis for Gsta {
    fn analyse(&self, store: &mut DataStore) -> Result<(), EphysError> {
        info!("Starting spike-triggered analysis of conductances");
        let mut results: Vec<(String, AnalysisResult)> = vec![];

        let dsv = store.view();
        for sheet in dsv.sheets() {
            let dsv1 = dsv.select_sheet(sheet);

            // keep only the trials with both conductances recorded
            let trials: Vec<(&ConductanceTraces, &ConductanceTraces, &[Vec<f64>])> = dsv1
                .segments()
                .into_iter()
                .filter_map(|segment| match (segment.esyn(), segment.isyn()) {
                    (Some(esyn), Some(isyn)) => Some((esyn, isyn, segment.spike_trains())),
                    _ => None,
                })
                .collect();
            if trials.is_empty() {
                debug!("Sheet {} has no conductance recordings, skipping", sheet);
                continue;
            }

            let mut asl_e = Vec::with_capacity(self.neurons.len());
            let mut asl_i = Vec::with_capacity(self.neurons.len());
            for &neuron in self.neurons.iter() {
                let spikes: Vec<&[f64]> = trials
                    .iter()
                    .map(|(_, _, trains)| {
                        trains.get(neuron).map(|times| &times[..]).ok_or_else(|| {
                            EphysError::ConfigurationError(format!(
                                "The neuron index {} is out of bounds for the spike trains",
                                neuron
                            ))
                        })
                    })
                    .collect::<Result<_, _>>()?;

                let e_trials: Vec<(&ConductanceTraces, &[f64])> = trials
                    .iter()
                    .zip(spikes.iter())
                    .map(|((esyn, _, _), &times)| (*esyn, times))
                    .collect();
                let i_trials: Vec<(&ConductanceTraces, &[f64])> = trials
                    .iter()
                    .zip(spikes.iter())
                    .map(|((_, isyn, _), &times)| (*isyn, times))
                    .collect();

                asl_e.push(self.do_gsta(&e_trials, neuron)?);
                asl_i.push(self.do_gsta(&i_trials, neuron)?);
            }

            debug!("Adding a conductance signal list to sheet {}", sheet);
            let list =
                ConductanceSignalList::new(asl_e, asl_i, self.neurons.clone(), self.tags.clone())?;
            results.push((
                sheet.to_string(),
                AnalysisResult::ConductanceSignalList(list),
            ));
        }

        for (sheet, result) in results {
            store.add_analysis_result(result, sheet);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use crate::signal::Unit;
    use crate::stimulus::{StimulusDescriptor, StimulusParameter};

    fn traces(values: Vec<Vec<f64>>, dt: f64) -> ConductanceTraces {
        ConductanceTraces::new(values, 0.0, dt, Unit::Nanosiemens).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_parameters() {
        assert!(Gsta::new(0.0, vec![0], vec![]).is_err());
        assert!(Gsta::new(f64::NAN, vec![0], vec![]).is_err());
        assert!(Gsta::new(3.0, vec![], vec![]).is_err());
        assert!(Gsta::new(3.0, vec![0], vec![]).is_ok());
    }

    #[test]
    fn test_no_spikes_yields_all_zero_window() {
        let gsta = Gsta::new(3.0, vec![0], vec![]).unwrap();
        let tr = traces(vec![vec![4.2; 21]], 1.0);
        let spikes: Vec<f64> = vec![];
        let signal = gsta.do_gsta(&[(&tr, &spikes[..])], 0).unwrap();
        assert_eq!(signal.values(), &[0.0; 7]);
        assert_eq!(signal.t_start(), -3.0);
        assert_eq!(signal.unit(), Unit::Nanosiemens);
    }

    #[test]
    fn test_constant_trace_single_spike_at_midpoint() {
        let gsta = Gsta::new(3.0, vec![0], vec![]).unwrap();
        let tr = traces(vec![vec![4.2; 21]], 1.0);
        let spikes = vec![10.0];
        let signal = gsta.do_gsta(&[(&tr, &spikes[..])], 0).unwrap();
        assert_eq!(signal.values(), &[4.2; 7]);
    }

    #[test]
    fn test_out_of_bounds_spikes_are_skipped() {
        let gsta = Gsta::new(2.0, vec![0], vec![]).unwrap();
        let tr = traces(vec![(0..20).map(|i| i as f64).collect()], 1.0);
        // spike before the trace, after the trace, too close to either edge,
        // and one qualifying spike at t = 10
        let spikes = vec![-5.0, 1.0, 10.0, 19.5, 25.0];
        let signal = gsta.do_gsta(&[(&tr, &spikes[..])], 0).unwrap();
        assert_eq!(signal.values(), &[8.0, 9.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_windows_are_averaged_across_trials() {
        let gsta = Gsta::new(1.0, vec![0], vec![]).unwrap();
        let tr1 = traces(vec![vec![1.0; 11]], 1.0);
        let tr2 = traces(vec![vec![3.0; 11]], 1.0);
        let signal = gsta
            .do_gsta(&[(&tr1, &[5.0][..]), (&tr2, &[5.0][..])], 0)
            .unwrap();
        assert_eq!(signal.values(), &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_analyse_bundles_both_conductances() {
        let mut store = DataStore::new();
        let stimulus = StimulusDescriptor::new(
            "FullfieldDriftingSinusoidalGrating",
            vec![StimulusParameter::new("trial", 0.0)],
        )
        .unwrap();
        let segment = Segment::new(
            vec![vec![10.0], vec![]],
            0.0,
            21.0,
            Some(traces(vec![vec![1.0; 21], vec![0.0; 21]], 1.0)),
            Some(traces(vec![vec![2.0; 21], vec![0.0; 21]], 1.0)),
        )
        .unwrap();
        store.add_recording("V1_Exc", stimulus, segment);

        let gsta = Gsta::new(3.0, vec![0, 1], vec!["sta".to_string()]).unwrap();
        gsta.analyse(&mut store).unwrap();

        let results = store.results("V1_Exc");
        assert_eq!(results.len(), 1);
        let list = match results[0] {
            AnalysisResult::ConductanceSignalList(list) => list,
            _ => panic!("expected a conductance signal list"),
        };
        assert_eq!(list.neurons(), &[0, 1]);
        assert_eq!(list.esyn()[0].values(), &[1.0; 7]);
        assert_eq!(list.isyn()[0].values(), &[2.0; 7]);
        // neuron 1 never spiked
        assert_eq!(list.esyn()[1].values(), &[0.0; 7]);
        assert_eq!(list.tags(), &["sta".to_string()]);
    }
}
