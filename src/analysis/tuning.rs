//! Orientation tuning analysis.
//!
//! Takes all recordings of a periodic grating stimulus, reduces every trial to
//! per-neuron mean firing rates, merges trials of otherwise identical
//! conditions by arithmetic mean and stores one cyclic tuning curve per sheet.

use log::{debug, info};

use crate::analysis::Analysis;
use crate::error::EphysError;
use crate::results::{AnalysisResult, CyclicTuningCurve};
use crate::signal::Unit;
use crate::stimulus::collapse_mean;
use crate::store::DataStore;

/// The stimulus type the analysis targets by default.
pub const DEFAULT_STIMULUS_TYPE: &str = "FullfieldDriftingSinusoidalGrating";

/// Builds per-sheet cyclic orientation tuning curves from trial-averaged
/// firing rates.
///
/// For each combination of the non-varying stimulus parameters, the trials
/// sharing that combination are merged into one mean rate per orientation,
/// producing one point of the curve. The curve period is pi since gratings
/// are symmetric over half a turn.
#[derive(Debug, PartialEq, Clone)]
pub struct AveragedOrientationTuning {
    /// The name of the targeted stimulus type.
    stimulus_type: String,
    /// The index of the varying (orientation-like) stimulus parameter.
    varying_index: usize,
    /// The index of the trial stimulus parameter, excluded when merging trials.
    trial_index: usize,
    /// The tags attached to every produced result.
    tags: Vec<String>,
}

impl AveragedOrientationTuning {
    /// Create a new analysis with the specified parameters.
    /// Returns a configuration error if the varying and trial parameter
    /// indexes coincide.
    pub fn new(
        stimulus_type: impl Into<String>,
        varying_index: usize,
        trial_index: usize,
        tags: Vec<String>,
    ) -> Result<Self, EphysError> {
        if varying_index == trial_index {
            return Err(EphysError::ConfigurationError(format!(
                "The varying and trial parameter indexes must differ, both are {}",
                varying_index
            )));
        }
        Ok(AveragedOrientationTuning {
            stimulus_type: stimulus_type.into(),
            varying_index,
            trial_index,
            tags,
        })
    }
}

impl Analysis for AveragedOrientationTuning {
    fn analyse(&self, store: &mut DataStore) -> Result<(), EphysError> {
        info!("Starting orientation tuning analysis");
        let mut results: Vec<(String, AnalysisResult)> = vec![];

        let dsv = store.view().select_stimulus_type(&self.stimulus_type);
        for sheet in dsv.sheets() {
            let dsv1 = dsv.select_sheet(sheet);

            // reduce the spike trains of every trial to mean firing rates
            let mean_rates: Vec<Vec<f64>> = dsv1
                .segments()
                .iter()
                .map(|segment| segment.mean_rates())
                .collect();
            let stimuli: Vec<_> = dsv1.stimuli().into_iter().cloned().collect();

            // merge the trials of otherwise identical conditions
            let (mean_rates, stimuli) =
                collapse_mean(mean_rates, &stimuli, &[self.trial_index])?;

            debug!(
                "Adding a cyclic tuning curve with {} points to sheet {}",
                mean_rates.len(),
                sheet
            );
            let curve = CyclicTuningCurve::new(
                std::f64::consts::PI,
                mean_rates,
                stimuli,
                self.varying_index,
                "Response",
                Unit::SpikesPerSecond,
                self.tags.clone(),
            )?;
            results.push((sheet.to_string(), AnalysisResult::CyclicTuningCurve(curve)));
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
    use crate::results::AnalysisResult;
    use crate::segment::Segment;
    use crate::stimulus::{StimulusDescriptor, StimulusParameter};

    fn grating(orientation: f64, trial: f64) -> StimulusDescriptor {
        StimulusDescriptor::new(
            DEFAULT_STIMULUS_TYPE,
            vec![
                StimulusParameter::new("orientation", orientation),
                StimulusParameter::new("trial", trial),
            ],
        )
        .unwrap()
    }

    fn segment_with_rate(rate_hz: f64) -> Segment {
        // 1000 ms trial, one neuron firing at a constant rate
        let times: Vec<f64> = (0..rate_hz as usize)
            .map(|i| i as f64 * 1000.0 / rate_hz)
            .collect();
        Segment::new(vec![times], 0.0, 1000.0, None, None).unwrap()
    }

    #[test]
    fn test_new_rejects_coinciding_indexes() {
        assert_eq!(
            AveragedOrientationTuning::new(DEFAULT_STIMULUS_TYPE, 1, 1, vec![]),
            Err(EphysError::ConfigurationError(
                "The varying and trial parameter indexes must differ, both are 1".to_string()
            ))
        );
    }

    #[test]
    fn test_trials_are_averaged_per_orientation() {
        let mut store = DataStore::new();
        store.add_recording("V1_Exc", grating(0.0, 0.0), segment_with_rate(10.0));
        store.add_recording("V1_Exc", grating(0.0, 1.0), segment_with_rate(20.0));
        store.add_recording(
            "V1_Exc",
            grating(std::f64::consts::FRAC_PI_2, 0.0),
            segment_with_rate(5.0),
        );

        let analysis =
            AveragedOrientationTuning::new(DEFAULT_STIMULUS_TYPE, 0, 1, vec!["tc".to_string()])
                .unwrap();
        analysis.analyse(&mut store).unwrap();

        let curves = store.tuning_curves("V1_Exc");
        assert_eq!(curves.len(), 1);
        let tc = curves[0];
        assert_eq!(tc.period(), std::f64::consts::PI);
        assert_eq!(tc.unit(), Unit::SpikesPerSecond);
        assert_eq!(tc.tags(), &["tc".to_string()]);
        assert_eq!(tc.responses(), &[vec![15.0], vec![5.0]]);
        assert_eq!(tc.stimuli()[0].value(0), Some(0.0));
        assert_eq!(tc.stimuli()[1].value(0), Some(std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn test_no_matching_stimulus_produces_no_result() {
        let mut store = DataStore::new();
        store.add_recording(
            "V1_Exc",
            StimulusDescriptor::new(
                "NaturalImage",
                vec![
                    StimulusParameter::new("orientation", 0.0),
                    StimulusParameter::new("trial", 0.0),
                ],
            )
            .unwrap(),
            segment_with_rate(10.0),
        );

        let analysis =
            AveragedOrientationTuning::new(DEFAULT_STIMULUS_TYPE, 0, 1, vec![]).unwrap();
        analysis.analyse(&mut store).unwrap();
        assert!(store.results("V1_Exc").is_empty());
    }

    #[test]
    fn test_result_kind() {
        let mut store = DataStore::new();
        store.add_recording("V1_Exc", grating(0.0, 0.0), segment_with_rate(10.0));
        let analysis =
            AveragedOrientationTuning::new(DEFAULT_STIMULUS_TYPE, 0, 1, vec![]).unwrap();
        analysis.analyse(&mut store).unwrap();

        assert!(matches!(
            store.results("V1_Exc")[0],
            AnalysisResult::CyclicTuningCurve(_)
        ));
    }
}
