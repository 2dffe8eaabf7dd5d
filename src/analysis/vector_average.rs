//! Vector-average preference and selectivity analysis.
//!
//! Takes all stored cyclic tuning curves and, for each residual
//! parametrization, estimates per neuron the preferred parameter value
//! (circular mean direction) and the selectivity (vector strength).

use itertools::Itertools;
use log::{debug, info};

use crate::analysis::Analysis;
use crate::error::EphysError;
use crate::results::{AnalysisResult, PerNeuronValue};
use crate::signal::Unit;
use crate::store::DataStore;

/// Estimates tuning preference and selectivity by vector averaging.
///
/// Each (response, parameter value) pair of a tuning curve is treated as a 2D
/// vector of magnitude equal to the response and angle equal to the parameter
/// value rescaled to a full turn. Per neuron, the preference is the angle of
/// the vector sum and the selectivity is the vector sum magnitude normalized
/// by the summed magnitudes of the individual vectors.
///
/// The preference is recovered as arccos of the normalized x component and
/// therefore lies in [0, pi]: the sign of the angle is discarded. This is a
/// known limitation of the estimator and is preserved as is.
#[derive(Debug, PartialEq, Clone)]
pub struct TuningCurvePreferenceVectorAverage {
    /// The tags attached to every produced result.
    tags: Vec<String>,
}

impl TuningCurvePreferenceVectorAverage {
    /// Create a new analysis with the specified tags.
    pub fn new(tags: Vec<String>) -> Self {
        TuningCurvePreferenceVectorAverage { tags }
    }
}

impl Analysis for TuningCurvePreferenceVectorAverage {
    fn analyse(&self, store: &mut DataStore) -> Result<(), EphysError> {
        info!("Starting tuning preference analysis");
        let mut results: Vec<(String, AnalysisResult)> = vec![];

        let sheets: Vec<String> = store.sheets().iter().map(|s| s.to_string()).collect();
        for sheet in sheets.iter() {
            for tc in store.tuning_curves(sheet) {
                for (stimulus, points) in tc.parametrization_groups() {
                    let (preference, selectivity) = vector_average(&points, tc.period())?;

                    let parameter = stimulus
                        .parameter_name(tc.parameter_index())
                        .unwrap_or("parameter");
                    debug!(
                        "Adding {} preference and selectivity to sheet {}",
                        parameter, sheet
                    );
                    results.push((
                        sheet.clone(),
                        AnalysisResult::PerNeuronValue(PerNeuronValue::new(
                            preference,
                            format!("{} preference", parameter),
                            Unit::Radians,
                            self.tags.clone(),
                        )),
                    ));
                    results.push((
                        sheet.clone(),
                        AnalysisResult::PerNeuronValue(PerNeuronValue::new(
                            selectivity,
                            format!("{} selectivity", parameter),
                            Unit::Dimensionless,
                            self.tags.clone(),
                        )),
                    ));
                }
            }
        }

        for (sheet, result) in results {
            store.add_analysis_result(result, sheet);
        }
        Ok(())
    }
}

/// Compute per-neuron preference and selectivity of one residual
/// parametrization group by vector averaging.
///
/// Fails with a domain error when the summed vector norms or the vector sum
/// magnitude of some neuron is exactly zero, since the preference is then
/// undefined; NaN is never propagated silently.
fn vector_average(
    points: &[(f64, &[f64])],
    period: f64,
) -> Result<(Vec<f64>, Vec<f64>), EphysError> {
    let num_neurons = points.first().map_or(0, |(_, values)| values.len());
    if points.iter().any(|(_, values)| values.len() != num_neurons) {
        return Err(EphysError::InvalidParameter(
            "All response arrays of a tuning curve must have the same length".to_string(),
        ));
    }

    let mut preference = Vec::with_capacity(num_neurons);
    let mut selectivity = Vec::with_capacity(num_neurons);

    for neuron in 0..num_neurons {
        let (x, y, n) = points
            .iter()
            .fold((0.0, 0.0, 0.0), |(x, y, n), (phase, values)| {
                let angle = phase / period * 2.0 * std::f64::consts::PI;
                let xx = angle.cos() * values[neuron];
                let yy = angle.sin() * values[neuron];
                (x + xx, y + yy, n + xx.hypot(yy))
            });

        let magnitude = x.hypot(y);
        if n == 0.0 || magnitude == 0.0 {
            return Err(EphysError::DomainError(format!(
                "The vector average of neuron {} has zero magnitude, its preference is undefined",
                neuron
            )));
        }
        preference.push((x / magnitude).acos());
        selectivity.push(magnitude / n);
    }

    // the selectivity is a normalized vector-strength index in [0, 1]
    debug_assert!(selectivity
        .iter()
        .zip_eq(preference.iter())
        .all(|(s, p)| (0.0..=1.0 + 1e-12).contains(s) && p.is_finite()));

    Ok((preference, selectivity))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use super::*;
    use crate::results::CyclicTuningCurve;
    use crate::stimulus::{StimulusDescriptor, StimulusParameter};

    fn grating(orientation: f64) -> StimulusDescriptor {
        StimulusDescriptor::new(
            "FullfieldDriftingSinusoidalGrating",
            vec![StimulusParameter::new("orientation", orientation)],
        )
        .unwrap()
    }

    #[test]
    fn test_concentrated_response() {
        // all response at orientation pi/4: preference = pi/2 (rescaled), selectivity = 1
        let points: Vec<(f64, &[f64])> = vec![
            (0.0, &[0.0][..]),
            (PI / 4.0, &[12.0][..]),
            (PI / 2.0, &[0.0][..]),
            (3.0 * PI / 4.0, &[0.0][..]),
        ];
        let (preference, selectivity) = vector_average(&points, PI).unwrap();
        assert_relative_eq!(preference[0], PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(selectivity[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_response() {
        // uniform response over evenly spaced orientations: selectivity ~ 0
        let points: Vec<(f64, &[f64])> = vec![
            (0.0, &[7.0][..]),
            (PI / 4.0, &[7.0][..]),
            (PI / 2.0, &[7.0][..]),
            (3.0 * PI / 4.0, &[7.0][..]),
        ];
        let (_, selectivity) = vector_average(&points, PI).unwrap();
        assert_relative_eq!(selectivity[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_magnitude_fails_fast() {
        let points: Vec<(f64, &[f64])> = vec![(0.0, &[0.0][..]), (PI / 2.0, &[0.0][..])];
        assert!(matches!(
            vector_average(&points, PI),
            Err(EphysError::DomainError(_))
        ));
    }

    #[test]
    fn test_analysis_emits_two_values_per_group() {
        let mut store = DataStore::new();
        // a record so the sheet is known to the store
        store.add_recording(
            "V1_Exc",
            grating(0.0),
            crate::segment::Segment::new(vec![vec![]], 0.0, 1000.0, None, None).unwrap(),
        );
        let tc = CyclicTuningCurve::new(
            PI,
            vec![vec![15.0, 1.0], vec![5.0, 1.0]],
            vec![grating(0.0), grating(PI / 2.0)],
            0,
            "Response",
            Unit::SpikesPerSecond,
            vec![],
        )
        .unwrap();
        store.add_analysis_result(AnalysisResult::CyclicTuningCurve(tc), "V1_Exc");

        let analysis = TuningCurvePreferenceVectorAverage::new(vec!["va".to_string()]);
        analysis.analyse(&mut store).unwrap();

        let values: Vec<&PerNeuronValue> = store
            .results("V1_Exc")
            .into_iter()
            .filter_map(|r| match r {
                AnalysisResult::PerNeuronValue(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value_name(), "orientation preference");
        assert_eq!(values[0].unit(), Unit::Radians);
        assert_eq!(values[1].value_name(), "orientation selectivity");
        assert_eq!(values[1].unit(), Unit::Dimensionless);
        assert_eq!(values[0].tags(), &["va".to_string()]);

        // neuron 0 prefers orientation 0, neuron 1 responds uniformly
        assert_relative_eq!(values[0].values()[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(values[1].values()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(values[1].values()[1], 0.0, epsilon = 1e-12);
    }
}
