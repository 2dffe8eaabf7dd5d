//! Module implementing stimulus descriptors and the trial collapse utility.
//!
//! A [`StimulusDescriptor`] identifies one stimulus presentation by its type
//! name and an ordered list of named parameter values (orientation, contrast,
//! trial index, ...). Descriptors act as grouping keys: two presentations
//! belong to the same group if all their parameter values agree except for
//! the ones deliberately excluded from the comparison.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::EphysError;

/// A named stimulus parameter value.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct StimulusParameter {
    /// The name of the parameter, e.g., "orientation".
    name: String,
    /// The value of the parameter.
    value: f64,
}

impl StimulusParameter {
    /// Create a new stimulus parameter with the specified name and value.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        StimulusParameter {
            name: name.into(),
            value,
        }
    }

    /// Returns the name of the parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the parameter.
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A structured identifier for one stimulus presentation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct StimulusDescriptor {
    /// The name of the stimulus type, e.g., "FullfieldDriftingSinusoidalGrating".
    name: String,
    /// The ordered list of stimulus parameters.
    parameters: Vec<StimulusParameter>,
}

/// An opaque grouping key derived from a descriptor with some parameters blanked out.
///
/// Values are compared bitwise, so two presentations are in the same group only
/// if their non-blanked parameters are exactly equal.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ParametrizationKey {
    name: String,
    values: Vec<Option<u64>>,
}

impl StimulusDescriptor {
    /// Create a new stimulus descriptor with the specified type name and parameters.
    /// Returns an error if any parameter value is not a finite number.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<StimulusParameter>,
    ) -> Result<Self, EphysError> {
        for p in parameters.iter() {
            if !p.value.is_finite() {
                return Err(EphysError::InvalidParameter(format!(
                    "The stimulus parameter '{}' must be a finite number, got {}",
                    p.name, p.value
                )));
            }
        }
        Ok(StimulusDescriptor {
            name: name.into(),
            parameters,
        })
    }

    /// Returns the name of the stimulus type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of parameters.
    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    /// Returns the value of the parameter at the given index, if any.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.parameters.get(index).map(|p| p.value)
    }

    /// Returns the name of the parameter at the given index, if any.
    pub fn parameter_name(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(|p| p.name.as_str())
    }

    /// Returns the grouping key of the descriptor, with the excluded parameters blanked out.
    pub fn group_key(&self, excluded: &[usize]) -> ParametrizationKey {
        ParametrizationKey {
            name: self.name.clone(),
            values: self
                .parameters
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    if excluded.contains(&i) {
                        None
                    } else {
                        Some(p.value.to_bits())
                    }
                })
                .collect(),
        }
    }

    /// Returns true if the two descriptors agree on all parameter values except the excluded ones.
    pub fn same_group(&self, other: &StimulusDescriptor, excluded: &[usize]) -> bool {
        self.group_key(excluded) == other.group_key(excluded)
    }
}

/// Group parallel numeric arrays by stimulus equality on all non-excluded parameters.
///
/// Returns the grouped arrays and one representative descriptor per group (the
/// first member), both in first-occurrence order. Returns an error if the two
/// input lists have different lengths.
pub fn collapse(
    values: Vec<Vec<f64>>,
    stimuli: &[StimulusDescriptor],
    excluded: &[usize],
) -> Result<(Vec<Vec<Vec<f64>>>, Vec<StimulusDescriptor>), EphysError> {
    if values.len() != stimuli.len() {
        return Err(EphysError::InvalidParameter(format!(
            "The number of value arrays ({}) must match the number of stimuli ({})",
            values.len(),
            stimuli.len()
        )));
    }

    let mut positions: HashMap<ParametrizationKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<Vec<f64>>> = vec![];
    let mut representatives: Vec<StimulusDescriptor> = vec![];

    for (array, stimulus) in values.into_iter().zip_eq(stimuli.iter()) {
        let key = stimulus.group_key(excluded);
        match positions.get(&key) {
            Some(&pos) => groups[pos].push(array),
            None => {
                positions.insert(key, groups.len());
                groups.push(vec![array]);
                representatives.push(stimulus.clone());
            }
        }
    }

    Ok((groups, representatives))
}

/// Collapse parallel numeric arrays and reduce every group to its arithmetic mean.
///
/// A group of one element reduces to that element. Returns an error if arrays
/// within a group have different lengths; an empty group cannot occur by
/// construction and is reported as a logic error.
pub fn collapse_mean(
    values: Vec<Vec<f64>>,
    stimuli: &[StimulusDescriptor],
    excluded: &[usize],
) -> Result<(Vec<Vec<f64>>, Vec<StimulusDescriptor>), EphysError> {
    let (groups, representatives) = collapse(values, stimuli, excluded)?;

    let means = groups
        .into_iter()
        .map(|group| {
            let count = group.len();
            if count == 0 {
                return Err(EphysError::LogicError(
                    "A collapse group must contain at least one member".to_string(),
                ));
            }
            let len = group[0].len();
            if group.iter().any(|array| array.len() != len) {
                return Err(EphysError::InvalidParameter(
                    "All value arrays within a collapse group must have the same length"
                        .to_string(),
                ));
            }
            let mut mean = vec![0.0; len];
            for array in group.iter() {
                for (acc, value) in mean.iter_mut().zip_eq(array.iter()) {
                    *acc += value;
                }
            }
            for acc in mean.iter_mut() {
                *acc /= count as f64;
            }
            Ok(mean)
        })
        .collect::<Result<Vec<Vec<f64>>, EphysError>>()?;

    Ok((means, representatives))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grating(orientation: f64, contrast: f64, trial: f64) -> StimulusDescriptor {
        StimulusDescriptor::new(
            "FullfieldDriftingSinusoidalGrating",
            vec![
                StimulusParameter::new("orientation", orientation),
                StimulusParameter::new("contrast", contrast),
                StimulusParameter::new("trial", trial),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_descriptor_new() {
        assert!(StimulusDescriptor::new(
            "Null",
            vec![StimulusParameter::new("duration", f64::INFINITY)]
        )
        .is_err());

        let stimulus = grating(0.0, 1.0, 3.0);
        assert_eq!(stimulus.num_parameters(), 3);
        assert_eq!(stimulus.value(0), Some(0.0));
        assert_eq!(stimulus.parameter_name(0), Some("orientation"));
        assert_eq!(stimulus.value(5), None);
    }

    #[test]
    fn test_same_group() {
        let s1 = grating(0.0, 1.0, 0.0);
        let s2 = grating(0.0, 1.0, 1.0);
        let s3 = grating(0.5, 1.0, 0.0);

        // same up to the trial index
        assert!(s1.same_group(&s2, &[2]));
        // different orientation
        assert!(!s1.same_group(&s3, &[2]));
        // same up to orientation and trial
        assert!(s1.same_group(&s3, &[0, 2]));
        // nothing excluded
        assert!(!s1.same_group(&s2, &[]));

        // different stimulus types never group
        let other = StimulusDescriptor::new(
            "NaturalImage",
            vec![
                StimulusParameter::new("orientation", 0.0),
                StimulusParameter::new("contrast", 1.0),
                StimulusParameter::new("trial", 0.0),
            ],
        )
        .unwrap();
        assert!(!s1.same_group(&other, &[2]));
    }

    #[test]
    fn test_collapse_groups_by_non_excluded_parameters() {
        let stimuli = vec![
            grating(0.0, 1.0, 0.0),
            grating(0.0, 1.0, 1.0),
            grating(0.5, 1.0, 0.0),
        ];
        let values = vec![vec![10.0, 0.0], vec![20.0, 2.0], vec![5.0, 1.0]];

        let (groups, reps) = collapse(values, &stimuli, &[2]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(reps.len(), 2);
        assert_eq!(groups[0], vec![vec![10.0, 0.0], vec![20.0, 2.0]]);
        assert_eq!(groups[1], vec![vec![5.0, 1.0]]);
        assert_eq!(reps[0].value(0), Some(0.0));
        assert_eq!(reps[1].value(0), Some(0.5));
    }

    #[test]
    fn test_collapse_mean() {
        let stimuli = vec![
            grating(0.0, 1.0, 0.0),
            grating(0.0, 1.0, 1.0),
            grating(0.5, 1.0, 0.0),
        ];
        let values = vec![vec![10.0, 0.0], vec![20.0, 2.0], vec![5.0, 1.0]];

        let (means, reps) = collapse_mean(values, &stimuli, &[2]).unwrap();
        assert_eq!(means, vec![vec![15.0, 1.0], vec![5.0, 1.0]]);
        assert_eq!(reps.len(), 2);
    }

    #[test]
    fn test_collapse_mean_of_identical_copies_is_identity() {
        let stimuli: Vec<StimulusDescriptor> =
            (0..7).map(|trial| grating(0.25, 1.0, trial as f64)).collect();
        let values = vec![vec![3.5, 0.0, 12.25]; 7];

        let (means, reps) = collapse_mean(values, &stimuli, &[2]).unwrap();
        assert_eq!(means, vec![vec![3.5, 0.0, 12.25]]);
        assert_eq!(reps.len(), 1);
    }

    #[test]
    fn test_collapse_mismatched_lengths() {
        let stimuli = vec![grating(0.0, 1.0, 0.0)];
        assert!(collapse(vec![], &stimuli, &[2]).is_err());

        let stimuli = vec![grating(0.0, 1.0, 0.0), grating(0.0, 1.0, 1.0)];
        let values = vec![vec![1.0], vec![1.0, 2.0]];
        assert!(collapse_mean(values, &stimuli, &[2]).is_err());
    }
}
